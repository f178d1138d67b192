//! Monthly aggregation: signed per-flow sums on a dense month axis, and an
//! expense breakdown by category.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_core::{Flow, MonthKey, TransactionRecord};
use tracing::debug;

use crate::forecast::ExpenseSeries;

/// Signed sums for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    pub month: MonthKey,
    /// Sum of income amounts (>= 0)
    pub income: f64,
    /// Sum of signed expense amounts (<= 0)
    pub expense: f64,
}

impl MonthlyTotals {
    fn empty(month: MonthKey) -> Self {
        Self {
            month,
            income: 0.0,
            expense: 0.0,
        }
    }

    /// Income plus (negative) expense
    pub fn net(&self) -> f64 {
        self.income + self.expense
    }
}

/// Chronological monthly totals with no gaps between the first and last month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyLedger {
    months: Vec<MonthlyTotals>,
    has_expenses: bool,
}

impl MonthlyLedger {
    pub fn months(&self) -> &[MonthlyTotals] {
        &self.months
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn first_month(&self) -> Option<MonthKey> {
        self.months.first().map(|m| m.month)
    }

    pub fn last_month(&self) -> Option<MonthKey> {
        self.months.last().map(|m| m.month)
    }

    pub fn get(&self, month: MonthKey) -> Option<&MonthlyTotals> {
        self.months
            .binary_search_by(|m| m.month.cmp(&month))
            .ok()
            .map(|i| &self.months[i])
    }

    /// True if at least one expense record was aggregated
    pub fn has_expenses(&self) -> bool {
        self.has_expenses
    }

    pub fn income_values(&self) -> Vec<f64> {
        self.months.iter().map(|m| m.income).collect()
    }

    pub fn expense_values(&self) -> Vec<f64> {
        self.months.iter().map(|m| m.expense).collect()
    }

    /// The signed expense column as a forecastable series.
    ///
    /// `None` when no expense was ever recorded.
    pub fn expense_series(&self) -> Option<ExpenseSeries> {
        if !self.has_expenses {
            return None;
        }
        let start = self.first_month()?;
        Some(ExpenseSeries::new(start, self.expense_values()))
    }
}

/// Total expense magnitude per category over the whole period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    totals: BTreeMap<String, f64>,
}

impl CategoryBreakdown {
    pub fn get(&self, category: &str) -> Option<f64> {
        self.totals.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.totals.values().sum()
    }

    /// Each category's fraction of total spending, largest first
    pub fn shares(&self) -> Vec<(&str, f64)> {
        let total = self.total();
        let mut shares: Vec<(&str, f64)> = self
            .iter()
            .map(|(cat, amt)| (cat, if total > 0.0 { amt / total } else { 0.0 }))
            .collect();
        shares.sort_by(|a, b| b.1.total_cmp(&a.1));
        shares
    }
}

/// Aggregate records into a dense monthly ledger and an expense breakdown.
///
/// Empty input yields empty outputs.
pub fn aggregate(records: &[TransactionRecord]) -> (MonthlyLedger, CategoryBreakdown) {
    let mut by_month: BTreeMap<MonthKey, MonthlyTotals> = BTreeMap::new();
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut has_expenses = false;

    for record in records {
        let month = MonthKey::from_date(record.date);
        let entry = by_month
            .entry(month)
            .or_insert_with(|| MonthlyTotals::empty(month));

        match record.flow {
            Flow::Income => entry.income += record.signed_amount(),
            Flow::Expense => {
                entry.expense += record.signed_amount();
                has_expenses = true;
                *totals.entry(record.category.clone()).or_insert(0.0) += record.amount.abs();
            }
        }
    }

    let months = match (by_month.keys().next(), by_month.keys().next_back()) {
        (Some(&first), Some(&last)) => first
            .through(last)
            .map(|m| {
                by_month
                    .get(&m)
                    .copied()
                    .unwrap_or_else(|| MonthlyTotals::empty(m))
            })
            .collect(),
        _ => Vec::new(),
    };

    debug!(
        "Aggregated {} records into {} months, {} expense categories",
        records.len(),
        months.len(),
        totals.len()
    );

    (
        MonthlyLedger {
            months,
            has_expenses,
        },
        CategoryBreakdown { totals },
    )
}
