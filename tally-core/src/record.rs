//! Transaction record types shared by the parser, the aggregator and the entry book

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RecordError;

/// Category label applied when a line or entry carries none.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Largest accepted amount. Sums of any realistic number of records stay finite.
pub const MAX_AMOUNT: f64 = 1e15;

/// Direction of a money movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Flow {
    Income,
    Expense,
}

impl Flow {
    /// Label used in the text format
    pub fn label(&self) -> &'static str {
        match self {
            Flow::Income => "Income",
            Flow::Expense => "Expense",
        }
    }

    /// Exact match on the text-format labels. Anything else is `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Income" => Some(Flow::Income),
            "Expense" => Some(Flow::Expense),
            _ => None,
        }
    }

    /// Sign applied when netting: +1 for income, -1 for expense
    pub fn sign(&self) -> f64 {
        match self {
            Flow::Income => 1.0,
            Flow::Expense => -1.0,
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One financial event.
///
/// `amount` is the unsigned magnitude as entered; the sign convention is applied
/// by [`TransactionRecord::signed_amount`] when netting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawRecord")]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub flow: Flow,
    pub amount: f64,
    pub category: String,
}

impl TransactionRecord {
    /// Build a record, enforcing the amount invariant.
    ///
    /// A blank category becomes [`UNCATEGORIZED`].
    pub fn new(
        date: NaiveDate,
        flow: Flow,
        amount: f64,
        category: impl Into<String>,
    ) -> Result<Self, RecordError> {
        if !amount.is_finite() {
            return Err(RecordError::NonFiniteAmount(amount));
        }
        if amount < 0.0 {
            return Err(RecordError::NegativeAmount(amount));
        }
        if amount > MAX_AMOUNT {
            return Err(RecordError::AmountTooLarge(amount));
        }

        Ok(Self {
            date,
            flow,
            // -0.0 compares equal to 0.0 but prints as "-0.00"
            amount: amount + 0.0,
            category: normalize_category(category.into()),
        })
    }

    /// +amount for income, -amount for expense
    pub fn signed_amount(&self) -> f64 {
        self.flow.sign() * self.amount
    }

    pub fn is_income(&self) -> bool {
        self.flow == Flow::Income
    }

    pub fn is_expense(&self) -> bool {
        self.flow == Flow::Expense
    }
}

// Deserialized records go through the same checks as `TransactionRecord::new`
#[derive(Deserialize)]
struct RawRecord {
    date: NaiveDate,
    flow: Flow,
    amount: f64,
    #[serde(default)]
    category: String,
}

impl TryFrom<RawRecord> for TransactionRecord {
    type Error = RecordError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        TransactionRecord::new(raw.date, raw.flow, raw.amount, raw.category)
    }
}

fn normalize_category(category: String) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        UNCATEGORIZED.to_string()
    } else if trimmed.len() == category.len() {
        category
    } else {
        trimmed.to_string()
    }
}
