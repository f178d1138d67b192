//! Caller-owned list of manually entered transactions.
//!
//! The book is append-only apart from [`EntryBook::clear`]. It owns no I/O:
//! callers export it with [`EntryBook::to_text`] and persist the text themselves.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_core::{Flow, TransactionRecord};

use crate::error::EntryError;
use crate::parser::FIELD_DELIMITER;
use crate::types::ParsedBatch;
use crate::writer::write_records;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryBook {
    entries: Vec<TransactionRecord>,
}

impl EntryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one transaction after validating it.
    ///
    /// The amount must be strictly positive and the category must survive a
    /// round trip through the text format.
    pub fn add(
        &mut self,
        date: NaiveDate,
        flow: Flow,
        amount: f64,
        category: &str,
    ) -> Result<&TransactionRecord, EntryError> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(EntryError::NonPositiveAmount(amount));
        }
        if category.contains(FIELD_DELIMITER) {
            return Err(EntryError::DelimiterInCategory(category.to_string()));
        }

        let record = TransactionRecord::new(date, flow, amount, category)?;
        self.entries.push(record);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Append records from a parsed file; rejects are left to the caller.
    pub fn extend_from(&mut self, batch: &ParsedBatch) {
        self.entries.extend(batch.records.iter().cloned());
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export in the transaction text format
    pub fn to_text(&self) -> String {
        write_records(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_text;
    use crate::types::ParseOptions;
    use tally_core::RecordError;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_add_and_clear() {
        let mut book = EntryBook::new();
        assert!(book.is_empty());

        book.add(day(1), Flow::Income, 2500.0, "Salary").unwrap();
        let rec = book.add(day(2), Flow::Expense, 42.1, "").unwrap();
        assert_eq!(rec.category, "Uncategorized");
        assert_eq!(book.len(), 2);

        book.clear();
        assert!(book.is_empty());
        assert_eq!(book.to_text(), "Date, Type, Amount, Category\n");
    }

    #[test]
    fn test_add_rejects_non_positive_amounts() {
        let mut book = EntryBook::new();
        assert_eq!(
            book.add(day(1), Flow::Expense, 0.0, "Food"),
            Err(EntryError::NonPositiveAmount(0.0))
        );
        assert!(book.add(day(1), Flow::Expense, -3.0, "Food").is_err());
        assert!(book.add(day(1), Flow::Expense, f64::NAN, "Food").is_err());
        assert!(matches!(
            book.add(day(1), Flow::Expense, 1e300, "Food"),
            Err(EntryError::InvalidRecord(RecordError::AmountTooLarge(_)))
        ));
        assert!(book.is_empty());
    }

    #[test]
    fn test_add_rejects_delimiter_in_category() {
        let mut book = EntryBook::new();
        let err = book.add(day(1), Flow::Expense, 5.0, "Food, Drinks").unwrap_err();
        assert!(matches!(err, EntryError::DelimiterInCategory(_)));
        assert!(book.is_empty());
    }

    #[test]
    fn test_export_then_reload() {
        let mut book = EntryBook::new();
        book.add(day(1), Flow::Income, 2500.0, "Salary").unwrap();
        book.add(day(3), Flow::Expense, 64.25, "Groceries").unwrap();

        let batch = parse_text(&book.to_text(), ParseOptions::default());
        let mut reloaded = EntryBook::new();
        reloaded.extend_from(&batch);
        assert_eq!(reloaded, book);
    }
}
