//! Serializer for the transaction text format (the inverse of the parser).

use tally_core::TransactionRecord;

use crate::parser::FIELD_DELIMITER;

/// Header written at the top of every exported file
pub const HEADER: &str = "Date, Type, Amount, Category";

/// Render one record as a data line (no trailing newline)
pub fn format_record(record: &TransactionRecord) -> String {
    [
        record.date.format("%Y-%m-%d").to_string(),
        record.flow.label().to_string(),
        format!("{:.2}", record.amount),
        record.category.clone(),
    ]
    .join(FIELD_DELIMITER)
}

/// Render records as a complete file: header, then one newline-terminated row each
pub fn write_records(records: &[TransactionRecord]) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + records.len() * 40);
    out.push_str(HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&format_record(record));
        out.push('\n');
    }
    out
}
