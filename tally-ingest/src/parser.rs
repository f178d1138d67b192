//! Line-oriented transaction text parser.
//!
//! Expected shape (first line is always treated as a header):
//!   Date, Type, Amount, Category
//!   2024-01-05, Income, 5000, Salary
//!   2024-01-10, Expense, 1200, Rent
//!
//! Fields are separated by ", ". The category column is optional and trailing
//! commas/spaces are tolerated. Bad lines are collected as rejects, never fatal.

use tally_core::{Flow, MAX_AMOUNT, RejectReason, TransactionRecord};
use tracing::{debug, warn};

use crate::dates::parse_date;
use crate::error::IngestError;
use crate::types::{FlowPolicy, ParseOptions, ParsedBatch, RejectedLine};

/// Separator between fields on a line
pub const FIELD_DELIMITER: &str = ", ";

/// Parse already-split lines. The first line is skipped as a header.
pub fn parse_lines<I, S>(lines: I, options: ParseOptions) -> ParsedBatch
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut batch = ParsedBatch::default();

    for (idx, line) in lines.into_iter().enumerate() {
        // Header detection is positional
        if idx == 0 {
            continue;
        }

        let line = line.as_ref();
        match parse_line(line, options) {
            Ok(record) => batch.records.push(record),
            Err(reason) => {
                warn!("Skipping line {}: {} ({})", idx + 1, reason, line);
                batch.rejects.push(RejectedLine {
                    line_number: idx + 1,
                    line: line.to_string(),
                    reason,
                });
            }
        }
    }

    debug!(
        "Parsed {} transactions, rejected {} lines",
        batch.records.len(),
        batch.rejects.len()
    );
    batch
}

/// Parse a whole text blob
pub fn parse_text(text: &str, options: ParseOptions) -> ParsedBatch {
    parse_lines(text.lines(), options)
}

/// Parse uploaded file bytes. Only invalid UTF-8 fails the whole input.
pub fn parse_bytes(bytes: &[u8], options: ParseOptions) -> Result<ParsedBatch, IngestError> {
    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ok(parse_text(text, options))
}

/// Parse a single data line into a record
pub fn parse_line(line: &str, options: ParseOptions) -> Result<TransactionRecord, RejectReason> {
    let cleaned = clean_line(line);
    let parts: Vec<&str> = cleaned.split(FIELD_DELIMITER).collect();
    if parts.len() < 3 {
        return Err(RejectReason::MalformedLine);
    }

    let date = parse_date(parts[0]).ok_or(RejectReason::InvalidDate)?;
    let amount = parse_amount(parts[2]).ok_or(RejectReason::InvalidAmount)?;
    let flow = parse_flow(parts[1].trim(), options.flow_policy)?;
    let category = parts.get(3).map(|c| c.trim()).unwrap_or("");

    TransactionRecord::new(date, flow, amount, category).map_err(|_| RejectReason::InvalidAmount)
}

fn clean_line(line: &str) -> &str {
    line.trim()
        .trim_end_matches(|c: char| c == ',' || c.is_whitespace())
}

fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let amount: f64 = s.parse().ok()?;
    (amount.is_finite() && (0.0..=MAX_AMOUNT).contains(&amount)).then_some(amount)
}

fn parse_flow(label: &str, policy: FlowPolicy) -> Result<Flow, RejectReason> {
    match (Flow::from_label(label), policy) {
        (Some(flow), _) => Ok(flow),
        (None, FlowPolicy::Strict) => Err(RejectReason::UnknownFlow),
        (None, FlowPolicy::Lenient) => {
            warn!("Unrecognized type '{}', treating as Expense", label);
            Ok(Flow::Expense)
        }
    }
}
