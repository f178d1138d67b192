use serde::{Deserialize, Serialize};
use tally_core::{RejectReason, TransactionRecord};

/// How the Type column is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowPolicy {
    /// Only the literal "Income" is income; every other label counts as an expense.
    /// A "Refund" line therefore adds to the expense column and the category
    /// breakdown rather than sitting in a column of its own.
    #[default]
    Lenient,
    /// Only "Income" and "Expense" are accepted; other labels reject the line.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub flow_policy: FlowPolicy,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            flow_policy: FlowPolicy::Strict,
        }
    }
}

/// A skipped input line and why it was skipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedLine {
    /// 1-based position in the source text, header included
    pub line_number: usize,
    pub line: String,
    pub reason: RejectReason,
}

impl std::fmt::Display for RejectedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {} ({})", self.line_number, self.reason, self.line)
    }
}

/// Normalized output of the parser: accepted records in input order plus rejects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedBatch {
    pub records: Vec<TransactionRecord>,
    pub rejects: Vec<RejectedLine>,
}

impl ParsedBatch {
    pub fn is_clean(&self) -> bool {
        self.rejects.is_empty()
    }
}
