//! tally-core: data model for the transaction pipeline

pub mod error;
pub mod month;
pub mod record;

pub use error::{RecordError, RejectReason};
pub use month::MonthKey;
pub use record::{Flow, MAX_AMOUNT, TransactionRecord, UNCATEGORIZED};
