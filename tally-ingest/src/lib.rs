//! tally-ingest: parsing and writing the line-oriented transaction text format,
//! plus the manual entry book.

pub mod dates;
pub mod entries;
pub mod error;
pub mod parser;
pub mod types;
pub mod writer;

pub use entries::EntryBook;
pub use error::{EntryError, IngestError};
pub use parser::{parse_bytes, parse_line, parse_lines, parse_text};
pub use types::{FlowPolicy, ParseOptions, ParsedBatch, RejectedLine};
pub use writer::{HEADER, format_record, write_records};
