//! Reading and writing transaction files for the entry book.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tally_core::TransactionRecord;
use tally_ingest::{EntryBook, HEADER, ParseOptions, ParsedBatch, format_record, parse_bytes};
use tracing::{debug, info};

/// Read and parse a transaction file
pub fn read_batch(path: &Path, options: ParseOptions) -> Result<ParsedBatch> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let batch =
        parse_bytes(&bytes, options).with_context(|| format!("parse {}", path.display()))?;
    info!(
        "Read {} records ({} rejected) from {}",
        batch.records.len(),
        batch.rejects.len(),
        path.display()
    );
    Ok(batch)
}

/// Load a file into an entry book. A missing file is an empty book.
pub fn load_book(path: &Path, options: ParseOptions) -> Result<(EntryBook, ParsedBatch)> {
    let mut book = EntryBook::new();
    if !path.exists() {
        debug!("{} does not exist yet, starting empty", path.display());
        return Ok((book, ParsedBatch::default()));
    }
    let batch = read_batch(path, options)?;
    book.extend_from(&batch);
    Ok((book, batch))
}

/// Append one record as the last line of a file, leaving existing lines as they are.
/// A missing or empty file gets the header first.
pub fn append_record(path: &Path, record: &TransactionRecord) -> Result<()> {
    let existing = if path.exists() {
        fs::read(path).with_context(|| format!("read {}", path.display()))?
    } else {
        Vec::new()
    };

    let mut out = String::new();
    if existing.is_empty() {
        out.push_str(HEADER);
        out.push('\n');
    } else if existing.last() != Some(&b'\n') {
        out.push('\n');
    }
    out.push_str(&format_record(record));
    out.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    file.write_all(out.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    debug!("Appended 1 record to {}", path.display());
    Ok(())
}

/// Rewrite a file from the book's contents
pub fn save_book(path: &Path, book: &EntryBook) -> Result<()> {
    fs::write(path, book.to_text()).with_context(|| format!("write {}", path.display()))?;
    debug!("Saved {} records to {}", book.len(), path.display());
    Ok(())
}
