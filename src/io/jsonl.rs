//! Line-delimited JSON record source and sink.
//!
//! Each non-blank line of a source file is one JSON object, decoded into a
//! [`Record`]; the sink writes one compact JSON object per line. Parse
//! errors carry the path and the 1-based line number.

use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{GraphError, Result};
use crate::record::{Record, Table};

fn io_err(path: &Path, source: std::io::Error) -> GraphError {
    GraphError::Io { path: path.to_path_buf(), source }
}

/// Read a JSONL file into a table.
///
/// Empty and whitespace-only lines are skipped; every other line must parse
/// as a JSON object.
///
/// # Errors
/// [`GraphError::Io`] if the file cannot be opened or read;
/// [`GraphError::Parse`] with the line number if a line is not a JSON
/// object.
pub fn read_jsonl(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| io_err(path, e))?;
    let reader = BufReader::new(f);

    let mut out = Table::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| io_err(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(&line).map_err(|e| GraphError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            source: e,
        })?;
        out.push(record);
    }
    Ok(out)
}

/// Write a table as JSONL, one compact JSON object per line.
/// Creates parent directories if needed.
///
/// # Returns
/// The number of records written.
///
/// # Errors
/// [`GraphError::Io`] if the file or its directories cannot be created or
/// any record fails to flush.
pub fn write_jsonl(path: impl AsRef<Path>, table: &[Record]) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).map_err(|e| io_err(path, e))?;
    }
    let f = File::create(path).map_err(|e| io_err(path, e))?;
    let mut w = BufWriter::new(f);

    for record in table {
        serde_json::to_writer(&mut w, record).map_err(|e| io_err(path, e.into()))?;
        w.write_all(b"\n").map_err(|e| io_err(path, e))?;
    }
    w.flush().map_err(|e| io_err(path, e))?;
    Ok(table.len())
}
