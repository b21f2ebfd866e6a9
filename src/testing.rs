//! Testing utilities for tableflow graphs.
//!
//! This module provides what the crate's own integration tests use and what
//! downstream pipelines need to test themselves:
//!
//! - **Assertions**: compare result tables with expected records
//! - **Fixtures**: JSONL files on disk backed by a temp directory
//!
//! # Example
//!
//! ```
//! use tableflow::testing::*;
//! use tableflow::{ComputationGraph, record};
//!
//! # fn main() -> tableflow::Result<()> {
//! let fixture = JsonlFixture::new(&[r#"{"k":"b"}"#, r#"{"k":"a"}"#]);
//!
//! let g = ComputationGraph::new();
//! g.add_sort("k")?;
//! g.bind_input(fixture.path());
//! g.run()?;
//!
//! assert_tables_equal(&g.result()?, &[record!({"k": "a"}), record!({"k": "b"})]);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::io::jsonl;
use crate::record::{Record, Table, value_cmp};

/// Assert two tables are equal record-for-record, in order.
///
/// # Panics
/// On the first differing record, with its index and both values.
pub fn assert_tables_equal(actual: &[Record], expected: &[Record]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "table lengths differ: {} vs {} (actual: {actual:?})",
        actual.len(),
        expected.len(),
    );
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(a, e, "record {i} differs");
    }
}

/// Assert two tables contain the same records, ignoring order.
///
/// # Panics
/// If the multisets of records differ.
pub fn assert_tables_unordered_equal(actual: &[Record], expected: &[Record]) {
    let serialize = |r: &Record| serde_json::to_string(r).expect("serialize record");
    let mut a: Vec<String> = actual.iter().map(serialize).collect();
    let mut e: Vec<String> = expected.iter().map(serialize).collect();
    a.sort();
    e.sort();
    assert_eq!(a, e, "tables differ as multisets");
}

/// Sort a table by one field, for deterministic comparisons in tests.
/// Records without the field sort first.
#[must_use]
pub fn sorted_by(mut table: Table, field: &str) -> Table {
    table.sort_by(|x, y| match (x.get(field), y.get(field)) {
        (Some(a), Some(b)) => value_cmp(a, b),
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    table
}

/// A JSONL file in a fresh temp directory, removed on drop.
///
/// Deleting the backing file mid-test ([`JsonlFixture::delete`]) is how the
/// memoization tests prove a cached graph does not re-read its source.
pub struct JsonlFixture {
    _dir: TempDir,
    path: PathBuf,
}

impl JsonlFixture {
    /// Write raw JSONL lines to a fresh fixture file.
    ///
    /// # Panics
    /// If the temp directory or file cannot be created.
    #[must_use]
    pub fn new(lines: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("fixture.jsonl");
        let mut body = lines.join("\n");
        body.push('\n');
        std::fs::write(&path, body).expect("write fixture");
        Self { _dir: dir, path }
    }

    /// Serialize a table to a fresh fixture file.
    ///
    /// # Panics
    /// If the temp directory or file cannot be created.
    #[must_use]
    pub fn from_table(table: &[Record]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("fixture.jsonl");
        jsonl::write_jsonl(&path, table).expect("write fixture");
        Self { _dir: dir, path }
    }

    /// Path to the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the backing file; a graph that re-reads this source afterwards
    /// will fail.
    pub fn delete(&self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
