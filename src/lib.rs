//! # Tableflow
//!
//! A **MapReduce-style computation graph engine** for Rust. Tableflow lets
//! you declaratively build a DAG of relational operators over tables of
//! JSON records, then execute the graph against one or more inputs and
//! collect or write a result table.
//!
//! ## Quick Start
//!
//! ```
//! use tableflow::{ComputationGraph, Record, record};
//!
//! # fn main() -> tableflow::Result<()> {
//! let g = ComputationGraph::new();
//!
//! // Tokenize each document into one record per word.
//! g.add_map(|r: &Record| {
//!     let text = r.get("text").and_then(|v| v.as_str()).unwrap_or_default();
//!     text.split_whitespace()
//!         .map(|w| record!({"word": w.to_lowercase()}))
//!         .collect()
//! });
//!
//! // Count occurrences per word.
//! g.add_reduce(
//!     |bucket: &[Record]| {
//!         let word = bucket[0].get("word").cloned().unwrap_or_default();
//!         vec![record!({"word": word, "total": bucket.len()})]
//!     },
//!     "word",
//! )?;
//!
//! g.bind_input(vec![record!({"text": "to be or not to be"})]);
//! g.run()?;
//! assert_eq!(g.result()?.len(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Records and tables
//!
//! A [`Record`] is an ordered mapping from string field names to JSON
//! values ([`Value`]); a [`Table`] is an ordered sequence of records. The
//! [`record!`] macro builds a record from a JSON object literal. Sort,
//! reduce, and join address records through a [`KeyTuple`] of field names;
//! every record reaching those operators must contain every named field.
//!
//! ### Operators
//!
//! A graph is an ordered chain of five operators:
//!
//! - **map** -- a producing function applied per record, outputs
//!   concatenated in input order
//! - **sort** -- stable ascending lexicographic sort by a key tuple
//! - **fold** -- left-fold into a single state record
//! - **reduce** -- sort by a key tuple, bucket maximal runs of equal keys,
//!   produce records per bucket
//! - **join** -- sort-merge join against another graph's result, with
//!   `inner`, `left`, `right`, `outer`, and `cross` strategies
//!   ([`Strategy`]); non-key fields present on both sides are renamed
//!   `left_*` / `right_*` in the output
//!
//! Operators never mutate their input table, and each intermediate table is
//! fully materialized before the next operator runs.
//!
//! ### Graphs, dependencies, and memoization
//!
//! A [`ComputationGraph`] handle is cheaply cloneable and shareable: a
//! graph can feed several joins and serve as the upstream input of another
//! graph at the same time. [`run`](ComputationGraph::run) computes join
//! dependencies first (in registration order), then reads the primary
//! input -- a JSONL file, an in-memory table, or an upstream graph
//! ([`Input`]) -- and applies the operators in order.
//!
//! A successful run caches its result keyed by the input binding. Running
//! again with an equal binding does no work; rebinding to a different
//! source invalidates the cache. Dependency runs are memoized by the same
//! rule, so a subgraph shared by several consumers is computed once.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result`] with [`GraphError`]:
//! construction-time precondition failures (`InvalidOperator`), running an
//! unbound graph (`InvalidInput`), reading a result before a run
//! (`NotComputed`), records missing key fields (`MissingField`), and
//! source/sink failures (`Io`, `Parse`) with path and line context.
//! A failed run leaves the graph uncomputed; fix the cause and rerun.
//!
//! ## I/O
//!
//! The canonical record source and sink is line-delimited JSON
//! ([`io::jsonl`]): one JSON object per line, blank lines skipped on read.
//! [`write_output`](ComputationGraph::write_output) serializes a computed
//! result the same way.
//!
//! ## Testing Your Pipelines
//!
//! The [`testing`] module ships table assertions and temp-file JSONL
//! fixtures; see its docs for an example.

pub mod error;
pub mod graph;
pub mod io;
mod join;
pub mod op;
pub mod record;
pub mod testing;
pub mod utils;

pub use error::{GraphError, Result};
pub use graph::{ComputationGraph, Input};
pub use op::{Folder, Mapper, Reducer, Strategy};
pub use record::{KeyTuple, Record, Table, Value, value_cmp};
pub use utils::OrdF64;

// For the record! macro; not public API.
#[doc(hidden)]
pub use serde_json;

/// Build a [`Record`] from a JSON object literal.
///
/// Accepts everything [`serde_json::json!`] accepts in object position,
/// including expressions as field values.
///
/// ```
/// use tableflow::record;
///
/// let total = 3;
/// let r = record!({"word": "hello", "total": total});
/// assert_eq!(r.get("total").and_then(|v| v.as_i64()), Some(3));
/// ```
///
/// # Panics
/// If the literal is not a JSON object.
#[macro_export]
macro_rules! record {
    ($($json:tt)+) => {
        $crate::Record::from_value($crate::serde_json::json!($($json)+))
            .expect("record! takes a JSON object literal")
    };
}
