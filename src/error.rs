//! Error types for graph construction and execution.
//!
//! Construction errors ([`GraphError::InvalidOperator`]) are immediate and
//! local to the offending `add_*` call; no operator is appended. Execution
//! errors abort the current run and leave the graph uncomputed, so callers
//! may fix the cause and retry.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Everything that can go wrong while building or running a computation graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An operator was constructed with arguments that fail its preconditions,
    /// such as an empty key tuple for sort or reduce.
    #[error("invalid operator: {0}")]
    InvalidOperator(String),

    /// The graph was run without a usable input binding.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A join executed against a dependency graph that has not been computed.
    #[error("dependency graph must be computed before use in a join")]
    GraphNotReady,

    /// The result was requested before a successful run.
    #[error("graph must be run before its result can be read")]
    NotComputed,

    /// A record is missing a field named in a key tuple.
    #[error("record is missing key field {field:?}")]
    MissingField {
        /// The field name that was expected but absent.
        field: String,
    },

    /// An I/O failure on a record source or sink.
    #[error("{}: {}", path.display(), source)]
    Io {
        /// The source or sink path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A source line that does not parse as a JSON record.
    #[error("{}:{}: invalid record: {}", path.display(), line, source)]
    Parse {
        /// The source path.
        path: PathBuf,
        /// 1-based line number of the offending line.
        line: usize,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
