//! The operator sum type and the map, sort, fold, and reduce implementations.
//!
//! Every operator is one variant of [`Operator`] with a single
//! `apply(table) -> table` operation; the graph interprets a linear chain of
//! them, fully materializing each output before the next operator runs. The
//! join variant lives in its own module ([`crate::join`]) and pulls its right
//! side from a dependency graph's cached result.
//!
//! User callables are typed adapters rather than introspected functions: a
//! mapper or reducer *produces* zero or more records per call, a folder is a
//! scalar function of a record and the running state. Arity and
//! producer-vs-scalar preconditions are carried by the `Fn` bounds instead
//! of runtime checks.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{GraphError, Result};
use crate::graph::ComputationGraph;
use crate::join;
use crate::record::{KeyTuple, Record, Table, Value, key_cmp};

/// A user mapper: a producing function of one record.
pub type Mapper = Box<dyn Fn(&Record) -> Vec<Record> + Send + Sync>;

/// A user folder: a scalar function of a record and the running state.
pub type Folder = Box<dyn Fn(&Record, Record) -> Record + Send + Sync>;

/// A user reducer: a producing function over one bucket of records.
pub type Reducer = Box<dyn Fn(&[Record]) -> Vec<Record> + Send + Sync>;

/// How a join combines the primary table with a dependency graph's result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Keep only key matches.
    Inner,
    /// Keep every left record, padding missing right fields with nulls.
    Left,
    /// Keep every right record, padding missing left fields with nulls.
    Right,
    /// Keep every record from either side, padding the missing side.
    Outer,
    /// Ignore keys and emit the full cartesian product.
    Cross,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Inner => "inner",
            Strategy::Left => "left",
            Strategy::Right => "right",
            Strategy::Outer => "outer",
            Strategy::Cross => "cross",
        })
    }
}

impl FromStr for Strategy {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inner" => Ok(Strategy::Inner),
            "left" => Ok(Strategy::Left),
            "right" => Ok(Strategy::Right),
            "outer" => Ok(Strategy::Outer),
            "cross" => Ok(Strategy::Cross),
            other => Err(GraphError::InvalidOperator(format!(
                "unsupported join strategy {other:?}"
            ))),
        }
    }
}

/// One node in a graph's operator chain.
pub(crate) enum Operator {
    Map(Mapper),
    Sort(KeyTuple),
    Fold { folder: Folder, init: Record },
    Reduce { reducer: Reducer, keys: KeyTuple },
    Join { on: ComputationGraph, keys: KeyTuple, strategy: Strategy },
}

impl Operator {
    /// Apply the operator to a fully materialized table, producing a fresh
    /// output table.
    pub(crate) fn apply(&self, table: Table) -> Result<Table> {
        match self {
            Operator::Map(mapper) => Ok(table.iter().flat_map(|r| mapper(r)).collect()),
            Operator::Sort(keys) => sort_table(table, keys),
            Operator::Fold { folder, init } => {
                // The stored initial state is cloned per run so repeated runs
                // of the same graph stay pure.
                let state = table.iter().fold(init.clone(), |state, r| folder(r, state));
                Ok(vec![state])
            }
            Operator::Reduce { reducer, keys } => reduce(table, reducer, keys),
            Operator::Join { on, keys, strategy } => {
                let right = on.result().map_err(|_| GraphError::GraphNotReady)?;
                join::execute(table, right, keys, *strategy)
            }
        }
    }
}

/// Decorate each record with its projected key tuple, erroring on the first
/// record that lacks a key field.
pub(crate) fn decorate(table: Table, keys: &KeyTuple) -> Result<Vec<(Vec<Value>, Record)>> {
    table
        .into_iter()
        .map(|record| {
            let key = record.key_values(keys)?;
            Ok((key, record))
        })
        .collect()
}

/// Stable ascending lexicographic sort by a key tuple.
pub(crate) fn sort_table(table: Table, keys: &KeyTuple) -> Result<Table> {
    let mut rows = decorate(table, keys)?;
    rows.sort_by(|a, b| key_cmp(&a.0, &b.0));
    Ok(rows.into_iter().map(|(_, record)| record).collect())
}

/// Sort by the key tuple, bucket maximal runs of equal key tuples, and call
/// the reducer once per bucket.
fn reduce(table: Table, reducer: &Reducer, keys: &KeyTuple) -> Result<Table> {
    let mut rows = decorate(table, keys)?;
    rows.sort_by(|a, b| key_cmp(&a.0, &b.0));

    let mut out = Table::new();
    let mut bucket: Vec<Record> = Vec::new();
    let mut bucket_key: Option<Vec<Value>> = None;
    for (key, record) in rows {
        // Bucket boundaries use the same total order as the sort, so an
        // integer and a float representation of one key value stay in one
        // bucket.
        match &bucket_key {
            Some(k) if key_cmp(k, &key) == Ordering::Equal => bucket.push(record),
            _ => {
                if !bucket.is_empty() {
                    out.extend(reducer(&bucket));
                }
                bucket.clear();
                bucket.push(record);
                bucket_key = Some(key);
            }
        }
    }
    // The last run of equal keys still owes its reducer call.
    if !bucket.is_empty() {
        out.extend(reducer(&bucket));
    }
    Ok(out)
}
