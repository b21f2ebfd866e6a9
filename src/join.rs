//! The sort-merge join and its five strategies.
//!
//! A join combines the primary table (`left`) with a dependency graph's
//! result (`right`) on a key tuple. Collision handling assumes homogeneous
//! schemas within each side: the field sets of the two first records decide
//! which names collide. Field names present on both sides and not part of
//! the key tuple are renamed `left_*` / `right_*` in every record of the
//! respective side before any records are combined, and that renaming is
//! part of the output.
//!
//! The keyed strategies share one pass: tag each record with its side,
//! stable-sort the combined sequence by the key tuple (lefts before rights
//! within equal keys), bucket maximal runs of equal keys, and emit per
//! bucket. Two-sided buckets emit the left x right cartesian product; a
//! one-sided bucket is dropped, or padded with nulls for the other side's
//! exclusive fields, depending on the strategy. Cross ignores the key tuple
//! entirely and pairs every left record with every right record in input
//! order.
//!
//! Merged and padded records are emitted with fields in ascending name
//! order, and the right side wins any collision the rename pass left behind.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::op::Strategy;
use crate::record::{KeyTuple, Record, Table, Value, key_cmp};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Join `left` with `right` on `keys` under `strategy`.
///
/// The empty-key-tuple cases are settled at graph construction: outer is
/// coerced to cross, the other keyed strategies are rejected, so `keys` is
/// non-empty whenever a keyed strategy reaches this point.
pub(crate) fn execute(
    mut left: Table,
    mut right: Table,
    keys: &KeyTuple,
    strategy: Strategy,
) -> Result<Table> {
    rename_collisions(&mut left, &mut right, keys);

    if strategy == Strategy::Cross {
        return Ok(cross(&left, &right));
    }

    let left_fields = field_set(left.first());
    let right_fields = field_set(right.first());

    let mut rows: Vec<(Vec<Value>, Side, Record)> = Vec::with_capacity(left.len() + right.len());
    for record in left {
        let key = record.key_values(keys)?;
        rows.push((key, Side::Left, record));
    }
    for record in right {
        let key = record.key_values(keys)?;
        rows.push((key, Side::Right, record));
    }
    // Stable sort of lefts-then-rights: within equal keys, left records keep
    // their input order and precede right records.
    rows.sort_by(|a, b| key_cmp(&a.0, &b.0));

    let mut out = Table::new();
    let mut start = 0;
    while start < rows.len() {
        let mut end = start + 1;
        // Bucket with the sort's total order, not structural equality, so
        // keys that tie under value_cmp land in one bucket.
        while end < rows.len() && key_cmp(&rows[end].0, &rows[start].0) == Ordering::Equal {
            end += 1;
        }
        emit_bucket(&rows[start..end], strategy, &left_fields, &right_fields, &mut out);
        start = end;
    }
    Ok(out)
}

/// Emit the output records for one bucket of equal-key rows.
fn emit_bucket(
    bucket: &[(Vec<Value>, Side, Record)],
    strategy: Strategy,
    left_fields: &BTreeSet<String>,
    right_fields: &BTreeSet<String>,
    out: &mut Table,
) {
    let lefts: Vec<&Record> = bucket
        .iter()
        .filter(|(_, side, _)| *side == Side::Left)
        .map(|(_, _, record)| record)
        .collect();
    let rights: Vec<&Record> = bucket
        .iter()
        .filter(|(_, side, _)| *side == Side::Right)
        .map(|(_, _, record)| record)
        .collect();

    if !lefts.is_empty() && !rights.is_empty() {
        for l in &lefts {
            for r in &rights {
                out.push(merge_ascending(l, r));
            }
        }
    } else if rights.is_empty() {
        if matches!(strategy, Strategy::Left | Strategy::Outer) {
            for l in &lefts {
                out.push(pad_nulls(l, right_fields.difference(left_fields)));
            }
        }
    } else if matches!(strategy, Strategy::Right | Strategy::Outer) {
        for r in &rights {
            out.push(pad_nulls(r, left_fields.difference(right_fields)));
        }
    }
}

/// Rename non-key fields that appear on both sides to `left_*` / `right_*`.
///
/// Collision detection inspects the first record of each side (homogeneous
/// schemas are an advertised precondition); an empty side contributes an
/// empty field set. Iteration is in ascending field-name order, so the
/// rename pass is deterministic.
fn rename_collisions(left: &mut Table, right: &mut Table, keys: &KeyTuple) {
    let left_fields = field_set(left.first());
    let right_fields = field_set(right.first());
    let common: Vec<&String> = left_fields
        .intersection(&right_fields)
        .filter(|field| !keys.contains(field.as_str()))
        .collect();

    for field in common {
        let left_name = format!("left_{field}");
        for record in left.iter_mut() {
            record.rename(field, left_name.clone());
        }
        let right_name = format!("right_{field}");
        for record in right.iter_mut() {
            record.rename(field, right_name.clone());
        }
    }
}

/// The full cartesian product, left outer loop, right inner loop.
///
/// Each output merges the right record over a copy of the left record; the
/// input tables are never mutated, so a left table reused by another graph
/// keeps its original records.
fn cross(left: &[Record], right: &[Record]) -> Table {
    let mut out = Table::with_capacity(left.len().saturating_mul(right.len()));
    for l in left {
        for r in right {
            out.push(merge_ascending(l, r));
        }
    }
    out
}

fn field_set(first: Option<&Record>) -> BTreeSet<String> {
    first
        .map(|record| record.fields().map(str::to_owned).collect())
        .unwrap_or_default()
}

/// Pointwise merge of one left and one right record; right-side fields win
/// residual collisions and the output fields ascend by name.
fn merge_ascending(left: &Record, right: &Record) -> Record {
    let mut merged: BTreeMap<String, Value> = left
        .iter()
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();
    for (field, value) in right.iter() {
        merged.insert(field.clone(), value.clone());
    }
    merged.into_iter().collect()
}

/// A one-sided record padded with nulls for the other side's exclusive
/// fields, with output fields ascending by name.
fn pad_nulls<'a>(record: &Record, missing: impl Iterator<Item = &'a String>) -> Record {
    let mut padded: BTreeMap<String, Value> = record
        .iter()
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();
    for field in missing {
        padded.insert(field.clone(), Value::Null);
    }
    padded.into_iter().collect()
}
