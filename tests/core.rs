// tests/core.rs
//
// Construction preconditions: operator arguments, join strategies, and
// input binding kinds.

use std::str::FromStr;

use anyhow::Result;
use tableflow::{ComputationGraph, GraphError, KeyTuple, Record, Strategy, record};

#[test]
fn add_sort_accepts_single_name_and_tuples() -> Result<()> {
    let g = ComputationGraph::new();
    g.add_sort("key")?;
    g.add_sort(["key"])?;
    g.add_sort(["key1", "key2"])?;
    g.add_sort(vec!["key1".to_string(), "key2".to_string()])?;
    Ok(())
}

#[test]
fn add_sort_rejects_empty_key_tuple() {
    let g = ComputationGraph::new();
    let err = g.add_sort(KeyTuple::empty()).unwrap_err();
    assert!(matches!(err, GraphError::InvalidOperator(_)), "got {err}");
}

#[test]
fn add_reduce_rejects_empty_key_tuple() {
    let g = ComputationGraph::new();
    let err = g
        .add_reduce(|bucket: &[Record]| bucket.to_vec(), KeyTuple::empty())
        .unwrap_err();
    assert!(matches!(err, GraphError::InvalidOperator(_)), "got {err}");
}

#[test]
fn add_join_rejects_empty_keys_for_keyed_strategies() {
    for strategy in [Strategy::Inner, Strategy::Left, Strategy::Right] {
        let g = ComputationGraph::new();
        let dep = ComputationGraph::new();
        let err = g
            .add_join(&dep, "dep.jsonl", KeyTuple::empty(), strategy)
            .unwrap_err();
        assert!(
            matches!(err, GraphError::InvalidOperator(_)),
            "{strategy}: got {err}"
        );
    }
}

#[test]
fn add_join_accepts_empty_keys_for_outer_and_cross() -> Result<()> {
    let g = ComputationGraph::new();
    let dep = ComputationGraph::new();
    g.add_join(&dep, "dep.jsonl", KeyTuple::empty(), Strategy::Outer)?;
    g.add_join(&dep, "dep.jsonl", KeyTuple::empty(), Strategy::Cross)?;
    Ok(())
}

#[test]
fn failed_add_appends_no_operator() -> Result<()> {
    let g = ComputationGraph::new();
    // A rejected sort must not leave a stray operator behind; the graph
    // still runs as identity.
    g.add_sort(KeyTuple::empty()).unwrap_err();
    g.bind_input(vec![record!({"k": 1})]);
    g.run()?;
    assert_eq!(g.result()?, vec![record!({"k": 1})]);
    Ok(())
}

#[test]
fn strategy_parses_all_five_names() -> Result<()> {
    for (name, expected) in [
        ("inner", Strategy::Inner),
        ("left", Strategy::Left),
        ("right", Strategy::Right),
        ("outer", Strategy::Outer),
        ("cross", Strategy::Cross),
    ] {
        assert_eq!(Strategy::from_str(name)?, expected);
        assert_eq!(expected.to_string(), name);
    }
    Ok(())
}

#[test]
fn strategy_rejects_unknown_names() {
    for name in ["kek", "INNER", "full", ""] {
        let err = Strategy::from_str(name).unwrap_err();
        assert!(matches!(err, GraphError::InvalidOperator(_)), "{name:?}");
    }
}

#[test]
fn run_without_binding_is_invalid_input() {
    let g = ComputationGraph::new();
    g.add_map(|r: &Record| vec![r.clone()]);
    let err = g.run().unwrap_err();
    assert!(matches!(err, GraphError::InvalidInput(_)), "got {err}");
}

#[test]
fn result_and_write_before_run_are_not_computed() {
    let g = ComputationGraph::new();
    assert!(matches!(g.result().unwrap_err(), GraphError::NotComputed));
    assert!(matches!(
        g.write_output("out.jsonl").unwrap_err(),
        GraphError::NotComputed
    ));
    assert!(!g.is_computed());
}

#[test]
fn bind_input_accepts_paths_tables_and_graphs() -> Result<()> {
    let g = ComputationGraph::new();
    g.bind_input("input.jsonl");
    g.bind_input(std::path::PathBuf::from("input.jsonl"));
    g.bind_input(vec![record!({"k": 1})]);
    let upstream = ComputationGraph::new();
    g.bind_input(&upstream);
    g.bind_input(upstream);
    Ok(())
}
