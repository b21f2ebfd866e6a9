//! Word count over a tiny in-memory corpus.
//!
//! Builds a two-operator graph: a tokenizing mapper and a counting reducer.
//!
//! Run with: cargo run --example word_count

use anyhow::Result;
use regex::Regex;
use tableflow::{ComputationGraph, Record, Value, record};

fn main() -> Result<()> {
    let corpus = vec![
        record!({"doc_id": 1, "text": "Hello hello world"}),
        record!({"doc_id": 2, "text": "Hello again, world"}),
        record!({"doc_id": 3, "text": "Goodbye"}),
    ];

    let g = ComputationGraph::new();

    let strip = Regex::new(r"[^A-Za-z0-9]")?;
    g.add_map(move |r: &Record| {
        let doc_id = r.get("doc_id").cloned().unwrap_or_default();
        let text = r.get("text").and_then(Value::as_str).unwrap_or_default();
        text.split_whitespace()
            .filter_map(|token| {
                let word = strip.replace_all(token, "").to_lowercase();
                (!word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic()))
                    .then(|| record!({"doc_id": doc_id.clone(), "word": word}))
            })
            .collect()
    });

    g.add_reduce(
        |bucket: &[Record]| {
            let word = bucket[0].get("word").cloned().unwrap_or_default();
            vec![record!({"word": word, "total": bucket.len()})]
        },
        "word",
    )?;

    g.bind_input(corpus);
    g.run()?;

    for record in g.result()? {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}
