//! TF-IDF over a small corpus, built as four cooperating graphs.
//!
//! - `split_word` tokenizes the corpus into `{doc_id, word}` records
//! - `count_docs` folds the corpus into a single `{docs_count}` record
//! - `count_idf` counts, per word, how many documents contain it
//! - `calc_index` scores every `(doc, term)` pair and keeps the top three
//!   per term
//!
//! `split_word` feeds two consumers but is computed once; the scheduler
//! memoizes it on its binding.
//!
//! Run with: cargo run --example tfidf

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use regex::Regex;
use tableflow::{ComputationGraph, KeyTuple, OrdF64, Record, Strategy, Value, record};

fn main() -> Result<()> {
    let corpus: Arc<Vec<Record>> = Arc::new(vec![
        record!({"doc_id": 1, "text": "the quick brown fox jumped over the lazy dog"}),
        record!({"doc_id": 2, "text": "the lazy dog slept all day"}),
        record!({"doc_id": 3, "text": "a quick brown dog is a happy dog"}),
    ]);

    let split_word = ComputationGraph::new();
    let strip = Regex::new(r"[^A-Za-z0-9]")?;
    split_word.add_map(move |r: &Record| {
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

    let count_docs = ComputationGraph::new();
    count_docs.add_fold(
        |_: &Record, mut state: Record| {
            let n = state.get("docs_count").and_then(Value::as_i64).unwrap_or(0);
            state.insert("docs_count", n + 1);
            state
        },
        record!({"docs_count": 0}),
    );

    let count_idf = ComputationGraph::new();
    count_idf.add_reduce(
        |bucket: &[Record]| vec![bucket[0].clone()],
        ["doc_id", "word"],
    )?;
    count_idf.add_join(&count_docs, corpus.clone(), KeyTuple::empty(), Strategy::Outer)?;
    count_idf.add_reduce(
        |bucket: &[Record]| {
            let word = bucket[0].get("word").cloned().unwrap_or_default();
            let docs_count = bucket[0].get("docs_count").cloned().unwrap_or_default();
            vec![record!({
                "word": word,
                "docs_contain_word": bucket.len(),
                "docs_count": docs_count
            })]
        },
        "word",
    )?;
    count_idf.bind_input(&split_word);

    let calc_index = ComputationGraph::new();
    calc_index.add_reduce(term_frequency, "doc_id")?;
    calc_index.add_join(&count_idf, &split_word, "word", Strategy::Left)?;
    calc_index.add_reduce(invert_index, "word")?;

    split_word.bind_input(corpus.clone());
    calc_index.bind_input(&split_word);
    calc_index.run()?;

    for record in calc_index.result()? {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}

/// Per-document term frequency: one `{doc_id, word, tf}` record per
/// distinct word in the bucket's document.
fn term_frequency(bucket: &[Record]) -> Vec<Record> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for r in bucket {
        if let Some(word) = r.get("word").and_then(Value::as_str) {
            *counts.entry(word.to_owned()).or_default() += 1;
        }
    }
    let total: usize = counts.values().sum();
    let doc_id = bucket[0].get("doc_id").cloned().unwrap_or_default();
    counts
        .into_iter()
        .map(|(word, n)| {
            record!({"doc_id": doc_id.clone(), "word": word, "tf": n as f64 / total as f64})
        })
        .collect()
}

/// Score every `(doc, term)` pair with tf * ln(docs_count /
/// docs_contain_word) and keep the top three per term, descending.
fn invert_index(bucket: &[Record]) -> Vec<Record> {
    let mut scored: Vec<(Value, f64)> = bucket
        .iter()
        .map(|r| {
            let tf = r.get("tf").and_then(Value::as_f64).unwrap_or(0.0);
            let docs_count = r.get("docs_count").and_then(Value::as_f64).unwrap_or(0.0);
            let contains = r.get("docs_contain_word").and_then(Value::as_f64).unwrap_or(1.0);
            let doc_id = r.get("doc_id").cloned().unwrap_or_default();
            (doc_id, tf * (docs_count / contains).ln())
        })
        .collect();
    scored.sort_by(|a, b| OrdF64(b.1).cmp(&OrdF64(a.1)));

    let term = bucket[0].get("word").cloned().unwrap_or_default();
    let index: Vec<Value> = scored
        .iter()
        .take(3)
        .map(|(doc_id, score)| Value::Array(vec![doc_id.clone(), (*score).into()]))
        .collect();
    vec![record!({"term": term, "index": index})]
}
