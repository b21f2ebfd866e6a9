// tests/pipelines.rs
//
// End-to-end pipelines: word count and TF-IDF over a small corpus.

use std::collections::HashMap;

use anyhow::Result;
use regex::Regex;
use tableflow::testing::{JsonlFixture, assert_tables_equal};
use tableflow::{ComputationGraph, KeyTuple, OrdF64, Record, Strategy, Value, record};

/// Split a document's text into lowercase alphabetic tokens, one
/// `{doc_id, word}` record per token.
fn tokenizer(strip: Regex) -> impl Fn(&Record) -> Vec<Record> {
    move |r: &Record| {
        let doc_id = r.get("doc_id").cloned().unwrap_or_default();
        let text = r.get("text").and_then(Value::as_str).unwrap_or_default();
        text.split_whitespace()
            .filter_map(|token| {
                let word = strip.replace_all(token, "").to_lowercase();
                (!word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic()))
                    .then(|| record!({"doc_id": doc_id.clone(), "word": word}))
            })
            .collect()
    }
}

fn strip_regex() -> Regex {
    Regex::new(r"[^A-Za-z0-9]").expect("tokenizer regex")
}

#[test]
fn word_count_counts_occurrences_per_word() -> Result<()> {
    let corpus = JsonlFixture::new(&[
        r#"{"doc_id":1,"text":"Hello hello world"}"#,
        r#"{"doc_id":2,"text":"Hello"}"#,
    ]);

    let g = ComputationGraph::new();
    g.add_map(tokenizer(strip_regex()));
    g.add_reduce(
        |bucket: &[Record]| {
            let word = bucket[0].get("word").cloned().unwrap_or_default();
            vec![record!({"word": word, "total": bucket.len()})]
        },
        "word",
    )?;

    g.bind_input(corpus.path());
    g.run()?;
    assert_tables_equal(
        &g.result()?,
        &[
            record!({"word": "hello", "total": 3}),
            record!({"word": "world", "total": 1}),
        ],
    );
    Ok(())
}

/// Per-document term frequency: one `{doc_id, word, tf}` record per distinct
/// word of the bucket's document.
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

/// Collapse a bucket of equal `(doc_id, word)` token records to one record.
fn unique_pairs(bucket: &[Record]) -> Vec<Record> {
    let doc_id = bucket[0].get("doc_id").cloned().unwrap_or_default();
    let word = bucket[0].get("word").cloned().unwrap_or_default();
    vec![record!({"doc_id": doc_id, "word": word})]
}

/// Count how many documents contain the bucket's word.
fn docs_contain_word(bucket: &[Record]) -> Vec<Record> {
    let word = bucket[0].get("word").cloned().unwrap_or_default();
    let docs_count = bucket[0].get("docs_count").cloned().unwrap_or_default();
    vec![record!({
        "word": word,
        "docs_contain_word": bucket.len(),
        "docs_count": docs_count
    })]
}

/// Score every `(doc, term)` pair and keep the top three per term,
/// descending by score.
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

#[test]
fn tfidf_builds_a_top3_index_per_term() -> Result<()> {
    let corpus = JsonlFixture::new(&[
        r#"{"doc_id":1,"text":"hello world hello"}"#,
        r#"{"doc_id":2,"text":"hello rust"}"#,
    ]);

    let split_word = ComputationGraph::new();
    split_word.add_map(tokenizer(strip_regex()));

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
    count_idf.add_reduce(unique_pairs, ["doc_id", "word"])?;
    count_idf.add_join(&count_docs, corpus.path(), KeyTuple::empty(), Strategy::Outer)?;
    count_idf.add_reduce(docs_contain_word, "word")?;
    count_idf.bind_input(&split_word);

    let calc_index = ComputationGraph::new();
    calc_index.add_reduce(term_frequency, "doc_id")?;
    calc_index.add_join(&count_idf, &split_word, "word", Strategy::Left)?;
    calc_index.add_reduce(invert_index, "word")?;

    split_word.bind_input(corpus.path());
    calc_index.bind_input(&split_word);
    calc_index.run()?;

    let result = calc_index.result()?;
    let terms: Vec<&str> = result
        .iter()
        .filter_map(|r| r.get("term").and_then(Value::as_str))
        .collect();
    assert_eq!(terms, vec!["hello", "rust", "world"]);

    for r in &result {
        let index = r.get("index").and_then(Value::as_array).expect("index array");
        assert!(index.len() <= 3);
        let scores: Vec<f64> = index
            .iter()
            .filter_map(|pair| pair.as_array()?.get(1)?.as_f64())
            .collect();
        assert_eq!(scores.len(), index.len());
        // Descending by score.
        for w in scores.windows(2) {
            assert!(w[0] >= w[1], "scores not descending: {scores:?}");
        }
    }

    // "hello" appears in every document, so its scores are exactly zero.
    let hello = &result[0];
    let hello_index = hello.get("index").and_then(Value::as_array).expect("index array");
    assert_eq!(hello_index.len(), 2);
    for pair in hello_index {
        assert_eq!(pair.as_array().and_then(|p| p[1].as_f64()), Some(0.0));
    }

    // "rust" appears in one of two documents: tf 0.5, idf ln(2).
    let rust = &result[1];
    let rust_index = rust.get("index").and_then(Value::as_array).expect("index array");
    assert_eq!(rust_index.len(), 1);
    let rust_score = rust_index[0].as_array().and_then(|p| p[1].as_f64()).expect("score");
    assert!((rust_score - 0.5 * 2.0_f64.ln()).abs() < 1e-12, "got {rust_score}");
    Ok(())
}
