//! Record sources and sinks.
//!
//! The canonical realization is line-delimited JSON ([`jsonl`]). A graph
//! reads a bound source exactly once per successful run and caches the
//! resulting table.

pub mod jsonl;
