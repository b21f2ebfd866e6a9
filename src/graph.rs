//! The computation graph: operator assembly, input binding, dependency
//! resolution, execution, and result caching.
//!
//! A [`ComputationGraph`] is a cheaply cloneable handle; all clones share
//! the same underlying state, so one graph can be a join dependency of
//! several others and the upstream input of yet another. Execution is
//! single-threaded and synchronous: dependencies run first (in registration
//! order), then the primary input is resolved, then the operators run in
//! declared order with every intermediate table fully materialized.
//!
//! A successful run caches the result together with the input binding that
//! produced it. Re-running with an equal binding is a no-op; binding
//! identity is structural for file sources (the path) and by reference for
//! in-memory tables and upstream graphs. Dependency runs are memoized by
//! the same rule, which gives transitive caching across shared subgraphs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{GraphError, Result};
use crate::io::jsonl;
use crate::op::{Operator, Strategy};
use crate::record::{KeyTuple, Record, Table};

/// Where a graph reads its records from.
#[derive(Clone)]
pub enum Input {
    /// A JSONL file on disk. Identity is the path.
    Source(PathBuf),
    /// An in-memory table. Identity is the allocation, so rebinding a fresh
    /// vector of equal records still invalidates the cache.
    Records(Arc<Vec<Record>>),
    /// Another graph's result. Identity is the shared graph state.
    Graph(ComputationGraph),
}

impl PartialEq for Input {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Input::Source(a), Input::Source(b)) => a == b,
            (Input::Records(a), Input::Records(b)) => Arc::ptr_eq(a, b),
            (Input::Graph(a), Input::Graph(b)) => Arc::ptr_eq(&a.inner, &b.inner),
            _ => false,
        }
    }
}

impl From<&str> for Input {
    fn from(path: &str) -> Self {
        Input::Source(PathBuf::from(path))
    }
}

impl From<String> for Input {
    fn from(path: String) -> Self {
        Input::Source(PathBuf::from(path))
    }
}

impl From<&Path> for Input {
    fn from(path: &Path) -> Self {
        Input::Source(path.to_path_buf())
    }
}

impl From<PathBuf> for Input {
    fn from(path: PathBuf) -> Self {
        Input::Source(path)
    }
}

impl From<Vec<Record>> for Input {
    fn from(records: Vec<Record>) -> Self {
        Input::Records(Arc::new(records))
    }
}

impl From<Arc<Vec<Record>>> for Input {
    fn from(records: Arc<Vec<Record>>) -> Self {
        Input::Records(records)
    }
}

impl From<ComputationGraph> for Input {
    fn from(graph: ComputationGraph) -> Self {
        Input::Graph(graph)
    }
}

impl From<&ComputationGraph> for Input {
    fn from(graph: &ComputationGraph) -> Self {
        Input::Graph(graph.clone())
    }
}

/// A declaratively built DAG of operators over record tables.
///
/// Build the graph with the `add_*` methods, bind an input, then [`run`]
/// it and read the [`result`] or [`write_output`]. Joins reference other
/// graphs as dependencies; the scheduler computes those first, recursively.
///
/// [`run`]: ComputationGraph::run
/// [`result`]: ComputationGraph::result
/// [`write_output`]: ComputationGraph::write_output
#[derive(Clone, Default)]
pub struct ComputationGraph {
    inner: Arc<Mutex<GraphInner>>,
}

impl fmt::Debug for ComputationGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = self.inner.lock().unwrap();
        f.debug_struct("ComputationGraph")
            .field("operators", &g.operators.len())
            .field("dependencies", &g.dependencies.len())
            .field("is_computed", &g.is_computed)
            .finish()
    }
}

#[derive(Default)]
struct GraphInner {
    operators: Vec<Operator>,
    input: Option<Input>,
    /// One `(graph, input)` pair per join, in registration order. The
    /// scheduler binds and runs these before reading the primary input.
    dependencies: Vec<(ComputationGraph, Input)>,
    result: Table,
    is_computed: bool,
    computed_input: Option<Input>,
}

impl ComputationGraph {
    /// Create an empty graph with no operators and no input binding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the graph's input to a record source, an in-memory table, or
    /// another graph.
    ///
    /// The cached result survives only if the graph is computed and the new
    /// binding equals the binding of the last successful run; any other
    /// rebinding invalidates it.
    pub fn bind_input(&self, input: impl Into<Input>) {
        let input = input.into();
        let mut g = self.inner.lock().unwrap();
        if !(g.is_computed && g.computed_input.as_ref() == Some(&input)) {
            g.is_computed = false;
        }
        g.input = Some(input);
    }

    /// Append a map operator: `mapper` is applied to each record in order
    /// and its outputs are concatenated.
    pub fn add_map<M>(&self, mapper: M) -> &Self
    where
        M: Fn(&Record) -> Vec<Record> + Send + Sync + 'static,
    {
        let mut g = self.inner.lock().unwrap();
        g.operators.push(Operator::Map(Box::new(mapper)));
        self
    }

    /// Append a stable ascending sort by `keys`.
    ///
    /// # Errors
    /// [`GraphError::InvalidOperator`] if the key tuple is empty.
    pub fn add_sort(&self, keys: impl Into<KeyTuple>) -> Result<&Self> {
        let keys = non_empty(keys.into(), "sort")?;
        let mut g = self.inner.lock().unwrap();
        g.operators.push(Operator::Sort(keys));
        Ok(self)
    }

    /// Append a left-fold with `folder(record, state) -> state`, starting
    /// from `init`. The fold emits a single record: the final state.
    pub fn add_fold<F>(&self, folder: F, init: Record) -> &Self
    where
        F: Fn(&Record, Record) -> Record + Send + Sync + 'static,
    {
        let mut g = self.inner.lock().unwrap();
        g.operators.push(Operator::Fold { folder: Box::new(folder), init });
        self
    }

    /// Append a reduce: the input is sorted by `keys`, partitioned into
    /// maximal runs of equal key tuples, and `reducer` is called once per
    /// run with its outputs concatenated.
    ///
    /// # Errors
    /// [`GraphError::InvalidOperator`] if the key tuple is empty.
    pub fn add_reduce<R>(&self, reducer: R, keys: impl Into<KeyTuple>) -> Result<&Self>
    where
        R: Fn(&[Record]) -> Vec<Record> + Send + Sync + 'static,
    {
        let keys = non_empty(keys.into(), "reduce")?;
        let mut g = self.inner.lock().unwrap();
        g.operators.push(Operator::Reduce { reducer: Box::new(reducer), keys });
        Ok(self)
    }

    /// Append a join against the result of `on`, which is registered as a
    /// dependency together with `dep_input`; before each run of this graph
    /// the scheduler binds `on` to `dep_input` and runs it.
    ///
    /// An empty key tuple turns an outer join into a cross join and is
    /// rejected for the other keyed strategies.
    ///
    /// # Errors
    /// [`GraphError::InvalidOperator`] if the key tuple is empty and the
    /// strategy is inner, left, or right.
    pub fn add_join(
        &self,
        on: &ComputationGraph,
        dep_input: impl Into<Input>,
        keys: impl Into<KeyTuple>,
        strategy: Strategy,
    ) -> Result<&Self> {
        let keys = keys.into();
        let strategy = match (keys.is_empty(), strategy) {
            (true, Strategy::Outer | Strategy::Cross) => Strategy::Cross,
            (true, s) => {
                return Err(GraphError::InvalidOperator(format!(
                    "{s} join requires at least one key field"
                )));
            }
            (false, s) => s,
        };
        let mut g = self.inner.lock().unwrap();
        g.dependencies.push((on.clone(), dep_input.into()));
        g.operators.push(Operator::Join { on: on.clone(), keys, strategy });
        Ok(self)
    }

    /// True if the graph holds a result for its current input binding.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.inner.lock().unwrap().is_computed
    }

    /// Compute the graph's result.
    ///
    /// Memoized: if the graph is computed and the current binding equals the
    /// binding of the last successful run, this returns without reading the
    /// input or running any operator. Otherwise dependencies are bound and
    /// run in registration order, the primary input is read (a bound
    /// upstream graph is run recursively and its result copied), and the
    /// operators are applied in order. A failed run leaves the graph
    /// uncomputed.
    ///
    /// # Errors
    /// [`GraphError::InvalidInput`] if no input is bound; any error from the
    /// record source, a dependency run, or an operator.
    pub fn run(&self) -> Result<()> {
        let (input, dependencies) = {
            let mut g = self.inner.lock().unwrap();
            if g.is_computed && g.computed_input.is_some() && g.computed_input == g.input {
                return Ok(());
            }
            g.is_computed = false;
            g.computed_input = None;
            let input = g
                .input
                .clone()
                .ok_or_else(|| GraphError::InvalidInput("graph has no input bound".to_owned()))?;
            (input, g.dependencies.clone())
        };

        for (dep, dep_input) in dependencies {
            dep.bind_input(dep_input);
            dep.run()?;
        }

        let mut table = match &input {
            Input::Source(path) => jsonl::read_jsonl(path)?,
            Input::Records(records) => records.as_ref().clone(),
            Input::Graph(upstream) => {
                upstream.run()?;
                upstream.result()?
            }
        };

        let mut g = self.inner.lock().unwrap();
        for op in &g.operators {
            table = op.apply(table)?;
        }
        g.result = table;
        g.is_computed = true;
        g.computed_input = Some(input);
        Ok(())
    }

    /// A copy of the cached result table.
    ///
    /// # Errors
    /// [`GraphError::NotComputed`] before a successful run.
    pub fn result(&self) -> Result<Table> {
        let g = self.inner.lock().unwrap();
        if !g.is_computed {
            return Err(GraphError::NotComputed);
        }
        Ok(g.result.clone())
    }

    /// Serialize the cached result to a JSONL sink, one record per line.
    ///
    /// # Returns
    /// The number of records written.
    ///
    /// # Errors
    /// [`GraphError::NotComputed`] before a successful run; any sink I/O
    /// error.
    pub fn write_output(&self, path: impl AsRef<Path>) -> Result<usize> {
        let g = self.inner.lock().unwrap();
        if !g.is_computed {
            return Err(GraphError::NotComputed);
        }
        jsonl::write_jsonl(path, &g.result)
    }
}

fn non_empty(keys: KeyTuple, what: &str) -> Result<KeyTuple> {
    if keys.is_empty() {
        return Err(GraphError::InvalidOperator(format!(
            "{what} requires at least one key field"
        )));
    }
    Ok(keys)
}
