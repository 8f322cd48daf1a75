//! SPARQL evaluation backed by an in-memory oxigraph store.
//!
//! A [`SparqlStore`] is materialized from a [`Graph`] (triples land in the
//! default graph) or a [`Dataset`] (each graph lands in its named graph and
//! the default graph is their union). Results are drained into an owned
//! [`QueryOutcome`] so nothing borrowed from the store escapes.

use std::collections::BTreeMap;

use oxigraph::model::{GraphNameRef, Term};
use oxigraph::sparql::{QueryResults, QuerySolution, SparqlEvaluator, Variable};
use oxigraph::store::Store;

use crate::error::{ExecutionError, ExecutionResult};

use super::{Dataset, Graph};

/// Variable name (without `?`) → term joined into the query before evaluation.
pub type Bindings = BTreeMap<String, Term>;

/// Owned result of one query evaluation.
#[derive(Debug)]
pub enum QueryOutcome {
    /// SELECT rows with the query's declared variables.
    Solutions {
        variables: Vec<Variable>,
        rows: Vec<QuerySolution>,
    },
    /// ASK answer.
    Boolean(bool),
    /// CONSTRUCT or DESCRIBE triples, normalized into a graph.
    Graph(Graph),
}

impl QueryOutcome {
    /// Short name of the result shape, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryOutcome::Solutions { .. } => "solutions",
            QueryOutcome::Boolean(_) => "boolean",
            QueryOutcome::Graph(_) => "graph",
        }
    }
}

/// In-memory SPARQL store.
pub struct SparqlStore {
    store: Store,
    union_default_graph: bool,
}

impl SparqlStore {
    fn empty() -> ExecutionResult<Store> {
        Store::new().map_err(|e| ExecutionError::Evaluate {
            message: format!("failed to create oxigraph store: {e}"),
        })
    }

    /// Load a single graph into the default graph.
    pub fn from_graph(graph: &Graph) -> ExecutionResult<Self> {
        let store = Self::empty()?;
        for triple in graph.iter() {
            store
                .insert(triple.in_graph(GraphNameRef::DefaultGraph))
                .map_err(|e| ExecutionError::Evaluate {
                    message: format!("insert failed: {e}"),
                })?;
        }
        Ok(Self {
            store,
            union_default_graph: false,
        })
    }

    /// Load every graph of a dataset into its own named graph.
    pub fn from_dataset(dataset: &Dataset) -> ExecutionResult<Self> {
        let store = Self::empty()?;
        for (name, graph) in dataset.iter() {
            for triple in graph.iter() {
                store
                    .insert(triple.in_graph(GraphNameRef::NamedNode(name.as_ref())))
                    .map_err(|e| ExecutionError::Evaluate {
                        message: format!("insert into {name} failed: {e}"),
                    })?;
            }
        }
        Ok(Self {
            store,
            union_default_graph: true,
        })
    }

    /// Check that `query` parses.
    pub fn prepare(query: &str) -> ExecutionResult<()> {
        SparqlEvaluator::new()
            .parse_query(query)
            .map(|_| ())
            .map_err(|e| ExecutionError::Prepare {
                message: e.to_string(),
            })
    }

    /// Prepare and evaluate `query` with `bindings` joined into its pattern.
    pub fn execute(&self, query: &str, bindings: &Bindings) -> ExecutionResult<QueryOutcome> {
        let query = with_values_clause(query, bindings)?;
        let mut prepared = SparqlEvaluator::new()
            .parse_query(&query)
            .map_err(|e| ExecutionError::Prepare {
                message: e.to_string(),
            })?;
        if self.union_default_graph {
            prepared.dataset_mut().set_default_graph_as_union();
        }

        let results = prepared
            .on_store(&self.store)
            .execute()
            .map_err(|e| ExecutionError::Evaluate {
                message: e.to_string(),
            })?;

        match results {
            QueryResults::Solutions(solutions) => {
                let variables = solutions.variables().to_vec();
                let mut rows = Vec::new();
                for solution in solutions {
                    rows.push(solution.map_err(|e| ExecutionError::Evaluate {
                        message: format!("solution error: {e}"),
                    })?);
                }
                Ok(QueryOutcome::Solutions { variables, rows })
            }
            QueryResults::Boolean(b) => Ok(QueryOutcome::Boolean(b)),
            QueryResults::Graph(triples) => {
                let mut graph = Graph::new();
                for triple in triples {
                    let triple = triple.map_err(|e| ExecutionError::Evaluate {
                        message: format!("triple error: {e}"),
                    })?;
                    graph.insert(&triple);
                }
                Ok(QueryOutcome::Graph(graph))
            }
        }
    }

}

/// Append a trailing `VALUES` block holding one row of `bindings`.
///
/// The block joins with the query pattern before projection, so a bound
/// variable does not need to be selected. Blank nodes cannot appear in a
/// `VALUES` block and are rejected.
pub fn with_values_clause(query: &str, bindings: &Bindings) -> ExecutionResult<String> {
    if bindings.is_empty() {
        return Ok(query.to_string());
    }

    let mut variables = Vec::with_capacity(bindings.len());
    let mut values = Vec::with_capacity(bindings.len());
    for (name, term) in bindings {
        let variable = Variable::new(name.as_str()).map_err(|e| ExecutionError::InvalidBinding {
            name: name.clone(),
            message: e.to_string(),
        })?;
        if term.is_blank_node() {
            return Err(ExecutionError::InvalidBinding {
                name: name.clone(),
                message: "blank nodes cannot be bound".into(),
            });
        }
        variables.push(variable.to_string());
        values.push(term.to_string());
    }

    Ok(format!(
        "{query}\nVALUES ({}) {{ ({}) }}",
        variables.join(" "),
        values.join(" ")
    ))
}

impl std::fmt::Debug for SparqlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparqlStore")
            .field("union_default_graph", &self.union_default_graph)
            .finish()
    }
}
