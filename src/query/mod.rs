//! SPARQL dispatch: load the target, inject default prefixes, evaluate
//! through the in-memory store and reshape the outcome.
//!
//! - **Inspection** ([`inspect`]): prefix injection, query form, declared prefixes
//! - **Reshaping** ([`results`]): JSON, CSV, XML, table and record views

pub mod inspect;
pub mod results;

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use oxigraph::model::{Literal, Term};

use crate::error::{ExecutionError, ExecutionResult};
use crate::export::{QueryStatistics, QueryValidation};
use crate::graph::ops::Converter;
use crate::graph::sparql::{Bindings, QueryOutcome, SparqlStore};
use crate::graph::{Dataset, Graph, PrefixMap};
use crate::loader::{Source, SourceLoader};
use crate::vocab;

use self::results::{QueryOutput, ResultFormat};

/// What a query runs against.
pub enum QuerySource<'a> {
    Graph(&'a Graph),
    Dataset(&'a Dataset),
    /// Loaded through the source loader first.
    Source(Source<'a>),
}

impl<'a> From<&'a Graph> for QuerySource<'a> {
    fn from(graph: &'a Graph) -> Self {
        QuerySource::Graph(graph)
    }
}

impl<'a> From<&'a Dataset> for QuerySource<'a> {
    fn from(dataset: &'a Dataset) -> Self {
        QuerySource::Dataset(dataset)
    }
}

impl<'a> From<Source<'a>> for QuerySource<'a> {
    fn from(source: Source<'a>) -> Self {
        QuerySource::Source(source)
    }
}

impl<'a> From<&'a str> for QuerySource<'a> {
    fn from(source: &'a str) -> Self {
        QuerySource::Source(Source::from(source))
    }
}

/// Parse a binding value given on the command line.
///
/// N-Triples terms (`<iri>`, `"text"@en`, `"1"^^<dt>`, `_:b`) are taken as
/// written; integers become `xsd:integer`; anything else is a plain literal.
pub fn parse_binding_value(value: &str) -> Term {
    if let Ok(term) = Term::from_str(value) {
        return term;
    }
    if let Ok(number) = value.parse::<i64>() {
        return Literal::from(number).into();
    }
    Literal::new_simple_literal(value).into()
}

/// Parse `NAME=VALUE` pairs into bindings. A leading `?` or `$` on the name
/// is dropped.
pub fn parse_bindings<S: AsRef<str>>(pairs: &[S]) -> ExecutionResult<Bindings> {
    let mut bindings = Bindings::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (name, value) = pair.split_once('=').ok_or_else(|| ExecutionError::InvalidBinding {
            name: pair.to_string(),
            message: "expected NAME=VALUE".into(),
        })?;
        let name = name.trim().trim_start_matches(['?', '$']);
        if name.is_empty() {
            return Err(ExecutionError::InvalidBinding {
                name: pair.to_string(),
                message: "empty variable name".into(),
            });
        }
        bindings.insert(name.to_string(), parse_binding_value(value.trim()));
    }
    Ok(bindings)
}

/// Runs SPARQL against graphs, datasets and loadable sources.
pub struct QueryDispatcher {
    loader: Arc<SourceLoader>,
    converter: Arc<Converter>,
    prefixes: PrefixMap,
}

impl QueryDispatcher {
    pub fn new(loader: Arc<SourceLoader>, converter: Arc<Converter>) -> Self {
        Self {
            loader,
            converter,
            prefixes: PrefixMap::new(),
        }
    }

    /// Prefixes injected into queries and bound on graph results. A name
    /// shared with a default prefix takes the configured namespace.
    pub fn with_prefixes<I, P, N>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = (P, N)>,
        P: Into<String>,
        N: Into<String>,
    {
        self.prefixes = prefixes.into_iter().collect();
        self
    }

    /// Query text with every missing default and configured prefix declared.
    pub fn full_query(&self, query: &str) -> String {
        inspect::inject_prefixes(
            query,
            vocab::DEFAULT_QUERY_PREFIXES
                .iter()
                .copied()
                .chain(self.prefixes.iter()),
        )
    }

    fn evaluate(
        &self,
        source: QuerySource<'_>,
        query: &str,
        bindings: &Bindings,
    ) -> ExecutionResult<QueryOutcome> {
        let store = match source {
            QuerySource::Graph(graph) => SparqlStore::from_graph(graph)?,
            QuerySource::Dataset(dataset) => SparqlStore::from_dataset(dataset)?,
            QuerySource::Source(source) => {
                let graph = self.loader.load(source, None, None)?;
                SparqlStore::from_graph(&graph)?
            }
        };
        let outcome = store.execute(&self.full_query(query), bindings)?;
        tracing::debug!(shape = outcome.kind(), "evaluated query");
        Ok(outcome)
    }

    /// Run `query` and reshape the outcome into `format`.
    pub fn query<'a>(
        &self,
        source: impl Into<QuerySource<'a>>,
        query: &str,
        format: ResultFormat,
        bindings: &Bindings,
    ) -> ExecutionResult<QueryOutput> {
        let outcome = self.evaluate(source.into(), query, bindings)?;
        let output = results::reshape(outcome, format)?;
        tracing::info!(format = %format, "executed SPARQL query");
        Ok(output)
    }

    /// Load every source as a named graph and query the union.
    pub fn query_multiple<S: AsRef<str>>(
        &self,
        sources: &[S],
        query: &str,
        format: ResultFormat,
    ) -> ExecutionResult<QueryOutput> {
        let dataset = self.loader.load_dataset(sources, &BTreeMap::new());
        tracing::info!(
            graphs = dataset.len(),
            triples = dataset.triple_count(),
            "loaded dataset"
        );
        self.query(&dataset, query, format, &Bindings::new())
    }

    fn graph_result(
        &self,
        source: QuerySource<'_>,
        query: &str,
        output_format: &str,
    ) -> ExecutionResult<String> {
        let input_prefixes = match &source {
            QuerySource::Graph(graph) => Some(graph.prefixes().clone()),
            _ => None,
        };
        let mut graph = match self.evaluate(source, query, &Bindings::new())? {
            QueryOutcome::Graph(graph) => graph,
            other => {
                return Err(ExecutionError::UnexpectedShape {
                    expected: "graph",
                    actual: other.kind(),
                });
            }
        };

        for (prefix, namespace) in vocab::DEFAULT_QUERY_PREFIXES {
            graph.bind(*prefix, *namespace);
        }
        for (prefix, namespace) in self.prefixes.iter() {
            graph.bind(prefix, namespace);
        }
        if let Some(prefixes) = input_prefixes {
            for (prefix, namespace) in prefixes.iter() {
                graph.bind(prefix, namespace);
            }
        }

        tracing::info!(triples = graph.len(), "built result graph");
        Ok(self.converter.serialize(&graph, output_format, None)?)
    }

    /// Run a CONSTRUCT query and serialize the resulting graph.
    pub fn construct<'a>(
        &self,
        source: impl Into<QuerySource<'a>>,
        query: &str,
        output_format: &str,
    ) -> ExecutionResult<String> {
        self.graph_result(source.into(), query, output_format)
    }

    /// Run a DESCRIBE query and serialize the resulting graph.
    pub fn describe<'a>(
        &self,
        source: impl Into<QuerySource<'a>>,
        query: &str,
        output_format: &str,
    ) -> ExecutionResult<String> {
        self.graph_result(source.into(), query, output_format)
    }

    /// Run an ASK query.
    pub fn ask<'a>(&self, source: impl Into<QuerySource<'a>>, query: &str) -> ExecutionResult<bool> {
        let outcome = self.evaluate(source.into(), query, &Bindings::new())?;
        let answer = results::truthy(&outcome);
        tracing::info!(answer, "executed ASK query");
        Ok(answer)
    }

    /// Check that `query` prepares, without running it. Never fails.
    pub fn validate_query(&self, query: &str) -> QueryValidation {
        match SparqlStore::prepare(&self.full_query(query)) {
            Ok(()) => QueryValidation {
                valid: true,
                query_type: Some(inspect::query_type(query).to_string()),
                prefixes: inspect::extract_prefixes(query),
                errors: Vec::new(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "query validation failed");
                QueryValidation {
                    valid: false,
                    errors: vec![e.to_string()],
                    ..Default::default()
                }
            }
        }
    }

    /// Run `query` to exhaustion and count the results.
    pub fn statistics<'a>(
        &self,
        source: impl Into<QuerySource<'a>>,
        query: &str,
    ) -> ExecutionResult<QueryStatistics> {
        let outcome = self.evaluate(source.into(), query, &Bindings::new())?;
        let (result_count, variables) = match &outcome {
            QueryOutcome::Solutions { variables, rows } => (
                rows.len(),
                variables.iter().map(|v| v.as_str().to_string()).collect(),
            ),
            QueryOutcome::Boolean(_) => (1, Vec::new()),
            QueryOutcome::Graph(graph) => (graph.len(), Vec::new()),
        };
        let stats = QueryStatistics {
            result_count,
            variables,
            query_type: inspect::query_type(query).to_string(),
        };
        tracing::info!(
            results = stats.result_count,
            query_type = %stats.query_type,
            "gathered query statistics"
        );
        Ok(stats)
    }
}
