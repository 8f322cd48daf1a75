//! Reshaping query outcomes into output encodings.
//!
//! Every encoding works from the same row view: one column per query
//! variable, cells rendered with [`term_text`]. JSON, CSV and XML try the
//! engine's native results serializer first and fall back to building the
//! text by hand.

use std::collections::BTreeMap;
use std::fmt;

use oxigraph::sparql::results::{QueryResultsFormat, QueryResultsSerializer};
use prettytable::{Cell, Row, Table};
use serde::Serialize;

use crate::error::{ExecutionError, ExecutionResult};
use crate::graph::sparql::QueryOutcome;
use crate::graph::{Graph, term_text};

/// Output encodings for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultFormat {
    /// The outcome as produced by the engine.
    Raw,
    /// Truthiness of the outcome.
    Bool,
    /// The graph of a CONSTRUCT or DESCRIBE.
    Graph,
    Json,
    Xml,
    Csv,
    /// Header row followed by value rows.
    Table,
    /// One map per row, unbound variables omitted.
    List,
}

impl ResultFormat {
    /// Case-insensitive lookup. Unknown names select [`ResultFormat::List`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "raw" => ResultFormat::Raw,
            "bool" => ResultFormat::Bool,
            "graph" => ResultFormat::Graph,
            "json" => ResultFormat::Json,
            "xml" => ResultFormat::Xml,
            "csv" => ResultFormat::Csv,
            "table" => ResultFormat::Table,
            _ => ResultFormat::List,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ResultFormat::Raw => "raw",
            ResultFormat::Bool => "bool",
            ResultFormat::Graph => "graph",
            ResultFormat::Json => "json",
            ResultFormat::Xml => "xml",
            ResultFormat::Csv => "csv",
            ResultFormat::Table => "table",
            ResultFormat::List => "list",
        }
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A reshaped query result.
#[derive(Debug)]
pub enum QueryOutput {
    Raw(QueryOutcome),
    Bool(bool),
    Graph(Graph),
    /// JSON, CSV or XML text.
    Text(String),
    Table(Vec<Vec<String>>),
    Records(Vec<BTreeMap<String, String>>),
}

/// Column names plus cells, `None` where a variable is unbound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowView {
    pub variables: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RowView {
    /// Rows for any outcome shape.
    ///
    /// Booleans become a single `boolean` column; graphs become
    /// `subject`/`predicate`/`object` columns, one row per triple.
    pub fn from_outcome(outcome: &QueryOutcome) -> Self {
        match outcome {
            QueryOutcome::Solutions { variables, rows } => RowView {
                variables: variables.iter().map(|v| v.as_str().to_string()).collect(),
                rows: rows
                    .iter()
                    .map(|solution| {
                        variables
                            .iter()
                            .map(|v| solution.get(v).map(|term| term_text(term.as_ref())))
                            .collect()
                    })
                    .collect(),
            },
            QueryOutcome::Boolean(value) => RowView {
                variables: vec!["boolean".into()],
                rows: vec![vec![Some(value.to_string())]],
            },
            QueryOutcome::Graph(graph) => RowView {
                variables: vec!["subject".into(), "predicate".into(), "object".into()],
                rows: graph
                    .iter()
                    .map(|t| {
                        vec![
                            Some(term_text(t.subject.into())),
                            Some(t.predicate.as_str().to_string()),
                            Some(term_text(t.object)),
                        ]
                    })
                    .collect(),
            },
        }
    }

    /// One map per row; unbound variables are left out.
    pub fn records(&self) -> Vec<BTreeMap<String, String>> {
        self.rows
            .iter()
            .map(|row| {
                self.variables
                    .iter()
                    .zip(row)
                    .filter_map(|(var, cell)| cell.as_ref().map(|v| (var.clone(), v.clone())))
                    .collect()
            })
            .collect()
    }

    /// Header row then value rows; unbound variables are empty strings.
    pub fn table(&self) -> Vec<Vec<String>> {
        std::iter::once(self.variables.clone())
            .chain(
                self.rows
                    .iter()
                    .map(|row| row.iter().map(|c| c.clone().unwrap_or_default()).collect()),
            )
            .collect()
    }
}

/// Truthiness: a boolean is itself, solutions and graphs are true when non-empty.
pub fn truthy(outcome: &QueryOutcome) -> bool {
    match outcome {
        QueryOutcome::Boolean(value) => *value,
        QueryOutcome::Solutions { rows, .. } => !rows.is_empty(),
        QueryOutcome::Graph(graph) => !graph.is_empty(),
    }
}

/// Reshape `outcome` into `format`.
pub fn reshape(outcome: QueryOutcome, format: ResultFormat) -> ExecutionResult<QueryOutput> {
    Ok(match format {
        ResultFormat::Raw => QueryOutput::Raw(outcome),
        ResultFormat::Bool => QueryOutput::Bool(truthy(&outcome)),
        ResultFormat::Graph => match outcome {
            QueryOutcome::Graph(graph) => QueryOutput::Graph(graph),
            other => QueryOutput::Raw(other),
        },
        ResultFormat::Json => QueryOutput::Text(to_json(&outcome)?),
        ResultFormat::Xml => QueryOutput::Text(to_xml(&outcome)),
        ResultFormat::Csv => QueryOutput::Text(to_csv(&outcome)?),
        ResultFormat::Table => QueryOutput::Table(RowView::from_outcome(&outcome).table()),
        ResultFormat::List => QueryOutput::Records(RowView::from_outcome(&outcome).records()),
    })
}

/// Serialize with the engine's results writer. `None` when the writer
/// cannot take this outcome.
fn native(outcome: &QueryOutcome, format: QueryResultsFormat) -> Option<String> {
    let serializer = QueryResultsSerializer::from_format(format);
    let written = match outcome {
        QueryOutcome::Boolean(value) => serializer.serialize_boolean_to_writer(Vec::new(), *value),
        QueryOutcome::Solutions { variables, rows } => (|| {
            let mut writer = serializer.serialize_solutions_to_writer(Vec::new(), variables.clone())?;
            for solution in rows {
                writer.serialize(solution)?;
            }
            writer.finish()
        })(),
        QueryOutcome::Graph(_) => return None,
    };
    match written.map(String::from_utf8) {
        Ok(Ok(text)) => Some(text),
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "native results writer produced invalid UTF-8");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "native results writer failed, building output by hand");
            None
        }
    }
}

pub fn to_json(outcome: &QueryOutcome) -> ExecutionResult<String> {
    if let Some(text) = native(outcome, QueryResultsFormat::Json) {
        return Ok(text);
    }
    json_manual(&RowView::from_outcome(outcome))
}

pub fn to_csv(outcome: &QueryOutcome) -> ExecutionResult<String> {
    if let Some(text) = native(outcome, QueryResultsFormat::Csv) {
        return Ok(text);
    }
    csv_manual(&RowView::from_outcome(outcome))
}

pub fn to_xml(outcome: &QueryOutcome) -> String {
    if let Some(text) = native(outcome, QueryResultsFormat::Xml) {
        return text;
    }
    xml_manual(&RowView::from_outcome(outcome))
}

/// Pretty JSON array of row objects.
pub fn json_manual(view: &RowView) -> ExecutionResult<String> {
    to_pretty_json(&view.records())
}

pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> ExecutionResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ExecutionError::Evaluate {
        message: format!("failed to encode JSON: {e}"),
    })
}

/// Header line then one line per row; unbound cells are empty.
pub fn csv_manual(view: &RowView) -> ExecutionResult<String> {
    let to_err = |e: &dyn fmt::Display| ExecutionError::Evaluate {
        message: format!("failed to write CSV: {e}"),
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&view.variables).map_err(|e| to_err(&e))?;
    for row in &view.rows {
        writer
            .write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))
            .map_err(|e| to_err(&e))?;
    }
    let bytes = writer.into_inner().map_err(|e| to_err(&e))?;
    String::from_utf8(bytes).map_err(|e| to_err(&e))
}

/// Minimal `<sparql>` document with one element per bound variable.
pub fn xml_manual(view: &RowView) -> String {
    let mut lines = vec![r#"<?xml version="1.0"?>"#.to_string(), "<sparql>".to_string()];
    for row in &view.rows {
        lines.push("  <result>".to_string());
        for (var, cell) in view.variables.iter().zip(row) {
            if let Some(value) = cell {
                lines.push(format!("    <{var}>{}</{var}>", escape_xml(value)));
            }
        }
        lines.push("  </result>".to_string());
    }
    lines.push("</sparql>".to_string());
    lines.join("\n")
}

/// ASCII rendering of a table whose first row is the header.
pub fn render_table(rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    let mut rows = rows.iter();
    if let Some(header) = rows.next() {
        table.set_titles(Row::new(header.iter().map(|h| Cell::new(h)).collect()));
    }
    for row in rows {
        table.add_row(Row::new(row.iter().map(|c| Cell::new(c)).collect()));
    }
    table.to_string()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::{Literal, NamedNode, Term, Triple};
    use oxigraph::sparql::{QuerySolution, Variable};

    fn solutions() -> QueryOutcome {
        let person = Variable::new("person").unwrap();
        let name = Variable::new("name").unwrap();
        let variables = vec![person.clone(), name.clone()];
        let alice: Vec<Option<Term>> = vec![
            Some(NamedNode::new("http://example.org/alice").unwrap().into()),
            Some(Literal::new_simple_literal("Alice").into()),
        ];
        let anon: Vec<Option<Term>> = vec![
            Some(NamedNode::new("http://example.org/anon").unwrap().into()),
            None,
        ];
        let rows = vec![
            QuerySolution::from((variables.clone(), alice)),
            QuerySolution::from((variables.clone(), anon)),
        ];
        QueryOutcome::Solutions { variables, rows }
    }

    fn graph_outcome() -> QueryOutcome {
        let graph: Graph = [Triple::new(
            NamedNode::new("http://example.org/a").unwrap(),
            NamedNode::new("http://example.org/p").unwrap(),
            Literal::new_simple_literal("a < b"),
        )]
        .into_iter()
        .collect();
        QueryOutcome::Graph(graph)
    }

    #[test]
    fn unknown_format_names_are_list() {
        assert_eq!(ResultFormat::from_name("JSON"), ResultFormat::Json);
        assert_eq!(ResultFormat::from_name("whatever"), ResultFormat::List);
    }

    #[test]
    fn records_omit_unbound() {
        let view = RowView::from_outcome(&solutions());
        let records = view.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "Alice");
        assert_eq!(records[0]["person"], "http://example.org/alice");
        assert!(!records[1].contains_key("name"));
    }

    #[test]
    fn table_renders_unbound_as_empty() {
        let table = RowView::from_outcome(&solutions()).table();
        assert_eq!(table[0], vec!["person", "name"]);
        assert_eq!(table[2], vec!["http://example.org/anon".to_string(), String::new()]);
    }

    #[test]
    fn native_json_for_solutions() {
        let text = to_json(&solutions()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["head"]["vars"][0], "person");
        assert_eq!(value["results"]["bindings"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn native_csv_contains_names() {
        let text = to_csv(&solutions()).unwrap();
        assert!(text.starts_with("person,name"));
        assert!(text.contains("Alice"));
    }

    #[test]
    fn graph_outcomes_use_manual_fallback() {
        let json = to_json(&graph_outcome()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["object"], "a < b");

        let csv = to_csv(&graph_outcome()).unwrap();
        assert_eq!(csv.lines().next(), Some("subject,predicate,object"));

        let xml = to_xml(&graph_outcome());
        assert!(xml.starts_with("<?xml version=\"1.0\"?>\n<sparql>"));
        assert!(xml.contains("    <object>a &lt; b</object>"));
    }

    #[test]
    fn manual_csv_leaves_unbound_empty() {
        let csv = csv_manual(&RowView::from_outcome(&solutions())).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines, vec!["person,name", "http://example.org/alice,Alice", "http://example.org/anon,"]);
    }

    #[test]
    fn boolean_shapes() {
        let outcome = QueryOutcome::Boolean(true);
        assert!(matches!(
            reshape(QueryOutcome::Boolean(true), ResultFormat::Bool),
            Ok(QueryOutput::Bool(true))
        ));
        let table = RowView::from_outcome(&outcome).table();
        assert_eq!(table, vec![vec!["boolean".to_string()], vec!["true".to_string()]]);
        let json = to_json(&outcome).unwrap();
        assert!(json.contains("\"boolean\":true"), "{json}");
    }

    #[test]
    fn rendered_table_has_header_and_cells() {
        let table = RowView::from_outcome(&solutions()).table();
        let text = render_table(&table);
        assert!(text.contains("person"));
        assert!(text.contains("http://example.org/alice"));
        assert!(text.contains("Alice"));
        assert!(text.lines().count() >= 4);
    }

    #[test]
    fn truthiness() {
        assert!(truthy(&solutions()));
        assert!(!truthy(&QueryOutcome::Solutions {
            variables: Vec::new(),
            rows: Vec::new()
        }));
        assert!(truthy(&graph_outcome()));
        assert!(!truthy(&QueryOutcome::Graph(Graph::new())));
    }
}
