//! Report types for serializing analysis results.
//!
//! These types are the structured outputs of the registry, the graph
//! operations and the query dispatcher, suitable for JSON export.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::format::Format;

/// Description of one RDF format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatMetadata {
    /// The format itself.
    pub format: Format,
    /// Token passed to the RDF engine.
    pub engine_token: String,
    /// MIME types that map to this format.
    pub mime_types: Vec<String>,
    /// File extensions (with leading dot) that map to this format.
    pub extensions: Vec<String>,
    /// Human-readable description.
    pub description: String,
}

/// Everything the format registry supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatCatalog {
    pub supported_formats: Vec<String>,
    pub mime_types: Vec<String>,
    pub extensions: Vec<String>,
    pub default_format: String,
}

/// Triple-kind statistics for a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStatistics {
    /// Number of triples in the graph.
    pub total_triples: usize,
    /// Distinct subjects.
    pub unique_subjects: usize,
    /// Distinct predicates.
    pub unique_predicates: usize,
    /// Distinct objects.
    pub unique_objects: usize,
    /// Prefix → namespace bindings of the graph.
    pub namespaces: BTreeMap<String, String>,
    /// Blank node occurrences in subject or object position.
    pub blank_nodes: usize,
    /// Literal occurrences in object position.
    pub literals: usize,
    /// IRI occurrences in subject or object position.
    pub uris: usize,
    /// Non-fatal problems found while scanning.
    pub errors: Vec<String>,
}

impl GraphStatistics {
    /// Multi-line summary for terminal output.
    pub fn summary(&self) -> String {
        let mut out = String::from("Validation Results:\n");
        out.push_str(&format!("Total triples: {}\n", self.total_triples));
        out.push_str(&format!("Unique subjects: {}\n", self.unique_subjects));
        out.push_str(&format!("Unique predicates: {}\n", self.unique_predicates));
        out.push_str(&format!("Unique objects: {}\n", self.unique_objects));
        out.push_str(&format!("Blank nodes: {}\n", self.blank_nodes));
        out.push_str(&format!("Literals: {}\n", self.literals));
        out.push_str(&format!("URIs: {}\n", self.uris));
        if self.errors.is_empty() {
            out.push_str("No errors found\n");
        } else {
            out.push_str(&format!("Errors: {}\n", self.errors.join(", ")));
        }
        out
    }
}

/// Outcome of checking a query without running it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryValidation {
    pub valid: bool,
    /// `SELECT`, `CONSTRUCT`, `ASK`, `DESCRIBE` or `UNKNOWN`; absent when invalid.
    pub query_type: Option<String>,
    /// `PREFIX` declarations found in the query text.
    pub prefixes: BTreeMap<String, String>,
    pub errors: Vec<String>,
}

/// Counts gathered by running a query to exhaustion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStatistics {
    pub result_count: usize,
    pub variables: Vec<String>,
    pub query_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reports_errors() {
        let stats = GraphStatistics {
            total_triples: 3,
            errors: vec!["bad object".into()],
            ..Default::default()
        };
        let text = stats.summary();
        assert!(text.contains("Total triples: 3"));
        assert!(text.contains("Errors: bad object"));
        assert!(!text.contains("No errors found"));
    }

    #[test]
    fn statistics_serialize_as_flat_json() {
        let json = serde_json::to_value(GraphStatistics::default()).unwrap();
        assert_eq!(json["total_triples"], 0);
        assert!(json["errors"].as_array().unwrap().is_empty());
    }
}
