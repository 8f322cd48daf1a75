//! RDF graphs and datasets.
//!
//! A [`Graph`] is a set of triples from the oxigraph model plus an ordered
//! prefix map and an optional base IRI. A [`Dataset`] groups graphs under
//! unique IRI identifiers.
//!
//! - **Codec** ([`rdfio`]): parse and serialize through oxigraph's `io` module
//! - **Queries** ([`sparql`]): evaluate SPARQL through an in-memory oxigraph store
//! - **Operations** ([`ops`]): merge, filter, validate, schema extraction, serialization

pub mod ops;
pub mod rdfio;
pub mod sparql;

use std::collections::BTreeMap;
use std::collections::btree_map;

use oxigraph::model::{NamedNode, TermRef, Triple, TripleRef};

/// Prefix → namespace bindings in insertion order.
///
/// Rebinding an existing prefix replaces its namespace in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixMap {
    entries: Vec<(String, String)>,
}

impl PrefixMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `prefix` to `namespace`, replacing any earlier binding.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        match self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = namespace,
            None => self.entries.push((prefix, namespace)),
        }
    }

    /// Namespace bound to `prefix`.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// Bind every entry of `other` on top of this map.
    pub fn extend_from(&mut self, other: &PrefixMap) {
        for (prefix, namespace) in other.iter() {
            self.bind(prefix, namespace);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>, N: Into<String>> FromIterator<(P, N)> for PrefixMap {
    fn from_iter<I: IntoIterator<Item = (P, N)>>(iter: I) -> Self {
        let mut map = PrefixMap::new();
        for (prefix, namespace) in iter {
            map.bind(prefix, namespace);
        }
        map
    }
}

/// An unordered set of triples plus prefix bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: oxigraph::model::Graph,
    prefixes: PrefixMap,
    base_iri: Option<String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple. Returns `false` if it was already present.
    pub fn insert<'a>(&mut self, triple: impl Into<TripleRef<'a>>) -> bool {
        self.triples.insert(triple)
    }

    /// Remove a triple. Returns `false` if it was absent.
    pub fn remove<'a>(&mut self, triple: impl Into<TripleRef<'a>>) -> bool {
        self.triples.remove(triple)
    }

    pub fn contains<'a>(&self, triple: impl Into<TripleRef<'a>>) -> bool {
        self.triples.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate over all triples.
    pub fn iter(&self) -> impl Iterator<Item = TripleRef<'_>> {
        self.triples.iter()
    }

    /// Bind a namespace prefix.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.bind(prefix, namespace);
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    /// Base IRI the graph was loaded from, if any.
    pub fn base_iri(&self) -> Option<&str> {
        self.base_iri.as_deref()
    }

    pub fn set_base_iri(&mut self, base_iri: impl Into<String>) {
        self.base_iri = Some(base_iri.into());
    }

    pub fn clear_base_iri(&mut self) {
        self.base_iri = None;
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.triples.insert(&triple);
        }
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

/// Named graphs keyed by unique IRI identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    graphs: BTreeMap<NamedNode, Graph>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `graph` under `name`.
    ///
    /// If `name` is already present the triples are added to the existing
    /// graph, so identifiers stay unique.
    pub fn add_graph(&mut self, name: NamedNode, graph: Graph) {
        match self.graphs.entry(name) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(graph);
            }
            btree_map::Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                for triple in graph.iter() {
                    existing.insert(triple);
                }
                existing.prefixes.extend_from(graph.prefixes());
            }
        }
    }

    pub fn graph(&self, name: &NamedNode) -> Option<&Graph> {
        self.graphs.get(name)
    }

    /// Iterate over `(identifier, graph)` pairs in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&NamedNode, &Graph)> {
        self.graphs.iter()
    }

    /// Number of named graphs.
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Total triples across all graphs.
    pub fn triple_count(&self) -> usize {
        self.graphs.values().map(Graph::len).sum()
    }
}

/// Plain string form of a term: the IRI, the blank node id, or the
/// literal's lexical value.
pub fn term_text(term: TermRef<'_>) -> String {
    match term {
        TermRef::NamedNode(node) => node.as_str().to_owned(),
        TermRef::BlankNode(node) => node.as_str().to_owned(),
        TermRef::Literal(literal) => literal.value().to_owned(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::{BlankNode, Literal};

    fn ex(local: &str) -> NamedNode {
        NamedNode::new(format!("http://example.org/{local}")).unwrap()
    }

    #[test]
    fn prefix_rebinding_keeps_position() {
        let mut map = PrefixMap::new();
        map.bind("a", "http://a/");
        map.bind("b", "http://b/");
        map.bind("a", "http://a2/");
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("a", "http://a2/"), ("b", "http://b/")]);
    }

    #[test]
    fn graph_has_set_semantics() {
        let mut graph = Graph::new();
        let triple = Triple::new(ex("s"), ex("p"), ex("o"));
        assert!(graph.insert(&triple));
        assert!(!graph.insert(&triple));
        assert_eq!(graph.len(), 1);
        assert!(graph.remove(&triple));
        assert!(graph.is_empty());
    }

    #[test]
    fn dataset_merges_duplicate_identifiers() {
        let mut dataset = Dataset::new();
        let a: Graph = [Triple::new(ex("s"), ex("p"), ex("a"))].into_iter().collect();
        let b: Graph = [Triple::new(ex("s"), ex("p"), ex("b"))].into_iter().collect();
        dataset.add_graph(ex("g"), a);
        dataset.add_graph(ex("g"), b);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.triple_count(), 2);
    }

    #[test]
    fn term_text_strips_syntax() {
        let iri = ex("alice");
        assert_eq!(term_text(iri.as_ref().into()), "http://example.org/alice");
        let literal = Literal::from(30);
        assert_eq!(term_text(literal.as_ref().into()), "30");
        let blank = BlankNode::new("b0").unwrap();
        assert_eq!(term_text(blank.as_ref().into()), "b0");
    }
}
