//! Graph operations: merge, filter, validate, schema extraction,
//! transformations and serialization.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use oxigraph::model::{NamedNode, TermRef, Triple};

use crate::config::TransformRule;
use crate::error::{ConversionError, ConversionResult};
use crate::export::GraphStatistics;
use crate::format::{Format, FormatRegistry};
use crate::loader::{Source, SourceLoader};
use crate::vocab;

use super::{Graph, PrefixMap, rdfio, term_text};

/// Allow-lists for [`Converter::filter`].
///
/// A triple passes when each non-empty list contains the string form of the
/// matching component. Empty lists allow everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripleFilter {
    pub subjects: Vec<String>,
    pub predicates: Vec<String>,
    pub objects: Vec<String>,
}

impl TripleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subjects<I: IntoIterator<Item = S>, S: Into<String>>(mut self, subjects: I) -> Self {
        self.subjects = subjects.into_iter().map(Into::into).collect();
        self
    }

    pub fn predicates<I: IntoIterator<Item = S>, S: Into<String>>(mut self, predicates: I) -> Self {
        self.predicates = predicates.into_iter().map(Into::into).collect();
        self
    }

    pub fn objects<I: IntoIterator<Item = S>, S: Into<String>>(mut self, objects: I) -> Self {
        self.objects = objects.into_iter().map(Into::into).collect();
        self
    }

    fn allows(list: &[String], text: &str) -> bool {
        list.is_empty() || list.iter().any(|entry| entry == text)
    }

    /// Whether all three components pass their lists.
    pub fn matches(&self, subject: &str, predicate: &str, object: &str) -> bool {
        Self::allows(&self.subjects, subject)
            && Self::allows(&self.predicates, predicate)
            && Self::allows(&self.objects, object)
    }
}

/// Converts, reshapes and serializes graphs.
pub struct Converter {
    registry: Arc<FormatRegistry>,
    loader: Arc<SourceLoader>,
    namespaces: PrefixMap,
    transformations: Vec<TransformRule>,
}

impl Converter {
    pub fn new(registry: Arc<FormatRegistry>, loader: Arc<SourceLoader>) -> Self {
        Self {
            registry,
            loader,
            namespaces: PrefixMap::new(),
            transformations: Vec::new(),
        }
    }

    /// Prefixes bound on every graph before serialization, after the common ones.
    pub fn with_namespaces<I, P, N>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = (P, N)>,
        P: Into<String>,
        N: Into<String>,
    {
        self.namespaces = namespaces.into_iter().collect();
        self
    }

    /// Rules applied by [`Converter::convert`].
    pub fn with_transformations(mut self, rules: Vec<TransformRule>) -> Self {
        self.transformations = rules;
        self
    }

    /// Load `source` and run it through [`Converter::convert_graph`].
    pub fn convert(
        &self,
        source: Source<'_>,
        source_format: Option<&str>,
        target_format: &str,
    ) -> ConversionResult<Graph> {
        let graph = self.loader.load(source, source_format, None)?;
        self.convert_graph(graph, target_format)
    }

    /// Bind the common and configured namespaces, then apply the configured
    /// transformation rules in order.
    pub fn convert_graph(&self, mut graph: Graph, target_format: &str) -> ConversionResult<Graph> {
        self.bind_namespaces(&mut graph);
        let graph = self.apply_transformations(graph, &self.transformations)?;
        tracing::info!(
            triples = graph.len(),
            target = target_format,
            "converted graph"
        );
        Ok(graph)
    }

    fn bind_namespaces(&self, graph: &mut Graph) {
        for (prefix, namespace) in vocab::COMMON_NAMESPACES {
            graph.bind(*prefix, *namespace);
        }
        for (prefix, namespace) in self.namespaces.iter() {
            graph.bind(prefix, namespace);
        }
    }

    /// Union of all input graphs, added into `target` when given.
    pub fn merge<'g>(&self, graphs: impl IntoIterator<Item = &'g Graph>, target: Option<Graph>) -> Graph {
        let mut merged = target.unwrap_or_default();
        for graph in graphs {
            for triple in graph.iter() {
                merged.insert(triple);
            }
            merged.prefixes.extend_from(graph.prefixes());
        }
        tracing::info!(triples = merged.len(), "merged graphs");
        merged
    }

    /// Triples of `graph` that pass `filter`.
    pub fn filter(&self, graph: &Graph, filter: &TripleFilter) -> Graph {
        let mut filtered = Graph::new();
        filtered.prefixes = graph.prefixes().clone();
        for triple in graph.iter() {
            let subject = term_text(TermRef::from(triple.subject));
            let object = term_text(triple.object);
            if filter.matches(&subject, triple.predicate.as_str(), &object) {
                filtered.insert(triple);
            }
        }
        tracing::debug!(
            before = graph.len(),
            after = filtered.len(),
            "filtered graph"
        );
        filtered
    }

    /// Triple-kind statistics, gathered in one pass.
    pub fn validate(&self, graph: &Graph) -> GraphStatistics {
        let mut stats = GraphStatistics {
            total_triples: graph.len(),
            namespaces: graph
                .prefixes()
                .iter()
                .map(|(p, ns)| (p.to_string(), ns.to_string()))
                .collect(),
            ..Default::default()
        };

        let mut subjects = HashSet::new();
        let mut predicates = HashSet::new();
        let mut objects = HashSet::new();

        for triple in graph.iter() {
            let subject = TermRef::from(triple.subject);
            subjects.insert(subject);
            predicates.insert(triple.predicate);
            objects.insert(triple.object);

            for (position, term) in [("subject", subject), ("object", triple.object)] {
                match term {
                    TermRef::NamedNode(_) => stats.uris += 1,
                    TermRef::BlankNode(_) => stats.blank_nodes += 1,
                    TermRef::Literal(_) => stats.literals += 1,
                    #[allow(unreachable_patterns)]
                    other => stats
                        .errors
                        .push(format!("Validation error: unsupported {position} {other}")),
                }
            }
        }

        stats.unique_subjects = subjects.len();
        stats.unique_predicates = predicates.len();
        stats.unique_objects = objects.len();
        tracing::info!(triples = stats.total_triples, "validated graph");
        stats
    }

    /// Class and property definitions only.
    pub fn extract_schema(&self, graph: &Graph) -> Graph {
        let mut schema = Graph::new();
        for (prefix, namespace) in vocab::COMMON_NAMESPACES {
            schema.bind(*prefix, *namespace);
        }

        for triple in graph.iter() {
            let predicate = triple.predicate.as_str();
            let object = match triple.object {
                TermRef::NamedNode(node) => Some(node.as_str()),
                _ => None,
            };
            let keep = if predicate == vocab::RDF_TYPE {
                object.is_some_and(|o| {
                    vocab::CLASS_KINDS.contains(&o) || vocab::PROPERTY_KINDS.contains(&o)
                })
            } else {
                vocab::CLASS_RELATIONS.contains(&predicate)
                    || vocab::PROPERTY_RELATIONS.contains(&predicate)
            };
            if keep {
                schema.insert(triple);
            }
        }

        tracing::info!(triples = schema.len(), "extracted schema");
        schema
    }

    /// Apply `rules` in order. Unknown rule kinds are skipped.
    pub fn apply_transformations(
        &self,
        mut graph: Graph,
        rules: &[TransformRule],
    ) -> ConversionResult<Graph> {
        for rule in rules {
            match rule {
                TransformRule::AddNamespace { prefix, uri } => graph.bind(prefix.as_str(), uri.as_str()),
                TransformRule::ReplacePredicate {
                    old_predicate,
                    new_predicate,
                } => {
                    let old = named_node(old_predicate)?;
                    let new = named_node(new_predicate)?;
                    let matching: Vec<Triple> = graph
                        .iter()
                        .filter(|t| t.predicate == old.as_ref())
                        .map(|t| t.into_owned())
                        .collect();
                    for triple in &matching {
                        graph.remove(triple);
                        graph.insert(&Triple::new(
                            triple.subject.clone(),
                            new.clone(),
                            triple.object.clone(),
                        ));
                    }
                    tracing::debug!(
                        replaced = matching.len(),
                        from = %old,
                        to = %new,
                        "replaced predicate"
                    );
                }
                TransformRule::Unknown => {
                    tracing::debug!("ignoring unknown transformation rule");
                }
            }
        }
        Ok(graph)
    }

    /// Prefixes used when writing `graph`: its own, the common ones, then
    /// the configured ones.
    pub fn serialization_prefixes(&self, graph: &Graph) -> PrefixMap {
        let mut prefixes = graph.prefixes().clone();
        for (prefix, namespace) in vocab::COMMON_NAMESPACES {
            prefixes.bind(*prefix, *namespace);
        }
        prefixes.extend_from(&self.namespaces);
        prefixes
    }

    /// Serialize `graph`. Unknown format names fall back to Turtle.
    ///
    /// With a destination the text is written there and a confirmation
    /// line is returned instead.
    pub fn serialize(
        &self,
        graph: &Graph,
        format_name: &str,
        destination: Option<&Path>,
    ) -> ConversionResult<String> {
        let format = Format::from_name(format_name).unwrap_or(Format::Turtle);
        let token = self.registry.engine_token(format);
        let prefixes = self.serialization_prefixes(graph);
        let to_conversion = |source| ConversionError::Serialize {
            format: format.name().to_string(),
            source,
        };

        match destination {
            Some(path) => {
                let file = File::create(path).map_err(|e| ConversionError::Write {
                    path: path.display().to_string(),
                    source: e,
                })?;
                let mut writer =
                    rdfio::serialize(graph, token, &prefixes, BufWriter::new(file)).map_err(to_conversion)?;
                writer.flush().map_err(|e| ConversionError::Write {
                    path: path.display().to_string(),
                    source: e,
                })?;
                tracing::info!(path = %path.display(), format = token, "serialized graph to file");
                Ok(format!("Serialized to {}", path.display()))
            }
            None => {
                let text = rdfio::serialize_to_string(graph, token, &prefixes).map_err(to_conversion)?;
                tracing::debug!(format = token, bytes = text.len(), "serialized graph");
                Ok(text)
            }
        }
    }
}

fn named_node(iri: &str) -> ConversionResult<NamedNode> {
    NamedNode::new(iri).map_err(|e| ConversionError::InvalidIri {
        iri: iri.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::Literal;

    fn ex(local: &str) -> NamedNode {
        NamedNode::new(format!("http://example.org/{local}")).unwrap()
    }

    fn node(iri: &str) -> NamedNode {
        NamedNode::new(iri).unwrap()
    }

    fn converter() -> Converter {
        let registry = Arc::new(FormatRegistry::new());
        let loader = Arc::new(SourceLoader::new(Arc::clone(&registry)));
        Converter::new(registry, loader)
    }

    fn sample() -> Graph {
        [
            Triple::new(ex("alice"), ex("knows"), ex("bob")),
            Triple::new(ex("alice"), ex("name"), Literal::new_simple_literal("Alice")),
            Triple::new(ex("bob"), ex("name"), Literal::new_simple_literal("Bob")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn merge_has_set_semantics() {
        let c = converter();
        let a = sample();
        let b: Graph = [
            Triple::new(ex("alice"), ex("knows"), ex("bob")),
            Triple::new(ex("carol"), ex("knows"), ex("alice")),
        ]
        .into_iter()
        .collect();
        let merged = c.merge([&a, &b], None);
        assert_eq!(merged.len(), 4);

        let target: Graph = [Triple::new(ex("x"), ex("y"), ex("z"))].into_iter().collect();
        let merged = c.merge([&a], Some(target));
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn filter_by_predicate_only() {
        let c = converter();
        let filtered = c.filter(
            &sample(),
            &TripleFilter::new().predicates(["http://example.org/name"]),
        );
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|t| t.predicate == ex("name").as_ref()));
    }

    #[test]
    fn filter_combines_with_and() {
        let c = converter();
        let filter = TripleFilter::new()
            .subjects(["http://example.org/alice"])
            .objects(["Alice", "Bob"]);
        let filtered = c.filter(&sample(), &filter);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let c = converter();
        assert_eq!(c.filter(&sample(), &TripleFilter::new()).len(), 3);
    }

    #[test]
    fn validate_counts() {
        let c = converter();
        let mut graph = sample();
        graph.bind("ex", "http://example.org/");
        let stats = c.validate(&graph);
        assert_eq!(stats.total_triples, 3);
        assert_eq!(stats.unique_subjects, 2);
        assert_eq!(stats.unique_predicates, 2);
        assert_eq!(stats.unique_objects, 3);
        assert_eq!(stats.literals, 2);
        // three IRI subjects plus one IRI object
        assert_eq!(stats.uris, 4);
        assert_eq!(stats.blank_nodes, 0);
        assert!(stats.errors.is_empty());
        assert_eq!(stats.namespaces["ex"], "http://example.org/");
    }

    #[test]
    fn schema_keeps_only_definitions() {
        let c = converter();
        let graph: Graph = [
            Triple::new(ex("Dog"), node(vocab::RDFS_SUB_CLASS_OF), ex("Animal")),
            Triple::new(ex("rex"), node(vocab::RDF_TYPE), ex("Dog")),
            Triple::new(ex("Dog"), node(vocab::RDF_TYPE), node(vocab::OWL_CLASS)),
            Triple::new(ex("owner"), node(vocab::RDFS_DOMAIN), ex("Dog")),
            Triple::new(ex("rex"), ex("name"), Literal::new_simple_literal("Rex")),
        ]
        .into_iter()
        .collect();
        let schema = c.extract_schema(&graph);
        assert_eq!(schema.len(), 3);
        assert!(!schema.contains(&Triple::new(ex("rex"), node(vocab::RDF_TYPE), ex("Dog"))));
        assert_eq!(schema.prefixes().get("owl"), Some(vocab::OWL_NS));
    }

    #[test]
    fn replace_predicate_rewrites_all_uses() {
        let c = converter();
        let rules = vec![
            TransformRule::ReplacePredicate {
                old_predicate: "http://example.org/name".into(),
                new_predicate: "http://xmlns.com/foaf/0.1/name".into(),
            },
            TransformRule::AddNamespace {
                prefix: "foaf".into(),
                uri: "http://xmlns.com/foaf/0.1/".into(),
            },
            TransformRule::Unknown,
        ];
        let graph = c.apply_transformations(sample(), &rules).unwrap();
        assert_eq!(graph.len(), 3);
        let foaf_name = node("http://xmlns.com/foaf/0.1/name");
        assert_eq!(
            graph.iter().filter(|t| t.predicate == foaf_name.as_ref()).count(),
            2
        );
        assert_eq!(graph.prefixes().get("foaf"), Some("http://xmlns.com/foaf/0.1/"));
    }

    #[test]
    fn replace_predicate_rejects_relative_iris() {
        let c = converter();
        let rules = vec![TransformRule::ReplacePredicate {
            old_predicate: "name".into(),
            new_predicate: "http://example.org/n".into(),
        }];
        assert!(matches!(
            c.apply_transformations(sample(), &rules),
            Err(ConversionError::InvalidIri { .. })
        ));
    }

    #[test]
    fn serialize_unknown_format_is_turtle() {
        let c = converter().with_namespaces([("ex", "http://example.org/")]);
        let text = c.serialize(&sample(), "no-such-format", None).unwrap();
        assert!(text.contains("@prefix ex: <http://example.org/>"), "{text}");
        assert!(text.contains("ex:alice"), "{text}");
    }

    #[test]
    fn trix_has_no_writer() {
        let err = converter().serialize(&sample(), "trix", None).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Serialize {
                source: crate::error::CodecError::UnsupportedToken { .. },
                ..
            }
        ));
    }

    #[test]
    fn serialize_to_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.nt");
        let c = converter();
        let message = c.serialize(&sample(), "n_triples", Some(&path)).unwrap();
        assert_eq!(message, format!("Serialized to {}", path.display()));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 3);
    }

    #[test]
    fn convert_graph_binds_and_transforms() {
        let c = converter().with_transformations(vec![TransformRule::ReplacePredicate {
            old_predicate: "http://example.org/knows".into(),
            new_predicate: "http://xmlns.com/foaf/0.1/knows".into(),
        }]);
        let graph = c.convert_graph(sample(), "turtle").unwrap();
        assert_eq!(graph.prefixes().get("rdfs"), Some(vocab::RDFS_NS));
        assert!(graph.contains(&Triple::new(
            ex("alice"),
            node("http://xmlns.com/foaf/0.1/knows"),
            ex("bob")
        )));
    }
}
