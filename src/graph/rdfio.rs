//! Parse and serialize graphs through oxigraph's `io` module.
//!
//! Formats are addressed by engine token (`turtle`, `xml`, `nt`, ...), the
//! same tokens the format registry hands out. Tokens the engine has no
//! reader or writer for fail with [`CodecError::UnsupportedToken`].

use std::io::Write;

use oxigraph::io::{JsonLdProfileSet, RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::Triple;

use crate::error::{CodecError, CodecResult};
use crate::graph::{Graph, PrefixMap};

/// Map an engine token to an oxigraph format.
pub fn rdf_format(token: &str) -> Option<RdfFormat> {
    match token {
        "xml" => Some(RdfFormat::RdfXml),
        "turtle" => Some(RdfFormat::Turtle),
        "nt" => Some(RdfFormat::NTriples),
        "json-ld" => Some(RdfFormat::JsonLd {
            profile: JsonLdProfileSet::empty(),
        }),
        "trig" => Some(RdfFormat::TriG),
        "nquads" => Some(RdfFormat::NQuads),
        _ => None,
    }
}

/// Parse `data` into a fresh graph.
///
/// Quads are flattened into triples; the graph keeps every prefix the
/// document declared and `base_iri` when one is given.
pub fn parse(data: &[u8], token: &str, base_iri: Option<&str>) -> CodecResult<Graph> {
    let format = rdf_format(token).ok_or_else(|| CodecError::UnsupportedToken {
        token: token.to_string(),
    })?;

    let mut parser = RdfParser::from_format(format);
    if let Some(base) = base_iri {
        parser = parser
            .with_base_iri(base)
            .map_err(|e| CodecError::InvalidIri {
                iri: base.to_string(),
                message: e.to_string(),
            })?;
    }

    let mut reader = parser.for_reader(data);
    let mut graph = Graph::new();
    for quad in reader.by_ref() {
        let quad = quad.map_err(|e| CodecError::Syntax {
            message: e.to_string(),
        })?;
        graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
    }
    for (prefix, namespace) in reader.prefixes() {
        graph.bind(prefix, namespace);
    }
    if let Some(base) = base_iri {
        graph.set_base_iri(base);
    }
    Ok(graph)
}

/// Write `graph` to `writer`, abbreviating with `prefixes` where the format allows.
pub fn serialize<W: Write>(
    graph: &Graph,
    token: &str,
    prefixes: &PrefixMap,
    writer: W,
) -> CodecResult<W> {
    let format = rdf_format(token).ok_or_else(|| CodecError::UnsupportedToken {
        token: token.to_string(),
    })?;

    let mut serializer = RdfSerializer::from_format(format);
    for (prefix, namespace) in prefixes.iter() {
        serializer = serializer
            .with_prefix(prefix, namespace)
            .map_err(|e| CodecError::InvalidIri {
                iri: namespace.to_string(),
                message: e.to_string(),
            })?;
    }

    let mut out = serializer.for_writer(writer);
    for triple in graph.iter() {
        out.serialize_triple(triple)?;
    }
    Ok(out.finish()?)
}

/// Serialize into a UTF-8 string.
pub fn serialize_to_string(graph: &Graph, token: &str, prefixes: &PrefixMap) -> CodecResult<String> {
    let bytes = serialize(graph, token, prefixes, Vec::new())?;
    String::from_utf8(bytes).map_err(|e| CodecError::Syntax {
        message: format!("serializer produced invalid UTF-8: {e}"),
    })
}
