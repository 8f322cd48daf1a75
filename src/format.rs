//! RDF format registry: detection from file extensions and MIME types.
//!
//! The registry owns three fixed lookup tables (extension → format,
//! MIME type → format, format → engine token). It is built once and shared
//! by reference; nothing mutates it after construction.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::export::{FormatCatalog, FormatMetadata};

/// Supported RDF serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    #[serde(rename = "rdf_xml")]
    RdfXml,
    #[serde(rename = "turtle")]
    Turtle,
    #[serde(rename = "n_triples")]
    NTriples,
    #[serde(rename = "json_ld")]
    JsonLd,
    #[serde(rename = "trig")]
    TriG,
    #[serde(rename = "n_quads")]
    NQuads,
    #[serde(rename = "trix")]
    TriX,
    #[serde(rename = "rdf_thrift")]
    RdfThrift,
    #[serde(rename = "owl_xml")]
    OwlXml,
    #[serde(rename = "default")]
    Default,
}

impl Format {
    /// Every format, in declaration order.
    pub const ALL: [Format; 10] = [
        Format::RdfXml,
        Format::Turtle,
        Format::NTriples,
        Format::JsonLd,
        Format::TriG,
        Format::NQuads,
        Format::TriX,
        Format::RdfThrift,
        Format::OwlXml,
        Format::Default,
    ];

    /// The canonical lowercase name (`rdf_xml`, `turtle`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Format::RdfXml => "rdf_xml",
            Format::Turtle => "turtle",
            Format::NTriples => "n_triples",
            Format::JsonLd => "json_ld",
            Format::TriG => "trig",
            Format::NQuads => "n_quads",
            Format::TriX => "trix",
            Format::RdfThrift => "rdf_thrift",
            Format::OwlXml => "owl_xml",
            Format::Default => "default",
        }
    }

    /// Case-insensitive lookup by canonical name.
    pub fn from_name(name: &str) -> Option<Format> {
        let lower = name.trim().to_lowercase();
        Format::ALL.into_iter().find(|f| f.name() == lower)
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            Format::Default => "Default RDF format (automatically detected)",
            Format::RdfXml => "RDF/XML format - W3C standard XML serialization of RDF",
            Format::Turtle => "Turtle format - Terse RDF Triple Language",
            Format::NTriples => "N-Triples format - Simple line-based format",
            Format::JsonLd => "JSON-LD format - JSON for Linked Data",
            Format::TriG => "TriG format - Turtle with named graphs",
            Format::NQuads => "N-Quads format - N-Triples with named graphs",
            Format::TriX => "TriX format - Triples in XML (recognized, but cannot be read or written)",
            Format::RdfThrift => "RDF Thrift format - Binary RDF serialization (read and written as RDF/XML)",
            Format::OwlXml => "OWL/XML format - XML serialization of OWL ontologies",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// MIME type → format.
pub const MIME_TYPES: &[(&str, Format)] = &[
    ("application/rdf+xml", Format::RdfXml),
    ("application/xml", Format::RdfXml),
    ("text/xml", Format::RdfXml),
    ("text/turtle", Format::Turtle),
    ("application/turtle", Format::Turtle),
    ("application/x-turtle", Format::Turtle),
    ("application/n-triples", Format::NTriples),
    ("text/plain", Format::NTriples),
    ("application/ld+json", Format::JsonLd),
    ("application/json", Format::JsonLd),
    ("text/trig", Format::TriG),
    ("application/trig", Format::TriG),
    ("application/n-quads", Format::NQuads),
    ("text/n-quads", Format::NQuads),
    ("application/trix+xml", Format::TriX),
    ("application/rdf+thrift", Format::RdfThrift),
    ("application/owl+xml", Format::OwlXml),
];

/// File extension (with leading dot) → format.
pub const EXTENSIONS: &[(&str, Format)] = &[
    (".rdf", Format::RdfXml),
    (".xml", Format::RdfXml),
    (".ttl", Format::Turtle),
    (".nt", Format::NTriples),
    (".jsonld", Format::JsonLd),
    (".trig", Format::TriG),
    (".nq", Format::NQuads),
    (".trix", Format::TriX),
    (".trdf", Format::RdfThrift),
    (".owl", Format::OwlXml),
];

/// Format → token understood by the RDF engine adapter.
pub const ENGINE_TOKENS: &[(Format, &str)] = &[
    (Format::RdfXml, "xml"),
    (Format::Turtle, "turtle"),
    (Format::NTriples, "nt"),
    (Format::JsonLd, "json-ld"),
    (Format::TriG, "trig"),
    (Format::NQuads, "nquads"),
    (Format::TriX, "trix"),
    (Format::OwlXml, "xml"),
];

/// Token used for formats without an entry in [`ENGINE_TOKENS`].
pub const FALLBACK_ENGINE_TOKEN: &str = "xml";

/// `Accept` header sent when fetching remote sources.
pub const ACCEPT_HEADER: &str = "application/rdf+xml, text/turtle, application/ld+json, \
                                 application/n-triples, text/trig, application/n-quads, */*;q=0.1";

/// `User-Agent` header sent when fetching remote sources.
pub const USER_AGENT: &str = concat!("rdfq/", env!("CARGO_PKG_VERSION"));

/// Immutable lookup tables for format negotiation.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    by_extension: HashMap<&'static str, Format>,
    by_mime: HashMap<&'static str, Format>,
    tokens: HashMap<Format, &'static str>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Build the registry from the fixed tables.
    pub fn new() -> Self {
        Self {
            by_extension: EXTENSIONS.iter().copied().collect(),
            by_mime: MIME_TYPES.iter().copied().collect(),
            tokens: ENGINE_TOKENS.iter().copied().collect(),
        }
    }

    /// Detect the format of a source.
    ///
    /// A content type wins over the extension; parameters such as
    /// `; charset=utf-8` are ignored. Falls back to RDF/XML.
    pub fn detect(&self, source: &str, content_type: Option<&str>) -> Format {
        if let Some(format) = content_type.and_then(|ct| self.from_content_type(ct)) {
            return format;
        }
        self.from_extension(source).unwrap_or(Format::RdfXml)
    }

    /// Look up a MIME type, ignoring parameters and case.
    pub fn from_content_type(&self, content_type: &str) -> Option<Format> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        self.by_mime.get(essence.as_str()).copied()
    }

    /// Look up the lowercase extension of a path or URL.
    pub fn from_extension(&self, source: &str) -> Option<Format> {
        let ext = Path::new(source).extension()?.to_str()?.to_lowercase();
        self.by_extension.get(format!(".{ext}").as_str()).copied()
    }

    /// The engine token for a format. Unmapped formats use the RDF/XML token.
    pub fn engine_token(&self, format: Format) -> &'static str {
        self.tokens
            .get(&format)
            .copied()
            .unwrap_or(FALLBACK_ENGINE_TOKEN)
    }

    /// Headers for HTTP content negotiation.
    pub fn content_negotiation_headers(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("Accept".to_string(), ACCEPT_HEADER.to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ])
    }

    /// Metadata for a format name. Unknown names describe the default format.
    pub fn format_metadata(&self, name: &str) -> FormatMetadata {
        let format = Format::from_name(name).unwrap_or(Format::Default);
        FormatMetadata {
            format,
            engine_token: self.engine_token(format).to_string(),
            mime_types: MIME_TYPES
                .iter()
                .filter(|(_, f)| *f == format)
                .map(|(mime, _)| mime.to_string())
                .collect(),
            extensions: EXTENSIONS
                .iter()
                .filter(|(_, f)| *f == format)
                .map(|(ext, _)| ext.to_string())
                .collect(),
            description: format.description().to_string(),
        }
    }

    /// Check a format configuration.
    ///
    /// The name must be a known format; strict mode also requires a
    /// `format` key in `config`.
    pub fn validate_config(
        &self,
        name: &str,
        config: &serde_json::Map<String, serde_json::Value>,
        strict: bool,
    ) -> bool {
        if Format::from_name(name).is_none() {
            return false;
        }
        !strict || config.contains_key("format")
    }

    /// All supported MIME types, in table order.
    pub fn mime_types(&self) -> Vec<&'static str> {
        MIME_TYPES.iter().map(|(mime, _)| *mime).collect()
    }

    /// All supported file extensions, in table order.
    pub fn extensions(&self) -> Vec<&'static str> {
        EXTENSIONS.iter().map(|(ext, _)| *ext).collect()
    }

    /// Summary of everything the registry knows.
    pub fn catalog(&self) -> FormatCatalog {
        FormatCatalog {
            supported_formats: Format::ALL.iter().map(|f| f.name().to_string()).collect(),
            mime_types: self.mime_types().into_iter().map(String::from).collect(),
            extensions: self.extensions().into_iter().map(String::from).collect(),
            default_format: Format::Turtle.name().to_string(),
        }
    }
}
