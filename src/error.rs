//! Rich diagnostic error types for rdfq.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for rdfq.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum RdfqError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("file not found: {path}")]
    #[diagnostic(
        code(rdfq::load::not_found),
        help("Check the path. Relative paths are resolved against the current directory.")
    )]
    NotFound { path: String },

    #[error("failed to read {origin}: {source}")]
    #[diagnostic(
        code(rdfq::load::read),
        help("A filesystem or stream read failed. Check permissions and that the source is readable.")
    )]
    Read {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin} is not valid UTF-8: {message}")]
    #[diagnostic(
        code(rdfq::load::decode),
        help("Streams are decoded as UTF-8 text before parsing. Re-encode the input as UTF-8.")
    )]
    Decode { origin: String, message: String },

    #[error("failed to parse {origin} with any supported format ({attempts})")]
    #[diagnostic(
        code(rdfq::load::unparseable),
        help(
            "Every candidate format rejected the document. Pass the real format with \
             --format (turtle, rdf_xml, n_triples, json_ld, trig, n_quads) and check \
             the document for syntax errors."
        )
    )]
    Unparseable { origin: String, attempts: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fetch(#[from] FetchError),
}

/// Convenience alias for source loading results.
pub type LoadResult<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("HTTP {status} fetching {url}")]
    #[diagnostic(
        code(rdfq::fetch::status),
        help("The server answered with a non-success status. Check the URL and any required headers.")
    )]
    Status { url: String, status: u16 },

    #[error("transport error fetching {url}: {message}")]
    #[diagnostic(
        code(rdfq::fetch::transport),
        help(
            "The request could not be completed. Check that the host is reachable; \
             slow servers can be given more time with `http.timeout_secs` in the config."
        )
    )]
    Transport { url: String, message: String },

    #[error("failed to read response body from {url}: {message}")]
    #[diagnostic(code(rdfq::fetch::body))]
    Body { url: String, message: String },
}

/// Convenience alias for fetch results.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// ---------------------------------------------------------------------------
// Codec errors (single external-store parse/serialize call)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CodecError {
    #[error("format \"{token}\" is not supported by the RDF engine")]
    #[diagnostic(
        code(rdfq::codec::unsupported),
        help("TriX and RDF Thrift have no reader or writer in the engine. Use another format.")
    )]
    UnsupportedToken { token: String },

    #[error("invalid IRI <{iri}>: {message}")]
    #[diagnostic(code(rdfq::codec::invalid_iri))]
    InvalidIri { iri: String, message: String },

    #[error("syntax error: {message}")]
    #[diagnostic(code(rdfq::codec::syntax))]
    Syntax { message: String },

    #[error("I/O error: {source}")]
    #[diagnostic(code(rdfq::codec::io))]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Convenience alias for codec results.
pub type CodecResult<T> = std::result::Result<T, CodecError>;

// ---------------------------------------------------------------------------
// Conversion errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConversionError {
    #[error("failed to serialize graph as {format}: {source}")]
    #[diagnostic(
        code(rdfq::convert::serialize),
        help("The engine could not write the graph in this format. Try turtle or n_triples.")
    )]
    Serialize {
        format: String,
        #[source]
        source: CodecError,
    },

    #[error("failed to write {path}: {source}")]
    #[diagnostic(
        code(rdfq::convert::write),
        help("Check that the destination directory exists and is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid IRI <{iri}>: {message}")]
    #[diagnostic(
        code(rdfq::convert::invalid_iri),
        help("Transformation rules and namespaces need absolute IRIs such as http://example.org/p.")
    )]
    InvalidIri { iri: String, message: String },

    #[error("failed to load conversion source: {source}")]
    #[diagnostic(code(rdfq::convert::source))]
    Source {
        #[from]
        source: LoadError,
    },
}

/// Convenience alias for conversion results.
pub type ConversionResult<T> = std::result::Result<T, ConversionError>;

// ---------------------------------------------------------------------------
// Execution errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExecutionError {
    #[error("SPARQL query preparation failed: {message}")]
    #[diagnostic(
        code(rdfq::query::prepare),
        help(
            "The query could not be parsed. Common prefixes (rdf, rdfs, xsd, owl, foaf, \
             dc, dcterms, skos, ex) are declared automatically; declare any other prefix \
             with a PREFIX line."
        )
    )]
    Prepare { message: String },

    #[error("SPARQL evaluation failed: {message}")]
    #[diagnostic(code(rdfq::query::evaluate))]
    Evaluate { message: String },

    #[error("invalid binding for ?{name}: {message}")]
    #[diagnostic(
        code(rdfq::query::binding),
        help("Binding names must be valid SPARQL variable names, without the leading '?'.")
    )]
    InvalidBinding { name: String, message: String },

    #[error("expected a {expected} result but the query produced {actual}")]
    #[diagnostic(
        code(rdfq::query::shape),
        help("CONSTRUCT and DESCRIBE produce graphs, ASK produces a boolean, SELECT produces rows.")
    )]
    UnexpectedShape {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("SPARQL execution failed: {source}")]
    #[diagnostic(code(rdfq::query::source))]
    Source {
        #[from]
        source: LoadError,
    },

    #[error("SPARQL execution failed: {source}")]
    #[diagnostic(code(rdfq::query::output))]
    Output {
        #[from]
        source: ConversionError,
    },
}

/// Convenience alias for query execution results.
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    #[diagnostic(code(rdfq::config::read))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(rdfq::config::parse),
        help("The config file is TOML. Check the [http], [prefixes], [namespaces] and [[transformations]] tables.")
    )]
    Parse { path: String, message: String },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Convenience alias for top-level results.
pub type RdfqResult<T> = std::result::Result<T, RdfqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_is_transparent_through_load() {
        let err: LoadError = FetchError::Status {
            url: "http://example.org/data.ttl".into(),
            status: 404,
        }
        .into();
        assert_eq!(err.to_string(), "HTTP 404 fetching http://example.org/data.ttl");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("rdfq::fetch::status"));
    }

    #[test]
    fn execution_error_keeps_load_cause() {
        let err: ExecutionError = LoadError::NotFound {
            path: "missing.ttl".into(),
        }
        .into();
        assert!(err.to_string().contains("missing.ttl"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
