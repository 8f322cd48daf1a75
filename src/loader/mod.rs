//! Source loading: resolve bytes from a URL, a path or a reader, pick a
//! format, and parse, retrying a fixed list of alternatives on failure.

pub mod fetch;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use oxigraph::model::NamedNode;

use crate::error::{FetchError, LoadError, LoadResult};
use crate::format::{Format, FormatRegistry};
use crate::graph::{Dataset, Graph, rdfio};

use self::fetch::{HttpFetch, UreqFetcher};

/// Formats tried, in order, after the first parse attempt fails.
pub const FALLBACK_FORMATS: [Format; 4] = [
    Format::Turtle,
    Format::RdfXml,
    Format::NTriples,
    Format::JsonLd,
];

const URL_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Where RDF data comes from.
pub enum Source<'a> {
    /// Remote document fetched over HTTP.
    Url(String),
    /// Local file.
    Path(PathBuf),
    /// Already-open byte stream, read to the end.
    Reader(Box<dyn Read + 'a>),
}

impl<'a> Source<'a> {
    /// Wrap a reader.
    pub fn reader(reader: impl Read + 'a) -> Self {
        Source::Reader(Box::new(reader))
    }

    /// Name used in logs, errors and dataset identifiers.
    pub fn origin(&self) -> String {
        match self {
            Source::Url(url) => url.clone(),
            Source::Path(path) => path.display().to_string(),
            Source::Reader(_) => "stream".to_string(),
        }
    }
}

impl fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Source::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Source::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// Whether `source` names a remote document (`http`, `https` or `ftp`).
pub fn is_url(source: &str) -> bool {
    source
        .split_once("://")
        .is_some_and(|(scheme, _)| URL_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()))
}

impl From<&str> for Source<'_> {
    fn from(source: &str) -> Self {
        if is_url(source) {
            Source::Url(source.to_string())
        } else {
            Source::Path(PathBuf::from(source))
        }
    }
}

impl From<String> for Source<'_> {
    fn from(source: String) -> Self {
        if is_url(&source) {
            Source::Url(source)
        } else {
            Source::Path(PathBuf::from(source))
        }
    }
}

impl From<&Path> for Source<'_> {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Source<'_> {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

/// `file://` IRI for a local path, made absolute first.
pub fn file_iri(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let text = absolute.to_string_lossy().replace('\\', "/").replace(' ', "%20");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}

/// Named-graph identifier for a source string: the string itself when it
/// is an absolute IRI, otherwise the `file://` IRI of the path.
pub fn graph_identifier(source: &str) -> Option<NamedNode> {
    if is_url(source) {
        return NamedNode::new(source).ok();
    }
    NamedNode::new(file_iri(Path::new(source))).ok()
}

/// Resolves sources into graphs.
pub struct SourceLoader {
    registry: Arc<FormatRegistry>,
    fetcher: Box<dyn HttpFetch>,
    headers: BTreeMap<String, String>,
}

impl SourceLoader {
    /// Loader with the default `ureq` fetcher.
    pub fn new(registry: Arc<FormatRegistry>) -> Self {
        Self::with_fetcher(registry, Box::new(UreqFetcher::default()))
    }

    pub fn with_fetcher(registry: Arc<FormatRegistry>, fetcher: Box<dyn HttpFetch>) -> Self {
        Self {
            registry,
            fetcher,
            headers: BTreeMap::new(),
        }
    }

    /// Extra request headers, applied over the negotiation headers.
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Load one source into a graph.
    ///
    /// A recognized `format_hint` wins over detection; an unrecognized one
    /// is ignored. `content_type` overrides the response header for URLs.
    pub fn load(
        &self,
        source: Source<'_>,
        format_hint: Option<&str>,
        content_type: Option<&str>,
    ) -> LoadResult<Graph> {
        let hinted = format_hint.and_then(Format::from_name);
        match source {
            Source::Url(url) => self.load_url(&url, hinted, content_type),
            Source::Path(path) => self.load_path(&path, hinted),
            Source::Reader(reader) => self.load_reader(reader, hinted),
        }
    }

    fn load_url(
        &self,
        url: &str,
        hinted: Option<Format>,
        content_type: Option<&str>,
    ) -> LoadResult<Graph> {
        let mut headers = self.registry.content_negotiation_headers();
        headers.extend(self.headers.clone());

        tracing::debug!(url, "fetching remote source");
        let document = self.fetcher.get(url, &headers)?;
        if !document.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: document.status,
            }
            .into());
        }

        let content_type = content_type.or(document.content_type.as_deref());
        let format = hinted.unwrap_or_else(|| self.registry.detect(url, content_type));
        self.parse_with_fallback(&document.body, format, url, Some(url))
    }

    fn load_path(&self, path: &Path, hinted: Option<Format>) -> LoadResult<Graph> {
        let origin = path.display().to_string();
        if !path.exists() {
            return Err(LoadError::NotFound { path: origin });
        }
        let data = std::fs::read(path).map_err(|e| LoadError::Read {
            origin: origin.clone(),
            source: e,
        })?;
        let format = hinted.unwrap_or_else(|| self.registry.detect(&origin, None));
        let base = file_iri(path);
        let mut graph = self.parse_with_fallback(&data, format, &origin, Some(&base))?;
        graph.clear_base_iri();
        Ok(graph)
    }

    fn load_reader(&self, mut reader: Box<dyn Read + '_>, hinted: Option<Format>) -> LoadResult<Graph> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).map_err(|e| LoadError::Read {
            origin: "stream".into(),
            source: e,
        })?;
        let text = String::from_utf8(data).map_err(|e| LoadError::Decode {
            origin: "stream".into(),
            message: e.to_string(),
        })?;
        let format = hinted.unwrap_or(Format::Turtle);
        self.parse_with_fallback(text.as_bytes(), format, "stream", None)
    }

    /// Parse `data` as `format`, then as each of [`FALLBACK_FORMATS`] whose
    /// engine token has not been tried yet. The first success wins.
    pub fn parse_with_fallback(
        &self,
        data: &[u8],
        format: Format,
        origin: &str,
        base_iri: Option<&str>,
    ) -> LoadResult<Graph> {
        let candidates = std::iter::once(format).chain(
            FALLBACK_FORMATS
                .into_iter()
                .filter(|candidate| *candidate != format),
        );

        let mut attempted: Vec<&'static str> = Vec::new();
        for candidate in candidates {
            let token = self.registry.engine_token(candidate);
            if attempted.contains(&token) {
                continue;
            }
            attempted.push(token);

            match rdfio::parse(data, token, base_iri) {
                Ok(graph) => {
                    tracing::info!(
                        triples = graph.len(),
                        source = origin,
                        format = token,
                        "parsed source"
                    );
                    return Ok(graph);
                }
                Err(e) => {
                    if attempted.len() == 1 {
                        tracing::warn!(source = origin, format = token, error = %e, "parse failed, trying alternative formats");
                    } else {
                        tracing::debug!(source = origin, format = token, error = %e, "alternative format failed");
                    }
                }
            }
        }

        Err(LoadError::Unparseable {
            origin: origin.to_string(),
            attempts: attempted.join(", "),
        })
    }

    /// Load several sources as named graphs of one dataset.
    ///
    /// `format_hints` is keyed by the source string. A source that fails to
    /// load is logged and skipped.
    pub fn load_dataset<S: AsRef<str>>(
        &self,
        sources: &[S],
        format_hints: &BTreeMap<String, String>,
    ) -> Dataset {
        let mut dataset = Dataset::new();
        for source in sources {
            let source = source.as_ref();
            let hint = format_hints.get(source).map(String::as_str);
            let graph = match self.load(Source::from(source), hint, None) {
                Ok(graph) => graph,
                Err(e) => {
                    tracing::warn!(source, error = %e, "skipping source");
                    continue;
                }
            };
            let Some(name) = graph_identifier(source) else {
                tracing::warn!(source, "skipping source without a usable graph identifier");
                continue;
            };
            tracing::info!(source, graph = %name, triples = graph.len(), "added named graph");
            dataset.add_graph(name, graph);
        }
        dataset
    }
}

impl fmt::Debug for SourceLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceLoader")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::fetch::FetchedDocument;
    use super::*;
    use crate::error::FetchResult;

    const TURTLE: &str = "@prefix ex: <http://example.org/> .\nex:a ex:p ex:b .\nex:a ex:q \"x\" .\n";

    struct StubFetcher {
        response: FetchedDocument,
        seen: Mutex<Vec<BTreeMap<String, String>>>,
    }

    impl HttpFetch for StubFetcher {
        fn get(&self, _url: &str, headers: &BTreeMap<String, String>) -> FetchResult<FetchedDocument> {
            self.seen.lock().unwrap().push(headers.clone());
            Ok(self.response.clone())
        }
    }

    fn loader_with(status: u16, content_type: Option<&str>, body: &str) -> SourceLoader {
        SourceLoader::with_fetcher(
            Arc::new(FormatRegistry::new()),
            Box::new(StubFetcher {
                response: FetchedDocument {
                    status,
                    content_type: content_type.map(String::from),
                    body: body.as_bytes().to_vec(),
                },
                seen: Mutex::new(Vec::new()),
            }),
        )
    }

    #[test]
    fn url_classification() {
        assert!(is_url("http://example.org/a.ttl"));
        assert!(is_url("HTTPS://example.org/a.ttl"));
        assert!(is_url("ftp://example.org/a.ttl"));
        assert!(!is_url("file:///tmp/a.ttl"));
        assert!(!is_url("data/a.ttl"));
        assert!(matches!(Source::from("http://x.org/a"), Source::Url(_)));
        assert!(matches!(Source::from("a.ttl"), Source::Path(_)));
    }

    #[test]
    fn stream_defaults_to_turtle() {
        let loader = loader_with(200, None, "");
        let graph = loader
            .load(Source::reader(TURTLE.as_bytes()), None, None)
            .unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn stream_must_be_utf8() {
        let loader = loader_with(200, None, "");
        let err = loader
            .load(Source::reader(&[0xff, 0xfe, 0x00][..]), None, None)
            .unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }

    #[test]
    fn wrong_hint_recovers_through_fallback() {
        let loader = loader_with(200, None, "");
        let graph = loader
            .load(Source::reader(TURTLE.as_bytes()), Some("json_ld"), None)
            .unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn unknown_hint_is_ignored() {
        let loader = loader_with(200, None, "");
        let graph = loader
            .load(Source::reader(TURTLE.as_bytes()), Some("no-such-format"), None)
            .unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn fallback_exhaustion_lists_attempts() {
        let loader = loader_with(200, None, "");
        let err = loader
            .parse_with_fallback(b"this is { not rdf", Format::OwlXml, "junk", None)
            .unwrap_err();
        let LoadError::Unparseable { origin, attempts } = err else {
            panic!("expected Unparseable");
        };
        assert_eq!(origin, "junk");
        assert_eq!(attempts, "xml, turtle, nt, json-ld");
    }

    #[test]
    fn url_uses_response_content_type_and_base() {
        let loader = loader_with(200, Some("text/turtle; charset=utf-8"), "<a> <http://example.org/p> <b> .");
        let graph = loader
            .load(Source::from("http://example.org/data/doc"), None, None)
            .unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.base_iri(), Some("http://example.org/data/doc"));
    }

    #[test]
    fn url_sends_negotiation_and_extra_headers() {
        let stub = Arc::new(StubFetcher {
            response: FetchedDocument {
                status: 200,
                content_type: Some("text/turtle".into()),
                body: TURTLE.as_bytes().to_vec(),
            },
            seen: Mutex::new(Vec::new()),
        });

        struct Shared(Arc<StubFetcher>);
        impl HttpFetch for Shared {
            fn get(&self, url: &str, headers: &BTreeMap<String, String>) -> FetchResult<FetchedDocument> {
                self.0.get(url, headers)
            }
        }

        let loader = SourceLoader::with_fetcher(
            Arc::new(FormatRegistry::new()),
            Box::new(Shared(Arc::clone(&stub))),
        )
        .with_headers(BTreeMap::from([("Authorization".to_string(), "Bearer x".to_string())]));
        loader
            .load(Source::from("https://example.org/doc"), None, None)
            .unwrap();

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0]["Accept"].contains("text/turtle"));
        assert!(seen[0].contains_key("User-Agent"));
        assert_eq!(seen[0]["Authorization"], "Bearer x");
    }

    #[test]
    fn non_success_status_is_a_fetch_error() {
        let loader = loader_with(404, Some("text/html"), "not found");
        let err = loader
            .load(Source::from("http://example.org/missing.ttl"), None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Fetch(FetchError::Status { status: 404, .. })
        ));
    }

    #[test]
    fn missing_path_is_not_found() {
        let loader = loader_with(200, None, "");
        let err = loader
            .load(Source::from("/definitely/not/here.ttl"), None, None)
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn dataset_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.ttl");
        std::fs::write(&good, TURTLE).unwrap();
        let missing = dir.path().join("missing.ttl");

        let loader = loader_with(200, None, "");
        let sources = [
            good.display().to_string(),
            missing.display().to_string(),
        ];
        let dataset = loader.load_dataset(&sources, &BTreeMap::new());
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.triple_count(), 2);
        let (name, _) = dataset.iter().next().unwrap();
        assert!(name.as_str().starts_with("file://"));
        assert!(name.as_str().ends_with("good.ttl"));
    }

    #[test]
    fn identifiers() {
        assert_eq!(
            graph_identifier("http://example.org/a.ttl").unwrap().as_str(),
            "http://example.org/a.ttl"
        );
        let local = graph_identifier("some dir/a.ttl").unwrap();
        assert!(local.as_str().starts_with("file:///"));
        assert!(local.as_str().ends_with("some%20dir/a.ttl"));
    }
}
