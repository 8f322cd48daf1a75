//! Engine facade: top-level API for rdfq.
//!
//! The `Engine` owns the format registry, the source loader, the graph
//! converter and the query dispatcher, wired together from one
//! [`RdfqConfig`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RdfqConfig;
use crate::error::RdfqResult;
use crate::format::FormatRegistry;
use crate::graph::ops::Converter;
use crate::graph::{Dataset, Graph};
use crate::loader::fetch::{HttpFetch, UreqFetcher};
use crate::loader::{Source, SourceLoader};
use crate::query::QueryDispatcher;

/// Shared components built from one configuration.
pub struct Engine {
    config: RdfqConfig,
    registry: Arc<FormatRegistry>,
    loader: Arc<SourceLoader>,
    converter: Arc<Converter>,
    dispatcher: Arc<QueryDispatcher>,
}

impl Engine {
    /// Build an engine that fetches remote sources with `ureq`.
    pub fn new(config: RdfqConfig) -> Self {
        let fetcher = UreqFetcher::new(Duration::from_secs(config.http.timeout_secs));
        Self::with_fetcher(config, Box::new(fetcher))
    }

    /// Build an engine around a custom HTTP fetcher.
    pub fn with_fetcher(config: RdfqConfig, fetcher: Box<dyn HttpFetch>) -> Self {
        let registry = Arc::new(FormatRegistry::new());
        let loader = Arc::new(
            SourceLoader::with_fetcher(Arc::clone(&registry), fetcher)
                .with_headers(config.http.headers.clone()),
        );
        let converter = Arc::new(
            Converter::new(Arc::clone(&registry), Arc::clone(&loader))
                .with_namespaces(config.namespaces.clone())
                .with_transformations(config.transformations.clone()),
        );
        let dispatcher = Arc::new(
            QueryDispatcher::new(Arc::clone(&loader), Arc::clone(&converter))
                .with_prefixes(config.prefixes.clone()),
        );

        tracing::debug!(
            timeout_secs = config.http.timeout_secs,
            prefixes = config.prefixes.len(),
            namespaces = config.namespaces.len(),
            transformations = config.transformations.len(),
            "initialized rdfq engine"
        );

        Self {
            config,
            registry,
            loader,
            converter,
            dispatcher,
        }
    }

    /// Build an engine from a TOML config file.
    pub fn from_config_file(path: &Path) -> RdfqResult<Self> {
        Ok(Self::new(RdfqConfig::load(path)?))
    }

    pub fn config(&self) -> &RdfqConfig {
        &self.config
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn loader(&self) -> &SourceLoader {
        &self.loader
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn dispatcher(&self) -> &QueryDispatcher {
        &self.dispatcher
    }

    /// Load one source with an optional format hint.
    pub fn load<'a>(&self, source: impl Into<Source<'a>>, format_hint: Option<&str>) -> RdfqResult<Graph> {
        Ok(self.loader.load(source.into(), format_hint, None)?)
    }

    /// Load several sources as named graphs, skipping failures.
    pub fn load_dataset<S: AsRef<str>>(&self, sources: &[S], format_hint: Option<&str>) -> Dataset {
        let hints = format_hint
            .map(|hint| {
                sources
                    .iter()
                    .map(|s| (s.as_ref().to_string(), hint.to_string()))
                    .collect()
            })
            .unwrap_or_default();
        self.loader.load_dataset(sources, &hints)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(RdfqConfig::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
