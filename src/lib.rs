// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # rdfq
//!
//! Format negotiation, parsing and SPARQL querying over RDF data, backed by
//! oxigraph.
//!
//! ## Architecture
//!
//! - **Format registry** (`format`): extension / MIME type detection and engine tokens
//! - **Source loader** (`loader`): files, URLs and streams, with fallback parsing
//! - **Graph operations** (`graph::ops`): merge, filter, validate, schema, serialize
//! - **Query dispatch** (`query`): prefix injection, evaluation, result reshaping
//!
//! ## Library usage
//!
//! ```no_run
//! use rdfq::engine::Engine;
//! use rdfq::config::RdfqConfig;
//! use rdfq::graph::sparql::Bindings;
//! use rdfq::query::results::ResultFormat;
//!
//! let engine = Engine::new(RdfqConfig::default());
//! let graph = engine.load("people.ttl", None).unwrap();
//! let rows = engine
//!     .dispatcher()
//!     .query(&graph, "SELECT ?name WHERE { ?p foaf:name ?name }", ResultFormat::Csv, &Bindings::new())
//!     .unwrap();
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod format;
pub mod graph;
pub mod loader;
pub mod query;
pub mod vocab;
