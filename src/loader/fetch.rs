//! HTTP retrieval of remote sources.
//!
//! [`HttpFetch`] is the seam the loader talks to; [`UreqFetcher`] is the
//! blocking implementation used outside of tests.

use std::collections::BTreeMap;
use std::io::Read;
use std::time::Duration;

use crate::error::{FetchError, FetchResult};

/// A response as seen by the loader. Non-success statuses are returned,
/// not raised, so the caller decides what counts as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedDocument {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP GET.
pub trait HttpFetch: Send + Sync {
    fn get(&self, url: &str, headers: &BTreeMap<String, String>) -> FetchResult<FetchedDocument>;
}

/// [`HttpFetch`] over a `ureq` agent with a fixed timeout.
pub struct UreqFetcher {
    agent: ureq::Agent,
}

impl UreqFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Default for UreqFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl HttpFetch for UreqFetcher {
    fn get(&self, url: &str, headers: &BTreeMap<String, String>) -> FetchResult<FetchedDocument> {
        let mut request = self.agent.get(url);
        for (name, value) in headers {
            request = request.set(name, value);
        }

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(FetchError::Transport {
                    url: url.into(),
                    message: transport.to_string(),
                });
            }
        };

        let status = response.status();
        let content_type = response.header("Content-Type").map(str::to_string);
        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| FetchError::Body {
                url: url.into(),
                message: e.to_string(),
            })?;

        tracing::debug!(url, status, bytes = body.len(), "fetched remote source");
        Ok(FetchedDocument {
            status,
            content_type,
            body,
        })
    }
}
