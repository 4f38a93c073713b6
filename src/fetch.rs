//! Page retrieval.
//!
//! [`Fetch`] is the seam between the orchestrator and the network: one call,
//! one request, no retries. [`HttpFetcher`] is the production implementation
//! on top of a shared `reqwest` client.

use crate::error::FetchError;
use std::time::Duration;
use tracing::{debug, instrument};

/// Something that can turn a URL into a page body.
pub trait Fetch {
    /// Retrieve the body of `url`, failing on network errors, non-2xx
    /// statuses and timeouts.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP fetcher with a fixed User-Agent and optional timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client. `timeout` of `None` waits indefinitely.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
