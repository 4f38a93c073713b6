//! Error types for every stage of the ingestion pipeline.
//!
//! Only [`DiscoveryFailure`] is fatal for a run. Everything that can go
//! wrong with a single article is folded into [`ArticleError`], which the
//! orchestrator records as a skip before moving on to the next URL.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to retrieve a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS or body-decoding failure.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The configured request timeout elapsed.
    #[error("request to {url} timed out")]
    Timeout { url: String },
}

impl FetchError {
    /// Classify a reqwest error for `url`.
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// An expected piece of markup was missing or a selector was unusable.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("no content container matched any of {selectors:?}")]
    MissingContainer { selectors: Vec<String> },

    #[error("invalid page url: {0}")]
    Url(#[from] url::ParseError),
}

/// Failure to persist a record.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize record {hash}: {source}")]
    Serialize {
        hash: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored record {} is not valid JSON: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("record key {0:?} is not a lowercase hex digest")]
    InvalidKey(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// The index page could not be fetched or parsed. Fatal for the run.
#[derive(Debug, Error)]
pub enum DiscoveryFailure {
    #[error("could not fetch index page: {0}")]
    Fetch(#[from] FetchError),

    #[error("could not parse index page: {0}")]
    Parse(#[from] ParseError),
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Pipeline stage at which an article was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Parse,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Fetch => "fetch",
            Stage::Parse => "parse",
            Stage::Persist => "persist",
        })
    }
}

/// Any non-fatal failure while handling one article.
#[derive(Debug, Error)]
pub enum ArticleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ArticleError {
    pub fn stage(&self) -> Stage {
        match self {
            ArticleError::Fetch(_) => Stage::Fetch,
            ArticleError::Parse(_) => Stage::Parse,
            ArticleError::Store(_) => Stage::Persist,
        }
    }
}
