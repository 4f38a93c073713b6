//! Run configuration.
//!
//! A [`PipelineConfig`] is built once per invocation and handed to the
//! [`Pipeline`](crate::pipeline::Pipeline); nothing reads configuration from
//! globals. Values are layered: built-in defaults, then an optional YAML
//! file, then command-line flags (see [`crate::cli`]).
//!
//! ```yaml
//! index_url: https://lite.cnn.com
//! output_dir: ./cnn-lite-articles
//! timeout_secs: 30
//! max_articles: 110
//! delay_ms: 2000
//! article:
//!   blocked_links:
//!     - https://www.cnn.com/terms
//! ```

use crate::error::ConfigError;
use crate::scrapers::{ArticleRules, IndexRules};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_INDEX_URL: &str = "https://lite.cnn.com";
pub const DEFAULT_OUTPUT_DIR: &str = "cnn-lite-articles";

/// Everything one pipeline run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Page listing the current articles.
    pub index_url: String,
    /// Directory receiving `<hash>.json` records.
    pub output_dir: PathBuf,
    /// Per-request timeout in seconds; `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
    /// Upper bound on articles processed per run.
    pub max_articles: usize,
    /// Pause between article fetches, in milliseconds.
    pub delay_ms: u64,
    /// Leave records whose hash is already stored untouched instead of
    /// rewriting them with a fresh `scraped_at`.
    pub skip_known: bool,
    pub index: IndexRules,
    pub article: ArticleRules,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timeout_secs: Some(30),
            user_agent: format!("lite_news_archive/{}", env!("CARGO_PKG_VERSION")),
            max_articles: 110,
            delay_ms: 2000,
            skip_known: false,
            index: IndexRules::default(),
            article: ArticleRules::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a YAML file; keys it omits keep their defaults.
    #[instrument(level = "info", skip(path), fields(path = %path.display()))]
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration file");
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
