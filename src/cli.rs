//! Command-line interface definitions.
//!
//! Every option can also come from an environment variable, which is how the
//! scheduler (cron, systemd timer, CI job) usually configures the binary.
//! Flags override values from the `--config` file, which override defaults.

use crate::config::PipelineConfig;
use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one archive run.
///
/// # Examples
///
/// ```sh
/// # Defaults: CNN Lite into ./cnn-lite-articles
/// lite_news_archive
///
/// # Custom output directory and a shorter timeout
/// lite_news_archive -o /srv/news --timeout-secs 10
///
/// # Selector overrides from a YAML file
/// lite_news_archive --config ./archive.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "LITE_NEWS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Index page listing the articles to archive
    #[arg(short, long, env = "LITE_NEWS_INDEX_URL")]
    pub index_url: Option<String>,

    /// Directory receiving one `<hash>.json` file per article
    #[arg(short, long, env = "LITE_NEWS_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds (0 disables the timeout)
    #[arg(long, env = "LITE_NEWS_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Maximum number of articles processed per run
    #[arg(long, env = "LITE_NEWS_MAX_ARTICLES")]
    pub max_articles: Option<usize>,

    /// Pause between article requests, in milliseconds
    #[arg(long, env = "LITE_NEWS_DELAY_MS")]
    pub delay_ms: Option<u64>,

    /// Do not rewrite records whose content hash is already stored
    #[arg(long, env = "LITE_NEWS_SKIP_KNOWN")]
    pub skip_known: bool,
}

impl Cli {
    /// Resolve the effective configuration for this run.
    pub fn into_config(self) -> Result<PipelineConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_yaml_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(index_url) = self.index_url {
            config.index_url = index_url;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = (secs > 0).then_some(secs);
        }
        if let Some(max_articles) = self.max_articles {
            config.max_articles = max_articles;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.delay_ms = delay_ms;
        }
        if self.skip_known {
            config.skip_known = true;
        }
        Ok(config)
    }
}
