//! # Lite News Archive
//!
//! Archives articles from text-only news sites (CNN Lite by default) as
//! content-addressed JSON files.
//!
//! ## Architecture
//!
//! Each run is a straight pipeline:
//! 1. **Discovery**: fetch the index page and collect article URLs ([`scrapers::index`])
//! 2. **Fetching**: download each article page ([`fetch`])
//! 3. **Extraction**: pull title, date, author, text and links ([`scrapers::article`])
//! 4. **Hashing**: digest the content fields ([`hash`])
//! 5. **Storage**: write `<hash>.json` ([`store`])
//!
//! Identical content always hashes to the same file name, so re-running the
//! pipeline never duplicates a story, even when it moves to a new URL.
//!
//! ```no_run
//! use lite_news_archive::{Pipeline, PipelineConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let summary = pipeline.run_once().await?;
//! println!("stored {} of {} articles", summary.succeeded(), summary.discovered);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod hash;
pub mod models;
pub mod pipeline;
pub mod scrapers;
pub mod store;
pub mod utils;

pub use config::PipelineConfig;
pub use error::{ArticleError, DiscoveryFailure, FetchError, ParseError, Stage, StoreError};
pub use models::{Article, ArticleRecord, Link};
pub use pipeline::{Pipeline, RunStatus, RunSummary};
