//! # Lite News Archive
//!
//! Runs the archive pipeline once: discover the articles on the index page,
//! extract each one, and store it as `<hash>.json` in the output directory.
//! Meant to be invoked periodically by an external scheduler.
//!
//! ## Usage
//!
//! ```sh
//! lite_news_archive -o ./cnn-lite-articles
//! ```
//!
//! ## Exit status
//!
//! `0` when the run completed, even if some articles were skipped; non-zero
//! when the index page could not be discovered or the output directory is
//! unusable.

use clap::Parser;
use lite_news_archive::cli::Cli;
use lite_news_archive::utils::ensure_writable_dir;
use lite_news_archive::{Pipeline, RunStatus};
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("lite_news_archive starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");
    let config = args.into_config()?;
    info!(
        index_url = %config.index_url,
        output_dir = %config.output_dir.display(),
        timeout_secs = ?config.timeout_secs,
        max_articles = config.max_articles,
        "Resolved configuration"
    );

    if let Err(e) = ensure_writable_dir(&config.output_dir).await {
        error!(
            path = %config.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let pipeline = Pipeline::new(config)?;
    let summary = pipeline.run_once().await?;

    for skipped in &summary.skipped {
        warn!(url = %skipped.url, stage = %skipped.stage, reason = %skipped.reason, "Skipped");
    }

    let elapsed = start_time.elapsed();
    match summary.status() {
        RunStatus::Complete => info!(
            discovered = summary.discovered,
            succeeded = summary.succeeded(),
            output_dir = %pipeline.store().root().display(),
            secs = elapsed.as_secs(),
            "Archive run complete"
        ),
        RunStatus::Partial => warn!(
            discovered = summary.discovered,
            succeeded = summary.succeeded(),
            skipped = summary.skipped.len(),
            output_dir = %pipeline.store().root().display(),
            secs = elapsed.as_secs(),
            "Archive run finished with skipped articles"
        ),
    }

    Ok(())
}
