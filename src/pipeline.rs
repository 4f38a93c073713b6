//! The ingestion run: discover → fetch → parse → hash → persist.
//!
//! A run fetches the index page once, then walks the discovered article URLs
//! strictly one after another. Every article ends either as a
//! [`PersistedArticle`] or a [`SkippedArticle`]; only a failure to discover
//! the index aborts the run.

use crate::config::PipelineConfig;
use crate::error::{ArticleError, DiscoveryFailure, ParseError, Stage};
use crate::fetch::{Fetch, HttpFetcher};
use crate::hash::content_hash;
use crate::models::ArticleRecord;
use crate::scrapers::{discover_article_urls, parse_article};
use crate::store::{ArticleStore, PutOutcome};
use crate::utils::truncate_for_log;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// How a successfully handled article ended up on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleOutcome {
    /// First time this content was seen.
    Created,
    /// Same content already stored; record rewritten.
    Overwritten,
    /// Same content already stored byte-for-byte; nothing written.
    Unchanged,
    /// Hash already in the store and `skip_known` is set; not rewritten.
    Known,
}

impl From<PutOutcome> for ArticleOutcome {
    fn from(outcome: PutOutcome) -> Self {
        match outcome {
            PutOutcome::Created => ArticleOutcome::Created,
            PutOutcome::Overwritten => ArticleOutcome::Overwritten,
            PutOutcome::Unchanged => ArticleOutcome::Unchanged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedArticle {
    pub url: String,
    pub hash: String,
    pub outcome: ArticleOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedArticle {
    pub url: String,
    pub stage: Stage,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every attempted article was persisted.
    Complete,
    /// At least one article was skipped.
    Partial,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Unique article URLs found on the index page.
    pub discovered: usize,
    /// URLs actually processed (bounded by `max_articles`).
    pub attempted: usize,
    pub persisted: Vec<PersistedArticle>,
    pub skipped: Vec<SkippedArticle>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.persisted.len()
    }

    pub fn count(&self, outcome: ArticleOutcome) -> usize {
        self.persisted.iter().filter(|p| p.outcome == outcome).count()
    }

    pub fn status(&self) -> RunStatus {
        if self.skipped.is_empty() {
            RunStatus::Complete
        } else {
            RunStatus::Partial
        }
    }

    fn record(&mut self, url: String, result: Result<PersistedArticle, ArticleError>) {
        match result {
            Ok(persisted) => self.persisted.push(persisted),
            Err(e) => {
                warn!(%url, stage = %e.stage(), error = %e, "Skipping article");
                self.skipped.push(SkippedArticle {
                    url,
                    stage: e.stage(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// One configured ingestion pipeline.
pub struct Pipeline<F> {
    config: PipelineConfig,
    fetcher: F,
    store: ArticleStore,
}

impl Pipeline<HttpFetcher> {
    /// Pipeline fetching over HTTP with the configured User-Agent and timeout.
    pub fn new(config: PipelineConfig) -> Result<Self, reqwest::Error> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.timeout())?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: Fetch> Pipeline<F> {
    pub fn with_fetcher(config: PipelineConfig, fetcher: F) -> Self {
        let store = ArticleStore::new(config.output_dir.clone());
        Self {
            config,
            fetcher,
            store,
        }
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    /// Run the pipeline once.
    ///
    /// # Errors
    ///
    /// Only [`DiscoveryFailure`]: the index page could not be fetched or
    /// parsed. Per-article failures are reported in the summary.
    #[instrument(level = "info", skip(self), fields(index_url = %self.config.index_url))]
    pub async fn run_once(&self) -> Result<RunSummary, DiscoveryFailure> {
        let urls = self.discover().await.inspect_err(|e| {
            error!(error = %e, "Article discovery failed");
        })?;

        let mut summary = RunSummary {
            discovered: urls.len(),
            ..RunSummary::default()
        };
        if urls.is_empty() {
            warn!("No article links found; the index page structure may have changed");
            return Ok(summary);
        }
        if urls.len() > self.config.max_articles {
            info!(
                discovered = urls.len(),
                limit = self.config.max_articles,
                "Limiting articles processed this run"
            );
        }

        let known = self.known_hashes().await;
        let selected: Vec<String> = urls.into_iter().take(self.config.max_articles).collect();
        summary.attempted = selected.len();

        let total = selected.len();
        let delay = self.config.delay();
        let known = &known;
        let results: Vec<(String, Result<PersistedArticle, ArticleError>)> =
            stream::iter(selected.into_iter().enumerate())
                .then(move |(i, url)| async move {
                    if i > 0 && !delay.is_zero() {
                        sleep(delay).await;
                    }
                    info!(index = i + 1, total, %url, "Processing article");
                    let result = self.process_article(&url, known).await;
                    (url, result)
                })
                .collect()
                .await;

        for (url, result) in results {
            summary.record(url, result);
        }

        info!(
            discovered = summary.discovered,
            attempted = summary.attempted,
            succeeded = summary.succeeded(),
            created = summary.count(ArticleOutcome::Created),
            overwritten = summary.count(ArticleOutcome::Overwritten),
            unchanged = summary.count(ArticleOutcome::Unchanged),
            known = summary.count(ArticleOutcome::Known),
            skipped = summary.skipped.len(),
            "Run complete"
        );
        Ok(summary)
    }

    async fn discover(&self) -> Result<Vec<String>, DiscoveryFailure> {
        let base = Url::parse(&self.config.index_url).map_err(ParseError::from)?;
        let html = self.fetcher.fetch(&self.config.index_url).await?;
        Ok(discover_article_urls(&html, &base, &self.config.index)?)
    }

    async fn known_hashes(&self) -> HashSet<String> {
        if !self.config.skip_known {
            return HashSet::new();
        }
        match self.store.existing_hashes().await {
            Ok(hashes) => {
                info!(count = hashes.len(), "Loaded stored hashes");
                hashes
            }
            Err(e) => {
                warn!(error = %e, "Could not list stored records; rewriting everything");
                HashSet::new()
            }
        }
    }

    /// Fetch, parse, hash and store a single article.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute article URL.
    /// * `known` - Hashes to leave untouched; empty unless `skip_known` is set.
    ///
    /// # Errors
    ///
    /// An [`ArticleError`] whose [`stage`](ArticleError::stage) names the step
    /// that failed. The caller skips the article and moves on.
    #[instrument(level = "info", skip(self, known))]
    pub async fn process_article(
        &self,
        url: &str,
        known: &HashSet<String>,
    ) -> Result<PersistedArticle, ArticleError> {
        let html = self.fetcher.fetch(url).await?;
        let article = parse_article(&html, url, &self.config.article)?;
        let hash = content_hash(&article);

        if known.contains(&hash) {
            debug!(%hash, "Content already stored; leaving record as is");
            return Ok(PersistedArticle {
                url: url.to_string(),
                hash,
                outcome: ArticleOutcome::Known,
            });
        }

        let record = ArticleRecord::new(article, hash.clone(), Utc::now());
        let outcome = ArticleOutcome::from(self.store.put(&hash, &record).await?);
        info!(
            %hash,
            ?outcome,
            title = %truncate_for_log(&record.title, 50),
            "Saved article"
        );

        Ok(PersistedArticle {
            url: url.to_string(),
            hash,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::Article;
    use chrono::DateTime;
    use mockito::Server;
    use std::collections::HashMap;
    use std::path::Path;

    const INDEX: &str = "https://lite.cnn.com";

    /// Serves canned pages; anything else is a 404.
    struct FixtureFetcher {
        pages: HashMap<String, String>,
    }

    impl FixtureFetcher {
        fn new(pages: &[(&str, String)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.clone()))
                    .collect(),
            }
        }
    }

    impl Fetch for FixtureFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn index_page(paths: &[&str]) -> String {
        let items: String = paths
            .iter()
            .map(|p| format!(r#"<li class="card--lite"><a href="{p}">{p}</a></li>"#))
            .collect();
        format!("<html><body><ul>{items}</ul></body></html>")
    }

    fn article_page(title: &str, body: &str) -> String {
        format!(
            r#"<html><body><article class="article--lite">
                 <h2 class="headline--lite">{title}</h2>
                 <div class="byline--lite">By Jane Doe, CNN</div>
                 <div class="timestamp--lite">Updated: 9:41 AM EDT, Tue May 6, 2025</div>
                 <p class="paragraph--lite">{body}</p>
                 <p class="paragraph--lite">Read <a href="/2025/05/05/more">more</a>.</p>
               </article></body></html>"#
        )
    }

    fn config(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            index_url: INDEX.to_string(),
            output_dir: dir.to_path_buf(),
            delay_ms: 0,
            ..PipelineConfig::default()
        }
    }

    fn two_article_site() -> FixtureFetcher {
        FixtureFetcher::new(&[
            (INDEX, index_page(&["/a", "/b"])),
            ("https://lite.cnn.com/a", article_page("Story A", "Alpha text.")),
            ("https://lite.cnn.com/b", article_page("Story B", "Beta text.")),
        ])
    }

    fn stored_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn expected_hash(url: &str, html: &str) -> String {
        let article: Article = parse_article(html, url, &Default::default()).unwrap();
        content_hash(&article)
    }

    #[tokio::test]
    async fn test_two_articles_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::with_fetcher(config(dir.path()), two_article_site());

        let before = Utc::now();
        let summary = pipeline.run_once().await.unwrap();
        let after = Utc::now();

        assert_eq!(summary.discovered, 2);
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.count(ArticleOutcome::Created), 2);
        assert_eq!(summary.status(), RunStatus::Complete);

        let hash_a = expected_hash("https://lite.cnn.com/a", &article_page("Story A", "Alpha text."));
        let hash_b = expected_hash("https://lite.cnn.com/b", &article_page("Story B", "Beta text."));
        let mut expected = vec![format!("{hash_a}.json"), format!("{hash_b}.json")];
        expected.sort();
        assert_eq!(stored_files(dir.path()), expected);

        for (hash, url) in [(&hash_a, "https://lite.cnn.com/a"), (&hash_b, "https://lite.cnn.com/b")] {
            let record = pipeline.store().get(hash).await.unwrap().unwrap();
            assert_eq!(record.url, url);
            assert_eq!(&record.hash, hash);
            assert_eq!(record.author, "Jane Doe");
            assert!(record.text.ends_with("\nRead more."), "text: {:?}", record.text);
            assert_eq!(record.links.len(), 1);
            assert_eq!(record.links[0].url, "https://lite.cnn.com/2025/05/05/more");
            let scraped_at = DateTime::parse_from_rfc3339(&record.scraped_at).unwrap();
            let micros = scraped_at.timestamp_micros();
            assert!(micros >= before.timestamp_micros() && micros <= after.timestamp_micros());
        }
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::with_fetcher(config(dir.path()), two_article_site());

        pipeline.run_once().await.unwrap();
        let first = stored_files(dir.path());
        let summary = pipeline.run_once().await.unwrap();

        assert_eq!(stored_files(dir.path()), first);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.count(ArticleOutcome::Created), 0);
    }

    #[tokio::test]
    async fn test_identical_content_from_two_urls_is_stored_once() {
        let dir = tempfile::tempdir().unwrap();
        let same = article_page("Syndicated", "Same words.");
        let fetcher = FixtureFetcher::new(&[
            (INDEX, index_page(&["/a", "/b"])),
            ("https://lite.cnn.com/a", same.clone()),
            ("https://lite.cnn.com/b", same),
        ]);
        let pipeline = Pipeline::with_fetcher(config(dir.path()), fetcher);

        let summary = pipeline.run_once().await.unwrap();

        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.persisted[0].hash, summary.persisted[1].hash);
        assert_eq!(summary.count(ArticleOutcome::Created), 1);
        assert_eq!(stored_files(dir.path()).len(), 1);
    }

    #[tokio::test]
    async fn test_bad_articles_do_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FixtureFetcher::new(&[
            (INDEX, index_page(&["/a", "/broken", "/gone", "/b"])),
            ("https://lite.cnn.com/a", article_page("Story A", "Alpha text.")),
            ("https://lite.cnn.com/broken", "<html><body><div>No container</div></body></html>".to_string()),
            ("https://lite.cnn.com/b", article_page("Story B", "Beta text.")),
        ]);
        let pipeline = Pipeline::with_fetcher(config(dir.path()), fetcher);

        let summary = pipeline.run_once().await.unwrap();

        assert_eq!(summary.attempted, 4);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.status(), RunStatus::Partial);
        assert_eq!(
            summary
                .skipped
                .iter()
                .map(|s| (s.url.as_str(), s.stage))
                .collect::<Vec<_>>(),
            vec![
                ("https://lite.cnn.com/broken", Stage::Parse),
                ("https://lite.cnn.com/gone", Stage::Fetch),
            ]
        );
        assert!(summary.skipped[1].reason.contains("404"));
        assert_eq!(stored_files(dir.path()).len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_skips_only_that_article() {
        let dir = tempfile::tempdir().unwrap();
        let hash_a = expected_hash("https://lite.cnn.com/a", &article_page("Story A", "Alpha text."));
        // A directory squatting on the record path makes the write fail.
        std::fs::create_dir(dir.path().join(format!("{hash_a}.json"))).unwrap();
        let pipeline = Pipeline::with_fetcher(config(dir.path()), two_article_site());

        let summary = pipeline.run_once().await.unwrap();

        assert_eq!(summary.status(), RunStatus::Partial);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].url, "https://lite.cnn.com/a");
        assert_eq!(summary.skipped[0].stage, Stage::Persist);
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.persisted[0].url, "https://lite.cnn.com/b");
        let hash_b = &summary.persisted[0].hash;
        let record = pipeline.store().get(hash_b).await.unwrap().unwrap();
        assert_eq!(record.title, "Story B");
    }

    #[tokio::test]
    async fn test_unreachable_index_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::with_fetcher(config(dir.path()), FixtureFetcher::new(&[]));

        let err = pipeline.run_once().await.unwrap_err();

        assert!(matches!(err, DiscoveryFailure::Fetch(FetchError::Status { status: 404, .. })));
        assert!(stored_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_index_url_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig {
            index_url: "lite.cnn.com".to_string(),
            ..config(dir.path())
        };
        let pipeline = Pipeline::with_fetcher(cfg, two_article_site());

        let err = pipeline.run_once().await.unwrap_err();
        assert!(matches!(err, DiscoveryFailure::Parse(ParseError::Url(_))));
    }

    #[tokio::test]
    async fn test_empty_index_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FixtureFetcher::new(&[(INDEX, "<html><body></body></html>".to_string())]);
        let pipeline = Pipeline::with_fetcher(config(dir.path()), fetcher);

        let summary = pipeline.run_once().await.unwrap();

        assert_eq!(summary.discovered, 0);
        assert_eq!(summary.attempted, 0);
        assert_eq!(summary.status(), RunStatus::Complete);
    }

    #[tokio::test]
    async fn test_max_articles_bounds_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig {
            max_articles: 1,
            ..config(dir.path())
        };
        let pipeline = Pipeline::with_fetcher(cfg, two_article_site());

        let summary = pipeline.run_once().await.unwrap();

        assert_eq!(summary.discovered, 2);
        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.persisted[0].url, "https://lite.cnn.com/a");
        assert_eq!(stored_files(dir.path()).len(), 1);
    }

    #[tokio::test]
    async fn test_skip_known_leaves_existing_records_alone() {
        let dir = tempfile::tempdir().unwrap();
        Pipeline::with_fetcher(config(dir.path()), two_article_site())
            .run_once()
            .await
            .unwrap();
        let hash_a = expected_hash("https://lite.cnn.com/a", &article_page("Story A", "Alpha text."));
        let path_a = dir.path().join(format!("{hash_a}.json"));
        let before = std::fs::read(&path_a).unwrap();

        let cfg = PipelineConfig {
            skip_known: true,
            ..config(dir.path())
        };
        let summary = Pipeline::with_fetcher(cfg, two_article_site())
            .run_once()
            .await
            .unwrap();

        assert_eq!(summary.count(ArticleOutcome::Known), 2);
        assert_eq!(std::fs::read(&path_a).unwrap(), before);
    }

    #[tokio::test]
    async fn test_changed_text_creates_new_record() {
        let dir = tempfile::tempdir().unwrap();
        Pipeline::with_fetcher(config(dir.path()), two_article_site())
            .run_once()
            .await
            .unwrap();

        let updated = FixtureFetcher::new(&[
            (INDEX, index_page(&["/a", "/b"])),
            ("https://lite.cnn.com/a", article_page("Story A", "Alpha text, updated.")),
            ("https://lite.cnn.com/b", article_page("Story B", "Beta text.")),
        ]);
        let summary = Pipeline::with_fetcher(config(dir.path()), updated)
            .run_once()
            .await
            .unwrap();

        assert_eq!(summary.count(ArticleOutcome::Created), 1);
        assert_eq!(stored_files(dir.path()).len(), 3);
    }

    #[tokio::test]
    async fn test_http_pipeline_against_mock_server() {
        let mut server = Server::new_async().await;
        let index = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(index_page(&["/a", "/b"]))
            .create_async()
            .await;
        let a = server
            .mock("GET", "/a")
            .with_status(200)
            .with_body(article_page("Story A", "Alpha text."))
            .expect(1)
            .create_async()
            .await;
        let b = server
            .mock("GET", "/b")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig {
            index_url: server.url(),
            ..config(dir.path())
        };
        let pipeline = Pipeline::new(cfg).unwrap();

        let summary = pipeline.run_once().await.unwrap();

        assert_eq!(summary.discovered, 2);
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].stage, Stage::Fetch);
        assert_eq!(stored_files(dir.path()).len(), 1);
        index.assert_async().await;
        a.assert_async().await;
        b.assert_async().await;
    }
}
