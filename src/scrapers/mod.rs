//! HTML extraction for text-only news sites.
//!
//! Scraping happens in two phases:
//!
//! 1. **Indexing** ([`index`]): discover article URLs on the index page
//! 2. **Extraction** ([`article`]): pull title, date, author, body text and
//!    links out of each article page
//!
//! The defaults target [CNN Lite](https://lite.cnn.com), whose minimal,
//! stable markup makes it a good fit. Every selector lives in
//! [`IndexRules`] / [`ArticleRules`] so a drift in the markup is a
//! configuration change rather than a code change.

pub mod article;
pub mod authors;
pub mod index;

pub use article::{ArticleRules, parse_article};
pub use index::{IndexRules, discover_article_urls};
