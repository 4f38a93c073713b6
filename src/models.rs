//! Data models for scraped articles and their stored representation.
//!
//! - [`Article`]: fields extracted from one article page
//! - [`Link`]: an anchor found inside the article body
//! - [`ArticleRecord`]: the JSON document written to disk, keyed by its hash
//!
//! The field names of [`ArticleRecord`] are the on-disk schema read by
//! downstream consumers of the corpus. Do not rename them.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// An anchor inside an article body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Link {
    /// Absolute URL the anchor points to.
    pub url: String,
    /// Visible anchor text, trimmed.
    pub text: String,
}

impl Link {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// An article as extracted from its page, before hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// The page the article was fetched from.
    pub url: String,
    /// Headline, or empty.
    pub title: String,
    /// Publication date exactly as found on the page, or empty.
    pub date: String,
    /// Normalized byline, or empty.
    pub author: String,
    /// Body paragraphs joined by `\n`.
    pub text: String,
    /// Anchors in the body, in document order.
    pub links: Vec<Link>,
}

/// One stored article. Serialized as `<hash>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    pub url: String,
    pub title: String,
    pub date: String,
    pub author: String,
    pub text: String,
    pub links: Vec<Link>,
    /// Hex content digest; also the file stem.
    pub hash: String,
    /// RFC 3339 UTC timestamp of collection.
    pub scraped_at: String,
}

impl ArticleRecord {
    /// Stamp an article with its content hash and collection time.
    pub fn new(article: Article, hash: String, scraped_at: DateTime<Utc>) -> Self {
        Self {
            url: article.url,
            title: article.title,
            date: article.date,
            author: article.author,
            text: article.text,
            links: article.links,
            hash,
            scraped_at: scraped_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}
