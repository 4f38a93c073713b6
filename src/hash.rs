//! Content hashing for article identity.
//!
//! The digest is SHA-256 over a canonical encoding of the content fields:
//! the compact JSON array
//!
//! ```text
//! ["v1", title, date, author, text, [[link_url, link_text], ...]]
//! ```
//!
//! JSON string escaping keeps field boundaries unambiguous, and
//! `serde_json` output for strings and arrays is byte-stable. The `url` of
//! the article is deliberately not part of the input, so the same story
//! served from two URLs maps to one record.
//!
//! Changing this encoding changes every digest and breaks deduplication
//! against records already on disk. Bump the version tag if it ever has to.

use crate::models::Article;
use sha2::{Digest, Sha256};

const ENCODING_VERSION: &str = "v1";

/// Canonical byte representation of an article's content fields.
pub fn canonical_bytes(article: &Article) -> Vec<u8> {
    let links: Vec<(&str, &str)> = article
        .links
        .iter()
        .map(|l| (l.url.as_str(), l.text.as_str()))
        .collect();
    let tuple = (
        ENCODING_VERSION,
        article.title.as_str(),
        article.date.as_str(),
        article.author.as_str(),
        article.text.as_str(),
        links,
    );
    serde_json::to_vec(&tuple).expect("string tuples always serialize to JSON")
}

/// Lowercase hex SHA-256 of [`canonical_bytes`].
///
/// # Returns
///
/// A 64-character digest that depends only on the content fields, never on
/// `article.url`.
pub fn content_hash(article: &Article) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_bytes(article));
    hex::encode(hasher.finalize())
}
