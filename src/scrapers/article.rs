//! Field extraction from a single article page.
//!
//! A CNN Lite article page looks roughly like this:
//!
//! ```text
//! <article class="article--lite">
//!   <h2 class="headline--lite">…</h2>
//!   <div class="byline--lite">By Jane Doe, CNN</div>
//!   <div class="timestamp--lite">Updated: 9:41 AM EDT, Tue May 6, 2025</div>
//!   <p class="paragraph--lite">…</p>
//! </article>
//! ```
//!
//! The content container is the only required element. A page without one
//! is rejected with [`ParseError::MissingContainer`]; every other field
//! degrades to an empty string.

use crate::document::{DocumentTree, Node};
use crate::error::ParseError;
use crate::models::{Article, Link};
use crate::scrapers::authors::split_authors;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

/// Selectors and filters used to pull fields out of an article page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArticleRules {
    /// Candidate content containers, tried in order.
    pub container_selectors: Vec<String>,
    pub title_selector: String,
    /// Candidate date elements, tried in order; container first, then page.
    pub date_selectors: Vec<String>,
    /// Candidate byline elements, tried in order; container first, then page.
    pub author_selectors: Vec<String>,
    pub paragraph_selector: String,
    pub link_selector: String,
    /// Site chrome links dropped from `links`. Trailing slashes are ignored.
    pub blocked_links: Vec<String>,
}

impl Default for ArticleRules {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            container_selectors: owned(&[
                ".article--lite",
                "article",
                ".article-body",
                r#"[class*="article-content"]"#,
                r#"[class*="story-body"]"#,
                "main",
            ]),
            title_selector: "h1, h2, h3, h4, h5, h6".to_string(),
            date_selectors: owned(&[
                "time[datetime]",
                ".timestamp--lite",
                ".timestamp",
                r#"[class*="date"]"#,
                "[datetime]",
            ]),
            author_selectors: owned(&[
                ".byline--lite",
                ".author",
                r#"[rel="author"]"#,
                r#"[class*="author"]"#,
            ]),
            paragraph_selector: "p".to_string(),
            link_selector: "a".to_string(),
            blocked_links: owned(&[
                "https://www.cnn.com/",
                "https://www.cnn.com/terms",
                "https://www.cnn.com/privacy",
                "https://www.cnn.com/ad-choices",
            ]),
        }
    }
}

impl ArticleRules {
    fn is_blocked(&self, url: &str) -> bool {
        let url = url.trim_end_matches('/');
        self.blocked_links
            .iter()
            .any(|b| b.trim_end_matches('/') == url)
    }
}

/// Extract an [`Article`] from one page's HTML.
///
/// # Arguments
///
/// * `html` - Body of the article page.
/// * `url` - Where the page came from; stored as-is and used to resolve links.
/// * `rules` - Selectors for the container and each field.
///
/// # Returns
///
/// The article with paragraphs joined by `\n`. Title, date and author are
/// empty strings when the page has none.
///
/// # Errors
///
/// [`ParseError::MissingContainer`] when none of the container selectors
/// match, [`ParseError::Url`] for an unparsable `url`, and
/// [`ParseError::Selector`] for a malformed rule.
#[instrument(level = "info", skip(html, rules))]
pub fn parse_article(html: &str, url: &str, rules: &ArticleRules) -> Result<Article, ParseError> {
    let base = Url::parse(url)?;
    let document = DocumentTree::parse(html);

    let container = document
        .first_of(&rules.container_selectors)?
        .ok_or_else(|| ParseError::MissingContainer {
            selectors: rules.container_selectors.clone(),
        })?;

    let title = container
        .select_first(&rules.title_selector)?
        .map(|n| n.trimmed_text())
        .unwrap_or_default();

    let date = extract_date(&document, &container, rules)?;
    let author = extract_authors(&document, &container, rules)?.join(" and ");

    let text = container
        .select(&rules.paragraph_selector)?
        .iter()
        .map(Node::trimmed_text)
        .filter(|p| !p.is_empty())
        .join("\n");

    let links = extract_links(&container, &base, rules)?;

    debug!(
        title_len = title.len(),
        text_len = text.len(),
        links = links.len(),
        has_date = !date.is_empty(),
        has_author = !author.is_empty(),
        "Parsed article"
    );

    Ok(Article {
        url: url.to_string(),
        title,
        date,
        author,
        text,
        links,
    })
}

fn lookup<'a>(
    document: &'a DocumentTree,
    container: &Node<'a>,
    css: &str,
) -> Result<Vec<Node<'a>>, ParseError> {
    let scoped = container.select(css)?;
    if scoped.is_empty() {
        document.select(css)
    } else {
        Ok(scoped)
    }
}

fn extract_date(
    document: &DocumentTree,
    container: &Node<'_>,
    rules: &ArticleRules,
) -> Result<String, ParseError> {
    for css in &rules.date_selectors {
        for node in lookup(document, container, css)? {
            let value = node
                .attr("datetime")
                .map(str::to_string)
                .unwrap_or_else(|| node.trimmed_text());
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }
    Ok(String::new())
}

fn extract_authors(
    document: &DocumentTree,
    container: &Node<'_>,
    rules: &ArticleRules,
) -> Result<Vec<String>, ParseError> {
    for css in &rules.author_selectors {
        let authors: Vec<String> = lookup(document, container, css)?
            .iter()
            .flat_map(|n| split_authors(&n.trimmed_text()))
            .unique()
            .collect();
        if !authors.is_empty() {
            return Ok(authors);
        }
    }
    Ok(Vec::new())
}

fn extract_links(
    container: &Node<'_>,
    base: &Url,
    rules: &ArticleRules,
) -> Result<Vec<Link>, ParseError> {
    Ok(container
        .select(&rules.link_selector)?
        .iter()
        .filter_map(|a| {
            let href = a.attr("href")?;
            let resolved = base.join(href).ok()?;
            Some(Link::new(resolved.to_string(), a.trimmed_text()))
        })
        .filter(|link| !rules.is_blocked(&link.url))
        .collect())
}
