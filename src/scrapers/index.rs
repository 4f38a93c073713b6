//! Article discovery on the index page.
//!
//! CNN Lite lists its stories as `.card--lite` items, each holding one
//! relative link such as `/2025/05/06/world/some-slug`. Links are resolved
//! against the index URL, restricted to the site's own domain, stripped of
//! fragments and de-duplicated in document order.
//!
//! When the listing region is missing (markup drift), every anchor on the
//! page is considered instead and kept only if its path looks like an
//! article path.

use crate::document::DocumentTree;
use crate::error::ParseError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::{Host, Url};

/// Markup heuristics for finding article links on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexRules {
    /// Anchors inside the article-listing region.
    pub listing_selector: String,
    /// Path fragments that mark an article URL in the fallback pass.
    pub article_markers: Vec<String>,
    /// Registrable domain article links must belong to. When unset it is
    /// guessed as the last two labels of the index host, which is wrong for
    /// multi-label public suffixes: an index on `www.bbc.co.uk` would admit
    /// every `*.co.uk` host. Set it explicitly (`bbc.co.uk`) for such sites.
    pub site_domain: Option<String>,
}

impl Default for IndexRules {
    fn default() -> Self {
        Self {
            listing_selector: ".card--lite a[href]".to_string(),
            article_markers: ["/202", "/article/", "/news/", "/politics/", "/business/", "/world/"]
                .into_iter()
                .map(String::from)
                .collect(),
            site_domain: None,
        }
    }
}

/// Extract unique absolute article URLs from the index page HTML.
///
/// # Arguments
///
/// * `html` - Body of the index page.
/// * `base` - URL the page was fetched from; relative links resolve against it.
/// * `rules` - Listing selector, fallback markers and domain restriction.
///
/// # Returns
///
/// Absolute `http(s)` URLs on the site's domain, without fragments, in
/// first-seen order. An empty result is not an error; the caller decides
/// how to report it.
///
/// # Errors
///
/// [`ParseError::Selector`] when the listing selector is malformed.
#[instrument(level = "info", skip_all, fields(%base))]
pub fn discover_article_urls(
    html: &str,
    base: &Url,
    rules: &IndexRules,
) -> Result<Vec<String>, ParseError> {
    let document = DocumentTree::parse(html);
    let domain = match &rules.site_domain {
        Some(domain) => domain.trim_start_matches('.').to_ascii_lowercase(),
        None => site_domain(base),
    };

    let listed = resolve_all(&document, &rules.listing_selector, base, &domain)?;
    let urls = if listed.is_empty() {
        warn!(
            selector = %rules.listing_selector,
            "Listing region matched no article links; scanning all anchors"
        );
        resolve_all(&document, "a[href]", base, &domain)?
            .into_iter()
            .filter(|u| rules.article_markers.iter().any(|m| u.path().contains(m.as_str())))
            .collect()
    } else {
        listed
    };

    let urls: Vec<String> = urls.into_iter().map(String::from).unique().collect();
    info!(count = urls.len(), "Indexed article URLs");
    debug!(urls = ?urls, "Article URLs");
    Ok(urls)
}

fn resolve_all(
    document: &DocumentTree,
    css: &str,
    base: &Url,
    domain: &str,
) -> Result<Vec<Url>, ParseError> {
    Ok(document
        .select(css)?
        .into_iter()
        .filter_map(|a| a.attr("href"))
        .filter_map(|href| base.join(href).ok())
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .filter(|u| {
            u.host_str()
                .is_some_and(|h| h == domain || h.ends_with(&format!(".{domain}")))
        })
        .map(|mut u| {
            u.set_fragment(None);
            u
        })
        .collect())
}

/// The last two labels of the base host (`lite.cnn.com` -> `cnn.com`).
/// IP hosts are returned as-is. Not public-suffix aware; see
/// [`IndexRules::site_domain`].
fn site_domain(base: &Url) -> String {
    match base.host() {
        Some(Host::Domain(host)) => {
            let labels: Vec<&str> = host.split('.').collect();
            if labels.len() > 2 {
                labels[labels.len() - 2..].join(".")
            } else {
                host.to_string()
            }
        }
        Some(ip) => ip.to_string(),
        None => String::new(),
    }
}
