//! A thin capability layer over the `scraper` HTML tree.
//!
//! Parsers only ever need three things from a page: find elements matching
//! a CSS selector, read an element's trimmed text, and read an attribute.
//! [`DocumentTree`] and [`Node`] expose exactly that, so the extraction
//! rules never touch the HTML library directly.

use crate::error::ParseError;
use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};

/// Compile a CSS selector, mapping failures into [`ParseError`].
pub fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// A parsed HTML document.
pub struct DocumentTree {
    html: Html,
}

impl DocumentTree {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    /// All elements matching `css`, in document order.
    pub fn select(&self, css: &str) -> Result<Vec<Node<'_>>, ParseError> {
        let sel = selector(css)?;
        Ok(self.html.select(&sel).map(Node).collect())
    }

    /// The first element matching `css`, if any.
    pub fn select_first(&self, css: &str) -> Result<Option<Node<'_>>, ParseError> {
        let sel = selector(css)?;
        Ok(self.html.select(&sel).next().map(Node))
    }

    /// The first element matched by the first selector in `candidates`
    /// that matches anything.
    pub fn first_of<S: AsRef<str>>(&self, candidates: &[S]) -> Result<Option<Node<'_>>, ParseError> {
        for css in candidates {
            if let Some(node) = self.select_first(css.as_ref())? {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }
}

/// One element of a [`DocumentTree`].
#[derive(Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    /// Descendants matching `css`, in document order.
    pub fn select(&self, css: &str) -> Result<Vec<Node<'a>>, ParseError> {
        let sel = selector(css)?;
        Ok(self.0.select(&sel).map(Node).collect())
    }

    pub fn select_first(&self, css: &str) -> Result<Option<Node<'a>>, ParseError> {
        let sel = selector(css)?;
        Ok(self.0.select(&sel).next().map(Node))
    }

    /// Text content with surrounding whitespace removed and inner
    /// whitespace runs collapsed to a single space.
    ///
    /// Text nodes are concatenated before normalizing, so inline markup
    /// (`un<em>believ</em>able`) never introduces a space of its own.
    pub fn trimmed_text(&self) -> String {
        self.0.text().collect::<String>().split_whitespace().join(" ")
    }

    /// Attribute value, trimmed. Empty values count as absent.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0
            .value()
            .attr(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}
