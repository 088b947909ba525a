//! Parsed HTML documents with selector queries
//!
//! A thin layer over `scraper` exposing only what the page parsers need:
//! select nodes by CSS pattern, read their text, attributes and parent.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// A CSS pattern that `scraper` could not parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid selector '{pattern}': {message}")]
pub struct SelectorError {
    pub pattern: String,
    pub message: String,
}

/// A parsed HTML page
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses an HTML body; malformed markup is recovered, never rejected
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// All nodes matching `pattern`, in document order
    pub fn select(&self, pattern: &str) -> Result<Vec<Node<'_>>, SelectorError> {
        let selector = compile(pattern)?;
        Ok(self.html.select(&selector).map(Node::new).collect())
    }

    /// The first node matching `pattern`
    pub fn select_first(&self, pattern: &str) -> Result<Option<Node<'_>>, SelectorError> {
        let selector = compile(pattern)?;
        Ok(self.html.select(&selector).next().map(Node::new))
    }

    /// Number of nodes matching `pattern`
    pub fn count(&self, pattern: &str) -> Result<usize, SelectorError> {
        let selector = compile(pattern)?;
        Ok(self.html.select(&selector).count())
    }
}

fn compile(pattern: &str) -> Result<Selector, SelectorError> {
    Selector::parse(pattern).map_err(|e| SelectorError {
        pattern: pattern.to_string(),
        message: format!("{:?}", e),
    })
}

/// One element of a `Document`
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

impl<'a> Node<'a> {
    fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Concatenated text of the element and its descendants
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Text with surrounding whitespace removed
    pub fn trimmed_text(&self) -> String {
        self.text().trim().to_string()
    }

    /// Value of an attribute
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// The enclosing element
    pub fn parent(&self) -> Option<Node<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(Node::new)
    }
}
