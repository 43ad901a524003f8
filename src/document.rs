//! Thin typed view over the parsed listing markup.
//!
//! Locator and extractor only ever talk to [`Document`], [`Pattern`] and
//! [`Node`], so selector strings stay configuration and the HTML parser
//! stays an implementation detail of this module.

use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, ScrapeError};

/// Parsed markup for one venue fetch.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse raw markup. The HTML parser itself recovers from any malformed
    /// input, so the only unusable markup is an empty body.
    pub fn parse(markup: &str) -> Result<Self> {
        if markup.trim().is_empty() {
            return Err(ScrapeError::Parse("empty document".to_string()));
        }
        Ok(Self {
            html: Html::parse_document(markup),
        })
    }

    pub fn root(&self) -> Node<'_> {
        Node(self.html.root_element())
    }

    /// Every element of the tree in document order, root included.
    pub fn elements(&self) -> impl Iterator<Item = Node<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .map(Node)
    }
}

/// A compiled structural pattern (tag + class combination).
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    selector: Selector,
}

impl Pattern {
    pub fn parse(source: &str) -> Result<Self> {
        let selector = Selector::parse(source)
            .map_err(|e| ScrapeError::Selector(format!("{source}: {e}")))?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// One element of a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    /// Descendants matching `pattern`, in document order.
    pub fn select_all(self, pattern: &Pattern) -> Vec<Node<'a>> {
        self.0.select(&pattern.selector).map(Node).collect()
    }

    pub fn first_match(self, pattern: &Pattern) -> Option<Node<'a>> {
        self.0.select(&pattern.selector).next().map(Node)
    }

    pub fn attribute(self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    /// Element descendants in document order, excluding the node itself.
    pub fn descendants(self) -> impl Iterator<Item = Node<'a>> {
        self.0.descendants().skip(1).filter_map(ElementRef::wrap).map(Node)
    }

    /// Concatenated text content of the node and all its descendants.
    pub fn text(self) -> String {
        self.0.text().collect()
    }

    /// Lowercase tag name.
    pub fn tag(self) -> &'a str {
        self.0.value().name()
    }

    pub(crate) fn element(self) -> ElementRef<'a> {
        self.0
    }
}
