//! Marker scanner: finds `{{...}}` placeholders without modifying the text.

use regex::Regex;
use std::sync::LazyLock;

/// `{{`, then one or more characters other than `}`, then `}}`.
///
/// Excluding `}` from the content makes the first close sequence win.
static MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("Invalid marker regex"));

/// Location of one marker occurrence in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSpan<'t> {
    /// Byte offset of the opening `{{`.
    pub start: usize,
    /// Byte offset just past the closing `}}`.
    pub end: usize,
    /// Text between the delimiters.
    pub content: &'t str,
}

/// Lazy iterator over marker spans, in increasing offset order.
///
/// A clone continues from the current position; call [`scan`] again for a
/// fresh pass.
#[derive(Debug, Clone)]
pub struct Markers<'t> {
    text: &'t str,
    pos: usize,
}

/// Scan `text` for markers.
pub fn scan(text: &str) -> Markers<'_> {
    Markers { text, pos: 0 }
}

impl<'t> Iterator for Markers<'t> {
    type Item = MarkerSpan<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.text.len() {
            return None;
        }
        let caps = MARKER_REGEX.captures_at(self.text, self.pos)?;
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;
        self.pos = whole.end();
        Some(MarkerSpan {
            start: whole.start(),
            end: whole.end(),
            content: inner.as_str(),
        })
    }
}
