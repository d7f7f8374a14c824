//! Source location tracking
//!
//! Statements are parsed one at a time from slices of the full script, so a
//! `Span` is always rebased onto the full script text before it is stored.

use serde::Serialize;

/// Span representing a location in source code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}

impl Span {
    /// Build a span for `start..end` of `source`, computing line and column.
    pub fn new(source: &str, start: usize, end: usize) -> Self {
        let (line, col) = line_col(source, start);
        Self {
            start,
            end,
            line,
            col,
        }
    }

    /// Rebase a pest span produced while parsing a slice that starts at
    /// `offset` in `source`.
    pub fn from_pest_span(span: pest::Span, offset: usize, source: &str) -> Self {
        Self::new(source, offset + span.start(), offset + span.end())
    }

    /// The text covered by this span, if it lies within `source`.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}

/// 1-based line and column of a byte offset.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}
