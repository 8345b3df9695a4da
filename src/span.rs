//! Types representing spans of source code.
//!
//! # Converting From Tree-sitter Types
//!
//! Tree-sitter reasons about source locations in terms of points and byte
//! ranges. A point is a pair of 0-based `usize` indices for the row and
//! column, while a node's byte range is half-open. We keep byte spans as a
//! pair of `u32` values and only convert to a (1-based) [`Position`] when a
//! location has to be shown to a human.

use std::ops::Range;

/// A half-open byte span in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: SpanIndex,
    pub end: SpanIndex,
}

/// The integer type used for span indices.
type SpanIndex = u32;

impl Span {
    pub const ZERO: Span = Span { start: 0, end: 0 };

    /// Returns the length of the byte range represented by `self`. Note that
    /// this length is not necessarily the same as the number of characters in
    /// the byte range.
    pub fn length(&self) -> SpanIndex {
        self.end - self.start
    }

    pub fn range(&self) -> Range<usize> {
        (self.start as usize)..(self.end as usize)
    }
}

impl From<Range<usize>> for Span {
    fn from(value: Range<usize>) -> Self {
        Self {
            start: value.start as SpanIndex,
            end: value.end as SpanIndex,
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// A human-facing source position with 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl From<tree_sitter::Point> for Position {
    fn from(point: tree_sitter::Point) -> Self {
        Self {
            line: point.row + 1,
            column: point.column + 1,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
