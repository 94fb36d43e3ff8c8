//! Source locations spanning a start and end position.

use crate::SourcePosition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A span of source text between two positions.
///
/// # Invariants
///
/// - `start.offset <= end.offset` (enforced by constructors in debug mode)
/// - Spans are half-open intervals: `[start.offset, end.offset)`
///
/// The optional `source` names the originating file or buffer; it is carried
/// through [`merge`](SourceLocation::merge) so diagnostics keep their origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Start of the span (inclusive)
    pub start: SourcePosition,
    /// End of the span (exclusive)
    pub end: SourcePosition,
    /// Optional name of the originating source (file path, buffer label)
    pub source: Option<Arc<str>>,
}

impl SourceLocation {
    /// Create a new location spanning `start..end`.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `start.offset > end.offset`.
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "SourceLocation: start ({}) > end ({})",
            start.offset,
            end.offset
        );
        SourceLocation { start, end, source: None }
    }

    /// Create an empty location at the given position.
    pub const fn empty(pos: SourcePosition) -> Self {
        SourceLocation { start: pos, end: pos, source: None }
    }

    /// Attach a source name.
    pub fn with_source(mut self, source: Arc<str>) -> Self {
        self.source = Some(source);
        self
    }

    /// Length of the span in bytes.
    pub const fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    /// True if the span is empty.
    pub const fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// True if the span contains the given byte offset.
    pub const fn contains(&self, offset: usize) -> bool {
        offset >= self.start.offset && offset < self.end.offset
    }

    /// Merge two locations into one covering both.
    ///
    /// The result spans from the earlier start to the later end; the source
    /// name is taken from `a` when present, otherwise from `b`.
    pub fn merge(a: &SourceLocation, b: &SourceLocation) -> SourceLocation {
        let start = if a.start <= b.start { a.start } else { b.start };
        let end = if a.end >= b.end { a.end } else { b.end };
        let source = a.source.clone().or_else(|| b.source.clone());
        SourceLocation { start, end, source }
    }

    /// Extract the spanned slice of source text.
    ///
    /// Returns `None` if the span is out of bounds or not on a char boundary.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start.offset..self.end.offset)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
