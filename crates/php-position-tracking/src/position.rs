//! Line/column/byte-offset positions in PHP source text.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A position in source text.
///
/// Lines and columns are 1-based; `offset` is the 0-based byte offset into
/// the UTF-8 source. Positions order by `offset` alone — line and column are
/// derived bookkeeping and always move together with the offset.
///
/// # Example
///
/// ```
/// use php_position_tracking::SourcePosition;
///
/// let mut pos = SourcePosition::start();
/// pos.advance_str("<?php\n$x");
/// assert_eq!(pos.line, 2);
/// assert_eq!(pos.column, 3);
/// assert_eq!(pos.offset, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based), counted in characters
    pub column: u32,
    /// Byte offset in the source (0-based)
    pub offset: usize,
}

impl SourcePosition {
    /// Position at the start of input.
    pub const fn start() -> Self {
        SourcePosition { line: 1, column: 1, offset: 0 }
    }

    /// Create a position from raw parts.
    pub const fn new(line: u32, column: u32, offset: usize) -> Self {
        SourcePosition { line, column, offset }
    }

    /// Advance past a single character, updating line and column.
    ///
    /// A `\r` only bumps the line when it is not followed by `\n`; callers
    /// that advance character-by-character should use [`advance_str`] over
    /// full slices so `\r\n` counts as one newline.
    ///
    /// [`advance_str`]: SourcePosition::advance_str
    pub fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Advance past a string slice, treating `\r\n` as a single newline.
    pub fn advance_str(&mut self, text: &str) {
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '\r' {
                self.offset += 1;
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    self.offset += 1;
                }
                self.line += 1;
                self.column = 1;
            } else {
                self.advance(ch);
            }
        }
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::start()
    }
}

impl PartialOrd for SourcePosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourcePosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
