//! Error types for the PHP parser.
//!
//! The lexical layer never fails — malformed input becomes `Unknown` tokens
//! and surfaces as a syntactic error downstream. Everything the parser can
//! report is a [`ParseError`]; fallible paths carry it through
//! [`ParseResult`] and propagate with `?`.
//!
//! With error recovery enabled the parser accumulates every recovered error
//! in source order instead of keeping only the first; see the parser crate's
//! `diagnostics()` accessor.

use php_position_tracking::SourceLocation;
use thiserror::Error;

/// Result type for parser operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors raised while parsing PHP source.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    /// The parser ran out of tokens mid-construct.
    #[error("Unexpected end of input")]
    UnexpectedEof,

    /// A `consume` failed: the next token was not what the grammar requires.
    #[error("Unexpected token: expected {expected}, found '{found}' at {location}")]
    UnexpectedToken {
        /// What the grammar required at this point
        expected: String,
        /// Text of the token actually found
        found: String,
        /// Where the offending token starts
        location: SourceLocation,
    },

    /// A structural rule was violated (try without catch/finally, key in a
    /// destructuring pattern, bad enum backing type, ...).
    #[error("Invalid syntax at {location}: {message}")]
    Syntax {
        /// Description of the violated rule
        message: String,
        /// Where the violation was detected
        location: SourceLocation,
    },

    /// Nesting exceeded the parser's recursion budget.
    #[error("Maximum recursion depth exceeded")]
    RecursionLimit,
}

impl ParseError {
    /// Convenience constructor for [`ParseError::Syntax`].
    pub fn syntax(message: impl Into<String>, location: SourceLocation) -> Self {
        ParseError::Syntax { message: message.into(), location }
    }

    /// Convenience constructor for [`ParseError::UnexpectedToken`].
    pub fn unexpected(
        expected: impl Into<String>,
        found: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            location,
        }
    }

    /// The source location the error points at, when it has one.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            ParseError::UnexpectedToken { location, .. } | ParseError::Syntax { location, .. } => {
                Some(location)
            }
            ParseError::UnexpectedEof | ParseError::RecursionLimit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use php_position_tracking::SourcePosition;

    fn loc() -> SourceLocation {
        SourceLocation::new(SourcePosition::new(3, 5, 40), SourcePosition::new(3, 6, 41))
    }

    #[test]
    fn test_display_messages() {
        let err = ParseError::unexpected("';'", "}", loc());
        assert_eq!(format!("{}", err), "Unexpected token: expected ';', found '}' at 3:5-3:6");

        let err = ParseError::syntax("try without catch or finally", loc());
        assert!(format!("{}", err).contains("try without catch or finally"));
    }

    #[test]
    fn test_location_accessor() {
        assert!(ParseError::unexpected("x", "y", loc()).location().is_some());
        assert!(ParseError::UnexpectedEof.location().is_none());
        assert!(ParseError::RecursionLimit.location().is_none());
    }
}
