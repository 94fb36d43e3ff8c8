//! PHP Token Definitions
//!
//! This crate provides the shared token definitions used by the PHP parser
//! and related tools: the [`TokenKind`] classification, the [`Token`] record
//! with its exact source text and location, the case-insensitive keyword
//! table, and the mapping onto PHP's native `T_*` token-constant names.

use php_position_tracking::SourceLocation;
use std::sync::Arc;

mod keywords;
mod kind;
mod wire;

pub use keywords::lookup_keyword;
pub use kind::TokenKind;

/// Quote style of a string-family token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    /// Single-quoted: `'...'` (no interpolation)
    Single,
    /// Double-quoted: `"..."` (interpolated)
    Double,
    /// Backtick: `` `...` `` (shell execution)
    Backtick,
}

impl Quote {
    /// The quote character itself.
    pub const fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
            Quote::Backtick => '`',
        }
    }
}

/// Kind-specific data attached to a token.
///
/// Most tokens carry no payload; literals and names carry the decoded form
/// so the parser does not have to re-scan `text`.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenPayload {
    /// No extra data
    None,
    /// Number literal: float/int discrimination (`text` keeps the raw form)
    Number {
        /// True when the literal has a fractional part or exponent
        is_float: bool,
    },
    /// String-family token: decoded value and quote style
    Str {
        /// Content with quotes stripped (escapes left verbatim)
        value: Arc<str>,
        /// Quote character the literal used
        quote: Quote,
    },
    /// Identifier or variable: the bare name
    ///
    /// For `Variable` tokens this is the name without the leading `$`.
    Name {
        /// The name itself
        name: Arc<str>,
    },
}

/// Token produced by the tokenizer and consumed by the parser.
///
/// `text` is always the exact source slice covered by `location`, so
/// `source[location.start.offset..location.end.offset] == text` holds for
/// every token. Text is kept in an `Arc<str>` so buffering and lookahead can
/// clone tokens cheaply.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token classification for parser decision making
    pub kind: TokenKind,
    /// Exact source text for precise reconstruction
    pub text: Arc<str>,
    /// Source span of the token
    pub location: SourceLocation,
    /// Kind-specific data (decoded value, name, float flag)
    pub payload: TokenPayload,
}

impl Token {
    /// Create a new token without payload.
    pub fn new(kind: TokenKind, text: impl Into<Arc<str>>, location: SourceLocation) -> Self {
        Token { kind, text: text.into(), location, payload: TokenPayload::None }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: TokenPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True if the token text is empty (synthesized EOF).
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The bare name of an identifier or variable token, if any.
    pub fn name(&self) -> Option<&str> {
        match &self.payload {
            TokenPayload::Name { name } => Some(name),
            _ => None,
        }
    }

    /// The PHP `T_*` constant name for this token.
    ///
    /// Number tokens discriminate into `T_LNUMBER`/`T_DNUMBER` based on the
    /// payload; everything else delegates to [`TokenKind::php_token_type`].
    pub fn php_token_type(&self) -> Option<&'static str> {
        if self.kind == TokenKind::Number {
            return match self.payload {
                TokenPayload::Number { is_float: true } => Some("T_DNUMBER"),
                _ => Some("T_LNUMBER"),
            };
        }
        self.kind.php_token_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use php_position_tracking::SourcePosition;

    fn loc(start: usize, end: usize) -> SourceLocation {
        SourceLocation::new(
            SourcePosition::new(1, start as u32 + 1, start),
            SourcePosition::new(1, end as u32 + 1, end),
        )
    }

    #[test]
    fn test_token_basics() {
        let tok = Token::new(TokenKind::Identifier, "strlen", loc(0, 6))
            .with_payload(TokenPayload::Name { name: Arc::from("strlen") });
        assert_eq!(tok.len(), 6);
        assert_eq!(tok.name(), Some("strlen"));
        assert_eq!(tok.php_token_type(), Some("T_STRING"));
    }

    #[test]
    fn test_number_wire_type_discriminates() {
        let int = Token::new(TokenKind::Number, "42", loc(0, 2))
            .with_payload(TokenPayload::Number { is_float: false });
        let float = Token::new(TokenKind::Number, "4.2", loc(0, 3))
            .with_payload(TokenPayload::Number { is_float: true });
        assert_eq!(int.php_token_type(), Some("T_LNUMBER"));
        assert_eq!(float.php_token_type(), Some("T_DNUMBER"));
    }

    #[test]
    fn test_variable_payload_strips_dollar() {
        let tok = Token::new(TokenKind::Variable, "$user", loc(0, 5))
            .with_payload(TokenPayload::Name { name: Arc::from("user") });
        assert_eq!(tok.text.as_ref(), "$user");
        assert_eq!(tok.name(), Some("user"));
    }
}
