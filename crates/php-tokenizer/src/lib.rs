//! Mode-aware tokenizer for PHP source text.
//!
//! The tokenizer drives a [`php_lexer::Scanner`] and tracks two pieces of
//! process state: whether the cursor is inside a PHP tag (versus inline
//! HTML), and whether a heredoc body is pending. It emits [`Token`]s whose
//! `text` is always the exact source slice, so the concatenation of all
//! emitted token texts (with every preserve option on) reproduces the input.
//!
//! The tokenizer never fails: unrecognizable input becomes
//! [`TokenKind::Unknown`] tokens and surfaces as a syntactic error
//! downstream.
//!
//! # Basic usage
//!
//! ```
//! use php_tokenizer::{tokenize, TokenizerOptions};
//! use php_token::TokenKind;
//!
//! let tokens = tokenize("<?php $x = 1;", &TokenizerOptions::default());
//! assert_eq!(tokens[0].kind, TokenKind::OpenTag);
//! assert_eq!(tokens[1].kind, TokenKind::Variable);
//! ```

mod heredoc;
mod tokenizer;

pub use tokenizer::{Tokenizer, TokenizerOptions};

use php_token::Token;

/// Tokenize `source` into a full-fidelity token vector.
///
/// Honors the preserve options; EOF is implicit (no EOF token is emitted —
/// the parser synthesizes one when past the end).
pub fn tokenize(source: &str, options: &TokenizerOptions) -> Vec<Token> {
    Tokenizer::with_options(source, options.clone()).collect_tokens()
}

/// Drop `Whitespace`, `Newline`, `Comment`, and `DocComment` tokens.
///
/// The parser applies this pass before parsing regardless of which preserve
/// options the tokenizer ran with.
pub fn filter_trivia(tokens: Vec<Token>) -> Vec<Token> {
    tokens.into_iter().filter(|t| !t.kind.is_trivia()).collect()
}
