//! Character-level scanning and lexer state for PHP source.
//!
//! This crate provides the pieces below the tokenizer:
//!
//! - [`Scanner`]: a character cursor with lookahead, literal matching,
//!   consume-while/until, and O(1) checkpoint/restore for speculative
//!   scanning. The scanner never fails; past the end it yields an EOF
//!   sentinel character.
//! - [`chars`]: the character predicates PHP's grammar is defined over.
//!   Identifier characters follow PHP's `[A-Za-z_\x80-\xff]` rule, so any
//!   non-ASCII character is an identifier character.
//! - [`LexerState`]: the stack of lexing modes and per-string contexts used
//!   to track interpolation, heredocs, and complex `${...}` forms.

pub mod chars;
mod scanner;
mod state;

pub use scanner::{Scanner, ScannerCheckpoint, EOF_CHAR};
pub use state::{LexerMode, LexerState, StringContext, StringKind};
