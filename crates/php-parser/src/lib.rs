//! Recursive-descent PHP parser.
//!
//! This crate is the front door of the PHP front-end: it turns source text
//! (or a pre-lexed token stream) into the tagged AST defined by `php-ast`,
//! with precise source locations on every node. Downstream tools — symbol
//! indexers, reference finders, code movers, generators — consume the AST
//! through the traversal entry points re-exported here.
//!
//! # Pipeline
//!
//! Scanner → Tokenizer → Parser → AST. Trivia (whitespace, newlines,
//! comments) is preserved by the tokenizer and filtered before parsing;
//! every AST node keeps location fidelity back to the original text.
//!
//! # Usage
//!
//! ```
//! use php_parser::{parse, ParserOptions};
//!
//! let ast = parse("<?php $x = 1 + 2;", &ParserOptions::default())?;
//! assert!(matches!(ast.kind, php_parser::NodeKind::Program { .. }));
//! # Ok::<(), php_parser::ParseError>(())
//! ```
//!
//! With error recovery (the default), a partial AST is returned and the
//! recovered errors are available on the [`Parser`]:
//!
//! ```
//! use php_parser::{Parser, ParserOptions};
//!
//! let mut parser = Parser::with_options("<?php $a = ; $b = 2;", ParserOptions::default());
//! let ast = parser.parse()?;
//! assert!(!parser.diagnostics().is_empty());
//! # Ok::<(), php_parser::ParseError>(())
//! ```

mod declarations;
mod expressions;
mod options;
mod parser;
mod statements;

pub use options::{ParserOptions, PhpVersion};
pub use parser::Parser;

// The complete front-end surface for downstream consumers.
pub use php_ast::{
    CastKind, EnumBackingType, IncludeKind, Modifier, NameQualification, Node, NodeKind, Quote,
    SourceLocation, SourcePosition, Token, TokenKind, UseKind, VariableName,
};
pub use php_error::{ParseError, ParseResult};
pub use php_tokenizer::TokenizerOptions;
pub use php_traverse::{
    accept, find_first, find_nodes, transform, transform_async, transform_nodes, walk,
    walk_async, walk_nodes, Transform, Visit, VisitFlow, WalkContext,
};

/// Tokenize `source` into a full-fidelity token vector.
///
/// The tokenizer itself never fails (malformed input becomes `Unknown`
/// tokens); the `Result` keeps the public entry points uniform.
pub fn tokenize(source: &str, options: &TokenizerOptions) -> ParseResult<Vec<Token>> {
    Ok(php_tokenizer::tokenize(source, options))
}

/// Parse `source` into a [`NodeKind::Program`] root node.
///
/// The source is tokenized internally; whitespace, newline, and comment
/// tokens are filtered before parsing.
pub fn parse(source: &str, options: &ParserOptions) -> ParseResult<Node> {
    Parser::with_options(source, options.clone()).parse()
}

/// Parse a pre-lexed token stream into a [`NodeKind::Program`] root node.
pub fn parse_tokens(tokens: Vec<Token>, options: &ParserOptions) -> ParseResult<Node> {
    Parser::from_tokens(tokens, options.clone()).parse()
}
