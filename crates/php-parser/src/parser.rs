//! Parser core: token cursor, error machinery, and the top-level loop.
//!
//! The parser owns a trivia-filtered token vector and a cursor index. An EOF
//! token is synthesized past the end (located at the last real token) so
//! lookahead never fails. Speculative probes (casts, named arguments) save
//! and restore the cursor index; there is no general backtracking.

use crate::options::ParserOptions;
use php_ast::{Node, NodeKind, VariableName};
use php_error::{ParseError, ParseResult};
use php_position_tracking::{SourceLocation, SourcePosition};
use php_token::{Token, TokenKind, TokenPayload};
use php_tokenizer::{filter_trivia, Tokenizer, TokenizerOptions};

pub(crate) const MAX_RECURSION_DEPTH: usize = 500;

/// Recursive-descent PHP parser.
///
/// Construct with [`Parser::new`] from source text (tokenized internally) or
/// [`Parser::from_tokens`] from an existing token stream, then call
/// [`Parser::parse`]. With `error_recovery` enabled, recovered errors are
/// accumulated and available from [`Parser::diagnostics`] alongside the
/// partial AST.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    pub(crate) options: ParserOptions,
    pub(crate) diagnostics: Vec<ParseError>,
    pub(crate) recursion_depth: usize,
    eof: Token,
}

impl Parser {
    /// Create a parser over `input`, tokenizing it internally.
    pub fn new(input: &str) -> Self {
        Self::with_options(input, ParserOptions::default())
    }

    /// Create a parser over `input` with explicit options.
    pub fn with_options(input: &str, options: ParserOptions) -> Self {
        let tokens = Tokenizer::with_options(input, TokenizerOptions::default()).collect_tokens();
        Self::from_tokens(tokens, options)
    }

    /// Create a parser over a pre-lexed token stream.
    ///
    /// Trivia (`Whitespace`, `Newline`, `Comment`, `DocComment`) is dropped
    /// here regardless of how the tokens were produced.
    pub fn from_tokens(tokens: Vec<Token>, options: ParserOptions) -> Self {
        let tokens = filter_trivia(tokens);
        let eof_location = tokens
            .last()
            .map(|t| t.location.clone())
            .unwrap_or_else(|| SourceLocation::empty(SourcePosition::start()));
        let eof = Token::new(TokenKind::Eof, "", eof_location);
        Parser { tokens, current: 0, options, diagnostics: Vec::new(), recursion_depth: 0, eof }
    }

    /// Parse a complete program.
    pub fn parse(&mut self) -> ParseResult<Node> {
        tracing::trace!(tokens = self.tokens.len(), "parse start");
        let program = self.parse_program()?;
        if self.options.strict {
            if let Some(first) = self.diagnostics.first() {
                return Err(first.clone());
            }
        }
        Ok(program)
    }

    /// Errors recovered during parsing, in source order.
    pub fn diagnostics(&self) -> &[ParseError] {
        &self.diagnostics
    }

    // ——— Cursor primitives ———

    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&self.eof)
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    pub(crate) fn peek_ahead(&self, k: usize) -> &Token {
        self.tokens.get(self.current + k).unwrap_or(&self.eof)
    }

    pub(crate) fn previous(&self) -> &Token {
        if self.current == 0 {
            return &self.eof;
        }
        self.tokens.get(self.current - 1).unwrap_or(&self.eof)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.current < self.tokens.len() {
            self.current += 1;
        }
        token
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Advance past the next token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advance past the next token if its kind is in `kinds`.
    pub(crate) fn eat_any(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        if kinds.contains(&self.peek_kind()) {
            return Some(self.advance());
        }
        None
    }

    /// Consume a token of the given kind or fail with `expected`.
    pub(crate) fn consume(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.error(expected))
    }

    pub(crate) fn error(&self, expected: &str) -> ParseError {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            return ParseError::UnexpectedEof;
        }
        ParseError::unexpected(expected, token.text.as_ref(), token.location.clone())
    }

    pub(crate) fn syntax_error(&self, message: &str, location: &SourceLocation) -> ParseError {
        ParseError::syntax(message, location.clone())
    }

    /// Cursor snapshot for speculative parsing.
    pub(crate) fn save(&self) -> usize {
        self.current
    }

    /// Restore a cursor snapshot.
    pub(crate) fn restore(&mut self, saved: usize) {
        self.current = saved;
    }

    /// Skip ahead to a likely statement boundary after an error.
    ///
    /// Advances past the offending token, then stops either after a `;` or
    /// in front of a statement-starter keyword.
    pub(crate) fn synchronize(&mut self) {
        self.recursion_depth = 0;
        let mut skipped = 0usize;
        if !self.is_at_end() {
            self.advance();
            skipped += 1;
        }
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                break;
            }
            match self.peek_kind() {
                TokenKind::Class
                | TokenKind::Function
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => break,
                _ => {
                    self.advance();
                    skipped += 1;
                }
            }
        }
        tracing::debug!(skipped, "synchronized after parse error");
    }

    pub(crate) fn check_recursion(&mut self) -> ParseResult<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return Err(ParseError::RecursionLimit);
        }
        Ok(())
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    /// Reject syntax introduced after the configured PHP version.
    pub(crate) fn require_version(
        &self,
        required: crate::options::PhpVersion,
        feature: &str,
        location: &SourceLocation,
    ) -> ParseResult<()> {
        if self.options.php_version < required {
            return Err(self.syntax_error(
                &format!("{feature} requires PHP {required} (parsing as {})", self.options.php_version),
                location,
            ));
        }
        Ok(())
    }

    // ——— Shared token-to-node helpers ———

    /// Parse a plain identifier, returning its name and location.
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<(String, SourceLocation)> {
        if self.check(TokenKind::Identifier) {
            let token = self.advance();
            let name = token.name().unwrap_or(token.text.as_ref()).to_string();
            return Ok((name, token.location));
        }
        Err(self.error("identifier"))
    }

    /// An identifier-like member name: identifiers plus keywords, which PHP
    /// allows as method, constant, and property names. Keyword spellings are
    /// lowercased.
    pub(crate) fn parse_member_name(&mut self) -> ParseResult<(String, SourceLocation)> {
        let token = self.peek();
        let name = match token.kind {
            TokenKind::Identifier => token.name().unwrap_or(token.text.as_ref()).to_string(),
            _ if token_is_wordlike(token) => token.text.to_ascii_lowercase(),
            _ => return Err(self.error("member name")),
        };
        let token = self.advance();
        Ok((name, token.location))
    }

    /// Parse a `$variable` token into a [`NodeKind::VariableExpression`].
    pub(crate) fn parse_variable(&mut self) -> ParseResult<Node> {
        let token = self.consume(TokenKind::Variable, "variable")?;
        let name = match &token.payload {
            TokenPayload::Name { name } => name.to_string(),
            _ => token.text.trim_start_matches('$').to_string(),
        };
        Ok(Node::new(
            NodeKind::VariableExpression { name: VariableName::Name(name) },
            token.location,
        ))
    }

    /// Parse a possibly backslash-qualified name into a
    /// [`NodeKind::NameExpression`].
    pub(crate) fn parse_name_expression(&mut self) -> ParseResult<Node> {
        use php_ast::NameQualification;
        let start = self.peek().location.clone();
        let fully = self.eat(TokenKind::Backslash);
        let mut parts = Vec::new();
        let (first, mut end) = self.parse_name_segment()?;
        parts.push(first);
        while self.check(TokenKind::Backslash)
            && matches!(self.peek_ahead(1).kind, TokenKind::Identifier)
        {
            self.advance(); // backslash
            let (part, loc) = self.parse_identifier()?;
            parts.push(part);
            end = loc;
        }
        let qualification = if fully {
            NameQualification::Fully
        } else if parts.len() > 1 {
            NameQualification::Qualified
        } else {
            NameQualification::Unqualified
        };
        Ok(Node::new(
            NodeKind::NameExpression { parts, qualification },
            SourceLocation::merge(&start, &end),
        ))
    }

    /// First segment of a name. Accepts the class-shaped keywords PHP allows
    /// in name position (`class`, `interface`, `trait`, `abstract`, `final`)
    /// plus magic constants, lowercasing the keyword spellings.
    fn parse_name_segment(&mut self) -> ParseResult<(String, SourceLocation)> {
        match self.peek_kind() {
            TokenKind::Identifier => self.parse_identifier(),
            TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Trait
            | TokenKind::Abstract
            | TokenKind::Final
            | TokenKind::Static => {
                let token = self.advance();
                Ok((token.text.to_ascii_lowercase(), token.location))
            }
            kind if kind.is_magic_constant() => {
                let token = self.advance();
                Ok((token.text.to_string(), token.location))
            }
            _ => Err(self.error("name")),
        }
    }

    /// Consume a statement terminator: `;`, or an upcoming `?>`/EOF which
    /// PHP accepts in its place.
    pub(crate) fn consume_statement_end(&mut self) -> ParseResult<()> {
        if self.eat(TokenKind::Semicolon) {
            return Ok(());
        }
        if self.check(TokenKind::CloseTag) || self.is_at_end() {
            return Ok(());
        }
        Err(self.error("';'"))
    }

    // ——— Orchestrator ———

    /// Top-level loop: weave open/close tags and inline HTML around
    /// declarations, recovering at statement boundaries when enabled.
    pub(crate) fn parse_program(&mut self) -> ParseResult<Node> {
        let start = self.peek().location.clone();
        let mut statements = Vec::new();
        if self.check(TokenKind::InlineHtml) {
            let token = self.advance();
            statements.push(inline_html_node(&token));
        }
        if self.peek_kind().is_open_tag() {
            self.advance();
        }
        while !self.is_at_end() {
            if self.weave_tags(&mut statements) {
                continue;
            }
            match self.parse_declaration() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    if !self.options.error_recovery {
                        return Err(error);
                    }
                    tracing::debug!(error = %error, "recovering from parse error");
                    self.diagnostics.push(error);
                    self.synchronize();
                }
            }
        }
        let end = self.previous().location.clone();
        let location =
            if statements.is_empty() { start } else { SourceLocation::merge(&start, &end) };
        Ok(Node::new(NodeKind::Program { statements }, location))
    }

    /// Handle a `?> html <?php` seam at the current position. Returns true
    /// when tokens were consumed.
    pub(crate) fn weave_tags(&mut self, statements: &mut Vec<Node>) -> bool {
        if !self.check(TokenKind::CloseTag) {
            return false;
        }
        self.advance();
        if self.check(TokenKind::InlineHtml) {
            let token = self.advance();
            statements.push(inline_html_node(&token));
        }
        if self.peek_kind().is_open_tag() {
            self.advance();
        }
        true
    }
}

/// True for tokens spelled like a bare word (keywords, magic constants),
/// which PHP accepts wherever a member name is expected.
pub(crate) fn token_is_wordlike(token: &Token) -> bool {
    let mut chars = token.text.chars();
    match chars.next() {
        Some(first) if php_lexer::chars::is_identifier_start(first) => {
            chars.all(php_lexer::chars::is_identifier_part)
        }
        _ => false,
    }
}

pub(crate) fn inline_html_node(token: &Token) -> Node {
    Node::new(
        NodeKind::InlineHtml { value: token.text.to_string() },
        token.location.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eof_synthesized_at_last_token_location() {
        let mut parser = Parser::new("<?php $x;");
        while !parser.is_at_end() {
            parser.advance();
        }
        let eof = parser.peek();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert!(eof.location.end.offset > 0);
    }

    #[test]
    fn test_trivia_filtered_on_construction() {
        let parser = Parser::new("<?php  /* c */  $x ;");
        assert!(parser.tokens.iter().all(|t| !t.kind.is_trivia()));
    }

    #[test]
    fn test_save_restore() {
        let mut parser = Parser::new("<?php 1 + 2;");
        let saved = parser.save();
        parser.advance();
        parser.advance();
        parser.restore(saved);
        assert_eq!(parser.peek_kind(), TokenKind::OpenTag);
    }

    #[test]
    fn test_synchronize_stops_after_semicolon() {
        let mut parser = Parser::new("<?php @@@ ; $x = 1;");
        parser.advance(); // open tag
        parser.synchronize();
        assert_eq!(parser.peek_kind(), TokenKind::Variable);
    }

    #[test]
    fn test_synchronize_stops_at_statement_starter() {
        let mut parser = Parser::new("<?php @@@ if (1) {}");
        parser.advance();
        parser.synchronize();
        assert_eq!(parser.peek_kind(), TokenKind::If);
    }
}
