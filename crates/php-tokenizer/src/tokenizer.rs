//! The mode-aware PHP tokenizer.

use crate::heredoc::{self, PendingHeredoc};
use php_lexer::{chars, LexerState, Scanner};
use php_position_tracking::{SourceLocation, SourcePosition};
use php_token::{lookup_keyword, Quote, Token, TokenKind, TokenPayload};
use std::sync::Arc;

/// Options controlling which trivia the tokenizer emits.
#[derive(Debug, Clone)]
pub struct TokenizerOptions {
    /// Emit `Comment`/`DocComment` tokens (default true)
    pub preserve_comments: bool,
    /// Emit `Whitespace`/`Newline` tokens (default true)
    pub preserve_whitespace: bool,
    /// Emit `InlineHtml` tokens (default true)
    pub preserve_inline_html: bool,
    /// Optional source name attached to every token location
    pub source_name: Option<Arc<str>>,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        TokenizerOptions {
            preserve_comments: true,
            preserve_whitespace: true,
            preserve_inline_html: true,
            source_name: None,
        }
    }
}

// Multi-character operators, probed longest first.
const OPERATORS3: &[(&str, TokenKind)] = &[
    ("===", TokenKind::Identical),
    ("!==", TokenKind::NotIdentical),
    ("<<=", TokenKind::ShiftLeftAssign),
    (">>=", TokenKind::ShiftRightAssign),
    ("**=", TokenKind::PowerAssign),
    ("<=>", TokenKind::Spaceship),
    ("??=", TokenKind::CoalesceAssign),
    ("...", TokenKind::Ellipsis),
    ("?->", TokenKind::NullsafeArrow),
];

const OPERATORS2: &[(&str, TokenKind)] = &[
    ("==", TokenKind::Equal),
    ("!=", TokenKind::NotEqual),
    ("<>", TokenKind::NotEqual),
    ("<=", TokenKind::LessEqual),
    (">=", TokenKind::GreaterEqual),
    ("&&", TokenKind::BooleanAnd),
    ("||", TokenKind::BooleanOr),
    ("??", TokenKind::Coalesce),
    ("++", TokenKind::Increment),
    ("--", TokenKind::Decrement),
    ("+=", TokenKind::PlusAssign),
    ("-=", TokenKind::MinusAssign),
    ("*=", TokenKind::StarAssign),
    ("/=", TokenKind::SlashAssign),
    ("%=", TokenKind::PercentAssign),
    (".=", TokenKind::DotAssign),
    ("&=", TokenKind::AmpAssign),
    ("|=", TokenKind::PipeAssign),
    ("^=", TokenKind::CaretAssign),
    ("**", TokenKind::Power),
    ("<<", TokenKind::ShiftLeft),
    (">>", TokenKind::ShiftRight),
    ("->", TokenKind::Arrow),
    ("=>", TokenKind::DoubleArrow),
    ("::", TokenKind::DoubleColon),
];

const OPERATORS1: &[(char, TokenKind)] = &[
    ('+', TokenKind::Plus),
    ('-', TokenKind::Minus),
    ('*', TokenKind::Star),
    ('/', TokenKind::Slash),
    ('%', TokenKind::Percent),
    ('=', TokenKind::Assign),
    ('<', TokenKind::Less),
    ('>', TokenKind::Greater),
    ('!', TokenKind::Bang),
    ('&', TokenKind::Ampersand),
    ('|', TokenKind::Pipe),
    ('^', TokenKind::Caret),
    ('~', TokenKind::Tilde),
    ('.', TokenKind::Dot),
    ('?', TokenKind::Question),
    (':', TokenKind::Colon),
    (';', TokenKind::Semicolon),
    (',', TokenKind::Comma),
    ('(', TokenKind::LeftParen),
    (')', TokenKind::RightParen),
    ('[', TokenKind::LeftBracket),
    (']', TokenKind::RightBracket),
    ('{', TokenKind::LeftBrace),
    ('}', TokenKind::RightBrace),
    ('@', TokenKind::At),
    ('\\', TokenKind::Backslash),
];

/// Mode-aware tokenizer over a single source buffer.
///
/// Tracks whether the cursor is inside PHP code (`in_php_tag`) and whether a
/// heredoc body is pending. Malformed input never fails the tokenizer; it is
/// emitted as `Unknown` tokens.
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    options: TokenizerOptions,
    in_php_tag: bool,
    pending_heredoc: Option<PendingHeredoc>,
    state: LexerState,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer with default options.
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, TokenizerOptions::default())
    }

    /// Create a tokenizer with explicit options.
    pub fn with_options(input: &'a str, options: TokenizerOptions) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            options,
            in_php_tag: false,
            pending_heredoc: None,
            state: LexerState::new(),
        }
    }

    /// The lexer-state stack, updated as tokens are emitted.
    pub fn state(&self) -> &LexerState {
        &self.state
    }

    /// Produce the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            if self.scanner.is_at_end() {
                return None;
            }
            let token = if !self.in_php_tag {
                self.lex_outside_php()
            } else if let Some(pending) = self.pending_heredoc.clone().filter(|p| p.seen_newline) {
                self.lex_heredoc_body(&pending)
            } else {
                self.lex_php_token()
            };
            if token.kind == TokenKind::Newline {
                if let Some(pending) = self.pending_heredoc.as_mut() {
                    pending.seen_newline = true;
                }
            }
            self.state.transition_by_token(&token);
            if self.keep(&token) {
                return Some(token);
            }
        }
    }

    /// Run the tokenizer to completion.
    pub fn collect_tokens(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn keep(&self, token: &Token) -> bool {
        match token.kind {
            TokenKind::Whitespace | TokenKind::Newline => self.options.preserve_whitespace,
            TokenKind::Comment | TokenKind::DocComment => self.options.preserve_comments,
            TokenKind::InlineHtml => self.options.preserve_inline_html,
            _ => true,
        }
    }

    fn token_from(&self, kind: TokenKind, start: SourcePosition) -> Token {
        let end = self.scanner.current_position();
        let text = self.scanner.slice(start.offset, end.offset);
        let mut location = SourceLocation::new(start, end);
        if let Some(name) = &self.options.source_name {
            location = location.with_source(name.clone());
        }
        Token::new(kind, text, location)
    }

    // ——— HTML region ———

    fn at_open_tag(&self) -> bool {
        self.scanner.matches("<?") && !self.scanner.matches_ignore_case("<?xml")
    }

    fn lex_outside_php(&mut self) -> Token {
        let start = self.scanner.current_position();
        if self.at_open_tag() {
            return self.lex_open_tag(start);
        }
        // Inline HTML up to (not including) the next open tag
        loop {
            match self.scanner.find_byte(b'<') {
                None => {
                    while !self.scanner.is_at_end() {
                        self.scanner.advance();
                    }
                    break;
                }
                Some(0) => {
                    if self.at_open_tag() {
                        break;
                    }
                    self.scanner.advance();
                }
                Some(rel) => {
                    let target = self.scanner.offset() + rel;
                    while self.scanner.offset() < target {
                        self.scanner.advance();
                    }
                }
            }
        }
        self.token_from(TokenKind::InlineHtml, start)
    }

    fn lex_open_tag(&mut self, start: SourcePosition) -> Token {
        let kind = if self.scanner.matches_ignore_case("<?php")
            && !chars::is_identifier_part(self.scanner.peek(5))
        {
            self.scanner.skip(5);
            TokenKind::OpenTag
        } else if self.scanner.matches("<?=") {
            self.scanner.skip(3);
            TokenKind::OpenTagEcho
        } else {
            self.scanner.skip(2);
            TokenKind::OpenTag
        };
        // one trailing space or tab belongs to the tag
        if matches!(self.scanner.peek(0), ' ' | '\t') {
            self.scanner.advance();
        }
        self.in_php_tag = true;
        self.token_from(kind, start)
    }

    // ——— PHP region ———

    fn lex_php_token(&mut self) -> Token {
        let start = self.scanner.current_position();
        let c = self.scanner.peek(0);

        if self.scanner.matches("?>") {
            self.scanner.skip(2);
            self.in_php_tag = false;
            return self.token_from(TokenKind::CloseTag, start);
        }
        if c == ' ' || c == '\t' {
            self.scanner.consume_while(|ch| ch == ' ' || ch == '\t');
            return self.token_from(TokenKind::Whitespace, start);
        }
        if chars::is_newline(c) {
            self.consume_newline();
            return self.token_from(TokenKind::Newline, start);
        }
        if self.scanner.matches("//") {
            self.scanner.consume_until(chars::is_newline);
            return self.token_from(TokenKind::Comment, start);
        }
        if self.scanner.matches("/*") {
            return self.lex_block_comment(start);
        }
        if self.scanner.matches("#[") {
            return self.lex_attribute(start);
        }
        if c == '#' {
            self.scanner.consume_until(chars::is_newline);
            return self.token_from(TokenKind::Comment, start);
        }
        if c == '"' || c == '\'' || c == '`' {
            return self.lex_string(start, c);
        }
        if self.scanner.matches("<<<") {
            return self.lex_heredoc_start(start);
        }
        if chars::is_digit(c) || (c == '.' && chars::is_digit(self.scanner.peek(1))) {
            return self.lex_number(start);
        }
        if c == '$' {
            return self.lex_dollar(start);
        }
        if chars::is_identifier_start(c) {
            return self.lex_identifier(start);
        }
        self.lex_operator(start)
    }

    fn consume_newline(&mut self) {
        if self.scanner.peek(0) == '\r' {
            self.scanner.advance();
            if self.scanner.peek(0) == '\n' {
                self.scanner.advance();
            }
        } else if self.scanner.peek(0) == '\n' {
            self.scanner.advance();
        }
    }

    fn lex_block_comment(&mut self, start: SourcePosition) -> Token {
        self.scanner.skip(2);
        loop {
            if self.scanner.is_at_end() {
                break;
            }
            if self.scanner.matches("*/") {
                self.scanner.skip(2);
                break;
            }
            self.scanner.advance();
        }
        let text = self.scanner.slice(start.offset, self.scanner.offset());
        let kind = if text.starts_with("/**") && text != "/**/" {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };
        self.token_from(kind, start)
    }

    fn lex_attribute(&mut self, start: SourcePosition) -> Token {
        self.scanner.skip(2); // #[
        let mut depth = 1usize;
        while depth > 0 && !self.scanner.is_at_end() {
            match self.scanner.advance() {
                '[' => depth += 1,
                ']' => depth -= 1,
                _ => {}
            }
        }
        self.token_from(TokenKind::Attribute, start)
    }

    fn lex_string(&mut self, start: SourcePosition, quote_char: char) -> Token {
        self.scanner.advance(); // opening quote
        let value_start = self.scanner.offset();
        let mut closed = false;
        loop {
            if self.scanner.is_at_end() {
                break;
            }
            let ch = self.scanner.peek(0);
            if ch == '\\' {
                // escape consumes one following character verbatim
                self.scanner.advance();
                if !self.scanner.is_at_end() {
                    self.scanner.advance();
                }
                continue;
            }
            self.scanner.advance();
            if ch == quote_char {
                closed = true;
                break;
            }
        }
        let end_offset = self.scanner.offset();
        let value_end = if closed { end_offset - 1 } else { end_offset };
        let quote = match quote_char {
            '\'' => Quote::Single,
            '`' => Quote::Backtick,
            _ => Quote::Double,
        };
        let value: Arc<str> = Arc::from(self.scanner.slice(value_start, value_end));
        self.token_from(TokenKind::String, start)
            .with_payload(TokenPayload::Str { value, quote })
    }

    fn lex_heredoc_start(&mut self, start: SourcePosition) -> Token {
        self.scanner.skip(3); // <<<
        self.scanner.consume_while(|ch| ch == ' ' || ch == '\t');
        let quote = match self.scanner.peek(0) {
            '\'' => Some('\''),
            '"' => Some('"'),
            _ => None,
        };
        if quote.is_some() {
            self.scanner.advance();
        }
        let label = self.scanner.consume_while(chars::is_identifier_part).to_string();
        if let Some(q) = quote {
            if self.scanner.peek(0) == q {
                self.scanner.advance();
            }
        }
        if label.is_empty() {
            return self.token_from(TokenKind::Unknown, start);
        }
        self.pending_heredoc =
            Some(PendingHeredoc { label, is_nowdoc: quote == Some('\''), seen_newline: false });
        self.token_from(TokenKind::StartHeredoc, start)
    }

    fn lex_heredoc_body(&mut self, pending: &PendingHeredoc) -> Token {
        let start = self.scanner.current_position();
        if let Some(m) = heredoc::match_terminator(self.scanner.rest(), &pending.label) {
            // Buffer is empty: the closing label itself, indentation included
            let target = self.scanner.offset() + m.total_len;
            while self.scanner.offset() < target {
                self.scanner.advance();
            }
            self.pending_heredoc = None;
            return self.token_from(TokenKind::EndHeredoc, start);
        }
        let mut terminator_indent = String::new();
        loop {
            self.scanner.consume_until(chars::is_newline);
            self.consume_newline();
            if self.scanner.is_at_end() {
                break;
            }
            if let Some(m) = heredoc::match_terminator(self.scanner.rest(), &pending.label) {
                terminator_indent = self.scanner.rest()[..m.indent_len].to_string();
                break;
            }
        }
        let raw = self.scanner.slice(start.offset, self.scanner.offset());
        let value: Arc<str> = Arc::from(heredoc::strip_body_indent(raw, &terminator_indent));
        let quote = if pending.is_nowdoc { Quote::Single } else { Quote::Double };
        self.token_from(TokenKind::EncapsedAndWhitespace, start)
            .with_payload(TokenPayload::Str { value, quote })
    }

    fn lex_number(&mut self, start: SourcePosition) -> Token {
        let mut is_float = false;
        let c = self.scanner.peek(0);
        let next = self.scanner.peek(1);
        if c == '0' && matches!(next, 'x' | 'X') {
            self.scanner.skip(2);
            self.scanner.consume_while(|ch| chars::is_hex_digit(ch) || ch == '_');
        } else if c == '0' && matches!(next, 'b' | 'B') {
            self.scanner.skip(2);
            self.scanner.consume_while(|ch| chars::is_binary_digit(ch) || ch == '_');
        } else if c == '0' && matches!(next, 'o' | 'O') {
            self.scanner.skip(2);
            self.scanner.consume_while(|ch| chars::is_octal_digit(ch) || ch == '_');
        } else if c == '0' && chars::is_octal_digit(next) && !self.decimal_ahead() {
            self.scanner.consume_while(|ch| chars::is_octal_digit(ch) || ch == '_');
        } else {
            self.scanner.consume_while(|ch| chars::is_digit(ch) || ch == '_');
            if self.scanner.peek(0) == '.' && chars::is_digit(self.scanner.peek(1)) {
                is_float = true;
                self.scanner.advance();
                self.scanner.consume_while(|ch| chars::is_digit(ch) || ch == '_');
            }
            if matches!(self.scanner.peek(0), 'e' | 'E') {
                let k = if matches!(self.scanner.peek(1), '+' | '-') { 2 } else { 1 };
                if chars::is_digit(self.scanner.peek(k)) {
                    is_float = true;
                    self.scanner.skip(k);
                    self.scanner.consume_while(|ch| chars::is_digit(ch) || ch == '_');
                }
            }
        }
        self.token_from(TokenKind::Number, start)
            .with_payload(TokenPayload::Number { is_float })
    }

    /// Look past a leading-zero digit run for `.` or an exponent, which turn
    /// the literal decimal (`0755` is octal, `0.5` and `09e2` are not).
    fn decimal_ahead(&self) -> bool {
        let mut k = 0;
        while chars::is_digit(self.scanner.peek(k)) || self.scanner.peek(k) == '_' {
            k += 1;
        }
        matches!(self.scanner.peek(k), '.' | 'e' | 'E')
    }

    fn lex_dollar(&mut self, start: SourcePosition) -> Token {
        if chars::is_identifier_start(self.scanner.peek(1)) {
            self.scanner.advance(); // $
            let name = self.scanner.consume_while(chars::is_identifier_part);
            let payload = TokenPayload::Name { name: Arc::from(name) };
            return self.token_from(TokenKind::Variable, start).with_payload(payload);
        }
        if matches!(self.scanner.peek(1), '{' | '$') {
            self.scanner.advance();
            return self.token_from(TokenKind::Dollar, start);
        }
        self.scanner.advance();
        self.token_from(TokenKind::Unknown, start)
    }

    fn lex_identifier(&mut self, start: SourcePosition) -> Token {
        let word = self.scanner.consume_while(chars::is_identifier_part);
        match lookup_keyword(word) {
            Some(kind) => self.token_from(kind, start),
            None => {
                let payload = TokenPayload::Name { name: Arc::from(word) };
                self.token_from(TokenKind::Identifier, start).with_payload(payload)
            }
        }
    }

    fn lex_operator(&mut self, start: SourcePosition) -> Token {
        for (text, kind) in OPERATORS3 {
            if self.scanner.matches(text) {
                self.scanner.skip(3);
                return self.token_from(*kind, start);
            }
        }
        for (text, kind) in OPERATORS2 {
            if self.scanner.matches(text) {
                self.scanner.skip(2);
                return self.token_from(*kind, start);
            }
        }
        let c = self.scanner.peek(0);
        for (ch, kind) in OPERATORS1 {
            if *ch == c {
                self.scanner.advance();
                return self.token_from(*kind, start);
            }
        }
        self.scanner.advance();
        self.token_from(TokenKind::Unknown, start)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::{filter_trivia, tokenize};
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source, &TokenizerOptions::default()).iter().map(|t| t.kind).collect()
    }

    fn code_kinds(source: &str) -> Vec<TokenKind> {
        filter_trivia(tokenize(source, &TokenizerOptions::default()))
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_open_tag_and_inline_html() {
        let tokens = tokenize("<html><?php $x;", &TokenizerOptions::default());
        assert_eq!(tokens[0].kind, TokenKind::InlineHtml);
        assert_eq!(tokens[0].text.as_ref(), "<html>");
        assert_eq!(tokens[1].kind, TokenKind::OpenTag);
        assert_eq!(tokens[1].text.as_ref(), "<?php ");
    }

    #[test]
    fn test_open_tag_variants() {
        assert_eq!(kinds("<?= $x ?>")[0], TokenKind::OpenTagEcho);
        assert_eq!(kinds("<? $x ?>")[0], TokenKind::OpenTag);
        // `<?xml` stays HTML
        let tokens = tokenize("<?xml version=\"1.0\"?>", &TokenizerOptions::default());
        assert_eq!(tokens[0].kind, TokenKind::InlineHtml);
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_open_tag_case_insensitive() {
        let tokens = tokenize("<?PHP $x;", &TokenizerOptions::default());
        assert_eq!(tokens[0].kind, TokenKind::OpenTag);
        assert_eq!(tokens[0].text.as_ref(), "<?PHP ");
    }

    #[test]
    fn test_close_tag_returns_to_html() {
        assert_eq!(
            kinds("<?php ?>after"),
            vec![TokenKind::OpenTag, TokenKind::CloseTag, TokenKind::InlineHtml]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            code_kinds("<?php WHILE while While"),
            vec![TokenKind::OpenTag, TokenKind::While, TokenKind::While, TokenKind::While]
        );
    }

    #[test]
    fn test_variable_and_dollar() {
        let tokens = filter_trivia(tokenize("<?php $abc ${x} $$y", &TokenizerOptions::default()));
        assert_eq!(tokens[1].kind, TokenKind::Variable);
        assert_eq!(tokens[1].name(), Some("abc"));
        assert_eq!(tokens[2].kind, TokenKind::Dollar);
        assert_eq!(tokens[2].text.as_ref(), "$");
        assert_eq!(tokens[3].kind, TokenKind::LeftBrace);
        let dollar2 = &tokens[6];
        assert_eq!(dollar2.kind, TokenKind::Dollar);
    }

    #[test]
    fn test_operator_longest_match() {
        assert_eq!(
            code_kinds("<?php === == = !== != <=> <= < ??= ?? ?-> -> ... ."),
            vec![
                TokenKind::OpenTag,
                TokenKind::Identical,
                TokenKind::Equal,
                TokenKind::Assign,
                TokenKind::NotIdentical,
                TokenKind::NotEqual,
                TokenKind::Spaceship,
                TokenKind::LessEqual,
                TokenKind::Less,
                TokenKind::CoalesceAssign,
                TokenKind::Coalesce,
                TokenKind::NullsafeArrow,
                TokenKind::Arrow,
                TokenKind::Ellipsis,
                TokenKind::Dot,
            ]
        );
    }

    #[test]
    fn test_shift_assign_operators() {
        assert_eq!(
            code_kinds("<?php <<= << >>= >> **= ** *"),
            vec![
                TokenKind::OpenTag,
                TokenKind::ShiftLeftAssign,
                TokenKind::ShiftLeft,
                TokenKind::ShiftRightAssign,
                TokenKind::ShiftRight,
                TokenKind::PowerAssign,
                TokenKind::Power,
                TokenKind::Star,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = filter_trivia(tokenize(
            "<?php 42 3.14 .5 1e3 1.5e-2 0xFF 0b1010 0o755 0755 1_000_000",
            &TokenizerOptions::default(),
        ));
        let floats: Vec<bool> = tokens[1..]
            .iter()
            .map(|t| matches!(t.payload, TokenPayload::Number { is_float: true }))
            .collect();
        assert_eq!(floats, vec![false, true, true, true, true, false, false, false, false, false]);
        assert_eq!(tokens[6].text.as_ref(), "0xFF");
        assert_eq!(tokens[10].text.as_ref(), "1_000_000");
    }

    #[test]
    fn test_leading_zero_float_is_not_octal() {
        let tokens = filter_trivia(tokenize("<?php 0.5", &TokenizerOptions::default()));
        assert_eq!(tokens[1].text.as_ref(), "0.5");
        assert!(matches!(tokens[1].payload, TokenPayload::Number { is_float: true }));
    }

    #[test]
    fn test_strings() {
        let tokens = filter_trivia(tokenize(
            r#"<?php 'a\'b' "c $v d" `ls`"#,
            &TokenizerOptions::default(),
        ));
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].text.as_ref(), r"'a\'b'");
        match &tokens[1].payload {
            TokenPayload::Str { value, quote } => {
                assert_eq!(value.as_ref(), r"a\'b");
                assert_eq!(*quote, Quote::Single);
            }
            other => panic!("expected string payload, got {:?}", other),
        }
        // interpolation stays opaque at this layer
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text.as_ref(), r#""c $v d""#);
        match &tokens[3].payload {
            TokenPayload::Str { quote, .. } => assert_eq!(*quote, Quote::Backtick),
            other => panic!("expected string payload, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_string_consumes_rest() {
        let tokens = filter_trivia(tokenize("<?php 'abc", &TokenizerOptions::default()));
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].text.as_ref(), "'abc");
    }

    #[test]
    fn test_comments() {
        let tokens = tokenize(
            "<?php // line\n# hash\n/* block */ /** doc */ /**/",
            &TokenizerOptions::default(),
        );
        let comments: Vec<(TokenKind, &str)> = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Comment | TokenKind::DocComment))
            .map(|t| (t.kind, t.text.as_ref()))
            .collect();
        assert_eq!(
            comments,
            vec![
                (TokenKind::Comment, "// line"),
                (TokenKind::Comment, "# hash"),
                (TokenKind::Comment, "/* block */"),
                (TokenKind::DocComment, "/** doc */"),
                (TokenKind::Comment, "/**/"),
            ]
        );
    }

    #[test]
    fn test_attribute_balanced_brackets() {
        let tokens =
            filter_trivia(tokenize("<?php #[Route('/x', ['a' => 1])] function", &TokenizerOptions::default()));
        assert_eq!(tokens[1].kind, TokenKind::Attribute);
        assert_eq!(tokens[1].text.as_ref(), "#[Route('/x', ['a' => 1])]");
        assert_eq!(tokens[2].kind, TokenKind::Function);
    }

    #[test]
    fn test_heredoc() {
        let source = "<?php $x = <<<EOT\nhello\nworld\nEOT;\n";
        let tokens = filter_trivia(tokenize(source, &TokenizerOptions::default()));
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::OpenTag,
                TokenKind::Variable,
                TokenKind::Assign,
                TokenKind::StartHeredoc,
                TokenKind::EncapsedAndWhitespace,
                TokenKind::EndHeredoc,
                TokenKind::Semicolon,
            ]
        );
        assert_eq!(tokens[3].text.as_ref(), "<<<EOT");
        assert_eq!(tokens[4].text.as_ref(), "hello\nworld\n");
        match &tokens[4].payload {
            TokenPayload::Str { value, quote } => {
                assert_eq!(value.as_ref(), "hello\nworld");
                assert_eq!(*quote, Quote::Double);
            }
            other => panic!("expected heredoc payload, got {:?}", other),
        }
        assert_eq!(tokens[5].text.as_ref(), "EOT");
    }

    #[test]
    fn test_nowdoc() {
        let source = "<?php $x = <<<'EOT'\n$raw\nEOT;\n";
        let tokens = filter_trivia(tokenize(source, &TokenizerOptions::default()));
        assert_eq!(tokens[3].kind, TokenKind::StartHeredoc);
        assert_eq!(tokens[3].text.as_ref(), "<<<'EOT'");
        match &tokens[4].payload {
            TokenPayload::Str { value, quote } => {
                assert_eq!(value.as_ref(), "$raw");
                assert_eq!(*quote, Quote::Single);
            }
            other => panic!("expected nowdoc payload, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_heredoc_emits_end_directly() {
        let source = "<?php $x = <<<EOT\nEOT;\n";
        let tokens = filter_trivia(tokenize(source, &TokenizerOptions::default()));
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::OpenTag,
                TokenKind::Variable,
                TokenKind::Assign,
                TokenKind::StartHeredoc,
                TokenKind::EndHeredoc,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_indented_heredoc_close_strips_body_indent() {
        let source = "<?php $x = <<<EOT\n    a\n      b\n    EOT;\n";
        let tokens = filter_trivia(tokenize(source, &TokenizerOptions::default()));
        let body = &tokens[4];
        assert_eq!(body.kind, TokenKind::EncapsedAndWhitespace);
        assert_eq!(body.text.as_ref(), "    a\n      b\n");
        match &body.payload {
            TokenPayload::Str { value, .. } => assert_eq!(value.as_ref(), "a\n  b"),
            other => panic!("expected heredoc payload, got {:?}", other),
        }
        assert_eq!(tokens[5].kind, TokenKind::EndHeredoc);
        assert_eq!(tokens[5].text.as_ref(), "    EOT");
    }

    #[test]
    fn test_heredoc_label_prefix_does_not_terminate() {
        let source = "<?php $x = <<<EOT\nEOTX\nEOT;\n";
        let tokens = filter_trivia(tokenize(source, &TokenizerOptions::default()));
        match &tokens[4].payload {
            TokenPayload::Str { value, .. } => assert_eq!(value.as_ref(), "EOTX"),
            other => panic!("expected heredoc payload, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tokens_never_fail() {
        let tokens = filter_trivia(tokenize("<?php \u{7}", &TokenizerOptions::default()));
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
    }

    #[test]
    fn test_filter_options() {
        let options = TokenizerOptions {
            preserve_whitespace: false,
            preserve_comments: false,
            preserve_inline_html: false,
            source_name: None,
        };
        let tokens = tokenize("<html><?php // c\n $x;", &options);
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::OpenTag, TokenKind::Variable, TokenKind::Semicolon]
        );
    }

    #[test]
    fn test_source_name_attached() {
        let options = TokenizerOptions {
            source_name: Some(Arc::from("test.php")),
            ..TokenizerOptions::default()
        };
        let tokens = tokenize("<?php $x;", &options);
        assert_eq!(tokens[0].location.source.as_deref(), Some("test.php"));
    }

    #[test]
    fn test_exit_aliases_tokenize_as_exit() {
        assert_eq!(
            code_kinds("<?php exit die DIE"),
            vec![TokenKind::OpenTag, TokenKind::Exit, TokenKind::Exit, TokenKind::Exit]
        );
    }

    fn assert_full_fidelity(source: &str) {
        let tokens = tokenize(source, &TokenizerOptions::default());
        let mut rebuilt = String::new();
        for token in &tokens {
            let start = token.location.start.offset;
            let end = token.location.end.offset;
            assert_eq!(&source[start..end], token.text.as_ref(), "slice mismatch in {:?}", source);
            assert!(start <= end);
            rebuilt.push_str(&token.text);
        }
        assert_eq!(rebuilt, source, "token concatenation must reproduce the source");
    }

    #[test]
    fn test_full_fidelity_samples() {
        for source in [
            "<?php $x = 1 + 2 * 3;",
            "before<?php echo \"hi\"; ?>after",
            "<?php $h = <<<EOT\nline $a\nEOT;\necho $h;",
            "<?php /* c */ #[A(1)] function f(?int $n = null): void {}",
            "<?php $a <=> $b ?? $c ?: $d;",
            "no php here at all",
            "<?php\r\n$crlf = 1;\r\n?>\r\n",
            "<?php match($x) { 1, 2 => 'a', default => 'b' };",
        ] {
            assert_full_fidelity(source);
        }
    }

    proptest::proptest! {
        // Property: every token's text equals its source slice, and the
        // concatenation of all tokens reproduces the input.
        #[test]
        fn prop_token_slices_match(body in proptest::collection::vec(
            proptest::sample::select(vec![
                "$x", "42", "3.14", "'s'", "\"d\"", "+", "==", "===", "?->",
                "foo", "if", "while", ";", "(", ")", "{", "}", "//c\n",
                "/* b */", " ", "\n", "\t", "1_0", "0xFF", "[", "]", "??",
            ]),
            0..24,
        )) {
            let source = format!("<?php {}", body.concat());
            assert_full_fidelity(&source);
        }
    }
}
