//! The public entry points: tokenize, parse, parse_tokens, wire names.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use php_parser::{
    parse, parse_tokens, tokenize, NodeKind, ParserOptions, TokenKind, TokenizerOptions,
};
use pretty_assertions::assert_eq;

#[test]
fn test_tokenize_preserves_trivia_by_default() {
    let tokens = tokenize("<?php  $x ; // done", &TokenizerOptions::default()).expect("tokenize");
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Whitespace));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Comment));
    // no EOF token is emitted; the parser synthesizes one
    assert!(tokens.iter().all(|t| t.kind != TokenKind::Eof));
}

#[test]
fn test_tokenize_filter_options() {
    let options = TokenizerOptions {
        preserve_comments: false,
        preserve_whitespace: false,
        preserve_inline_html: false,
        ..TokenizerOptions::default()
    };
    let tokens = tokenize("html<?php $x; // c", &options).expect("tokenize");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![TokenKind::OpenTag, TokenKind::Variable, TokenKind::Semicolon]);
}

#[test]
fn test_parse_tokens_matches_parse() {
    let source = "<?php $x = 1 + 2;";
    let direct = parse(source, &ParserOptions::default()).expect("parse");
    let tokens = tokenize(source, &TokenizerOptions::default()).expect("tokenize");
    let via_tokens = parse_tokens(tokens, &ParserOptions::default()).expect("parse_tokens");
    assert_eq!(direct, via_tokens);
}

#[test]
fn test_wire_token_type_names() {
    let tokens = tokenize("<?php $v === 3.5 ?: C::x;", &TokenizerOptions::default())
        .expect("tokenize");
    let wire: Vec<Option<&str>> = tokens.iter().map(|t| t.php_token_type()).collect();
    assert_eq!(wire[0], Some("T_OPEN_TAG"));
    let by_kind = |kind: TokenKind| {
        tokens
            .iter()
            .find(|t| t.kind == kind)
            .and_then(|t| t.php_token_type())
    };
    assert_eq!(by_kind(TokenKind::Variable), Some("T_VARIABLE"));
    assert_eq!(by_kind(TokenKind::Identical), Some("T_IS_IDENTICAL"));
    assert_eq!(by_kind(TokenKind::Number), Some("T_DNUMBER"));
    assert_eq!(by_kind(TokenKind::DoubleColon), Some("T_DOUBLE_COLON"));
}

#[test]
fn test_parse_empty_and_html_only_sources() {
    let empty = parse("", &ParserOptions::default()).expect("empty parse");
    assert!(matches!(empty.kind, NodeKind::Program { statements } if statements.is_empty()));

    let html = parse("<p>just markup</p>", &ParserOptions::default()).expect("html parse");
    let NodeKind::Program { statements } = &html.kind else {
        panic!("expected program");
    };
    assert_eq!(statements.len(), 1);
    assert!(matches!(&statements[0].kind, NodeKind::InlineHtml { .. }));
}

#[test]
fn test_short_echo_tag() {
    let ast = parse("<?= $x ?>", &ParserOptions::default()).expect("parse");
    let NodeKind::Program { statements } = &ast.kind else {
        panic!("expected program");
    };
    assert!(matches!(&statements[0].kind, NodeKind::ExpressionStatement { .. }));
}
