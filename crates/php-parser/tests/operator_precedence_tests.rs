//! Precedence and associativity across the expression ladder.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use php_parser::{parse, Node, NodeKind, ParserOptions};

fn expr(source: &str) -> Node {
    let program = parse(&format!("<?php {source};"), &ParserOptions::default())
        .unwrap_or_else(|e| panic!("parse failed for {source:?}: {e}"));
    let NodeKind::Program { mut statements } = program.kind else {
        panic!("expected program");
    };
    let NodeKind::ExpressionStatement { expression } = statements.remove(0).kind else {
        panic!("expected expression statement");
    };
    *expression
}

fn sexp(source: &str) -> String {
    expr(source).to_sexp()
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    assert_eq!(sexp("1 + 2 * 3"), "(binary + (number 1) (binary * (number 2) (number 3)))");
    assert_eq!(sexp("1 * 2 + 3"), "(binary + (binary * (number 1) (number 2)) (number 3))");
}

#[test]
fn test_power_is_right_associative() {
    // 1 ** 2 ** 3 == 1 ** (2 ** 3)
    assert_eq!(
        sexp("1 ** 2 ** 3"),
        "(binary ** (number 1) (binary ** (number 2) (number 3)))"
    );
}

#[test]
fn test_assignment_is_right_associative() {
    // $a = $b = 1 == $a = ($b = 1)
    assert_eq!(
        sexp("$a = $b = 1"),
        "(assign = (variable $a) (assign = (variable $b) (number 1)))"
    );
}

#[test]
fn test_left_associative_additive() {
    assert_eq!(sexp("1 - 2 - 3"), "(binary - (binary - (number 1) (number 2)) (number 3))");
    assert_eq!(sexp("'a' . 'b' . 'c'"), "(binary . (binary . (string \"a\") (string \"b\")) (string \"c\"))");
}

#[test]
fn test_coalesce_right_associative() {
    assert_eq!(
        sexp("$a ?? $b ?? $c"),
        "(binary ?? (variable $a) (binary ?? (variable $b) (variable $c)))"
    );
}

#[test]
fn test_ternary_right_associative_and_short_form() {
    assert_eq!(
        sexp("$a ? $b : $c ? $d : $e"),
        "(ternary (variable $a) (variable $b) (ternary (variable $c) (variable $d) (variable $e)))"
    );
    assert_eq!(sexp("$a ?: $b"), "(ternary (variable $a) (variable $b))");
}

#[test]
fn test_comparison_and_equality_layers() {
    assert_eq!(
        sexp("$a < $b == $c"),
        "(binary == (binary < (variable $a) (variable $b)) (variable $c))"
    );
    assert_eq!(sexp("$a === $b"), "(binary === (variable $a) (variable $b))");
}

#[test]
fn test_spaceship_layer() {
    assert_eq!(sexp("$a <=> $b"), "(spaceship (variable $a) (variable $b))");
    // shift binds tighter than spaceship
    assert_eq!(
        sexp("$a << 1 <=> $b"),
        "(spaceship (binary << (variable $a) (number 1)) (variable $b))"
    );
}

#[test]
fn test_logical_word_operators() {
    // `or` shares the `||` level, below assignment in the ladder
    assert_eq!(
        sexp("$a = $b or $c"),
        "(assign = (variable $a) (logical or (variable $b) (variable $c)))"
    );
    assert_eq!(
        sexp("$a && $b || $c"),
        "(logical || (logical && (variable $a) (variable $b)) (variable $c))"
    );
    assert_eq!(
        sexp("$a xor $b"),
        "(logical xor (variable $a) (variable $b))"
    );
}

#[test]
fn test_unary_and_update() {
    assert_eq!(sexp("!$a"), "(unary ! (variable $a))");
    assert_eq!(sexp("-$a"), "(unary - (variable $a))");
    assert_eq!(sexp("~$a"), "(unary ~ (variable $a))");
    assert_eq!(sexp("++$a"), "(update ++ prefix (variable $a))");
    assert_eq!(sexp("$a--"), "(update -- postfix (variable $a))");
    assert_eq!(sexp("@f()"), "(suppress (call (name f) ))");
}

#[test]
fn test_instanceof_in_comparison_layer() {
    assert_eq!(sexp("$a instanceof Foo"), "(binary instanceof (variable $a) (name Foo))");
}

#[test]
fn test_postfix_chains() {
    assert_eq!(sexp("$a->b"), "(member (variable $a) (name b))");
    assert_eq!(sexp("$a?->b"), "(member nullsafe (variable $a) (name b))");
    assert_eq!(sexp("$a[0]"), "(member computed (variable $a) (number 0))");
    assert_eq!(sexp("A::b"), "(static_member (name A) (name b))");
    assert_eq!(sexp("$a->b()->c"), "(member (call (member (variable $a) (name b)) ) (name c))");
}

#[test]
fn test_casts() {
    assert_eq!(sexp("(int) $a"), "(cast int (variable $a))");
    assert_eq!(sexp("(integer) $a"), "(cast int (variable $a))");
    assert_eq!(sexp("(double) $a"), "(cast float (variable $a))");
    assert_eq!(sexp("(boolean) $a"), "(cast bool (variable $a))");
    assert_eq!(sexp("(array) $a"), "(cast array (variable $a))");
    // parenthesized expression is not a cast
    assert_eq!(sexp("($a)"), "(variable $a)");
    assert_eq!(sexp("(intdiv($a, $b))"), "(call (name intdiv) (arg (variable $a)) (arg (variable $b)))");
}

#[test]
fn test_equality_of_locations_spans_operands() {
    let node = expr("1 + 23");
    let NodeKind::BinaryExpression { left, right, .. } = &node.kind else {
        panic!("expected binary");
    };
    assert_eq!(node.location.start, left.location.start);
    assert_eq!(node.location.end, right.location.end);
}
