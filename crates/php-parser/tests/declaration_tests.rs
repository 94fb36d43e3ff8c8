//! Declarations: classes, interfaces, traits, enums, namespaces, imports.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use php_parser::{parse, Modifier, Node, NodeKind, ParserOptions, UseKind};

fn statements(source: &str) -> Vec<Node> {
    let program = parse(source, &ParserOptions::default())
        .unwrap_or_else(|e| panic!("parse failed for {source:?}: {e}"));
    match program.kind {
        NodeKind::Program { statements } => statements,
        other => panic!("expected program, got {other:?}"),
    }
}

#[test]
fn test_function_declaration_with_byref_and_default() {
    let stmts = statements("<?php function &f($a, $b = 1) { return $a; }");
    let NodeKind::FunctionDeclaration { name, by_ref, parameters, .. } = &stmts[0].kind else {
        panic!("expected function");
    };
    assert_eq!(name, "f");
    assert!(*by_ref);
    assert_eq!(parameters.len(), 2);
    let NodeKind::Parameter { default, .. } = &parameters[1].kind else {
        panic!("expected parameter");
    };
    assert!(default.is_some());
}

#[test]
fn test_promoted_constructor_parameters() {
    let stmts = statements(
        "<?php class P { public function __construct(private readonly int $id, string $name) {} }",
    );
    let NodeKind::ClassDeclaration { body, .. } = &stmts[0].kind else {
        panic!("expected class");
    };
    let NodeKind::MethodDeclaration { parameters, .. } = &body[0].kind else {
        panic!("expected constructor");
    };
    let NodeKind::Parameter { promoted, name, .. } = &parameters[0].kind else {
        panic!("expected parameter");
    };
    assert_eq!(name, "id");
    assert_eq!(promoted, &[Modifier::Private, Modifier::Readonly]);
    let NodeKind::Parameter { promoted, .. } = &parameters[1].kind else {
        panic!("expected parameter");
    };
    assert!(promoted.is_empty());
}

#[test]
fn test_abstract_class_and_method() {
    let stmts = statements("<?php abstract class A { abstract protected function m(): int; }");
    let NodeKind::ClassDeclaration { modifiers, body, .. } = &stmts[0].kind else {
        panic!("expected class");
    };
    assert_eq!(modifiers, &[Modifier::Abstract]);
    let NodeKind::MethodDeclaration { modifiers, body: method_body, .. } = &body[0].kind else {
        panic!("expected method");
    };
    assert!(modifiers.contains(&Modifier::Abstract));
    assert!(method_body.is_none());
}

#[test]
fn test_readonly_class_modifier() {
    let stmts = statements("<?php final readonly class V { public int $x; }");
    let NodeKind::ClassDeclaration { modifiers, .. } = &stmts[0].kind else {
        panic!("expected class");
    };
    assert_eq!(modifiers, &[Modifier::Final, Modifier::Readonly]);
}

#[test]
fn test_interface_methods_have_no_bodies() {
    let stmts = statements(
        "<?php interface I extends A, B { const N = 1; public function m(): void; }",
    );
    let NodeKind::InterfaceDeclaration { extends, body, .. } = &stmts[0].kind else {
        panic!("expected interface");
    };
    assert_eq!(extends.len(), 2);
    assert!(matches!(&body[0].kind, NodeKind::ClassConstantDeclaration { .. }));
    let NodeKind::MethodDeclaration { body: method_body, .. } = &body[1].kind else {
        panic!("expected method");
    };
    assert!(method_body.is_none());
}

#[test]
fn test_trait_with_use_and_adaptations() {
    let stmts = statements(
        "<?php class C { use T1, T2 { T1::m as protected renamed; T1::n insteadof T2; } }",
    );
    let NodeKind::ClassDeclaration { body, .. } = &stmts[0].kind else {
        panic!("expected class");
    };
    let NodeKind::TraitUse { names, adaptations } = &body[0].kind else {
        panic!("expected trait use");
    };
    assert_eq!(names.len(), 2);
    assert_eq!(adaptations.len(), 2);
    let NodeKind::TraitAlias { method, visibility, alias, .. } = &adaptations[0].kind else {
        panic!("expected alias adaptation");
    };
    assert_eq!(method, "m");
    assert_eq!(*visibility, Some(Modifier::Protected));
    assert_eq!(alias.as_deref(), Some("renamed"));
    let NodeKind::TraitPrecedence { method, insteadof, .. } = &adaptations[1].kind else {
        panic!("expected precedence adaptation");
    };
    assert_eq!(method, "n");
    assert_eq!(insteadof.len(), 1);
}

#[test]
fn test_enum_cases_and_members() {
    let stmts = statements(
        "<?php enum Suit: string implements HasColor { \
         case Hearts = 'h'; case Spades = 's'; \
         const WILD = '*'; \
         public function color(): string { return 'red'; } }",
    );
    let NodeKind::EnumDeclaration { backing_type, interfaces, body, .. } = &stmts[0].kind else {
        panic!("expected enum");
    };
    assert!(backing_type.is_some());
    assert_eq!(interfaces.len(), 1);
    let case_count = body
        .iter()
        .filter(|m| matches!(m.kind, NodeKind::EnumCase { .. }))
        .count();
    assert_eq!(case_count, 2);
    assert!(body.iter().any(|m| matches!(m.kind, NodeKind::ClassConstantDeclaration { .. })));
    assert!(body.iter().any(|m| matches!(m.kind, NodeKind::MethodDeclaration { .. })));
}

#[test]
fn test_pure_enum_case_without_value() {
    let stmts = statements("<?php enum Direction { case North; case South; }");
    let NodeKind::EnumDeclaration { backing_type, body, .. } = &stmts[0].kind else {
        panic!("expected enum");
    };
    assert!(backing_type.is_none());
    assert!(matches!(
        &body[0].kind,
        NodeKind::EnumCase { value: None, .. }
    ));
}

#[test]
fn test_namespace_braced_form() {
    let stmts = statements("<?php namespace A { function f() {} } namespace B { function g() {} }");
    assert_eq!(stmts.len(), 2);
    let NodeKind::NamespaceDeclaration { parts, statements: inner } = &stmts[0].kind else {
        panic!("expected namespace");
    };
    assert_eq!(parts, &["A".to_string()]);
    assert_eq!(inner.len(), 1);
}

#[test]
fn test_namespace_semicolon_form_stops_at_next_namespace() {
    let stmts = statements("<?php namespace A; $x = 1; namespace B; $y = 2;");
    assert_eq!(stmts.len(), 2);
    let NodeKind::NamespaceDeclaration { parts, statements: inner } = &stmts[1].kind else {
        panic!("expected namespace");
    };
    assert_eq!(parts, &["B".to_string()]);
    assert_eq!(inner.len(), 1);
}

#[test]
fn test_anonymous_namespace() {
    let stmts = statements("<?php namespace { $x = 1; }");
    let NodeKind::NamespaceDeclaration { parts, statements: inner } = &stmts[0].kind else {
        panic!("expected namespace");
    };
    assert!(parts.is_empty());
    assert_eq!(inner.len(), 1);
}

#[test]
fn test_use_kinds() {
    let stmts = statements(
        "<?php use A\\B; use function str_len; use const PHP_EOL as NL;",
    );
    let NodeKind::UseStatement { kind, .. } = &stmts[0].kind else {
        panic!("expected use");
    };
    assert_eq!(*kind, UseKind::Normal);
    let NodeKind::UseStatement { kind, .. } = &stmts[1].kind else {
        panic!("expected use");
    };
    assert_eq!(*kind, UseKind::Function);
    let NodeKind::UseStatement { kind, items } = &stmts[2].kind else {
        panic!("expected use");
    };
    assert_eq!(*kind, UseKind::Const);
    assert!(matches!(
        &items[0].kind,
        NodeKind::UseItem { alias: Some(alias), .. } if alias == "NL"
    ));
}

#[test]
fn test_top_level_const() {
    let stmts = statements("<?php const A = 1, B = 2;");
    let NodeKind::ConstDeclaration { entries } = &stmts[0].kind else {
        panic!("expected const");
    };
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_multi_property_declaration_expands() {
    let stmts = statements("<?php class C { private static int $a = 1, $b; }");
    let NodeKind::ClassDeclaration { body, .. } = &stmts[0].kind else {
        panic!("expected class");
    };
    assert_eq!(body.len(), 2);
    for member in body {
        let NodeKind::PropertyDeclaration { modifiers, prop_type, .. } = &member.kind else {
            panic!("expected property");
        };
        assert_eq!(modifiers, &[Modifier::Private, Modifier::Static]);
        assert!(prop_type.is_some());
    }
}

#[test]
fn test_union_and_intersection_types() {
    let stmts = statements("<?php function f(A|B $x, C&D $y, ?E $z): int|false {}");
    let NodeKind::FunctionDeclaration { parameters, return_type, .. } = &stmts[0].kind else {
        panic!("expected function");
    };
    assert!(matches!(
        &parameters[0].kind,
        NodeKind::Parameter { param_type: Some(t), .. }
            if matches!(&t.kind, NodeKind::UnionType { members } if members.len() == 2)
    ));
    assert!(matches!(
        &parameters[1].kind,
        NodeKind::Parameter { param_type: Some(t), .. }
            if matches!(&t.kind, NodeKind::IntersectionType { members } if members.len() == 2)
    ));
    assert!(matches!(
        &parameters[2].kind,
        NodeKind::Parameter { param_type: Some(t), .. }
            if matches!(&t.kind, NodeKind::NullableType { .. })
    ));
    assert!(matches!(
        &return_type.as_ref().expect("return type").kind,
        NodeKind::UnionType { members } if members.len() == 2
    ));
}

#[test]
fn test_array_and_callable_types() {
    let stmts = statements("<?php function f(array $a, callable $c) {}");
    let NodeKind::FunctionDeclaration { parameters, .. } = &stmts[0].kind else {
        panic!("expected function");
    };
    assert!(matches!(
        &parameters[0].kind,
        NodeKind::Parameter { param_type: Some(t), .. } if matches!(t.kind, NodeKind::ArrayType)
    ));
    assert!(matches!(
        &parameters[1].kind,
        NodeKind::Parameter { param_type: Some(t), .. } if matches!(t.kind, NodeKind::CallableType)
    ));
}

#[test]
fn test_attributes_are_accepted_before_declarations() {
    let stmts = statements("<?php #[Route('/home')] class C { #[Inject] public function m() {} }");
    assert!(matches!(&stmts[0].kind, NodeKind::ClassDeclaration { .. }));
}

#[test]
fn test_anonymous_class_expression() {
    let stmts = statements("<?php $o = new class(1) extends B implements I { public function m() {} };");
    let NodeKind::ExpressionStatement { expression } = &stmts[0].kind else {
        panic!("expected expression statement");
    };
    let NodeKind::AssignmentExpression { right, .. } = &expression.kind else {
        panic!("expected assignment");
    };
    let NodeKind::NewExpression { callee, .. } = &right.kind else {
        panic!("expected new");
    };
    let NodeKind::AnonymousClass { arguments, super_class, interfaces, body } = &callee.kind
    else {
        panic!("expected anonymous class");
    };
    assert_eq!(arguments.len(), 1);
    assert!(super_class.is_some());
    assert_eq!(interfaces.len(), 1);
    assert_eq!(body.len(), 1);
}
