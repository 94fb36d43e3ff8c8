//! Compact S-expression rendering of the AST.
//!
//! Used by tests and dump tooling; not a source printer. Locations are
//! omitted, modifier lists render as bare words, absent optional children
//! are skipped.

use crate::ast::{Node, NodeKind, VariableName};

fn join(nodes: &[Node]) -> String {
    nodes.iter().map(Node::to_sexp).collect::<Vec<_>>().join(" ")
}

fn joined(label: &str, nodes: &[Node]) -> String {
    if nodes.is_empty() {
        String::new()
    } else {
        format!(" ({} {})", label, join(nodes))
    }
}

fn opt(node: &Option<Box<Node>>) -> String {
    match node {
        Some(n) => format!(" {}", n.to_sexp()),
        None => String::new(),
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Node {
    /// Render this subtree as an S-expression.
    pub fn to_sexp(&self) -> String {
        use NodeKind::*;
        match &self.kind {
            Program { statements } => format!("(program {})", join(statements)),

            ExpressionStatement { expression } => {
                format!("(expression_statement {})", expression.to_sexp())
            }
            BlockStatement { statements } => format!("(block {})", join(statements)),
            IfStatement { condition, consequent, elseifs, alternate } => format!(
                "(if {} {}{}{})",
                condition.to_sexp(),
                consequent.to_sexp(),
                joined("elseifs", elseifs),
                opt(alternate)
            ),
            ElseIfClause { condition, consequent } => {
                format!("(elseif {} {})", condition.to_sexp(), consequent.to_sexp())
            }
            WhileStatement { condition, body } => {
                format!("(while {} {})", condition.to_sexp(), body.to_sexp())
            }
            DoWhileStatement { body, condition } => {
                format!("(do_while {} {})", body.to_sexp(), condition.to_sexp())
            }
            ForStatement { init, test, update, body } => {
                format!("(for{}{}{} {})", opt(init), opt(test), opt(update), body.to_sexp())
            }
            ForeachStatement { subject, key, by_ref, value, body } => format!(
                "(foreach {}{}{} {} {})",
                subject.to_sexp(),
                opt(key),
                if *by_ref { " byref" } else { "" },
                value.to_sexp(),
                body.to_sexp()
            ),
            SwitchStatement { discriminant, cases } => {
                format!("(switch {} {})", discriminant.to_sexp(), join(cases))
            }
            SwitchCase { test, consequent } => match test {
                Some(test) => format!("(case {} {})", test.to_sexp(), join(consequent)),
                None => format!("(default {})", join(consequent)),
            },
            BreakStatement { label } => format!("(break{})", opt(label)),
            ContinueStatement { label } => format!("(continue{})", opt(label)),
            ReturnStatement { argument } => format!("(return{})", opt(argument)),
            ThrowStatement { argument } => format!("(throw {})", argument.to_sexp()),
            TryStatement { block, handlers, finalizer } => format!(
                "(try {} {}{})",
                block.to_sexp(),
                join(handlers),
                match finalizer {
                    Some(f) => format!(" (finally {})", f.to_sexp()),
                    None => String::new(),
                }
            ),
            CatchClause { types, param, body } => {
                format!("(catch ({}){} {})", join(types), opt(param), body.to_sexp())
            }
            EchoStatement { expressions } => format!("(echo {})", join(expressions)),
            GlobalStatement { variables } => format!("(global {})", join(variables)),
            StaticStatement { declarations } => format!("(static {})", join(declarations)),
            StaticVariable { variable, initializer } => {
                format!("(static_var {}{})", variable.to_sexp(), opt(initializer))
            }
            UnsetStatement { arguments } => format!("(unset {})", join(arguments)),
            GotoStatement { label } => format!("(goto {})", label),
            LabeledStatement { label, body } => format!("(label {} {})", label, body.to_sexp()),
            DeclareStatement { directives, body } => {
                format!("(declare {}{})", join(directives), opt(body))
            }
            DeclareDirective { name, value } => {
                format!("(directive {} {})", name, value.to_sexp())
            }
            InlineHtml { value } => format!("(inline_html \"{}\")", escape(value)),

            FunctionDeclaration { name, parameters, return_type, by_ref, body } => format!(
                "(function {}{} ({}){} {})",
                if *by_ref { "&" } else { "" },
                name,
                join(parameters),
                opt(return_type),
                body.to_sexp()
            ),
            Parameter { name, param_type, by_ref, variadic, default, promoted } => format!(
                "(param{}{}{}{} ${}{})",
                mods(promoted),
                opt(param_type),
                if *by_ref { " byref" } else { "" },
                if *variadic { " variadic" } else { "" },
                name,
                opt(default)
            ),
            ClassDeclaration { name, modifiers, super_class, interfaces, body } => format!(
                "(class{} {}{}{} {})",
                mods(modifiers),
                name,
                match super_class {
                    Some(s) => format!(" (extends {})", s.to_sexp()),
                    None => String::new(),
                },
                joined("implements", interfaces),
                join(body)
            ),
            InterfaceDeclaration { name, extends, body } => {
                format!("(interface {}{} {})", name, joined("extends", extends), join(body))
            }
            TraitDeclaration { name, body } => format!("(trait {} {})", name, join(body)),
            EnumDeclaration { name, backing_type, interfaces, body } => format!(
                "(enum {}{}{} {})",
                name,
                match backing_type {
                    Some(crate::EnumBackingType::Int) => " : int",
                    Some(crate::EnumBackingType::String) => " : string",
                    None => "",
                },
                joined("implements", interfaces),
                join(body)
            ),
            NamespaceDeclaration { parts, statements } => {
                format!("(namespace {} {})", parts.join("\\"), join(statements))
            }
            UseStatement { kind, items } => format!(
                "(use{} {})",
                match kind {
                    crate::UseKind::Normal => "",
                    crate::UseKind::Function => " function",
                    crate::UseKind::Const => " const",
                },
                join(items)
            ),
            UseItem { parts, alias } => format!(
                "(item {}{})",
                parts.join("\\"),
                match alias {
                    Some(a) => format!(" as {}", a),
                    None => String::new(),
                }
            ),
            ConstDeclaration { entries } => format!("(const {})", join(entries)),
            ConstantEntry { name, value } => format!("({} {})", name, value.to_sexp()),

            MethodDeclaration { name, modifiers, parameters, return_type, by_ref, body } => {
                format!(
                    "(method{} {}{} ({}){}{})",
                    mods(modifiers),
                    if *by_ref { "&" } else { "" },
                    name,
                    join(parameters),
                    opt(return_type),
                    opt(body)
                )
            }
            PropertyDeclaration { modifiers, prop_type, name, initializer } => format!(
                "(property{}{} ${}{})",
                mods(modifiers),
                opt(prop_type),
                name,
                opt(initializer)
            ),
            ClassConstantDeclaration { modifiers, entries } => {
                format!("(class_const{} {})", mods(modifiers), join(entries))
            }
            TraitUse { names, adaptations } => {
                format!("(trait_use {}{})", join(names), joined("adaptations", adaptations))
            }
            TraitAlias { trait_name, method, visibility, alias } => format!(
                "(alias {}{}{}{})",
                match trait_name {
                    Some(t) => format!("{}::", t.to_sexp()),
                    None => String::new(),
                },
                method,
                match visibility {
                    Some(v) => format!(" {}", v.as_str()),
                    None => String::new(),
                },
                match alias {
                    Some(a) => format!(" {}", a),
                    None => String::new(),
                }
            ),
            TraitPrecedence { trait_name, method, insteadof } => format!(
                "(insteadof {}::{} {})",
                trait_name.to_sexp(),
                method,
                join(insteadof)
            ),
            EnumCase { name, value } => format!("(case {}{})", name, opt(value)),

            NumberLiteral { raw, .. } => format!("(number {})", raw),
            StringLiteral { value, .. } => format!("(string \"{}\")", escape(value)),
            BooleanLiteral { value } => format!("(bool {})", value),
            NullLiteral => "(null)".to_string(),
            TemplateString { parts } => format!("(template {})", join(parts)),
            TemplateElement { value } => format!("(text \"{}\")", escape(value)),
            VariableExpression { name } => match name {
                VariableName::Name(n) => format!("(variable ${})", n),
                VariableName::Expr(e) => format!("(variable {})", e.to_sexp()),
            },
            NameExpression { parts, qualification } => format!(
                "(name {}{})",
                if matches!(qualification, crate::NameQualification::Fully) { "\\" } else { "" },
                parts.join("\\")
            ),
            ArrayExpression { elements } => format!("(array {})", join(elements)),
            ArrayElement { key, value, spread, by_ref } => format!(
                "(elem{}{}{} {})",
                if *spread { " spread" } else { "" },
                if *by_ref { " byref" } else { "" },
                opt(key),
                value.to_sexp()
            ),
            ArrayPattern { elements } => format!("(array_pattern {})", join(elements)),
            UnaryExpression { operator, operand } => {
                format!("(unary {} {})", operator, operand.to_sexp())
            }
            UpdateExpression { operator, prefix, argument } => format!(
                "(update {} {} {})",
                operator,
                if *prefix { "prefix" } else { "postfix" },
                argument.to_sexp()
            ),
            BinaryExpression { operator, left, right } => {
                format!("(binary {} {} {})", operator, left.to_sexp(), right.to_sexp())
            }
            LogicalExpression { operator, left, right } => {
                format!("(logical {} {} {})", operator, left.to_sexp(), right.to_sexp())
            }
            ConditionalExpression { test, consequent, alternate } => format!(
                "(ternary {}{} {})",
                test.to_sexp(),
                opt(consequent),
                alternate.to_sexp()
            ),
            SpaceshipExpression { left, right } => {
                format!("(spaceship {} {})", left.to_sexp(), right.to_sexp())
            }
            CastExpression { cast_type, operand } => {
                format!("(cast {} {})", cast_type.as_str(), operand.to_sexp())
            }
            CallExpression { callee, arguments } => {
                format!("(call {} {})", callee.to_sexp(), join(arguments))
            }
            Argument { name, value, spread } => format!(
                "(arg{}{} {})",
                if *spread { " spread" } else { "" },
                match name {
                    Some(n) => format!(" {}:", n),
                    None => String::new(),
                },
                value.to_sexp()
            ),
            MemberExpression { object, property, computed, nullsafe } => format!(
                "(member{}{} {} {})",
                if *nullsafe { " nullsafe" } else { "" },
                if *computed { " computed" } else { "" },
                object.to_sexp(),
                property.to_sexp()
            ),
            StaticMemberExpression { class, member, computed } => format!(
                "(static_member{} {} {})",
                if *computed { " computed" } else { "" },
                class.to_sexp(),
                member.to_sexp()
            ),
            NewExpression { callee, arguments } => {
                format!("(new {} {})", callee.to_sexp(), join(arguments))
            }
            AnonymousClass { arguments, super_class, interfaces, body } => format!(
                "(anon_class ({}){}{} {})",
                join(arguments),
                match super_class {
                    Some(s) => format!(" (extends {})", s.to_sexp()),
                    None => String::new(),
                },
                joined("implements", interfaces),
                join(body)
            ),
            CloneExpression { argument } => format!("(clone {})", argument.to_sexp()),
            YieldExpression { key, argument, delegate } => format!(
                "(yield{}{}{})",
                if *delegate { " from" } else { "" },
                opt(key),
                opt(argument)
            ),
            MatchExpression { discriminant, arms } => {
                format!("(match {} {})", discriminant.to_sexp(), join(arms))
            }
            MatchArm { conditions, body } => match conditions {
                Some(conds) => format!("(arm ({}) {})", join(conds), body.to_sexp()),
                None => format!("(arm default {})", body.to_sexp()),
            },
            IncludeExpression { kind, argument } => {
                format!("({} {})", kind.as_str(), argument.to_sexp())
            }
            IssetExpression { arguments } => format!("(isset {})", join(arguments)),
            EmptyExpression { argument } => format!("(empty {})", argument.to_sexp()),
            EvalExpression { argument } => format!("(eval {})", argument.to_sexp()),
            ExitExpression { argument } => format!("(exit{})", opt(argument)),
            PrintExpression { argument } => format!("(print {})", argument.to_sexp()),
            ListExpression { elements } => format!("(list {})", join(elements)),
            SpreadElement { argument } => format!("(spread {})", argument.to_sexp()),
            ReferenceExpression { expression } => format!("(ref {})", expression.to_sexp()),
            ErrorControlExpression { expression } => {
                format!("(suppress {})", expression.to_sexp())
            }
            AssignmentExpression { operator, left, right } => {
                format!("(assign {} {} {})", operator, left.to_sexp(), right.to_sexp())
            }
            FunctionExpression { parameters, uses, return_type, by_ref, is_static, body } => {
                format!(
                    "(closure{}{} ({}){}{} {})",
                    if *is_static { " static" } else { "" },
                    if *by_ref { " byref" } else { "" },
                    join(parameters),
                    joined("use", uses),
                    opt(return_type),
                    body.to_sexp()
                )
            }
            ClosureUse { variable, by_reference } => format!(
                "(capture{} {})",
                if *by_reference { " byref" } else { "" },
                variable.to_sexp()
            ),
            ArrowFunctionExpression { parameters, return_type, by_ref, is_static, body } => {
                format!(
                    "(arrow_fn{}{} ({}){} {})",
                    if *is_static { " static" } else { "" },
                    if *by_ref { " byref" } else { "" },
                    join(parameters),
                    opt(return_type),
                    body.to_sexp()
                )
            }
            SequenceExpression { expressions } => format!("(seq {})", join(expressions)),

            SimpleType { name } => format!("(type {})", name),
            NullableType { inner } => format!("(nullable {})", inner.to_sexp()),
            UnionType { members } => format!("(union {})", join(members)),
            IntersectionType { members } => format!("(intersection {})", join(members)),
            ArrayType => "(type array)".to_string(),
            CallableType => "(type callable)".to_string(),
        }
    }
}

fn mods(modifiers: &[crate::Modifier]) -> String {
    if modifiers.is_empty() {
        String::new()
    } else {
        let words: Vec<&str> = modifiers.iter().map(|m| m.as_str()).collect();
        format!(" {}", words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NameQualification, NodeKind};
    use php_position_tracking::{SourceLocation, SourcePosition};

    fn node(kind: NodeKind) -> Node {
        Node::new(kind, SourceLocation::empty(SourcePosition::start()))
    }

    #[test]
    fn test_binary_sexp() {
        let tree = node(NodeKind::BinaryExpression {
            operator: "+".into(),
            left: Box::new(node(NodeKind::NumberLiteral { raw: "1".into(), is_float: false })),
            right: Box::new(node(NodeKind::NumberLiteral { raw: "2".into(), is_float: false })),
        });
        assert_eq!(tree.to_sexp(), "(binary + (number 1) (number 2))");
    }

    #[test]
    fn test_name_sexp_marks_fully_qualified() {
        let name = node(NodeKind::NameExpression {
            parts: vec!["Foo".into(), "Bar".into()],
            qualification: NameQualification::Fully,
        });
        assert_eq!(name.to_sexp(), "(name \\Foo\\Bar)");
    }

    #[test]
    fn test_string_escaping() {
        let s = node(NodeKind::StringLiteral {
            value: "a \"b\"".into(),
            raw: "'a \"b\"'".into(),
            quote: php_token::Quote::Single,
        });
        assert_eq!(s.to_sexp(), "(string \"a \\\"b\\\"\")");
    }
}
