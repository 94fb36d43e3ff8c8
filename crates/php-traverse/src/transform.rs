//! Immutable tree rewriting.

use crate::walk::WalkContext;
use php_ast::{Node, NodeKind, VariableName};

/// Transformer verdict for one node.
#[derive(Debug, Clone)]
pub enum Transform {
    /// Keep this node; its children are transformed recursively and merged
    /// into a rebuilt copy
    Keep,
    /// Substitute this node with a replacement, used as-is (the replacement
    /// subtree is not re-visited)
    Replace(Node),
    /// Drop this node: removed from `Vec` children, collapsed to `None` at
    /// optional fields. Removing a structurally required child keeps the
    /// original child instead.
    Remove,
}

/// Rebuild a new tree from `root`, asking `transformer` about every node
/// top-down. Returns `None` when the root itself is removed.
///
/// The input tree is read-only; every surviving node in the output is a new
/// allocation (structural sharing is not attempted).
pub fn transform<F>(root: &Node, mut transformer: F) -> Option<Node>
where
    F: FnMut(&Node, &WalkContext<'_, '_>) -> Transform,
{
    let mut parents = Vec::new();
    transform_node(root, &mut parents, &mut transformer)
}

/// Transform a slice of sibling roots; removed roots drop out of the result.
pub fn transform_nodes<F>(roots: &[Node], mut transformer: F) -> Vec<Node>
where
    F: FnMut(&Node, &WalkContext<'_, '_>) -> Transform,
{
    let mut parents = Vec::new();
    roots
        .iter()
        .filter_map(|root| transform_node(root, &mut parents, &mut transformer))
        .collect()
}

fn transform_node<'ast, F>(
    node: &'ast Node,
    parents: &mut Vec<&'ast Node>,
    f: &mut F,
) -> Option<Node>
where
    F: FnMut(&Node, &WalkContext<'_, '_>) -> Transform,
{
    let context = WalkContext { parents: parents.as_slice(), depth: parents.len() };
    match f(node, &context) {
        Transform::Remove => return None,
        Transform::Replace(replacement) => return Some(replacement),
        Transform::Keep => {}
    }
    parents.push(node);
    let kind = rebuild(&node.kind, parents, f);
    parents.pop();
    Some(Node::new(kind, node.location.clone()))
}

fn t_box<'ast, F>(child: &'ast Node, parents: &mut Vec<&'ast Node>, f: &mut F) -> Box<Node>
where
    F: FnMut(&Node, &WalkContext<'_, '_>) -> Transform,
{
    Box::new(transform_node(child, parents, f).unwrap_or_else(|| child.clone()))
}

fn t_opt<'ast, F>(
    child: &'ast Option<Box<Node>>,
    parents: &mut Vec<&'ast Node>,
    f: &mut F,
) -> Option<Box<Node>>
where
    F: FnMut(&Node, &WalkContext<'_, '_>) -> Transform,
{
    child.as_ref().and_then(|c| transform_node(c, parents, f)).map(Box::new)
}

fn t_vec<'ast, F>(nodes: &'ast [Node], parents: &mut Vec<&'ast Node>, f: &mut F) -> Vec<Node>
where
    F: FnMut(&Node, &WalkContext<'_, '_>) -> Transform,
{
    nodes.iter().filter_map(|n| transform_node(n, parents, f)).collect()
}

#[allow(clippy::too_many_lines)]
fn rebuild<'ast, F>(kind: &'ast NodeKind, p: &mut Vec<&'ast Node>, f: &mut F) -> NodeKind
where
    F: FnMut(&Node, &WalkContext<'_, '_>) -> Transform,
{
    use NodeKind::*;
    match kind {
        Program { statements } => Program { statements: t_vec(statements, p, f) },

        ExpressionStatement { expression } => {
            ExpressionStatement { expression: t_box(expression, p, f) }
        }
        BlockStatement { statements } => BlockStatement { statements: t_vec(statements, p, f) },
        IfStatement { condition, consequent, elseifs, alternate } => IfStatement {
            condition: t_box(condition, p, f),
            consequent: t_box(consequent, p, f),
            elseifs: t_vec(elseifs, p, f),
            alternate: t_opt(alternate, p, f),
        },
        ElseIfClause { condition, consequent } => ElseIfClause {
            condition: t_box(condition, p, f),
            consequent: t_box(consequent, p, f),
        },
        WhileStatement { condition, body } => {
            WhileStatement { condition: t_box(condition, p, f), body: t_box(body, p, f) }
        }
        DoWhileStatement { body, condition } => {
            DoWhileStatement { body: t_box(body, p, f), condition: t_box(condition, p, f) }
        }
        ForStatement { init, test, update, body } => ForStatement {
            init: t_opt(init, p, f),
            test: t_opt(test, p, f),
            update: t_opt(update, p, f),
            body: t_box(body, p, f),
        },
        ForeachStatement { subject, key, by_ref, value, body } => ForeachStatement {
            subject: t_box(subject, p, f),
            key: t_opt(key, p, f),
            by_ref: *by_ref,
            value: t_box(value, p, f),
            body: t_box(body, p, f),
        },
        SwitchStatement { discriminant, cases } => SwitchStatement {
            discriminant: t_box(discriminant, p, f),
            cases: t_vec(cases, p, f),
        },
        SwitchCase { test, consequent } => {
            SwitchCase { test: t_opt(test, p, f), consequent: t_vec(consequent, p, f) }
        }
        BreakStatement { label } => BreakStatement { label: t_opt(label, p, f) },
        ContinueStatement { label } => ContinueStatement { label: t_opt(label, p, f) },
        ReturnStatement { argument } => ReturnStatement { argument: t_opt(argument, p, f) },
        ThrowStatement { argument } => ThrowStatement { argument: t_box(argument, p, f) },
        TryStatement { block, handlers, finalizer } => TryStatement {
            block: t_box(block, p, f),
            handlers: t_vec(handlers, p, f),
            finalizer: t_opt(finalizer, p, f),
        },
        CatchClause { types, param, body } => CatchClause {
            types: t_vec(types, p, f),
            param: t_opt(param, p, f),
            body: t_box(body, p, f),
        },
        EchoStatement { expressions } => EchoStatement { expressions: t_vec(expressions, p, f) },
        GlobalStatement { variables } => GlobalStatement { variables: t_vec(variables, p, f) },
        StaticStatement { declarations } => {
            StaticStatement { declarations: t_vec(declarations, p, f) }
        }
        StaticVariable { variable, initializer } => StaticVariable {
            variable: t_box(variable, p, f),
            initializer: t_opt(initializer, p, f),
        },
        UnsetStatement { arguments } => UnsetStatement { arguments: t_vec(arguments, p, f) },
        GotoStatement { label } => GotoStatement { label: label.clone() },
        LabeledStatement { label, body } => {
            LabeledStatement { label: label.clone(), body: t_box(body, p, f) }
        }
        DeclareStatement { directives, body } => DeclareStatement {
            directives: t_vec(directives, p, f),
            body: t_opt(body, p, f),
        },
        DeclareDirective { name, value } => {
            DeclareDirective { name: name.clone(), value: t_box(value, p, f) }
        }
        InlineHtml { value } => InlineHtml { value: value.clone() },

        FunctionDeclaration { name, parameters, return_type, by_ref, body } => {
            FunctionDeclaration {
                name: name.clone(),
                parameters: t_vec(parameters, p, f),
                return_type: t_opt(return_type, p, f),
                by_ref: *by_ref,
                body: t_box(body, p, f),
            }
        }
        Parameter { name, param_type, by_ref, variadic, default, promoted } => Parameter {
            name: name.clone(),
            param_type: t_opt(param_type, p, f),
            by_ref: *by_ref,
            variadic: *variadic,
            default: t_opt(default, p, f),
            promoted: promoted.clone(),
        },
        ClassDeclaration { name, modifiers, super_class, interfaces, body } => ClassDeclaration {
            name: name.clone(),
            modifiers: modifiers.clone(),
            super_class: t_opt(super_class, p, f),
            interfaces: t_vec(interfaces, p, f),
            body: t_vec(body, p, f),
        },
        InterfaceDeclaration { name, extends, body } => InterfaceDeclaration {
            name: name.clone(),
            extends: t_vec(extends, p, f),
            body: t_vec(body, p, f),
        },
        TraitDeclaration { name, body } => {
            TraitDeclaration { name: name.clone(), body: t_vec(body, p, f) }
        }
        EnumDeclaration { name, backing_type, interfaces, body } => EnumDeclaration {
            name: name.clone(),
            backing_type: *backing_type,
            interfaces: t_vec(interfaces, p, f),
            body: t_vec(body, p, f),
        },
        NamespaceDeclaration { parts, statements } => NamespaceDeclaration {
            parts: parts.clone(),
            statements: t_vec(statements, p, f),
        },
        UseStatement { kind, items } => {
            UseStatement { kind: *kind, items: t_vec(items, p, f) }
        }
        UseItem { parts, alias } => UseItem { parts: parts.clone(), alias: alias.clone() },
        ConstDeclaration { entries } => ConstDeclaration { entries: t_vec(entries, p, f) },
        ConstantEntry { name, value } => {
            ConstantEntry { name: name.clone(), value: t_box(value, p, f) }
        }

        MethodDeclaration { name, modifiers, parameters, return_type, by_ref, body } => {
            MethodDeclaration {
                name: name.clone(),
                modifiers: modifiers.clone(),
                parameters: t_vec(parameters, p, f),
                return_type: t_opt(return_type, p, f),
                by_ref: *by_ref,
                body: t_opt(body, p, f),
            }
        }
        PropertyDeclaration { modifiers, prop_type, name, initializer } => PropertyDeclaration {
            modifiers: modifiers.clone(),
            prop_type: t_opt(prop_type, p, f),
            name: name.clone(),
            initializer: t_opt(initializer, p, f),
        },
        ClassConstantDeclaration { modifiers, entries } => ClassConstantDeclaration {
            modifiers: modifiers.clone(),
            entries: t_vec(entries, p, f),
        },
        TraitUse { names, adaptations } => TraitUse {
            names: t_vec(names, p, f),
            adaptations: t_vec(adaptations, p, f),
        },
        TraitAlias { trait_name, method, visibility, alias } => TraitAlias {
            trait_name: t_opt(trait_name, p, f),
            method: method.clone(),
            visibility: *visibility,
            alias: alias.clone(),
        },
        TraitPrecedence { trait_name, method, insteadof } => TraitPrecedence {
            trait_name: t_box(trait_name, p, f),
            method: method.clone(),
            insteadof: t_vec(insteadof, p, f),
        },
        EnumCase { name, value } => {
            EnumCase { name: name.clone(), value: t_opt(value, p, f) }
        }

        NumberLiteral { raw, is_float } => {
            NumberLiteral { raw: raw.clone(), is_float: *is_float }
        }
        StringLiteral { value, raw, quote } => {
            StringLiteral { value: value.clone(), raw: raw.clone(), quote: *quote }
        }
        BooleanLiteral { value } => BooleanLiteral { value: *value },
        NullLiteral => NullLiteral,
        TemplateString { parts } => TemplateString { parts: t_vec(parts, p, f) },
        TemplateElement { value } => TemplateElement { value: value.clone() },
        VariableExpression { name } => VariableExpression {
            name: match name {
                VariableName::Name(name) => VariableName::Name(name.clone()),
                VariableName::Expr(expr) => VariableName::Expr(t_box(expr, p, f)),
            },
        },
        NameExpression { parts, qualification } => NameExpression {
            parts: parts.clone(),
            qualification: *qualification,
        },
        ArrayExpression { elements } => ArrayExpression { elements: t_vec(elements, p, f) },
        ArrayElement { key, value, spread, by_ref } => ArrayElement {
            key: t_opt(key, p, f),
            value: t_box(value, p, f),
            spread: *spread,
            by_ref: *by_ref,
        },
        ArrayPattern { elements } => ArrayPattern { elements: t_vec(elements, p, f) },
        UnaryExpression { operator, operand } => UnaryExpression {
            operator: operator.clone(),
            operand: t_box(operand, p, f),
        },
        UpdateExpression { operator, prefix, argument } => UpdateExpression {
            operator: operator.clone(),
            prefix: *prefix,
            argument: t_box(argument, p, f),
        },
        BinaryExpression { operator, left, right } => BinaryExpression {
            operator: operator.clone(),
            left: t_box(left, p, f),
            right: t_box(right, p, f),
        },
        LogicalExpression { operator, left, right } => LogicalExpression {
            operator: operator.clone(),
            left: t_box(left, p, f),
            right: t_box(right, p, f),
        },
        ConditionalExpression { test, consequent, alternate } => ConditionalExpression {
            test: t_box(test, p, f),
            consequent: t_opt(consequent, p, f),
            alternate: t_box(alternate, p, f),
        },
        SpaceshipExpression { left, right } => SpaceshipExpression {
            left: t_box(left, p, f),
            right: t_box(right, p, f),
        },
        CastExpression { cast_type, operand } => CastExpression {
            cast_type: *cast_type,
            operand: t_box(operand, p, f),
        },
        CallExpression { callee, arguments } => CallExpression {
            callee: t_box(callee, p, f),
            arguments: t_vec(arguments, p, f),
        },
        Argument { name, value, spread } => Argument {
            name: name.clone(),
            value: t_box(value, p, f),
            spread: *spread,
        },
        MemberExpression { object, property, computed, nullsafe } => MemberExpression {
            object: t_box(object, p, f),
            property: t_box(property, p, f),
            computed: *computed,
            nullsafe: *nullsafe,
        },
        StaticMemberExpression { class, member, computed } => StaticMemberExpression {
            class: t_box(class, p, f),
            member: t_box(member, p, f),
            computed: *computed,
        },
        NewExpression { callee, arguments } => NewExpression {
            callee: t_box(callee, p, f),
            arguments: t_vec(arguments, p, f),
        },
        AnonymousClass { arguments, super_class, interfaces, body } => AnonymousClass {
            arguments: t_vec(arguments, p, f),
            super_class: t_opt(super_class, p, f),
            interfaces: t_vec(interfaces, p, f),
            body: t_vec(body, p, f),
        },
        CloneExpression { argument } => CloneExpression { argument: t_box(argument, p, f) },
        YieldExpression { key, argument, delegate } => YieldExpression {
            key: t_opt(key, p, f),
            argument: t_opt(argument, p, f),
            delegate: *delegate,
        },
        MatchExpression { discriminant, arms } => MatchExpression {
            discriminant: t_box(discriminant, p, f),
            arms: t_vec(arms, p, f),
        },
        MatchArm { conditions, body } => MatchArm {
            conditions: conditions.as_ref().map(|c| t_vec(c, p, f)),
            body: t_box(body, p, f),
        },
        IncludeExpression { kind, argument } => IncludeExpression {
            kind: *kind,
            argument: t_box(argument, p, f),
        },
        IssetExpression { arguments } => IssetExpression { arguments: t_vec(arguments, p, f) },
        EmptyExpression { argument } => EmptyExpression { argument: t_box(argument, p, f) },
        EvalExpression { argument } => EvalExpression { argument: t_box(argument, p, f) },
        ExitExpression { argument } => ExitExpression { argument: t_opt(argument, p, f) },
        PrintExpression { argument } => PrintExpression { argument: t_box(argument, p, f) },
        ListExpression { elements } => ListExpression { elements: t_vec(elements, p, f) },
        SpreadElement { argument } => SpreadElement { argument: t_box(argument, p, f) },
        ReferenceExpression { expression } => {
            ReferenceExpression { expression: t_box(expression, p, f) }
        }
        ErrorControlExpression { expression } => {
            ErrorControlExpression { expression: t_box(expression, p, f) }
        }
        AssignmentExpression { operator, left, right } => AssignmentExpression {
            operator: operator.clone(),
            left: t_box(left, p, f),
            right: t_box(right, p, f),
        },
        FunctionExpression { parameters, uses, return_type, by_ref, is_static, body } => {
            FunctionExpression {
                parameters: t_vec(parameters, p, f),
                uses: t_vec(uses, p, f),
                return_type: t_opt(return_type, p, f),
                by_ref: *by_ref,
                is_static: *is_static,
                body: t_box(body, p, f),
            }
        }
        ClosureUse { variable, by_reference } => ClosureUse {
            variable: t_box(variable, p, f),
            by_reference: *by_reference,
        },
        ArrowFunctionExpression { parameters, return_type, by_ref, is_static, body } => {
            ArrowFunctionExpression {
                parameters: t_vec(parameters, p, f),
                return_type: t_opt(return_type, p, f),
                by_ref: *by_ref,
                is_static: *is_static,
                body: t_box(body, p, f),
            }
        }
        SequenceExpression { expressions } => {
            SequenceExpression { expressions: t_vec(expressions, p, f) }
        }

        SimpleType { name } => SimpleType { name: name.clone() },
        NullableType { inner } => NullableType { inner: t_box(inner, p, f) },
        UnionType { members } => UnionType { members: t_vec(members, p, f) },
        IntersectionType { members } => IntersectionType { members: t_vec(members, p, f) },
        ArrayType => ArrayType,
        CallableType => CallableType,
    }
}
