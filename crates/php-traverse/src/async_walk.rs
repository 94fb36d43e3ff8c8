//! Async variants of [`walk`](crate::walk) and [`transform`](crate::transform).
//!
//! The visitor is awaited between nodes and between siblings — strictly
//! sequentially, never concurrently — so document order holds exactly as in
//! the synchronous versions. Cancellation is cooperative via
//! [`VisitFlow::Stop`].

use crate::children::children;
use crate::transform::{transform, Transform};
use crate::walk::VisitFlow;
use async_recursion::async_recursion;
use php_ast::Node;
use std::collections::HashMap;
use std::future::Future;

/// Context passed to async visitors. Owns its ancestor snapshot so the
/// visitor's future can hold it across await points.
#[derive(Debug, Clone)]
pub struct AsyncWalkContext<'ast> {
    /// Ancestors, root first, nearest parent last
    pub parents: Vec<&'ast Node>,
    /// Nesting depth (0 for the root)
    pub depth: usize,
}

enum Flow<T> {
    Next,
    Stopped,
    Done(T),
}

#[async_recursion(?Send)]
async fn walk_node_async<'ast, T, F, Fut>(
    node: &'ast Node,
    parents: &mut Vec<&'ast Node>,
    visitor: &mut F,
) -> Flow<T>
where
    F: FnMut(&'ast Node, AsyncWalkContext<'ast>) -> Fut,
    Fut: Future<Output = VisitFlow<T>>,
{
    let context = AsyncWalkContext { parents: parents.clone(), depth: parents.len() };
    match visitor(node, context).await {
        VisitFlow::Done(value) => return Flow::Done(value),
        VisitFlow::Stop => return Flow::Stopped,
        VisitFlow::SkipChildren => return Flow::Next,
        VisitFlow::Continue => {}
    }
    parents.push(node);
    for child in children(node) {
        match walk_node_async(child, parents, visitor).await {
            Flow::Next => {}
            other => {
                parents.pop();
                return other;
            }
        }
    }
    parents.pop();
    Flow::Next
}

/// Async mirror of [`walk`](crate::walk): same document order, same flow
/// control, awaiting the visitor for every node.
pub async fn walk_async<'ast, T, F, Fut>(root: &'ast Node, mut visitor: F) -> Option<T>
where
    F: FnMut(&'ast Node, AsyncWalkContext<'ast>) -> Fut,
    Fut: Future<Output = VisitFlow<T>>,
{
    let mut parents = Vec::new();
    match walk_node_async(root, &mut parents, &mut visitor).await {
        Flow::Done(value) => Some(value),
        _ => None,
    }
}

#[async_recursion(?Send)]
async fn collect_decisions<'ast, F, Fut>(
    node: &'ast Node,
    parents: &mut Vec<&'ast Node>,
    transformer: &mut F,
    decisions: &mut HashMap<usize, Transform>,
) where
    F: FnMut(&'ast Node, AsyncWalkContext<'ast>) -> Fut,
    Fut: Future<Output = Transform>,
{
    let context = AsyncWalkContext { parents: parents.clone(), depth: parents.len() };
    let decision = transformer(node, context).await;
    let descend = matches!(decision, Transform::Keep);
    decisions.insert(node_key(node), decision);
    if descend {
        parents.push(node);
        for child in children(node) {
            collect_decisions(child, parents, transformer, decisions).await;
        }
        parents.pop();
    }
}

fn node_key(node: &Node) -> usize {
    node as *const Node as usize
}

/// Async mirror of [`transform`](crate::transform).
///
/// Decisions are gathered in a sequential async pass (children of removed
/// or replaced nodes are not visited, matching the synchronous semantics),
/// then applied in a synchronous rebuild.
pub async fn transform_async<'ast, F, Fut>(root: &'ast Node, mut transformer: F) -> Option<Node>
where
    F: FnMut(&'ast Node, AsyncWalkContext<'ast>) -> Fut,
    Fut: Future<Output = Transform>,
{
    let mut decisions = HashMap::new();
    let mut parents = Vec::new();
    collect_decisions(root, &mut parents, &mut transformer, &mut decisions).await;
    transform(root, |node, _| {
        decisions.remove(&node_key(node)).unwrap_or(Transform::Keep)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use php_ast::{NodeKind, SourceLocation, SourcePosition};
    use pretty_assertions::assert_eq;

    fn node(kind: NodeKind) -> Node {
        Node::new(kind, SourceLocation::empty(SourcePosition::start()))
    }

    fn num(raw: &str) -> Node {
        node(NodeKind::NumberLiteral { raw: raw.into(), is_float: false })
    }

    fn tree() -> Node {
        node(NodeKind::Program {
            statements: vec![node(NodeKind::EchoStatement {
                expressions: vec![num("1"), num("2")],
            })],
        })
    }

    #[test]
    fn test_walk_async_order_matches_sync() {
        let tree = tree();
        let mut order = Vec::new();
        let result: Option<()> = block_on(walk_async(&tree, |n, ctx| {
            let tag = match &n.kind {
                NodeKind::NumberLiteral { raw, .. } => raw.clone(),
                NodeKind::EchoStatement { .. } => "echo".to_string(),
                _ => "program".to_string(),
            };
            order.push((tag, ctx.depth));
            async { VisitFlow::Continue }
        }));
        assert_eq!(result, None);
        assert_eq!(
            order,
            vec![
                ("program".to_string(), 0),
                ("echo".to_string(), 1),
                ("1".to_string(), 2),
                ("2".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_walk_async_done() {
        let tree = tree();
        let found = block_on(walk_async(&tree, |n, _| {
            let hit = matches!(&n.kind, NodeKind::NumberLiteral { raw, .. } if raw == "2");
            async move { if hit { VisitFlow::Done("two") } else { VisitFlow::Continue } }
        }));
        assert_eq!(found, Some("two"));
    }

    #[test]
    fn test_transform_async_remove() {
        let tree = tree();
        let result = block_on(transform_async(&tree, |n, _| {
            let remove = matches!(&n.kind, NodeKind::NumberLiteral { raw, .. } if raw == "1");
            async move { if remove { Transform::Remove } else { Transform::Keep } }
        }));
        let Some(Node { kind: NodeKind::Program { statements }, .. }) = result else {
            unreachable!("expected program root");
        };
        let NodeKind::EchoStatement { expressions } = &statements[0].kind else {
            unreachable!("expected echo");
        };
        assert_eq!(expressions.len(), 1);
    }

    #[test]
    fn test_transform_async_identity() {
        let tree = tree();
        let copy = block_on(transform_async(&tree, |_, _| async { Transform::Keep }));
        assert_eq!(copy, Some(tree));
    }
}
