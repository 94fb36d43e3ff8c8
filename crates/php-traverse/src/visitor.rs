//! Trait façade over [`walk`](crate::walk) for visitor-shaped consumers.

use crate::walk::{walk, VisitFlow, WalkContext};
use php_ast::Node;

/// Visitor with per-category hooks.
///
/// [`accept`] calls [`visit_node`](Visit::visit_node) for every node, then
/// the matching category hook (declarations take precedence over the wider
/// statement category). All hooks default to [`VisitFlow::Continue`], so
/// implementors override only what they care about.
pub trait Visit {
    /// Called for every node before the category hooks.
    fn visit_node(&mut self, _node: &Node, _context: &WalkContext<'_, '_>) -> VisitFlow<()> {
        VisitFlow::Continue
    }

    /// Called for declaration nodes.
    fn visit_declaration(&mut self, _node: &Node, _context: &WalkContext<'_, '_>) -> VisitFlow<()> {
        VisitFlow::Continue
    }

    /// Called for non-declaration statement nodes.
    fn visit_statement(&mut self, _node: &Node, _context: &WalkContext<'_, '_>) -> VisitFlow<()> {
        VisitFlow::Continue
    }

    /// Called for expression nodes.
    fn visit_expression(&mut self, _node: &Node, _context: &WalkContext<'_, '_>) -> VisitFlow<()> {
        VisitFlow::Continue
    }
}

/// Drive a [`Visit`] implementation over the tree in document order.
///
/// Returns `false` when the visitor stopped the traversal early.
pub fn accept<V: Visit>(root: &Node, visitor: &mut V) -> bool {
    // Stop maps onto Done so an early halt is distinguishable from a
    // completed walk.
    let halted = walk(root, |node, context| {
        let flow = match visitor.visit_node(node, context) {
            VisitFlow::Continue => {
                if node.is_declaration() {
                    visitor.visit_declaration(node, context)
                } else if node.is_statement() {
                    visitor.visit_statement(node, context)
                } else if node.is_expression() {
                    visitor.visit_expression(node, context)
                } else {
                    VisitFlow::Continue
                }
            }
            other => other,
        };
        match flow {
            VisitFlow::Stop | VisitFlow::Done(()) => VisitFlow::Done(()),
            VisitFlow::Continue => VisitFlow::Continue,
            VisitFlow::SkipChildren => VisitFlow::SkipChildren,
        }
    });
    halted.is_none()
}
