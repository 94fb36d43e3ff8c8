//! Generic traversal over the PHP AST.
//!
//! [`walk`] visits every node in document order (parent before children,
//! earlier siblings first) with an ancestor list and depth; the visitor
//! steers with [`VisitFlow`]: continue, skip a subtree, stop the walk, or
//! finish early with a value. [`find_nodes`]/[`find_first`] are walk-based
//! conveniences, [`transform`] rebuilds a new tree from a transformer's
//! decisions, and [`walk_async`]/[`transform_async`] mirror the synchronous
//! versions, awaiting the visitor between nodes — strictly sequentially,
//! never concurrently.
//!
//! Child traversal is an exhaustive per-variant table over [`NodeKind`];
//! the closed enum means the compiler forces the table to cover every new
//! variant.
//!
//! [`NodeKind`]: php_ast::NodeKind

mod async_walk;
mod children;
mod transform;
mod visitor;
mod walk;

pub use async_walk::{transform_async, walk_async, AsyncWalkContext};
pub use children::children;
pub use transform::{transform, transform_nodes, Transform};
pub use visitor::{accept, Visit};
pub use walk::{find_first, find_nodes, walk, walk_nodes, VisitFlow, WalkContext};
