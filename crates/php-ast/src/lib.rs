//! AST definitions for the PHP front-end.
//!
//! The tree is a single [`Node`] type tagged by [`NodeKind`]; every node
//! carries a [`SourceLocation`]. Trees are immutable once produced — the
//! traversal crate rebuilds rather than mutates.

mod ast;
mod sexp;

pub use ast::{
    CastKind, EnumBackingType, IncludeKind, Modifier, NameQualification, Node, NodeKind, UseKind,
    VariableName,
};

// Re-exported so token-level callers share one set of span/token types.
pub use php_position_tracking::{SourceLocation, SourcePosition};
pub use php_token::{Quote, Token, TokenKind};
