//! Position and location types shared by the PHP front-end.
//!
//! Tokens and AST nodes both carry a [`SourceLocation`]; the tokenizer is
//! responsible for keeping line/column information accurate as it advances.

mod location;
mod position;

pub use location::SourceLocation;
pub use position::SourcePosition;
