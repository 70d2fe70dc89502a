//! Syntax tree for the Java subset the checker understands.
//!
//! Nodes are plain sum types. Each analysis pass matches over them
//! exhaustively instead of going through a visitor.

mod nodes;

pub use nodes::*;

pub use crate::parser::span::{HasSpan, Location, Span};
