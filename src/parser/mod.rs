//! Parser module
//!
//! Hand-written recursive descent parser for blocks and package files,
//! plus a mutable visitor over the resulting AST.

mod ast;
mod parser;
pub mod visit;

pub use ast::*;
pub use parser::Parser;
