//! lgo-convert - REPL block to Go package converter
//!
//! This crate turns one block of an interactive Go session (top-level
//! statements mixed with declarations) into a compilable package file
//! whose symbols later blocks can reference.

pub mod errors;
pub mod lexer;
pub mod parser;
pub mod analysis;
pub mod codegen;
pub mod converter;

// Re-export commonly used types
pub use errors::{ErrorList, LgoError, LgoResult, SourceSpan};
pub use parser::Parser;
pub use analysis::{Importer, StdImporter};
pub use codegen::{CodeGenerator, GoGenerator};
pub use converter::{Config, Converted, Converter, IdentDoc, Session};
