//! Code generation for converted packages
//!
//! This module provides the printer that turns a rewritten package file
//! back into Go source.

mod golang;

pub use golang::GoGenerator;

use crate::parser::SourceFile;

/// Trait for code generators
pub trait CodeGenerator {
    /// Generate source text for a package file
    fn generate(&mut self, file: &SourceFile) -> String;

    /// Get the file extension for the target language
    fn file_extension(&self) -> &'static str;

    /// Get the name of the target language
    fn language_name(&self) -> &'static str;
}
