//! Semantic analysis for Go package files
//!
//! This module provides:
//! - Object and scope model for packages, imports and locals
//! - Type representation with identity and assignability rules
//! - A type checker producing definition/use/type tables
//! - Importers over bundled package stubs and prior REPL blocks

mod checker;
mod importer;
mod scope;
pub mod stdlib;
mod types;
mod universe;

pub use checker::{CheckOptions, Info, check_file};
pub use importer::{ImportError, Importer, ImporterWithOlds, StdImporter};
pub use scope::{Builtin, Object, ObjectKind, ObjectRef, Package, Scope, is_exported};
pub use types::{
    BasicKind, InterfaceType, NamedType, Signature, StructType, Type, assignable, identical, implements,
    lookup_field_or_method, write_type,
};
pub use universe::{error_type, universe};
