//! Package importers
//!
//! The importer is a capability handed to the checker rather than global
//! state, so tests and embedders can supply their own packages.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use super::checker::{CheckOptions, check_file};
use super::scope::{ObjectRef, Package, Scope};
use super::stdlib;
use crate::errors::{ErrorList, LgoError, SourceSpan};
use crate::parser::Parser;

/// Why an import could not be satisfied
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("could not import {0} (package not found)")]
    NotFound(String),

    #[error("could not import {path} ({source})")]
    Broken {
        path: String,
        #[source]
        source: Box<LgoError>,
    },
}

/// Resolves import paths to checked packages
pub trait Importer {
    fn import(&self, path: &str) -> Result<Rc<Package>, ImportError>;
}

/// Importer over the bundled stubs and any registered extra sources.
/// Each package is checked once and cached.
#[derive(Debug, Default)]
pub struct StdImporter {
    extra: HashMap<String, String>,
    cache: RefCell<HashMap<String, Rc<Package>>>,
    loading: RefCell<HashSet<String>>,
}

impl StdImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the stub source of another package
    pub fn with_package(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.extra.insert(path.into(), source.into());
        self
    }

    fn load(&self, path: &str, source: &str) -> Result<Rc<Package>, ImportError> {
        let broken = |error: LgoError| ImportError::Broken {
            path: path.to_string(),
            source: Box::new(error),
        };

        let file = Parser::new(source).parse_file().map_err(broken)?;
        let pkg = Package::new(path, file.package.name.clone(), false);
        let (_, errors) = check_file(&pkg, &Scope::new(), &file, self, &CheckOptions::default());
        ErrorList::from(errors).into_result().map_err(broken)?;

        debug!(path, objects = pkg.scope().len(), "loaded package stub");
        Ok(pkg)
    }
}

impl Importer for StdImporter {
    fn import(&self, path: &str) -> Result<Rc<Package>, ImportError> {
        if let Some(pkg) = self.cache.borrow().get(path) {
            return Ok(pkg.clone());
        }
        if self.loading.borrow().contains(path) {
            return Err(ImportError::Broken {
                path: path.to_string(),
                source: Box::new(LgoError::type_error("import cycle not allowed", SourceSpan::default())),
            });
        }

        let source = self
            .extra
            .get(path)
            .map(String::as_str)
            .or_else(|| stdlib::find(path))
            .ok_or_else(|| ImportError::NotFound(path.to_string()))?;

        self.loading.borrow_mut().insert(path.to_string());
        let result = self.load(path, source);
        self.loading.borrow_mut().remove(path);

        let pkg = result?;
        self.cache.borrow_mut().insert(path.to_string(), pkg.clone());
        Ok(pkg)
    }
}

/// Resolves the packages of prior blocks before deferring to another importer
pub struct ImporterWithOlds<'a> {
    olds: HashMap<String, Rc<Package>>,
    fallback: &'a dyn Importer,
}

impl<'a> ImporterWithOlds<'a> {
    pub fn new(olds: &[ObjectRef], fallback: &'a dyn Importer) -> Self {
        let olds = olds
            .iter()
            .filter_map(|obj| obj.pkg())
            .map(|pkg| (pkg.path.clone(), pkg.clone()))
            .collect();
        Self { olds, fallback }
    }
}

impl Importer for ImporterWithOlds<'_> {
    fn import(&self, path: &str) -> Result<Rc<Package>, ImportError> {
        match self.olds.get(path) {
            Some(pkg) => Ok(pkg.clone()),
            None => self.fallback.import(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::scope::{Object, ObjectKind};
    use crate::analysis::types::{BasicKind, Type};

    #[test]
    fn test_bundled_stubs_check() {
        let importer = StdImporter::new();
        for file in stdlib::stdlib_files() {
            let pkg = importer.import(file.path).unwrap();
            assert_eq!(pkg.path, file.path);
        }
        let core = importer.import(stdlib::CORE_PKG_PATH).unwrap();
        assert_eq!(core.name, "core");
        assert!(core.lookup("LgoPrintln").is_some());
    }

    #[test]
    fn test_cache_returns_same_package() {
        let importer = StdImporter::new();
        let a = importer.import("fmt").unwrap();
        let b = importer.import("fmt").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_missing_and_broken() {
        let importer = StdImporter::new().with_package("bad", "package bad\n\nvar x int = \"s\"\n");
        assert!(matches!(importer.import("os"), Err(ImportError::NotFound(_))));
        assert!(matches!(importer.import("bad"), Err(ImportError::Broken { .. })));
    }

    #[test]
    fn test_extra_package() {
        let importer = StdImporter::new().with_package("demo/geo", "package geo\n\nfunc Area(w, h float64) float64\n");
        let geo = importer.import("demo/geo").unwrap();
        assert_eq!(geo.name, "geo");
        assert!(geo.lookup("Area").is_some());
    }

    #[test]
    fn test_importer_with_olds() {
        let std = StdImporter::new();
        let old_pkg = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let x = Object::new("x", ObjectKind::Var, Type::Basic(BasicKind::Int), Some(old_pkg.clone()));
        let importer = ImporterWithOlds::new(&[x], &std);
        assert!(Rc::ptr_eq(&importer.import("lgo/exec/pkg0").unwrap(), &old_pkg));
        assert_eq!(importer.import("fmt").unwrap().path, "fmt");
    }
}
