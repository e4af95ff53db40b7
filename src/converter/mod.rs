//! Block to package conversion
//!
//! A REPL block is turned into a package file in stages:
//!
//! 1. [`restructure`] hoists declarations and wraps the remaining
//!    statements into `lgo_init`.
//! 2. Pass A checks the package with only `lgo_init`'s body.
//! 3. [`hoist`] promotes block locals to package variables, prints the
//!    trailing expression and qualifies symbols of prior blocks.
//! 4. Pass B checks every body and rewrites what Pass A could not see.
//! 5. [`finalize`] checks the finished file against the session imports,
//!    renames unexported symbols, guards goroutines and prunes imports.
//!
//! [`Session`] threads the results of one block into the next.

mod autoexit;
mod finalize;
mod guard;
mod hoist;
mod imports;
mod inspect;
mod restructure;
mod rewrite;
mod session;

use std::rc::Rc;

use tracing::debug;

use crate::analysis::{
    CheckOptions, ImportError, Importer, ImporterWithOlds, Info, Object, ObjectKind, ObjectRef, Package, Scope,
    check_file,
};
use crate::errors::{ErrorList, LgoResult};
use crate::parser::Parser;

pub use inspect::IdentDoc;
pub use session::{DEFAULT_PKG_PREFIX, Session};

/// Name of the function holding a block's statements
pub const INIT_FUNC_NAME: &str = "lgo_init";

/// Package clause of every converted unit
pub const PACKAGE_NAME: &str = "lgo_exec";

/// The execution context value visible to block code
pub const RUNCTX_NAME: &str = "runctx";

/// Options of one conversion
#[derive(Debug, Clone)]
pub struct Config {
    /// Top-level symbols of prior blocks
    pub olds: Vec<ObjectRef>,
    /// Package names imported by prior blocks
    pub old_imports: Vec<ObjectRef>,
    /// Prefix of unexported symbols defined by this block
    pub def_prefix: String,
    /// Prefix of unexported symbols of prior blocks
    pub ref_prefix: String,
    /// Import path of the produced package
    pub lgo_pkg_path: String,
    /// Check for a cancelled execution at every function entry and loop iteration
    pub auto_exit_code: bool,
    /// Register every hoisted variable with the runtime
    pub register_vars: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            olds: Vec::new(),
            old_imports: Vec::new(),
            def_prefix: "Def_".to_string(),
            ref_prefix: "Ref_".to_string(),
            lgo_pkg_path: "lgo/exec/pkg0".to_string(),
            auto_exit_code: false,
            register_vars: false,
        }
    }
}

/// A converted block
#[derive(Debug)]
pub struct Converted {
    /// Go source of the package; empty when nothing survives
    pub src: String,
    /// The package as seen by the final check, with unprefixed names
    pub pkg: Rc<Package>,
    /// Final check results
    pub info: Info,
    /// Package names imported by the block itself
    pub imports: Vec<ObjectRef>,
}

/// Converts blocks against an injected importer
pub struct Converter<'a> {
    importer: &'a dyn Importer,
}

impl<'a> Converter<'a> {
    pub fn new(importer: &'a dyn Importer) -> Self {
        Self { importer }
    }

    /// Convert one block into a package file
    pub fn convert(&self, src: &str, config: &Config) -> LgoResult<Converted> {
        let block = Parser::new(src).parse_block()?;
        debug!(stmts = block.stmts.len(), "parsed block");

        let mut unit = restructure::restructure(block);
        debug!(
            decls = unit.file.decls.len(),
            vars = unit.vars.len(),
            wrapped = unit.wrapped,
            "restructured block"
        );

        let pkg = Package::new(&config.lgo_pkg_path, PACKAGE_NAME, true);
        let (outer, runctx) = self.session_scope(&pkg, config)?;
        let (info, errors) = check_file(&pkg, &outer, &unit.file, self.importer, &pass_a_options());
        debug!(errors = errors.len(), "pass A");
        ErrorList::from(errors).into_result()?;

        let imports: Vec<ObjectRef> = info
            .file_scope
            .objects()
            .filter(|obj| matches!(obj.kind, ObjectKind::PkgName(_)))
            .cloned()
            .collect();

        let core = self.importer.import(crate::analysis::stdlib::CORE_PKG_PATH)?;
        hoist::hoist(&mut unit, &pkg, &outer, &info, config, runctx.as_ref(), &core);

        // Pass B sees every body; what Pass A skipped is rewritten now.
        let pkg = Package::new(&config.lgo_pkg_path, PACKAGE_NAME, true);
        let (outer, runctx) = self.session_scope(&pkg, config)?;
        let olds = ImporterWithOlds::new(&config.olds, self.importer);
        let (info, errors) = check_file(&pkg, &outer, &unit.file, &olds, &CheckOptions::default());
        debug!(errors = errors.len(), "pass B");
        ErrorList::from(errors).into_result()?;
        hoist::rewrite_bodies(&mut unit.file, &pkg, &outer, &info, config, runctx.as_ref(), &core);

        let (src, pkg, info) = finalize::finalize(unit.file, config, self.importer, &core)?;
        Ok(Converted {
            src,
            pkg,
            info,
            imports,
        })
    }

    /// Documentation or a lookup query for the identifier at `offset`
    pub fn inspect_ident(&self, src: &str, offset: usize, config: &Config) -> IdentDoc {
        inspect::inspect(self, src, offset, config)
    }

    /// The scope around a block: prior symbols, prior imports and, unless
    /// a prior block defined one, the execution context
    fn session_scope(&self, pkg: &Rc<Package>, config: &Config) -> Result<(Scope, Option<ObjectRef>), ImportError> {
        let mut outer = Scope::new();
        for old in &config.olds {
            outer.insert(old.clone());
        }
        for im in &config.old_imports {
            if let Some(imported) = im.imported() {
                outer.insert(Object::pkg_name(&im.name, imported.clone(), pkg));
            }
        }
        if outer.contains(RUNCTX_NAME) {
            return Ok((outer, None));
        }
        let context = self.importer.import("context")?;
        let ty = context.lookup("Context").map(|obj| obj.ty()).unwrap_or_default();
        let runctx = Object::new(RUNCTX_NAME, ObjectKind::Var, ty, Some(pkg.clone()));
        outer.insert(runctx.clone());
        Ok((outer, Some(runctx)))
    }
}

fn pass_a_options() -> CheckOptions {
    CheckOptions {
        ignore_func_bodies: true,
        keep_body: Some(INIT_FUNC_NAME.to_string()),
    }
}
