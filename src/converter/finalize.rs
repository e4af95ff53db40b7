//! Final check, renaming and import pruning
//!
//! The finished file is checked against the session's imports. Then every
//! unexported package-level symbol, function, method and field the block
//! defines gets the definition prefix, references to those of prior
//! blocks get the reference prefix, goroutines are guarded and unused
//! imports are dropped.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use super::autoexit::AutoExit;
use super::guard::{GoroutineGuard, NamePicker};
use super::imports::ImportManager;
use super::rewrite::{Rename, SessionRefs};
use super::{Config, INIT_FUNC_NAME, PACKAGE_NAME};
use crate::analysis::{
    CheckOptions, Importer, ImporterWithOlds, Info, Object, ObjectKind, ObjectRef, Package, Scope, check_file,
};
use crate::codegen::{CodeGenerator, GoGenerator};
use crate::errors::LgoResult;
use crate::parser::visit::walk_file;
use crate::parser::{Decl, GenDecl, GenKind, Ident, ImportSpec, NodeId, SourceFile, Spec};

pub(crate) fn finalize(
    mut file: SourceFile,
    config: &Config,
    importer: &dyn Importer,
    core: &Rc<Package>,
) -> LgoResult<(String, Rc<Package>, Info)> {
    let pkg = Package::new(&config.lgo_pkg_path, PACKAGE_NAME, true);
    let mut outer = Scope::new();
    for old in &config.olds {
        outer.insert(old.clone());
    }
    let mut old_imports = Vec::new();
    for im in &config.old_imports {
        if let Some(imported) = im.imported() {
            let pname = Object::pkg_name(&im.name, imported.clone(), &pkg);
            outer.insert(pname.clone());
            old_imports.push(pname);
        }
    }

    let importer = ImporterWithOlds::new(&config.olds, importer);
    let (info, mut errors) = check_file(&pkg, &outer, &file, &importer, &CheckOptions::default());
    debug!(errors = errors.len(), "final check");
    if !errors.is_empty() {
        return Err(errors.swap_remove(0));
    }

    let renames = renames(&info, &pkg, config);
    debug!(renamed = renames.len(), "renaming");

    let mut used_names: Vec<String> = info.defs.values().map(|obj| obj.name.clone()).collect();
    used_names.extend(renames.values().cloned());

    let mut imports = ImportManager::new(&pkg, &info.file_scope, &outer, used_names.iter().map(String::as_str));
    walk_file(&mut SessionRefs::new(&info, &config.olds, None, core, &mut imports), &mut file);
    if config.auto_exit_code {
        let mut auto_exit = AutoExit::new(core, &mut imports);
        walk_file(&mut auto_exit, &mut file);
        debug!(inserted = auto_exit.inserted, "auto-exit checks");
    }
    let mut guard = GoroutineGuard::new(core, &mut imports, NamePicker::new(used_names));
    walk_file(&mut guard, &mut file);
    debug!(wrapped = guard.wrapped, "guarded goroutines");

    walk_file(&mut Rename(renames), &mut file);
    prune_imports(&mut file, &info, &old_imports, &mut imports);

    if file.decls.is_empty() {
        return Ok((String::new(), pkg, info));
    }
    let src = GoGenerator::new().generate(&file);
    Ok((src, pkg, info))
}

/// New names for unexported session symbols, by identifier
fn renames(info: &Info, pkg: &Rc<Package>, config: &Config) -> HashMap<NodeId, String> {
    let mut renames = HashMap::new();
    for (id, obj) in &info.defs {
        if obj.is_exported() || obj.name == INIT_FUNC_NAME || obj.name == "_" {
            continue;
        }
        if is_renamed(obj) {
            renames.insert(*id, format!("{}{}", config.def_prefix, obj.name));
        }
    }
    for (id, obj) in &info.uses {
        if obj.is_exported() || !obj.in_session() || !is_renamed(obj) {
            continue;
        }
        let current = obj.pkg().is_some_and(|p| p.path == pkg.path);
        let prefix = if current { &config.def_prefix } else { &config.ref_prefix };
        renames.insert(*id, format!("{}{}", prefix, obj.name));
    }
    renames
}

fn is_renamed(obj: &ObjectRef) -> bool {
    matches!(obj.kind, ObjectKind::Func | ObjectKind::Field) || obj.is_package_level()
}

/// Injected imports first, then the session imports the file uses, then
/// the file's own imports that are still referenced
fn prune_imports(file: &mut SourceFile, info: &Info, old_imports: &[ObjectRef], imports: &mut ImportManager) {
    let mut decls = imports.take_injected();
    for pname in old_imports.iter().filter(|p| p.used()) {
        if let Some(imported) = pname.imported() {
            let spec = ImportSpec::new(Some(Ident::synthetic(&pname.name)), &imported.path);
            decls.push(Decl::Gen(GenDecl::new(GenKind::Import, vec![Spec::Import(spec)], false)));
        }
    }

    let mut dropped = 0;
    let mut rest = Vec::new();
    for decl in std::mem::take(&mut file.decls) {
        let mut gen_decl = match decl {
            Decl::Gen(gen_decl) if gen_decl.kind == GenKind::Import => gen_decl,
            other => {
                rest.push(other);
                continue;
            }
        };
        let before = gen_decl.specs.len();
        gen_decl.specs.retain(|spec| match spec {
            Spec::Import(import) => {
                let pname = match &import.name {
                    Some(name) => info.defs.get(&name.id),
                    None => info.implicits.get(&import.id),
                };
                pname.is_some_and(|p| p.used() || imports.handed_out(&p.name))
            }
            _ => true,
        });
        dropped += before - gen_decl.specs.len();
        if !gen_decl.specs.is_empty() {
            decls.push(Decl::Gen(gen_decl));
        }
    }
    debug!(dropped, "pruned imports");

    decls.extend(rest);
    file.decls = decls;
}
