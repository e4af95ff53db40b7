//! Package aliases for generated references

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::trace;

use crate::analysis::{Package, Scope, universe};
use crate::parser::visit::{VisitMut, walk_file};
use crate::parser::{Decl, GenDecl, GenKind, Ident, ImportSpec, SourceFile, Spec};

/// Hands out the name under which a package is referenced in the file
/// being built, injecting an import when the package has none yet
pub(crate) struct ImportManager {
    current: String,
    /// Import path to alias
    names: HashMap<String, String>,
    /// Every name already visible from the file
    visible: HashSet<String>,
    counter: usize,
    injected: Vec<Decl>,
    /// Aliases returned by `short_name`
    handed_out: HashSet<String>,
}

impl ImportManager {
    /// Seed with the file's imports; names in `file_scope`, the package,
    /// `outer`, the universe and `reserved` are never minted.
    pub fn new<'r>(
        current: &Rc<Package>,
        file_scope: &Scope,
        outer: &Scope,
        reserved: impl IntoIterator<Item = &'r str>,
    ) -> Self {
        let mut names = HashMap::new();
        for obj in file_scope.objects() {
            if let Some(imported) = obj.imported() {
                names.entry(imported.path.clone()).or_insert_with(|| obj.name.clone());
            }
        }

        let mut visible: HashSet<String> = file_scope.names().map(str::to_string).collect();
        visible.extend(current.scope().names().map(str::to_string));
        visible.extend(outer.names().map(str::to_string));
        visible.extend(universe().names().map(str::to_string));
        visible.extend(reserved.into_iter().map(str::to_string));

        Self {
            current: current.path.clone(),
            names,
            visible,
            counter: 0,
            injected: Vec::new(),
            handed_out: HashSet::new(),
        }
    }

    /// The qualifier for members of `pkg`; empty for the package itself
    pub fn short_name(&mut self, pkg: &Package) -> String {
        if pkg.path == self.current {
            return String::new();
        }
        if let Some(name) = self.names.get(&pkg.path) {
            self.handed_out.insert(name.clone());
            return name.clone();
        }

        let name = loop {
            let candidate = format!("pkg{}", self.counter);
            self.counter += 1;
            if !self.visible.contains(&candidate) {
                break candidate;
            }
        };
        trace!(path = %pkg.path, alias = %name, "minted import alias");

        self.names.insert(pkg.path.clone(), name.clone());
        self.visible.insert(name.clone());
        self.handed_out.insert(name.clone());
        let spec = ImportSpec::new(Some(Ident::synthetic(&name)), &pkg.path);
        self.injected
            .push(Decl::Gen(GenDecl::new(GenKind::Import, vec![Spec::Import(spec)], false)));
        name
    }

    /// Whether `alias` was returned for some package
    pub fn handed_out(&self, alias: &str) -> bool {
        self.handed_out.contains(alias)
    }

    /// Imports added by [`ImportManager::short_name`], in minting order
    pub fn take_injected(&mut self) -> Vec<Decl> {
        std::mem::take(&mut self.injected)
    }
}

/// Every identifier spelled in `file`, including scopes the checker
/// skipped; a minted alias must avoid all of them
pub(crate) fn spelled_names(file: &mut SourceFile) -> HashSet<String> {
    struct Spelled(HashSet<String>);

    impl VisitMut for Spelled {
        fn visit_ident(&mut self, ident: &mut Ident) {
            self.0.insert(ident.name.clone());
        }
    }

    let mut spelled = Spelled(HashSet::new());
    walk_file(&mut spelled, file);
    spelled.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Object, ObjectKind, Type};

    fn pkg(path: &str, name: &str) -> Rc<Package> {
        Package::new(path, name, false)
    }

    #[test]
    fn test_current_package_is_unqualified() {
        let current = Package::new("lgo/exec/pkg3", "lgo_exec", true);
        let mut m = ImportManager::new(&current, &Scope::new(), &Scope::new(), []);
        assert_eq!(m.short_name(&current), "");
        assert!(m.take_injected().is_empty());
    }

    #[test]
    fn test_existing_alias_is_reused() {
        let current = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let strings = pkg("strings", "strings");
        let mut file_scope = Scope::new();
        file_scope.insert(Object::pkg_name("s", strings.clone(), &current));

        let mut m = ImportManager::new(&current, &file_scope, &Scope::new(), []);
        assert!(!m.handed_out("s"));
        assert_eq!(m.short_name(&strings), "s");
        assert!(m.handed_out("s"));
        assert!(m.take_injected().is_empty());
    }

    #[test]
    fn test_minted_aliases_skip_visible_names() {
        let current = Package::new("lgo/exec/pkg2", "lgo_exec", true);
        current.insert(Object::new("pkg0", ObjectKind::Var, Type::Invalid, Some(current.clone())));
        let mut outer = Scope::new();
        outer.insert(Object::new("pkg1", ObjectKind::Var, Type::Invalid, None));

        let mut m = ImportManager::new(&current, &Scope::new(), &outer, ["pkg2"]);
        let core = pkg("lgo/core", "core");
        let fmt = pkg("fmt", "fmt");
        assert_eq!(m.short_name(&core), "pkg3");
        assert_eq!(m.short_name(&fmt), "pkg4");
        assert_eq!(m.short_name(&core), "pkg3");
        assert!(m.handed_out("pkg4"));

        let injected = m.take_injected();
        assert_eq!(injected.len(), 2);
        let Decl::Gen(gen_decl) = &injected[0] else { panic!("expected import") };
        let Spec::Import(spec) = &gen_decl.specs[0] else { panic!("expected import spec") };
        assert_eq!(spec.path, "lgo/core");
        assert_eq!(spec.name.as_ref().map(|n| n.name.as_str()), Some("pkg3"));
    }

    #[test]
    fn test_spelled_names_cover_nested_scopes() {
        let mut file = crate::parser::Parser::new(
            "package p\n\nfunc f() {\n\tif true {\n\t\tpkg0 := 1\n\t\t_ = func(pkg1 int) {}\n\t}\n}\n",
        )
        .parse_file()
        .unwrap();
        let names = spelled_names(&mut file);
        assert!(names.contains("pkg0"));
        assert!(names.contains("pkg1"));
        assert!(names.contains("f"));

        let current = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let mut m = ImportManager::new(&current, &Scope::new(), &Scope::new(), names.iter().map(String::as_str));
        assert_eq!(m.short_name(&pkg("lgo/core", "core")), "pkg2");
    }
}
