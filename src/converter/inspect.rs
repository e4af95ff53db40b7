//! Documentation lookup for the identifier under the cursor
//!
//! Symbols owned by a session package are documented inline from their
//! declaration. Everything else yields a query (`path.Name` or
//! `path.Recv.Method`) for an external documentation source.

use std::rc::Rc;

use tracing::{debug, warn};

use super::{Config, Converter, PACKAGE_NAME, hoist, pass_a_options, restructure};
use crate::analysis::{CheckOptions, ImporterWithOlds, ObjectKind, ObjectRef, Package, Type, check_file};
use crate::parser::visit::VisitMut;
use crate::parser::{Ident, NodeId, Parser};

/// What to show for an identifier; both fields empty when nothing applies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentDoc {
    /// Inline documentation for session symbols
    pub doc: String,
    /// Lookup key for symbols of other packages
    pub query: String,
}

impl IdentDoc {
    fn doc(doc: impl Into<String>) -> Self {
        Self {
            doc: doc.into(),
            query: String::new(),
        }
    }

    fn query(query: impl Into<String>) -> Self {
        Self {
            doc: String::new(),
            query: query.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.doc.is_empty() && self.query.is_empty()
    }
}

/// Finds the first identifier whose span contains an offset
struct IdentAt {
    offset: usize,
    found: Option<NodeId>,
}

impl VisitMut for IdentAt {
    fn visit_ident(&mut self, ident: &mut Ident) {
        if self.found.is_none() && ident.span.start < ident.span.end && ident.span.contains(self.offset) {
            self.found = Some(ident.id);
        }
    }
}

pub(crate) fn inspect(conv: &Converter<'_>, src: &str, offset: usize, config: &Config) -> IdentDoc {
    let mut block = match Parser::new(src).parse_block() {
        Ok(block) => block,
        Err(err) => {
            warn!(%err, "cannot inspect unparsable block");
            return IdentDoc::default();
        }
    };
    let mut finder = IdentAt { offset, found: None };
    finder.visit_stmts(&mut block.stmts);
    let Some(target) = finder.found else {
        debug!(offset, "no identifier at cursor");
        return IdentDoc::default();
    };

    let mut unit = restructure::restructure(block);
    let pkg = Package::new(&config.lgo_pkg_path, PACKAGE_NAME, true);
    let Ok((outer, runctx)) = conv.session_scope(&pkg, config) else {
        return IdentDoc::default();
    };
    let (info, errors) = check_file(&pkg, &outer, &unit.file, conv.importer, &pass_a_options());
    if !errors.is_empty() {
        debug!(errors = errors.len(), "ignoring pass A errors");
    }
    let core = match conv.importer.import(crate::analysis::stdlib::CORE_PKG_PATH) {
        Ok(core) => core,
        Err(err) => {
            warn!(%err, "cannot load the runtime package");
            return IdentDoc::default();
        }
    };
    hoist::hoist(&mut unit, &pkg, &outer, &info, config, runctx.as_ref(), &core);

    let pkg = Package::new(&config.lgo_pkg_path, PACKAGE_NAME, true);
    let Ok((outer, _)) = conv.session_scope(&pkg, config) else {
        return IdentDoc::default();
    };
    let olds = ImporterWithOlds::new(&config.olds, conv.importer);
    let (info, errors) = check_file(&pkg, &outer, &unit.file, &olds, &CheckOptions::default());
    if !errors.is_empty() {
        debug!(errors = errors.len(), "ignoring pass B errors");
    }

    let Some(obj) = info.uses.get(&target).or_else(|| info.defs.get(&target)) else {
        debug!("identifier at cursor does not resolve");
        return IdentDoc::default();
    };
    describe(obj)
}

/// The documentation or query for a resolved object
pub(crate) fn describe(obj: &ObjectRef) -> IdentDoc {
    if let ObjectKind::PkgName(imported) = &obj.kind {
        return IdentDoc::query(&imported.path);
    }
    let Some(pkg) = obj.pkg() else {
        return IdentDoc::default();
    };
    let local = obj.in_session();

    match &obj.kind {
        ObjectKind::Func => {
            if local {
                return IdentDoc::doc(obj.to_string());
            }
            let recv = obj.ty().as_signature().and_then(|sig| sig.recv.clone());
            match recv {
                None => IdentDoc::query(format!("{}.{}", pkg.path, obj.name)),
                Some(recv) => {
                    let recv_name = receiver_name(&recv, pkg);
                    if recv_name.is_empty() {
                        return IdentDoc::default();
                    }
                    IdentDoc::query(format!("{}.{}.{}", pkg.path, recv_name, obj.name))
                }
            }
        }
        ObjectKind::Field => IdentDoc::default(),
        ObjectKind::Var | ObjectKind::Const | ObjectKind::TypeName => {
            if local {
                IdentDoc::doc(obj.to_string())
            } else {
                IdentDoc::query(format!("{}.{}", pkg.path, obj.name))
            }
        }
        ObjectKind::PkgName(_) | ObjectKind::Builtin(_) | ObjectKind::Nil => IdentDoc::default(),
    }
}

/// Name of the type a method belongs to; interfaces are found through
/// the named type of `pkg` that declares them
fn receiver_name(recv: &Type, pkg: &Rc<Package>) -> String {
    match recv {
        Type::Named(named) => named.name.clone(),
        Type::Pointer(elem) => match elem.as_ref() {
            Type::Named(named) => named.name.clone(),
            other => panic!("unsupported receiver type *{}", other),
        },
        Type::Interface(iface) => pkg
            .objects()
            .into_iter()
            .filter(|obj| matches!(obj.kind, ObjectKind::TypeName))
            .find_map(|obj| match obj.ty() {
                Type::Named(named) => match named.declared() {
                    Type::Interface(declared) if Rc::ptr_eq(&declared, iface) => Some(named.name.clone()),
                    _ => None,
                },
                _ => None,
            })
            .unwrap_or_default(),
        other => panic!("unsupported receiver type {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{BasicKind, InterfaceType, NamedType, Object, Signature};
    use pretty_assertions::assert_eq;

    fn method(name: &str, recv: Type, pkg: &Rc<Package>) -> ObjectRef {
        let sig = Signature {
            recv: Some(recv),
            params: Vec::new(),
            results: Vec::new(),
            variadic: false,
        };
        Object::new(name, ObjectKind::Func, Type::signature(sig), Some(pkg.clone()))
    }

    #[test]
    fn test_foreign_symbols_yield_queries() {
        let strings = Package::new("strings", "strings", false);
        let builder = NamedType::new("Builder", Some(strings.clone()));
        let write = method("WriteString", Type::pointer(Type::Named(builder.clone())), &strings);
        assert_eq!(describe(&write), IdentDoc::query("strings.Builder.WriteString"));

        let upper = Object::new("ToUpper", ObjectKind::Func, Type::Invalid, Some(strings.clone()));
        assert_eq!(describe(&upper), IdentDoc::query("strings.ToUpper"));

        let ty = Object::new("Builder", ObjectKind::TypeName, Type::Named(builder), Some(strings.clone()));
        assert_eq!(describe(&ty), IdentDoc::query("strings.Builder"));

        let current = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let pname = Object::pkg_name("s", strings, &current);
        assert_eq!(describe(&pname), IdentDoc::query("strings"));
    }

    #[test]
    fn test_interface_methods_resolve_to_declaring_type() {
        let context = Package::new("context", "context", false);
        let iface = InterfaceType::new();
        let named = NamedType::new("Context", Some(context.clone()));
        named.set_underlying(Type::Interface(iface.clone()));
        context.insert(Object::new("Context", ObjectKind::TypeName, Type::Named(named), Some(context.clone())));

        let done = method("Done", Type::Interface(iface), &context);
        assert_eq!(describe(&done), IdentDoc::query("context.Context.Done"));

        let anonymous = method("Close", Type::Interface(InterfaceType::new()), &context);
        assert!(describe(&anonymous).is_empty());
    }

    #[test]
    fn test_session_symbols_are_documented_inline() {
        let block = Package::new("lgo/exec/pkg1", "lgo_exec", true);
        let x = Object::new("x", ObjectKind::Var, Type::Basic(BasicKind::Int), Some(block.clone()));
        assert_eq!(describe(&x), IdentDoc::doc("var x int"));

        let field = Object::new("name", ObjectKind::Field, Type::Basic(BasicKind::String), Some(block));
        assert!(describe(&field).is_empty());

        let builtin = Object::new("nil", ObjectKind::Nil, Type::Invalid, None);
        assert!(describe(&builtin).is_empty());
    }
}
