//! Rewrites shared by the conversion stages

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::trace;

use super::imports::ImportManager;
use crate::analysis::{Info, Object, ObjectRef, Package};
use crate::parser::visit::{VisitMut, walk_expr};
use crate::parser::{Expr, ExprKind, Ident, NodeId};

/// Qualifies references to prior blocks' symbols and replaces uses of
/// the execution context with the runtime accessor
pub(crate) struct SessionRefs<'a> {
    info: &'a Info,
    olds: HashSet<*const Object>,
    runctx: Option<&'a ObjectRef>,
    core: &'a Rc<Package>,
    imports: &'a mut ImportManager,
}

impl<'a> SessionRefs<'a> {
    pub fn new(
        info: &'a Info,
        olds: &[ObjectRef],
        runctx: Option<&'a ObjectRef>,
        core: &'a Rc<Package>,
        imports: &'a mut ImportManager,
    ) -> Self {
        Self {
            info,
            olds: olds.iter().map(Rc::as_ptr).collect(),
            runctx,
            core,
            imports,
        }
    }
}

impl VisitMut for SessionRefs<'_> {
    fn visit_expr(&mut self, expr: &mut Expr) {
        let ExprKind::Ident(ident) = &expr.kind else {
            walk_expr(self, expr);
            return;
        };
        // `pkg.sel` never reaches here with `sel`, so qualified names stay as they are
        let Some(obj) = self.info.uses.get(&ident.id) else { return };

        if self.runctx.is_some_and(|runctx| Rc::ptr_eq(runctx, obj)) {
            let core = self.imports.short_name(self.core);
            *expr = Expr::call(Expr::qualified(&core, "GetExecContext"), Vec::new());
            return;
        }
        if !self.olds.contains(&Rc::as_ptr(obj)) {
            return;
        }
        let Some(pkg) = obj.pkg() else { return };
        let alias = self.imports.short_name(pkg);
        if alias.is_empty() {
            return;
        }
        trace!(name = %ident.name, %alias, "qualified old symbol");
        let sel = ident.clone();
        expr.kind = ExprKind::Selector {
            expr: Box::new(Expr::ident(alias)),
            sel,
        };
    }
}

/// Renames identifiers by node id
pub(crate) struct Rename(pub HashMap<NodeId, String>);

impl VisitMut for Rename {
    fn visit_ident(&mut self, ident: &mut Ident) {
        if let Some(name) = self.0.get(&ident.id) {
            trace!(from = %ident.name, to = %name, "renamed");
            ident.name = name.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ObjectKind, Scope, Type};
    use crate::parser::Parser;

    #[test]
    fn test_rename_by_id() {
        let mut block = Parser::new("x := y + x").parse_block().unwrap();
        let mut ids = Vec::new();
        struct Collect<'a>(&'a mut Vec<(NodeId, String)>);
        impl VisitMut for Collect<'_> {
            fn visit_ident(&mut self, ident: &mut Ident) {
                self.0.push((ident.id, ident.name.clone()));
            }
        }
        Collect(&mut ids).visit_stmts(&mut block.stmts);

        // only the first `x` is renamed
        let mut rename = Rename(HashMap::from([(ids[0].0, "Def_x".to_string())]));
        rename.visit_stmts(&mut block.stmts);
        let crate::parser::StmtKind::Assign { lhs, rhs, .. } = &block.stmts[0].kind else {
            panic!("expected assignment")
        };
        assert_eq!(lhs[0].to_string(), "Def_x");
        assert_eq!(rhs[0].to_string(), "y + x");
    }

    #[test]
    fn test_qualifies_olds_and_runctx() {
        let old_pkg = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let old = Object::new("x", ObjectKind::Var, Type::Invalid, Some(old_pkg.clone()));
        let runctx = Object::new("runctx", ObjectKind::Var, Type::Invalid, None);
        let core = Package::new("lgo/core", "core", false);

        let mut block = Parser::new("f(x, runctx, y.x)").parse_block().unwrap();
        let crate::parser::StmtKind::Expr(call) = &block.stmts[0].kind else { panic!("expected call") };
        let ExprKind::Call { args, .. } = &call.kind else { panic!("expected call") };
        let ExprKind::Ident(x) = &args[0].kind else { panic!("expected ident") };
        let ExprKind::Ident(ctx) = &args[1].kind else { panic!("expected ident") };

        let mut info = Info::default();
        info.uses.insert(x.id, old.clone());
        info.uses.insert(ctx.id, runctx.clone());

        let current = Package::new("lgo/exec/pkg1", "lgo_exec", true);
        let mut imports = ImportManager::new(&current, &Scope::new(), &Scope::new(), []);
        let olds = [old];
        SessionRefs::new(&info, &olds, Some(&runctx), &core, &mut imports).visit_stmts(&mut block.stmts);

        let crate::parser::StmtKind::Expr(call) = &block.stmts[0].kind else { panic!("expected call") };
        assert_eq!(call.to_string(), "f(pkg0.x, pkg1.GetExecContext(), y.x)");
        assert_eq!(imports.take_injected().len(), 2);
    }
}
