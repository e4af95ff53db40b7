//! Cancellation checkpoints

use std::rc::Rc;

use super::imports::ImportManager;
use crate::analysis::Package;
use crate::parser::visit::{BlockOwner, VisitMut, walk_block};
use crate::parser::{BlockStmt, Expr, Stmt, StmtKind};

/// Puts `core.ExitIfCtxDone()` first in every function body and loop body
pub(crate) struct AutoExit<'a> {
    core: &'a Rc<Package>,
    imports: &'a mut ImportManager,
    /// Alias of the core package, once needed
    alias: Option<String>,
    pub inserted: usize,
}

impl<'a> AutoExit<'a> {
    pub fn new(core: &'a Rc<Package>, imports: &'a mut ImportManager) -> Self {
        Self {
            core,
            imports,
            alias: None,
            inserted: 0,
        }
    }

    fn exit_check(&mut self) -> Stmt {
        let alias = match &self.alias {
            Some(alias) => alias.clone(),
            None => {
                let alias = self.imports.short_name(self.core);
                self.alias = Some(alias.clone());
                alias
            }
        };
        Stmt::synthetic(StmtKind::Expr(Expr::call(Expr::qualified(&alias, "ExitIfCtxDone"), Vec::new())))
    }
}

impl VisitMut for AutoExit<'_> {
    fn visit_block(&mut self, block: &mut BlockStmt, owner: BlockOwner) {
        walk_block(self, block);
        if matches!(owner, BlockOwner::Func | BlockOwner::Loop) {
            let check = self.exit_check();
            block.stmts.insert(0, check);
            self.inserted += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Scope;
    use crate::codegen::{CodeGenerator, GoGenerator};
    use crate::parser::Parser;
    use crate::parser::visit::walk_file;
    use pretty_assertions::assert_eq;

    fn run(src: &str) -> (String, usize) {
        let mut file = Parser::new(src).parse_file().unwrap();
        let current = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let core = Package::new("lgo/core", "core", false);
        let mut imports = ImportManager::new(&current, &Scope::new(), &Scope::new(), []);
        let mut v = AutoExit::new(&core, &mut imports);
        walk_file(&mut v, &mut file);
        let inserted = v.inserted;
        (GoGenerator::new().generate(&file), inserted)
    }

    #[test]
    fn test_functions_and_loops() {
        let src = "package p\n\nfunc f(n int) {\n\tfor i := 0; i < n; i++ {\n\t\tif i > 1 {\n\t\t\tbreak\n\t\t}\n\t}\n\tg := func() {}\n\tg()\n}\n";
        let expected = "package p\n\nfunc f(n int) {\n\tpkg0.ExitIfCtxDone()\n\tfor i := 0; i < n; i++ {\n\t\tpkg0.ExitIfCtxDone()\n\t\tif i > 1 {\n\t\t\tbreak\n\t\t}\n\t}\n\tg := func() {\n\t\tpkg0.ExitIfCtxDone()\n\t}\n\tg()\n}\n";
        let (out, inserted) = run(src);
        assert_eq!(out, expected);
        assert_eq!(inserted, 3);
    }

    #[test]
    fn test_no_bodies_no_alias() {
        let (out, inserted) = run("package p\n\ntype t int\n");
        assert_eq!(out, "package p\n\ntype t int\n");
        assert_eq!(inserted, 0);
    }
}
