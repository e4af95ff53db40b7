//! Goroutine guard
//!
//! Rewrites
//!
//! ```go
//! go f(x, y)
//! ```
//!
//! into
//!
//! ```go
//! {
//!     ectx := core.InitGoroutine()
//!     go func() {
//!         defer core.FinalizeGoroutine(ectx)
//!         f(x, y)
//!     }()
//! }
//! ```
//!
//! `InitGoroutine` runs before the goroutine starts and
//! `FinalizeGoroutine` sees its end, panics included. The call's
//! arguments are evaluated inside the closure, after `InitGoroutine`
//! returns.

use std::collections::HashSet;
use std::rc::Rc;

use super::imports::ImportManager;
use crate::analysis::Package;
use crate::parser::visit::{VisitMut, walk_stmts};
use crate::parser::{AssignOp, BlockStmt, Expr, ExprKind, FuncType, Ident, Stmt, StmtKind};

/// Picks local names not used by any definition of the file
pub(crate) struct NamePicker {
    used: HashSet<String>,
}

impl NamePicker {
    pub fn new(used: impl IntoIterator<Item = String>) -> Self {
        Self {
            used: used.into_iter().collect(),
        }
    }

    /// `base`, or `base1`, `base2`, ... when taken
    pub fn pick(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut n = 0;
        while self.used.contains(&name) {
            n += 1;
            name = format!("{}{}", base, n);
        }
        self.used.insert(name.clone());
        name
    }
}

pub(crate) struct GoroutineGuard<'a> {
    core: &'a Rc<Package>,
    imports: &'a mut ImportManager,
    picker: NamePicker,
    pub wrapped: usize,
}

impl<'a> GoroutineGuard<'a> {
    pub fn new(core: &'a Rc<Package>, imports: &'a mut ImportManager, picker: NamePicker) -> Self {
        Self {
            core,
            imports,
            picker,
            wrapped: 0,
        }
    }

    fn guard(&mut self, call: Expr) -> StmtKind {
        let core = self.imports.short_name(self.core);
        let ectx = self.picker.pick("ectx");

        let finalize = Expr::call(Expr::qualified(&core, "FinalizeGoroutine"), vec![Expr::ident(&ectx)]);
        let closure = Expr::synthetic(ExprKind::FuncLit {
            ty: FuncType::default(),
            body: BlockStmt::new(vec![
                Stmt::synthetic(StmtKind::Defer(finalize)),
                Stmt::synthetic(StmtKind::Expr(call)),
            ]),
        });
        let init = Stmt::synthetic(StmtKind::Assign {
            lhs: vec![Expr::synthetic(ExprKind::Ident(Ident::synthetic(&ectx)))],
            op: AssignOp::Define,
            rhs: vec![Expr::call(Expr::qualified(&core, "InitGoroutine"), Vec::new())],
        });
        let launch = Stmt::synthetic(StmtKind::Go(Expr::call(closure, Vec::new())));

        self.wrapped += 1;
        StmtKind::Block(BlockStmt::new(vec![init, launch]))
    }
}

impl VisitMut for GoroutineGuard<'_> {
    fn visit_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        walk_stmts(self, stmts);
        for stmt in stmts.iter_mut() {
            if !matches!(stmt.kind, StmtKind::Go(_)) {
                continue;
            }
            let StmtKind::Go(call) = std::mem::replace(&mut stmt.kind, StmtKind::Empty) else {
                continue;
            };
            stmt.kind = self.guard(call);
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

    #[test]
    fn test_name_picker() {
        let mut picker = NamePicker::new(["ectx".to_string(), "ectx1".to_string()]);
        assert_eq!(picker.pick("ectx"), "ectx2");
        assert_eq!(picker.pick("ectx"), "ectx3");
        assert_eq!(picker.pick("x"), "x");
    }

    #[test]
    fn test_wraps_go_statements() {
        let src = "package p\n\nfunc f(n int) {\n\tgo g(n)\n\tswitch {\n\tdefault:\n\t\tgo func() {\n\t\t\tgo g(1)\n\t\t}()\n\t}\n}\n";
        let mut file = Parser::new(src).parse_file().unwrap();
        let current = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let core = Package::new("lgo/core", "core", false);
        let mut imports = ImportManager::new(&current, &Scope::new(), &Scope::new(), []);
        let mut guard = GoroutineGuard::new(&core, &mut imports, NamePicker::new(["ectx".to_string()]));
        walk_file(&mut guard, &mut file);
        assert_eq!(guard.wrapped, 3);

        let expected = r#"package p

func f(n int) {
	{
		ectx3 := pkg0.InitGoroutine()
		go func() {
			defer pkg0.FinalizeGoroutine(ectx3)
			g(n)
		}()
	}
	switch {
	default:
		{
			ectx2 := pkg0.InitGoroutine()
			go func() {
				defer pkg0.FinalizeGoroutine(ectx2)
				func() {
					{
						ectx1 := pkg0.InitGoroutine()
						go func() {
							defer pkg0.FinalizeGoroutine(ectx1)
							g(1)
						}()
					}
				}()
			}()
		}
	}
}
"#;
        assert_eq!(GoGenerator::new().generate(&file), expected);
    }
}
