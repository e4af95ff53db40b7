//! First rewrite: from a block to a package file
//!
//! Imports, functions and types become top-level declarations. Everything
//! else, `var` and `const` declarations included, forms the body of
//! `lgo_init`, so the checker sees block locals as locals.

use std::collections::BTreeSet;

use super::{INIT_FUNC_NAME, PACKAGE_NAME};
use crate::parser::{
    AssignOp, BlockStmt, Decl, Expr, ExprKind, FuncDecl, FuncType, GenKind, Ident, LgoBlock, NodeId, SourceFile,
    Spec, Stmt, StmtKind,
};

/// A block after restructuring
#[derive(Debug)]
pub(crate) struct Restructured {
    pub file: SourceFile,
    /// Name of `lgo_init`
    pub init: NodeId,
    /// Identifiers the block defines with `var` or `:=`
    pub vars: Vec<Ident>,
    /// The trailing expression statement
    pub last_expr: Option<NodeId>,
    /// The trailing expression is not a call and was wrapped in `panic`
    pub wrapped: bool,
    /// `_, _ = a, b` keeping block locals used until they are hoisted
    pub consume_all: Option<NodeId>,
}

impl Restructured {
    #[cfg(test)]
    pub fn init_func(&self) -> &FuncDecl {
        self.file
            .decls
            .iter()
            .find_map(|decl| match decl {
                Decl::Func(func) if func.name.id == self.init => Some(func),
                _ => None,
            })
            .expect("lgo_init is declared by restructure")
    }

    pub fn init_func_mut(&mut self) -> &mut FuncDecl {
        let id = self.init;
        self.file
            .decls
            .iter_mut()
            .find_map(|decl| match decl {
                Decl::Func(func) if func.name.id == id => Some(func),
                _ => None,
            })
            .expect("lgo_init is declared by restructure")
    }
}

pub(crate) fn restructure(block: LgoBlock) -> Restructured {
    let mut decls = Vec::new();
    let mut body = Vec::new();
    let mut vars = Vec::new();

    for stmt in block.stmts {
        match stmt.kind {
            StmtKind::Decl(Decl::Gen(gen_decl)) if matches!(gen_decl.kind, GenKind::Var | GenKind::Const) => {
                if gen_decl.kind == GenKind::Var {
                    for spec in &gen_decl.specs {
                        if let Spec::Value(vs) = spec {
                            vars.extend(vs.names.iter().cloned());
                        }
                    }
                }
                body.push(Stmt {
                    kind: StmtKind::Decl(Decl::Gen(gen_decl)),
                    ..stmt
                });
            }
            StmtKind::Decl(decl) => decls.push(decl),
            kind => {
                if let StmtKind::Assign {
                    lhs,
                    op: AssignOp::Define,
                    ..
                } = &kind
                {
                    for l in lhs {
                        if let ExprKind::Ident(ident) = &l.kind {
                            vars.push(ident.clone());
                        }
                    }
                }
                body.push(Stmt { kind, ..stmt });
            }
        }
    }

    let mut last_expr = None;
    let mut wrapped = false;
    if let Some(last) = body.last_mut()
        && let StmtKind::Expr(e) = &mut last.kind
    {
        last_expr = Some(last.id);
        // `panic(f())` is invalid for a call without results, so calls stay as they are
        if !matches!(e.kind, ExprKind::Call { .. }) {
            let inner = std::mem::replace(e, Expr::ident("_"));
            *e = Expr::call(Expr::ident("panic"), vec![inner]);
            wrapped = true;
        }
    }

    let mut consume_all = None;
    let names = unique_sorted_names(&vars);
    if !names.is_empty() {
        let lhs = names.iter().map(|_| Expr::ident("_")).collect();
        let rhs = names.iter().map(|name| Expr::ident(*name)).collect();
        let stmt = Stmt::synthetic(StmtKind::Assign {
            lhs,
            op: AssignOp::Assign,
            rhs,
        });
        consume_all = Some(stmt.id);
        body.push(stmt);
    }

    let name = Ident::synthetic(INIT_FUNC_NAME);
    let init = name.id;
    decls.push(Decl::Func(FuncDecl {
        recv: None,
        name,
        ty: FuncType::default(),
        body: Some(BlockStmt::new(body)),
        span: Default::default(),
        doc: Vec::new(),
    }));

    Restructured {
        file: SourceFile {
            package: Ident::synthetic(PACKAGE_NAME),
            decls,
        },
        init,
        vars,
        last_expr,
        wrapped,
        consume_all,
    }
}

fn unique_sorted_names(idents: &[Ident]) -> Vec<&str> {
    idents
        .iter()
        .filter(|ident| !ident.is_blank())
        .map(|ident| ident.name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn run(src: &str) -> Restructured {
        restructure(Parser::new(src).parse_block().unwrap())
    }

    fn names(idents: &[Ident]) -> Vec<&str> {
        idents.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_hoists_imports_funcs_and_types() {
        let unit = run("import \"fmt\"\n\ntype T int\nx := 1\nfunc f() {}\nvar y = 2\nconst c = 3\nfmt.Println(x, y)");
        let kinds: Vec<&str> = unit
            .file
            .decls
            .iter()
            .map(|d| match d {
                Decl::Gen(g) if g.kind == GenKind::Import => "import",
                Decl::Gen(_) => "type",
                Decl::Func(f) => f.name.name.as_str(),
            })
            .collect();
        assert_eq!(kinds, vec!["import", "type", "f", "lgo_init"]);
        assert_eq!(unit.file.package.name, "lgo_exec");

        // x := 1, var y, const c, the call and consume-all
        assert_eq!(unit.init_func().body.as_ref().unwrap().stmts.len(), 5);
        assert_eq!(names(&unit.vars), vec!["x", "y"]);
        assert!(!unit.wrapped);
        assert!(unit.last_expr.is_some());
    }

    #[test]
    fn test_wraps_trailing_non_call() {
        let unit = run("x := 1\nx + 1");
        assert!(unit.wrapped);
        let body = &unit.init_func().body.as_ref().unwrap().stmts;
        let last = body.iter().find(|s| Some(s.id) == unit.last_expr).unwrap();
        assert_eq!(
            match &last.kind {
                StmtKind::Expr(e) => e.to_string(),
                _ => String::new(),
            },
            "panic(x + 1)"
        );
    }

    #[test]
    fn test_consume_all_is_sorted_and_unique() {
        let unit = run("b, _ := 1, 2\na := 3\nb, c := 4, 5");
        let body = &unit.init_func().body.as_ref().unwrap().stmts;
        let consume = body.last().unwrap();
        assert_eq!(Some(consume.id), unit.consume_all);
        let StmtKind::Assign { lhs, rhs, .. } = &consume.kind else { panic!("expected assignment") };
        assert_eq!(lhs.len(), 3);
        let rhs: Vec<String> = rhs.iter().map(|e| e.to_string()).collect();
        assert_eq!(rhs, vec!["a", "b", "c"]);
        assert!(unit.last_expr.is_none());
    }

    #[test]
    fn test_empty_block() {
        let unit = run("");
        assert!(unit.consume_all.is_none());
        assert!(unit.last_expr.is_none());
        assert!(unit.init_func().body.as_ref().unwrap().stmts.is_empty());
    }
}
