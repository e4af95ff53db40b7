//! Mutable tree traversal
//!
//! Every rewrite in the converter is a [`VisitMut`] implementation that
//! overrides the hooks it cares about and falls back to the `walk_*`
//! functions for the rest. An override that wants post-order behaviour
//! calls the matching `walk_*` first and then replaces the node in place.

use super::ast::*;

/// What a block is the body of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOwner {
    /// A declared function, method or function literal
    Func,
    /// A `for` or `range` loop
    Loop,
    /// Anything else: `if` branches, bare blocks
    Other,
}

pub trait VisitMut {
    fn visit_decl(&mut self, decl: &mut Decl) {
        walk_decl(self, decl);
    }

    fn visit_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        walk_stmts(self, stmts);
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_block(&mut self, block: &mut BlockStmt, _owner: BlockOwner) {
        walk_block(self, block);
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        walk_expr(self, expr);
    }

    fn visit_ident(&mut self, _ident: &mut Ident) {}
}

pub fn walk_file<V: VisitMut + ?Sized>(v: &mut V, file: &mut SourceFile) {
    walk_decls(v, &mut file.decls);
}

pub fn walk_decls<V: VisitMut + ?Sized>(v: &mut V, decls: &mut [Decl]) {
    for decl in decls {
        v.visit_decl(decl);
    }
}

pub fn walk_decl<V: VisitMut + ?Sized>(v: &mut V, decl: &mut Decl) {
    match decl {
        Decl::Gen(gen_decl) => {
            for spec in &mut gen_decl.specs {
                walk_spec(v, spec);
            }
        }
        Decl::Func(func) => {
            if let Some(recv) = &mut func.recv {
                walk_field(v, recv);
            }
            v.visit_ident(&mut func.name);
            walk_func_type(v, &mut func.ty);
            if let Some(body) = &mut func.body {
                v.visit_block(body, BlockOwner::Func);
            }
        }
    }
}

fn walk_spec<V: VisitMut + ?Sized>(v: &mut V, spec: &mut Spec) {
    match spec {
        Spec::Import(import) => {
            if let Some(name) = &mut import.name {
                v.visit_ident(name);
            }
        }
        Spec::Value(value) => {
            for name in &mut value.names {
                v.visit_ident(name);
            }
            if let Some(ty) = &mut value.ty {
                v.visit_expr(ty);
            }
            for e in &mut value.values {
                v.visit_expr(e);
            }
        }
        Spec::Type(ty) => {
            v.visit_ident(&mut ty.name);
            v.visit_expr(&mut ty.ty);
        }
    }
}

fn walk_field<V: VisitMut + ?Sized>(v: &mut V, field: &mut Field) {
    for name in &mut field.names {
        v.visit_ident(name);
    }
    v.visit_expr(&mut field.ty);
}

fn walk_func_type<V: VisitMut + ?Sized>(v: &mut V, ty: &mut FuncType) {
    for field in ty.params.iter_mut().chain(ty.results.iter_mut()) {
        walk_field(v, field);
    }
}

pub fn walk_block<V: VisitMut + ?Sized>(v: &mut V, block: &mut BlockStmt) {
    v.visit_stmts(&mut block.stmts);
}

pub fn walk_stmts<V: VisitMut + ?Sized>(v: &mut V, stmts: &mut Vec<Stmt>) {
    for stmt in stmts.iter_mut() {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Decl(decl) => v.visit_decl(decl),
        StmtKind::Expr(e) | StmtKind::Go(e) | StmtKind::Defer(e) => v.visit_expr(e),
        StmtKind::Assign { lhs, rhs, .. } => {
            for e in lhs.iter_mut().chain(rhs.iter_mut()) {
                v.visit_expr(e);
            }
        }
        StmtKind::IncDec { expr, .. } => v.visit_expr(expr),
        StmtKind::Return(results) => {
            for e in results {
                v.visit_expr(e);
            }
        }
        StmtKind::Break | StmtKind::Continue | StmtKind::Empty => {}
        StmtKind::Block(block) => v.visit_block(block, BlockOwner::Other),
        StmtKind::If {
            init,
            cond,
            then,
            els,
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            v.visit_expr(cond);
            v.visit_block(then, BlockOwner::Other);
            if let Some(els) = els {
                v.visit_stmt(els);
            }
        }
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(cond) = cond {
                v.visit_expr(cond);
            }
            if let Some(post) = post {
                v.visit_stmt(post);
            }
            v.visit_block(body, BlockOwner::Loop);
        }
        StmtKind::Range {
            key,
            value,
            expr,
            body,
            ..
        } => {
            if let Some(key) = key {
                v.visit_expr(key);
            }
            if let Some(value) = value {
                v.visit_expr(value);
            }
            v.visit_expr(expr);
            v.visit_block(body, BlockOwner::Loop);
        }
        StmtKind::Switch { init, tag, clauses } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(tag) = tag {
                v.visit_expr(tag);
            }
            for clause in clauses {
                for e in &mut clause.exprs {
                    v.visit_expr(e);
                }
                v.visit_stmts(&mut clause.body);
            }
        }
    }
}

pub fn walk_expr<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Ident(ident) => v.visit_ident(ident),
        ExprKind::BasicLit(_) => {}
        ExprKind::CompositeLit { ty, elts } => {
            if let Some(ty) = ty {
                v.visit_expr(ty);
            }
            for e in elts {
                v.visit_expr(e);
            }
        }
        ExprKind::FuncLit { ty, body } => {
            walk_func_type(v, ty);
            v.visit_block(body, BlockOwner::Func);
        }
        ExprKind::Paren(inner)
        | ExprKind::Star(inner)
        | ExprKind::SliceType(inner)
        | ExprKind::Ellipsis(inner) => v.visit_expr(inner),
        ExprKind::Unary { expr: inner, .. } => v.visit_expr(inner),
        ExprKind::Selector { expr: inner, sel } => {
            v.visit_expr(inner);
            v.visit_ident(sel);
        }
        ExprKind::Index { expr: inner, index } => {
            v.visit_expr(inner);
            v.visit_expr(index);
        }
        ExprKind::Slice {
            expr: inner,
            low,
            high,
        } => {
            v.visit_expr(inner);
            if let Some(low) = low {
                v.visit_expr(low);
            }
            if let Some(high) = high {
                v.visit_expr(high);
            }
        }
        ExprKind::Call { func, args, .. } => {
            v.visit_expr(func);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        ExprKind::KeyValue { key, value } => {
            v.visit_expr(key);
            v.visit_expr(value);
        }
        ExprKind::MapType { key, value } => {
            v.visit_expr(key);
            v.visit_expr(value);
        }
        ExprKind::StructType(fields) | ExprKind::InterfaceType(fields) => {
            for field in fields {
                walk_field(v, field);
            }
        }
        ExprKind::FuncType(ty) => walk_func_type(v, ty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    struct CountIdents(usize);

    impl VisitMut for CountIdents {
        fn visit_ident(&mut self, _ident: &mut Ident) {
            self.0 += 1;
        }
    }

    struct LoopBodies(Vec<usize>);

    impl VisitMut for LoopBodies {
        fn visit_block(&mut self, block: &mut BlockStmt, owner: BlockOwner) {
            if owner == BlockOwner::Loop {
                self.0.push(block.stmts.len());
            }
            walk_block(self, block);
        }
    }

    #[test]
    fn test_visits_every_ident() {
        let mut block = Parser::new("x := y.z + f(a)").parse_block().unwrap();
        let mut v = CountIdents(0);
        v.visit_stmts(&mut block.stmts);
        // x, y, z, f, a
        assert_eq!(v.0, 5);
    }

    #[test]
    fn test_block_owner() {
        let src = "for i := 0; i < 3; i++ {\n\tx := i\n\t_ = x\n}\nfor range xs {\n}";
        let mut block = Parser::new(src).parse_block().unwrap();
        let mut v = LoopBodies(Vec::new());
        v.visit_stmts(&mut block.stmts);
        assert_eq!(v.0, vec![2, 0]);
    }
}
