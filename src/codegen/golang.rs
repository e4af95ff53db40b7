//! Go source printer
//!
//! Prints a [`SourceFile`] as tab-indented Go. Comments survive only where
//! the tree carries them: leading doc lines of declarations and statements.

use std::fmt;

use super::CodeGenerator;
use crate::parser::{
    AssignOp, BlockStmt, CaseClause, Decl, Expr, ExprKind, Field, FuncDecl, FuncType, GenDecl, GenKind,
    SourceFile, Spec, Stmt, StmtKind,
};

/// Go code generator
pub struct GoGenerator {
    /// Current indentation level
    indent: usize,
    /// Output buffer
    output: String,
}

impl GoGenerator {
    pub fn new() -> Self {
        Self {
            indent: 0,
            output: String::new(),
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn writeln(&mut self, s: &str) {
        self.write_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push('\t');
        }
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    fn write_doc(&mut self, doc: &[String]) {
        for line in doc {
            self.writeln(line);
        }
    }

    fn generate_file(&mut self, file: &SourceFile) {
        self.writeln(&format!("package {}", file.package.name));
        let mut prev_import = false;
        for decl in &file.decls {
            let is_import = matches!(decl, Decl::Gen(g) if g.kind == GenKind::Import && !g.grouped);
            if !(is_import && prev_import) {
                self.writeln("");
            }
            self.generate_decl(decl);
            prev_import = is_import;
        }
    }

    fn generate_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Gen(gen_decl) => self.generate_gen_decl(gen_decl),
            Decl::Func(func) => self.generate_func_decl(func),
        }
    }

    fn generate_gen_decl(&mut self, gen_decl: &GenDecl) {
        self.write_doc(&gen_decl.doc);
        if gen_decl.grouped || gen_decl.specs.len() != 1 {
            self.writeln(&format!("{} (", gen_decl.kind));
            self.indent();
            for spec in &gen_decl.specs {
                self.write_indent();
                self.generate_spec(spec);
                self.write("\n");
            }
            self.dedent();
            self.writeln(")");
        } else {
            self.write_indent();
            self.write(&format!("{} ", gen_decl.kind));
            self.generate_spec(&gen_decl.specs[0]);
            self.write("\n");
        }
    }

    fn generate_spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Import(import) => {
                if let Some(name) = &import.name {
                    self.write(&format!("{} ", name.name));
                }
                self.write(&format!("\"{}\"", import.path));
            }
            Spec::Value(vs) => {
                self.write(&join_names(vs.names.iter().map(|n| n.name.as_str())));
                if let Some(ty) = &vs.ty {
                    self.write(" ");
                    self.generate_expr(ty);
                }
                if !vs.values.is_empty() {
                    self.write(" = ");
                    self.generate_expr_list(&vs.values);
                }
            }
            Spec::Type(ts) => {
                self.write(&format!("{} ", ts.name.name));
                match &ts.ty.kind {
                    ExprKind::StructType(fields) if !fields.is_empty() => {
                        self.write("struct {\n");
                        self.indent();
                        for field in fields {
                            self.write_indent();
                            self.generate_field(field);
                            self.write("\n");
                        }
                        self.dedent();
                        self.write_indent();
                        self.write("}");
                    }
                    ExprKind::InterfaceType(methods) if !methods.is_empty() => {
                        self.write("interface {\n");
                        self.indent();
                        for method in methods {
                            self.write_indent();
                            self.generate_method(method);
                            self.write("\n");
                        }
                        self.dedent();
                        self.write_indent();
                        self.write("}");
                    }
                    _ => self.generate_expr(&ts.ty),
                }
            }
        }
    }

    fn generate_func_decl(&mut self, func: &FuncDecl) {
        self.write_doc(&func.doc);
        self.write_indent();
        self.write("func ");
        if let Some(recv) = &func.recv {
            self.write("(");
            self.generate_field(recv);
            self.write(") ");
        }
        self.write(&func.name.name);
        self.generate_signature(&func.ty);
        if let Some(body) = &func.body {
            self.write(" ");
            self.generate_block(body);
        }
        self.write("\n");
    }

    /// `(params) results`
    fn generate_signature(&mut self, ty: &FuncType) {
        self.write("(");
        self.generate_fields(&ty.params, ", ");
        self.write(")");
        match ty.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                self.write(" ");
                self.generate_expr(&single.ty);
            }
            results => {
                self.write(" (");
                self.generate_fields(results, ", ");
                self.write(")");
            }
        }
    }

    fn generate_fields(&mut self, fields: &[Field], sep: &str) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.write(sep);
            }
            self.generate_field(field);
        }
    }

    fn generate_field(&mut self, field: &Field) {
        if !field.names.is_empty() {
            self.write(&join_names(field.names.iter().map(|n| n.name.as_str())));
            self.write(" ");
        }
        self.generate_expr(&field.ty);
    }

    fn generate_method(&mut self, method: &Field) {
        self.write(&join_names(method.names.iter().map(|n| n.name.as_str())));
        match &method.ty.kind {
            ExprKind::FuncType(ft) => self.generate_signature(ft),
            _ => {
                self.write(" ");
                self.generate_expr(&method.ty);
            }
        }
    }

    /// `{ ... }` without a trailing newline; the opening brace is written
    /// at the current position
    fn generate_block(&mut self, block: &BlockStmt) {
        self.write("{\n");
        self.indent();
        self.generate_stmts(&block.stmts);
        self.dedent();
        self.write_indent();
        self.write("}");
    }

    fn generate_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.generate_stmt(stmt);
        }
    }

    fn generate_stmt(&mut self, stmt: &Stmt) {
        if matches!(stmt.kind, StmtKind::Empty) {
            return;
        }
        self.write_doc(&stmt.doc);
        match &stmt.kind {
            StmtKind::Decl(Decl::Gen(gen_decl)) => self.generate_gen_decl(gen_decl),
            StmtKind::Decl(Decl::Func(func)) => self.generate_func_decl(func),
            StmtKind::Block(block) => {
                self.write_indent();
                self.generate_block(block);
                self.write("\n");
            }
            StmtKind::If { .. } => {
                self.write_indent();
                self.generate_if(stmt);
                self.write("\n");
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.write_indent();
                self.write("for ");
                if init.is_some() || post.is_some() {
                    if let Some(init) = init {
                        self.generate_simple_stmt(init);
                    }
                    self.write("; ");
                    if let Some(cond) = cond {
                        self.generate_expr(cond);
                    }
                    self.write("; ");
                    if let Some(post) = post {
                        self.generate_simple_stmt(post);
                    }
                    self.write(" ");
                } else if let Some(cond) = cond {
                    self.generate_expr(cond);
                    self.write(" ");
                }
                self.generate_block(body);
                self.write("\n");
            }
            StmtKind::Range {
                key,
                value,
                define,
                expr,
                body,
            } => {
                self.write_indent();
                self.write("for ");
                if let Some(key) = key {
                    self.generate_expr(key);
                    if let Some(value) = value {
                        self.write(", ");
                        self.generate_expr(value);
                    }
                    self.write(if *define { " := " } else { " = " });
                }
                self.write("range ");
                self.generate_expr(expr);
                self.write(" ");
                self.generate_block(body);
                self.write("\n");
            }
            StmtKind::Switch { init, tag, clauses } => {
                self.write_indent();
                self.write("switch ");
                if let Some(init) = init {
                    self.generate_simple_stmt(init);
                    self.write("; ");
                }
                if let Some(tag) = tag {
                    self.generate_expr(tag);
                    self.write(" ");
                }
                self.write("{\n");
                for clause in clauses {
                    self.generate_clause(clause);
                }
                self.writeln("}");
            }
            _ => {
                self.write_indent();
                self.generate_simple_stmt(stmt);
                self.write("\n");
            }
        }
    }

    fn generate_if(&mut self, stmt: &Stmt) {
        let StmtKind::If {
            init,
            cond,
            then,
            els,
        } = &stmt.kind
        else {
            return;
        };
        self.write("if ");
        if let Some(init) = init {
            self.generate_simple_stmt(init);
            self.write("; ");
        }
        self.generate_expr(cond);
        self.write(" ");
        self.generate_block(then);
        match els.as_deref() {
            Some(els @ Stmt {
                kind: StmtKind::If { .. },
                ..
            }) => {
                self.write(" else ");
                self.generate_if(els);
            }
            Some(Stmt {
                kind: StmtKind::Block(block),
                ..
            }) => {
                self.write(" else ");
                self.generate_block(block);
            }
            _ => {}
        }
    }

    fn generate_clause(&mut self, clause: &CaseClause) {
        self.write_indent();
        if clause.exprs.is_empty() {
            self.write("default:\n");
        } else {
            self.write("case ");
            self.generate_expr_list(&clause.exprs);
            self.write(":\n");
        }
        self.indent();
        self.generate_stmts(&clause.body);
        self.dedent();
    }

    /// Statements that fit on one line: also used in `if`/`for`/`switch` headers
    fn generate_simple_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(e) => self.generate_expr(e),
            StmtKind::Assign { lhs, op, rhs } => {
                self.generate_expr_list(lhs);
                match op {
                    AssignOp::Define => self.write(" := "),
                    AssignOp::Assign => self.write(" = "),
                    AssignOp::Op(op) => self.write(&format!(" {}= ", op)),
                }
                self.generate_expr_list(rhs);
            }
            StmtKind::IncDec { expr, inc } => {
                self.generate_expr(expr);
                self.write(if *inc { "++" } else { "--" });
            }
            StmtKind::Go(call) => {
                self.write("go ");
                self.generate_expr(call);
            }
            StmtKind::Defer(call) => {
                self.write("defer ");
                self.generate_expr(call);
            }
            StmtKind::Return(results) => {
                self.write("return");
                if !results.is_empty() {
                    self.write(" ");
                    self.generate_expr_list(results);
                }
            }
            StmtKind::Break => self.write("break"),
            StmtKind::Continue => self.write("continue"),
            _ => {}
        }
    }

    fn generate_expr_list(&mut self, exprs: &[Expr]) {
        for (i, e) in exprs.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.generate_expr(e);
        }
    }

    fn generate_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Ident(ident) => self.write(&ident.name),
            ExprKind::BasicLit(lit) => self.write(&lit.value),
            ExprKind::CompositeLit { ty, elts } => {
                if let Some(ty) = ty {
                    self.generate_expr(ty);
                }
                self.write("{");
                self.generate_expr_list(elts);
                self.write("}");
            }
            ExprKind::FuncLit { ty, body } => {
                self.write("func");
                self.generate_signature(ty);
                self.write(" ");
                self.generate_block(body);
            }
            ExprKind::Paren(inner) => {
                self.write("(");
                self.generate_expr(inner);
                self.write(")");
            }
            ExprKind::Selector { expr, sel } => {
                self.generate_expr(expr);
                self.write(".");
                self.write(&sel.name);
            }
            ExprKind::Index { expr, index } => {
                self.generate_expr(expr);
                self.write("[");
                self.generate_expr(index);
                self.write("]");
            }
            ExprKind::Slice { expr, low, high } => {
                self.generate_expr(expr);
                self.write("[");
                if let Some(low) = low {
                    self.generate_expr(low);
                }
                self.write(":");
                if let Some(high) = high {
                    self.generate_expr(high);
                }
                self.write("]");
            }
            ExprKind::Call { func, args, ellipsis } => {
                self.generate_expr(func);
                self.write("(");
                self.generate_expr_list(args);
                if *ellipsis {
                    self.write("...");
                }
                self.write(")");
            }
            ExprKind::Star(inner) => {
                self.write("*");
                self.generate_expr(inner);
            }
            ExprKind::Unary { op, expr } => {
                self.write(&op.to_string());
                self.generate_expr(expr);
            }
            ExprKind::Binary { op, left, right } => {
                self.generate_expr(left);
                self.write(&format!(" {} ", op));
                self.generate_expr(right);
            }
            ExprKind::KeyValue { key, value } => {
                self.generate_expr(key);
                self.write(": ");
                self.generate_expr(value);
            }
            ExprKind::SliceType(elem) => {
                self.write("[]");
                self.generate_expr(elem);
            }
            ExprKind::MapType { key, value } => {
                self.write("map[");
                self.generate_expr(key);
                self.write("]");
                self.generate_expr(value);
            }
            ExprKind::StructType(fields) => {
                if fields.is_empty() {
                    self.write("struct{}");
                } else {
                    self.write("struct{ ");
                    self.generate_fields(fields, "; ");
                    self.write(" }");
                }
            }
            ExprKind::FuncType(ft) => {
                self.write("func");
                self.generate_signature(ft);
            }
            ExprKind::InterfaceType(methods) => {
                if methods.is_empty() {
                    self.write("interface{}");
                } else {
                    self.write("interface{ ");
                    for (i, method) in methods.iter().enumerate() {
                        if i > 0 {
                            self.write("; ");
                        }
                        self.generate_method(method);
                    }
                    self.write(" }");
                }
            }
            ExprKind::Ellipsis(elem) => {
                self.write("...");
                self.generate_expr(elem);
            }
        }
    }
}

impl Default for GoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for GoGenerator {
    fn generate(&mut self, file: &SourceFile) -> String {
        self.output.clear();
        self.indent = 0;
        self.generate_file(file);
        std::mem::take(&mut self.output)
    }

    fn file_extension(&self) -> &'static str {
        "go"
    }

    fn language_name(&self) -> &'static str {
        "Go"
    }
}

/// Expressions display as the Go source they print to
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut generator = GoGenerator::new();
        generator.generate_expr(self);
        f.write_str(&generator.output)
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn roundtrip(source: &str) -> String {
        let file = Parser::new(source).parse_file().unwrap();
        GoGenerator::new().generate(&file)
    }

    #[test]
    fn test_prints_declarations() {
        let source = r#"package p

import "fmt"
import s "strings"

type point struct {
	x, y int
}

var (
	a int
	b = "x"
)

func (p *point) norm() (int, error) {
	return p.x*p.x + p.y, nil
}
"#;
        let expected = r#"package p

import "fmt"
import s "strings"

type point struct {
	x, y int
}

var (
	a int
	b = "x"
)

func (p *point) norm() (int, error) {
	return p.x * p.x + p.y, nil
}
"#;
        assert_eq!(roundtrip(source), expected);
    }

    #[test]
    fn test_prints_control_flow() {
        let source = "package p\n\nfunc f(xs []int) {\n\tfor i, x := range xs {\n\t\tif x > 1 {\n\t\t\tcontinue\n\t\t} else if x < 0 {\n\t\t\tbreak\n\t\t} else {\n\t\t\ti++\n\t\t}\n\t}\n\tswitch n := len(xs); {\n\tcase n > 1:\n\t\tgo func() {\n\t\t\tprintln(n)\n\t\t}()\n\tdefault:\n\t}\n}\n";
        let expected = "package p\n\nfunc f(xs []int) {\n\tfor i, x := range xs {\n\t\tif x > 1 {\n\t\t\tcontinue\n\t\t} else if x < 0 {\n\t\t\tbreak\n\t\t} else {\n\t\t\ti++\n\t\t}\n\t}\n\tswitch n := len(xs); {\n\tcase n > 1:\n\t\tgo func() {\n\t\t\tprintln(n)\n\t\t}()\n\tdefault:\n\t}\n}\n";
        assert_eq!(roundtrip(source), expected);
    }

    #[test]
    fn test_expr_display() {
        let file = Parser::new("package p\n\nvar v = map[string][]int{\"a\": {1, 2}}[\"a\"][1:]\n")
            .parse_file()
            .unwrap();
        let Decl::Gen(gen_decl) = &file.decls[0] else { panic!("expected var") };
        let Spec::Value(vs) = &gen_decl.specs[0] else { panic!("expected value spec") };
        assert_eq!(vs.values[0].to_string(), "map[string][]int{\"a\": {1, 2}}[\"a\"][1:]");
    }
}
