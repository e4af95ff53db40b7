//! Type checking pass
//!
//! Resolves every identifier of a package file to its object, computes the
//! type of every expression, and reports the errors a Go compiler reports
//! for the supported subset. Results are collected into an [`Info`].
//!
//! Package-level declarations may appear in any order. Types are resolved
//! first, then function signatures and methods, then package variables and
//! constants (lazily, so `var a = b` may precede `var b`), then bodies.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::importer::Importer;
use super::scope::{Builtin, Object, ObjectKind, ObjectRef, Package, Scope};
use super::types::{
    BasicKind, InterfaceType, NamedType, Signature, StructType, Type, assignable, identical,
    lookup_field_or_method,
};
use super::universe;
use crate::errors::{LgoError, SourceSpan};
use crate::parser::{
    AssignOp, BinaryOp, BlockStmt, CaseClause, Decl, Expr, ExprKind, Field, FuncDecl, FuncType, GenDecl,
    GenKind, Ident, LitKind, NodeId, SourceFile, Spec, Stmt, StmtKind, UnaryOp, ValueSpec,
};

/// Options for one checker run
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Skip the bodies of declared functions
    pub ignore_func_bodies: bool,
    /// A function whose body is checked even when bodies are skipped
    pub keep_body: Option<String>,
}

/// Analysis results, keyed by syntax node id
#[derive(Debug, Default)]
pub struct Info {
    /// Identifiers that declare an object
    pub defs: HashMap<NodeId, ObjectRef>,
    /// Identifiers that refer to an object
    pub uses: HashMap<NodeId, ObjectRef>,
    /// Types of expressions; calls without results get an empty tuple
    pub types: HashMap<NodeId, Type>,
    /// Package names declared by unaliased imports, keyed by import spec
    pub implicits: HashMap<NodeId, ObjectRef>,
    /// Names declared by the file's imports
    pub file_scope: Scope,
}

impl Info {
    pub fn type_of(&self, expr: &Expr) -> Option<&Type> {
        self.types.get(&expr.id)
    }

    /// The object an identifier declares or refers to
    pub fn object_of(&self, ident: &Ident) -> Option<&ObjectRef> {
        self.defs.get(&ident.id).or_else(|| self.uses.get(&ident.id))
    }
}

/// Check one file of `pkg`. Names not found in the file or package are
/// looked up in `outer` before the universe.
pub fn check_file(
    pkg: &Rc<Package>,
    outer: &Scope,
    file: &SourceFile,
    importer: &dyn Importer,
    options: &CheckOptions,
) -> (Info, Vec<LgoError>) {
    let mut checker = Checker {
        pkg: pkg.clone(),
        outer,
        file,
        importer,
        options,
        info: Info::default(),
        errors: Vec::new(),
        scopes: Vec::new(),
        funcs: Vec::new(),
        pending: HashMap::new(),
        resolved: HashSet::new(),
        resolving: HashSet::new(),
    };
    checker.check();
    (checker.info, checker.errors)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Invalid,
    /// A call without results
    NoValue,
    Value,
    Const,
    TypeExpr,
    Builtin(Builtin),
    /// `m[k]`, which may be used in a comma-ok assignment
    MapIndex,
    Package,
}

#[derive(Debug, Clone)]
struct Operand {
    mode: Mode,
    ty: Type,
}

impl Operand {
    fn invalid() -> Self {
        Self {
            mode: Mode::Invalid,
            ty: Type::Invalid,
        }
    }

    fn value(ty: Type) -> Self {
        Self { mode: Mode::Value, ty }
    }

    fn constant(ty: Type) -> Self {
        Self { mode: Mode::Const, ty }
    }

    fn type_expr(ty: Type) -> Self {
        Self {
            mode: Mode::TypeExpr,
            ty,
        }
    }

    fn is_invalid(&self) -> bool {
        self.mode == Mode::Invalid || self.ty.is_invalid()
    }
}

/// A block scope inside a function
#[derive(Default)]
struct LocalScope {
    scope: Scope,
    /// Variables that must be used before the scope closes
    tracked: Vec<ObjectRef>,
}

struct FuncContext {
    results: Vec<Type>,
    named_results: bool,
    loops: usize,
    breakables: usize,
}

struct Checker<'a> {
    pkg: Rc<Package>,
    outer: &'a Scope,
    file: &'a SourceFile,
    importer: &'a dyn Importer,
    options: &'a CheckOptions,
    info: Info,
    errors: Vec<LgoError>,
    /// Block scopes of the function being checked, innermost last
    scopes: Vec<LocalScope>,
    /// Enclosing functions, innermost last
    funcs: Vec<FuncContext>,
    /// Package-level value names to their (decl, spec) index
    pending: HashMap<String, (usize, usize)>,
    resolved: HashSet<(usize, usize)>,
    resolving: HashSet<(usize, usize)>,
}

impl<'a> Checker<'a> {
    fn check(&mut self) {
        self.collect_objects();
        self.resolve_type_decls();
        self.resolve_func_signatures();
        self.resolve_package_values();
        self.check_func_bodies();
    }

    /// Record an error
    fn error(&mut self, message: impl Into<String>, span: SourceSpan) {
        self.errors.push(LgoError::type_error(message, span));
    }

    // ==================== Scopes ====================

    fn lookup(&mut self, name: &str) -> Option<ObjectRef> {
        for local in self.scopes.iter().rev() {
            if let Some(obj) = local.scope.lookup(name) {
                return Some(obj.clone());
            }
        }
        if let Some(obj) = self.info.file_scope.lookup(name) {
            return Some(obj.clone());
        }
        if let Some(obj) = self.pkg.lookup(name) {
            if let Some(&key) = self.pending.get(name) {
                self.resolve_value_spec(key);
            }
            return Some(obj);
        }
        if let Some(obj) = self.outer.lookup(name) {
            return Some(obj.clone());
        }
        universe::lookup(name)
    }

    fn open_scope(&mut self) {
        self.scopes.push(LocalScope::default());
    }

    fn close_scope(&mut self) {
        if let Some(local) = self.scopes.pop() {
            for obj in local.tracked {
                if !obj.used() {
                    self.error(format!("declared and not used: {}", obj.name), obj.span);
                }
            }
        }
    }

    fn declare_local(&mut self, ident: &Ident, kind: ObjectKind, ty: Type) -> ObjectRef {
        let track = matches!(kind, ObjectKind::Var);
        let obj = Object::declared(&ident.name, kind, ty, &self.pkg, ident.span);
        self.info.defs.insert(ident.id, obj.clone());
        if ident.is_blank() {
            return obj;
        }
        let Some(local) = self.scopes.last_mut() else {
            return obj;
        };
        let redeclared = local.scope.insert(obj.clone()).is_some();
        if track {
            local.tracked.push(obj.clone());
        }
        if redeclared {
            self.error(format!("{} redeclared in this block", ident.name), ident.span);
        }
        obj
    }

    fn declare_package(&mut self, ident: &Ident, obj: ObjectRef) {
        self.info.defs.insert(ident.id, obj.clone());
        if ident.is_blank() {
            return;
        }
        if self.pkg.insert(obj).is_some() || self.info.file_scope.contains(&ident.name) {
            self.error(format!("{} redeclared in this block", ident.name), ident.span);
        }
    }

    fn func_ctx(&mut self) -> Option<&mut FuncContext> {
        self.funcs.last_mut()
    }

    // ==================== Package level ====================

    fn collect_objects(&mut self) {
        let file = self.file;
        for (di, decl) in file.decls.iter().enumerate() {
            match decl {
                Decl::Gen(gen_decl) => self.collect_gen_decl(di, gen_decl),
                Decl::Func(func) => {
                    if func.recv.is_some() || func.name.name == "init" {
                        continue;
                    }
                    let obj = Object::declared(&func.name.name, ObjectKind::Func, Type::Invalid, &self.pkg, func.name.span);
                    self.declare_package(&func.name, obj);
                }
            }
        }
    }

    fn collect_gen_decl(&mut self, di: usize, gen_decl: &'a GenDecl) {
        for (si, spec) in gen_decl.specs.iter().enumerate() {
            match spec {
                Spec::Import(import) => {
                    let imported = match self.importer.import(&import.path) {
                        Ok(pkg) => pkg,
                        Err(err) => {
                            self.error(err.to_string(), import.span);
                            continue;
                        }
                    };
                    let name = import
                        .name
                        .as_ref()
                        .map(|n| n.name.clone())
                        .unwrap_or_else(|| imported.name.clone());
                    if name == "_" {
                        continue;
                    }
                    let obj = Object::pkg_name(&name, imported, &self.pkg);
                    match &import.name {
                        Some(ident) => self.info.defs.insert(ident.id, obj.clone()),
                        None => self.info.implicits.insert(import.id, obj.clone()),
                    };
                    if self.info.file_scope.insert(obj).is_some() {
                        self.error(format!("{} redeclared in this block", name), import.span);
                    }
                }
                Spec::Type(ts) => {
                    let named = NamedType::new(&ts.name.name, Some(self.pkg.clone()));
                    let obj = Object::declared(&ts.name.name, ObjectKind::TypeName, Type::Named(named), &self.pkg, ts.name.span);
                    self.declare_package(&ts.name, obj);
                }
                Spec::Value(vs) => {
                    let kind = if gen_decl.kind == GenKind::Const {
                        ObjectKind::Const
                    } else {
                        ObjectKind::Var
                    };
                    for name in &vs.names {
                        let obj = Object::declared(&name.name, kind.clone(), Type::Invalid, &self.pkg, name.span);
                        self.declare_package(name, obj);
                        if !name.is_blank() {
                            self.pending.insert(name.name.clone(), (di, si));
                        }
                    }
                }
            }
        }
    }

    fn resolve_type_decls(&mut self) {
        let file = self.file;
        for decl in &file.decls {
            let Decl::Gen(gen_decl) = decl else { continue };
            for spec in &gen_decl.specs {
                let Spec::Type(ts) = spec else { continue };
                let ty = self.resolve_type(&ts.ty);
                if let Some(Type::Named(named)) = self.info.defs.get(&ts.name.id).map(|obj| obj.ty()) {
                    named.set_underlying(ty);
                }
            }
        }
    }

    fn resolve_func_signatures(&mut self) {
        let file = self.file;
        for decl in &file.decls {
            let Decl::Func(func) = decl else { continue };
            match &func.recv {
                None => {
                    let sig = self.resolve_signature(&func.ty, None);
                    match self.info.defs.get(&func.name.id) {
                        Some(obj) => obj.set_ty(Type::signature(sig)),
                        None => {
                            // `init` is never declared
                            let obj = Object::declared(&func.name.name, ObjectKind::Func, Type::signature(sig), &self.pkg, func.name.span);
                            self.info.defs.insert(func.name.id, obj);
                        }
                    }
                }
                Some(recv) => self.declare_method(func, recv),
            }
        }
    }

    fn declare_method(&mut self, func: &FuncDecl, recv: &Field) {
        let recv_ty = self.resolve_type(&recv.ty);
        let base = match &recv_ty {
            Type::Pointer(elem) => elem.as_ref().clone(),
            other => other.clone(),
        };
        let named = match &base {
            Type::Named(named) if named.pkg.as_ref().is_some_and(|p| Rc::ptr_eq(p, &self.pkg)) => {
                if matches!(base.underlying(), Type::Pointer(_) | Type::Interface(_)) {
                    self.error(
                        format!("invalid receiver type {} (pointer or interface type)", base),
                        recv.ty.span,
                    );
                    None
                } else {
                    Some(named.clone())
                }
            }
            Type::Invalid => None,
            other => {
                self.error(format!("cannot define new methods on non-local type {}", other), recv.ty.span);
                None
            }
        };

        let sig = self.resolve_signature(&func.ty, Some(recv_ty));
        let obj = Object::declared(&func.name.name, ObjectKind::Func, Type::signature(sig), &self.pkg, func.name.span);
        self.info.defs.insert(func.name.id, obj.clone());

        let Some(named) = named else { return };
        if func.name.is_blank() {
            return;
        }
        if named.method(&func.name.name).is_some() {
            self.error(
                format!("method {}.{} already declared", named.name, func.name.name),
                func.name.span,
            );
            return;
        }
        if let Type::Struct(st) = named.declared().underlying()
            && st.fields.iter().any(|f| f.name == func.name.name)
        {
            self.error(
                format!("field and method with the same name {}", func.name.name),
                func.name.span,
            );
        }
        named.add_method(obj);
    }

    fn resolve_package_values(&mut self) {
        let mut keys: Vec<(usize, usize)> = self.pending.values().copied().collect();
        keys.sort_unstable();
        keys.dedup();
        for key in keys {
            self.resolve_value_spec(key);
        }
    }

    fn resolve_value_spec(&mut self, key: (usize, usize)) {
        if self.resolved.contains(&key) {
            return;
        }
        let file = self.file;
        let Decl::Gen(gen_decl) = &file.decls[key.0] else { return };
        let Spec::Value(spec) = &gen_decl.specs[key.1] else { return };

        if !self.resolving.insert(key) {
            let name = spec.names.first().map(|n| n.name.as_str()).unwrap_or("_");
            self.error(format!("initialization cycle: {} refers to itself", name), spec.span);
            return;
        }

        // Package-level initializers see no function locals
        let scopes = std::mem::take(&mut self.scopes);
        let funcs = std::mem::take(&mut self.funcs);
        let types = self.value_spec_types(gen_decl.kind, spec);
        self.scopes = scopes;
        self.funcs = funcs;

        for (name, ty) in spec.names.iter().zip(types) {
            if let Some(obj) = self.info.defs.get(&name.id) {
                obj.set_ty(ty);
            }
        }
        self.resolving.remove(&key);
        self.resolved.insert(key);
    }

    fn check_func_bodies(&mut self) {
        let file = self.file;
        for decl in &file.decls {
            let Decl::Func(func) = decl else { continue };
            let Some(body) = &func.body else {
                if self.pkg.is_session() {
                    self.error("missing function body", func.name.span);
                }
                continue;
            };
            let skip = self.options.ignore_func_bodies
                && self.options.keep_body.as_deref() != Some(func.name.name.as_str());
            if skip {
                continue;
            }
            let Some(sig) = self.info.defs.get(&func.name.id).and_then(|obj| obj.ty().as_signature()) else {
                continue;
            };
            self.check_func_body(&sig, &func.ty, func.recv.as_ref(), body);
        }
    }

    fn check_func_body(&mut self, sig: &Signature, ft: &FuncType, recv: Option<&Field>, body: &BlockStmt) {
        self.funcs.push(FuncContext {
            results: sig.results.clone(),
            named_results: ft.results.iter().any(|f| !f.names.is_empty()),
            loops: 0,
            breakables: 0,
        });
        self.open_scope();

        if let (Some(recv), Some(recv_ty)) = (recv, &sig.recv) {
            for name in &recv.names {
                self.declare_param(name, recv_ty.clone());
            }
        }
        self.declare_params(&ft.params, &sig.params);
        self.declare_params(&ft.results, &sig.results);

        self.stmt_list(&body.stmts);
        if !sig.results.is_empty() && !is_terminating_list(&body.stmts) {
            let end = SourceSpan::new(body.span.end.saturating_sub(1), body.span.end);
            self.error("missing return", end);
        }

        self.close_scope();
        self.funcs.pop();
    }

    fn declare_params(&mut self, fields: &[Field], types: &[Type]) {
        let mut types = types.iter();
        for field in fields {
            if field.names.is_empty() {
                types.next();
                continue;
            }
            for name in &field.names {
                let ty = types.next().cloned().unwrap_or_default();
                self.declare_param(name, ty);
            }
        }
    }

    /// Parameters are variables that need not be used
    fn declare_param(&mut self, ident: &Ident, ty: Type) {
        let obj = Object::declared(&ident.name, ObjectKind::Var, ty, &self.pkg, ident.span);
        self.info.defs.insert(ident.id, obj.clone());
        if ident.is_blank() {
            return;
        }
        if let Some(local) = self.scopes.last_mut()
            && local.scope.insert(obj).is_some()
        {
            self.error(format!("duplicate argument {}", ident.name), ident.span);
        }
    }

    // ==================== Types ====================

    fn resolve_type(&mut self, e: &Expr) -> Type {
        let ty = match &e.kind {
            ExprKind::Ident(ident) => match self.lookup(&ident.name) {
                None => {
                    self.error(format!("undefined: {}", ident.name), ident.span);
                    Type::Invalid
                }
                Some(obj) => {
                    self.info.uses.insert(ident.id, obj.clone());
                    if matches!(obj.kind, ObjectKind::TypeName) {
                        obj.ty()
                    } else {
                        self.error(format!("{} is not a type", ident.name), ident.span);
                        Type::Invalid
                    }
                }
            },
            ExprKind::Selector { expr, sel } => match self.package_of(expr) {
                Some(imported) => match self.member(&imported, expr, sel) {
                    Some(obj) if matches!(obj.kind, ObjectKind::TypeName) => obj.ty(),
                    Some(_) => {
                        self.error(format!("{} is not a type", e), e.span);
                        Type::Invalid
                    }
                    None => Type::Invalid,
                },
                None => {
                    self.error(format!("{} is not a type", e), e.span);
                    Type::Invalid
                }
            },
            ExprKind::Paren(inner) => self.resolve_type(inner),
            ExprKind::Star(elem) => Type::pointer(self.resolve_type(elem)),
            ExprKind::SliceType(elem) => Type::slice(self.resolve_type(elem)),
            ExprKind::MapType { key, value } => {
                let key_ty = self.resolve_type(key);
                if matches!(key_ty.underlying(), Type::Slice(_) | Type::Map(..) | Type::Signature(_)) {
                    self.error(format!("invalid map key type {}", key_ty), key.span);
                }
                Type::map(key_ty, self.resolve_type(value))
            }
            ExprKind::StructType(fields) => self.struct_type(fields),
            ExprKind::InterfaceType(methods) => self.interface_type(methods),
            ExprKind::FuncType(ft) => Type::signature(self.resolve_signature(ft, None)),
            ExprKind::Ellipsis(_) => {
                self.error("invalid use of ...", e.span);
                Type::Invalid
            }
            _ => {
                self.error(format!("{} is not a type", e), e.span);
                Type::Invalid
            }
        };
        self.info.types.insert(e.id, ty.clone());
        ty
    }

    fn struct_type(&mut self, fields: &[Field]) -> Type {
        let mut objects = Vec::new();
        let mut seen = HashSet::new();
        for field in fields {
            let ty = self.resolve_type(&field.ty);
            for name in &field.names {
                let obj = Object::declared(&name.name, ObjectKind::Field, ty.clone(), &self.pkg, name.span);
                self.info.defs.insert(name.id, obj.clone());
                if !name.is_blank() && !seen.insert(name.name.clone()) {
                    self.error(format!("{} redeclared", name.name), name.span);
                }
                objects.push(obj);
            }
        }
        Type::Struct(Rc::new(StructType { fields: objects }))
    }

    fn interface_type(&mut self, methods: &[Field]) -> Type {
        let iface = InterfaceType::new();
        for method in methods {
            let ExprKind::FuncType(ft) = &method.ty.kind else { continue };
            let sig = self.resolve_signature(ft, Some(Type::Interface(iface.clone())));
            for name in &method.names {
                if iface.method(&name.name).is_some() {
                    self.error(format!("duplicate method {}", name.name), name.span);
                    continue;
                }
                let obj = Object::declared(&name.name, ObjectKind::Func, Type::signature(sig.clone()), &self.pkg, name.span);
                self.info.defs.insert(name.id, obj.clone());
                iface.add_method(obj);
            }
        }
        Type::Interface(iface)
    }

    fn resolve_signature(&mut self, ft: &FuncType, recv: Option<Type>) -> Signature {
        let mut params = Vec::new();
        let mut variadic = false;
        let count = ft.params.len();
        for (i, field) in ft.params.iter().enumerate() {
            let ty = match &field.ty.kind {
                ExprKind::Ellipsis(elem) => {
                    if i + 1 != count || field.names.len() > 1 {
                        self.error("can only use ... with final parameter in list", field.ty.span);
                    }
                    variadic = true;
                    let elem = self.resolve_type(elem);
                    self.info.types.insert(field.ty.id, Type::slice(elem.clone()));
                    Type::slice(elem)
                }
                _ => self.resolve_type(&field.ty),
            };
            params.extend(std::iter::repeat_n(ty, field.names.len().max(1)));
        }

        let mut results = Vec::new();
        for field in &ft.results {
            let ty = self.resolve_type(&field.ty);
            results.extend(std::iter::repeat_n(ty, field.names.len().max(1)));
        }

        Signature {
            recv,
            params,
            results,
            variadic,
        }
    }

    /// The package named by `x`, when `x` is an imported package name
    fn package_of(&mut self, x: &Expr) -> Option<Rc<Package>> {
        let ExprKind::Ident(ident) = &x.kind else { return None };
        let obj = self.lookup(&ident.name)?;
        let ObjectKind::PkgName(imported) = &obj.kind else { return None };
        let imported = imported.clone();
        obj.mark_used();
        self.info.uses.insert(ident.id, obj);
        Some(imported)
    }

    /// `pkg.sel`; members of session packages are visible even when unexported
    fn member(&mut self, imported: &Rc<Package>, x: &Expr, sel: &Ident) -> Option<ObjectRef> {
        match imported.lookup(&sel.name) {
            Some(obj) if obj.is_exported() || imported.is_session() => {
                self.info.uses.insert(sel.id, obj.clone());
                Some(obj)
            }
            Some(_) => {
                self.error(
                    format!("name {} not exported by package {}", sel.name, imported.name),
                    sel.span,
                );
                None
            }
            None => {
                self.error(format!("undefined: {}.{}", x, sel.name), sel.span);
                None
            }
        }
    }

    // ==================== Statements ====================

    fn stmt_list(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn block(&mut self, block: &BlockStmt) {
        self.open_scope();
        self.stmt_list(&block.stmts);
        self.close_scope();
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Decl(Decl::Gen(gen_decl)) => self.local_gen_decl(gen_decl),
            StmtKind::Decl(Decl::Func(func)) => {
                self.error("function declaration not allowed inside a function", func.name.span);
            }
            StmtKind::Expr(e) => self.expr_stmt(e),
            StmtKind::Assign { lhs, op, rhs } => match op {
                AssignOp::Define => self.short_var_decl(lhs, rhs, stmt.span),
                AssignOp::Assign => self.assign(lhs, rhs),
                AssignOp::Op(op) => self.op_assign(*op, &lhs[0], &rhs[0]),
            },
            StmtKind::IncDec { expr, inc } => {
                let x = self.value(expr);
                if !x.is_invalid() && !x.ty.is_numeric() {
                    let op = if *inc { "++" } else { "--" };
                    self.error(
                        format!("invalid operation: {}{} (non-numeric type {})", expr, op, x.ty),
                        stmt.span,
                    );
                }
                self.require_assignable(expr);
            }
            StmtKind::Go(call) | StmtKind::Defer(call) => {
                let keyword = if matches!(stmt.kind, StmtKind::Go(_)) { "go" } else { "defer" };
                self.expr(call);
                if let ExprKind::Call { func, .. } = &call.unparen().kind
                    && self.callee_is_conversion(func)
                {
                    self.error(format!("{} requires function call, not conversion", keyword), call.span);
                }
            }
            StmtKind::Return(results) => self.return_stmt(results, stmt.span),
            StmtKind::Break => {
                if self.func_ctx().is_none_or(|ctx| ctx.breakables == 0) {
                    self.error("break is not in a loop, switch, or select", stmt.span);
                }
            }
            StmtKind::Continue => {
                if self.func_ctx().is_none_or(|ctx| ctx.loops == 0) {
                    self.error("continue is not in a loop", stmt.span);
                }
            }
            StmtKind::Block(block) => self.block(block),
            StmtKind::If {
                init,
                cond,
                then,
                els,
            } => {
                self.open_scope();
                if let Some(init) = init {
                    self.stmt(init);
                }
                let c = self.value(cond);
                if !c.is_invalid() && !c.ty.is_boolean() {
                    self.error("non-boolean condition in if statement", cond.span);
                }
                self.block(then);
                if let Some(els) = els {
                    self.stmt(els);
                }
                self.close_scope();
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.open_scope();
                if let Some(init) = init {
                    self.stmt(init);
                }
                if let Some(cond) = cond {
                    let c = self.value(cond);
                    if !c.is_invalid() && !c.ty.is_boolean() {
                        self.error("non-boolean condition in for statement", cond.span);
                    }
                }
                if let Some(post) = post {
                    self.stmt(post);
                }
                self.loop_body(body, true);
                self.close_scope();
            }
            StmtKind::Range {
                key,
                value,
                define,
                expr,
                body,
            } => self.range_stmt(key.as_ref(), value.as_ref(), *define, expr, body),
            StmtKind::Switch { init, tag, clauses } => self.switch_stmt(init.as_deref(), tag.as_ref(), clauses),
            StmtKind::Empty => {}
        }
    }

    fn loop_body(&mut self, body: &BlockStmt, is_loop: bool) {
        if let Some(ctx) = self.func_ctx() {
            ctx.breakables += 1;
            if is_loop {
                ctx.loops += 1;
            }
        }
        self.block(body);
        if let Some(ctx) = self.func_ctx() {
            ctx.breakables -= 1;
            if is_loop {
                ctx.loops -= 1;
            }
        }
    }

    fn local_gen_decl(&mut self, gen_decl: &GenDecl) {
        for spec in &gen_decl.specs {
            match spec {
                Spec::Value(vs) => {
                    let types = self.value_spec_types(gen_decl.kind, vs);
                    let kind = if gen_decl.kind == GenKind::Const {
                        ObjectKind::Const
                    } else {
                        ObjectKind::Var
                    };
                    for (name, ty) in vs.names.iter().zip(types) {
                        self.declare_local(name, kind.clone(), ty);
                    }
                }
                Spec::Type(ts) => {
                    let named = NamedType::new(&ts.name.name, Some(self.pkg.clone()));
                    self.declare_local(&ts.name, ObjectKind::TypeName, Type::Named(named.clone()));
                    let ty = self.resolve_type(&ts.ty);
                    named.set_underlying(ty);
                }
                Spec::Import(import) => {
                    self.error("imports must appear before other declarations", import.span);
                }
            }
        }
    }

    /// Types of the names of a `var`/`const` spec
    fn value_spec_types(&mut self, kind: GenKind, spec: &ValueSpec) -> Vec<Type> {
        let declared = spec.ty.as_ref().map(|t| self.resolve_type(t));
        let count = spec.names.len();
        if spec.values.is_empty() {
            return vec![declared.unwrap_or_default(); count];
        }

        let Some(values) = self.rhs_operands(&spec.values, count) else {
            return vec![declared.unwrap_or_default(); count];
        };

        let mut types = Vec::with_capacity(count);
        for (op, e) in values {
            if kind == GenKind::Const && op.mode != Mode::Const && !op.is_invalid() {
                self.error(format!("{} ({}) is not constant", e, self.describe(e, &op)), e.span);
            }
            let ty = match &declared {
                Some(t) => {
                    self.assign_operand(&op, e, t, "variable declaration");
                    t.clone()
                }
                None if op.ty.is_untyped_nil() => {
                    self.error("use of untyped nil in variable declaration", e.span);
                    Type::Invalid
                }
                None if kind == GenKind::Const => op.ty.clone(),
                None => op.ty.default_type(),
            };
            types.push(ty);
        }
        types
    }

    /// Operands for `count` left-hand sides, spreading a multi-value call
    /// or a comma-ok map index. `None` after reporting a count mismatch.
    fn rhs_operands<'e>(&mut self, values: &'e [Expr], count: usize) -> Option<Vec<(Operand, &'e Expr)>> {
        if let [single] = values {
            let op = self.expr(single);
            if op.mode == Mode::Value
                && let Type::Tuple(types) = &op.ty
            {
                if types.len() == count {
                    return Some(types.iter().map(|t| (Operand::value(t.clone()), single)).collect());
                }
                self.error(
                    format!(
                        "assignment mismatch: {} but {} returns {}",
                        plural(count, "variable"),
                        single,
                        plural(types.len(), "value")
                    ),
                    single.span,
                );
                return None;
            }
            if op.mode == Mode::MapIndex && count == 2 {
                return Some(vec![
                    (Operand::value(op.ty.clone()), single),
                    (Operand::value(Type::Basic(BasicKind::UntypedBool)), single),
                ]);
            }
            if count == 1 {
                let op = self.single_value(single, op);
                return Some(vec![(op, single)]);
            }
            if !op.is_invalid() {
                self.error(
                    format!("assignment mismatch: {} but 1 value", plural(count, "variable")),
                    single.span,
                );
            }
            return None;
        }

        if values.len() == count {
            return Some(values.iter().map(|e| (self.value(e), e)).collect());
        }

        for e in values {
            self.expr(e);
        }
        let span = match (values.first(), values.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => SourceSpan::default(),
        };
        self.error(
            format!(
                "assignment mismatch: {} but {}",
                plural(count, "variable"),
                plural(values.len(), "value")
            ),
            span,
        );
        None
    }

    fn short_var_decl(&mut self, lhs: &[Expr], rhs: &[Expr], span: SourceSpan) {
        let values = self.rhs_operands(rhs, lhs.len());
        let mut fresh = 0;
        let mut seen = HashSet::new();
        let mut to_declare = Vec::new();

        for (i, l) in lhs.iter().enumerate() {
            let ExprKind::Ident(ident) = &l.kind else {
                self.error(format!("non-name {} on left side of :=", l), l.span);
                continue;
            };
            let value = values.as_ref().map(|v| v[i].clone());
            if ident.is_blank() {
                continue;
            }
            if !seen.insert(ident.name.clone()) {
                self.error(format!("{} repeated on left side of :=", ident.name), ident.span);
                continue;
            }

            let existing = self
                .scopes
                .last()
                .and_then(|local| local.scope.lookup(&ident.name))
                .cloned();
            match existing {
                Some(obj) => {
                    self.info.uses.insert(ident.id, obj.clone());
                    if let Some((op, e)) = value {
                        self.assign_operand(&op, e, &obj.ty(), "assignment");
                    }
                }
                None => {
                    fresh += 1;
                    let ty = match value {
                        Some((op, e)) if op.ty.is_untyped_nil() => {
                            self.error("use of untyped nil in assignment", e.span);
                            Type::Invalid
                        }
                        Some((op, _)) => op.ty.default_type(),
                        None => Type::Invalid,
                    };
                    to_declare.push((ident, ty));
                }
            }
        }

        if fresh == 0 {
            self.error("no new variables on left side of :=", span);
        }
        for (ident, ty) in to_declare {
            self.declare_local(ident, ObjectKind::Var, ty);
        }
    }

    fn assign(&mut self, lhs: &[Expr], rhs: &[Expr]) {
        let values = self.rhs_operands(rhs, lhs.len());
        for (i, l) in lhs.iter().enumerate() {
            let target = self.lhs_target(l);
            let Some((op, e)) = values.as_ref().map(|v| &v[i]) else { continue };
            match target {
                None if op.ty.is_untyped_nil() => self.error("use of untyped nil in assignment", e.span),
                None => {}
                Some(ty) => self.assign_operand(op, e, &ty, "assignment"),
            }
        }
    }

    fn op_assign(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) {
        let x = self.value(lhs);
        let y = self.value(rhs);
        let result = self.binary_operands(op, lhs, rhs, x.clone(), y);
        self.require_assignable(lhs);
        if !result.is_invalid() && !x.is_invalid() && !assignable(&result.ty, &x.ty) {
            self.error(
                format!("cannot use {} {} {} (value of type {}) as {} value in assignment", lhs, op, rhs, result.ty, x.ty),
                lhs.span.merge(rhs.span),
            );
        }
    }

    /// Type of an assignment target; `None` for the blank identifier
    fn lhs_target(&mut self, l: &Expr) -> Option<Type> {
        match &l.unparen().kind {
            ExprKind::Ident(ident) if ident.is_blank() => None,
            ExprKind::Ident(ident) => match self.lookup(&ident.name) {
                None => {
                    self.error(format!("undefined: {}", ident.name), ident.span);
                    Some(Type::Invalid)
                }
                Some(obj) => {
                    self.info.uses.insert(ident.id, obj.clone());
                    self.info.types.insert(l.id, obj.ty());
                    if matches!(obj.kind, ObjectKind::Var) {
                        Some(obj.ty())
                    } else {
                        self.error(
                            format!("cannot assign to {} (neither addressable nor a map index expression)", l),
                            l.span,
                        );
                        Some(Type::Invalid)
                    }
                }
            },
            _ => {
                let op = self.value(l);
                self.require_assignable(l);
                Some(op.ty)
            }
        }
    }

    /// Report targets that cannot be assigned to
    fn require_assignable(&mut self, l: &Expr) {
        let ok = match &l.unparen().kind {
            ExprKind::Ident(ident) => self
                .info
                .uses
                .get(&ident.id)
                .is_none_or(|obj| matches!(obj.kind, ObjectKind::Var)),
            ExprKind::Selector { sel, .. } => self
                .info
                .uses
                .get(&sel.id)
                .is_none_or(|obj| matches!(obj.kind, ObjectKind::Var | ObjectKind::Field)),
            ExprKind::Index { expr, .. } => !self.info.types.get(&expr.id).is_some_and(Type::is_string),
            ExprKind::Star(_) => true,
            _ => false,
        };
        if !ok {
            self.error(
                format!("cannot assign to {} (neither addressable nor a map index expression)", l),
                l.span,
            );
        }
    }

    fn return_stmt(&mut self, results: &[Expr], span: SourceSpan) {
        let Some(ctx) = self.funcs.last() else { return };
        let want = ctx.results.clone();
        let named = ctx.named_results;

        if results.is_empty() {
            if !want.is_empty() && !named {
                self.error(format!("not enough return values\n\thave ()\n\twant {}", Type::Tuple(want)), span);
            }
            return;
        }

        let mut operands: Vec<(Operand, &Expr)> = Vec::new();
        if let [single] = results
            && want.len() > 1
        {
            let op = self.expr(single);
            match &op.ty {
                Type::Tuple(types) if op.mode == Mode::Value => {
                    operands.extend(types.iter().map(|t| (Operand::value(t.clone()), single)));
                }
                _ => operands.push((self.single_value(single, op), single)),
            }
        } else {
            operands.extend(results.iter().map(|e| (self.value(e), e)));
        }

        if operands.len() != want.len() {
            let have = Type::Tuple(operands.iter().map(|(op, _)| op.ty.clone()).collect());
            let msg = if operands.len() > want.len() {
                "too many return values"
            } else {
                "not enough return values"
            };
            self.error(format!("{}\n\thave {}\n\twant {}", msg, have, Type::Tuple(want)), span);
            return;
        }
        for ((op, e), ty) in operands.iter().zip(&want) {
            self.assign_operand(op, e, ty, "return statement");
        }
    }

    fn range_stmt(&mut self, key: Option<&Expr>, value: Option<&Expr>, define: bool, expr: &Expr, body: &BlockStmt) {
        self.open_scope();
        let x = self.value(expr);
        let int = Type::Basic(BasicKind::Int);
        let (key_ty, value_ty) = match x.ty.underlying() {
            _ if x.is_invalid() => (Type::Invalid, Some(Type::Invalid)),
            Type::Slice(elem) => (int, Some(*elem)),
            Type::Map(k, v) => (*k, Some(*v)),
            Type::Basic(kind) if kind.is_string() => (int, Some(Type::Basic(BasicKind::Rune))),
            Type::Basic(kind) if kind.is_integer() => (x.ty.default_type(), None),
            _ => {
                self.error(format!("cannot range over {} ({})", expr, self.describe(expr, &x)), expr.span);
                (Type::Invalid, Some(Type::Invalid))
            }
        };
        if value.is_some() && value_ty.is_none() {
            self.error(format!("range over {} permits only one iteration variable", expr), expr.span);
        }

        let vars = [(key, Some(key_ty)), (value, value_ty)];
        if define {
            let mut declared = Vec::new();
            for (e, ty) in vars {
                let Some(e) = e else { continue };
                match &e.kind {
                    ExprKind::Ident(ident) => declared.push((ident, ty.unwrap_or_default())),
                    _ => self.error(format!("non-name {} on left side of :=", e), e.span),
                }
            }
            for (ident, ty) in declared {
                self.declare_local(ident, ObjectKind::Var, ty);
            }
        } else {
            for (e, ty) in vars {
                let Some(e) = e else { continue };
                if let (Some(target), Some(ty)) = (self.lhs_target(e), ty)
                    && !assignable(&ty, &target)
                {
                    self.error(
                        format!("cannot use {} (value of type {}) as {} value in range clause", e, ty, target),
                        e.span,
                    );
                }
            }
        }

        self.loop_body(body, true);
        self.close_scope();
    }

    fn switch_stmt(&mut self, init: Option<&Stmt>, tag: Option<&Expr>, clauses: &[CaseClause]) {
        self.open_scope();
        if let Some(init) = init {
            self.stmt(init);
        }
        let tag_op = tag.map(|t| {
            let op = self.value(t);
            Operand {
                ty: op.ty.default_type(),
                ..op
            }
        });

        if let Some(ctx) = self.func_ctx() {
            ctx.breakables += 1;
        }
        for clause in clauses {
            for e in &clause.exprs {
                let v = self.value(e);
                if v.is_invalid() {
                    continue;
                }
                match (&tag_op, tag) {
                    (Some(t), Some(tag)) if !t.is_invalid() => {
                        if !assignable(&v.ty, &t.ty) && !assignable(&t.ty, &v.ty) {
                            self.error(
                                format!("invalid case {} in switch on {} (mismatched types {} and {})", e, tag, v.ty, t.ty),
                                e.span,
                            );
                        }
                    }
                    (None, _) if !v.ty.is_boolean() => {
                        self.error(
                            format!("invalid case {} in switch (mismatched types {} and bool)", e, v.ty),
                            e.span,
                        );
                    }
                    _ => {}
                }
            }
            self.open_scope();
            self.stmt_list(&clause.body);
            self.close_scope();
        }
        if let Some(ctx) = self.func_ctx() {
            ctx.breakables -= 1;
        }
        self.close_scope();
    }

    fn expr_stmt(&mut self, e: &Expr) {
        let op = self.expr(e);
        if op.mode == Mode::Invalid {
            return;
        }
        let used = match &e.unparen().kind {
            ExprKind::Call { func, .. } => {
                if self.callee_is_conversion(func) {
                    false
                } else {
                    !matches!(
                        self.callee_builtin(func),
                        Some(Builtin::Append | Builtin::Cap | Builtin::Len | Builtin::Make | Builtin::New)
                    )
                }
            }
            _ => false,
        };
        if !used {
            self.error(format!("{} ({}) is not used", e, self.describe(e, &op)), e.span);
        }
    }

    fn callee_object(&self, func: &Expr) -> Option<&ObjectRef> {
        match &func.unparen().kind {
            ExprKind::Ident(ident) => self.info.uses.get(&ident.id),
            ExprKind::Selector { sel, .. } => self.info.uses.get(&sel.id),
            _ => None,
        }
    }

    fn callee_builtin(&self, func: &Expr) -> Option<Builtin> {
        match self.callee_object(func).map(|obj| &obj.kind) {
            Some(ObjectKind::Builtin(b)) => Some(*b),
            _ => None,
        }
    }

    fn callee_is_conversion(&self, func: &Expr) -> bool {
        match &func.unparen().kind {
            ExprKind::Ident(_) | ExprKind::Selector { .. } => self
                .callee_object(func)
                .is_some_and(|obj| matches!(obj.kind, ObjectKind::TypeName)),
            ExprKind::SliceType(_)
            | ExprKind::MapType { .. }
            | ExprKind::FuncType(_)
            | ExprKind::InterfaceType(_)
            | ExprKind::StructType(_) => true,
            ExprKind::Star(inner) => self.callee_is_conversion(inner),
            _ => false,
        }
    }

    // ==================== Expressions ====================

    fn expr(&mut self, e: &Expr) -> Operand {
        self.expr_with_hint(e, None)
    }

    /// Check an expression; `hint` supplies the type of an elided composite literal
    fn expr_with_hint(&mut self, e: &Expr, hint: Option<&Type>) -> Operand {
        let op = self.expr_kind(e, hint);
        match op.mode {
            Mode::Invalid | Mode::Package | Mode::Builtin(_) => {}
            _ => {
                self.info.types.insert(e.id, op.ty.clone());
            }
        }
        op
    }

    /// Check an expression that must produce exactly one value
    fn value(&mut self, e: &Expr) -> Operand {
        let op = self.expr(e);
        self.single_value(e, op)
    }

    fn single_value(&mut self, e: &Expr, op: Operand) -> Operand {
        match op.mode {
            Mode::Invalid | Mode::Package => Operand::invalid(),
            Mode::NoValue => {
                self.error(format!("{} (no value) used as value", e), e.span);
                Operand::invalid()
            }
            Mode::TypeExpr => {
                self.error(format!("{} (type) is not an expression", e), e.span);
                Operand::invalid()
            }
            Mode::Builtin(_) => {
                self.error(format!("{} (built-in) must be called", e), e.span);
                Operand::invalid()
            }
            _ if matches!(op.ty, Type::Tuple(_)) => {
                self.error(
                    format!("multiple-value {} (value of type {}) in single-value context", e, op.ty),
                    e.span,
                );
                Operand::invalid()
            }
            Mode::MapIndex => Operand::value(op.ty),
            _ => op,
        }
    }

    fn expr_kind(&mut self, e: &Expr, hint: Option<&Type>) -> Operand {
        match &e.kind {
            ExprKind::Ident(ident) => self.ident(ident),
            ExprKind::BasicLit(lit) => {
                let kind = match lit.kind {
                    LitKind::Int => BasicKind::UntypedInt,
                    LitKind::Float => BasicKind::UntypedFloat,
                    LitKind::Char => BasicKind::UntypedRune,
                    LitKind::String => BasicKind::UntypedString,
                };
                Operand::constant(Type::Basic(kind))
            }
            ExprKind::CompositeLit { ty, elts } => self.composite_lit(e, ty.as_deref(), elts, hint),
            ExprKind::FuncLit { ty, body } => {
                let sig = self.resolve_signature(ty, None);
                self.check_func_body(&sig, ty, None, body);
                Operand::value(Type::signature(sig))
            }
            ExprKind::Paren(inner) => self.expr_with_hint(inner, hint),
            ExprKind::Selector { expr, sel } => self.selector(expr, sel),
            ExprKind::Index { expr, index } => self.index(expr, index),
            ExprKind::Slice { expr, low, high } => {
                let x = self.value(expr);
                for bound in [low, high].into_iter().flatten() {
                    self.integer_index(bound);
                }
                if x.is_invalid() {
                    return Operand::invalid();
                }
                match x.ty.underlying() {
                    Type::Slice(_) => Operand::value(x.ty),
                    Type::Basic(kind) if kind.is_string() => Operand::value(x.ty.default_type()),
                    _ => {
                        self.error(format!("cannot slice {} ({})", expr, self.describe(expr, &x)), e.span);
                        Operand::invalid()
                    }
                }
            }
            ExprKind::Call { func, args, ellipsis } => self.call(e, func, args, *ellipsis),
            ExprKind::Star(inner) => {
                let x = self.expr(inner);
                match x.mode {
                    Mode::Invalid => Operand::invalid(),
                    Mode::TypeExpr => Operand::type_expr(Type::pointer(x.ty)),
                    _ => {
                        let x = self.single_value(inner, x);
                        match x.ty.underlying() {
                            _ if x.is_invalid() => Operand::invalid(),
                            Type::Pointer(elem) => Operand::value(*elem),
                            _ => {
                                self.error(
                                    format!("invalid operation: cannot indirect {} ({})", inner, self.describe(inner, &x)),
                                    e.span,
                                );
                                Operand::invalid()
                            }
                        }
                    }
                }
            }
            ExprKind::Unary { op, expr } => self.unary(e, *op, expr, hint),
            ExprKind::Binary { op, left, right } => {
                let x = self.value(left);
                let y = self.value(right);
                self.binary_operands(*op, left, right, x, y)
            }
            ExprKind::KeyValue { .. } => {
                self.error("unexpected key:value expression", e.span);
                Operand::invalid()
            }
            ExprKind::SliceType(_)
            | ExprKind::MapType { .. }
            | ExprKind::StructType(_)
            | ExprKind::FuncType(_)
            | ExprKind::InterfaceType(_) => Operand::type_expr(self.resolve_type(e)),
            ExprKind::Ellipsis(_) => {
                self.error("invalid use of ...", e.span);
                Operand::invalid()
            }
        }
    }

    fn ident(&mut self, ident: &Ident) -> Operand {
        if ident.is_blank() {
            self.error("cannot use _ as value", ident.span);
            return Operand::invalid();
        }
        let Some(obj) = self.lookup(&ident.name) else {
            self.error(format!("undefined: {}", ident.name), ident.span);
            return Operand::invalid();
        };
        self.info.uses.insert(ident.id, obj.clone());
        let op = object_operand(&obj);
        if op.mode == Mode::Package {
            self.error(format!("use of package {} without selector", ident.name), ident.span);
            return Operand::invalid();
        }
        op
    }

    fn selector(&mut self, x: &Expr, sel: &Ident) -> Operand {
        if let Some(imported) = self.package_of(x) {
            return match self.member(&imported, x, sel) {
                Some(obj) => object_operand(&obj),
                None => Operand::invalid(),
            };
        }

        let base = self.expr(x);
        let base = match base.mode {
            Mode::TypeExpr => {
                self.error(format!("method expression {}.{} is not supported", x, sel.name), sel.span);
                return Operand::invalid();
            }
            _ => self.single_value(x, base),
        };
        if base.is_invalid() {
            return Operand::invalid();
        }

        let Some(obj) = lookup_field_or_method(&base.ty, &sel.name) else {
            self.error(
                format!("{}.{} undefined (type {} has no field or method {})", x, sel.name, base.ty, sel.name),
                sel.span,
            );
            return Operand::invalid();
        };
        let foreign = obj
            .pkg()
            .is_some_and(|p| !Rc::ptr_eq(p, &self.pkg) && !p.is_session());
        if foreign && !obj.is_exported() {
            self.error(
                format!("{}.{} undefined (cannot refer to unexported field or method {})", x, sel.name, sel.name),
                sel.span,
            );
        }
        self.info.uses.insert(sel.id, obj.clone());
        match obj.kind {
            ObjectKind::Func => match obj.ty().as_signature() {
                Some(sig) => Operand::value(Type::signature(sig.without_recv())),
                None => Operand::invalid(),
            },
            _ => {
                obj.mark_used();
                Operand::value(obj.ty())
            }
        }
    }

    fn index(&mut self, x: &Expr, index: &Expr) -> Operand {
        let base = self.value(x);
        if base.is_invalid() {
            self.expr(index);
            return Operand::invalid();
        }
        match base.ty.underlying() {
            Type::Slice(elem) => {
                self.integer_index(index);
                Operand::value(*elem)
            }
            Type::Basic(kind) if kind.is_string() => {
                self.integer_index(index);
                Operand::value(Type::Basic(BasicKind::Byte))
            }
            Type::Map(key, value) => {
                let k = self.value(index);
                self.assign_operand(&k, index, &key, "map index");
                Operand {
                    mode: Mode::MapIndex,
                    ty: *value,
                }
            }
            _ => {
                self.expr(index);
                self.error(
                    format!("invalid operation: cannot index {} ({})", x, self.describe(x, &base)),
                    x.span,
                );
                Operand::invalid()
            }
        }
    }

    fn integer_index(&mut self, index: &Expr) {
        let i = self.value(index);
        if !i.is_invalid() && !i.ty.is_integer() {
            self.error(
                format!("invalid argument: index {} ({}) must be integer", index, self.describe(index, &i)),
                index.span,
            );
        }
    }

    fn composite_lit(&mut self, e: &Expr, ty: Option<&Expr>, elts: &[Expr], hint: Option<&Type>) -> Operand {
        let (lit_ty, base) = match (ty, hint) {
            (Some(ty), _) => {
                let t = self.resolve_type(ty);
                (t.clone(), t)
            }
            (None, Some(hint)) => match hint.underlying() {
                Type::Pointer(elem) => (hint.clone(), *elem),
                _ => (hint.clone(), hint.clone()),
            },
            (None, None) => {
                self.error("invalid composite literal type: missing type", e.span);
                return Operand::invalid();
            }
        };

        match base.underlying() {
            Type::Invalid => {
                for elt in elts {
                    if let ExprKind::KeyValue { value, .. } = &elt.kind {
                        self.expr(value);
                    } else {
                        self.expr(elt);
                    }
                }
            }
            Type::Struct(st) => self.struct_lit(&base, &st, elts, e.span),
            Type::Slice(elem) => {
                let elem = *elem;
                for elt in elts {
                    let value = match &elt.kind {
                        ExprKind::KeyValue { key, value } => {
                            let k = self.value(key);
                            if !k.is_invalid() && (k.mode != Mode::Const || !k.ty.is_integer()) {
                                self.error(format!("index {} must be integer constant", key), key.span);
                            }
                            value.as_ref()
                        }
                        _ => elt,
                    };
                    let v = self.expr_with_hint(value, Some(&elem));
                    let v = self.single_value(value, v);
                    self.assign_operand(&v, value, &elem, "slice literal");
                }
            }
            Type::Map(key_ty, value_ty) => {
                let (key_ty, value_ty) = (*key_ty, *value_ty);
                for elt in elts {
                    let ExprKind::KeyValue { key, value } = &elt.kind else {
                        self.error("missing key in map literal", elt.span);
                        self.expr(elt);
                        continue;
                    };
                    let k = self.expr_with_hint(key, Some(&key_ty));
                    let k = self.single_value(key, k);
                    self.assign_operand(&k, key, &key_ty, "map literal");
                    let v = self.expr_with_hint(value, Some(&value_ty));
                    let v = self.single_value(value, v);
                    self.assign_operand(&v, value, &value_ty, "map literal");
                }
            }
            other => {
                self.error(format!("invalid composite literal type {}", other), e.span);
                return Operand::invalid();
            }
        }
        Operand::value(lit_ty)
    }

    fn struct_lit(&mut self, ty: &Type, st: &StructType, elts: &[Expr], span: SourceSpan) {
        if elts.is_empty() {
            return;
        }
        let keyed = elts.iter().filter(|e| matches!(e.kind, ExprKind::KeyValue { .. })).count();
        if keyed != 0 && keyed != elts.len() {
            self.error("mixture of field:value and value elements in struct literal", span);
            return;
        }

        if keyed == 0 {
            for (elt, field) in elts.iter().zip(&st.fields) {
                let field_ty = field.ty();
                let v = self.expr_with_hint(elt, Some(&field_ty));
                let v = self.single_value(elt, v);
                self.assign_operand(&v, elt, &field_ty, "struct literal");
            }
            if elts.len() < st.fields.len() {
                self.error(format!("too few values in struct literal of type {}", ty), span);
            } else if elts.len() > st.fields.len() {
                self.error(format!("too many values in struct literal of type {}", ty), span);
            }
            return;
        }

        let mut seen = HashSet::new();
        for elt in elts {
            let ExprKind::KeyValue { key, value } = &elt.kind else { continue };
            let ExprKind::Ident(name) = &key.kind else {
                self.error(format!("invalid field name {} in struct literal", key), key.span);
                continue;
            };
            let Some(field) = st.fields.iter().find(|f| f.name == name.name).cloned() else {
                self.error(format!("unknown field {} in struct literal of type {}", name.name, ty), name.span);
                self.expr(value);
                continue;
            };
            if !seen.insert(name.name.clone()) {
                self.error(format!("duplicate field name {} in struct literal", name.name), name.span);
            }
            self.info.uses.insert(name.id, field.clone());
            let field_ty = field.ty();
            let v = self.expr_with_hint(value, Some(&field_ty));
            let v = self.single_value(value, v);
            self.assign_operand(&v, value, &field_ty, "struct literal");
        }
    }

    fn unary(&mut self, e: &Expr, op: UnaryOp, inner: &Expr, hint: Option<&Type>) -> Operand {
        if op == UnaryOp::Addr {
            // `&T{}` may elide `T` inside a literal of pointers
            let inner_hint = hint.and_then(|h| match h.underlying() {
                Type::Pointer(elem) => Some(*elem),
                _ => None,
            });
            let x = self.expr_with_hint(inner, inner_hint.as_ref());
            let x = self.single_value(inner, x);
            if x.is_invalid() {
                return Operand::invalid();
            }
            let addressable = match &inner.unparen().kind {
                ExprKind::CompositeLit { .. } | ExprKind::Star(_) => true,
                ExprKind::Ident(ident) => self
                    .info
                    .uses
                    .get(&ident.id)
                    .is_some_and(|obj| matches!(obj.kind, ObjectKind::Var)),
                ExprKind::Selector { sel, .. } => self
                    .info
                    .uses
                    .get(&sel.id)
                    .is_some_and(|obj| matches!(obj.kind, ObjectKind::Var | ObjectKind::Field)),
                ExprKind::Index { expr, .. } => !matches!(
                    self.info.types.get(&expr.id).map(Type::underlying),
                    Some(Type::Map(..)) | Some(Type::Basic(_))
                ),
                _ => false,
            };
            if !addressable {
                self.error(format!("invalid operation: cannot take address of {}", inner), e.span);
                return Operand::invalid();
            }
            return Operand::value(Type::pointer(x.ty));
        }

        let x = self.value(inner);
        if x.is_invalid() {
            return Operand::invalid();
        }
        let ok = match op {
            UnaryOp::Plus | UnaryOp::Neg => x.ty.is_numeric(),
            UnaryOp::Not => x.ty.is_boolean(),
            UnaryOp::BitNot => x.ty.is_integer(),
            UnaryOp::Addr => true,
        };
        if !ok {
            self.error(
                format!("invalid operation: operator {} not defined on {} ({})", op, inner, self.describe(inner, &x)),
                e.span,
            );
            return Operand::invalid();
        }
        x
    }

    fn binary_operands(&mut self, op: BinaryOp, left: &Expr, right: &Expr, x: Operand, y: Operand) -> Operand {
        if x.is_invalid() || y.is_invalid() {
            return Operand::invalid();
        }
        let span = left.span.merge(right.span);
        let mode = if x.mode == Mode::Const && y.mode == Mode::Const {
            Mode::Const
        } else {
            Mode::Value
        };

        if op.is_shift() {
            if !y.ty.is_integer() {
                self.error(format!("invalid operation: shift count {} must be integer", right), right.span);
                return Operand::invalid();
            }
            if !x.ty.is_integer() {
                self.error(format!("invalid operation: shifted operand {} must be integer", left), left.span);
                return Operand::invalid();
            }
            return Operand { mode, ty: x.ty };
        }

        if op.is_comparison() {
            if !assignable(&x.ty, &y.ty) && !assignable(&y.ty, &x.ty) {
                self.error(
                    format!("invalid operation: {} {} {} (mismatched types {} and {})", left, op, right, x.ty, y.ty),
                    span,
                );
                return Operand::invalid();
            }
            let ordered = matches!(op, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge);
            if ordered && !(x.ty.is_numeric() || x.ty.is_string()) {
                self.error(
                    format!("invalid operation: {} {} {} (operator {} not defined on {})", left, op, right, op, x.ty),
                    span,
                );
                return Operand::invalid();
            }
            return Operand {
                mode,
                ty: Type::Basic(BasicKind::UntypedBool),
            };
        }

        let Some(ty) = unify(&x.ty, &y.ty) else {
            self.error(
                format!("invalid operation: {} {} {} (mismatched types {} and {})", left, op, right, x.ty, y.ty),
                span,
            );
            return Operand::invalid();
        };

        let ok = match op {
            BinaryOp::And | BinaryOp::Or => ty.is_boolean(),
            BinaryOp::Add => ty.is_numeric() || ty.is_string(),
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => ty.is_numeric(),
            _ => ty.is_integer(),
        };
        if !ok {
            self.error(
                format!("invalid operation: operator {} not defined on {} ({})", op, left, self.describe(left, &x)),
                span,
            );
            return Operand::invalid();
        }
        Operand { mode, ty }
    }

    fn call(&mut self, e: &Expr, func: &Expr, args: &[Expr], ellipsis: bool) -> Operand {
        let f = self.expr(func);
        match f.mode {
            Mode::Invalid => {
                for arg in args {
                    self.expr(arg);
                }
                return Operand::invalid();
            }
            Mode::TypeExpr => return self.conversion(e, &f.ty, args),
            Mode::Builtin(builtin) => return self.builtin(e, builtin, args, ellipsis),
            _ => {}
        }

        let f = self.single_value(func, f);
        let Some(sig) = f.ty.as_signature() else {
            if !f.is_invalid() {
                self.error(
                    format!("invalid operation: cannot call non-function {} ({})", func, self.describe(func, &f)),
                    e.span,
                );
            }
            for arg in args {
                self.expr(arg);
            }
            return Operand::invalid();
        };

        self.call_args(func, &sig, args, ellipsis, e.span);
        match sig.results.len() {
            0 => Operand {
                mode: Mode::NoValue,
                ty: Type::Tuple(Vec::new()),
            },
            _ => Operand::value(sig.result_type()),
        }
    }

    fn call_args(&mut self, func: &Expr, sig: &Signature, args: &[Expr], ellipsis: bool, span: SourceSpan) {
        let mut operands: Vec<(Operand, &Expr)> = Vec::new();
        if let [single] = args
            && !ellipsis
        {
            let op = self.expr_with_hint(single, sig.params.first());
            match &op.ty {
                Type::Tuple(types) if op.mode == Mode::Value => {
                    operands.extend(types.iter().map(|t| (Operand::value(t.clone()), single)));
                }
                _ => operands.push((self.single_value(single, op), single)),
            }
        } else {
            for (i, arg) in args.iter().enumerate() {
                let op = self.expr_with_hint(arg, sig.params.get(i));
                operands.push((self.single_value(arg, op), arg));
            }
        }

        let context = format!("argument to {}", func);
        let n = sig.params.len();
        if ellipsis && !sig.variadic {
            self.error(format!("have (...) cannot use ... in call to non-variadic {}", func), span);
            return;
        }

        if sig.variadic && !ellipsis {
            if operands.len() + 1 < n {
                self.error(format!("not enough arguments in call to {}", func), span);
                return;
            }
            let elem = match sig.params.last() {
                Some(Type::Slice(elem)) => elem.as_ref().clone(),
                _ => Type::Invalid,
            };
            for (i, (op, e)) in operands.iter().enumerate() {
                let target = if i + 1 < n { sig.params[i].clone() } else { elem.clone() };
                self.assign_operand(op, e, &target, &context);
            }
            return;
        }

        if operands.len() != n {
            let msg = if operands.len() < n { "not enough" } else { "too many" };
            self.error(format!("{} arguments in call to {}", msg, func), span);
            return;
        }
        for ((op, e), target) in operands.iter().zip(&sig.params) {
            self.assign_operand(op, e, target, &context);
        }
    }

    fn conversion(&mut self, e: &Expr, target: &Type, args: &[Expr]) -> Operand {
        let [arg] = args else {
            let msg = if args.is_empty() { "missing argument" } else { "too many arguments" };
            self.error(format!("{} in conversion to {}", msg, target), e.span);
            for arg in args {
                self.expr(arg);
            }
            return Operand::invalid();
        };
        let x = self.expr_with_hint(arg, Some(target));
        let x = self.single_value(arg, x);
        if x.is_invalid() {
            return Operand::value(target.clone());
        }
        if !convertible(&x.ty, target) {
            self.error(
                format!("cannot convert {} ({}) to type {}", arg, self.describe(arg, &x), target),
                e.span,
            );
            return Operand::invalid();
        }
        let mode = if x.mode == Mode::Const && matches!(target.underlying(), Type::Basic(_)) {
            Mode::Const
        } else {
            Mode::Value
        };
        Operand {
            mode,
            ty: target.clone(),
        }
    }

    fn builtin(&mut self, e: &Expr, builtin: Builtin, args: &[Expr], ellipsis: bool) -> Operand {
        let name = builtin.name();
        let (min, max) = match builtin {
            Builtin::Len | Builtin::Cap | Builtin::New | Builtin::Panic => (1, Some(1)),
            Builtin::Copy | Builtin::Delete => (2, Some(2)),
            Builtin::Append | Builtin::Make => (1, None),
            Builtin::Print | Builtin::Println => (0, None),
            Builtin::Recover => (0, Some(0)),
        };
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            let msg = if args.len() < min { "not enough" } else { "too many" };
            self.error(format!("{} arguments in call to {}", msg, name), e.span);
            for arg in args {
                self.expr(arg);
            }
            return Operand::invalid();
        }
        if ellipsis && builtin != Builtin::Append {
            self.error(format!("invalid operation: invalid use of ... with built-in {}", name), e.span);
            return Operand::invalid();
        }

        let no_value = Operand {
            mode: Mode::NoValue,
            ty: Type::Tuple(Vec::new()),
        };
        let int = Type::Basic(BasicKind::Int);

        match builtin {
            Builtin::Len | Builtin::Cap => {
                let x = self.value(&args[0]);
                if x.is_invalid() {
                    return Operand::value(int);
                }
                let ok = match x.ty.underlying() {
                    Type::Slice(_) => true,
                    Type::Map(..) => builtin == Builtin::Len,
                    _ => builtin == Builtin::Len && x.ty.is_string(),
                };
                if !ok {
                    self.error(
                        format!("invalid argument: {} ({}) for built-in {}", args[0], self.describe(&args[0], &x), name),
                        args[0].span,
                    );
                }
                if x.mode == Mode::Const {
                    Operand::constant(int)
                } else {
                    Operand::value(int)
                }
            }
            Builtin::Append => {
                let s = self.value(&args[0]);
                if s.is_invalid() {
                    for arg in &args[1..] {
                        self.expr(arg);
                    }
                    return Operand::invalid();
                }
                let Type::Slice(elem) = s.ty.underlying() else {
                    let msg = if s.ty.is_untyped_nil() {
                        "first argument to append must be a typed slice; have untyped nil".to_string()
                    } else {
                        format!("invalid argument: {} ({}) is not a slice", args[0], self.describe(&args[0], &s))
                    };
                    self.error(msg, args[0].span);
                    return Operand::invalid();
                };
                if ellipsis {
                    if args.len() != 2 {
                        self.error("can only use ... with final argument in list", e.span);
                        return Operand::invalid();
                    }
                    let rest = self.value(&args[1]);
                    let bytes_from_string = rest.ty.is_string() && elem.basic_kind().is_some_and(BasicKind::is_byte);
                    if !bytes_from_string {
                        self.assign_operand(&rest, &args[1], &s.ty, "argument to append");
                    }
                } else {
                    for arg in &args[1..] {
                        let v = self.expr_with_hint(arg, Some(&*elem));
                        let v = self.single_value(arg, v);
                        self.assign_operand(&v, arg, &elem, "argument to append");
                    }
                }
                Operand::value(s.ty)
            }
            Builtin::Copy => {
                let dst = self.value(&args[0]);
                let src = self.value(&args[1]);
                if !dst.is_invalid() && !matches!(dst.ty.underlying(), Type::Slice(_)) {
                    self.error(format!("invalid argument: copy expects slice arguments; found {}", args[0]), e.span);
                } else if !src.is_invalid() && !matches!(src.ty.underlying(), Type::Slice(_)) && !src.ty.is_string() {
                    self.error(format!("invalid argument: copy expects slice arguments; found {}", args[1]), e.span);
                }
                Operand::value(int)
            }
            Builtin::Delete => {
                let m = self.value(&args[0]);
                match m.ty.underlying() {
                    _ if m.is_invalid() => {
                        self.expr(&args[1]);
                    }
                    Type::Map(key, _) => {
                        let k = self.value(&args[1]);
                        self.assign_operand(&k, &args[1], &key, "argument to delete");
                    }
                    _ => {
                        self.expr(&args[1]);
                        self.error(format!("invalid argument: {} is not a map", args[0]), args[0].span);
                    }
                }
                no_value
            }
            Builtin::Make => {
                let t = self.type_argument(&args[0]);
                for arg in &args[1..] {
                    self.integer_index(arg);
                }
                let (min, max) = match t.underlying() {
                    Type::Invalid => return Operand::invalid(),
                    Type::Slice(_) => (2, 3),
                    Type::Map(..) => (1, 2),
                    _ => {
                        self.error(
                            format!("invalid argument: cannot make {}; type must be slice or map", args[0]),
                            args[0].span,
                        );
                        return Operand::invalid();
                    }
                };
                if args.len() < min || args.len() > max {
                    self.error(
                        format!("invalid operation: {} expects {} or {} arguments; found {}", e, min, max, args.len()),
                        e.span,
                    );
                }
                Operand::value(t)
            }
            Builtin::New => {
                let t = self.type_argument(&args[0]);
                if t.is_invalid() {
                    return Operand::invalid();
                }
                Operand::value(Type::pointer(t))
            }
            Builtin::Panic => {
                let x = self.value(&args[0]);
                self.assign_operand(&x, &args[0], &Type::empty_interface(), "argument to panic");
                no_value
            }
            Builtin::Print | Builtin::Println => {
                for arg in args {
                    let x = self.value(arg);
                    if x.ty.is_untyped_nil() {
                        self.error("use of untyped nil in argument to built-in print", arg.span);
                    }
                }
                no_value
            }
            Builtin::Recover => Operand::value(Type::empty_interface()),
        }
    }

    fn type_argument(&mut self, arg: &Expr) -> Type {
        let op = self.expr(arg);
        match op.mode {
            Mode::TypeExpr => op.ty,
            Mode::Invalid => Type::Invalid,
            _ => {
                self.error(format!("{} is not a type", arg), arg.span);
                Type::Invalid
            }
        }
    }

    /// Report an operand that cannot be assigned to `target`
    fn assign_operand(&mut self, op: &Operand, e: &Expr, target: &Type, context: &str) {
        if op.is_invalid() || target.is_invalid() || assignable(&op.ty, target) {
            return;
        }
        self.error(
            format!("cannot use {} ({}) as {} value in {}", e, self.describe(e, op), target, context),
            e.span,
        );
    }

    /// How an operand is named in diagnostics
    fn describe(&self, e: &Expr, op: &Operand) -> String {
        match op.mode {
            Mode::Const if op.ty.is_untyped() => format!("{} constant", op.ty),
            Mode::Const => format!("constant of type {}", op.ty),
            Mode::NoValue => "no value".to_string(),
            Mode::TypeExpr => "type".to_string(),
            Mode::Builtin(_) => "built-in".to_string(),
            _ if op.ty.is_untyped_nil() => "untyped nil".to_string(),
            _ => {
                let is_var = match &e.unparen().kind {
                    ExprKind::Ident(ident) => self
                        .info
                        .uses
                        .get(&ident.id)
                        .is_some_and(|obj| matches!(obj.kind, ObjectKind::Var)),
                    ExprKind::Selector { sel, .. } => self
                        .info
                        .uses
                        .get(&sel.id)
                        .is_some_and(|obj| matches!(obj.kind, ObjectKind::Var | ObjectKind::Field)),
                    _ => false,
                };
                if is_var {
                    format!("variable of type {}", op.ty)
                } else {
                    format!("value of type {}", op.ty)
                }
            }
        }
    }
}

fn object_operand(obj: &ObjectRef) -> Operand {
    match &obj.kind {
        ObjectKind::Var | ObjectKind::Field => {
            obj.mark_used();
            Operand::value(obj.ty())
        }
        ObjectKind::Const => Operand::constant(obj.ty()),
        ObjectKind::TypeName => Operand::type_expr(obj.ty()),
        ObjectKind::Func => Operand::value(obj.ty()),
        ObjectKind::PkgName(_) => Operand {
            mode: Mode::Package,
            ty: Type::Invalid,
        },
        ObjectKind::Builtin(builtin) => Operand {
            mode: Mode::Builtin(*builtin),
            ty: Type::Invalid,
        },
        ObjectKind::Nil => Operand::value(Type::Basic(BasicKind::UntypedNil)),
    }
}

/// Common type of the operands of an arithmetic operator
fn unify(x: &Type, y: &Type) -> Option<Type> {
    match (x, y) {
        (Type::Basic(a), Type::Basic(b)) if a.is_untyped() && b.is_untyped() => {
            if a.is_numeric() && b.is_numeric() {
                Some(Type::Basic(Type::larger_untyped(*a, *b)))
            } else if a == b {
                Some(x.clone())
            } else {
                None
            }
        }
        _ if x.is_untyped() => assignable(x, y).then(|| y.clone()),
        _ if y.is_untyped() => assignable(y, x).then(|| x.clone()),
        _ => identical(x, y).then(|| x.clone()),
    }
}

/// Whether `T(v)` is a valid conversion
fn convertible(v: &Type, t: &Type) -> bool {
    if assignable(v, t) || identical(&v.underlying(), &t.underlying()) {
        return true;
    }
    if v.is_numeric() && t.is_numeric() {
        return true;
    }
    let byte_or_rune_slice = |ty: &Type| match ty.underlying() {
        Type::Slice(elem) => elem
            .basic_kind()
            .is_some_and(|k| k.is_byte() || matches!(k, BasicKind::Rune | BasicKind::Int32)),
        _ => false,
    };
    if t.is_string() && (v.is_integer() || byte_or_rune_slice(v)) {
        return true;
    }
    if v.is_string() && byte_or_rune_slice(t) {
        return true;
    }
    match (v.underlying(), t.underlying()) {
        (Type::Pointer(a), Type::Pointer(b)) => identical(&a.underlying(), &b.underlying()),
        _ => false,
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

fn is_terminating_list(stmts: &[Stmt]) -> bool {
    stmts
        .iter()
        .rev()
        .find(|s| !matches!(s.kind, StmtKind::Empty))
        .is_some_and(is_terminating)
}

fn is_terminating(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::Expr(e) => matches!(
            &e.unparen().kind,
            ExprKind::Call { func, .. } if matches!(&func.kind, ExprKind::Ident(id) if id.name == "panic")
        ),
        StmtKind::Block(block) => is_terminating_list(&block.stmts),
        StmtKind::If {
            then, els: Some(els), ..
        } => is_terminating_list(&then.stmts) && is_terminating(els),
        StmtKind::For { cond: None, body, .. } => !has_break(&body.stmts),
        StmtKind::Switch { clauses, .. } => {
            clauses.iter().any(|c| c.exprs.is_empty())
                && clauses.iter().all(|c| is_terminating_list(&c.body) && !has_break(&c.body))
        }
        _ => false,
    }
}

/// A `break` that targets the enclosing statement
fn has_break(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|s| match &s.kind {
        StmtKind::Break => true,
        StmtKind::Block(block) => has_break(&block.stmts),
        StmtKind::If { then, els, .. } => {
            has_break(&then.stmts) || els.as_ref().is_some_and(|e| has_break(std::slice::from_ref(e.as_ref())))
        }
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::importer::StdImporter;
    use crate::parser::Parser;

    fn check(source: &str) -> (Info, Vec<LgoError>) {
        let file = Parser::new(source).parse_file().unwrap();
        let pkg = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        check_file(&pkg, &Scope::new(), &file, &StdImporter::new(), &CheckOptions::default())
    }

    fn messages(source: &str) -> Vec<String> {
        check(source).1.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_well_typed_file() {
        let errors = messages(
            r#"package p

import "fmt"

type point struct {
	x, y int
}

func (p *point) scale(k int) {
	p.x *= k
	p.y *= k
}

var origin = point{}

func main() {
	p := &point{x: 1, y: 2}
	p.scale(3)
	ps := []point{{1, 2}, {x: 3}}
	m := map[string][]int{"a": {1, 2}}
	if v, ok := m["a"]; ok {
		fmt.Println(len(v), ps, origin)
	}
	for i, c := range "héllo" {
		_ = i
		_ = c
	}
}
"#,
        );
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_package_values_in_any_order() {
        let (info, errors) = check("package p\n\nvar a = b + 1\n\nvar b = 2\n");
        assert!(errors.is_empty(), "{:?}", errors);
        let a = info.defs.values().find(|o| o.name == "a").unwrap();
        assert_eq!(a.ty().to_string(), "int");
    }

    #[test]
    fn test_reports_common_errors() {
        let errors = messages("package p\n\nfunc f() int {\n\tx := 1\n\ty = 2\n}\n");
        assert!(errors.iter().any(|e| e == "undefined: y"), "{:?}", errors);
        assert!(errors.iter().any(|e| e == "declared and not used: x"), "{:?}", errors);
        assert!(errors.iter().any(|e| e == "missing return"), "{:?}", errors);
    }

    #[test]
    fn test_assignment_mismatch() {
        let errors = messages("package p\n\nfunc two() (int, int) { return 1, 2 }\n\nfunc f() {\n\tx := two()\n\t_ = x\n}\n");
        assert_eq!(errors, vec!["assignment mismatch: 1 variable but two() returns 2 values"]);
    }

    #[test]
    fn test_cannot_use() {
        let errors = messages("package p\n\nvar s string = 1\n");
        assert_eq!(errors, vec!["cannot use 1 (untyped int constant) as string value in variable declaration"]);
    }

    #[test]
    fn test_call_result_types() {
        let source = "package p\n\nfunc none() {}\n\nfunc one() int { return 1 }\n\nfunc two() (int, string) { return 1, \"\" }\n\nfunc lgo_init() {\n\tnone()\n\tone()\n\ttwo()\n}\n";
        let file = Parser::new(source).parse_file().unwrap();
        let pkg = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let options = CheckOptions {
            ignore_func_bodies: true,
            keep_body: Some("lgo_init".to_string()),
        };
        let (info, errors) = check_file(&pkg, &Scope::new(), &file, &StdImporter::new(), &options);
        assert!(errors.is_empty(), "{:?}", errors);

        let Decl::Func(init) = &file.decls[3] else { panic!("expected lgo_init") };
        let types: Vec<String> = init
            .body
            .as_ref()
            .unwrap()
            .stmts
            .iter()
            .map(|s| match &s.kind {
                StmtKind::Expr(e) => info.type_of(e).unwrap().to_string(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(types, vec!["()", "int", "(int, string)"]);
    }

    #[test]
    fn test_ignored_bodies_are_not_checked() {
        let source = "package p\n\nfunc f() {\n\tundefinedName()\n}\n";
        let file = Parser::new(source).parse_file().unwrap();
        let pkg = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let options = CheckOptions {
            ignore_func_bodies: true,
            keep_body: None,
        };
        let (_, errors) = check_file(&pkg, &Scope::new(), &file, &StdImporter::new(), &options);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_outer_scope_and_usage() {
        let old = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let x = Object::new("x", ObjectKind::Var, Type::Basic(BasicKind::Int), Some(old.clone()));
        old.insert(x.clone());
        let mut outer = Scope::new();
        outer.insert(x.clone());

        let file = Parser::new("package p\n\nvar y = x * 2\n").parse_file().unwrap();
        let pkg = Package::new("lgo/exec/pkg1", "lgo_exec", true);
        let (info, errors) = check_file(&pkg, &outer, &file, &StdImporter::new(), &CheckOptions::default());
        assert!(errors.is_empty(), "{:?}", errors);
        assert!(info.uses.values().any(|o| Rc::ptr_eq(o, &x)));
    }

    #[test]
    fn test_import_usage_is_tracked() {
        let (info, errors) = check("package p\n\nimport \"fmt\"\nimport s \"strings\"\n\nvar v = s.ToUpper(\"x\")\n");
        assert!(errors.is_empty(), "{:?}", errors);
        let fmt = info.file_scope.lookup("fmt").unwrap();
        let strings = info.file_scope.lookup("s").unwrap();
        assert!(!fmt.used());
        assert!(strings.used());
    }

    #[test]
    fn test_break_outside_loop() {
        let errors = messages("package p\n\nfunc f() {\n\tbreak\n}\n");
        assert_eq!(errors, vec!["break is not in a loop, switch, or select"]);
    }
}
