//! Second rewrite: promote block locals to package variables
//!
//! Runs on the results of Pass A. Every variable the block defines at its
//! top level becomes a package-level `var` of the type Pass A inferred, so
//! later blocks can refer to it. The defining statements turn into plain
//! assignments in `lgo_init`.

use std::rc::Rc;

use tracing::debug;

use super::imports::{ImportManager, spelled_names};
use super::restructure::Restructured;
use super::rewrite::SessionRefs;
use super::{Config, INIT_FUNC_NAME};
use crate::analysis::{Info, ObjectRef, Package, Scope, Type};
use crate::parser::visit::walk_file;
use crate::parser::{
    AssignOp, BasicLit, Decl, Expr, ExprKind, Field, FuncType, GenDecl, GenKind, Ident, SourceFile, Spec, Stmt,
    StmtKind, UnaryOp, ValueSpec,
};

/// Hoist block locals and print the trailing expression
pub(crate) fn hoist(
    unit: &mut Restructured,
    pkg: &Rc<Package>,
    outer: &Scope,
    info: &Info,
    config: &Config,
    runctx: Option<&ObjectRef>,
    core: &Rc<Package>,
) {
    let reserved = spelled_names(&mut unit.file);
    let mut imports = ImportManager::new(pkg, &info.file_scope, outer, reserved.iter().map(String::as_str));
    walk_file(&mut SessionRefs::new(info, &config.olds, runctx, core, &mut imports), &mut unit.file);

    let last_expr = unit.last_expr;
    let wrapped = unit.wrapped;
    let consume_all = unit.consume_all;
    let stmts = std::mem::take(
        &mut unit
            .init_func_mut()
            .body
            .as_mut()
            .expect("lgo_init has a body")
            .stmts,
    );

    let mut body = Vec::new();
    let mut var_specs = Vec::new();
    let mut consts = Vec::new();
    for mut stmt in stmts {
        if Some(stmt.id) == consume_all {
            continue;
        }
        if Some(stmt.id) == last_expr {
            print_trailing(&mut stmt, wrapped, info, &mut imports, core);
        }
        match stmt.kind {
            StmtKind::Decl(Decl::Gen(gen_decl)) if gen_decl.kind == GenKind::Var => {
                let mut doc = gen_decl.doc;
                for spec in gen_decl.specs {
                    let Spec::Value(vs) = spec else { continue };
                    for name in &vs.names {
                        var_specs.extend(var_spec(name, info, &mut imports));
                    }
                    if vs.values.is_empty() {
                        continue;
                    }
                    let lhs = vs
                        .names
                        .into_iter()
                        .map(|n| Expr::synthetic(ExprKind::Ident(n)))
                        .collect();
                    let mut assign = Stmt::new(
                        StmtKind::Assign {
                            lhs,
                            op: AssignOp::Assign,
                            rhs: vs.values,
                        },
                        vs.span,
                    );
                    assign.doc = std::mem::take(&mut doc);
                    body.push(assign);
                }
            }
            StmtKind::Decl(Decl::Gen(gen_decl)) if gen_decl.kind == GenKind::Const => consts.push(Decl::Gen(gen_decl)),
            StmtKind::Decl(decl) => panic!("unexpected declaration in {}: {:?}", INIT_FUNC_NAME, decl),
            StmtKind::Assign {
                lhs,
                op: AssignOp::Define,
                rhs,
            } => {
                for l in &lhs {
                    if let ExprKind::Ident(ident) = &l.kind {
                        var_specs.extend(var_spec(ident, info, &mut imports));
                    }
                }
                body.push(Stmt {
                    kind: StmtKind::Assign {
                        lhs,
                        op: AssignOp::Assign,
                        rhs,
                    },
                    ..stmt
                });
            }
            kind => body.push(Stmt { kind, ..stmt }),
        }
    }

    if config.register_vars {
        let core_name = imports.short_name(core);
        let mut registered: Vec<Stmt> = var_specs
            .iter()
            .filter_map(|spec| match spec {
                Spec::Value(vs) => vs.names.first().map(|name| register_var(&core_name, &name.name)),
                _ => None,
            })
            .collect();
        registered.append(&mut body);
        body = registered;
    }

    debug!(vars = var_specs.len(), consts = consts.len(), "hoisted block locals");

    if body.is_empty() {
        let init = unit.init;
        unit.file
            .decls
            .retain(|decl| !matches!(decl, Decl::Func(func) if func.name.id == init));
    } else if let Some(init_body) = unit.init_func_mut().body.as_mut() {
        init_body.stmts = body;
    }

    unit.file.decls.extend(consts);
    if !var_specs.is_empty() {
        unit.file
            .decls
            .push(Decl::Gen(GenDecl::new(GenKind::Var, var_specs, false)));
    }
    prepend(&mut unit.file, imports.take_injected());
}

/// Rewrite what Pass A could not see: uses of prior symbols and of the
/// execution context inside declared function bodies
pub(crate) fn rewrite_bodies(
    file: &mut SourceFile,
    pkg: &Rc<Package>,
    outer: &Scope,
    info: &Info,
    config: &Config,
    runctx: Option<&ObjectRef>,
    core: &Rc<Package>,
) {
    let reserved = spelled_names(file);
    let mut imports = ImportManager::new(pkg, &info.file_scope, outer, reserved.iter().map(String::as_str));
    walk_file(&mut SessionRefs::new(info, &config.olds, runctx, core, &mut imports), file);
    prepend(file, imports.take_injected());
}

/// Put `decls` before every declaration of the file
pub(crate) fn prepend(file: &mut SourceFile, mut decls: Vec<Decl>) {
    if !decls.is_empty() {
        debug!(imports = decls.len(), "injected imports");
        decls.append(&mut file.decls);
        file.decls = decls;
    }
}

fn print_trailing(stmt: &mut Stmt, wrapped: bool, info: &Info, imports: &mut ImportManager, core: &Rc<Package>) {
    let StmtKind::Expr(e) = &mut stmt.kind else { return };
    let target = if wrapped {
        let ExprKind::Call { mut args, .. } = std::mem::replace(&mut e.kind, ExprKind::Ident(Ident::synthetic("_")))
        else {
            unreachable!("wrapped trailing expressions are panic calls");
        };
        args.pop()
    } else {
        match info.type_of(e) {
            // no value, or several
            Some(Type::Tuple(_)) => None,
            _ => Some(std::mem::replace(e, Expr::ident("_"))),
        }
    };
    if let Some(target) = target {
        let core_name = imports.short_name(core);
        *e = Expr::call(Expr::qualified(&core_name, "LgoPrintln"), vec![target]);
    }
}

/// `var name T` for a variable Pass A defined
fn var_spec(ident: &Ident, info: &Info, imports: &mut ImportManager) -> Option<Spec> {
    if ident.is_blank() {
        return None;
    }
    let obj = info.defs.get(&ident.id)?;
    let ty = type_expr(&obj.ty(), imports)?;
    Some(Spec::Value(ValueSpec {
        names: vec![Ident::synthetic(&ident.name)],
        ty: Some(ty),
        values: Vec::new(),
        span: ident.span,
    }))
}

/// `core.LgoRegisterVar("name", &name)`
fn register_var(core: &str, name: &str) -> Stmt {
    let addr = Expr::synthetic(ExprKind::Unary {
        op: UnaryOp::Addr,
        expr: Box::new(Expr::ident(name)),
    });
    let call = Expr::call(
        Expr::qualified(core, "LgoRegisterVar"),
        vec![Expr::synthetic(ExprKind::BasicLit(BasicLit::string(name))), addr],
    );
    Stmt::synthetic(StmtKind::Expr(call))
}

/// The syntax of a type, naming packages through `imports`
pub(crate) fn type_expr(ty: &Type, imports: &mut ImportManager) -> Option<Expr> {
    let kind = match ty {
        Type::Invalid | Type::Tuple(_) => return None,
        Type::Basic(kind) => return Some(Expr::ident(kind.default_kind().name())),
        Type::Named(named) => {
            let qualifier = match &named.pkg {
                Some(pkg) => imports.short_name(pkg),
                None => String::new(),
            };
            return Some(if qualifier.is_empty() {
                Expr::ident(&named.name)
            } else {
                Expr::qualified(&qualifier, &named.name)
            });
        }
        Type::Pointer(elem) => ExprKind::Star(Box::new(type_expr(elem, imports)?)),
        Type::Slice(elem) => ExprKind::SliceType(Box::new(type_expr(elem, imports)?)),
        Type::Map(key, value) => ExprKind::MapType {
            key: Box::new(type_expr(key, imports)?),
            value: Box::new(type_expr(value, imports)?),
        },
        Type::Struct(st) => {
            let mut fields = Vec::new();
            for field in &st.fields {
                let ty = type_expr(&field.ty(), imports)?;
                fields.push(Field::new(vec![Ident::synthetic(&field.name)], ty));
            }
            ExprKind::StructType(fields)
        }
        Type::Signature(sig) => ExprKind::FuncType(func_type(sig, imports)?),
        Type::Interface(iface) => {
            let mut methods = Vec::new();
            for method in iface.methods() {
                let sig = method.ty().as_signature()?;
                let ty = Expr::synthetic(ExprKind::FuncType(func_type(&sig, imports)?));
                methods.push(Field::new(vec![Ident::synthetic(&method.name)], ty));
            }
            ExprKind::InterfaceType(methods)
        }
    };
    Some(Expr::synthetic(kind))
}

fn func_type(sig: &crate::analysis::Signature, imports: &mut ImportManager) -> Option<FuncType> {
    let mut params = Vec::new();
    for (i, param) in sig.params.iter().enumerate() {
        let ty = match param {
            Type::Slice(elem) if sig.variadic && i + 1 == sig.params.len() => {
                Expr::synthetic(ExprKind::Ellipsis(Box::new(type_expr(elem, imports)?)))
            }
            _ => type_expr(param, imports)?,
        };
        params.push(Field::new(Vec::new(), ty));
    }
    let mut results = Vec::new();
    for result in &sig.results {
        results.push(Field::new(Vec::new(), type_expr(result, imports)?));
    }
    Some(FuncType { params, results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{BasicKind, NamedType};

    fn manager(current: &Rc<Package>) -> ImportManager {
        ImportManager::new(current, &Scope::new(), &Scope::new(), [])
    }

    #[test]
    fn test_type_expr_qualifies_foreign_types() {
        let current = Package::new("lgo/exec/pkg1", "lgo_exec", true);
        let mut imports = manager(&current);

        let local = Type::Named(NamedType::new("point", Some(current.clone())));
        let time = Package::new("time", "time", false);
        let duration = Type::Named(NamedType::new("Duration", Some(time)));
        let ty = Type::map(Type::Basic(BasicKind::String), Type::slice(Type::pointer(local)));

        assert_eq!(type_expr(&ty, &mut imports).unwrap().to_string(), "map[string][]*point");
        assert_eq!(type_expr(&duration, &mut imports).unwrap().to_string(), "pkg0.Duration");
        assert_eq!(
            type_expr(&Type::Basic(BasicKind::UntypedFloat), &mut imports).unwrap().to_string(),
            "float64"
        );
        assert!(type_expr(&Type::Tuple(Vec::new()), &mut imports).is_none());
        assert!(type_expr(&Type::Invalid, &mut imports).is_none());
    }

    #[test]
    fn test_type_expr_signatures() {
        let current = Package::new("lgo/exec/pkg0", "lgo_exec", true);
        let mut imports = manager(&current);
        let sig = crate::analysis::Signature {
            recv: None,
            params: vec![Type::Basic(BasicKind::String), Type::slice(Type::empty_interface())],
            results: vec![Type::Basic(BasicKind::Int), crate::analysis::error_type()],
            variadic: true,
        };
        assert_eq!(
            type_expr(&Type::signature(sig), &mut imports).unwrap().to_string(),
            "func(string, ...interface{}) (int, error)"
        );
    }

    #[test]
    fn test_register_var() {
        let stmt = register_var("pkg0", "x");
        let StmtKind::Expr(call) = &stmt.kind else { panic!("expected call") };
        assert_eq!(call.to_string(), "pkg0.LgoRegisterVar(\"x\", &x)");
    }
}
