//! JavaScript/TypeScript translation modules.
//!
//! The exported object is located in this order:
//!
//! 1. `export default { ... }` (or `export default messages` naming a top-level const)
//! 2. `module.exports = { ... }`
//! 3. a single exported `const` initialized with an object literal

use std::{collections::HashMap, path::Path};

use anyhow::Result;
use swc_ecma_ast::{
    AssignTarget, Decl, Expr, MemberProp, Module, ModuleDecl, ModuleItem, ObjectLit, Pat,
    SimpleAssignTarget, Stmt, VarDecl,
};

use super::{
    RawEntry,
    ecma::{flatten_object, parse_module_source, unwrap_ts_expr},
};

pub fn parse(content: &str, path: &Path) -> Result<Vec<RawEntry>> {
    let parsed = parse_module_source(content, path)?;
    let mut entries = Vec::new();
    if let Some(object) = find_exported_object(&parsed.module) {
        flatten_object(object, "", &parsed.source_file, parsed.base, &mut entries);
    }
    Ok(entries)
}

pub(crate) fn find_exported_object(module: &Module) -> Option<&ObjectLit> {
    let mut consts: HashMap<&str, &ObjectLit> = HashMap::new();
    let mut exported_consts: Vec<&ObjectLit> = Vec::new();
    let mut default_export: Option<&Expr> = None;
    let mut commonjs_export: Option<&Expr> = None;

    for item in &module.body {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                default_export = Some(&*export.expr);
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                if let Decl::Var(var) = &export.decl {
                    for (name, object) in object_bindings(var) {
                        consts.insert(name, object);
                        exported_consts.push(object);
                    }
                }
            }
            ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
                consts.extend(object_bindings(var));
            }
            ModuleItem::Stmt(Stmt::Expr(stmt)) => {
                if let Expr::Assign(assign) = &*stmt.expr
                    && is_module_exports(&assign.left)
                {
                    commonjs_export = Some(&*assign.right);
                }
            }
            _ => {}
        }
    }

    default_export
        .and_then(|expr| resolve_object(expr, &consts))
        .or_else(|| commonjs_export.and_then(|expr| resolve_object(expr, &consts)))
        .or_else(|| match exported_consts.as_slice() {
            [single] => Some(*single),
            _ => None,
        })
}

fn resolve_object<'a>(
    expr: &'a Expr,
    consts: &HashMap<&'a str, &'a ObjectLit>,
) -> Option<&'a ObjectLit> {
    match unwrap_ts_expr(expr) {
        Expr::Object(object) => Some(object),
        Expr::Ident(ident) => consts.get(ident.sym.as_str()).copied(),
        _ => None,
    }
}

fn object_bindings(var: &VarDecl) -> impl Iterator<Item = (&str, &ObjectLit)> {
    var.decls.iter().filter_map(|decl| {
        let Pat::Ident(binding) = &decl.name else {
            return None;
        };
        match decl.init.as_deref().map(unwrap_ts_expr) {
            Some(Expr::Object(object)) => Some((binding.id.sym.as_str(), object)),
            _ => None,
        }
    })
}

fn is_module_exports(target: &AssignTarget) -> bool {
    let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = target else {
        return false;
    };
    let Expr::Ident(object) = &*member.obj else {
        return false;
    };
    matches!(&member.prop, MemberProp::Ident(prop) if prop.sym.as_str() == "exports")
        && object.sym.as_str() == "module"
}
