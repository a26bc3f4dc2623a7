//! Pre-order traversal helpers over the syntax tree.

use crate::ast::{Decl, Expr, ExprKind, FileAst};

/// Visit every expression in a file, pre-order, declaration order.
pub fn walk_file<'a>(file: &'a FileAst, f: &mut impl FnMut(&'a Expr)) {
    for decl in &file.decls {
        if let Decl::Var(var) = decl {
            if let Some(init) = &var.init {
                walk_expr(init, f);
            }
        }
    }
}

/// Visit `expr` and all of its sub-expressions, pre-order.
pub fn walk_expr<'a>(expr: &'a Expr, f: &mut impl FnMut(&'a Expr)) {
    f(expr);
    match &expr.kind {
        ExprKind::IntLit(_)
        | ExprKind::FloatLit(_)
        | ExprKind::StringLit(_)
        | ExprKind::Ident(_) => {}
        ExprKind::Selector { base, .. } => walk_expr(base, f),
        ExprKind::Unary { operand, .. } => walk_expr(operand, f),
        ExprKind::Binary { left, right, .. } => {
            walk_expr(left, f);
            walk_expr(right, f);
        }
        ExprKind::Paren(inner) => walk_expr(inner, f),
        ExprKind::Call { callee, args } => {
            walk_expr(callee, f);
            for arg in args {
                walk_expr(arg, f);
            }
        }
        ExprKind::Composite { ty, fields } => {
            walk_expr(ty, f);
            for field in fields {
                walk_expr(&field.value, f);
            }
        }
    }
}
