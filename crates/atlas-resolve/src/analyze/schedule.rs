//! Evaluation of schedule interval expressions.
//!
//! The sublanguage is integer literals, registered named constants,
//! parentheses, unary minus, and `+ - * /`. Everything is evaluated as
//! `i64`; division truncates toward zero and arithmetic wraps like the
//! scanned language's int64.
//!
//! Error rules:
//! - a decimal literal anywhere fails the whole expression, even when
//!   the final value would be integral;
//! - a zero divisor fails the division; the divisor is evaluated and
//!   checked before the dividend, so a zero divisor wins over a decimal
//!   dividend;
//! - a constant that is not in the registry fails its reference.
//!
//! Each failure records exactly one diagnostic at the offending
//! sub-expression and aborts the evaluation; callers skip the
//! declaration and keep going.

use super::names::{qualified_ref, NameTable};
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::registry::ConstantRegistry;
use atlas_ast::{BinOp, Expr, ExprKind, SourceMap, UnaryOp};

/// Evaluate a schedule expression to whole seconds.
///
/// `None` means a diagnostic was recorded and the caller should skip the
/// declaration the expression came from.
pub(crate) fn eval_schedule(
    expr: &Expr,
    names: &NameTable,
    constants: &ConstantRegistry,
    map: &SourceMap,
    diags: &mut Diagnostics,
) -> Option<i64> {
    match &expr.kind {
        ExprKind::IntLit(value) => Some(*value),
        ExprKind::FloatLit(_) => {
            diags.push(Diagnostic::at(
                map,
                expr.span,
                DiagnosticKind::FloatNotSupported,
                "floating point numbers are not supported",
            ));
            None
        }
        ExprKind::Paren(inner) => eval_schedule(inner, names, constants, map, diags),
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => eval_schedule(operand, names, constants, map, diags).map(i64::wrapping_neg),
        ExprKind::Binary { op, left, right } => match op {
            BinOp::Div => {
                // Divisor first: a zero divisor is reported even when
                // the dividend would fail for its own reasons.
                let divisor = eval_schedule(right, names, constants, map, diags)?;
                if divisor == 0 {
                    diags.push(Diagnostic::at(
                        map,
                        right.span,
                        DiagnosticKind::DivideByZero,
                        "cannot divide by zero",
                    ));
                    return None;
                }
                let dividend = eval_schedule(left, names, constants, map, diags)?;
                Some(dividend / divisor)
            }
            BinOp::Add => {
                let lhs = eval_schedule(left, names, constants, map, diags)?;
                let rhs = eval_schedule(right, names, constants, map, diags)?;
                Some(lhs.wrapping_add(rhs))
            }
            BinOp::Sub => {
                let lhs = eval_schedule(left, names, constants, map, diags)?;
                let rhs = eval_schedule(right, names, constants, map, diags)?;
                Some(lhs.wrapping_sub(rhs))
            }
            BinOp::Mul => {
                let lhs = eval_schedule(left, names, constants, map, diags)?;
                let rhs = eval_schedule(right, names, constants, map, diags)?;
                Some(lhs.wrapping_mul(rhs))
            }
        },
        ExprKind::Selector { .. } => match qualified_ref(expr, names) {
            Some((import_path, symbol)) => match constants.get(import_path, symbol) {
                Some(value) => Some(value),
                None => {
                    diags.push(Diagnostic::at(
                        map,
                        expr.span,
                        DiagnosticKind::UnknownConstant,
                        format!("undefined constant {}", map.snippet(&expr.span)),
                    ));
                    None
                }
            },
            None => {
                diags.push(Diagnostic::at(
                    map,
                    expr.span,
                    DiagnosticKind::UnknownConstant,
                    format!("undefined constant {}", map.snippet(&expr.span)),
                ));
                None
            }
        },
        ExprKind::Ident(name) => {
            diags.push(Diagnostic::at(
                map,
                expr.span,
                DiagnosticKind::UnknownConstant,
                format!("undefined constant {}", name),
            ));
            None
        }
        ExprKind::StringLit(_) | ExprKind::Call { .. } | ExprKind::Composite { .. } => {
            diags.push(Diagnostic::at(
                map,
                expr.span,
                DiagnosticKind::UnknownConstant,
                "schedule expressions support only integer literals and named constants",
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_ast::{Decl, FileAst, SourceMap};
    use atlas_parser::parse_file;
    use std::path::PathBuf;

    struct Fixture {
        map: SourceMap,
        ast: FileAst,
        names: NameTable,
    }

    fn fixture(expr: &str) -> Fixture {
        let source = format!(
            "package x\n\nimport \"atlas.dev/cron\"\n\nvar _ = {}\n",
            expr
        );
        let mut map = SourceMap::new();
        let file_id = map.add_file(PathBuf::from("x/x.go"), "x/x.go".into(), source.clone());
        let ast = parse_file(&source, file_id).unwrap();
        let names = NameTable::resolve_file(&ast);
        Fixture { map, ast, names }
    }

    fn eval(expr: &str) -> (Option<i64>, Vec<Diagnostic>) {
        let fx = fixture(expr);
        let Decl::Var(var) = &fx.ast.decls[0] else {
            panic!("fixture has no var declaration");
        };
        let mut diags = Diagnostics::new();
        let value = eval_schedule(
            var.init.as_ref().unwrap(),
            &fx.names,
            &ConstantRegistry::builtin(),
            &fx.map,
            &mut diags,
        );
        (value, diags.into_sorted())
    }

    #[test]
    fn test_constant_multiplication() {
        let (value, diags) = eval("1 * cron.Minute");
        assert_eq!(value, Some(60));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_parenthesized_division() {
        let (value, diags) = eval("(4/2) * cron.Minute");
        assert_eq!(value, Some(120));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_mixed_arithmetic() {
        let (value, diags) = eval("(4-2) * cron.Minute + cron.Hour");
        assert_eq!(value, Some(3720));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        let (value, _) = eval("7 / 2");
        assert_eq!(value, Some(3));
        let (value, _) = eval("-7 / 2");
        assert_eq!(value, Some(-3));
    }

    #[test]
    fn test_float_is_rejected_even_when_result_would_be_integral() {
        let (value, diags) = eval("2.3 * 2");
        assert_eq!(value, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::FloatNotSupported);
        assert_eq!(diags[0].message, "floating point numbers are not supported");

        let (value, diags) = eval("4.0 / 2");
        assert_eq!(value, None);
        assert_eq!(diags[0].kind, DiagnosticKind::FloatNotSupported);
    }

    #[test]
    fn test_zero_divisor_subexpression() {
        let (value, diags) = eval("10 / (1 - 1)");
        assert_eq!(value, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::DivideByZero);
        assert_eq!(diags[0].message, "cannot divide by zero");
    }

    #[test]
    fn divide_by_zero_wins_over_float_in_divisor_position() {
        // Both errors are possible here; the divisor is checked first.
        let (value, diags) = eval("2.3 / (1 - 1)");
        assert_eq!(value, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::DivideByZero);
    }

    #[test]
    fn test_unknown_constant() {
        let (value, diags) = eval("2 * cron.Fortnight");
        assert_eq!(value, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnknownConstant);
        assert_eq!(diags[0].message, "undefined constant cron.Fortnight");
    }

    #[test]
    fn test_unresolved_qualifier() {
        let (value, diags) = eval("2 * clock.Minute");
        assert_eq!(value, None);
        assert_eq!(diags[0].kind, DiagnosticKind::UnknownConstant);
        assert_eq!(diags[0].message, "undefined constant clock.Minute");
    }

    #[test]
    fn test_error_position_points_at_offender() {
        let (_, diags) = eval("1 + 2.5");
        assert_eq!(diags.len(), 1);
        // the decimal literal, not the addition
        let source_col = diags[0].column as usize;
        assert_eq!(&"var _ = 1 + 2.5"[source_col - 1..source_col + 2], "2.5");
    }
}
