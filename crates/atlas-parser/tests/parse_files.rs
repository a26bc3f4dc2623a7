//! Integration tests for the file parser.

use atlas_ast::{Decl, ExprKind};
use atlas_parser::{parse_file, ParseErrorKind};

#[test]
fn parses_package_clause_and_imports() {
    let source = r#"
package email

import (
    "context"
    cr "atlas.dev/cron"
)

import "atlas.dev/storage/sqldb"
"#;
    let file = parse_file(source, 0).unwrap();
    assert_eq!(file.package.name, "email");
    assert_eq!(file.imports.len(), 3);
    assert_eq!(file.imports[0].local_name(), "context");
    assert_eq!(file.imports[1].local_name(), "cr");
    assert_eq!(file.imports[1].path, "atlas.dev/cron");
    assert_eq!(file.imports[2].local_name(), "sqldb");
}

#[test]
fn parses_var_with_call_initializer() {
    let source = r#"
package email

import "atlas.dev/storage/sqldb"

var db = sqldb.Named("emails")
"#;
    let file = parse_file(source, 0).unwrap();
    assert_eq!(file.decls.len(), 1);
    let Decl::Var(var) = &file.decls[0] else {
        panic!("expected var declaration");
    };
    assert_eq!(var.name.name, "db");
    let init = var.init.as_ref().unwrap();
    let ExprKind::Call { callee, args } = &init.kind else {
        panic!("expected call initializer");
    };
    let ExprKind::Selector { base, sel } = &callee.kind else {
        panic!("expected selector callee");
    };
    assert_eq!(base.as_ident(), Some("sqldb"));
    assert_eq!(sel.name, "Named");
    assert_eq!(args.len(), 1);
    assert_eq!(args[0].as_string_lit(), Some("emails"));
}

#[test]
fn attaches_directives_to_following_function() {
    let source = r#"
package email

import "context"

//atlas:api public path=/send
func Send(ctx context.Context, p *SendParams) (*SendResponse, error) {
    return nil, nil
}

func helper() {}
"#;
    let file = parse_file(source, 0).unwrap();
    assert_eq!(file.decls.len(), 2);

    let Decl::Func(send) = &file.decls[0] else {
        panic!("expected func declaration");
    };
    assert_eq!(send.name.name, "Send");
    assert_eq!(send.directives.len(), 1);
    assert_eq!(send.directives[0].text, "api public path=/send");
    assert_eq!(send.params.len(), 2);
    assert_eq!(send.params[0].ty.path, "context.Context");
    assert!(!send.params[0].ty.pointer);
    assert_eq!(send.params[1].ty.path, "SendParams");
    assert!(send.params[1].ty.pointer);
    assert_eq!(send.results.len(), 2);
    assert_eq!(send.results[1].path, "error");

    let Decl::Func(helper) = &file.decls[1] else {
        panic!("expected func declaration");
    };
    assert!(helper.directives.is_empty());
}

#[test]
fn parses_unnamed_qualified_parameter() {
    let source = r#"
package p

func Raw(http.ResponseWriter, *http.Request) {}
"#;
    let file = parse_file(source, 0).unwrap();
    let Decl::Func(raw) = &file.decls[0] else {
        panic!("expected func declaration");
    };
    assert_eq!(raw.params.len(), 2);
    assert!(raw.params[0].name.is_none());
    assert_eq!(raw.params[0].ty.path, "http.ResponseWriter");
    assert_eq!(raw.params[1].ty.path, "http.Request");
    assert!(raw.params[1].ty.pointer);
    assert!(raw.results.is_empty());
}

#[test]
fn parses_composite_literal_argument() {
    let source = r#"
package email

import "atlas.dev/cron"

var _ = cron.NewJob("digest", cron.JobConfig{
    Title:    "Send the daily digest",
    Every:    24 * cron.Hour,
    Endpoint: Send,
})
"#;
    let file = parse_file(source, 0).unwrap();
    let Decl::Var(var) = &file.decls[0] else {
        panic!("expected var declaration");
    };
    let ExprKind::Call { args, .. } = &var.init.as_ref().unwrap().kind else {
        panic!("expected call initializer");
    };
    assert_eq!(args.len(), 2);
    let ExprKind::Composite { fields, .. } = &args[1].kind else {
        panic!("expected composite literal");
    };
    let names: Vec<_> = fields.iter().map(|f| f.name.name.as_str()).collect();
    assert_eq!(names, vec!["Title", "Every", "Endpoint"]);
}

#[test]
fn skips_bodies_with_nested_braces_and_strings() {
    let source = r#"
package p

func Tricky() {
    if true {
        s := "closing } brace in string"
        _ = s
    }
}

var after = 1
"#;
    let file = parse_file(source, 0).unwrap();
    assert_eq!(file.decls.len(), 2);
}

#[test]
fn skips_type_declarations() {
    let source = r#"
package email

type SendParams struct {
    Subject string
    Body    string
}

type Alias = SendParams

//atlas:api public
func Send(ctx context.Context, p *SendParams) (*SendResponse, error) {
    return nil, nil
}
"#;
    let file = parse_file(source, 0).unwrap();
    assert_eq!(file.decls.len(), 1);
    let Decl::Func(send) = &file.decls[0] else {
        panic!("expected func declaration");
    };
    assert_eq!(send.name.name, "Send");
    assert_eq!(send.directives.len(), 1);
}

#[test]
fn skips_method_receivers() {
    let source = r#"
package email

func (s *Sender) Deliver(msg string) error {
    return nil
}
"#;
    let file = parse_file(source, 0).unwrap();
    let Decl::Func(deliver) = &file.decls[0] else {
        panic!("expected func declaration");
    };
    assert_eq!(deliver.name.name, "Deliver");
    assert!(deliver.directives.is_empty());
}

#[test]
fn malformed_package_clause_reports_position() {
    let err = parse_file("package fo/;\n", 0).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
    assert_eq!(err.message, "expected ';', found '/'");
    assert_eq!(err.span.start, 10);
}

#[test]
fn missing_package_clause_is_an_error() {
    let err = parse_file("var x = 1\n", 0).unwrap_err();
    assert!(err.message.contains("expected 'package'"), "{}", err.message);
}

#[test]
fn unclosed_body_is_an_error() {
    let err = parse_file("package p\nfunc f() {\n", 0).unwrap_err();
    assert_eq!(err.message, "unclosed function body");
}

#[test]
fn expression_precedence_is_structural() {
    let source = "package p\nvar x = 1 + 2*3\n";
    let file = parse_file(source, 0).unwrap();
    let Decl::Var(var) = &file.decls[0] else {
        panic!("expected var declaration");
    };
    let ExprKind::Binary { op, left, right } = &var.init.as_ref().unwrap().kind else {
        panic!("expected binary expression");
    };
    assert_eq!(*op, atlas_ast::BinOp::Add);
    assert!(matches!(left.kind, ExprKind::IntLit(1)));
    assert!(matches!(right.kind, ExprKind::Binary { .. }));
}
