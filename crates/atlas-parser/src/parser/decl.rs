//! File and declaration parsers.
//!
//! A file is a package clause, any number of imports, and top-level
//! `var`/`const`/`func` declarations. Directive comments accumulate and
//! attach to the next function declaration; directives in front of
//! anything else are dropped, matching how annotations are used.

use super::expr::{parse_expr, parse_ident};
use super::{ParseError, Parser};
use crate::lexer::Token;
use atlas_ast::{Decl, Directive, FileAst, FuncDecl, Ident, ImportDecl, Param, TypeRef, VarDecl};

pub(super) fn parse_file(p: &mut Parser) -> Result<FileAst, ParseError> {
    skip_semis(p);
    let package = parse_package_clause(p)?;

    let mut imports = Vec::new();
    let mut decls = Vec::new();
    let mut pending: Vec<Directive> = Vec::new();

    loop {
        match p.stream.peek() {
            None => break,
            Some(Token::Semi) => {
                p.stream.advance();
            }
            Some(Token::Directive(text)) => {
                let text = text.to_string();
                let span = p.stream.current_span();
                p.stream.advance();
                pending.push(Directive { text, span });
            }
            Some(Token::Import) => {
                pending.clear();
                p.stream.advance();
                parse_import(p, &mut imports)?;
            }
            Some(Token::Var) | Some(Token::Const) => {
                pending.clear();
                decls.push(Decl::Var(parse_var(p)?));
            }
            Some(Token::Func) => {
                let directives = std::mem::take(&mut pending);
                decls.push(Decl::Func(parse_func(p, directives)?));
            }
            Some(Token::Ident(word)) if word.as_ref() == "type" => {
                pending.clear();
                skip_type_decl(p)?;
            }
            found => {
                return Err(ParseError::unexpected_token(
                    found,
                    "at top level",
                    p.stream.current_span(),
                ));
            }
        }
    }

    Ok(FileAst {
        package,
        imports,
        decls,
    })
}

fn parse_package_clause(p: &mut Parser) -> Result<Ident, ParseError> {
    p.stream.expect(Token::Package)?;
    let name = parse_ident(p)?;

    // The clause must end the statement: an explicit ';', or something
    // that can only start the next declaration.
    match p.stream.peek() {
        Some(Token::Semi) => {
            p.stream.advance();
        }
        None
        | Some(Token::Import)
        | Some(Token::Var)
        | Some(Token::Const)
        | Some(Token::Func)
        | Some(Token::Directive(_)) => {}
        Some(Token::Ident(word)) if word.as_ref() == "type" => {}
        found => {
            return Err(ParseError::expected_token(
                &Token::Semi,
                found,
                p.stream.current_span(),
            ));
        }
    }
    Ok(name)
}

/// Parse the remainder of an `import` declaration (keyword consumed).
/// Grouped blocks flatten into one entry per path.
fn parse_import(p: &mut Parser, imports: &mut Vec<ImportDecl>) -> Result<(), ParseError> {
    if p.stream.check(&Token::LParen) {
        p.stream.advance();
        loop {
            skip_semis(p);
            if p.stream.check(&Token::RParen) {
                break;
            }
            imports.push(parse_import_item(p)?);
        }
        p.stream.expect(Token::RParen)?;
    } else {
        imports.push(parse_import_item(p)?);
    }
    Ok(())
}

fn parse_import_item(p: &mut Parser) -> Result<ImportDecl, ParseError> {
    let start = p.stream.current_pos();
    let alias = match p.stream.peek() {
        Some(Token::Ident(_)) => Some(parse_ident(p)?),
        // dot-imports are recorded under an unreferencable alias; the
        // resolver never binds through them
        Some(Token::Dot) => {
            let span = p.stream.current_span();
            p.stream.advance();
            Some(Ident {
                name: ".".to_string(),
                span,
            })
        }
        _ => None,
    };
    let (path, _) = parse_string(p)?;
    Ok(ImportDecl {
        alias,
        path,
        span: p.stream.span_from(start),
    })
}

fn parse_var(p: &mut Parser) -> Result<VarDecl, ParseError> {
    let start = p.stream.current_pos();
    p.stream.advance(); // `var` or `const`
    let name = parse_ident(p)?;
    let init = if p.stream.check(&Token::Assign) {
        p.stream.advance();
        Some(parse_expr(p)?)
    } else {
        None
    };
    Ok(VarDecl {
        name,
        init,
        span: p.stream.span_from(start),
    })
}

fn parse_func(p: &mut Parser, directives: Vec<Directive>) -> Result<FuncDecl, ParseError> {
    let start = p.stream.current_pos();
    p.stream.advance(); // `func`

    // method receiver, skipped: endpoints are plain functions
    if p.stream.check(&Token::LParen) {
        skip_parens(p)?;
    }
    let name = parse_ident(p)?;

    p.stream.expect(Token::LParen)?;
    let mut params = Vec::new();
    while !p.stream.check(&Token::RParen) {
        params.push(parse_param(p)?);
        if p.stream.check(&Token::Comma) {
            p.stream.advance();
        } else {
            break;
        }
    }
    p.stream.expect(Token::RParen)?;

    let results = parse_results(p)?;

    if p.stream.check(&Token::LBrace) {
        skip_body(p)?;
    }

    Ok(FuncDecl {
        name,
        directives,
        params,
        results,
        span: p.stream.span_from(start),
    })
}

/// Parse one parameter: `name Type` or a bare `Type`.
///
/// A lone identifier followed by `,`, `)` or `.` is a type, not a name;
/// anything else in second position means the identifier was the name.
fn parse_param(p: &mut Parser) -> Result<Param, ParseError> {
    let named = matches!(p.stream.peek(), Some(Token::Ident(_)))
        && !matches!(
            p.stream.peek_nth(1),
            Some(Token::Comma) | Some(Token::RParen) | Some(Token::Dot)
        );
    let name = if named { Some(parse_ident(p)?) } else { None };
    let ty = parse_type(p)?;
    Ok(Param { name, ty })
}

fn parse_results(p: &mut Parser) -> Result<Vec<TypeRef>, ParseError> {
    match p.stream.peek() {
        Some(Token::LParen) => {
            p.stream.advance();
            let mut results = Vec::new();
            while !p.stream.check(&Token::RParen) {
                results.push(parse_type(p)?);
                if p.stream.check(&Token::Comma) {
                    p.stream.advance();
                } else {
                    break;
                }
            }
            p.stream.expect(Token::RParen)?;
            Ok(results)
        }
        Some(Token::Star) | Some(Token::Ident(_)) => Ok(vec![parse_type(p)?]),
        _ => Ok(Vec::new()),
    }
}

fn parse_type(p: &mut Parser) -> Result<TypeRef, ParseError> {
    let start = p.stream.current_pos();
    let pointer = if p.stream.check(&Token::Star) {
        p.stream.advance();
        true
    } else {
        false
    };
    let first = parse_ident(p)?;
    let path = if p.stream.check(&Token::Dot) {
        p.stream.advance();
        let sel = parse_ident(p)?;
        format!("{}.{}", first.name, sel.name)
    } else {
        first.name
    };
    Ok(TypeRef {
        pointer,
        path,
        span: p.stream.span_from(start),
    })
}

/// Consume a `type` declaration without representing it. The analyzer
/// only shape-checks signatures, so type definitions carry no
/// information it needs.
fn skip_type_decl(p: &mut Parser) -> Result<(), ParseError> {
    p.stream.advance(); // `type`
    loop {
        match p.stream.peek() {
            // struct/interface body or a grouped `type (...)` block ends
            // the declaration
            Some(Token::LBrace) => {
                skip_body(p)?;
                return Ok(());
            }
            Some(Token::LParen) => {
                skip_parens(p)?;
                return Ok(());
            }
            Some(Token::Semi) | None => {
                p.stream.advance();
                return Ok(());
            }
            Some(Token::Import)
            | Some(Token::Var)
            | Some(Token::Const)
            | Some(Token::Func)
            | Some(Token::Directive(_)) => return Ok(()),
            Some(_) => {
                p.stream.advance();
            }
        }
    }
}

/// Consume a balanced `( ... )` group without interpreting it.
fn skip_parens(p: &mut Parser) -> Result<(), ParseError> {
    let open_span = p.stream.current_span();
    p.stream.advance(); // `(`
    let mut depth = 1usize;
    while depth > 0 {
        match p.stream.advance() {
            Some(Token::LParen) => depth += 1,
            Some(Token::RParen) => depth -= 1,
            Some(_) => {}
            None => {
                return Err(ParseError::invalid_syntax(
                    "unclosed parenthesized group",
                    open_span,
                ));
            }
        }
    }
    Ok(())
}

/// Consume a `{ ... }` body without interpreting it.
fn skip_body(p: &mut Parser) -> Result<(), ParseError> {
    let open_span = p.stream.current_span();
    p.stream.advance(); // `{`
    let mut depth = 1usize;
    while depth > 0 {
        match p.stream.advance() {
            Some(Token::LBrace) => depth += 1,
            Some(Token::RBrace) => depth -= 1,
            Some(_) => {}
            None => {
                return Err(ParseError::invalid_syntax(
                    "unclosed function body",
                    open_span,
                ));
            }
        }
    }
    Ok(())
}

fn parse_string(p: &mut Parser) -> Result<(String, atlas_ast::Span), ParseError> {
    let span = p.stream.current_span();
    match p.stream.peek() {
        Some(Token::Str(s)) => {
            let s = s.to_string();
            p.stream.advance();
            Ok((s, span))
        }
        found => Err(ParseError::unexpected_token(
            found,
            "where an import path string was expected",
            span,
        )),
    }
}

fn skip_semis(p: &mut Parser) {
    while p.stream.check(&Token::Semi) {
        p.stream.advance();
    }
}
