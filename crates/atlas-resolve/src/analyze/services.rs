//! Service resolution: endpoint extraction and per-directory grouping.
//!
//! A function becomes an endpoint when an `//atlas:api` directive
//! immediately precedes it. All endpoints found in one directory form
//! one service named after the directory; services are strictly
//! per-directory and never merged across sub-packages.

use super::collect::RawPackage;
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::model::{Access, Endpoint};
use atlas_ast::{Decl, FuncDecl, SourceMap};

/// A resolved service before assembly (databases attach later).
pub(crate) struct ServiceDraft {
    pub name: String,
    pub rel_path: String,
    pub endpoints: Vec<Endpoint>,
}

/// Group annotated functions into services, one per directory.
pub(crate) fn resolve_services(
    packages: &[RawPackage],
    map: &SourceMap,
    diags: &mut Diagnostics,
) -> Vec<ServiceDraft> {
    let mut services = Vec::new();
    for pkg in packages {
        let svc_name = service_name(pkg);
        let mut endpoints: Vec<Endpoint> = Vec::new();

        for file in &pkg.files {
            for decl in &file.ast.decls {
                let Decl::Func(func) = decl else {
                    continue;
                };
                let Some(directive) = func.directive("api") else {
                    continue;
                };

                let api = match parse_api_directive(&directive.text) {
                    Ok(api) => api,
                    Err(message) => {
                        diags.push(Diagnostic::at(
                            map,
                            directive.span,
                            DiagnosticKind::InvalidDirective,
                            message,
                        ));
                        continue;
                    }
                };

                if let Err(message) = validate_signature(func, api.raw) {
                    diags.push(Diagnostic::at(
                        map,
                        func.name.span,
                        DiagnosticKind::InvalidSignature,
                        message,
                    ));
                    continue;
                }

                if endpoints.iter().any(|e| e.name == func.name.name) {
                    diags.push(Diagnostic::at(
                        map,
                        func.name.span,
                        DiagnosticKind::EndpointConflict,
                        format!(
                            "endpoint {} declared twice in service {}",
                            func.name.name, svc_name
                        ),
                    ));
                    continue;
                }

                endpoints.push(Endpoint {
                    name: func.name.name.clone(),
                    access: api.access,
                    raw: api.raw,
                    path: api.path,
                });
            }
        }

        if !endpoints.is_empty() {
            services.push(ServiceDraft {
                name: svc_name,
                rel_path: pkg.rel_path.clone(),
                endpoints,
            });
        }
    }
    services
}

/// Services are named after their directory; a root-level service falls
/// back to the package name.
fn service_name(pkg: &RawPackage) -> String {
    if pkg.rel_path == "." {
        pkg.name.clone()
    } else {
        pkg.rel_path
            .rsplit('/')
            .next()
            .unwrap_or(&pkg.rel_path)
            .to_string()
    }
}

struct ApiDirective {
    access: Access,
    raw: bool,
    path: Option<String>,
}

/// Parse the tokens of an `api` directive. The leading `api` word has
/// already been matched by the caller.
fn parse_api_directive(text: &str) -> Result<ApiDirective, String> {
    let mut access = None;
    let mut raw = false;
    let mut path = None;

    for token in text.split_whitespace().skip(1) {
        match token {
            "public" | "private" | "auth" => {
                if access.is_some() {
                    return Err("api directive specifies more than one access level".to_string());
                }
                access = Some(match token {
                    "public" => Access::Public,
                    "auth" => Access::Auth,
                    _ => Access::Private,
                });
            }
            "raw" => raw = true,
            _ if token.starts_with("path=") => {
                let value = &token["path=".len()..];
                if value.is_empty() {
                    return Err("api directive has an empty path".to_string());
                }
                path = Some(value.to_string());
            }
            other => {
                return Err(format!("unknown api directive option: {}", other));
            }
        }
    }

    Ok(ApiDirective {
        access: access.unwrap_or(Access::Private),
        raw,
        path,
    })
}

/// Validate the endpoint signature shape.
///
/// Non-raw: `func(ctx context.Context[, req *Params]) ([*Response, ]error)`.
/// Raw: `func(http.ResponseWriter, *http.Request)` with no results.
fn validate_signature(func: &FuncDecl, raw: bool) -> Result<(), String> {
    if raw {
        let shape_ok = func.params.len() == 2
            && !func.params[0].ty.pointer
            && func.params[0].ty.is("http.ResponseWriter")
            && func.params[1].ty.pointer
            && func.params[1].ty.is("http.Request")
            && func.results.is_empty();
        return if shape_ok {
            Ok(())
        } else {
            Err(
                "raw endpoints must have signature func(http.ResponseWriter, *http.Request)"
                    .to_string(),
            )
        };
    }

    match func.params.first() {
        Some(first) if !first.ty.pointer && first.ty.is("context.Context") => {}
        _ => return Err("endpoint must take context.Context as its first parameter".to_string()),
    }
    if func.params.len() > 2 {
        return Err("endpoint has too many parameters".to_string());
    }
    match func.results.last() {
        Some(last) if !last.pointer && last.is("error") => {}
        _ => return Err("endpoint must return error as its last result".to_string()),
    }
    if func.results.len() > 2 {
        return Err("endpoint has too many results".to_string());
    }
    Ok(())
}
