//! Resource extraction from top-level variable declarations.
//!
//! A declaration becomes a resource when its initializer is a call whose
//! callee resolves to a registered `(import path, symbol)` pattern.
//! Everything else is ignored; most declarations are not resources.

use super::collect::RawPackage;
use super::names::qualified_call;
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::registry::{ResourceCall, ResourceRegistry};
use atlas_ast::{Decl, SourceMap};
use std::collections::HashSet;

/// Scan every package and attach its extracted resources.
pub(crate) fn extract_resources(
    packages: &mut [RawPackage],
    registry: &ResourceRegistry,
    map: &SourceMap,
    diags: &mut Diagnostics,
) {
    for pkg in packages {
        let mut seen: HashSet<String> = HashSet::new();
        for file in &pkg.files {
            for decl in &file.ast.decls {
                let Decl::Var(var) = decl else {
                    continue;
                };
                // blank-named handles cannot be referenced; leave them
                // to passes that match specific patterns
                if var.name.name == "_" {
                    continue;
                }
                let Some(init) = &var.init else {
                    continue;
                };
                let Some((import_path, symbol, args)) = qualified_call(init, &file.names) else {
                    continue;
                };
                let Some(builder) = registry.lookup(import_path, symbol) else {
                    continue;
                };

                let call = ResourceCall {
                    ident: &var.name,
                    args,
                    span: init.span,
                };
                match builder(&call) {
                    Ok(resource) => {
                        if seen.insert(resource.ident().to_string()) {
                            pkg.resources.push(resource);
                        } else {
                            diags.push(Diagnostic::at(
                                map,
                                var.name.span,
                                DiagnosticKind::ResourceConflict,
                                format!(
                                    "resource {} already declared in package {}",
                                    resource.ident(),
                                    pkg.name
                                ),
                            ));
                        }
                    }
                    Err(message) => {
                        diags.push(Diagnostic::at(
                            map,
                            init.span,
                            DiagnosticKind::InvalidResource,
                            message,
                        ));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::collect::package_from_sources;
    use crate::analyze::names::resolve_names;
    use crate::model::Resource;

    fn extract(sources: &[(&str, &str)]) -> (Vec<Resource>, Vec<Diagnostic>) {
        let mut map = SourceMap::new();
        let mut packages = vec![package_from_sources(&mut map, "test.path", "svc", sources)];
        resolve_names(&mut packages);
        let mut diags = Diagnostics::new();
        extract_resources(
            &mut packages,
            &ResourceRegistry::builtin(),
            &map,
            &mut diags,
        );
        (
            packages.into_iter().next().unwrap().resources,
            diags.into_sorted(),
        )
    }

    #[test]
    fn test_extracts_named_database() {
        let (resources, diags) = extract(&[(
            "svc.go",
            r#"
package svc

import "atlas.dev/storage/sqldb"

var db = sqldb.Named("emails")
"#,
        )]);
        assert!(diags.is_empty());
        assert_eq!(
            resources,
            vec![Resource::SqlDatabase {
                ident: "db".into(),
                db_name: "emails".into()
            }]
        );
    }

    #[test]
    fn test_non_matching_declarations_are_ignored() {
        let (resources, diags) = extract(&[(
            "svc.go",
            r#"
package svc

import "atlas.dev/storage/sqldb"

var limit = 10
var handle = other.Thing("x")
var alias = sqldb.Unknown("y")
"#,
        )]);
        assert!(diags.is_empty());
        assert!(resources.is_empty());
    }

    #[test]
    fn test_duplicate_identifier_conflicts_and_drops_later() {
        let (resources, diags) = extract(&[
            (
                "a.go",
                r#"
package svc

import "atlas.dev/storage/sqldb"

var db = sqldb.Named("first")
"#,
            ),
            (
                "b.go",
                r#"
package svc

import "atlas.dev/storage/sqldb"

var db = sqldb.Named("second")
"#,
            ),
        ]);
        assert_eq!(resources.len(), 1);
        assert_eq!(
            resources[0],
            Resource::SqlDatabase {
                ident: "db".into(),
                db_name: "first".into()
            }
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ResourceConflict);
        assert!(diags[0].message.contains("db"), "{}", diags[0].message);
    }

    #[test]
    fn test_invalid_construction_arguments() {
        let (resources, diags) = extract(&[(
            "svc.go",
            r#"
package svc

import "atlas.dev/storage/sqldb"

var db = sqldb.Named(someVariable)
"#,
        )]);
        assert!(resources.is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidResource);
    }

    #[test]
    fn test_registry_extension_without_traversal_changes() {
        let mut map = SourceMap::new();
        let mut packages = vec![package_from_sources(
            &mut map,
            "test.path",
            "svc",
            &[(
                "svc.go",
                r#"
package svc

import "atlas.dev/storage/sqldb"

var cache = sqldb.Replica("emails")
"#,
            )],
        )];
        resolve_names(&mut packages);

        let mut registry = ResourceRegistry::builtin();
        registry.register("atlas.dev/storage/sqldb", "Replica", |call| {
            match call.args.first().and_then(|a| a.as_string_lit()) {
                Some(db_name) => Ok(Resource::SqlDatabase {
                    ident: call.ident.name.clone(),
                    db_name: db_name.to_string(),
                }),
                None => Err("sqldb.Replica requires a string literal".into()),
            }
        });

        let mut diags = Diagnostics::new();
        extract_resources(&mut packages, &registry, &map, &mut diags);
        assert!(diags.is_empty());
        assert_eq!(packages[0].resources.len(), 1);
        assert_eq!(packages[0].resources[0].ident(), "cache");
    }
}
