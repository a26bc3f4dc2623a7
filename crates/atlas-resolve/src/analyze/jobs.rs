//! Scheduled-job extraction.
//!
//! A job is declared by assigning `cron.NewJob("id", cron.JobConfig{...})`
//! to a top-level variable (conventionally the blank identifier). The
//! `Every` field goes through the schedule evaluator; the `Endpoint`
//! field is kept as an unresolved reference and checked at assembly.

use super::collect::RawPackage;
use super::names::{qualified_call, qualified_ref};
use super::schedule::eval_schedule;
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::registry::{ConstantRegistry, CRON_IMPORT_PATH};
use atlas_ast::{Decl, ExprKind, SourceMap, Span};
use std::collections::HashSet;

/// An extracted job with its endpoint reference still unresolved.
pub(crate) struct JobDraft {
    pub id: String,
    pub title: String,
    pub every_secs: i64,
    /// Import path of the endpoint's package for a qualified reference;
    /// `None` means the job's own package.
    pub endpoint_import_path: Option<String>,
    pub endpoint_name: String,
    /// Directory of the declaring package.
    pub pkg_rel_path: String,
    /// Span of the `NewJob` call, for assembly-time diagnostics.
    pub span: Span,
}

/// Scan every package for `cron.NewJob` declarations.
pub(crate) fn extract_jobs(
    packages: &[RawPackage],
    constants: &ConstantRegistry,
    map: &SourceMap,
    diags: &mut Diagnostics,
) -> Vec<JobDraft> {
    let mut jobs = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for pkg in packages {
        for file in &pkg.files {
            for decl in &file.ast.decls {
                let Decl::Var(var) = decl else {
                    continue;
                };
                let Some(init) = &var.init else {
                    continue;
                };
                let Some((import_path, symbol, args)) = qualified_call(init, &file.names) else {
                    continue;
                };
                if import_path != CRON_IMPORT_PATH || symbol != "NewJob" {
                    continue;
                }

                let [id_arg, config_arg] = args else {
                    diags.push(Diagnostic::at(
                        map,
                        init.span,
                        DiagnosticKind::InvalidResource,
                        "cron.NewJob takes a job id and a JobConfig literal",
                    ));
                    continue;
                };
                let Some(id) = id_arg.as_string_lit() else {
                    diags.push(Diagnostic::at(
                        map,
                        id_arg.span,
                        DiagnosticKind::InvalidResource,
                        "cron job id must be a string literal",
                    ));
                    continue;
                };
                if !seen_ids.insert(id.to_string()) {
                    diags.push(Diagnostic::at(
                        map,
                        id_arg.span,
                        DiagnosticKind::ResourceConflict,
                        format!("cron job {} defined twice", id),
                    ));
                    continue;
                }
                let ExprKind::Composite { fields, .. } = &config_arg.kind else {
                    diags.push(Diagnostic::at(
                        map,
                        config_arg.span,
                        DiagnosticKind::InvalidResource,
                        "cron job configuration must be a JobConfig literal",
                    ));
                    continue;
                };

                let mut title = None;
                let mut every = None;
                let mut endpoint = None;
                let mut failed = false;

                for field in fields {
                    match field.name.name.as_str() {
                        "Title" => match field.value.as_string_lit() {
                            Some(value) => title = Some(value.to_string()),
                            None => {
                                diags.push(Diagnostic::at(
                                    map,
                                    field.value.span,
                                    DiagnosticKind::InvalidResource,
                                    "cron job Title must be a string literal",
                                ));
                                failed = true;
                            }
                        },
                        "Every" => {
                            match eval_schedule(&field.value, &file.names, constants, map, diags) {
                                Some(secs) if secs >= 0 => every = Some(secs),
                                Some(_) => {
                                    diags.push(Diagnostic::at(
                                        map,
                                        field.value.span,
                                        DiagnosticKind::InvalidResource,
                                        "cron job schedule must not be negative",
                                    ));
                                    failed = true;
                                }
                                // diagnostic already recorded by the evaluator
                                None => failed = true,
                            }
                        }
                        "Endpoint" => match &field.value.kind {
                            ExprKind::Ident(name) => {
                                endpoint = Some((None, name.clone()));
                            }
                            ExprKind::Selector { .. } => {
                                match qualified_ref(&field.value, &file.names) {
                                    Some((path, name)) => {
                                        endpoint = Some((Some(path.to_string()), name.to_string()));
                                    }
                                    None => {
                                        diags.push(Diagnostic::at(
                                            map,
                                            field.value.span,
                                            DiagnosticKind::InvalidResource,
                                            "cron job Endpoint must reference an endpoint function",
                                        ));
                                        failed = true;
                                    }
                                }
                            }
                            _ => {
                                diags.push(Diagnostic::at(
                                    map,
                                    field.value.span,
                                    DiagnosticKind::InvalidResource,
                                    "cron job Endpoint must reference an endpoint function",
                                ));
                                failed = true;
                            }
                        },
                        other => {
                            diags.push(Diagnostic::at(
                                map,
                                field.name.span,
                                DiagnosticKind::InvalidResource,
                                format!("unknown JobConfig field: {}", other),
                            ));
                            failed = true;
                        }
                    }
                }

                if failed {
                    continue;
                }
                let Some(every_secs) = every else {
                    diags.push(Diagnostic::at(
                        map,
                        config_arg.span,
                        DiagnosticKind::InvalidResource,
                        "cron job must set Every",
                    ));
                    continue;
                };
                let Some((endpoint_import_path, endpoint_name)) = endpoint else {
                    diags.push(Diagnostic::at(
                        map,
                        config_arg.span,
                        DiagnosticKind::InvalidResource,
                        "cron job must set Endpoint",
                    ));
                    continue;
                };

                jobs.push(JobDraft {
                    id: id.to_string(),
                    title: title.unwrap_or_else(|| id.to_string()),
                    every_secs,
                    endpoint_import_path,
                    endpoint_name,
                    pkg_rel_path: pkg.rel_path.clone(),
                    span: init.span,
                });
            }
        }
    }
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::collect::package_from_sources;
    use crate::analyze::names::resolve_names;

    fn extract(source: &str) -> (Vec<JobDraft>, Vec<Diagnostic>) {
        let mut map = SourceMap::new();
        let mut packages = vec![package_from_sources(
            &mut map,
            "test.path",
            "email",
            &[("email.go", source)],
        )];
        resolve_names(&mut packages);
        let mut diags = Diagnostics::new();
        let jobs = extract_jobs(&packages, &ConstantRegistry::builtin(), &map, &mut diags);
        (jobs, diags.into_sorted())
    }

    #[test]
    fn test_extracts_job_with_evaluated_schedule() {
        let (jobs, diags) = extract(
            r#"
package email

import "atlas.dev/cron"

var _ = cron.NewJob("digest", cron.JobConfig{
    Title:    "Send the daily digest",
    Every:    24 * cron.Hour,
    Endpoint: SendDigest,
})
"#,
        );
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "digest");
        assert_eq!(jobs[0].title, "Send the daily digest");
        assert_eq!(jobs[0].every_secs, 24 * 3600);
        assert_eq!(jobs[0].endpoint_import_path, None);
        assert_eq!(jobs[0].endpoint_name, "SendDigest");
        assert_eq!(jobs[0].pkg_rel_path, "email");
    }

    #[test]
    fn test_title_defaults_to_id() {
        let (jobs, diags) = extract(
            r#"
package email

import "atlas.dev/cron"

var _ = cron.NewJob("cleanup", cron.JobConfig{
    Every:    cron.Hour,
    Endpoint: Cleanup,
})
"#,
        );
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(jobs[0].title, "cleanup");
    }

    #[test]
    fn test_qualified_endpoint_reference() {
        let (jobs, diags) = extract(
            r#"
package email

import (
    "atlas.dev/cron"
    "test.path/billing"
)

var _ = cron.NewJob("invoice", cron.JobConfig{
    Title:    "Send invoices",
    Every:    cron.Hour,
    Endpoint: billing.SendInvoices,
})
"#,
        );
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            jobs[0].endpoint_import_path.as_deref(),
            Some("test.path/billing")
        );
        assert_eq!(jobs[0].endpoint_name, "SendInvoices");
    }

    #[test]
    fn test_float_schedule_skips_job() {
        let (jobs, diags) = extract(
            r#"
package email

import "atlas.dev/cron"

var _ = cron.NewJob("digest", cron.JobConfig{
    Title:    "Bad schedule",
    Every:    1.5 * cron.Hour,
    Endpoint: SendDigest,
})
"#,
        );
        assert!(jobs.is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::FloatNotSupported);
    }

    #[test]
    fn test_missing_every_is_invalid() {
        let (jobs, diags) = extract(
            r#"
package email

import "atlas.dev/cron"

var _ = cron.NewJob("digest", cron.JobConfig{
    Title:    "No schedule",
    Endpoint: SendDigest,
})
"#,
        );
        assert!(jobs.is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::InvalidResource);
        assert!(diags[0].message.contains("Every"), "{}", diags[0].message);
    }

    #[test]
    fn test_duplicate_job_id() {
        let (jobs, diags) = extract(
            r#"
package email

import "atlas.dev/cron"

var _ = cron.NewJob("digest", cron.JobConfig{
    Every:    cron.Hour,
    Endpoint: SendDigest,
})

var _ = cron.NewJob("digest", cron.JobConfig{
    Every:    cron.Minute,
    Endpoint: SendDigest,
})
"#,
        );
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].every_secs, 3600);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ResourceConflict);
    }

    #[test]
    fn test_negative_schedule_is_invalid() {
        let (jobs, diags) = extract(
            r#"
package email

import "atlas.dev/cron"

var _ = cron.NewJob("digest", cron.JobConfig{
    Every:    0 - cron.Hour,
    Endpoint: SendDigest,
})
"#,
        );
        assert!(jobs.is_empty());
        assert_eq!(diags.len(), 1);
        assert!(
            diags[0].message.contains("negative"),
            "{}",
            diags[0].message
        );
    }
}
