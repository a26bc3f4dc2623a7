//! Final assembly of the application model.
//!
//! Merges packages, services, and jobs, and cross-validates the
//! references between them. This is the only pass that sees all three
//! together, so endpoint references resolve here.

use super::collect::RawPackage;
use super::jobs::JobDraft;
use super::services::ServiceDraft;
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::model::{AppModel, EndpointRef, Package, Resource, ScheduledJob, Service};
use atlas_ast::SourceMap;

/// Merge the pass outputs into the final model, recording a
/// `DanglingReference` for every job whose endpoint does not resolve.
pub(crate) fn assemble(
    module_path: &str,
    packages: Vec<RawPackage>,
    services: Vec<ServiceDraft>,
    jobs: Vec<JobDraft>,
    map: &SourceMap,
    diags: &mut Diagnostics,
) -> AppModel {
    let services: Vec<Service> = services
        .into_iter()
        .map(|draft| {
            let mut databases: Vec<String> = packages
                .iter()
                .filter(|pkg| dir_within(&pkg.rel_path, &draft.rel_path))
                .flat_map(|pkg| pkg.resources.iter())
                .map(|resource| match resource {
                    Resource::SqlDatabase { db_name, .. } => db_name.clone(),
                })
                .collect();
            databases.sort();
            databases.dedup();
            Service {
                name: draft.name,
                rel_path: draft.rel_path,
                endpoints: draft.endpoints,
                databases,
            }
        })
        .collect();

    let mut resolved_jobs = Vec::new();
    for job in jobs {
        // A qualified reference targets the service at the referenced
        // package's directory; an unqualified one targets the job's own.
        let target_rel = match &job.endpoint_import_path {
            Some(path) => packages
                .iter()
                .find(|pkg| pkg.import_path == *path)
                .map(|pkg| pkg.rel_path.as_str()),
            None => Some(job.pkg_rel_path.as_str()),
        };
        let target = target_rel
            .and_then(|rel| services.iter().find(|svc| svc.rel_path == rel))
            .filter(|svc| svc.endpoints.iter().any(|e| e.name == job.endpoint_name));

        match target {
            Some(svc) => resolved_jobs.push(ScheduledJob {
                id: job.id,
                title: job.title,
                every_secs: job.every_secs,
                endpoint: EndpointRef {
                    service: svc.name.clone(),
                    endpoint: job.endpoint_name,
                },
            }),
            None => diags.push(Diagnostic::at(
                map,
                job.span,
                DiagnosticKind::DanglingReference,
                format!(
                    "cron job {} references unknown endpoint {}",
                    job.id, job.endpoint_name
                ),
            )),
        }
    }

    let packages = packages
        .into_iter()
        .map(|pkg| Package {
            name: pkg.name,
            import_path: pkg.import_path,
            rel_path: pkg.rel_path,
            dir: pkg.dir,
            resources: pkg.resources,
        })
        .collect();

    AppModel {
        module_path: module_path.to_string(),
        packages,
        services,
        jobs: resolved_jobs,
    }
}

/// Whether a package directory lies within a service directory.
fn dir_within(pkg_rel: &str, svc_rel: &str) -> bool {
    svc_rel == "."
        || pkg_rel == svc_rel
        || (pkg_rel.len() > svc_rel.len()
            && pkg_rel.starts_with(svc_rel)
            && pkg_rel.as_bytes()[svc_rel.len()] == b'/')
}
