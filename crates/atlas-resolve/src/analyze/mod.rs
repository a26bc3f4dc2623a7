//! The analysis pipeline.
//!
//! Pass order is fixed:
//!
//! ```text
//! collect → names → resources → services → jobs → assemble
//! ```
//!
//! Collection and per-file parsing have no cross-file dependencies and
//! run on parallel workers; every later pass consumes the previous
//! pass's full output and runs single-threaded. The only shared state is
//! the diagnostics collection and the read-only registries.

mod assemble;
mod collect;
mod jobs;
mod names;
mod resources;
mod schedule;
mod services;

use crate::error::{AnalyzeError, Diagnostics};
use crate::model::AppModel;
use crate::registry::{ConstantRegistry, ResourceRegistry};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info};

/// Inputs of one analysis run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the application source tree, resolved against
    /// `working_dir` when relative.
    pub app_root: PathBuf,
    /// Directory relative paths are resolved from.
    pub working_dir: PathBuf,
    /// Module path prefix for package import paths.
    pub module_path: String,
    /// Optional cooperative cancellation flag, checked before each file.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Config {
    pub fn new(app_root: impl Into<PathBuf>, module_path: impl Into<String>) -> Self {
        Self {
            app_root: app_root.into(),
            working_dir: PathBuf::from("."),
            module_path: module_path.into(),
            cancel: None,
        }
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = working_dir.into();
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Analyze a source tree with the built-in registries.
pub fn analyze(cfg: &Config) -> Result<AppModel, AnalyzeError> {
    analyze_with(cfg, &ResourceRegistry::builtin(), &ConstantRegistry::builtin())
}

/// Analyze a source tree with caller-provided registries.
///
/// Returns the complete model only when zero diagnostics were recorded;
/// otherwise the full diagnostic list, sorted by source position.
pub fn analyze_with(
    cfg: &Config,
    resources: &ResourceRegistry,
    constants: &ConstantRegistry,
) -> Result<AppModel, AnalyzeError> {
    let mut diags = Diagnostics::new();

    let (map, mut packages) = collect::collect_packages(cfg, &mut diags)?;
    debug!(
        files = map.file_count(),
        packages = packages.len(),
        "collected source tree"
    );

    names::resolve_names(&mut packages);
    resources::extract_resources(&mut packages, resources, &map, &mut diags);
    let services = services::resolve_services(&packages, &map, &mut diags);
    let jobs = jobs::extract_jobs(&packages, constants, &map, &mut diags);
    let model = assemble::assemble(&cfg.module_path, packages, services, jobs, &map, &mut diags);

    if diags.is_empty() {
        info!(
            services = model.services.len(),
            jobs = model.jobs.len(),
            "analysis succeeded"
        );
        Ok(model)
    } else {
        debug!(diagnostics = diags.len(), "analysis failed");
        Err(AnalyzeError::Failed(diags.into_sorted()))
    }
}
