// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Static analysis for Atlas applications.
//!
//! This crate scans a multi-package source tree and extracts the
//! declarative application model: packages, services with their RPC
//! endpoints, infrastructure resources, and scheduled jobs. The passes
//! run in a fixed order:
//!
//! ```text
//! Collect → Name Resolution → {Resources, Services, Jobs} → Assemble
//! ```
//!
//! with positioned diagnostics accumulated across every stage. A run
//! either produces a complete [`model::AppModel`] or the full, ordered
//! diagnostic list, never a partially populated model.

pub mod analyze;
pub mod error;
pub mod model;
pub mod registry;

pub use analyze::{analyze, analyze_with, Config};
pub use error::{AnalyzeError, Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use model::{
    Access, AppModel, Endpoint, EndpointRef, Package, Resource, ResourceKind, ScheduledJob, Service,
};
pub use registry::{ConstantRegistry, ResourceCall, ResourceRegistry};
