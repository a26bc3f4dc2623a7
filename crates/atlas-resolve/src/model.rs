//! The application model produced by a successful analysis run.
//!
//! Everything here is plain data: created once during assembly, immutable
//! afterwards, and serializable for downstream tooling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The complete extracted model of one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppModel {
    /// Module path prefix the import paths are rooted at.
    pub module_path: String,
    pub packages: Vec<Package>,
    pub services: Vec<Service>,
    pub jobs: Vec<ScheduledJob>,
}

/// One source package: a directory of files with a consistent declared
/// package name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Declared package name.
    pub name: String,
    /// `module_path + "/" + rel_path` (just `module_path` at the root).
    pub import_path: String,
    /// Slash-separated path relative to the tree root; `.` for the root.
    pub rel_path: String,
    /// Directory on disk.
    pub dir: PathBuf,
    /// Infrastructure resources declared by this package.
    pub resources: Vec<Resource>,
}

/// A declared infrastructure resource, tagged by kind.
///
/// New kinds are added by extending this enum and registering a builder
/// in [`crate::registry::ResourceRegistry`]; the extraction pass itself
/// never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
    /// A named SQL database handle.
    SqlDatabase {
        /// Variable the handle is bound to.
        ident: String,
        /// Database name passed to the constructor.
        db_name: String,
    },
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::SqlDatabase { .. } => ResourceKind::SqlDatabase,
        }
    }

    /// Identifier the resource is bound to in its package.
    pub fn ident(&self) -> &str {
        match self {
            Resource::SqlDatabase { ident, .. } => ident,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    SqlDatabase,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::SqlDatabase => write!(f, "sqldb"),
        }
    }
}

/// A directory-scoped group of endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Directory base name (package name for a root-level service).
    pub name: String,
    /// Slash-separated directory path relative to the tree root.
    pub rel_path: String,
    /// Endpoints in declaration order.
    pub endpoints: Vec<Endpoint>,
    /// Names of SQL databases declared by packages under this service's
    /// directory, sorted.
    pub databases: Vec<String>,
}

/// A remotely callable operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub access: Access,
    /// Raw endpoints receive the underlying request/response pair
    /// instead of decoded values.
    pub raw: bool,
    /// Route override from `path=`; `None` means the default route.
    pub path: Option<String>,
}

/// Access level of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Private,
    Auth,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Public => write!(f, "public"),
            Access::Private => write!(f, "private"),
            Access::Auth => write!(f, "auth"),
        }
    }
}

/// A recurring job triggered on a fixed interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: String,
    pub title: String,
    /// Trigger interval in whole seconds.
    pub every_secs: i64,
    /// The endpoint invoked on each trigger.
    pub endpoint: EndpointRef,
}

/// Resolved reference to an endpoint of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRef {
    pub service: String,
    pub endpoint: String,
}
