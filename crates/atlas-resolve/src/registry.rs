//! Registries of recognized construction patterns.
//!
//! Both registries are explicit values: built once when the engine is
//! configured, passed through the call chain, and never mutated during a
//! run. Adding a resource kind or a named constant means registering it
//! here; the traversal passes stay untouched.

use crate::model::Resource;
use atlas_ast::{Expr, Ident, Span};
use indexmap::IndexMap;

/// Import path of the cron runtime package.
pub const CRON_IMPORT_PATH: &str = "atlas.dev/cron";
/// Import path of the SQL database runtime package.
pub const SQLDB_IMPORT_PATH: &str = "atlas.dev/storage/sqldb";

/// A matched resource construction site, handed to a builder.
pub struct ResourceCall<'a> {
    /// Variable the construction is assigned to.
    pub ident: &'a Ident,
    /// Literal call arguments.
    pub args: &'a [Expr],
    /// Span of the whole initializer call.
    pub span: Span,
}

/// Builds a [`Resource`] from a matched construction site, or explains
/// why the site is malformed.
pub type ResourceBuilder = fn(&ResourceCall<'_>) -> Result<Resource, String>;

/// Table of `(import path, symbol)` → resource builder.
#[derive(Default)]
pub struct ResourceRegistry {
    builders: IndexMap<(String, String), ResourceBuilder>,
}

impl ResourceRegistry {
    /// An empty registry with no recognized patterns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in patterns of the `atlas.dev` runtime.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(SQLDB_IMPORT_PATH, "Named", build_sql_database);
        registry
    }

    /// Register a construction pattern.
    pub fn register(&mut self, import_path: &str, symbol: &str, builder: ResourceBuilder) {
        self.builders
            .insert((import_path.to_string(), symbol.to_string()), builder);
    }

    /// Look up the builder for a resolved callee.
    pub fn lookup(&self, import_path: &str, symbol: &str) -> Option<ResourceBuilder> {
        self.builders
            .get(&(import_path.to_string(), symbol.to_string()))
            .copied()
    }
}

fn build_sql_database(call: &ResourceCall<'_>) -> Result<Resource, String> {
    match call.args {
        [arg] => match arg.as_string_lit() {
            Some(db_name) => Ok(Resource::SqlDatabase {
                ident: call.ident.name.clone(),
                db_name: db_name.to_string(),
            }),
            None => Err("sqldb.Named requires a string literal database name".to_string()),
        },
        _ => Err("sqldb.Named takes exactly one argument".to_string()),
    }
}

/// Table of `(import path, symbol)` → integer constant value, consumed
/// by the schedule evaluator.
#[derive(Debug, Clone, Default)]
pub struct ConstantRegistry {
    values: IndexMap<(String, String), i64>,
}

impl ConstantRegistry {
    /// An empty registry with no known constants.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in duration constants of the cron package, in seconds.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(CRON_IMPORT_PATH, "Minute", 60);
        registry.register(CRON_IMPORT_PATH, "Hour", 3600);
        registry
    }

    /// Register a named constant.
    pub fn register(&mut self, import_path: &str, symbol: &str, value: i64) {
        self.values
            .insert((import_path.to_string(), symbol.to_string()), value);
    }

    /// Value of a resolved constant reference.
    pub fn get(&self, import_path: &str, symbol: &str) -> Option<i64> {
        self.values
            .get(&(import_path.to_string(), symbol.to_string()))
            .copied()
    }
}
