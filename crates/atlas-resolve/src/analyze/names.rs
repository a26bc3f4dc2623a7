//! Name resolution: import tables and selector-qualifier bindings.
//!
//! # What this pass does
//!
//! 1. Builds the per-file import table (local name → import path).
//! 2. Walks every expression and records a [`Name`] binding for each
//!    selector qualifier that matches an import.
//!
//! # What this pass does NOT do
//!
//! - No lexical scoping: unqualified identifiers stay unresolved.
//! - No type inference: a binding only says "this identifier is the
//!   package imported from path P". Whether `P.Sym` means anything is
//!   decided by the consuming pass against its registry.
//! - No mutation of the syntax tree: bindings are keyed by node id.

use super::collect::RawPackage;
use atlas_ast::{walk, Expr, ExprKind, FileAst, NodeId};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Resolution of one identifier node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Name {
    /// Whether the identifier is a package qualifier (currently the only
    /// binding this pass produces).
    pub is_package: bool,
    /// Import path of the package the identifier refers to.
    pub import_path: String,
}

/// Per-file bindings; built once, read-only afterwards.
#[derive(Debug, Default)]
pub(crate) struct NameTable {
    imports: IndexMap<String, String>,
    bindings: HashMap<NodeId, Name>,
}

impl NameTable {
    /// Resolve one file.
    pub fn resolve_file(ast: &FileAst) -> NameTable {
        let mut imports = IndexMap::new();
        for import in &ast.imports {
            let local = import.local_name();
            // dot- and blank-imports introduce no usable qualifier
            if local == "." || local == "_" {
                continue;
            }
            imports.insert(local.to_string(), import.path.clone());
        }

        let mut bindings = HashMap::new();
        walk::walk_file(ast, &mut |expr| {
            if let ExprKind::Selector { base, .. } = &expr.kind {
                if let ExprKind::Ident(name) = &base.kind {
                    if let Some(path) = imports.get(name) {
                        bindings.insert(
                            base.id,
                            Name {
                                is_package: true,
                                import_path: path.clone(),
                            },
                        );
                    }
                }
            }
        });

        NameTable { imports, bindings }
    }

    /// Binding for an identifier node, if one was recorded.
    pub fn name_of(&self, id: NodeId) -> Option<&Name> {
        self.bindings.get(&id)
    }

    /// Import path for a local package name.
    pub fn import(&self, local: &str) -> Option<&str> {
        self.imports.get(local).map(String::as_str)
    }
}

/// Resolve every file of every package.
pub(crate) fn resolve_names(packages: &mut [RawPackage]) {
    for pkg in packages {
        for file in &mut pkg.files {
            file.names = NameTable::resolve_file(&file.ast);
        }
    }
}

/// A reference `pkg.Sym` resolved through the import table, as
/// `(import_path, symbol)`.
pub(crate) fn qualified_ref<'a>(expr: &'a Expr, names: &'a NameTable) -> Option<(&'a str, &'a str)> {
    let ExprKind::Selector { base, sel } = &expr.kind else {
        return None;
    };
    let name = names.name_of(base.id)?;
    if !name.is_package {
        return None;
    }
    Some((name.import_path.as_str(), sel.name.as_str()))
}

/// A call `pkg.Sym(args...)` resolved through the import table.
pub(crate) fn qualified_call<'a>(
    expr: &'a Expr,
    names: &'a NameTable,
) -> Option<(&'a str, &'a str, &'a [Expr])> {
    let ExprKind::Call { callee, args } = &expr.kind else {
        return None;
    };
    let (import_path, symbol) = qualified_ref(callee, names)?;
    Some((import_path, symbol, args))
}
