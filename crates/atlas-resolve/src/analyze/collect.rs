//! Package collection: walk the tree, group files by directory, parse.
//!
//! Each directory with source files yields at most one package. Files of
//! one directory must agree on the declared package name; a disagreement
//! is a hard conflict and the directory yields no package at all, so
//! later passes never see it. Directories without source files are
//! silently omitted.
//!
//! Per-file parsing has no cross-file dependencies and runs on rayon
//! workers; results are folded back in deterministic directory/file
//! order, so diagnostics come out identically no matter how many workers
//! ran.

use super::names::NameTable;
use super::Config;
use crate::error::{AnalyzeError, Diagnostic, DiagnosticKind, Diagnostics};
use crate::model::Resource;
use atlas_ast::{FileAst, SourceMap, Span};
use atlas_parser::ParseError;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use walkdir::{DirEntry, WalkDir};

/// Extension of qualifying source files.
const SOURCE_EXT: &str = "go";

/// A parsed source file within a package.
pub(crate) struct ParsedFile {
    pub file_id: u16,
    pub ast: FileAst,
    /// Import/selector bindings; filled by the name resolution pass.
    pub names: NameTable,
}

/// A collected package before assembly into the public model.
pub(crate) struct RawPackage {
    pub name: String,
    pub import_path: String,
    pub rel_path: String,
    pub dir: PathBuf,
    pub files: Vec<ParsedFile>,
    pub resources: Vec<Resource>,
}

/// Walk the tree rooted at the config, parse every qualifying file, and
/// group the results into packages.
pub(crate) fn collect_packages(
    cfg: &Config,
    diags: &mut Diagnostics,
) -> Result<(SourceMap, Vec<RawPackage>), AnalyzeError> {
    let root = cfg.working_dir.join(&cfg.app_root);

    // Qualifying files grouped by directory, in sorted walk order.
    let mut dirs: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for entry in WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored_dir(e))
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXT) {
            continue;
        }
        let dir = path.parent().unwrap_or(&root).to_path_buf();
        dirs.entry(dir).or_default().push(path.to_path_buf());
    }

    // Read sources and hand out file ids in deterministic order.
    let mut map = SourceMap::new();
    let mut file_ids: BTreeMap<PathBuf, Vec<u16>> = BTreeMap::new();
    for (dir, files) in &dirs {
        for path in files {
            let source = fs::read_to_string(path)?;
            let rel = rel_path(&root, path);
            let file_id = map.add_file(path.clone(), rel, source);
            file_ids.entry(dir.clone()).or_default().push(file_id);
        }
    }

    // Parse on parallel workers, checking the abort flag per file.
    let all_ids: Vec<u16> = file_ids.values().flatten().copied().collect();
    let parsed: Vec<Option<(u16, Result<FileAst, ParseError>)>> = all_ids
        .par_iter()
        .map(|&file_id| {
            if let Some(cancel) = &cfg.cancel {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
            }
            let source = &map.file_at(file_id).source;
            Some((file_id, atlas_parser::parse_file(source, file_id)))
        })
        .collect();
    if parsed.iter().any(Option::is_none) {
        return Err(AnalyzeError::Cancelled);
    }
    let mut results: BTreeMap<u16, Result<FileAst, ParseError>> =
        parsed.into_iter().flatten().collect();

    // Fold per-directory results into packages, deterministic order.
    let mut packages = Vec::new();
    for (dir, ids) in &file_ids {
        let mut files = Vec::new();
        for &file_id in ids {
            match results.remove(&file_id).expect("file parsed exactly once") {
                Ok(ast) => files.push(ParsedFile {
                    file_id,
                    ast,
                    names: NameTable::default(),
                }),
                Err(err) => {
                    diags.push(Diagnostic::at(
                        &map,
                        err.span,
                        DiagnosticKind::Syntax,
                        err.message,
                    ));
                }
            }
        }
        if files.is_empty() {
            continue;
        }

        if let Some((first, conflicting, span)) = package_name_conflict(&files) {
            diags.push(Diagnostic::at(
                &map,
                span,
                DiagnosticKind::PackageConflict,
                format!(
                    "got multiple package names in directory: {} and {}",
                    first, conflicting
                ),
            ));
            continue;
        }

        let rel = rel_path(&root, dir);
        let rel = if rel.is_empty() { ".".to_string() } else { rel };
        let import_path = if rel == "." {
            cfg.module_path.clone()
        } else {
            format!("{}/{}", cfg.module_path, rel)
        };
        packages.push(RawPackage {
            name: files[0].ast.package.name.clone(),
            import_path,
            rel_path: rel,
            dir: dir.clone(),
            files,
            resources: Vec::new(),
        });
    }

    Ok((map, packages))
}

/// First pair of disagreeing package names in file order, if any.
fn package_name_conflict(files: &[ParsedFile]) -> Option<(&str, &str, Span)> {
    let first = files[0].ast.package.name.as_str();
    files
        .iter()
        .find(|f| f.ast.package.name != first)
        .map(|f| (first, f.ast.package.name.as_str(), f.ast.package.span))
}

/// Directories the walk never descends into: hidden, `_`-prefixed, and
/// conventional non-source trees. The walk root itself is exempt.
fn is_ignored_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
        || name.starts_with('_')
        || name == "testdata"
        || name == "vendor"
        || name == "node_modules"
}

/// Slash-separated path of `path` relative to `root`; empty for the root
/// itself.
fn rel_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Build a package directly from in-memory sources. Panics on parse
/// errors; fixtures are expected to be valid.
#[cfg(test)]
pub(crate) fn package_from_sources(
    map: &mut SourceMap,
    module_path: &str,
    rel_dir: &str,
    sources: &[(&str, &str)],
) -> RawPackage {
    let mut files = Vec::new();
    for (file_name, source) in sources {
        let rel = format!("{}/{}", rel_dir, file_name);
        let file_id = map.add_file(PathBuf::from(&rel), rel.clone(), source.to_string());
        let ast = atlas_parser::parse_file(&map.file_at(file_id).source, file_id)
            .unwrap_or_else(|e| panic!("fixture {} failed to parse: {}", rel, e));
        files.push(ParsedFile {
            file_id,
            ast,
            names: NameTable::default(),
        });
    }
    let name = files[0].ast.package.name.clone();
    RawPackage {
        name,
        import_path: format!("{}/{}", module_path, rel_dir),
        rel_path: rel_dir.to_string(),
        dir: PathBuf::from(rel_dir),
        files,
        resources: Vec::new(),
    }
}
