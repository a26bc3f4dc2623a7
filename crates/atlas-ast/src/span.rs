//! Source location tracking for diagnostics.
//!
//! - `Span` — compact source location (file id + byte range)
//! - `SourceMap` — owns all source files and resolves spans to
//!   line/column positions
//! - `SourceFile` — a single file with a precomputed line index
//!
//! Spans are cheap to copy and carry no path information; everything
//! human-readable is recovered through the [`SourceMap`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Compact reference to a byte range in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Index into `SourceMap` files.
    pub file_id: u16,
    /// Byte offset of the start position.
    pub start: u32,
    /// Byte offset of the end position (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(file_id: u16, start: u32, end: u32) -> Self {
        Self {
            file_id,
            start,
            end,
        }
    }

    /// Create a zero-length span at the start of a file.
    pub fn zero(file_id: u16) -> Self {
        Self::new(file_id, 0, 0)
    }

    /// Check if this span is zero-length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Span covering both `self` and `other`.
    ///
    /// # Panics
    /// Panics if the spans are from different files.
    pub fn merge(&self, other: &Span) -> Span {
        assert_eq!(
            self.file_id, other.file_id,
            "cannot merge spans from different files"
        );
        Span {
            file_id: self.file_id,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// All source files read during one analysis run.
///
/// File ids are handed out in insertion order, so runs over an unchanged
/// tree produce identical ids and therefore identical spans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

/// A single source file with a line-start index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path on disk.
    pub path: PathBuf,
    /// Slash-separated path relative to the analysis root; used in
    /// diagnostics so reports are stable across machines.
    pub rel_path: String,
    /// Original source text.
    pub source: String,
    /// Byte offsets of line starts; always ends with an EOF sentinel.
    line_starts: Vec<u32>,
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source file and return its id.
    pub fn add_file(&mut self, path: PathBuf, rel_path: String, source: String) -> u16 {
        let file_id = self.files.len();
        assert!(file_id < u16::MAX as usize, "too many source files");
        self.files.push(SourceFile::new(path, rel_path, source));
        file_id as u16
    }

    /// The file a span points into.
    pub fn file(&self, span: &Span) -> &SourceFile {
        &self.files[span.file_id as usize]
    }

    /// Look up a file by id.
    pub fn file_at(&self, file_id: u16) -> &SourceFile {
        &self.files[file_id as usize]
    }

    /// On-disk path for a span.
    pub fn file_path(&self, span: &Span) -> &Path {
        &self.files[span.file_id as usize].path
    }

    /// Root-relative path for a span.
    pub fn rel_path(&self, span: &Span) -> &str {
        &self.files[span.file_id as usize].rel_path
    }

    /// Source text covered by a span.
    pub fn snippet(&self, span: &Span) -> &str {
        let file = &self.files[span.file_id as usize];
        &file.source[span.start as usize..span.end as usize]
    }

    /// 1-based (line, column) of a span's start.
    pub fn line_col(&self, span: &Span) -> (u32, u32) {
        self.files[span.file_id as usize].line_col(span.start)
    }

    /// Number of files in the map.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Iterate over all files in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }
}

impl SourceFile {
    /// Create a file with a precomputed line index.
    pub fn new(path: PathBuf, rel_path: String, source: String) -> Self {
        let line_starts = compute_line_starts(&source);
        Self {
            path,
            rel_path,
            source,
            line_starts,
        }
    }

    /// 1-based (line, column) for a byte offset.
    ///
    /// # Panics
    /// Panics if `offset` is beyond EOF.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        assert!(
            offset <= self.source.len() as u32,
            "offset {} is beyond EOF (len = {})",
            offset,
            self.source.len()
        );

        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.max(1) - 1,
        };

        let line = (line_idx + 1) as u32;
        let col = (offset - self.line_starts[line_idx]) + 1;
        (line, col)
    }

    /// Number of lines in this file.
    pub fn line_count(&self) -> usize {
        self.line_starts.len() - 1
    }
}

/// Byte offsets of line starts, with an EOF sentinel so the last line's
/// range can always be computed.
fn compute_line_starts(source: &str) -> Vec<u32> {
    let mut line_starts = vec![0];
    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            line_starts.push((idx + 1) as u32);
        }
    }
    if line_starts.last() != Some(&(source.len() as u32)) {
        line_starts.push(source.len() as u32);
    }
    line_starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basics() {
        let span = Span::new(0, 10, 20);
        assert!(!span.is_empty());
        assert!(Span::zero(0).is_empty());

        let merged = span.merge(&Span::new(0, 15, 30));
        assert_eq!(merged.start, 10);
        assert_eq!(merged.end, 30);
    }

    #[test]
    #[should_panic(expected = "cannot merge spans from different files")]
    fn test_span_merge_panics_on_different_files() {
        let _ = Span::new(0, 0, 1).merge(&Span::new(1, 0, 1));
    }

    #[test]
    fn test_compute_line_starts() {
        assert_eq!(compute_line_starts("line 1\nline 2\nline 3"), vec![0, 7, 14, 20]);
        assert_eq!(compute_line_starts("line 1\nline 2\n"), vec![0, 7, 14]);
    }

    #[test]
    fn test_line_col() {
        let file = SourceFile::new(
            PathBuf::from("svc/svc.go"),
            "svc/svc.go".into(),
            "hello\nworld\n".into(),
        );
        assert_eq!(file.line_col(0), (1, 1));
        assert_eq!(file.line_col(5), (1, 6));
        assert_eq!(file.line_col(6), (2, 1));
        assert_eq!(file.line_count(), 2);
    }

    #[test]
    fn test_source_map_lookup() {
        let mut map = SourceMap::new();
        let id = map.add_file(
            PathBuf::from("/app/a/a.go"),
            "a/a.go".into(),
            "package a\nvar x = 1\n".into(),
        );
        let span = Span::new(id, 10, 13);
        assert_eq!(map.snippet(&span), "var");
        assert_eq!(map.line_col(&span), (2, 1));
        assert_eq!(map.rel_path(&span), "a/a.go");
    }
}
