//! Positioned diagnostics and aggregate error reporting.
//!
//! Every pass records [`Diagnostic`]s into a shared [`Diagnostics`]
//! collection and keeps going; nothing short-circuits the run. At the
//! end the collection is sorted by (path, line, column) so reports are
//! deterministic regardless of traversal order or how many workers
//! parsed files.

use atlas_ast::{SourceMap, Span};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of diagnostic, by the pass that detects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    // Collection
    /// Unparseable source file.
    Syntax,
    /// A directory declares two or more package names.
    PackageConflict,

    // Resource extraction
    /// Duplicate resource identifier within a package.
    ResourceConflict,
    /// A recognized resource construction with invalid arguments.
    InvalidResource,

    // Service resolution
    /// Duplicate endpoint name within a service.
    EndpointConflict,
    /// Endpoint function signature does not match the required shape.
    InvalidSignature,
    /// Malformed `//atlas:` directive.
    InvalidDirective,

    // Schedule evaluation
    /// Named constant that is not in the constant registry.
    UnknownConstant,
    /// Decimal literal in an integer-only schedule expression.
    FloatNotSupported,
    /// Division by a zero divisor.
    DivideByZero,

    // Assembly
    /// Scheduled job referencing an endpoint that does not exist.
    DanglingReference,
}

/// Human-readable names, in declaration order of the enum.
const KIND_NAMES: &[(DiagnosticKind, &str)] = &[
    (DiagnosticKind::Syntax, "syntax error"),
    (DiagnosticKind::PackageConflict, "package conflict"),
    (DiagnosticKind::ResourceConflict, "resource conflict"),
    (DiagnosticKind::InvalidResource, "invalid resource"),
    (DiagnosticKind::EndpointConflict, "endpoint conflict"),
    (DiagnosticKind::InvalidSignature, "invalid signature"),
    (DiagnosticKind::InvalidDirective, "invalid directive"),
    (DiagnosticKind::UnknownConstant, "unknown constant"),
    (DiagnosticKind::FloatNotSupported, "float not supported"),
    (DiagnosticKind::DivideByZero, "divide by zero"),
    (DiagnosticKind::DanglingReference, "dangling reference"),
];

impl DiagnosticKind {
    /// Human-readable name for this kind.
    pub fn name(self) -> &'static str {
        KIND_NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, name)| *name)
            .unwrap_or("diagnostic")
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single positioned diagnostic. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Root-relative, slash-separated source path.
    pub path: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    /// Error diagnostic at an explicit position.
    pub fn error(
        kind: DiagnosticKind,
        path: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            line,
            column,
            severity: Severity::Error,
            kind,
            message: message.into(),
        }
    }

    /// Error diagnostic at the position of `span`.
    pub fn at(map: &SourceMap, span: Span, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        let (line, column) = map.line_col(&span);
        Self::error(kind, map.rel_path(&span), line, column, message)
    }

    fn sort_key(&self) -> (&str, u32, u32, &str) {
        (&self.path, self.line, self.column, &self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.path, self.line, self.column, self.severity, self.message
        )
    }
}

/// Append-only diagnostic collection shared by all passes.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Merge a locally-buffered collection (e.g. from a parse worker).
    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Consume the collection, ordered by (path, line, column, message).
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.items.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        self.items
    }
}

/// Failure of a whole analysis run.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// One or more diagnostics were recorded; the list is complete and
    /// sorted.
    #[error("analysis failed with {} diagnostic(s)", .0.len())]
    Failed(Vec<Diagnostic>),

    /// The cancellation flag was set mid-run.
    #[error("analysis cancelled")]
    Cancelled,

    /// The source tree could not be read.
    #[error("failed to read source tree: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzeError {
    /// The recorded diagnostics, if this is a diagnostic failure.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            AnalyzeError::Failed(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}
