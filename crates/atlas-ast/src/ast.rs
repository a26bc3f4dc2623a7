//! The syntax tree the front end produces.
//!
//! The tree is deliberately narrow: it models exactly the declaration and
//! expression shapes the analysis passes look at (package clauses, import
//! tables, top-level variables, annotated functions, and the literal
//! expression sublanguage used for resource construction and schedule
//! arithmetic). Function bodies are not represented at all; the parser
//! skips them.
//!
//! Every expression carries a [`NodeId`] unique within its file. Name
//! bindings produced by the resolver are keyed by these ids, which keeps
//! the tree itself immutable across passes.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Identity of an expression node, unique within one file.
pub type NodeId = u32;

/// A named occurrence in the source (declaration name, selector field,
/// composite-literal key, ...). Not an expression; identifier expressions
/// are [`ExprKind::Ident`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// One parsed source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAst {
    /// Declared package name from the package clause.
    pub package: Ident,
    pub imports: Vec<ImportDecl>,
    pub decls: Vec<Decl>,
}

/// A single import: `import "path"` or `import alias "path"`.
///
/// Grouped import blocks are flattened into one `ImportDecl` per path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub alias: Option<Ident>,
    pub path: String,
    pub span: Span,
}

impl ImportDecl {
    /// The name this import is referred to by: the explicit alias, or the
    /// last segment of the import path.
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => &alias.name,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    /// `var name = expr` (or `const name = expr`; the analyzer treats
    /// both identically).
    Var(VarDecl),
    /// `func Name(params) results { ... }` with the body skipped.
    Func(FuncDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Var(v) => v.span,
            Decl::Func(f) => f.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    /// Declared name; may be the blank identifier `_`.
    pub name: Ident,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: Ident,
    /// Directive comments immediately preceding the declaration, in
    /// source order.
    pub directives: Vec<Directive>,
    pub params: Vec<Param>,
    pub results: Vec<TypeRef>,
    pub span: Span,
}

impl FuncDecl {
    /// The first directive whose leading word equals `word`, if any.
    pub fn directive(&self, word: &str) -> Option<&Directive> {
        self.directives
            .iter()
            .find(|d| d.text.split_whitespace().next() == Some(word))
    }
}

/// An `//atlas:` directive comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// Text after the `//atlas:` prefix, untrimmed of interior spacing.
    pub text: String,
    pub span: Span,
}

/// A function parameter: `name Type` or a bare `Type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Option<Ident>,
    pub ty: TypeRef,
}

/// A type reference in a signature: `Name`, `pkg.Name`, or a pointer to
/// either. This is the only type syntax the analyzer understands; it
/// performs no type checking beyond shape matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub pointer: bool,
    /// Dotted path, e.g. `context.Context` or `Params`.
    pub path: String,
    pub span: Span,
}

impl TypeRef {
    /// Check the reference against a dotted path, ignoring pointer-ness.
    pub fn is(&self, path: &str) -> bool {
        self.path == path
    }
}

/// An expression, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    IntLit(i64),
    FloatLit(f64),
    StringLit(String),
    Ident(String),
    /// `base.sel`: field access or package-qualified reference; which of
    /// the two is decided by the resolver, not the parser.
    Selector {
        base: Box<Expr>,
        sel: Ident,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Parenthesized sub-expression. Kept explicit so evaluator
    /// diagnostics can point at the user's grouping.
    Paren(Box<Expr>),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `Type{Field: value, ...}`
    Composite {
        ty: Box<Expr>,
        fields: Vec<CompositeField>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeField {
    pub name: Ident,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind, span: Span) -> Self {
        Self { id, kind, span }
    }

    /// The string value if this is a string literal.
    pub fn as_string_lit(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::StringLit(s) => Some(s),
            _ => None,
        }
    }

    /// The identifier name if this is a bare identifier.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}
