//! Syntax tree and source tracking for the Atlas analyzer.
//!
//! This crate holds the data the front end produces and the analysis
//! passes consume: compact source spans with a [`SourceMap`] for
//! line/column lookup, and a small language-neutral syntax tree (files,
//! declarations, expressions tagged by kind). It contains no analysis
//! logic of its own.

pub mod ast;
pub mod span;
pub mod walk;

pub use ast::{
    BinOp, CompositeField, Decl, Directive, Expr, ExprKind, FileAst, FuncDecl, Ident, ImportDecl,
    NodeId, Param, TypeRef, UnaryOp, VarDecl,
};
pub use span::{SourceFile, SourceMap, Span};
