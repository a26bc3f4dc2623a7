//! Front end for the Atlas analyzer.
//!
//! Tokenizes and parses the narrow source subset the analyzer cares
//! about: package clauses, imports, top-level `var`/`const` declarations,
//! and function signatures with their `//atlas:` directives. Function
//! bodies are skipped with balanced-brace scanning; the analyzer never
//! looks inside them.
//!
//! The parser is hand-written recursive descent over a [`lexer::Token`]
//! stream. It isolates "which source language is being scanned" from the
//! analysis passes: everything downstream works on the `atlas_ast` tree.

pub mod lexer;
pub mod parser;

pub use lexer::{lex, Token};
pub use parser::{parse_file, ParseError, ParseErrorKind};
