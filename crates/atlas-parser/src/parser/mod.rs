//! Hand-written recursive descent parser.
//!
//! ## Architecture
//!
//! - `stream`: token stream wrapper with lookahead
//! - `error`: positioned parse errors
//! - `expr`: expression parser (precedence climbing)
//! - `decl`: file and declaration parsers (keyword-dispatched)
//!
//! Parsing stops at the first error; the caller reports it as one
//! syntax diagnostic for the file and moves on to sibling files.

mod decl;
mod error;
mod expr;
mod stream;

pub use error::{ParseError, ParseErrorKind};
use stream::TokenStream;

use crate::lexer::{lex, Token};
use atlas_ast::{FileAst, NodeId};
use std::ops::Range;

/// Parse one source file.
///
/// `file_id` keys every span in the returned tree into the caller's
/// `SourceMap`.
pub fn parse_file(source: &str, file_id: u16) -> Result<FileAst, ParseError> {
    let tokens = lex(source);
    let mut parser = Parser::new(&tokens, file_id);
    decl::parse_file(&mut parser)
}

/// Parse a sequence of pre-lexed tokens.
pub fn parse_tokens(
    tokens: &[(Token, Range<usize>)],
    file_id: u16,
) -> Result<FileAst, ParseError> {
    let mut parser = Parser::new(tokens, file_id);
    decl::parse_file(&mut parser)
}

/// Parser state: the token stream plus the per-file node id counter.
pub(crate) struct Parser<'src> {
    stream: TokenStream<'src>,
    next_id: NodeId,
}

impl<'src> Parser<'src> {
    fn new(tokens: &'src [(Token, Range<usize>)], file_id: u16) -> Self {
        Self {
            stream: TokenStream::new(tokens, file_id),
            next_id: 0,
        }
    }

    /// Allocate the next expression node id.
    fn fresh_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
