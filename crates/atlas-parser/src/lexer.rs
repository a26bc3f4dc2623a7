//! Lexical analysis using logos.
//!
//! Comments are stripped during lexing, with one exception: `//atlas:`
//! directive comments become [`Token::Directive`] so the parser can
//! attach them to the following declaration.
//!
//! Characters the grammar has no use for (the full operator set of
//! function bodies, mostly) lex as [`Token::Unknown`] rather than
//! failing; the parser accepts them only while skipping bodies.

use logos::{Filter, Lexer, Logos};
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

/// A lexical token of the scanned source subset.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")] // whitespace
#[logos(skip r"/\*([^*]|\*[^/])*\*/")] // block comments
#[logos(skip r"'([^'\\\n]|\\.)*'")] // char literals (only inside skipped bodies)
pub enum Token {
    // === Keywords ===
    /// Keyword `package`
    #[token("package")]
    Package,
    /// Keyword `import`
    #[token("import")]
    Import,
    /// Keyword `var`
    #[token("var")]
    Var,
    /// Keyword `const`
    #[token("const")]
    Const,
    /// Keyword `func`
    #[token("func")]
    Func,

    // === Literals ===
    /// Integer literal
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    /// Decimal literal. Kept distinct from [`Token::Int`] because the
    /// schedule evaluator rejects decimals outright.
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok(), priority = 3)]
    Float(f64),

    /// Interpreted string literal
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unescape_string(lex.slice()))]
    /// Raw string literal (no escapes)
    #[regex(r"`[^`]*`", |lex| {
        let s = lex.slice();
        Some(Rc::from(&s[1..s.len() - 1]))
    })]
    Str(Rc<str>),

    /// Identifier (including the blank identifier `_`)
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| Rc::from(lex.slice()))]
    Ident(Rc<str>),

    /// `//atlas:` directive comment; payload is the text after the
    /// prefix. Every other line comment is skipped by the same pattern.
    #[regex(r"//[^\n]*", line_comment)]
    Directive(Rc<str>),

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("=")]
    Assign,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    /// Any character the grammar does not use. Tolerated only inside
    /// skipped function bodies.
    Unknown,
}

/// Tokenize a source file into `(token, byte_span)` pairs.
///
/// Lexing never fails: unrecognized characters become [`Token::Unknown`]
/// and are rejected later by the parser with a positioned error.
pub fn lex(source: &str) -> Vec<(Token, Range<usize>)> {
    Token::lexer(source)
        .spanned()
        .map(|(tok, span)| (tok.unwrap_or(Token::Unknown), span))
        .collect()
}

/// Emit directive comments, skip everything else.
fn line_comment(lex: &mut Lexer<'_, Token>) -> Filter<Rc<str>> {
    match lex.slice().strip_prefix("//atlas:") {
        Some(rest) => Filter::Emit(Rc::from(rest.trim())),
        None => Filter::Skip,
    }
}

fn unescape_string(slice: &str) -> Option<Rc<str>> {
    let inner = &slice[1..slice.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next()? {
                'n' => result.push('\n'),
                't' => result.push('\t'),
                'r' => result.push('\r'),
                '\\' => result.push('\\'),
                '"' => result.push('"'),
                other => result.push(other),
            }
        } else {
            result.push(c);
        }
    }
    Some(Rc::from(result.as_str()))
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Package => write!(f, "'package'"),
            Token::Import => write!(f, "'import'"),
            Token::Var => write!(f, "'var'"),
            Token::Const => write!(f, "'const'"),
            Token::Func => write!(f, "'func'"),
            Token::Int(n) => write!(f, "{}", n),
            Token::Float(x) => write!(f, "{}", x),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Ident(s) => write!(f, "'{}'", s),
            Token::Directive(s) => write!(f, "directive '{}'", s),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Comma => write!(f, "','"),
            Token::Dot => write!(f, "'.'"),
            Token::Semi => write!(f, "';'"),
            Token::Colon => write!(f, "':'"),
            Token::Assign => write!(f, "'='"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Unknown => write!(f, "unknown character"),
        }
    }
}
