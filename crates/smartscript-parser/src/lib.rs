//! SmartScript Parser
//!
//! Parses a SmartScript token stream into an Abstract Syntax Tree.
//! The parser pulls tokens from its own `Scanner` one at a time and tracks
//! open FOR loops on an explicit stack, so nesting depth is bounded by
//! memory rather than the call stack.

pub mod ast;
pub mod parser;

pub use ast::{Document, EchoNode, Element, ForLoopNode, Node, Operator, TextNode};
pub use parser::Parser;

use smartscript_lexer::{LexErrorKind, LexerError, Span};

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub(crate) fn at(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            line: span.line,
            column: span.column,
        }
    }
}

impl From<LexerError> for ParseError {
    fn from(e: LexerError) -> Self {
        Self {
            kind: ParseErrorKind::Lexer(e.kind),
            line: e.line,
            column: e.column,
        }
    }
}

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error(transparent)]
    Lexer(LexErrorKind),

    #[error("invalid FOR header: {0}")]
    InvalidForHeader(String),

    #[error("echo tag has no elements")]
    EmptyEchoTag,

    #[error("END tag without an open FOR")]
    UnexpectedEnd,

    #[error("FOR loop over '{0}' is never closed")]
    UnclosedFor(String),

    #[error("unknown tag '{0}'")]
    UnknownTag(String),

    #[error("unexpected {0}")]
    UnexpectedToken(String),
}
