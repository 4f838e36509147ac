//! SmartScript Lexer
//!
//! Tokenizes SmartScript documents into a stream of tokens.
//! Switches between plain-text mode and tag mode (`{$ ... $}`), resolves
//! text and string escapes, and recognizes variables, `@functions`,
//! operators, and numeric literals inside tags.
//!
//! # Example
//!
//! ```
//! use smartscript_lexer::Scanner;
//!
//! let tokens = Scanner::tokenize("").unwrap();
//! assert_eq!(tokens.len(), 1); // Just EOF
//! ```

pub mod scanner;
pub mod token;

pub use scanner::{Scanner, ScannerMode};
pub use token::{Operator, Span, Token, TokenKind};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {kind}")]
pub struct LexerError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
}

/// What went wrong while scanning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("invalid escape sequence '{0}'")]
    InvalidEscape(String),

    #[error("unterminated string")]
    UnterminatedString,

    #[error("unexpected character '{0}'")]
    InvalidToken(char),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unterminated tag, expected '$}}'")]
    UnterminatedTag,

    #[error("token requested after end of input")]
    Exhausted,
}
