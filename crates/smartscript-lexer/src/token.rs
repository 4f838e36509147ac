use std::fmt;

/// A position in source text, tracking line and column for error reporting.
///
/// `start` and `end` are character offsets, not byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// Token classification for SmartScript source.
///
/// Data-carrying variants embed their value directly (no separate `value` field on Token).
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A run of document text with escapes already resolved.
    Text(String),

    // Tag structure
    TagStart, // {$
    /// First token of a tag: `=` or the head identifier as written.
    TagName(String),
    TagEnd, // $}

    // Tag content (carry data)
    Variable(String),
    /// `@name`, stored without the `@`.
    Function(String),
    Operator(Operator),
    String(String),
    Integer(i64),
    Double(f64),

    // End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Text(text) => write!(f, "TEXT {text:?}"),
            TokenKind::TagStart => f.write_str("TAG_START"),
            TokenKind::TagName(name) => write!(f, "TAG_NAME {name}"),
            TokenKind::TagEnd => f.write_str("TAG_END"),
            TokenKind::Variable(name) => write!(f, "VARIABLE {name}"),
            TokenKind::Function(name) => write!(f, "FUNCTION @{name}"),
            TokenKind::Operator(op) => write!(f, "OPERATOR {}", op.symbol()),
            TokenKind::String(value) => write!(f, "STRING {value:?}"),
            TokenKind::Integer(value) => write!(f, "INTEGER {value}"),
            TokenKind::Double(value) => write!(f, "DOUBLE {value:?}"),
            TokenKind::Eof => f.write_str("EOF"),
        }
    }
}

/// A token produced by the SmartScript scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Arithmetic operator symbols allowed inside tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            '^' => Some(Operator::Pow),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::Pow => '^',
        }
    }
}
