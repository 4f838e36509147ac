use crate::token::{Operator, Span, Token, TokenKind};
use crate::{LexErrorKind, LexerError};

/// Scanner mode determines how characters are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerMode {
    /// Default mode: everything is document text until an unescaped `{$`.
    Text,
    /// Inside a `{$ ... $}` tag: whitespace-separated elements.
    Tag,
}

/// SmartScript source scanner.
///
/// Produces tokens one at a time through [`Scanner::next_token`].
/// The stream is a single forward pass: exactly one `Eof` token is
/// produced, and asking for another token afterwards is an error.
///
/// - `Vec<char>` source for index-based navigation
/// - Mode switch between text and tag content
/// - Position tracking on every token
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    mode: ScannerMode,
    /// Set right after `{$`, so the next token is the tag name.
    at_tag_head: bool,
    /// Position of the `{$` that opened the current tag.
    tag_open: (usize, usize),
    finished: bool,
}

impl Scanner {
    /// Create a new scanner for the given source.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            mode: ScannerMode::Text,
            at_tag_head: false,
            tag_open: (1, 1),
            finished: false,
        }
    }

    /// Tokenize the entire source into a vector of tokens, ending with `Eof`.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = scanner.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Current lexical mode.
    pub fn mode(&self) -> ScannerMode {
        self.mode
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        if self.finished {
            return Err(self.error(LexErrorKind::Exhausted));
        }

        match self.mode {
            ScannerMode::Text => self.scan_text(),
            ScannerMode::Tag => self.scan_tag_token(),
        }
    }

    // --- Text mode ---

    fn scan_text(&mut self) -> Result<Token, LexerError> {
        let start_line = self.line;
        let start_col = self.column;
        let start_pos = self.pos;

        if self.is_at_end() {
            self.finished = true;
            return Ok(self.token(TokenKind::Eof, start_pos, start_line, start_col));
        }

        if self.at_tag_open() {
            self.advance();
            self.advance();
            self.mode = ScannerMode::Tag;
            self.at_tag_head = true;
            self.tag_open = (start_line, start_col);
            return Ok(self.token(TokenKind::TagStart, start_pos, start_line, start_col));
        }

        let mut text = String::new();

        while !self.is_at_end() && !self.at_tag_open() {
            if self.peek() == '\\' {
                let (esc_line, esc_col) = (self.line, self.column);
                self.advance(); // consume backslash
                match self.peek_opt() {
                    Some(c @ ('{' | '\\')) => {
                        text.push(c);
                        self.advance();
                    }
                    other => {
                        return Err(LexerError {
                            kind: LexErrorKind::InvalidEscape(escape_text(other)),
                            line: esc_line,
                            column: esc_col,
                        });
                    }
                }
            } else {
                text.push(self.peek());
                self.advance();
            }
        }

        Ok(self.token(TokenKind::Text(text), start_pos, start_line, start_col))
    }

    // --- Tag mode ---

    fn scan_tag_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();

        if self.is_at_end() {
            let (line, column) = self.tag_open;
            return Err(LexerError {
                kind: LexErrorKind::UnterminatedTag,
                line,
                column,
            });
        }

        let head = std::mem::take(&mut self.at_tag_head);
        let start_line = self.line;
        let start_col = self.column;
        let start_pos = self.pos;
        let ch = self.peek();

        let kind = match ch {
            '$' if self.peek_next() == '}' => {
                self.advance();
                self.advance();
                self.mode = ScannerMode::Text;
                TokenKind::TagEnd
            }
            '=' if head => {
                self.advance();
                TokenKind::TagName("=".into())
            }
            c if c.is_ascii_alphabetic() => {
                let ident = self.scan_identifier();
                if head {
                    TokenKind::TagName(ident)
                } else {
                    TokenKind::Variable(ident)
                }
            }
            '@' => {
                if !self.peek_next().is_ascii_alphabetic() {
                    return Err(self.error(LexErrorKind::InvalidToken('@')));
                }
                self.advance(); // consume @
                TokenKind::Function(self.scan_identifier())
            }
            '"' => self.scan_string()?,
            '0'..='9' => self.scan_number()?,
            '-' if self.peek_next().is_ascii_digit() => self.scan_number()?,
            c => match Operator::from_symbol(c) {
                Some(op) => {
                    self.advance();
                    TokenKind::Operator(op)
                }
                None => return Err(self.error(LexErrorKind::InvalidToken(c))),
            },
        };

        Ok(self.token(kind, start_pos, start_line, start_col))
    }

    /// Scan an identifier: `[A-Za-z][A-Za-z0-9_]*`.
    fn scan_identifier(&mut self) -> String {
        let mut ident = String::new();
        ident.push(self.peek());
        self.advance();

        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == '_') {
            ident.push(self.peek());
            self.advance();
        }

        ident
    }

    /// Scan a double-quoted string literal. Only `\"` and `\\` are escapes.
    fn scan_string(&mut self) -> Result<TokenKind, LexerError> {
        let start_line = self.line;
        let start_col = self.column;
        self.advance(); // consume opening quote

        let mut value = String::new();

        loop {
            match self.peek_opt() {
                None => {
                    return Err(LexerError {
                        kind: LexErrorKind::UnterminatedString,
                        line: start_line,
                        column: start_col,
                    });
                }
                Some('"') => {
                    self.advance(); // consume closing quote
                    return Ok(TokenKind::String(value));
                }
                Some('\\') => {
                    let (esc_line, esc_col) = (self.line, self.column);
                    self.advance(); // consume backslash
                    match self.peek_opt() {
                        Some(c @ ('"' | '\\')) => {
                            value.push(c);
                            self.advance();
                        }
                        None => {
                            return Err(LexerError {
                                kind: LexErrorKind::UnterminatedString,
                                line: start_line,
                                column: start_col,
                            });
                        }
                        other => {
                            return Err(LexerError {
                                kind: LexErrorKind::InvalidEscape(escape_text(other)),
                                line: esc_line,
                                column: esc_col,
                            });
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Scan an integer or double literal, with an optional attached `-`.
    ///
    /// A fraction (`.` followed by digits) or an exponent makes it a double.
    /// Integers that do not fit in `i64` are rejected rather than promoted.
    fn scan_number(&mut self) -> Result<TokenKind, LexerError> {
        let start_line = self.line;
        let start_col = self.column;
        let mut text = String::new();

        if self.peek() == '-' {
            text.push('-');
            self.advance();
        }
        self.take_digits(&mut text);

        let mut is_double = false;

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            text.push('.');
            self.advance();
            self.take_digits(&mut text);
            is_double = true;
        }

        if matches!(self.peek(), 'e' | 'E') && self.exponent_follows() {
            text.push('e');
            self.advance();
            if matches!(self.peek(), '+' | '-') {
                text.push(self.peek());
                self.advance();
            }
            self.take_digits(&mut text);
            is_double = true;
        }

        let kind = if is_double {
            text.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(TokenKind::Double)
        } else {
            text.parse::<i64>().ok().map(TokenKind::Integer)
        };

        kind.ok_or_else(|| LexerError {
            kind: LexErrorKind::InvalidNumber(text),
            line: start_line,
            column: start_col,
        })
    }

    fn take_digits(&mut self, out: &mut String) {
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            out.push(self.peek());
            self.advance();
        }
    }

    /// After `e`/`E`: digits, or a sign then digits.
    fn exponent_follows(&self) -> bool {
        let next = self.peek_next();
        next.is_ascii_digit() || (matches!(next, '+' | '-') && self.peek_at(2).is_ascii_digit())
    }

    // --- Helpers ---

    fn token(&self, kind: TokenKind, start: usize, line: usize, column: usize) -> Token {
        Token::new(kind, Span::new(start, self.pos, line, column))
    }

    fn at_tag_open(&self) -> bool {
        self.peek() == '{' && self.peek_next() == '$'
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && matches!(self.peek(), ' ' | '\t' | '\r' | '\n') {
            self.advance();
        }
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars.get(self.pos + offset).copied().unwrap_or('\0')
    }

    fn peek_opt(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) {
        if let Some(&c) = self.chars.get(self.pos) {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, kind: LexErrorKind) -> LexerError {
        LexerError {
            kind,
            line: self.line,
            column: self.column,
        }
    }
}

/// Render the offending escape for diagnostics (`\n`, or a lone `\` at EOF).
fn escape_text(next: Option<char>) -> String {
    match next {
        Some(c) => format!("\\{c}"),
        None => "\\".into(),
    }
}
