use std::fmt;
use std::iter::FusedIterator;

use crate::token::{Span, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// End of input inside a double-quoted string.
    UnterminatedString,
    /// Character that cannot start any token.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => {
                write!(f, "unterminated string")
            }
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character: {ch:?}")
            }
        }
    }
}

/// Error that ended a token stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {filename}:{span}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub filename: String,
    pub span: Span,
}

/// Start lexing `source`. Tokens are computed on demand as the returned
/// iterator is advanced.
#[must_use]
pub const fn tokenize<'a>(filename: &'a str, source: &'a str) -> Lexer<'a> {
    Lexer::new(filename, source)
}

/// Lex the whole of `source` up front.
///
/// The returned tokens end with the `Eof` token.
///
/// # Errors
///
/// Returns `LexError` on an unterminated string or a character that
/// cannot start a token.
pub fn tokenize_all(filename: &str, source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = tokenize(filename, source);
    let tokens: Vec<Token> = lexer.by_ref().collect();
    match lexer.error {
        Some(err) => Err(err),
        None => Ok(tokens),
    }
}

const DIGITS: &str = "0123456789";

const BRACKETS: [(char, TokenKind); 6] = [
    ('(', TokenKind::LParen),
    (')', TokenKind::RParen),
    ('[', TokenKind::LSquare),
    (']', TokenKind::RSquare),
    ('{', TokenKind::LCurly),
    ('}', TokenKind::RCurly),
];

fn bracket_kind(ch: char) -> Option<TokenKind> {
    BRACKETS
        .iter()
        .find(|(bracket, _)| *bracket == ch)
        .map(|(_, kind)| *kind)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    QuotedString,
    Identifier,
    Number,
    Done,
}

/// Scanner over a single source text.
///
/// Each state function consumes input, possibly emits one token, and
/// returns the state to run next. Iterating the lexer runs states until
/// a token is pending, so no work happens ahead of the consumer.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    filename: &'a str,
    source: &'a str,
    // byte offsets: start of the pending lexeme, scan cursor
    start: usize,
    pos: usize,
    // byte width of the last character read, for `backup`
    width: usize,
    // line and column of `start`
    line: usize,
    column: usize,
    // where the pending token begins, including a discarded opening quote
    anchor: Span,
    state: State,
    pending: Option<Token>,
    error: Option<LexError>,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(filename: &'a str, source: &'a str) -> Self {
        Self {
            filename,
            source,
            start: 0,
            pos: 0,
            width: 0,
            line: 1,
            column: 1,
            anchor: Span::START,
            state: State::Root,
            pending: None,
            error: None,
        }
    }

    #[must_use]
    pub const fn filename(&self) -> &'a str {
        self.filename
    }

    /// The error that ended the stream, once the `Error` token has been
    /// yielded.
    #[must_use]
    pub const fn error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }

    fn lex_root(&mut self) -> State {
        self.anchor = Span {
            line: self.line,
            column: self.column,
        };
        let Some(ch) = self.next_char() else {
            self.emit(TokenKind::Eof);
            return State::Done;
        };
        match ch {
            ' ' | '\t' | '\n' => {
                self.ignore();
                State::Root
            }
            '"' => {
                self.ignore();
                State::QuotedString
            }
            c if c.is_ascii_alphabetic() => {
                self.backup();
                State::Identifier
            }
            c if c.is_ascii_digit() => {
                self.backup();
                State::Number
            }
            '-' | '/' => {
                self.emit(TokenKind::BinaryOp);
                State::Root
            }
            '+' | '&' | '*' => {
                self.repeat_operator(ch, TokenKind::BinaryOrUnaryOp, TokenKind::BinaryOp);
                State::Root
            }
            '=' => {
                self.repeat_operator(ch, TokenKind::Assign, TokenKind::BinaryOp);
                State::Root
            }
            '|' => {
                self.repeat_operator(ch, TokenKind::BinaryOp, TokenKind::BinaryOp);
                State::Root
            }
            '!' => {
                self.emit(TokenKind::UnaryOp);
                State::Root
            }
            _ => match bracket_kind(ch) {
                Some(kind) => {
                    self.emit(kind);
                    State::Root
                }
                None => self.fail(LexErrorKind::UnexpectedCharacter(ch)),
            },
        }
    }

    fn lex_quoted_string(&mut self) -> State {
        loop {
            match self.next_char() {
                Some('\\') => {
                    // escaped character is kept verbatim
                    self.next_char();
                }
                Some('"') => {
                    self.backup();
                    self.emit(TokenKind::String);
                    self.next_char();
                    self.ignore();
                    return State::Root;
                }
                Some(_) => {}
                None => return self.fail(LexErrorKind::UnterminatedString),
            }
        }
    }

    fn lex_identifier(&mut self) -> State {
        while self.next_char().is_some_and(|c| c.is_ascii_alphabetic()) {}
        self.backup();
        let kind = match self.current() {
            "val" | "var" => TokenKind::Declare,
            _ => TokenKind::Identifier,
        };
        self.emit(kind);
        State::Root
    }

    fn lex_number(&mut self) -> State {
        self.accept_run(DIGITS);
        if self.accept(".") {
            self.accept_run(DIGITS);
        }
        self.emit(TokenKind::Number);
        State::Root
    }

    /// Emit `repeated` if the next character is `op` again, else rewind
    /// and emit `single`.
    fn repeat_operator(&mut self, op: char, single: TokenKind, repeated: TokenKind) {
        if self.next_char() == Some(op) {
            self.emit(repeated);
        } else {
            self.backup();
            self.emit(single);
        }
    }

    fn fail(&mut self, kind: LexErrorKind) -> State {
        self.error = Some(LexError {
            kind,
            filename: self.filename.to_string(),
            span: self.anchor,
        });
        self.emit(TokenKind::Error);
        State::Done
    }

    fn current(&self) -> &'a str {
        &self.source[self.start..self.pos]
    }

    fn emit(&mut self, kind: TokenKind) {
        self.pending = Some(Token::new(kind, self.current(), self.anchor));
        self.advance_start();
    }

    fn ignore(&mut self) {
        self.advance_start();
    }

    fn advance_start(&mut self) {
        for ch in self.current().chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.start = self.pos;
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.source[self.pos..].chars().next();
        self.width = ch.map_or(0, char::len_utf8);
        self.pos += self.width;
        ch
    }

    /// Step back over the last character read. Valid once per
    /// `next_char`.
    const fn backup(&mut self) {
        self.pos -= self.width;
    }

    fn accept(&mut self, valid: &str) -> bool {
        match self.next_char() {
            Some(ch) if valid.contains(ch) => true,
            _ => {
                self.backup();
                false
            }
        }
    }

    fn accept_run(&mut self, valid: &str) {
        while self.accept(valid) {}
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while self.pending.is_none() {
            self.state = match self.state {
                State::Root => self.lex_root(),
                State::QuotedString => self.lex_quoted_string(),
                State::Identifier => self.lex_identifier(),
                State::Number => self.lex_number(),
                State::Done => return None,
            };
        }
        self.pending.take()
    }
}

impl FusedIterator for Lexer<'_> {}
