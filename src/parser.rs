use std::fmt;

use crate::ast::{Assignment, Identifier, IntLiteralExpr, Node, Program};
use crate::token::{Span, Token, TokenKind};

/// Classifies a syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// Token that does not fit the grammar at this position.
    Unexpected { found: TokenKind, text: String },
    /// Token source ran dry before an `Eof` token was seen.
    UnexpectedEndOfStream,
    /// Number literal that is not a decimal `i32`.
    InvalidInteger { text: String },
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unexpected { found, text } if text.is_empty() => {
                write!(f, "unexpected {found}")
            }
            Self::Unexpected { found, text } => {
                write!(f, "unexpected {found} '{text}'")
            }
            Self::UnexpectedEndOfStream => {
                write!(f, "unexpected end of token stream")
            }
            Self::InvalidInteger { text } => {
                write!(f, "invalid integer literal '{text}'")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {filename}:{span}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub filename: String,
    pub span: Span,
}

impl SyntaxError {
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    #[must_use]
    pub const fn line(&self) -> usize {
        self.span.line
    }

    #[must_use]
    pub const fn column(&self) -> usize {
        self.span.column
    }
}

/// Parse a token stream into a `Program`.
///
/// Tokens are pulled one at a time; parsing stops at the first error.
///
/// # Errors
///
/// Returns `SyntaxError` when a token does not match the grammar, the
/// stream ends early, or an integer literal is out of range.
pub fn parse<I>(filename: &str, tokens: I) -> Result<Program, SyntaxError>
where
    I: IntoIterator<Item = Token>,
{
    Parser::new(filename, tokens.into_iter()).parse_program()
}

/// Recursive-descent parser pulling from any token iterator.
///
/// Pass `&mut source` to keep the token source around after parsing,
/// e.g. to ask a lexer why the stream ended.
pub struct Parser<'a, I> {
    filename: &'a str,
    tokens: I,
    last_span: Span,
}

impl<'a, I> Parser<'a, I>
where
    I: Iterator<Item = Token>,
{
    pub const fn new(filename: &'a str, tokens: I) -> Self {
        Self {
            filename,
            tokens,
            last_span: Span::START,
        }
    }

    /// Program := Assignment
    ///
    /// Only the first statement is read; tokens after it stay unread.
    pub fn parse_program(mut self) -> Result<Program, SyntaxError> {
        let statement = self.parse_assignment()?;
        Ok(Program::new(vec![statement.into()]))
    }

    /// Assignment := Identifier '=' Expr
    fn parse_assignment(&mut self) -> Result<Assignment, SyntaxError> {
        let target = self.parse_lexpr()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr()?;
        Ok(Assignment::new(target, value))
    }

    fn parse_lexpr(&mut self) -> Result<Identifier, SyntaxError> {
        let tok = self.expect(TokenKind::Identifier)?;
        Ok(Identifier::new(tok.text))
    }

    /// Expr := UnaryExpr
    fn parse_expr(&mut self) -> Result<Node, SyntaxError> {
        self.parse_unary_expr()
    }

    /// UnaryExpr := Number
    fn parse_unary_expr(&mut self) -> Result<Node, SyntaxError> {
        let tok = self.read()?;
        if tok.kind != TokenKind::Number {
            return Err(self.unexpected(tok));
        }
        let value = tok.text.parse::<i32>().map_err(|_| {
            self.error(
                SyntaxErrorKind::InvalidInteger {
                    text: tok.text.clone(),
                },
                tok.span,
            )
        })?;
        Ok(IntLiteralExpr::new(value).into())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        let tok = self.read()?;
        if tok.kind == kind {
            Ok(tok)
        } else {
            Err(self.unexpected(tok))
        }
    }

    fn read(&mut self) -> Result<Token, SyntaxError> {
        match self.tokens.next() {
            Some(tok) => {
                self.last_span = tok.span;
                Ok(tok)
            }
            None => Err(self.error(SyntaxErrorKind::UnexpectedEndOfStream, self.last_span)),
        }
    }

    fn unexpected(&self, tok: Token) -> SyntaxError {
        self.error(
            SyntaxErrorKind::Unexpected {
                found: tok.kind,
                text: tok.text,
            },
            tok.span,
        )
    }

    fn error(&self, kind: SyntaxErrorKind, span: Span) -> SyntaxError {
        SyntaxError {
            kind,
            filename: self.filename.to_string(),
            span,
        }
    }
}
