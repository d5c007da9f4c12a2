use std::fmt;

/// Source location of a token, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    /// Start of the input.
    pub const START: Self = Self { line: 1, column: 1 };
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input.
    Eof,
    /// Lexing failed; always the last token of a stream.
    Error,
    /// Integer or decimal literal (`13`, `42.531`).
    Number,
    /// Double-quoted string, quotes stripped, escapes kept raw.
    String,
    /// Run of ASCII letters.
    Identifier,
    /// `val` or `var`.
    Declare,
    /// Operator that is always binary (`-`, `/`, `==`, `&&`, `|`, ...).
    BinaryOp,
    /// Single `+`, `&` or `*`. Unary vs binary use is decided later.
    BinaryOrUnaryOp,
    /// `!`
    UnaryOp,
    /// `=`
    Assign,
    LParen,
    RParen,
    LSquare,
    RSquare,
    LCurly,
    RCurly,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Eof => "end of file",
            Self::Error => "invalid token",
            Self::Number => "number",
            Self::String => "string",
            Self::Identifier => "identifier",
            Self::Declare => "declaration keyword",
            Self::BinaryOp => "binary operator",
            Self::BinaryOrUnaryOp => "operator",
            Self::UnaryOp => "unary operator",
            Self::Assign => "assignment",
            Self::LParen | Self::LSquare | Self::LCurly => "opening bracket",
            Self::RParen | Self::RSquare | Self::RCurly => "closing bracket",
        };
        f.write_str(name)
    }
}

/// A single token with its kind, exact source text, and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// True for `Eof` and `Error`, after which a stream yields nothing.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.kind, TokenKind::Eof | TokenKind::Error)
    }
}
