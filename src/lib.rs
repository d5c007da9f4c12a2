//! Lexer and parser front end for the zoidberg toy language.
//!
//! Source text is scanned into a stream of [`Token`]s, which a
//! recursive-descent parser pulls one at a time to build a [`Program`].
//! The lexer is lazy: it does no work until the parser asks for the next
//! token. [`TokenConduit`] runs the same lexer on its own thread instead,
//! with cancellation and an optional deadline.
//!
//! # Quick start
//!
//! ## Tokenize
//!
//! ```
//! use zoidberg::{TokenKind, tokenize};
//!
//! let kinds: Vec<_> = tokenize("demo.berg", "val x = 10").map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [TokenKind::Declare, TokenKind::Identifier, TokenKind::Assign, TokenKind::Number, TokenKind::Eof]
//! );
//! ```
//!
//! ## Parse an assignment
//!
//! ```
//! use zoidberg::{IntLiteralExpr, Node, parse_str};
//!
//! let program = parse_str("demo.berg", "a = 10").unwrap();
//! let Node::Assignment(assign) = &program.init[0] else { unreachable!() };
//! assert_eq!(assign.target.name, "a");
//! assert_eq!(*assign.value, Node::IntLiteral(IntLiteralExpr::new(10)));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod conduit;
pub mod lexer;
pub mod parser;
pub mod token;

use std::time::Duration;

pub use ast::{Assignment, Identifier, IntLiteralExpr, Node, NodeKind, Program};
pub use conduit::{ConduitError, TokenConduit};
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize, tokenize_all};
pub use parser::{Parser, SyntaxError, SyntaxErrorKind, parse};
pub use token::{Span, Token, TokenKind};

/// Unified error type covering lexing, parsing, and the conduit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser error.
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
    /// The threaded token source gave up.
    #[error("{0}")]
    Conduit(#[from] ConduitError),
}

/// Tokenize and parse a source string in one step, on the caller's
/// thread.
///
/// When the parser stops on the lexer's `Error` token, the `LexError`
/// is returned instead of the syntax error it caused.
pub fn parse_str(filename: &str, source: &str) -> Result<Program, Error> {
    let mut lexer = tokenize(filename, source);
    parse(filename, &mut lexer).map_err(|err| match lexer.error() {
        Some(lex) => Error::Lex(lex.clone()),
        None => Error::Syntax(err),
    })
}

/// Parse with the lexer running on its own thread behind a
/// [`TokenConduit`].
///
/// The lexer thread is stopped and joined before this returns. An
/// elapsed `deadline` is reported as `ConduitError::DeadlineExceeded`,
/// and a thread that cannot be started as `ConduitError::Spawn`;
/// otherwise errors are reported as by [`parse_str`].
pub fn parse_concurrent(
    filename: &str,
    source: &str,
    deadline: Option<Duration>,
) -> Result<Program, Error> {
    let mut conduit = match deadline {
        Some(timeout) => TokenConduit::with_deadline(filename, source, timeout)?,
        None => TokenConduit::spawn(filename, source)?,
    };
    let result = parse(filename, &mut conduit);
    let conduit_error = conduit.error();
    let lex_error = conduit.join();

    result.map_err(|syntax| match (conduit_error, lex_error) {
        (Some(err @ ConduitError::DeadlineExceeded), _) => Error::Conduit(err),
        (_, Some(lex)) => Error::Lex(lex),
        _ => Error::Syntax(syntax),
    })
}
