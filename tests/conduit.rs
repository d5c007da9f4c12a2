//! Threaded lexer hand-off tests.

mod common;

use std::thread;
use std::time::{Duration, Instant};

use common::{FILENAME, lex, only_assignment};
use zoidberg::{
    ConduitError, Error, IntLiteralExpr, LexErrorKind, Node, SyntaxErrorKind, TokenConduit,
    TokenKind, parse, parse_concurrent,
};

#[test]
fn conduit_matches_lazy_lexer() {
    let sources = [
        "",
        "a = 10",
        "val a = 42\nf(x) { return x + a }",
        "\"With \\\"stuff\\\"!\" ++ || [1.5]",
        "x = \"unterminated",
        "x ? y",
    ];
    for source in sources {
        let threaded: Vec<_> = TokenConduit::spawn(FILENAME, source)
            .expect("spawn")
            .collect();
        assert_eq!(threaded, lex(source), "mismatch for {source:?}");
    }
}

#[test]
fn parse_through_conduit() {
    let mut conduit = TokenConduit::spawn(FILENAME, "a = 10").expect("spawn");
    let program = parse(FILENAME, &mut conduit).expect("parse");
    assert_eq!(
        *only_assignment(&program).value,
        Node::IntLiteral(IntLiteralExpr::new(10))
    );
    // Eof has not been lexed yet; it is produced on request
    assert_eq!(conduit.recv().map(|t| t.kind), Ok(TokenKind::Eof));
}

#[test]
fn abandoned_parse_releases_producer() {
    let source = format!("a = {}", "1 ".repeat(50_000));
    let mut conduit = TokenConduit::spawn(FILENAME, source).expect("spawn");
    parse(FILENAME, &mut conduit).expect("parse");
    assert_eq!(conduit.join(), None);
}

#[test]
fn parse_concurrent_ok() {
    let program = parse_concurrent(FILENAME, "answer = 42", None).expect("parse");
    let assign = only_assignment(&program);
    assert_eq!(assign.target.name, "answer");
    assert_eq!(*assign.value, Node::IntLiteral(IntLiteralExpr::new(42)));
}

#[test]
fn parse_concurrent_with_deadline_ok() {
    let program =
        parse_concurrent(FILENAME, "a = 1", Some(Duration::from_secs(30))).expect("parse");
    assert_eq!(program.init.len(), 1);
}

#[test]
fn parse_concurrent_zero_deadline() {
    let err = parse_concurrent(FILENAME, "a = 1", Some(Duration::ZERO)).unwrap_err();
    assert_eq!(err, Error::Conduit(ConduitError::DeadlineExceeded));
    assert_eq!(
        err.to_string(),
        "deadline exceeded waiting for the next token"
    );
}

#[test]
fn parse_concurrent_lex_error() {
    let err = parse_concurrent(FILENAME, "a = #", None).unwrap_err();
    let Error::Lex(err) = err else {
        panic!("expected lex error, got {err:?}");
    };
    assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('#'));
}

#[test]
fn parse_concurrent_syntax_error() {
    let err = parse_concurrent(FILENAME, "a = b", None).unwrap_err();
    let Error::Syntax(err) = err else {
        panic!("expected syntax error, got {err:?}");
    };
    assert!(matches!(
        err.kind,
        SyntaxErrorKind::Unexpected {
            found: TokenKind::Identifier,
            ..
        }
    ));
}

#[test]
fn recv_after_cancel() {
    let mut conduit = TokenConduit::spawn(FILENAME, "a = 1").expect("spawn");
    conduit.cancel();
    assert_eq!(conduit.recv(), Err(ConduitError::Cancelled));
    assert_eq!(conduit.next(), None);
}

#[test]
fn deadline_releases_unread_conduit() {
    let conduit = TokenConduit::with_deadline(FILENAME, "a = 1", Duration::from_millis(10))
        .expect("spawn");
    let give_up = Instant::now() + Duration::from_secs(5);
    while !conduit.is_finished() && Instant::now() < give_up {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(conduit.is_finished(), "lexer thread outlived its deadline");
}
