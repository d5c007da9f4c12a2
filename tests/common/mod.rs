#![allow(dead_code)]

use zoidberg::{Node, Program, Token, TokenKind, tokenize};

pub const FILENAME: &str = "testfile.berg";

pub fn lex(source: &str) -> Vec<Token> {
    tokenize(FILENAME, source).collect()
}

pub fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

/// Assert the first token of `kind` in `source` has text `text`.
pub fn assert_token(source: &str, kind: TokenKind, text: &str) {
    let tokens = lex(source);
    let found = tokens
        .iter()
        .find(|t| t.kind == kind)
        .unwrap_or_else(|| panic!("no {kind:?} token in {source:?}, got {tokens:?}"));
    assert_eq!(found.text, text, "wrong text for {kind:?} in {source:?}");
}

/// Unwrap the single assignment of a parsed program.
pub fn only_assignment(program: &Program) -> &zoidberg::Assignment {
    assert_eq!(program.init.len(), 1, "expected one statement");
    match &program.init[0] {
        Node::Assignment(assign) => assign,
        other => panic!("expected assignment, got {other:?}"),
    }
}
