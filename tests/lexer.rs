//! Tests for the lexer
//!
//! These tests verify tokenization of the JavaScript-with-Flow superset,
//! including the Flow-specific tokens and the parser-driven rescan modes.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::string_slice, clippy::panic)]

use flow2ts::lexer::{Lexer, Span, TokenKind};

fn lex(source: &str) -> Vec<TokenKind> {
    let mut lexer = Lexer::new(source);
    let mut tokens = vec![];
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            break;
        }
        tokens.push(token.kind);
    }
    tokens
}

#[test]
fn test_identifiers_and_keywords() {
    let tokens = lex("const foo = function bar() {};");
    assert_eq!(tokens.first(), Some(&TokenKind::Const));
    assert!(tokens.contains(&TokenKind::Identifier("foo".to_string())));
    assert!(tokens.contains(&TokenKind::Function));
}

#[test]
fn test_flow_contextual_words_stay_identifiers() {
    let tokens = lex("type opaque declare module");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Identifier("type".to_string()),
            TokenKind::Identifier("opaque".to_string()),
            TokenKind::Identifier("declare".to_string()),
            TokenKind::Identifier("module".to_string()),
        ]
    );
}

#[test]
fn test_exact_object_delimiters() {
    assert_eq!(
        lex("{| |}"),
        vec![TokenKind::LBracePipe, TokenKind::PipeRBrace]
    );
    assert_eq!(
        lex("{||}"),
        vec![TokenKind::LBracePipe, TokenKind::PipeRBrace]
    );
}

#[test]
fn test_union_pipe_not_confused_with_exact_close() {
    let tokens = lex("{|a:A|B|}");
    assert_eq!(
        tokens,
        vec![
            TokenKind::LBracePipe,
            TokenKind::Identifier("a".to_string()),
            TokenKind::Colon,
            TokenKind::Identifier("A".to_string()),
            TokenKind::Pipe,
            TokenKind::Identifier("B".to_string()),
            TokenKind::PipeRBrace,
        ]
    );
}

#[test]
fn test_numbers() {
    assert_eq!(lex("42"), vec![TokenKind::Number(42.0)]);
    assert_eq!(lex("4.5"), vec![TokenKind::Number(4.5)]);
    assert_eq!(lex("0x10"), vec![TokenKind::Number(16.0)]);
    assert_eq!(lex("1_000"), vec![TokenKind::Number(1000.0)]);
    assert_eq!(lex("10n"), vec![TokenKind::BigInt("10".to_string())]);
}

#[test]
fn test_string_cooking() {
    assert_eq!(
        lex(r#""a\nb""#),
        vec![TokenKind::String("a\nb".to_string())]
    );
    assert_eq!(lex(r#"'it\'s'"#), vec![TokenKind::String("it's".to_string())]);
}

#[test]
fn test_template_tokens() {
    assert_eq!(lex("`plain`"), vec![TokenKind::TemplateNoSub]);
    let tokens = lex("`a${x}b`");
    assert_eq!(tokens.first(), Some(&TokenKind::TemplateHead));
    assert!(tokens.contains(&TokenKind::Identifier("x".to_string())));
}

#[test]
fn test_optional_chaining_vs_ternary() {
    assert_eq!(
        lex("a?.b"),
        vec![
            TokenKind::Identifier("a".to_string()),
            TokenKind::QuestionDot,
            TokenKind::Identifier("b".to_string()),
        ]
    );
    // `?.5` is a conditional with a fractional consequent, not a chain
    let tokens = lex("a ? .5 : 1");
    assert!(tokens.contains(&TokenKind::Question));
    assert!(tokens.contains(&TokenKind::Number(0.5)));
}

#[test]
fn test_comments_are_skipped_and_track_newlines() {
    let mut lexer = Lexer::new("a // note\nb /* x */ c");
    assert!(matches!(lexer.next_token().kind, TokenKind::Identifier(_)));
    let b = lexer.next_token();
    assert!(b.newline_before);
    let c = lexer.next_token();
    assert!(!c.newline_before);
}

#[test]
fn test_rescan_as_regexp() {
    let mut lexer = Lexer::new("/ab+c/gi");
    let slash = lexer.next_token();
    assert_eq!(slash.kind, TokenKind::Slash);
    let regex = lexer.rescan_as_regexp(slash.span);
    assert_eq!(regex.kind, TokenKind::Regex);
    assert_eq!(regex.span.end, 8);
}

#[test]
fn test_rescan_as_jsx_text() {
    let source = "don't stop <b>";
    let mut lexer = Lexer::new(source);
    let text = lexer.rescan_as_jsx_text(Span::new(0, 0, 1, 1));
    assert_eq!(text.kind, TokenKind::JsxText);
    assert_eq!(&source[text.span.start..text.span.end], "don't stop ");
}

#[test]
fn test_spans_are_byte_ranges() {
    let mut lexer = Lexer::new("let x = 1;");
    let token = lexer.next_token();
    assert_eq!((token.span.start, token.span.end), (0, 3));
    let token = lexer.next_token();
    assert_eq!((token.span.start, token.span.end), (4, 5));
}

#[test]
fn test_line_and_column_tracking() {
    let mut lexer = Lexer::new("a\n  b");
    lexer.next_token();
    let b = lexer.next_token();
    assert_eq!(b.span.line, 2);
    assert_eq!(b.span.column, 3);
}
