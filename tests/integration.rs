//! Integration tests for the full parsing pipeline.
//!
//! These tests exercise the public API end-to-end:
//! source string → lex → layout → parse → fixity resolution

use silt_syntax::ast::{Decl, Expr, Span};
use silt_syntax::lexer::{lex_raw, tokenize, Token};
use silt_syntax::{lex, parse, DiagnosticKind, ParseOptions};

const NAT: &str = include_str!("fixtures/nat.silt");
const VEC: &str = include_str!("fixtures/vec.silt");
const BROKEN: &str = include_str!("fixtures/broken.silt");

// ===== Helpers =====

fn module_decls(source: &str) -> Vec<Decl> {
    let parsed = parse(source);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    match parsed.file.decls.into_iter().next() {
        Some(Decl::Module { decls, .. }) => decls,
        other => panic!("expected a module, got {:?}", other),
    }
}

/// Sibling spans must be ordered and disjoint, and nested in the parent
fn check_spans(parent: Span, decls: &[Decl]) {
    for decl in decls {
        assert!(parent.contains(decl.span()), "{} escapes {}", decl.span(), parent);
    }
    for pair in decls.windows(2) {
        assert!(
            pair[0].span().end <= pair[1].span().start,
            "{} overlaps {}",
            pair[0].span(),
            pair[1].span()
        );
    }
    for decl in decls {
        match decl {
            Decl::Module { span, decls, .. } | Decl::Record { span, decls, .. } => {
                check_spans(*span, decls)
            }
            Decl::FunctionClause {
                span, where_decls, ..
            } => check_spans(*span, where_decls),
            _ => {}
        }
    }
}

// ===== Lexing =====

#[test]
fn lex_simple_module() {
    let tokens = lex("module Main where\nx = 42").unwrap();
    assert_eq!(tokens.first().map(|t| &t.token), Some(&Token::LayoutStart));
    assert!(tokens.iter().any(|t| t.token == Token::Integer(42)));
    assert_eq!(tokens.last().map(|t| &t.token), Some(&Token::Eof));
}

#[test]
fn lex_error_unterminated_comment() {
    let err = lex("x = {- never closed").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::Lex);
    assert_eq!(err.span.start, 4);
}

#[test]
fn raw_lexing_keeps_comments() {
    let tokens = lex_raw("x -- note\n").unwrap();
    assert!(matches!(tokens[1].token, Token::LineComment(_)));

    let (tokens, errors) = tokenize("x -- note\n", &ParseOptions::default());
    assert!(errors.is_empty());
    assert!(!tokens.iter().any(|t| t.token.is_trivia()));
}

#[test]
fn every_layout_open_has_a_close() {
    for source in [NAT, VEC, BROKEN] {
        let (tokens, _) = tokenize(source, &ParseOptions::default());
        let mut depth = 0i32;
        for tok in &tokens {
            match tok.token {
                Token::LayoutStart => depth += 1,
                Token::LayoutEnd => {
                    depth -= 1;
                    assert!(depth >= 0);
                }
                _ => {}
            }
        }
        assert_eq!(depth, 0);
    }
}

// ===== Parsing =====

#[test]
fn parse_nat_fixture() {
    let decls = module_decls(NAT);
    assert_eq!(decls.len(), 11);
    let infix_clauses = decls
        .iter()
        .filter(|d| matches!(d, Decl::FunctionClause { infix: true, .. }))
        .count();
    assert_eq!(infix_clauses, 4);
}

#[test]
fn parse_vec_fixture() {
    let decls = module_decls(VEC);
    assert!(matches!(decls[2], Decl::Data { ref constructors, .. } if constructors.len() == 2));
    match &decls[3] {
        Decl::Record {
            constructor: Some(_),
            fields,
            decls,
            ..
        } => {
            assert_eq!(fields.len(), 2);
            assert!(decls.is_empty());
        }
        other => panic!("expected a record, got {:?}", other),
    }
    match decls.last() {
        Some(Decl::FunctionClause { rhs: Some(Expr::LetIn { decls, .. }), .. }) => {
            assert_eq!(decls.len(), 1)
        }
        other => panic!("expected a let clause, got {:?}", other),
    }
}

#[test]
fn spans_are_nested_and_ordered() {
    for source in [NAT, VEC] {
        let parsed = parse(source);
        assert!(parsed.diagnostics.is_empty());
        check_spans(parsed.file.span, &parsed.file.decls);
    }
}

#[test]
fn spans_point_at_source_text() {
    let source = "module M where\n  infixl 6 +\n  x = f a + b\n";
    let parsed = parse(source);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let Some(Decl::Module { decls, .. }) = parsed.file.decls.first() else {
        panic!("expected a module");
    };
    match &decls[1] {
        Decl::FunctionClause {
            span,
            rhs: Some(rhs @ Expr::Infix { left, .. }),
            ..
        } => {
            assert_eq!(&source[span.start..span.end], "x = f a + b");
            assert_eq!(&source[rhs.span().start..rhs.span().end], "f a + b");
            assert_eq!(&source[left.span().start..left.span().end], "f a");
        }
        other => panic!("expected an infix clause, got {:?}", other),
    }
}

// ===== Error recovery =====

#[test]
fn broken_fixture_keeps_good_declarations() {
    let parsed = parse(BROKEN);
    let kinds: Vec<DiagnosticKind> = parsed.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        [DiagnosticKind::Syntax, DiagnosticKind::Fixity, DiagnosticKind::Syntax]
    );
    match &parsed.file.decls[..] {
        [Decl::Module { decls, .. }] => {
            assert_eq!(decls.len(), 3);
            assert!(matches!(decls[0], Decl::Fixity { .. }));
            assert!(matches!(decls[1], Decl::Function { .. }));
            assert!(matches!(decls[2], Decl::FunctionClause { .. }));
        }
        other => panic!("expected one module, got {:?}", other),
    }
}

#[test]
fn errors_in_nested_blocks_do_not_leak() {
    let source = "module A where\n  f = g\n    where\n      g = )\n  h = i\nj = k\n";
    let parsed = parse(source);
    assert_eq!(parsed.diagnostics.len(), 1, "{:?}", parsed.diagnostics);
    assert_eq!(parsed.file.decls.len(), 2);
    match &parsed.file.decls[0] {
        Decl::Module { decls, .. } => assert_eq!(decls.len(), 2),
        other => panic!("expected a module, got {:?}", other),
    }
}

#[test]
fn bad_dedent_keeps_the_dedented_declaration() {
    let parsed = parse("f = g\n    where\n      g = h\n   k = f\nm = n\n");
    let kinds: Vec<DiagnosticKind> = parsed.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, [DiagnosticKind::Layout]);
    assert_eq!(parsed.file.decls.len(), 3);
    assert!(matches!(
        &parsed.file.decls[1],
        Decl::FunctionClause { patterns, .. } if patterns.len() == 1
    ));

    let parsed = parse("module M where\n  a = b\n c = d\n");
    let kinds: Vec<DiagnosticKind> = parsed.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, [DiagnosticKind::Layout]);
    match &parsed.file.decls[..] {
        [Decl::Module { decls, .. }, Decl::FunctionClause { .. }] => assert_eq!(decls.len(), 1),
        other => panic!("expected a module and a clause, got {:?}", other),
    }
}

#[test]
fn unclosed_explicit_block_is_a_layout_error() {
    let parsed = parse("module M where { a = b\n");
    assert!(parsed
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::Layout));
}
