//! Recursive-descent parser over the post-layout token stream.
//!
//! Parsing happens in two passes. The declaration parser builds a CST in
//! which every expression is a flat run of atoms; the fixity pass then
//! collects the operator table of each scope and resolves the runs into the
//! final AST.

pub mod cursor;
mod decl;
mod expr;

use std::time::Instant;

use crate::ast::span::Span;
use crate::ast::{Expr, SourceFile};
use crate::cst;
use crate::diagnostics::{sort_by_position, Diagnostic};
use crate::fixity::resolve::Resolver;
use crate::lexer::{tokenize, Token};
use crate::options::ParseOptions;
use cursor::Cursor;

pub(crate) type PResult<T> = Result<T, Diagnostic>;

/// Result of parsing one compilation unit: a best-effort tree plus every
/// problem found, in source order
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub file: SourceFile,
    pub diagnostics: Vec<Diagnostic>,
}

impl Parsed {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

pub(crate) struct Parser<'o> {
    cursor: Cursor,
    options: &'o ParseOptions,
    diagnostics: Vec<Diagnostic>,
    depth: usize,
}

impl<'o> Parser<'o> {
    fn new(source: &str, options: &'o ParseOptions) -> Self {
        let (tokens, diagnostics) = tokenize(source, options);
        log::debug!("parser: {} tokens after layout", tokens.len());
        Self {
            cursor: Cursor::new(tokens),
            options,
            diagnostics,
            depth: 0,
        }
    }

    /// Run `f` one nesting level deeper, failing past `max_nesting`
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= self.options.max_nesting {
            return Err(Diagnostic::syntax(
                self.cursor.peek().span,
                format!("nesting exceeds the limit of {} levels", self.options.max_nesting),
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Parse the file body block
    fn file(&mut self) -> Vec<cst::Decl> {
        let decls = match self.block(Self::decl) {
            Ok(decls) => decls,
            Err(err) => {
                self.diagnostics.push(err);
                Vec::new()
            }
        };
        if !self.cursor.at_eof() {
            let err = self.cursor.unexpected("end of file");
            self.diagnostics.push(err);
        }
        decls
    }

    /// Parse a layout block of items.
    ///
    /// An item that fails is recorded and skipped so that its siblings
    /// still parse.
    fn block<T>(&mut self, item: impl FnMut(&mut Self) -> PResult<T>) -> PResult<Vec<T>> {
        self.nested(|p| p.block_items(item))
    }

    fn block_items<T>(&mut self, mut item: impl FnMut(&mut Self) -> PResult<T>) -> PResult<Vec<T>> {
        self.cursor.expect(&Token::LayoutStart, "to open a block")?;
        let mut items = Vec::new();
        loop {
            while self.cursor.eat(&Token::LayoutSep).is_some()
                || self.cursor.eat(&Token::Semicolon).is_some()
            {}
            match self.cursor.peek_token() {
                Token::LayoutEnd => {
                    self.cursor.advance();
                    break;
                }
                Token::Eof => {
                    return Err(self.cursor.unexpected("the end of the block"));
                }
                _ => {}
            }
            match item(self) {
                Ok(value) => {
                    items.push(value);
                    if !matches!(
                        self.cursor.peek_token(),
                        Token::LayoutSep | Token::Semicolon | Token::LayoutEnd
                    ) {
                        let err = self.cursor.unexpected("the end of the declaration");
                        self.diagnostics.push(err);
                        self.cursor.recover();
                    }
                }
                Err(err) => {
                    log::trace!("parser: recovering after {}", err);
                    self.diagnostics.push(err);
                    self.cursor.recover();
                }
            }
        }
        Ok(items)
    }
}

/// Parse source text with default options
pub fn parse(source: &str) -> Parsed {
    parse_with_options(source, &ParseOptions::default())
}

/// Parse source text into a best-effort AST and diagnostics in source order
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Parsed {
    let started = Instant::now();

    // Step 1: Lex, resolve layout and parse declarations
    let mut parser = Parser::new(source, options);
    let decls = parser.file();
    let mut diagnostics = parser.diagnostics;

    // Step 2: Collect fixities per scope and resolve operator runs
    let mut resolver = Resolver::new(options.max_nesting);
    let decls = resolver.file(decls);
    diagnostics.extend(resolver.into_diagnostics());

    sort_by_position(&mut diagnostics);
    log::debug!(
        "parsed {} top-level declarations with {} diagnostics in {:.2?}",
        decls.len(),
        diagnostics.len(),
        started.elapsed()
    );

    Parsed {
        file: SourceFile {
            span: Span::new(0, source.len()),
            decls,
        },
        diagnostics,
    }
}

/// Parse raw bytes. Invalid UTF-8 is the one fatal error: the file cannot
/// be tokenized at all.
pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> Result<Parsed, Diagnostic> {
    match std::str::from_utf8(bytes) {
        Ok(source) => Ok(parse_with_options(source, options)),
        Err(err) => {
            let offset = err.valid_up_to();
            let end = err.error_len().map_or(bytes.len(), |len| offset + len);
            let message = match err.error_len() {
                Some(_) => "invalid UTF-8 sequence".to_string(),
                None => "truncated UTF-8 sequence at end of input".to_string(),
            };
            Err(Diagnostic::lex(Span::new(offset, end), message))
        }
    }
}

/// Parse a single expression with no fixity declarations in scope, plus the
/// given declarations' fixities when `context` is non-empty.
///
/// Useful for tools and tests that need an expression outside any file.
pub fn parse_expr(source: &str, context: &str) -> Result<Expr, Vec<Diagnostic>> {
    let options = ParseOptions::default();
    let mut context_parser = Parser::new(context, &options);
    let context_decls = context_parser.file();

    let mut parser = Parser::new(source, &options);
    let cst_expr = parser.block(|p| p.expr());
    let mut diagnostics = context_parser.diagnostics;
    diagnostics.append(&mut parser.diagnostics);

    let mut exprs = match cst_expr {
        Ok(exprs) => exprs,
        Err(err) => {
            diagnostics.push(err);
            Vec::new()
        }
    };
    if exprs.len() != 1 && diagnostics.is_empty() {
        diagnostics.push(Diagnostic::syntax(
            Span::new(0, source.len()),
            format!("expected exactly one expression, found {}", exprs.len()),
        ));
    }
    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }

    let mut resolver = Resolver::new(options.max_nesting);
    let expr = resolver.expr_in(&context_decls, exprs.remove(0));
    let mut diagnostics = resolver.into_diagnostics();
    match expr {
        Some(expr) if diagnostics.is_empty() => Ok(expr),
        _ => {
            sort_by_position(&mut diagnostics);
            Err(diagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Decl, ImportKind};
    use crate::diagnostics::DiagnosticKind;

    #[test]
    fn test_parse_empty_file() {
        let parsed = parse("");
        assert!(!parsed.has_errors());
        assert!(parsed.file.decls.is_empty());
    }

    #[test]
    fn test_parse_simple_module() {
        let source = r#"
module Test where
  open import Prelude

  id : (A : Type) -> A -> A
  id A x = x
"#;
        let parsed = parse(source);
        assert!(!parsed.has_errors(), "{:?}", parsed.diagnostics);
        match &parsed.file.decls[..] {
            [Decl::Module { decls, .. }] => {
                assert_eq!(decls.len(), 3);
                assert!(matches!(
                    decls[0],
                    Decl::Import {
                        kind: ImportKind::OpenImport,
                        ..
                    }
                ));
                assert!(matches!(decls[1], Decl::Function { .. }));
                assert!(matches!(decls[2], Decl::FunctionClause { .. }));
            }
            other => panic!("expected one module, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_syntax_error_is_reported_not_fatal() {
        let source = "x = y\nunexpected_token\nz = w\n";
        let parsed = parse(source);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].kind, DiagnosticKind::Syntax);
        assert_eq!(parsed.file.decls.len(), 2);
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        let err = parse_bytes(b"x = \xff y", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::Lex);
        assert_eq!(err.span, Span::new(4, 5));

        let err = parse_bytes(b"x = \xe2\x82", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.span.start, 4);
        assert!(err.message.contains("truncated"));
    }

    #[test]
    fn test_parse_bytes_accepts_utf8() {
        let parsed = parse_bytes("id = λ x → x".as_bytes(), &ParseOptions::default()).unwrap();
        assert!(!parsed.has_errors(), "{:?}", parsed.diagnostics);
    }

    #[test]
    fn test_parse_expr_uses_context_fixities() {
        let expr = parse_expr("a + b", "infixl 6 +").unwrap();
        assert!(matches!(expr, Expr::Infix { .. }));

        let expr = parse_expr("a + b", "").unwrap();
        assert!(matches!(expr, Expr::App { .. }));
    }

    #[test]
    fn test_parse_expr_rejects_two_expressions() {
        assert!(parse_expr("a\nb", "").is_err());
    }
}
