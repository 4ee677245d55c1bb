use crate::ast::span::Span;
use crate::diagnostics::Diagnostic;
use crate::interner;
use crate::lexer::token::{Ident, SpannedToken, Token};
use logos::Logos;

/// Raw tokens from Logos lexer (before layout processing)
///
/// Identifiers are any run of characters outside whitespace and the
/// delimiter set `( ) { } ; . \`. Reserved words and symbols only win when
/// they match the whole run, so `->x` and `data'` are ordinary identifiers.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[^\S\n]+")] // Skip whitespace except newlines
pub enum RawToken {
    // Keywords
    #[token("data")]
    Data,
    #[token("record")]
    Record,
    #[token("module")]
    Module,
    #[token("where")]
    Where,
    #[token("import")]
    Import,
    #[token("open")]
    Open,
    #[token("infix")]
    Infix,
    #[token("infixl")]
    Infixl,
    #[token("infixr")]
    Infixr,
    #[token("let")]
    Let,
    #[token("in")]
    In,
    #[token("forall")]
    #[token("∀")]
    Forall,
    #[token("Type")]
    Type,
    #[token("with")]
    With,
    #[token("field")]
    Field,
    #[token("constructor")]
    Constructor,

    #[regex(r"[^\s(){};.\\]+", |lex| interner::intern(lex.slice()))]
    Ident(Ident),

    // Integer literals; overflow is reported as a lexical error
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok(), priority = 3)]
    Integer(u64),

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("()")]
    Unit,

    // Special symbols
    #[token("->")]
    #[token("→")]
    Arrow,
    #[token("\\")]
    #[token("λ")]
    Backslash,
    #[token("_", priority = 3)]
    Underscore,
    #[token(":", priority = 3)]
    Colon,
    #[token("=", priority = 3)]
    Equals,
    #[token("|", priority = 3)]
    Pipe,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,

    // Newlines (important for layout processing)
    #[regex(r"\n")]
    Newline,

    // Line comments
    #[regex(r"--[^\n]*", |lex| lex.slice()[2..].to_string())]
    LineComment(String),

    // Block comments (handled by callback for nesting)
    #[token("{-", lex_block_comment)]
    BlockComment(String),
}

/// Lex nested block comments: {- outer {- inner -} outer -}
fn lex_block_comment(lex: &mut logos::Lexer<RawToken>) -> Option<String> {
    let remainder = lex.remainder();
    let mut depth = 1;
    let bytes = remainder.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() && depth > 0 {
        if pos + 1 < bytes.len() {
            match (bytes[pos], bytes[pos + 1]) {
                (b'{', b'-') => {
                    depth += 1;
                    pos += 2;
                    continue;
                }
                (b'-', b'}') => {
                    depth -= 1;
                    pos += 2;
                    if depth == 0 {
                        let content = &remainder[..pos - 2];
                        lex.bump(pos);
                        return Some(content.to_string());
                    }
                    continue;
                }
                _ => {}
            }
        }
        pos += 1;
    }

    // Unclosed: swallow the rest of the input so the error span covers it
    lex.bump(remainder.len());
    None
}

impl RawToken {
    /// Convert to the parser-facing token; `None` for newlines.
    pub fn to_token(&self) -> Option<Token> {
        match self {
            RawToken::Data => Some(Token::Data),
            RawToken::Record => Some(Token::Record),
            RawToken::Module => Some(Token::Module),
            RawToken::Where => Some(Token::Where),
            RawToken::Import => Some(Token::Import),
            RawToken::Open => Some(Token::Open),
            RawToken::Infix => Some(Token::Infix),
            RawToken::Infixl => Some(Token::Infixl),
            RawToken::Infixr => Some(Token::Infixr),
            RawToken::Let => Some(Token::Let),
            RawToken::In => Some(Token::In),
            RawToken::Forall => Some(Token::Forall),
            RawToken::Type => Some(Token::Type),
            RawToken::With => Some(Token::With),
            RawToken::Field => Some(Token::Field),
            RawToken::Constructor => Some(Token::Constructor),
            RawToken::Ident(id) => Some(Token::Ident(*id)),
            RawToken::Integer(n) => Some(Token::Integer(*n)),
            RawToken::LParen => Some(Token::LParen),
            RawToken::RParen => Some(Token::RParen),
            RawToken::LBrace => Some(Token::LBrace),
            RawToken::RBrace => Some(Token::RBrace),
            RawToken::Unit => Some(Token::Unit),
            RawToken::Arrow => Some(Token::Arrow),
            RawToken::Backslash => Some(Token::Backslash),
            RawToken::Underscore => Some(Token::Underscore),
            RawToken::Colon => Some(Token::Colon),
            RawToken::Equals => Some(Token::Equals),
            RawToken::Pipe => Some(Token::Pipe),
            RawToken::Semicolon => Some(Token::Semicolon),
            RawToken::Dot => Some(Token::Dot),
            RawToken::LineComment(s) => Some(Token::LineComment(s.clone())),
            RawToken::BlockComment(s) => Some(Token::BlockComment(s.clone())),
            RawToken::Newline => None, // Handled by column tracking
        }
    }
}

/// 1-based column of `offset`, counting from the line starting at `line_offset`.
fn column_at(source: &str, line_offset: usize, offset: usize, tab_width: u32) -> u32 {
    let mut column = 1u32;
    for c in source[line_offset..offset].chars() {
        if c == '\t' && tab_width > 0 {
            column = ((column - 1) / tab_width + 1) * tab_width + 1;
        } else {
            column += 1;
        }
    }
    column
}

fn describe_error(slice: &str) -> String {
    if slice.starts_with("{-") {
        "unterminated block comment".to_string()
    } else if !slice.is_empty() && slice.bytes().all(|b| b.is_ascii_digit()) {
        format!("integer literal `{}` does not fit in 64 bits", slice)
    } else {
        format!("unrecognized token `{}`", slice)
    }
}

/// Lex source code, collecting errors instead of stopping at the first one.
///
/// The returned stream always ends with a single `Token::Eof`.
pub fn lex_recovering(source: &str, tab_width: u32) -> (Vec<SpannedToken>, Vec<Diagnostic>) {
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    let mut line: u32 = 1;
    let mut line_offset = 0usize;
    let mut at_line_start = true;

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);

        match result {
            Ok(RawToken::Newline) => {
                line += 1;
                line_offset = span.end;
                at_line_start = true;
            }
            Ok(raw) => {
                let Some(token) = raw.to_token() else {
                    continue;
                };
                let column = column_at(source, line_offset, span.start, tab_width);
                let trivia = token.is_trivia();
                tokens.push(SpannedToken::new(
                    token,
                    span,
                    line,
                    column,
                    at_line_start && !trivia,
                ));
                if !trivia {
                    at_line_start = false;
                }

                // Block comments may span several lines
                let text = &source[span.start..span.end];
                if let Some(last_newline) = text.rfind('\n') {
                    line += text.matches('\n').count() as u32;
                    line_offset = span.start + last_newline + 1;
                    at_line_start = true;
                }
            }
            Err(()) => {
                let text = &source[span.start..span.end];
                errors.push(Diagnostic::lex(span, describe_error(text)));
                if let Some(last_newline) = text.rfind('\n') {
                    line += text.matches('\n').count() as u32;
                    line_offset = span.start + last_newline + 1;
                }
            }
        }
    }

    let column = column_at(source, line_offset, source.len(), tab_width);
    tokens.push(SpannedToken::new(
        Token::Eof,
        Span::point(source.len()),
        line,
        column,
        false,
    ));

    log::trace!(
        "lexed {} tokens ({} errors) from {} bytes",
        tokens.len(),
        errors.len(),
        source.len()
    );
    (tokens, errors)
}

/// Lex source code into raw tokens with spans, failing on the first error.
pub fn lex(source: &str) -> Result<Vec<SpannedToken>, Diagnostic> {
    let (tokens, mut errors) = lex_recovering(source, crate::options::DEFAULT_TAB_WIDTH);
    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors.remove(0))
    }
}
