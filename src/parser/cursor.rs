use crate::ast::span::Span;
use crate::diagnostics::Diagnostic;
use crate::lexer::{SpannedToken, Token};

/// Read position over the post-layout token stream
pub struct Cursor {
    tokens: Vec<SpannedToken>,
    position: usize,
    /// End offset of the last consumed token that has source text
    last_end: usize,
}

impl Cursor {
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        if tokens.last().map(|t| &t.token) != Some(&Token::Eof) {
            let end = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(SpannedToken::virtual_at(Token::Eof, end, 1, 1));
        }
        Self {
            tokens,
            position: 0,
            last_end: 0,
        }
    }

    /// Current token; sticks at `Eof`
    pub fn peek(&self) -> &SpannedToken {
        self.peek_nth(0)
    }

    pub fn peek_nth(&self, n: usize) -> &SpannedToken {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + n).min(last)]
    }

    pub fn peek_token(&self) -> &Token {
        &self.peek().token
    }

    pub fn at(&self, token: &Token) -> bool {
        self.peek_token() == token
    }

    pub fn at_eof(&self) -> bool {
        self.at(&Token::Eof)
    }

    pub fn advance(&mut self) -> SpannedToken {
        let tok = self.peek().clone();
        if tok.token != Token::Eof {
            self.position += 1;
        }
        if !tok.span.is_empty() {
            self.last_end = tok.span.end;
        }
        tok
    }

    pub fn eat(&mut self, token: &Token) -> Option<SpannedToken> {
        if self.at(token) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub fn expect(&mut self, token: &Token, context: &str) -> Result<SpannedToken, Diagnostic> {
        if self.at(token) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("`{}` {}", token, context)))
        }
    }

    /// Span from `start` up to the end of the last consumed token
    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    /// Syntax error at the current token
    pub fn unexpected(&self, expected: &str) -> Diagnostic {
        let tok = self.peek();
        let found = match tok.token {
            Token::LayoutSep | Token::LayoutStart | Token::LayoutEnd => {
                "end of declaration".to_string()
            }
            Token::Eof => "end of file".to_string(),
            ref other => format!("`{}`", other),
        };
        Diagnostic::syntax(tok.span, format!("expected {}, found {}", expected, found))
    }

    /// Skip to the end of the current block item.
    ///
    /// Stops before the next separator or block close at the current nesting
    /// depth; nested blocks and brackets are skipped whole.
    pub fn recover(&mut self) {
        let mut blocks = 0usize;
        let mut brackets = 0usize;
        loop {
            match self.peek_token() {
                Token::Eof => return,
                Token::LayoutSep if blocks == 0 => return,
                Token::LayoutEnd if blocks == 0 => return,
                Token::Semicolon if blocks == 0 && brackets == 0 => return,
                Token::LayoutStart => blocks += 1,
                Token::LayoutEnd => blocks -= 1,
                Token::LParen | Token::LBrace => brackets += 1,
                Token::RParen | Token::RBrace => brackets = brackets.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
    }

    /// Scan the current item without consuming it and return the first
    /// token among `wanted` that is not nested in brackets or blocks.
    pub fn scan_item(&self, wanted: &[Token]) -> Option<&Token> {
        let mut depth = 0usize;
        for tok in &self.tokens[self.position..] {
            match &tok.token {
                Token::Eof => return None,
                Token::LayoutSep | Token::Semicolon if depth == 0 => return None,
                Token::LayoutEnd | Token::RParen | Token::RBrace if depth == 0 => return None,
                Token::LayoutStart | Token::LParen | Token::LBrace => depth += 1,
                Token::LayoutEnd | Token::RParen | Token::RBrace => depth -= 1,
                t if depth == 0 && wanted.contains(t) => return Some(t),
                _ => {}
            }
        }
        None
    }

    /// Whether the bracket at the cursor holds a `:` at its own level,
    /// making it a typed parameter rather than a parenthesized expression.
    pub fn bracket_is_typed_param(&self) -> bool {
        let mut depth = 0usize;
        for tok in &self.tokens[self.position..] {
            match tok.token {
                Token::Eof => return false,
                Token::LayoutStart | Token::LParen | Token::LBrace => depth += 1,
                Token::LayoutEnd | Token::RParen | Token::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return false;
                    }
                }
                Token::Colon if depth == 1 => return true,
                _ => {}
            }
        }
        false
    }
}
