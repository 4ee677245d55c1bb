use crate::ast::span::Span;
use crate::interner::{resolve, Symbol};

/// Interned string symbol for identifiers
pub type Ident = Symbol;

/// Tokens of the surface language
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Data,
    Record,
    Module,
    Where,
    Import,
    Open,
    Infix,
    Infixl,
    Infixr,
    Let,
    In,
    Forall,
    Type,
    With,
    Field,
    Constructor,

    // Identifiers: any run of non-reserved characters, operators included
    Ident(Ident),

    // Literals
    Integer(u64),

    // Layout tokens (inserted by layout processor)
    LayoutStart, // Virtual block-open
    LayoutSep,   // Virtual item separator
    LayoutEnd,   // Virtual block-close

    // Delimiters
    LParen, // (
    RParen, // )
    LBrace, // {
    RBrace, // }
    Unit,   // ()

    // Special symbols
    Arrow,      // ->
    Backslash,  // \
    Underscore, // _
    Colon,      // :
    Equals,     // =
    Pipe,       // |
    Semicolon,  // ;
    Dot,        // .

    // Comments (dropped by the layout processor)
    LineComment(String),
    BlockComment(String),

    // End of file
    Eof,
}

impl Token {
    /// Returns true if this token opens an implicit layout block
    pub fn is_layout_keyword(&self) -> bool {
        matches!(self, Token::Where | Token::Let)
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::LineComment(_) | Token::BlockComment(_))
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Data => write!(f, "data"),
            Token::Record => write!(f, "record"),
            Token::Module => write!(f, "module"),
            Token::Where => write!(f, "where"),
            Token::Import => write!(f, "import"),
            Token::Open => write!(f, "open"),
            Token::Infix => write!(f, "infix"),
            Token::Infixl => write!(f, "infixl"),
            Token::Infixr => write!(f, "infixr"),
            Token::Let => write!(f, "let"),
            Token::In => write!(f, "in"),
            Token::Forall => write!(f, "forall"),
            Token::Type => write!(f, "Type"),
            Token::With => write!(f, "with"),
            Token::Field => write!(f, "field"),
            Token::Constructor => write!(f, "constructor"),
            Token::Ident(ident) => write!(f, "{}", resolve(*ident).unwrap_or_default()),
            Token::Integer(n) => write!(f, "{}", n),
            Token::LayoutStart => write!(f, "{{layout"),
            Token::LayoutSep => write!(f, ";layout"),
            Token::LayoutEnd => write!(f, "layout}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Unit => write!(f, "()"),
            Token::Arrow => write!(f, "->"),
            Token::Backslash => write!(f, "\\"),
            Token::Underscore => write!(f, "_"),
            Token::Colon => write!(f, ":"),
            Token::Equals => write!(f, "="),
            Token::Pipe => write!(f, "|"),
            Token::Semicolon => write!(f, ";"),
            Token::Dot => write!(f, "."),
            Token::LineComment(s) => write!(f, "--{}", s),
            Token::BlockComment(s) => write!(f, "{{-{}-}}", s),
            Token::Eof => write!(f, "end of file"),
        }
    }
}

/// A token with its source position.
///
/// `column` is 1-based and counts characters, with tabs advancing to the next
/// tab stop. `line_start` is set on the first non-comment token of each line;
/// virtual layout tokens always carry `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
    pub line: u32,
    pub column: u32,
    pub line_start: bool,
}

impl SpannedToken {
    pub fn new(token: Token, span: Span, line: u32, column: u32, line_start: bool) -> Self {
        Self {
            token,
            span,
            line,
            column,
            line_start,
        }
    }

    /// A zero-width layout marker positioned at `offset`.
    pub fn virtual_at(token: Token, offset: usize, line: u32, column: u32) -> Self {
        Self::new(token, Span::point(offset), line, column, false)
    }

    /// Source text of the token; empty for virtual tokens.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.span.start..self.span.end).unwrap_or("")
    }
}
