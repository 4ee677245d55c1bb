use std::fmt::Display;

use crate::ast::span::Span;
use thiserror::Error;

/// Which pipeline stage produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    Lex,
    Layout,
    Fixity,
    Syntax,
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::Lex => write!(f, "lexical"),
            DiagnosticKind::Layout => write!(f, "layout"),
            DiagnosticKind::Fixity => write!(f, "fixity"),
            DiagnosticKind::Syntax => write!(f, "syntax"),
        }
    }
}

/// A located, non-fatal parse problem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error at {span}: {message}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn lex(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Lex, span, message)
    }

    pub fn layout(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Layout, span, message)
    }

    pub fn fixity(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Fixity, span, message)
    }

    pub fn syntax(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Syntax, span, message)
    }

    pub fn code(&self) -> String {
        match self.kind {
            DiagnosticKind::Lex => "LexError".into(),
            DiagnosticKind::Layout => "LayoutError".into(),
            DiagnosticKind::Fixity => "FixityError".into(),
            DiagnosticKind::Syntax => "SyntaxError".into(),
        }
    }

    /// Render as `line:col: code: message` against the source it came from.
    pub fn render(&self, source: &str) -> String {
        match self.span.to_pos(source) {
            Some((start, _)) => format!("{}: {}: {}", start, self.code(), self.message),
            None => format!("{}: {}: {}", self.span, self.code(), self.message),
        }
    }
}

/// Order diagnostics by source position, keeping emission order for ties.
pub fn sort_by_position(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by_key(|d| d.span.start);
}
