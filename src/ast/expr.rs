use std::fmt::Display;

use crate::ast::decl::Decl;
use crate::ast::span::{Span, Spanned};
use crate::interner::resolve;
use crate::lexer::token::Ident;

/// An identifier occurrence
pub type Name = Spanned<Ident>;

/// Possibly qualified name: x, Data.Nat.suc
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub span: Span,
    pub segments: Vec<Name>,
}

impl QualifiedName {
    pub fn simple(name: Name) -> Self {
        Self {
            span: name.span,
            segments: vec![name],
        }
    }

    /// The single segment of an unqualified name
    pub fn as_simple(&self) -> Option<&Name> {
        match self.segments.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", resolve(seg.node).unwrap_or_default())?;
        }
        Ok(())
    }
}

/// Typed parameter: (x y : A) or, when implicit, {x y : A}
#[derive(Debug, Clone, PartialEq)]
pub struct TypedParam<E = Expr> {
    pub span: Span,
    pub implicit: bool,
    pub names: Vec<Name>,
    pub ty: E,
}

/// Binder of a lambda or forall
#[derive(Debug, Clone, PartialEq)]
pub enum Binding<E = Expr> {
    Name(Name),
    Typed(TypedParam<E>),
}

impl<E> Binding<E> {
    pub fn span(&self) -> Span {
        match self {
            Binding::Name(name) => name.span,
            Binding::Typed(param) => param.span,
        }
    }
}

/// Field assignment inside a record construction: x = e
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAssign<E = Expr> {
    pub span: Span,
    pub name: Name,
    pub value: E,
}

/// Left-hand side of an arrow
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowDomain {
    /// Dependent domain: (x : A) {y : B} -> ...
    Params(Vec<TypedParam>),
    /// Non-dependent domain: A -> ...
    Expr(Box<Expr>),
}

/// Resolved expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identifier or qualified name
    Name {
        span: Span,
        name: QualifiedName,
    },

    /// Hole: _
    Hole {
        span: Span,
    },

    /// Unit value: ()
    Unit {
        span: Span,
    },

    /// The universe: Type
    TypeUniverse {
        span: Span,
    },

    /// Integer literal
    IntLit {
        span: Span,
        value: u64,
    },

    /// Parenthesized expression (kept so spans and printing stay faithful)
    Paren {
        span: Span,
        expr: Box<Expr>,
    },

    /// Record construction: record P { x = a ; y = b }
    RecordConstruction {
        span: Span,
        constructor: Option<QualifiedName>,
        fields: Vec<FieldAssign>,
    },

    /// Function type: A -> B, (x : A) -> B x
    Arrow {
        span: Span,
        domain: ArrowDomain,
        codomain: Box<Expr>,
    },

    /// Lambda: \x (y : A) -> body
    Lambda {
        span: Span,
        bindings: Vec<Binding>,
        body: Box<Expr>,
    },

    /// Universal quantification: forall x {y : A} -> body
    Forall {
        span: Span,
        params: Vec<Binding>,
        body: Box<Expr>,
    },

    /// Local definitions: let decls in body
    LetIn {
        span: Span,
        decls: Vec<Decl>,
        body: Box<Expr>,
    },

    /// Application by juxtaposition: f x
    App {
        span: Span,
        func: Box<Expr>,
        arg: Box<Expr>,
    },

    /// Use of a declared operator: x + y
    Infix {
        span: Span,
        op: Name,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Name { span, .. }
            | Expr::Hole { span }
            | Expr::Unit { span }
            | Expr::TypeUniverse { span }
            | Expr::IntLit { span, .. }
            | Expr::Paren { span, .. }
            | Expr::RecordConstruction { span, .. }
            | Expr::Arrow { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::Forall { span, .. }
            | Expr::LetIn { span, .. }
            | Expr::App { span, .. }
            | Expr::Infix { span, .. } => *span,
        }
    }

    /// Short description used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            Expr::Name { .. } => "a name",
            Expr::Hole { .. } => "a hole",
            Expr::Unit { .. } => "the unit value",
            Expr::TypeUniverse { .. } => "`Type`",
            Expr::IntLit { .. } => "an integer literal",
            Expr::Paren { .. } => "a parenthesized expression",
            Expr::RecordConstruction { .. } => "a record construction",
            Expr::Arrow { .. } => "a function type",
            Expr::Lambda { .. } => "a lambda",
            Expr::Forall { .. } => "a forall",
            Expr::LetIn { .. } => "a let expression",
            Expr::App { .. } => "an application",
            Expr::Infix { .. } => "an operator application",
        }
    }
}
