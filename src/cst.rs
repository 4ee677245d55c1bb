//! Concrete Syntax Tree (CST)
//!
//! What the declaration parser produces before fixity resolution. Block
//! structure and special forms are already recognized, but every expression
//! position that may contain operators is kept as a flat run of atoms,
//! because which identifiers are operators is only known once the fixity
//! declarations of the enclosing scopes have been collected.

use crate::ast::expr::{Binding, FieldAssign, QualifiedName, TypedParam};
use crate::ast::span::Span;

/// Declaration whose expression positions are unresolved runs
pub type Decl = crate::ast::decl::Decl<Expr>;

/// Expression before operator resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Juxtaposed atoms and operator candidates: f x + g y
    Run {
        span: Span,
        atoms: Vec<Atom>,
    },

    /// run -> expr; the domain is either all typed parameters or a plain run
    Arrow {
        span: Span,
        domain: Vec<Atom>,
        codomain: Box<Expr>,
    },

    /// Lambda: \x -> body
    Lambda {
        span: Span,
        bindings: Vec<Binding<Expr>>,
        body: Box<Expr>,
    },

    /// forall x -> body
    Forall {
        span: Span,
        params: Vec<Binding<Expr>>,
        body: Box<Expr>,
    },

    /// let decls in body
    Let {
        span: Span,
        decls: Vec<Decl>,
        body: Box<Expr>,
    },
}

/// One element of a run
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    /// Name; an operator if it is unqualified and has a fixity entry
    Name {
        span: Span,
        name: QualifiedName,
    },

    Hole {
        span: Span,
    },

    Unit {
        span: Span,
    },

    Type {
        span: Span,
    },

    Int {
        span: Span,
        value: u64,
    },

    /// Parenthesized expression
    Paren {
        span: Span,
        expr: Box<Expr>,
    },

    /// Typed parameter, only meaningful as an arrow domain
    Param(TypedParam<Expr>),

    /// record P { x = a ; y = b }
    Record {
        span: Span,
        constructor: Option<QualifiedName>,
        fields: Vec<FieldAssign<Expr>>,
    },

    /// Lambda, forall or let ending the run; it extends to the end of the expression
    Special(Box<Expr>),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Run { span, .. }
            | Expr::Arrow { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::Forall { span, .. }
            | Expr::Let { span, .. } => *span,
        }
    }
}

impl Atom {
    pub fn span(&self) -> Span {
        match self {
            Atom::Name { span, .. }
            | Atom::Hole { span }
            | Atom::Unit { span }
            | Atom::Type { span }
            | Atom::Int { span, .. }
            | Atom::Paren { span, .. }
            | Atom::Record { span, .. } => *span,
            Atom::Param(param) => param.span,
            Atom::Special(expr) => expr.span(),
        }
    }
}
