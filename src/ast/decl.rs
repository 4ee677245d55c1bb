use crate::ast::expr::{Expr, Name, QualifiedName, TypedParam};
use crate::ast::span::Span;

/// Operator associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
    None,
}

impl Associativity {
    pub fn keyword(self) -> &'static str {
        match self {
            Associativity::Left => "infixl",
            Associativity::Right => "infixr",
            Associativity::None => "infix",
        }
    }
}

/// How a module is brought into scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// import M
    Import,
    /// open M
    Open,
    /// open import M
    OpenImport,
}

/// Data constructor: suc : Nat -> Nat (several names may share a type)
#[derive(Debug, Clone, PartialEq)]
pub struct Constructor<E = Expr> {
    pub span: Span,
    pub names: Vec<Name>,
    pub ty: E,
}

/// Record field: field fst snd : A
#[derive(Debug, Clone, PartialEq)]
pub struct Field<E = Expr> {
    pub span: Span,
    pub names: Vec<Name>,
    pub ty: E,
}

/// Declaration.
///
/// Generic over the expression type so that the parser can build the same
/// shapes with unresolved operator runs before fixity resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl<E = Expr> {
    /// data Nat : Type where zero : Nat ...
    Data {
        span: Span,
        name: Name,
        params: Vec<TypedParam<E>>,
        ty: Option<E>,
        constructors: Vec<Constructor<E>>,
    },

    /// data Void : Type (no where block)
    EmptyData {
        span: Span,
        name: Name,
        params: Vec<TypedParam<E>>,
        ty: Option<E>,
    },

    /// record Pair (A B : Type) : Type where ...
    Record {
        span: Span,
        name: Name,
        params: Vec<TypedParam<E>>,
        ty: Option<E>,
        constructor: Option<Name>,
        fields: Vec<Field<E>>,
        decls: Vec<Decl<E>>,
    },

    /// module M (A : Type) where ...
    Module {
        span: Span,
        name: QualifiedName,
        params: Vec<TypedParam<E>>,
        decls: Vec<Decl<E>>,
    },

    /// import M, open M, open import M
    Import {
        span: Span,
        kind: ImportKind,
        module: QualifiedName,
    },

    /// Type ascription: f g : A -> A
    Function {
        span: Span,
        names: Vec<Name>,
        ty: E,
    },

    /// Defining clause: f x | p with e = rhs where ...
    ///
    /// Before fixity resolution `patterns` holds exactly one element, the
    /// unresolved left-hand side. Afterwards it is the flattened pattern
    /// list, headed by the operator when `infix` is set.
    FunctionClause {
        span: Span,
        patterns: Vec<E>,
        infix: bool,
        with_patterns: Vec<E>,
        with_expr: Option<E>,
        rhs: Option<E>,
        where_decls: Vec<Decl<E>>,
    },

    /// infixl 6 + -
    Fixity {
        span: Span,
        assoc: Associativity,
        precedence: u8,
        operators: Vec<Name>,
    },
}

impl<E> Decl<E> {
    pub fn span(&self) -> Span {
        match self {
            Decl::Data { span, .. }
            | Decl::EmptyData { span, .. }
            | Decl::Record { span, .. }
            | Decl::Module { span, .. }
            | Decl::Import { span, .. }
            | Decl::Function { span, .. }
            | Decl::FunctionClause { span, .. }
            | Decl::Fixity { span, .. } => *span,
        }
    }
}
