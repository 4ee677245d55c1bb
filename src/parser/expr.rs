use crate::ast::expr::{Binding, FieldAssign, Name, QualifiedName, TypedParam};
use crate::ast::span::{Span, Spanned};
use crate::cst::{Atom, Expr};
use crate::diagnostics::Diagnostic;
use crate::interner::intern;
use crate::lexer::Token;

use super::{PResult, Parser};

/// Tokens that can begin an atom of a run
fn starts_atom(token: &Token) -> bool {
    matches!(
        token,
        Token::Ident(_)
            | Token::Underscore
            | Token::Unit
            | Token::Type
            | Token::Integer(_)
            | Token::LParen
            | Token::LBrace
            | Token::Record
    )
}

/// Lambda, forall and let extend as far right as possible
fn starts_special(token: &Token) -> bool {
    matches!(token, Token::Backslash | Token::Forall | Token::Let)
}

impl<'o> Parser<'o> {
    /// expr ::= '\' binding+ '->' expr | 'forall' binding+ '->' expr
    ///        | 'let' block 'in' expr | run ('->' expr)?
    pub(super) fn expr(&mut self) -> PResult<Expr> {
        self.nested(Self::expr_at_depth)
    }

    fn expr_at_depth(&mut self) -> PResult<Expr> {
        match self.cursor.peek_token() {
            Token::Backslash => self.lambda(),
            Token::Forall => self.forall(),
            Token::Let => self.let_in(),
            Token::Arrow => Err(Diagnostic::syntax(
                self.cursor.peek().span,
                "function type is missing its domain before `->`",
            )),
            _ => {
                let start = self.cursor.peek().span.start;
                let atoms = self.run()?;
                if self.cursor.eat(&Token::Arrow).is_some() {
                    let codomain = self.expr()?;
                    Ok(Expr::Arrow {
                        span: self.cursor.span_from(start),
                        domain: atoms,
                        codomain: Box::new(codomain),
                    })
                } else {
                    Ok(Expr::Run {
                        span: self.cursor.span_from(start),
                        atoms,
                    })
                }
            }
        }
    }

    /// A run of atoms, optionally ended by a special form
    fn run(&mut self) -> PResult<Vec<Atom>> {
        let mut atoms = Vec::new();
        loop {
            let token = self.cursor.peek_token();
            if starts_special(token) {
                let special = self.expr()?;
                atoms.push(Atom::Special(Box::new(special)));
                break;
            }
            if !starts_atom(token) {
                break;
            }
            atoms.push(self.atom()?);
        }
        if atoms.is_empty() {
            return Err(self.cursor.unexpected("an expression"));
        }
        Ok(atoms)
    }

    fn atom(&mut self) -> PResult<Atom> {
        let tok = self.cursor.peek().clone();
        match tok.token {
            Token::Ident(_) => {
                let name = self.qualified_name("a name")?;
                Ok(Atom::Name {
                    span: name.span,
                    name,
                })
            }
            Token::Underscore => {
                self.cursor.advance();
                Ok(Atom::Hole { span: tok.span })
            }
            Token::Unit => {
                self.cursor.advance();
                Ok(Atom::Unit { span: tok.span })
            }
            Token::Type => {
                self.cursor.advance();
                Ok(Atom::Type { span: tok.span })
            }
            Token::Integer(value) => {
                self.cursor.advance();
                Ok(Atom::Int {
                    span: tok.span,
                    value,
                })
            }
            Token::LParen if !self.cursor.bracket_is_typed_param() => {
                self.cursor.advance();
                let inner = self.expr()?;
                self.cursor.expect(&Token::RParen, "to close `(`")?;
                Ok(Atom::Paren {
                    span: self.cursor.span_from(tok.span.start),
                    expr: Box::new(inner),
                })
            }
            Token::LParen | Token::LBrace => Ok(Atom::Param(self.typed_param()?)),
            Token::Record => self.record_construction(),
            _ => Err(self.cursor.unexpected("an expression")),
        }
    }

    /// qualified-name ::= id ('.' id)*, with no spaces around the dots
    pub(super) fn qualified_name(&mut self, what: &str) -> PResult<QualifiedName> {
        let first = self.name(what)?;
        let start = first.span.start;
        let mut end = first.span.end;
        let mut segments = vec![first];
        loop {
            let dot = self.cursor.peek();
            let next = self.cursor.peek_nth(1);
            let adjacent = dot.token == Token::Dot
                && dot.span.start == end
                && matches!(next.token, Token::Ident(_))
                && next.span.start == dot.span.end;
            if !adjacent {
                break;
            }
            self.cursor.advance();
            let segment = self.name("a name after `.`")?;
            end = segment.span.end;
            segments.push(segment);
        }
        Ok(QualifiedName {
            span: Span::new(start, end),
            segments,
        })
    }

    /// typed-param ::= '(' id+ ':' expr ')' | '{' id+ ':' expr '}'
    pub(super) fn typed_param(&mut self) -> PResult<TypedParam<Expr>> {
        let open = self.cursor.advance();
        let (implicit, close) = match open.token {
            Token::LBrace => (true, Token::RBrace),
            _ => (false, Token::RParen),
        };
        let mut names = Vec::new();
        while !self.cursor.at(&Token::Colon) {
            names.push(self.binder_name("a parameter name")?);
        }
        if names.is_empty() {
            return Err(Diagnostic::syntax(
                self.cursor.peek().span,
                "typed parameter needs at least one name before `:`",
            ));
        }
        self.cursor.advance();
        let ty = self.expr()?;
        let context = if implicit { "to close `{`" } else { "to close `(`" };
        self.cursor.expect(&close, context)?;
        Ok(TypedParam {
            span: self.cursor.span_from(open.span.start),
            implicit,
            names,
            ty,
        })
    }

    /// A bound name; `_` binds nothing but is accepted
    fn binder_name(&mut self, what: &str) -> PResult<Name> {
        if let Some(tok) = self.cursor.eat(&Token::Underscore) {
            return Ok(Spanned::new(intern("_"), tok.span));
        }
        self.name(what)
    }

    fn bindings(&mut self, what: &str) -> PResult<Vec<Binding<Expr>>> {
        let mut bindings = Vec::new();
        while !self.cursor.at(&Token::Arrow) {
            let binding = match self.cursor.peek_token() {
                Token::LParen | Token::LBrace => {
                    if !self.cursor.bracket_is_typed_param() {
                        return Err(self.cursor.unexpected("a typed binding `(x : A)`"));
                    }
                    Binding::Typed(self.typed_param()?)
                }
                _ => Binding::Name(self.binder_name(what)?),
            };
            bindings.push(binding);
        }
        if bindings.is_empty() {
            return Err(self.cursor.unexpected(what));
        }
        self.cursor.advance();
        Ok(bindings)
    }

    /// \x (y : A) -> body
    fn lambda(&mut self) -> PResult<Expr> {
        let start = self.cursor.advance().span.start;
        let bindings = self.bindings("a lambda binding")?;
        let body = self.expr()?;
        Ok(Expr::Lambda {
            span: self.cursor.span_from(start),
            bindings,
            body: Box::new(body),
        })
    }

    /// forall x {y : A} -> body
    fn forall(&mut self) -> PResult<Expr> {
        let start = self.cursor.advance().span.start;
        let params = self.bindings("a forall binding")?;
        let body = self.expr()?;
        Ok(Expr::Forall {
            span: self.cursor.span_from(start),
            params,
            body: Box::new(body),
        })
    }

    /// let decls in body
    fn let_in(&mut self) -> PResult<Expr> {
        let start = self.cursor.advance().span.start;
        let decls = self.block(Self::decl)?;
        self.cursor.expect(&Token::In, "after let bindings")?;
        let body = self.expr()?;
        Ok(Expr::Let {
            span: self.cursor.span_from(start),
            decls,
            body: Box::new(body),
        })
    }

    /// record P? { x = a ; y = b }
    fn record_construction(&mut self) -> PResult<Atom> {
        let start = self.cursor.advance().span.start;
        let constructor = match self.cursor.peek_token() {
            Token::Ident(_) => Some(self.qualified_name("a record constructor")?),
            _ => None,
        };
        self.cursor.expect(&Token::LBrace, "to start record fields")?;
        let mut fields = Vec::new();
        while !self.cursor.at(&Token::RBrace) {
            if !fields.is_empty() {
                self.cursor.expect(&Token::Semicolon, "between record fields")?;
            }
            let name = self.name("a field name")?;
            self.cursor.expect(&Token::Equals, "after field name")?;
            let value = self.expr()?;
            fields.push(FieldAssign {
                span: self.cursor.span_from(name.span.start),
                name,
                value,
            });
        }
        self.cursor.advance();
        Ok(Atom::Record {
            span: self.cursor.span_from(start),
            constructor,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::cst::{Atom, Expr};
    use crate::options::ParseOptions;
    use crate::parser::Parser;

    fn parse_cst(source: &str) -> Expr {
        let options = ParseOptions::default();
        let mut parser = Parser::new(source, &options);
        let mut exprs = parser.block(|p| p.expr()).unwrap();
        assert!(parser.diagnostics.is_empty(), "{:?}", parser.diagnostics);
        assert_eq!(exprs.len(), 1);
        exprs.remove(0)
    }

    #[test]
    fn test_run_of_atoms() {
        match parse_cst("f x _ () Type 42") {
            Expr::Run { atoms, .. } => assert_eq!(atoms.len(), 6),
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_lambda_body_is_greedy() {
        match parse_cst(r"\x -> x -> y") {
            Expr::Lambda { body, .. } => assert!(matches!(*body, Expr::Arrow { .. })),
            other => panic!("expected lambda, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_special_form_ends_run() {
        match parse_cst(r"f a \x -> x") {
            Expr::Run { atoms, .. } => {
                assert_eq!(atoms.len(), 3);
                assert!(matches!(atoms[2], Atom::Special(_)));
            }
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_dependent_arrow_domain() {
        match parse_cst("(A : Type) {n : Nat} -> Vec A n") {
            Expr::Arrow { domain, .. } => {
                assert_eq!(domain.len(), 2);
                assert!(domain.iter().all(|a| matches!(a, Atom::Param(_))));
            }
            other => panic!("expected arrow, got {:?}", other),
        }
    }

    #[test]
    fn test_qualified_names_need_adjacent_dots() {
        match parse_cst("Data.Nat.suc x") {
            Expr::Run { atoms, .. } => match &atoms[0] {
                Atom::Name { name, .. } => assert_eq!(name.segments.len(), 3),
                other => panic!("expected name, got {:?}", other),
            },
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_let_block_then_in() {
        match parse_cst("let x = a\n    y = b in f x y") {
            Expr::Let { decls, body, .. } => {
                assert_eq!(decls.len(), 2);
                assert!(matches!(*body, Expr::Run { .. }));
            }
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn test_record_construction() {
        match parse_cst("record Pair { fst = a ; snd = b c }") {
            Expr::Run { atoms, .. } => match &atoms[..] {
                [Atom::Record {
                    constructor: Some(_),
                    fields,
                    ..
                }] => assert_eq!(fields.len(), 2),
                other => panic!("expected record, got {:?}", other),
            },
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_forall_with_implicit_binding() {
        assert!(matches!(
            parse_cst("forall {A : Type} x -> A"),
            Expr::Forall { ref params, .. } if params.len() == 2
        ));
    }
}
