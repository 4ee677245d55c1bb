use crate::ast::decl::{Associativity, Constructor, Decl, Field, ImportKind};
use crate::ast::expr::{Name, TypedParam};
use crate::ast::span::Spanned;
use crate::cst;
use crate::diagnostics::Diagnostic;
use crate::lexer::Token;

use super::{PResult, Parser};

/// One entry of a record body
enum RecordItem {
    Constructor(Name),
    Field(Field<cst::Expr>),
    Decl(cst::Decl),
}

impl<'o> Parser<'o> {
    /// Parse one declaration, dispatching on its leading keyword
    pub(super) fn decl(&mut self) -> PResult<cst::Decl> {
        match self.cursor.peek_token() {
            Token::Data => self.data_decl(),
            Token::Record => self.record_decl(),
            Token::Module => self.module_decl(),
            Token::Import | Token::Open => self.import_decl(),
            Token::Infix | Token::Infixl | Token::Infixr => self.fixity_decl(),
            Token::Field | Token::Constructor => {
                let tok = self.cursor.peek();
                Err(Diagnostic::syntax(
                    tok.span,
                    format!("`{}` is only allowed directly inside a record", tok.token),
                ))
            }
            _ => self.ascription_or_clause(),
        }
    }

    pub(super) fn name(&mut self, what: &str) -> PResult<Name> {
        match self.cursor.peek_token() {
            Token::Ident(ident) => {
                let ident = *ident;
                let tok = self.cursor.advance();
                Ok(Spanned::new(ident, tok.span))
            }
            _ => Err(self.cursor.unexpected(what)),
        }
    }

    /// One or more names, stopping at the first non-identifier
    fn names(&mut self, what: &str) -> PResult<Vec<Name>> {
        let mut names = vec![self.name(what)?];
        while matches!(self.cursor.peek_token(), Token::Ident(_)) {
            names.push(self.name(what)?);
        }
        Ok(names)
    }

    /// Typed parameters of a declaration header
    fn header_params(&mut self) -> PResult<Vec<TypedParam<cst::Expr>>> {
        let mut params = Vec::new();
        while matches!(self.cursor.peek_token(), Token::LParen | Token::LBrace) {
            params.push(self.typed_param()?);
        }
        Ok(params)
    }

    fn optional_type(&mut self) -> PResult<Option<cst::Expr>> {
        if self.cursor.eat(&Token::Colon).is_some() {
            Ok(Some(self.expr()?))
        } else {
            Ok(None)
        }
    }

    /// data Nat : Type where zero : Nat; suc : Nat -> Nat
    fn data_decl(&mut self) -> PResult<cst::Decl> {
        let start = self.cursor.advance().span.start;
        let name = self.name("a name after `data`")?;
        let params = self.header_params()?;
        let ty = self.optional_type()?;

        if self.cursor.eat(&Token::Where).is_none() {
            return Ok(Decl::EmptyData {
                span: self.cursor.span_from(start),
                name,
                params,
                ty,
            });
        }
        let constructors = self.block(Self::constructor)?;
        Ok(Decl::Data {
            span: self.cursor.span_from(start),
            name,
            params,
            ty,
            constructors,
        })
    }

    fn constructor(&mut self) -> PResult<Constructor<cst::Expr>> {
        let start = self.cursor.peek().span.start;
        self.cursor.eat(&Token::Pipe);
        let names = self.names("a constructor name")?;
        self.cursor.expect(&Token::Colon, "after constructor names")?;
        let ty = self.expr()?;
        Ok(Constructor {
            span: self.cursor.span_from(start),
            names,
            ty,
        })
    }

    /// record Pair (A B : Type) : Type where constructor mk; field fst : A
    fn record_decl(&mut self) -> PResult<cst::Decl> {
        let start = self.cursor.advance().span.start;
        let name = self.name("a name after `record`")?;
        let params = self.header_params()?;
        let ty = self.optional_type()?;
        self.cursor.expect(&Token::Where, "after record header")?;

        let items = self.block(Self::record_item)?;
        let mut constructor = None;
        let mut fields = Vec::new();
        let mut decls = Vec::new();
        for item in items {
            match item {
                RecordItem::Constructor(name) => {
                    if constructor.is_some() {
                        self.diagnostics.push(Diagnostic::syntax(
                            name.span,
                            "record already has a constructor",
                        ));
                    } else {
                        constructor = Some(name);
                    }
                }
                RecordItem::Field(field) => fields.push(field),
                RecordItem::Decl(decl) => decls.push(decl),
            }
        }
        Ok(Decl::Record {
            span: self.cursor.span_from(start),
            name,
            params,
            ty,
            constructor,
            fields,
            decls,
        })
    }

    fn record_item(&mut self) -> PResult<RecordItem> {
        match self.cursor.peek_token() {
            Token::Constructor => {
                self.cursor.advance();
                Ok(RecordItem::Constructor(self.name("a constructor name")?))
            }
            Token::Field => {
                let start = self.cursor.advance().span.start;
                let names = self.names("a field name")?;
                self.cursor.expect(&Token::Colon, "after field names")?;
                let ty = self.expr()?;
                Ok(RecordItem::Field(Field {
                    span: self.cursor.span_from(start),
                    names,
                    ty,
                }))
            }
            _ => Ok(RecordItem::Decl(self.decl()?)),
        }
    }

    /// module M (A : Type) where ...
    fn module_decl(&mut self) -> PResult<cst::Decl> {
        let start = self.cursor.advance().span.start;
        let name = self.qualified_name("a module name")?;
        let params = self.header_params()?;
        self.cursor.expect(&Token::Where, "after module header")?;
        let decls = self.block(Self::decl)?;
        Ok(Decl::Module {
            span: self.cursor.span_from(start),
            name,
            params,
            decls,
        })
    }

    /// import M | open M | open import M
    fn import_decl(&mut self) -> PResult<cst::Decl> {
        let first = self.cursor.advance();
        let kind = match first.token {
            Token::Open if self.cursor.eat(&Token::Import).is_some() => ImportKind::OpenImport,
            Token::Open => ImportKind::Open,
            _ => ImportKind::Import,
        };
        let module = self.qualified_name("a module name")?;
        Ok(Decl::Import {
            span: self.cursor.span_from(first.span.start),
            kind,
            module,
        })
    }

    /// infixl 6 + -
    fn fixity_decl(&mut self) -> PResult<cst::Decl> {
        let keyword = self.cursor.advance();
        let assoc = match keyword.token {
            Token::Infixl => Associativity::Left,
            Token::Infixr => Associativity::Right,
            _ => Associativity::None,
        };

        let precedence = match self.cursor.peek_token() {
            Token::Integer(value) => {
                let value = *value;
                let tok = self.cursor.advance();
                let max = self.options.max_precedence;
                match u8::try_from(value) {
                    Ok(p) if p <= max => p,
                    _ => {
                        return Err(Diagnostic::fixity(
                            tok.span,
                            format!("precedence {} is out of range 0..={}", value, max),
                        ))
                    }
                }
            }
            _ => return Err(self.cursor.unexpected("a precedence level")),
        };

        let operators = self.names("an operator name")?;
        Ok(Decl::Fixity {
            span: self.cursor.span_from(keyword.span.start),
            assoc,
            precedence,
            operators,
        })
    }

    /// Declaration without a leading keyword: a top-level `:` makes it a type
    /// ascription, a top-level `=`, `with` or `|` a defining clause.
    fn ascription_or_clause(&mut self) -> PResult<cst::Decl> {
        let found = self
            .cursor
            .scan_item(&[Token::Colon, Token::Equals, Token::With, Token::Pipe])
            .cloned();
        match found {
            Some(Token::Colon) => self.ascription(),
            Some(_) => self.clause(),
            None => {
                let tok = self.cursor.peek();
                Err(Diagnostic::syntax(
                    tok.span,
                    format!(
                        "expected a type signature `:` or a definition `=` in declaration starting with `{}`",
                        tok.token
                    ),
                ))
            }
        }
    }

    /// f g : A -> A
    fn ascription(&mut self) -> PResult<cst::Decl> {
        let start = self.cursor.peek().span.start;
        let names = self.names("a name in type signature")?;
        self.cursor.expect(&Token::Colon, "after names in type signature")?;
        let ty = self.expr()?;
        Ok(Decl::Function {
            span: self.cursor.span_from(start),
            names,
            ty,
        })
    }

    /// lhs (| pat)* (with e)? (= rhs)? (where block)?
    fn clause(&mut self) -> PResult<cst::Decl> {
        let start = self.cursor.peek().span.start;
        let lhs = self.expr()?;

        let mut with_patterns = Vec::new();
        while self.cursor.eat(&Token::Pipe).is_some() {
            with_patterns.push(self.expr()?);
        }
        let with_expr = match self.cursor.eat(&Token::With) {
            Some(_) => Some(self.expr()?),
            None => None,
        };
        let rhs = match self.cursor.eat(&Token::Equals) {
            Some(_) => Some(self.expr()?),
            None => None,
        };
        if with_expr.is_none() && rhs.is_none() {
            return Err(self.cursor.unexpected("`=` or `with` after clause patterns"));
        }

        let where_decls = if self.cursor.eat(&Token::Where).is_some() {
            self.block(Self::decl)?
        } else {
            Vec::new()
        };

        Ok(Decl::FunctionClause {
            span: self.cursor.span_from(start),
            patterns: vec![lhs],
            infix: false,
            with_patterns,
            with_expr,
            rhs,
            where_decls,
        })
    }
}
