//! Operator resolution: turns the parser's flat runs into application and
//! infix trees.
//!
//! For each run:
//! 1. atoms that name a declared operator become operator items, all
//!    others are resolved as operands;
//! 2. adjacent operands fold into left-nested applications, so application
//!    binds tighter than any operator;
//! 3. precedence climbing combines operands and operators, rejecting a
//!    non-associative chain and a mix of associativities at one level.

use std::collections::VecDeque;

use crate::ast::decl::{Associativity, Constructor, Decl, Field};
use crate::ast::expr::{
    ArrowDomain, Binding, Expr, FieldAssign, Name, QualifiedName, TypedParam,
};
use crate::ast::span::Span;
use crate::cst::{self, Atom};
use crate::diagnostics::Diagnostic;
use crate::fixity::{FixityEntry, FixityTable};
use crate::interner::resolve;

type PResult<T> = Result<T, Diagnostic>;

/// An operator occurrence together with its fixity
#[derive(Debug, Clone)]
struct Op {
    name: Name,
    entry: FixityEntry,
}

impl Op {
    fn text(&self) -> String {
        resolve(self.name.node).unwrap_or_default()
    }
}

enum Item {
    Operand(Expr),
    Operator(Op),
}

/// Precedence climbing over an alternating operand/operator sequence
struct Climber {
    operands: VecDeque<Expr>,
    operators: VecDeque<Op>,
    span: Span,
    /// Right-nesting still allowed before the chain is too deep
    budget: usize,
}

impl Climber {
    fn next_operand(&mut self) -> PResult<Expr> {
        self.operands
            .pop_front()
            .ok_or_else(|| Diagnostic::syntax(self.span, "expected an operand"))
    }

    /// `prev` is the operator whose right operand is being built, or the
    /// last operator combined at this level.
    fn climb(&mut self, min_prec: u16, mut prev: Option<Op>) -> PResult<Expr> {
        let mut lhs = self.next_operand()?;
        while let Some(op) = self.operators.front().cloned() {
            let prec = u16::from(op.entry.precedence);
            if prec < min_prec {
                break;
            }
            self.operators.pop_front();
            if let Some(prev) = &prev {
                check_chain(prev, &op)?;
            }
            let next_min = match op.entry.assoc {
                Associativity::Right => prec,
                Associativity::Left | Associativity::None => prec + 1,
            };
            if self.budget == 0 {
                return Err(Diagnostic::syntax(
                    op.name.span,
                    format!("operator chain nests too deeply at `{}`", op.text()),
                ));
            }
            self.budget -= 1;
            let rhs = self.climb(next_min, Some(op.clone()));
            self.budget += 1;
            let rhs = rhs?;
            lhs = Expr::Infix {
                span: lhs.span().merge(rhs.span()),
                op: op.name.clone(),
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
            prev = Some(op);
        }
        Ok(lhs)
    }
}

/// Two operators meeting at the same precedence level must agree on a
/// direction.
fn check_chain(prev: &Op, op: &Op) -> PResult<()> {
    if prev.entry.precedence != op.entry.precedence {
        return Ok(());
    }
    if prev.entry.assoc != op.entry.assoc {
        return Err(Diagnostic::fixity(
            op.name.span,
            format!(
                "cannot mix `{}` ({} {}) and `{}` ({} {}) in the same expression",
                prev.text(),
                prev.entry.assoc.keyword(),
                prev.entry.precedence,
                op.text(),
                op.entry.assoc.keyword(),
                op.entry.precedence
            ),
        ));
    }
    if op.entry.assoc == Associativity::None {
        return Err(Diagnostic::fixity(
            op.name.span,
            format!(
                "ambiguous non-associative operator chain: `{}` cannot follow `{}` at precedence {} without parentheses",
                op.text(),
                prev.text(),
                op.entry.precedence
            ),
        ));
    }
    Ok(())
}

/// Reject expression forms that cannot appear in a pattern
fn check_pattern(expr: &Expr) -> PResult<()> {
    match expr {
        Expr::LetIn { .. } | Expr::Lambda { .. } | Expr::Forall { .. } | Expr::Arrow { .. } => {
            Err(Diagnostic::syntax(
                expr.span(),
                format!("{} is not allowed in a pattern", expr.describe()),
            ))
        }
        Expr::Paren { expr, .. } => check_pattern(expr),
        Expr::App { func, arg, .. } => {
            check_pattern(func)?;
            check_pattern(arg)
        }
        Expr::Infix { left, right, .. } => {
            check_pattern(left)?;
            check_pattern(right)
        }
        Expr::RecordConstruction { fields, .. } => {
            fields.iter().try_for_each(|field| check_pattern(&field.value))
        }
        Expr::Name { .. }
        | Expr::Hole { .. }
        | Expr::Unit { .. }
        | Expr::TypeUniverse { .. }
        | Expr::IntLit { .. } => Ok(()),
    }
}

/// f a b => [f, a, b]
fn flatten_spine(expr: Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::App { func, arg, .. } => {
            flatten_spine(*func, out);
            out.push(*arg);
        }
        other => out.push(other),
    }
}

fn atoms_span(atoms: &[Atom]) -> Option<Span> {
    let first = atoms.first()?.span();
    let last = atoms.last()?.span();
    Some(first.merge(last))
}

/// Resolves a whole file, scope by scope
#[derive(Debug)]
pub struct Resolver {
    table: FixityTable,
    diagnostics: Vec<Diagnostic>,
    depth: usize,
    max_nesting: usize,
}

impl Resolver {
    pub fn new(max_nesting: usize) -> Self {
        Self {
            table: FixityTable::default(),
            diagnostics: Vec::new(),
            depth: 0,
            max_nesting,
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Resolve the top-level declarations of a file
    pub fn file(&mut self, decls: Vec<cst::Decl>) -> Vec<Decl> {
        self.with_scope(decls, Self::decls)
    }

    /// Resolve one expression with the fixities declared in `context`
    pub fn expr_in(&mut self, context: &[cst::Decl], expr: cst::Expr) -> Option<Expr> {
        let errors = self.table.enter(context);
        self.diagnostics.extend(errors);
        let result = self.expr(expr);
        self.table.exit();
        match result {
            Ok(expr) => Some(expr),
            Err(err) => {
                self.diagnostics.push(err);
                None
            }
        }
    }

    /// Run `f` inside a fixity scope made of `decls`' fixity declarations
    fn with_scope<T>(
        &mut self,
        decls: Vec<cst::Decl>,
        f: impl FnOnce(&mut Self, Vec<cst::Decl>) -> T,
    ) -> T {
        let errors = self.table.enter(&decls);
        self.diagnostics.extend(errors);
        let result = f(self, decls);
        self.table.exit();
        result
    }

    /// Resolve a declaration list; a declaration that fails is reported and
    /// left out.
    fn decls(&mut self, decls: Vec<cst::Decl>) -> Vec<Decl> {
        let mut resolved = Vec::with_capacity(decls.len());
        for decl in decls {
            match self.decl(decl) {
                Ok(decl) => resolved.push(decl),
                Err(err) => self.diagnostics.push(err),
            }
        }
        resolved
    }

    fn decl(&mut self, decl: cst::Decl) -> PResult<Decl> {
        match decl {
            Decl::Data {
                span,
                name,
                params,
                ty,
                constructors,
            } => Ok(Decl::Data {
                span,
                name,
                params: self.typed_params(params)?,
                ty: self.opt_expr(ty)?,
                constructors: constructors
                    .into_iter()
                    .map(|c| -> PResult<Constructor> {
                        Ok(Constructor {
                            span: c.span,
                            names: c.names,
                            ty: self.expr(c.ty)?,
                        })
                    })
                    .collect::<PResult<_>>()?,
            }),
            Decl::EmptyData {
                span,
                name,
                params,
                ty,
            } => Ok(Decl::EmptyData {
                span,
                name,
                params: self.typed_params(params)?,
                ty: self.opt_expr(ty)?,
            }),
            Decl::Record {
                span,
                name,
                params,
                ty,
                constructor,
                fields,
                decls,
            } => {
                let params = self.typed_params(params)?;
                let ty = self.opt_expr(ty)?;
                let (fields, decls) = self.with_scope(decls, |r, decls| {
                    let decls = r.decls(decls);
                    let fields = fields
                        .into_iter()
                        .map(|f| -> PResult<Field> {
                            Ok(Field {
                                span: f.span,
                                names: f.names,
                                ty: r.expr(f.ty)?,
                            })
                        })
                        .collect::<PResult<Vec<_>>>();
                    (fields, decls)
                });
                Ok(Decl::Record {
                    span,
                    name,
                    params,
                    ty,
                    constructor,
                    fields: fields?,
                    decls,
                })
            }
            Decl::Module {
                span,
                name,
                params,
                decls,
            } => {
                let params = self.typed_params(params)?;
                let decls = self.with_scope(decls, Self::decls);
                Ok(Decl::Module {
                    span,
                    name,
                    params,
                    decls,
                })
            }
            Decl::Import { span, kind, module } => Ok(Decl::Import { span, kind, module }),
            Decl::Function { span, names, ty } => Ok(Decl::Function {
                span,
                names,
                ty: self.expr(ty)?,
            }),
            Decl::FunctionClause {
                span,
                patterns,
                infix: _,
                with_patterns,
                with_expr,
                rhs,
                where_decls,
            } => {
                let mut resolved = Vec::new();
                let mut infix = false;
                for lhs in patterns {
                    let (mut pats, is_infix) = self.patterns(lhs)?;
                    resolved.append(&mut pats);
                    infix |= is_infix;
                }
                let with_patterns = with_patterns
                    .into_iter()
                    .map(|p| self.pattern(p))
                    .collect::<PResult<Vec<_>>>()?;

                // The where block scopes over the right-hand side only
                let (where_decls, with_expr, rhs) = self.with_scope(where_decls, |r, decls| {
                    let where_decls = r.decls(decls);
                    let with_expr = r.opt_expr(with_expr);
                    let rhs = r.opt_expr(rhs);
                    (where_decls, with_expr, rhs)
                });
                Ok(Decl::FunctionClause {
                    span,
                    patterns: resolved,
                    infix,
                    with_patterns,
                    with_expr: with_expr?,
                    rhs: rhs?,
                    where_decls,
                })
            }
            Decl::Fixity {
                span,
                assoc,
                precedence,
                operators,
            } => Ok(Decl::Fixity {
                span,
                assoc,
                precedence,
                operators,
            }),
        }
    }

    /// Resolve a clause left-hand side into its pattern list
    fn patterns(&mut self, lhs: cst::Expr) -> PResult<(Vec<Expr>, bool)> {
        let expr = self.pattern(lhs)?;
        Ok(match expr {
            Expr::Infix {
                op, left, right, ..
            } => (
                vec![
                    Expr::Name {
                        span: op.span,
                        name: QualifiedName::simple(op),
                    },
                    *left,
                    *right,
                ],
                true,
            ),
            other => {
                let mut spine = Vec::new();
                flatten_spine(other, &mut spine);
                (spine, false)
            }
        })
    }

    fn pattern(&mut self, pattern: cst::Expr) -> PResult<Expr> {
        let expr = self.expr(pattern)?;
        check_pattern(&expr)?;
        Ok(expr)
    }

    fn opt_expr(&mut self, expr: Option<cst::Expr>) -> PResult<Option<Expr>> {
        expr.map(|e| self.expr(e)).transpose()
    }

    pub(crate) fn expr(&mut self, expr: cst::Expr) -> PResult<Expr> {
        if self.depth >= self.max_nesting {
            return Err(Diagnostic::syntax(
                expr.span(),
                format!("nesting exceeds the limit of {} levels", self.max_nesting),
            ));
        }
        self.depth += 1;
        let result = self.expr_at_depth(expr);
        self.depth -= 1;
        result
    }

    fn expr_at_depth(&mut self, expr: cst::Expr) -> PResult<Expr> {
        match expr {
            cst::Expr::Run { span, atoms } => self.run(atoms, span),
            cst::Expr::Arrow {
                span,
                domain,
                codomain,
            } => {
                let domain = self.arrow_domain(domain, span)?;
                let codomain = self.expr(*codomain)?;
                Ok(Expr::Arrow {
                    span,
                    domain,
                    codomain: Box::new(codomain),
                })
            }
            cst::Expr::Lambda {
                span,
                bindings,
                body,
            } => Ok(Expr::Lambda {
                span,
                bindings: self.bindings(bindings)?,
                body: Box::new(self.expr(*body)?),
            }),
            cst::Expr::Forall { span, params, body } => Ok(Expr::Forall {
                span,
                params: self.bindings(params)?,
                body: Box::new(self.expr(*body)?),
            }),
            cst::Expr::Let { span, decls, body } => self.with_scope(decls, |r, decls| {
                let decls = r.decls(decls);
                let body = r.expr(*body)?;
                Ok(Expr::LetIn {
                    span,
                    decls,
                    body: Box::new(body),
                })
            }),
        }
    }

    /// All typed parameters, or an ordinary run; never a mix
    fn arrow_domain(&mut self, atoms: Vec<Atom>, span: Span) -> PResult<ArrowDomain> {
        let params = atoms.iter().filter(|a| matches!(a, Atom::Param(_))).count();
        if params == 0 {
            let run_span = atoms_span(&atoms).unwrap_or(span);
            return Ok(ArrowDomain::Expr(Box::new(self.run(atoms, run_span)?)));
        }
        if params < atoms.len() {
            let culprit = atoms
                .iter()
                .find(|a| !matches!(a, Atom::Param(_)))
                .map_or(span, Atom::span);
            return Err(Diagnostic::syntax(
                culprit,
                "typed parameters cannot be mixed with other terms before `->`",
            ));
        }
        let mut resolved = Vec::with_capacity(params);
        for atom in atoms {
            if let Atom::Param(param) = atom {
                resolved.push(self.typed_param(param)?);
            }
        }
        Ok(ArrowDomain::Params(resolved))
    }

    fn typed_param(&mut self, param: TypedParam<cst::Expr>) -> PResult<TypedParam> {
        Ok(TypedParam {
            span: param.span,
            implicit: param.implicit,
            names: param.names,
            ty: self.expr(param.ty)?,
        })
    }

    fn typed_params(&mut self, params: Vec<TypedParam<cst::Expr>>) -> PResult<Vec<TypedParam>> {
        params.into_iter().map(|p| self.typed_param(p)).collect()
    }

    fn bindings(&mut self, bindings: Vec<Binding<cst::Expr>>) -> PResult<Vec<Binding>> {
        bindings
            .into_iter()
            .map(|b| match b {
                Binding::Name(name) => Ok(Binding::Name(name)),
                Binding::Typed(param) => Ok(Binding::Typed(self.typed_param(param)?)),
            })
            .collect()
    }

    fn atom(&mut self, atom: Atom) -> PResult<Expr> {
        match atom {
            Atom::Name { span, name } => Ok(Expr::Name { span, name }),
            Atom::Hole { span } => Ok(Expr::Hole { span }),
            Atom::Unit { span } => Ok(Expr::Unit { span }),
            Atom::Type { span } => Ok(Expr::TypeUniverse { span }),
            Atom::Int { span, value } => Ok(Expr::IntLit { span, value }),
            Atom::Paren { span, expr } => Ok(Expr::Paren {
                span,
                expr: Box::new(self.expr(*expr)?),
            }),
            Atom::Param(param) => Err(Diagnostic::syntax(
                param.span,
                "a typed parameter is only allowed in front of `->`",
            )),
            Atom::Record {
                span,
                constructor,
                fields,
            } => Ok(Expr::RecordConstruction {
                span,
                constructor,
                fields: fields
                    .into_iter()
                    .map(|f| -> PResult<FieldAssign> {
                        Ok(FieldAssign {
                            span: f.span,
                            name: f.name,
                            value: self.expr(f.value)?,
                        })
                    })
                    .collect::<PResult<_>>()?,
            }),
            Atom::Special(expr) => self.expr(*expr),
        }
    }

    /// Resolve one run of atoms
    fn run(&mut self, atoms: Vec<Atom>, span: Span) -> PResult<Expr> {
        // Step 1 and 2: classify atoms, folding adjacent operands into applications
        let mut items: Vec<Item> = Vec::with_capacity(atoms.len());
        for atom in atoms {
            if let Atom::Name { name, .. } = &atom {
                let entry = name
                    .as_simple()
                    .and_then(|simple| self.table.lookup(simple.node).map(|e| (simple, *e)));
                if let Some((simple, entry)) = entry {
                    items.push(Item::Operator(Op {
                        name: simple.clone(),
                        entry,
                    }));
                    continue;
                }
            }
            let operand = self.atom(atom)?;
            match items.pop() {
                Some(Item::Operand(func)) => items.push(Item::Operand(Expr::App {
                    span: func.span().merge(operand.span()),
                    func: Box::new(func),
                    arg: Box::new(operand),
                })),
                Some(other) => {
                    items.push(other);
                    items.push(Item::Operand(operand));
                }
                None => items.push(Item::Operand(operand)),
            }
        }

        // Step 3: every operator needs an operand on both sides
        let mut climber = Climber {
            operands: VecDeque::new(),
            operators: VecDeque::new(),
            span,
            budget: self.max_nesting.saturating_sub(self.depth),
        };
        let mut last_op: Option<Op> = None;
        for item in items {
            match item {
                Item::Operand(expr) => {
                    climber.operands.push_back(expr);
                    last_op = None;
                }
                Item::Operator(op) => {
                    if climber.operands.len() == climber.operators.len() {
                        return Err(Diagnostic::syntax(
                            op.name.span,
                            format!("operator `{}` is missing its left operand", op.text()),
                        ));
                    }
                    climber.operators.push_back(op.clone());
                    last_op = Some(op);
                }
            }
        }
        if let Some(op) = last_op {
            return Err(Diagnostic::syntax(
                op.name.span,
                format!("operator `{}` is missing its right operand", op.text()),
            ));
        }

        // Step 4: precedence climbing
        let expr = climber.climb(0, None)?;
        log::trace!("fixity: resolved run at {}", span);
        Ok(expr)
    }
}
