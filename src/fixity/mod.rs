//! Operator fixity table.
//!
//! Operators are ordinary identifiers that happen to have an entry here.
//! Every `module`, `record`, `let` and clause `where` block is its own scope;
//! its entries come from all fixity declarations at that level, wherever
//! they appear, and shadow entries of enclosing scopes.

pub mod resolve;

use std::collections::HashMap;

use crate::ast::decl::{Associativity, Decl};
use crate::ast::span::Span;
use crate::diagnostics::Diagnostic;
use crate::interner::{resolve as resolve_name, Symbol};

/// Declared fixity of one operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixityEntry {
    pub operator: Symbol,
    pub precedence: u8,
    pub assoc: Associativity,
    /// The declaring fixity declaration
    pub span: Span,
}

/// Scope stack of operator fixities
#[derive(Debug, Default)]
pub struct FixityTable {
    scopes: Vec<HashMap<Symbol, FixityEntry>>,
}

impl FixityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scope holding the fixity declarations among `decls`.
    ///
    /// A second declaration for the same operator in one scope is reported
    /// and ignored; the first one wins.
    pub fn enter<E>(&mut self, decls: &[Decl<E>]) -> Vec<Diagnostic> {
        let mut scope: HashMap<Symbol, FixityEntry> = HashMap::new();
        let mut errors = Vec::new();
        for decl in decls {
            let Decl::Fixity {
                span,
                assoc,
                precedence,
                operators,
            } = decl
            else {
                continue;
            };
            for op in operators {
                if let Some(previous) = scope.get(&op.node) {
                    errors.push(Diagnostic::fixity(
                        op.span,
                        format!(
                            "operator `{}` already has a fixity declaration in this scope ({} {})",
                            resolve_name(op.node).unwrap_or_default(),
                            previous.assoc.keyword(),
                            previous.precedence
                        ),
                    ));
                    continue;
                }
                log::trace!(
                    "fixity: {} {} `{}`",
                    assoc.keyword(),
                    precedence,
                    resolve_name(op.node).unwrap_or_default()
                );
                scope.insert(
                    op.node,
                    FixityEntry {
                        operator: op.node,
                        precedence: *precedence,
                        assoc: *assoc,
                        span: *span,
                    },
                );
            }
        }
        self.scopes.push(scope);
        errors
    }

    pub fn exit(&mut self) {
        self.scopes.pop();
    }

    /// Innermost entry for `operator`, if it is an operator at all
    pub fn lookup(&self, operator: Symbol) -> Option<&FixityEntry> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&operator))
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::span::Spanned;
    use crate::interner::intern;

    fn fixity(assoc: Associativity, precedence: u8, ops: &[&str], at: usize) -> Decl {
        Decl::Fixity {
            span: Span::new(at, at + 1),
            assoc,
            precedence,
            operators: ops
                .iter()
                .map(|op| Spanned::new(intern(op), Span::new(at, at + 1)))
                .collect(),
        }
    }

    #[test]
    fn test_lookup_through_scopes() {
        let mut table = FixityTable::new();
        assert!(table.enter(&[fixity(Associativity::Left, 6, &["+"], 0)]).is_empty());
        assert!(table
            .enter(&[fixity(Associativity::Right, 2, &["+"], 10)])
            .is_empty());
        assert_eq!(table.lookup(intern("+")).map(|e| e.precedence), Some(2));
        table.exit();
        assert_eq!(table.lookup(intern("+")).map(|e| e.precedence), Some(6));
        table.exit();
        assert!(table.lookup(intern("+")).is_none());
        assert_eq!(table.depth(), 0);
    }

    #[test]
    fn test_duplicate_in_one_scope_is_error() {
        let mut table = FixityTable::new();
        let errors = table.enter(&[
            fixity(Associativity::Left, 6, &["<+>"], 0),
            fixity(Associativity::Right, 3, &["<+>"], 20),
        ]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, Span::new(20, 21));
        assert_eq!(errors[0].code(), "FixityError");
        assert_eq!(table.lookup(intern("<+>")).map(|e| e.precedence), Some(6));
    }

    #[test]
    fn test_unknown_identifier_is_not_operator() {
        let mut table = FixityTable::new();
        let _ = table.enter::<crate::ast::Expr>(&[]);
        assert!(table.lookup(intern("plainName")).is_none());
    }
}
