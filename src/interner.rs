//! Process-wide identifier interning.
//!
//! Every parse worker shares one table. Lookups take the read lock; only a
//! string that has never been seen takes the write lock, and `get_or_intern`
//! re-checks under that lock, so each distinct string gets exactly one symbol
//! no matter how many threads race to insert it.

use std::sync::{OnceLock, RwLock};

use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

/// Type alias for our symbol type
pub type Symbol = DefaultSymbol;

/// Type alias for our string interner
type Interner = StringInterner<DefaultBackend>;

static INTERNER: OnceLock<RwLock<Interner>> = OnceLock::new();

fn table() -> &'static RwLock<Interner> {
    INTERNER.get_or_init(|| RwLock::new(StringInterner::new()))
}

/// Intern a string and return its symbol
pub fn intern(s: &str) -> Symbol {
    {
        let guard = table().read().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(sym) = guard.get(s) {
            return sym;
        }
    }
    let mut guard = table().write().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.get_or_intern(s)
}

/// Resolve a symbol back to its string
pub fn resolve(sym: Symbol) -> Option<String> {
    let guard = table().read().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.resolve(sym).map(|s| s.to_string())
}

/// Number of distinct strings interned so far.
pub fn len() -> usize {
    table()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let a = intern("interner-test-ident");
        let b = intern("interner-test-ident");
        assert_eq!(a, b);
        assert_eq!(resolve(a).as_deref(), Some("interner-test-ident"));
    }

    #[test]
    fn distinct_strings_get_distinct_symbols() {
        assert_ne!(intern("interner-left"), intern("interner-right"));
    }

    #[test]
    fn concurrent_interning_yields_one_symbol() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| intern("interner-shared-across-threads")))
            .collect();
        let symbols: Vec<Symbol> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(symbols.windows(2).all(|w| w[0] == w[1]));
    }
}
