//! Symbol → hash code table.
//!
//! Symbols have no textual form to hash, so each one is assigned a token
//! derived from a random UUID the first time it is hashed. The table lives
//! for the whole process (see [`SymbolTable::global`]) so that the same
//! symbol hashes identically across independent operations; tests and
//! embedders may inject their own table instead.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use vcmp_types::{HashCode, Symbol, SymbolId};

use crate::hasher::KindHasher;

/// Thread-safe mapping from symbol identity to its assigned hash code.
#[derive(Debug, Default)]
pub struct SymbolTable {
    tokens: RwLock<HashMap<SymbolId, HashCode>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide table.
    pub fn global() -> Arc<SymbolTable> {
        static GLOBAL: OnceLock<Arc<SymbolTable>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(SymbolTable::new())))
    }

    /// Token for `symbol`, assigning a fresh one on first use.
    pub fn token_for(&self, symbol: &Symbol) -> HashCode {
        let id = symbol.id();
        if let Some(token) = self
            .tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return *token;
        }

        let fresh = KindHasher::SYMBOL.hash(&uuid::Uuid::new_v4().to_string());
        *self
            .tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert(fresh)
    }

    /// Number of symbols assigned so far.
    pub fn len(&self) -> usize {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_symbol_gets_same_token() {
        let table = SymbolTable::new();
        let sym = Symbol::new(Some("s"));
        assert_eq!(table.token_for(&sym), table.token_for(&sym.clone()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn distinct_symbols_get_distinct_tokens() {
        let table = SymbolTable::new();
        let a = Symbol::new(Some("s"));
        let b = Symbol::new(Some("s"));
        assert_ne!(table.token_for(&a), table.token_for(&b));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn global_table_is_shared() {
        let sym = Symbol::new(None);
        let first = SymbolTable::global().token_for(&sym);
        assert_eq!(SymbolTable::global().token_for(&sym), first);
    }

    #[test]
    fn table_is_usable_across_threads() {
        let table = Arc::new(SymbolTable::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || {
                    let sym = Symbol::new(None);
                    table.token_for(&sym)
                })
            })
            .collect();
        for handle in handles {
            assert!(!handle.join().unwrap().is_empty());
        }
        assert_eq!(table.len(), 4);
    }
}
