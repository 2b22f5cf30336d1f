use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a [`Symbol`].
///
/// Ids come from a monotonically increasing counter, so an id is never
/// reused for another symbol even after the original is dropped.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(u64);

impl SymbolId {
    fn next() -> Self {
        Self(NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym#{}", self.0)
    }
}

/// A unique value with no stable textual form.
///
/// Two symbols are equal only if they are clones of the same symbol; the
/// description is informational and never takes part in equality.
#[derive(Clone)]
pub struct Symbol {
    id: SymbolId,
    description: Option<Rc<str>>,
}

impl Symbol {
    /// Create a fresh symbol.
    pub fn new(description: Option<&str>) -> Self {
        Self {
            id: SymbolId::next(),
            description: description.map(Rc::from),
        }
    }

    /// The symbol's identity.
    pub fn id(&self) -> SymbolId {
        self.id
    }

    /// The optional description given at creation.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_with_same_description_are_distinct() {
        let a = Symbol::new(Some("token"));
        let b = Symbol::new(Some("token"));
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn clone_keeps_identity() {
        let a = Symbol::new(None);
        let copy = a.clone();
        assert_eq!(a, copy);
        assert_eq!(copy.description(), None);
    }

    #[test]
    fn display_includes_description() {
        let s = Symbol::new(Some("iterator"));
        assert_eq!(s.to_string(), "Symbol(iterator)");
    }
}
