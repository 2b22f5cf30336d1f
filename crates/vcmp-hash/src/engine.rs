//! Per-operation value hashing.
//!
//! [`HashEngine`] computes a [`HashCode`] for any value such that deeply
//! equal values hash equal. Composite hashes are memoized by identity for
//! the lifetime of the engine, and a stack of the composites currently
//! being hashed breaks cycles.
//!
//! # Cycles
//!
//! When a member points back at a composite that is still being hashed, the
//! engine does not descend. It substitutes a placeholder instead: a fixed
//! circular token in values-only mode, otherwise a token derived from the
//! back-referenced value's type identity. Distinct cyclic graphs can
//! therefore collide; hashing is only probabilistic once cycles are
//! involved.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexSet;
use tracing::trace;

use vcmp_types::{
    is_included, number_text, CompareOptions, HashCode, Identity, ObjectRef, Value,
};

use crate::hasher::KindHasher;
use crate::symbols::SymbolTable;

/// Strings up to this many characters are memoized by value.
pub const STRING_CACHE_LIMIT: usize = 36;

/// Cache record for one composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CacheEntry {
    /// On the ancestor stack; the token is not known yet.
    Pending,
    Finished(HashCode),
}

/// Counters collected while hashing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HashStats {
    /// Composites whose token was computed.
    pub composites: usize,
    /// Lookups answered from a cache.
    pub cache_hits: usize,
    /// Back-references replaced by a placeholder.
    pub cycles: usize,
}

/// Reserved tokens, computed once per engine.
#[derive(Clone, Copy, Debug)]
struct Constants {
    absent: HashCode,
    null: HashCode,
    true_: HashCode,
    false_: HashCode,
    circular: HashCode,
}

impl Constants {
    fn new() -> Self {
        Self {
            absent: KindHasher::ABSENT.hash(""),
            null: KindHasher::NULL.hash(""),
            true_: KindHasher::BOOLEAN.hash("true"),
            false_: KindHasher::BOOLEAN.hash("false"),
            circular: KindHasher::CIRCULAR.hash(""),
        }
    }
}

/// One composite being hashed.
struct Frame {
    id: Identity,
    members: std::vec::IntoIter<(String, Value)>,
    acc: String,
    /// Member whose composite value is being hashed one frame up.
    waiting_on: Option<String>,
}

impl Frame {
    fn append(&mut self, name: &str, token: HashCode) {
        self.acc
            .push_str(&KindHasher::PROPERTY.salted(&format!("prop:{name}:{token}")));
    }
}

/// How a member's token is obtained.
enum Resolution {
    Token(HashCode),
    Descend(ObjectRef),
}

/// Value hasher holding the per-operation caches and ancestor stack.
pub struct HashEngine {
    options: CompareOptions,
    symbols: Arc<SymbolTable>,
    constants: Constants,
    numbers: HashMap<String, HashCode>,
    strings: HashMap<Rc<str>, HashCode>,
    composites: HashMap<Identity, CacheEntry>,
    ancestors: IndexSet<Identity>,
    stats: HashStats,
}

impl HashEngine {
    /// Engine using the process-wide symbol table.
    pub fn new(options: CompareOptions) -> Self {
        Self::with_symbols(options, SymbolTable::global())
    }

    /// Engine using an injected symbol table.
    pub fn with_symbols(options: CompareOptions, symbols: Arc<SymbolTable>) -> Self {
        Self {
            options,
            symbols,
            constants: Constants::new(),
            numbers: HashMap::new(),
            strings: HashMap::new(),
            composites: HashMap::new(),
            ancestors: IndexSet::new(),
            stats: HashStats::default(),
        }
    }

    pub fn stats(&self) -> HashStats {
        self.stats
    }

    /// Hash a value, or `None` if the inclusion rules reject it.
    pub fn hash_included(&mut self, value: &Value) -> Option<HashCode> {
        if !is_included(value, None, &self.options) {
            return None;
        }
        Some(self.hash(value))
    }

    /// Hash a value regardless of inclusion at the top level.
    ///
    /// Members of composites are still filtered. An opaque composite hashes
    /// to the empty sentinel, as does a function while functions are
    /// excluded.
    pub fn hash(&mut self, value: &Value) -> HashCode {
        match value {
            Value::Object(obj) if obj.is_opaque() => HashCode::empty(),
            Value::Object(obj) => self.hash_composite(obj),
            primitive => self.hash_primitive(primitive),
        }
    }

    fn hash_primitive(&mut self, value: &Value) -> HashCode {
        match value {
            Value::Absent => self.constants.absent,
            Value::Null => self.constants.null,
            Value::Bool(true) => self.constants.true_,
            Value::Bool(false) => self.constants.false_,
            Value::Number(n) => self.hash_number(&KindHasher::NUMBER, &number_text(*n)),
            Value::BigInt(n) => self.hash_number(&KindHasher::BIGINT, &n.to_string()),
            Value::String(s) => self.hash_string(s),
            Value::Function(_) if self.options.exclude_functions => HashCode::empty(),
            Value::Function(func) => KindHasher::FUNCTION.hash(func.source()),
            Value::Symbol(sym) => self.symbols.token_for(sym),
            Value::Object(obj) => self.hash_composite(obj),
        }
    }

    fn hash_number(&mut self, hasher: &KindHasher, text: &str) -> HashCode {
        let salted = hasher.salted(text);
        if let Some(token) = self.numbers.get(&salted) {
            self.stats.cache_hits += 1;
            return *token;
        }
        let token = KindHasher::raw_hash(salted.as_bytes());
        self.numbers.insert(salted, token);
        token
    }

    fn hash_string(&mut self, s: &Rc<str>) -> HashCode {
        if s.chars().count() > STRING_CACHE_LIMIT {
            return KindHasher::STRING.hash(s);
        }
        if let Some(token) = self.strings.get(s) {
            self.stats.cache_hits += 1;
            return *token;
        }
        let token = KindHasher::STRING.hash(s);
        self.strings.insert(Rc::clone(s), token);
        token
    }

    fn hash_composite(&mut self, root: &ObjectRef) -> HashCode {
        if let Some(CacheEntry::Finished(token)) = self.composites.get(&root.identity()) {
            self.stats.cache_hits += 1;
            return *token;
        }

        let mut stack = vec![self.open(root)];
        let mut finished = None;

        while let Some(frame) = stack.last_mut() {
            match frame.members.next() {
                Some((name, child)) => {
                    if !is_included(&child, Some(&name), &self.options) {
                        continue;
                    }
                    match self.resolve(&child) {
                        Resolution::Token(token) => frame.append(&name, token),
                        Resolution::Descend(obj) => {
                            frame.waiting_on = Some(name);
                            let next = self.open(&obj);
                            stack.push(next);
                        }
                    }
                }
                None => {
                    let Some(done) = stack.pop() else { break };
                    let token = self.close(done);
                    match stack.last_mut() {
                        Some(parent) => {
                            let name = parent.waiting_on.take().unwrap_or_default();
                            parent.append(&name, token);
                        }
                        None => finished = Some(token),
                    }
                }
            }
        }

        finished.unwrap_or_else(HashCode::empty)
    }

    fn resolve(&mut self, child: &Value) -> Resolution {
        let Value::Object(obj) = child else {
            return Resolution::Token(self.hash_primitive(child));
        };
        let id = obj.identity();
        if self.ancestors.contains(&id) {
            self.stats.cycles += 1;
            trace!(depth = self.ancestors.len(), "cycle in composite hash; using placeholder");
            let token = if self.options.compare_values_only {
                self.constants.circular
            } else {
                KindHasher::TYPE_IDENTITY.hash(&child.type_identity())
            };
            return Resolution::Token(token);
        }
        if let Some(CacheEntry::Finished(token)) = self.composites.get(&id) {
            self.stats.cache_hits += 1;
            return Resolution::Token(*token);
        }
        Resolution::Descend(obj.clone())
    }

    fn open(&mut self, obj: &ObjectRef) -> Frame {
        let id = obj.identity();
        self.ancestors.insert(id);
        self.composites.insert(id, CacheEntry::Pending);
        Frame {
            id,
            members: obj.members().into_iter(),
            acc: KindHasher::COMPOSITE.salted(""),
            waiting_on: None,
        }
    }

    fn close(&mut self, frame: Frame) -> HashCode {
        let token = KindHasher::raw_hash(frame.acc.as_bytes());
        self.composites.insert(frame.id, CacheEntry::Finished(token));
        self.ancestors.pop();
        self.stats.composites += 1;
        token
    }
}
