//! Identity-bearing values: composites and functions.
//!
//! Both are shared handles; cloning a handle never copies the underlying
//! data, and two handles have the same [`Identity`] iff they point at the
//! same allocation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::Value;

/// Allocation identity of a composite or function.
///
/// Only meaningful while the value it was taken from is alive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({:#x})", self.0)
    }
}

/// The data behind an [`ObjectRef`].
#[derive(Clone, Debug)]
pub struct Object {
    /// Type identity (constructor name), e.g. `"Object"` or `"Array"`.
    pub type_name: Rc<str>,
    /// Own named members in insertion order.
    pub members: IndexMap<String, Value>,
    /// Host objects that are never compared or hashed.
    pub opaque: bool,
}

/// Shared, mutable handle to a composite value.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    /// Type name used for plain objects.
    pub const OBJECT: &'static str = "Object";
    /// Type name used for arrays.
    pub const ARRAY: &'static str = "Array";

    /// Create an empty composite of the given type.
    pub fn new(type_name: &str) -> Self {
        Self(Rc::new(RefCell::new(Object {
            type_name: Rc::from(type_name),
            members: IndexMap::new(),
            opaque: false,
        })))
    }

    /// Create a composite from `(key, value)` pairs, keeping their order.
    pub fn with_members<K, I>(type_name: &str, members: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let obj = Self::new(type_name);
        obj.0.borrow_mut().members = members.into_iter().map(|(k, v)| (k.into(), v)).collect();
        obj
    }

    /// Create an opaque host object (excluded from comparison and hashing).
    pub fn opaque(type_name: &str) -> Self {
        let obj = Self::new(type_name);
        obj.0.borrow_mut().opaque = true;
        obj
    }

    /// Allocation identity.
    pub fn identity(&self) -> Identity {
        Identity(Rc::as_ptr(&self.0) as *const () as usize)
    }

    /// Returns `true` if both handles point at the same composite.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn type_name(&self) -> Rc<str> {
        Rc::clone(&self.0.borrow().type_name)
    }

    pub fn is_opaque(&self) -> bool {
        self.0.borrow().opaque
    }

    pub fn is_array(&self) -> bool {
        &*self.0.borrow().type_name == Self::ARRAY
    }

    /// Look up an own member.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().members.get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().members.contains_key(key)
    }

    /// Insert or replace a member, returning the previous value.
    ///
    /// Replacing keeps the member's original position.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.borrow_mut().members.insert(key.into(), value)
    }

    /// Remove a member, preserving the order of the rest.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().members.shift_remove(key)
    }

    /// Snapshot of the own named members in stable order.
    pub fn members(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .members
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().members.is_empty()
    }
}

impl fmt::Debug for ObjectRef {
    // Members are not printed: a composite may contain itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let obj = self.0.borrow();
        write!(
            f,
            "{}{{{} members}}@{:?}",
            obj.type_name,
            obj.members.len(),
            self.identity()
        )
    }
}

impl Drop for Object {
    // Members whose last handle dies here are unlinked onto a heap stack,
    // so long chains are freed without recursing.
    fn drop(&mut self) {
        let mut pending: Vec<Value> = self.members.drain(..).map(|(_, v)| v).collect();
        while let Some(value) = pending.pop() {
            let Value::Object(ObjectRef(rc)) = value else {
                continue;
            };
            if let Ok(cell) = Rc::try_unwrap(rc) {
                let mut inner = cell.into_inner();
                pending.extend(inner.members.drain(..).map(|(_, v)| v));
            }
        }
    }
}

#[derive(Debug)]
struct Function {
    name: String,
    source: String,
}

/// Shared handle to a function-like value.
///
/// Functions compare by identity; their source text is what gets hashed.
#[derive(Clone, Debug)]
pub struct FunctionRef(Rc<Function>);

impl FunctionRef {
    pub fn new(name: &str, source: &str) -> Self {
        Self(Rc::new(Function {
            name: name.to_string(),
            source: source.to_string(),
        }))
    }

    pub fn identity(&self) -> Identity {
        Identity(Rc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &FunctionRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn source(&self) -> &str {
        &self.0.source
    }
}
