//! The dynamic value graph compared and hashed by vcmp.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::composite::{FunctionRef, Identity, ObjectRef};
use crate::error::TypeError;
use crate::symbol::Symbol;

/// Run-time kind of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Absent,
    Null,
    Boolean,
    Number,
    BigInt,
    String,
    Function,
    Symbol,
    Object,
}

impl ValueKind {
    /// Kind name, also used as the type-identity text of primitives.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::BigInt => "bigint",
            Self::String => "string",
            Self::Function => "function",
            Self::Symbol => "symbol",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically typed value.
///
/// Primitives are held inline; functions and composites are shared handles
/// with an allocation identity, so a graph may contain cycles.
#[derive(Clone, Default)]
pub enum Value {
    /// No value at all (a missing member).
    #[default]
    Absent,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(Rc<str>),
    Function(FunctionRef),
    Symbol(Symbol),
    Object(ObjectRef),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Self::String(Rc::from(s))
    }

    /// A composite of type `type_name` with the given members.
    pub fn object<K, I>(type_name: &str, members: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Object(ObjectRef::with_members(type_name, members))
    }

    /// An array: a composite keyed `"0"`, `"1"`, ...
    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Self::object(
            ObjectRef::ARRAY,
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v)),
        )
    }

    pub fn function(name: &str, source: &str) -> Self {
        Self::Function(FunctionRef::new(name, source))
    }

    /// A fresh, unique symbol.
    pub fn symbol(description: Option<&str>) -> Self {
        Self::Symbol(Symbol::new(description))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Absent => ValueKind::Absent,
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Boolean,
            Self::Number(_) => ValueKind::Number,
            Self::BigInt(_) => ValueKind::BigInt,
            Self::String(_) => ValueKind::String,
            Self::Function(_) => ValueKind::Function,
            Self::Symbol(_) => ValueKind::Symbol,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// `true` for `Null` and `Absent`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Absent)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(&**s),
            _ => None,
        }
    }

    /// Allocation identity for composites and functions.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Self::Object(obj) => Some(obj.identity()),
            Self::Function(func) => Some(func.identity()),
            _ => None,
        }
    }

    /// Type-identity text: the constructor name for composites, the kind
    /// name for everything else.
    pub fn type_identity(&self) -> Rc<str> {
        match self {
            Self::Object(obj) => obj.type_name(),
            other => Rc::from(other.kind().name()),
        }
    }

    /// Strict equality.
    ///
    /// Primitives compare by value (numbers numerically, with `NaN` equal to
    /// itself and `0 == -0`); functions, symbols and composites compare by
    /// identity.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Absent, Self::Absent) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Convert a JSON document into a fresh value graph.
    ///
    /// Objects become `"Object"` composites, arrays become `"Array"`
    /// composites, and every number becomes an `f64`.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::string(s),
            serde_json::Value::Array(items) => Self::array(items.iter().map(Self::from_json)),
            serde_json::Value::Object(map) => Self::object(
                ObjectRef::OBJECT,
                map.iter().map(|(k, v)| (k.clone(), Self::from_json(v))),
            ),
        }
    }

    /// Parse JSON text into a value graph.
    pub fn from_json_str(text: &str) -> Result<Self, TypeError> {
        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|e| TypeError::Json(e.to_string()))?;
        Ok(Self::from_json(&json))
    }
}

/// Textual form of a number as used for display and hashing.
///
/// Integral values print without a fraction and `-0` prints as `0`.
pub fn number_text(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "Absent"),
            Self::Null => write!(f, "Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Number(n) => write!(f, "Number({})", number_text(*n)),
            Self::BigInt(n) => write!(f, "BigInt({n})"),
            Self::String(s) => write!(f, "String({s:?})"),
            Self::Function(func) => write!(f, "Function({})", func.name()),
            Self::Symbol(sym) => write!(f, "{sym:?}"),
            Self::Object(obj) => write!(f, "{obj:?}"),
        }
    }
}

/// Short single-line rendering, used by reports.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "<absent>"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", number_text(*n)),
            Self::BigInt(n) => write!(f, "{n}n"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Function(func) => write!(f, "function {}()", func.name()),
            Self::Symbol(sym) => write!(f, "{sym}"),
            Self::Object(obj) if obj.is_array() => write!(f, "[{} items]", obj.len()),
            Self::Object(obj) => write!(f, "{} {{{} keys}}", obj.type_name(), obj.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Self::BigInt(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn kinds_match_variants() {
        assert_eq!(Value::Absent.kind(), ValueKind::Absent);
        assert_eq!(Value::from(1).kind(), ValueKind::Number);
        assert_eq!(Value::from(1i128).kind(), ValueKind::BigInt);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
        assert_eq!(Value::symbol(None).kind(), ValueKind::Symbol);
        assert_eq!(Value::array(Vec::<Value>::new()).kind(), ValueKind::Object);
        assert_eq!(ValueKind::Boolean.to_string(), "boolean");
    }

    #[test]
    fn strict_eq_on_primitives() {
        assert!(Value::from(1).strict_eq(&Value::from(1.0)));
        assert!(Value::from(0.0).strict_eq(&Value::from(-0.0)));
        assert!(Value::from(f64::NAN).strict_eq(&Value::from(f64::NAN)));
        assert!(!Value::from(1).strict_eq(&Value::from(1i128)));
        assert!(!Value::from("1").strict_eq(&Value::from(1)));
        assert!(!Value::Null.strict_eq(&Value::Absent));
    }

    #[test]
    fn strict_eq_on_references_is_identity() {
        let a = Value::object(ObjectRef::OBJECT, [("x", Value::from(1))]);
        let b = Value::object(ObjectRef::OBJECT, [("x", Value::from(1))]);
        assert!(a.strict_eq(&a.clone()));
        assert!(!a.strict_eq(&b));

        let s = Value::symbol(Some("s"));
        assert!(s.strict_eq(&s.clone()));
        assert!(!s.strict_eq(&Value::symbol(Some("s"))));
    }

    #[test]
    fn from_json_builds_composites() {
        let value = Value::from_json(&json!({"name": "vcmp", "tags": ["a", "b"], "n": null}));
        let obj = value.as_object().unwrap();
        assert_eq!(&*obj.type_name(), "Object");
        assert_eq!(obj.len(), 3);

        let tags = obj.get("tags").unwrap();
        let tags = tags.as_object().unwrap();
        assert!(tags.is_array());
        assert_eq!(tags.get("1").unwrap().as_str(), Some("b"));
        assert!(matches!(obj.get("n"), Some(Value::Null)));
    }

    #[test]
    fn from_json_str_reports_parse_errors() {
        assert!(matches!(Value::from_json_str("{"), Err(TypeError::Json(_))));
        assert!(Value::from_json_str("[1, 2]").unwrap().as_object().is_some());
    }

    #[test]
    fn display_is_single_line() {
        assert_eq!(Value::from(3).to_string(), "3");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(-0.0).to_string(), "0");
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::array([Value::Null]).to_string(), "[1 items]");
        assert_eq!(Value::Absent.to_string(), "<absent>");
    }

    #[test]
    fn type_identity_uses_constructor_name() {
        let date = Value::object("Date", [("t", Value::from(0))]);
        assert_eq!(&*date.type_identity(), "Date");
        assert_eq!(&*Value::from(true).type_identity(), "boolean");
    }

    proptest! {
        #[test]
        fn number_text_agrees_with_strict_eq(a in -1000i32..1000, b in -1000i32..1000) {
            let (x, y) = (f64::from(a) / 4.0, f64::from(b) / 4.0);
            let same_text = number_text(x) == number_text(y);
            prop_assert_eq!(same_text, Value::from(x).strict_eq(&Value::from(y)));
        }
    }
}
