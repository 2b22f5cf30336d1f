//! The output of `compare`: an arena of comparisons with flat indices.

use std::cell::RefCell;

use vcmp_hash::HashEngine;
use vcmp_types::{CompareOptions, HashCode, Value};

use crate::comparison::{Comparison, ComparisonId, Side};

/// A comparison side found by one of the match queries.
#[derive(Clone, Debug)]
pub struct ValueMatch {
    pub comparison: ComparisonId,
    /// Which side of the comparison matched.
    pub side: Side,
    pub value: Value,
    /// Dotted path from the root; `None` for the root itself.
    pub path: Option<String>,
}

/// Difference tree and flat indices produced by one `compare` call.
///
/// `comparisons` holds every comparison in allocation order, so a
/// [`ComparisonId`] indexes it directly. Every comparison appears in exactly
/// one of `all_differences` and `all_in_common`.
pub struct CompareResult {
    pub root: Option<ComparisonId>,
    pub comparisons: Vec<Comparison>,
    pub all_differences: Vec<ComparisonId>,
    pub all_in_common: Vec<ComparisonId>,
    pub options: CompareOptions,
    pub(crate) hasher: RefCell<HashEngine>,
}

impl CompareResult {
    pub fn get(&self, id: ComparisonId) -> Option<&Comparison> {
        self.comparisons.get(id.0)
    }

    pub fn root(&self) -> Option<&Comparison> {
        self.root.and_then(|id| self.get(id))
    }

    /// Children of a comparison, in key order.
    pub fn children(&self, id: ComparisonId) -> impl Iterator<Item = &Comparison> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|c| c.children.iter())
            .filter_map(|child| self.get(*child))
    }

    /// Total number of comparisons.
    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// `true` when nothing was filed as a difference.
    pub fn is_identical(&self) -> bool {
        self.all_differences.is_empty()
    }

    pub fn differences(&self) -> impl Iterator<Item = &Comparison> + '_ {
        self.all_differences.iter().filter_map(|id| self.get(*id))
    }

    pub fn in_common(&self) -> impl Iterator<Item = &Comparison> + '_ {
        self.all_in_common.iter().filter_map(|id| self.get(*id))
    }

    /// Dotted path of property names from the root down to `id`.
    ///
    /// Returns `None` for the root (and for unknown ids). Paths are built
    /// from the tree, so the same value reached through a cycle or through
    /// repeated shapes may show up under several paths.
    pub fn path(&self, id: ComparisonId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent {
            if let Some(name) = &current.property_name {
                names.push(name.as_str());
            }
            current = self.get(parent)?;
        }
        if names.is_empty() {
            return None;
        }
        names.reverse();
        Some(names.join("."))
    }

    /// Value-equality hash of one side of a comparison, computed on first
    /// use and cached on the comparison.
    ///
    /// When both sides are strictly equal the other side's cached hash is
    /// reused, and computing one side fills in both.
    ///
    /// All queries share one memoizing engine. On cyclic graphs a composite
    /// first reached while one of its ancestors was being hashed keeps the
    /// token computed with that ancestor as a placeholder, so its hash
    /// depends on query order and can differ from [`value_hash_code`] on
    /// the same subgraph. Acyclic graphs are unaffected.
    ///
    /// [`value_hash_code`]: crate::value_hash_code
    pub fn value_hash(&self, id: ComparisonId, side: Side) -> Option<HashCode> {
        let c = self.get(id)?;
        if let Some(hash) = c.hash_cell(side).get() {
            return Some(*hash);
        }

        let same = c.a.strict_eq(&c.b);
        let hash = match c.hash_cell(side.other()).get() {
            Some(other) if same => *other,
            _ => self.hasher.borrow_mut().hash(c.value(side)),
        };
        let _ = c.hash_cell(side).set(hash);
        if same {
            let _ = c.hash_cell(side.other()).set(hash);
        }
        Some(hash)
    }

    /// Every comparison side whose value hash equals `hash`.
    ///
    /// Missing sides are hashed like any other value, so querying the token
    /// of [`Value::Absent`] finds every key present on one side only.
    pub fn get_all_value_matches(&self, hash: &HashCode) -> Vec<ValueMatch> {
        self.scan(|c, side| self.value_hash(c.id, side).as_ref() == Some(hash))
    }

    /// Every comparison side holding the very same composite or function
    /// as `value`, at any depth. Primitives have no identity and match
    /// nothing.
    pub fn get_all_reference_matches(&self, value: &Value) -> Vec<ValueMatch> {
        let Some(identity) = value.identity() else {
            return Vec::new();
        };
        self.scan(|c, side| c.value(side).identity() == Some(identity))
    }

    fn scan<F>(&self, mut matches: F) -> Vec<ValueMatch>
    where
        F: FnMut(&Comparison, Side) -> bool,
    {
        let mut out = Vec::new();
        for c in &self.comparisons {
            for side in [Side::A, Side::B] {
                if matches(c, side) {
                    out.push(ValueMatch {
                        comparison: c.id,
                        side,
                        value: c.value(side).clone(),
                        path: self.path(c.id),
                    });
                }
            }
        }
        out
    }
}

impl std::fmt::Debug for CompareResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompareResult")
            .field("root", &self.root)
            .field("comparisons", &self.comparisons.len())
            .field("differences", &self.all_differences)
            .field("in_common", &self.all_in_common)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcmp_types::ObjectRef;

    use crate::comparator::{compare, value_hash_code};

    fn obj(members: Vec<(&str, Value)>) -> Value {
        Value::object(ObjectRef::OBJECT, members)
    }

    #[test]
    fn paths_join_property_names() {
        let a = obj(vec![("outer", obj(vec![("inner", Value::from(1))]))]);
        let result = compare(&a, &a, CompareOptions::default());
        let root = result.root.unwrap();
        assert_eq!(result.path(root), None);

        let paths: Vec<_> = (0..result.len())
            .filter_map(|i| result.path(ComparisonId(i)))
            .collect();
        assert_eq!(paths, vec!["outer", "outer.inner"]);
    }

    #[test]
    fn value_hash_matches_the_standalone_hash() {
        let inner = obj(vec![("k", Value::from("v"))]);
        let a = obj(vec![("x", inner.clone())]);
        let b = obj(vec![("x", obj(vec![("k", Value::from("v"))]))]);
        let result = compare(&a, &b, CompareOptions::default());

        let x = ComparisonId(1);
        let ha = result.value_hash(x, Side::A).unwrap();
        let hb = result.value_hash(x, Side::B).unwrap();
        assert_eq!(ha, hb);
        assert_eq!(Some(ha), value_hash_code(&inner, CompareOptions::default()));
        assert_eq!(result.get(x).unwrap().hash_cell(Side::A).get(), Some(&ha));
    }

    #[test]
    fn cyclic_hash_depends_on_query_order() {
        let root = ObjectRef::new(ObjectRef::OBJECT);
        let child = ObjectRef::new(ObjectRef::OBJECT);
        child.insert("back", Value::Object(root.clone()));
        root.insert("child", Value::Object(child.clone()));
        let (root, child) = (Value::Object(root), Value::Object(child));
        let standalone = value_hash_code(&child, CompareOptions::default());

        let child_first = compare(&root, &root, CompareOptions::default());
        let id = ComparisonId(1);
        assert_eq!(child_first.get(id).unwrap().property_name.as_deref(), Some("child"));
        assert_eq!(child_first.value_hash(id, Side::A), standalone);

        let root_first = compare(&root, &root, CompareOptions::default());
        root_first.value_hash(ComparisonId(0), Side::A);
        let seen_from_root = root_first.value_hash(id, Side::A);
        assert_ne!(seen_from_root, standalone);
        assert_eq!(root_first.value_hash(id, Side::A), seen_from_root);

        root.as_object().unwrap().remove("child");
    }

    #[test]
    fn identical_sides_share_one_hash() {
        let shared = obj(vec![("k", Value::from(1))]);
        let a = obj(vec![("s", shared.clone())]);
        let b = obj(vec![("s", shared)]);
        let result = compare(&a, &b, CompareOptions::default());

        let s = ComparisonId(1);
        let ha = result.value_hash(s, Side::A).unwrap();
        let c = result.get(s).unwrap();
        assert_eq!(c.hash_cell(Side::B).get(), Some(&ha));
    }

    #[test]
    fn value_matches_find_equal_subtrees() {
        let a = obj(vec![
            ("p", obj(vec![("k", Value::from(1))])),
            ("q", Value::from(2)),
        ]);
        let b = obj(vec![
            ("p", Value::from(3)),
            ("r", obj(vec![("k", Value::from(1))])),
        ]);
        let result = compare(&a, &b, CompareOptions::default());
        let target = value_hash_code(&obj(vec![("k", Value::from(1))]), CompareOptions::default())
            .unwrap();

        let found = result.get_all_value_matches(&target);
        let located: Vec<_> = found
            .iter()
            .map(|m| (m.path.clone().unwrap(), m.side))
            .collect();
        assert_eq!(
            located,
            vec![("p".to_string(), Side::A), ("r".to_string(), Side::B)]
        );
    }

    #[test]
    fn absent_token_finds_one_sided_keys() {
        let a = obj(vec![("kept", Value::from(1)), ("dropped", Value::from(2))]);
        let b = obj(vec![("kept", Value::from(1)), ("added", Value::Null)]);
        let result = compare(&a, &b, CompareOptions::default());
        let absent = value_hash_code(&Value::Absent, CompareOptions::default()).unwrap();

        let located: Vec<_> = result
            .get_all_value_matches(&absent)
            .into_iter()
            .map(|m| (m.path.unwrap(), m.side))
            .collect();
        assert_eq!(
            located,
            vec![
                ("dropped".to_string(), Side::B),
                ("added".to_string(), Side::A),
            ]
        );
    }

    #[test]
    fn reference_matches_find_every_depth() {
        let shared = obj(vec![("k", Value::from(1))]);
        let a = obj(vec![
            ("top", shared.clone()),
            ("deep", obj(vec![("again", shared.clone())])),
        ]);
        let b = obj(vec![("top", shared.clone())]);
        let result = compare(&a, &b, CompareOptions::default());

        let found = result.get_all_reference_matches(&shared);
        let located: Vec<_> = found
            .iter()
            .map(|m| (m.path.clone().unwrap(), m.side))
            .collect();
        assert_eq!(
            located,
            vec![
                ("top".to_string(), Side::A),
                ("top".to_string(), Side::B),
                ("deep.again".to_string(), Side::A),
            ]
        );
        assert!(result.get_all_reference_matches(&Value::from(1)).is_empty());
    }

    #[test]
    fn differences_and_in_common_partition_the_arena() {
        let a = obj(vec![("x", Value::from(1)), ("y", Value::from(2))]);
        let b = obj(vec![("x", Value::from(1)), ("y", Value::from(3))]);
        let result = compare(&a, &b, CompareOptions::values_only());
        assert_eq!(
            result.differences().count() + result.in_common().count(),
            result.len()
        );
        let differing: Vec<_> = result
            .differences()
            .filter_map(|c| c.property_name.clone())
            .collect();
        assert_eq!(differing, vec!["y"]);
        assert!(!result.is_identical());
    }
}
