//! Per-call comparison state.

use std::cell::RefCell;
use std::collections::HashSet;

use vcmp_hash::HashEngine;
use vcmp_types::{CompareOptions, Identity, Value};

use crate::comparison::{Comparison, ComparisonId};
use crate::flags::ComparisonFlags;
use crate::result::CompareResult;

/// Identities of a composite pair on the current comparison path.
pub(crate) type PairKey = (Option<Identity>, Option<Identity>);

/// Mutable state of one `compare` call: the comparison arena, the flat
/// classification lists and the composite pairs currently being visited.
pub(crate) struct Session {
    pub(crate) options: CompareOptions,
    comparisons: Vec<Comparison>,
    differences: Vec<ComparisonId>,
    in_common: Vec<ComparisonId>,
    path: HashSet<PairKey>,
}

impl Session {
    pub(crate) fn new(options: CompareOptions) -> Self {
        Self {
            options,
            comparisons: Vec::new(),
            differences: Vec::new(),
            in_common: Vec::new(),
            path: HashSet::new(),
        }
    }

    pub(crate) fn values_only(&self) -> bool {
        self.options.compare_values_only
    }

    /// Register a new comparison and return its id.
    pub(crate) fn allocate(
        &mut self,
        a: Value,
        b: Value,
        property_name: Option<String>,
        parent: Option<ComparisonId>,
    ) -> ComparisonId {
        let id = ComparisonId(self.comparisons.len());
        self.comparisons
            .push(Comparison::new(id, a, b, property_name, parent));
        id
    }

    pub(crate) fn get_mut(&mut self, id: ComparisonId) -> &mut Comparison {
        &mut self.comparisons[id.0]
    }

    /// Mark a composite pair as being visited. Returns `false` if the pair
    /// is already on the current path.
    pub(crate) fn enter(&mut self, key: PairKey) -> bool {
        self.path.insert(key)
    }

    pub(crate) fn leave(&mut self, key: &PairKey) {
        self.path.remove(key);
    }

    /// Attach a completed comparison to its parent and file it as a
    /// difference or as in common.
    ///
    /// Every child completes before its parent, so a parent's
    /// `HAS_DIFFERING_CHILDREN` flag is final by the time it is filed.
    pub(crate) fn finish(&mut self, id: ComparisonId) {
        let values_only = self.values_only();
        let (parent, effective) = {
            let c = &self.comparisons[id.0];
            (c.parent, c.effective_flags(values_only))
        };

        if let Some(parent) = parent {
            let p = &mut self.comparisons[parent.0];
            p.children.push(id);
            if !effective.is_empty() {
                p.differing_children.push(id);
                p.flags.insert(ComparisonFlags::HAS_DIFFERING_CHILDREN);
            }
        }

        if effective.is_empty() {
            self.in_common.push(id);
        } else {
            self.differences.push(id);
        }
    }

    pub(crate) fn into_result(self) -> CompareResult {
        let root = self.comparisons.first().map(|c| c.id);
        let hasher = RefCell::new(HashEngine::new(self.options.clone()));
        CompareResult {
            root,
            comparisons: self.comparisons,
            all_differences: self.differences,
            all_in_common: self.in_common,
            options: self.options,
            hasher,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_files_and_links_children() {
        let mut session = Session::new(CompareOptions::default());
        let root = session.allocate(Value::Null, Value::Null, None, None);
        let same = session.allocate(Value::from(1), Value::from(1), Some("x".into()), Some(root));
        let diff = session.allocate(Value::from(1), Value::from(2), Some("y".into()), Some(root));
        session.get_mut(diff).flags = ComparisonFlags::VALUE_DIFFERS;

        session.finish(same);
        session.finish(diff);
        session.finish(root);

        let result = session.into_result();
        assert_eq!(result.root, Some(root));
        let r = &result.comparisons[0];
        assert_eq!(r.children, vec![same, diff]);
        assert_eq!(r.differing_children, vec![diff]);
        assert!(r.flags.contains(ComparisonFlags::HAS_DIFFERING_CHILDREN));
        assert_eq!(result.all_in_common, vec![same]);
        assert_eq!(result.all_differences, vec![diff, root]);
    }

    #[test]
    fn reference_only_child_is_in_common_in_values_mode() {
        let mut session = Session::new(CompareOptions::values_only());
        let root = session.allocate(Value::Null, Value::Null, None, None);
        let child = session.allocate(Value::Null, Value::Null, Some("k".into()), Some(root));
        session.get_mut(child).flags = ComparisonFlags::REFERENCE;
        session.finish(child);
        session.finish(root);

        let result = session.into_result();
        assert!(result.comparisons[0].differing_children.is_empty());
        assert!(result.all_differences.is_empty());
        assert_eq!(result.all_in_common.len(), 2);
    }

    #[test]
    fn path_guard_rejects_reentry() {
        let mut session = Session::new(CompareOptions::default());
        let key = (None, None);
        assert!(session.enter(key));
        assert!(!session.enter(key));
        session.leave(&key);
        assert!(session.enter(key));
    }
}
