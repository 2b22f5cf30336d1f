//! Nodes of the difference tree.

use std::cell::OnceCell;
use std::fmt;

use serde::{Deserialize, Serialize};

use vcmp_types::{HashCode, Value};

use crate::flags::ComparisonFlags;
use crate::string_diff::StringDifference;

/// Index of a [`Comparison`] in its result's arena.
///
/// Ids are handed out in traversal order, starting at 0 for the root.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComparisonId(pub(crate) usize);

impl ComparisonId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for ComparisonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ComparisonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of difference a comparison describes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffKind {
    #[default]
    None,
    Primitive,
    String,
    Composite,
}

/// Which side of a comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("a"),
            Self::B => f.write_str("b"),
        }
    }
}

/// One node of the difference tree: a value from each side and how they
/// differ.
#[derive(Debug)]
pub struct Comparison {
    pub id: ComparisonId,
    pub a: Value,
    pub b: Value,
    /// Key under which the values occur in their parents; `None` at the root.
    pub property_name: Option<String>,
    pub parent: Option<ComparisonId>,
    pub children: Vec<ComparisonId>,
    /// Children whose effective flags are non-empty.
    pub differing_children: Vec<ComparisonId>,
    /// Aligned spans, for string leaves compared with string diffing on.
    pub string_diffs: Vec<StringDifference>,
    pub diff_kind: DiffKind,
    pub flags: ComparisonFlags,
    pub(crate) hash_a: OnceCell<HashCode>,
    pub(crate) hash_b: OnceCell<HashCode>,
}

impl Comparison {
    pub(crate) fn new(
        id: ComparisonId,
        a: Value,
        b: Value,
        property_name: Option<String>,
        parent: Option<ComparisonId>,
    ) -> Self {
        Self {
            id,
            a,
            b,
            property_name,
            parent,
            children: Vec::new(),
            differing_children: Vec::new(),
            string_diffs: Vec::new(),
            diff_kind: DiffKind::None,
            flags: ComparisonFlags::NONE,
            hash_a: OnceCell::new(),
            hash_b: OnceCell::new(),
        }
    }

    pub fn value(&self, side: Side) -> &Value {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    pub(crate) fn hash_cell(&self, side: Side) -> &OnceCell<HashCode> {
        match side {
            Side::A => &self.hash_a,
            Side::B => &self.hash_b,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn effective_flags(&self, values_only: bool) -> ComparisonFlags {
        self.flags.effective(values_only)
    }

    /// Whether this comparison is filed as a difference.
    pub fn is_difference(&self, values_only: bool) -> bool {
        !self.effective_flags(values_only).is_empty()
    }

    /// Spans of the string diff that belong to one side only.
    pub fn differing_spans(&self) -> impl Iterator<Item = &StringDifference> {
        self.string_diffs.iter().filter(|span| !span.is_common())
    }
}
