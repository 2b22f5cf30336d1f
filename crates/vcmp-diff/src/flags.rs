use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// Set of difference flags attached to a comparison.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ComparisonFlags(u8);

impl ComparisonFlags {
    pub const NONE: Self = Self(0);
    /// Both sides are composites with different identities, or one side is
    /// a composite and the other is missing.
    pub const REFERENCE: Self = Self(1 << 0);
    pub const VALUE_DIFFERS: Self = Self(1 << 1);
    pub const ONLY_IN_A: Self = Self(1 << 2);
    pub const ONLY_IN_B: Self = Self(1 << 3);
    pub const HAS_DIFFERING_CHILDREN: Self = Self(1 << 4);
    /// Constructors or run-time kinds differ.
    pub const TYPE_IDENTITY_DIFFERS: Self = Self(1 << 5);

    const NAMES: [(Self, &'static str); 6] = [
        (Self::REFERENCE, "Reference"),
        (Self::VALUE_DIFFERS, "ValueDiffers"),
        (Self::ONLY_IN_A, "OnlyInA"),
        (Self::ONLY_IN_B, "OnlyInB"),
        (Self::HAS_DIFFERING_CHILDREN, "HasDifferingChildren"),
        (Self::TYPE_IDENTITY_DIFFERS, "TypeIdentityDiffers"),
    ];

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every flag in `other` is set.
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(&self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// `self` with the flags in `other` cleared.
    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Flags as seen by classification: `REFERENCE` is dropped in
    /// values-only mode.
    pub fn effective(self, values_only: bool) -> Self {
        if values_only {
            self.without(Self::REFERENCE)
        } else {
            self
        }
    }

    /// The same flags with `ONLY_IN_A` and `ONLY_IN_B` exchanged.
    pub fn mirrored(self) -> Self {
        let mut out = self.without(Self::ONLY_IN_A | Self::ONLY_IN_B);
        if self.contains(Self::ONLY_IN_A) {
            out.insert(Self::ONLY_IN_B);
        }
        if self.contains(Self::ONLY_IN_B) {
            out.insert(Self::ONLY_IN_A);
        }
        out
    }

    /// Names of the set flags, in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for ComparisonFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ComparisonFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ComparisonFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for ComparisonFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComparisonFlags({self})")
    }
}

impl fmt::Display for ComparisonFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        f.write_str(&self.names().join("|"))
    }
}

impl Serialize for ComparisonFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}
