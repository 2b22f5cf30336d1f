use std::fmt;

use serde::{Serialize, Serializer};

/// Value-equality token.
///
/// Two values that are deeply equal under the same options get the same
/// code. Equal codes only suggest equal values: once a graph has cycles,
/// back-references are replaced by placeholders and distinct graphs can
/// share a code. The all-zero code marks values that were hashed while
/// excluded.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashCode([u8; 32]);

impl HashCode {
    /// Wrap a digest produced by the hash engine.
    pub fn from_hash(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// Token for excluded values: opaque hosts, and functions while
    /// functions are excluded.
    pub const fn empty() -> Self {
        Self([0u8; 32])
    }

    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First four bytes in hex, for logs and `Debug`.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for HashCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashCode({})", self.short_hex())
    }
}

impl fmt::Display for HashCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Serialized as the full hex string, the same text `Display` prints.
impl Serialize for HashCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
