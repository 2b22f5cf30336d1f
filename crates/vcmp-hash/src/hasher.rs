use vcmp_types::HashCode;

/// Kind-salted BLAKE3 hasher.
///
/// Each hasher carries a salt (e.g. `"vcmp-number-v1"`) appended to the
/// textual form of a value before hashing. Values of different kinds with
/// the same text (the number `1`, the string `"1"`) therefore never share a
/// hash code.
pub struct KindHasher {
    salt: &'static str,
}

impl KindHasher {
    pub const ABSENT: Self = Self::new("vcmp-absent-v1");
    pub const NULL: Self = Self::new("vcmp-null-v1");
    pub const BOOLEAN: Self = Self::new("vcmp-boolean-v1");
    pub const NUMBER: Self = Self::new("vcmp-number-v1");
    pub const BIGINT: Self = Self::new("vcmp-bigint-v1");
    pub const STRING: Self = Self::new("vcmp-string-v1");
    pub const FUNCTION: Self = Self::new("vcmp-function-v1");
    pub const SYMBOL: Self = Self::new("vcmp-symbol-v1");
    /// Seed of a composite's accumulator.
    pub const COMPOSITE: Self = Self::new("vcmp-composite-v1");
    /// Salt of each `prop:<name>:<token>` entry in a composite accumulator.
    pub const PROPERTY: Self = Self::new("vcmp-property-v1");
    /// Placeholder for a back-reference in values-only mode.
    pub const CIRCULAR: Self = Self::new("vcmp-circular-v1");
    /// Placeholder for a back-reference, derived from its type identity.
    pub const TYPE_IDENTITY: Self = Self::new("vcmp-type-v1");

    /// Create a hasher with a custom salt.
    pub const fn new(salt: &'static str) -> Self {
        Self { salt }
    }

    /// `text` with this hasher's salt appended.
    pub fn salted(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.salt.len() + 1);
        out.push_str(text);
        out.push(':');
        out.push_str(self.salt);
        out
    }

    /// Hash the salted form of `text`.
    pub fn hash(&self, text: &str) -> HashCode {
        Self::raw_hash(self.salted(text).as_bytes())
    }

    /// Unsalted BLAKE3 hash, the primitive every token is built from.
    pub fn raw_hash(data: &[u8]) -> HashCode {
        HashCode::from_hash(*blake3::hash(data).as_bytes())
    }

    pub fn salt(&self) -> &str {
        self.salt
    }
}
