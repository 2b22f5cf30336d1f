//! Value-equality hashing for vcmp.
//!
//! Provides kind-salted BLAKE3 hashing of primitives, identity-memoized
//! content hashing of composites with ancestor-stack cycle detection, and
//! the process-wide symbol token table.
//!
//! Hash codes are meant for grouping equal values, not for cryptographic
//! use. Once a graph contains cycles, equal codes no longer guarantee
//! equal values.

pub mod engine;
pub mod hasher;
pub mod symbols;

pub use engine::{HashEngine, HashStats, STRING_CACHE_LIMIT};
pub use hasher::KindHasher;
pub use symbols::SymbolTable;
