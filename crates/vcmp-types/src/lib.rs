//! Foundation types for vcmp.
//!
//! This crate provides the dynamic value graph that the comparison and
//! hashing engines operate on, together with the options and inclusion rules
//! they share. Every other vcmp crate depends on `vcmp-types`.
//!
//! # Key Types
//!
//! - [`Value`] / [`ValueKind`] -- Dynamically typed value and its run-time kind
//! - [`ObjectRef`] -- Shared, identity-bearing composite with ordered own members
//! - [`Identity`] -- Allocation identity used for cycle detection and reference matching
//! - [`Symbol`] -- Unique value with no stable textual form
//! - [`HashCode`] -- Value-equality token (BLAKE3 digest)
//! - [`CompareOptions`] / [`ExclusionFilters`] -- Per-operation configuration

pub mod classify;
pub mod composite;
pub mod error;
pub mod hash_code;
pub mod options;
pub mod symbol;
pub mod value;

pub use classify::{is_included, is_pair_included};
pub use composite::{FunctionRef, Identity, Object, ObjectRef};
pub use error::TypeError;
pub use hash_code::HashCode;
pub use options::{
    CompareOptions, ExclusionFilters, Filter, StringCompareMode, StringCompareOptions,
};
pub use symbol::{Symbol, SymbolId};
pub use value::{number_text, Value, ValueKind};
