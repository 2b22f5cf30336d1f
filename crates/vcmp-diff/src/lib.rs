//! Structural comparison for vcmp.
//!
//! Compares two value graphs into a tree of [`Comparison`] records, with
//! flat lists of every comparison, every difference and every pair found in
//! common. String leaves can be aligned span by span, and any included
//! value can be reduced to a value-equality [`HashCode`](vcmp_types::HashCode).
//!
//! # Key Types
//!
//! - [`CompareResult`] / [`Comparison`] / [`ComparisonFlags`] -- the difference tree
//! - [`StringCompareResult`] / [`StringDifference`] -- aligned string spans
//! - [`ValueMatch`] -- hits from the value and reference match queries

pub mod comparator;
pub mod comparison;
pub mod error;
pub mod flags;
pub mod result;
mod session;
pub mod string_diff;

pub use comparator::{compare, compare_json, compare_strings, value_hash_code};
pub use comparison::{Comparison, ComparisonId, DiffKind, Side};
pub use error::{DiffError, DiffResult};
pub use flags::ComparisonFlags;
pub use result::{CompareResult, ValueMatch};
pub use string_diff::{diff_strings, SpanOwner, StringCompareResult, StringDifference};
