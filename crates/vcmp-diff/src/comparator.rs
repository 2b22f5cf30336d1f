//! Structural comparison of two value graphs.
//!
//! The walk uses an explicit work stack, so deep inputs do not grow the
//! native call stack. Each composite pair on the current path is recorded;
//! meeting the same pair again below itself produces a leaf comparison
//! instead of descending, which is what makes cyclic graphs terminate.

use tracing::{debug, trace};

use vcmp_hash::HashEngine;
use vcmp_types::{is_pair_included, CompareOptions, HashCode, ObjectRef, Value, ValueKind};

use crate::comparison::{Comparison, ComparisonId, DiffKind};
use crate::error::{DiffError, DiffResult};
use crate::flags::ComparisonFlags;
use crate::result::CompareResult;
use crate::session::{PairKey, Session};
use crate::string_diff::{diff_strings, StringCompareResult, StringDifference};

enum Task {
    Visit {
        a: Value,
        b: Value,
        property_name: Option<String>,
        parent: Option<ComparisonId>,
        /// `ONLY_IN_A`, `ONLY_IN_B` or nothing, from the parent's key union.
        ownership: ComparisonFlags,
    },
    Finish {
        id: ComparisonId,
        key: PairKey,
    },
}

/// Compare two values and build the difference tree.
///
/// Always succeeds. If the inclusion rules reject the root pair the result
/// has no root and every list is empty.
pub fn compare(a: &Value, b: &Value, options: CompareOptions) -> CompareResult {
    let mut session = Session::new(options);
    let mut stack = vec![Task::Visit {
        a: a.clone(),
        b: b.clone(),
        property_name: None,
        parent: None,
        ownership: ComparisonFlags::NONE,
    }];

    while let Some(task) = stack.pop() {
        match task {
            Task::Visit {
                a,
                b,
                property_name,
                parent,
                ownership,
            } => visit(&mut session, &mut stack, a, b, property_name, parent, ownership),
            Task::Finish { id, key } => {
                session.leave(&key);
                session.finish(id);
            }
        }
    }

    let result = session.into_result();
    debug!(
        comparisons = result.len(),
        differences = result.all_differences.len(),
        in_common = result.all_in_common.len(),
        "compare complete"
    );
    result
}

fn visit(
    session: &mut Session,
    stack: &mut Vec<Task>,
    a: Value,
    b: Value,
    property_name: Option<String>,
    parent: Option<ComparisonId>,
    ownership: ComparisonFlags,
) {
    if !is_pair_included(&a, &b, property_name.as_deref(), &session.options) {
        return;
    }

    let pair = match (&a, &b) {
        (Value::Object(x), Value::Object(y)) => Some((Some(x.clone()), Some(y.clone()))),
        (Value::Object(x), other) if other.is_nullish() => Some((Some(x.clone()), None)),
        (other, Value::Object(y)) if other.is_nullish() => Some((None, Some(y.clone()))),
        _ => None,
    };

    let string_diffs = match (pair.is_none(), a.as_str(), b.as_str()) {
        (true, Some(x), Some(y)) if session.options.diff_strings => {
            Some(diff_strings(x, y, &session.options.string_compare_options))
        }
        _ => None,
    };

    let id = session.allocate(a, b, property_name, parent);
    let c = session.get_mut(id);
    c.flags = ownership;

    let Some((left, right)) = pair else {
        compare_leaf(c, string_diffs);
        session.finish(id);
        return;
    };

    c.diff_kind = DiffKind::Composite;
    match (&left, &right) {
        (Some(x), Some(y)) => {
            if !x.ptr_eq(y) {
                c.flags.insert(ComparisonFlags::REFERENCE);
            }
            if c.a.type_identity() != c.b.type_identity() {
                c.flags.insert(ComparisonFlags::TYPE_IDENTITY_DIFFERS);
            }
        }
        (Some(_), None) => c.flags |= ComparisonFlags::ONLY_IN_A | ComparisonFlags::REFERENCE,
        (None, Some(_)) => c.flags |= ComparisonFlags::ONLY_IN_B | ComparisonFlags::REFERENCE,
        (None, None) => {}
    }

    let key = (
        left.as_ref().map(ObjectRef::identity),
        right.as_ref().map(ObjectRef::identity),
    );
    if !session.enter(key) {
        trace!(id = %id, "composite pair already on path; not descending");
        session.finish(id);
        return;
    }

    stack.push(Task::Finish { id, key });
    let children = member_union(left.as_ref(), right.as_ref());
    for (name, a, b, ownership) in children.into_iter().rev() {
        stack.push(Task::Visit {
            a,
            b,
            property_name: Some(name),
            parent: Some(id),
            ownership,
        });
    }
}

/// Flags for a pair where at least one side is not a composite.
fn compare_leaf(c: &mut Comparison, string_diffs: Option<Vec<StringDifference>>) {
    c.diff_kind = DiffKind::Primitive;
    if !c.a.strict_eq(&c.b) {
        c.flags.insert(ComparisonFlags::VALUE_DIFFERS);
    }
    if c.a.kind() != c.b.kind() {
        c.flags.insert(ComparisonFlags::TYPE_IDENTITY_DIFFERS);
    }
    if let Some(spans) = string_diffs {
        c.string_diffs = spans;
        c.diff_kind = DiffKind::String;
    }
}

/// Union of both sides' own members: `a`'s keys in order, then keys only
/// in `b`. Each entry carries its ownership flag.
fn member_union(
    a: Option<&ObjectRef>,
    b: Option<&ObjectRef>,
) -> Vec<(String, Value, Value, ComparisonFlags)> {
    let mut out = Vec::new();
    if let Some(a) = a {
        for (name, va) in a.members() {
            let (vb, ownership) = match b.and_then(|b| b.get(&name)) {
                Some(vb) => (vb, ComparisonFlags::NONE),
                None => (Value::Absent, ComparisonFlags::ONLY_IN_A),
            };
            out.push((name, va, vb, ownership));
        }
    }
    if let Some(b) = b {
        for (name, vb) in b.members() {
            if a.is_some_and(|a| a.contains_key(&name)) {
                continue;
            }
            out.push((name, Value::Absent, vb, ComparisonFlags::ONLY_IN_B));
        }
    }
    out
}

/// Align two string values.
///
/// Fails with [`DiffError::InvalidArgument`] unless both values are strings.
/// String diffing is switched on regardless of `options`.
pub fn compare_strings(
    a: &Value,
    b: &Value,
    options: CompareOptions,
) -> DiffResult<StringCompareResult> {
    let text_a = expect_string("a", a)?;
    let text_b = expect_string("b", b)?;
    let mut options = options;
    options.diff_strings = true;

    let string_diffs = diff_strings(text_a, text_b, &options.string_compare_options);
    debug!(spans = string_diffs.len(), "string compare complete");
    Ok(StringCompareResult {
        a: text_a.to_string(),
        b: text_b.to_string(),
        options,
        string_diffs,
    })
}

fn expect_string<'v>(argument: &'static str, value: &'v Value) -> DiffResult<&'v str> {
    value.as_str().ok_or(DiffError::InvalidArgument {
        argument,
        expected: ValueKind::String,
        actual: value.kind(),
    })
}

/// Value-equality hash of `value`, or `None` if the inclusion rules
/// reject it.
pub fn value_hash_code(value: &Value, options: CompareOptions) -> Option<HashCode> {
    let mut engine = HashEngine::new(options);
    let hash = engine.hash_included(value);
    let stats = engine.stats();
    debug!(
        composites = stats.composites,
        cache_hits = stats.cache_hits,
        cycles = stats.cycles,
        "value hash complete"
    );
    hash
}

/// Parse two JSON documents and compare them.
pub fn compare_json(a: &str, b: &str, options: CompareOptions) -> DiffResult<CompareResult> {
    let a = Value::from_json_str(a)?;
    let b = Value::from_json_str(b)?;
    Ok(compare(&a, &b, options))
}
