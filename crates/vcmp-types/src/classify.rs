//! Inclusion rules shared by the comparator and the hash engine.

use crate::options::CompareOptions;
use crate::value::Value;

/// Whether `value`, found under `property_name`, takes part in comparison
/// and hashing.
///
/// Opaque host objects are always excluded, functions are excluded when
/// `exclude_functions` is set, and everything else is subject to the
/// exclusion filters.
pub fn is_included(value: &Value, property_name: Option<&str>, options: &CompareOptions) -> bool {
    match value {
        Value::Object(obj) if obj.is_opaque() => false,
        Value::Function(_) if options.exclude_functions => false,
        _ => options.exclusion_filters.accepts(value, property_name),
    }
}

/// Whether a pair of values found under the same key is compared at all.
///
/// Rejecting either side drops the pair from both.
pub fn is_pair_included(
    a: &Value,
    b: &Value,
    property_name: Option<&str>,
    options: &CompareOptions,
) -> bool {
    is_included(a, property_name, options) && is_included(b, property_name, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::ObjectRef;
    use crate::options::Filter;

    #[test]
    fn functions_follow_the_option() {
        let f = Value::function("f", "() => 1");
        assert!(!is_included(&f, None, &CompareOptions::default()));
        assert!(is_included(&f, None, &CompareOptions::default().include_functions()));
    }

    #[test]
    fn opaque_objects_are_never_included() {
        let node = Value::Object(ObjectRef::opaque("HTMLDivElement"));
        let options = CompareOptions::default().include_functions();
        assert!(!is_included(&node, Some("el"), &options));
    }

    #[test]
    fn filters_see_the_property_name() {
        let options = CompareOptions::default().with_filter(Filter::skip_names(["secret"]));
        assert!(!is_included(&Value::from(1), Some("secret"), &options));
        assert!(is_included(&Value::from(1), Some("public"), &options));
    }

    #[test]
    fn pair_rejected_when_either_side_rejected() {
        let options = CompareOptions::default();
        let f = Value::function("f", "() => 1");
        assert!(!is_pair_included(&f, &Value::from(1), None, &options));
        assert!(!is_pair_included(&Value::from(1), &f, None, &options));
        assert!(is_pair_included(&Value::from(1), &Value::Absent, None, &options));
    }
}
