use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Predicate over `(value, property_name)`; returning `false` excludes the
/// value (and its subtree) from comparison and hashing.
#[derive(Clone)]
pub struct Filter(Arc<dyn Fn(&Value, Option<&str>) -> bool + Send + Sync>);

impl Filter {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value, Option<&str>) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// A filter that drops members with any of the given names.
    pub fn skip_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Self::new(move |_, name| name.map_or(true, |n| !names.iter().any(|skip| skip == n)))
    }

    pub fn accepts(&self, value: &Value, property_name: Option<&str>) -> bool {
        (self.0)(value, property_name)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}

/// The exclusion predicates in force for one operation.
#[derive(Clone, Debug, Default)]
pub enum ExclusionFilters {
    #[default]
    None,
    Single(Filter),
    /// Every predicate must approve.
    All(Vec<Filter>),
}

impl ExclusionFilters {
    /// Build from a list; an empty list means no filtering.
    pub fn from_list(mut filters: Vec<Filter>) -> Self {
        match filters.len() {
            0 => Self::None,
            1 => Self::Single(filters.remove(0)),
            _ => Self::All(filters),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn accepts(&self, value: &Value, property_name: Option<&str>) -> bool {
        match self {
            Self::None => true,
            Self::Single(filter) => filter.accepts(value, property_name),
            Self::All(filters) => filters.iter().all(|f| f.accepts(value, property_name)),
        }
    }

    /// Add one more predicate.
    pub fn push(&mut self, filter: Filter) {
        *self = match std::mem::take(self) {
            Self::None => Self::Single(filter),
            Self::Single(first) => Self::All(vec![first, filter]),
            Self::All(mut filters) => {
                filters.push(filter);
                Self::All(filters)
            }
        };
    }
}

/// Segmentation unit of the string differ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringCompareMode {
    #[default]
    Character,
    Word,
}

/// Configuration of the string differ.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringCompareOptions {
    pub mode: StringCompareMode,
    /// Characters that end a word and form a token of their own (word mode).
    pub word_breaks: String,
    /// Whether whitespace characters also act as word breaks (word mode).
    pub whitespace_word_breaks: bool,
}

impl Default for StringCompareOptions {
    fn default() -> Self {
        Self {
            mode: StringCompareMode::Character,
            word_breaks: ".,;:!?()[]{}<>\"'/\\-".to_string(),
            whitespace_word_breaks: true,
        }
    }
}

impl StringCompareOptions {
    /// Word-granularity options with the default break set.
    pub fn words() -> Self {
        Self {
            mode: StringCompareMode::Word,
            ..Default::default()
        }
    }

    pub fn is_word_break(&self, c: char) -> bool {
        (self.whitespace_word_breaks && c.is_whitespace()) || self.word_breaks.contains(c)
    }
}

/// Options for `compare`, `compare_strings` and `value_hash_code`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Drop function-typed values from traversal and hashing.
    pub exclude_functions: bool,
    /// Ignore reference-identity differences when classifying comparisons.
    pub compare_values_only: bool,
    #[serde(skip)]
    pub exclusion_filters: ExclusionFilters,
    /// Run the string differ on string leaves.
    pub diff_strings: bool,
    pub string_compare_options: StringCompareOptions,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            exclude_functions: true,
            compare_values_only: false,
            exclusion_filters: ExclusionFilters::None,
            diff_strings: false,
            string_compare_options: StringCompareOptions::default(),
        }
    }
}

impl CompareOptions {
    /// Defaults with `compare_values_only` switched on.
    pub fn values_only() -> Self {
        Self {
            compare_values_only: true,
            ..Default::default()
        }
    }

    pub fn with_diff_strings(mut self) -> Self {
        self.diff_strings = true;
        self
    }

    pub fn with_string_options(mut self, options: StringCompareOptions) -> Self {
        self.string_compare_options = options;
        self
    }

    pub fn include_functions(mut self) -> Self {
        self.exclude_functions = false;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.exclusion_filters.push(filter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = CompareOptions::default();
        assert!(options.exclude_functions);
        assert!(!options.compare_values_only);
        assert!(!options.diff_strings);
        assert!(options.exclusion_filters.is_none());
        assert_eq!(options.string_compare_options.mode, StringCompareMode::Character);
    }

    #[test]
    fn empty_filter_list_means_no_filter() {
        assert!(ExclusionFilters::from_list(Vec::new()).is_none());
        assert!(matches!(
            ExclusionFilters::from_list(vec![Filter::new(|_, _| true)]),
            ExclusionFilters::Single(_)
        ));
    }

    #[test]
    fn all_filters_must_approve() {
        let filters = ExclusionFilters::from_list(vec![
            Filter::skip_names(["password"]),
            Filter::new(|v, _| !matches!(v, Value::Null)),
        ]);
        assert!(filters.accepts(&Value::from(1), Some("user")));
        assert!(!filters.accepts(&Value::from(1), Some("password")));
        assert!(!filters.accepts(&Value::Null, Some("user")));
        assert!(filters.accepts(&Value::from(1), None));
    }

    #[test]
    fn push_grows_the_filter_set() {
        let options = CompareOptions::default()
            .with_filter(Filter::skip_names(["a"]))
            .with_filter(Filter::skip_names(["b"]));
        assert!(matches!(options.exclusion_filters, ExclusionFilters::All(ref f) if f.len() == 2));
        assert!(!options.exclusion_filters.accepts(&Value::Null, Some("b")));
    }

    #[test]
    fn word_breaks_follow_configuration() {
        let mut options = StringCompareOptions::words();
        assert!(options.is_word_break(' '));
        assert!(options.is_word_break(','));
        assert!(!options.is_word_break('x'));
        options.whitespace_word_breaks = false;
        assert!(!options.is_word_break(' '));
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let options: CompareOptions = serde_json::from_str(
            r#"{"compare_values_only": true, "string_compare_options": {"mode": "word"}}"#,
        )
        .unwrap();
        assert!(options.compare_values_only);
        assert!(options.exclude_functions);
        assert_eq!(options.string_compare_options.mode, StringCompareMode::Word);
        assert!(options.string_compare_options.whitespace_word_breaks);
    }
}
