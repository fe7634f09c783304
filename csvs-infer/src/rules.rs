//! The ordered classification rule chain.
//!
//! Each rule looks at a [`ColumnProfile`] and either claims the column by
//! returning a [`Classification`] or passes. Rules are evaluated in chain order
//! and the first claim wins, so the priority between overlapping types (a 0/1
//! column is also numeric and often categorical) is the order of the chain:
//!
//! 1. [`EmptyRule`]
//! 2. [`BooleanRule`]
//! 3. [`CategoricalRule`]
//! 4. [`PositiveNumericRule`]
//! 5. [`NumericRule`]
//! 6. [`TemporalRule`]
//! 7. [`StringRule`]
//! 8. [`FallbackRule`]

use regex::Regex;
use tracing::trace;

use crate::classification::{CategoricalDomain, Classification, LetterCase, StringLength};
use crate::literals::LiteralPatterns;
use crate::predicates::{self, CategoricalParams};

/// Everything a rule may look at for one column.
#[derive(Debug, Clone)]
pub struct ColumnProfile<'a> {
    /// Column name
    pub name: &'a str,
    /// Non-missing values of the library-default view, in row order
    pub values: Vec<&'a str>,
    /// Library missing tokens occurring literally in the canonical view
    pub missing_alternatives: Vec<String>,
}

impl<'a> ColumnProfile<'a> {
    pub fn new(name: &'a str, values: Vec<&'a str>, missing_alternatives: Vec<String>) -> Self {
        Self {
            name,
            values,
            missing_alternatives,
        }
    }
}

/// A single step of the classification chain.
pub trait ClassificationRule: Send + Sync {
    /// Returns a classification when this rule claims the column.
    fn classify(&self, profile: &ColumnProfile<'_>) -> Option<Classification>;

    /// Get a human-readable name for this rule
    fn name(&self) -> &str;

    /// Get a description of what this rule detects
    fn description(&self) -> &str;
}

/// Claims columns without any non-missing value.
pub struct EmptyRule;

impl ClassificationRule for EmptyRule {
    fn classify(&self, profile: &ColumnProfile<'_>) -> Option<Classification> {
        profile.values.is_empty().then_some(Classification::Empty)
    }

    fn name(&self) -> &str {
        "empty"
    }

    fn description(&self) -> &str {
        "Columns without non-missing values"
    }
}

/// Claims columns whose values are all 0 or 1.
pub struct BooleanRule;

impl ClassificationRule for BooleanRule {
    fn classify(&self, profile: &ColumnProfile<'_>) -> Option<Classification> {
        predicates::is_boolean(&profile.values).then_some(Classification::Boolean)
    }

    fn name(&self) -> &str {
        "boolean"
    }

    fn description(&self) -> &str {
        "Columns holding only the integers 0 and 1"
    }
}

/// Claims columns with a small, heavily repeated set of values.
///
/// A categorical column whose values are neither numeric nor strings matching
/// the `String` literal is claimed as [`Classification::Any`].
pub struct CategoricalRule {
    params: CategoricalParams,
    string_literal: Regex,
}

impl CategoricalRule {
    pub fn new(params: CategoricalParams, string_literal: Regex) -> Self {
        Self {
            params,
            string_literal,
        }
    }
}

impl ClassificationRule for CategoricalRule {
    fn classify(&self, profile: &ColumnProfile<'_>) -> Option<Classification> {
        if !predicates::is_categorical(&profile.values, &self.params) {
            return None;
        }
        let distinct = predicates::distinct_values(&profile.values);
        trace!(column = profile.name, categories = distinct.len(), "Categorical column");

        let domain = if let [single] = distinct.as_slice() {
            CategoricalDomain::Single(single.to_string())
        } else if predicates::is_numeric(&profile.values) {
            CategoricalDomain::Numeric(distinct.iter().map(|v| v.to_string()).collect())
        } else if predicates::matches_regex(&profile.values, &self.string_literal) {
            let (ascii, non_ascii): (Vec<String>, Vec<String>) = distinct
                .iter()
                .map(|v| v.to_string())
                .partition(|v| v.is_ascii());
            CategoricalDomain::Text { ascii, non_ascii }
        } else {
            return Some(Classification::Any);
        };
        Some(Classification::Categorical(domain))
    }

    fn name(&self) -> &str {
        "categorical"
    }

    fn description(&self) -> &str {
        "Columns with few distinct values that repeat often"
    }
}

/// Claims non-negative numeric columns with a large enough sample.
pub struct PositiveNumericRule {
    min_n_limits: usize,
}

impl PositiveNumericRule {
    pub fn new(min_n_limits: usize) -> Self {
        Self { min_n_limits }
    }
}

impl ClassificationRule for PositiveNumericRule {
    fn classify(&self, profile: &ColumnProfile<'_>) -> Option<Classification> {
        if profile.values.len() < self.min_n_limits || !predicates::is_positive(&profile.values) {
            return None;
        }
        if predicates::is_positive_integer(&profile.values) {
            Some(Classification::PositiveInteger)
        } else {
            Some(Classification::PositiveRange)
        }
    }

    fn name(&self) -> &str {
        "positive_numeric"
    }

    fn description(&self) -> &str {
        "Numeric columns whose values are all >= 0"
    }
}

/// Claims any remaining numeric column.
pub struct NumericRule {
    use_regex: bool,
    integer_literal: String,
    numeric_literal: String,
}

impl NumericRule {
    /// With `use_regex`, columns render as the `Integer` or `Numeric` literal
    /// instead of an unbounded range.
    pub fn new(use_regex: bool, integer_literal: String, numeric_literal: String) -> Self {
        Self {
            use_regex,
            integer_literal,
            numeric_literal,
        }
    }
}

impl ClassificationRule for NumericRule {
    fn classify(&self, profile: &ColumnProfile<'_>) -> Option<Classification> {
        if !predicates::is_numeric(&profile.values) {
            return None;
        }
        if !self.use_regex {
            return Some(Classification::UnboundedRange);
        }
        let literal = if predicates::is_integer(&profile.values) {
            &self.integer_literal
        } else {
            &self.numeric_literal
        };
        Some(Classification::NumericRegex(literal.clone()))
    }

    fn name(&self) -> &str {
        "numeric"
    }

    fn description(&self) -> &str {
        "Columns whose values all parse as numbers"
    }
}

/// Claims columns matching one of the date/time literals, most specific first.
pub struct TemporalRule {
    literals: Vec<(Regex, Classification)>,
}

impl TemporalRule {
    pub fn new(patterns: &LiteralPatterns) -> Self {
        Self {
            literals: vec![
                (
                    patterns.date_time_with_time_zone.clone(),
                    Classification::DateTimeTz,
                ),
                (patterns.date_time.clone(), Classification::DateTime),
                (patterns.date.clone(), Classification::Date),
                (patterns.time.clone(), Classification::Time),
            ],
        }
    }
}

impl ClassificationRule for TemporalRule {
    fn classify(&self, profile: &ColumnProfile<'_>) -> Option<Classification> {
        self.literals
            .iter()
            .find(|(pattern, _)| predicates::matches_regex(&profile.values, pattern))
            .map(|(_, classification)| classification.clone())
    }

    fn name(&self) -> &str {
        "temporal"
    }

    fn description(&self) -> &str {
        "Columns of XSD date, time or date-time literals"
    }
}

/// Claims columns matching the generic `String` literal.
///
/// The letter case constraint also has to hold for every alternative missing
/// token, because those tokens end up as extra allowed values of the column.
pub struct StringRule {
    string_literal: Regex,
}

impl StringRule {
    pub fn new(string_literal: Regex) -> Self {
        Self { string_literal }
    }

    fn letter_case(profile: &ColumnProfile<'_>) -> Option<LetterCase> {
        if !profile.values.iter().all(|v| predicates::is_alphabetic(v)) {
            return None;
        }
        let all = |check: fn(&str) -> bool| {
            profile.values.iter().all(|v| check(v))
                && profile.missing_alternatives.iter().all(|v| check(v))
        };
        if all(predicates::is_uppercase) {
            Some(LetterCase::Upper)
        } else if all(predicates::is_lowercase) {
            Some(LetterCase::Lower)
        } else {
            None
        }
    }
}

impl ClassificationRule for StringRule {
    fn classify(&self, profile: &ColumnProfile<'_>) -> Option<Classification> {
        if !predicates::matches_regex(&profile.values, &self.string_literal) {
            return None;
        }
        let length = if profile.values.iter().all(|v| v.chars().count() == 1) {
            StringLength::Exact(1)
        } else {
            StringLength::AtLeastOne
        };
        Some(Classification::String {
            case: Self::letter_case(profile),
            length,
        })
    }

    fn name(&self) -> &str {
        "string"
    }

    fn description(&self) -> &str {
        "Columns of free text matching the String literal"
    }
}

/// Claims every column; terminates the chain.
pub struct FallbackRule;

impl ClassificationRule for FallbackRule {
    fn classify(&self, _profile: &ColumnProfile<'_>) -> Option<Classification> {
        Some(Classification::Any)
    }

    fn name(&self) -> &str {
        "fallback"
    }

    fn description(&self) -> &str {
        "Columns no other rule recognises"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile<'a>(values: &[&'a str]) -> ColumnProfile<'a> {
        ColumnProfile::new("col", values.to_vec(), vec![])
    }

    fn string_rule() -> StringRule {
        StringRule::new(LiteralPatterns::builtin().string.clone())
    }

    #[test]
    fn test_empty_rule() {
        assert_eq!(EmptyRule.classify(&profile(&[])), Some(Classification::Empty));
        assert_eq!(EmptyRule.classify(&profile(&["a"])), None);
    }

    #[test]
    fn test_boolean_rule() {
        assert_eq!(
            BooleanRule.classify(&profile(&["0", "1"])),
            Some(Classification::Boolean)
        );
        assert_eq!(BooleanRule.classify(&profile(&["0", "2"])), None);
    }

    #[test]
    fn test_categorical_rule_domains() {
        let rule = CategoricalRule::new(
            CategoricalParams::default(),
            LiteralPatterns::builtin().string.clone(),
        );

        let single = vec!["x"; 10];
        assert_eq!(
            rule.classify(&profile(&single)),
            Some(Classification::Categorical(CategoricalDomain::Single(
                "x".to_string()
            )))
        );

        let numeric: Vec<&str> = ["7", "3"].iter().copied().cycle().take(20).collect();
        assert_eq!(
            rule.classify(&profile(&numeric)),
            Some(Classification::Categorical(CategoricalDomain::Numeric(vec![
                "7".to_string(),
                "3".to_string()
            ])))
        );

        let text: Vec<&str> = ["Über", "ok"].iter().copied().cycle().take(20).collect();
        assert_eq!(
            rule.classify(&profile(&text)),
            Some(Classification::Categorical(CategoricalDomain::Text {
                ascii: vec!["ok".to_string()],
                non_ascii: vec!["Über".to_string()],
            }))
        );

        let unmatched: Vec<&str> = ["1a", "2b"].iter().copied().cycle().take(20).collect();
        assert_eq!(rule.classify(&profile(&unmatched)), Some(Classification::Any));
    }

    #[test]
    fn test_positive_numeric_rule_needs_sample() {
        let rule = PositiveNumericRule::new(3);
        assert_eq!(rule.classify(&profile(&["1", "2"])), None);
        assert_eq!(
            rule.classify(&profile(&["1", "2", "3"])),
            Some(Classification::PositiveInteger)
        );
        assert_eq!(
            rule.classify(&profile(&["1", "2", "3.5"])),
            Some(Classification::PositiveRange)
        );
        assert_eq!(rule.classify(&profile(&["1", "2", "-3"])), None);
    }

    #[test]
    fn test_numeric_rule_regex_rendering() {
        let literals = LiteralPatterns::builtin().literals();
        let range = NumericRule::new(false, literals.integer.clone(), literals.numeric.clone());
        let regex = NumericRule::new(true, literals.integer.clone(), literals.numeric.clone());

        assert_eq!(
            range.classify(&profile(&["-1", "2.5"])),
            Some(Classification::UnboundedRange)
        );
        assert_eq!(
            regex.classify(&profile(&["-1", "2"])),
            Some(Classification::NumericRegex(literals.integer.clone()))
        );
        assert_eq!(
            regex.classify(&profile(&["-1", "2.5"])),
            Some(Classification::NumericRegex(literals.numeric.clone()))
        );
        assert_eq!(regex.classify(&profile(&["x"])), None);
    }

    #[test]
    fn test_temporal_rule_order() {
        let rule = TemporalRule::new(LiteralPatterns::builtin());
        assert_eq!(
            rule.classify(&profile(&["2023-12-24T10:00:00Z"])),
            Some(Classification::DateTimeTz)
        );
        assert_eq!(
            rule.classify(&profile(&["2023-12-24T10:00:00"])),
            Some(Classification::DateTime)
        );
        assert_eq!(
            rule.classify(&profile(&["2023-12-24"])),
            Some(Classification::Date)
        );
        assert_eq!(rule.classify(&profile(&["10:00:00"])), Some(Classification::Time));
        assert_eq!(rule.classify(&profile(&["2023-12-24", "10:00:00"])), None);
    }

    #[test]
    fn test_string_rule_case_and_length() {
        let rule = string_rule();
        assert_eq!(
            rule.classify(&profile(&["A", "B"])),
            Some(Classification::String {
                case: Some(LetterCase::Upper),
                length: StringLength::Exact(1),
            })
        );
        assert_eq!(
            rule.classify(&profile(&["abc", "de"])),
            Some(Classification::String {
                case: Some(LetterCase::Lower),
                length: StringLength::AtLeastOne,
            })
        );
        assert_eq!(
            rule.classify(&profile(&["Abc", "de"])),
            Some(Classification::String {
                case: None,
                length: StringLength::AtLeastOne,
            })
        );
        assert_eq!(
            rule.classify(&profile(&["ab c"])),
            Some(Classification::String {
                case: None,
                length: StringLength::AtLeastOne,
            })
        );
    }

    #[test]
    fn test_string_case_includes_missing_alternatives() {
        let rule = string_rule();
        let upper = ColumnProfile::new("col", vec!["ABC", "DE"], vec!["NA".to_string()]);
        assert_eq!(
            rule.classify(&upper),
            Some(Classification::String {
                case: Some(LetterCase::Upper),
                length: StringLength::AtLeastOne,
            })
        );

        let mixed = ColumnProfile::new("col", vec!["ABC", "DE"], vec!["null".to_string()]);
        assert_eq!(
            rule.classify(&mixed),
            Some(Classification::String {
                case: None,
                length: StringLength::AtLeastOne,
            })
        );
    }

    #[test]
    fn test_fallback_rule() {
        assert_eq!(
            FallbackRule.classify(&profile(&["a", "1"])),
            Some(Classification::Any)
        );
    }
}
