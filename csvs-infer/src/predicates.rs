//! Type predicates over the non-missing values of one column.
//!
//! Every predicate receives the column with missing cells already dropped and
//! answers a yes/no question about all of its values. Predicates are total: a
//! value that does not parse as the probed type makes the answer "no", never an
//! error. Like any "every value" test, a predicate over zero values holds.
//!
//! The categorical check is a heuristic: a column is likely categorical when it
//! has few distinct values and repeats them often relative to its size. The
//! required duplication grows with the sample size:
//!
//! ```text
//! t = clamp(1 - 1.5^log2(n) / n, threshold_min, threshold_max)
//! categorical  <=>  distinct <= n_max_categories  &&  (n - distinct) / n > t
//! ```

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Parameters of the categorical heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoricalParams {
    /// Maximum number of distinct values (default: 25)
    pub n_max_categories: usize,
    /// Lower bound of the adaptive duplication threshold (default: 0.8)
    pub threshold_min: f64,
    /// Upper bound of the adaptive duplication threshold (default: 0.97)
    pub threshold_max: f64,
    /// Reject columns holding fractional numbers (default: false)
    pub forbid_float_categories: bool,
}

impl Default for CategoricalParams {
    fn default() -> Self {
        Self {
            n_max_categories: 25,
            threshold_min: 0.8,
            threshold_max: 0.97,
            forbid_float_categories: false,
        }
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Integer text: optional sign followed by ASCII digits, surrounding whitespace allowed.
fn is_integer_text(value: &str) -> bool {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix(&['+', '-'][..]).unwrap_or(trimmed);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// True iff every value parses as a real number.
pub fn is_numeric(values: &[&str]) -> bool {
    values.iter().all(|v| parse_number(v).is_some())
}

/// True iff every value is a whole number written as integer text.
pub fn is_integer(values: &[&str]) -> bool {
    is_numeric(values) && values.iter().all(|v| is_integer_text(v))
}

/// True iff every value is a number greater than or equal to zero.
pub fn is_positive(values: &[&str]) -> bool {
    values
        .iter()
        .all(|v| parse_number(v).is_some_and(|n| n >= 0.0))
}

/// True iff every value is canonical unsigned integer text.
///
/// `"+5"`, `"-0"` and `" 5"` parse as non-negative integers but are rejected.
pub fn is_positive_integer(values: &[&str]) -> bool {
    is_integer(values)
        && values
            .iter()
            .all(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
}

/// True iff the column is numeric; without `allow_integers`, at least one value
/// must also carry a fractional part.
pub fn is_float(values: &[&str], allow_integers: bool) -> bool {
    if !is_numeric(values) {
        return false;
    }
    allow_integers
        || values
            .iter()
            .filter_map(|v| parse_number(v))
            .any(|n| !n.is_finite() || n.fract() != 0.0)
}

/// True iff every value casts to the integer 0 or 1.
pub fn is_boolean(values: &[&str]) -> bool {
    values
        .iter()
        .all(|v| matches!(v.trim().parse::<i64>(), Ok(0) | Ok(1)))
}

/// True iff every value fully matches the anchored pattern.
pub fn matches_regex(values: &[&str], pattern: &Regex) -> bool {
    values.iter().all(|v| pattern.is_match(v))
}

/// Distinct values in first-seen order.
pub fn distinct_values<'a>(values: &[&'a str]) -> Vec<&'a str> {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().copied().filter(|v| seen.insert(*v)).collect()
}

/// The adaptive duplication threshold for a sample of `n` values.
pub fn categorical_threshold(n: usize, params: &CategoricalParams) -> f64 {
    let n = n as f64;
    let raw = 1.0 - 1.5_f64.powf(n.log2()) / n;
    raw.max(params.threshold_min).min(params.threshold_max)
}

/// Heuristic check whether a column is categorical.
pub fn is_categorical(values: &[&str], params: &CategoricalParams) -> bool {
    let n = values.len();
    if n == 0 {
        return false;
    }
    if params.forbid_float_categories && is_float(values, false) {
        return false;
    }
    let unique = distinct_values(values).len();
    if unique > params.n_max_categories {
        return false;
    }
    let duplication_ratio = (n - unique) as f64 / n as f64;
    duplication_ratio > categorical_threshold(n, params)
}

/// True iff the text has at least one character and only alphabetic ones.
pub fn is_alphabetic(value: &str) -> bool {
    !value.is_empty() && value.chars().all(char::is_alphabetic)
}

/// True iff the text has a cased character and no lowercase ones.
pub fn is_uppercase(value: &str) -> bool {
    let mut cased = false;
    for c in value.chars() {
        if c.is_lowercase() {
            return false;
        }
        cased |= c.is_uppercase();
    }
    cased
}

/// True iff the text has a cased character and no uppercase ones.
pub fn is_lowercase(value: &str) -> bool {
    let mut cased = false;
    for c in value.chars() {
        if c.is_uppercase() {
            return false;
        }
        cased |= c.is_lowercase();
    }
    cased
}
