//! Column classifications and their rendering into schema expressions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder that stands in for a non-ASCII character inside a regex clause.
pub const NON_ASCII_PLACEHOLDER: char = '.';

/// Regex escape for a double quote, which string literals cannot contain.
pub const QUOTE_ESCAPE: &str = r"\x22";

/// Whether a value can be written inside a double-quoted string literal as is.
fn is_quotable(value: &str) -> bool {
    value.is_ascii() && !value.contains('"')
}

/// The letter case every value of a string column shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterCase {
    Upper,
    Lower,
}

/// The length constraint of a string column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringLength {
    /// Every value has exactly this many characters.
    Exact(usize),
    /// Every value has at least one character.
    AtLeastOne,
}

/// The value domain of a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoricalDomain {
    /// One distinct value.
    Single(String),
    /// Several distinct numeric values, in first-seen order.
    Numeric(Vec<String>),
    /// Several distinct string values, split by whether they are pure ASCII.
    Text {
        ascii: Vec<String>,
        non_ascii: Vec<String>,
    },
}

/// The outcome of classifying one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// The column has no non-missing value.
    Empty,
    Boolean,
    Categorical(CategoricalDomain),
    PositiveInteger,
    PositiveRange,
    UnboundedRange,
    /// A numeric column constrained by the given raw regex literal.
    NumericRegex(String),
    DateTimeTz,
    DateTime,
    Date,
    Time,
    String {
        case: Option<LetterCase>,
        length: StringLength,
    },
    /// Nothing is known about the values.
    Any,
}

impl Classification {
    /// Short name used in logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Classification::Empty => "Empty",
            Classification::Boolean => "Boolean",
            Classification::Categorical(_) => "Categorical",
            Classification::PositiveInteger => "PositiveInteger",
            Classification::PositiveRange => "PositiveRange",
            Classification::UnboundedRange => "UnboundedRange",
            Classification::NumericRegex(_) => "NumericRegex",
            Classification::DateTimeTz => "DateTimeTz",
            Classification::DateTime => "DateTime",
            Classification::Date => "Date",
            Classification::Time => "Time",
            Classification::String {
                length: StringLength::Exact(_),
                ..
            } => "StringBounded",
            Classification::String { .. } => "StringUnbounded",
            Classification::Any => "Any",
        }
    }

    /// Whether rendering stops after the expression, without missing-value clauses.
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Classification::Any)
    }

    /// The constraint expression, without any missing-value clause.
    pub fn expression(&self) -> String {
        match self {
            Classification::Empty => "empty".to_string(),
            Classification::Boolean => r#"is("0") or is("1")"#.to_string(),
            Classification::Categorical(domain) => categorical_expression(domain),
            Classification::PositiveInteger => "positiveInteger".to_string(),
            Classification::PositiveRange => "range(0, *)".to_string(),
            Classification::UnboundedRange => "range(*, *)".to_string(),
            Classification::NumericRegex(pattern) => format!(r#"regex("{pattern}")"#),
            Classification::DateTimeTz => "xDateTimeTz".to_string(),
            Classification::DateTime => "xDateTime".to_string(),
            Classification::Date => "xDate".to_string(),
            Classification::Time => "xTime".to_string(),
            Classification::String { case, length } => {
                let prefix = match case {
                    Some(LetterCase::Upper) => "upperCase ",
                    Some(LetterCase::Lower) => "lowerCase ",
                    None => "",
                };
                let length = match length {
                    StringLength::Exact(n) => format!("length({n})"),
                    StringLength::AtLeastOne => "length(1, *)".to_string(),
                };
                format!("{prefix}{length}")
            }
            Classification::Any => "any".to_string(),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression())
    }
}

fn any_of(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("\"{v}\"")).collect();
    format!("any({})", quoted.join(","))
}

fn categorical_expression(domain: &CategoricalDomain) -> String {
    match domain {
        CategoricalDomain::Single(value) if is_quotable(value) => format!(r#"is("{value}")"#),
        CategoricalDomain::Single(value) => format!(r#"regex("{}")"#, literal_regex(value)),
        CategoricalDomain::Numeric(values) => any_of(values),
        CategoricalDomain::Text { ascii, non_ascii } => {
            let (quotable, quoted): (Vec<&String>, Vec<&String>) =
                ascii.iter().partition(|v| is_quotable(v));
            let mut clauses = Vec::with_capacity(1 + quoted.len() + non_ascii.len());
            if !quotable.is_empty() {
                let quotable: Vec<String> = quotable.into_iter().cloned().collect();
                clauses.push(any_of(&quotable));
            }
            clauses.extend(
                quoted
                    .into_iter()
                    .chain(non_ascii)
                    .map(|v| format!(r#"regex("{}")"#, literal_regex(v))),
            );
            clauses.join(" or ")
        }
    }
}

/// A regex matching `value` literally, with every non-ASCII character replaced
/// by the wildcard placeholder and double quotes written as `\x22`.
pub fn literal_regex(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len());
    let mut buf = [0u8; 4];
    for c in value.chars() {
        if c == '"' {
            pattern.push_str(QUOTE_ESCAPE);
        } else if c.is_ascii() {
            pattern.push_str(&regex::escape(c.encode_utf8(&mut buf)));
        } else {
            pattern.push(NON_ASCII_PLACEHOLDER);
        }
    }
    pattern
}

/// Renders a classification together with the missing-value reconciliation.
///
/// Every alternative missing token becomes an `or is("...")` clause and a
/// canonical empty cell adds `or empty`. Unconstrained columns render as bare
/// `any`.
pub fn render(
    classification: &Classification,
    missing_alternatives: &[String],
    has_canonical_empty: bool,
) -> String {
    let mut expression = classification.expression();
    if classification.is_unconstrained() {
        return expression;
    }
    for token in missing_alternatives {
        expression.push_str(&format!(r#" or is("{token}")"#));
    }
    if has_canonical_empty && *classification != Classification::Empty {
        expression.push_str(" or empty");
    }
    expression
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_simple_expressions() {
        assert_eq!(Classification::Boolean.expression(), r#"is("0") or is("1")"#);
        assert_eq!(Classification::PositiveInteger.expression(), "positiveInteger");
        assert_eq!(Classification::PositiveRange.expression(), "range(0, *)");
        assert_eq!(Classification::UnboundedRange.expression(), "range(*, *)");
        assert_eq!(
            Classification::NumericRegex("-?[0-9]+".to_string()).expression(),
            r#"regex("-?[0-9]+")"#
        );
        assert_eq!(Classification::DateTimeTz.to_string(), "xDateTimeTz");
        assert_eq!(Classification::Time.to_string(), "xTime");
    }

    #[test]
    fn test_string_expressions() {
        let upper_char = Classification::String {
            case: Some(LetterCase::Upper),
            length: StringLength::Exact(1),
        };
        assert_eq!(upper_char.expression(), "upperCase length(1)");
        assert_eq!(upper_char.type_name(), "StringBounded");

        let free_text = Classification::String {
            case: None,
            length: StringLength::AtLeastOne,
        };
        assert_eq!(free_text.expression(), "length(1, *)");
        assert_eq!(free_text.type_name(), "StringUnbounded");
    }

    #[test]
    fn test_single_category() {
        let single = Classification::Categorical(CategoricalDomain::Single("x".to_string()));
        assert_eq!(single.expression(), r#"is("x")"#);

        let umlaut = Classification::Categorical(CategoricalDomain::Single("Käse".to_string()));
        assert_eq!(umlaut.expression(), r#"regex("K.se")"#);
    }

    #[test]
    fn test_numeric_categories() {
        let domain = CategoricalDomain::Numeric(strings(&["3", "1", "2"]));
        assert_eq!(
            Classification::Categorical(domain).expression(),
            r#"any("3","1","2")"#
        );
    }

    #[test]
    fn test_text_categories() {
        let mixed = CategoricalDomain::Text {
            ascii: strings(&["red", "blue"]),
            non_ascii: strings(&["grün", "weiß"]),
        };
        assert_eq!(
            Classification::Categorical(mixed).expression(),
            r#"any("red","blue") or regex("gr.n") or regex("wei.")"#
        );

        let only_non_ascii = CategoricalDomain::Text {
            ascii: vec![],
            non_ascii: strings(&["grün", "weiß"]),
        };
        assert_eq!(
            Classification::Categorical(only_non_ascii).expression(),
            r#"regex("gr.n") or regex("wei.")"#
        );
    }

    #[test]
    fn test_values_with_double_quotes_use_regex() {
        let single = CategoricalDomain::Single(r#"say "hi""#.to_string());
        assert_eq!(
            Classification::Categorical(single).expression(),
            r#"regex("say \x22hi\x22")"#
        );

        let mixed = CategoricalDomain::Text {
            ascii: strings(&["plain", r#"5" nail"#]),
            non_ascii: strings(&["grün"]),
        };
        assert_eq!(
            Classification::Categorical(mixed).expression(),
            r#"any("plain") or regex("5\x22 nail") or regex("gr.n")"#
        );
    }

    #[test]
    fn test_literal_regex_escapes_ascii() {
        assert_eq!(literal_regex("a.b(ü)"), r"a\.b\(.\)");
        assert_eq!(literal_regex("日本"), "..");
    }

    #[test]
    fn test_render_reconciliation() {
        let line = render(&Classification::UnboundedRange, &strings(&["NA"]), false);
        assert_eq!(line, r#"range(*, *) or is("NA")"#);

        let line = render(&Classification::Boolean, &strings(&["NA", "null"]), true);
        assert_eq!(line, r#"is("0") or is("1") or is("NA") or is("null") or empty"#);
    }

    #[test]
    fn test_render_any_short_circuits() {
        assert_eq!(render(&Classification::Any, &strings(&["NA"]), true), "any");
    }

    #[test]
    fn test_render_empty_column() {
        assert_eq!(render(&Classification::Empty, &[], false), "empty");
        assert_eq!(
            render(&Classification::Empty, &strings(&["NA"]), true),
            r#"empty or is("NA")"#
        );
    }
}
