//! Named regex literals used to recognise numbers, dates, times and strings.
//!
//! Literals are plain configuration: a mapping from a literal name to a regex
//! pattern, plus the canonical missing-value token. They are loaded once per
//! run and compiled into [`LiteralPatterns`], whose regexes are anchored so a
//! value only matches when the whole value matches.
//!
//! ```rust
//! use csvs_infer::literals::Literals;
//!
//! let literals = Literals::from_yaml_str("XsdDateLiteral: '[0-9]{2}\\.[0-9]{2}\\.[0-9]{4}'").unwrap();
//! let patterns = literals.compile().unwrap();
//! assert!(patterns.date.is_match("24.12.2023"));
//! assert!(!patterns.date.is_match("2023-12-24"));
//! ```

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{InferError, Result};

const DATE_COMPONENT: &str = r"-?[0-9]{4}-(((0(1|3|5|7|8)|1(0|2))-(0[1-9]|(1|2)[0-9]|3[0-1]))|((0(4|6|9)|11)-(0[1-9]|(1|2)[0-9]|30))|(02-(0[1-9]|(1|2)[0-9])))";
const TIME_COMPONENT: &str = r"([0-1][0-9]|2[0-4]):(0[0-9]|[1-5][0-9]):(0[0-9]|[1-5][0-9])(\.[0-9]{3})?";
const TIMEZONE_COMPONENT: &str = r"((\+|-)([0-1][0-9]|2[0-4]):(0[0-9]|[1-5][0-9])|Z)";

static DEFAULT_PATTERNS: Lazy<LiteralPatterns> = Lazy::new(|| {
    Literals::default()
        .compile()
        .expect("built-in literals are valid regular expressions")
});

/// The literal configuration, keyed the way the YAML resource file is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Literals {
    #[serde(rename = "Integer")]
    pub integer: String,
    #[serde(rename = "Numeric")]
    pub numeric: String,
    #[serde(rename = "String")]
    pub string: String,
    #[serde(rename = "XsdDateTimeWithTimeZoneLiteral")]
    pub date_time_with_time_zone: String,
    #[serde(rename = "XsdDateTimeLiteral")]
    pub date_time: String,
    #[serde(rename = "XsdDateLiteral")]
    pub date: String,
    #[serde(rename = "XsdTimeLiteral")]
    pub time: String,
    /// The only token the schema standard treats as missing.
    #[serde(rename = "MissingValue")]
    pub missing_value: String,
}

impl Default for Literals {
    fn default() -> Self {
        Self {
            integer: r"-?[0-9]+".to_string(),
            numeric: r"-?[0-9]+(\.[0-9]+)?".to_string(),
            string: r#"[^"0-9][^"]*"#.to_string(),
            date_time_with_time_zone: format!(
                "{DATE_COMPONENT}T{TIME_COMPONENT}{TIMEZONE_COMPONENT}"
            ),
            date_time: format!("{DATE_COMPONENT}T{TIME_COMPONENT}"),
            date: format!("{DATE_COMPONENT}{TIMEZONE_COMPONENT}?"),
            time: format!("{TIME_COMPONENT}{TIMEZONE_COMPONENT}?"),
            missing_value: String::new(),
        }
    }
}

impl Literals {
    /// Parses literals from YAML text. Keys that are absent keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads literals from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Compiles every pattern into an anchored regex.
    pub fn compile(&self) -> Result<LiteralPatterns> {
        Ok(LiteralPatterns {
            integer: anchored("Integer", &self.integer)?,
            numeric: anchored("Numeric", &self.numeric)?,
            string: anchored("String", &self.string)?,
            date_time_with_time_zone: anchored(
                "XsdDateTimeWithTimeZoneLiteral",
                &self.date_time_with_time_zone,
            )?,
            date_time: anchored("XsdDateTimeLiteral", &self.date_time)?,
            date: anchored("XsdDateLiteral", &self.date)?,
            time: anchored("XsdTimeLiteral", &self.time)?,
            literals: self.clone(),
        })
    }
}

fn anchored(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|e| InferError::invalid_literal(name, e))
}

/// Compiled, anchored literal regexes.
#[derive(Debug, Clone)]
pub struct LiteralPatterns {
    pub integer: Regex,
    pub numeric: Regex,
    pub string: Regex,
    pub date_time_with_time_zone: Regex,
    pub date_time: Regex,
    pub date: Regex,
    pub time: Regex,
    literals: Literals,
}

impl LiteralPatterns {
    /// The built-in patterns, compiled once per process.
    pub fn builtin() -> &'static LiteralPatterns {
        &DEFAULT_PATTERNS
    }

    /// The raw configuration these patterns were compiled from.
    ///
    /// Schema text quotes the raw patterns, never the anchored ones.
    pub fn literals(&self) -> &Literals {
        &self.literals
    }
}

impl Default for LiteralPatterns {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
