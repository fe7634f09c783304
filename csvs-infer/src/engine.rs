//! Schema generation: per-column classification and document assembly.
//!
//! # Example
//!
//! ```rust
//! use csvs_infer::engine::SchemaEngine;
//! use csvs_infer::table::Table;
//!
//! let csv = "id,flag,code\n1,0,NA\n2,1,b\n3,1,\n";
//! let table = Table::from_reader(csv.as_bytes(), b',', "").unwrap();
//!
//! let engine = SchemaEngine::builder().min_n_limits(1).build();
//! let document = engine.generate(&table);
//!
//! assert_eq!(
//!     document.to_string(),
//!     "version 1.2\n\
//!      @totalColumns 3\n\
//!      @separator ','\n\
//!      \"id\": positiveInteger\n\
//!      \"flag\": is(\"0\") or is(\"1\")\n\
//!      \"code\": length(1) or is(\"NA\") or empty"
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::classification::{render, Classification};
use crate::error::{InferError, Result};
use crate::literals::LiteralPatterns;
use crate::logging::{truncate_field, DEFAULT_MAX_FIELD_LENGTH};
use crate::predicates::CategoricalParams;
use crate::rules::{
    BooleanRule, CategoricalRule, ClassificationRule, ColumnProfile, EmptyRule, FallbackRule,
    NumericRule, PositiveNumericRule, StringRule, TemporalRule,
};
use crate::table::{Column, MissingTokenSet, Table};

/// Version tag of the schema standard written in the header.
pub const SCHEMA_VERSION: &str = "version 1.2";

/// Tunable parameters of schema generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Render generic numeric columns as regex literals instead of ranges (default: false)
    pub use_regex_for_nums: bool,
    /// Minimum number of non-missing values before a column may be constrained to >= 0 (default: 100)
    pub min_n_limits: usize,
    /// Parameters of the categorical heuristic
    pub categorical: CategoricalParams,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            use_regex_for_nums: false,
            min_n_limits: 100,
            categorical: CategoricalParams::default(),
        }
    }
}

impl InferenceConfig {
    /// Checks that the categorical thresholds describe a valid interval in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let CategoricalParams {
            threshold_min,
            threshold_max,
            ..
        } = self.categorical;
        if !(0.0..=1.0).contains(&threshold_min) || !(0.0..=1.0).contains(&threshold_max) {
            return Err(InferError::configuration(format!(
                "categorical thresholds must lie in [0, 1], got {threshold_min} and {threshold_max}"
            )));
        }
        if threshold_min > threshold_max {
            return Err(InferError::configuration(format!(
                "threshold_min {threshold_min} exceeds threshold_max {threshold_max}"
            )));
        }
        Ok(())
    }
}

/// Builder for [`SchemaEngine`]
pub struct SchemaEngineBuilder {
    config: InferenceConfig,
    patterns: LiteralPatterns,
}

impl SchemaEngineBuilder {
    /// Set the whole configuration at once
    pub fn config(mut self, config: InferenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Use the given compiled literals
    pub fn literals(mut self, patterns: LiteralPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Render generic numeric columns as regex literals
    pub fn use_regex_for_nums(mut self, enable: bool) -> Self {
        self.config.use_regex_for_nums = enable;
        self
    }

    /// Set the minimum sample size for positive constraints
    pub fn min_n_limits(mut self, n: usize) -> Self {
        self.config.min_n_limits = n;
        self
    }

    /// Set the maximum number of categories
    pub fn n_max_categories(mut self, n: usize) -> Self {
        self.config.categorical.n_max_categories = n;
        self
    }

    /// Set the bounds of the adaptive categorical threshold
    pub fn categorical_thresholds(mut self, min: f64, max: f64) -> Self {
        let min = min.clamp(0.0, 1.0);
        self.config.categorical.threshold_min = min;
        self.config.categorical.threshold_max = max.clamp(min, 1.0);
        self
    }

    /// Reject categorical columns holding fractional numbers
    pub fn forbid_float_categories(mut self, forbid: bool) -> Self {
        self.config.categorical.forbid_float_categories = forbid;
        self
    }

    /// Build the SchemaEngine
    pub fn build(self) -> SchemaEngine {
        let rules = default_rules(&self.config, &self.patterns);
        SchemaEngine {
            config: self.config,
            missing_tokens: MissingTokenSet::new(&self.patterns.literals().missing_value),
            rules,
        }
    }
}

/// The classification chain in priority order.
pub fn default_rules(
    config: &InferenceConfig,
    patterns: &LiteralPatterns,
) -> Vec<Box<dyn ClassificationRule>> {
    let literals = patterns.literals();
    vec![
        Box::new(EmptyRule),
        Box::new(BooleanRule),
        Box::new(CategoricalRule::new(
            config.categorical,
            patterns.string.clone(),
        )),
        Box::new(PositiveNumericRule::new(config.min_n_limits)),
        Box::new(NumericRule::new(
            config.use_regex_for_nums,
            literals.integer.clone(),
            literals.numeric.clone(),
        )),
        Box::new(TemporalRule::new(patterns)),
        Box::new(StringRule::new(patterns.string.clone())),
        Box::new(FallbackRule),
    ]
}

/// Classifies columns and assembles schema documents.
pub struct SchemaEngine {
    config: InferenceConfig,
    missing_tokens: MissingTokenSet,
    rules: Vec<Box<dyn ClassificationRule>>,
}

impl SchemaEngine {
    /// Create a new builder with default configuration and built-in literals
    pub fn builder() -> SchemaEngineBuilder {
        SchemaEngineBuilder {
            config: InferenceConfig::default(),
            patterns: LiteralPatterns::default(),
        }
    }

    /// Create a SchemaEngine with default configuration
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Names of the rules in evaluation order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Classifies one column; the first rule that claims it wins.
    pub fn infer(&self, profile: &ColumnProfile<'_>) -> Classification {
        for rule in &self.rules {
            if let Some(classification) = rule.classify(profile) {
                debug!(
                    column = profile.name,
                    rule = rule.name(),
                    classification = classification.type_name(),
                    "Classified column"
                );
                return classification;
            }
        }
        // Only reachable with a chain that lacks the fallback rule.
        Classification::Any
    }

    /// Classifies a single column view that has no canonical counterpart.
    pub fn infer_values(&self, column: &Column) -> Classification {
        self.infer(&ColumnProfile::new(
            column.name(),
            column.non_missing(),
            Vec::new(),
        ))
    }

    /// Classifies and renders one column from its two views.
    pub fn schema_line(&self, library_default: &Column, canonical: &Column) -> SchemaLine {
        let missing_alternatives = self.missing_tokens.occurring_in(canonical);
        let profile = ColumnProfile::new(
            library_default.name(),
            library_default.non_missing(),
            missing_alternatives,
        );
        let classification = self.infer(&profile);
        let expression = render(
            &classification,
            &profile.missing_alternatives,
            canonical.has_missing(),
        );
        debug!(
            column = %truncate_field(profile.name, DEFAULT_MAX_FIELD_LENGTH),
            expression = %truncate_field(&expression, DEFAULT_MAX_FIELD_LENGTH),
            "Rendered schema line"
        );
        SchemaLine {
            column: library_default.name().to_string(),
            classification,
            expression,
        }
    }

    /// Builds the schema document for a whole table, one line per column.
    #[instrument(skip(self, table), fields(columns = table.column_count()))]
    pub fn generate(&self, table: &Table) -> SchemaDocument {
        let lines: Vec<SchemaLine> = table
            .columns()
            .map(|(library_default, canonical)| self.schema_line(library_default, canonical))
            .collect();
        info!(columns = lines.len(), "Generated csv schema");
        SchemaDocument {
            separator: Separator(table.delimiter()),
            lines,
        }
    }
}

impl Default for SchemaEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The column separator as written in the schema header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separator(pub u8);

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            b'\t' => f.write_str("TAB"),
            other => write!(f, "'{}'", other as char),
        }
    }
}

/// One column of a schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLine {
    pub column: String,
    pub classification: Classification,
    /// Rendered expression including missing-value clauses
    pub expression: String,
}

impl fmt::Display for SchemaLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\": {}",
            self.column.replace('"', "\\\""),
            self.expression
        )
    }
}

/// A complete schema: header plus one line per column, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    pub separator: Separator,
    pub lines: Vec<SchemaLine>,
}

impl SchemaDocument {
    pub fn total_columns(&self) -> usize {
        self.lines.len()
    }

    pub fn header(&self) -> [String; 3] {
        [
            SCHEMA_VERSION.to_string(),
            format!("@totalColumns {}", self.total_columns()),
            format!("@separator {}", self.separator),
        ]
    }
}

impl fmt::Display for SchemaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = self.header().into();
        lines.extend(self.lines.iter().map(SchemaLine::to_string));
        f.write_str(&lines.join("\n"))
    }
}
