//! File-level schema inference: load a table, generate its schema, write it.
//!
//! ```rust,no_run
//! use csvs_infer::infer::CsvSchemaInference;
//!
//! # fn main() -> csvs_infer::error::Result<()> {
//! let inference = CsvSchemaInference::from_path("data/measurements.csv")?;
//! // Writes data/measurements_schema-draft.csvs
//! let written = inference.run(None);
//! assert!(written);
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::engine::{InferenceConfig, SchemaDocument, SchemaEngine};
use crate::error::Result;
use crate::literals::{LiteralPatterns, Literals};
use crate::table::Table;

/// Suffix appended to the data file stem to name the schema draft.
pub const SCHEMA_DRAFT_SUFFIX: &str = "_schema-draft";

/// A loaded table together with the engine that describes it.
pub struct CsvSchemaInference {
    data_path: PathBuf,
    table: Table,
    patterns: LiteralPatterns,
    engine: SchemaEngine,
}

impl CsvSchemaInference {
    /// Loads a delimited file using the built-in literals.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(path.as_ref(), LiteralPatterns::default())
    }

    /// Loads a delimited file using custom literals.
    pub fn with_literals(path: impl AsRef<Path>, literals: &Literals) -> Result<Self> {
        Self::load(path.as_ref(), literals.compile()?)
    }

    #[instrument(skip(path, patterns), fields(path = %path.display()))]
    fn load(path: &Path, patterns: LiteralPatterns) -> Result<Self> {
        let table = Table::from_path(path, &patterns.literals().missing_value)?;
        info!(
            delimiter = %(table.delimiter() as char).escape_default(),
            columns = table.column_count(),
            "Loaded table"
        );
        let engine = SchemaEngine::builder().literals(patterns.clone()).build();
        Ok(Self {
            data_path: path.to_path_buf(),
            table,
            patterns,
            engine,
        })
    }

    /// Replaces the inference parameters.
    pub fn config(mut self, config: InferenceConfig) -> Self {
        self.engine = SchemaEngine::builder()
            .literals(self.patterns.clone())
            .config(config)
            .build();
        self
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn engine(&self) -> &SchemaEngine {
        &self.engine
    }

    pub fn create_schema(&self) -> SchemaDocument {
        self.engine.generate(&self.table)
    }

    /// Generates and writes the schema, returning where it was written.
    ///
    /// Without a path (or with an empty one) the schema is written next to the
    /// data file, see [`schema_path_for`].
    #[instrument(skip(self), fields(data = %self.data_path.display()))]
    pub fn try_run(&self, schema_path: Option<&Path>) -> Result<PathBuf> {
        let schema_path = match schema_path {
            Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
            _ => schema_path_for(&self.data_path),
        };
        let document = self.create_schema();

        if let Some(parent) = schema_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&schema_path, document.to_string())?;

        info!(
            path = %schema_path.display(),
            columns = document.total_columns(),
            "Wrote csv schema"
        );
        Ok(schema_path)
    }

    /// Generates and writes the schema; a failure is logged and reported as `false`.
    pub fn run(&self, schema_path: Option<&Path>) -> bool {
        match self.try_run(schema_path) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Failed to write csv schema");
                false
            }
        }
    }
}

/// Default schema location for a data file: `<stem>_schema-draft<ext>` in the
/// same directory, where a `csv` extension becomes `csvs`.
pub fn schema_path_for(data_path: &Path) -> PathBuf {
    let stem = data_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match data_path.extension().map(|e| e.to_string_lossy()) {
        Some(ext) if ext == "csv" => format!("{stem}{SCHEMA_DRAFT_SUFFIX}.csvs"),
        Some(ext) => format!("{stem}{SCHEMA_DRAFT_SUFFIX}.{ext}"),
        None => format!("{stem}{SCHEMA_DRAFT_SUFFIX}"),
    };
    data_path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_data(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_schema_path_for() {
        assert_eq!(
            schema_path_for(Path::new("data/points.csv")),
            PathBuf::from("data/points_schema-draft.csvs")
        );
        assert_eq!(
            schema_path_for(Path::new("points.tsv")),
            PathBuf::from("points_schema-draft.tsv")
        );
        assert_eq!(
            schema_path_for(Path::new("points")),
            PathBuf::from("points_schema-draft")
        );
    }

    #[test]
    fn test_run_writes_next_to_data() {
        let dir = TempDir::new().unwrap();
        let data = write_data(&dir, "flags.csv", "flag,name\n1,a\n0,b\n");

        let inference = CsvSchemaInference::from_path(&data).unwrap();
        assert!(inference.run(None));

        let written = fs::read_to_string(dir.path().join("flags_schema-draft.csvs")).unwrap();
        assert_eq!(
            written,
            "version 1.2\n@totalColumns 2\n@separator ','\n\"flag\": is(\"0\") or is(\"1\")\n\"name\": lowerCase length(1)"
        );
    }

    #[test]
    fn test_run_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let data = write_data(&dir, "t.tsv", "a\tb\nx\t1\n");
        let target = dir.path().join("nested/out/schema.csvs");

        let inference = CsvSchemaInference::from_path(&data).unwrap();
        assert_eq!(inference.try_run(Some(&target)).unwrap(), target);
        assert!(fs::read_to_string(&target)
            .unwrap()
            .contains("@separator TAB"));
    }

    #[test]
    fn test_empty_schema_path_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let data = write_data(&dir, "d.csv", "a\n1\n");
        let inference = CsvSchemaInference::from_path(&data).unwrap();
        let written = inference.try_run(Some(Path::new(""))).unwrap();
        assert_eq!(written, dir.path().join("d_schema-draft.csvs"));
    }

    #[test]
    fn test_run_reports_write_failure() {
        let dir = TempDir::new().unwrap();
        let data = write_data(&dir, "d.csv", "a\n1\n");
        let blocker = write_data(&dir, "file", "");

        let inference = CsvSchemaInference::from_path(&data).unwrap();
        assert!(!inference.run(Some(&blocker.join("schema.csvs"))));
    }

    #[test]
    fn test_config_is_applied() {
        let dir = TempDir::new().unwrap();
        let data = write_data(&dir, "n.csv", "n\n-1\n2\n3\n");

        let inference = CsvSchemaInference::from_path(&data).unwrap().config(
            InferenceConfig {
                use_regex_for_nums: true,
                ..InferenceConfig::default()
            },
        );
        assert_eq!(
            inference.create_schema().lines[0].expression,
            r#"regex("-?[0-9]+")"#
        );
    }

    #[test]
    fn test_custom_missing_value() {
        let dir = TempDir::new().unwrap();
        let data = write_data(&dir, "m.csv", "v\nNA\n5\n-2\n");
        let literals = Literals {
            missing_value: "NA".to_string(),
            ..Literals::default()
        };

        let inference = CsvSchemaInference::with_literals(&data, &literals).unwrap();
        assert_eq!(
            inference.create_schema().lines[0].expression,
            "range(*, *) or empty"
        );
    }
}
