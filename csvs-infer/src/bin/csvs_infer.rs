//! csvs-infer command line
//!
//! Drafts a CSV Schema for a `.csv` or `.tsv` file.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{error, Level};

use csvs_infer::logging::setup::{init_logging, LoggingConfig};
use csvs_infer::{CsvSchemaInference, InferError, InferenceConfig, Literals};

#[derive(Parser, Debug)]
#[command(name = "csvs-infer", version, about, long_about = None)]
struct Args {
    /// Delimited data file (.csv or .tsv)
    data_path: PathBuf,

    /// Where to write the schema (default: <stem>_schema-draft.csvs next to the data)
    #[arg(long)]
    schema_path: Option<PathBuf>,

    /// YAML file overriding the built-in regex literals
    #[arg(long)]
    literals: Option<PathBuf>,

    /// Render numeric columns as regex literals instead of ranges
    #[arg(long)]
    use_regex_for_nums: bool,

    /// Minimum number of values before a column may be constrained to >= 0
    #[arg(long, default_value_t = 100)]
    min_n_limits: usize,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn logging_config(&self) -> LoggingConfig {
        let config = match self.verbose {
            0 => LoggingConfig::default(),
            1 => LoggingConfig::verbose(),
            _ => LoggingConfig::development().with_crate_level(Level::TRACE),
        };
        config.with_json_format(self.json_logs)
    }
}

fn check_file_type(path: &Path) -> Result<(), InferError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv" | "tsv") => Ok(()),
        _ => Err(InferError::UnsupportedFileType(path.display().to_string())),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = init_logging(args.logging_config()) {
        eprintln!("Failed to initialise logging: {e}");
    }

    check_file_type(&args.data_path)?;

    let inference = match &args.literals {
        Some(path) => {
            let literals = Literals::from_yaml_file(path)
                .with_context(|| format!("reading literals from {}", path.display()))?;
            CsvSchemaInference::with_literals(&args.data_path, &literals)
        }
        None => CsvSchemaInference::from_path(&args.data_path),
    }
    .with_context(|| format!("loading {}", args.data_path.display()))?;

    let config = InferenceConfig {
        use_regex_for_nums: args.use_regex_for_nums,
        min_n_limits: args.min_n_limits,
        ..InferenceConfig::default()
    };
    config.validate()?;
    let inference = inference.config(config);

    if !inference.run(args.schema_path.as_deref()) {
        error!(data = %args.data_path.display(), "Schema inference failed");
        process::exit(1);
    }

    Ok(())
}
