//! # csvs-infer - CSV Schema inference for Rust
//!
//! csvs-infer looks at a delimited table without any prior knowledge of its
//! column types and drafts a [CSV Schema 1.2] document describing it: one
//! constraint expression per column, chosen by an ordered chain of type
//! heuristics.
//!
//! [CSV Schema 1.2]: https://digital-preservation.github.io/csv-schema/csv-schema-1.2.html
//!
//! ## Quick Start
//!
//! ```rust
//! use csvs_infer::engine::SchemaEngine;
//! use csvs_infer::table::Table;
//!
//! # fn main() -> csvs_infer::error::Result<()> {
//! let data = "id\tunit\n1\tkg\n2\tkg\n3\tNA\n";
//! let table = Table::from_reader(data.as_bytes(), b'\t', "")?;
//!
//! let schema = SchemaEngine::new().generate(&table);
//! println!("{schema}");
//! assert_eq!(schema.total_columns(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! For files on disk, [`infer::CsvSchemaInference`] detects the delimiter,
//! generates the schema and writes it next to the data.
//!
//! ## Classification
//!
//! Every column is classified by the first matching rule of a fixed chain:
//!
//! | Order | Rule | Rendered as |
//! |-------|------|-------------|
//! | 1 | boolean (`0`/`1` only) | `is("0") or is("1")` |
//! | 2 | categorical | `is(..)`, `any(..)`, `regex(..)` |
//! | 3 | non-negative numeric, large sample | `positiveInteger`, `range(0, *)` |
//! | 4 | numeric | `range(*, *)` or the `Integer`/`Numeric` literal |
//! | 5 | date/time literals | `xDateTimeTz`, `xDateTime`, `xDate`, `xTime` |
//! | 6 | string literal | `[upperCase\|lowerCase] length(..)` |
//! | 7 | anything else | `any` |
//!
//! ## Missing values
//!
//! Tabular tooling reads tokens like `NA` or `null` as missing, but the schema
//! standard only knows the empty value. Types are inferred with those tokens
//! removed, and every token that actually occurs in a column is added back to
//! its expression as an `or is("NA")` clause. See [`table`] for the two views
//! of a table this relies on.
//!
//! ## Architecture
//!
//! - **`predicates`**: pure type checks over the values of one column
//! - **`rules`**: the ordered classification chain
//! - **`classification`**: classification outcomes and their rendering
//! - **`engine`**: configuration, per-column inference and document assembly
//! - **`table`**: dual-view table ingestion and delimiter detection
//! - **`literals`**: regex literal configuration
//! - **`infer`**: the file-level driver
//! - **`logging`**: `tracing` subscriber setup

pub mod classification;
pub mod engine;
pub mod error;
pub mod infer;
pub mod literals;
pub mod logging;
pub mod predicates;
pub mod rules;
pub mod table;

pub use classification::Classification;
pub use engine::{InferenceConfig, SchemaDocument, SchemaEngine};
pub use error::{InferError, Result};
pub use infer::CsvSchemaInference;
pub use literals::{LiteralPatterns, Literals};
pub use table::Table;
