//! Table ingestion with two views of missing values.
//!
//! Tabular tooling conventionally treats a broad set of tokens (`NA`, `NULL`,
//! `n/a`, ...) as missing, while the schema standard only knows one missing
//! marker: the empty value. A [`Table`] is read once and exposes both
//! interpretations of the same cells:
//!
//! - the *library-default* view, where every token of the library missing set
//!   is missing; type predicates look at this view;
//! - the *canonical* view, where only the configured `MissingValue` literal is
//!   missing and every other token is kept as a literal value.
//!
//! Both views are immutable once built.

pub mod sniff;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::error::Result;

/// Tokens the conventional tabular loaders read as missing, in render order.
pub const LIBRARY_MISSING_TOKENS: [&str; 19] = [
    "",
    "#N/A",
    "#N/A N/A",
    "#NA",
    "-1.#IND",
    "-1.#QNAN",
    "-NaN",
    "-nan",
    "1.#IND",
    "1.#QNAN",
    "<NA>",
    "N/A",
    "NA",
    "NULL",
    "NaN",
    "None",
    "n/a",
    "nan",
    "null",
];

/// Library missing tokens that the schema standard does not treat as missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTokenSet {
    tokens: Vec<String>,
}

impl MissingTokenSet {
    /// Builds the set of library tokens minus the canonical missing marker.
    pub fn new(canonical_missing: &str) -> Self {
        Self {
            tokens: LIBRARY_MISSING_TOKENS
                .iter()
                .filter(|token| **token != canonical_missing)
                .map(|token| token.to_string())
                .collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn contains(&self, value: &str) -> bool {
        self.tokens.iter().any(|token| token == value)
    }

    /// Tokens of this set that literally occur in a canonical column, in set order.
    pub fn occurring_in(&self, canonical: &Column) -> Vec<String> {
        self.tokens
            .iter()
            .filter(|token| canonical.values().iter().flatten().any(|v| v == *token))
            .cloned()
            .collect()
    }
}

/// One field across all rows. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    values: Vec<Option<String>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Builds a column from raw cells, treating `is_missing` cells as missing.
    pub fn from_cells<'a, I, F>(name: impl Into<String>, cells: I, is_missing: F) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
        F: Fn(&str) -> bool,
    {
        let values = cells
            .into_iter()
            .map(|cell| cell.filter(|v| !is_missing(*v)).map(str::to_string))
            .collect();
        Self::new(name, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// Number of rows, missing cells included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values with missing cells dropped, in row order.
    pub fn non_missing(&self) -> Vec<&str> {
        self.values.iter().flatten().map(String::as_str).collect()
    }

    pub fn has_missing(&self) -> bool {
        self.values.iter().any(Option::is_none)
    }
}

/// A delimited table loaded once and viewed two ways.
#[derive(Debug, Clone)]
pub struct Table {
    delimiter: u8,
    library_default: Vec<Column>,
    canonical: Vec<Column>,
}

impl Table {
    /// Reads a table from a file, detecting its delimiter.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>, canonical_missing: &str) -> Result<Self> {
        let mut bytes = Vec::new();
        File::open(path.as_ref())?.read_to_end(&mut bytes)?;
        let delimiter = sniff::sniff_delimiter(&bytes);
        Self::from_reader(bytes.as_slice(), delimiter, canonical_missing)
    }

    /// Reads a table with a known delimiter. The first record is the header.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8, canonical_missing: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = unique_names(reader.headers()?.iter().map(str::to_string));
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?);
        }
        debug!(
            columns = headers.len(),
            rows = rows.len(),
            delimiter = %(delimiter as char).escape_default(),
            "Read delimited table"
        );

        let library_missing = MissingTokenSet::new(canonical_missing);
        let cells = |index: usize| rows.iter().map(move |row| row.get(index));

        let mut library_default = Vec::with_capacity(headers.len());
        let mut canonical = Vec::with_capacity(headers.len());
        for (index, name) in headers.iter().enumerate() {
            library_default.push(Column::from_cells(name.as_str(), cells(index), |v| {
                v == canonical_missing || library_missing.contains(v)
            }));
            canonical.push(Column::from_cells(name.as_str(), cells(index), |v| {
                v == canonical_missing
            }));
        }

        Ok(Self {
            delimiter,
            library_default,
            canonical,
        })
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn column_count(&self) -> usize {
        self.canonical.len()
    }

    /// Columns where every library missing token is missing.
    pub fn library_default(&self) -> &[Column] {
        &self.library_default
    }

    /// Columns where only the canonical marker is missing.
    pub fn canonical(&self) -> &[Column] {
        &self.canonical
    }

    /// Pairs of (library-default, canonical) views per column, in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&Column, &Column)> {
        self.library_default.iter().zip(self.canonical.iter())
    }
}

/// Renames repeated header names to `name.1`, `name.2`, ... in order of
/// appearance. A suffixed name that is already taken gets suffixed again.
fn unique_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .into_iter()
        .map(|original| {
            let mut name = original.clone();
            let mut count = seen.get(&name).copied().unwrap_or(0);
            while count > 0 {
                seen.insert(name.clone(), count + 1);
                name = format!("{name}.{count}");
                count = seen.get(&name).copied().unwrap_or(0);
            }
            seen.insert(name.clone(), count + 1);
            if name != original {
                warn!(column = %original, renamed = %name, "Renamed duplicate column");
            }
            name
        })
        .collect()
}
