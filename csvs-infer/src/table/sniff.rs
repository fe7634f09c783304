//! Delimiter detection by table uniformity.
//!
//! Every candidate delimiter is used to parse the first lines of the input;
//! the one that splits the rows into the most consistent number of fields
//! wins. The header record has to split into the same number of fields as
//! the data records, otherwise the candidate is rejected. A file in which no
//! candidate produces more than one field is a single-column table and is
//! read with `,`.

use std::collections::HashMap;

use tracing::{debug, trace};

/// Delimiters tried in order of preference.
pub const CANDIDATE_DELIMITERS: [u8; 5] = [b',', b'\t', b';', b'|', b':'];

/// Number of records inspected per candidate.
pub const SNIFF_RECORDS: usize = 100;

/// The delimiter used when nothing better is detected.
pub const FALLBACK_DELIMITER: u8 = b',';

#[derive(Debug, Clone, Copy, PartialEq)]
struct Score {
    /// Share of records that have the most common field count.
    uniformity: f64,
    /// The most common field count.
    fields: usize,
}

/// Detects the delimiter of a delimited text sample.
pub fn sniff_delimiter(sample: &[u8]) -> u8 {
    let mut best: Option<(u8, Score)> = None;

    for delimiter in CANDIDATE_DELIMITERS {
        let Some(score) = score_delimiter(sample, delimiter) else {
            continue;
        };
        debug!(
            delimiter = %(delimiter as char).escape_default(),
            uniformity = score.uniformity,
            fields = score.fields,
            "Scored candidate delimiter"
        );
        let better = match best {
            None => true,
            Some((_, current)) => {
                score.uniformity > current.uniformity
                    || (score.uniformity == current.uniformity && score.fields > current.fields)
            }
        };
        if better {
            best = Some((delimiter, score));
        }
    }

    match best {
        Some((delimiter, _)) => delimiter,
        None => {
            debug!("No candidate splits the sample, reading a single column");
            FALLBACK_DELIMITER
        }
    }
}

fn score_delimiter(sample: &[u8], delimiter: u8) -> Option<Score> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(sample);

    let mut counts: HashMap<usize, usize> = HashMap::new();
    let mut header_fields = None;
    let mut total = 0usize;
    for record in reader.byte_records().take(SNIFF_RECORDS) {
        // A sample may be cut in the middle of a quoted field.
        let Ok(record) = record else { break };
        header_fields.get_or_insert(record.len());
        *counts.entry(record.len()).or_insert(0) += 1;
        total += 1;
    }

    let (fields, hits) = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))?;
    if fields < 2 {
        return None;
    }
    // `10:00:00` splits into three fields, the header `clock` does not.
    if header_fields != Some(fields) {
        trace!(
            delimiter = %(delimiter as char).escape_default(),
            header_fields = ?header_fields,
            fields,
            "Header does not match the data records"
        );
        return None;
    }

    Some(Score {
        uniformity: hits as f64 / total as f64,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_comma() {
        assert_eq!(sniff_delimiter(b"a,b,c\n1,2,3\n4,5,6\n"), b',');
    }

    #[test]
    fn test_sniff_tab() {
        assert_eq!(sniff_delimiter(b"a\tb\n1\t2\n3\t4\n"), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_decimal_commas() {
        let sample = "name;price\nApfel;1,20\nBirne;0,99\nKiwi;2\n";
        assert_eq!(sniff_delimiter(sample.as_bytes()), b';');
    }

    #[test]
    fn test_sniff_quoted_fields() {
        let sample = "id,comment\n1,\"a; b; c\"\n2,\"d; e\"\n";
        assert_eq!(sniff_delimiter(sample.as_bytes()), b',');
    }

    #[test]
    fn test_single_column_of_times_falls_back() {
        let sample = "clock\n10:00:00\n11:30:00\n23:59:59\n";
        assert_eq!(sniff_delimiter(sample.as_bytes()), FALLBACK_DELIMITER);
    }

    #[test]
    fn test_single_column_of_date_times_falls_back() {
        let sample = "ts\n2023-12-24T10:00:00\n2024-01-02T08:30:00+01:00\n";
        assert_eq!(sniff_delimiter(sample.as_bytes()), FALLBACK_DELIMITER);
    }

    #[test]
    fn test_times_next_to_other_columns() {
        let sample = "id,clock\n1,10:00:00\n2,11:30:00\n";
        assert_eq!(sniff_delimiter(sample.as_bytes()), b',');
    }

    #[test]
    fn test_single_column_falls_back() {
        assert_eq!(sniff_delimiter(b"value\n1\n2\n"), FALLBACK_DELIMITER);
        assert_eq!(sniff_delimiter(b""), FALLBACK_DELIMITER);
    }
}
