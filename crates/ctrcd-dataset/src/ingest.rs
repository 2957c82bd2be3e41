//! Tolerant CSV ingestion.
//!
//! Lab exports disagree on delimiters and decimal separators, so parsing is
//! a ladder of attempts:
//!
//! 1. sniffed delimiter, strict record lengths
//! 2. semicolon delimiter (decimal-comma exports), strict record lengths
//! 3. sniffed delimiter, lenient record lengths (short rows pad with NaN)
//!
//! Within any attempt, individual cells that fail numeric coercion become
//! NaN; only structural problems (inconsistent record lengths, no
//! recognizable clinical column) fail an attempt.

use std::{fs, path::Path};

use csv::ReaderBuilder;

use crate::{field::ClinicalField, table::ClinicalTable};

/// Error from reading a clinical CSV.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum IngestError {
    /// The file could not be read at all.
    #[display("failed to read clinical csv {path}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    /// Every parse attempt failed structurally.
    #[display("failed to parse clinical csv records")]
    Parse(csv::Error),
    /// The file parsed, but none of its headers matched an expected
    /// clinical column.
    #[display("no expected clinical columns found (headers: {headers})")]
    NoClinicalColumns { headers: String },
}

/// Reads a clinical CSV from disk, tolerating delimiter and decimal-comma
/// variations.
///
/// Only recognized clinical columns are retained; everything else in the
/// file is dropped. Unparseable cells become NaN.
///
/// # Errors
///
/// Fails if the file cannot be read, if no parse attempt produces
/// structurally valid records, or if no expected clinical column is present.
pub fn read_clinical_csv<P>(path: P) -> Result<ClinicalTable, IngestError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_clinical_csv(&text)
}

/// Parses clinical CSV text with the fallback ladder described in the
/// module documentation.
///
/// # Errors
///
/// Fails if every attempt is structurally invalid or no expected clinical
/// column is present.
///
/// # Examples
///
/// ```
/// use ctrcd_dataset::{field::ClinicalField, ingest::parse_clinical_csv};
///
/// // Semicolon delimiters and decimal commas are both tolerated.
/// let table = parse_clinical_csv("age;weight;height\n54;70,5;163\n61;81;171")?;
/// assert_eq!(table.num_rows(), 2);
/// assert!((table.value(ClinicalField::Weight, 0) - 70.5).abs() < 1e-12);
/// # Ok::<(), ctrcd_dataset::ingest::IngestError>(())
/// ```
pub fn parse_clinical_csv(text: &str) -> Result<ClinicalTable, IngestError> {
    let sniffed = sniff_delimiter(text);
    match parse_attempt(text, sniffed, false) {
        Ok(table) => return Ok(table),
        Err(IngestError::NoClinicalColumns { .. }) if sniffed == b',' => {}
        Err(IngestError::Parse(_)) => {}
        Err(err) => return Err(err),
    }
    if let Ok(table) = parse_attempt(text, b';', false) {
        return Ok(table);
    }
    parse_attempt(text, sniffed, true)
}

/// Picks the most frequent candidate delimiter in the header line.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    [b';', b'\t', b',']
        .into_iter()
        .max_by_key(|&delim| header.bytes().filter(|&b| b == delim).count())
        .filter(|&delim| header.bytes().any(|b| b == delim))
        .unwrap_or(b',')
}

fn parse_attempt(text: &str, delimiter: u8, lenient: bool) -> Result<ClinicalTable, IngestError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(lenient)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(IngestError::Parse)?.clone();
    let recognized: Vec<(usize, ClinicalField)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| ClinicalField::from_header(header).map(|field| (idx, field)))
        .collect();
    if recognized.is_empty() {
        return Err(IngestError::NoClinicalColumns {
            headers: headers.iter().take(10).collect::<Vec<_>>().join(", "),
        });
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); recognized.len()];
    for record in reader.records() {
        let record = record.map_err(IngestError::Parse)?;
        for (slot, &(idx, _)) in recognized.iter().enumerate() {
            let value = record.get(idx).map_or(f64::NAN, coerce_numeric);
            columns[slot].push(value);
        }
    }

    let mut table = ClinicalTable::new();
    for (&(_, field), values) in recognized.iter().zip(columns) {
        // Duplicate headers keep the first occurrence.
        if !table.contains(field) {
            table.insert_column(field, values);
        }
    }
    Ok(table)
}

/// Coerces a single cell to `f64`, accepting decimal commas.
///
/// Returns NaN for empty or unparseable cells.
#[must_use]
pub fn coerce_numeric(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        return value;
    }
    if trimmed.contains(',') && !trimmed.contains('.') {
        if let Ok(value) = trimmed.replace(',', ".").parse::<f64>() {
            return value;
        }
    }
    f64::NAN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_delimited_parses_directly() {
        let table = parse_clinical_csv("age,weight,CTRCD\n54,70,0\n61,81,1").unwrap();
        assert_eq!(table.num_rows(), 2);
        assert!((table.value(ClinicalField::Ctrcd, 1) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn semicolon_with_decimal_commas() {
        let table = parse_clinical_csv("LVEF;PWT\n58,5;1,1\n47;0,9").unwrap();
        assert!((table.value(ClinicalField::Lvef, 0) - 58.5).abs() < 1e-12);
        assert!((table.value(ClinicalField::Pwt, 1) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn unparseable_cells_become_nan() {
        let table = parse_clinical_csv("age,LVEF\n54,n/a\n,61").unwrap();
        assert!(table.value(ClinicalField::Lvef, 0).is_nan());
        assert!(table.value(ClinicalField::Age, 1).is_nan());
        assert!((table.value(ClinicalField::Lvef, 1) - 61.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_columns_are_dropped() {
        let table = parse_clinical_csv("age,biopsy_id\n54,B-101").unwrap();
        assert!(table.contains(ClinicalField::Age));
        assert_eq!(table.fields().count(), 1);
    }

    #[test]
    fn no_clinical_columns_is_a_hard_failure() {
        let err = parse_clinical_csv("biopsy_id,site\nB-101,madrid").unwrap_err();
        assert!(matches!(err, IngestError::NoClinicalColumns { .. }));
    }

    #[test]
    fn ragged_rows_parse_on_the_lenient_attempt() {
        let table = parse_clinical_csv("age,weight,LVEF\n54,70,58\n61,81").unwrap();
        assert_eq!(table.num_rows(), 2);
        assert!(table.value(ClinicalField::Lvef, 1).is_nan());
    }

    #[test]
    fn alias_headers_unify() {
        let table = parse_clinical_csv("Age,Heart Rate,trastuzumab\n54,72,1").unwrap();
        assert!(table.contains(ClinicalField::HeartRate));
        assert!(table.contains(ClinicalField::AntiHer2));
    }

    #[test]
    fn decimal_comma_coercion() {
        assert!((coerce_numeric("70,5") - 70.5).abs() < 1e-12);
        assert!((coerce_numeric(" 1.25 ") - 1.25).abs() < 1e-12);
        assert!(coerce_numeric("1,234.5").is_nan());
        assert!(coerce_numeric("abc").is_nan());
        assert!(coerce_numeric("").is_nan());
    }
}
