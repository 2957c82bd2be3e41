//! Column store for parsed clinical data.

use std::collections::BTreeMap;

use crate::field::ClinicalField;

/// A parsed clinical dataset, one `f64` column per recognized field.
///
/// Missing or unparseable values are stored as NaN. Columns absent from the
/// source file are absent from the table; [`ClinicalTable::value`] reports
/// NaN for them so downstream feature derivation does not need to
/// special-case missing columns.
#[derive(Debug, Clone, Default)]
pub struct ClinicalTable {
    columns: BTreeMap<ClinicalField, Vec<f64>>,
    num_rows: usize,
}

impl ClinicalTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of patient rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Whether the source file contained this column.
    #[must_use]
    pub fn contains(&self, field: ClinicalField) -> bool {
        self.columns.contains_key(&field)
    }

    /// Fields present in the source file, in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = ClinicalField> + '_ {
        ClinicalField::ALL
            .into_iter()
            .filter(|field| self.columns.contains_key(field))
    }

    /// Column values for a field, if the source file contained it.
    #[must_use]
    pub fn column(&self, field: ClinicalField) -> Option<&[f64]> {
        self.columns.get(&field).map(Vec::as_slice)
    }

    /// Mutable column values, used by the cleaning pass.
    pub(crate) fn column_mut(&mut self, field: ClinicalField) -> Option<&mut Vec<f64>> {
        self.columns.get_mut(&field)
    }

    /// Single cell value; NaN when the column is absent.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds for a present column.
    #[must_use]
    pub fn value(&self, field: ClinicalField, row: usize) -> f64 {
        self.columns.get(&field).map_or(f64::NAN, |col| col[row])
    }

    /// Inserts a full column of values.
    ///
    /// The first inserted column fixes the row count; later columns must
    /// match it.
    ///
    /// # Panics
    ///
    /// Panics if the column length disagrees with the established row count.
    pub fn insert_column(&mut self, field: ClinicalField, values: Vec<f64>) {
        if self.columns.is_empty() {
            self.num_rows = values.len();
        }
        assert_eq!(
            values.len(),
            self.num_rows,
            "column {} length mismatch",
            field.name()
        );
        self.columns.insert(field, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_columns_read_as_nan() {
        let mut table = ClinicalTable::new();
        table.insert_column(ClinicalField::Age, vec![54.0, 61.0]);

        assert!(table.contains(ClinicalField::Age));
        assert!(!table.contains(ClinicalField::Lvef));
        assert!((table.value(ClinicalField::Age, 1) - 61.0).abs() < f64::EPSILON);
        assert!(table.value(ClinicalField::Lvef, 0).is_nan());
    }

    #[test]
    fn fields_iterate_in_canonical_order() {
        let mut table = ClinicalTable::new();
        table.insert_column(ClinicalField::Lvef, vec![58.0]);
        table.insert_column(ClinicalField::Age, vec![49.0]);

        let fields: Vec<_> = table.fields().collect();
        assert_eq!(fields, vec![ClinicalField::Age, ClinicalField::Lvef]);
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn mismatched_column_length_panics() {
        let mut table = ClinicalTable::new();
        table.insert_column(ClinicalField::Age, vec![54.0, 61.0]);
        table.insert_column(ClinicalField::Weight, vec![70.0]);
    }
}
