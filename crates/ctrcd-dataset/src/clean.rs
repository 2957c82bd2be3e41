//! Plausibility cleaning.
//!
//! Out-of-range measurements and non-{0,1} flag values become NaN. Nothing
//! is ever clipped to a bound: an implausible value carries no usable
//! information about where in the range it should have been.

use crate::{field::ClinicalField, table::ClinicalTable};

/// Applies range and binary-domain cleaning to every present column.
pub fn clean_table(table: &mut ClinicalTable) {
    apply_plausible_ranges(table);
    restrict_binary_domains(table);
}

/// Replaces values outside each field's plausible range with NaN.
pub fn apply_plausible_ranges(table: &mut ClinicalTable) {
    for field in ClinicalField::ALL {
        let Some((lo, hi)) = field.plausible_range() else {
            continue;
        };
        if let Some(column) = table.column_mut(field) {
            for value in column {
                if *value < lo || *value > hi {
                    *value = f64::NAN;
                }
            }
        }
    }
}

/// Replaces non-{0,1} values in binary columns with NaN.
pub fn restrict_binary_domains(table: &mut ClinicalTable) {
    for field in ClinicalField::ALL {
        if !field.is_binary() {
            continue;
        }
        if let Some(column) = table.column_mut(field) {
            for value in column {
                if *value != 0.0 && *value != 1.0 {
                    *value = f64::NAN;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(field: ClinicalField, values: Vec<f64>) -> ClinicalTable {
        let mut table = ClinicalTable::new();
        table.insert_column(field, values);
        table
    }

    #[test]
    fn out_of_range_values_become_nan() {
        let mut table = table_with(ClinicalField::Age, vec![17.0, 18.0, 95.0, 96.0, f64::NAN]);
        apply_plausible_ranges(&mut table);
        let ages = table.column(ClinicalField::Age).unwrap();
        assert!(ages[0].is_nan());
        assert!((ages[1] - 18.0).abs() < f64::EPSILON);
        assert!((ages[2] - 95.0).abs() < f64::EPSILON);
        assert!(ages[3].is_nan());
        assert!(ages[4].is_nan());
    }

    #[test]
    fn bounds_are_inclusive_not_clipping() {
        let mut table = table_with(ClinicalField::Lvef, vec![9.9, 80.1]);
        apply_plausible_ranges(&mut table);
        let lvef = table.column(ClinicalField::Lvef).unwrap();
        // Implausible values vanish instead of snapping to 10 or 80.
        assert!(lvef[0].is_nan());
        assert!(lvef[1].is_nan());
    }

    #[test]
    fn binary_columns_restricted_to_zero_one() {
        let mut table = table_with(ClinicalField::Smoker, vec![0.0, 1.0, 2.0, 0.5, f64::NAN]);
        restrict_binary_domains(&mut table);
        let smoker = table.column(ClinicalField::Smoker).unwrap();
        assert!((smoker[0]).abs() < f64::EPSILON);
        assert!((smoker[1] - 1.0).abs() < f64::EPSILON);
        assert!(smoker[2].is_nan());
        assert!(smoker[3].is_nan());
        assert!(smoker[4].is_nan());
    }

    #[test]
    fn continuous_columns_are_untouched_by_binary_pass() {
        let mut table = table_with(ClinicalField::Weight, vec![70.5]);
        restrict_binary_domains(&mut table);
        assert!((table.value(ClinicalField::Weight, 0) - 70.5).abs() < 1e-12);
    }
}
