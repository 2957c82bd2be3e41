//! Fixed-order feature matrix assembly.
//!
//! The column order declared here is a contract: the model artifact stores
//! it, and inference must reproduce it exactly. Every column is always
//! present in a built matrix; a clinical field the source file never had
//! simply yields a NaN column for the imputer to fill.

use ctrcd_dataset::{ClinicalField, ClinicalTable};

use crate::derive::{self, COMORBIDITY_FIELDS, LvefBands};

/// Canonical feature column order for this pipeline version.
pub const FEATURE_COLUMNS: [&str; 30] = [
    "age",
    "BMI",
    "LVEF",
    "heart_rate",
    "heart_rhythm",
    "PWT",
    "LAd",
    "LVDd",
    "LVSd",
    "AC",
    "antiHER2",
    "ACprev",
    "antiHER2prev",
    "HTA",
    "DL",
    "DM",
    "smoker",
    "exsmoker",
    "RTprev",
    "CIprev",
    "ICMprev",
    "ARRprev",
    "VALVprev",
    "cxvalv",
    "comorbidity_score",
    "LVEF_low",
    "LVEF_50_60",
    "LVEF_ge60",
    "LVEF_low_x_AC",
    "LVEF_low_x_antiHER2",
];

/// Clinical fields copied verbatim between LVEF and the derived columns.
const PASSTHROUGH_FIELDS: [ClinicalField; 21] = [
    ClinicalField::HeartRate,
    ClinicalField::HeartRhythm,
    ClinicalField::Pwt,
    ClinicalField::Lad,
    ClinicalField::Lvdd,
    ClinicalField::Lvsd,
    ClinicalField::Ac,
    ClinicalField::AntiHer2,
    ClinicalField::AcPrev,
    ClinicalField::AntiHer2Prev,
    ClinicalField::Hta,
    ClinicalField::Dl,
    ClinicalField::Dm,
    ClinicalField::Smoker,
    ClinicalField::ExSmoker,
    ClinicalField::RtPrev,
    ClinicalField::CiPrev,
    ClinicalField::IcmPrev,
    ClinicalField::ArrPrev,
    ClinicalField::ValvPrev,
    ClinicalField::CxValv,
];

/// Error from feature-matrix construction.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum FeatureError {
    /// The outcome column is required for training data.
    #[display("CTRCD column missing")]
    MissingOutcome,
}

/// A built feature matrix: named columns, one row per patient.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Column names in matrix order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Row-major values.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of patient rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of feature columns.
    #[must_use]
    pub fn num_features(&self) -> usize {
        self.names.len()
    }

    /// One column's values, by matrix index.
    pub fn column(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |row| row[index])
    }

    /// Keeps only the columns at the given indices, in the given order.
    #[must_use]
    pub fn select_columns(&self, indices: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            names: indices.iter().map(|&i| self.names[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i]).collect())
                .collect(),
        }
    }

    /// Keeps only the rows at the given indices, in the given order.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            names: self.names.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

/// Derives one feature row from a per-field value lookup.
///
/// This is the single derivation path shared by batch training and the
/// serving shim. The returned values follow [`FEATURE_COLUMNS`].
#[must_use]
pub fn derive_row<F>(value_of: F) -> Vec<f64>
where
    F: Fn(ClinicalField) -> f64,
{
    let lvef = value_of(ClinicalField::Lvef);
    let bands = LvefBands::from_lvef(lvef);
    let score = derive::comorbidity_score(COMORBIDITY_FIELDS.iter().map(|&f| value_of(f)));

    let mut row = Vec::with_capacity(FEATURE_COLUMNS.len());
    row.push(value_of(ClinicalField::Age));
    row.push(derive::bmi(
        value_of(ClinicalField::Weight),
        value_of(ClinicalField::Height),
    ));
    row.push(lvef);
    // heart_rate .. cxvalv
    row.extend(PASSTHROUGH_FIELDS.iter().map(|&field| value_of(field)));
    row.push(score);
    row.push(bands.low);
    row.push(bands.mid);
    row.push(bands.high);
    row.push(derive::interaction(bands.low, value_of(ClinicalField::Ac)));
    row.push(derive::interaction(
        bands.low,
        value_of(ClinicalField::AntiHer2),
    ));
    row
}

/// Derives one row ordered by an explicit feature-name list.
///
/// Used by the serving shim to match the order persisted with a model
/// artifact. Names outside this pipeline's vocabulary yield NaN.
#[must_use]
pub fn derive_row_named<F>(value_of: F, feature_names: &[String]) -> Vec<f64>
where
    F: Fn(ClinicalField) -> f64,
{
    let canonical = derive_row(value_of);
    feature_names
        .iter()
        .map(|name| {
            FEATURE_COLUMNS
                .iter()
                .position(|&column| column == name)
                .map_or(f64::NAN, |idx| canonical[idx])
        })
        .collect()
}

/// Builds the training matrix and outcome vector from a cleaned table.
///
/// Rows with a missing outcome are excluded: they can neither train nor
/// score a supervised model. The returned label vector is parallel to the
/// matrix rows.
///
/// # Errors
///
/// Fails if the table has no CTRCD column at all.
pub fn build_training_data(
    table: &ClinicalTable,
) -> Result<(FeatureMatrix, Vec<f64>), FeatureError> {
    if !table.contains(ClinicalField::Ctrcd) {
        return Err(FeatureError::MissingOutcome);
    }

    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for row_idx in 0..table.num_rows() {
        let outcome = table.value(ClinicalField::Ctrcd, row_idx);
        if outcome.is_nan() {
            continue;
        }
        rows.push(derive_row(|field| table.value(field, row_idx)));
        labels.push(outcome);
    }

    Ok((
        FeatureMatrix {
            names: FEATURE_COLUMNS.iter().map(|&n| n.to_owned()).collect(),
            rows,
        },
        labels,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(name: &str) -> usize {
        FEATURE_COLUMNS.iter().position(|&n| n == name).unwrap()
    }

    fn sample_table() -> ClinicalTable {
        let mut table = ClinicalTable::new();
        table.insert_column(ClinicalField::Age, vec![54.0, 61.0, 47.0]);
        table.insert_column(ClinicalField::Weight, vec![70.0, 81.0, f64::NAN]);
        table.insert_column(ClinicalField::Height, vec![175.0, 163.0, 171.0]);
        table.insert_column(ClinicalField::Lvef, vec![45.0, 58.0, f64::NAN]);
        table.insert_column(ClinicalField::Ac, vec![1.0, 0.0, 1.0]);
        table.insert_column(ClinicalField::Hta, vec![1.0, f64::NAN, 0.0]);
        table.insert_column(ClinicalField::Ctrcd, vec![1.0, 0.0, f64::NAN]);
        table
    }

    #[test]
    fn matrix_has_every_column_even_for_sparse_sources() {
        let (matrix, labels) = build_training_data(&sample_table()).unwrap();
        assert_eq!(matrix.num_features(), FEATURE_COLUMNS.len());
        // The third row has a missing outcome and is dropped.
        assert_eq!(matrix.num_rows(), 2);
        assert_eq!(labels, vec![1.0, 0.0]);
        // heart_rate was never in the source; its column is all NaN.
        let hr = index_of("heart_rate");
        assert!(matrix.column(hr).all(f64::is_nan));
    }

    #[test]
    fn derived_columns_match_scalar_derivations() {
        let (matrix, _) = build_training_data(&sample_table()).unwrap();
        let row = &matrix.rows()[0];
        assert!((row[index_of("BMI")] - 22.857_142_857).abs() < 1e-6);
        assert!((row[index_of("LVEF_low")] - 1.0).abs() < f64::EPSILON);
        assert!(row[index_of("LVEF_50_60")].abs() < f64::EPSILON);
        assert!(row[index_of("LVEF_ge60")].abs() < f64::EPSILON);
        assert!((row[index_of("LVEF_low_x_AC")] - 1.0).abs() < f64::EPSILON);
        assert!((row[index_of("comorbidity_score")] - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_outcome_column_is_a_hard_failure() {
        let mut table = ClinicalTable::new();
        table.insert_column(ClinicalField::Age, vec![54.0]);
        assert!(matches!(
            build_training_data(&table),
            Err(FeatureError::MissingOutcome)
        ));
    }

    #[test]
    fn named_row_follows_the_stored_order() {
        let stored: Vec<String> = vec![
            "LVEF_low".to_owned(),
            "age".to_owned(),
            "BMI".to_owned(),
            "not_a_feature".to_owned(),
        ];
        let row = derive_row_named(
            |field| match field {
                ClinicalField::Age => 54.0,
                ClinicalField::Weight => 70.0,
                ClinicalField::Height => 175.0,
                ClinicalField::Lvef => 45.0,
                _ => f64::NAN,
            },
            &stored,
        );
        assert_eq!(row.len(), stored.len());
        assert!((row[0] - 1.0).abs() < f64::EPSILON);
        assert!((row[1] - 54.0).abs() < f64::EPSILON);
        assert!((row[2] - 22.857_142_857).abs() < 1e-6);
        assert!(row[3].is_nan());
    }

    #[test]
    fn select_columns_reorders_names_and_values() {
        let (matrix, _) = build_training_data(&sample_table()).unwrap();
        let selected = matrix.select_columns(&[index_of("LVEF"), index_of("age")]);
        assert_eq!(selected.names(), ["LVEF", "age"]);
        assert!((selected.rows()[0][1] - 54.0).abs() < f64::EPSILON);
    }
}
