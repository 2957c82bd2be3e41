//! Scalar feature derivations.
//!
//! Each derivation here is a pure function of already-cleaned clinical
//! values. Missing inputs (NaN) propagate to the derived value, with two
//! deliberate exceptions: the comorbidity score counts a missing flag as
//! absent-disease (0), and the LVEF band indicators are all zero when LVEF
//! is unknown.

use ctrcd_dataset::ClinicalField;

/// The ten flags summed into the comorbidity score.
pub const COMORBIDITY_FIELDS: [ClinicalField; 10] = [
    ClinicalField::Hta,
    ClinicalField::Dl,
    ClinicalField::Dm,
    ClinicalField::Smoker,
    ClinicalField::ExSmoker,
    ClinicalField::CiPrev,
    ClinicalField::IcmPrev,
    ClinicalField::ArrPrev,
    ClinicalField::ValvPrev,
    ClinicalField::CxValv,
];

/// BMI plausibility band; values outside are invalidated, not clipped.
pub const BMI_RANGE: (f64, f64) = (10.0, 60.0);

/// Body-mass index from weight (kg) and height (cm).
///
/// Returns NaN when either input is missing, when height is non-positive,
/// or when the result falls outside [`BMI_RANGE`].
///
/// # Examples
///
/// ```
/// use ctrcd_features::derive::bmi;
///
/// assert!((bmi(70.0, 175.0) - 22.857).abs() < 1e-3);
/// assert!(bmi(f64::NAN, 175.0).is_nan());
/// assert!(bmi(200.0, 120.0).is_nan()); // 138.9, implausible
/// ```
#[must_use]
pub fn bmi(weight: f64, height: f64) -> f64 {
    if height <= 0.0 {
        return f64::NAN;
    }
    let height_m = height / 100.0;
    let value = weight / (height_m * height_m);
    let (lo, hi) = BMI_RANGE;
    if value < lo || value > hi {
        return f64::NAN;
    }
    value
}

/// Comorbidity score: the number of set risk flags, missing treated as 0.
///
/// With ten contributing flags the score lies in [0, 10].
///
/// # Examples
///
/// ```
/// use ctrcd_features::derive::comorbidity_score;
///
/// let flags = [1.0, 0.0, f64::NAN, 1.0];
/// assert!((comorbidity_score(flags) - 2.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn comorbidity_score<I>(flags: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    flags.into_iter().filter(|flag| !flag.is_nan()).sum()
}

/// LVEF risk-band indicators.
///
/// Exactly one band is set when LVEF is known; all are zero when it is
/// missing. The bands never overlap: low is <50, mid is [50, 60), high is
/// ≥60.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LvefBands {
    /// LVEF below 50 (reduced ejection fraction).
    pub low: f64,
    /// LVEF in [50, 60).
    pub mid: f64,
    /// LVEF at or above 60.
    pub high: f64,
}

impl LvefBands {
    /// Bands for a (possibly missing) LVEF measurement.
    ///
    /// # Examples
    ///
    /// ```
    /// use ctrcd_features::derive::LvefBands;
    ///
    /// let bands = LvefBands::from_lvef(45.0);
    /// assert_eq!(bands, LvefBands { low: 1.0, mid: 0.0, high: 0.0 });
    ///
    /// let missing = LvefBands::from_lvef(f64::NAN);
    /// assert!((missing.low + missing.mid + missing.high).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_lvef(lvef: f64) -> Self {
        if lvef.is_nan() {
            return Self {
                low: 0.0,
                mid: 0.0,
                high: 0.0,
            };
        }
        Self {
            low: f64::from(u8::from(lvef < 50.0)),
            mid: f64::from(u8::from((50.0..60.0).contains(&lvef))),
            high: f64::from(u8::from(lvef >= 60.0)),
        }
    }
}

/// Interaction of a band indicator with a treatment flag.
///
/// A missing treatment flag contributes 0, so the interaction is defined
/// whenever the band is.
#[must_use]
pub fn interaction(band: f64, flag: f64) -> f64 {
    let flag = if flag.is_nan() { 0.0 } else { flag };
    band * flag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_reference_value() {
        // 70 kg at 175 cm is the canonical check: 70 / 1.75^2.
        assert!((bmi(70.0, 175.0) - 22.857_142_857).abs() < 1e-6);
    }

    #[test]
    fn bmi_is_nan_or_in_band() {
        let cases = [
            (70.0, 175.0),
            (30.0, 210.0),
            (200.0, 120.0),
            (15.0, 190.0),
            (f64::NAN, 170.0),
            (70.0, f64::NAN),
            (70.0, 0.0),
            (70.0, -5.0),
        ];
        for (weight, height) in cases {
            let value = bmi(weight, height);
            assert!(
                value.is_nan() || (BMI_RANGE.0..=BMI_RANGE.1).contains(&value),
                "bmi({weight}, {height}) = {value}"
            );
        }
    }

    #[test]
    fn comorbidity_treats_missing_as_zero() {
        let all_missing = [f64::NAN; 10];
        assert!(comorbidity_score(all_missing).abs() < f64::EPSILON);

        let all_set = [1.0; 10];
        assert!((comorbidity_score(all_set) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bands_are_mutually_exclusive() {
        for lvef in [10.0, 45.0, 49.9, 50.0, 55.0, 59.9, 60.0, 75.0] {
            let bands = LvefBands::from_lvef(lvef);
            let total = bands.low + bands.mid + bands.high;
            assert!((total - 1.0).abs() < 1e-12, "lvef={lvef}");
        }
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(
            LvefBands::from_lvef(49.999),
            LvefBands { low: 1.0, mid: 0.0, high: 0.0 }
        );
        assert_eq!(
            LvefBands::from_lvef(50.0),
            LvefBands { low: 0.0, mid: 1.0, high: 0.0 }
        );
        assert_eq!(
            LvefBands::from_lvef(60.0),
            LvefBands { low: 0.0, mid: 0.0, high: 1.0 }
        );
    }

    #[test]
    fn interaction_with_missing_flag_is_zero() {
        assert!(interaction(1.0, f64::NAN).abs() < f64::EPSILON);
        assert!((interaction(1.0, 1.0) - 1.0).abs() < f64::EPSILON);
        assert!(interaction(0.0, 1.0).abs() < f64::EPSILON);
    }
}
