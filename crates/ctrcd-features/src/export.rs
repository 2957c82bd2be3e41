//! Derivations for the cleaned-table export.
//!
//! These produce the human-readable grouping columns of the `preprocess`
//! subcommand's output (age bands, therapy groups). They are reporting
//! conveniences, not model features.

/// Age band label, or `None` when age is missing.
///
/// # Examples
///
/// ```
/// use ctrcd_features::export::age_band;
///
/// assert_eq!(age_band(47.0), Some("<50"));
/// assert_eq!(age_band(50.0), Some("50-59"));
/// assert_eq!(age_band(71.0), Some(">=70"));
/// assert_eq!(age_band(f64::NAN), None);
/// ```
#[must_use]
pub fn age_band(age: f64) -> Option<&'static str> {
    if age.is_nan() {
        return None;
    }
    Some(if age < 50.0 {
        "<50"
    } else if age < 60.0 {
        "50-59"
    } else if age < 70.0 {
        "60-69"
    } else {
        ">=70"
    })
}

/// Therapy-group label from the two active-treatment flags.
///
/// Missing flags count as not-treated, matching the comorbidity-score
/// convention for flags.
#[must_use]
pub fn therapy_group(ac: f64, anti_her2: f64) -> &'static str {
    let ac = ac == 1.0;
    let her2 = anti_her2 == 1.0;
    match (ac, her2) {
        (false, false) => "none",
        (true, false) => "AC_only",
        (false, true) => "antiHER2_only",
        (true, true) => "AC_plus_antiHER2",
    }
}

/// Whether the patient had any previous cardiotoxic therapy exposure.
#[must_use]
pub fn prev_therapy_any(ac_prev: f64, anti_her2_prev: f64) -> f64 {
    f64::from(u8::from(ac_prev > 0.0 || anti_her2_prev > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_band_edges() {
        assert_eq!(age_band(49.999), Some("<50"));
        assert_eq!(age_band(59.999), Some("50-59"));
        assert_eq!(age_band(60.0), Some("60-69"));
        assert_eq!(age_band(69.999), Some("60-69"));
        assert_eq!(age_band(70.0), Some(">=70"));
    }

    #[test]
    fn therapy_groups_cover_all_combinations() {
        assert_eq!(therapy_group(0.0, 0.0), "none");
        assert_eq!(therapy_group(1.0, 0.0), "AC_only");
        assert_eq!(therapy_group(0.0, 1.0), "antiHER2_only");
        assert_eq!(therapy_group(1.0, 1.0), "AC_plus_antiHER2");
        // Missing flags fall back to not-treated.
        assert_eq!(therapy_group(f64::NAN, f64::NAN), "none");
    }

    #[test]
    fn prev_therapy_any_treats_nan_as_absent() {
        assert!((prev_therapy_any(1.0, f64::NAN) - 1.0).abs() < f64::EPSILON);
        assert!(prev_therapy_any(f64::NAN, f64::NAN).abs() < f64::EPSILON);
        assert!(prev_therapy_any(0.0, 0.0).abs() < f64::EPSILON);
    }
}
