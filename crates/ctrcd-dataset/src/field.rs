//! Vocabulary of expected clinical columns.
//!
//! Each [`ClinicalField`] knows its canonical CSV header, the header aliases
//! seen in site exports, its plausible measurement range, and whether its
//! domain is restricted to {0, 1}.

/// A clinical variable expected in the source CSV.
///
/// The order of [`ClinicalField::ALL`] is the canonical column order used
/// when a cleaned table is written back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClinicalField {
    /// Age at treatment start, years.
    Age,
    /// Body weight, kg.
    Weight,
    /// Body height, cm.
    Height,
    /// Cancer therapy-related cardiac dysfunction outcome (binary).
    Ctrcd,
    /// Follow-up time, days.
    Time,
    /// Left ventricular ejection fraction, percent.
    Lvef,
    /// Resting heart rate, bpm.
    HeartRate,
    /// Abnormal heart rhythm flag.
    HeartRhythm,
    /// Posterior wall thickness, cm.
    Pwt,
    /// Left atrial diameter, cm.
    Lad,
    /// Left ventricular diastolic diameter, cm.
    Lvdd,
    /// Left ventricular systolic diameter, cm.
    Lvsd,
    /// Anthracycline treatment flag.
    Ac,
    /// Anti-HER2 treatment flag.
    AntiHer2,
    /// Previous anthracycline exposure flag.
    AcPrev,
    /// Previous anti-HER2 exposure flag.
    AntiHer2Prev,
    /// Hypertension flag.
    Hta,
    /// Dyslipidemia flag.
    Dl,
    /// Diabetes mellitus flag.
    Dm,
    /// Current smoker flag.
    Smoker,
    /// Former smoker flag.
    ExSmoker,
    /// Previous thorax radiotherapy flag.
    RtPrev,
    /// Previous cardiac insufficiency flag.
    CiPrev,
    /// Previous ischemic cardiomyopathy flag.
    IcmPrev,
    /// Previous arrhythmia flag.
    ArrPrev,
    /// Previous valvulopathy flag.
    ValvPrev,
    /// Previous valve surgery flag.
    CxValv,
}

impl ClinicalField {
    /// All expected fields, in canonical column order.
    pub const ALL: [ClinicalField; 27] = [
        Self::Age,
        Self::Weight,
        Self::Height,
        Self::Ctrcd,
        Self::Time,
        Self::Lvef,
        Self::HeartRate,
        Self::HeartRhythm,
        Self::Pwt,
        Self::Lad,
        Self::Lvdd,
        Self::Lvsd,
        Self::Ac,
        Self::AntiHer2,
        Self::AcPrev,
        Self::AntiHer2Prev,
        Self::Hta,
        Self::Dl,
        Self::Dm,
        Self::Smoker,
        Self::ExSmoker,
        Self::RtPrev,
        Self::CiPrev,
        Self::IcmPrev,
        Self::ArrPrev,
        Self::ValvPrev,
        Self::CxValv,
    ];

    /// Patient-level input fields accepted by the prediction endpoint.
    ///
    /// Everything except the outcome and the follow-up time.
    pub const BASE_INPUTS: [ClinicalField; 25] = [
        Self::Age,
        Self::Weight,
        Self::Height,
        Self::Lvef,
        Self::HeartRate,
        Self::HeartRhythm,
        Self::Pwt,
        Self::Lad,
        Self::Lvdd,
        Self::Lvsd,
        Self::Ac,
        Self::AntiHer2,
        Self::AcPrev,
        Self::AntiHer2Prev,
        Self::Hta,
        Self::Dl,
        Self::Dm,
        Self::Smoker,
        Self::ExSmoker,
        Self::RtPrev,
        Self::CiPrev,
        Self::IcmPrev,
        Self::ArrPrev,
        Self::ValvPrev,
        Self::CxValv,
    ];

    /// Canonical CSV header for this field.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Weight => "weight",
            Self::Height => "height",
            Self::Ctrcd => "CTRCD",
            Self::Time => "time",
            Self::Lvef => "LVEF",
            Self::HeartRate => "heart_rate",
            Self::HeartRhythm => "heart_rhythm",
            Self::Pwt => "PWT",
            Self::Lad => "LAd",
            Self::Lvdd => "LVDd",
            Self::Lvsd => "LVSd",
            Self::Ac => "AC",
            Self::AntiHer2 => "antiHER2",
            Self::AcPrev => "ACprev",
            Self::AntiHer2Prev => "antiHER2prev",
            Self::Hta => "HTA",
            Self::Dl => "DL",
            Self::Dm => "DM",
            Self::Smoker => "smoker",
            Self::ExSmoker => "exsmoker",
            Self::RtPrev => "RTprev",
            Self::CiPrev => "CIprev",
            Self::IcmPrev => "ICMprev",
            Self::ArrPrev => "ARRprev",
            Self::ValvPrev => "VALVprev",
            Self::CxValv => "cxvalv",
        }
    }

    /// Header aliases seen in site exports, beyond the canonical name.
    #[must_use]
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Lvef => &["lvef"],
            Self::HeartRate => &["hr", "heart rate"],
            Self::HeartRhythm => &["rhythm", "heart rhythm"],
            Self::Pwt => &["posterior wall thickness"],
            Self::Lad => &["left atrial diameter", "la_d"],
            Self::Lvdd => &["lvdd", "left ventricular diastolic diameter"],
            Self::Lvsd => &["lvsd", "left ventricular systolic diameter"],
            Self::Ac => &["anthracyclines", "anthracycline"],
            Self::AntiHer2 => &["anti-her2", "anti_her2", "trastuzumab"],
            Self::AcPrev => &["prev_ac", "previous anthracyclines"],
            Self::AntiHer2Prev => &["prev_antiher2", "previous anti-her2"],
            Self::Hta => &["hypertension"],
            Self::Dl => &["dyslipidemia", "hyperlipidemia"],
            Self::Dm => &["diabetes", "diabetes mellitus"],
            Self::Smoker => &["current_smoker"],
            Self::ExSmoker => &["former_smoker"],
            Self::RtPrev => &["previous thorax radiotherapy", "thorax_rt_prev"],
            Self::CiPrev => &["cardiac insufficiency prev", "hf_prev", "heart failure prev"],
            Self::IcmPrev => &["ischemic cardiomyopathy prev", "cad_prev"],
            Self::ArrPrev => &["arrhythmia prev"],
            Self::ValvPrev => &["valvulopathy prev"],
            Self::CxValv => &["valve surgery prev", "prev valve surgery"],
            _ => &[],
        }
    }

    /// Plausible measurement range, inclusive. `None` for flags.
    ///
    /// Values outside this range are implausible for the clinical context
    /// and are treated as missing, never clipped.
    #[must_use]
    pub fn plausible_range(self) -> Option<(f64, f64)> {
        match self {
            Self::Age => Some((18.0, 95.0)),
            Self::Weight => Some((30.0, 200.0)),
            Self::Height => Some((120.0, 210.0)),
            Self::Lvef => Some((10.0, 80.0)),
            Self::HeartRate => Some((30.0, 220.0)),
            Self::Pwt => Some((0.5, 2.5)),
            Self::Lad => Some((2.0, 6.0)),
            Self::Lvdd => Some((3.0, 7.5)),
            Self::Lvsd => Some((2.0, 6.0)),
            Self::Time => Some((0.0, 5000.0)),
            _ => None,
        }
    }

    /// Whether the field's domain is restricted to {0, 1}.
    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Self::Ctrcd
                | Self::HeartRhythm
                | Self::Ac
                | Self::AntiHer2
                | Self::AcPrev
                | Self::AntiHer2Prev
                | Self::Hta
                | Self::Dl
                | Self::Dm
                | Self::Smoker
                | Self::ExSmoker
                | Self::RtPrev
                | Self::CiPrev
                | Self::IcmPrev
                | Self::ArrPrev
                | Self::ValvPrev
                | Self::CxValv
        )
    }

    /// Matches a raw CSV header against the canonical name and aliases.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace and
    /// embedded line breaks.
    ///
    /// # Examples
    ///
    /// ```
    /// use ctrcd_dataset::field::ClinicalField;
    ///
    /// assert_eq!(ClinicalField::from_header("LVEF"), Some(ClinicalField::Lvef));
    /// assert_eq!(ClinicalField::from_header(" trastuzumab "), Some(ClinicalField::AntiHer2));
    /// assert_eq!(ClinicalField::from_header("biopsy_id"), None);
    /// ```
    #[must_use]
    pub fn from_header(header: &str) -> Option<Self> {
        let normalized = normalize_header(header);
        Self::ALL.into_iter().find(|field| {
            normalize_header(field.name()) == normalized
                || field
                    .aliases()
                    .iter()
                    .any(|alias| normalize_header(alias) == normalized)
        })
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip() {
        for field in ClinicalField::ALL {
            assert_eq!(ClinicalField::from_header(field.name()), Some(field));
        }
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(
            ClinicalField::from_header("Heart Rate"),
            Some(ClinicalField::HeartRate)
        );
        assert_eq!(
            ClinicalField::from_header("diabetes mellitus"),
            Some(ClinicalField::Dm)
        );
        assert_eq!(
            ClinicalField::from_header("prev valve surgery"),
            Some(ClinicalField::CxValv)
        );
    }

    #[test]
    fn unknown_headers_are_rejected() {
        assert_eq!(ClinicalField::from_header("tumor_grade"), None);
        assert_eq!(ClinicalField::from_header(""), None);
    }

    #[test]
    fn binary_fields_have_no_range() {
        for field in ClinicalField::ALL {
            if field.is_binary() {
                assert_eq!(field.plausible_range(), None, "{}", field.name());
            }
        }
    }

    #[test]
    fn base_inputs_exclude_outcome_and_time() {
        assert!(!ClinicalField::BASE_INPUTS.contains(&ClinicalField::Ctrcd));
        assert!(!ClinicalField::BASE_INPUTS.contains(&ClinicalField::Time));
        assert_eq!(ClinicalField::BASE_INPUTS.len(), ClinicalField::ALL.len() - 2);
    }
}
