use std::path::PathBuf;

use anyhow::Context;
use ctrcd_dataset::{ClinicalField, clean, ingest};
use ctrcd_features::{
    derive::{self, COMORBIDITY_FIELDS},
    export,
};

use crate::util::{Output, csv_cell};

/// Columns of the cleaned patient table, in output order.
const EXPORT_HEADER: [&str; 18] = [
    "patient_id",
    "age",
    "age_band",
    "weight",
    "height",
    "BMI",
    "LVEF",
    "heart_rate",
    "heart_rhythm",
    "PWT",
    "LAd",
    "LVDd",
    "LVSd",
    "therapy_group",
    "prev_therapy_any",
    "comorbidity_score",
    "CTRCD",
    "time",
];

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PreprocessArg {
    /// Path to the raw clinical variables CSV
    #[arg(long)]
    input: PathBuf,
    /// Path for the cleaned CSV (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PreprocessArg) -> anyhow::Result<()> {
    let PreprocessArg { input, output } = arg;

    let mut table = ingest::read_clinical_csv(input)
        .with_context(|| format!("Failed to read clinical CSV: {}", input.display()))?;
    clean::clean_table(&mut table);

    let output = Output::from_output_path(output.clone())?;
    let destination = output.display_path();
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(EXPORT_HEADER)?;

    for row in 0..table.num_rows() {
        let value = |field| table.value(field, row);
        let age = value(ClinicalField::Age);
        let bmi = derive::bmi(value(ClinicalField::Weight), value(ClinicalField::Height));
        let score = derive::comorbidity_score(COMORBIDITY_FIELDS.iter().map(|&f| value(f)));

        writer.write_record([
            (row + 1).to_string(),
            csv_cell(age),
            export::age_band(age).unwrap_or_default().to_owned(),
            csv_cell(value(ClinicalField::Weight)),
            csv_cell(value(ClinicalField::Height)),
            csv_cell(bmi),
            csv_cell(value(ClinicalField::Lvef)),
            csv_cell(value(ClinicalField::HeartRate)),
            csv_cell(value(ClinicalField::HeartRhythm)),
            csv_cell(value(ClinicalField::Pwt)),
            csv_cell(value(ClinicalField::Lad)),
            csv_cell(value(ClinicalField::Lvdd)),
            csv_cell(value(ClinicalField::Lvsd)),
            export::therapy_group(
                value(ClinicalField::Ac),
                value(ClinicalField::AntiHer2),
            )
            .to_owned(),
            csv_cell(export::prev_therapy_any(
                value(ClinicalField::AcPrev),
                value(ClinicalField::AntiHer2Prev),
            )),
            csv_cell(score),
            csv_cell(value(ClinicalField::Ctrcd)),
            csv_cell(value(ClinicalField::Time)),
        ])?;
    }
    writer.flush()?;

    eprintln!("[ok] Saved cleaned table -> {destination}");
    eprintln!("[ok] {} patients", table.num_rows());
    Ok(())
}
