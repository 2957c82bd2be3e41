use std::{fs, path::PathBuf};

use anyhow::Context;
use ctrcd_dataset::{ClinicalField, clean, ingest};

use crate::util::csv_cell;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExportPatientsArg {
    /// Path to the raw clinical variables CSV
    #[arg(long)]
    input: PathBuf,
    /// Directory for the per-patient CSV files
    #[arg(long)]
    outdir: PathBuf,
    /// Filename prefix for patient files
    #[arg(long, default_value = "patient")]
    prefix: String,
}

pub(crate) fn run(arg: &ExportPatientsArg) -> anyhow::Result<()> {
    let ExportPatientsArg {
        input,
        outdir,
        prefix,
    } = arg;

    let mut table = ingest::read_clinical_csv(input)
        .with_context(|| format!("Failed to read clinical CSV: {}", input.display()))?;
    // Flags outside {0,1} are noise for downstream consumers; measurement
    // columns are exported as-is.
    clean::restrict_binary_domains(&mut table);

    fs::create_dir_all(outdir)
        .with_context(|| format!("Failed to create output directory: {}", outdir.display()))?;

    let header: Vec<&str> = ClinicalField::BASE_INPUTS.iter().map(|f| f.name()).collect();
    let mut index = csv::Writer::from_path(outdir.join("index.csv"))
        .context("Failed to create index.csv")?;
    index.write_record(["row_index", "file"])?;

    for row in 0..table.num_rows() {
        let file_name = format!("{prefix}_{:04}.csv", row + 1);
        let path = outdir.join(&file_name);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(&header)?;
        writer.write_record(
            ClinicalField::BASE_INPUTS
                .iter()
                .map(|&field| csv_cell(table.value(field, row))),
        )?;
        writer.flush()?;

        index.write_record([row.to_string(), file_name])?;
    }
    index.flush()?;

    eprintln!(
        "[ok] Exported {} patient CSV files to: {}",
        table.num_rows(),
        outdir.display()
    );
    eprintln!("[ok] Index saved at: {}", outdir.join("index.csv").display());
    Ok(())
}
