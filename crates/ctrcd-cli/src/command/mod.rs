use clap::{Parser, Subcommand};

use self::{
    analyze::AnalyzeArg, export_patients::ExportPatientsArg, preprocess::PreprocessArg,
    serve::ServeArg,
};

mod analyze;
mod export_patients;
mod preprocess;
mod serve;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Clean a raw clinical CSV and export the derived patient table
    Preprocess(#[clap(flatten)] PreprocessArg),
    /// Export each patient as a standalone CSV plus an index
    ExportPatients(#[clap(flatten)] ExportPatientsArg),
    /// Fit the odds-ratio model and the classifier bank, then evaluate
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Serve the persisted best model over HTTP
    Serve(#[clap(flatten)] ServeArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Preprocess(arg) => preprocess::run(&arg)?,
        Mode::ExportPatients(arg) => export_patients::run(&arg)?,
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Serve(arg) => serve::run(&arg)?,
    }
    Ok(())
}
