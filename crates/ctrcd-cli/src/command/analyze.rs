use std::{fs, path::PathBuf};

use anyhow::Context;
use chrono::Utc;

use ctrcd_analysis::or_table::{self, OddsRatioTable};
use ctrcd_dataset::{clean, ingest};
use ctrcd_evaluator::{metrics, plot, report};
use ctrcd_features::matrix;
use ctrcd_model::{
    artifact::ModelArtifact, forest::ForestTrainer, gbdt::GbdtTrainer, logistic::LogisticTrainer,
    pipeline::ModelPipeline, split,
};

/// Held-out fraction of the stratified split.
const TEST_FRACTION: f64 = 0.2;
/// Seed shared by the split and every randomized trainer.
const SEED: u64 = 42;
/// Fixed reporting threshold.
const FIXED_THRESHOLD: f64 = 0.5;

const FOREST_TREES: usize = 300;
const FOREST_MAX_DEPTH: usize = 8;

const BOOSTING_ROUNDS: usize = 200;
const BOOSTING_LEARNING_RATE: f64 = 0.1;
const BOOSTING_MAX_DEPTH: usize = 3;
const BOOSTING_MAX_BINS: usize = 256;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AnalyzeArg {
    /// Path to the raw clinical variables CSV
    #[arg(long)]
    input: PathBuf,
    /// Directory to save models, metrics, plots, and tables
    #[arg(long)]
    outdir: PathBuf,
}

struct EvaluatedModel {
    pipeline: ModelPipeline,
    roc_auc: f64,
    pr_auc: f64,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let AnalyzeArg { input, outdir } = arg;
    fs::create_dir_all(outdir)
        .with_context(|| format!("Failed to create output directory: {}", outdir.display()))?;

    let mut table = ingest::read_clinical_csv(input)
        .with_context(|| format!("Failed to read clinical CSV: {}", input.display()))?;
    clean::clean_table(&mut table);

    let (features, labels) = matrix::build_training_data(&table)?;
    let events = labels.iter().filter(|&&y| y == 1.0).count();
    eprintln!(
        "Loaded {} labeled patients, {} features, {} CTRCD events",
        features.num_rows(),
        features.num_features(),
        events
    );
    anyhow::ensure!(
        events > 0 && events < features.num_rows(),
        "need both outcome classes to fit classifiers (got {events} events in {} rows)",
        features.num_rows()
    );

    let split = split::stratified_split(&labels, TEST_FRACTION, SEED);
    let train = features.select_rows(&split.train);
    let test = features.select_rows(&split.test);
    let train_labels: Vec<f64> = split.train.iter().map(|&i| labels[i]).collect();
    let test_labels: Vec<f64> = split.test.iter().map(|&i| labels[i]).collect();
    eprintln!(
        "Split {} train / {} test (stratified, seed {SEED})",
        train.num_rows(),
        test.num_rows()
    );

    eprintln!("Fitting maximum-likelihood logit for the odds-ratio table...");
    let or_table =
        or_table::fit_odds_ratio_table(features.names(), train.rows(), &train_labels)?;
    for dropped in &or_table.dropped_columns {
        eprintln!("[warn] Dropped near-constant column: {dropped}");
    }
    if or_table.reduced {
        eprintln!("[warn] Full logit failed; refit on the leading features only");
    }
    write_or_table(&or_table, &outdir.join("or_table.csv"))?;
    print_or_head(&or_table);

    eprintln!("Training the model bank...");
    let lvef_index = features
        .names()
        .iter()
        .position(|name| name == "LVEF")
        .context("LVEF column missing from the feature matrix")?;

    let logistic = ModelPipeline::fit_logistic(
        "logreg",
        train.rows(),
        &train_labels,
        &LogisticTrainer::default(),
    )
    .context("logistic regression training failed")?;

    let forest_trainer = ForestTrainer {
        n_trees: FOREST_TREES,
        max_depth: FOREST_MAX_DEPTH,
        seed: SEED,
        ..ForestTrainer::default()
    };
    let forest = ModelPipeline::fit_forest("random_forest", train.rows(), &train_labels, &forest_trainer);

    let hist_trainer = GbdtTrainer {
        n_rounds: BOOSTING_ROUNDS,
        learning_rate: BOOSTING_LEARNING_RATE,
        max_depth: BOOSTING_MAX_DEPTH,
        max_bins: Some(BOOSTING_MAX_BINS),
        // Higher LVEF must never raise the predicted risk.
        monotone_decreasing: vec![lvef_index],
        seed: SEED,
        ..GbdtTrainer::default()
    };
    let histgbdt = ModelPipeline::fit_gbdt("histgbdt", train.rows(), &train_labels, &hist_trainer);

    let weighted_trainer = GbdtTrainer {
        n_rounds: BOOSTING_ROUNDS,
        learning_rate: BOOSTING_LEARNING_RATE,
        max_depth: BOOSTING_MAX_DEPTH,
        max_bins: None,
        auto_pos_weight: true,
        subsample: 0.8,
        seed: SEED,
        ..GbdtTrainer::default()
    };
    let weighted =
        ModelPipeline::fit_gbdt("gbdt_weighted", train.rows(), &train_labels, &weighted_trainer);

    let mut evaluated = Vec::new();
    for pipeline in [logistic, forest, histgbdt, weighted] {
        let result = evaluate_model(pipeline, test.rows(), &test_labels, outdir)?;
        evaluated.push(result);
    }

    eprintln!();
    eprintln!("Held-out comparison:");
    for model in &evaluated {
        eprintln!(
            "  {:<14} ROC-AUC={:.3}  PR-AUC={:.3}",
            model.pipeline.name(),
            model.roc_auc,
            model.pr_auc
        );
    }

    let best = evaluated
        .into_iter()
        .reduce(|best, candidate| {
            let better = (candidate.roc_auc, candidate.pr_auc) > (best.roc_auc, best.pr_auc);
            if better { candidate } else { best }
        })
        .context("no model was trained")?;

    let artifact = ModelArtifact {
        name: best.pipeline.name().to_owned(),
        trained_at: Utc::now(),
        roc_auc: best.roc_auc,
        features: features.names().to_vec(),
        pipeline: best.pipeline,
    };
    let model_path = outdir.join("model.json");
    artifact.save(&model_path)?;

    let features_path = outdir.join("model_features.txt");
    fs::write(&features_path, features.names().join("\n") + "\n")
        .with_context(|| format!("Failed to write {}", features_path.display()))?;

    eprintln!();
    eprintln!("Best model: {} (ROC-AUC {:.3})", artifact.name, artifact.roc_auc);
    eprintln!("  Model:    {}", model_path.display());
    eprintln!("  Features: {}", features_path.display());
    eprintln!("Risk bands: p<0.10 low; 0.10-0.25 medium; >0.25 high (recalibrate as needed)");

    Ok(())
}

/// Scores one pipeline on the held-out rows and persists its report and
/// figure.
fn evaluate_model(
    pipeline: ModelPipeline,
    test_rows: &[Vec<f64>],
    test_labels: &[f64],
    outdir: &std::path::Path,
) -> anyhow::Result<EvaluatedModel> {
    let name = pipeline.name().to_owned();
    let probs = pipeline.predict_proba(test_rows);

    let roc = metrics::roc_curve(test_labels, &probs);
    let roc_auc = metrics::roc_auc(test_labels, &probs);
    let pr = metrics::pr_curve(test_labels, &probs);
    let pr_auc = metrics::average_precision(test_labels, &probs);

    let fixed = report::classification_report(test_labels, &probs, FIXED_THRESHOLD);
    let mut text = format!("ROC-AUC: {roc_auc:.4}\nPR-AUC: {pr_auc:.4}\n\n{fixed}");
    if let Some(best) = metrics::best_f1_threshold(test_labels, &probs) {
        let tuned = report::classification_report(test_labels, &probs, best.threshold);
        text.push_str(&format!("\nbest-F1 operating point (F1={:.3}):\n{tuned}", best.f1));
    }

    let metrics_path = outdir.join(format!("metrics_{name}.txt"));
    fs::write(&metrics_path, text)
        .with_context(|| format!("Failed to write {}", metrics_path.display()))?;

    let plot_path = outdir.join(format!("roc_pr_{name}.svg"));
    plot::save_roc_pr_svg(&plot_path, &roc, roc_auc, &pr, pr_auc)?;

    eprintln!("  {name}: metrics -> {}", metrics_path.display());
    Ok(EvaluatedModel {
        pipeline,
        roc_auc,
        pr_auc,
    })
}

fn write_or_table(table: &OddsRatioTable, path: &std::path::Path) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(["feature", "OR", "CI_low", "CI_high", "p_value"])?;
    for row in &table.rows {
        writer.write_record([
            row.feature.clone(),
            row.odds_ratio.to_string(),
            row.ci_low.to_string(),
            row.ci_high.to_string(),
            row.p_value.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_or_head(table: &OddsRatioTable) {
    eprintln!();
    eprintln!("=== OR table (first rows) ===");
    eprintln!(
        "{:<22} {:>10} {:>10} {:>10} {:>10}",
        "feature", "OR", "CI_low", "CI_high", "p"
    );
    for row in table.rows.iter().take(6) {
        eprintln!(
            "{:<22} {:>10.3} {:>10.3} {:>10.3} {:>10.4}",
            row.feature, row.odds_ratio, row.ci_low, row.ci_high, row.p_value
        );
    }
}
