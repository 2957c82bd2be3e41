use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use ctrcd_dataset::{ClinicalField, ingest};
use ctrcd_features::{
    derive::{self, COMORBIDITY_FIELDS},
    matrix,
};
use ctrcd_model::artifact::ModelArtifact;

/// Decision threshold applied when the request does not override it.
const DEFAULT_THRESHOLD: f64 = 0.30;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ServeArg {
    /// Directory holding model.json from a previous analyze run
    #[arg(long)]
    model_dir: PathBuf,
    /// Socket address to listen on
    #[arg(long, default_value = "127.0.0.1:8000")]
    addr: String,
}

struct AppState {
    artifact: ModelArtifact,
}

#[derive(Debug, Deserialize)]
struct PredictPayload {
    /// Raw clinical fields; unknown keys are ignored, bad values become
    /// missing.
    #[serde(default)]
    data: Map<String, Value>,
    /// Optional per-request decision threshold.
    threshold: Option<f64>,
}

pub(crate) fn run(arg: &ServeArg) -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let model_path = arg.model_dir.join("model.json");
    let artifact = ModelArtifact::open(&model_path)
        .with_context(|| format!("Failed to load model artifact: {}", model_path.display()))?;
    tracing::info!(
        model = %artifact.name,
        features = artifact.features.len(),
        "model loaded"
    );
    let state = Arc::new(AppState { artifact });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(serve(arg.addr.clone(), state))
}

async fn serve(addr: String, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("CTRCD risk service listening on {addr}");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "features": state.artifact.features.len(),
    }))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PredictPayload>,
) -> Json<Value> {
    let values = coerce_fields(&payload.data);
    let row = matrix::derive_row_named(
        |field| values.get(&field).copied().unwrap_or(f64::NAN),
        &state.artifact.features,
    );
    let prob = state.artifact.pipeline.predict_proba_row(&row);
    let threshold = payload.threshold.unwrap_or(DEFAULT_THRESHOLD);
    let pred = i32::from(prob >= threshold);
    tracing::debug!(prob, threshold, pred, "scored request");

    Json(json!({
        "prob": prob,
        "pred": pred,
        "threshold": threshold,
        "echo": echo_fields(&values),
        "feature_count": state.artifact.features.len(),
    }))
}

/// Coerces known payload fields to numbers; everything unparseable is
/// dropped and later treated as missing.
fn coerce_fields(data: &Map<String, Value>) -> BTreeMap<ClinicalField, f64> {
    let mut values = BTreeMap::new();
    for (key, value) in data {
        let Some(field) = ClinicalField::from_header(key) else {
            continue;
        };
        let number = json_to_f64(value);
        if !number.is_nan() {
            values.entry(field).or_insert(number);
        }
    }
    values
}

/// Tolerant JSON-to-number coercion, matching the CSV reader's rules for
/// strings.
fn json_to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => ingest::coerce_numeric(text),
        Value::Bool(flag) => f64::from(u8::from(*flag)),
        _ => f64::NAN,
    }
}

/// The human-facing echo block: the inputs a clinician sanity-checks.
fn echo_fields(values: &BTreeMap<ClinicalField, f64>) -> Value {
    let get = |field: ClinicalField| values.get(&field).copied().unwrap_or(f64::NAN);
    let bmi = derive::bmi(get(ClinicalField::Weight), get(ClinicalField::Height));
    let score = derive::comorbidity_score(COMORBIDITY_FIELDS.iter().map(|&f| get(f)));
    json!({
        "LVEF": get(ClinicalField::Lvef),
        "BMI": bmi,
        "comorbidity_score": score,
    })
}
