//! Persisted model artifact.
//!
//! The artifact is a pretty-printed JSON document pairing the winning
//! pipeline with the ordered feature-name list it was trained on. The
//! feature order is the inference contract: the serving shim assembles its
//! input row by walking this list, never by guessing from the current code.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::ModelPipeline;

/// Error from reading or writing a model artifact.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ArtifactError {
    /// The artifact file could not be opened or created.
    #[display("failed to open model artifact {path}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    /// The artifact file is not valid JSON for this schema.
    #[display("failed to parse model artifact {path}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// A persisted best model with its training metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Pipeline name, e.g. `"histgbdt"`.
    pub name: String,
    /// When training finished.
    pub trained_at: DateTime<Utc>,
    /// Held-out ROC-AUC at selection time.
    pub roc_auc: f64,
    /// Ordered feature names; the inference row contract.
    pub features: Vec<String>,
    /// The fitted pipeline.
    pub pipeline: ModelPipeline,
}

impl ModelArtifact {
    /// Loads an artifact from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or parsed.
    pub fn open<P>(path: P) -> Result<Self, ArtifactError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Writes the artifact as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created or written.
    pub fn save<P>(&self, path: P) -> Result<(), ArtifactError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|source| {
            ArtifactError::Parse {
                path: path.display().to_string(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::forest::ForestTrainer;

    fn tiny_artifact() -> ModelArtifact {
        let rows = vec![vec![0.0], vec![1.0], vec![0.1], vec![0.9]];
        let labels = vec![0.0, 1.0, 0.0, 1.0];
        let trainer = ForestTrainer {
            n_trees: 3,
            min_samples_leaf: 1,
            ..ForestTrainer::default()
        };
        ModelArtifact {
            name: "random_forest".to_owned(),
            trained_at: Utc::now(),
            roc_auc: 0.87,
            features: vec!["age".to_owned()],
            pipeline: ModelPipeline::fit_forest("random_forest", &rows, &labels, &trainer),
        }
    }

    #[test]
    fn save_and_open_round_trip() {
        let artifact = tiny_artifact();
        let dir = std::env::temp_dir().join("ctrcd-artifact-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model.json");

        artifact.save(&path).unwrap();
        let restored = ModelArtifact::open(&path).unwrap();
        assert_eq!(restored.name, "random_forest");
        assert_eq!(restored.features, artifact.features);
        let row = [0.8];
        assert!(
            (restored.pipeline.predict_proba_row(&row)
                - artifact.pipeline.predict_proba_row(&row))
            .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = ModelArtifact::open("/nonexistent/ctrcd/model.json").unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }
}
