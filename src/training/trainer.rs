//! Model training on processed splits

use crate::error::{ErrorContext, PipelineError, Result};
use crate::utils::frame::{column_names, column_to_i64, feature_matrix, require_columns};
use super::models::ModelMetrics;
use super::random_forest::RandomForest;
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// A fitted model together with the column layout it expects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub label_column: String,
    pub model: RandomForest,
}

impl ModelArtifact {
    /// Predict labels for a table holding at least the artifact's features
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<i64>> {
        let x = feature_matrix(df, &self.feature_names)?;
        self.model.predict(&x)
    }

    /// Write the artifact as JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        write_json(self, path).with_context(|| format!("saving model to {}", path.display()))?;
        info!(path = %path.display(), "Model saved");
        Ok(())
    }

    /// Load an artifact written by [`ModelArtifact::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("opening model {}", path.display()))?;
        let artifact = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("decoding model {}", path.display()))?;
        Ok(artifact)
    }
}

/// Serialize `value` as pretty JSON to `path`
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

/// Trains a model on the processed train split and scores it on the test split
pub trait ModelTrainer {
    fn train(&self, train: &DataFrame, test: &DataFrame) -> Result<(ModelArtifact, ModelMetrics)>;
}

/// Random forest classifier trainer
#[derive(Debug, Clone)]
pub struct ForestTrainer {
    label_column: String,
    n_estimators: usize,
    random_state: u64,
    max_depth: Option<usize>,
}

impl ForestTrainer {
    pub fn new(label_column: impl Into<String>) -> Self {
        Self {
            label_column: label_column.into(),
            n_estimators: 100,
            random_state: 42,
            max_depth: None,
        }
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    fn split_label(&self, df: &DataFrame) -> Result<(Vec<String>, Array1<i64>)> {
        require_columns(df, &[self.label_column.as_str()])?;
        let features: Vec<String> = column_names(df)
            .into_iter()
            .filter(|c| *c != self.label_column)
            .collect();
        let y = Array1::from_vec(column_to_i64(df, &self.label_column)?);
        Ok((features, y))
    }
}

impl ModelTrainer for ForestTrainer {
    fn train(&self, train: &DataFrame, test: &DataFrame) -> Result<(ModelArtifact, ModelMetrics)> {
        info!("Starting model training");
        let start = Instant::now();

        let (features, y_train) = self.split_label(train).context("reading train split")?;
        if features.is_empty() {
            return Err(PipelineError::ShapeError {
                expected: "at least one feature column".to_string(),
                actual: "label column only".to_string(),
            });
        }
        let x_train = feature_matrix(train, &features).context("reading train split")?;

        let mut model = RandomForest::new(self.n_estimators).with_random_state(self.random_state);
        if let Some(depth) = self.max_depth {
            model = model.with_max_depth(depth);
        }
        model.fit(&x_train, &y_train).context("fitting random forest")?;
        let training_time = start.elapsed().as_secs_f64();

        let artifact = ModelArtifact {
            feature_names: features,
            label_column: self.label_column.clone(),
            model,
        };

        let (_, y_test) = self.split_label(test).context("reading test split")?;
        let y_pred = artifact.predict(test).context("scoring test split")?;

        let mut metrics = ModelMetrics::compute_classification(&y_test, &y_pred);
        metrics.training_time_secs = training_time;
        metrics.n_features = artifact.feature_names.len();

        info!(
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1 = metrics.f1_score,
            training_time_secs = training_time,
            "Model evaluated on test split"
        );

        Ok((artifact, metrics))
    }
}
