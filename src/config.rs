//! Pipeline configuration
//!
//! The whole pipeline is driven by one YAML document, loaded once at startup
//! into [`PipelineConfig`] and handed by reference to each stage.

use crate::error::{ErrorContext, PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default location of the configuration document
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Where the raw object is fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Google Cloud Storage over HTTPS
    #[default]
    Gcs,
    /// A local directory laid out as `{root}/{bucket}/{object}`
    Local,
}

/// Ingestion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    pub bucket_name: String,
    pub bucket_file_name: String,
    /// Share of rows that go to the train split
    pub train_ratio: f64,
    /// File holding a bearer token for the storage API
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
    #[serde(default)]
    pub storage_backend: StorageBackend,
    #[serde(default)]
    pub local_storage_root: Option<PathBuf>,
}

/// Preprocessing, balancing and feature selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub categorical_columns: Vec<String>,
    pub numerical_columns: Vec<String>,
    pub skewness_threshold: f64,
    /// Number of features kept by the selector
    pub no_of_features: usize,
    #[serde(default = "default_target_column")]
    pub target_column: String,
    /// Row identifier columns, dropped before anything else
    #[serde(default = "default_id_columns")]
    pub id_columns: Vec<String>,
    #[serde(default = "default_k_neighbors")]
    pub smote_k_neighbors: usize,
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default = "default_random_state")]
    pub random_state: u64,
}

fn default_target_column() -> String {
    "booking_status".to_string()
}

fn default_id_columns() -> Vec<String> {
    vec!["Booking_ID".to_string()]
}

fn default_k_neighbors() -> usize {
    5
}

fn default_n_estimators() -> usize {
    100
}

fn default_random_state() -> u64 {
    42
}

/// Artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("artifacts/raw")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("artifacts/processed")
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("artifacts/models")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
            model_dir: default_model_dir(),
        }
    }
}

impl PathsConfig {
    /// Paths rooted at a single artifacts directory
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            raw_dir: root.join("raw"),
            processed_dir: root.join("processed"),
            model_dir: root.join("models"),
        }
    }

    pub fn raw_file(&self) -> PathBuf {
        self.raw_dir.join("raw.csv")
    }

    pub fn train_file(&self) -> PathBuf {
        self.raw_dir.join("train.csv")
    }

    pub fn test_file(&self) -> PathBuf {
        self.raw_dir.join("test.csv")
    }

    pub fn processed_train_file(&self) -> PathBuf {
        self.processed_dir.join("processed_train.csv")
    }

    pub fn processed_test_file(&self) -> PathBuf {
        self.processed_dir.join("processed_test.csv")
    }

    pub fn model_file(&self) -> PathBuf {
        self.model_dir.join("model.json")
    }

    pub fn metrics_file(&self) -> PathBuf {
        self.model_dir.join("metrics.json")
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data_ingestion: IngestionConfig,
    pub data_processing: ProcessingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

impl PipelineConfig {
    /// Load and validate a configuration document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::ConfigError(format!(
                "config file {} does not exist",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_yaml_str(&text)
            .with_context(|| format!("loading config {}", path.display()))?;

        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Parse and validate a configuration document
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges serde cannot express
    pub fn validate(&self) -> Result<()> {
        let ingestion = &self.data_ingestion;
        if !(ingestion.train_ratio > 0.0 && ingestion.train_ratio < 1.0) {
            return Err(PipelineError::ConfigError(format!(
                "train_ratio must be in (0, 1), got {}",
                ingestion.train_ratio
            )));
        }
        if ingestion.storage_backend == StorageBackend::Local
            && ingestion.local_storage_root.is_none()
        {
            return Err(PipelineError::ConfigError(
                "local_storage_root is required when storage_backend is local".to_string(),
            ));
        }

        let processing = &self.data_processing;
        if !processing.skewness_threshold.is_finite() {
            return Err(PipelineError::ConfigError(
                "skewness_threshold must be a finite number".to_string(),
            ));
        }
        if processing.smote_k_neighbors == 0 {
            return Err(PipelineError::ConfigError(
                "smote_k_neighbors must be at least 1".to_string(),
            ));
        }
        if processing.n_estimators == 0 {
            return Err(PipelineError::ConfigError(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if processing.target_column.is_empty() {
            return Err(PipelineError::ConfigError(
                "target_column must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const SAMPLE: &str = r#"
data_ingestion:
  bucket_name: reservations
  bucket_file_name: Hotel_Reservations.csv
  train_ratio: 0.8
data_processing:
  categorical_columns: [type_of_meal_plan, booking_status]
  numerical_columns: [lead_time, avg_price_per_room]
  skewness_threshold: 5
  no_of_features: 10
"#;

    #[test]
    fn test_defaults_applied() {
        let config = PipelineConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.data_processing.target_column, "booking_status");
        assert_eq!(config.data_processing.id_columns, vec!["Booking_ID".to_string()]);
        assert_eq!(config.data_processing.smote_k_neighbors, 5);
        assert_eq!(config.data_processing.random_state, 42);
        assert_eq!(config.data_ingestion.storage_backend, StorageBackend::Gcs);
        assert!(config.data_ingestion.credentials_path.is_none());
        assert_eq!(config.paths.processed_train_file(), PathBuf::from("artifacts/processed/processed_train.csv"));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let text = SAMPLE.replace("  no_of_features: 10\n", "");
        let err = PipelineConfig::from_yaml_str(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_bad_train_ratio() {
        let text = SAMPLE.replace("train_ratio: 0.8", "train_ratio: 1.5");
        let err = PipelineConfig::from_yaml_str(&text).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(_)));
    }

    #[test]
    fn test_local_backend_needs_root() {
        let text = SAMPLE.replace("train_ratio: 0.8", "train_ratio: 0.8\n  storage_backend: local");
        assert!(PipelineConfig::from_yaml_str(&text).is_err());

        let text = SAMPLE.replace(
            "train_ratio: 0.8",
            "train_ratio: 0.8\n  storage_backend: local\n  local_storage_root: /tmp/buckets",
        );
        let config = PipelineConfig::from_yaml_str(&text).unwrap();
        assert_eq!(config.data_ingestion.storage_backend, StorageBackend::Local);
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::from_file("does/not/exist.yaml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
