//! Preprocessing configuration

use crate::config::ProcessingConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the preprocessing step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Columns replaced by integer label codes
    pub categorical_columns: Vec<String>,

    /// Columns checked for skewness
    pub numerical_columns: Vec<String>,

    /// Columns with skewness above this are log1p transformed
    pub skewness_threshold: f64,

    /// Row identifier columns, dropped first
    pub id_columns: Vec<String>,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            categorical_columns: Vec::new(),
            numerical_columns: Vec::new(),
            skewness_threshold: 5.0,
            id_columns: vec!["Booking_ID".to_string()],
        }
    }
}

impl From<&ProcessingConfig> for PreprocessingConfig {
    fn from(config: &ProcessingConfig) -> Self {
        Self {
            categorical_columns: config.categorical_columns.clone(),
            numerical_columns: config.numerical_columns.clone(),
            skewness_threshold: config.skewness_threshold,
            id_columns: config.id_columns.clone(),
        }
    }
}

fn owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set categorical columns
    pub fn with_categorical(mut self, columns: &[&str]) -> Self {
        self.categorical_columns = owned(columns);
        self
    }

    /// Builder method to set numerical columns
    pub fn with_numerical(mut self, columns: &[&str]) -> Self {
        self.numerical_columns = owned(columns);
        self
    }

    /// Builder method to set the skewness threshold
    pub fn with_skewness_threshold(mut self, threshold: f64) -> Self {
        self.skewness_threshold = threshold;
        self
    }

    /// Builder method to set identifier columns
    pub fn with_id_columns(mut self, columns: &[&str]) -> Self {
        self.id_columns = owned(columns);
        self
    }
}
