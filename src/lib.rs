//! Reservation Pipeline - hotel booking cancellation training pipeline
//!
//! Turns a raw reservations table into model-ready train and test tables and
//! trains a classifier on them.
//!
//! # Modules
//!
//! - [`config`] - YAML pipeline configuration
//! - [`ingestion`] - Object storage download and train/test split
//! - [`preprocessing`] - Cleaning, label encoding, skew handling, balancing, feature selection
//! - [`synthetic`] - SMOTE oversampling
//! - [`training`] - Decision trees, random forests, metrics, model trainer
//! - [`pipeline`] - Stage orchestration
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod config;

// Stages
pub mod ingestion;
pub mod preprocessing;
pub mod synthetic;
pub mod training;
pub mod pipeline;

// Utilities
pub mod utils;

// Services
pub mod cli;

pub use error::{ErrorKind, PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ErrorContext, ErrorKind, PipelineError, Result};

    // Configuration
    pub use crate::config::{PipelineConfig, IngestionConfig, ProcessingConfig, PathsConfig, StorageBackend};

    // Ingestion
    pub use crate::ingestion::{DataIngestion, ObjectFetcher, GcsFetcher, LocalFetcher, train_test_split};

    // Preprocessing
    pub use crate::preprocessing::{Preprocessor, PreprocessingConfig, LabelEncoder, Balancer, FeatureSelector, FeatureImportance};

    // Synthetic data
    pub use crate::synthetic::{Smote, Sampler};

    // Training
    pub use crate::training::{RandomForest, ModelTrainer, ForestTrainer, ModelArtifact, ModelMetrics};

    // Orchestration
    pub use crate::pipeline::{DataProcessor, TrainingPipeline, ProcessedSplits};

    // IO
    pub use crate::utils::{DataLoader, DataSaver};
}
