//! Stage orchestration
//!
//! [`DataProcessor`] turns the raw train/test files into processed files;
//! [`TrainingPipeline`] chains ingestion, processing and model training.

use crate::config::{PathsConfig, PipelineConfig, ProcessingConfig};
use crate::error::{ErrorContext, Result};
use crate::ingestion::DataIngestion;
use crate::preprocessing::{Balancer, FeatureSelector, PreprocessingConfig, Preprocessor};
use crate::training::{write_json, ForestTrainer, ModelArtifact, ModelMetrics, ModelTrainer};
use crate::utils::{DataLoader, DataSaver};
use polars::prelude::*;
use std::time::Instant;
use tracing::info;

/// Processed train and test tables
#[derive(Debug, Clone)]
pub struct ProcessedSplits {
    pub train: DataFrame,
    pub test: DataFrame,
    /// Selected feature columns followed by the label
    pub columns: Vec<String>,
}

/// Preprocess, balance and select features for both splits
pub struct DataProcessor {
    processing: ProcessingConfig,
    paths: PathsConfig,
}

impl DataProcessor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            processing: config.data_processing.clone(),
            paths: config.paths.clone(),
        }
    }

    /// Run every processing step on in-memory tables.
    /// The label encoder fit on train is reused for test, and test is
    /// restricted to the columns selected on train.
    pub fn process_frames(&self, train: &DataFrame, test: &DataFrame) -> Result<ProcessedSplits> {
        let label = self.processing.target_column.as_str();
        let preprocessor = Preprocessor::new(PreprocessingConfig::from(&self.processing));

        let (train, encoder) = preprocessor
            .preprocess(train)
            .context("preprocessing train split")?;
        let test = preprocessor
            .preprocess_with_encoder(test, &encoder)
            .context("preprocessing test split")?;

        let balancer = Balancer::new(self.processing.smote_k_neighbors, self.processing.random_state);
        let train = balancer
            .balance(&train, label)
            .context("balancing train split")?;
        let test = balancer
            .balance(&test, label)
            .context("balancing test split")?;

        let mut selector =
            FeatureSelector::new(self.processing.n_estimators, self.processing.random_state);
        let train = selector
            .select_features(&train, label, self.processing.no_of_features)
            .context("selecting features on train split")?;
        let columns = selector.output_columns(label);
        let test = selector
            .restrict(&test, &columns)
            .context("restricting test split to selected features")?;

        Ok(ProcessedSplits {
            train,
            test,
            columns,
        })
    }

    /// Read the raw splits, process them and write the processed files.
    /// Nothing is written unless both splits processed successfully.
    pub fn process(&self) -> Result<ProcessedSplits> {
        let start = Instant::now();
        info!("Starting data processing");

        let loader = DataLoader::new();
        let train = loader.load_csv(self.paths.train_file())?;
        let test = loader.load_csv(self.paths.test_file())?;

        let mut splits = self.process_frames(&train, &test)?;

        DataSaver::save_csv(&mut splits.train, self.paths.processed_train_file())?;
        DataSaver::save_csv(&mut splits.test, self.paths.processed_test_file())?;

        info!(
            columns = ?splits.columns,
            train_rows = splits.train.height(),
            test_rows = splits.test.height(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Data processing completed"
        );
        Ok(splits)
    }
}

/// Ingestion, processing and training end to end
pub struct TrainingPipeline {
    config: PipelineConfig,
}

impl TrainingPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn ingest(&self) -> Result<()> {
        DataIngestion::new(&self.config)?
            .run()
            .context("data ingestion")
    }

    pub fn process(&self) -> Result<ProcessedSplits> {
        DataProcessor::new(&self.config)
            .process()
            .context("data processing")
    }

    /// Train on the processed files and write the model and metrics
    pub fn train(&self) -> Result<(ModelArtifact, ModelMetrics)> {
        let paths = &self.config.paths;
        let loader = DataLoader::new();
        let train = loader.load_csv(paths.processed_train_file())?;
        let test = loader.load_csv(paths.processed_test_file())?;

        let processing = &self.config.data_processing;
        let trainer = ForestTrainer::new(processing.target_column.clone())
            .with_n_estimators(processing.n_estimators)
            .with_random_state(processing.random_state);
        let (artifact, metrics) = trainer
            .train(&train, &test)
            .context("model training")?;

        artifact.save(paths.model_file())?;
        let metrics_path = paths.metrics_file();
        write_json(&metrics, &metrics_path)
            .with_context(|| format!("saving metrics to {}", metrics_path.display()))?;
        info!(path = %metrics_path.display(), "Metrics saved");

        Ok((artifact, metrics))
    }

    /// All stages in order
    pub fn run(&self) -> Result<ModelMetrics> {
        self.ingest()?;
        self.process()?;
        let (_, metrics) = self.train()?;
        Ok(metrics)
    }
}
