//! Raw data ingestion
//!
//! Fetches the raw CSV from object storage and splits it into the train and
//! test files the processing stage reads.

mod storage;

pub use storage::{fetcher_for, GcsFetcher, LocalFetcher, ObjectFetcher};

use crate::config::{IngestionConfig, PathsConfig, PipelineConfig};
use crate::error::{ErrorContext, PipelineError, Result};
use crate::utils::{DataLoader, DataSaver};
use polars::prelude::*;
use rand::prelude::*;
use std::path::PathBuf;
use tracing::info;

/// Shuffle rows with a seeded RNG and cut them into train and test.
/// The first `round(n * train_ratio)` shuffled rows go to train.
pub fn train_test_split(
    df: &DataFrame,
    train_ratio: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame)> {
    if !(train_ratio > 0.0 && train_ratio < 1.0) {
        return Err(PipelineError::ConfigError(format!(
            "train_ratio must be in (0, 1), got {}",
            train_ratio
        )));
    }

    let n = df.height();
    let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_train = (n as f64 * train_ratio).round() as usize;
    let test_indices = indices.split_off(n_train);

    let train = df.take(&IdxCa::from_vec("idx".into(), indices))?;
    let test = df.take(&IdxCa::from_vec("idx".into(), test_indices))?;
    Ok((train, test))
}

/// Download plus split, writing raw, train and test CSVs
pub struct DataIngestion {
    config: IngestionConfig,
    paths: PathsConfig,
    seed: u64,
    fetcher: Box<dyn ObjectFetcher>,
}

impl DataIngestion {
    /// Ingestion using the configured storage backend
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let fetcher = fetcher_for(&config.data_ingestion)?;
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Ingestion with an explicit fetcher
    pub fn with_fetcher(config: &PipelineConfig, fetcher: Box<dyn ObjectFetcher>) -> Self {
        info!(
            bucket = %config.data_ingestion.bucket_name,
            object = %config.data_ingestion.bucket_file_name,
            "Data ingestion configured"
        );
        Self {
            config: config.data_ingestion.clone(),
            paths: config.paths.clone(),
            seed: config.data_processing.random_state,
            fetcher,
        }
    }

    /// Fetch the raw object into the raw directory
    pub fn download(&self) -> Result<PathBuf> {
        let destination = self.paths.raw_file();
        self.fetcher
            .fetch_object(
                &self.config.bucket_name,
                &self.config.bucket_file_name,
                &destination,
            )
            .with_context(|| {
                format!(
                    "downloading {} from bucket {}",
                    self.config.bucket_file_name, self.config.bucket_name
                )
            })?;
        info!(path = %destination.display(), "Raw data downloaded");
        Ok(destination)
    }

    /// Split the raw file and write the train and test files
    pub fn split(&self) -> Result<(DataFrame, DataFrame)> {
        info!(train_ratio = self.config.train_ratio, "Splitting data into train and test");
        let raw = DataLoader::new().load_csv(self.paths.raw_file())?;
        let (mut train, mut test) = train_test_split(&raw, self.config.train_ratio, self.seed)
            .context("splitting raw data")?;

        DataSaver::save_csv(&mut train, self.paths.train_file())?;
        DataSaver::save_csv(&mut test, self.paths.test_file())?;
        info!(
            train_rows = train.height(),
            test_rows = test.height(),
            "Train and test files written"
        );
        Ok((train, test))
    }

    /// Download then split
    pub fn run(&self) -> Result<()> {
        info!("Initiating data ingestion");
        self.download()?;
        self.split()?;
        info!("Data ingestion completed");
        Ok(())
    }
}
