//! Integration test: Configuration loading and data ingestion

mod common;

use common::{config, reservations, CONFIG_YAML};
use reservation_pipeline::config::{PipelineConfig, StorageBackend};
use reservation_pipeline::ingestion::{fetcher_for, DataIngestion, LocalFetcher};
use reservation_pipeline::utils::{DataLoader, DataSaver};
use reservation_pipeline::ErrorKind;

fn setup(dir: &std::path::Path, rows: usize) -> PipelineConfig {
    let storage = dir.join("storage");
    let mut raw = reservations(rows);
    DataSaver::save_csv(
        &mut raw,
        storage.join("reservations-bucket").join("Hotel_Reservations.csv"),
    )
    .unwrap();
    config(&storage, &dir.join("artifacts"))
}

#[test]
fn test_ingestion_writes_raw_train_and_test() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 50);
    assert_eq!(config.data_ingestion.storage_backend, StorageBackend::Local);

    let ingestion = DataIngestion::new(&config).unwrap();
    ingestion.run().unwrap();

    let loader = DataLoader::new();
    let raw = loader.load_csv(config.paths.raw_file()).unwrap();
    let train = loader.load_csv(config.paths.train_file()).unwrap();
    let test = loader.load_csv(config.paths.test_file()).unwrap();

    assert_eq!(raw.height(), 50);
    assert_eq!(train.height(), 40);
    assert_eq!(test.height(), 10);
    // No index column is added on write
    assert_eq!(train.get_column_names(), raw.get_column_names());
}

#[test]
fn test_split_repeatable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 60);
    let ingestion = DataIngestion::new(&config).unwrap();

    ingestion.download().unwrap();
    let (first, _) = ingestion.split().unwrap();
    let (second, _) = ingestion.split().unwrap();
    assert!(first.equals(&second));
}

#[test]
fn test_missing_object_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 10);
    let ingestion = DataIngestion::with_fetcher(
        &config,
        Box::new(LocalFetcher::new(dir.path().join("empty"))),
    );

    let err = ingestion.run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!config.paths.train_file().exists());
}

#[test]
fn test_fetcher_for_backends() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path(), 10);
    assert!(fetcher_for(&config.data_ingestion).is_ok());

    config.data_ingestion.storage_backend = StorageBackend::Gcs;
    assert!(fetcher_for(&config.data_ingestion).is_ok());

    config.data_ingestion.storage_backend = StorageBackend::Local;
    config.data_ingestion.local_storage_root = None;
    let err = fetcher_for(&config.data_ingestion).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_config_file_missing_processing_key() {
    let dir = tempfile::tempdir().unwrap();
    let text = CONFIG_YAML.replace("  no_of_features: 2\n", "");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, text).unwrap();

    let err = PipelineConfig::from_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
