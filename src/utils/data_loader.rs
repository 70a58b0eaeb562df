//! Data loading utilities

use crate::error::{ErrorContext, PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Rows used to infer the schema
const INFER_SCHEMA_ROWS: usize = 1000;

/// CSV loader for raw and intermediate tables
#[derive(Debug, Default)]
pub struct DataLoader;

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let start = Instant::now();
        info!(path = %path.display(), "Loading data");

        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| PipelineError::DataError(e.to_string()))
            .with_context(|| format!("parsing {}", path.display()))?;

        debug!(
            rows = df.height(),
            cols = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Data loaded"
        );
        Ok(df)
    }
}

/// Persists tables to disk
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV with a header row and no index column.
    /// Parent directories are created as needed.
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }

        let mut file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| PipelineError::DataError(e.to_string()))
            .with_context(|| format!("writing {}", path.display()))?;

        info!(path = %path.display(), rows = df.height(), cols = df.width(), "Data saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("table.csv");

        let mut df = df!(
            "lead_time" => &[10i64, 20, 30],
            "room_type" => &["A", "B", "A"],
            "price" => &[99.5, 120.0, 80.25]
        )
        .unwrap();

        DataSaver::save_csv(&mut df, &path).unwrap();
        let loaded = DataLoader::new().load_csv(&path).unwrap();

        assert_eq!(loaded.shape(), (3, 3));
        assert_eq!(loaded.get_column_names(), df.get_column_names());
        assert_eq!(loaded.column("lead_time").unwrap().dtype(), &DataType::Int64);
        assert_eq!(loaded.column("room_type").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DataLoader::new().load_csv("no/such/file.csv").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
