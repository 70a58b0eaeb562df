//! Row cleaning, label encoding and skew handling

use crate::error::{ErrorContext, Result};
use crate::utils::frame::require_columns;
use super::{
    config::PreprocessingConfig,
    encoder::LabelEncoder,
    transforms::SkewTransformer,
};
use polars::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Drop exact duplicate rows, keeping the first occurrence in original order.
/// Returns the deduplicated table and the number of rows removed.
pub fn drop_duplicate_rows(df: &DataFrame) -> Result<(DataFrame, usize)> {
    let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    let removed = df.height() - deduped.height();
    Ok((deduped, removed))
}

/// Preprocessing step: identifier and duplicate removal, label encoding,
/// log transform of skewed numeric columns.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessingConfig,
}

impl Preprocessor {
    /// Create a new preprocessor
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Preprocess a table with a label encoder fit on this table.
    /// The fitted encoder is returned so other tables can reuse it.
    pub fn preprocess(&self, df: &DataFrame) -> Result<(DataFrame, LabelEncoder)> {
        let start = Instant::now();
        info!("Starting data preprocessing step");

        let cleaned = self.clean(df)?;

        let mut encoder = LabelEncoder::new();
        encoder
            .fit(&cleaned, &self.config.categorical_columns)
            .context("fitting label encoder")?;
        encoder.log_mappings();

        let encoded = encoder
            .transform(&cleaned)
            .context("applying label encoding")?;
        let result = self.handle_skewness(&encoded)?;

        info!(
            rows = result.height(),
            cols = result.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Preprocessing completed"
        );
        Ok((result, encoder))
    }

    /// Preprocess a table using an encoder fit elsewhere (the train split)
    pub fn preprocess_with_encoder(
        &self,
        df: &DataFrame,
        encoder: &LabelEncoder,
    ) -> Result<DataFrame> {
        info!("Starting data preprocessing step with shared label encoder");

        let cleaned = self.clean(df)?;
        let encoded = encoder
            .transform(&cleaned)
            .context("applying label encoding")?;
        self.handle_skewness(&encoded)
    }

    fn clean(&self, df: &DataFrame) -> Result<DataFrame> {
        require_columns(df, &self.config.id_columns).context("checking identifier columns")?;
        require_columns(df, &self.config.categorical_columns)
            .context("checking categorical columns")?;
        require_columns(df, &self.config.numerical_columns)
            .context("checking numerical columns")?;

        info!(columns = ?self.config.id_columns, "Dropping identifier columns and duplicate rows");
        let mut result = df.clone();
        for id in &self.config.id_columns {
            result = result
                .drop(id)
                .with_context(|| format!("dropping identifier column '{}'", id))?;
        }

        let (deduped, removed) =
            drop_duplicate_rows(&result).context("dropping duplicate rows")?;
        info!(removed, remaining = deduped.height(), "Duplicate rows dropped");
        Ok(deduped)
    }

    fn handle_skewness(&self, df: &DataFrame) -> Result<DataFrame> {
        info!(threshold = self.config.skewness_threshold, "Handling skewness");
        let mut transformer = SkewTransformer::new(self.config.skewness_threshold);
        let mut result = transformer
            .fit_transform(df, &self.config.numerical_columns)
            .context("skewness handling")?;
        for measured in transformer.measured() {
            debug!(column = %measured.column, skewness = measured.skewness, "Column skewness");
        }

        for name in &self.config.numerical_columns {
            let casted = result
                .column(name)?
                .cast(&DataType::Float64)
                .with_context(|| format!("casting '{}' to Float64", name))?;
            result.with_column(casted)?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, PipelineError};
    use crate::utils::frame::{column_names, column_to_f64, column_to_i64};

    fn bookings() -> DataFrame {
        df!(
            "Booking_ID" => &["INN1", "INN2", "INN3", "INN4", "INN5", "INN6"],
            "room_type" => &["Room 2", "Room 1", "Room 1", "Room 1", "Room 3", "Room 2"],
            "lead_time" => &[1.0, 2.0, 2.0, 3.0, 1.0, 400.0],
            "price" => &[100.0, 90.0, 90.0, 95.0, 110.0, 105.0]
        )
        .unwrap()
    }

    fn preprocessor() -> Preprocessor {
        Preprocessor::new(
            PreprocessingConfig::new()
                .with_categorical(&["room_type"])
                .with_numerical(&["lead_time", "price"])
                .with_skewness_threshold(1.0)
                .with_id_columns(&["Booking_ID"]),
        )
    }

    #[test]
    fn test_drop_duplicate_rows() {
        let df = df!(
            "a" => &[1, 2, 1, 1],
            "b" => &["x", "y", "x", "z"]
        )
        .unwrap();

        let (deduped, removed) = drop_duplicate_rows(&df).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(deduped.height(), 3);
        assert_eq!(column_to_i64(&deduped, "a").unwrap(), vec![1, 2, 1]);
    }

    #[test]
    fn test_signed_zero_rows_are_duplicates() {
        let df = df!(
            "a" => &[0.0, -0.0, 1.0],
            "b" => &["x", "x", "y"]
        )
        .unwrap();

        let (deduped, removed) = drop_duplicate_rows(&df).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(deduped.height(), 2);
        assert_eq!(column_to_f64(&deduped, "a").unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_preprocess_full() {
        let (out, encoder) = preprocessor().preprocess(&bookings()).unwrap();

        // Rows 2 and 3 only differ by their identifier
        assert_eq!(out.height(), 5);
        assert_eq!(column_names(&out), vec!["room_type", "lead_time", "price"]);
        assert_eq!(column_to_i64(&out, "room_type").unwrap(), vec![1, 0, 0, 2, 1]);
        assert_eq!(encoder.mapping("room_type").unwrap().len(), 3);

        // lead_time is dominated by one large value and gets log1p
        let lead = column_to_f64(&out, "lead_time").unwrap();
        assert!((lead[4] - 400f64.ln_1p()).abs() < 1e-12);
        assert_eq!(column_to_f64(&out, "price").unwrap(), vec![100.0, 90.0, 95.0, 110.0, 105.0]);
    }

    #[test]
    fn test_missing_identifier_column() {
        let df = bookings().drop("Booking_ID").unwrap();
        let err = preprocessor().preprocess(&df).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataShape);
    }

    #[test]
    fn test_domain_error_surfaces() {
        let df = df!(
            "Booking_ID" => &["a", "b", "c", "d", "e"],
            "room_type" => &["x", "x", "y", "y", "x"],
            "lead_time" => &[-5.0, 0.0, 0.0, 0.0, 900.0],
            "price" => &[1.0, 2.0, 3.0, 4.0, 5.0]
        )
        .unwrap();

        let processor = Preprocessor::new(
            PreprocessingConfig::new()
                .with_categorical(&["room_type"])
                .with_numerical(&["lead_time"])
                .with_skewness_threshold(0.5),
        );
        let err = processor.preprocess(&df).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert!(matches!(err, PipelineError::Context { .. }));
    }

    #[test]
    fn test_shared_encoder_on_second_table() {
        let processor = preprocessor();
        let (_, encoder) = processor.preprocess(&bookings()).unwrap();

        let test = df!(
            "Booking_ID" => &["T1", "T2", "T3"],
            "room_type" => &["Room 3", "Room 7", "Room 1"],
            "lead_time" => &[5.0, 6.0, 7.0],
            "price" => &[80.0, 85.0, 90.0]
        )
        .unwrap();

        let out = processor.preprocess_with_encoder(&test, &encoder).unwrap();
        assert_eq!(column_to_i64(&out, "room_type").unwrap(), vec![2, -1, 0]);
    }
}
