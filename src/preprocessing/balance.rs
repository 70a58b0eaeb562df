//! Class balancing of a processed table

use crate::error::{ErrorContext, Result};
use crate::synthetic::{class_counts, Sampler, Smote};
use crate::utils::frame::{column_names, column_to_i64, feature_matrix, require_columns};
use ndarray::Array1;
use polars::prelude::*;
use tracing::info;

/// Oversamples every minority class up to the majority count with SMOTE
#[derive(Debug, Clone)]
pub struct Balancer {
    k_neighbors: usize,
    seed: u64,
}

impl Default for Balancer {
    fn default() -> Self {
        Self::new(5, 42)
    }
}

impl Balancer {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Self { k_neighbors, seed }
    }

    /// Balance `df` on `label_column`.
    ///
    /// Output keeps the input column order: original rows first, then the
    /// synthetic rows. Feature columns come back as Float64 and the label as
    /// Int64.
    pub fn balance(&self, df: &DataFrame, label_column: &str) -> Result<DataFrame> {
        info!("Handling imbalanced data");
        require_columns(df, &[label_column])?;

        let columns = column_names(df);
        let features: Vec<&String> = columns.iter().filter(|c| *c != label_column).collect();

        let x = feature_matrix(df, &features).context("reading feature columns")?;
        let y = Array1::from_vec(
            column_to_i64(df, label_column)
                .with_context(|| format!("reading label column '{}'", label_column))?,
        );

        info!(counts = ?class_counts(&y), "Class distribution before balancing");

        let mut smote = Smote::new()
            .with_k_neighbors(self.k_neighbors)
            .with_seed(self.seed);
        let resampled = smote.fit_resample(&x, &y)?;

        info!(
            counts = ?class_counts(&resampled.y),
            synthetic = ?resampled.n_synthetic,
            "Class distribution after balancing"
        );

        let mut out = Vec::with_capacity(columns.len());
        let mut feature_idx = 0;
        for name in &columns {
            let series = if name == label_column {
                Series::new(name.as_str().into(), resampled.y.to_vec())
            } else {
                let values = resampled.x.column(feature_idx).to_vec();
                feature_idx += 1;
                Series::new(name.as_str().into(), values)
            };
            out.push(series.into());
        }

        Ok(DataFrame::new(out)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, PipelineError};
    use crate::utils::frame::column_to_f64;

    fn imbalanced() -> DataFrame {
        let label: Vec<i64> = (0..30).map(|i| (i % 5 == 0) as i64).collect();
        let a: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let b: Vec<i64> = (0..30).map(|i| (i % 3) as i64).collect();
        df!(
            "a" => a,
            "booking_status" => label,
            "b" => b
        )
        .unwrap()
    }

    #[test]
    fn test_balance_equalizes_classes() {
        let df = imbalanced();
        let out = Balancer::new(3, 42).balance(&df, "booking_status").unwrap();

        assert_eq!(column_names(&out), vec!["a", "booking_status", "b"]);
        assert_eq!(out.height(), 48);

        let labels = column_to_i64(&out, "booking_status").unwrap();
        assert_eq!(labels.iter().filter(|&&l| l == 1).count(), 24);
        assert_eq!(labels.iter().filter(|&&l| l == 0).count(), 24);

        assert_eq!(out.column("b").unwrap().dtype(), &DataType::Float64);
        assert_eq!(out.column("booking_status").unwrap().dtype(), &DataType::Int64);
        assert_eq!(&column_to_f64(&out, "a").unwrap()[..30], &column_to_f64(&df, "a").unwrap()[..]);
    }

    #[test]
    fn test_missing_label() {
        let err = Balancer::default().balance(&imbalanced(), "status").unwrap_err();
        assert!(matches!(err, PipelineError::FeatureNotFound(_)));
    }

    #[test]
    fn test_too_few_minority_samples() {
        let err = Balancer::new(6, 42).balance(&imbalanced(), "booking_status").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataShape);
    }
}
