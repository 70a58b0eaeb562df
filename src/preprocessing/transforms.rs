//! Skewness detection and log transform for numeric columns

use crate::error::{PipelineError, Result};
use crate::utils::frame::column_to_f64;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Sample skewness with the small-sample adjustment (adjusted Fisher-Pearson G1).
///
/// `G1 = sqrt(n(n-1)) / (n-2) * m3 / m2^1.5` where `m2`, `m3` are the biased
/// central moments. Returns NaN for fewer than three values and 0 for a
/// constant column.
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return f64::NAN;
    }

    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let (m2, m3) = values.iter().fold((0.0, 0.0), |(m2, m3), &v| {
        let d = v - mean;
        (m2 + d * d, m3 + d * d * d)
    });
    let m2 = m2 / nf;
    let m3 = m3 / nf;

    // Relative tolerance so float noise in a constant column does not read as skew
    if m2 <= f64::EPSILON * mean.abs().max(1.0).powi(2) {
        return 0.0;
    }

    let g1 = m3 / m2.powf(1.5);
    (nf * (nf - 1.0)).sqrt() / (nf - 2.0) * g1
}

/// `ln(1 + x)` over a column, failing on values below -1
pub fn log1p_checked(values: &[f64], column: &str) -> Result<Vec<f64>> {
    values
        .iter()
        .map(|&x| {
            if x < -1.0 {
                Err(PipelineError::DomainError(format!(
                    "log1p undefined for value {} in column '{}'",
                    x, column
                )))
            } else {
                Ok(x.ln_1p())
            }
        })
        .collect()
}

/// Per-column skew measured during fit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSkew {
    pub column: String,
    pub skewness: f64,
}

/// Log-transforms numeric columns whose skewness exceeds a threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkewTransformer {
    threshold: f64,
    measured: Vec<ColumnSkew>,
    transformed: Vec<String>,
    is_fitted: bool,
}

impl SkewTransformer {
    /// Create a new transformer
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            measured: Vec::new(),
            transformed: Vec::new(),
            is_fitted: false,
        }
    }

    /// Measure skewness of the given columns and pick the ones to transform
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.measured.clear();
        self.transformed.clear();

        for name in columns {
            let values = column_to_f64(df, name)?;
            let skew = skewness(&values);
            // NaN never exceeds the threshold
            if skew > self.threshold {
                self.transformed.push(name.clone());
            }
            self.measured.push(ColumnSkew {
                column: name.clone(),
                skewness: skew,
            });
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace every selected column by its log1p
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let mut result = df.clone();
        for name in &self.transformed {
            let values = column_to_f64(df, name)?;
            let logged = log1p_checked(&values, name)?;
            result.with_column(Series::new(name.as_str().into(), logged))?;
        }

        if !self.transformed.is_empty() {
            info!(columns = ?self.transformed, "Applied log1p to skewed columns");
        }
        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Skewness per fitted column, in fit order
    pub fn measured(&self) -> &[ColumnSkew] {
        &self.measured
    }

    /// Columns selected for the log transform
    pub fn transformed_columns(&self) -> &[String] {
        &self.transformed
    }
}
