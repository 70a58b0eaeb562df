//! Label encoding for categorical columns

use crate::error::{PipelineError, Result};
use crate::utils::frame::{column_to_strings, is_numeric};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Code assigned to a category that was not seen during fit
pub const UNKNOWN_CATEGORY_CODE: i64 = -1;

/// Label encoder over several categorical columns.
///
/// Each column gets codes `0..n` assigned to its distinct labels in ascending
/// sorted order (numeric order for numeric columns). A fitted encoder is
/// read-only: transforming another table reuses the same mapping and sends
/// unseen labels to [`UNKNOWN_CATEGORY_CODE`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    // Column order is preserved so logs and transforms follow config order
    columns: Vec<String>,
    mappings: BTreeMap<String, BTreeMap<String, i64>>,
    is_fitted: bool,
}

impl LabelEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the encoder to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.columns.clear();
        self.mappings.clear();

        for col_name in columns {
            let numeric = is_numeric(df, col_name)?;
            let values = column_to_strings(df, col_name)?;
            let mapping = Self::build_mapping(values, numeric);
            self.columns.push(col_name.clone());
            self.mappings.insert(col_name.clone(), mapping);
        }

        self.is_fitted = true;
        Ok(self)
    }

    fn build_mapping(values: Vec<String>, numeric: bool) -> BTreeMap<String, i64> {
        let mut distinct: Vec<String> = values
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if numeric {
            distinct.sort_by(|a, b| {
                let a = a.parse::<f64>().unwrap_or(f64::NAN);
                let b = b.parse::<f64>().unwrap_or(f64::NAN);
                a.total_cmp(&b)
            });
        }

        distinct
            .into_iter()
            .enumerate()
            .map(|(code, label)| (label, code as i64))
            .collect()
    }

    /// Replace each fitted column by its integer codes
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let mut result = df.clone();
        for col_name in &self.columns {
            let mapping = &self.mappings[col_name];
            let values = column_to_strings(df, col_name)?;

            let mut unseen = 0usize;
            let codes: Vec<i64> = values
                .iter()
                .map(|label| {
                    mapping.get(label).copied().unwrap_or_else(|| {
                        unseen += 1;
                        UNKNOWN_CATEGORY_CODE
                    })
                })
                .collect();

            if unseen > 0 {
                info!(column = %col_name, unseen, "Unseen categories mapped to unknown code");
            }

            result.with_column(Series::new(col_name.as_str().into(), codes))?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Label to code mapping of one column
    pub fn mapping(&self, column: &str) -> Option<&BTreeMap<String, i64>> {
        self.mappings.get(column)
    }

    /// Columns this encoder was fitted on
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Emit every mapping at info level
    pub fn log_mappings(&self) {
        for col_name in &self.columns {
            info!(column = %col_name, mapping = ?self.mappings[col_name], "Label mapping");
        }
    }
}
