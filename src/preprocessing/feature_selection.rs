//! Feature selection by random forest importance

use crate::error::{ErrorContext, PipelineError, Result};
use crate::training::RandomForest;
use crate::utils::frame::{column_names, column_to_i64, feature_matrix, require_columns};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Importance score of one feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub importance: f64,
}

/// Keeps the `k` most important features according to a random forest
#[derive(Debug, Clone)]
pub struct FeatureSelector {
    n_estimators: usize,
    random_state: u64,
    ranking: Vec<FeatureImportance>,
    selected: Vec<String>,
}

impl Default for FeatureSelector {
    fn default() -> Self {
        Self::new(100, 42)
    }
}

impl FeatureSelector {
    pub fn new(n_estimators: usize, random_state: u64) -> Self {
        Self {
            n_estimators,
            random_state,
            ranking: Vec::new(),
            selected: Vec::new(),
        }
    }

    /// Fit a forest on every non-label column and keep the top `k`.
    ///
    /// Returns the selected columns in descending importance, followed by
    /// the label column. Ties keep their original column order.
    pub fn select_features(
        &mut self,
        df: &DataFrame,
        label_column: &str,
        k: usize,
    ) -> Result<DataFrame> {
        info!("Starting feature selection step");
        require_columns(df, &[label_column])?;

        let features: Vec<String> = column_names(df)
            .into_iter()
            .filter(|c| c != label_column)
            .collect();

        if k > features.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("at most {} features to select", features.len()),
                actual: format!("no_of_features = {}", k),
            });
        }

        let x = feature_matrix(df, &features).context("reading feature columns")?;
        let y = Array1::from_vec(
            column_to_i64(df, label_column)
                .with_context(|| format!("reading label column '{}'", label_column))?,
        );

        let mut forest = RandomForest::new(self.n_estimators).with_random_state(self.random_state);
        forest.fit(&x, &y).context("fitting random forest")?;
        let importances = forest
            .feature_importances()
            .ok_or(PipelineError::ModelNotFitted)?;

        let mut ranking: Vec<FeatureImportance> = features
            .iter()
            .zip(importances.iter())
            .map(|(name, &importance)| FeatureImportance {
                name: name.clone(),
                importance,
            })
            .collect();
        // sort_by is stable
        ranking.sort_by(|a, b| b.importance.total_cmp(&a.importance));

        self.selected = ranking.iter().take(k).map(|f| f.name.clone()).collect();
        self.ranking = ranking;

        for feature in &self.ranking {
            info!(feature = %feature.name, importance = feature.importance, "Feature importance");
        }
        info!(selected = ?self.selected, "Top features selected");

        self.restrict(df, &self.output_columns(label_column))
    }

    /// Select `columns`, in that order, from another table
    pub fn restrict(&self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        require_columns(df, columns)?;
        Ok(df.select(columns.iter().map(String::as_str))?)
    }

    /// Selected feature names followed by the label
    pub fn output_columns(&self, label_column: &str) -> Vec<String> {
        let mut columns = self.selected.clone();
        columns.push(label_column.to_string());
        columns
    }

    /// All features by descending importance, from the last fit
    pub fn ranking(&self) -> &[FeatureImportance] {
        &self.ranking
    }

    /// Names of the selected features, from the last fit
    pub fn selected(&self) -> &[String] {
        &self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn informative() -> DataFrame {
        let n = 80;
        let label: Vec<i64> = (0..n).map(|i| (i >= n / 2) as i64).collect();
        let signal: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let noise: Vec<f64> = (0..n).map(|i| ((i * 37) % 11) as f64).collect();
        let flat: Vec<f64> = vec![3.0; n];
        df!(
            "noise" => noise,
            "booking_status" => label,
            "signal" => signal,
            "flat" => flat
        )
        .unwrap()
    }

    #[test]
    fn test_select_top_feature() {
        let df = informative();
        let mut selector = FeatureSelector::new(30, 42);
        let out = selector.select_features(&df, "booking_status", 1).unwrap();

        assert_eq!(column_names(&out), vec!["signal", "booking_status"]);
        assert_eq!(out.height(), df.height());

        let ranking = selector.ranking();
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].name, "signal");
        assert_eq!(ranking[2].name, "flat");
        assert_eq!(ranking[2].importance, 0.0);
        let total: f64 = ranking.iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_zero_keeps_label_only() {
        let mut selector = FeatureSelector::new(5, 42);
        let out = selector.select_features(&informative(), "booking_status", 0).unwrap();
        assert_eq!(column_names(&out), vec!["booking_status"]);
    }

    #[test]
    fn test_too_many_features_requested() {
        let mut selector = FeatureSelector::new(5, 42);
        let err = selector
            .select_features(&informative(), "booking_status", 4)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataShape);
    }

    #[test]
    fn test_restrict_missing_column() {
        let selector = FeatureSelector::default();
        let df = df!("a" => &[1.0]).unwrap();
        let err = selector.restrict(&df, &["b".to_string()]).unwrap_err();
        assert!(matches!(err, PipelineError::FeatureNotFound(_)));
    }
}
