//! Evaluation metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Label treated as the positive class for precision and recall
pub const POSITIVE_CLASS: i64 = 1;

/// Confusion counts for the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

/// Metrics for model evaluation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion: ConfusionCounts,
    /// Training time in seconds
    pub training_time_secs: f64,
    /// Number of features
    pub n_features: usize,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl ModelMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute classification metrics.
    /// Precision, recall and F1 are 0 when their denominator is 0.
    pub fn compute_classification(y_true: &Array1<i64>, y_pred: &Array1<i64>) -> Self {
        let mut metrics = Self::new();
        metrics.n_samples = y_true.len();

        if y_true.is_empty() {
            return metrics;
        }

        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| t == p)
            .count();
        metrics.accuracy = correct as f64 / y_true.len() as f64;

        let confusion = Self::confusion_counts(y_true, y_pred);
        let tp = confusion.true_positive as f64;
        let fp = confusion.false_positive as f64;
        let fn_ = confusion.false_negative as f64;

        metrics.precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
        metrics.recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
        metrics.f1_score = if metrics.precision + metrics.recall > 0.0 {
            2.0 * metrics.precision * metrics.recall / (metrics.precision + metrics.recall)
        } else {
            0.0
        };
        metrics.confusion = confusion;

        metrics
    }

    fn confusion_counts(y_true: &Array1<i64>, y_pred: &Array1<i64>) -> ConfusionCounts {
        let mut counts = ConfusionCounts::default();

        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t == POSITIVE_CLASS, p == POSITIVE_CLASS) {
                (true, true) => counts.true_positive += 1,
                (false, true) => counts.false_positive += 1,
                (false, false) => counts.true_negative += 1,
                (true, false) => counts.false_negative += 1,
            }
        }

        counts
    }
}
