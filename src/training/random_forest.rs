//! Random Forest classifier

use crate::error::{PipelineError, Result};
use super::decision_tree::{argmax, DecisionTree};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Strategy for max features
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of n_features
    Sqrt,
    /// All features
    All,
}

/// Random Forest classifier.
///
/// Trees are fit in parallel on bootstrap samples, each with its own seed
/// derived from `random_state`, so results do not depend on thread scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Features tried per split (sqrt by default)
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random state
    pub random_state: u64,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Number of features
    n_features: usize,
    /// Class labels, ascending
    classes: Vec<i64>,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    /// Create a new classifier forest
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators: n_estimators.max(1),
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            random_state: 42,
            feature_importances: None,
            n_features: 0,
            classes: Vec::new(),
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Enable or disable bootstrap sampling
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    fn compute_max_features(&self, n_features: usize) -> usize {
        match self.max_features {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
        }
        .max(1)
    }

    /// Fit the forest to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(PipelineError::ShapeError {
                expected: "at least one training sample".to_string(),
                actual: "0 samples".to_string(),
            });
        }

        self.n_features = n_features;
        let max_features = self.compute_max_features(n_features);

        let mut classes: Vec<i64> = y.iter().copied().collect();
        classes.sort_unstable();
        classes.dedup();
        let encoded: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or(0))
            .collect();
        self.classes = classes;

        debug!(
            n_estimators = self.n_estimators,
            n_samples,
            n_features,
            max_features,
            "Fitting random forest"
        );

        // Build trees in parallel
        let base_seed = self.random_state;
        let trees: Result<Vec<DecisionTree>> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                // Bootstrap sample
                let sample_indices: Vec<usize> = if self.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let x_boot = x.select(ndarray::Axis(0), &sample_indices);
                let y_boot: Vec<usize> = sample_indices.iter().map(|&i| encoded[i]).collect();

                let mut tree = DecisionTree::new()
                    .with_max_features(max_features)
                    .with_random_state(rng.gen());

                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }

                tree.fit_encoded(&x_boot, &y_boot, self.classes.clone())?;
                Ok(tree)
            })
            .collect();

        self.trees = trees?;
        self.compute_feature_importances();

        Ok(self)
    }

    /// Average of the per-tree normalized importances, renormalized to sum 1
    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total_importances = vec![0.0; self.n_features];

        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (i, &val) in imp.iter().enumerate() {
                    total_importances[i] += val;
                }
            }
        }

        let n_trees = self.trees.len() as f64;
        for imp in &mut total_importances {
            *imp /= n_trees;
        }

        let total: f64 = total_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut total_importances {
                *imp /= total;
            }
        }

        self.feature_importances = Some(Array1::from_vec(total_importances));
    }

    /// Predict class probabilities, averaged over trees
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::ModelNotFitted);
        }

        let per_tree: Vec<Array2<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict_proba(x))
            .collect::<Result<_>>()?;

        let mut proba: Array2<f64> = Array2::zeros((x.nrows(), self.classes.len()));
        for p in &per_tree {
            proba += p;
        }
        proba /= per_tree.len() as f64;
        Ok(proba)
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| self.classes[argmax(row.iter().copied())])
            .collect())
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Class labels seen during fit
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Get number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
