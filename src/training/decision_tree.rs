//! Decision tree classifier

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with the class distribution of its training samples
    Leaf {
        proba: Vec<f64>,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Best split found at a node
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    weighted_impurity: f64,
}

/// Gini impurity from class counts
fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| (c as f64 / n).powi(2))
        .sum::<f64>()
}

/// Decision tree classifier with Gini impurity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features tried per split, drawn at random per node
    pub max_features: Option<usize>,
    /// Seed for the per-node feature draw
    pub random_state: u64,
    /// Number of features
    n_features: usize,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Class labels, ascending
    classes: Vec<i64>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Create a new classifier tree
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: 0,
            n_features: 0,
            feature_importances: None,
            classes: Vec::new(),
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set number of features tried per split
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features.max(1));
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<&mut Self> {
        let mut classes: Vec<i64> = y.iter().copied().collect();
        classes.sort_unstable();
        classes.dedup();

        let encoded: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or(0))
            .collect();

        self.fit_encoded(x, &encoded, classes)
    }

    /// Fit on labels already mapped to positions in `classes`.
    /// Lets a forest keep one class layout across bootstrap samples.
    pub(crate) fn fit_encoded(
        &mut self,
        x: &Array2<f64>,
        y: &[usize],
        classes: Vec<i64>,
    ) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        if n_samples == 0 || classes.is_empty() {
            return Err(PipelineError::ShapeError {
                expected: "at least one labelled sample".to_string(),
                actual: "empty training set".to_string(),
            });
        }

        self.n_features = n_features;
        self.classes = classes;

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let mut importances = vec![0.0; n_features];
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut importances, &mut rng));

        // Normalize feature importances
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn class_counts(&self, y: &[usize], indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &i in indices {
            counts[y[i]] += 1;
        }
        counts
    }

    fn leaf(counts: &[usize], n_samples: usize) -> TreeNode {
        let n = n_samples.max(1) as f64;
        TreeNode::Leaf {
            proba: counts.iter().map(|&c| c as f64 / n).collect(),
            n_samples,
        }
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &[usize],
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let counts = self.class_counts(y, indices);
        let impurity = gini(&counts, n_samples);

        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || is_pure;

        if should_stop {
            return Self::leaf(&counts, n_samples);
        }

        let Some(best) = self.find_best_split(x, y, indices, rng) else {
            return Self::leaf(&counts, n_samples);
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, best.feature_idx]] <= best.threshold);

        importances[best.feature_idx] += n_samples as f64 * (impurity - best.weighted_impurity);

        let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, importances, rng));
        let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, importances, rng));

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
            impurity,
        }
    }

    /// Scan a random subset of features, each with one sorted sweep.
    /// Constant features do not count towards the subset size.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &[usize],
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = x.ncols();
        let to_try = self.max_features.unwrap_or(n_features).min(n_features);
        let n_classes = self.classes.len();
        let n = indices.len();

        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        let mut tried = 0;
        let mut pairs: Vec<(f64, usize)> = Vec::with_capacity(n);

        for feature_idx in features {
            if tried >= to_try {
                break;
            }

            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (x[[i, feature_idx]], y[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            if pairs[0].0 >= pairs[n - 1].0 {
                continue;
            }
            tried += 1;

            let mut left_counts = vec![0usize; n_classes];
            let mut right_counts = vec![0usize; n_classes];
            for &(_, class) in &pairs {
                right_counts[class] += 1;
            }

            for split in 1..n {
                let (value, class) = pairs[split - 1];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let next = pairs[split].0;
                if value >= next {
                    continue;
                }
                if split < self.min_samples_leaf || n - split < self.min_samples_leaf {
                    continue;
                }

                let weighted = (split as f64 * gini(&left_counts, split)
                    + (n - split) as f64 * gini(&right_counts, n - split))
                    / n as f64;

                if best.as_ref().map_or(true, |b| weighted < b.weighted_impurity) {
                    let mut threshold = value + (next - value) / 2.0;
                    // Midpoint can round up to `next` for adjacent floats
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        weighted_impurity: weighted,
                    });
                }
            }
        }

        best
    }

    /// Class probabilities, one row per sample, columns in [`Self::classes`] order
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let root = self.root.as_ref().ok_or(PipelineError::ModelNotFitted)?;
        self.check_width(x)?;

        let n_classes = self.classes.len();
        let mut proba = Array2::zeros((x.nrows(), n_classes));
        for (i, row) in x.rows().into_iter().enumerate() {
            let leaf = Self::find_leaf(root, |f| row[f]);
            for (j, &p) in leaf.iter().enumerate() {
                proba[[i, j]] = p;
            }
        }
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

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }

    fn find_leaf<F: Fn(usize) -> f64>(node: &TreeNode, value: F) -> &[f64] {
        let mut node = node;
        loop {
            match node {
                TreeNode::Leaf { proba, .. } => return proba,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if value(*feature_idx) <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Class labels seen during fit
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        self.root.as_ref().map_or(0, Self::node_depth)
    }

    fn node_depth(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => {
                1 + Self::node_depth(left).max(Self::node_depth(right))
            }
        }
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, Self::count_leaves)
    }

    fn count_leaves(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => {
                Self::count_leaves(left) + Self::count_leaves(right)
            }
        }
    }
}

/// Index of the largest value, first one on ties
pub(crate) fn argmax<I: Iterator<Item = f64>>(values: I) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, v) in values.enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}
