//! SMOTE oversampling

use crate::error::{PipelineError, Result};
use crate::synthetic::{class_counts, class_indices, ResampleResult, Sampler};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};
use tracing::debug;

/// Ordered float for BinaryHeap-based partial sort.
/// Ties are broken by index so neighbour sets are deterministic.
#[derive(Debug, Clone, Copy)]
struct DistIdx(f64, usize);

impl PartialEq for DistIdx {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for DistIdx {}
impl PartialOrd for DistIdx {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistIdx {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0).then(self.1.cmp(&other.1))
    }
}

/// SMOTE (Synthetic Minority Over-sampling Technique).
///
/// Every class below the majority count is oversampled up to it. A synthetic
/// row lies on the segment between a random class sample and one of its `k`
/// nearest same-class neighbours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Smote {
    /// Number of nearest neighbors
    k_neighbors: usize,
    /// Random seed
    seed: u64,
    /// Target samples per class
    target_counts: Option<BTreeMap<i64, usize>>,
}

impl Smote {
    /// Create new SMOTE sampler
    pub fn new() -> Self {
        Self {
            k_neighbors: 5,
            seed: 42,
            target_counts: None,
        }
    }

    /// Set number of neighbors; must be at least 1 by the time of `fit`
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn k_neighbors(&self) -> usize {
        self.k_neighbors
    }

    /// Squared Euclidean distance
    fn distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(ai, bi)| (ai - bi).powi(2))
            .sum::<f64>()
    }

    /// Positions (within `members`) of the k nearest neighbours of member `pos`,
    /// the point itself excluded by position
    fn find_neighbors(x: &Array2<f64>, members: &[usize], pos: usize, k: usize) -> Vec<usize> {
        let point = x.row(members[pos]);
        let mut heap: BinaryHeap<DistIdx> = BinaryHeap::with_capacity(k + 1);

        for (j, &row) in members.iter().enumerate() {
            if j == pos {
                continue;
            }
            let candidate = DistIdx(Self::distance(point, x.row(row)), j);
            if heap.len() < k {
                heap.push(candidate);
            } else if let Some(&worst) = heap.peek() {
                if candidate < worst {
                    heap.pop();
                    heap.push(candidate);
                }
            }
        }

        heap.into_sorted_vec().into_iter().map(|DistIdx(_, j)| j).collect()
    }

    /// Generate synthetic sample between two points
    fn generate_sample(point: ArrayView1<f64>, neighbor: ArrayView1<f64>, gap: f64) -> Vec<f64> {
        point
            .iter()
            .zip(neighbor.iter())
            .map(|(&p, &n)| p + gap * (n - p))
            .collect()
    }
}

impl Default for Smote {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for Smote {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        if self.k_neighbors == 0 {
            return Err(PipelineError::ShapeError {
                expected: "k_neighbors >= 1".to_string(),
                actual: "k_neighbors = 0".to_string(),
            });
        }

        let counts = class_counts(y);

        if counts.len() < 2 {
            return Err(PipelineError::ShapeError {
                expected: "at least 2 classes for SMOTE".to_string(),
                actual: format!("{} classes", counts.len()),
            });
        }

        let required = self.k_neighbors + 1;
        for (&class, &count) in &counts {
            if count < required {
                return Err(PipelineError::InsufficientSamples {
                    class,
                    count,
                    required,
                });
            }
        }

        let max_count = counts.values().copied().max().unwrap_or(0);
        self.target_counts = Some(counts.keys().map(|&class| (class, max_count)).collect());
        Ok(())
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        let targets = self
            .target_counts
            .as_ref()
            .ok_or(PipelineError::ModelNotFitted)?;

        if x.nrows() != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{} labels", y.len()),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let indices = class_indices(y);
        let n_features = x.ncols();

        // Collect only synthetic samples (original data reused from x directly)
        let mut synthetic_x: Vec<Vec<f64>> = Vec::new();
        let mut synthetic_y: Vec<i64> = Vec::new();
        let mut n_synthetic = BTreeMap::new();

        for (&class, &target_count) in targets {
            let members = match indices.get(&class) {
                Some(members) => members,
                None => {
                    return Err(PipelineError::InsufficientSamples {
                        class,
                        count: 0,
                        required: self.k_neighbors + 1,
                    })
                }
            };
            let n_to_generate = target_count.saturating_sub(members.len());
            n_synthetic.insert(class, n_to_generate);

            if n_to_generate == 0 {
                continue;
            }

            let neighbors: Vec<Vec<usize>> = (0..members.len())
                .into_par_iter()
                .map(|pos| Self::find_neighbors(x, members, pos, self.k_neighbors))
                .collect();

            debug!(class, n_to_generate, "Generating synthetic samples");

            for _ in 0..n_to_generate {
                let pos = rng.gen_range(0..members.len());
                let candidates = &neighbors[pos];
                let neighbor = candidates[rng.gen_range(0..candidates.len())];
                let gap: f64 = rng.gen();

                synthetic_x.push(Self::generate_sample(
                    x.row(members[pos]),
                    x.row(members[neighbor]),
                    gap,
                ));
                synthetic_y.push(class);
            }
        }

        // Build result: original rows + synthetic rows
        let n_original = x.nrows();
        let n_total = n_original + synthetic_x.len();
        let result_x = Array2::from_shape_fn((n_total, n_features), |(i, j)| {
            if i < n_original {
                x[[i, j]]
            } else {
                synthetic_x[i - n_original][j]
            }
        });

        let mut all_y: Vec<i64> = y.iter().copied().collect();
        all_y.extend_from_slice(&synthetic_y);

        Ok(ResampleResult {
            x: result_x,
            y: Array1::from_vec(all_y),
            n_synthetic,
        })
    }
}
