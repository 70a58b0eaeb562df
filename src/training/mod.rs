//! Model training module
//!
//! Provides the tree models used for feature ranking and the final
//! classifier:
//! - Decision trees and Random Forests (Gini, bootstrap)
//! - Classification metrics
//! - The [`ModelTrainer`] seam and its random forest implementation

mod models;
mod trainer;
pub mod decision_tree;
pub mod random_forest;

pub use models::{ConfusionCounts, ModelMetrics, POSITIVE_CLASS};
pub use trainer::{write_json, ForestTrainer, ModelArtifact, ModelTrainer};
pub use decision_tree::{DecisionTree, TreeNode};
pub use random_forest::{MaxFeatures, RandomForest};
