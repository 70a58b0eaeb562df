//! Data processing stages
//!
//! - Identifier and duplicate removal, label encoding, skew handling
//! - SMOTE class balancing
//! - Random forest feature selection

mod config;
mod encoder;
mod pipeline;
pub mod balance;
pub mod feature_selection;
pub mod transforms;

pub use config::PreprocessingConfig;
pub use encoder::{LabelEncoder, UNKNOWN_CATEGORY_CODE};
pub use pipeline::{drop_duplicate_rows, Preprocessor};
pub use balance::Balancer;
pub use feature_selection::{FeatureImportance, FeatureSelector};
pub use transforms::{log1p_checked, skewness, ColumnSkew, SkewTransformer};
