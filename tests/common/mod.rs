//! Shared synthetic reservation tables

#![allow(dead_code)]

use polars::prelude::*;
use reservation_pipeline::config::{PathsConfig, PipelineConfig};
use std::path::Path;

pub const LABEL: &str = "booking_status";

/// `n` unique bookings, every fifth one canceled.
/// lead_time is dominated by a few very long lead times.
pub fn reservations(n: usize) -> DataFrame {
    let ids: Vec<String> = (0..n).map(|i| format!("INN{:05}", i)).collect();
    let room: Vec<&str> = (0..n)
        .map(|i| match i % 3 {
            0 => "Room_Type 1",
            1 => "Room_Type 2",
            _ => "Room_Type 4",
        })
        .collect();
    let meal: Vec<&str> = (0..n)
        .map(|i| if i % 4 == 0 { "Not Selected" } else { "Meal Plan 1" })
        .collect();
    let lead_time: Vec<f64> = (0..n)
        .map(|i| if i % 10 == 0 { 400.0 + i as f64 } else { (i % 17) as f64 })
        .collect();
    let price: Vec<f64> = (0..n).map(|i| 80.0 + ((i * 7) % 30) as f64 + i as f64 * 0.01).collect();
    let adults: Vec<i64> = (0..n).map(|i| (i % 3 + 1) as i64).collect();
    let status: Vec<&str> = (0..n)
        .map(|i| if i % 5 == 0 { "Canceled" } else { "Not_Canceled" })
        .collect();

    df!(
        "Booking_ID" => ids,
        "type_of_meal_plan" => meal,
        "room_type_reserved" => room,
        "lead_time" => lead_time,
        "avg_price_per_room" => price,
        "no_of_adults" => adults,
        LABEL => status
    )
    .unwrap()
}

pub const CONFIG_YAML: &str = r#"
data_ingestion:
  bucket_name: reservations-bucket
  bucket_file_name: Hotel_Reservations.csv
  train_ratio: 0.8
  storage_backend: local
  local_storage_root: STORAGE_ROOT
data_processing:
  categorical_columns: [type_of_meal_plan, room_type_reserved, booking_status]
  numerical_columns: [lead_time, avg_price_per_room, no_of_adults]
  skewness_threshold: 1.0
  no_of_features: 2
  smote_k_neighbors: 2
  n_estimators: 10
"#;

/// Configuration reading from `storage_root` and writing under `artifacts`
pub fn config(storage_root: &Path, artifacts: &Path) -> PipelineConfig {
    let text = CONFIG_YAML.replace("STORAGE_ROOT", &storage_root.display().to_string());
    let mut config = PipelineConfig::from_yaml_str(&text).unwrap();
    config.paths = PathsConfig::under(artifacts);
    config
}

/// The same configuration as a YAML document
pub fn config_yaml(storage_root: &Path, artifacts: &Path) -> String {
    serde_yaml::to_string(&config(storage_root, artifacts)).unwrap()
}
