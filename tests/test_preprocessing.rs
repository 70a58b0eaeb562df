//! Integration test: Preprocessing of reservation tables

mod common;

use common::{reservations, LABEL};
use polars::prelude::*;
use reservation_pipeline::preprocessing::{
    skewness, PreprocessingConfig, Preprocessor, UNKNOWN_CATEGORY_CODE,
};
use reservation_pipeline::ErrorKind;
use std::collections::BTreeSet;

fn preprocessor() -> Preprocessor {
    Preprocessor::new(
        PreprocessingConfig::new()
            .with_categorical(&["type_of_meal_plan", "room_type_reserved", LABEL])
            .with_numerical(&["lead_time", "avg_price_per_room", "no_of_adults"])
            .with_skewness_threshold(1.0)
            .with_id_columns(&["Booking_ID"]),
    )
}

fn i64_values(df: &DataFrame, name: &str) -> Vec<i64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

fn f64_values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

#[test]
fn test_duplicates_and_identifier_removed() {
    let raw = reservations(30);
    let mut with_dupes = raw.vstack(&raw.head(Some(5))).unwrap();
    // Same booking under a new id is still a duplicate once ids are dropped
    let ids: Vec<String> = (0..35).map(|i| format!("ID{}", i)).collect();
    with_dupes.with_column(Series::new("Booking_ID".into(), ids)).unwrap();

    let (out, _) = preprocessor().preprocess(&with_dupes).unwrap();
    assert_eq!(out.height(), 30);
    assert!(out.column("Booking_ID").is_err());
    assert_eq!(out.width(), raw.width() - 1);
}

#[test]
fn test_encoding_is_a_bijection_onto_codes() {
    let (out, encoder) = preprocessor().preprocess(&reservations(60)).unwrap();

    for column in ["type_of_meal_plan", "room_type_reserved", LABEL] {
        let mapping = encoder.mapping(column).unwrap();
        let codes: BTreeSet<i64> = mapping.values().copied().collect();
        assert_eq!(codes, (0..mapping.len() as i64).collect());

        let used: BTreeSet<i64> = i64_values(&out, column).into_iter().collect();
        assert_eq!(used, codes);
    }

    let status = encoder.mapping(LABEL).unwrap();
    assert_eq!(status["Canceled"], 0);
    assert_eq!(status["Not_Canceled"], 1);
}

#[test]
fn test_skewed_column_log_transformed() {
    let raw = reservations(100);
    let before = f64_values(&raw, "lead_time");
    assert!(skewness(&before) > 1.0);

    let (out, _) = preprocessor().preprocess(&raw).unwrap();
    let after = f64_values(&out, "lead_time");
    for (b, a) in before.iter().zip(after.iter()) {
        assert!((a - b.ln_1p()).abs() < 1e-12);
    }

    // Close to uniform: left alone
    assert_eq!(f64_values(&out, "avg_price_per_room"), f64_values(&raw, "avg_price_per_room"));
}

#[test]
fn test_threshold_above_every_skew_changes_nothing() {
    let raw = reservations(50);
    let processor = Preprocessor::new(preprocessor().config().clone().with_skewness_threshold(1e6));
    let (out, _) = processor.preprocess(&raw).unwrap();
    assert_eq!(f64_values(&out, "lead_time"), f64_values(&raw, "lead_time"));
}

#[test]
fn test_test_split_uses_train_encoding() {
    let processor = preprocessor();
    let (_, encoder) = processor.preprocess(&reservations(60)).unwrap();

    let mut test = reservations(10);
    let room: Vec<&str> = (0..10).map(|i| if i == 3 { "Room_Type 7" } else { "Room_Type 1" }).collect();
    test.with_column(Series::new("room_type_reserved".into(), room)).unwrap();

    let out = processor.preprocess_with_encoder(&test, &encoder).unwrap();
    let codes = i64_values(&out, "room_type_reserved");
    assert_eq!(codes[3], UNKNOWN_CATEGORY_CODE);
    assert_eq!(codes[0], encoder.mapping("room_type_reserved").unwrap()["Room_Type 1"]);
}

#[test]
fn test_negative_value_below_minus_one_is_domain_error() {
    let mut raw = reservations(40);
    let lead: Vec<f64> = (0..40).map(|i| if i == 1 { -3.0 } else if i % 10 == 0 { 900.0 } else { 1.0 }).collect();
    raw.with_column(Series::new("lead_time".into(), lead)).unwrap();

    let err = preprocessor().preprocess(&raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);
}

#[test]
fn test_missing_categorical_column() {
    let raw = reservations(10).drop("type_of_meal_plan").unwrap();
    let err = preprocessor().preprocess(&raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataShape);
}
