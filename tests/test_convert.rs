//! Tests for CSV to Parquet conversion functionality

mod common;

use gridlock::cli::run_convert;
use polars::prelude::*;
use tempfile::TempDir;

#[test]
fn test_basic_csv_to_parquet_conversion() {
    let mut df = common::create_trip_dataframe();
    let (_temp_dir, csv_path) = common::create_temp_csv(&mut df);
    let out_dir = TempDir::new().unwrap();
    let parquet_path = out_dir.path().join("trips.parquet");

    run_convert(&csv_path, Some(&parquet_path), 1000).unwrap();

    assert!(parquet_path.exists(), "Parquet file should be created");

    let result_df = LazyFrame::scan_parquet(&parquet_path, Default::default())
        .unwrap()
        .collect()
        .unwrap();

    assert_eq!(result_df.shape(), (6, 8));
    common::assert_has_columns(&result_df, &["pickup_neighborhood", "fare_amount"]);
}

#[test]
fn test_conversion_derives_output_path() {
    let mut df = common::create_trip_dataframe();
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);

    run_convert(&csv_path, None, 1000).unwrap();

    let derived = temp_dir.path().join("trips.parquet");
    assert!(derived.exists(), "Derived output path should be used");
}

#[test]
fn test_conversion_preserves_numeric_types() {
    let mut df = common::create_trip_dataframe();
    let (_temp_dir, csv_path) = common::create_temp_csv(&mut df);
    let out_dir = TempDir::new().unwrap();
    let parquet_path = out_dir.path().join("typed.parquet");

    run_convert(&csv_path, Some(&parquet_path), 1000).unwrap();

    let result_df = LazyFrame::scan_parquet(&parquet_path, Default::default())
        .unwrap()
        .collect()
        .unwrap();

    assert!(result_df.column("fare_amount").unwrap().dtype().is_float());
    assert!(result_df
        .column("pickup_hour")
        .unwrap()
        .dtype()
        .is_integer());
}
