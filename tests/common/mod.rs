//! Shared test utilities and fixture generators

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a small trip DataFrame with hand-checkable aggregates
///
/// Neighborhood pair counts:
/// - Downtown -> Airport: 2 trips (fares 10, 20; tips 2, 2)
/// - Downtown -> Midtown: 1 trip  (fare 30; tip 6)
/// - Airport  -> Downtown: 2 trips (fares 40, 50; tips 4, 10)
/// - Midtown  -> Airport: 1 trip  (fare 60; tip 0)
pub fn create_trip_dataframe() -> DataFrame {
    df! {
        "pickup_neighborhood" => ["Downtown", "Downtown", "Downtown", "Airport", "Airport", "Midtown"],
        "dropoff_neighborhood" => ["Airport", "Airport", "Midtown", "Downtown", "Downtown", "Airport"],
        "fare_amount" => [10.0f64, 20.0, 30.0, 40.0, 50.0, 60.0],
        "tip_amount" => [2.0f64, 2.0, 6.0, 4.0, 10.0, 0.0],
        "trip_distance" => [2.5f64, 3.0, 1.5, 8.0, 7.5, 9.0],
        "trip_duration_minutes" => [12.0f64, 15.0, 8.0, 30.0, 28.0, 35.0],
        "pickup_day_of_week" => ["Mon", "Mon", "Tue", "Tue", "Wed", "Wed"],
        "pickup_hour" => [8i32, 9, 17, 8, 18, 23],
    }
    .unwrap()
}

/// Create a larger random trip DataFrame for property/stress tests
pub fn create_random_trip_dataframe(rows: usize, neighborhoods: usize) -> DataFrame {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let labels: Vec<String> = (0..neighborhoods).map(|i| format!("Zone {}", i)).collect();

    let pickups: Vec<String> = (0..rows)
        .map(|_| labels[rng.gen_range(0..neighborhoods)].clone())
        .collect();
    let dropoffs: Vec<String> = (0..rows)
        .map(|_| labels[rng.gen_range(0..neighborhoods)].clone())
        .collect();
    let fares: Vec<f64> = (0..rows).map(|_| rng.gen_range(2.5..80.0)).collect();
    let tips: Vec<f64> = (0..rows).map(|_| rng.gen_range(0.0..20.0)).collect();

    df! {
        "pickup_neighborhood" => pickups,
        "dropoff_neighborhood" => dropoffs,
        "fare_amount" => fares,
        "tip_amount" => tips,
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("trips.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("trips.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a vector of indices is a permutation of 0..n
pub fn assert_permutation(order: &[usize], n: usize) {
    assert_eq!(order.len(), n, "Permutation length mismatch");
    let mut seen = vec![false; n];
    for &i in order {
        assert!(i < n, "Index {} out of range for n={}", i, n);
        assert!(!seen[i], "Index {} repeated", i);
        seen[i] = true;
    }
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}
