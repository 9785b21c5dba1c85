//! Integration tests for the full analysis pipeline

use assert_cmd::Command;
use predicates::prelude::*;

use gridlock::pipeline::{
    align_to_order, cross_tabulate, cross_tabulate_metrics, load_dataset_with_progress,
    prepare_trips, profile_dissimilarity, seriation_order, Linkage, ShareTable, TripColumns,
};

mod common;

#[test]
fn test_full_pipeline_through_library() {
    let mut df = common::create_trip_dataframe();
    let (_temp_dir, csv_path) = common::create_temp_csv(&mut df);

    // Load
    let (df, rows, _cols, _mem) = load_dataset_with_progress(&csv_path, 100).unwrap();
    assert_eq!(rows, 6);

    // Prepare
    let columns = TripColumns::default();
    let trips_df = prepare_trips(&df, &columns, None).unwrap();
    assert_eq!(trips_df.height(), 6);
    common::assert_has_columns(&trips_df, &["tip_percent"]);

    // Cross-tabulate
    let counts = cross_tabulate(&trips_df, &columns.pickup, &columns.dropoff, None).unwrap();
    let metrics = cross_tabulate_metrics(
        &trips_df,
        &columns.pickup,
        &columns.dropoff,
        &["fare_amount".to_string(), "tip_percent".to_string()],
    )
    .unwrap();
    assert_eq!(counts.total_count(), 6);
    assert_eq!(metrics.len(), 2);

    // Seriate and reorder
    let d = profile_dissimilarity(&counts);
    let row_order = seriation_order(&d, Linkage::Average).unwrap();
    common::assert_permutation(&row_order, counts.nrows());

    let ordered_labels: Vec<String> = row_order
        .iter()
        .map(|&i| counts.row_labels()[i].to_string())
        .collect();
    let col_order = align_to_order(&ordered_labels, counts.col_labels());
    let ordered = counts.reorder(&row_order, &col_order).unwrap();
    assert_eq!(ordered.total_count(), 6);

    // Shares over the reordered matrix still sum to 100 per non-empty row
    let shares = ShareTable::from_crosstab(&ordered);
    for i in 0..shares.nrows() {
        let row_total: u64 = (0..shares.ncols()).map(|j| ordered.count(i, j)).sum();
        if row_total > 0 {
            let total: f64 = (0..shares.ncols()).map(|j| shares.row_share(i, j)).sum();
            assert!((total - 100.0).abs() < 1e-9);
        }
    }
}

#[test]
fn test_cli_end_to_end_writes_artifacts() {
    let mut df = common::create_trip_dataframe();
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);
    let out_dir = temp_dir.path().join("analysis");

    Command::cargo_bin("gridlock")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .arg("-o")
        .arg(&out_dir)
        .arg("-m")
        .arg("fare_amount,tip_percent")
        .arg("--no-confirm")
        .assert()
        .success()
        .stdout(predicate::str::contains("Gridlock analysis complete"));

    assert!(out_dir.join("report.json").exists());
    assert!(out_dir.join("trip_counts.csv").exists());
    assert!(out_dir.join("fare_amount_means.csv").exists());
    assert!(out_dir.join("tip_percent_means.csv").exists());
}

#[test]
fn test_cli_bundle_flag_creates_archive() {
    let mut df = common::create_trip_dataframe();
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);
    let out_dir = temp_dir.path().join("analysis");

    Command::cargo_bin("gridlock")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .arg("-o")
        .arg(&out_dir)
        .arg("-m")
        .arg("fare_amount")
        .arg("--no-confirm")
        .arg("--bundle")
        .assert()
        .success();

    assert!(temp_dir.path().join("analysis.zip").exists());
}

#[test]
fn test_cli_missing_metric_column_fails() {
    let mut df = common::create_trip_dataframe();
    let (_temp_dir, csv_path) = common::create_temp_csv(&mut df);

    Command::cargo_bin("gridlock")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .arg("-m")
        .arg("surge_multiplier")
        .arg("--no-confirm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("surge_multiplier"));
}

#[test]
fn test_cli_requires_input() {
    Command::cargo_bin("gridlock")
        .unwrap()
        .arg("--no-confirm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file is required"));
}

#[test]
fn test_cli_top_capping_flows_into_report() {
    let mut df = common::create_trip_dataframe();
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);
    let out_dir = temp_dir.path().join("capped");

    Command::cargo_bin("gridlock")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .arg("-o")
        .arg(&out_dir)
        .arg("-m")
        .arg("fare_amount")
        .arg("--top")
        .arg("2")
        .arg("--no-confirm")
        .assert()
        .success();

    let raw = std::fs::read_to_string(out_dir.join("report.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let order: Vec<String> = parsed["neighborhood_order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert!(order.contains(&"Other".to_string()));
    assert!(!order.contains(&"Midtown".to_string()));
    assert_eq!(parsed["metadata"]["top_neighborhoods"], 2);
}
