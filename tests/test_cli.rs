//! Tests for CLI argument parsing

use clap::Parser;
use gridlock::cli::Cli;
use std::path::PathBuf;

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["gridlock", "-i", "trips.csv"]);

    assert_eq!(cli.pickup_column, "pickup_neighborhood");
    assert_eq!(cli.dropoff_column, "dropoff_neighborhood");
    assert_eq!(cli.linkage, "average");
    assert_eq!(cli.top, None);
    assert_eq!(cli.top_pairs, 10);
    assert!(!cli.bundle);
    assert!(!cli.no_confirm);
    assert_eq!(
        cli.infer_schema_length, 10000,
        "Default schema inference should be 10000"
    );
}

#[test]
fn test_cli_default_metrics() {
    let cli = Cli::parse_from(["gridlock", "-i", "trips.csv"]);

    assert_eq!(
        cli.metrics,
        vec![
            "fare_amount",
            "tip_percent",
            "trip_distance",
            "trip_duration_minutes"
        ]
    );
}

#[test]
fn test_cli_custom_metrics_comma_separated() {
    let cli = Cli::parse_from(["gridlock", "-i", "trips.csv", "-m", "fare_amount,tip_percent"]);

    assert_eq!(cli.metrics, vec!["fare_amount", "tip_percent"]);
}

#[test]
fn test_cli_output_dir_derivation() {
    let cli = Cli::parse_from(["gridlock", "-i", "/data/trips.csv"]);

    let output = cli.output_dir().unwrap();
    assert_eq!(output, PathBuf::from("/data/trips_gridlock"));
}

#[test]
fn test_cli_explicit_output_dir() {
    let cli = Cli::parse_from(["gridlock", "-i", "trips.csv", "-o", "/tmp/out"]);

    let output = cli.output_dir().unwrap();
    assert_eq!(output, PathBuf::from("/tmp/out"));
}

#[test]
fn test_cli_report_and_bundle_paths() {
    let cli = Cli::parse_from(["gridlock", "-i", "/data/trips.csv"]);

    assert_eq!(
        cli.report_path().unwrap(),
        PathBuf::from("/data/trips_gridlock/report.json")
    );
    assert_eq!(
        cli.bundle_path().unwrap(),
        PathBuf::from("/data/trips_gridlock.zip")
    );
}

#[test]
fn test_cli_rejects_unknown_linkage() {
    let result = Cli::try_parse_from(["gridlock", "-i", "trips.csv", "--linkage", "ward"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_accepts_all_linkages() {
    for linkage in ["average", "single", "complete"] {
        let cli = Cli::parse_from(["gridlock", "-i", "trips.csv", "--linkage", linkage]);
        assert_eq!(cli.linkage, linkage);
    }
}

#[test]
fn test_cli_top_cap() {
    let cli = Cli::parse_from(["gridlock", "-i", "trips.csv", "--top", "12"]);
    assert_eq!(cli.top, Some(12));
}
