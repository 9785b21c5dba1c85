//! Unit tests for cross-tabulation

use gridlock::pipeline::{cross_tabulate, cross_tabulate_metrics};

mod common;

#[test]
fn test_fixture_counts_match_hand_calculated() {
    let df = common::create_trip_dataframe();
    let ct = cross_tabulate(
        &df,
        "pickup_neighborhood",
        "dropoff_neighborhood",
        Some("fare_amount"),
    )
    .unwrap();

    let downtown = ct.row_index("Downtown").unwrap();
    let airport_col = ct.col_index("Airport").unwrap();
    let midtown_col = ct.col_index("Midtown").unwrap();

    assert_eq!(ct.count(downtown, airport_col), 2);
    assert_eq!(ct.count(downtown, midtown_col), 1);
    assert_eq!(ct.total_count(), 6);
}

#[test]
fn test_fixture_means_match_hand_calculated() {
    let df = common::create_trip_dataframe();
    let ct = cross_tabulate(
        &df,
        "pickup_neighborhood",
        "dropoff_neighborhood",
        Some("fare_amount"),
    )
    .unwrap();

    let downtown = ct.row_index("Downtown").unwrap();
    let airport = ct.row_index("Airport").unwrap();
    let airport_col = ct.col_index("Airport").unwrap();
    let downtown_col = ct.col_index("Downtown").unwrap();

    // Downtown -> Airport: (10 + 20) / 2
    assert!((ct.mean(downtown, airport_col) - 15.0).abs() < 1e-9);
    // Airport -> Downtown: (40 + 50) / 2
    assert!((ct.mean(airport, downtown_col) - 45.0).abs() < 1e-9);
    // Grand mean: 210 / 6
    assert!((ct.grand_mean() - 35.0).abs() < 1e-9);
}

#[test]
fn test_counts_sum_to_row_count() {
    let df = common::create_random_trip_dataframe(500, 8);
    let ct = cross_tabulate(
        &df,
        "pickup_neighborhood",
        "dropoff_neighborhood",
        Some("fare_amount"),
    )
    .unwrap();

    let cell_total: u64 = ct.counts().iter().sum();
    assert_eq!(cell_total, 500);
    assert_eq!(ct.total_count(), 500);
}

#[test]
fn test_aggregation_is_idempotent() {
    let df = common::create_random_trip_dataframe(200, 5);

    let first = cross_tabulate(
        &df,
        "pickup_neighborhood",
        "dropoff_neighborhood",
        Some("fare_amount"),
    )
    .unwrap();
    let second = cross_tabulate(
        &df,
        "pickup_neighborhood",
        "dropoff_neighborhood",
        Some("fare_amount"),
    )
    .unwrap();

    assert_eq!(first.row_labels(), second.row_labels());
    assert_eq!(first.col_labels(), second.col_labels());
    assert_eq!(first.counts(), second.counts());
    for i in 0..first.nrows() {
        for j in 0..first.ncols() {
            assert_eq!(first.mean(i, j), second.mean(i, j));
            assert_eq!(first.sum(i, j), second.sum(i, j));
        }
    }
}

#[test]
fn test_empty_cell_reports_grand_mean() {
    let df = common::create_trip_dataframe();
    let ct = cross_tabulate(
        &df,
        "pickup_neighborhood",
        "dropoff_neighborhood",
        Some("fare_amount"),
    )
    .unwrap();

    // Midtown -> Midtown has no trips
    let midtown = ct.row_index("Midtown").unwrap();
    let midtown_col = ct.col_index("Midtown").unwrap();
    assert_eq!(ct.count(midtown, midtown_col), 0);
    assert!((ct.mean(midtown, midtown_col) - ct.grand_mean()).abs() < 1e-9);
}

#[test]
fn test_parallel_metrics_match_single_calls() {
    let df = common::create_trip_dataframe();
    let metrics = vec!["fare_amount".to_string(), "tip_amount".to_string()];

    let tables = cross_tabulate_metrics(
        &df,
        "pickup_neighborhood",
        "dropoff_neighborhood",
        &metrics,
    )
    .unwrap();

    assert_eq!(tables.len(), 2);
    for (metric, table) in metrics.iter().zip(tables.iter()) {
        let single = cross_tabulate(
            &df,
            "pickup_neighborhood",
            "dropoff_neighborhood",
            Some(metric.as_str()),
        )
        .unwrap();

        assert_eq!(table.value_column(), Some(metric.as_str()));
        assert_eq!(table.counts(), single.counts());
        for i in 0..table.nrows() {
            for j in 0..table.ncols() {
                assert_eq!(table.mean(i, j), single.mean(i, j));
            }
        }
    }
}

#[test]
fn test_temporal_crosstab_orders_hours_numerically() {
    let df = common::create_trip_dataframe();
    let ct = cross_tabulate(&df, "pickup_hour", "pickup_day_of_week", Some("fare_amount")).unwrap();

    assert_eq!(ct.row_labels(), &["8", "9", "17", "18", "23"]);
    assert_eq!(ct.col_labels(), &["Mon", "Tue", "Wed"]);
}
