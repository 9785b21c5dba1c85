//! Trip table preparation
//!
//! Validates the configured columns, derives the columns the analysis needs
//! when the input does not carry them (tip percent, pickup day-of-week and
//! hour), and optionally caps the neighborhood set to the busiest N labels.

use std::collections::HashMap;

use anyhow::{Context, Result};
use polars::prelude::*;

/// Label used for neighborhoods outside the top-N set
pub const OTHER_LABEL: &str = "Other";

/// Column names the trip analysis operates on.
///
/// Every name is configurable from the CLI; these are the conventional
/// defaults for prepared taxi-trip extracts.
#[derive(Debug, Clone)]
pub struct TripColumns {
    pub pickup: String,
    pub dropoff: String,
    pub datetime: String,
    pub fare: String,
    pub tip: String,
    pub tip_percent: String,
    pub day_of_week: String,
    pub hour: String,
}

impl Default for TripColumns {
    fn default() -> Self {
        Self {
            pickup: "pickup_neighborhood".to_string(),
            dropoff: "dropoff_neighborhood".to_string(),
            datetime: "pickup_datetime".to_string(),
            fare: "fare_amount".to_string(),
            tip: "tip_amount".to_string(),
            tip_percent: "tip_percent".to_string(),
            day_of_week: "pickup_day_of_week".to_string(),
            hour: "pickup_hour".to_string(),
        }
    }
}

/// Verify that the pickup/dropoff columns and every requested metric column
/// exist in the DataFrame.
pub fn validate_columns(df: &DataFrame, columns: &TripColumns, metrics: &[String]) -> Result<()> {
    let available: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();

    for required in [&columns.pickup, &columns.dropoff] {
        if !available.contains(required) {
            anyhow::bail!(
                "Neighborhood column '{}' not found in dataset. Available columns: {:?}",
                required,
                available
            );
        }
    }

    for metric in metrics {
        // Tip percent may be derived later from tip and fare amounts
        if metric == &columns.tip_percent
            && available.contains(&columns.tip)
            && available.contains(&columns.fare)
        {
            continue;
        }
        // Day-of-week and hour may be derived from the pickup timestamp
        if (metric == &columns.day_of_week || metric == &columns.hour)
            && available.contains(&columns.datetime)
        {
            continue;
        }
        if !available.contains(metric) {
            anyhow::bail!(
                "Metric column '{}' not found in dataset. Available columns: {:?}",
                metric,
                available
            );
        }
    }

    Ok(())
}

/// Prepare the trip table for cross-tabulation.
///
/// - Drops rows with a null pickup or dropoff neighborhood.
/// - Derives `tip_percent` from tip and fare amounts when absent. Fares that
///   are not strictly positive yield a null tip percent, never an infinity.
/// - Derives `pickup_day_of_week` (Mon..Sun) and `pickup_hour` (0..23) from
///   the pickup timestamp when absent.
/// - When `top_neighborhoods` is set, keeps only the N busiest neighborhood
///   labels and relabels the remainder as `"Other"`.
pub fn prepare_trips(
    df: &DataFrame,
    columns: &TripColumns,
    top_neighborhoods: Option<usize>,
) -> Result<DataFrame> {
    let available: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();

    let mut lf = df
        .clone()
        .lazy()
        .filter(
            col(columns.pickup.as_str())
                .is_not_null()
                .and(col(columns.dropoff.as_str()).is_not_null()),
        );

    if !available.contains(&columns.tip_percent)
        && available.contains(&columns.tip)
        && available.contains(&columns.fare)
    {
        lf = lf.with_column(
            when(col(columns.fare.as_str()).cast(DataType::Float64).gt(lit(0.0f64)))
                .then(
                    col(columns.tip.as_str()).cast(DataType::Float64)
                        / col(columns.fare.as_str()).cast(DataType::Float64)
                        * lit(100.0f64),
                )
                .otherwise(lit(NULL))
                .alias(columns.tip_percent.as_str()),
        );
    }

    if available.contains(&columns.datetime) {
        if !available.contains(&columns.day_of_week) {
            lf = lf.with_column(
                weekday_label(col(columns.datetime.as_str()).dt().weekday())
                    .alias(columns.day_of_week.as_str()),
            );
        }
        if !available.contains(&columns.hour) {
            lf = lf.with_column(
                col(columns.datetime.as_str())
                    .dt()
                    .hour()
                    .cast(DataType::Int32)
                    .alias(columns.hour.as_str()),
            );
        }
    }

    let mut prepared = lf
        .collect()
        .context("Failed to prepare trip columns")?;

    if let Some(n) = top_neighborhoods {
        let keep = top_neighborhood_labels(&prepared, columns, n)?;
        prepared = cap_neighborhoods(&prepared, &columns.pickup, &keep)?;
        prepared = cap_neighborhoods(&prepared, &columns.dropoff, &keep)?;
    }

    Ok(prepared)
}

/// ISO weekday number (1 = Monday) to short label
fn weekday_label(weekday: Expr) -> Expr {
    when(weekday.clone().eq(lit(1u32)))
        .then(lit("Mon"))
        .when(weekday.clone().eq(lit(2u32)))
        .then(lit("Tue"))
        .when(weekday.clone().eq(lit(3u32)))
        .then(lit("Wed"))
        .when(weekday.clone().eq(lit(4u32)))
        .then(lit("Thu"))
        .when(weekday.clone().eq(lit(5u32)))
        .then(lit("Fri"))
        .when(weekday.eq(lit(6u32)))
        .then(lit("Sat"))
        .otherwise(lit("Sun"))
}

/// Find the N busiest neighborhoods, counting appearances as pickup or
/// dropoff. Ties break alphabetically so the result is deterministic.
pub fn top_neighborhood_labels(
    df: &DataFrame,
    columns: &TripColumns,
    n: usize,
) -> Result<Vec<String>> {
    let mut counts: HashMap<String, u64> = HashMap::new();

    for col_name in [&columns.pickup, &columns.dropoff] {
        let column = df
            .column(col_name)?
            .cast(&DataType::String)
            .with_context(|| format!("Neighborhood column '{}' is not categorical", col_name))?;
        for value in column.str()?.into_iter().flatten() {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);

    Ok(ranked.into_iter().map(|(name, _)| name).collect())
}

/// Replace every neighborhood label outside `keep` with `"Other"`.
fn cap_neighborhoods(df: &DataFrame, col_name: &str, keep: &[String]) -> Result<DataFrame> {
    let column = df.column(col_name)?.cast(&DataType::String)?;
    let relabeled: Vec<Option<String>> = column
        .str()?
        .into_iter()
        .map(|value| {
            value.map(|v| {
                if keep.iter().any(|k| k == v) {
                    v.to_string()
                } else {
                    OTHER_LABEL.to_string()
                }
            })
        })
        .collect();

    let mut out = df.clone();
    out.replace(col_name, Series::new(col_name.into(), relabeled))
        .with_context(|| format!("Failed to relabel column '{}'", col_name))?;
    Ok(out)
}
