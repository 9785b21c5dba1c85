//! Two-way cross-tabulation of trip attributes
//!
//! Aggregates a DataFrame over a pair of categorical columns into per-cell
//! count, sum, and mean matrices. Cells with no observations keep a zero
//! count and sum but report the overall mean of the value column, so ratio
//! consumers downstream never see an undefined value.

use polars::prelude::*;
use rayon::prelude::*;
use std::collections::HashMap;
use thiserror::Error;

use crate::utils::create_progress_bar;

#[derive(Error, Debug)]
pub enum CrosstabError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Permutation of length {got} does not match {expected} categories")]
    BadPermutation { got: usize, expected: usize },
    #[error("Permutation index {index} is out of range or repeated")]
    InvalidIndex { index: usize },
}

/// Aggregate matrices for one (row category, column category) pair of columns.
#[derive(Debug, Clone)]
pub struct CrossTab {
    value_column: Option<String>,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    counts: Vec<u64>,
    sums: Vec<f64>,
    means: Vec<f64>,
    grand_mean: f64,
    total_count: u64,
}

impl CrossTab {
    pub fn nrows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn ncols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Value column this table aggregates, if any. A count-only table has none.
    pub fn value_column(&self) -> Option<&str> {
        self.value_column.as_deref()
    }

    pub fn count(&self, row: usize, col: usize) -> u64 {
        self.counts[self.idx(row, col)]
    }

    pub fn sum(&self, row: usize, col: usize) -> f64 {
        self.sums[self.idx(row, col)]
    }

    /// Mean of the value column in this cell. Empty cells report the overall
    /// mean; count-only tables report 0.0 everywhere.
    pub fn mean(&self, row: usize, col: usize) -> f64 {
        self.means[self.idx(row, col)]
    }

    /// Total number of observations across all cells.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Overall mean of the value column across all observations.
    pub fn grand_mean(&self) -> f64 {
        self.grand_mean
    }

    /// Counts of one row as floats, for profile-based similarity.
    pub fn row_profile(&self, row: usize) -> Vec<f64> {
        (0..self.ncols()).map(|j| self.count(row, j) as f64).collect()
    }

    /// Flat row-major count matrix.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Position of a row label, if present.
    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.row_labels.iter().position(|l| l == label)
    }

    /// Position of a column label, if present.
    pub fn col_index(&self, label: &str) -> Option<usize> {
        self.col_labels.iter().position(|l| l == label)
    }

    /// Apply row and column permutations, relabeling and moving cells
    /// consistently. Each permutation must be a bijection of its axis.
    pub fn reorder(&self, row_perm: &[usize], col_perm: &[usize]) -> Result<CrossTab, CrosstabError> {
        validate_permutation(row_perm, self.nrows())?;
        validate_permutation(col_perm, self.ncols())?;

        let nrows = self.nrows();
        let ncols = self.ncols();
        let mut counts = vec![0u64; nrows * ncols];
        let mut sums = vec![0.0f64; nrows * ncols];
        let mut means = vec![0.0f64; nrows * ncols];

        for (new_i, &old_i) in row_perm.iter().enumerate() {
            for (new_j, &old_j) in col_perm.iter().enumerate() {
                let to = new_i * ncols + new_j;
                counts[to] = self.count(old_i, old_j);
                sums[to] = self.sum(old_i, old_j);
                means[to] = self.mean(old_i, old_j);
            }
        }

        Ok(CrossTab {
            value_column: self.value_column.clone(),
            row_labels: row_perm.iter().map(|&i| self.row_labels[i].clone()).collect(),
            col_labels: col_perm.iter().map(|&j| self.col_labels[j].clone()).collect(),
            counts,
            sums,
            means,
            grand_mean: self.grand_mean,
            total_count: self.total_count,
        })
    }

    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.ncols() + col
    }
}

fn validate_permutation(perm: &[usize], n: usize) -> Result<(), CrosstabError> {
    if perm.len() != n {
        return Err(CrosstabError::BadPermutation {
            got: perm.len(),
            expected: n,
        });
    }
    let mut seen = vec![false; n];
    for &i in perm {
        if i >= n || seen[i] {
            return Err(CrosstabError::InvalidIndex { index: i });
        }
        seen[i] = true;
    }
    Ok(())
}

/// Cross-tabulate `df` over two categorical columns.
///
/// With a value column, each cell carries the count, sum, and mean of that
/// column over rows where both categories and the value are non-null. Without
/// one, only trip counts are aggregated. Category labels are sorted
/// (numerically when every label parses as an integer, so hour columns order
/// 0..23 rather than lexically).
pub fn cross_tabulate(
    df: &DataFrame,
    row_col: &str,
    col_col: &str,
    value_col: Option<&str>,
) -> Result<CrossTab, CrosstabError> {
    let mut lf = df.clone().lazy().filter(
        col(row_col)
            .is_not_null()
            .and(col(col_col).is_not_null()),
    );

    let mut agg_exprs = vec![len().alias("__count")];
    if let Some(value) = value_col {
        lf = lf.filter(col(value).is_not_null());
        agg_exprs.push(
            col(value)
                .cast(DataType::Float64)
                .sum()
                .alias("__sum"),
        );
        agg_exprs.push(
            col(value)
                .cast(DataType::Float64)
                .mean()
                .alias("__mean"),
        );
    }

    let grouped = lf
        .group_by([
            col(row_col).cast(DataType::String).alias("__row"),
            col(col_col).cast(DataType::String).alias("__col"),
        ])
        .agg(agg_exprs)
        .collect()?;

    let row_ca = grouped.column("__row")?.str()?.clone();
    let col_ca = grouped.column("__col")?.str()?.clone();
    let count_col = grouped.column("__count")?.cast(&DataType::UInt64)?;
    let count_ca = count_col.u64()?;

    let mut row_labels: Vec<String> = Vec::new();
    let mut col_labels: Vec<String> = Vec::new();
    for label in row_ca.iter().flatten() {
        if !row_labels.iter().any(|l| l == label) {
            row_labels.push(label.to_string());
        }
    }
    for label in col_ca.iter().flatten() {
        if !col_labels.iter().any(|l| l == label) {
            col_labels.push(label.to_string());
        }
    }
    sort_categories(&mut row_labels);
    sort_categories(&mut col_labels);

    let row_index: HashMap<&str, usize> = row_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();
    let col_index: HashMap<&str, usize> = col_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();

    let ncols = col_labels.len();
    let ncells = row_labels.len() * ncols;
    let mut counts = vec![0u64; ncells];
    let mut sums = vec![0.0f64; ncells];

    let sum_ca = match value_col {
        Some(_) => Some(grouped.column("__sum")?.f64()?.clone()),
        None => None,
    };

    let mut total_count = 0u64;
    let mut total_sum = 0.0f64;

    for group in 0..grouped.height() {
        let (Some(row_label), Some(col_label), Some(count)) =
            (row_ca.get(group), col_ca.get(group), count_ca.get(group))
        else {
            continue;
        };
        let cell = row_index[row_label] * ncols + col_index[col_label];
        counts[cell] = count;
        total_count += count;

        if let Some(ref sum_ca) = sum_ca {
            let sum = sum_ca.get(group).unwrap_or(0.0);
            sums[cell] = sum;
            total_sum += sum;
        }
    }

    let grand_mean = if value_col.is_some() && total_count > 0 {
        total_sum / total_count as f64
    } else {
        0.0
    };

    // Empty cells report the overall mean (count-only tables stay at zero)
    let means: Vec<f64> = counts
        .iter()
        .zip(sums.iter())
        .map(|(&count, &sum)| {
            if count > 0 && value_col.is_some() {
                sum / count as f64
            } else {
                grand_mean
            }
        })
        .collect();

    Ok(CrossTab {
        value_column: value_col.map(|v| v.to_string()),
        row_labels,
        col_labels,
        counts,
        sums,
        means,
        grand_mean,
        total_count,
    })
}

/// Cross-tabulate several value columns over the same category pair.
///
/// Metrics are independent, so they aggregate in parallel via Rayon with a
/// progress bar tracking completed metrics.
pub fn cross_tabulate_metrics(
    df: &DataFrame,
    row_col: &str,
    col_col: &str,
    metrics: &[String],
) -> Result<Vec<CrossTab>, CrosstabError> {
    let pb = create_progress_bar(metrics.len() as u64, "   Aggregating metrics");

    let tables: Result<Vec<CrossTab>, CrosstabError> = metrics
        .par_iter()
        .map(|metric| {
            let table = cross_tabulate(df, row_col, col_col, Some(metric.as_str()));
            pb.inc(1);
            table
        })
        .collect();

    pb.finish_and_clear();
    tables
}

/// Sort category labels, numerically when every label is an integer.
fn sort_categories(labels: &mut [String]) {
    let all_numeric = labels.iter().all(|l| l.parse::<i64>().is_ok());
    if all_numeric {
        labels.sort_by_key(|l| l.parse::<i64>().unwrap_or_default());
    } else {
        labels.sort();
    }
}
