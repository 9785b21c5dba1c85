//! Percentage-share normalization of count matrices
//!
//! Turns a count matrix into three share matrices: each cell as a percentage
//! of its row total, its column total, and the grand total. Empty rows and
//! columns produce zero shares rather than NaN.

use crate::pipeline::CrossTab;

/// Row, column, and grand-total percentage shares for a count matrix.
#[derive(Debug, Clone)]
pub struct ShareTable {
    nrows: usize,
    ncols: usize,
    row_shares: Vec<f64>,
    col_shares: Vec<f64>,
    grand_shares: Vec<f64>,
}

impl ShareTable {
    /// Compute shares from a flat row-major count matrix.
    pub fn from_counts(counts: &[u64], nrows: usize, ncols: usize) -> ShareTable {
        debug_assert_eq!(counts.len(), nrows * ncols);

        let row_totals: Vec<u64> = (0..nrows)
            .map(|i| (0..ncols).map(|j| counts[i * ncols + j]).sum())
            .collect();
        let col_totals: Vec<u64> = (0..ncols)
            .map(|j| (0..nrows).map(|i| counts[i * ncols + j]).sum())
            .collect();
        let grand_total: u64 = row_totals.iter().sum();

        let mut row_shares = vec![0.0f64; counts.len()];
        let mut col_shares = vec![0.0f64; counts.len()];
        let mut grand_shares = vec![0.0f64; counts.len()];

        for i in 0..nrows {
            for j in 0..ncols {
                let cell = i * ncols + j;
                let count = counts[cell] as f64;
                if row_totals[i] > 0 {
                    row_shares[cell] = 100.0 * count / row_totals[i] as f64;
                }
                if col_totals[j] > 0 {
                    col_shares[cell] = 100.0 * count / col_totals[j] as f64;
                }
                if grand_total > 0 {
                    grand_shares[cell] = 100.0 * count / grand_total as f64;
                }
            }
        }

        ShareTable {
            nrows,
            ncols,
            row_shares,
            col_shares,
            grand_shares,
        }
    }

    /// Compute shares from a crosstab's count matrix.
    pub fn from_crosstab(crosstab: &CrossTab) -> ShareTable {
        Self::from_counts(crosstab.counts(), crosstab.nrows(), crosstab.ncols())
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Cell share of its row total, in percent.
    pub fn row_share(&self, row: usize, col: usize) -> f64 {
        self.row_shares[row * self.ncols + col]
    }

    /// Cell share of its column total, in percent.
    pub fn col_share(&self, row: usize, col: usize) -> f64 {
        self.col_shares[row * self.ncols + col]
    }

    /// Cell share of the grand total, in percent.
    pub fn grand_share(&self, row: usize, col: usize) -> f64 {
        self.grand_shares[row * self.ncols + col]
    }
}
