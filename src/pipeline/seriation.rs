//! Similarity-based reordering of categories (seriation)
//!
//! Builds a dissimilarity matrix from a crosstab's row count profiles and
//! orders the categories by agglomerative hierarchical clustering, so that
//! similar neighborhoods end up adjacent in the reordered matrices.

use faer::Mat;
use thiserror::Error;

use crate::pipeline::CrossTab;

/// Dissimilarity assigned to profile pairs where correlation is undefined
/// (constant profiles). Equals the maximum of 1 - r, pushing such categories
/// to the periphery of the ordering.
const MAX_DISSIMILARITY: f64 = 2.0;

/// Symmetry tolerance when validating a dissimilarity matrix
const SYMMETRY_TOLERANCE: f64 = 1e-9;

#[derive(Error, Debug)]
pub enum SeriationError {
    #[error("Dissimilarity matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("Dissimilarity matrix is not symmetric at ({row}, {col})")]
    Asymmetric { row: usize, col: usize },
}

/// Linkage criterion for agglomerative clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// Weighted average of member distances (UPGMA)
    Average,
    /// Minimum distance between members
    Single,
    /// Maximum distance between members
    Complete,
}

impl std::str::FromStr for Linkage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "average" => Ok(Linkage::Average),
            "single" => Ok(Linkage::Single),
            "complete" => Ok(Linkage::Complete),
            other => Err(format!(
                "Unknown linkage '{}'. Options: average, single, complete",
                other
            )),
        }
    }
}

impl std::fmt::Display for Linkage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Linkage::Average => write!(f, "average"),
            Linkage::Single => write!(f, "single"),
            Linkage::Complete => write!(f, "complete"),
        }
    }
}

/// Build a symmetric dissimilarity matrix from the crosstab's row profiles.
///
/// Profiles are standardized per row; dissimilarity is 1 - Pearson
/// correlation between profile vectors, in [0, 2]. Rows with a constant
/// profile have no defined correlation and get the maximal dissimilarity of
/// 2.0 against every other row. The diagonal is zero.
pub fn profile_dissimilarity(crosstab: &CrossTab) -> Mat<f64> {
    let n = crosstab.nrows();
    let width = crosstab.ncols();

    // Standardize each profile: (x - mean) / (std * sqrt(width)), so the dot
    // product of two standardized profiles is their Pearson correlation.
    let standardized: Vec<Option<Vec<f64>>> = (0..n)
        .map(|i| {
            let profile = crosstab.row_profile(i);
            if width == 0 {
                return None;
            }
            let mean = profile.iter().sum::<f64>() / width as f64;
            let var = profile.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / width as f64;
            let std = var.sqrt();
            if std == 0.0 {
                return None;
            }
            Some(
                profile
                    .iter()
                    .map(|x| (x - mean) / (std * (width as f64).sqrt()))
                    .collect(),
            )
        })
        .collect();

    let mut dissimilarity = Mat::<f64>::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = match (&standardized[i], &standardized[j]) {
                (Some(zi), Some(zj)) => {
                    let r: f64 = zi.iter().zip(zj.iter()).map(|(a, b)| a * b).sum();
                    1.0 - r.clamp(-1.0, 1.0)
                }
                _ => MAX_DISSIMILARITY,
            };
            dissimilarity[(i, j)] = d;
            dissimilarity[(j, i)] = d;
        }
    }

    dissimilarity
}

/// Order categories so similar ones are adjacent.
///
/// Runs agglomerative clustering over the dissimilarity matrix with the given
/// linkage and returns the leaf order as a permutation of `0..n`. Merges with
/// equal distance break ties toward the lowest cluster indices, making the
/// ordering deterministic. Matrices of size 0 or 1 return the identity.
pub fn seriation_order(
    dissimilarity: &Mat<f64>,
    linkage: Linkage,
) -> Result<Vec<usize>, SeriationError> {
    let n = dissimilarity.nrows();
    if dissimilarity.ncols() != n {
        return Err(SeriationError::NotSquare {
            rows: n,
            cols: dissimilarity.ncols(),
        });
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if (dissimilarity[(i, j)] - dissimilarity[(j, i)]).abs() > SYMMETRY_TOLERANCE {
                return Err(SeriationError::Asymmetric { row: i, col: j });
            }
        }
    }

    if n <= 1 {
        return Ok((0..n).collect());
    }

    // Active clusters, their leaf members in order, and pairwise distances.
    // O(n^3) overall, fine for neighborhood-sized category sets.
    let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    let mut active: Vec<bool> = vec![true; n];
    let mut dist: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| dissimilarity[(i, j)]).collect())
        .collect();

    for _ in 0..(n - 1) {
        // Closest active pair, ties broken by lowest (i, j)
        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..members.len() {
            if !active[i] {
                continue;
            }
            for j in (i + 1)..members.len() {
                if !active[j] {
                    continue;
                }
                let d = dist[i][j];
                if best.map_or(true, |(_, _, bd)| d < bd) {
                    best = Some((i, j, d));
                }
            }
        }

        let Some((a, b, _)) = best else { break };

        // Merge b into a new trailing cluster
        let size_a = members[a].len() as f64;
        let size_b = members[b].len() as f64;
        let mut merged = members[a].clone();
        merged.extend(members[b].iter().copied());

        let merged_dist: Vec<f64> = (0..members.len())
            .map(|k| match linkage {
                Linkage::Average => (size_a * dist[a][k] + size_b * dist[b][k]) / (size_a + size_b),
                Linkage::Single => dist[a][k].min(dist[b][k]),
                Linkage::Complete => dist[a][k].max(dist[b][k]),
            })
            .collect();

        active[a] = false;
        active[b] = false;

        for (k, row) in dist.iter_mut().enumerate() {
            row.push(merged_dist[k]);
        }
        let mut new_row = merged_dist;
        new_row.push(0.0);
        dist.push(new_row);
        members.push(merged);
        active.push(true);
    }

    let order = members
        .iter()
        .zip(active.iter())
        .rev()
        .find(|(_, &is_active)| is_active)
        .map(|(m, _)| m.clone())
        .unwrap_or_else(|| (0..n).collect());

    Ok(order)
}

/// Align one axis's labels to an already-ordered label sequence.
///
/// Returns a permutation of `labels` indices: labels that appear in `ordered`
/// come first, in that order; labels unknown to `ordered` keep their current
/// relative order at the end. Lets a seriation computed on the pickup axis
/// drive the dropoff axis (and metric tables with differing label sets).
pub fn align_to_order(ordered: &[String], labels: &[String]) -> Vec<usize> {
    let mut perm: Vec<usize> = Vec::with_capacity(labels.len());
    for target in ordered {
        if let Some(i) = labels.iter().position(|l| l == target) {
            perm.push(i);
        }
    }
    for (i, label) in labels.iter().enumerate() {
        if !ordered.contains(label) {
            perm.push(i);
        }
    }
    perm
}
