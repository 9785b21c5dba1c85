//! Analysis export: JSON report, CSV matrices, and zip bundles

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;
use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, ZipWriter};

use crate::pipeline::{CrossTab, ShareTable};
use crate::report::PairRow;

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct ReportMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    /// Gridlock version
    pub gridlock_version: String,
    /// Input file path
    pub input_file: String,
    /// Pickup neighborhood column
    pub pickup_column: String,
    /// Dropoff neighborhood column
    pub dropoff_column: String,
    /// Value columns aggregated per pair
    pub metrics: Vec<String>,
    /// Linkage used for seriation
    pub linkage: String,
    /// Neighborhood cap, if one was applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_neighborhoods: Option<usize>,
}

/// A crosstab's matrices in nested-list form for JSON output
#[derive(Serialize)]
pub struct MatrixExport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_column: Option<String>,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub counts: Vec<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub means: Option<Vec<Vec<f64>>>,
}

impl MatrixExport {
    pub fn from_crosstab(crosstab: &CrossTab) -> Self {
        let counts = (0..crosstab.nrows())
            .map(|i| (0..crosstab.ncols()).map(|j| crosstab.count(i, j)).collect())
            .collect();
        let means = crosstab.value_column().map(|_| {
            (0..crosstab.nrows())
                .map(|i| (0..crosstab.ncols()).map(|j| crosstab.mean(i, j)).collect())
                .collect()
        });

        MatrixExport {
            value_column: crosstab.value_column().map(|v| v.to_string()),
            row_labels: crosstab.row_labels().to_vec(),
            col_labels: crosstab.col_labels().to_vec(),
            counts,
            means,
        }
    }
}

/// Share matrices in nested-list form for JSON output
#[derive(Serialize)]
pub struct ShareExport {
    pub row_shares: Vec<Vec<f64>>,
    pub col_shares: Vec<Vec<f64>>,
    pub grand_shares: Vec<Vec<f64>>,
}

impl ShareExport {
    pub fn from_table(shares: &ShareTable) -> Self {
        let collect = |f: &dyn Fn(usize, usize) -> f64| -> Vec<Vec<f64>> {
            (0..shares.nrows())
                .map(|i| (0..shares.ncols()).map(|j| f(i, j)).collect())
                .collect()
        };

        ShareExport {
            row_shares: collect(&|i, j| shares.row_share(i, j)),
            col_shares: collect(&|i, j| shares.col_share(i, j)),
            grand_shares: collect(&|i, j| shares.grand_share(i, j)),
        }
    }
}

/// One joined per-pair entry
#[derive(Serialize)]
pub struct PairExportEntry {
    pub pickup: String,
    pub dropoff: String,
    pub trips: u64,
    /// Means aligned with `metadata.metrics`
    pub means: Vec<f64>,
}

impl From<&PairRow> for PairExportEntry {
    fn from(row: &PairRow) -> Self {
        PairExportEntry {
            pickup: row.pickup.clone(),
            dropoff: row.dropoff.clone(),
            trips: row.trips,
            means: row.metric_means.clone(),
        }
    }
}

/// Complete analysis report
#[derive(Serialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    /// Neighborhood labels in seriation order
    pub neighborhood_order: Vec<String>,
    /// Trip-count crosstab in seriation order
    pub trips: MatrixExport,
    /// Percentage shares of the trip-count matrix
    pub shares: ShareExport,
    /// Per-metric crosstabs in seriation order
    pub metrics: Vec<MatrixExport>,
    /// Joined per-pair table, busiest first
    pub top_pairs: Vec<PairExportEntry>,
}

/// Write the analysis report as pretty-printed JSON.
pub fn write_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

/// Which matrix of a crosstab to export
#[derive(Debug, Clone, Copy)]
pub enum MatrixKind {
    Counts,
    Means,
}

/// Write one matrix of a crosstab as CSV, row labels in the first column.
pub fn write_matrix_csv(crosstab: &CrossTab, kind: MatrixKind, path: &Path) -> Result<()> {
    let mut columns: Vec<Column> = Vec::with_capacity(crosstab.ncols() + 1);
    columns.push(Column::new(
        "neighborhood".into(),
        crosstab.row_labels().to_vec(),
    ));

    for (j, label) in crosstab.col_labels().iter().enumerate() {
        let column = match kind {
            MatrixKind::Counts => {
                let values: Vec<u64> =
                    (0..crosstab.nrows()).map(|i| crosstab.count(i, j)).collect();
                Column::new(label.as_str().into(), values)
            }
            MatrixKind::Means => {
                let values: Vec<f64> =
                    (0..crosstab.nrows()).map(|i| crosstab.mean(i, j)).collect();
                Column::new(label.as_str().into(), values)
            }
        };
        columns.push(column);
    }

    let mut df = DataFrame::new(columns).context("Failed to assemble matrix frame")?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .finish(&mut df)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;

    Ok(())
}

/// Bundle artifacts into a single deflate-compressed zip archive.
pub fn bundle_artifacts(paths: &[PathBuf], zip_path: &Path) -> Result<()> {
    let file = File::create(zip_path)
        .with_context(|| format!("Failed to create archive: {}", zip_path.display()))?;
    let mut archive = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Artifact has no file name: {}", path.display()))?;
        archive
            .start_file(name, options)
            .with_context(|| format!("Failed to add {} to archive", name))?;
        let mut input = File::open(path)
            .with_context(|| format!("Failed to open artifact: {}", path.display()))?;
        io::copy(&mut input, &mut archive)
            .with_context(|| format!("Failed to compress artifact: {}", path.display()))?;
    }

    archive.finish().context("Failed to finalize archive")?;
    Ok(())
}
