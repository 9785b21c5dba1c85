//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gridlock - Cross-tabulate taxi trips by neighborhood, reorder by
/// similarity, and export the aggregate matrices
#[derive(Parser, Debug)]
#[command(name = "gridlock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Pickup neighborhood column
    #[arg(long, default_value = "pickup_neighborhood")]
    pub pickup_column: String,

    /// Dropoff neighborhood column
    #[arg(long, default_value = "dropoff_neighborhood")]
    pub dropoff_column: String,

    /// Pickup timestamp column, used to derive day-of-week and hour columns
    /// when the dataset does not carry them
    #[arg(long, default_value = "pickup_datetime")]
    pub datetime_column: String,

    /// Value columns to aggregate per neighborhood pair (comma-separated)
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "fare_amount,tip_percent,trip_distance,trip_duration_minutes"
    )]
    pub metrics: Vec<String>,

    /// Keep only the N busiest neighborhoods; the remainder is relabeled
    /// "Other". Unset keeps every neighborhood.
    #[arg(long)]
    pub top: Option<usize>,

    /// Linkage for the seriation ordering.
    /// Options: "average" (default), "single", "complete"
    #[arg(long, default_value = "average", value_parser = validate_linkage)]
    pub linkage: String,

    /// Output directory for artifacts.
    /// Defaults to a '<stem>_gridlock' directory next to the input file.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Number of pairs to show in the terminal summary table
    #[arg(long, default_value = "10")]
    pub top_pairs: usize,

    /// Bundle all artifacts into a single zip archive
    #[arg(long, default_value = "false")]
    pub bundle: bool,

    /// Skip interactive confirmation prompts
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a CSV file to Parquet format
    Convert {
        /// Input file path (CSV)
        input: PathBuf,

        /// Output file path (optional, defaults to input with .parquet extension)
        output: Option<PathBuf>,

        /// Number of rows to use for schema inference.
        /// Use 0 for full table scan (very slow for large files).
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },
}

impl Cli {
    /// Get the input path, if provided.
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// Get the output directory, deriving from the input if not explicitly
    /// provided: a '<stem>_gridlock' directory next to the input file.
    pub fn output_dir(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(self.output_dir.clone().unwrap_or_else(|| {
            let parent = input.parent().unwrap_or_else(|| std::path::Path::new("."));
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            parent.join(format!("{}_gridlock", stem))
        }))
    }

    /// Path of the JSON report inside the output directory.
    pub fn report_path(&self) -> Option<PathBuf> {
        Some(self.output_dir()?.join("report.json"))
    }

    /// Path of the zip bundle, next to the output directory.
    pub fn bundle_path(&self) -> Option<PathBuf> {
        let dir = self.output_dir()?;
        Some(dir.with_extension("zip"))
    }
}

/// Validator for the linkage parameter
fn validate_linkage(s: &str) -> Result<String, String> {
    match s.to_lowercase().as_str() {
        "average" | "single" | "complete" => Ok(s.to_lowercase()),
        _ => Err(format!(
            "linkage must be one of: average, single, complete (got '{}')",
            s
        )),
    }
}
