//! CSV to Parquet conversion for trip extracts, with streaming support

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use polars::prelude::*;

use crate::utils::create_spinner;

/// Columns a trip extract is expected to carry. Conversion proceeds either
/// way; missing ones are pointed out so a later analysis run does not surprise.
const EXPECTED_COLUMNS: [&str; 2] = ["pickup_neighborhood", "dropoff_neighborhood"];

/// Convert a CSV trip extract to Parquet without collecting it into memory.
///
/// The default output path is the input path with a `.parquet` extension.
/// Streaming via `sink_parquet()` keeps memory flat for large extracts.
pub fn run_convert(input: &Path, output: Option<&Path>, infer_schema_length: usize) -> Result<()> {
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension("parquet"),
    };

    println!(
        "\n {} Converting trip extract to Parquet",
        style("◆").cyan().bold()
    );
    println!("   Input:  {}", style(input.display()).dim());
    println!("   Output: {}", style(output_path.display()).dim());
    println!();

    // 0 means full table scan for schema inference
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let spinner = create_spinner("Reading CSV schema...");
    let lf = LazyCsvReader::new(input)
        .with_infer_schema_length(schema_length)
        .with_rechunk(false) // No rechunking needed for streaming
        .finish()
        .with_context(|| format!("Failed to read CSV file: {}", input.display()))?;

    let schema = lf.clone().collect_schema()?;
    let column_names: Vec<String> = schema.iter_names().map(|s| s.to_string()).collect();
    spinner.finish_with_message(format!(
        "{} Schema loaded ({} columns)",
        style("✓").green(),
        column_names.len()
    ));

    let missing: Vec<&str> = EXPECTED_COLUMNS
        .iter()
        .copied()
        .filter(|expected| !column_names.iter().any(|c| c == expected))
        .collect();
    if !missing.is_empty() {
        println!(
            "   {} Not a standard trip extract, missing: {}",
            style("!").yellow().bold(),
            missing.join(", ")
        );
    }

    let spinner = create_spinner("Streaming to Parquet...");
    let parquet_options = ParquetWriteOptions {
        compression: ParquetCompression::Snappy,
        statistics: StatisticsOptions::full(),
        row_group_size: Some(100_000),
        ..Default::default()
    };
    lf.sink_parquet(&output_path, parquet_options, None)
        .with_context(|| format!("Failed to write Parquet file: {}", output_path.display()))?;
    spinner.finish_with_message(format!("{} Parquet written", style("✓").green()));

    report_sizes(input, &output_path, column_names.len());

    println!();
    println!(" {} Conversion complete!", style("✓").green().bold());

    Ok(())
}

/// Print row count and file size comparison for the finished conversion.
fn report_sizes(input: &Path, output: &Path, num_cols: usize) {
    let megabytes =
        |path: &Path| std::fs::metadata(path).map(|m| m.len()).unwrap_or(0) as f64 / (1024.0 * 1024.0);
    let input_size = megabytes(input);
    let output_size = megabytes(output);

    // Parquet metadata makes the row count cheap to read back
    let row_count = parquet_row_count(output).unwrap_or(0);

    println!();
    println!(
        "   {} trips × {} columns",
        style(row_count).yellow(),
        style(num_cols).yellow()
    );
    println!("   {} File sizes:", style("✧").cyan());
    println!("      CSV:     {:.2} MB", input_size);
    println!("      Parquet: {:.2} MB", output_size);

    if output_size < input_size && input_size > 0.0 {
        let reduction = ((input_size - output_size) / input_size) * 100.0;
        println!(
            "      {}",
            style(format!("↓ {:.1}% smaller", reduction)).green()
        );
    }
}

fn parquet_row_count(path: &Path) -> Result<usize> {
    let lf = LazyFrame::scan_parquet(path, Default::default())?;
    let df = lf.select([len()]).collect()?;
    let count = df.column("len")?.get(0)?;
    match count {
        AnyValue::UInt32(n) => Ok(n as usize),
        AnyValue::UInt64(n) => Ok(n as usize),
        AnyValue::Int32(n) => Ok(n as usize),
        AnyValue::Int64(n) => Ok(n as usize),
        _ => Ok(0),
    }
}
