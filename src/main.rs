//! Gridlock: Trip Cross-Tabulation CLI Tool
//!
//! A command-line tool for cross-tabulating taxi trips by pickup/dropoff
//! neighborhood, reordering neighborhoods by similarity, and exporting the
//! resulting aggregate matrices.

mod cli;
mod pipeline;
mod report;
mod utils;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use cli::{confirm_write_artifacts, Cli, Commands};
use pipeline::{
    align_to_order, cross_tabulate, cross_tabulate_metrics, load_dataset_with_progress,
    prepare_trips, profile_dissimilarity, seriation_order, validate_columns, CrossTab, Linkage,
    ShareTable, TripColumns,
};
use report::{
    bundle_artifacts, display_top_pairs, join_pair_table, write_matrix_csv, write_report,
    AnalysisReport, AnalysisSummary, MatrixExport, MatrixKind, PairExportEntry, ReportMetadata,
    ShareExport,
};
use utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_count, print_info, print_step_header, print_step_time, print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Convert {
                input,
                output,
                infer_schema_length,
            } => cli::convert::run_convert(input, output.as_deref(), *infer_schema_length),
        };
    }

    // Main analysis pipeline - require input
    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;

    // Derive output directory from input if not provided
    let output_dir = cli.output_dir().unwrap();

    // Linkage was validated by clap; parse into the typed variant
    let linkage: Linkage = cli
        .linkage
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    // Print styled banner
    print_banner(env!("CARGO_PKG_VERSION"));

    // Print configuration card
    print_config(
        input,
        &cli.pickup_column,
        &cli.dropoff_column,
        &cli.metrics,
        &output_dir,
        cli.top,
        &cli.linkage,
    );

    // Load dataset (with spinner)
    let step_start = Instant::now();
    println!();
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(input, cli.infer_schema_length)?;
    print_success("Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    let mut summary = AnalysisSummary::new(rows, cli.metrics.clone());
    let load_elapsed = step_start.elapsed();
    summary.set_load_time(load_elapsed);
    print_step_time(load_elapsed);

    let columns = TripColumns {
        pickup: cli.pickup_column.clone(),
        dropoff: cli.dropoff_column.clone(),
        datetime: cli.datetime_column.clone(),
        ..TripColumns::default()
    };

    // Step 1: Trip preparation
    print_step_header(1, "Trip Preparation");

    let step_start = Instant::now();
    validate_columns(&df, &columns, &cli.metrics)?;
    let spinner = create_spinner("Preparing trip columns...");
    let trips_df = prepare_trips(&df, &columns, cli.top)?;
    finish_with_success(&spinner, "Trip table prepared");

    let retained = trips_df.height();
    summary.rows_retained = retained;
    if retained < rows {
        print_count("row(s) with a null neighborhood", rows - retained, Some("(dropped)"));
    } else {
        print_info("All rows carry both neighborhoods");
    }
    let prepare_elapsed = step_start.elapsed();
    summary.set_prepare_time(prepare_elapsed);
    print_step_time(prepare_elapsed);

    // Step 2: Cross-tabulation
    print_step_header(2, "Cross-Tabulation");

    let step_start = Instant::now();
    let trip_counts = cross_tabulate(&trips_df, &columns.pickup, &columns.dropoff, None)?;
    let metric_tables =
        cross_tabulate_metrics(&trips_df, &columns.pickup, &columns.dropoff, &cli.metrics)?;

    let pairs_observed = trip_counts.counts().iter().filter(|&&c| c > 0).count();
    summary.neighborhoods = trip_counts.nrows();
    summary.pairs_observed = pairs_observed;

    print_count(
        "neighborhood pair(s) with trips",
        pairs_observed,
        Some(&format!("({} pickup neighborhoods)", trip_counts.nrows())),
    );
    print_success("Cross-tabulation complete");
    let crosstab_elapsed = step_start.elapsed();
    summary.set_crosstab_time(crosstab_elapsed);
    print_step_time(crosstab_elapsed);

    // Step 3: Seriation
    print_step_header(3, "Seriation");

    let step_start = Instant::now();
    let spinner = create_spinner("Ordering neighborhoods by similarity...");
    let dissimilarity = profile_dissimilarity(&trip_counts);
    let row_order = seriation_order(&dissimilarity, linkage)?;
    let ordered_labels: Vec<String> = row_order
        .iter()
        .map(|&i| trip_counts.row_labels()[i].to_string())
        .collect();

    let col_order = align_to_order(&ordered_labels, trip_counts.col_labels());
    let ordered_counts = trip_counts.reorder(&row_order, &col_order)?;
    let ordered_metrics: Vec<CrossTab> = metric_tables
        .iter()
        .map(|table| {
            let rows = align_to_order(&ordered_labels, table.row_labels());
            let cols = align_to_order(&ordered_labels, table.col_labels());
            table.reorder(&rows, &cols)
        })
        .collect::<Result<Vec<_>, _>>()?;
    finish_with_success(&spinner, "Neighborhoods reordered");

    let preview: Vec<&str> = ordered_labels.iter().take(5).map(|s| s.as_str()).collect();
    print_info(&format!("Order starts with: {}", preview.join(" → ")));
    let seriation_elapsed = step_start.elapsed();
    summary.set_seriation_time(seriation_elapsed);
    print_step_time(seriation_elapsed);

    // Step 4: Share normalization
    print_step_header(4, "Share Normalization");

    let step_start = Instant::now();
    let shares = ShareTable::from_crosstab(&ordered_counts);
    print_success("Row, column, and grand-total shares computed");
    let shares_elapsed = step_start.elapsed();
    print_step_time(shares_elapsed);

    // Step 5: Export artifacts
    print_step_header(5, "Export Artifacts");

    let step_start = Instant::now();
    let planned_artifacts = 2 + ordered_metrics.len() + usize::from(cli.bundle);
    if !cli.no_confirm && !confirm_write_artifacts(planned_artifacts, &output_dir)? {
        println!("Cancelled by user.");
        return Ok(());
    }

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let spinner = create_spinner("Writing artifacts...");
    let mut artifacts: Vec<PathBuf> = Vec::new();

    let pair_rows = join_pair_table(&ordered_counts, &ordered_metrics);
    let analysis_report = AnalysisReport {
        metadata: ReportMetadata {
            timestamp: chrono::Utc::now().to_rfc3339(),
            gridlock_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input.display().to_string(),
            pickup_column: columns.pickup.clone(),
            dropoff_column: columns.dropoff.clone(),
            metrics: cli.metrics.clone(),
            linkage: linkage.to_string(),
            top_neighborhoods: cli.top,
        },
        neighborhood_order: ordered_labels,
        trips: MatrixExport::from_crosstab(&ordered_counts),
        shares: ShareExport::from_table(&shares),
        metrics: ordered_metrics.iter().map(MatrixExport::from_crosstab).collect(),
        top_pairs: pair_rows.iter().map(PairExportEntry::from).collect(),
    };

    let report_path = cli.report_path().unwrap();
    write_report(&analysis_report, &report_path)?;
    artifacts.push(report_path);

    let counts_path = output_dir.join("trip_counts.csv");
    write_matrix_csv(&ordered_counts, MatrixKind::Counts, &counts_path)?;
    artifacts.push(counts_path);

    for table in &ordered_metrics {
        if let Some(metric) = table.value_column() {
            let path = output_dir.join(format!("{}_means.csv", metric));
            write_matrix_csv(table, MatrixKind::Means, &path)?;
            artifacts.push(path);
        }
    }

    if cli.bundle {
        let bundle_path = cli.bundle_path().unwrap();
        bundle_artifacts(&artifacts, &bundle_path)?;
        artifacts.push(bundle_path);
    }

    finish_with_success(
        &spinner,
        &format!("Saved {} artifact(s) to {}", artifacts.len(), output_dir.display()),
    );
    for artifact in &artifacts {
        summary.add_artifact(artifact.display().to_string());
    }
    let export_elapsed = step_start.elapsed();
    summary.set_export_time(export_elapsed);
    print_step_time(export_elapsed);

    // Display the busiest pairs and the run summary
    display_top_pairs(&pair_rows, &cli.metrics, cli.top_pairs);
    summary.display();

    // Final completion message
    print_completion();

    Ok(())
}
