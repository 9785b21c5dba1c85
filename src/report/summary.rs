//! Run summary and per-pair table display

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::CrossTab;

/// One joined row of the per-pair aggregate tables: trip count plus the mean
/// of every requested metric for a (pickup, dropoff) pair.
#[derive(Debug, Clone)]
pub struct PairRow {
    pub pickup: String,
    pub dropoff: String,
    pub trips: u64,
    pub metric_means: Vec<f64>,
}

/// Join the trip-count crosstab with the per-metric crosstabs into one
/// per-pair table, sorted by trip count descending.
///
/// Metric tables may cover slightly different label sets (their null patterns
/// differ); pairs a metric table does not know fall back to that metric's
/// overall mean, consistent with the empty-cell policy of the crosstab.
pub fn join_pair_table(trips: &CrossTab, metrics: &[CrossTab]) -> Vec<PairRow> {
    let mut rows = Vec::new();

    for i in 0..trips.nrows() {
        for j in 0..trips.ncols() {
            let count = trips.count(i, j);
            if count == 0 {
                continue;
            }
            let pickup = &trips.row_labels()[i];
            let dropoff = &trips.col_labels()[j];

            let metric_means: Vec<f64> = metrics
                .iter()
                .map(|table| {
                    match (table.row_index(pickup), table.col_index(dropoff)) {
                        (Some(mi), Some(mj)) => table.mean(mi, mj),
                        _ => table.grand_mean(),
                    }
                })
                .collect();

            rows.push(PairRow {
                pickup: pickup.clone(),
                dropoff: dropoff.clone(),
                trips: count,
                metric_means,
            });
        }
    }

    rows.sort_by(|a, b| {
        b.trips
            .cmp(&a.trips)
            .then_with(|| a.pickup.cmp(&b.pickup))
            .then_with(|| a.dropoff.cmp(&b.dropoff))
    });

    rows
}

/// Print the busiest pairs with their per-metric means.
pub fn display_top_pairs(pairs: &[PairRow], metric_names: &[String], limit: usize) {
    println!();
    println!(
        "    {} {}",
        style("🚕").cyan(),
        style("BUSIEST NEIGHBORHOOD PAIRS").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec![
        Cell::new("Pickup").add_attribute(Attribute::Bold),
        Cell::new("Dropoff").add_attribute(Attribute::Bold),
        Cell::new("Trips").add_attribute(Attribute::Bold),
    ];
    for name in metric_names {
        header.push(Cell::new(format!("avg {}", name)).add_attribute(Attribute::Bold));
    }
    table.set_header(header);

    for pair in pairs.iter().take(limit) {
        let mut row = vec![
            Cell::new(&pair.pickup),
            Cell::new(&pair.dropoff),
            Cell::new(pair.trips).fg(Color::Yellow),
        ];
        for mean in &pair.metric_means {
            row.push(Cell::new(format!("{:.2}", mean)));
        }
        table.add_row(row);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Summary of the full analysis run
#[derive(Debug, Default)]
pub struct AnalysisSummary {
    pub rows_loaded: usize,
    pub rows_retained: usize,
    pub neighborhoods: usize,
    pub pairs_observed: usize,
    pub metrics: Vec<String>,
    pub artifacts: Vec<String>,
    load_time: Duration,
    prepare_time: Duration,
    crosstab_time: Duration,
    seriation_time: Duration,
    export_time: Duration,
}

impl AnalysisSummary {
    pub fn new(rows_loaded: usize, metrics: Vec<String>) -> Self {
        Self {
            rows_loaded,
            rows_retained: rows_loaded,
            metrics,
            ..Default::default()
        }
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = elapsed;
    }

    pub fn set_prepare_time(&mut self, elapsed: Duration) {
        self.prepare_time = elapsed;
    }

    pub fn set_crosstab_time(&mut self, elapsed: Duration) {
        self.crosstab_time = elapsed;
    }

    pub fn set_seriation_time(&mut self, elapsed: Duration) {
        self.seriation_time = elapsed;
    }

    pub fn set_export_time(&mut self, elapsed: Duration) {
        self.export_time = elapsed;
    }

    pub fn add_artifact(&mut self, artifact: String) {
        self.artifacts.push(artifact);
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("ANALYSIS SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Rows Loaded"),
            Cell::new(self.rows_loaded),
        ]);

        let dropped = self.rows_loaded.saturating_sub(self.rows_retained);
        table.add_row(vec![
            Cell::new("🗑️  Rows Dropped"),
            Cell::new(dropped).fg(if dropped == 0 { Color::White } else { Color::Red }),
        ]);

        table.add_row(vec![
            Cell::new("📍 Neighborhoods"),
            Cell::new(self.neighborhoods).fg(Color::Cyan),
        ]);

        table.add_row(vec![
            Cell::new("🔗 Pairs Observed"),
            Cell::new(self.pairs_observed).fg(Color::Cyan),
        ]);

        table.add_row(vec![
            Cell::new("📊 Metrics"),
            Cell::new(self.metrics.join(", ")),
        ]);

        table.add_row(vec![
            Cell::new("💾 Artifacts Written"),
            Cell::new(self.artifacts.len())
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        let total = self.load_time
            + self.prepare_time
            + self.crosstab_time
            + self.seriation_time
            + self.export_time;
        table.add_row(vec![
            Cell::new("⏱️  Total Time"),
            Cell::new(format!("{:.2}s", total.as_secs_f64())).fg(Color::Yellow),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.artifacts.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("📝").cyan(),
                style("ARTIFACTS").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for artifact in &self.artifacts {
                println!("      {} {}", style("•").dim(), artifact);
            }
        }
    }
}
