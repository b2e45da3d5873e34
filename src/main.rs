use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use logsift::analyzer::{Summary, parse_file};
use logsift::cli::Args;
use logsift::formatter::{Report, print_report};
use logsift::query::{RecordFilter, paginate};

fn init_logging() {
    // Diagnostics go to stderr so stdout stays clean for reports and JSON.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "logsift=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_filter(args: &Args) -> Result<RecordFilter> {
    let mut filter = RecordFilter::new();
    if let Some(level) = &args.level {
        filter = filter.level(level)?;
    }
    if let Some(term) = &args.search {
        filter = filter.search(term);
    }
    if let Some(start) = &args.start {
        filter = filter.start(start)?;
    }
    if let Some(end) = &args.end {
        filter = filter.end(end)?;
    }
    Ok(filter)
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    // Reject bad filter arguments before touching the file
    let filter = build_filter(&args)?;

    let outcome = parse_file(&args.file, &args.parse_options())
        .with_context(|| format!("Could not analyze {}", args.file))?;

    let filtered = filter.apply(&outcome.records);
    debug!(
        total = outcome.records.len(),
        matching = filtered.len(),
        "applied filters"
    );

    let page = paginate(&filtered, args.page, args.page_size());
    let summary = args.stats.then(|| Summary::from_records(&outcome.records));

    let file_name = Path::new(&args.file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.clone());

    let report = Report {
        page: &page,
        stats: &outcome.stats,
        total_lines: outcome.records.len(),
        filtered_lines: filtered.len(),
        file_name: &file_name,
        truncated: outcome.truncated,
        summary: summary.as_ref(),
    };

    print_report(&report, args.json).context("Could not write report")?;

    Ok(())
}
