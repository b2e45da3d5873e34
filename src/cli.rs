use clap::Parser;

use crate::analyzer::{DEFAULT_MAX_INPUT_BYTES, DEFAULT_MAX_LINES, Parallelism, ParseOptions};

/// Largest page size accepted on the command line.
pub const MAX_PER_PAGE: usize = 1000;

#[derive(Parser, Debug)]
#[clap(name = "logsift")]
#[clap(about = "Classify, filter and page through Apache, Nginx, PHP and generic logs", long_about = None)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Log file to analyze
    pub file: String,

    /// Filter by level (CRITICAL, ERROR, WARNING, NOTICE, INFO, DEBUG, ACCESS or ALL)
    #[clap(short, long)]
    pub level: Option<String>,

    /// Case-insensitive text to search for in the line or message
    #[clap(short, long)]
    pub search: Option<String>,

    /// Only records at or after this time (records without a timestamp always pass)
    #[clap(long)]
    pub start: Option<String>,

    /// Only records at or before this time (records without a timestamp always pass)
    #[clap(long)]
    pub end: Option<String>,

    /// Page to show, starting at 1
    #[clap(short, long, default_value = "1")]
    pub page: usize,

    /// Records per page (1-1000)
    #[clap(long, default_value = "50")]
    pub per_page: usize,

    /// Show summary statistics
    #[clap(long)]
    pub stats: bool,

    /// Output results in JSON format
    #[clap(long)]
    pub json: bool,

    /// Force parallel processing (default: auto-detect based on line count)
    #[clap(long)]
    pub parallel: bool,

    /// Force sequential processing (overrides parallel)
    #[clap(long)]
    pub sequential: bool,

    /// Reject files larger than this many bytes
    #[clap(long, default_value_t = DEFAULT_MAX_INPUT_BYTES)]
    pub max_bytes: u64,

    /// Stop classifying after this many source lines
    #[clap(long, default_value_t = DEFAULT_MAX_LINES)]
    pub max_lines: usize,
}

impl Args {
    pub fn parse_options(&self) -> ParseOptions {
        let parallelism = if self.sequential {
            Parallelism::Never
        } else if self.parallel {
            Parallelism::Always
        } else {
            Parallelism::Auto
        };

        ParseOptions {
            max_input_bytes: self.max_bytes,
            max_lines: self.max_lines,
            parallelism,
            ..Default::default()
        }
    }

    /// Page size clamped to `1..=MAX_PER_PAGE`.
    pub fn page_size(&self) -> usize {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }
}
