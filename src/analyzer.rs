use std::fs;
use std::path::Path;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::accelerated::line_processing::numbered_lines;
use crate::error::ParseError;
use crate::parser::{ClassifierLimits, LineClassifier, LogRecord};

/// Canonical level to record count.
pub type LevelStats = FxHashMap<String, usize>;

/// Default cap on input size (50 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;
/// Default cap on source lines classified per parse.
pub const DEFAULT_MAX_LINES: usize = 1_000_000;
/// Line count from which [`Parallelism::Auto`] switches to rayon.
pub const PARALLEL_THRESHOLD: usize = 20_000;

/// How lines are spread over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// Parallel above [`PARALLEL_THRESHOLD`] lines, sequential below.
    #[default]
    Auto,
    Always,
    Never,
}

/// Knobs for a single parse call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_input_bytes: u64,
    pub max_lines: usize,
    pub parallelism: Parallelism,
    pub limits: ClassifierLimits,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_lines: DEFAULT_MAX_LINES,
            parallelism: Parallelism::Auto,
            limits: ClassifierLimits::default(),
        }
    }
}

/// Records and level counts produced by one parse pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub records: Vec<LogRecord>,
    pub stats: LevelStats,
    /// Source lines examined, blank ones included.
    pub source_lines: usize,
    /// True when the line budget stopped the pass early.
    pub truncated: bool,
}

pub struct LogAnalyzer {
    classifier: LineClassifier,
    options: ParseOptions,
}

impl Default for LogAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogAnalyzer {
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> Self {
        LogAnalyzer {
            classifier: LineClassifier::with_limits(options.limits),
            options,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    /// Parse an in-memory buffer. Invalid UTF-8 is replaced, not rejected.
    pub fn analyze_bytes(&self, content: &[u8]) -> Result<ParseOutcome, ParseError> {
        if content.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        let size = content.len() as u64;
        if size > self.options.max_input_bytes {
            return Err(ParseError::InputTooLarge {
                size,
                limit: self.options.max_input_bytes,
            });
        }

        let text = String::from_utf8_lossy(content);
        let mut lines = numbered_lines(&text);
        debug!(bytes = content.len(), lines = lines.len(), "split input into lines");

        let truncated = lines.len() > self.options.max_lines;
        if truncated {
            warn!(
                max_lines = self.options.max_lines,
                total_lines = lines.len(),
                "line budget reached, remaining lines were not classified"
            );
            lines.truncate(self.options.max_lines);
        }

        let parallel = match self.options.parallelism {
            Parallelism::Always => true,
            Parallelism::Never => false,
            Parallelism::Auto => lines.len() >= PARALLEL_THRESHOLD,
        };

        let mut outcome = if parallel {
            self.analyze_lines_parallel(&lines)
        } else {
            self.analyze_lines(lines.iter().copied())
        };
        outcome.truncated = truncated;

        info!(
            records = outcome.records.len(),
            source_lines = outcome.source_lines,
            parallel,
            "parse finished"
        );

        Ok(outcome)
    }

    /// Read a file and parse it. The size limit is checked before reading.
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> Result<ParseOutcome, ParseError> {
        let path = path.as_ref();
        let size = fs::metadata(path)?.len();

        if size == 0 {
            return Err(ParseError::EmptyInput);
        }
        if size > self.options.max_input_bytes {
            return Err(ParseError::InputTooLarge {
                size,
                limit: self.options.max_input_bytes,
            });
        }

        let content = fs::read(path)?;
        debug!(path = %path.display(), bytes = content.len(), "read log file");
        self.analyze_bytes(&content)
    }

    /// Classify numbered lines in order, skipping blank ones.
    pub fn analyze_lines<'a, I>(&self, lines: I) -> ParseOutcome
    where
        I: Iterator<Item = (usize, &'a str)>,
    {
        let mut result = ParseOutcome {
            stats: FxHashMap::with_capacity_and_hasher(8, Default::default()),
            ..Default::default()
        };

        for (line_number, line) in lines {
            result.source_lines += 1;
            if line.trim().is_empty() {
                continue;
            }

            let record = self.classifier.classify(line, line_number);
            *result.stats.entry(record.level.clone()).or_insert(0) += 1;
            result.records.push(record);
        }

        result
    }

    /// Classify lines on the rayon pool. Output order and counts match
    /// [`LogAnalyzer::analyze_lines`].
    pub fn analyze_lines_parallel(&self, lines: &[(usize, &str)]) -> ParseOutcome {
        // Smaller chunks for more cores, but not too small to avoid overhead
        let num_cpus = rayon::current_num_threads();
        let chunk_size = std::cmp::max(1000, lines.len() / (num_cpus * 2).max(1));

        let chunk_results: Vec<ParseOutcome> = lines
            .par_chunks(chunk_size)
            .map(|chunk| self.analyze_lines(chunk.iter().copied()))
            .collect();

        self.merge_results(chunk_results)
    }

    /// Concatenate chunk outcomes in order and sum their counts.
    pub fn merge_results(&self, results: Vec<ParseOutcome>) -> ParseOutcome {
        let mut merged = ParseOutcome::default();

        for result in results {
            merged.records.extend(result.records);
            merged.source_lines += result.source_lines;
            merged.truncated |= result.truncated;

            for (level, count) in result.stats {
                *merged.stats.entry(level).or_insert(0) += count;
            }
        }

        merged
    }
}

/// Parse `content` with default options.
pub fn parse(content: &[u8]) -> Result<ParseOutcome, ParseError> {
    LogAnalyzer::new().analyze_bytes(content)
}

pub fn parse_with(content: &[u8], options: &ParseOptions) -> Result<ParseOutcome, ParseError> {
    LogAnalyzer::with_options(options.clone()).analyze_bytes(content)
}

pub fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<ParseOutcome, ParseError> {
    LogAnalyzer::with_options(options.clone()).analyze_file(path)
}

/// Level counts recomputed over a (usually filtered) view.
pub fn level_counts(records: &[LogRecord]) -> LevelStats {
    let mut counts = LevelStats::default();
    for record in records {
        *counts.entry(record.level.clone()).or_insert(0) += 1;
    }
    counts
}

/// Aggregate view over a set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub levels: LevelStats,
    /// Distinct (truncated) messages.
    pub unique_messages: usize,
    pub with_timestamp: usize,
    pub first_timestamp: Option<String>,
    pub last_timestamp: Option<String>,
}

impl Summary {
    pub fn from_records(records: &[LogRecord]) -> Self {
        let mut unique = FxHashSet::default();
        let mut with_timestamp = 0;
        let mut first: Option<&str> = None;
        let mut last: Option<&str> = None;

        for record in records {
            unique.insert(record.message.as_str());
            if let Some(ts) = record.timestamp.as_deref() {
                with_timestamp += 1;
                // Canonical timestamps are fixed width, so string order is time order.
                first = Some(first.map_or(ts, |f| f.min(ts)));
                last = Some(last.map_or(ts, |l| l.max(ts)));
            }
        }

        Summary {
            total: records.len(),
            levels: level_counts(records),
            unique_messages: unique.len(),
            with_timestamp,
            first_timestamp: first.map(String::from),
            last_timestamp: last.map(String::from),
        }
    }

    /// Share of records repeating an earlier message, as a percentage.
    pub fn repetition_ratio(&self) -> f64 {
        if self.total > 0 {
            (1.0 - (self.unique_messages as f64 / self.total as f64)) * 100.0
        } else {
            0.0
        }
    }
}
