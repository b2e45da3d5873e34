// Declare our modules
pub mod accelerated;
pub mod analyzer;
pub mod cli;
pub mod error;
pub mod formatter;
pub mod level;
pub mod parser;
pub mod query;
pub mod timestamp;

// Re-export key types for convenience
pub use analyzer::{
    LevelStats, LogAnalyzer, Parallelism, ParseOptions, ParseOutcome, Summary, level_counts, parse,
    parse_file, parse_with,
};
pub use cli::Args;
pub use error::{ParseError, QueryError};
pub use formatter::{Report, print_report};
pub use level::normalize_level;
pub use parser::{LineClassifier, LogFormat, LogRecord, LogRule};
pub use query::{Page, Pagination, RecordFilter, filter_records, paginate};
pub use timestamp::normalize_timestamp;
