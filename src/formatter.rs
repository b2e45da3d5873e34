use crate::analyzer::{LevelStats, Summary};
use crate::parser::LogRecord;
use crate::query::{Page, Pagination};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// What the caller asked to see, alongside the page itself.
pub struct Report<'a> {
    pub page: &'a Page<LogRecord>,
    /// Counts over every parsed record, before filtering.
    pub stats: &'a LevelStats,
    pub total_lines: usize,
    pub filtered_lines: usize,
    pub file_name: &'a str,
    pub truncated: bool,
    /// Present when summary statistics were requested.
    pub summary: Option<&'a Summary>,
}

// New struct specifically for JSON output
#[derive(Serialize)]
struct JsonOutput<'a> {
    entries: &'a [LogRecord],
    pagination: &'a Pagination,
    /// `{"LEVEL": count}`, keys in name order.
    stats: BTreeMap<&'a str, usize>,
    total_lines: usize,
    filtered_lines: usize,
    file_name: &'a str,
    truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<SummaryOutput<'a>>,
}

struct LevelCount {
    level: String,
    count: usize,
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    levels: BTreeMap<&'a str, usize>,
    unique_messages: usize,
    repetition_ratio: f64,
    with_timestamp: usize,
    first_timestamp: Option<String>,
    last_timestamp: Option<String>,
}

// Most frequent first; ties broken by name so output is stable.
fn sorted_levels(stats: &LevelStats) -> Vec<LevelCount> {
    let mut entries: Vec<_> = stats.iter().collect();
    entries.sort_by(|a, b| Reverse(a.1).cmp(&Reverse(b.1)).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .map(|(level, count)| LevelCount {
            level: level.clone(),
            count: *count,
        })
        .collect()
}

fn level_map(stats: &LevelStats) -> BTreeMap<&str, usize> {
    stats.iter().map(|(level, count)| (level.as_str(), *count)).collect()
}

/// Serialize the report as JSON.
pub fn report_to_json(report: &Report, pretty: bool) -> serde_json::Result<String> {
    let output = JsonOutput {
        entries: &report.page.entries,
        pagination: &report.page.pagination,
        stats: level_map(report.stats),
        total_lines: report.total_lines,
        filtered_lines: report.filtered_lines,
        file_name: report.file_name,
        truncated: report.truncated,
        summary: report.summary.map(|summary| SummaryOutput {
            levels: level_map(&summary.levels),
            unique_messages: summary.unique_messages,
            repetition_ratio: summary.repetition_ratio(),
            with_timestamp: summary.with_timestamp,
            first_timestamp: summary.first_timestamp.clone(),
            last_timestamp: summary.last_timestamp.clone(),
        }),
    };

    if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
}

/// One line per record: `#<line> <timestamp|-> [<LEVEL>] <message>`.
pub fn format_record(record: &LogRecord) -> String {
    format!(
        "#{} {} [{}] {}",
        record.line_number,
        record.timestamp.as_deref().unwrap_or("-"),
        record.level,
        record.message
    )
}

// Main production function - prints directly to stdout
pub fn print_report(report: &Report, json_output: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if json_output {
        let pretty = atty::is(atty::Stream::Stdout);
        let json = report_to_json(report, pretty).map_err(io::Error::other)?;
        return writeln!(handle, "{}", json);
    }

    write_report_to_writer(report, &mut handle)
}

// Test-friendly version that can write to any writer
pub fn write_report_to_writer<W: Write>(report: &Report, writer: &mut W) -> io::Result<()> {
    for record in &report.page.entries {
        writeln!(writer, "{}", format_record(record))?;
    }

    let pagination = &report.page.pagination;
    writeln!(
        writer,
        "\nShowing page {} of {} ({} matching of {} records)",
        pagination.current_page,
        pagination.total_pages,
        report.filtered_lines,
        report.total_lines
    )?;

    if report.truncated {
        writeln!(writer, "Line limit reached: later lines were not parsed")?;
    }

    if let Some(summary) = report.summary {
        writeln!(writer, "\nStats summary:")?;

        // Level distribution across the whole file
        if !report.stats.is_empty() {
            writeln!(writer, "\n  Log levels:")?;
            for entry in sorted_levels(report.stats) {
                writeln!(
                    writer,
                    "    {}: {} log{}",
                    entry.level,
                    entry.count,
                    if entry.count == 1 { "" } else { "s" }
                )?;
            }
        }

        writeln!(writer, "\n  Unique messages: {}", summary.unique_messages)?;
        writeln!(writer, "  Repetition ratio: {:.1}%", summary.repetition_ratio())?;
        writeln!(
            writer,
            "  Timestamped records: {} of {}",
            summary.with_timestamp, summary.total
        )?;
        if let (Some(first), Some(last)) = (&summary.first_timestamp, &summary.last_timestamp) {
            writeln!(writer, "  Time span: {} to {}", first, last)?;
        }
    }

    Ok(())
}
