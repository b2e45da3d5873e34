//! Filtering and pagination over classified records.

use chrono::NaiveDate;
use serde::Serialize;

use crate::accelerated::SimdLiteralMatcher;
use crate::error::QueryError;
use crate::level::normalize_level;
use crate::parser::LogRecord;
use crate::timestamp::{CANONICAL_FORMAT, normalize_timestamp};

/// Level filter value meaning "every level".
pub const ALL_LEVELS: &str = "ALL";

/// Conjunction of the optional level, search and time-range predicates.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    level: Option<String>,
    search: Option<SimdLiteralMatcher>,
    start: Option<String>,
    end: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep records whose level equals `level` after normalization, so
    /// `warn` selects `WARNING`. Empty or `ALL` clears the predicate.
    pub fn level(mut self, level: &str) -> Result<Self, QueryError> {
        let normalized = normalize_level(level);
        if normalized.is_empty() || normalized == ALL_LEVELS {
            self.level = None;
            return Ok(self);
        }
        if !normalized.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
            return Err(QueryError::InvalidLevel(level.to_string()));
        }
        self.level = Some(normalized);
        Ok(self)
    }

    /// Case-insensitive substring over `raw` and `message`.
    pub fn search(mut self, term: &str) -> Self {
        self.search = (!term.is_empty()).then(|| SimdLiteralMatcher::new(term));
        self
    }

    /// Inclusive lower bound. A bare date means the start of that day.
    pub fn start(mut self, bound: &str) -> Result<Self, QueryError> {
        self.start = parse_bound(bound, false)?;
        Ok(self)
    }

    /// Inclusive upper bound. A bare date means the end of that day.
    pub fn end(mut self, bound: &str) -> Result<Self, QueryError> {
        self.end = parse_bound(bound, true)?;
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.level.is_none() && self.search.is_none() && self.start.is_none() && self.end.is_none()
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        if let Some(level) = &self.level {
            if record.level != *level {
                return false;
            }
        }

        if let Some(search) = &self.search {
            if !search.is_match(&record.raw) && !search.is_match(&record.message) {
                return false;
            }
        }

        // Records without a timestamp are never excluded by the range.
        if let Some(ts) = record.timestamp.as_deref() {
            if self.start.as_deref().is_some_and(|start| ts < start) {
                return false;
            }
            if self.end.as_deref().is_some_and(|end| ts > end) {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, records: &[LogRecord]) -> Vec<LogRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// Filter `records` by the optional level, search term and time bounds.
pub fn filter_records(
    records: &[LogRecord],
    level: Option<&str>,
    search: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Vec<LogRecord>, QueryError> {
    let mut filter = RecordFilter::new();
    if let Some(level) = level {
        filter = filter.level(level)?;
    }
    if let Some(term) = search {
        filter = filter.search(term);
    }
    if let Some(start) = start {
        filter = filter.start(start)?;
    }
    if let Some(end) = end {
        filter = filter.end(end)?;
    }
    Ok(filter.apply(records))
}

fn parse_bound(bound: &str, end_of_day: bool) -> Result<Option<String>, QueryError> {
    let trimmed = bound.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let dt = if end_of_day {
            date.and_hms_opt(23, 59, 59)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        return Ok(dt.map(|dt| dt.format(CANONICAL_FORMAT).to_string()));
    }

    normalize_timestamp(trimmed)
        .map(Some)
        .ok_or_else(|| QueryError::InvalidTimestamp(bound.to_string()))
}

/// Position of a page within a filtered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub entries: Vec<T>,
    pub pagination: Pagination,
}

/// Slice out 1-based page `page` of `per_page` items. Page 0 counts as
/// page 1 and a zero page size as 1; pages past the end are empty.
pub fn paginate<T: Clone>(records: &[T], page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total = records.len();
    let total_pages = total.div_ceil(per_page);

    let offset = (page - 1).saturating_mul(per_page);
    let entries = records
        .iter()
        .skip(offset)
        .take(per_page)
        .cloned()
        .collect();

    Page {
        entries,
        pagination: Pagination {
            current_page: page,
            per_page,
            total,
            total_pages,
            has_prev: page > 1,
            has_next: page < total_pages,
        },
    }
}
