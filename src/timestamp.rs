//! Free-form timestamp normalization.
//!
//! Every recognised date comes out as `YYYY-MM-DD HH:MM:SS` wall-clock time.
//! UTC offsets and zone names are accepted but not applied, and sub-second
//! digits are dropped before any template is tried.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

/// Layout of every normalized timestamp.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

lazy_static! {
    static ref FRACTION_REGEX: Regex =
        Regex::new(r"(\d{2}:\d{2}:\d{2})[.,]\d{1,9}").expect("Failed to create fraction regex");
    static ref EMBEDDED_DATE_REGEX: Regex =
        Regex::new(r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(?::\d{2})?")
            .expect("Failed to create embedded date regex");
    static ref EPOCH_REGEX: Regex = Regex::new(r"^\d{10}$").expect("Failed to create epoch regex");
}

/// How the text matched by a template relates to a wall-clock value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemplateKind {
    /// Plain date and time, nothing else.
    Naive,
    /// Date and time followed by a numeric UTC offset.
    Offset,
    /// Date and time followed by a zone name (`UTC`, `Europe/Madrid`).
    NamedZone,
    /// Month, day and time with no year; the current year is assumed.
    YearLess,
}

/// A literal layout tried by [`parse_timestamp`].
#[derive(Debug)]
struct Template {
    name: &'static str,
    format: &'static str,
    kind: TemplateKind,
}

/// Ordered most distinctive first. A template only matches when rendering
/// the parsed value with the same layout reproduces the input exactly.
static TEMPLATES: &[Template] = &[
    Template { name: "apache-error", format: "%a %b %d %H:%M:%S %Y", kind: TemplateKind::Naive },
    Template { name: "apache-error-padded", format: "%a %b %e %H:%M:%S %Y", kind: TemplateKind::Naive },
    Template { name: "apache-access", format: "%d/%b/%Y:%H:%M:%S %z", kind: TemplateKind::Offset },
    Template { name: "php-zoned", format: "%d-%b-%Y %H:%M:%S", kind: TemplateKind::NamedZone },
    Template { name: "php", format: "%d-%b-%Y %H:%M:%S", kind: TemplateKind::Naive },
    Template { name: "sql", format: "%Y-%m-%d %H:%M:%S", kind: TemplateKind::Naive },
    Template { name: "iso8601-colon-offset", format: "%Y-%m-%dT%H:%M:%S%:z", kind: TemplateKind::Offset },
    Template { name: "iso8601-offset", format: "%Y-%m-%dT%H:%M:%S%z", kind: TemplateKind::Offset },
    Template { name: "iso8601-zulu", format: "%Y-%m-%dT%H:%M:%SZ", kind: TemplateKind::Naive },
    Template { name: "iso8601", format: "%Y-%m-%dT%H:%M:%S", kind: TemplateKind::Naive },
    Template { name: "syslog", format: "%b %d %H:%M:%S", kind: TemplateKind::YearLess },
    Template { name: "syslog-padded", format: "%b %e %H:%M:%S", kind: TemplateKind::YearLess },
];

/// Layouts accepted by the permissive fallback without round-trip checks.
static LOOSE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%b %d %Y %H:%M:%S",
];

static LOOSE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%y", "%m/%d/%Y", "%d-%b-%Y", "%d.%m.%Y", "%d %b %Y",
];

/// Normalizes `input` to the canonical `YYYY-MM-DD HH:MM:SS` form.
///
/// Returns `None` when nothing date-like can be recovered.
pub fn normalize_timestamp(input: &str) -> Option<String> {
    parse_timestamp(input).map(|dt| dt.format(CANONICAL_FORMAT).to_string())
}

/// Parses `input` into a wall-clock value, assuming the current year for
/// year-less layouts.
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    parse_timestamp_in_year(input, Utc::now().year())
}

/// Same as [`parse_timestamp`] with an explicit year for year-less layouts.
pub fn parse_timestamp_in_year(input: &str, year: i32) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned = FRACTION_REGEX.replace_all(trimmed, "$1");

    TEMPLATES
        .iter()
        .find_map(|template| apply_template(template, &cleaned, year))
        .or_else(|| parse_permissive(&cleaned))
}

/// Name of the first template that accepts `input`, for diagnostics.
pub fn matching_template(input: &str) -> Option<&'static str> {
    let cleaned = FRACTION_REGEX.replace_all(input.trim(), "$1");
    let year = Utc::now().year();
    TEMPLATES
        .iter()
        .find(|template| apply_template(template, &cleaned, year).is_some())
        .map(|template| template.name)
}

fn apply_template(template: &Template, s: &str, year: i32) -> Option<NaiveDateTime> {
    match template.kind {
        TemplateKind::Naive => {
            let dt = NaiveDateTime::parse_from_str(s, template.format).ok()?;
            round_trips(&dt.format(template.format).to_string(), s).then_some(dt)
        }
        TemplateKind::Offset => {
            let dt = DateTime::parse_from_str(s, template.format).ok()?;
            round_trips(&dt.format(template.format).to_string(), s).then(|| dt.naive_local())
        }
        TemplateKind::NamedZone => {
            let (head, zone) = s.rsplit_once(' ')?;
            if !is_zone_name(zone) {
                return None;
            }
            let dt = NaiveDateTime::parse_from_str(head, template.format).ok()?;
            round_trips(&dt.format(template.format).to_string(), head).then_some(dt)
        }
        TemplateKind::YearLess => {
            let with_year = format!("{} {}", year, s);
            let format = format!("%Y {}", template.format);
            let dt = NaiveDateTime::parse_from_str(&with_year, &format).ok()?;
            round_trips(&dt.format(template.format).to_string(), s).then_some(dt)
        }
    }
}

// Month and weekday names are compared without case; chrono parses them
// case-insensitively but always renders title case.
fn round_trips(rendered: &str, original: &str) -> bool {
    rendered.eq_ignore_ascii_case(original)
}

fn is_zone_name(zone: &str) -> bool {
    !zone.is_empty()
        && zone.starts_with(|c: char| c.is_ascii_alphabetic())
        && zone
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '+' | '-'))
}

// Permissive guesses only count when they land after the epoch.
fn parse_permissive(s: &str) -> Option<NaiveDateTime> {
    guess_loose(s).filter(|dt| dt.and_utc().timestamp() > 0)
}

fn guess_loose(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    // Two-digit year layouts come first; `%Y` would read `24` as year 24.
    let loose = LOOSE_DATETIME_FORMATS
        .iter()
        .filter_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .chain(LOOSE_DATE_FORMATS.iter().filter_map(|format| {
            NaiveDate::parse_from_str(s, format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        }))
        .find(|dt| dt.and_utc().timestamp() > 0);
    if loose.is_some() {
        return loose;
    }

    if EPOCH_REGEX.is_match(s) {
        return s
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc());
    }

    // A recognisable date buried in surrounding text.
    let embedded = EMBEDDED_DATE_REGEX.find(s)?;
    if embedded.as_str().len() == s.len() {
        return None;
    }
    let candidate = embedded.as_str().replacen('T', " ", 1);
    NaiveDateTime::parse_from_str(&candidate, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&candidate, "%Y-%m-%d %H:%M"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> Option<String> {
        normalize_timestamp(s)
    }

    #[test]
    fn test_apache_error_layout() {
        assert_eq!(norm("Wed Oct 11 14:32:52 2023").as_deref(), Some("2023-10-11 14:32:52"));
        assert_eq!(
            norm("Wed Oct 11 14:32:52.123456 2023").as_deref(),
            Some("2023-10-11 14:32:52")
        );
        assert_eq!(matching_template("Wed Oct 11 14:32:52 2023"), Some("apache-error"));
    }

    #[test]
    fn test_apache_access_layout_keeps_wall_clock() {
        assert_eq!(
            norm("10/Oct/2023:13:55:36 -0700").as_deref(),
            Some("2023-10-10 13:55:36")
        );
        assert_eq!(matching_template("10/Oct/2023:13:55:36 -0700"), Some("apache-access"));
    }

    #[test]
    fn test_php_layout_with_zone_name() {
        assert_eq!(norm("13-Nov-2025 10:00:00 UTC").as_deref(), Some("2025-11-13 10:00:00"));
        assert_eq!(
            norm("01-Feb-2024 08:15:02 Europe/Madrid").as_deref(),
            Some("2024-02-01 08:15:02")
        );
        assert_eq!(matching_template("13-Nov-2025 10:00:00 UTC"), Some("php-zoned"));
    }

    #[test]
    fn test_sql_and_iso_layouts() {
        assert_eq!(norm("2024-01-15 10:30:00").as_deref(), Some("2024-01-15 10:30:00"));
        assert_eq!(norm("2024-01-15 10:30:00,123").as_deref(), Some("2024-01-15 10:30:00"));
        assert_eq!(norm("2024-01-15T10:30:00+02:00").as_deref(), Some("2024-01-15 10:30:00"));
        assert_eq!(norm("2024-01-15T10:30:00.5+0200").as_deref(), Some("2024-01-15 10:30:00"));
        assert_eq!(norm("2024-01-15T10:30:00Z").as_deref(), Some("2024-01-15 10:30:00"));
        assert_eq!(norm("2024-01-15T10:30:00").as_deref(), Some("2024-01-15 10:30:00"));
    }

    #[test]
    fn test_syslog_layout_assumes_year() {
        let dt = parse_timestamp_in_year("Oct  5 07:01:02", 2023).unwrap();
        assert_eq!(dt.format(CANONICAL_FORMAT).to_string(), "2023-10-05 07:01:02");

        let dt = parse_timestamp_in_year("Oct 05 07:01:02", 2023).unwrap();
        assert_eq!(dt.format(CANONICAL_FORMAT).to_string(), "2023-10-05 07:01:02");

        let current = Utc::now().year();
        assert_eq!(
            norm("Jan 15 08:00:00"),
            Some(format!("{}-01-15 08:00:00", current))
        );
    }

    #[test]
    fn test_round_trip_rejects_partial_matches() {
        // Wrong weekday for the date.
        assert_eq!(matching_template("Mon Oct 11 14:32:52 2023"), None);
        // Unpadded day does not satisfy the access-log layout.
        assert_eq!(matching_template("1/Oct/2023:13:55:36 -0700"), None);
    }

    #[test]
    fn test_permissive_fallback() {
        assert_eq!(norm("2024/03/01 12:00:00").as_deref(), Some("2024-03-01 12:00:00"));
        assert_eq!(norm("03/01/24 12:00:00").as_deref(), Some("2024-03-01 12:00:00"));
        assert_eq!(norm("2024-03-01").as_deref(), Some("2024-03-01 00:00:00"));
        assert_eq!(
            norm("Tue, 1 Jul 2003 10:52:37 +0200").as_deref(),
            Some("2003-07-01 10:52:37")
        );
        assert_eq!(norm("1700000000").as_deref(), Some("2023-11-14 22:13:20"));
        assert_eq!(
            norm("at 2024-03-01T12:00:00.123Z sharp").as_deref(),
            Some("2024-03-01 12:00:00")
        );
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(norm(""), None);
        assert_eq!(norm("not a date"), None);
        assert_eq!(norm("core:error"), None);
        assert_eq!(norm("pid 1234"), None);
        assert_eq!(norm("0000000000"), None);
        assert_eq!(norm("12/31/1969"), None);
    }

    #[test]
    fn test_templates_accept_pre_epoch_values() {
        assert_eq!(norm("1970-01-01 00:00:00").as_deref(), Some("1970-01-01 00:00:00"));
        assert_eq!(norm("1969-12-31 23:59:59").as_deref(), Some("1969-12-31 23:59:59"));
        assert_eq!(
            norm("10/Oct/1960:13:55:36 -0700").as_deref(),
            Some("1960-10-10 13:55:36")
        );
    }

    #[test]
    fn test_idempotent_and_sql_reparseable() {
        let inputs = [
            "Wed Oct 11 14:32:52.123456 2023",
            "10/Oct/2023:13:55:36 -0700",
            "13-Nov-2025 10:00:00 UTC",
            "2024-01-15T10:30:00+02:00",
            "2024/03/01 12:00:00",
        ];
        for input in inputs {
            let once = norm(input).unwrap();
            assert!(NaiveDateTime::parse_from_str(&once, CANONICAL_FORMAT).is_ok());
            assert_eq!(norm(&once).as_deref(), Some(once.as_str()), "input {}", input);
            assert_eq!(matching_template(&once), Some("sql"));
        }
    }
}
