use super::{LEVEL_KEYWORD_REGEX, LogRule, ParsedLogLine};
use crate::timestamp::parse_timestamp;
use lazy_static::lazy_static;
use regex::Regex;

// ISO/SQL (optionally fractional and offset), slash dates as nginx writes
// them, and year-less syslog stamps.
const TIMESTAMP_PREFIX: &str = r"(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?(?:Z|[+-]\d{2}:?\d{2})?|\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}|[A-Z][a-z]{2} [ \d]\d \d{2}:\d{2}:\d{2})";

const BRACKETED_LEVELS: &str =
    r"(?i:EMERGENCY|EMERG|ALERT|CRITICAL|CRIT|FATAL|ERROR|ERR|WARNING|WARN|NOTICE|INFO|DEBUG|TRACE|SEVERE)";

lazy_static! {
    // [time] [LEVEL] message  |  [time] LEVEL: message
    static ref BRACKETED_TIME_LEVEL_REGEX: Regex = Regex::new(&format!(
        r"^\[([^\]]+)\]\s+(?:\[({levels})\]|({levels}):)\s*(.*)$",
        levels = BRACKETED_LEVELS
    )).expect("Failed to create bracketed time level regex");

    // time [LEVEL] message  |  time (LEVEL) message
    static ref TIME_BRACKETED_LEVEL_REGEX: Regex = Regex::new(&format!(
        r"^{ts}\s+[\[\(]({levels})[\]\)]:?\s*(.*)$",
        ts = TIMESTAMP_PREFIX,
        levels = BRACKETED_LEVELS
    )).expect("Failed to create time bracketed level regex");

    // Bare stamp, or any bracketed text that turns out to be a date.
    static ref TIME_PREFIX_REGEX: Regex = Regex::new(&format!(
        r"^(?:\[([^\]]+)\]|{})\s+(.*)$",
        TIMESTAMP_PREFIX
    )).expect("Failed to create time prefix regex");
}

/// Explicit timestamp followed by an explicit level, with either the
/// timestamp or the level in brackets.
pub struct TimestampLevelRule;

/// Timestamp at the start of the line and a level keyword somewhere after it.
pub struct TimestampKeywordRule;

/// Last resort: a level keyword anywhere on the line, no timestamp.
pub struct KeywordRule;

impl LogRule for TimestampLevelRule {
    fn name(&self) -> &'static str {
        "TimestampLevel"
    }

    fn apply(&self, line: &str) -> Option<ParsedLogLine> {
        if let Some(caps) = BRACKETED_TIME_LEVEL_REGEX.captures(line) {
            let level = caps.get(2).or_else(|| caps.get(3))?;
            return Some(ParsedLogLine {
                timestamp: Some(caps[1].to_string()),
                level: Some(level.as_str().to_string()),
                message: Some(caps[4].to_string()),
                ..Default::default()
            });
        }

        let caps = TIME_BRACKETED_LEVEL_REGEX.captures(line)?;
        Some(ParsedLogLine {
            timestamp: Some(caps[1].to_string()),
            level: Some(caps[2].to_string()),
            message: Some(caps[3].to_string()),
            ..Default::default()
        })
    }
}

impl LogRule for TimestampKeywordRule {
    fn name(&self) -> &'static str {
        "TimestampKeyword"
    }

    fn apply(&self, line: &str) -> Option<ParsedLogLine> {
        let caps = TIME_PREFIX_REGEX.captures(line)?;
        let timestamp = match caps.get(1) {
            Some(bracketed) => {
                parse_timestamp(bracketed.as_str())?;
                bracketed.as_str()
            }
            None => caps.get(2)?.as_str(),
        };
        let rest = caps.get(3)?.as_str();
        let level_caps = LEVEL_KEYWORD_REGEX.captures(rest)?;
        let token = level_caps.get(0)?;

        // The message is whatever surrounds the level token.
        let before = rest[..token.start()].trim_end();
        let after = rest[token.end()..].trim_start_matches(|c: char| c.is_whitespace() || c == ':' || c == '-');
        let message = match (before.is_empty(), after.is_empty()) {
            (true, _) => after.to_string(),
            (false, true) => before.to_string(),
            (false, false) => format!("{} {}", before, after),
        };

        Some(ParsedLogLine {
            timestamp: Some(timestamp.to_string()),
            level: Some(level_caps[1].to_string()),
            message: Some(message),
            ..Default::default()
        })
    }
}

impl LogRule for KeywordRule {
    fn name(&self) -> &'static str {
        "Keyword"
    }

    fn apply(&self, line: &str) -> Option<ParsedLogLine> {
        let caps = LEVEL_KEYWORD_REGEX.captures(line)?;

        Some(ParsedLogLine {
            level: Some(caps[1].to_string()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracketed_timestamp_then_level() {
        let parsed = TimestampLevelRule
            .apply("[2024-01-15 10:30:00] [WARNING] Disk almost full")
            .unwrap();
        assert_eq!(parsed.timestamp.as_deref(), Some("2024-01-15 10:30:00"));
        assert_eq!(parsed.level.as_deref(), Some("WARNING"));
        assert_eq!(parsed.message.as_deref(), Some("Disk almost full"));

        let parsed = TimestampLevelRule
            .apply("[15-Jan-2024 10:30:00 UTC] debug: cache warmed")
            .unwrap();
        assert_eq!(parsed.level.as_deref(), Some("debug"));
        assert_eq!(parsed.message.as_deref(), Some("cache warmed"));
    }

    #[test]
    fn test_bare_timestamp_then_bracketed_level() {
        let parsed = TimestampLevelRule
            .apply("2025-03-21 14:00:00,123 [ERROR] NullPointerException")
            .unwrap();
        assert_eq!(parsed.timestamp.as_deref(), Some("2025-03-21 14:00:00,123"));
        assert_eq!(parsed.level.as_deref(), Some("ERROR"));
        assert_eq!(parsed.message.as_deref(), Some("NullPointerException"));

        let parsed = TimestampLevelRule
            .apply("2023/10/10 13:55:36 [error] 1234#0: *1 open() failed, client: 10.0.0.1")
            .unwrap();
        assert_eq!(parsed.timestamp.as_deref(), Some("2023/10/10 13:55:36"));
        assert_eq!(parsed.message.as_deref(), Some("1234#0: *1 open() failed, client: 10.0.0.1"));
    }

    #[test]
    fn test_keyword_after_timestamp() {
        let parsed = TimestampKeywordRule
            .apply("2024-01-15T10:30:00Z app.worker ERROR: Failed to connect")
            .unwrap();
        assert_eq!(parsed.timestamp.as_deref(), Some("2024-01-15T10:30:00Z"));
        assert_eq!(parsed.level.as_deref(), Some("ERROR"));
        assert_eq!(parsed.message.as_deref(), Some("app.worker Failed to connect"));
    }

    #[test]
    fn test_syslog_keyword() {
        let parsed = TimestampKeywordRule
            .apply("Oct  5 07:01:02 host sshd[811]: error: maximum authentication attempts")
            .unwrap();
        assert_eq!(parsed.timestamp.as_deref(), Some("Oct  5 07:01:02"));
        assert_eq!(parsed.level.as_deref(), Some("error"));
        assert_eq!(parsed.message.as_deref(), Some("host sshd[811]: maximum authentication attempts"));
    }

    #[test]
    fn test_timestamp_without_keyword_is_rejected() {
        assert!(TimestampKeywordRule.apply("2024-01-15 10:30:00 user logged in").is_none());
        assert!(TimestampKeywordRule.apply("2024-01-15 10:30:00 no errors today").is_none());
        assert!(TimestampKeywordRule.apply("[2024-01-15 10:30:00] user logged in").is_none());
    }

    #[test]
    fn test_keyword_after_bracketed_timestamp() {
        let parsed = TimestampKeywordRule
            .apply("[2024-01-15 10:30:00] worker crashed with ERROR code 5")
            .unwrap();
        assert_eq!(parsed.timestamp.as_deref(), Some("2024-01-15 10:30:00"));
        assert_eq!(parsed.level.as_deref(), Some("ERROR"));
        assert_eq!(parsed.message.as_deref(), Some("worker crashed with code 5"));

        // Bracketed text that is not a date leaves the line to the fallback.
        assert!(TimestampKeywordRule.apply("[request 9] worker ERROR here").is_none());
    }

    #[test]
    fn test_keyword_anywhere() {
        let parsed = KeywordRule.apply("Something went wrong (Warn) at step 3").unwrap();
        assert_eq!(parsed.level.as_deref(), Some("Warn"));
        assert_eq!(parsed.timestamp, None);
        assert_eq!(parsed.message, None);

        assert!(KeywordRule.apply("all systems nominal").is_none());
    }
}
