use std::collections::BTreeMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::level::{DEFAULT_LEVEL, normalize_level};
use crate::timestamp::normalize_timestamp;

/// Longest message kept on a record, in characters.
pub const MESSAGE_LIMIT: usize = 500;
/// Longest user agent kept in an access-log context, in characters.
pub const USER_AGENT_LIMIT: usize = 100;
/// Appended to any value cut short by the limits above.
pub const TRUNCATION_MARKER: &str = "...";

lazy_static! {
    /// Severity keyword flanked by brackets, parens, whitespace, a colon or
    /// the line edges, so `errors` or `information` never count.
    pub(crate) static ref LEVEL_KEYWORD_REGEX: Regex = Regex::new(
        r"(?i)(?:^|[\s\[\(:])(EMERGENCY|EMERG|ALERT|CRITICAL|CRIT|FATAL|ERROR|ERR|WARNING|WARN|NOTICE|INFO|DEBUG)(?:$|[\s\]\):])"
    ).expect("Failed to create level keyword regex");
}

/// Trait implemented by every line format the classifier knows.
pub trait LogRule: Send + Sync {
    /// Returns the name of the rule
    fn name(&self) -> &'static str;

    /// Extracts the format's fields, or `None` when `line` is not in this format
    fn apply(&self, line: &str) -> Option<ParsedLogLine>;
}

/// Fields pulled out of a line by a rule, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLogLine {
    pub timestamp: Option<String>,
    pub level: Option<String>,
    pub message: Option<String>,
    pub context: BTreeMap<String, String>,
}

impl ParsedLogLine {
    pub(crate) fn with_context(mut self, key: &str, value: impl Into<String>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }
}

/// Formats recognised by the classifier, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    AccessLog,
    ApacheErrorWithPid,
    ApacheError,
    BracketTriple,
    Php,
    TimestampLevel,
    TimestampKeyword,
    Keyword,
    Unrecognized,
}

/// One classified, normalized log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// 1-based position in the source file, blank lines included.
    pub line_number: usize,
    pub raw: String,
    pub timestamp: Option<String>,
    pub level: String,
    pub message: String,
    pub context: BTreeMap<String, String>,
    pub format: LogFormat,
}

/// Lengths applied when records are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierLimits {
    pub message: usize,
    pub user_agent: usize,
}

impl Default for ClassifierLimits {
    fn default() -> Self {
        Self {
            message: MESSAGE_LIMIT,
            user_agent: USER_AGENT_LIMIT,
        }
    }
}

/// Ordered rule list; the first rule that accepts a line wins.
pub struct LineClassifier {
    rules: Vec<(LogFormat, Arc<dyn LogRule>)>,
    limits: ClassifierLimits,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LineClassifier {
    /// Create a classifier with the built-in rules and default limits
    pub fn new() -> Self {
        Self::with_limits(ClassifierLimits::default())
    }

    pub fn with_limits(limits: ClassifierLimits) -> Self {
        let mut classifier = Self {
            rules: Vec::new(),
            limits,
        };

        // Narrow vendor formats first; broad bracket and keyword forms would
        // otherwise swallow their structured context.
        classifier.register_rule(
            LogFormat::AccessLog,
            Arc::new(access::AccessLogRule::new(limits.user_agent)),
        );
        classifier.register_rule(LogFormat::ApacheErrorWithPid, Arc::new(apache::ApacheErrorWithPidRule));
        classifier.register_rule(LogFormat::ApacheError, Arc::new(apache::ApacheErrorRule));
        classifier.register_rule(LogFormat::BracketTriple, Arc::new(bracket::BracketTripleRule));
        classifier.register_rule(LogFormat::Php, Arc::new(bracket::PhpRule));
        classifier.register_rule(LogFormat::TimestampLevel, Arc::new(generic::TimestampLevelRule));
        classifier.register_rule(LogFormat::TimestampKeyword, Arc::new(generic::TimestampKeywordRule));
        classifier.register_rule(LogFormat::Keyword, Arc::new(generic::KeywordRule));

        classifier
    }

    /// Append a rule at the lowest precedence
    pub fn register_rule(&mut self, format: LogFormat, rule: Arc<dyn LogRule>) {
        self.rules.push((format, rule));
    }

    /// Formats in the order they are tried
    pub fn precedence(&self) -> Vec<LogFormat> {
        self.rules.iter().map(|(format, _)| *format).collect()
    }

    /// Get the rule for a specific format
    pub fn get_rule(&self, format: LogFormat) -> Option<Arc<dyn LogRule>> {
        self.rules
            .iter()
            .find(|(f, _)| *f == format)
            .map(|(_, r)| r.clone())
    }

    pub fn limits(&self) -> ClassifierLimits {
        self.limits
    }

    /// Classify one line. Never fails: a line no rule accepts becomes an
    /// `INFO` record whose message is the whole line.
    pub fn classify(&self, line: &str, line_number: usize) -> LogRecord {
        let (format, rule, parsed) = self
            .rules
            .iter()
            .find_map(|(format, rule)| {
                rule.apply(line).map(|parsed| (*format, rule.name(), parsed))
            })
            .unwrap_or((LogFormat::Unrecognized, "Unrecognized", ParsedLogLine::default()));

        trace!(line_number, rule, ?format, "classified line");

        let level = parsed
            .level
            .as_deref()
            .map(normalize_level)
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());

        let timestamp = parsed.timestamp.as_deref().and_then(normalize_timestamp);

        let message = truncate_with_marker(
            parsed.message.as_deref().unwrap_or(line),
            self.limits.message,
        );

        LogRecord {
            line_number,
            raw: line.to_string(),
            timestamp,
            level,
            message,
            context: parsed.context,
            format,
        }
    }
}

/// Cuts `value` to `limit` characters, appending [`TRUNCATION_MARKER`] when
/// anything was removed.
pub fn truncate_with_marker(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &value[..cut], TRUNCATION_MARKER),
        None => value.to_string(),
    }
}

// Create submodules for specific rules
pub mod access;
pub mod apache;
pub mod bracket;
pub mod generic;
