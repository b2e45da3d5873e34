use super::{LEVEL_KEYWORD_REGEX, LogRule, ParsedLogLine};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TRIPLE_REGEX: Regex = Regex::new(r"^\[([^\]]+)\] \[([^\]]+)\] \[([^\]]+)\] (.*)$")
        .expect("Failed to create bracket triple regex");

    static ref PHP_REGEX: Regex = Regex::new(
        r"^\[([^\]]+)\] PHP ((?i:Fatal error|Parse error|Catchable fatal error|Recoverable fatal error|Strict Standards|Warning|Notice|Deprecated|Error)):\s+(.*)$"
    ).expect("Failed to create php regex");
}

/// Generic `[time] [X] [Y] message`. The level comes from a keyword inside
/// `X` when there is one; both brackets are kept in `context.meta`.
pub struct BracketTripleRule;

impl LogRule for BracketTripleRule {
    fn name(&self) -> &'static str {
        "BracketTriple"
    }

    fn apply(&self, line: &str) -> Option<ParsedLogLine> {
        let caps = TRIPLE_REGEX.captures(line)?;

        let level = LEVEL_KEYWORD_REGEX
            .captures(&caps[2])
            .map(|level_caps| level_caps[1].to_string());

        let parsed = ParsedLogLine {
            timestamp: Some(caps[1].to_string()),
            level,
            message: Some(caps[4].to_string()),
            ..Default::default()
        };

        Some(parsed.with_context("meta", format!("[{}] [{}]", &caps[2], &caps[3])))
    }
}

/// PHP interpreter log (`[time] PHP Warning:  message`), which is also what
/// WordPress writes to `debug.log`.
pub struct PhpRule;

impl LogRule for PhpRule {
    fn name(&self) -> &'static str {
        "Php"
    }

    fn apply(&self, line: &str) -> Option<ParsedLogLine> {
        let caps = PHP_REGEX.captures(line)?;

        Some(ParsedLogLine {
            timestamp: Some(caps[1].to_string()),
            level: Some(caps[2].to_string()),
            message: Some(caps[3].to_string()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_with_level_keyword() {
        let line = "[2024-01-15 10:30:00] [app:ERROR] [req-42] Payment failed";
        let parsed = BracketTripleRule.apply(line).unwrap();

        assert_eq!(parsed.timestamp.as_deref(), Some("2024-01-15 10:30:00"));
        assert_eq!(parsed.level.as_deref(), Some("ERROR"));
        assert_eq!(parsed.message.as_deref(), Some("Payment failed"));
        assert_eq!(parsed.context["meta"], "[app:ERROR] [req-42]");
    }

    #[test]
    fn test_triple_without_level_keyword() {
        let line = "[2024-01-15 10:30:00] [worker-3] [job 17] started";
        let parsed = BracketTripleRule.apply(line).unwrap();

        assert_eq!(parsed.level, None);
        assert_eq!(parsed.context["meta"], "[worker-3] [job 17]");
    }

    #[test]
    fn test_triple_ignores_level_in_third_bracket() {
        let line = "[2024-01-15 10:30:00] [worker-3] [ERROR] started";
        let parsed = BracketTripleRule.apply(line).unwrap();
        assert_eq!(parsed.level, None);
    }

    #[test]
    fn test_php_sublevels() {
        let cases = [
            ("[13-Nov-2025 10:00:00 UTC] PHP Fatal error:  Uncaught Error", "Fatal error", "Uncaught Error"),
            ("[13-Nov-2025 10:00:00 UTC] PHP Parse error:  syntax error", "Parse error", "syntax error"),
            ("[13-Nov-2025 10:00:00 UTC] PHP Warning:  Undefined variable $x", "Warning", "Undefined variable $x"),
            ("[13-Nov-2025 10:00:00 UTC] PHP Deprecated:  Function create_function()", "Deprecated", "Function create_function()"),
            ("[13-Nov-2025 10:00:00 UTC] PHP Strict Standards:  Non-static method", "Strict Standards", "Non-static method"),
        ];

        for (line, level, message) in cases {
            let parsed = PhpRule.apply(line).unwrap();
            assert_eq!(parsed.level.as_deref(), Some(level));
            assert_eq!(parsed.message.as_deref(), Some(message));
            assert_eq!(parsed.timestamp.as_deref(), Some("13-Nov-2025 10:00:00 UTC"));
        }
    }

    #[test]
    fn test_php_unknown_sublevel() {
        assert!(PhpRule.apply("[13-Nov-2025 10:00:00 UTC] PHP Info:  hello").is_none());
    }
}
