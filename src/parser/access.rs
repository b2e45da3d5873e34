use super::{LogRule, ParsedLogLine, truncate_with_marker};
use crate::level::ACCESS;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref COMBINED_REGEX: Regex = Regex::new(
        r#"^(\S+) \S+ \S+ \[([^\]]+)\] "([^"]*)" (\d{3}) (\d+|-) "([^"]*)" "([^"]*)""#
    ).expect("Failed to create combined access log regex");
}

/// Apache/Nginx combined access log
/// (`ip ident user [time] "request" status size "referer" "agent"`).
pub struct AccessLogRule {
    user_agent_limit: usize,
}

impl AccessLogRule {
    pub fn new(user_agent_limit: usize) -> Self {
        Self { user_agent_limit }
    }
}

impl LogRule for AccessLogRule {
    fn name(&self) -> &'static str {
        "AccessLog"
    }

    fn apply(&self, line: &str) -> Option<ParsedLogLine> {
        let caps = COMBINED_REGEX.captures(line)?;

        let parsed = ParsedLogLine {
            timestamp: Some(caps[2].to_string()),
            level: Some(ACCESS.to_string()),
            message: Some(caps[3].to_string()),
            ..Default::default()
        };

        Some(
            parsed
                .with_context("ip", &caps[1])
                .with_context("status", &caps[4])
                .with_context("size", &caps[5])
                .with_context("referer", &caps[6])
                .with_context(
                    "user_agent",
                    truncate_with_marker(&caps[7], self.user_agent_limit),
                ),
        )
    }
}
