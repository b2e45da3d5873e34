use super::{LogRule, ParsedLogLine};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // [time] [module:level] [pid N(:tid M)] ([client addr]) message
    static ref WITH_PID_REGEX: Regex = Regex::new(
        r"^\[([^\]]+)\] \[(?:([^\]:\s]+):)?(\w+)\] \[pid (\d+)(?::tid \d+)?\](?: \[client ([^\]]+)\])? (.*)$"
    ).expect("Failed to create apache pid regex");

    // [time] [(module:)level] [client addr] message
    static ref CLIENT_REGEX: Regex = Regex::new(
        r"^\[([^\]]+)\] \[(?:([^\]:\s]+):)?(\w+)\] \[client ([^\]]+)\] (.*)$"
    ).expect("Failed to create apache client regex");

    static ref ERROR_CODE_REGEX: Regex =
        Regex::new(r"^(AH\d+):\s*(.*)$").expect("Failed to create error code regex");
}

/// Apache 2.4 error log line carrying a process id.
pub struct ApacheErrorWithPidRule;

/// Apache error log line with a client but no process id, including the
/// module-less Apache 2.2 layout.
pub struct ApacheErrorRule;

impl LogRule for ApacheErrorWithPidRule {
    fn name(&self) -> &'static str {
        "ApacheErrorWithPid"
    }

    fn apply(&self, line: &str) -> Option<ParsedLogLine> {
        let caps = WITH_PID_REGEX.captures(line)?;

        let mut parsed = split_error_code(&caps[6]);
        parsed.timestamp = Some(caps[1].to_string());
        parsed.level = Some(caps[3].to_string());
        if let Some(module) = caps.get(2) {
            parsed = parsed.with_context("module", module.as_str());
        }
        parsed = parsed.with_context("pid", &caps[4]);
        if let Some(client) = caps.get(5) {
            parsed = parsed.with_context("client", client.as_str());
        }

        Some(parsed)
    }
}

impl LogRule for ApacheErrorRule {
    fn name(&self) -> &'static str {
        "ApacheError"
    }

    fn apply(&self, line: &str) -> Option<ParsedLogLine> {
        let caps = CLIENT_REGEX.captures(line)?;

        let mut parsed = split_error_code(&caps[5]);
        parsed.timestamp = Some(caps[1].to_string());
        parsed.level = Some(caps[3].to_string());
        if let Some(module) = caps.get(2) {
            parsed = parsed.with_context("module", module.as_str());
        }

        Some(parsed.with_context("client", &caps[4]))
    }
}

// Moves a leading `AH01234:` code out of the message into the context.
fn split_error_code(message: &str) -> ParsedLogLine {
    match ERROR_CODE_REGEX.captures(message) {
        Some(caps) => ParsedLogLine {
            message: Some(caps[2].to_string()),
            ..Default::default()
        }
        .with_context("error_code", &caps[1]),
        None => ParsedLogLine {
            message: Some(message.to_string()),
            ..Default::default()
        },
    }
}
