use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

pub const CRITICAL: &str = "CRITICAL";
pub const ERROR: &str = "ERROR";
pub const WARNING: &str = "WARNING";
pub const NOTICE: &str = "NOTICE";
pub const INFO: &str = "INFO";
pub const DEBUG: &str = "DEBUG";
pub const ACCESS: &str = "ACCESS";

/// Canonical severity vocabulary, most severe first.
pub const CANONICAL_LEVELS: [&str; 7] = [CRITICAL, ERROR, WARNING, NOTICE, INFO, DEBUG, ACCESS];

/// Level assigned when no rule finds a severity.
pub const DEFAULT_LEVEL: &str = INFO;

lazy_static! {
    static ref ALIASES: FxHashMap<&'static str, &'static str> = {
        let mut m = FxHashMap::default();
        m.insert("FATAL", ERROR);
        m.insert("FATAL ERROR", ERROR);
        m.insert("PARSE ERROR", ERROR);
        m.insert("CATCHABLE FATAL ERROR", ERROR);
        m.insert("RECOVERABLE FATAL ERROR", ERROR);
        m.insert("ERR", ERROR);
        m.insert("SEVERE", ERROR);
        m.insert("WARN", WARNING);
        m.insert("CRIT", CRITICAL);
        m.insert("EMERG", CRITICAL);
        m.insert("EMERGENCY", CRITICAL);
        m.insert("ALERT", CRITICAL);
        m.insert("STRICT STANDARDS", NOTICE);
        m.insert("DEPRECATED", NOTICE);
        m.insert("TRACE", DEBUG);
        m
    };
}

/// Maps a raw severity token onto the canonical vocabulary.
///
/// Matching is case-insensitive and tolerant of repeated inner whitespace
/// (`"Fatal  error"`). Apache's `trace1`..`trace8` collapse to `DEBUG`.
/// Tokens missing from the alias table come back uppercased but otherwise
/// untouched, and an empty token stays empty.
pub fn normalize_level(raw: &str) -> String {
    let upper = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    if let Some(canonical) = ALIASES.get(upper.as_str()) {
        return (*canonical).to_string();
    }

    if let Some(n) = upper.strip_prefix("TRACE") {
        if n.len() == 1 && matches!(n.as_bytes()[0], b'1'..=b'8') {
            return DEBUG.to_string();
        }
    }

    upper
}

/// True when `level` is one of [`CANONICAL_LEVELS`].
pub fn is_canonical(level: &str) -> bool {
    CANONICAL_LEVELS.contains(&level)
}

/// Every raw token the alias table knows about.
pub fn alias_tokens() -> impl Iterator<Item = &'static str> {
    ALIASES.keys().copied()
}
