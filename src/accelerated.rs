use memchr::memmem;
use std::sync::OnceLock;

// Feature detection flags
struct CpuFeatures {
    sse41_supported: bool,
    avx2_supported: bool,
}

static CPU_FEATURES: OnceLock<CpuFeatures> = OnceLock::new();

// Initialize CPU feature detection
fn get_cpu_features() -> &'static CpuFeatures {
    CPU_FEATURES.get_or_init(|| {
        let mut features = CpuFeatures {
            sse41_supported: false,
            avx2_supported: false,
        };

        #[cfg(target_arch = "x86_64")]
        {
            if cfg!(feature = "simd_acceleration") {
                features.sse41_supported = std::is_x86_feature_detected!("sse4.1");
                features.avx2_supported = std::is_x86_feature_detected!("avx2");
            }
        }

        features
    })
}

/// Case-insensitive substring matcher backing the search filter.
///
/// The needle is lowercased once; each haystack is lowercased per call and
/// scanned with a prebuilt `memmem` finder when the CPU can vectorise it.
pub struct SimdLiteralMatcher {
    needle: String,
    finder: memmem::Finder<'static>,
}

impl SimdLiteralMatcher {
    pub fn new(pattern: &str) -> Self {
        // Ensure CPU features are detected
        get_cpu_features();

        let needle = pattern.to_lowercase();
        let finder = memmem::Finder::new(needle.as_bytes()).into_owned();
        Self { needle, finder }
    }

    pub fn pattern(&self) -> &str {
        &self.needle
    }

    // Determine if this instance can use SIMD acceleration
    fn can_use_simd(&self) -> bool {
        // Short patterns don't benefit much from SIMD
        let min_pattern_length = 3;

        if !cfg!(feature = "simd_acceleration") || self.needle.len() < min_pattern_length {
            return false;
        }

        let features = get_cpu_features();
        features.sse41_supported || features.avx2_supported
    }

    pub fn is_match(&self, text: &str) -> bool {
        if self.needle.is_empty() {
            return true;
        }

        let haystack = text.to_lowercase();
        if self.can_use_simd() {
            self.finder.find(haystack.as_bytes()).is_some()
        } else {
            haystack.contains(&self.needle)
        }
    }
}

impl Clone for SimdLiteralMatcher {
    fn clone(&self) -> Self {
        Self::new(&self.needle)
    }
}

impl std::fmt::Debug for SimdLiteralMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimdLiteralMatcher")
            .field("needle", &self.needle)
            .finish()
    }
}

// SIMD-accelerated line processing utilities
pub mod line_processing {
    use memchr::memchr_iter;

    /// Count lines in a buffer quickly
    pub fn count_lines(buffer: &[u8]) -> usize {
        memchr_iter(b'\n', buffer).count()
            + if buffer.is_empty() || buffer[buffer.len() - 1] == b'\n' {
                0
            } else {
                1
            }
    }

    /// Lines of `text` paired with their 1-based line numbers.
    ///
    /// A trailing `\r` is stripped from each line. The empty segment after a
    /// final newline is not yielded.
    pub fn numbered_lines(text: &str) -> Vec<(usize, &str)> {
        let bytes = text.as_bytes();
        let mut lines = Vec::with_capacity(count_lines(bytes));
        let mut start = 0;

        for end in memchr_iter(b'\n', bytes) {
            lines.push((lines.len() + 1, strip_cr(&text[start..end])));
            start = end + 1;
        }
        if start < text.len() {
            lines.push((lines.len() + 1, strip_cr(&text[start..])));
        }

        lines
    }

    fn strip_cr(line: &str) -> &str {
        line.strip_suffix('\r').unwrap_or(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simd_literal_matcher_basic() {
        let matcher = SimdLiteralMatcher::new("test");

        assert!(matcher.is_match("This is a test string"));
        assert!(!matcher.is_match("This does not match"));
    }

    #[test]
    fn test_matcher_ignores_case() {
        let matcher = SimdLiteralMatcher::new("TimeOut");

        assert!(matcher.is_match("connection TIMEOUT after 30s"));
        assert!(matcher.is_match("timeout"));
        assert!(!matcher.is_match("time out"));
        assert_eq!(matcher.pattern(), "timeout");
    }

    #[test]
    fn test_short_and_empty_patterns() {
        assert!(SimdLiteralMatcher::new("db").is_match("DB down"));
        assert!(SimdLiteralMatcher::new("").is_match("anything"));
    }

    #[test]
    fn test_line_processing() {
        use super::line_processing::*;

        assert_eq!(count_lines(b"Line 1\nLine 2\nLine 3"), 3);
        assert_eq!(count_lines(b"Line 1\nLine 2\n"), 2);
        assert_eq!(count_lines(b""), 0);
    }

    #[test]
    fn test_numbered_lines() {
        use super::line_processing::numbered_lines;

        let lines = numbered_lines("first\r\n\nthird\n");
        assert_eq!(lines, vec![(1, "first"), (2, ""), (3, "third")]);

        let lines = numbered_lines("no newline");
        assert_eq!(lines, vec![(1, "no newline")]);

        assert!(numbered_lines("").is_empty());
    }
}
