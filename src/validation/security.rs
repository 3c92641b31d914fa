//! Lexical scan for constructs that could exfiltrate data or escape the sandbox.
//!
//! Matching is purely textual: a flagged word inside a comment or a string
//! literal still counts. Findings are advisory and never block a save; the
//! actual defense is the CSP and sandbox policy applied at render time.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::borrow::Cow;

/// Built-in registry, in reporting order: (pattern, description).
pub const DANGER_PATTERN_TABLE: &[(&str, &str)] = &[
    (r"<iframe", "embedded frame"),
    (r"fetch\s*\(", "fetch() network call"),
    (r"XMLHttpRequest", "XMLHttpRequest network call"),
    (r"import\s+.*from", "ES module import"),
    (r"<script[^>]*src=", "externally sourced script"),
    (r#"<link[^>]*href=["']https?://"#, "external stylesheet"),
    (r#"<img[^>]*src=["']https?://"#, "external image"),
    (r"eval\s*\(", "eval() call"),
    (r"Function\s*\(", "Function constructor"),
    (r"localStorage", "localStorage access"),
    (r"sessionStorage", "sessionStorage access"),
    (r"document\.cookie", "cookie access"),
];

/// Compiled form of [`DANGER_PATTERN_TABLE`].
pub static DANGER_PATTERNS: Lazy<Vec<DangerPattern>> = Lazy::new(|| {
    DANGER_PATTERN_TABLE
        .iter()
        .map(|(pattern, description)| {
            DangerPattern::new(*pattern, *description).expect("built-in danger pattern compiles")
        })
        .collect()
});

/// A case-insensitive pattern plus a human description.
#[derive(Debug, Clone)]
pub struct DangerPattern {
    pattern: String,
    description: String,
    regex: Regex,
}

impl DangerPattern {
    pub fn new(
        pattern: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let pattern = pattern.into();
        let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
        Ok(Self {
            pattern,
            description: description.into(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Number of non-overlapping matches in `content`.
    pub fn count_matches(&self, content: &str) -> usize {
        self.regex.find_iter(content).count()
    }
}

/// One pattern that matched at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityFinding {
    pub pattern: String,
    pub description: String,
    pub matches: usize,
}

impl SecurityFinding {
    pub fn message(&self) -> String {
        let noun = if self.matches == 1 { "match" } else { "matches" };
        format!(
            "Suspicious pattern detected: {} ({}, {} {noun})",
            self.pattern, self.description, self.matches
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityReport {
    pub findings: Vec<SecurityFinding>,
}

impl SecurityReport {
    pub fn is_safe(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.findings.iter().map(SecurityFinding::message).collect()
    }
}

/// Runs an ordered pattern registry over content.
#[derive(Debug, Clone)]
pub struct SecurityScanner {
    patterns: Cow<'static, [DangerPattern]>,
}

impl Default for SecurityScanner {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SecurityScanner {
    /// Scanner over the built-in registry.
    pub fn builtin() -> Self {
        Self {
            patterns: Cow::Borrowed(Lazy::force(&DANGER_PATTERNS).as_slice()),
        }
    }

    /// Scanner over a caller-supplied registry.
    pub fn with_patterns(patterns: Vec<DangerPattern>) -> Self {
        Self {
            patterns: Cow::Owned(patterns),
        }
    }

    /// Append a pattern after the existing ones (chaining method)
    pub fn with_pattern(mut self, pattern: DangerPattern) -> Self {
        self.patterns.to_mut().push(pattern);
        self
    }

    pub fn patterns(&self) -> &[DangerPattern] {
        &self.patterns
    }

    pub fn scan(&self, content: &str) -> SecurityReport {
        let findings = self
            .patterns
            .iter()
            .filter_map(|pattern| {
                let matches = pattern.count_matches(content);
                (matches > 0).then(|| SecurityFinding {
                    pattern: pattern.pattern().to_string(),
                    description: pattern.description().to_string(),
                    matches,
                })
            })
            .collect();
        SecurityReport { findings }
    }
}

/// Scan with the built-in registry.
pub fn scan_dangerous_patterns(content: &str) -> SecurityReport {
    SecurityScanner::builtin().scan(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flagged(content: &str) -> Vec<String> {
        scan_dangerous_patterns(content)
            .findings
            .into_iter()
            .map(|finding| finding.pattern)
            .collect()
    }

    #[test]
    fn test_registry_compiles_in_order() {
        assert_eq!(DANGER_PATTERNS.len(), DANGER_PATTERN_TABLE.len());
        for (compiled, (pattern, _)) in DANGER_PATTERNS.iter().zip(DANGER_PATTERN_TABLE) {
            assert_eq!(compiled.pattern(), *pattern);
        }
    }

    #[test]
    fn test_each_builtin_pattern_fires() {
        let samples = [
            "<IFRAME src=x>",
            "fetch ('/api')",
            "new XMLHttpRequest()",
            "import x from 'y'",
            "<script type=module src=app.js>",
            "<link rel=stylesheet href=\"https://cdn/x.css\">",
            "<img alt='' src='http://tracker/p.gif'>",
            "eval(code)",
            "new Function('return 1')",
            "window.localStorage",
            "SESSIONSTORAGE",
            "document.cookie = 'a=b'",
        ];
        for (sample, (pattern, _)) in samples.iter().zip(DANGER_PATTERN_TABLE) {
            assert_eq!(flagged(sample), vec![pattern.to_string()], "sample {sample}");
        }
    }

    #[test]
    fn test_clean_content_is_safe() {
        let report = scan_dangerous_patterns("<p>Counter: <button onclick=\"n++\">+</button></p>");
        assert!(report.is_safe());
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn test_match_count_in_message() {
        let report = scan_dangerous_patterns("eval(1); eval (2); EVAL(3)");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].matches, 3);
        assert!(report.warnings()[0].contains("eval\\s*\\("));
        assert!(report.warnings()[0].contains("3 matches"));
    }

    #[test]
    fn test_inline_images_not_flagged() {
        assert!(scan_dangerous_patterns("<img src=\"data:image/png;base64,AAAA\">").is_safe());
    }

    #[test]
    fn test_lexical_false_positive_in_comment() {
        assert!(!scan_dangerous_patterns("<!-- never call eval() here -->").is_safe());
    }

    #[test]
    fn test_custom_registry() {
        let scanner = SecurityScanner::with_patterns(vec![])
            .with_pattern(DangerPattern::new(r"navigator\.sendBeacon", "beacon").unwrap());
        assert_eq!(scanner.patterns().len(), 1);
        assert!(scanner.scan("eval(1)").is_safe());
        assert!(!scanner.scan("navigator.sendBeacon(u)").is_safe());
    }

    #[test]
    fn test_extending_builtin_keeps_order() {
        let scanner = SecurityScanner::builtin()
            .with_pattern(DangerPattern::new(r"WebSocket", "websocket").unwrap());
        assert_eq!(scanner.patterns().len(), DANGER_PATTERN_TABLE.len() + 1);
        assert_eq!(scanner.patterns().last().unwrap().pattern(), "WebSocket");
        assert_eq!(DANGER_PATTERNS.len(), DANGER_PATTERN_TABLE.len());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(DangerPattern::new("(unclosed", "broken").is_err());
    }
}
