//! CSP injection for render-time sanitization.
//!
//! The directive set is fixed. Scripts may run inline but cannot reach the
//! network, fonts, plugins, media or frames; images are limited to `data:` and
//! `blob:` URLs.

use crate::metrics::METRICS;
use once_cell::sync::Lazy;
use serde::Serialize;
use strum::{Display, IntoStaticStr};
use tracing::debug;

/// Directive → value, in emission order.
pub const CSP_DIRECTIVES: &[(&str, &str)] = &[
    ("default-src", "'self'"),
    ("script-src", "'unsafe-inline' 'unsafe-eval'"),
    ("style-src", "'unsafe-inline'"),
    ("img-src", "data: blob:"),
    ("connect-src", "'none'"),
    ("font-src", "'none'"),
    ("object-src", "'none'"),
    ("media-src", "'none'"),
    ("frame-src", "'none'"),
];

/// Policy string built from [`CSP_DIRECTIVES`].
pub static CSP_POLICY: Lazy<String> = Lazy::new(|| {
    CSP_DIRECTIVES
        .iter()
        .map(|(directive, value)| format!("{directive} {value}"))
        .collect::<Vec<_>>()
        .join("; ")
});

/// The canonical meta element this sanitizer injects.
pub static CSP_META_TAG: Lazy<String> = Lazy::new(|| {
    format!(
        r#"<meta http-equiv="Content-Security-Policy" content="{}">"#,
        CSP_POLICY.as_str()
    )
});

/// How the CSP element was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InjectionStrategy {
    /// Inserted right after an existing `<head>`
    AfterHead,
    /// A `<head>` block was synthesized right after `<html>`
    SynthesizedHead,
    /// The input was wrapped in a minimal document skeleton
    WrappedFragment,
    /// The first `<head>` already starts with the canonical CSP element
    AlreadyProtected,
}

/// A document ready for a sandboxed renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedDocument {
    html: String,
    strategy: InjectionStrategy,
}

impl SanitizedDocument {
    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }

    pub fn strategy(&self) -> InjectionStrategy {
        self.strategy
    }

    pub fn len(&self) -> usize {
        self.html.len()
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

impl AsRef<str> for SanitizedDocument {
    fn as_ref(&self) -> &str {
        &self.html
    }
}

/// First offset of `needle` that is not inside an `<!-- -->` comment. An
/// unterminated comment hides the rest of the input.
fn find_outside_comments(haystack: &str, needle: &str) -> Option<usize> {
    let mut from = 0;
    loop {
        let rest = haystack.get(from..)?;
        let hit = rest.find(needle)?;
        match rest.find("<!--") {
            Some(open) if open < hit => {
                let close = rest[open + 4..].find("-->")?;
                from += open + 4 + close + 3;
            }
            _ => return Some(from + hit),
        }
    }
}

/// Inject the CSP element. The first case-insensitive `<head>` outside a
/// comment wins, then `<html>`; anything else is wrapped in a full document.
pub fn sanitize(content: &str) -> SanitizedDocument {
    let meta = CSP_META_TAG.as_str();
    // ASCII lowercasing keeps byte offsets aligned with `content`.
    let lower = content.to_ascii_lowercase();

    let (html, strategy) = if let Some(pos) = find_outside_comments(&lower, "<head>") {
        let insert_at = pos + "<head>".len();
        let already = content[insert_at..]
            .strip_prefix('\n')
            .is_some_and(|rest| rest.starts_with(meta));
        if already {
            (content.to_string(), InjectionStrategy::AlreadyProtected)
        } else {
            let mut html = String::with_capacity(content.len() + meta.len() + 1);
            html.push_str(&content[..insert_at]);
            html.push('\n');
            html.push_str(meta);
            html.push_str(&content[insert_at..]);
            (html, InjectionStrategy::AfterHead)
        }
    } else if let Some(pos) = find_outside_comments(&lower, "<html>") {
        let insert_at = pos + "<html>".len();
        let html = format!(
            "{}\n<head>\n{meta}\n</head>{}",
            &content[..insert_at],
            &content[insert_at..]
        );
        (html, InjectionStrategy::SynthesizedHead)
    } else {
        let html = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n{meta}\n</head>\n<body>\n{content}\n</body>\n</html>"
        );
        (html, InjectionStrategy::WrappedFragment)
    };

    let label: &'static str = strategy.into();
    METRICS.record_sanitization(label);
    debug!(
        original_bytes = content.len(),
        sanitized_bytes = html.len(),
        strategy = %strategy,
        "injected content security policy"
    );

    SanitizedDocument { html, strategy }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csp_count(html: &str) -> usize {
        html.matches("Content-Security-Policy").count()
    }

    #[test]
    fn test_policy_text() {
        assert_eq!(
            CSP_POLICY.as_str(),
            "default-src 'self'; script-src 'unsafe-inline' 'unsafe-eval'; \
             style-src 'unsafe-inline'; img-src data: blob:; connect-src 'none'; \
             font-src 'none'; object-src 'none'; media-src 'none'; frame-src 'none'"
        );
    }

    #[test]
    fn test_after_existing_head() {
        let doc = sanitize("<HTML><HEAD><title>x</title></HEAD><body></body></HTML>");
        assert_eq!(doc.strategy(), InjectionStrategy::AfterHead);
        assert!(
            doc.as_str()
                .starts_with(&format!("<HTML><HEAD>\n{}<title>", CSP_META_TAG.as_str()))
        );
        assert_eq!(csp_count(doc.as_str()), 1);
    }

    #[test]
    fn test_synthesized_head() {
        let doc = sanitize("<html><body>hi</body></html>");
        assert_eq!(doc.strategy(), InjectionStrategy::SynthesizedHead);
        assert_eq!(
            doc.as_str(),
            format!(
                "<html>\n<head>\n{}\n</head><body>hi</body></html>",
                CSP_META_TAG.as_str()
            )
        );
        assert_eq!(csp_count(doc.as_str()), 1);
    }

    #[test]
    fn test_fragment_wrapped() {
        let doc = sanitize("<p>hi</p>");
        assert_eq!(doc.strategy(), InjectionStrategy::WrappedFragment);
        assert!(doc.as_str().starts_with("<!DOCTYPE html>\n<html>\n<head>\n"));
        assert!(doc.as_str().contains("<body>\n<p>hi</p>\n</body>"));
        assert_eq!(csp_count(doc.as_str()), 1);
    }

    #[test]
    fn test_empty_input_still_gets_policy() {
        let doc = sanitize("");
        assert_eq!(doc.strategy(), InjectionStrategy::WrappedFragment);
        assert_eq!(csp_count(doc.as_str()), 1);
    }

    #[test]
    fn test_resanitizing_is_a_no_op() {
        for input in ["<p>hi</p>", "<html><body>x</body></html>", "<head></head>"] {
            let once = sanitize(input);
            let twice = sanitize(once.as_str());
            assert_eq!(twice.strategy(), InjectionStrategy::AlreadyProtected);
            assert_eq!(once.as_str(), twice.as_str());
        }
    }

    #[test]
    fn test_policy_elsewhere_does_not_count_as_protected() {
        let input = format!("<body>{}</body><head></head>", CSP_META_TAG.as_str());
        let doc = sanitize(&input);
        assert_eq!(doc.strategy(), InjectionStrategy::AfterHead);
        assert_eq!(csp_count(doc.as_str()), 2);
    }

    #[test]
    fn test_head_with_attributes_is_not_matched() {
        let doc = sanitize("<html><head lang=\"en\"></head></html>");
        assert_eq!(doc.strategy(), InjectionStrategy::SynthesizedHead);
    }

    #[test]
    fn test_non_ascii_prefix_keeps_offsets() {
        let doc = sanitize("<!-- ÄÖÜ İ --><head></head>");
        assert!(doc.as_str().starts_with("<!-- ÄÖÜ İ --><head>\n<meta"));
    }

    #[test]
    fn test_commented_head_is_not_trusted() {
        let input = format!(
            "<!-- <head>\n{} --><html><body>x</body></html>",
            CSP_META_TAG.as_str()
        );
        let doc = sanitize(&input);
        assert_eq!(doc.strategy(), InjectionStrategy::SynthesizedHead);
        assert!(doc.as_str().contains("--><html>\n<head>\n<meta http-equiv"));
        assert_eq!(sanitize(doc.as_str()).strategy(), InjectionStrategy::AlreadyProtected);
    }

    #[test]
    fn test_commented_markers_skipped() {
        let doc = sanitize("<!-- <HEAD> --><head></head>");
        assert_eq!(doc.strategy(), InjectionStrategy::AfterHead);
        assert!(doc.as_str().starts_with("<!-- <HEAD> --><head>\n<meta"));

        let doc = sanitize("<!-- <html> <head> -->plain");
        assert_eq!(doc.strategy(), InjectionStrategy::WrappedFragment);
    }

    #[test]
    fn test_find_outside_comments() {
        assert_eq!(find_outside_comments("a<head>", "<head>"), Some(1));
        assert_eq!(find_outside_comments("<!--<head>--><head>", "<head>"), Some(13));
        assert_eq!(find_outside_comments("<!--<head>", "<head>"), None);
        assert_eq!(find_outside_comments("<head><!--x-->", "<head>"), Some(0));
    }
}
