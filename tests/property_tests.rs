//! Property-based testing for the validation and sanitization pipeline
//!
//! # Test Coverage
//!
//! - Verdict invariants hold for arbitrary input
//! - Well-formed generated documents always pass the syntax check
//! - Dropping a closing tag of a non-optional element is always caught
//! - Size classification is monotonic in byte length
//! - Sanitization never loses content and is idempotent

use proptest::prelude::*;
use webstatic_guard::validation::{SIZE_HARD_LIMIT, SIZE_SOFT_LIMIT, classify_bytes};
use webstatic_guard::{InjectionStrategy, SizeLevel, sanitize, validate};

// =============================================================================
// Generators
// =============================================================================

const CONTAINER_TAGS: &[&str] = &["div", "span", "section", "main", "button", "label", "ul"];

/// Text that never opens a tag.
fn arb_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 .,!?=+-]{0,12}").unwrap()
}

fn arb_container() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CONTAINER_TAGS)
}

fn arb_void() -> impl Strategy<Value = &'static str> {
    prop::sample::select(&["br", "hr", "img", "input", "meta", "wbr"][..])
}

/// Balanced markup built from containers, void elements and text.
fn arb_balanced() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        arb_text(),
        arb_void().prop_map(|tag| format!("<{tag}>")),
        arb_void().prop_map(|tag| format!("<{tag} />")),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            arb_container(),
            any::<bool>(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, upper, children)| {
                let body = children.concat();
                if upper {
                    let tag = tag.to_ascii_uppercase();
                    format!("<{tag} class=\"x\">{body}</{tag}>")
                } else {
                    format!("<{tag}>{body}</{tag}>")
                }
            })
    })
}

// =============================================================================
// Verdict invariants
// =============================================================================

proptest! {
    #[test]
    fn prop_verdict_invariants_hold(content in ".{0,400}") {
        let verdict = validate(&content);
        prop_assert_eq!(verdict.can_save, verdict.syntax_valid && verdict.size_valid);
        prop_assert_eq!(
            verdict.is_valid,
            verdict.syntax_valid && verdict.size_level == SizeLevel::Ok && verdict.security_safe
        );
        prop_assert_eq!(verdict.syntax_valid, verdict.syntax_errors.is_empty());
        prop_assert_eq!(verdict.security_safe, verdict.security_warnings.is_empty());
        prop_assert_eq!(verdict.size_bytes, content.len());
        prop_assert_eq!(verdict.ensure_can_save().is_ok(), verdict.can_save);
    }

    #[test]
    fn prop_validate_is_deterministic(content in "[<>/a-z!\\- \"'=]{0,200}") {
        prop_assert_eq!(validate(&content), validate(&content));
    }

    #[test]
    fn prop_balanced_markup_is_syntax_valid(content in arb_balanced()) {
        prop_assume!(!content.is_empty());
        let verdict = validate(&content);
        prop_assert!(verdict.syntax_valid, "{:?} -> {:?}", content, verdict.syntax_errors);
    }

    #[test]
    fn prop_dropped_close_tag_detected(inner in arb_balanced(), tag in arb_container()) {
        let content = format!("<{tag}>{inner}");
        let verdict = validate(&content);
        prop_assert!(!verdict.syntax_valid);
        prop_assert!(!verdict.can_save);
        let reported = verdict
            .syntax_errors
            .iter()
            .any(|e| e.starts_with("Unclosed critical tags") && e.contains(tag));
        prop_assert!(reported, "{:?}", verdict.syntax_errors);
    }

    #[test]
    fn prop_security_findings_never_block(inner in arb_balanced()) {
        let content = format!("<div>{inner}<script>eval(x); fetch(y)</script></div>");
        let verdict = validate(&content);
        prop_assert!(verdict.can_save);
        prop_assert!(!verdict.is_valid);
        prop_assert_eq!(verdict.security_warnings.len(), 2);
    }
}

// =============================================================================
// Size classification
// =============================================================================

proptest! {
    #[test]
    fn prop_size_levels_follow_thresholds(bytes in 0usize..(SIZE_HARD_LIMIT * 2)) {
        let report = classify_bytes(bytes);
        let expected = if bytes > SIZE_HARD_LIMIT {
            SizeLevel::Error
        } else if bytes > SIZE_SOFT_LIMIT {
            SizeLevel::Warning
        } else {
            SizeLevel::Ok
        };
        prop_assert_eq!(report.level, expected);
        prop_assert_eq!(report.valid, bytes <= SIZE_HARD_LIMIT);
        prop_assert!(report.message.contains(" KB"));
    }

    #[test]
    fn prop_multibyte_text_counted_in_bytes(text in "[é€😀a]{1,64}") {
        let verdict = validate(&format!("<p>{text}</p>"));
        prop_assert_eq!(verdict.size_bytes, text.len() + "<p></p>".len());
    }
}

// =============================================================================
// Sanitization
// =============================================================================

proptest! {
    #[test]
    fn prop_sanitize_preserves_content(content in ".{0,300}") {
        let doc = sanitize(&content);
        prop_assert!(doc.len() >= content.len());
        if doc.strategy() == InjectionStrategy::WrappedFragment {
            prop_assert!(doc.as_str().contains(content.as_str()));
        }
    }

    #[test]
    fn prop_sanitize_is_idempotent(content in ".{0,300}") {
        let once = sanitize(&content);
        let twice = sanitize(once.as_str());
        prop_assert_eq!(twice.strategy(), InjectionStrategy::AlreadyProtected);
        prop_assert_eq!(twice.as_str(), once.as_str());
    }

    #[test]
    fn prop_wrapped_fragments_keep_markup(content in arb_balanced()) {
        prop_assume!(!content.is_empty());
        let doc = sanitize(&content);
        prop_assert_eq!(doc.strategy(), InjectionStrategy::WrappedFragment);
        let verdict = validate(doc.as_str());
        prop_assert!(verdict.syntax_valid, "{:?}", verdict.syntax_errors);
    }
}
