//! Save-time validation of WEB_STATIC content.
//!
//! Three independent checks feed one verdict:
//! - [`syntax`]: stack-based tag matching with HTML5 tolerance
//! - [`size`]: UTF-8 byte length against a soft and a hard limit
//! - [`security`]: lexical scan against a fixed dangerous-pattern registry
//!
//! # Usage
//!
//! ```rust
//! use webstatic_guard::validation::validate;
//!
//! let verdict = validate("<div><p>hello</p></div>");
//! assert!(verdict.can_save);
//! assert!(verdict.is_valid);
//!
//! let verdict = validate("<div><span></div>");
//! assert!(!verdict.can_save);
//! assert!(verdict.ensure_can_save().is_err());
//! ```

pub mod security;
pub mod size;
pub mod syntax;
pub mod verdict;

pub use security::{
    DANGER_PATTERN_TABLE, DANGER_PATTERNS, DangerPattern, SecurityFinding, SecurityReport,
    SecurityScanner, scan_dangerous_patterns,
};
pub use size::{SIZE_HARD_LIMIT, SIZE_SOFT_LIMIT, SizeLevel, SizeReport, classify_bytes, classify_size};
pub use syntax::{
    OPTIONAL_CLOSE_ELEMENTS, SyntaxIssue, SyntaxIssueKind, SyntaxReport, SyntaxValidator,
    TagFrame, VOID_ELEMENTS, check_syntax,
};
pub use verdict::{ValidationVerdict, validate};
