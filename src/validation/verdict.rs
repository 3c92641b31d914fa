//! Composite verdict over the syntax, size and security checks.

use super::security::{SecurityReport, scan_dangerous_patterns};
use super::size::{SizeLevel, SizeReport, classify_size};
use super::syntax::{SyntaxReport, check_syntax};
use crate::error::{Finding, FindingKind, SaveRejected};
use crate::metrics::METRICS;
use serde::Serialize;
use tracing::{debug, warn};

/// Everything the persistence layer and the UI need to know about one blob.
///
/// `can_save == syntax_valid && size_valid` and
/// `is_valid == syntax_valid && size_level == Ok && security_safe`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub syntax_valid: bool,
    pub syntax_errors: Vec<String>,
    pub size_valid: bool,
    pub size_level: SizeLevel,
    pub size_message: String,
    pub size_bytes: usize,
    pub security_safe: bool,
    pub security_warnings: Vec<String>,
    pub can_save: bool,
    #[serde(skip)]
    findings: Vec<Finding>,
}

impl ValidationVerdict {
    pub fn from_reports(syntax: &SyntaxReport, size: &SizeReport, security: &SecurityReport) -> Self {
        let syntax_valid = syntax.is_valid();
        let security_safe = security.is_safe();

        let syntax_kind = if syntax.is_empty_content() {
            FindingKind::EmptyContentError
        } else {
            FindingKind::SyntaxError
        };
        let syntax_errors = syntax.errors();
        let security_warnings = security.warnings();

        let mut findings: Vec<Finding> = syntax_errors
            .iter()
            .map(|message| Finding::new(syntax_kind, message.as_str()))
            .collect();
        match size.level {
            SizeLevel::Error => findings.push(Finding::new(FindingKind::SizeError, &size.message)),
            SizeLevel::Warning => {
                findings.push(Finding::new(FindingKind::SizeWarning, &size.message))
            }
            SizeLevel::Ok => {}
        }
        findings.extend(
            security_warnings
                .iter()
                .map(|message| Finding::new(FindingKind::SecurityWarning, message.as_str())),
        );

        Self {
            is_valid: syntax_valid && size.level == SizeLevel::Ok && security_safe,
            syntax_valid,
            syntax_errors,
            size_valid: size.valid,
            size_level: size.level,
            size_message: size.message.clone(),
            size_bytes: size.bytes,
            security_safe,
            security_warnings,
            can_save: syntax_valid && size.valid,
            findings,
        }
    }

    /// Every condition, classified, in syntax → size → security order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn blocking_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|finding| finding.is_blocking())
    }

    /// Non-blocking findings the caller should still surface.
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|finding| !finding.is_blocking())
    }

    /// Save gate. Security warnings never block.
    pub fn ensure_can_save(&self) -> Result<(), SaveRejected> {
        if self.can_save {
            return Ok(());
        }
        Err(SaveRejected {
            reasons: self
                .blocking_findings()
                .map(|finding| finding.message.clone())
                .collect(),
        })
    }

    /// Short label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        if self.is_valid {
            "valid"
        } else if self.can_save {
            "savable_with_warnings"
        } else {
            "rejected"
        }
    }
}

/// Distinct check categories, in finding order.
fn categories<'a>(findings: impl Iterator<Item = &'a Finding>) -> Vec<&'static str> {
    let mut labels: Vec<&'static str> = Vec::new();
    for finding in findings {
        let category = finding.kind.category();
        if !labels.contains(&category) {
            labels.push(category);
        }
    }
    labels
}

/// Run all three checks. Deterministic; never panics or fails.
pub fn validate(content: &str) -> ValidationVerdict {
    let syntax = check_syntax(content);
    let size = classify_size(content);
    let security = scan_dangerous_patterns(content);

    for finding in &security.findings {
        METRICS.record_security_finding(&finding.pattern, finding.matches);
    }

    let verdict = ValidationVerdict::from_reports(&syntax, &size, &security);
    METRICS.record_validation(verdict.outcome());

    if verdict.can_save {
        let warned = categories(verdict.warnings());
        debug!(
            bytes = verdict.size_bytes,
            size_level = %verdict.size_level,
            security_findings = security.findings.len(),
            warned = ?warned,
            outcome = verdict.outcome(),
            "validated web static content"
        );
    } else {
        let blocked = categories(verdict.blocking_findings());
        warn!(
            bytes = verdict.size_bytes,
            syntax_errors = verdict.syntax_errors.len(),
            size_level = %verdict.size_level,
            blocked = ?blocked,
            "web static content rejected"
        );
    }

    verdict
}
