//! Error taxonomy for the validation and sandboxing pipeline
//!
//! Two families live here:
//! - [`FindingKind`] / [`Finding`]: conditions captured inside a verdict.
//!   These are data, not `Err` values; validation itself never fails.
//! - [`SaveRejected`] and [`SandboxError`]: typed errors returned by the
//!   save gate and by the render surface.

use crate::sandbox::policy::WebAttribute;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

// =============================================================================
// FINDINGS
// =============================================================================

/// Classification of every condition a verdict can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Structural markup defect
    SyntaxError,
    /// Hard size limit exceeded
    SizeError,
    /// Soft size limit exceeded
    SizeWarning,
    /// Dangerous pattern matched
    SecurityWarning,
    /// Empty or whitespace-only input
    EmptyContentError,
}

impl FindingKind {
    /// Whether this condition prevents persisting the content
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            FindingKind::SyntaxError | FindingKind::SizeError | FindingKind::EmptyContentError
        )
    }

    /// Check that produced the condition; the label `validate` logs
    pub fn category(&self) -> &'static str {
        match self {
            FindingKind::SyntaxError | FindingKind::EmptyContentError => "syntax",
            FindingKind::SizeError | FindingKind::SizeWarning => "size",
            FindingKind::SecurityWarning => "security",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FindingKind::SyntaxError => "syntax error",
            FindingKind::SizeError => "size error",
            FindingKind::SizeWarning => "size warning",
            FindingKind::SecurityWarning => "security warning",
            FindingKind::EmptyContentError => "empty content",
        };
        f.write_str(label)
    }
}

/// A classified, user-presentable condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub message: String,
}

impl Finding {
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.kind.is_blocking()
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

// =============================================================================
// TYPED ERRORS
// =============================================================================

/// Returned by the save gate when a verdict has `can_save == false`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("content cannot be saved: {}", reasons.join("; "))]
pub struct SaveRejected {
    /// Messages of every blocking finding, in verdict order
    pub reasons: Vec<String>,
}

/// Error produced by a [`crate::sandbox::WebViewBackend`] implementation
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the sandboxed render surface
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("sandbox policy enables forbidden capability: {attribute}")]
    PolicyViolation { attribute: WebAttribute },

    #[error("render backend failed to {operation}: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("content refused before rendering: {source}")]
    ContentRefused {
        #[from]
        source: SaveRejected,
    },
}

impl SandboxError {
    pub(crate) fn backend(operation: &'static str, source: BackendError) -> Self {
        SandboxError::Backend { operation, source }
    }
}
