//! Validation and sandboxing for self-authored HTML/JS content items.
//!
//! Two entry points cover the whole lifecycle of a WEB_STATIC item:
//! - [`validate`] before save: syntax, size and security checks folded into
//!   one [`ValidationVerdict`]; `can_save` gates persistence
//! - [`sanitize`] before display: injects a fixed Content-Security-Policy;
//!   the result is loaded by a [`SandboxedRenderer`] built with the
//!   [`SandboxPolicy`]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod sandbox;
pub mod validation;

pub use config::{GuardConfig, LoggingSettings};
pub use error::{BackendError, Finding, FindingKind, SandboxError, SaveRejected};
pub use logging::{LogFormat, LogOutput, LoggingConfig, init_logging};
pub use sandbox::{
    BaseUrl, InjectionStrategy, LoadReport, MemoryBackend, RendererSettings, SandboxPolicy,
    SandboxedRenderer, SanitizedDocument, WebAttribute, WebViewBackend, sanitize,
};
pub use validation::{SizeLevel, ValidationVerdict, validate};
