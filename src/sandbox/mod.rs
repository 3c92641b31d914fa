//! Render-time isolation for WEB_STATIC documents.
//!
//! Two layers work together:
//! - [`csp`]: every document gets a fixed Content-Security-Policy element
//! - [`policy`] + [`renderer`]: the web view is locked down once, before the
//!   first load, and loads documents against an opaque origin
//!
//! # Example
//!
//! ```rust
//! use webstatic_guard::sandbox::{MemoryBackend, SandboxPolicy, SandboxedRenderer};
//!
//! let mut renderer = SandboxedRenderer::new(MemoryBackend::new(), SandboxPolicy::strict())?;
//! let report = renderer.load("<button onclick=\"n++\">+</button>")?;
//! assert!(report.sanitized_bytes > report.original_bytes);
//! # Ok::<(), webstatic_guard::SandboxError>(())
//! ```

pub mod backend;
pub mod csp;
pub mod policy;
pub mod renderer;

pub use backend::{BackendCall, BaseUrl, LoadedDocument, MemoryBackend, WebViewBackend};
pub use csp::{
    CSP_DIRECTIVES, CSP_META_TAG, CSP_POLICY, InjectionStrategy, SanitizedDocument, sanitize,
};
pub use policy::{STRICT_SANDBOX_POLICY, SandboxPolicy, WebAttribute};
pub use renderer::{LoadReport, RendererSettings, SandboxedRenderer};
