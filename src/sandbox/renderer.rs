//! Sandboxed render surface.
//!
//! Construction applies the policy to the backend; only then does a
//! [`SandboxedRenderer`] exist, so every load happens after isolation is in
//! place. There is no way to change the policy of a live renderer.

use super::backend::{BaseUrl, WebViewBackend};
use super::csp::{InjectionStrategy, sanitize};
use super::policy::SandboxPolicy;
use crate::error::SandboxError;
use crate::metrics::METRICS;
use crate::validation::validate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Renderer behavior that is safe to configure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Run full validation before loading and refuse content that could not
    /// have been saved
    pub verify_before_render: bool,
}

/// What a successful load did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub original_bytes: usize,
    pub sanitized_bytes: usize,
    pub strategy: InjectionStrategy,
}

#[derive(Debug)]
pub struct SandboxedRenderer<B> {
    backend: B,
    policy: SandboxPolicy,
    settings: RendererSettings,
}

impl<B: WebViewBackend> SandboxedRenderer<B> {
    pub fn new(backend: B, policy: SandboxPolicy) -> Result<Self, SandboxError> {
        Self::with_settings(backend, policy, RendererSettings::default())
    }

    pub fn with_settings(
        mut backend: B,
        policy: SandboxPolicy,
        settings: RendererSettings,
    ) -> Result<Self, SandboxError> {
        policy.validate()?;

        for (attribute, enabled) in policy.attributes() {
            backend
                .set_attribute(attribute, enabled)
                .map_err(|source| SandboxError::backend("apply sandbox attribute", source))?;
        }

        info!(
            local_storage = policy.local_storage_enabled,
            file_urls = policy.file_access_from_local_content,
            remote_urls = policy.remote_access_from_local_content,
            insecure_content = policy.insecure_content_allowed,
            plugins = policy.plugins_enabled,
            open_windows = policy.script_can_open_windows,
            javascript = policy.javascript_enabled,
            verify_before_render = settings.verify_before_render,
            "sandbox policy applied to render surface"
        );

        Ok(Self {
            backend,
            policy,
            settings,
        })
    }

    pub fn policy(&self) -> &SandboxPolicy {
        &self.policy
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Sanitize raw content and hand it to the backend with an opaque origin.
    pub fn load(&mut self, content: &str) -> Result<LoadReport, SandboxError> {
        if self.settings.verify_before_render {
            if let Err(rejected) = validate(content).ensure_can_save() {
                METRICS.record_render_refusal();
                warn!(reasons = ?rejected.reasons, "refusing to render unsavable content");
                return Err(rejected.into());
            }
        }

        let document = sanitize(content);
        self.backend
            .set_html(document.as_str(), BaseUrl::Opaque)
            .map_err(|source| SandboxError::backend("load html", source))?;
        METRICS.record_document_loaded();

        let report = LoadReport {
            original_bytes: content.len(),
            sanitized_bytes: document.len(),
            strategy: document.strategy(),
        };
        info!(
            original_bytes = report.original_bytes,
            sanitized_bytes = report.sanitized_bytes,
            strategy = %report.strategy,
            "static html loaded into sandbox"
        );
        Ok(report)
    }
}
