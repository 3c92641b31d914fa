//! Declarative capability flags for the render surface.
//!
//! A [`SandboxPolicy`] is applied once when a renderer is built and never
//! changes afterwards. Only script execution may be enabled; everything it
//! could reach (network, storage, embeds) is cut off by the injected CSP.

use crate::error::SandboxError;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

/// Render-surface settings a policy controls, in application order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WebAttribute {
    LocalStorageEnabled,
    LocalContentCanAccessFileUrls,
    LocalContentCanAccessRemoteUrls,
    AllowRunningInsecureContent,
    JavascriptEnabled,
    PluginsEnabled,
    JavascriptCanOpenWindows,
}

impl WebAttribute {
    /// The only attribute a sandboxed surface may turn on
    pub fn may_be_enabled(self) -> bool {
        matches!(self, WebAttribute::JavascriptEnabled)
    }
}

/// Capability descriptor for sandboxed rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxPolicy {
    pub local_storage_enabled: bool,
    pub file_access_from_local_content: bool,
    pub remote_access_from_local_content: bool,
    pub insecure_content_allowed: bool,
    pub plugins_enabled: bool,
    pub script_can_open_windows: bool,
    pub javascript_enabled: bool,
}

/// The one policy WEB_STATIC documents are rendered under.
pub const STRICT_SANDBOX_POLICY: SandboxPolicy = SandboxPolicy {
    local_storage_enabled: false,
    file_access_from_local_content: false,
    remote_access_from_local_content: false,
    insecure_content_allowed: false,
    plugins_enabled: false,
    script_can_open_windows: false,
    javascript_enabled: true,
};

impl Default for SandboxPolicy {
    fn default() -> Self {
        STRICT_SANDBOX_POLICY
    }
}

impl SandboxPolicy {
    pub const fn strict() -> Self {
        STRICT_SANDBOX_POLICY
    }

    /// Flag value for one attribute.
    pub fn get(&self, attribute: WebAttribute) -> bool {
        match attribute {
            WebAttribute::LocalStorageEnabled => self.local_storage_enabled,
            WebAttribute::LocalContentCanAccessFileUrls => self.file_access_from_local_content,
            WebAttribute::LocalContentCanAccessRemoteUrls => self.remote_access_from_local_content,
            WebAttribute::AllowRunningInsecureContent => self.insecure_content_allowed,
            WebAttribute::JavascriptEnabled => self.javascript_enabled,
            WebAttribute::PluginsEnabled => self.plugins_enabled,
            WebAttribute::JavascriptCanOpenWindows => self.script_can_open_windows,
        }
    }

    /// Every attribute with its value, in application order.
    pub fn attributes(&self) -> impl Iterator<Item = (WebAttribute, bool)> + '_ {
        WebAttribute::iter().map(move |attribute| (attribute, self.get(attribute)))
    }

    /// Reject any policy that enables a capability other than script execution.
    pub fn validate(&self) -> Result<(), SandboxError> {
        match self
            .attributes()
            .find(|(attribute, enabled)| *enabled && !attribute.may_be_enabled())
        {
            Some((attribute, _)) => Err(SandboxError::PolicyViolation { attribute }),
            None => Ok(()),
        }
    }
}
