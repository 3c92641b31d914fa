//! Seam between the sandboxed renderer and a host web view.

use super::policy::WebAttribute;
use crate::error::BackendError;
use serde::Serialize;

/// Origin a document is loaded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum BaseUrl {
    /// Empty URL: relative references resolve against nothing
    Opaque,
}

impl BaseUrl {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseUrl::Opaque => "",
        }
    }
}

/// A host toolkit's web view, reduced to what sandboxed rendering needs.
pub trait WebViewBackend {
    fn set_attribute(&mut self, attribute: WebAttribute, enabled: bool) -> Result<(), BackendError>;

    fn set_html(&mut self, html: &str, base_url: BaseUrl) -> Result<(), BackendError>;
}

impl<B: WebViewBackend + ?Sized> WebViewBackend for Box<B> {
    fn set_attribute(&mut self, attribute: WebAttribute, enabled: bool) -> Result<(), BackendError> {
        (**self).set_attribute(attribute, enabled)
    }

    fn set_html(&mut self, html: &str, base_url: BaseUrl) -> Result<(), BackendError> {
        (**self).set_html(html, base_url)
    }
}

/// A document as a backend received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub html: String,
    pub base_url: BaseUrl,
}

/// Backend call, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    SetAttribute(WebAttribute, bool),
    SetHtml(LoadedDocument),
}

/// In-memory backend for headless hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    calls: Vec<BackendCall>,
    fail_next_load: Option<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Attribute writes, in order.
    pub fn attributes(&self) -> Vec<(WebAttribute, bool)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::SetAttribute(attribute, enabled) => Some((*attribute, *enabled)),
                BackendCall::SetHtml(_) => None,
            })
            .collect()
    }

    pub fn documents(&self) -> Vec<&LoadedDocument> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::SetHtml(document) => Some(document),
                BackendCall::SetAttribute(..) => None,
            })
            .collect()
    }

    /// Make the next `set_html` fail with `message`.
    pub fn fail_next_load(&mut self, message: impl Into<String>) {
        self.fail_next_load = Some(message.into());
    }
}

impl WebViewBackend for MemoryBackend {
    fn set_attribute(&mut self, attribute: WebAttribute, enabled: bool) -> Result<(), BackendError> {
        self.calls.push(BackendCall::SetAttribute(attribute, enabled));
        Ok(())
    }

    fn set_html(&mut self, html: &str, base_url: BaseUrl) -> Result<(), BackendError> {
        if let Some(message) = self.fail_next_load.take() {
            return Err(message.into());
        }
        self.calls.push(BackendCall::SetHtml(LoadedDocument {
            html: html.to_string(),
            base_url,
        }));
        Ok(())
    }
}
