//! Host transport contract: the single invocation primitive plus callback registration.

use std::{collections::BTreeMap, future::Future, pin::Pin};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HostResult;

/// Object-safe boxed future used by [`HostTransport`] async methods.
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host-assigned identifier for a registered callback.
pub type CallbackId = u32;

/// Callback registered with the host. Receives the raw JSON payload the host delivers.
pub type HostCallback = Box<dyn FnMut(Value)>;

/// Per-call options forwarded verbatim to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeOptions {
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
}

impl InvokeOptions {
    /// Adds one header and returns the updated options.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Label metadata for the window hosting the current document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowMetadata {
    /// Window label.
    pub label: String,
}

/// Label metadata for the webview hosting the current document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebviewMetadata {
    /// Label of the window that owns the webview.
    pub window_label: String,
    /// Webview label.
    pub label: String,
}

/// Static metadata injected by the host runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMetadata {
    /// Window the current document belongs to.
    pub current_window: WindowMetadata,
    /// Webview the current document belongs to.
    pub current_webview: WebviewMetadata,
}

impl HostMetadata {
    /// Metadata for a document living in the single webview of window `label`.
    pub fn for_window(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            current_window: WindowMetadata {
                label: label.clone(),
            },
            current_webview: WebviewMetadata {
                window_label: label.clone(),
                label,
            },
        }
    }
}

/// Host-supplied primitive every binding is built on.
///
/// Implementations are single-threaded: futures and callbacks are not `Send`, matching the
/// cooperative callback model of a webview document.
pub trait HostTransport {
    /// Forwards `command` with `args` to the host and resolves with the host's answer.
    fn invoke<'a>(
        &'a self,
        command: &'a str,
        args: Value,
        options: Option<&'a InvokeOptions>,
    ) -> HostFuture<'a, HostResult<Value>>;

    /// Registers `callback` with the host and returns the id the host uses to address it.
    ///
    /// With `once` set the host drops the registration after the first delivery.
    fn transform_callback(&self, callback: HostCallback, once: bool) -> CallbackId;

    /// Releases a registration. The callback is never invoked again afterwards.
    fn unregister_callback(&self, id: CallbackId);

    /// Converts a filesystem path into a URL the document can load through `protocol`.
    fn convert_file_src(&self, path: &str, protocol: &str) -> String;

    /// Returns the static metadata injected by the host.
    fn metadata(&self) -> HostMetadata;

    /// Returns a static constant published by a host plugin, e.g. `("path", "sep")`.
    fn plugin_constant(&self, plugin: &str, key: &str) -> Option<Value>;

    /// Runs a fire-and-forget follow-up task on the document's event loop.
    fn spawn_local(&self, task: HostFuture<'static, ()>);
}
