//! [`HostTransport`] backed by the host-injected `window.__TAURI_INTERNALS__` object.
//!
//! The target-specific glue lives in `interop`; on native targets every invocation fails with
//! [`host_bridge::HostError::Unavailable`] so headless builds and unit tests still link.

mod interop;

use host_bridge::{
    CallbackId, HostCallback, HostFuture, HostMetadata, HostResult, HostTransport, InvokeOptions,
};
use serde_json::Value;

/// Transport forwarding every call to the desktop host through `__TAURI_INTERNALS__`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TauriInternalsTransport;

impl HostTransport for TauriInternalsTransport {
    fn invoke<'a>(
        &'a self,
        command: &'a str,
        args: Value,
        options: Option<&'a InvokeOptions>,
    ) -> HostFuture<'a, HostResult<Value>> {
        Box::pin(async move {
            log::debug!("invoke `{command}`");
            interop::invoke(command, args, options).await
        })
    }

    fn transform_callback(&self, callback: HostCallback, once: bool) -> CallbackId {
        interop::transform_callback(callback, once)
    }

    fn unregister_callback(&self, id: CallbackId) {
        interop::unregister_callback(id)
    }

    fn convert_file_src(&self, path: &str, protocol: &str) -> String {
        interop::convert_file_src(path, protocol)
    }

    fn metadata(&self) -> HostMetadata {
        interop::metadata()
    }

    fn plugin_constant(&self, plugin: &str, key: &str) -> Option<Value> {
        interop::plugin_constant(plugin, key)
    }

    fn spawn_local(&self, task: HostFuture<'static, ()>) {
        interop::spawn_local(task)
    }
}

/// Returns whether the current document runs inside the desktop host (`globalThis.isTauri`).
pub fn is_tauri() -> bool {
    interop::is_tauri()
}
