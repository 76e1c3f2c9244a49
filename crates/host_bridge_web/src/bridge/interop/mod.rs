//! Target routing for the `__TAURI_INTERNALS__` glue.
//!
//! Every function here forwards to the wasm bindings or to the native fallback so the transport
//! in `bridge` compiles unchanged on both targets.

use host_bridge::{CallbackId, HostCallback, HostFuture, HostMetadata, HostResult, InvokeOptions};
use serde_json::Value;

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub async fn invoke(
    command: &str,
    args: Value,
    options: Option<&InvokeOptions>,
) -> HostResult<Value> {
    imp::invoke(command, args, options).await
}

pub fn transform_callback(callback: HostCallback, once: bool) -> CallbackId {
    imp::transform_callback(callback, once)
}

pub fn unregister_callback(id: CallbackId) {
    imp::unregister_callback(id)
}

pub fn convert_file_src(path: &str, protocol: &str) -> String {
    imp::convert_file_src(path, protocol)
}

pub fn metadata() -> HostMetadata {
    imp::metadata()
}

pub fn plugin_constant(plugin: &str, key: &str) -> Option<Value> {
    imp::plugin_constant(plugin, key)
}

pub fn spawn_local(task: HostFuture<'static, ()>) {
    imp::spawn_local(task)
}

pub fn is_tauri() -> bool {
    imp::is_tauri()
}
