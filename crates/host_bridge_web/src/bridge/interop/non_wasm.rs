use std::cell::Cell;

use host_bridge::{file_src_url, FileSrcStyle, HostError};

use super::*;

fn unsupported() -> String {
    "the __TAURI_INTERNALS__ bridge is only available when compiled for wasm32".to_string()
}

thread_local! {
    static NEXT_CALLBACK_ID: Cell<CallbackId> = const { Cell::new(1) };
}

pub async fn invoke(
    command: &str,
    _args: Value,
    _options: Option<&InvokeOptions>,
) -> HostResult<Value> {
    log::debug!("`{command}` not sent: {}", unsupported());
    Err(HostError::Unavailable(unsupported()))
}

pub fn transform_callback(_callback: HostCallback, _once: bool) -> CallbackId {
    NEXT_CALLBACK_ID.with(|next| {
        let id = next.get();
        next.set(id.wrapping_add(1));
        id
    })
}

pub fn unregister_callback(_id: CallbackId) {}

pub fn convert_file_src(path: &str, protocol: &str) -> String {
    file_src_url(path, protocol, FileSrcStyle::CustomScheme)
}

pub fn metadata() -> HostMetadata {
    HostMetadata::default()
}

pub fn plugin_constant(_plugin: &str, _key: &str) -> Option<Value> {
    None
}

pub fn spawn_local(_task: HostFuture<'static, ()>) {
    log::warn!("follow-up task dropped: {}", unsupported());
}

pub fn is_tauri() -> bool {
    false
}
