//! Typed client bindings for a desktop host runtime's IPC surface.
//!
//! Every wrapper serializes its arguments, issues exactly one call through a [`HostTransport`]
//! with a fixed `plugin:<name>|<command>` string, and reshapes the answer into typed values.
//! The transport is a trait object so the same bindings run over the browser bridge in
//! `host_bridge_web` or over [`mocks::MockTransport`] in tests and headless builds.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod app;
pub mod client;
pub mod core;
pub mod dpi;
pub mod error;
pub mod event;
pub mod image;
pub mod menu;
pub mod mocks;
pub mod path;
pub mod transport;
pub mod tray;
pub mod window;

pub use client::{HostClient, WeakHostClient, DEFAULT_FILE_PROTOCOL};
pub use crate::core::{
    add_plugin_listener, check_permissions, file_src_url, request_permissions, Channel,
    FileSrcStyle, PermissionState, PluginListener, Resource, ResourceId, CHANNEL_PREFIX,
};
pub use dpi::{
    validate_scale_factor, LogicalPosition, LogicalSize, PhysicalPosition, PhysicalSize, Position,
    Rect, Size,
};
pub use error::{HostError, HostResult};
pub use event::{
    emit, emit_to, listen, once, Event, EventId, EventListener, EventTarget, ListenOptions,
    TauriEvent,
};
pub use image::{Image, ImageSize, ImageSource};
pub use transport::{
    CallbackId, HostCallback, HostFuture, HostMetadata, HostTransport, InvokeOptions,
    WebviewMetadata, WindowMetadata,
};
pub use tray::{TrayIcon, TrayIconEvent, TrayIconOptions};
pub use window::{Monitor, Window, WindowOptions};
