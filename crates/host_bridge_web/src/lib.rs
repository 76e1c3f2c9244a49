//! Browser (`wasm32`) transport for [`host_bridge`].
//!
//! The desktop host injects `window.__TAURI_INTERNALS__` into every webview document; this crate
//! binds it through `wasm-bindgen` and exposes it as a [`host_bridge::HostTransport`]. Native
//! builds compile against an inert fallback that reports [`host_bridge::HostError::Unavailable`].
//!
//! - `bridge` holds the transport and the target-split `interop` glue.
//! - [`adapters`] picks the transport at compile time (`host-stub` swaps in the in-memory mock).

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and the default client factory.
pub mod adapters;
mod bridge;

pub use adapters::{default_client, host_strategy_name, selected_host_strategy, HostStrategy};
pub use bridge::{is_tauri, TauriInternalsTransport};
