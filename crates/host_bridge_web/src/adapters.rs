use host_bridge::{mocks::MockTransport, HostClient};

use crate::TauriInternalsTransport;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Compile-time selected host strategy for [`default_client`].
pub enum HostStrategy {
    /// Desktop host reached through `window.__TAURI_INTERNALS__`.
    Tauri,
    /// In-memory transport that answers every command with `null`.
    Stub,
}

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "host-stub")]
    {
        HostStrategy::Stub
    }

    #[cfg(not(feature = "host-stub"))]
    {
        HostStrategy::Tauri
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    match selected_host_strategy() {
        HostStrategy::Tauri => "tauri",
        HostStrategy::Stub => "stub",
    }
}

/// Builds a client over the transport chosen by [`selected_host_strategy`].
pub fn default_client() -> HostClient {
    let client = match selected_host_strategy() {
        HostStrategy::Tauri => HostClient::new(TauriInternalsTransport),
        HostStrategy::Stub => HostClient::new(MockTransport::new()),
    };
    log::debug!("host client using `{}` strategy", host_strategy_name());
    client
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use host_bridge::app;
    use pretty_assertions::assert_eq;

    use super::*;

    #[cfg(not(feature = "host-stub"))]
    #[test]
    fn default_strategy_targets_the_desktop_host() {
        assert_eq!(selected_host_strategy(), HostStrategy::Tauri);
        assert_eq!(host_strategy_name(), "tauri");
    }

    #[cfg(all(not(feature = "host-stub"), not(target_arch = "wasm32")))]
    #[test]
    fn default_client_without_host_is_unavailable() {
        let err = block_on(app::get_version(&default_client())).expect_err("no host");
        assert!(matches!(err, host_bridge::HostError::Unavailable(_)));
    }

    #[cfg(feature = "host-stub")]
    #[test]
    fn stub_strategy_resolves_unit_commands() {
        assert_eq!(host_strategy_name(), "stub");
        block_on(app::show(&default_client())).expect("stub answers null");
    }
}
