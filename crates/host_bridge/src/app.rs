//! Application-level information and controls.

use serde_json::json;

use crate::{client::HostClient, core::ResourceId, error::HostResult, image::Image, window::Theme};

/// Application version from the host configuration.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn get_version(client: &HostClient) -> HostResult<String> {
    client.invoke("plugin:app|version", ()).await
}

/// Application name from the host configuration.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn get_name(client: &HostClient) -> HostResult<String> {
    client.invoke("plugin:app|name", ()).await
}

/// Version of the host runtime.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn get_tauri_version(client: &HostClient) -> HostResult<String> {
    client.invoke("plugin:app|tauri_version", ()).await
}

/// Application bundle identifier.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn get_identifier(client: &HostClient) -> HostResult<String> {
    client.invoke("plugin:app|identifier", ()).await
}

/// Shows the application (macOS).
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn show(client: &HostClient) -> HostResult<()> {
    client.invoke("plugin:app|app_show", ()).await
}

/// Hides the application without hiding its windows individually (macOS).
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn hide(client: &HostClient) -> HostResult<()> {
    client.invoke("plugin:app|app_hide", ()).await
}

/// Default window icon, when the application bundles one.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn default_window_icon(client: &HostClient) -> HostResult<Option<Image>> {
    let rid: Option<ResourceId> = client
        .invoke("plugin:app|default_window_icon", ())
        .await?;
    Ok(rid.map(|rid| Image::from_rid(client, rid)))
}

/// Forces the application theme; `None` follows the system.
///
/// # Errors
///
/// Propagates the host rejection.
pub async fn set_theme(client: &HostClient, theme: Option<Theme>) -> HostResult<()> {
    client
        .invoke("plugin:app|set_app_theme", json!({ "theme": theme }))
        .await
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    use super::*;
    use crate::mocks::MockTransport;

    #[test]
    fn getters_send_empty_arguments() {
        let mock = Rc::new(MockTransport::with_handler(|command, _| match command {
            "plugin:app|version" => Ok(json!("1.4.0")),
            "plugin:app|name" => Ok(json!("notes")),
            _ => Ok(Value::Null),
        }));
        let client = HostClient::from_rc(Rc::clone(&mock));

        assert_eq!(block_on(get_version(&client)).expect("version"), "1.4.0");
        assert_eq!(block_on(get_name(&client)).expect("name"), "notes");
        assert!(block_on(default_window_icon(&client)).expect("icon").is_none());

        for call in mock.calls() {
            assert_eq!(call.args, json!({}));
        }
    }

    #[test]
    fn theme_and_icon_round_through_host() {
        let mock = Rc::new(MockTransport::with_handler(|command, _| match command {
            "plugin:app|default_window_icon" => Ok(json!(12)),
            _ => Ok(Value::Null),
        }));
        let client = HostClient::from_rc(Rc::clone(&mock));

        let icon = block_on(default_window_icon(&client))
            .expect("icon")
            .expect("bundled icon");
        block_on(set_theme(&client, Some(Theme::Dark))).expect("theme");
        block_on(set_theme(&client, None)).expect("system theme");

        assert_eq!(icon.rid(), 12);
        let calls = mock.calls();
        assert_eq!(calls[1].command, "plugin:app|set_app_theme");
        assert_eq!(calls[1].args, json!({"theme": "dark"}));
        assert_eq!(calls[2].args, json!({"theme": null}));
    }
}
