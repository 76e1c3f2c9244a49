//! System tray icons.

use std::{fmt, rc::Rc};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    client::HostClient,
    core::{Channel, Resource, ResourceId},
    dpi::{PhysicalPosition, Rect},
    error::{HostError, HostResult},
    image::ImageSource,
    menu::MenuRef,
};

/// Mouse button involved in a tray event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Whether the button went up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum MouseButtonState {
    Up,
    Down,
}

/// Pointer interaction with a tray icon. `position` is the cursor, `rect` the icon bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[allow(missing_docs)]
pub enum TrayIconEvent {
    Click {
        id: String,
        position: PhysicalPosition,
        rect: Rect,
        button: MouseButton,
        #[serde(rename = "buttonState")]
        button_state: MouseButtonState,
    },
    DoubleClick {
        id: String,
        position: PhysicalPosition,
        rect: Rect,
        button: MouseButton,
    },
    Enter {
        id: String,
        position: PhysicalPosition,
        rect: Rect,
    },
    Move {
        id: String,
        position: PhysicalPosition,
        rect: Rect,
    },
    Leave {
        id: String,
        position: PhysicalPosition,
        rect: Rect,
    },
}

impl TrayIconEvent {
    /// Id of the tray icon the event belongs to.
    pub fn id(&self) -> &str {
        match self {
            Self::Click { id, .. }
            | Self::DoubleClick { id, .. }
            | Self::Enter { id, .. }
            | Self::Move { id, .. }
            | Self::Leave { id, .. } => id,
        }
    }
}

/// Tray event handler.
#[derive(Clone)]
pub struct TrayAction(Rc<dyn Fn(TrayIconEvent)>);

impl TrayAction {
    /// Wraps `action`.
    pub fn new(action: impl Fn(TrayIconEvent) + 'static) -> Self {
        Self(Rc::new(action))
    }
}

impl fmt::Debug for TrayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TrayAction")
    }
}

/// Options for [`TrayIcon::new`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrayIconOptions {
    /// Tray id; the host generates one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<ImageSource>,
    /// Menu shown on click.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<MenuRef>,
    /// Hover text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Text next to the icon (macOS, Linux).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Where the icon file is written on Linux.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir_path: Option<String>,
    /// Render the icon as a macOS template image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_as_template: Option<bool>,
    /// Open the menu on left click.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_menu_on_left_click: Option<bool>,
    /// Event handler.
    #[serde(skip)]
    pub action: Option<TrayAction>,
}

/// Icon in the system tray.
#[derive(Debug, Clone)]
pub struct TrayIcon {
    resource: Resource,
    id: String,
}

impl TrayIcon {
    /// Creates a tray icon.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection; the event channel is released in that case.
    pub async fn new(client: &HostClient, options: TrayIconOptions) -> HostResult<Self> {
        let handler = match options.action.clone() {
            Some(TrayAction(action)) => {
                Channel::with_handler(client, move |event: TrayIconEvent| action(event))
            }
            None => Channel::new(client),
        };
        let encoded = serde_json::to_value(&options)
            .map_err(|e| HostError::encode("plugin:tray|new", e))?;
        let created: HostResult<(ResourceId, String)> = client
            .invoke(
                "plugin:tray|new",
                json!({ "options": encoded, "handler": handler }),
            )
            .await;
        match created {
            Ok((rid, id)) => Ok(Self {
                resource: Resource::new(client, rid),
                id,
            }),
            Err(err) => {
                handler.unregister();
                Err(err)
            }
        }
    }

    /// Tray icon with `id`, if one exists.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn get_by_id(client: &HostClient, id: &str) -> HostResult<Option<Self>> {
        let rid: Option<ResourceId> = client
            .invoke("plugin:tray|get_by_id", json!({ "id": id }))
            .await?;
        Ok(rid.map(|rid| Self {
            resource: Resource::new(client, rid),
            id: id.to_string(),
        }))
    }

    /// Removes the tray icon with `id`, returning its handle when it existed.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn remove_by_id(client: &HostClient, id: &str) -> HostResult<Option<Self>> {
        let removed: Option<ResourceId> = client
            .invoke("plugin:tray|remove_by_id", json!({ "id": id }))
            .await?;
        Ok(removed.map(|rid| Self {
            resource: Resource::new(client, rid),
            id: id.to_string(),
        }))
    }

    /// Tray id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Host resource id.
    pub fn rid(&self) -> ResourceId {
        self.resource.rid()
    }

    /// Removes the icon from the tray and releases it.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn close(&self) -> HostResult<()> {
        self.resource.close().await
    }

    async fn set(&self, name: &str, field: &str, value: serde_json::Value) -> HostResult<()> {
        let mut args = serde_json::Map::new();
        args.insert("rid".to_string(), json!(self.rid()));
        args.insert(field.to_string(), value);
        self.resource
            .client()
            .invoke(&format!("plugin:tray|{name}"), serde_json::Value::Object(args))
            .await
    }

    /// Replaces or removes the icon.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_icon(&self, icon: Option<ImageSource>) -> HostResult<()> {
        self.set("set_icon", "icon", json!(icon)).await
    }

    /// Replaces or removes the menu.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_menu(&self, menu: Option<MenuRef>) -> HostResult<()> {
        self.set("set_menu", "menu", json!(menu)).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_tooltip(&self, tooltip: Option<&str>) -> HostResult<()> {
        self.set("set_tooltip", "tooltip", json!(tooltip)).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_title(&self, title: Option<&str>) -> HostResult<()> {
        self.set("set_title", "title", json!(title)).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_visible(&self, visible: bool) -> HostResult<()> {
        self.set("set_visible", "visible", json!(visible)).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_temp_dir_path(&self, path: Option<&str>) -> HostResult<()> {
        self.set("set_temp_dir_path", "path", json!(path)).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_icon_as_template(&self, as_template: bool) -> HostResult<()> {
        self.set("set_icon_as_template", "asTemplate", json!(as_template))
            .await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_show_menu_on_left_click(&self, on_left: bool) -> HostResult<()> {
        self.set("set_show_menu_on_left_click", "onLeft", json!(on_left))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    use super::*;
    use crate::{
        core::CHANNEL_PREFIX,
        dpi::PhysicalSize,
        menu::{Menu, MenuOptions},
        mocks::MockTransport,
    };

    fn tray_host() -> (Rc<MockTransport>, HostClient) {
        let mock = Rc::new(MockTransport::with_handler(|command, _| match command {
            "plugin:tray|new" => Ok(json!([3, "main-tray"])),
            "plugin:menu|new" => Ok(json!([8, "tray-menu"])),
            _ => Ok(Value::Null),
        }));
        let client = HostClient::from_rc(Rc::clone(&mock));
        (mock, client)
    }

    #[test]
    fn new_sends_options_and_delivers_typed_events() {
        let (mock, client) = tray_host();
        let menu = block_on(Menu::new(&client, MenuOptions::default())).expect("menu");
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let tray = block_on(TrayIcon::new(
            &client,
            TrayIconOptions {
                icon: Some(ImageSource::from("icons/32x32.png")),
                menu: Some(MenuRef::from(&menu)),
                tooltip: Some("Sync idle".to_string()),
                show_menu_on_left_click: Some(false),
                action: Some(TrayAction::new(move |e| sink.borrow_mut().push(e))),
                ..TrayIconOptions::default()
            },
        ))
        .expect("tray");

        assert_eq!(tray.id(), "main-tray");
        assert_eq!(tray.rid(), 3);
        let call = mock.calls().pop().expect("tray call");
        assert_eq!(call.command, "plugin:tray|new");
        assert_eq!(
            call.args["options"],
            json!({
                "icon": "icons/32x32.png",
                "menu": [8, "Menu"],
                "tooltip": "Sync idle",
                "showMenuOnLeftClick": false
            })
        );

        let channel: u32 = call.args["handler"]
            .as_str()
            .and_then(|s| s.strip_prefix(CHANNEL_PREFIX))
            .and_then(|id| id.parse().ok())
            .expect("handler channel");
        mock.deliver(
            channel,
            json!({
                "index": 0,
                "message": {
                    "type": "Click",
                    "id": "main-tray",
                    "position": {"x": 100, "y": 5},
                    "rect": {
                        "position": {"Physical": {"x": 90, "y": 0}},
                        "size": {"Physical": {"width": 24, "height": 24}}
                    },
                    "button": "Left",
                    "buttonState": "Up"
                }
            }),
        );

        assert_eq!(
            *events.borrow(),
            vec![TrayIconEvent::Click {
                id: "main-tray".to_string(),
                position: PhysicalPosition::new(100.0, 5.0),
                rect: Rect {
                    position: PhysicalPosition::new(90.0, 0.0),
                    size: PhysicalSize::new(24.0, 24.0),
                },
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
            }]
        );
        assert_eq!(events.borrow()[0].id(), "main-tray");
    }

    #[test]
    fn setters_use_documented_field_names() {
        let (mock, client) = tray_host();
        let tray = block_on(TrayIcon::new(&client, TrayIconOptions::default())).expect("tray");
        mock.take_calls();

        block_on(tray.set_icon_as_template(true)).expect("template");
        block_on(tray.set_show_menu_on_left_click(true)).expect("left click");
        block_on(tray.set_temp_dir_path(Some("/tmp/tray"))).expect("temp dir");
        block_on(tray.set_menu(None)).expect("menu");

        let calls = mock.calls();
        assert_eq!(calls[0].command, "plugin:tray|set_icon_as_template");
        assert_eq!(calls[0].args, json!({"rid": 3, "asTemplate": true}));
        assert_eq!(calls[1].args, json!({"rid": 3, "onLeft": true}));
        assert_eq!(calls[2].args, json!({"rid": 3, "path": "/tmp/tray"}));
        assert_eq!(calls[3].args, json!({"rid": 3, "menu": null}));
    }

    #[test]
    fn lookup_by_id_maps_missing_to_none() {
        let mock = Rc::new(MockTransport::with_handler(|command, args| {
            match (command, args["id"].as_str()) {
                ("plugin:tray|get_by_id", Some("main")) => Ok(json!(4)),
                _ => Ok(Value::Null),
            }
        }));
        let client = HostClient::from_rc(Rc::clone(&mock));

        let found = block_on(TrayIcon::get_by_id(&client, "main"))
            .expect("lookup")
            .expect("tray");
        assert_eq!(found.rid(), 4);
        assert!(block_on(TrayIcon::get_by_id(&client, "other"))
            .expect("lookup")
            .is_none());
        assert!(block_on(TrayIcon::remove_by_id(&client, "other"))
            .expect("remove")
            .is_none());
    }
}
