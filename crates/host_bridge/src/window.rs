//! Window handles and the `plugin:window` command surface.
//!
//! A [`Window`] is only a label plus a client; every getter and setter is one
//! `plugin:window|<name>` invocation carrying `{label}` or `{label, value}`.

use std::{cell::RefCell, rc::Rc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    client::HostClient,
    dpi::{PhysicalPosition, PhysicalSize, Position, Size},
    error::{HostError, HostResult},
    event::{self, Event, EventListener, EventTarget, ListenOptions, TauriEvent},
    image::ImageSource,
};

/// Kind of attention request shown to the user, sent as `{"type": "<kind>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UserAttentionType {
    /// Platform-specific critical attention (bouncing dock icon, flashing taskbar until focus).
    Critical,
    /// Platform-specific informational attention (single bounce, brief flash).
    Informational,
}

/// Window theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    Light,
    /// Dark theme.
    Dark,
}

/// macOS title bar style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleBarStyle {
    /// Regular title bar.
    Visible,
    /// Transparent title bar over the content.
    Transparent,
    /// Title bar hidden, traffic lights kept.
    Overlay,
}

/// Cursor shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum CursorIcon {
    Default,
    Crosshair,
    Hand,
    Arrow,
    Move,
    Text,
    Wait,
    Help,
    Progress,
    NotAllowed,
    ContextMenu,
    Cell,
    VerticalText,
    Alias,
    Copy,
    NoDrop,
    Grab,
    Grabbing,
    AllScroll,
    ZoomIn,
    ZoomOut,
    EResize,
    NResize,
    NeResize,
    NwResize,
    SResize,
    SeResize,
    SwResize,
    WResize,
    EwResize,
    NsResize,
    NeswResize,
    NwseResize,
    ColResize,
    RowResize,
}

/// Edge or corner a resize drag starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ResizeDirection {
    East,
    North,
    NorthEast,
    NorthWest,
    South,
    SouthEast,
    SouthWest,
    West,
}

/// Taskbar progress indicator status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressBarStatus {
    /// Hide the indicator.
    None,
    /// Normal progress.
    Normal,
    /// Indeterminate progress.
    Indeterminate,
    /// Paused progress.
    Paused,
    /// Errored progress.
    Error,
}

/// Taskbar progress indicator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressBarState {
    /// Indicator status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProgressBarStatus>,
    /// Progress in percent, `0..=100`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u64>,
}

/// Platform window background effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum Effect {
    AppearanceBased,
    Light,
    Dark,
    MediumLight,
    UltraDark,
    Titlebar,
    Selection,
    Menu,
    Popover,
    Sidebar,
    HeaderView,
    Sheet,
    WindowBackground,
    HudWindow,
    #[serde(rename = "fullScreenUI")]
    FullScreenUi,
    Tooltip,
    ContentBackground,
    UnderWindowBackground,
    UnderPageBackground,
    Mica,
    Blur,
    Acrylic,
    Tabbed,
    TabbedDark,
    TabbedLight,
}

/// When window effects are drawn as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectState {
    /// Follow the window's active state.
    FollowsWindowActiveState,
    /// Always active.
    Active,
    /// Always inactive.
    Inactive,
}

/// RGBA color, serialized as `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

/// Window effects configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effects {
    /// Effects to apply.
    pub effects: Vec<Effect>,
    /// Effect state (macOS).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<EffectState>,
    /// Corner radius (macOS).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Tint color (Windows).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// Logical min/max bounds applied together.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSizeConstraints {
    /// Minimum width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    /// Minimum height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,
    /// Maximum width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    /// Maximum height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f64>,
}

/// Usable area of a monitor excluding taskbars and docks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkArea {
    /// Top-left corner.
    pub position: PhysicalPosition,
    /// Extent.
    pub size: PhysicalSize,
}

/// Monitor description reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    /// Human-readable name, when known.
    pub name: Option<String>,
    /// Resolution.
    pub size: PhysicalSize,
    /// Top-left corner on the virtual desktop.
    pub position: PhysicalPosition,
    /// Usable area.
    pub work_area: WorkArea,
    /// Scale factor mapping logical to physical pixels.
    pub scale_factor: f64,
}

/// Payload of [`TauriEvent::WindowScaleFactorChanged`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleFactorChanged {
    /// New scale factor.
    pub scale_factor: f64,
    /// New inner size.
    pub size: PhysicalSize,
}

/// File drag and drop over a window.
#[derive(Debug, Clone, PartialEq)]
pub enum DragDropEvent {
    /// A drag carrying `paths` entered.
    Enter {
        /// Dragged paths.
        paths: Vec<String>,
        /// Cursor position.
        position: PhysicalPosition,
    },
    /// The drag moved.
    Over {
        /// Cursor position.
        position: PhysicalPosition,
    },
    /// `paths` were dropped.
    Drop {
        /// Dropped paths.
        paths: Vec<String>,
        /// Cursor position.
        position: PhysicalPosition,
    },
    /// The drag left or was cancelled.
    Leave,
}

#[derive(Debug, Deserialize)]
struct DragPayload {
    #[serde(default)]
    paths: Vec<String>,
    position: PhysicalPosition,
}

/// Close request delivered to [`Window::on_close_requested`] handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseRequestedEvent {
    /// Event name.
    pub event: String,
    /// Listener id.
    pub id: event::EventId,
    prevented: bool,
}

impl CloseRequestedEvent {
    /// Keeps the window open.
    pub fn prevent_default(&mut self) {
        self.prevented = true;
    }

    /// Returns whether [`Self::prevent_default`] was called.
    pub fn is_prevented(&self) -> bool {
        self.prevented
    }
}

/// Options for [`Window::create`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct WindowOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resizable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullscreen: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximized: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decorations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_on_top: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_on_bottom: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_protected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_taskbar: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_bar_style: Option<TitleBarStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_title: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabbing_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximizable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimizable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closable: Option<bool>,
    /// Label of the parent window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_on_all_workspaces: Option<bool>,
}

fn command(name: &str) -> String {
    format!("plugin:window|{name}")
}

/// Handle to a host window addressed by label.
#[derive(Debug, Clone)]
pub struct Window {
    label: String,
    client: HostClient,
}

impl Window {
    /// Handle for an existing window. No host call is made.
    pub fn from_label(client: &HostClient, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            client: client.clone(),
        }
    }

    /// Window hosting the current document.
    pub fn current(client: &HostClient) -> Self {
        Self::from_label(client, client.metadata().current_window.label)
    }

    /// Every window the host knows about.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn all(client: &HostClient) -> HostResult<Vec<Self>> {
        let labels: Vec<String> = client
            .invoke(&command("get_all_windows"), ())
            .await?;
        Ok(labels
            .into_iter()
            .map(|label| Self::from_label(client, label))
            .collect())
    }

    /// Window with `label`, if it exists.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn get_by_label(client: &HostClient, label: &str) -> HostResult<Option<Self>> {
        Ok(Self::all(client)
            .await?
            .into_iter()
            .find(|window| window.label == label))
    }

    /// First window reporting focus, if any.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn focused(client: &HostClient) -> HostResult<Option<Self>> {
        for window in Self::all(client).await? {
            if window.is_focused().await? {
                return Ok(Some(window));
            }
        }
        Ok(None)
    }

    /// Asks the host to create a window labelled `label`.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn create(
        client: &HostClient,
        label: &str,
        options: WindowOptions,
    ) -> HostResult<Self> {
        let mut options = serde_json::to_value(options)
            .map_err(|e| HostError::encode("plugin:window|create", e))?;
        if let Value::Object(map) = &mut options {
            map.insert("label".to_string(), json!(label));
        }
        client
            .invoke::<()>(&command("create"), json!({ "options": options }))
            .await?;
        Ok(Self::from_label(client, label))
    }

    /// Window label.
    pub fn label(&self) -> &str {
        &self.label
    }

    async fn get<T: DeserializeOwned>(&self, name: &str) -> HostResult<T> {
        self.client
            .invoke(&command(name), json!({ "label": self.label }))
            .await
    }

    async fn set(&self, name: &str, value: impl Serialize) -> HostResult<()> {
        let value = serde_json::to_value(value).map_err(|e| HostError::encode(name, e))?;
        self.client
            .invoke(
                &command(name),
                json!({ "label": self.label, "value": value }),
            )
            .await
    }

    /// Scale factor mapping logical to physical pixels.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn scale_factor(&self) -> HostResult<f64> {
        self.get("scale_factor").await
    }

    /// Position of the client area's top-left corner.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn inner_position(&self) -> HostResult<PhysicalPosition> {
        self.get("inner_position").await
    }

    /// Position of the window's top-left corner.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn outer_position(&self) -> HostResult<PhysicalPosition> {
        self.get("outer_position").await
    }

    /// Size of the client area.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn inner_size(&self) -> HostResult<PhysicalSize> {
        self.get("inner_size").await
    }

    /// Size of the whole window including decorations.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn outer_size(&self) -> HostResult<PhysicalSize> {
        self.get("outer_size").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn is_fullscreen(&self) -> HostResult<bool> {
        self.get("is_fullscreen").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn is_minimized(&self) -> HostResult<bool> {
        self.get("is_minimized").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn is_maximized(&self) -> HostResult<bool> {
        self.get("is_maximized").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn is_focused(&self) -> HostResult<bool> {
        self.get("is_focused").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn is_decorated(&self) -> HostResult<bool> {
        self.get("is_decorated").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn is_resizable(&self) -> HostResult<bool> {
        self.get("is_resizable").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn is_maximizable(&self) -> HostResult<bool> {
        self.get("is_maximizable").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn is_minimizable(&self) -> HostResult<bool> {
        self.get("is_minimizable").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn is_closable(&self) -> HostResult<bool> {
        self.get("is_closable").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn is_visible(&self) -> HostResult<bool> {
        self.get("is_visible").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn is_enabled(&self) -> HostResult<bool> {
        self.get("is_enabled").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn is_always_on_top(&self) -> HostResult<bool> {
        self.get("is_always_on_top").await
    }

    /// Window title.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn title(&self) -> HostResult<String> {
        self.get("title").await
    }

    /// Current theme, `None` when the platform does not report one.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection or a decode failure.
    pub async fn theme(&self) -> HostResult<Option<Theme>> {
        self.get("theme").await
    }

    /// Centers the window on its monitor.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn center(&self) -> HostResult<()> {
        self.get("center").await
    }

    /// Requests user attention; `None` cancels a pending request.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn request_user_attention(
        &self,
        request: Option<UserAttentionType>,
    ) -> HostResult<()> {
        self.set("request_user_attention", request).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_resizable(&self, resizable: bool) -> HostResult<()> {
        self.set("set_resizable", resizable).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_enabled(&self, enabled: bool) -> HostResult<()> {
        self.set("set_enabled", enabled).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_maximizable(&self, maximizable: bool) -> HostResult<()> {
        self.set("set_maximizable", maximizable).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_minimizable(&self, minimizable: bool) -> HostResult<()> {
        self.set("set_minimizable", minimizable).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_closable(&self, closable: bool) -> HostResult<()> {
        self.set("set_closable", closable).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_title(&self, title: &str) -> HostResult<()> {
        self.set("set_title", title).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn maximize(&self) -> HostResult<()> {
        self.get("maximize").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn unmaximize(&self) -> HostResult<()> {
        self.get("unmaximize").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn toggle_maximize(&self) -> HostResult<()> {
        self.get("toggle_maximize").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn minimize(&self) -> HostResult<()> {
        self.get("minimize").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn unminimize(&self) -> HostResult<()> {
        self.get("unminimize").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn show(&self) -> HostResult<()> {
        self.get("show").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn hide(&self) -> HostResult<()> {
        self.get("hide").await
    }

    /// Requests a close; close-requested listeners may veto it.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn close(&self) -> HostResult<()> {
        self.get("close").await
    }

    /// Destroys the window without emitting a close request.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn destroy(&self) -> HostResult<()> {
        self.get("destroy").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_decorations(&self, decorations: bool) -> HostResult<()> {
        self.set("set_decorations", decorations).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_shadow(&self, enable: bool) -> HostResult<()> {
        self.set("set_shadow", enable).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_effects(&self, effects: &Effects) -> HostResult<()> {
        self.set("set_effects", effects).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn clear_effects(&self) -> HostResult<()> {
        self.set("set_effects", Value::Null).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_always_on_top(&self, always_on_top: bool) -> HostResult<()> {
        self.set("set_always_on_top", always_on_top).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_always_on_bottom(&self, always_on_bottom: bool) -> HostResult<()> {
        self.set("set_always_on_bottom", always_on_bottom).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_content_protected(&self, protected: bool) -> HostResult<()> {
        self.set("set_content_protected", protected).await
    }

    /// Resizes the client area.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidArgument`] without calling the host when `size` is malformed.
    pub async fn set_size(&self, size: impl Into<Size>) -> HostResult<()> {
        let size = size.into();
        size.validate()?;
        self.set("set_size", size).await
    }

    /// Sets or clears the minimum client size.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidArgument`] without calling the host when `size` is malformed.
    pub async fn set_min_size(&self, size: Option<Size>) -> HostResult<()> {
        if let Some(size) = &size {
            size.validate()?;
        }
        self.set("set_min_size", size).await
    }

    /// Sets or clears the maximum client size.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidArgument`] without calling the host when `size` is malformed.
    pub async fn set_max_size(&self, size: Option<Size>) -> HostResult<()> {
        if let Some(size) = &size {
            size.validate()?;
        }
        self.set("set_max_size", size).await
    }

    /// Applies min/max bounds in one call.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidArgument`] for non-finite or negative bounds.
    pub async fn set_size_constraints(
        &self,
        constraints: WindowSizeConstraints,
    ) -> HostResult<()> {
        let bounds = [
            constraints.min_width,
            constraints.min_height,
            constraints.max_width,
            constraints.max_height,
        ];
        if bounds
            .into_iter()
            .flatten()
            .any(|value| !value.is_finite() || value < 0.0)
        {
            return Err(HostError::InvalidArgument(
                "size constraints must be finite, non-negative numbers".to_string(),
            ));
        }
        self.set("set_size_constraints", constraints).await
    }

    /// Moves the window.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidArgument`] without calling the host when `position` is
    /// malformed.
    pub async fn set_position(&self, position: impl Into<Position>) -> HostResult<()> {
        let position = position.into();
        position.validate()?;
        self.set("set_position", position).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_fullscreen(&self, fullscreen: bool) -> HostResult<()> {
        self.set("set_fullscreen", fullscreen).await
    }

    /// Brings the window to the front and focuses it.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_focus(&self) -> HostResult<()> {
        self.get("set_focus").await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_icon(&self, icon: impl Into<ImageSource>) -> HostResult<()> {
        self.set("set_icon", icon.into()).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_skip_taskbar(&self, skip: bool) -> HostResult<()> {
        self.set("set_skip_taskbar", skip).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_cursor_grab(&self, grab: bool) -> HostResult<()> {
        self.set("set_cursor_grab", grab).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_cursor_visible(&self, visible: bool) -> HostResult<()> {
        self.set("set_cursor_visible", visible).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_cursor_icon(&self, icon: CursorIcon) -> HostResult<()> {
        self.set("set_cursor_icon", icon).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_background_color(&self, color: Option<Color>) -> HostResult<()> {
        self.set("set_background_color", color).await
    }

    /// Moves the cursor inside the window.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidArgument`] without calling the host when `position` is
    /// malformed.
    pub async fn set_cursor_position(&self, position: impl Into<Position>) -> HostResult<()> {
        let position = position.into();
        position.validate()?;
        self.set("set_cursor_position", position).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_ignore_cursor_events(&self, ignore: bool) -> HostResult<()> {
        self.set("set_ignore_cursor_events", ignore).await
    }

    /// Starts moving the window with the pointer.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn start_dragging(&self) -> HostResult<()> {
        self.get("start_dragging").await
    }

    /// Starts resizing the window from `direction` with the pointer.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn start_resize_dragging(&self, direction: ResizeDirection) -> HostResult<()> {
        self.set("start_resize_dragging", direction).await
    }

    /// Sets or clears the dock/taskbar badge count.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_badge_count(&self, count: Option<u64>) -> HostResult<()> {
        self.set("set_badge_count", count).await
    }

    /// Sets or clears the dock badge label (macOS).
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_badge_label(&self, label: Option<&str>) -> HostResult<()> {
        self.set("set_badge_label", label).await
    }

    /// Sets or clears the taskbar overlay icon (Windows).
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_overlay_icon(&self, icon: Option<ImageSource>) -> HostResult<()> {
        self.set("set_overlay_icon", icon).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_progress_bar(&self, state: ProgressBarState) -> HostResult<()> {
        self.set("set_progress_bar", state).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_visible_on_all_workspaces(&self, visible: bool) -> HostResult<()> {
        self.set("set_visible_on_all_workspaces", visible).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_title_bar_style(&self, style: TitleBarStyle) -> HostResult<()> {
        self.set("set_title_bar_style", style).await
    }

    /// Forces a theme; `None` follows the system.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_theme(&self, theme: Option<Theme>) -> HostResult<()> {
        self.set("set_theme", theme).await
    }

    fn target(&self) -> ListenOptions {
        ListenOptions::target(EventTarget::Window {
            label: self.label.clone(),
        })
    }

    /// Listens to `event` emitted to this window.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn listen<T: DeserializeOwned + 'static>(
        &self,
        event: &str,
        handler: impl FnMut(Event<T>) + 'static,
    ) -> HostResult<EventListener> {
        event::listen(&self.client, event, handler, self.target()).await
    }

    /// Listens to the next `event` emitted to this window.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn once<T: DeserializeOwned + 'static>(
        &self,
        event: &str,
        handler: impl FnOnce(Event<T>) + 'static,
    ) -> HostResult<EventListener> {
        event::once(&self.client, event, handler, self.target()).await
    }

    /// Emits `event` to every target.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn emit(&self, event: &str, payload: impl Serialize) -> HostResult<()> {
        event::emit(&self.client, event, payload).await
    }

    /// Emits `event` to `target`.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn emit_to(
        &self,
        target: impl Into<EventTarget>,
        event: &str,
        payload: impl Serialize,
    ) -> HostResult<()> {
        event::emit_to(&self.client, target, event, payload).await
    }

    /// Calls `handler` with the new inner size after every resize.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn on_resized(
        &self,
        handler: impl FnMut(Event<PhysicalSize>) + 'static,
    ) -> HostResult<EventListener> {
        self.listen(TauriEvent::WindowResized.as_str(), handler).await
    }

    /// Calls `handler` with the new outer position after every move.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn on_moved(
        &self,
        handler: impl FnMut(Event<PhysicalPosition>) + 'static,
    ) -> HostResult<EventListener> {
        self.listen(TauriEvent::WindowMoved.as_str(), handler).await
    }

    /// Calls `handler` on close requests, then destroys the window unless the handler called
    /// [`CloseRequestedEvent::prevent_default`].
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn on_close_requested(
        &self,
        mut handler: impl FnMut(&mut CloseRequestedEvent) + 'static,
    ) -> HostResult<EventListener> {
        let weak_client = self.client.downgrade();
        let label = self.label.clone();
        self.listen(
            TauriEvent::WindowCloseRequested.as_str(),
            move |event: Event<Value>| {
                let mut request = CloseRequestedEvent {
                    event: event.event,
                    id: event.id,
                    prevented: false,
                };
                handler(&mut request);
                if request.is_prevented() {
                    return;
                }
                let Some(client) = weak_client.upgrade() else {
                    return;
                };
                let window = Window::from_label(&client, label.clone());
                client.spawn_local(async move {
                    if let Err(err) = window.destroy().await {
                        log::warn!("destroy {} after close request failed: {err}", window.label);
                    }
                });
            },
        )
        .await
    }

    /// Calls `handler(true)` on focus and `handler(false)` on blur.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection; a half-registered pair is rolled back.
    pub async fn on_focus_changed(
        &self,
        handler: impl FnMut(bool) + 'static,
    ) -> HostResult<EventListener> {
        let handler = Rc::new(RefCell::new(handler));
        let on_focus = Rc::clone(&handler);
        let focus = self
            .listen(TauriEvent::WindowFocus.as_str(), move |_: Event<Value>| {
                (*on_focus.borrow_mut())(true)
            })
            .await?;
        let on_blur = Rc::clone(&handler);
        let blur = self
            .listen(TauriEvent::WindowBlur.as_str(), move |_: Event<Value>| {
                (*on_blur.borrow_mut())(false)
            })
            .await;
        match blur {
            Ok(blur) => Ok(focus.merge(blur)),
            Err(err) => {
                if let Err(cleanup) = focus.unlisten().await {
                    log::warn!("focus listener rollback failed: {cleanup}");
                }
                Err(err)
            }
        }
    }

    /// Calls `handler` when the window moves to a monitor with a different scale factor.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn on_scale_changed(
        &self,
        handler: impl FnMut(Event<ScaleFactorChanged>) + 'static,
    ) -> HostResult<EventListener> {
        self.listen(TauriEvent::WindowScaleFactorChanged.as_str(), handler)
            .await
    }

    /// Calls `handler` when the system theme changes.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn on_theme_changed(
        &self,
        handler: impl FnMut(Event<Theme>) + 'static,
    ) -> HostResult<EventListener> {
        self.listen(TauriEvent::WindowThemeChanged.as_str(), handler)
            .await
    }

    /// Calls `handler` for every stage of a file drag over the window.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection; partial registrations are rolled back.
    pub async fn on_drag_drop_event(
        &self,
        handler: impl FnMut(DragDropEvent) + 'static,
    ) -> HostResult<EventListener> {
        let handler = Rc::new(RefCell::new(handler));
        let stages: [(TauriEvent, fn(DragPayload) -> DragDropEvent); 3] = [
            (TauriEvent::DragEnter, |p| DragDropEvent::Enter {
                paths: p.paths,
                position: p.position,
            }),
            (TauriEvent::DragOver, |p| DragDropEvent::Over {
                position: p.position,
            }),
            (TauriEvent::DragDrop, |p| DragDropEvent::Drop {
                paths: p.paths,
                position: p.position,
            }),
        ];

        let mut combined: Option<EventListener> = None;
        for (event, map) in stages {
            let sink = Rc::clone(&handler);
            let registered = self
                .listen(event.as_str(), move |e: Event<DragPayload>| {
                    (*sink.borrow_mut())(map(e.payload))
                })
                .await;
            combined = Some(combine(combined, registered).await?);
        }
        let sink = Rc::clone(&handler);
        let leave = self
            .listen(TauriEvent::DragLeave.as_str(), move |_: Event<Value>| {
                (*sink.borrow_mut())(DragDropEvent::Leave)
            })
            .await;
        combine(combined, leave).await
    }
}

async fn combine(
    acc: Option<EventListener>,
    next: HostResult<EventListener>,
) -> HostResult<EventListener> {
    match (acc, next) {
        (None, next) => next,
        (Some(acc), Ok(next)) => Ok(acc.merge(next)),
        (Some(acc), Err(err)) => {
            if let Err(cleanup) = acc.unlisten().await {
                log::warn!("listener rollback failed: {cleanup}");
            }
            Err(err)
        }
    }
}

/// Monitor the current window is on.
///
/// # Errors
///
/// Propagates the host rejection or a decode failure.
pub async fn current_monitor(client: &HostClient) -> HostResult<Option<Monitor>> {
    client.invoke(&command("current_monitor"), ()).await
}

/// Primary monitor.
///
/// # Errors
///
/// Propagates the host rejection or a decode failure.
pub async fn primary_monitor(client: &HostClient) -> HostResult<Option<Monitor>> {
    client.invoke(&command("primary_monitor"), ()).await
}

/// Monitor containing the physical point `(x, y)`.
///
/// # Errors
///
/// Propagates the host rejection or a decode failure.
pub async fn monitor_from_point(
    client: &HostClient,
    x: f64,
    y: f64,
) -> HostResult<Option<Monitor>> {
    client
        .invoke(&command("monitor_from_point"), json!({ "x": x, "y": y }))
        .await
}

/// Every connected monitor.
///
/// # Errors
///
/// Propagates the host rejection or a decode failure.
pub async fn available_monitors(client: &HostClient) -> HostResult<Vec<Monitor>> {
    client.invoke(&command("available_monitors"), ()).await
}

/// Cursor position on the virtual desktop.
///
/// # Errors
///
/// Propagates the host rejection or a decode failure.
pub async fn cursor_position(client: &HostClient) -> HostResult<PhysicalPosition> {
    client.invoke(&command("cursor_position"), ()).await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        dpi::{LogicalPosition, LogicalSize},
        mocks::MockTransport,
    };

    fn window_with(
        handler: impl FnMut(&str, &Value) -> Result<Value, Value> + 'static,
    ) -> (Rc<MockTransport>, Window) {
        let mock = Rc::new(MockTransport::with_handler(handler));
        let client = HostClient::from_rc(Rc::clone(&mock));
        (mock, Window::from_label(&client, "main"))
    }

    #[test]
    fn getters_send_label_only() {
        let (mock, window) = window_with(|_, _| Ok(json!({"width": 1280, "height": 720})));

        let size = block_on(window.inner_size()).expect("inner size");

        assert_eq!(size, PhysicalSize::new(1280.0, 720.0));
        assert_eq!(mock.calls().len(), 1);
        assert_eq!(mock.calls()[0].command, "plugin:window|inner_size");
        assert_eq!(mock.calls()[0].args, json!({"label": "main"}));
    }

    #[test]
    fn setters_send_label_and_value() {
        let (mock, window) = window_with(|_, _| Ok(Value::Null));

        block_on(window.set_title("Notes")).expect("title");
        block_on(window.set_size(LogicalSize::new(400.0, 300.0))).expect("size");
        block_on(window.request_user_attention(Some(UserAttentionType::Critical)))
            .expect("attention");
        block_on(window.set_progress_bar(ProgressBarState {
            status: Some(ProgressBarStatus::Paused),
            progress: Some(40),
        }))
        .expect("progress");
        block_on(window.clear_effects()).expect("clear effects");

        let calls = mock.calls();
        assert_eq!(calls[0].args, json!({"label": "main", "value": "Notes"}));
        assert_eq!(calls[1].command, "plugin:window|set_size");
        assert_eq!(
            calls[1].args,
            json!({"label": "main", "value": {"Logical": {"width": 400.0, "height": 300.0}}})
        );
        assert_eq!(
            calls[2].args,
            json!({"label": "main", "value": {"type": "Critical"}})
        );
        assert_eq!(
            calls[3].args,
            json!({"label": "main", "value": {"status": "paused", "progress": 40}})
        );
        assert_eq!(calls[4].command, "plugin:window|set_effects");
        assert_eq!(calls[4].args, json!({"label": "main", "value": null}));
    }

    #[test]
    fn malformed_geometry_fails_before_host_call() {
        let (mock, window) = window_with(|_, _| Ok(Value::Null));

        let err = block_on(window.set_position(LogicalPosition::new(f64::NAN, 1.0)))
            .expect_err("nan position");
        assert!(matches!(err, HostError::InvalidArgument(_)));
        let err = block_on(window.set_min_size(Some(Size::Physical(PhysicalSize::new(
            -10.0, 10.0,
        )))))
        .expect_err("negative size");
        assert!(matches!(err, HostError::InvalidArgument(_)));
        let err = block_on(window.set_size_constraints(WindowSizeConstraints {
            max_width: Some(f64::INFINITY),
            ..WindowSizeConstraints::default()
        }))
        .expect_err("infinite bound");
        assert!(matches!(err, HostError::InvalidArgument(_)));

        assert!(mock.calls().is_empty());
    }

    #[test]
    fn enum_values_match_wire_strings() {
        assert_eq!(
            serde_json::to_value(CursorIcon::NotAllowed).expect("cursor"),
            json!("notAllowed")
        );
        assert_eq!(
            serde_json::to_value(CursorIcon::NwseResize).expect("cursor"),
            json!("nwseResize")
        );
        assert_eq!(
            serde_json::to_value(Effect::FullScreenUi).expect("effect"),
            json!("fullScreenUI")
        );
        assert_eq!(
            serde_json::to_value(EffectState::FollowsWindowActiveState).expect("state"),
            json!("followsWindowActiveState")
        );
        assert_eq!(
            serde_json::to_value(ResizeDirection::NorthEast).expect("direction"),
            json!("NorthEast")
        );
        assert_eq!(
            serde_json::to_value(Color(1, 2, 3, 255)).expect("color"),
            json!([1, 2, 3, 255])
        );
    }

    #[test]
    fn current_window_comes_from_metadata() {
        let mock = Rc::new(MockTransport::new());
        mock.mock_windows("settings", &[]);
        let client = HostClient::from_rc(Rc::clone(&mock));

        assert_eq!(Window::current(&client).label(), "settings");
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn lookup_helpers_use_window_list() {
        let mock = Rc::new(MockTransport::with_handler(|command, args| {
            match (command, args["label"].as_str()) {
                ("plugin:window|is_focused", Some(label)) => Ok(json!(label == "about")),
                _ => Ok(Value::Null),
            }
        }));
        mock.mock_windows("main", &["about"]);
        let client = HostClient::from_rc(Rc::clone(&mock));

        let labels: Vec<String> = block_on(Window::all(&client))
            .expect("all")
            .iter()
            .map(|w| w.label().to_string())
            .collect();
        assert_eq!(labels, vec!["main".to_string(), "about".to_string()]);
        assert!(block_on(Window::get_by_label(&client, "missing"))
            .expect("lookup")
            .is_none());
        let focused = block_on(Window::focused(&client)).expect("focused");
        assert_eq!(focused.map(|w| w.label().to_string()), Some("about".to_string()));
    }

    #[test]
    fn create_merges_label_into_options() {
        let mock = Rc::new(MockTransport::new());
        let client = HostClient::from_rc(Rc::clone(&mock));

        let window = block_on(Window::create(
            &client,
            "editor",
            WindowOptions {
                title: Some("Editor".to_string()),
                always_on_top: Some(true),
                ..WindowOptions::default()
            },
        ))
        .expect("create");

        assert_eq!(window.label(), "editor");
        assert_eq!(mock.calls()[0].command, "plugin:window|create");
        assert_eq!(
            mock.calls()[0].args,
            json!({"options": {"title": "Editor", "alwaysOnTop": true, "label": "editor"}})
        );
    }

    #[test]
    fn monitors_are_reshaped_into_typed_values() {
        let mock = Rc::new(MockTransport::with_handler(|_, _| {
            Ok(json!([{
                "name": "DELL U2720Q",
                "size": {"width": 3840, "height": 2160},
                "position": {"x": 0, "y": 0},
                "workArea": {
                    "position": {"x": 0, "y": 25},
                    "size": {"width": 3840, "height": 2135}
                },
                "scaleFactor": 2.0
            }]))
        }));
        let client = HostClient::from_rc(Rc::clone(&mock));

        let monitors = block_on(available_monitors(&client)).expect("monitors");

        assert_eq!(mock.calls()[0].command, "plugin:window|available_monitors");
        assert_eq!(monitors.len(), 1);
        assert_eq!(monitors[0].scale_factor, 2.0);
        assert_eq!(monitors[0].work_area.position, PhysicalPosition::new(0.0, 25.0));
        assert_eq!(
            monitors[0].size.to_logical(monitors[0].scale_factor),
            LogicalSize::new(1920.0, 1080.0)
        );
    }

    #[test]
    fn resize_events_are_scoped_to_window_and_typed() {
        let mock = Rc::new(MockTransport::new().with_event_emulation());
        let client = HostClient::from_rc(Rc::clone(&mock));
        let window = Window::from_label(&client, "main");
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&sizes);

        block_on(window.on_resized(move |e| sink.borrow_mut().push(e.payload))).expect("listen");
        mock.emit_event("tauri://resize", json!({"width": 640, "height": 480}));

        assert_eq!(
            mock.calls()[0].args["target"],
            json!({"kind": "Window", "label": "main"})
        );
        assert_eq!(*sizes.borrow(), vec![PhysicalSize::new(640.0, 480.0)]);
    }

    #[test]
    fn close_request_destroys_unless_prevented() {
        let mock = Rc::new(MockTransport::new().with_event_emulation());
        let client = HostClient::from_rc(Rc::clone(&mock));
        let window = Window::from_label(&client, "main");
        let veto = Rc::new(RefCell::new(true));
        let flag = Rc::clone(&veto);

        block_on(window.on_close_requested(move |request| {
            if *flag.borrow() {
                request.prevent_default();
            }
        }))
        .expect("listen");

        mock.emit_event("tauri://close-requested", Value::Null);
        assert_eq!(mock.pending_tasks(), 0);

        *veto.borrow_mut() = false;
        mock.emit_event("tauri://close-requested", Value::Null);
        block_on(mock.run_pending_tasks());

        let last = mock.calls().pop().expect("destroy call");
        assert_eq!(last.command, "plugin:window|destroy");
        assert_eq!(last.args, json!({"label": "main"}));
    }

    #[test]
    fn focus_changes_map_to_booleans_and_unlisten_together() {
        let mock = Rc::new(MockTransport::new().with_event_emulation());
        let client = HostClient::from_rc(Rc::clone(&mock));
        let window = Window::from_label(&client, "main");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let listener =
            block_on(window.on_focus_changed(move |focused| sink.borrow_mut().push(focused)))
                .expect("listen");
        assert_eq!(listener.event_ids().len(), 2);

        mock.emit_event("tauri://focus", Value::Null);
        mock.emit_event("tauri://blur", Value::Null);
        block_on(listener.unlisten()).expect("unlisten");
        mock.emit_event("tauri://focus", Value::Null);

        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn drag_drop_stages_are_reshaped() {
        let mock = Rc::new(MockTransport::new().with_event_emulation());
        let client = HostClient::from_rc(Rc::clone(&mock));
        let window = Window::from_label(&client, "main");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        block_on(window.on_drag_drop_event(move |event| sink.borrow_mut().push(event)))
            .expect("listen");
        mock.emit_event(
            "tauri://drag-enter",
            json!({"paths": ["/tmp/a.txt"], "position": {"x": 1, "y": 2}}),
        );
        mock.emit_event("tauri://drag-over", json!({"position": {"x": 3, "y": 4}}));
        mock.emit_event("tauri://drag-leave", Value::Null);

        assert_eq!(
            *seen.borrow(),
            vec![
                DragDropEvent::Enter {
                    paths: vec!["/tmp/a.txt".to_string()],
                    position: PhysicalPosition::new(1.0, 2.0),
                },
                DragDropEvent::Over {
                    position: PhysicalPosition::new(3.0, 4.0),
                },
                DragDropEvent::Leave,
            ]
        );
    }
}
