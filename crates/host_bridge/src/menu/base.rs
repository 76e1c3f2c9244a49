use std::{fmt, rc::Rc};

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::{
    client::HostClient,
    core::{Channel, Resource, ResourceId},
    error::{HostError, HostResult},
    image::ImageSource,
};

use super::{
    check::CheckMenuItemOptions, icon::IconMenuItemOptions, item::MenuItemOptions,
    predefined::PredefinedMenuItemOptions, submenu::SubmenuOptions, AnyMenuItem, CheckMenuItem,
    IconMenuItem, MenuItem, PredefinedMenuItem, Submenu,
};

/// Identifier of a menu item, as reported in click events.
pub type MenuId = String;

/// Concrete kind of a menu resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Plain text item.
    MenuItem,
    /// OS-provided item.
    Predefined,
    /// Item with a check mark.
    Check,
    /// Item with an icon.
    Icon,
    /// Nested menu.
    Submenu,
    /// Top-level menu.
    Menu,
}

/// Click handler attached to an item; receives the item id.
#[derive(Clone)]
pub struct MenuAction(Rc<dyn Fn(MenuId)>);

impl MenuAction {
    /// Wraps `action`.
    pub fn new(action: impl Fn(MenuId) + 'static) -> Self {
        Self(Rc::new(action))
    }

    pub(crate) fn call(&self, id: MenuId) {
        (self.0)(id)
    }
}

impl fmt::Debug for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MenuAction")
    }
}

impl<F: Fn(MenuId) + 'static> From<F> for MenuAction {
    fn from(action: F) -> Self {
        Self::new(action)
    }
}

/// Native macOS menu icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum NativeIcon {
    Add,
    Advanced,
    Bluetooth,
    Bookmarks,
    Caution,
    ColorPanel,
    ColumnView,
    Computer,
    EnterFullScreen,
    Everyone,
    ExitFullScreen,
    FlowView,
    Folder,
    FolderBurnable,
    FolderSmart,
    FollowLinkFreestanding,
    FontPanel,
    GoLeft,
    GoRight,
    Home,
    IChatTheater,
    IconView,
    Info,
    InvalidDataFreestanding,
    LeftFacingTriangle,
    ListView,
    LockLocked,
    LockUnlocked,
    MenuMixedState,
    MenuOnState,
    MobileMe,
    MultipleDocuments,
    Network,
    Path,
    PreferencesGeneral,
    QuickLook,
    RefreshFreestanding,
    Refresh,
    Remove,
    RevealFreestanding,
    RightFacingTriangle,
    Share,
    Slideshow,
    SmartBadge,
    StatusAvailable,
    StatusNone,
    StatusPartiallyAvailable,
    StatusUnavailable,
    StopProgressFreestanding,
    StopProgress,
    TrashEmpty,
    TrashFull,
    User,
    UserAccounts,
    UserGroup,
    UserGuest,
}

/// Icon of an icon item or submenu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MenuIcon {
    /// Platform icon.
    Native(NativeIcon),
    /// Image resource, path or bytes.
    Image(ImageSource),
}

impl From<NativeIcon> for MenuIcon {
    fn from(icon: NativeIcon) -> Self {
        Self::Native(icon)
    }
}

impl From<ImageSource> for MenuIcon {
    fn from(source: ImageSource) -> Self {
        Self::Image(source)
    }
}

/// Resource id, item id and kind shared by every menu handle.
#[derive(Debug, Clone)]
pub struct MenuItemBase {
    resource: Resource,
    id: MenuId,
    kind: ItemKind,
}

impl MenuItemBase {
    pub(crate) fn new(client: &HostClient, rid: ResourceId, id: MenuId, kind: ItemKind) -> Self {
        Self {
            resource: Resource::new(client, rid),
            id,
            kind,
        }
    }

    /// Host resource id.
    pub fn rid(&self) -> ResourceId {
        self.resource.rid()
    }

    /// Item id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Item kind.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub(crate) fn client(&self) -> &HostClient {
        self.resource.client()
    }

    /// Releases the host-side menu resource.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn close(&self) -> HostResult<()> {
        self.resource.close().await
    }

    /// Invokes `plugin:menu|<name>` with `{rid, kind}` plus the fields of `extra`.
    pub(crate) async fn call<T: serde::de::DeserializeOwned>(
        &self,
        name: &str,
        extra: Value,
    ) -> HostResult<T> {
        let mut args = Map::new();
        args.insert("rid".to_string(), json!(self.rid()));
        args.insert("kind".to_string(), json!(self.kind));
        if let Value::Object(extra) = extra {
            args.extend(extra);
        }
        self.client()
            .invoke(&format!("plugin:menu|{name}"), Value::Object(args))
            .await
    }
}

/// Implemented by every menu handle.
pub trait MenuItemHandle {
    /// Shared resource data.
    fn base(&self) -> &MenuItemBase;

    /// Host resource id.
    fn rid(&self) -> ResourceId {
        self.base().rid()
    }

    /// Item id.
    fn id(&self) -> &str {
        self.base().id()
    }

    /// Item kind.
    fn kind(&self) -> ItemKind {
        self.base().kind()
    }
}

/// Reference to an existing menu item, menu or submenu, sent as `[rid, kind]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuRef {
    rid: ResourceId,
    kind: ItemKind,
}

impl MenuRef {
    /// Host resource id.
    pub fn rid(&self) -> ResourceId {
        self.rid
    }

    /// Item kind.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }
}

impl<T: MenuItemHandle> From<&T> for MenuRef {
    fn from(item: &T) -> Self {
        Self {
            rid: item.rid(),
            kind: item.kind(),
        }
    }
}

impl Serialize for MenuRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.rid, self.kind).serialize(serializer)
    }
}

/// Item passed to a menu constructor or container operation: either an existing handle or
/// options for an item created inline.
#[derive(Debug, Clone)]
pub enum MenuEntry {
    /// Existing resource, sent as `[rid, kind]`.
    Existing {
        /// Resource id.
        rid: ResourceId,
        /// Item kind.
        kind: ItemKind,
    },
    /// Inline plain item.
    Item(MenuItemOptions),
    /// Inline check item.
    Check(CheckMenuItemOptions),
    /// Inline icon item.
    Icon(IconMenuItemOptions),
    /// Inline predefined item.
    Predefined(PredefinedMenuItemOptions),
    /// Inline submenu.
    Submenu(SubmenuOptions),
}

impl<T: MenuItemHandle> From<&T> for MenuEntry {
    fn from(item: &T) -> Self {
        Self::Existing {
            rid: item.rid(),
            kind: item.kind(),
        }
    }
}

impl From<MenuItemOptions> for MenuEntry {
    fn from(options: MenuItemOptions) -> Self {
        Self::Item(options)
    }
}

impl From<CheckMenuItemOptions> for MenuEntry {
    fn from(options: CheckMenuItemOptions) -> Self {
        Self::Check(options)
    }
}

impl From<IconMenuItemOptions> for MenuEntry {
    fn from(options: IconMenuItemOptions) -> Self {
        Self::Icon(options)
    }
}

impl From<PredefinedMenuItemOptions> for MenuEntry {
    fn from(options: PredefinedMenuItemOptions) -> Self {
        Self::Predefined(options)
    }
}

impl From<SubmenuOptions> for MenuEntry {
    fn from(options: SubmenuOptions) -> Self {
        Self::Submenu(options)
    }
}

impl MenuEntry {
    /// Wire shape; inline items with an action get their own channel.
    pub(crate) fn into_wire(self, client: &HostClient) -> HostResult<Value> {
        match self {
            Self::Existing { rid, kind } => Ok(json!([rid, kind])),
            Self::Item(options) => {
                let action = options.action.clone();
                with_action_channel(client, to_object(&options)?, action)
            }
            Self::Check(options) => {
                let action = options.action.clone();
                with_action_channel(client, to_object(&options)?, action)
            }
            Self::Icon(options) => {
                let action = options.action.clone();
                with_action_channel(client, to_object(&options)?, action)
            }
            Self::Predefined(options) => Ok(Value::Object(to_object(&options)?)),
            Self::Submenu(options) => {
                let mut object = to_object(&options)?;
                object.insert("items".to_string(), entries_to_wire(client, options.items)?);
                Ok(Value::Object(object))
            }
        }
    }
}

pub(crate) fn entries_to_wire(client: &HostClient, entries: Vec<MenuEntry>) -> HostResult<Value> {
    entries
        .into_iter()
        .map(|entry| entry.into_wire(client))
        .collect::<HostResult<Vec<_>>>()
        .map(Value::Array)
}

pub(crate) fn to_object(options: &impl Serialize) -> HostResult<Map<String, Value>> {
    match serde_json::to_value(options) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(HostError::encode(
            "plugin:menu|new",
            format!("menu options must serialize to an object, got {other}"),
        )),
        Err(err) => Err(HostError::encode("plugin:menu|new", err)),
    }
}

fn action_channel(client: &HostClient, action: Option<MenuAction>) -> Channel<MenuId> {
    match action {
        Some(action) => Channel::with_handler(client, move |id| action.call(id)),
        None => Channel::new(client),
    }
}

fn with_action_channel(
    client: &HostClient,
    mut object: Map<String, Value>,
    action: Option<MenuAction>,
) -> HostResult<Value> {
    if action.is_some() {
        let channel = action_channel(client, action);
        object.insert("handler".to_string(), json!(channel.to_ipc()));
    }
    Ok(Value::Object(object))
}

/// Creates a menu resource of `kind` and returns its base handle.
///
/// The top-level `handler` channel is always registered; it dispatches to `action` when given.
pub(crate) async fn new_menu(
    client: &HostClient,
    kind: ItemKind,
    options: Map<String, Value>,
    action: Option<MenuAction>,
) -> HostResult<MenuItemBase> {
    let handler = action_channel(client, action);
    let created: HostResult<(ResourceId, MenuId)> = client
        .invoke(
            "plugin:menu|new",
            json!({ "kind": kind, "options": Value::Object(options), "handler": handler }),
        )
        .await;
    match created {
        Ok((rid, id)) => Ok(MenuItemBase::new(client, rid, id, kind)),
        Err(err) => {
            handler.unregister();
            Err(err)
        }
    }
}

/// Maps a `[rid, id, kind]` triple to the matching concrete handle.
pub(crate) fn item_from_kind(
    client: &HostClient,
    (rid, id, kind): (ResourceId, MenuId, ItemKind),
) -> HostResult<AnyMenuItem> {
    let base = MenuItemBase::new(client, rid, id, kind);
    Ok(match kind {
        ItemKind::MenuItem => AnyMenuItem::MenuItem(MenuItem { base }),
        ItemKind::Check => AnyMenuItem::Check(CheckMenuItem { base }),
        ItemKind::Icon => AnyMenuItem::Icon(IconMenuItem { base }),
        ItemKind::Predefined => AnyMenuItem::Predefined(PredefinedMenuItem { base }),
        ItemKind::Submenu => AnyMenuItem::Submenu(Submenu { base }),
        ItemKind::Menu => {
            return Err(HostError::decode(
                "plugin:menu|items",
                "a menu cannot be nested as an item",
            ))
        }
    })
}

/// Container operations shared by [`super::Menu`] and [`Submenu`].
pub(crate) mod container {
    use serde_json::{json, Value};

    use super::{entries_to_wire, item_from_kind, MenuEntry, MenuId, MenuItemBase};
    use crate::{
        core::ResourceId,
        dpi::Position,
        error::HostResult,
        menu::{AnyMenuItem, ItemKind, MenuRef},
        window::Window,
    };

    type Triple = (ResourceId, MenuId, ItemKind);

    pub(crate) async fn append(base: &MenuItemBase, items: Vec<MenuEntry>) -> HostResult<()> {
        let items = entries_to_wire(base.client(), items)?;
        base.call("append", json!({ "items": items })).await
    }

    pub(crate) async fn prepend(base: &MenuItemBase, items: Vec<MenuEntry>) -> HostResult<()> {
        let items = entries_to_wire(base.client(), items)?;
        base.call("prepend", json!({ "items": items })).await
    }

    pub(crate) async fn insert(
        base: &MenuItemBase,
        items: Vec<MenuEntry>,
        position: usize,
    ) -> HostResult<()> {
        let items = entries_to_wire(base.client(), items)?;
        base.call("insert", json!({ "items": items, "position": position }))
            .await
    }

    pub(crate) async fn remove(base: &MenuItemBase, item: MenuRef) -> HostResult<()> {
        base.call("remove", json!({ "item": item })).await
    }

    pub(crate) async fn remove_at(
        base: &MenuItemBase,
        position: usize,
    ) -> HostResult<Option<AnyMenuItem>> {
        let removed: Option<Triple> = base
            .call("remove_at", json!({ "position": position }))
            .await?;
        removed
            .map(|triple| item_from_kind(base.client(), triple))
            .transpose()
    }

    pub(crate) async fn items(base: &MenuItemBase) -> HostResult<Vec<AnyMenuItem>> {
        let triples: Vec<Triple> = base.call("items", Value::Null).await?;
        triples
            .into_iter()
            .map(|triple| item_from_kind(base.client(), triple))
            .collect()
    }

    pub(crate) async fn get(base: &MenuItemBase, id: &str) -> HostResult<Option<AnyMenuItem>> {
        let found: Option<Triple> = base.call("get", json!({ "id": id })).await?;
        found
            .map(|triple| item_from_kind(base.client(), triple))
            .transpose()
    }

    pub(crate) async fn popup(
        base: &MenuItemBase,
        at: Option<Position>,
        window: Option<&Window>,
    ) -> HostResult<()> {
        if let Some(at) = &at {
            at.validate()?;
        }
        base.call(
            "popup",
            json!({ "window": window.map(Window::label), "at": at }),
        )
        .await
    }
}
