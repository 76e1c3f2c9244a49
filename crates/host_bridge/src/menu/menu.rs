use serde::Serialize;
use serde_json::json;

use super::base::{
    entries_to_wire, new_menu, to_object, ItemKind, MenuAction, MenuEntry, MenuId, MenuItemBase,
    MenuItemHandle,
};
use crate::{client::HostClient, core::ResourceId, error::HostResult, window::Window};

/// Options for [`Menu::new`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuOptions {
    /// Menu id; the host generates one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Initial items.
    #[serde(skip)]
    pub items: Vec<MenuEntry>,
    /// Receives the id of any clicked item created inline without its own action.
    #[serde(skip)]
    pub action: Option<MenuAction>,
}

/// Top-level menu: an application menu, window menu or context menu.
#[derive(Debug, Clone)]
pub struct Menu {
    pub(super) base: MenuItemBase,
}

impl Menu {
    /// Creates a menu together with its inline items.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn new(client: &HostClient, options: MenuOptions) -> HostResult<Self> {
        let mut object = to_object(&options)?;
        object.insert("items".to_string(), entries_to_wire(client, options.items)?);
        let base = new_menu(client, ItemKind::Menu, object, options.action).await?;
        Ok(Self { base })
    }

    /// Creates the platform's default application menu.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn default(client: &HostClient) -> HostResult<Self> {
        let (rid, id): (ResourceId, MenuId) =
            client.invoke("plugin:menu|create_default", ()).await?;
        Ok(Self::from_parts(client, rid, id))
    }

    fn from_parts(client: &HostClient, rid: ResourceId, id: MenuId) -> Self {
        Self {
            base: MenuItemBase::new(client, rid, id, ItemKind::Menu),
        }
    }

    /// Installs this menu as the application menu and returns the one it replaced.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_as_app_menu(&self) -> HostResult<Option<Menu>> {
        let client = self.base.client();
        let previous: Option<(ResourceId, MenuId)> = client
            .invoke("plugin:menu|set_as_app_menu", json!({ "rid": self.base.rid() }))
            .await?;
        Ok(previous.map(|(rid, id)| Self::from_parts(client, rid, id)))
    }

    /// Installs this menu on `window`, or the current window, and returns the one it replaced.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_as_window_menu(&self, window: Option<&Window>) -> HostResult<Option<Menu>> {
        let client = self.base.client();
        let previous: Option<(ResourceId, MenuId)> = client
            .invoke(
                "plugin:menu|set_as_window_menu",
                json!({ "rid": self.base.rid(), "window": window.map(Window::label) }),
            )
            .await?;
        Ok(previous.map(|(rid, id)| Self::from_parts(client, rid, id)))
    }
}

impl MenuItemHandle for Menu {
    fn base(&self) -> &MenuItemBase {
        &self.base
    }
}

container_ops!(Menu);
