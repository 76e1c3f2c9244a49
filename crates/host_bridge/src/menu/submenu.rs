use serde::Serialize;
use serde_json::json;

use super::base::{
    entries_to_wire, new_menu, to_object, ItemKind, MenuEntry, MenuIcon, MenuItemBase,
    MenuItemHandle,
};
use crate::{client::HostClient, error::HostResult};

/// Options for [`Submenu::new`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmenuOptions {
    /// Submenu id; the host generates one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Label.
    pub text: String,
    /// Whether the submenu starts enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Icon shown next to the label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<MenuIcon>,
    /// Initial items.
    #[serde(skip)]
    pub items: Vec<MenuEntry>,
}

/// Nested menu.
#[derive(Debug, Clone)]
pub struct Submenu {
    pub(super) base: MenuItemBase,
}

impl Submenu {
    /// Creates a submenu together with its inline items.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn new(client: &HostClient, options: SubmenuOptions) -> HostResult<Self> {
        let mut object = to_object(&options)?;
        object.insert("items".to_string(), entries_to_wire(client, options.items)?);
        let base = new_menu(client, ItemKind::Submenu, object, None).await?;
        Ok(Self { base })
    }

    /// Replaces or removes the icon.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_icon(&self, icon: Option<MenuIcon>) -> HostResult<()> {
        self.base.call("set_icon", json!({ "icon": icon })).await
    }

    /// Makes this the Window menu of the macOS application.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_as_windows_menu_for_nsapp(&self) -> HostResult<()> {
        self.base
            .client()
            .invoke(
                "plugin:menu|set_as_windows_menu_for_nsapp",
                json!({ "rid": self.base.rid() }),
            )
            .await
    }

    /// Makes this the Help menu of the macOS application.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_as_help_menu_for_nsapp(&self) -> HostResult<()> {
        self.base
            .client()
            .invoke(
                "plugin:menu|set_as_help_menu_for_nsapp",
                json!({ "rid": self.base.rid() }),
            )
            .await
    }
}

impl MenuItemHandle for Submenu {
    fn base(&self) -> &MenuItemBase {
        &self.base
    }
}

text_ops!(Submenu);
container_ops!(Submenu);
