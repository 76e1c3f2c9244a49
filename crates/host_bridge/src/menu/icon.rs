use serde::Serialize;
use serde_json::json;

use super::base::{
    new_menu, to_object, ItemKind, MenuAction, MenuIcon, MenuItemBase, MenuItemHandle,
};
use crate::{client::HostClient, error::HostResult};

/// Options for [`IconMenuItem::new`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IconMenuItemOptions {
    /// Item id; the host generates one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Label.
    pub text: String,
    /// Whether the item starts enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Keyboard shortcut.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator: Option<String>,
    /// Icon shown next to the label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<MenuIcon>,
    /// Click handler.
    #[serde(skip)]
    pub action: Option<MenuAction>,
}

/// Menu item with an icon.
#[derive(Debug, Clone)]
pub struct IconMenuItem {
    pub(super) base: MenuItemBase,
}

impl IconMenuItem {
    /// Creates an icon item.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn new(client: &HostClient, options: IconMenuItemOptions) -> HostResult<Self> {
        let action = options.action.clone();
        let base = new_menu(client, ItemKind::Icon, to_object(&options)?, action).await?;
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
}

impl MenuItemHandle for IconMenuItem {
    fn base(&self) -> &MenuItemBase {
        &self.base
    }
}

text_ops!(IconMenuItem);
accelerator_op!(IconMenuItem);
