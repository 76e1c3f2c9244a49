use serde::Serialize;
use serde_json::{json, Value};

use super::base::{new_menu, to_object, ItemKind, MenuAction, MenuItemBase, MenuItemHandle};
use crate::{client::HostClient, error::HostResult};

/// Options for [`CheckMenuItem::new`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckMenuItemOptions {
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
    /// Initial check state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// Click handler.
    #[serde(skip)]
    pub action: Option<MenuAction>,
}

/// Menu item with a check mark.
#[derive(Debug, Clone)]
pub struct CheckMenuItem {
    pub(super) base: MenuItemBase,
}

impl CheckMenuItem {
    /// Creates a check item.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn new(client: &HostClient, options: CheckMenuItemOptions) -> HostResult<Self> {
        let action = options.action.clone();
        let base = new_menu(client, ItemKind::Check, to_object(&options)?, action).await?;
        Ok(Self { base })
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn is_checked(&self) -> HostResult<bool> {
        self.base.call("is_checked", Value::Null).await
    }

    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_checked(&self, checked: bool) -> HostResult<()> {
        self.base
            .call("set_checked", json!({ "checked": checked }))
            .await
    }
}

impl MenuItemHandle for CheckMenuItem {
    fn base(&self) -> &MenuItemBase {
        &self.base
    }
}

text_ops!(CheckMenuItem);
accelerator_op!(CheckMenuItem);
