use serde::Serialize;

use super::base::{new_menu, to_object, ItemKind, MenuAction, MenuItemBase, MenuItemHandle};
use crate::{client::HostClient, error::HostResult};

/// Options for [`MenuItem::new`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemOptions {
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
    /// Click handler.
    #[serde(skip)]
    pub action: Option<MenuAction>,
}

impl MenuItemOptions {
    /// Options with only a label.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Sets the item id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the click handler.
    pub fn action(mut self, action: impl Into<MenuAction>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Plain text menu item.
#[derive(Debug, Clone)]
pub struct MenuItem {
    pub(super) base: MenuItemBase,
}

impl MenuItem {
    /// Creates a menu item.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn new(client: &HostClient, options: MenuItemOptions) -> HostResult<Self> {
        let action = options.action.clone();
        let base = new_menu(client, ItemKind::MenuItem, to_object(&options)?, action).await?;
        Ok(Self { base })
    }
}

impl MenuItemHandle for MenuItem {
    fn base(&self) -> &MenuItemBase {
        &self.base
    }
}

text_ops!(MenuItem);
accelerator_op!(MenuItem);
