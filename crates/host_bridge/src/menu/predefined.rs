use serde::Serialize;
use serde_json::{json, Value};

use super::base::{new_menu, to_object, ItemKind, MenuItemBase, MenuItemHandle};
use crate::{client::HostClient, error::HostResult, image::ImageSource};

/// Application details shown by the predefined About item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct AboutMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<ImageSource>,
}

/// OS-provided menu item.
///
/// Serializes as the bare variant name, except `About`, which becomes `{"About": metadata}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub enum PredefinedItem {
    Separator,
    Copy,
    Cut,
    Paste,
    SelectAll,
    Undo,
    Redo,
    Minimize,
    Maximize,
    Fullscreen,
    Hide,
    HideOthers,
    ShowAll,
    CloseWindow,
    Quit,
    Services,
    About(Option<AboutMetadata>),
}

/// Options for [`PredefinedMenuItem::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredefinedMenuItemOptions {
    /// Which item.
    pub item: PredefinedItem,
    /// Label override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl From<PredefinedItem> for PredefinedMenuItemOptions {
    fn from(item: PredefinedItem) -> Self {
        Self { item, text: None }
    }
}

/// OS-provided menu item such as Copy or Quit.
#[derive(Debug, Clone)]
pub struct PredefinedMenuItem {
    pub(super) base: MenuItemBase,
}

impl PredefinedMenuItem {
    /// Creates a predefined item.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn new(
        client: &HostClient,
        options: impl Into<PredefinedMenuItemOptions>,
    ) -> HostResult<Self> {
        let options = options.into();
        let base = new_menu(client, ItemKind::Predefined, to_object(&options)?, None).await?;
        Ok(Self { base })
    }

    /// Item label.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn text(&self) -> HostResult<String> {
        self.base.call("text", Value::Null).await
    }

    /// Replaces the item label.
    ///
    /// # Errors
    ///
    /// Propagates the host rejection.
    pub async fn set_text(&self, text: &str) -> HostResult<()> {
        self.base.call("set_text", json!({ "text": text })).await
    }
}

impl MenuItemHandle for PredefinedMenuItem {
    fn base(&self) -> &MenuItemBase {
        &self.base
    }
}
