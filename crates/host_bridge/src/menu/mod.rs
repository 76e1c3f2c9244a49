//! Native menus, submenus and menu items.
//!
//! Every handle is a host resource created through `plugin:menu|new`. Click handlers travel as
//! channels: the top-level constructor always registers one, and each inline item that carries
//! a [`MenuAction`] gets its own.

/// Generates the text and enabled-state accessors shared by most item kinds.
macro_rules! text_ops {
    ($ty:ty) => {
        impl $ty {
            /// Item label.
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn text(&self) -> $crate::error::HostResult<String> {
                self.base.call("text", serde_json::Value::Null).await
            }

            /// Replaces the item label.
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn set_text(&self, text: &str) -> $crate::error::HostResult<()> {
                self.base
                    .call("set_text", serde_json::json!({ "text": text }))
                    .await
            }

            /// Whether the item can be activated.
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn is_enabled(&self) -> $crate::error::HostResult<bool> {
                self.base.call("is_enabled", serde_json::Value::Null).await
            }

            /// Enables or disables the item.
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn set_enabled(&self, enabled: bool) -> $crate::error::HostResult<()> {
                self.base
                    .call("set_enabled", serde_json::json!({ "enabled": enabled }))
                    .await
            }
        }
    };
}

/// Generates the accelerator setter for item kinds that accept one.
macro_rules! accelerator_op {
    ($ty:ty) => {
        impl $ty {
            /// Sets or clears the keyboard shortcut, e.g. `CmdOrCtrl+Q`.
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn set_accelerator(
                &self,
                accelerator: Option<&str>,
            ) -> $crate::error::HostResult<()> {
                self.base
                    .call(
                        "set_accelerator",
                        serde_json::json!({ "accelerator": accelerator }),
                    )
                    .await
            }
        }
    };
}

/// Generates the container operations shared by menus and submenus.
macro_rules! container_ops {
    ($ty:ty) => {
        impl $ty {
            /// Appends items at the end.
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn append(
                &self,
                items: impl IntoIterator<Item = $crate::menu::MenuEntry>,
            ) -> $crate::error::HostResult<()> {
                $crate::menu::base::container::append(&self.base, items.into_iter().collect())
                    .await
            }

            /// Inserts items at the start.
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn prepend(
                &self,
                items: impl IntoIterator<Item = $crate::menu::MenuEntry>,
            ) -> $crate::error::HostResult<()> {
                $crate::menu::base::container::prepend(&self.base, items.into_iter().collect())
                    .await
            }

            /// Inserts items at `position`.
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn insert(
                &self,
                items: impl IntoIterator<Item = $crate::menu::MenuEntry>,
                position: usize,
            ) -> $crate::error::HostResult<()> {
                $crate::menu::base::container::insert(
                    &self.base,
                    items.into_iter().collect(),
                    position,
                )
                .await
            }

            /// Removes the existing item `item`.
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn remove(
                &self,
                item: impl Into<$crate::menu::MenuRef>,
            ) -> $crate::error::HostResult<()> {
                $crate::menu::base::container::remove(&self.base, item.into()).await
            }

            /// Removes and returns the item at `position`.
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn remove_at(
                &self,
                position: usize,
            ) -> $crate::error::HostResult<Option<$crate::menu::AnyMenuItem>> {
                $crate::menu::base::container::remove_at(&self.base, position).await
            }

            /// Current items, in order.
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn items(
                &self,
            ) -> $crate::error::HostResult<Vec<$crate::menu::AnyMenuItem>> {
                $crate::menu::base::container::items(&self.base).await
            }

            /// Item with `id`, searched recursively.
            ///
            /// # Errors
            ///
            /// Propagates the host rejection.
            pub async fn get(
                &self,
                id: &str,
            ) -> $crate::error::HostResult<Option<$crate::menu::AnyMenuItem>> {
                $crate::menu::base::container::get(&self.base, id).await
            }

            /// Shows the menu as a context menu, at the cursor unless `at` is given.
            ///
            /// # Errors
            ///
            /// Rejects a malformed position before calling the host, otherwise propagates the
            /// host rejection.
            pub async fn popup(
                &self,
                at: Option<$crate::dpi::Position>,
                window: Option<&$crate::window::Window>,
            ) -> $crate::error::HostResult<()> {
                $crate::menu::base::container::popup(&self.base, at, window).await
            }
        }
    };
}

mod base;
mod check;
mod icon;
mod item;
#[allow(clippy::module_inception)]
mod menu;
mod predefined;
mod submenu;

pub use base::{
    ItemKind, MenuAction, MenuEntry, MenuIcon, MenuId, MenuItemBase, MenuItemHandle, MenuRef,
    NativeIcon,
};
pub use check::{CheckMenuItem, CheckMenuItemOptions};
pub use icon::{IconMenuItem, IconMenuItemOptions};
pub use item::{MenuItem, MenuItemOptions};
pub use menu::{Menu, MenuOptions};
pub use predefined::{AboutMetadata, PredefinedItem, PredefinedMenuItem, PredefinedMenuItemOptions};
pub use submenu::{Submenu, SubmenuOptions};

/// Item of a menu whose concrete kind is only known at runtime.
#[derive(Debug, Clone)]
pub enum AnyMenuItem {
    /// Plain item.
    MenuItem(MenuItem),
    /// Check item.
    Check(CheckMenuItem),
    /// Icon item.
    Icon(IconMenuItem),
    /// Predefined item.
    Predefined(PredefinedMenuItem),
    /// Submenu.
    Submenu(Submenu),
}

impl MenuItemHandle for AnyMenuItem {
    fn base(&self) -> &MenuItemBase {
        match self {
            Self::MenuItem(item) => item.base(),
            Self::Check(item) => item.base(),
            Self::Icon(item) => item.base(),
            Self::Predefined(item) => item.base(),
            Self::Submenu(item) => item.base(),
        }
    }
}
