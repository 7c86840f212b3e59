//! Overlay state: at most one menu or dialog is shown above the grid.
//!
//! The expanded folder is tracked separately in
//! [`AppState::expanded_folder`](crate::app::AppState::expanded_folder) because a
//! folder stays open underneath its own menus.

use crate::domain::BindingScope;
use crate::infrastructure::Shortcut;

/// Contents of an app's long-press menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutsMenu {
    Loading,
    Loaded(Vec<Shortcut>),
    /// The platform refused to list shortcuts; the menu offers to grant access.
    PermissionRequired,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    None,

    Shortcuts {
        package_name: String,
        menu: ShortcutsMenu,
    },

    /// Rename, gesture mode and gesture configuration for a folder.
    FolderMenu {
        folder_id: String,
    },

    GestureConfig {
        scope: BindingScope,
    },

    FolderRename {
        folder_id: String,
    },

    WidgetPicker,

    /// Long press on empty space: settings and widgets.
    HomeMenu,
}

impl Overlay {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }
}
