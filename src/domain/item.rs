//! Launcher item model.
//!
//! The home grid is an ordered list of [`LauncherItem`]s. Every item has exactly one
//! identity key ([`ItemKey`]), derived in [`LauncherItem::key`] and nowhere else, so
//! geometry snapshots, drag sessions and the store all agree on what an item is.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name given to folders created by dropping one app onto another.
pub const DEFAULT_FOLDER_NAME: &str = "Folder";

/// Host-assigned widget identifier.
pub type WidgetId = i32;

/// Opaque handle to a platform icon.
///
/// Icons are resolved from the app catalog when items are loaded and are never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconHandle(pub u64);

/// A launchable application.
///
/// Identity is the package name; the label and icon are display data refreshed from
/// the installed-app catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRef {
    pub label: String,
    pub package_name: String,
    pub icon: Option<IconHandle>,
}

impl AppRef {
    #[must_use]
    pub fn new(label: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            package_name: package_name.into(),
            icon: None,
        }
    }

    #[must_use]
    pub fn with_icon(mut self, icon: IconHandle) -> Self {
        self.icon = Some(icon);
        self
    }
}

/// How swipes and double-taps on a folder icon are resolved.
///
/// `Default` maps directions onto the folder's first apps by position; `Custom`
/// looks up the folder's own gesture bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureMode {
    #[default]
    Default,
    Custom,
}

impl GestureMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Default => Self::Custom,
            Self::Custom => Self::Default,
        }
    }
}

/// A named, ordered group of apps shown as a single grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderInfo {
    pub id: String,
    pub name: String,
    pub apps: Vec<AppRef>,
    pub gesture_mode: GestureMode,
}

impl FolderInfo {
    /// Creates a folder with a fresh UUID, the default name and `Default` gesture mode.
    #[must_use]
    pub fn new(apps: Vec<AppRef>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: DEFAULT_FOLDER_NAME.to_string(),
            apps,
            gesture_mode: GestureMode::Default,
        }
    }

    /// Position of the app with `package_name` inside this folder.
    #[must_use]
    pub fn index_of(&self, package_name: &str) -> Option<usize> {
        self.apps.iter().position(|app| app.package_name == package_name)
    }

    #[must_use]
    pub fn app_at(&self, index: usize) -> Option<&AppRef> {
        self.apps.get(index)
    }
}

/// A non-empty, ordered stack of widgets occupying one grid cell.
///
/// The stack is keyed by its first widget id, which never changes while the stack
/// exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetStack {
    first: WidgetId,
    rest: Vec<WidgetId>,
}

impl WidgetStack {
    #[must_use]
    pub fn new(first: WidgetId) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    /// Builds a stack from a list of ids, returning `None` for an empty list.
    #[must_use]
    pub fn from_ids(ids: Vec<WidgetId>) -> Option<Self> {
        let mut iter = ids.into_iter();
        let first = iter.next()?;
        Some(Self {
            first,
            rest: iter.collect(),
        })
    }

    #[must_use]
    pub const fn first(&self) -> WidgetId {
        self.first
    }

    pub fn ids(&self) -> impl Iterator<Item = WidgetId> + '_ {
        std::iter::once(self.first).chain(self.rest.iter().copied())
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<WidgetId> {
        self.ids().collect()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.rest.len()
    }

    pub fn push(&mut self, id: WidgetId) {
        self.rest.push(id);
    }
}

/// A widget type offered by the widget picker.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetProvider {
    /// Platform component name identifying the provider.
    pub component: String,
    pub label: String,
    pub min_width_dp: f64,
    pub min_height_dp: f64,
}

/// One cell of the home grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LauncherItem {
    App(AppRef),
    Folder(FolderInfo),
    Widget(WidgetId),
    WidgetStack(WidgetStack),
}

impl LauncherItem {
    /// Returns the identity key of this item.
    ///
    /// # Examples
    ///
    /// ```
    /// use arc_launcher::domain::{AppRef, LauncherItem};
    ///
    /// let item = LauncherItem::App(AppRef::new("Maps", "com.example.maps"));
    /// assert_eq!(item.key().to_string(), "app_com.example.maps");
    /// ```
    #[must_use]
    pub fn key(&self) -> ItemKey {
        match self {
            Self::App(app) => ItemKey::App(app.package_name.clone()),
            Self::Folder(folder) => ItemKey::Folder(folder.id.clone()),
            Self::Widget(id) => ItemKey::Widget(*id),
            Self::WidgetStack(stack) => ItemKey::WidgetStack(stack.first()),
        }
    }

    #[must_use]
    pub const fn is_widget_like(&self) -> bool {
        matches!(self, Self::Widget(_) | Self::WidgetStack(_))
    }

    /// All widget ids held by this item, empty for apps and folders.
    #[must_use]
    pub fn widget_ids(&self) -> Vec<WidgetId> {
        match self {
            Self::Widget(id) => vec![*id],
            Self::WidgetStack(stack) => stack.to_vec(),
            Self::App(_) | Self::Folder(_) => Vec::new(),
        }
    }

    #[must_use]
    pub const fn as_app(&self) -> Option<&AppRef> {
        match self {
            Self::App(app) => Some(app),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_folder(&self) -> Option<&FolderInfo> {
        match self {
            Self::Folder(folder) => Some(folder),
            _ => None,
        }
    }

    pub fn as_folder_mut(&mut self) -> Option<&mut FolderInfo> {
        match self {
            Self::Folder(folder) => Some(folder),
            _ => None,
        }
    }
}

/// Stable identity of a grid item.
///
/// Ordering is total and deterministic, which the geometry index relies on for
/// first-match queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKey {
    App(String),
    Folder(String),
    Widget(WidgetId),
    WidgetStack(WidgetId),
}

impl ItemKey {
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        match self {
            Self::App(package) => Some(package),
            _ => None,
        }
    }

    #[must_use]
    pub fn folder_id(&self) -> Option<&str> {
        match self {
            Self::Folder(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_widget_like(&self) -> bool {
        matches!(self, Self::Widget(_) | Self::WidgetStack(_))
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App(package) => write!(f, "app_{package}"),
            Self::Folder(id) => write!(f, "folder_{id}"),
            Self::Widget(id) => write!(f, "widget_{id}"),
            Self::WidgetStack(id) => write!(f, "widget_stack_{id}"),
        }
    }
}
