//! Gesture vocabulary and per-item gesture bindings.
//!
//! Bindings live in a flat map under composite string keys of the form
//! `<scope>:<DIRECTION>`, where the scope is one of:
//!
//! - `app:<package>` for an app on the home grid
//! - `folder:<id>` for a folder icon in custom gesture mode
//! - `folder:<id>:<index>` for the app at `index` inside a folder
//!
//! The string form is what gets persisted, so it must stay stable.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A recognizable gesture: one of the eight compass swipes or a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureDirection {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    SingleTap,
    DoubleTap,
}

impl GestureDirection {
    pub const ALL: [Self; 10] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::UpLeft,
        Self::UpRight,
        Self::DownLeft,
        Self::DownRight,
        Self::SingleTap,
        Self::DoubleTap,
    ];

    /// Name used inside binding keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::UpLeft => "UP_LEFT",
            Self::UpRight => "UP_RIGHT",
            Self::DownLeft => "DOWN_LEFT",
            Self::DownRight => "DOWN_RIGHT",
            Self::SingleTap => "SINGLE_TAP",
            Self::DoubleTap => "DOUBLE_TAP",
        }
    }

    /// Human-readable label for configuration menus.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Up => "Swipe Up",
            Self::Down => "Swipe Down",
            Self::Left => "Swipe Left",
            Self::Right => "Swipe Right",
            Self::UpLeft => "Swipe Up-Left",
            Self::UpRight => "Swipe Up-Right",
            Self::DownLeft => "Swipe Down-Left",
            Self::DownRight => "Swipe Down-Right",
            Self::SingleTap => "Single Tap",
            Self::DoubleTap => "Double Tap",
        }
    }

    #[must_use]
    pub const fn is_swipe(self) -> bool {
        !matches!(self, Self::SingleTap | Self::DoubleTap)
    }
}

impl fmt::Display for GestureDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a bound gesture does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GestureAction {
    LaunchApp {
        #[serde(rename = "packageName")]
        package_name: String,
    },
    LaunchShortcut {
        #[serde(rename = "packageName")]
        package_name: String,
        #[serde(rename = "shortcutId")]
        shortcut_id: String,
    },
}

/// A stored binding: the gesture it was recorded for and its action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureBinding {
    pub gesture: GestureDirection,
    pub action: GestureAction,
}

/// The item a binding belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingScope {
    App { package_name: String },
    Folder { folder_id: String },
    FolderSlot { folder_id: String, index: usize },
}

impl BindingScope {
    #[must_use]
    pub fn app(package_name: impl Into<String>) -> Self {
        Self::App {
            package_name: package_name.into(),
        }
    }

    #[must_use]
    pub fn folder(folder_id: impl Into<String>) -> Self {
        Self::Folder {
            folder_id: folder_id.into(),
        }
    }

    #[must_use]
    pub fn folder_slot(folder_id: impl Into<String>, index: usize) -> Self {
        Self::FolderSlot {
            folder_id: folder_id.into(),
            index,
        }
    }

    /// Key prefix for this scope, without the trailing separator.
    #[must_use]
    pub fn prefix(&self) -> String {
        match self {
            Self::App { package_name } => format!("app:{package_name}"),
            Self::Folder { folder_id } => format!("folder:{folder_id}"),
            Self::FolderSlot { folder_id, index } => format!("folder:{folder_id}:{index}"),
        }
    }

    /// Full binding key for `direction` in this scope.
    ///
    /// # Examples
    ///
    /// ```
    /// use arc_launcher::domain::{BindingScope, GestureDirection};
    ///
    /// let key = BindingScope::folder_slot("f1", 2).key(GestureDirection::UpLeft);
    /// assert_eq!(key, "folder:f1:2:UP_LEFT");
    /// ```
    #[must_use]
    pub fn key(&self, direction: GestureDirection) -> String {
        format!("{}:{}", self.prefix(), direction.as_str())
    }
}

/// Direction → folder slot for a folder in `Default` gesture mode.
///
/// Folders with up to four apps use the 2×2 corners; larger folders use a 3×3 grid
/// with double-tap as the centre slot. Returns `None` when the direction has no slot
/// or the slot is past the end of the folder.
#[must_use]
pub fn default_folder_slot(app_count: usize, direction: GestureDirection) -> Option<usize> {
    use GestureDirection as D;

    let slot = if app_count <= 4 {
        match direction {
            D::UpLeft => 0,
            D::UpRight => 1,
            D::DownLeft => 2,
            D::DownRight => 3,
            _ => return None,
        }
    } else {
        match direction {
            D::UpLeft => 0,
            D::Up => 1,
            D::UpRight => 2,
            D::Left => 3,
            D::DoubleTap => 4,
            D::Right => 5,
            D::DownLeft => 6,
            D::Down => 7,
            D::DownRight => 8,
            D::SingleTap => return None,
        }
    };

    (slot < app_count).then_some(slot)
}

/// The persisted map of gesture bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GestureBindings {
    entries: BTreeMap<String, GestureBinding>,
}

impl GestureBindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_map(entries: BTreeMap<String, GestureBinding>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, GestureBinding> {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<&GestureBinding> {
        self.entries.get(key)
    }

    /// Looks up the action bound to `direction` in `scope`.
    #[must_use]
    pub fn action(&self, scope: &BindingScope, direction: GestureDirection) -> Option<&GestureAction> {
        self.entries.get(&scope.key(direction)).map(|binding| &binding.action)
    }

    /// Binds or unbinds `direction` in `scope`.
    ///
    /// `None` removes the key entirely. Returns whether the map changed.
    pub fn set(
        &mut self,
        scope: &BindingScope,
        direction: GestureDirection,
        action: Option<GestureAction>,
    ) -> bool {
        let key = scope.key(direction);
        match action {
            Some(action) => {
                let binding = GestureBinding {
                    gesture: direction,
                    action,
                };
                self.entries.insert(key, binding.clone()) != Some(binding)
            }
            None => self.entries.remove(&key).is_some(),
        }
    }

    /// Removes every binding whose key starts with `prefix`. Returns the number removed.
    pub fn clear_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    /// Removes every binding of exactly this scope.
    ///
    /// Unlike [`clear_prefix`](Self::clear_prefix) this never touches a sibling scope
    /// that happens to share a textual prefix (`app:com.a` vs `app:com.ab`) or the
    /// slot bindings nested under a folder.
    pub fn clear_scope(&mut self, scope: &BindingScope) -> usize {
        GestureDirection::ALL
            .iter()
            .filter(|direction| self.entries.remove(&scope.key(**direction)).is_some())
            .count()
    }

    /// Whether any gesture other than single tap is bound in `scope`.
    #[must_use]
    pub fn has_custom_gestures(&self, scope: &BindingScope) -> bool {
        GestureDirection::ALL
            .iter()
            .filter(|direction| **direction != GestureDirection::SingleTap)
            .any(|direction| self.entries.contains_key(&scope.key(*direction)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &GestureBinding)> {
        self.entries.iter()
    }
}
