//! The ordered home-grid item list and the edits allowed on it.
//!
//! Every edit validates its inputs before touching the list, so a call either
//! applies completely or leaves the store untouched. Unknown keys and stale indices
//! are silent no-ops reported through the `bool`/`Option` return value. A successful
//! edit bumps [`ItemStore::revision`], which callers use to decide when to persist.

use super::item::{AppRef, FolderInfo, GestureMode, ItemKey, LauncherItem, WidgetId, WidgetStack};

#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Vec<LauncherItem>,
    revision: u64,
}

impl ItemStore {
    #[must_use]
    pub fn new(items: Vec<LauncherItem>) -> Self {
        Self { items, revision: 0 }
    }

    /// Builds the first-run grid: every installed app, alphabetical by label.
    #[must_use]
    pub fn synthesize(apps: &[AppRef]) -> Vec<LauncherItem> {
        let mut sorted = apps.to_vec();
        sorted.sort_by(|a, b| {
            a.label
                .to_lowercase()
                .cmp(&b.label.to_lowercase())
                .then_with(|| a.package_name.cmp(&b.package_name))
        });
        sorted.into_iter().map(LauncherItem::App).collect()
    }

    #[must_use]
    pub fn items(&self) -> &[LauncherItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Monotonic counter bumped by every edit that changed the list.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn position(&self, key: &ItemKey) -> Option<usize> {
        self.items.iter().position(|item| &item.key() == key)
    }

    #[must_use]
    pub fn get(&self, key: &ItemKey) -> Option<&LauncherItem> {
        self.items.iter().find(|item| &item.key() == key)
    }

    #[must_use]
    pub fn folder(&self, folder_id: &str) -> Option<&FolderInfo> {
        self.items
            .iter()
            .filter_map(LauncherItem::as_folder)
            .find(|folder| folder.id == folder_id)
    }

    fn folder_position(&self, folder_id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.as_folder().is_some_and(|folder| folder.id == folder_id))
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// Replaces the whole list at once, e.g. after a load from disk.
    pub fn replace_all(&mut self, items: Vec<LauncherItem>) {
        self.items = items;
        self.bump();
    }

    /// Moves the item with `key` so it lands before the item currently at `to_index`.
    ///
    /// `to_index` is expressed against the list before removal; targets after the
    /// source are shifted down by one, so `move_item(k, len)` moves to the end.
    pub fn move_item(&mut self, key: &ItemKey, to_index: usize) -> bool {
        let Some(from) = self.position(key) else {
            return false;
        };
        if to_index > self.items.len() || from == to_index {
            return false;
        }
        let adjusted = if to_index > from { to_index - 1 } else { to_index };
        if adjusted == from {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(adjusted, item);
        self.bump();
        true
    }

    /// Drops app `dragged` onto app `target`, replacing the target's cell with a new
    /// folder `[target, dragged]`. Returns the new folder id.
    pub fn create_folder(&mut self, dragged: &ItemKey, target: &ItemKey) -> Option<String> {
        if dragged == target {
            return None;
        }
        let dragged_index = self.position(dragged)?;
        let target_index = self.position(target)?;
        let dragged_app = self.items[dragged_index].as_app()?.clone();
        let target_app = self.items[target_index].as_app()?.clone();

        let folder = FolderInfo::new(vec![target_app, dragged_app]);
        let folder_id = folder.id.clone();
        self.items[target_index] = LauncherItem::Folder(folder);
        self.items.remove(dragged_index);
        self.bump();
        Some(folder_id)
    }

    /// Moves a home-grid app into an existing folder, appending it.
    pub fn add_to_folder(&mut self, app: &ItemKey, folder_id: &str) -> bool {
        let Some(app_index) = self.position(app) else {
            return false;
        };
        let Some(app_ref) = self.items[app_index].as_app().cloned() else {
            return false;
        };
        let Some(folder_index) = self.folder_position(folder_id) else {
            return false;
        };
        if let Some(folder) = self.items[folder_index].as_folder_mut() {
            folder.apps.push(app_ref);
        }
        self.items.remove(app_index);
        self.bump();
        true
    }

    /// Removes an item from the grid, returning it so callers can release resources
    /// such as widget ids.
    pub fn remove_item(&mut self, key: &ItemKey) -> Option<LauncherItem> {
        let index = self.position(key)?;
        let removed = self.items.remove(index);
        self.bump();
        Some(removed)
    }

    /// Detaches an app from a folder, deleting the folder if it becomes empty.
    ///
    /// Returns the app and, if the folder was deleted, the index it occupied.
    fn take_from_folder(&mut self, folder_id: &str, package_name: &str) -> Option<(AppRef, Option<usize>)> {
        let folder_index = self.folder_position(folder_id)?;
        let folder = self.items[folder_index].as_folder_mut()?;
        let app_index = folder.index_of(package_name)?;
        let app = folder.apps.remove(app_index);
        if folder.apps.is_empty() {
            self.items.remove(folder_index);
            return Some((app, Some(folder_index)));
        }
        Some((app, None))
    }

    /// Removes an app from a folder without placing it anywhere.
    pub fn remove_app_from_folder(&mut self, folder_id: &str, package_name: &str) -> Option<AppRef> {
        let (app, _) = self.take_from_folder(folder_id, package_name)?;
        self.bump();
        Some(app)
    }

    /// Moves an app out of a folder onto the home grid at `target_index`.
    ///
    /// `target_index` refers to the list before the move; if the source folder is
    /// deleted because it emptied and sat before the target, the index shifts down.
    pub fn move_app_from_folder_to_home(
        &mut self,
        folder_id: &str,
        package_name: &str,
        target_index: usize,
    ) -> bool {
        let contains = self
            .folder(folder_id)
            .is_some_and(|folder| folder.index_of(package_name).is_some());
        if !contains || target_index > self.items.len() {
            return false;
        }
        let Some((app, removed_at)) = self.take_from_folder(folder_id, package_name) else {
            return false;
        };
        let mut index = target_index;
        if removed_at.is_some_and(|removed| removed < index) {
            index -= 1;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, LauncherItem::App(app));
        self.bump();
        true
    }

    /// Drops a folder app onto a home-grid app, replacing that app's cell with a new
    /// folder `[target, dragged]`. Returns the new folder id.
    pub fn move_app_from_folder_to_app(
        &mut self,
        folder_id: &str,
        package_name: &str,
        target_package: &str,
    ) -> Option<String> {
        let target_key = ItemKey::App(target_package.to_string());
        let target_app = self.get(&target_key)?.as_app()?.clone();
        self.folder(folder_id)?.index_of(package_name)?;

        let (app, _) = self.take_from_folder(folder_id, package_name)?;
        let target_index = self.position(&target_key)?;
        let folder = FolderInfo::new(vec![target_app, app]);
        let new_id = folder.id.clone();
        self.items[target_index] = LauncherItem::Folder(folder);
        self.bump();
        Some(new_id)
    }

    /// Moves an app from one folder to the end of another.
    pub fn move_app_between_folders(&mut self, from_folder: &str, to_folder: &str, package_name: &str) -> bool {
        if from_folder == to_folder || self.folder(to_folder).is_none() {
            return false;
        }
        if self
            .folder(from_folder)
            .and_then(|folder| folder.index_of(package_name))
            .is_none()
        {
            return false;
        }
        let Some((app, _)) = self.take_from_folder(from_folder, package_name) else {
            return false;
        };
        let Some(to_index) = self.folder_position(to_folder) else {
            return false;
        };
        if let Some(folder) = self.items[to_index].as_folder_mut() {
            folder.apps.push(app);
        }
        self.bump();
        true
    }

    /// Reorders apps inside a folder with the same index semantics as
    /// [`move_item`](Self::move_item).
    pub fn reorder_in_folder(&mut self, folder_id: &str, from: usize, to: usize) -> bool {
        let Some(index) = self.folder_position(folder_id) else {
            return false;
        };
        let Some(folder) = self.items[index].as_folder_mut() else {
            return false;
        };
        let len = folder.apps.len();
        if from >= len || to > len || from == to {
            return false;
        }
        let adjusted = if to > from { to - 1 } else { to };
        if adjusted == from {
            return false;
        }
        let app = folder.apps.remove(from);
        folder.apps.insert(adjusted, app);
        self.bump();
        true
    }

    pub fn rename_folder(&mut self, folder_id: &str, name: &str) -> bool {
        let Some(index) = self.folder_position(folder_id) else {
            return false;
        };
        match self.items[index].as_folder_mut() {
            Some(folder) if folder.name != name => {
                folder.name = name.to_string();
                self.bump();
                true
            }
            _ => false,
        }
    }

    /// Flips a folder between default and custom gesture mode, returning the new mode.
    pub fn toggle_gesture_mode(&mut self, folder_id: &str) -> Option<GestureMode> {
        let index = self.folder_position(folder_id)?;
        let folder = self.items[index].as_folder_mut()?;
        folder.gesture_mode = folder.gesture_mode.toggled();
        let mode = folder.gesture_mode;
        self.bump();
        Some(mode)
    }

    /// Inserts a freshly bound widget at `index`, clamped to the end of the list.
    pub fn insert_widget(&mut self, index: usize, widget_id: WidgetId) -> bool {
        if self.items.iter().any(|item| item.widget_ids().contains(&widget_id)) {
            return false;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, LauncherItem::Widget(widget_id));
        self.bump();
        true
    }

    /// Drops widget (or stack) `dragged` onto widget (or stack) `target`.
    ///
    /// The target's cell becomes a stack holding the target's widgets followed by the
    /// dragged ones, keyed by the target's first widget.
    pub fn stack_widgets(&mut self, dragged: &ItemKey, target: &ItemKey) -> bool {
        if dragged == target || !dragged.is_widget_like() || !target.is_widget_like() {
            return false;
        }
        let (Some(dragged_index), Some(target_index)) = (self.position(dragged), self.position(target)) else {
            return false;
        };
        let mut ids = self.items[target_index].widget_ids();
        ids.extend(self.items[dragged_index].widget_ids());
        let Some(stack) = WidgetStack::from_ids(ids) else {
            return false;
        };
        self.items[target_index] = LauncherItem::WidgetStack(stack);
        self.items.remove(dragged_index);
        self.bump();
        true
    }
}
