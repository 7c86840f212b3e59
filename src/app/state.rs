//! Application state and view model computation.
//!
//! [`AppState`] is the single owner of everything the home screen knows: the item
//! list, the gesture bindings, the live geometry reported by the renderer, the
//! in-flight gesture and drag, and which overlay is open. It is mutated only by
//! [`handle_event`](crate::app::handle_event).

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use kurbo::Rect;

use super::gestures::TouchTarget;
use super::modes::Overlay;
use super::Action;
use crate::domain::{AppRef, BindingScope, GestureBindings, GestureMode, ItemKey, ItemStore, LauncherItem};
use crate::drag::{layout, DragController, DragSubject, DropContext, GeometryIndex, WidgetMetrics, GRID_COLUMNS};
use crate::input::{GestureRecognizer, RecognizerConfig};
use crate::storage::records_from_items;
use crate::ui::viewmodel::{
    CellContent, CellView, DragView, FolderAppView, FolderView, HomeViewModel, SearchResultView, SearchView,
};
use crate::worker::WorkerMessage;
use crate::Config;

/// Number of app icons shown in a folder's preview.
const FOLDER_PREVIEW_SIZE: usize = 4;

#[derive(Debug)]
pub struct AppState {
    /// Launchable apps as last reported by the platform catalog.
    pub installed_apps: Vec<AppRef>,

    pub store: ItemStore,
    pub bindings: GestureBindings,

    /// Whether persisted state has been loaded at least once.
    pub loaded: bool,

    pub recognizer: GestureRecognizer<TouchTarget>,
    pub drag: DragController,

    /// Last measured bounds of every home grid cell.
    pub home_geometry: GeometryIndex<ItemKey>,

    /// Last measured bounds of the apps in the expanded folder, keyed by
    /// [`ItemKey::App`].
    pub folder_geometry: GeometryIndex<ItemKey>,

    /// Content bounds of the expanded folder panel.
    pub folder_content: Option<Rect>,

    pub remove_target: Option<Rect>,
    pub widget_metrics: WidgetMetrics,

    pub expanded_folder: Option<String>,
    pub overlay: Overlay,

    pub search_query: String,

    /// Installed apps matching `search_query`, best match first.
    pub search_results: Vec<AppRef>,
}

impl AppState {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            installed_apps: Vec::new(),
            store: ItemStore::default(),
            bindings: GestureBindings::new(),
            loaded: false,
            recognizer: GestureRecognizer::new(RecognizerConfig::from(config)),
            drag: DragController::new(config.folder_hysteresis_px),
            home_geometry: GeometryIndex::new(),
            folder_geometry: GeometryIndex::new(),
            folder_content: None,
            remove_target: None,
            widget_metrics: WidgetMetrics::new(),
            expanded_folder: None,
            overlay: Overlay::None,
            search_query: String::new(),
            search_results: Vec::new(),
        }
    }

    /// Everything the placement policy reads besides the drag session.
    #[must_use]
    pub fn drop_context(&self) -> DropContext<'_> {
        DropContext {
            store: &self.store,
            home: &self.home_geometry,
            folder: &self.folder_geometry,
            remove_target: self.remove_target,
            metrics: &self.widget_metrics,
        }
    }

    /// A save of the current item list, to be posted to the worker.
    #[must_use]
    pub fn save_items_action(&self) -> Action {
        Action::PostToWorker(WorkerMessage::save_items(records_from_items(self.store.items())))
    }

    #[must_use]
    pub fn save_bindings_action(&self) -> Action {
        Action::PostToWorker(WorkerMessage::save_gesture_bindings(self.bindings.clone()))
    }

    #[must_use]
    pub fn load_state_action(&self) -> Action {
        Action::PostToWorker(WorkerMessage::load_state(self.installed_apps.clone()))
    }

    /// Opens `folder_id` if it exists. Folder geometry from a previous folder is dropped.
    pub fn expand_folder(&mut self, folder_id: &str) -> bool {
        if self.store.folder(folder_id).is_none() || self.expanded_folder.as_deref() == Some(folder_id) {
            return false;
        }
        self.folder_geometry.clear();
        self.folder_content = None;
        self.expanded_folder = Some(folder_id.to_string());
        true
    }

    pub fn collapse_folder(&mut self) -> bool {
        if self.expanded_folder.take().is_none() {
            return false;
        }
        self.folder_geometry.clear();
        self.folder_content = None;
        true
    }

    /// Drops geometry for items that no longer exist and closes a folder that was
    /// deleted.
    pub fn prune_stale_state(&mut self) {
        let store = &self.store;
        self.home_geometry.retain(|key| store.get(key).is_some());

        if let Some(folder) = self.expanded_folder.as_deref().and_then(|id| self.store.folder(id)) {
            self.folder_geometry
                .retain(|key| key.package_name().is_some_and(|package| folder.index_of(package).is_some()));
        } else {
            self.collapse_folder();
        }
    }

    /// Recomputes `search_results` from `search_query`.
    ///
    /// Every whitespace-separated token must fuzzy-match the label. Results are
    /// ordered by the summed match score, then alphabetically.
    pub fn apply_search_filter(&mut self) {
        let _span = tracing::debug_span!(
            "apply_search_filter",
            total_apps = self.installed_apps.len(),
            query_len = self.search_query.len()
        )
        .entered();

        let tokens: Vec<String> = self.search_query.split_whitespace().map(str::to_lowercase).collect();
        if tokens.is_empty() {
            self.search_results.clear();
            return;
        }

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &AppRef)> = self
            .installed_apps
            .iter()
            .filter_map(|app| {
                let label = app.label.to_lowercase();
                tokens
                    .iter()
                    .map(|token| matcher.fuzzy_match(&label, token))
                    .sum::<Option<i64>>()
                    .map(|score| (score, app))
            })
            .collect();
        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .cmp(score_a)
                .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
        });
        self.search_results = scored.into_iter().map(|(_, app)| app.clone()).collect();

        tracing::debug!(result_count = self.search_results.len(), "search filter applied");
    }

    pub fn clear_search(&mut self) -> bool {
        if self.search_query.is_empty() && self.search_results.is_empty() {
            return false;
        }
        self.search_query.clear();
        self.search_results.clear();
        true
    }

    /// Whether an item shows the custom-gesture badge.
    fn has_badge(&self, item: &LauncherItem) -> bool {
        match item {
            LauncherItem::App(app) => self
                .bindings
                .has_custom_gestures(&BindingScope::app(app.package_name.as_str())),
            LauncherItem::Folder(folder) => {
                folder.gesture_mode == GestureMode::Custom
                    && self.bindings.has_custom_gestures(&BindingScope::folder(folder.id.as_str()))
            }
            LauncherItem::Widget(_) | LauncherItem::WidgetStack(_) => false,
        }
    }

    #[must_use]
    pub fn compute_viewmodel(&self) -> HomeViewModel {
        let session = self.drag.session();
        let dragged = session.map(|s| s.subject());
        let drop_target = session.and_then(|s| s.drop_target());

        let items = self.store.items();
        let cells = layout(&self.widget_metrics.spans(items), GRID_COLUMNS)
            .into_iter()
            .zip(items)
            .map(|(cell, item)| {
                let key = item.key();
                CellView {
                    cell,
                    content: cell_content(item),
                    has_gesture_badge: self.has_badge(item),
                    is_drop_target: drop_target == Some(&key),
                    is_dragged: matches!(dragged, Some(DragSubject::HomeItem(k)) if *k == key),
                    key,
                }
            })
            .collect();

        HomeViewModel {
            cells,
            folder: self.compute_folder_view(),
            drag: session.map(|s| DragView { bounds: s.bounds() }),
            remove_target_visible: self.drag.is_active(),
            overlay: self.overlay.clone(),
            search: self.compute_search_view(),
        }
    }

    fn compute_folder_view(&self) -> Option<FolderView> {
        let folder = self.store.folder(self.expanded_folder.as_deref()?)?;
        let session = self.drag.session();
        let dragged_package = match session.map(|s| s.subject()) {
            Some(DragSubject::FolderApp {
                folder_id,
                package_name,
            }) if *folder_id == folder.id => Some(package_name.as_str()),
            _ => None,
        };

        let apps = folder
            .apps
            .iter()
            .enumerate()
            .map(|(index, app)| FolderAppView {
                label: app.label.clone(),
                package_name: app.package_name.clone(),
                icon: app.icon,
                has_gesture_badge: self
                    .bindings
                    .has_custom_gestures(&BindingScope::folder_slot(folder.id.as_str(), index)),
                is_dragged: dragged_package == Some(app.package_name.as_str()),
            })
            .collect();

        Some(FolderView {
            folder_id: folder.id.clone(),
            name: folder.name.clone(),
            gesture_mode: folder.gesture_mode,
            apps,
            visible: session.map_or(true, |s| s.folder_overlay_visible() || dragged_package.is_none()),
        })
    }

    fn compute_search_view(&self) -> Option<SearchView> {
        if self.search_query.is_empty() {
            return None;
        }
        let matcher = SkimMatcherV2::default();
        let results = self
            .search_results
            .iter()
            .map(|app| SearchResultView {
                label: app.label.clone(),
                package_name: app.package_name.clone(),
                highlight_ranges: highlight_ranges(&matcher, &app.label, self.search_query.trim()),
            })
            .collect();
        Some(SearchView {
            query: self.search_query.clone(),
            results,
        })
    }
}

fn cell_content(item: &LauncherItem) -> CellContent {
    match item {
        LauncherItem::App(app) => CellContent::App {
            label: app.label.clone(),
            icon: app.icon,
        },
        LauncherItem::Folder(folder) => CellContent::Folder {
            name: folder.name.clone(),
            preview: folder.apps.iter().take(FOLDER_PREVIEW_SIZE).map(|app| app.icon).collect(),
        },
        LauncherItem::Widget(widget_id) => CellContent::Widget { widget_id: *widget_id },
        LauncherItem::WidgetStack(stack) => CellContent::WidgetStack {
            widget_ids: stack.to_vec(),
        },
    }
}

/// Coalesces the matcher's character indices into contiguous `(start, end)` runs.
fn highlight_ranges(matcher: &SkimMatcherV2, text: &str, query: &str) -> Vec<(usize, usize)> {
    let Some((_, indices)) = matcher.fuzzy_indices(text, query) else {
        return Vec::new();
    };
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for index in indices {
        match ranges.last_mut() {
            Some((_, end)) if *end == index => *end += 1,
            _ => ranges.push((index, index + 1)),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FolderInfo;

    fn state_with(items: Vec<LauncherItem>) -> AppState {
        let mut state = AppState::new(&Config::default());
        state.store.replace_all(items);
        state
    }

    #[test]
    fn search_requires_every_token() {
        let mut state = AppState::new(&Config::default());
        state.installed_apps = vec![
            AppRef::new("Google Maps", "maps"),
            AppRef::new("Google Mail", "mail"),
            AppRef::new("Camera", "camera"),
        ];
        state.search_query = "goo map".to_string();
        state.apply_search_filter();

        let packages: Vec<&str> = state.search_results.iter().map(|a| a.package_name.as_str()).collect();
        assert_eq!(packages, vec!["maps"]);
    }

    #[test]
    fn empty_query_has_no_results() {
        let mut state = AppState::new(&Config::default());
        state.installed_apps = vec![AppRef::new("Camera", "camera")];
        state.search_query = "   ".to_string();
        state.apply_search_filter();
        assert!(state.search_results.is_empty());
    }

    #[test]
    fn highlight_ranges_are_coalesced() {
        let matcher = SkimMatcherV2::default();
        assert_eq!(highlight_ranges(&matcher, "Camera", "cam"), vec![(0, 3)]);
    }

    #[test]
    fn viewmodel_lays_out_four_columns() {
        let items = (0..5)
            .map(|i| LauncherItem::App(AppRef::new(format!("{i}"), format!("p{i}"))))
            .collect();
        let vm = state_with(items).compute_viewmodel();

        let positions: Vec<(usize, usize)> = vm.cells.iter().map(|c| (c.cell.row, c.cell.column)).collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (0, 2), (0, 3), (1, 0)]);
        assert!(!vm.remove_target_visible);
        assert!(vm.drag.is_none());
    }

    #[test]
    fn deleted_folder_is_collapsed_on_prune() {
        let folder = FolderInfo::new(vec![AppRef::new("A", "a")]);
        let id = folder.id.clone();
        let mut state = state_with(vec![LauncherItem::Folder(folder)]);
        assert!(state.expand_folder(&id));

        state.store.replace_all(vec![]);
        state.prune_stale_state();
        assert!(state.expanded_folder.is_none());
        assert!(state.compute_viewmodel().folder.is_none());
    }
}
