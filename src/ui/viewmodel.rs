//! Renderable snapshot of the home screen.
//!
//! Built by [`AppState::compute_viewmodel`](crate::app::AppState::compute_viewmodel).
//! A renderer only reads these values; all placement decisions have already been
//! made, down to the row, column and span of each cell.

use kurbo::Rect;

use crate::app::Overlay;
use crate::domain::{GestureMode, IconHandle, ItemKey, WidgetId};
use crate::drag::GridCell;

#[derive(Debug, Clone, PartialEq)]
pub struct HomeViewModel {
    pub cells: Vec<CellView>,

    /// The expanded folder, if any.
    pub folder: Option<FolderView>,

    /// The floating copy of the dragged item.
    pub drag: Option<DragView>,

    /// The remove drop target is only shown while a drag is active.
    pub remove_target_visible: bool,

    pub overlay: Overlay,

    /// Present while a search query is entered.
    pub search: Option<SearchView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub key: ItemKey,
    pub cell: GridCell,
    pub content: CellContent,

    /// The item has gestures bound to it.
    pub has_gesture_badge: bool,

    /// The dragged item's centre is over this cell.
    pub is_drop_target: bool,

    /// This cell is the source of the active drag and is drawn as a placeholder.
    pub is_dragged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    App {
        label: String,
        icon: Option<IconHandle>,
    },
    Folder {
        name: String,
        /// Icons of the first few apps, for the folder preview.
        preview: Vec<Option<IconHandle>>,
    },
    Widget {
        widget_id: WidgetId,
    },
    WidgetStack {
        widget_ids: Vec<WidgetId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderView {
    pub folder_id: String,
    pub name: String,
    pub gesture_mode: GestureMode,
    pub apps: Vec<FolderAppView>,

    /// Hidden while an app dragged out of the folder is over the home grid.
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderAppView {
    pub label: String,
    pub package_name: String,
    pub icon: Option<IconHandle>,
    pub has_gesture_badge: bool,
    pub is_dragged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragView {
    pub bounds: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    pub query: String,
    pub results: Vec<SearchResultView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultView {
    pub label: String,
    pub package_name: String,

    /// Matched character ranges of `label`, as `(start, end)` with `end` exclusive.
    pub highlight_ranges: Vec<(usize, usize)>,
}
