//! Placement policy: what a finished drag does to the item list.
//!
//! Planning is pure. [`plan_drop`] reads the final drag session, the live geometry
//! and the current store and returns a [`Placement`]; [`Placement::apply`] performs
//! it. Rules are checked in order and the first one that matches wins:
//!
//! 1. the dragged centre is over the remove target
//! 2. the centre is over another item (folder creation, folder append, stacking)
//! 3. otherwise the item is reinserted next to its nearest neighbour
//!
//! Widgets are inserted at a packed index so they never straddle a row break.

use kurbo::{Point, Rect};

use super::geometry::GeometryIndex;
use super::packing::{column_span, packed_index, WidgetMetrics, GRID_COLUMNS};
use super::session::{DragLayer, DragSession, DragSubject};
use crate::domain::{ItemKey, ItemStore, LauncherItem, WidgetId, WidgetProvider};

/// Everything the policy may look at besides the session itself.
#[derive(Debug, Clone, Copy)]
pub struct DropContext<'a> {
    pub store: &'a ItemStore,
    pub home: &'a GeometryIndex<ItemKey>,
    pub folder: &'a GeometryIndex<ItemKey>,
    pub remove_target: Option<Rect>,
    pub metrics: &'a WidgetMetrics,
}

/// A single edit to the item list.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    None,
    Remove {
        key: ItemKey,
    },
    RemoveFromFolder {
        folder_id: String,
        package_name: String,
    },
    /// Reinsert a home item before the item currently at `to_index`.
    Move {
        key: ItemKey,
        to_index: usize,
    },
    CreateFolder {
        dragged: ItemKey,
        target: ItemKey,
    },
    AddToFolder {
        app: ItemKey,
        folder_id: String,
    },
    StackWidgets {
        dragged: ItemKey,
        target: ItemKey,
    },
    FolderToHome {
        folder_id: String,
        package_name: String,
        to_index: usize,
    },
    FolderToApp {
        folder_id: String,
        package_name: String,
        target_package: String,
    },
    BetweenFolders {
        from_folder: String,
        to_folder: String,
        package_name: String,
    },
    ReorderInFolder {
        folder_id: String,
        from: usize,
        to: usize,
    },
    /// A new widget should be bound and then inserted at `to_index`.
    InsertWidget {
        provider: WidgetProvider,
        to_index: usize,
    },
}

/// Result of applying a placement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    pub changed: bool,
    /// Widget ids that left the grid and should be released by the host.
    pub released_widgets: Vec<WidgetId>,
}

impl Applied {
    const fn changed(changed: bool) -> Self {
        Self {
            changed,
            released_widgets: Vec::new(),
        }
    }
}

impl Placement {
    /// Applies this placement to `store`. Stale keys make it a no-op.
    ///
    /// [`Placement::InsertWidget`] is never applied here: the widget id only exists
    /// once the host has bound it, after which the caller inserts it with
    /// [`ItemStore::insert_widget`].
    pub fn apply(&self, store: &mut ItemStore) -> Applied {
        match self {
            Self::None | Self::InsertWidget { .. } => Applied::default(),
            Self::Remove { key } => match store.remove_item(key) {
                Some(item) => Applied {
                    changed: true,
                    released_widgets: item.widget_ids(),
                },
                None => Applied::default(),
            },
            Self::RemoveFromFolder {
                folder_id,
                package_name,
            } => Applied::changed(store.remove_app_from_folder(folder_id, package_name).is_some()),
            Self::Move { key, to_index } => Applied::changed(store.move_item(key, *to_index)),
            Self::CreateFolder { dragged, target } => Applied::changed(store.create_folder(dragged, target).is_some()),
            Self::AddToFolder { app, folder_id } => Applied::changed(store.add_to_folder(app, folder_id)),
            Self::StackWidgets { dragged, target } => Applied::changed(store.stack_widgets(dragged, target)),
            Self::FolderToHome {
                folder_id,
                package_name,
                to_index,
            } => Applied::changed(store.move_app_from_folder_to_home(folder_id, package_name, *to_index)),
            Self::FolderToApp {
                folder_id,
                package_name,
                target_package,
            } => Applied::changed(
                store
                    .move_app_from_folder_to_app(folder_id, package_name, target_package)
                    .is_some(),
            ),
            Self::BetweenFolders {
                from_folder,
                to_folder,
                package_name,
            } => Applied::changed(store.move_app_between_folders(from_folder, to_folder, package_name)),
            Self::ReorderInFolder { folder_id, from, to } => {
                Applied::changed(store.reorder_in_folder(folder_id, *from, *to))
            }
        }
    }
}

/// Decides what the drag described by `session` does when released.
#[must_use]
pub fn plan_drop(session: &DragSession, ctx: &DropContext<'_>) -> Placement {
    let center = session.center();
    let placement = match session.subject() {
        DragSubject::HomeItem(key) => plan_home_drop(key, center, ctx),
        DragSubject::FolderApp {
            folder_id,
            package_name,
        } => plan_folder_app_drop(folder_id, package_name, session.layer(), center, ctx),
        DragSubject::NewWidget { provider } => plan_new_widget_drop(provider, center, ctx),
    };
    tracing::debug!(?placement, x = center.x, y = center.y, "planned drop");
    placement
}

fn over_remove_target(center: Point, ctx: &DropContext<'_>) -> bool {
    ctx.remove_target.is_some_and(|rect| rect.contains(center))
}

/// Index to insert at, counted against the full list, next to the item nearest
/// `center` in `index`.
fn nearest_insertion(center: Point, exclude: Option<&ItemKey>, ctx: &DropContext<'_>) -> Option<usize> {
    let nearest = ctx.home.nearest(center, exclude)?;
    let position = ctx.store.position(&nearest.key)?;
    Some(position + usize::from(nearest.insert_after))
}

fn plan_home_drop(key: &ItemKey, center: Point, ctx: &DropContext<'_>) -> Placement {
    let Some(dragged) = ctx.store.get(key) else {
        return Placement::None;
    };
    if over_remove_target(center, ctx) {
        return Placement::Remove { key: key.clone() };
    }

    let target = ctx
        .home
        .hit(center, Some(key))
        .and_then(|target| ctx.store.get(target).map(|item| (target, item)));
    if let Some((target_key, target_item)) = target {
        match (dragged, target_item) {
            (LauncherItem::App(_), LauncherItem::App(_)) => {
                return Placement::CreateFolder {
                    dragged: key.clone(),
                    target: target_key.clone(),
                };
            }
            (LauncherItem::App(_), LauncherItem::Folder(folder)) => {
                return Placement::AddToFolder {
                    app: key.clone(),
                    folder_id: folder.id.clone(),
                };
            }
            (dragged, target) if dragged.is_widget_like() && target.is_widget_like() => {
                return Placement::StackWidgets {
                    dragged: key.clone(),
                    target: target_key.clone(),
                };
            }
            _ => {}
        }
    }

    let Some(candidate) = nearest_insertion(center, Some(key), ctx) else {
        return Placement::None;
    };
    let to_index = if dragged.is_widget_like() {
        packed_move_index(key, dragged, candidate, ctx)
    } else {
        candidate
    };
    Placement::Move {
        key: key.clone(),
        to_index,
    }
}

/// Packs a widget move. Packing is computed on the list without the dragged item and
/// translated back to the before-removal index [`ItemStore::move_item`] expects.
fn packed_move_index(key: &ItemKey, dragged: &LauncherItem, candidate: usize, ctx: &DropContext<'_>) -> usize {
    let Some(from) = ctx.store.position(key) else {
        return candidate;
    };
    let mut remaining: Vec<LauncherItem> = ctx.store.items().to_vec();
    remaining.remove(from);
    let spans = ctx.metrics.spans(&remaining);

    let candidate_after_removal = if candidate > from { candidate - 1 } else { candidate };
    let packed = packed_index(&spans, candidate_after_removal, ctx.metrics.span_of(dragged), GRID_COLUMNS);
    if packed >= from {
        packed + 1
    } else {
        packed
    }
}

fn plan_folder_app_drop(
    folder_id: &str,
    package_name: &str,
    layer: DragLayer,
    center: Point,
    ctx: &DropContext<'_>,
) -> Placement {
    let Some(folder) = ctx.store.folder(folder_id) else {
        return Placement::None;
    };
    let Some(from) = folder.index_of(package_name) else {
        return Placement::None;
    };
    if over_remove_target(center, ctx) {
        return Placement::RemoveFromFolder {
            folder_id: folder_id.to_string(),
            package_name: package_name.to_string(),
        };
    }

    if layer == DragLayer::Folder {
        let own_key = ItemKey::App(package_name.to_string());
        let Some(nearest) = ctx.folder.nearest(center, Some(&own_key)) else {
            return Placement::None;
        };
        let Some(to) = nearest
            .key
            .package_name()
            .and_then(|package| folder.index_of(package))
        else {
            return Placement::None;
        };
        return Placement::ReorderInFolder {
            folder_id: folder_id.to_string(),
            from,
            to: to + usize::from(nearest.insert_after),
        };
    }

    match ctx.home.hit(center, None) {
        Some(ItemKey::App(target_package)) => Placement::FolderToApp {
            folder_id: folder_id.to_string(),
            package_name: package_name.to_string(),
            target_package: target_package.clone(),
        },
        Some(ItemKey::Folder(to_folder)) if to_folder != folder_id => Placement::BetweenFolders {
            from_folder: folder_id.to_string(),
            to_folder: to_folder.clone(),
            package_name: package_name.to_string(),
        },
        Some(_) => Placement::None,
        None => Placement::FolderToHome {
            folder_id: folder_id.to_string(),
            package_name: package_name.to_string(),
            to_index: nearest_insertion(center, None, ctx).unwrap_or(ctx.store.len()),
        },
    }
}

fn plan_new_widget_drop(provider: &WidgetProvider, center: Point, ctx: &DropContext<'_>) -> Placement {
    if over_remove_target(center, ctx) {
        return Placement::None;
    }
    let candidate = nearest_insertion(center, None, ctx).unwrap_or(ctx.store.len());
    let spans = ctx.metrics.spans(ctx.store.items());
    Placement::InsertWidget {
        provider: provider.clone(),
        to_index: packed_index(&spans, candidate, column_span(provider.min_width_dp), GRID_COLUMNS),
    }
}
