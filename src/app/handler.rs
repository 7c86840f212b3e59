//! Event handling and state transitions.
//!
//! [`handle_event`] is the only way state changes. It takes one [`Event`] from the
//! host (pointer input, layout reports, worker responses, menu choices), updates
//! [`AppState`] and returns whether the screen needs redrawing plus the [`Action`]s
//! the host must carry out.
//!
//! ```text
//! pointer events → GestureRecognizer → Resolver → outcomes ┐
//! other events ────────────────────────────────────────────┴→ AppState → Actions
//!                                      ↑                                   ↓
//!                                      └──────── worker responses ─────────┘
//! ```
//!
//! Pointer times are caller-supplied milliseconds. Deferred taps and long presses
//! fire on the next pointer event or [`Event::Tick`] at or after their deadline.

use kurbo::{Point, Rect, Vec2};

use super::gestures::{Outcome, Resolver, TouchTarget};
use super::modes::{Overlay, ShortcutsMenu};
use super::{Action, AppState};
use crate::domain::error::Result;
use crate::domain::{
    AppRef, BindingScope, GestureAction, GestureDirection, ItemKey, WidgetId, WidgetProvider,
};
use crate::drag::{plan_drop, DragLayer, DragSubject, Placement};
use crate::infrastructure::{Shortcut, ShortcutError};
use crate::input::GestureRecognizer;
use crate::worker::{LoadSource, WorkerResponse};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PointerDown {
        target: TouchTarget,
        position: Point,
        time_ms: u64,
    },
    PointerMove {
        position: Point,
        time_ms: u64,
    },
    PointerUp {
        position: Point,
        time_ms: u64,
    },
    /// The pointer sequence was taken away, e.g. by a parent scroll container.
    PointerLost {
        time_ms: u64,
    },
    /// Time passed without pointer input. Fires due taps and long presses.
    Tick {
        time_ms: u64,
    },

    /// A home grid cell was laid out at `bounds`.
    ItemLaidOut {
        key: ItemKey,
        bounds: Rect,
    },
    /// An app inside the expanded folder was laid out at `bounds`.
    FolderAppLaidOut {
        package_name: String,
        bounds: Rect,
    },
    FolderContentLaidOut {
        bounds: Option<Rect>,
    },
    RemoveTargetLaidOut {
        bounds: Option<Rect>,
    },
    /// The widget host reported the minimum width of a bound widget.
    WidgetMeasured {
        widget_id: WidgetId,
        min_width_dp: f64,
    },

    /// The platform's list of launchable apps. Triggers a load of persisted state.
    AppsLoaded {
        apps: Vec<AppRef>,
    },
    Worker(WorkerResponse),
    ShortcutsLoaded {
        package_name: String,
        result: std::result::Result<Vec<Shortcut>, ShortcutError>,
    },

    DismissOverlay,
    SelectShortcut {
        package_name: String,
        shortcut_id: String,
    },
    OpenGestureConfig {
        scope: BindingScope,
    },
    SetGestureBinding {
        scope: BindingScope,
        direction: GestureDirection,
        action: Option<GestureAction>,
    },
    ClearGestureBindings {
        scope: BindingScope,
    },
    ToggleFolderGestureMode {
        folder_id: String,
    },
    StartRenameFolder {
        folder_id: String,
    },
    RenameFolder {
        folder_id: String,
        name: String,
    },
    CollapseFolder,
    OpenWidgetPicker,
    OpenSettings,

    /// A widget was picked up from the widget picker with its preview at `bounds`.
    NewWidgetDragStart {
        provider: WidgetProvider,
        bounds: Rect,
    },
    NewWidgetDrag {
        delta: Vec2,
    },
    NewWidgetDragEnd,
    NewWidgetDragCancel,
    WidgetBound {
        widget_id: WidgetId,
        to_index: usize,
        min_width_dp: f64,
    },
    WidgetBindCancelled {
        widget_id: WidgetId,
    },

    Search {
        query: String,
    },
    SelectSearchResult {
        package_name: String,
    },
}

impl Event {
    const fn name(&self) -> &'static str {
        match self {
            Self::PointerDown { .. } => "pointer_down",
            Self::PointerMove { .. } => "pointer_move",
            Self::PointerUp { .. } => "pointer_up",
            Self::PointerLost { .. } => "pointer_lost",
            Self::Tick { .. } => "tick",
            Self::ItemLaidOut { .. } => "item_laid_out",
            Self::FolderAppLaidOut { .. } => "folder_app_laid_out",
            Self::FolderContentLaidOut { .. } => "folder_content_laid_out",
            Self::RemoveTargetLaidOut { .. } => "remove_target_laid_out",
            Self::WidgetMeasured { .. } => "widget_measured",
            Self::AppsLoaded { .. } => "apps_loaded",
            Self::Worker(_) => "worker",
            Self::ShortcutsLoaded { .. } => "shortcuts_loaded",
            Self::DismissOverlay => "dismiss_overlay",
            Self::SelectShortcut { .. } => "select_shortcut",
            Self::OpenGestureConfig { .. } => "open_gesture_config",
            Self::SetGestureBinding { .. } => "set_gesture_binding",
            Self::ClearGestureBindings { .. } => "clear_gesture_bindings",
            Self::ToggleFolderGestureMode { .. } => "toggle_folder_gesture_mode",
            Self::StartRenameFolder { .. } => "start_rename_folder",
            Self::RenameFolder { .. } => "rename_folder",
            Self::CollapseFolder => "collapse_folder",
            Self::OpenWidgetPicker => "open_widget_picker",
            Self::OpenSettings => "open_settings",
            Self::NewWidgetDragStart { .. } => "new_widget_drag_start",
            Self::NewWidgetDrag { .. } => "new_widget_drag",
            Self::NewWidgetDragEnd => "new_widget_drag_end",
            Self::NewWidgetDragCancel => "new_widget_drag_cancel",
            Self::WidgetBound { .. } => "widget_bound",
            Self::WidgetBindCancelled { .. } => "widget_bind_cancelled",
            Self::Search { .. } => "search",
            Self::SelectSearchResult { .. } => "select_search_result",
        }
    }
}

type Handled = Result<(bool, Vec<Action>)>;

/// Processes one event. Returns whether the screen needs redrawing and the actions
/// to execute, in order.
///
/// # Errors
///
/// Currently infallible; the `Result` leaves room for handlers that can fail.
///
/// # Examples
///
/// ```
/// use arc_launcher::app::{handle_event, Action, AppState, Event};
/// use arc_launcher::domain::AppRef;
/// use arc_launcher::Config;
///
/// let mut state = AppState::new(&Config::default());
/// let (_, actions) = handle_event(
///     &mut state,
///     &Event::AppsLoaded { apps: vec![AppRef::new("Camera", "com.camera")] },
/// )?;
/// assert!(matches!(actions[0], Action::PostToWorker(_)));
/// # Ok::<(), arc_launcher::LauncherError>(())
/// ```
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event) -> Handled {
    let _span = tracing::debug_span!("handle_event", event_type = event.name()).entered();

    match event {
        Event::PointerDown {
            target,
            position,
            time_ms,
        } => drive_recognizer(state, |recognizer, resolver| {
            recognizer.on_down(target.clone(), *position, *time_ms, resolver);
        }),
        Event::PointerMove { position, time_ms } => drive_recognizer(state, |recognizer, resolver| {
            recognizer.on_move(*position, *time_ms, resolver);
        }),
        Event::PointerUp { position, time_ms } => drive_recognizer(state, |recognizer, resolver| {
            recognizer.on_up(*position, *time_ms, resolver);
        }),
        Event::PointerLost { time_ms } => drive_recognizer(state, |recognizer, resolver| {
            recognizer.on_lost(*time_ms, resolver);
        }),
        Event::Tick { time_ms } => drive_recognizer(state, |recognizer, resolver| {
            recognizer.advance(*time_ms, resolver);
        }),

        Event::ItemLaidOut { key, bounds } => {
            state.home_geometry.update(key.clone(), *bounds);
            Ok((false, vec![]))
        }
        Event::FolderAppLaidOut { package_name, bounds } => {
            if state.expanded_folder.is_some() {
                state.folder_geometry.update(ItemKey::App(package_name.clone()), *bounds);
            }
            Ok((false, vec![]))
        }
        Event::FolderContentLaidOut { bounds } => {
            state.folder_content = *bounds;
            Ok((false, vec![]))
        }
        Event::RemoveTargetLaidOut { bounds } => {
            state.remove_target = *bounds;
            Ok((false, vec![]))
        }
        Event::WidgetMeasured {
            widget_id,
            min_width_dp,
        } => {
            state.widget_metrics.record(*widget_id, *min_width_dp);
            Ok((true, vec![]))
        }

        Event::AppsLoaded { apps } => {
            tracing::debug!(app_count = apps.len(), "installed apps loaded");
            state.installed_apps.clone_from(apps);
            state.apply_search_filter();
            Ok((false, vec![state.load_state_action()]))
        }
        Event::Worker(response) => handle_worker_response(state, response),
        Event::ShortcutsLoaded { package_name, result } => {
            let Overlay::Shortcuts {
                package_name: open_for,
                menu,
            } = &mut state.overlay
            else {
                return Ok((false, vec![]));
            };
            if *open_for != *package_name {
                tracing::debug!(package_name = %package_name, "stale shortcut result ignored");
                return Ok((false, vec![]));
            }
            *menu = match result {
                Ok(shortcuts) => ShortcutsMenu::Loaded(shortcuts.clone()),
                Err(ShortcutError::PermissionDenied) => ShortcutsMenu::PermissionRequired,
                Err(e) => {
                    tracing::debug!(error = %e, "shortcut query failed");
                    ShortcutsMenu::Loaded(vec![])
                }
            };
            Ok((true, vec![]))
        }

        Event::DismissOverlay => Ok((set_overlay(state, Overlay::None), vec![])),
        Event::SelectShortcut {
            package_name,
            shortcut_id,
        } => {
            state.overlay = Overlay::None;
            Ok((
                true,
                vec![Action::LaunchShortcut {
                    package_name: package_name.clone(),
                    shortcut_id: shortcut_id.clone(),
                }],
            ))
        }
        Event::OpenGestureConfig { scope } => Ok((
            set_overlay(state, Overlay::GestureConfig { scope: scope.clone() }),
            vec![],
        )),
        Event::SetGestureBinding {
            scope,
            direction,
            action,
        } => {
            if state.bindings.set(scope, *direction, action.clone()) {
                tracing::debug!(key = %scope.key(*direction), bound = action.is_some(), "gesture binding changed");
                Ok((true, vec![state.save_bindings_action()]))
            } else {
                Ok((false, vec![]))
            }
        }
        Event::ClearGestureBindings { scope } => {
            let removed = state.bindings.clear_scope(scope);
            tracing::debug!(prefix = %scope.prefix(), removed, "gesture bindings cleared");
            if removed == 0 {
                Ok((false, vec![]))
            } else {
                Ok((true, vec![state.save_bindings_action()]))
            }
        }
        Event::ToggleFolderGestureMode { folder_id } => match state.store.toggle_gesture_mode(folder_id) {
            Some(mode) => {
                tracing::debug!(folder_id = %folder_id, ?mode, "folder gesture mode changed");
                Ok((true, vec![state.save_items_action()]))
            }
            None => Ok((false, vec![])),
        },
        Event::StartRenameFolder { folder_id } => {
            if state.store.folder(folder_id).is_none() {
                return Ok((false, vec![]));
            }
            Ok((
                set_overlay(
                    state,
                    Overlay::FolderRename {
                        folder_id: folder_id.clone(),
                    },
                ),
                vec![],
            ))
        }
        Event::RenameFolder { folder_id, name } => {
            state.overlay = Overlay::None;
            let name = name.trim();
            if !name.is_empty() && state.store.rename_folder(folder_id, name) {
                Ok((true, vec![state.save_items_action()]))
            } else {
                Ok((true, vec![]))
            }
        }
        Event::CollapseFolder => Ok((state.collapse_folder(), vec![])),
        Event::OpenWidgetPicker => Ok((set_overlay(state, Overlay::WidgetPicker), vec![])),
        Event::OpenSettings => {
            state.overlay = Overlay::None;
            Ok((true, vec![Action::OpenSettings]))
        }

        Event::NewWidgetDragStart { provider, bounds } => {
            let subject = DragSubject::NewWidget {
                provider: provider.clone(),
            };
            if !state.drag.start_drag(subject, *bounds) {
                return Ok((false, vec![]));
            }
            state.overlay = Overlay::None;
            Ok((true, vec![Action::SetScrollEnabled(false)]))
        }
        Event::NewWidgetDrag { delta } => Ok((drag_moved(state, *delta), vec![])),
        Event::NewWidgetDragEnd => {
            let mut actions = vec![];
            let render = finish_drag(state, &mut actions);
            Ok((render, actions))
        }
        Event::NewWidgetDragCancel => {
            let mut actions = vec![];
            let render = abort_drag(state, &mut actions);
            Ok((render, actions))
        }
        Event::WidgetBound {
            widget_id,
            to_index,
            min_width_dp,
        } => {
            state.widget_metrics.record(*widget_id, *min_width_dp);
            if state.store.insert_widget(*to_index, *widget_id) {
                tracing::debug!(widget_id, to_index, "widget added");
                Ok((true, vec![state.save_items_action()]))
            } else {
                state.widget_metrics.forget(*widget_id);
                Ok((false, vec![Action::ReleaseWidgetId { widget_id: *widget_id }]))
            }
        }
        Event::WidgetBindCancelled { widget_id } => {
            Ok((false, vec![Action::ReleaseWidgetId { widget_id: *widget_id }]))
        }

        Event::Search { query } => {
            if &state.search_query == query {
                return Ok((false, vec![]));
            }
            state.search_query.clone_from(query);
            state.apply_search_filter();
            Ok((true, vec![]))
        }
        Event::SelectSearchResult { package_name } => {
            state.clear_search();
            Ok((
                true,
                vec![Action::LaunchApp {
                    package_name: package_name.clone(),
                }],
            ))
        }
    }
}

fn set_overlay(state: &mut AppState, overlay: Overlay) -> bool {
    if state.overlay == overlay {
        return false;
    }
    state.overlay = overlay;
    true
}

/// Runs one recognizer entry point and applies the outcomes it produced.
fn drive_recognizer(
    state: &mut AppState,
    call: impl FnOnce(&mut GestureRecognizer<TouchTarget>, &mut Resolver<'_>),
) -> Handled {
    let outcomes = {
        let mut resolver = Resolver::new(&state.store, &state.bindings);
        call(&mut state.recognizer, &mut resolver);
        resolver.into_outcomes()
    };

    let mut render = false;
    let mut actions = vec![];
    for outcome in outcomes {
        render |= apply_outcome(state, outcome, &mut actions);
    }
    Ok((render, actions))
}

fn apply_outcome(state: &mut AppState, outcome: Outcome, actions: &mut Vec<Action>) -> bool {
    tracing::debug!(?outcome, "gesture outcome");
    match outcome {
        Outcome::Tap(target) => on_tap(state, target, actions),
        Outcome::Invoke(action) => {
            actions.push(match action {
                GestureAction::LaunchApp { package_name } => Action::LaunchApp { package_name },
                GestureAction::LaunchShortcut {
                    package_name,
                    shortcut_id,
                } => Action::LaunchShortcut {
                    package_name,
                    shortcut_id,
                },
            });
            false
        }
        Outcome::LongPress(target) => on_long_press(state, target, actions),
        Outcome::DragStart(target) => {
            if start_drag(state, &target) {
                state.overlay = Overlay::None;
                actions.push(Action::SetScrollEnabled(false));
                true
            } else {
                tracing::debug!(?target, "nothing to drag, cancelling gesture");
                let mut resolver = Resolver::new(&state.store, &state.bindings);
                state.recognizer.cancel(&mut resolver);
                false
            }
        }
        Outcome::Drag(delta) => drag_moved(state, delta),
        Outcome::DragEnd => finish_drag(state, actions),
        Outcome::DragCancel => abort_drag(state, actions),
    }
}

fn on_tap(state: &mut AppState, target: TouchTarget, actions: &mut Vec<Action>) -> bool {
    match target {
        TouchTarget::Item(ItemKey::App(package_name)) => {
            actions.push(Action::LaunchApp { package_name });
            false
        }
        TouchTarget::Item(ItemKey::Folder(folder_id)) => state.expand_folder(&folder_id),
        TouchTarget::FolderApp { package_name, .. } => {
            actions.push(Action::LaunchApp { package_name });
            state.collapse_folder()
        }
        TouchTarget::Item(ItemKey::Widget(_) | ItemKey::WidgetStack(_)) => false,
        TouchTarget::Background => {
            let dismissed = set_overlay(state, Overlay::None);
            state.collapse_folder() || dismissed
        }
    }
}

fn on_long_press(state: &mut AppState, target: TouchTarget, actions: &mut Vec<Action>) -> bool {
    let overlay = match target {
        TouchTarget::Item(ItemKey::App(package_name)) | TouchTarget::FolderApp { package_name, .. } => {
            actions.push(Action::QueryShortcuts {
                package_name: package_name.clone(),
            });
            Overlay::Shortcuts {
                package_name,
                menu: ShortcutsMenu::Loading,
            }
        }
        TouchTarget::Item(ItemKey::Folder(folder_id)) => Overlay::FolderMenu { folder_id },
        TouchTarget::Item(ItemKey::Widget(_) | ItemKey::WidgetStack(_)) => return false,
        TouchTarget::Background => Overlay::HomeMenu,
    };
    set_overlay(state, overlay)
}

fn start_drag(state: &mut AppState, target: &TouchTarget) -> bool {
    let (subject, origin) = match target {
        TouchTarget::Item(key) => (DragSubject::HomeItem(key.clone()), state.home_geometry.get(key)),
        TouchTarget::FolderApp {
            folder_id,
            package_name,
        } => (
            DragSubject::FolderApp {
                folder_id: folder_id.clone(),
                package_name: package_name.clone(),
            },
            state.folder_geometry.get(&ItemKey::App(package_name.clone())),
        ),
        TouchTarget::Background => return false,
    };
    let Some(origin) = origin else {
        return false;
    };
    state.drag.start_drag(subject, origin)
}

/// Moves the dragged item and refreshes the drop target from the live geometry of
/// whichever layer the drag is over.
fn drag_moved(state: &mut AppState, delta: Vec2) -> bool {
    if state.drag.accumulate(delta).is_none() {
        return false;
    }
    let layer = state.drag.track_folder_boundary(state.folder_content);
    let index = if layer == Some(DragLayer::Folder) {
        &state.folder_geometry
    } else {
        &state.home_geometry
    };
    state.drag.compute_drop_target(index);
    true
}

fn finish_drag(state: &mut AppState, actions: &mut Vec<Action>) -> bool {
    let Some(session) = state.drag.end_drag() else {
        return false;
    };
    actions.push(Action::SetScrollEnabled(true));

    let placement = plan_drop(&session, &state.drop_context());
    if let Placement::InsertWidget { provider, to_index } = &placement {
        actions.push(Action::BindWidget {
            provider: provider.clone(),
            to_index: *to_index,
        });
    } else {
        let applied = placement.apply(&mut state.store);
        for widget_id in applied.released_widgets {
            state.widget_metrics.forget(widget_id);
            actions.push(Action::ReleaseWidgetId { widget_id });
        }
        if applied.changed {
            actions.push(state.save_items_action());
        }
    }

    if matches!(session.subject(), DragSubject::FolderApp { .. }) && session.layer() == DragLayer::Home {
        state.collapse_folder();
    }
    state.prune_stale_state();
    true
}

/// Ends a drag without placing it. The store is only edited on drop, so there is
/// nothing to revert and nothing to reload: edits made after the cancel must stand.
fn abort_drag(state: &mut AppState, actions: &mut Vec<Action>) -> bool {
    let Some(session) = state.drag.cancel_drag() else {
        return false;
    };
    tracing::debug!(subject = ?session.subject(), "drag cancelled");
    actions.push(Action::SetScrollEnabled(true));
    true
}

fn handle_worker_response(state: &mut AppState, response: &WorkerResponse) -> Handled {
    match response {
        WorkerResponse::StateLoaded {
            items,
            bindings,
            source,
        } => {
            tracing::debug!(item_count = items.len(), ?source, "launcher state received");
            state.store.replace_all(items.clone());
            state.bindings.clone_from(bindings);
            state.loaded = true;
            state.prune_stale_state();

            let mut actions = vec![];
            if *source == LoadSource::Synthesized {
                actions.push(state.save_items_action());
            }
            Ok((true, actions))
        }
        WorkerResponse::ItemsSaved { count } => {
            tracing::debug!(count, "items persisted");
            Ok((false, vec![]))
        }
        WorkerResponse::GestureBindingsSaved { count } => {
            tracing::debug!(count, "gesture bindings persisted");
            Ok((false, vec![]))
        }
        WorkerResponse::Error { message } => {
            tracing::error!(message = %message, "worker error");
            Ok((false, vec![]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FolderInfo, GestureBindings, LauncherItem};
    use crate::worker::WorkerMessage;
    use crate::Config;

    const CELL: f64 = 100.0;

    fn app(package: &str) -> LauncherItem {
        LauncherItem::App(AppRef::new(package.to_uppercase(), package))
    }

    fn key(package: &str) -> ItemKey {
        ItemKey::App(package.to_string())
    }

    fn loaded(items: Vec<LauncherItem>) -> AppState {
        let mut state = AppState::new(&Config::default());
        let response = WorkerResponse::StateLoaded {
            items,
            bindings: GestureBindings::new(),
            source: LoadSource::Saved,
        };
        handle_event(&mut state, &Event::Worker(response)).unwrap();
        lay_out_row(&mut state);
        state
    }

    fn lay_out_row(state: &mut AppState) {
        let keys: Vec<ItemKey> = state.store.items().iter().map(LauncherItem::key).collect();
        for (i, key) in keys.into_iter().enumerate() {
            let x = i as f64 * CELL;
            let bounds = Rect::new(x, 0.0, x + CELL, CELL);
            handle_event(state, &Event::ItemLaidOut { key, bounds }).unwrap();
        }
    }

    fn run(state: &mut AppState, event: Event) -> Vec<Action> {
        handle_event(state, &event).unwrap().1
    }

    fn down(state: &mut AppState, target: TouchTarget, x: f64, y: f64, time_ms: u64) -> Vec<Action> {
        run(
            state,
            Event::PointerDown {
                target,
                position: Point::new(x, y),
                time_ms,
            },
        )
    }

    fn move_to(state: &mut AppState, x: f64, y: f64, time_ms: u64) -> Vec<Action> {
        run(
            state,
            Event::PointerMove {
                position: Point::new(x, y),
                time_ms,
            },
        )
    }

    fn up(state: &mut AppState, x: f64, y: f64, time_ms: u64) -> Vec<Action> {
        run(
            state,
            Event::PointerUp {
                position: Point::new(x, y),
                time_ms,
            },
        )
    }

    fn launch(package: &str) -> Action {
        Action::LaunchApp {
            package_name: package.to_string(),
        }
    }

    fn is_save_items(action: &Action) -> bool {
        matches!(action, Action::PostToWorker(WorkerMessage::SaveItems { .. }))
    }

    fn is_load_state(action: &Action) -> bool {
        matches!(action, Action::PostToWorker(WorkerMessage::LoadState { .. }))
    }

    /// Long-presses `package` and drags it until the pointer is at `(x, 50)`.
    fn drag_app_to(state: &mut AppState, package: &str, start_x: f64, x: f64) {
        down(state, TouchTarget::Item(key(package)), start_x, 50.0, 0);
        run(state, Event::Tick { time_ms: 500 });
        let actions = move_to(state, start_x + 10.0, 50.0, 600);
        assert_eq!(actions, vec![Action::SetScrollEnabled(false)]);
        move_to(state, x, 50.0, 700);
    }

    #[test]
    fn tap_launches_once_the_double_tap_window_has_passed() {
        let mut state = loaded(vec![app("a")]);
        let target = TouchTarget::Item(key("a"));

        assert!(down(&mut state, target, 50.0, 50.0, 0).is_empty());
        assert!(up(&mut state, 52.0, 50.0, 50).is_empty());
        assert!(run(&mut state, Event::Tick { time_ms: 349 }).is_empty());
        assert_eq!(run(&mut state, Event::Tick { time_ms: 350 }), vec![launch("a")]);
    }

    #[test]
    fn bound_double_tap_replaces_the_tap() {
        let mut state = loaded(vec![app("a")]);
        state.bindings.set(
            &BindingScope::app("a"),
            GestureDirection::DoubleTap,
            Some(GestureAction::LaunchShortcut {
                package_name: "b".to_string(),
                shortcut_id: "compose".to_string(),
            }),
        );
        let target = TouchTarget::Item(key("a"));

        down(&mut state, target.clone(), 50.0, 50.0, 0);
        up(&mut state, 50.0, 50.0, 50);
        down(&mut state, target, 50.0, 50.0, 100);
        let actions = up(&mut state, 50.0, 50.0, 150);
        assert_eq!(
            actions,
            vec![Action::LaunchShortcut {
                package_name: "b".to_string(),
                shortcut_id: "compose".to_string(),
            }]
        );
        assert!(run(&mut state, Event::Tick { time_ms: 1_000 }).is_empty());
    }

    #[test]
    fn short_movement_is_still_a_tap() {
        let mut state = loaded(vec![app("a")]);
        state.bindings.set(
            &BindingScope::app("a"),
            GestureDirection::Up,
            Some(GestureAction::LaunchApp {
                package_name: "x".to_string(),
            }),
        );

        down(&mut state, TouchTarget::Item(key("a")), 50.0, 50.0, 0);
        assert!(up(&mut state, 50.0, 10.0, 100).is_empty());
        assert_eq!(run(&mut state, Event::Tick { time_ms: 400 }), vec![launch("a")]);
    }

    #[test]
    fn swipe_on_default_folder_launches_matching_slot() {
        let apps = (0..9).map(|i| AppRef::new(format!("App {i}"), format!("p{i}"))).collect();
        let folder = FolderInfo::new(apps);
        let folder_id = folder.id.clone();
        let mut state = loaded(vec![LauncherItem::Folder(folder)]);

        down(&mut state, TouchTarget::Item(ItemKey::Folder(folder_id)), 50.0, 80.0, 0);
        assert_eq!(up(&mut state, 50.0, 20.0, 100), vec![launch("p1")]);
    }

    #[test]
    fn tapping_a_folder_expands_it() {
        let folder = FolderInfo::new(vec![AppRef::new("A", "a"), AppRef::new("B", "b")]);
        let folder_id = folder.id.clone();
        let mut state = loaded(vec![LauncherItem::Folder(folder)]);

        down(&mut state, TouchTarget::Item(ItemKey::Folder(folder_id.clone())), 50.0, 50.0, 0);
        up(&mut state, 50.0, 50.0, 50);
        let (render, _) = handle_event(&mut state, &Event::Tick { time_ms: 400 }).unwrap();
        assert!(render);
        assert_eq!(state.expanded_folder.as_deref(), Some(folder_id.as_str()));

        let target = TouchTarget::FolderApp {
            folder_id,
            package_name: "b".to_string(),
        };
        down(&mut state, target, 10.0, 10.0, 1_000);
        up(&mut state, 10.0, 10.0, 1_050);
        assert_eq!(run(&mut state, Event::Tick { time_ms: 1_400 }), vec![launch("b")]);
        assert_eq!(state.expanded_folder, None);
    }

    #[test]
    fn long_press_on_app_queries_shortcuts() {
        let mut state = loaded(vec![app("a")]);
        down(&mut state, TouchTarget::Item(key("a")), 50.0, 50.0, 0);
        let actions = run(&mut state, Event::Tick { time_ms: 500 });

        assert_eq!(
            actions,
            vec![Action::QueryShortcuts {
                package_name: "a".to_string()
            }]
        );
        assert_eq!(
            state.overlay,
            Overlay::Shortcuts {
                package_name: "a".to_string(),
                menu: ShortcutsMenu::Loading,
            }
        );
        assert!(up(&mut state, 50.0, 50.0, 600).is_empty());
    }

    #[test]
    fn shortcut_results_fill_the_open_menu_only() {
        let mut state = loaded(vec![app("a")]);
        state.overlay = Overlay::Shortcuts {
            package_name: "a".to_string(),
            menu: ShortcutsMenu::Loading,
        };

        let stale = Event::ShortcutsLoaded {
            package_name: "b".to_string(),
            result: Ok(vec![]),
        };
        assert!(!handle_event(&mut state, &stale).unwrap().0);

        let denied = Event::ShortcutsLoaded {
            package_name: "a".to_string(),
            result: Err(ShortcutError::PermissionDenied),
        };
        handle_event(&mut state, &denied).unwrap();
        assert!(matches!(
            state.overlay,
            Overlay::Shortcuts {
                menu: ShortcutsMenu::PermissionRequired,
                ..
            }
        ));
    }

    #[test]
    fn long_press_on_background_opens_home_menu_without_dragging() {
        let mut state = loaded(vec![app("a")]);
        down(&mut state, TouchTarget::Background, 350.0, 50.0, 0);
        run(&mut state, Event::Tick { time_ms: 500 });
        assert_eq!(state.overlay, Overlay::HomeMenu);

        assert!(move_to(&mut state, 450.0, 50.0, 600).is_empty());
        assert!(!state.drag.is_active());
        assert!(up(&mut state, 450.0, 50.0, 700).is_empty());
    }

    #[test]
    fn dragging_app_onto_app_creates_folder() {
        let mut state = loaded(vec![app("a"), app("b"), app("c")]);
        drag_app_to(&mut state, "a", 50.0, 150.0);
        assert_eq!(state.overlay, Overlay::None);

        let actions = up(&mut state, 150.0, 50.0, 800);
        assert_eq!(actions[0], Action::SetScrollEnabled(true));
        assert!(is_save_items(&actions[1]));

        let items = state.store.items();
        assert_eq!(items.len(), 2);
        let folder = items[0].as_folder().unwrap();
        let packages: Vec<&str> = folder.apps.iter().map(|app| app.package_name.as_str()).collect();
        assert_eq!(packages, vec!["b", "a"]);
        assert_eq!(items[1].key(), key("c"));
    }

    #[test]
    fn dropping_on_remove_target_releases_widgets() {
        let mut state = loaded(vec![app("a"), LauncherItem::Widget(7)]);
        let remove = Rect::new(0.0, 400.0, 300.0, 500.0);
        run(&mut state, Event::RemoveTargetLaidOut { bounds: Some(remove) });

        down(&mut state, TouchTarget::Item(ItemKey::Widget(7)), 150.0, 50.0, 0);
        run(&mut state, Event::Tick { time_ms: 500 });
        move_to(&mut state, 150.0, 60.0, 600);
        move_to(&mut state, 150.0, 450.0, 700);
        let actions = up(&mut state, 150.0, 450.0, 800);

        assert!(actions.contains(&Action::ReleaseWidgetId { widget_id: 7 }));
        assert!(actions.iter().any(is_save_items));
        assert_eq!(state.store.len(), 1);
    }

    #[test]
    fn lost_pointer_cancels_drag_once_without_reloading() {
        let mut state = loaded(vec![app("a"), app("b")]);
        drag_app_to(&mut state, "a", 50.0, 150.0);

        let actions = run(&mut state, Event::PointerLost { time_ms: 800 });
        assert_eq!(actions, vec![Action::SetScrollEnabled(true)]);
        assert!(!actions.iter().any(is_load_state));
        assert_eq!(state.store.len(), 2);

        assert!(run(&mut state, Event::PointerLost { time_ms: 900 }).is_empty());
    }

    #[test]
    fn rename_after_cancelled_drag_is_kept() {
        let folder = FolderInfo::new(vec![AppRef::new("A", "a"), AppRef::new("B", "b")]);
        let folder_id = folder.id.clone();
        let mut state = loaded(vec![LauncherItem::Folder(folder), app("c")]);

        drag_app_to(&mut state, "c", 150.0, 60.0);
        let cancelled = run(&mut state, Event::PointerLost { time_ms: 800 });
        assert!(!cancelled.iter().any(is_load_state));

        let renamed = run(
            &mut state,
            Event::RenameFolder {
                folder_id: folder_id.clone(),
                name: "Games".to_string(),
            },
        );
        assert!(renamed.iter().any(is_save_items));
        assert_eq!(state.store.folder(&folder_id).unwrap().name, "Games");
    }

    #[test]
    fn drag_without_geometry_is_abandoned() {
        let mut state = AppState::new(&Config::default());
        state.store.replace_all(vec![app("a")]);

        down(&mut state, TouchTarget::Item(key("a")), 50.0, 50.0, 0);
        run(&mut state, Event::Tick { time_ms: 500 });
        assert!(move_to(&mut state, 80.0, 50.0, 600).is_empty());
        assert!(!state.drag.is_active());
        assert!(up(&mut state, 80.0, 50.0, 700).is_empty());
    }

    #[test]
    fn new_widget_drop_requests_binding_then_inserts() {
        let mut state = loaded(vec![app("a"), app("b")]);
        let provider = WidgetProvider {
            component: "clock/.Clock".to_string(),
            label: "Clock".to_string(),
            min_width_dp: 250.0,
            min_height_dp: 110.0,
        };

        let start = Event::NewWidgetDragStart {
            provider: provider.clone(),
            bounds: Rect::new(0.0, 300.0, 100.0, 400.0),
        };
        assert_eq!(run(&mut state, start), vec![Action::SetScrollEnabled(false)]);
        run(
            &mut state,
            Event::NewWidgetDrag {
                delta: Vec2::new(0.0, -300.0),
            },
        );
        let actions = run(&mut state, Event::NewWidgetDragEnd);
        assert_eq!(actions[0], Action::SetScrollEnabled(true));
        let Action::BindWidget { provider: bound, to_index } = &actions[1] else {
            panic!("expected a bind request, got {actions:?}");
        };
        assert_eq!(bound, &provider);

        let bound = Event::WidgetBound {
            widget_id: 11,
            to_index: *to_index,
            min_width_dp: 250.0,
        };
        let actions = run(&mut state, bound.clone());
        assert!(is_save_items(&actions[0]));
        assert_eq!(state.store.len(), 3);

        assert_eq!(run(&mut state, bound), vec![Action::ReleaseWidgetId { widget_id: 11 }]);
    }

    #[test]
    fn cancelled_new_widget_drag_does_not_reload() {
        let mut state = loaded(vec![app("a")]);
        let provider = WidgetProvider {
            component: "clock/.Clock".to_string(),
            label: "Clock".to_string(),
            min_width_dp: 100.0,
            min_height_dp: 100.0,
        };
        run(
            &mut state,
            Event::NewWidgetDragStart {
                provider,
                bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            },
        );
        assert_eq!(
            run(&mut state, Event::NewWidgetDragCancel),
            vec![Action::SetScrollEnabled(true)]
        );
    }

    #[test]
    fn synthesized_state_is_saved_back() {
        let mut state = AppState::new(&Config::default());
        let response = WorkerResponse::StateLoaded {
            items: vec![app("a")],
            bindings: GestureBindings::new(),
            source: LoadSource::Synthesized,
        };
        let actions = run(&mut state, Event::Worker(response));
        assert!(state.loaded);
        assert!(is_save_items(&actions[0]));
    }

    #[test]
    fn binding_changes_are_persisted_once() {
        let mut state = loaded(vec![app("a")]);
        let set = Event::SetGestureBinding {
            scope: BindingScope::app("a"),
            direction: GestureDirection::Left,
            action: Some(GestureAction::LaunchApp {
                package_name: "b".to_string(),
            }),
        };
        assert_eq!(run(&mut state, set.clone()).len(), 1);
        assert!(run(&mut state, set).is_empty());

        let clear = Event::ClearGestureBindings {
            scope: BindingScope::app("a"),
        };
        assert_eq!(run(&mut state, clear.clone()).len(), 1);
        assert!(run(&mut state, clear).is_empty());
    }

    #[test]
    fn folder_rename_trims_and_ignores_blank_names() {
        let folder = FolderInfo::new(vec![AppRef::new("A", "a"), AppRef::new("B", "b")]);
        let folder_id = folder.id.clone();
        let mut state = loaded(vec![LauncherItem::Folder(folder)]);

        run(
            &mut state,
            Event::StartRenameFolder {
                folder_id: folder_id.clone(),
            },
        );
        assert!(matches!(state.overlay, Overlay::FolderRename { .. }));

        let blank = Event::RenameFolder {
            folder_id: folder_id.clone(),
            name: "   ".to_string(),
        };
        assert!(run(&mut state, blank).is_empty());
        assert_eq!(state.overlay, Overlay::None);

        let actions = run(
            &mut state,
            Event::RenameFolder {
                folder_id: folder_id.clone(),
                name: " Games ".to_string(),
            },
        );
        assert!(is_save_items(&actions[0]));
        assert_eq!(state.store.folder(&folder_id).unwrap().name, "Games");
    }

    #[test]
    fn selecting_search_result_launches_and_clears_query() {
        let mut state = loaded(vec![app("cam")]);
        run(
            &mut state,
            Event::AppsLoaded {
                apps: vec![AppRef::new("Camera", "cam")],
            },
        );
        run(
            &mut state,
            Event::Search {
                query: "cam".to_string(),
            },
        );
        assert_eq!(state.search_results.len(), 1);

        let actions = run(
            &mut state,
            Event::SelectSearchResult {
                package_name: "cam".to_string(),
            },
        );
        assert_eq!(actions, vec![launch("cam")]);
        assert!(state.search_query.is_empty());
    }
}
