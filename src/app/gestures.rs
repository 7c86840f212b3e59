//! Bridges recognizer callbacks to launcher semantics.
//!
//! The recognizer needs a yes/no answer from some callbacks before it can continue
//! (was this long press or swipe consumed?). Those answers only need read access
//! to the items and bindings, so a [`Resolver`] borrows just those, answers
//! immediately and records an [`Outcome`] for the handler to apply once the
//! recognizer call has returned.

use kurbo::Vec2;

use crate::domain::{
    default_folder_slot, BindingScope, GestureAction, GestureBindings, GestureDirection, GestureMode, ItemKey,
    ItemStore,
};
use crate::input::GestureHandler;

/// What a pointer went down on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TouchTarget {
    /// A cell of the home grid.
    Item(ItemKey),
    /// An app inside the expanded folder.
    FolderApp { folder_id: String, package_name: String },
    /// Empty grid space.
    Background,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Tap(TouchTarget),
    Invoke(GestureAction),
    LongPress(TouchTarget),
    DragStart(TouchTarget),
    Drag(Vec2),
    DragEnd,
    DragCancel,
}

/// Looks up what `direction` does on `target`.
///
/// Apps use their own bindings and apps inside a folder use their slot's bindings.
/// A folder in custom mode uses the folder's own bindings. In default mode a swipe
/// launches the app in the matching slot.
#[must_use]
pub fn resolve_action(
    store: &ItemStore,
    bindings: &GestureBindings,
    target: &TouchTarget,
    direction: GestureDirection,
) -> Option<GestureAction> {
    match target {
        TouchTarget::Item(ItemKey::App(package_name)) => {
            bindings.action(&BindingScope::app(package_name.as_str()), direction).cloned()
        }
        TouchTarget::Item(ItemKey::Folder(folder_id)) => {
            let folder = store.folder(folder_id)?;
            match folder.gesture_mode {
                GestureMode::Custom => bindings.action(&BindingScope::folder(folder_id.as_str()), direction).cloned(),
                GestureMode::Default => {
                    let slot = default_folder_slot(folder.apps.len(), direction)?;
                    folder.app_at(slot).map(|app| GestureAction::LaunchApp {
                        package_name: app.package_name.clone(),
                    })
                }
            }
        }
        TouchTarget::FolderApp {
            folder_id,
            package_name,
        } => {
            let index = store.folder(folder_id)?.index_of(package_name)?;
            bindings
                .action(&BindingScope::folder_slot(folder_id.as_str(), index), direction)
                .cloned()
        }
        TouchTarget::Item(_) | TouchTarget::Background => None,
    }
}

pub(crate) struct Resolver<'a> {
    store: &'a ItemStore,
    bindings: &'a GestureBindings,
    outcomes: Vec<Outcome>,
}

impl<'a> Resolver<'a> {
    pub(crate) const fn new(store: &'a ItemStore, bindings: &'a GestureBindings) -> Self {
        Self {
            store,
            bindings,
            outcomes: Vec::new(),
        }
    }

    pub(crate) fn into_outcomes(self) -> Vec<Outcome> {
        self.outcomes
    }

    fn invoke(&mut self, target: &TouchTarget, direction: GestureDirection) -> bool {
        match resolve_action(self.store, self.bindings, target, direction) {
            Some(action) => {
                tracing::debug!(?target, %direction, ?action, "gesture bound");
                self.outcomes.push(Outcome::Invoke(action));
                true
            }
            None => {
                tracing::debug!(?target, %direction, "no gesture bound");
                false
            }
        }
    }

    fn exists(&self, target: &TouchTarget) -> bool {
        match target {
            TouchTarget::Item(key) => self.store.get(key).is_some(),
            TouchTarget::FolderApp {
                folder_id,
                package_name,
            } => self
                .store
                .folder(folder_id)
                .is_some_and(|folder| folder.index_of(package_name).is_some()),
            TouchTarget::Background => false,
        }
    }
}

impl GestureHandler<TouchTarget> for Resolver<'_> {
    fn on_tap(&mut self, target: &TouchTarget) {
        self.outcomes.push(Outcome::Tap(target.clone()));
    }

    fn on_double_tap(&mut self, target: &TouchTarget) -> bool {
        self.invoke(target, GestureDirection::DoubleTap)
    }

    /// Consumed for anything that can be dragged. A long press on empty space opens
    /// the home menu but is not consumed, so it can never become a drag.
    fn on_long_press(&mut self, target: &TouchTarget) -> bool {
        self.outcomes.push(Outcome::LongPress(target.clone()));
        self.exists(target)
    }

    fn on_swipe(&mut self, target: &TouchTarget, direction: GestureDirection) -> bool {
        self.invoke(target, direction)
    }

    fn on_drag_start(&mut self, target: &TouchTarget) {
        self.outcomes.push(Outcome::DragStart(target.clone()));
    }

    fn on_drag(&mut self, _target: &TouchTarget, delta: Vec2) {
        self.outcomes.push(Outcome::Drag(delta));
    }

    fn on_drag_end(&mut self, _target: &TouchTarget) {
        self.outcomes.push(Outcome::DragEnd);
    }

    fn on_drag_cancel(&mut self, _target: &TouchTarget) {
        self.outcomes.push(Outcome::DragCancel);
    }
}
