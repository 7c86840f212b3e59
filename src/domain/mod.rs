//! Domain layer for the launcher.
//!
//! Core types and edit rules, independent of any rendering toolkit, platform API or
//! persistence format.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`item`]: Grid items (apps, folders, widgets, widget stacks) and their identity keys
//! - [`gesture`]: Gesture vocabulary, actions and the binding map
//! - [`store`]: The ordered item list and the edits allowed on it

pub mod error;
pub mod gesture;
pub mod item;
pub mod store;

pub use error::{LauncherError, Result};
pub use gesture::{
    default_folder_slot, BindingScope, GestureAction, GestureBinding, GestureBindings, GestureDirection,
};
pub use item::{
    AppRef, FolderInfo, GestureMode, IconHandle, ItemKey, LauncherItem, WidgetId, WidgetProvider, WidgetStack,
    DEFAULT_FOLDER_NAME,
};
pub use store::ItemStore;
