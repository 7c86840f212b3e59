//! Storage backend abstraction.
//!
//! The trait is shaped around what the persistence worker does: load everything once
//! at startup, then write the whole item list or the whole binding map after each
//! change. There is no partial update.

use crate::domain::error::Result;
use crate::domain::GestureBindings;
use crate::storage::models::ItemRecord;

/// Abstraction over persistent storage backends.
///
/// # Implementations
///
/// - [`JsonStorage`](crate::storage::JsonStorage): two JSON files with atomic writes
pub trait Storage: Send {
    /// Loads the persisted item list.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet, which callers treat as a
    /// first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load_items(&self) -> Result<Option<Vec<ItemRecord>>>;

    /// Replaces the persisted item list.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    fn save_items(&mut self, items: &[ItemRecord]) -> Result<()>;

    /// Loads the gesture binding map, empty when none has been saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load_gesture_bindings(&self) -> Result<GestureBindings>;

    /// Replaces the persisted gesture binding map.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    fn save_gesture_bindings(&mut self, bindings: &GestureBindings) -> Result<()>;
}
