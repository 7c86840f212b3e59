//! JSON file-based storage backend.
//!
//! Items and gesture bindings live in two files inside the data directory:
//!
//! ```text
//! <data_dir>/items.json     {"version": 1, "items": [ItemRecord, …]}
//! <data_dir>/gestures.json  {"app:com.a:UP": {"gesture": "UP", "action": {…}}, …}
//! ```
//!
//! Writes go to a temporary file that is then renamed over the target, so a crash
//! never leaves a half-written file behind. A bare top-level array in `items.json`
//! (the format written by early versions) is still accepted on load.
//!
//! Records are decoded one at a time. A record this version cannot read is skipped
//! with a warning; the rest of the grid still loads.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::{LauncherError, Result};
use crate::domain::GestureBindings;
use crate::storage::backend::Storage;
use crate::storage::models::ItemRecord;

pub const ITEMS_FILE: &str = "items.json";
pub const GESTURES_FILE: &str = "gestures.json";

const FORMAT_VERSION: u32 = 1;

const fn current_version() -> u32 {
    FORMAT_VERSION
}

#[derive(Debug, Serialize, Deserialize)]
struct ItemsData<T> {
    #[serde(default = "current_version")]
    version: u32,
    items: Vec<T>,
}

/// The outer shape of `items.json`; records stay undecoded until [`decode_records`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemsFile {
    Current(ItemsData<serde_json::Value>),
    Legacy(Vec<serde_json::Value>),
}

fn decode_records(values: Vec<serde_json::Value>) -> Vec<ItemRecord> {
    let total = values.len();
    let records: Vec<ItemRecord> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping unreadable item record");
                None
            }
        })
        .collect();
    if records.len() < total {
        tracing::warn!(skipped = total - records.len(), total, "some item records were skipped");
    }
    records
}

/// JSON file storage backend.
///
/// Every save is written through immediately. A save that fails is remembered and
/// retried once more when the storage is dropped.
pub struct JsonStorage {
    items_path: PathBuf,
    gestures_path: PathBuf,
    unsaved_items: Option<Vec<ItemRecord>>,
    unsaved_bindings: Option<GestureBindings>,
}

impl JsonStorage {
    /// Opens storage rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use arc_launcher::storage::{JsonStorage, Storage};
    ///
    /// let storage = JsonStorage::new("/tmp/arc-launcher")?;
    /// let items = storage.load_items()?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        tracing::debug!(path = ?data_dir, "initializing JSON storage");
        std::fs::create_dir_all(data_dir)?;

        Ok(Self {
            items_path: data_dir.join(ITEMS_FILE),
            gestures_path: data_dir.join(GESTURES_FILE),
            unsaved_items: None,
            unsaved_bindings: None,
        })
    }

    #[must_use]
    pub fn items_path(&self) -> &Path {
        &self.items_path
    }

    #[must_use]
    pub fn gestures_path(&self) -> &Path {
        &self.gestures_path
    }

    fn read_if_exists(path: &Path) -> Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes `contents` to a sibling temp file, then renames it over `path`.
    fn write_atomic(path: &Path, contents: &str) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, contents)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn flush_items(&mut self) -> Result<()> {
        let Some(items) = self.unsaved_items.as_deref() else {
            return Ok(());
        };
        let data = ItemsData::<ItemRecord> {
            version: FORMAT_VERSION,
            items: items.to_vec(),
        };
        let json = serde_json::to_string_pretty(&data)
            .map_err(|e| LauncherError::Storage(format!("failed to serialize items: {e}")))?;
        Self::write_atomic(&self.items_path, &json)?;
        self.unsaved_items = None;
        Ok(())
    }

    fn flush_bindings(&mut self) -> Result<()> {
        let Some(bindings) = self.unsaved_bindings.as_ref() else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(bindings)
            .map_err(|e| LauncherError::Storage(format!("failed to serialize gesture bindings: {e}")))?;
        Self::write_atomic(&self.gestures_path, &json)?;
        self.unsaved_bindings = None;
        Ok(())
    }
}

impl Storage for JsonStorage {
    fn load_items(&self) -> Result<Option<Vec<ItemRecord>>> {
        let _span = tracing::debug_span!("json_load_items", path = ?self.items_path).entered();

        let Some(contents) = Self::read_if_exists(&self.items_path)? else {
            tracing::debug!("no saved items");
            return Ok(None);
        };
        let file: ItemsFile = serde_json::from_str(&contents)
            .map_err(|e| LauncherError::Storage(format!("failed to parse {ITEMS_FILE}: {e}")))?;
        let values = match file {
            ItemsFile::Current(data) => {
                tracing::debug!(version = data.version, count = data.items.len(), "loaded items");
                data.items
            }
            ItemsFile::Legacy(items) => {
                tracing::debug!(count = items.len(), "loaded items from legacy array format");
                items
            }
        };
        Ok(Some(decode_records(values)))
    }

    fn save_items(&mut self, items: &[ItemRecord]) -> Result<()> {
        let _span = tracing::debug_span!("json_save_items", count = items.len()).entered();
        self.unsaved_items = Some(items.to_vec());
        self.flush_items()?;
        tracing::debug!("items saved");
        Ok(())
    }

    fn load_gesture_bindings(&self) -> Result<GestureBindings> {
        let _span = tracing::debug_span!("json_load_gesture_bindings", path = ?self.gestures_path).entered();

        let Some(contents) = Self::read_if_exists(&self.gestures_path)? else {
            return Ok(GestureBindings::new());
        };
        let bindings: GestureBindings = serde_json::from_str(&contents)
            .map_err(|e| LauncherError::Storage(format!("failed to parse {GESTURES_FILE}: {e}")))?;
        tracing::debug!(count = bindings.len(), "loaded gesture bindings");
        Ok(bindings)
    }

    fn save_gesture_bindings(&mut self, bindings: &GestureBindings) -> Result<()> {
        let _span = tracing::debug_span!("json_save_gesture_bindings", count = bindings.len()).entered();
        self.unsaved_bindings = Some(bindings.clone());
        self.flush_bindings()?;
        tracing::debug!("gesture bindings saved");
        Ok(())
    }
}

impl Drop for JsonStorage {
    fn drop(&mut self) {
        if self.unsaved_items.is_some() {
            tracing::debug!("retrying unsaved items on drop");
            if let Err(e) = self.flush_items() {
                tracing::error!(error = %e, "failed to save items on drop");
            }
        }
        if self.unsaved_bindings.is_some() {
            tracing::debug!("retrying unsaved gesture bindings on drop");
            if let Err(e) = self.flush_bindings() {
                tracing::error!(error = %e, "failed to save gesture bindings on drop");
            }
        }
    }
}
