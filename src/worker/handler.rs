//! Worker implementation for persistence operations.
//!
//! [`LauncherWorker`] owns the storage backend and turns each [`WorkerMessage`] into
//! a [`WorkerResponse`]. It is driven by [`spawn`](crate::worker::spawn) on its own
//! thread, but `handle_message` is plain synchronous code and is tested directly.

use std::path::Path;

use crate::domain::error::Result;
use crate::domain::{AppRef, GestureBindings, ItemStore};
use crate::storage::{items_from_records, ItemRecord, JsonStorage, Storage};
use crate::worker::messages::{LoadSource, WorkerMessage, WorkerResponse};

pub struct LauncherWorker {
    storage: Box<dyn Storage>,
}

impl LauncherWorker {
    #[must_use]
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Creates a worker backed by JSON files in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be created.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Box::new(JsonStorage::new(data_dir)?)))
    }

    /// Standardizes logging and error reporting for storage results.
    fn handle_storage_result<T, F>(operation: &str, result: Result<T>, on_success: F) -> WorkerResponse
    where
        F: FnOnce(T) -> WorkerResponse,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation = operation, "storage operation successful");
                on_success(value)
            }
            Err(e) => {
                tracing::warn!(operation = operation, error = %e, "storage operation failed");
                WorkerResponse::Error {
                    message: format!("{operation}: {e}"),
                }
            }
        }
    }

    /// Loads items and bindings.
    ///
    /// A missing or unreadable item file yields the synthesized first-run grid, and
    /// an unreadable binding file yields no bindings; loading itself never fails.
    fn handle_load_state(&self, installed_apps: &[AppRef]) -> WorkerResponse {
        let (items, source) = match self.storage.load_items() {
            Ok(Some(records)) => (items_from_records(records, installed_apps), LoadSource::Saved),
            Ok(None) => (ItemStore::synthesize(installed_apps), LoadSource::Synthesized),
            Err(e) => {
                tracing::warn!(error = %e, "saved items unreadable, using installed apps");
                (ItemStore::synthesize(installed_apps), LoadSource::Synthesized)
            }
        };

        let bindings = self.storage.load_gesture_bindings().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "saved gesture bindings unreadable, starting empty");
            GestureBindings::new()
        });

        tracing::debug!(
            item_count = items.len(),
            binding_count = bindings.len(),
            ?source,
            "launcher state loaded"
        );
        WorkerResponse::StateLoaded {
            items,
            bindings,
            source,
        }
    }

    fn handle_save_items(&mut self, records: &[ItemRecord]) -> WorkerResponse {
        let count = records.len();
        Self::handle_storage_result("save items", self.storage.save_items(records), |()| {
            WorkerResponse::ItemsSaved { count }
        })
    }

    fn handle_save_gesture_bindings(&mut self, bindings: &GestureBindings) -> WorkerResponse {
        let count = bindings.len();
        Self::handle_storage_result(
            "save gesture bindings",
            self.storage.save_gesture_bindings(bindings),
            |()| WorkerResponse::GestureBindingsSaved { count },
        )
    }

    /// Re-attaches the sender's trace context so worker spans join its trace.
    ///
    /// The returned guard must be held for the duration of the operation.
    fn attach_parent_trace_context(message: &WorkerMessage) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

        let trace_context = message.trace_context()?;
        let trace_id = TraceId::from_hex(&trace_context.trace_id).ok()?;
        let span_id = SpanId::from_hex(&trace_context.parent_span_id).ok()?;

        let span_context = SpanContext::new(trace_id, span_id, TraceFlags::SAMPLED, true, TraceState::default());
        Some(
            opentelemetry::Context::current()
                .with_remote_span_context(span_context)
                .attach(),
        )
    }

    /// Processes one message. Returns `None` for [`WorkerMessage::Shutdown`].
    pub fn handle_message(&mut self, message: WorkerMessage) -> Option<WorkerResponse> {
        let _context_guard = Self::attach_parent_trace_context(&message);

        let message_type = match &message {
            WorkerMessage::LoadState { .. } => "load_state",
            WorkerMessage::SaveItems { .. } => "save_items",
            WorkerMessage::SaveGestureBindings { .. } => "save_gesture_bindings",
            WorkerMessage::Shutdown => "shutdown",
        };
        let _guard = tracing::debug_span!("worker_handle_message", message_type).entered();

        match message {
            WorkerMessage::LoadState { installed_apps, .. } => Some(self.handle_load_state(&installed_apps)),
            WorkerMessage::SaveItems { records, .. } => Some(self.handle_save_items(&records)),
            WorkerMessage::SaveGestureBindings { bindings, .. } => Some(self.handle_save_gesture_bindings(&bindings)),
            WorkerMessage::Shutdown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BindingScope, GestureAction, GestureDirection, LauncherItem};
    use crate::storage::records_from_items;

    fn apps() -> Vec<AppRef> {
        vec![AppRef::new("Zoo", "z"), AppRef::new("Atlas", "a")]
    }

    #[test]
    fn first_load_synthesizes_sorted_grid() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = LauncherWorker::open(dir.path()).unwrap();
        let response = worker.handle_message(WorkerMessage::load_state(apps())).unwrap();

        let WorkerResponse::StateLoaded { items, source, .. } = response else {
            panic!("unexpected response: {response:?}");
        };
        assert_eq!(source, LoadSource::Synthesized);
        assert_eq!(items[0].key().to_string(), "app_a");
    }

    #[test]
    fn corrupt_file_falls_back_to_synthesized_grid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("items.json"), "]]").unwrap();
        std::fs::write(dir.path().join("gestures.json"), "nope").unwrap();
        let mut worker = LauncherWorker::open(dir.path()).unwrap();

        let response = worker.handle_message(WorkerMessage::load_state(apps())).unwrap();
        let WorkerResponse::StateLoaded { items, bindings, source } = response else {
            panic!("unexpected response: {response:?}");
        };
        assert_eq!(source, LoadSource::Synthesized);
        assert_eq!(items.len(), 2);
        assert!(bindings.is_empty());
    }

    #[test]
    fn one_unreadable_record_does_not_discard_the_grid() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{"version":1,"items":[
            {"type":"folder","id":"f1","name":"Games","apps":["a","z"],"gestureMode":"HYBRID"},
            {"type":"widget","widgetId":"7"},
            {"type":"widget","widgetId":9}
        ]}"#;
        std::fs::write(dir.path().join("items.json"), json).unwrap();
        let mut worker = LauncherWorker::open(dir.path()).unwrap();

        let response = worker.handle_message(WorkerMessage::load_state(apps())).unwrap();
        let WorkerResponse::StateLoaded { items, source, .. } = response else {
            panic!("unexpected response: {response:?}");
        };
        assert_eq!(source, LoadSource::Saved);
        assert_eq!(items.len(), 2);
        let folder = items[0].as_folder().unwrap();
        assert_eq!((folder.id.as_str(), folder.name.as_str()), ("f1", "Games"));
        assert_eq!(folder.apps.len(), 2);
        assert_eq!(items[1], LauncherItem::Widget(9));
    }

    #[test]
    fn saved_state_is_loaded_back_against_installed_apps() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = LauncherWorker::open(dir.path()).unwrap();
        let saved = vec![
            LauncherItem::App(AppRef::new("Zoo", "z")),
            LauncherItem::App(AppRef::new("Removed", "gone")),
            LauncherItem::Widget(12),
        ];
        let mut bindings = GestureBindings::new();
        bindings.set(
            &BindingScope::app("z"),
            GestureDirection::Up,
            Some(GestureAction::LaunchApp {
                package_name: "a".to_string(),
            }),
        );

        assert_eq!(
            worker.handle_message(WorkerMessage::save_items(records_from_items(&saved))),
            Some(WorkerResponse::ItemsSaved { count: 3 })
        );
        assert_eq!(
            worker.handle_message(WorkerMessage::save_gesture_bindings(bindings.clone())),
            Some(WorkerResponse::GestureBindingsSaved { count: 1 })
        );

        let response = worker.handle_message(WorkerMessage::load_state(apps())).unwrap();
        assert_eq!(
            response,
            WorkerResponse::StateLoaded {
                items: vec![LauncherItem::App(AppRef::new("Zoo", "z")), LauncherItem::Widget(12)],
                bindings,
                source: LoadSource::Saved,
            }
        );
    }

    #[test]
    fn shutdown_has_no_response() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = LauncherWorker::open(dir.path()).unwrap();
        assert!(worker.handle_message(WorkerMessage::Shutdown).is_none());
    }
}
