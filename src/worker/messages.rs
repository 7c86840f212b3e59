//! Worker thread message types for cross-thread communication.
//!
//! This module defines the request and response protocol between the UI thread and
//! the persistence worker, including trace context propagation so spans recorded
//! on the worker link back to the event that caused them.

use serde::{Deserialize, Serialize};

use crate::domain::{AppRef, GestureBindings, LauncherItem};
use crate::storage::ItemRecord;

/// Distributed tracing context for cross-thread span propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking spans across threads.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Captures the OpenTelemetry ids of the current tracing span.
    ///
    /// Returns `None` when no valid span context is active, e.g. when tracing was
    /// never initialized.
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let otel_context = tracing::Span::current().context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }
        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }
}

/// Generates constructors that attach the current trace context to a message.
macro_rules! worker_message_builders {
    (
        $(
            $builder_name:ident($variant:ident { $($field:ident: $ty:ty),* $(,)? })
        ),* $(,)?
    ) => {
        impl WorkerMessage {
            $(
                #[doc = concat!("Create a ", stringify!($variant), " message with current trace context")]
                #[must_use]
                pub fn $builder_name($($field: $ty),*) -> Self {
                    Self::$variant {
                        $($field,)*
                        trace_context: TraceContext::from_current(),
                    }
                }
            )*
        }
    };
}

worker_message_builders! {
    load_state(LoadState { installed_apps: Vec<AppRef> }),
    save_items(SaveItems { records: Vec<ItemRecord> }),
    save_gesture_bindings(SaveGestureBindings { bindings: GestureBindings }),
}

/// Messages sent to the worker thread.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    /// Load items and gesture bindings, resolving apps against `installed_apps`.
    LoadState {
        installed_apps: Vec<AppRef>,
        trace_context: Option<TraceContext>,
    },

    /// Replace the persisted item list.
    SaveItems {
        records: Vec<ItemRecord>,
        trace_context: Option<TraceContext>,
    },

    /// Replace the persisted gesture bindings.
    SaveGestureBindings {
        bindings: GestureBindings,
        trace_context: Option<TraceContext>,
    },

    /// Stop the worker loop after everything queued before it.
    Shutdown,
}

impl WorkerMessage {
    #[must_use]
    pub const fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::LoadState { trace_context, .. }
            | Self::SaveItems { trace_context, .. }
            | Self::SaveGestureBindings { trace_context, .. } => trace_context.as_ref(),
            Self::Shutdown => None,
        }
    }
}

/// Where a loaded item list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Saved,
    /// Nothing usable was saved; the list was built from the installed apps.
    Synthesized,
}

/// Responses sent from the worker thread back to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerResponse {
    StateLoaded {
        items: Vec<LauncherItem>,
        bindings: GestureBindings,
        source: LoadSource,
    },

    ItemsSaved {
        count: usize,
    },

    GestureBindingsSaved {
        count: usize,
    },

    /// An error occurred during the worker operation.
    Error {
        /// Human-readable error message.
        message: String,
    },
}
