//! Side effects requested by [`handle_event`](crate::app::handle_event).
//!
//! The app layer never talks to the OS or the disk itself. Every effect is returned
//! as an [`Action`] and carried out by the host, usually through
//! [`PlatformRuntime`](crate::infrastructure::PlatformRuntime).

use crate::domain::{WidgetId, WidgetProvider};
use crate::worker::WorkerMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LaunchApp {
        package_name: String,
    },

    LaunchShortcut {
        package_name: String,
        shortcut_id: String,
    },

    /// Load the shortcuts of an app for its long-press menu. The answer comes back as
    /// [`Event::ShortcutsLoaded`](crate::app::Event::ShortcutsLoaded).
    QueryShortcuts {
        package_name: String,
    },

    /// Queue a load or save on the persistence worker.
    PostToWorker(WorkerMessage),

    /// Grid scrolling is turned off for the duration of every drag.
    SetScrollEnabled(bool),

    /// Allocate and bind a widget id for `provider`, then report
    /// [`Event::WidgetBound`](crate::app::Event::WidgetBound) with `to_index` or
    /// [`Event::WidgetBindCancelled`](crate::app::Event::WidgetBindCancelled).
    BindWidget {
        provider: WidgetProvider,
        to_index: usize,
    },

    /// Give a widget id back to the widget host.
    ReleaseWidgetId {
        widget_id: WidgetId,
    },

    OpenSettings,
}
