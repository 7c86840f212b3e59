//! Interfaces to the host platform and the loop that executes actions against them.
//!
//! The core never calls the OS directly. Each collaborator is a small trait, and
//! [`PlatformRuntime`] turns the [`Action`]s returned by
//! [`handle_event`](crate::app::handle_event) into calls on them, feeding any result
//! back in as an [`Event`].

use std::collections::VecDeque;
use std::time::Duration;

use thiserror::Error;

use crate::app::{handle_event, Action, AppState, Event};
use crate::domain::error::Result;
use crate::domain::{AppRef, WidgetId, WidgetProvider};
use crate::worker::WorkerHandle;

/// A published app shortcut, as listed in the long-press menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub id: String,
    pub package_name: String,
    pub label: String,
}

/// Why a shortcut query produced no list. Both variants become menu state rather
/// than an error for the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShortcutError {
    /// The launcher is not allowed to query shortcuts.
    #[error("shortcut access not granted")]
    PermissionDenied,

    #[error("shortcuts unavailable: {0}")]
    Unavailable(String),
}

/// The installed-app list, read once per session start.
pub trait AppCatalog {
    /// Apps that have a launcher entry point.
    fn list_launchable_apps(&self) -> Vec<AppRef>;
}

/// Published shortcuts of an installed app.
pub trait ShortcutProvider {
    /// Lists the shortcuts `package_name` publishes, in the order the app gives.
    ///
    /// # Parameters
    ///
    /// * `package_name` - App whose long-press menu is opening
    ///
    /// # Errors
    ///
    /// [`ShortcutError::PermissionDenied`] when the launcher lacks shortcut access.
    fn list_shortcuts(&self, package_name: &str) -> std::result::Result<Vec<Shortcut>, ShortcutError>;
}

/// Starts activities on behalf of the launcher. Launch failures are the
/// platform's to report; the core never waits for them.
pub trait LaunchInvoker {
    fn launch_app(&mut self, package_name: &str);
    fn launch_shortcut(&mut self, package_name: &str, shortcut_id: &str);
    fn open_settings(&mut self);
}

/// The platform's widget host.
///
/// Ids are allocated before binding. An id that never makes it onto the grid must
/// be handed back through [`delete_widget_id`](Self::delete_widget_id).
pub trait WidgetHost {
    fn allocate_widget_id(&mut self) -> WidgetId;

    /// Binds `widget_id` to `provider`, running any configuration step the provider
    /// requires.
    ///
    /// # Parameters
    ///
    /// * `widget_id` - Id from [`allocate_widget_id`](Self::allocate_widget_id)
    /// * `provider` - Widget the user dropped on the grid
    ///
    /// # Returns
    ///
    /// - `true` if the widget is bound and configured
    /// - `false` if the user or the platform cancelled
    fn bind_widget(&mut self, widget_id: WidgetId, provider: &WidgetProvider) -> bool;

    fn delete_widget_id(&mut self, widget_id: WidgetId);
}

/// The scrolling home container. Scrolling is off for the whole of a drag.
pub trait HomeSurface {
    fn set_scroll_enabled(&mut self, enabled: bool);
}

/// The set of collaborators a runtime drives.
pub struct PlatformServices {
    pub catalog: Box<dyn AppCatalog>,
    pub shortcuts: Box<dyn ShortcutProvider>,
    pub launcher: Box<dyn LaunchInvoker>,
    pub widgets: Box<dyn WidgetHost>,
    pub surface: Box<dyn HomeSurface>,
}

/// Connects [`AppState`] to the platform services and to the worker.
///
/// The runtime owns no launcher state. The host keeps the [`AppState`] and passes
/// it to [`dispatch`](Self::dispatch) for every input event, then calls
/// [`pump_worker`](Self::pump_worker) whenever it is idle.
pub struct PlatformRuntime {
    services: PlatformServices,
    worker: WorkerHandle,
}

impl PlatformRuntime {
    #[must_use]
    pub const fn new(services: PlatformServices, worker: WorkerHandle) -> Self {
        Self { services, worker }
    }

    /// The event that starts a session: the current list of launchable apps.
    #[must_use]
    pub fn apps_loaded(&self) -> Event {
        Event::AppsLoaded {
            apps: self.services.catalog.list_launchable_apps(),
        }
    }

    /// Carries out one action. Synchronous results are returned as follow-up events.
    ///
    /// # Parameters
    ///
    /// * `action` - Side effect requested by [`handle_event`]
    ///
    /// # Returns
    ///
    /// - [`Event::ShortcutsLoaded`] for a shortcut query
    /// - [`Event::WidgetBound`] or [`Event::WidgetBindCancelled`] for a bind
    /// - nothing for every other action
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread is gone.
    pub fn execute(&mut self, action: &Action) -> Result<Vec<Event>> {
        let _span = tracing::debug_span!("execute_action", ?action).entered();
        let services = &mut self.services;

        let events = match action {
            Action::LaunchApp { package_name } => {
                services.launcher.launch_app(package_name);
                vec![]
            }
            Action::LaunchShortcut {
                package_name,
                shortcut_id,
            } => {
                services.launcher.launch_shortcut(package_name, shortcut_id);
                vec![]
            }
            Action::QueryShortcuts { package_name } => vec![Event::ShortcutsLoaded {
                package_name: package_name.clone(),
                result: services.shortcuts.list_shortcuts(package_name),
            }],
            Action::PostToWorker(message) => {
                self.worker.post(message.clone())?;
                vec![]
            }
            Action::SetScrollEnabled(enabled) => {
                services.surface.set_scroll_enabled(*enabled);
                vec![]
            }
            Action::BindWidget { provider, to_index } => {
                let widget_id = services.widgets.allocate_widget_id();
                if services.widgets.bind_widget(widget_id, provider) {
                    vec![Event::WidgetBound {
                        widget_id,
                        to_index: *to_index,
                        min_width_dp: provider.min_width_dp,
                    }]
                } else {
                    tracing::debug!(widget_id, "widget binding cancelled");
                    vec![Event::WidgetBindCancelled { widget_id }]
                }
            }
            Action::ReleaseWidgetId { widget_id } => {
                services.widgets.delete_widget_id(*widget_id);
                vec![]
            }
            Action::OpenSettings => {
                services.launcher.open_settings();
                vec![]
            }
        };
        Ok(events)
    }

    /// Handles `event` and every event its actions produce, in order.
    ///
    /// Follow-up events are queued breadth-first, so an action's result is handled
    /// only after every action of the event that caused it has run.
    ///
    /// # Returns
    ///
    /// - `true` if any handled event changed what the host should render
    /// - `false` otherwise
    ///
    /// # Errors
    ///
    /// Returns the first error from the handler or from executing an action.
    pub fn dispatch(&mut self, state: &mut AppState, event: Event) -> Result<bool> {
        let mut queue = VecDeque::from([event]);
        let mut render = false;
        while let Some(event) = queue.pop_front() {
            let (changed, actions) = handle_event(state, &event)?;
            render |= changed;
            for action in &actions {
                queue.extend(self.execute(action)?);
            }
        }
        Ok(render)
    }

    /// Feeds every worker response that is already available into `state`.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn pump_worker(&mut self, state: &mut AppState) -> Result<bool> {
        let mut render = false;
        while let Some(response) = self.worker.try_recv() {
            render |= self.dispatch(state, Event::Worker(response))?;
        }
        Ok(render)
    }

    /// Waits up to `timeout` for one worker response and dispatches it.
    ///
    /// Returns `None` if nothing arrived in time.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn wait_for_worker(&mut self, state: &mut AppState, timeout: Duration) -> Result<Option<bool>> {
        match self.worker.recv_timeout(timeout) {
            Some(response) => self.dispatch(state, Event::Worker(response)).map(Some),
            None => Ok(None),
        }
    }

    /// Stops the worker after it has finished everything already queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread panicked.
    pub fn shutdown(self) -> Result<()> {
        self.worker.shutdown()
    }
}
