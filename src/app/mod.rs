//! Application layer coordinating state, events, and actions.
//!
//! Sits between the host (which owns the window, the input stream and the
//! platform services) and the domain, drag, storage and worker layers.
//!
//! ```text
//! Host input → Events → handle_event → State mutations → Actions → Host / Worker
//!                            ↑                                        ↓
//!                            └──────────── Worker responses ──────────┘
//! ```
//!
//! - [`actions`]: side effects emitted by the event handler
//! - [`gestures`]: what a gesture on a given target does
//! - [`handler`]: event processing and state transitions
//! - [`modes`]: overlay state
//! - [`state`]: the state container and view model computation
//!
//! # Example
//!
//! ```rust
//! use arc_launcher::app::{handle_event, AppState, Event};
//! use arc_launcher::Config;
//!
//! let mut state = AppState::new(&Config::default());
//! let (render, actions) = handle_event(&mut state, &Event::OpenWidgetPicker)?;
//! assert!(render && actions.is_empty());
//! # Ok::<(), arc_launcher::LauncherError>(())
//! ```

pub mod actions;
pub mod gestures;
pub mod handler;
pub mod modes;
pub mod state;

pub use actions::Action;
pub use gestures::{resolve_action, TouchTarget};
pub use handler::{handle_event, Event};
pub use modes::{Overlay, ShortcutsMenu};
pub use state::AppState;
