//! Arc Launcher: the platform-independent core of a gesture-driven home screen.
//!
//! The crate owns everything a launcher decides on its own:
//! - Gesture recognition (tap, double tap, long press, eight-way swipe, drag)
//! - Drag and drop with reflow of the home grid, folders and widget stacks
//! - Per-app, per-folder and per-folder-slot gesture bindings
//! - Persistence of the item list and bindings on a background worker thread
//! - A renderable view model of the home grid
//!
//! Windowing, rendering and the OS services (app catalog, shortcuts, launching,
//! widget hosting) belong to the host, which plugs in through the traits in
//! [`infrastructure::platform`].

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Host (window, input stream, platform services)     │
//! └─────────────────────────────────────────────────────┘
//!                        │ Events         ▲ Actions
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - Event handling and gesture outcomes              │
//! │  - Overlays, folders, search                        │
//! │  - View model computation                           │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Input (input/)│   │ Drag (drag/)  │   │ Worker        │
//! │ - Recognizer  │   │ - Session     │   │ (worker/)     │
//! │ - Timers      │   │ - Geometry    │   │ - Load / save │
//! │ - Directions  │   │ - Reflow      │   │ - Own thread  │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                                                   │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/) and Storage (storage/)            │
//! │  - Items, folders, widgets, gesture bindings        │
//! │  - JSON files in the data directory                 │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - tracing subscriber with OpenTelemetry export     │
//! │  - Rotating OTLP JSON span file                     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! A host either passes a string map ([`Config::from_map`]) or points at a TOML
//! file ([`Config::from_file`]):
//!
//! ```toml
//! data_dir = "~/.local/share/arc-launcher"
//! long_press_timeout_ms = 450
//! double_tap_timeout_ms = 300
//! touch_slop_px = 8.0
//! density = 2.75
//! folder_hysteresis_px = 16.0
//! trace_level = "debug"
//! ```
//!
//! # Initialization Flow
//!
//! 1. The host builds a [`Config`] and calls
//!    [`observability::init_tracing`] if it wants spans on disk.
//! 2. [`initialize`] creates the [`AppState`].
//! 3. The host spawns the worker ([`worker::spawn`]) and feeds the installed apps
//!    in as [`Event::AppsLoaded`], which posts a `LoadState` to the worker.
//! 4. The worker answers with the saved or synthesized item list; from then on
//!    every pointer, layout and menu event goes through [`handle_event`] and the
//!    host renders [`AppState::compute_viewmodel`].
//!
//! [`infrastructure::PlatformRuntime`] wires steps 3 and 4 to the platform traits.
//!
//! # Examples
//!
//! ```rust
//! use arc_launcher::domain::AppRef;
//! use arc_launcher::{handle_event, initialize, Action, Config, Event};
//!
//! let config = Config {
//!     density: 2.0,
//!     ..Default::default()
//! };
//! let mut state = initialize(&config);
//!
//! let apps = vec![AppRef::new("Camera", "com.camera"), AppRef::new("Maps", "com.maps")];
//! let (_, actions) = handle_event(&mut state, &Event::AppsLoaded { apps })?;
//! for action in actions {
//!     match action {
//!         Action::PostToWorker(_message) => { /* hand to the worker */ }
//!         _ => { /* platform calls */ }
//!     }
//! }
//! # Ok::<(), arc_launcher::LauncherError>(())
//! ```

pub mod app;
pub mod domain;
pub mod drag;
pub mod infrastructure;
pub mod input;
pub mod observability;
pub mod storage;
pub mod ui;
pub mod worker;

pub use app::{handle_event, Action, AppState, Event};
pub use domain::{LauncherError, Result};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Launcher configuration.
///
/// Every field has a default, so a TOML file or host map only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where `items.json`, `gestures.json` and the trace file live.
    ///
    /// A leading `~` is expanded. Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// How long a pointer must stay down before a long press fires. Default: 500
    pub long_press_timeout_ms: u64,

    /// Maximum gap between two taps that still counts as a double tap. Default: 300
    pub double_tap_timeout_ms: u64,

    /// Movement in pixels that cancels a pending long press. Default: 8.0
    pub touch_slop_px: f64,

    /// Display density; scales the 48 dp swipe threshold to pixels. Default: 1.0
    pub density: f64,

    /// How far inside the folder bounds a dragged app must come back before the
    /// folder takes the drag again. Default: 16.0
    pub folder_hysteresis_px: f64,

    /// Tracing level for OpenTelemetry spans.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            long_press_timeout_ms: 500,
            double_tap_timeout_ms: 300,
            touch_slop_px: 8.0,
            density: 1.0,
            folder_hysteresis_px: 16.0,
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses configuration from a host-supplied string map.
    ///
    /// Unknown keys are ignored. Values that fail to parse, or are out of range,
    /// keep their default.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use arc_launcher::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("density".to_string(), "2.625".to_string());
    /// map.insert("long_press_timeout_ms".to_string(), "soon".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.density, 2.625);
    /// assert_eq!(config.long_press_timeout_ms, 500);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let positive = |key: &str, default: f64| {
            map.get(key)
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(default)
        };
        let millis = |key: &str, default: u64| {
            map.get(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        Self {
            data_dir: map
                .get("data_dir")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            long_press_timeout_ms: millis("long_press_timeout_ms", defaults.long_press_timeout_ms),
            double_tap_timeout_ms: millis("double_tap_timeout_ms", defaults.double_tap_timeout_ms),
            touch_slop_px: positive("touch_slop_px", defaults.touch_slop_px),
            density: positive("density", defaults.density),
            folder_hysteresis_px: positive("folder_hysteresis_px", defaults.folder_hysteresis_px),
            trace_level: map.get("trace_level").cloned(),
        }
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Config`] if the document is not valid TOML, a value
    /// has the wrong type, or `density` is not positive.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| LauncherError::Config(e.to_string()))?;
        if !(config.density.is_finite() && config.density > 0.0) {
            return Err(LauncherError::Config(format!(
                "density must be positive, got {}",
                config.density
            )));
        }
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| LauncherError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// The data directory to use: the configured one with `~` expanded, otherwise
    /// the platform default.
    #[must_use]
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.as_ref().map_or_else(infrastructure::default_data_dir, |dir| {
            infrastructure::expand_tilde(&dir.to_string_lossy())
        })
    }
}

/// Creates the initial application state.
///
/// The state starts empty and unloaded; items arrive once the host reports the
/// installed apps and the worker answers the resulting load request.
///
/// # Example
///
/// ```rust
/// use arc_launcher::{initialize, Config};
///
/// let state = initialize(&Config::default());
/// assert!(!state.loaded);
/// assert!(state.store.is_empty());
/// ```
#[must_use]
pub fn initialize(config: &Config) -> AppState {
    tracing::debug!(
        density = config.density,
        long_press_timeout_ms = config.long_press_timeout_ms,
        "initializing launcher state"
    );
    AppState::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_only_named_fields() {
        let config = Config::from_toml_str("density = 3.0\ntrace_level = \"debug\"\n").unwrap();
        assert_eq!(config.density, 3.0);
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
        assert_eq!(config.long_press_timeout_ms, 500);
        assert_eq!(config.folder_hysteresis_px, 16.0);
    }

    #[test]
    fn toml_rejects_bad_values() {
        assert!(matches!(
            Config::from_toml_str("density = 0.0"),
            Err(LauncherError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("density = \"high\""),
            Err(LauncherError::Config(_))
        ));
    }

    #[test]
    fn map_ignores_unparseable_and_non_positive_values() {
        let map: BTreeMap<String, String> = [
            ("touch_slop_px", "-4"),
            ("double_tap_timeout_ms", "250"),
            ("data_dir", "  "),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = Config::from_map(&map);
        assert_eq!(config.touch_slop_px, 8.0);
        assert_eq!(config.double_tap_timeout_ms, 250);
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn configured_data_dir_wins() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/launcher")),
            ..Config::default()
        };
        assert_eq!(config.resolved_data_dir(), PathBuf::from("/tmp/launcher"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(LauncherError::Config(_))));
    }
}
