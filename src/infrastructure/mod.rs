//! Host-facing plumbing: filesystem locations and the platform collaborators.

pub mod paths;
pub mod platform;

pub use paths::{default_data_dir, expand_tilde};
pub use platform::{
    AppCatalog, HomeSurface, LaunchInvoker, PlatformRuntime, PlatformServices, Shortcut, ShortcutError,
    ShortcutProvider, WidgetHost,
};
