//! Presentation layer.
//!
//! ```text
//! AppState → compute_viewmodel → HomeViewModel → host renderer
//! ```
//!
//! Rendering itself belongs to the host; this crate stops at the view model.

pub mod viewmodel;

pub use viewmodel::{
    CellContent, CellView, DragView, FolderAppView, FolderView, HomeViewModel, SearchResultView, SearchView,
};
