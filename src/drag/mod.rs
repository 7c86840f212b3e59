//! Drag and drop: geometry, the live drag session and the placement policy.
//!
//! # Organization
//!
//! - [`geometry`]: key → last measured bounds, with containment and nearest queries
//! - [`session`]: the single in-flight drag and its folder-boundary tracking
//! - [`reflow`]: turns a finished drag into a [`Placement`] and applies it
//! - [`packing`]: column spans and row packing for widgets

pub mod geometry;
pub mod packing;
pub mod reflow;
pub mod session;

pub use geometry::{GeometryIndex, Nearest};
pub use packing::{column_span, layout, packed_index, GridCell, WidgetMetrics, CELL_SIZE_DP, GRID_COLUMNS};
pub use reflow::{plan_drop, Applied, DropContext, Placement};
pub use session::{DragController, DragLayer, DragSession, DragSubject};
