//! Column packing for multi-column widgets on the 4-column home grid.
//!
//! Apps and folders span one column. A widget spans `ceil(min_width / 96dp)` columns,
//! at least one and at most the grid width. Insertion points are nudged forward so a widget never straddles a
//! row break.

use std::collections::HashMap;

use crate::domain::{LauncherItem, WidgetId};

pub const GRID_COLUMNS: usize = 4;
pub const CELL_SIZE_DP: f64 = 96.0;

/// Number of grid columns needed for a widget `width_dp` wide, capped at
/// [`GRID_COLUMNS`].
///
/// # Examples
///
/// ```
/// use arc_launcher::drag::column_span;
///
/// assert_eq!(column_span(40.0), 1);
/// assert_eq!(column_span(96.0), 1);
/// assert_eq!(column_span(97.0), 2);
/// assert_eq!(column_span(250.0), 3);
/// assert_eq!(column_span(1_000.0), 4);
/// ```
#[must_use]
pub fn column_span(width_dp: f64) -> usize {
    if width_dp.is_nan() || width_dp <= 0.0 {
        return 1;
    }
    ((width_dp / CELL_SIZE_DP).ceil() as usize).clamp(1, GRID_COLUMNS)
}

/// Known minimum widths of bound widgets, reported by the widget host.
#[derive(Debug, Clone, Default)]
pub struct WidgetMetrics {
    widths_dp: HashMap<WidgetId, f64>,
}

impl WidgetMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, widget_id: WidgetId, min_width_dp: f64) {
        self.widths_dp.insert(widget_id, min_width_dp);
    }

    pub fn forget(&mut self, widget_id: WidgetId) {
        self.widths_dp.remove(&widget_id);
    }

    /// Column span of an item. Stacks take the widest member's span; widgets with
    /// no reported size take one column.
    #[must_use]
    pub fn span_of(&self, item: &LauncherItem) -> usize {
        item.widget_ids()
            .into_iter()
            .map(|id| self.widths_dp.get(&id).map_or(1, |width| column_span(*width)))
            .max()
            .unwrap_or(1)
    }

    #[must_use]
    pub fn spans(&self, items: &[LauncherItem]) -> Vec<usize> {
        items.iter().map(|item| self.span_of(item)).collect()
    }
}

/// Moves `candidate` forward until an item of `span` columns fits in the row it
/// would start in, or the end of the list is reached.
///
/// The starting column of an index is the sum of all preceding spans modulo
/// `columns`.
#[must_use]
pub fn packed_index(spans: &[usize], candidate: usize, span: usize, columns: usize) -> usize {
    let mut index = candidate.min(spans.len());
    let mut start: usize = spans[..index].iter().sum::<usize>() % columns;
    while index < spans.len() && start + span > columns {
        start = (start + spans[index]) % columns;
        index += 1;
    }
    index
}

/// Row and column assigned to one item by [`layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
    pub span: usize,
}

/// Lays items out left to right, wrapping an item to the next row when it does not
/// fit in the columns left in the current one.
#[must_use]
pub fn layout(spans: &[usize], columns: usize) -> Vec<GridCell> {
    let mut row = 0;
    let mut column = 0;
    spans
        .iter()
        .map(|span| {
            let span = (*span).clamp(1, columns);
            if column + span > columns {
                row += 1;
                column = 0;
            }
            let cell = GridCell { row, column, span };
            column += span;
            if column == columns {
                row += 1;
                column = 0;
            }
            cell
        })
        .collect()
}
