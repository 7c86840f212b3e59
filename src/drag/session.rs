//! The single in-flight drag.
//!
//! The controller owns the dragged item's live offset and the drop target under its
//! centre. The item store is not touched until the drag ends, so cancelling only
//! discards the session.

use kurbo::{Point, Rect, Size, Vec2};

use super::geometry::GeometryIndex;
use crate::domain::{ItemKey, WidgetProvider};

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSubject {
    /// An item on the home grid.
    HomeItem(ItemKey),
    /// An app inside the currently expanded folder.
    FolderApp { folder_id: String, package_name: String },
    /// A widget being placed from the widget picker.
    NewWidget { provider: WidgetProvider },
}

impl DragSubject {
    /// Key the subject has in the geometry layer it was picked from, used to exclude
    /// it from its own drop-target queries.
    #[must_use]
    pub fn geometry_key(&self) -> Option<ItemKey> {
        match self {
            Self::HomeItem(key) => Some(key.clone()),
            Self::FolderApp { package_name, .. } => Some(ItemKey::App(package_name.clone())),
            Self::NewWidget { .. } => None,
        }
    }
}

/// Which bounds map drop computations currently read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragLayer {
    Home,
    Folder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    subject: DragSubject,
    origin: Rect,
    offset: Point,
    drop_target: Option<ItemKey>,
    layer: DragLayer,
    folder_overlay_visible: bool,
}

impl DragSession {
    #[must_use]
    pub const fn subject(&self) -> &DragSubject {
        &self.subject
    }

    #[must_use]
    pub const fn origin_bounds(&self) -> Rect {
        self.origin
    }

    /// Current top-left corner of the dragged item.
    #[must_use]
    pub const fn offset(&self) -> Point {
        self.offset
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.origin.size()
    }

    #[must_use]
    pub fn center(&self) -> Point {
        let size = self.size();
        self.offset + Vec2::new(size.width / 2.0, size.height / 2.0)
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.offset, self.size())
    }

    #[must_use]
    pub const fn drop_target(&self) -> Option<&ItemKey> {
        self.drop_target.as_ref()
    }

    #[must_use]
    pub const fn layer(&self) -> DragLayer {
        self.layer
    }

    /// Whether the expanded folder should still be drawn. Only meaningful for
    /// folder-app drags.
    #[must_use]
    pub const fn folder_overlay_visible(&self) -> bool {
        self.folder_overlay_visible
    }
}

#[derive(Debug, Clone)]
pub struct DragController {
    session: Option<DragSession>,
    hysteresis_px: f64,
}

impl DragController {
    /// `hysteresis_px` is how far inside the folder bounds the centre must come back
    /// before a drag that left the folder re-enters it.
    #[must_use]
    pub fn new(hysteresis_px: f64) -> Self {
        Self {
            session: None,
            hysteresis_px,
        }
    }

    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Grid scrolling is disabled for the whole lifetime of a drag.
    #[must_use]
    pub const fn scroll_suppressed(&self) -> bool {
        self.session.is_some()
    }

    /// Begins a drag from `origin` bounds. Refused while another drag is active.
    pub fn start_drag(&mut self, subject: DragSubject, origin: Rect) -> bool {
        if self.session.is_some() {
            tracing::debug!("drag start ignored: session already active");
            return false;
        }
        let in_folder = matches!(subject, DragSubject::FolderApp { .. });
        self.session = Some(DragSession {
            subject,
            origin,
            offset: origin.origin(),
            drop_target: None,
            layer: if in_folder { DragLayer::Folder } else { DragLayer::Home },
            folder_overlay_visible: in_folder,
        });
        true
    }

    /// Adds a pointer delta to the offset, returning the new centre.
    pub fn accumulate(&mut self, delta: Vec2) -> Option<Point> {
        let session = self.session.as_mut()?;
        session.offset += delta;
        Some(session.center())
    }

    /// Switches layers when a folder-app drag crosses the folder's content bounds.
    ///
    /// Leaving `content` moves the drag to the home layer and hides the folder
    /// overlay. Coming back requires the centre to be at least the hysteresis margin
    /// inside `content`, which keeps a drag resting on the edge from flickering.
    pub fn track_folder_boundary(&mut self, content: Option<Rect>) -> Option<DragLayer> {
        let margin = self.hysteresis_px;
        let session = self.session.as_mut()?;
        if !matches!(session.subject, DragSubject::FolderApp { .. }) {
            return Some(session.layer);
        }
        let center = session.center();
        match (session.layer, content) {
            (DragLayer::Folder, Some(rect)) if !rect.contains(center) => {
                tracing::debug!("drag left folder bounds");
                session.layer = DragLayer::Home;
                session.folder_overlay_visible = false;
            }
            (DragLayer::Folder, None) => {
                session.layer = DragLayer::Home;
                session.folder_overlay_visible = false;
            }
            (DragLayer::Home, Some(rect)) if rect.inset(-margin).contains(center) => {
                tracing::debug!("drag re-entered folder bounds");
                session.layer = DragLayer::Folder;
                session.folder_overlay_visible = true;
            }
            _ => {}
        }
        Some(session.layer)
    }

    /// Recomputes the drop target: the first item in `index` whose bounds contain the
    /// dragged centre, never the dragged item itself.
    pub fn compute_drop_target(&mut self, index: &GeometryIndex<ItemKey>) -> Option<&ItemKey> {
        let session = self.session.as_mut()?;
        let exclude = session.subject.geometry_key();
        session.drop_target = index.hit(session.center(), exclude.as_ref()).cloned();
        session.drop_target.as_ref()
    }

    /// Finishes the drag and hands back the final session for placement.
    pub fn end_drag(&mut self) -> Option<DragSession> {
        self.session.take()
    }

    /// Abandons the drag. Returns the discarded session the first time, `None` after.
    pub fn cancel_drag(&mut self) -> Option<DragSession> {
        self.session.take()
    }
}
