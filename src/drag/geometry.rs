//! Last-known screen bounds of laid-out items.
//!
//! The renderer reports each item's rectangle whenever it is laid out; drag
//! computations query the live index on every move. Iteration follows key order, so
//! first-match queries are deterministic even when rectangles overlap.

use std::collections::BTreeMap;

use kurbo::{Point, Rect};

/// Result of a nearest-neighbour query.
#[derive(Debug, Clone, PartialEq)]
pub struct Nearest<K> {
    pub key: K,
    /// The query point lies right of the item's centre: insert after it.
    pub insert_after: bool,
}

#[derive(Debug, Clone)]
pub struct GeometryIndex<K> {
    bounds: BTreeMap<K, Rect>,
}

impl<K> Default for GeometryIndex<K> {
    fn default() -> Self {
        Self {
            bounds: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> GeometryIndex<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records or refreshes the bounds of `key`.
    pub fn update(&mut self, key: K, rect: Rect) {
        self.bounds.insert(key, rect);
    }

    pub fn remove(&mut self, key: &K) -> Option<Rect> {
        self.bounds.remove(key)
    }

    /// Drops bounds for keys no longer present, e.g. after a list edit.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.bounds.retain(|key, _| keep(key));
    }

    pub fn clear(&mut self) {
        self.bounds.clear();
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<Rect> {
        self.bounds.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// First item whose bounds contain `point`, skipping `exclude`.
    ///
    /// Containment is half-open: left and top edges are inside, right and bottom
    /// edges are not.
    #[must_use]
    pub fn hit(&self, point: Point, exclude: Option<&K>) -> Option<&K> {
        self.bounds
            .iter()
            .filter(|(key, _)| Some(*key) != exclude)
            .find(|(_, rect)| rect.contains(point))
            .map(|(key, _)| key)
    }

    /// Item whose centre is closest to `point`, skipping `exclude`.
    ///
    /// Distance is squared Euclidean; ties go to the first item in key order.
    #[must_use]
    pub fn nearest(&self, point: Point, exclude: Option<&K>) -> Option<Nearest<K>> {
        let mut best: Option<(&K, Point, f64)> = None;
        for (key, rect) in &self.bounds {
            if Some(key) == exclude {
                continue;
            }
            let center = rect.center();
            let distance = (point - center).hypot2();
            if best.map_or(true, |(_, _, d)| distance < d) {
                best = Some((key, center, distance));
            }
        }
        best.map(|(key, center, _)| Nearest {
            key: key.clone(),
            insert_after: point.x > center.x,
        })
    }
}
