use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::model::entity::DropTarget;

/// A droppable region registered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropZone {
    pub target: DropTarget,
    pub rect: Rect,
}

impl DropZone {
    pub fn new(target: DropTarget, rect: Rect) -> Self {
        DropZone { target, rect }
    }
}

/// Registered drop zones in registration order. Registration order is the
/// tie-break when two zones score the same.
#[derive(Debug, Clone, Default)]
pub struct ZoneMap {
    zones: Vec<DropZone>,
}

impl ZoneMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone. Re-registering a target updates its rect in place
    /// and keeps its original registration slot.
    pub fn register(&mut self, target: DropTarget, rect: Rect) {
        match self.zones.iter_mut().find(|z| z.target == target) {
            Some(zone) => zone.rect = rect,
            None => self.zones.push(DropZone::new(target, rect)),
        }
    }

    pub fn unregister(&mut self, target: &DropTarget) -> bool {
        let before = self.zones.len();
        self.zones.retain(|z| &z.target != target);
        self.zones.len() != before
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &DropZone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl FromIterator<DropZone> for ZoneMap {
    fn from_iter<I: IntoIterator<Item = DropZone>>(iter: I) -> Self {
        let mut map = ZoneMap::new();
        for zone in iter {
            map.register(zone.target, zone.rect);
        }
        map
    }
}
