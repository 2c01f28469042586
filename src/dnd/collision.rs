//! Collision resolution: which drop zone is the drag currently over.
//!
//! The strategy depends on what is being dragged:
//!
//! - **Labels** prefer task rows whose box intersects the drag overlay (sidebar
//!   zones are ignored for that pass) and fall back to nearest-center over
//!   every zone.
//! - **Workarea tasks** only ever see workarea zones, nearest-center among them.
//! - **Main-list tasks** first test sidebar targets, folders, label chips and
//!   the workarea with a strict pointer-inside test (smallest region wins, then
//!   registration order). Otherwise nearest-center among task rows.
//! - **Everything else** uses nearest-center over the zones compatible with it.
//!
//! # Invariants
//!
//! 1. Resolution is a pure function of the zone map and the drag frame.
//! 2. A pointer that is strictly inside no zone resolves to `None`, which the
//!    classifier reads as "dropped outside".
//! 3. The dragged entity's own zone is never a candidate.

use super::geometry::{Point, Rect};
use super::zone::{DropZone, ZoneMap};
use crate::model::entity::{Container, DragSource, DropTarget};

/// Where the drag is right now
#[derive(Debug, Clone, Copy)]
pub struct DragFrame<'a> {
    pub source: &'a DragSource,
    pub pointer: Point,
    /// The ghost overlay's box, following the pointer
    pub overlay: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    LabelIntersect,
    WorkareaOnly,
    TaskPointerWithin,
    Compatible,
}

pub fn strategy_for(source: &DragSource) -> Strategy {
    match source {
        DragSource::SidebarLabel { .. } | DragSource::TaskLabel { .. } => Strategy::LabelIntersect,
        DragSource::Task {
            container: Container::Workarea,
            ..
        } => Strategy::WorkareaOnly,
        DragSource::Task { .. } => Strategy::TaskPointerWithin,
        _ => Strategy::Compatible,
    }
}

pub fn resolve(frame: &DragFrame<'_>, zones: &ZoneMap) -> Option<DropTarget> {
    let candidates: Vec<&DropZone> = zones
        .iter()
        .filter(|z| !frame.source.is_own_zone(&z.target))
        .collect();

    if !candidates
        .iter()
        .any(|z| z.rect.contains_strict(frame.pointer))
    {
        return None;
    }

    let hit = match strategy_for(frame.source) {
        Strategy::LabelIntersect => best_intersection(
            frame.overlay,
            candidates
                .iter()
                .copied()
                .filter(|z| matches!(z.target, DropTarget::Task { .. })),
        )
        .or_else(|| nearest_center(frame.overlay, candidates.iter().copied())),
        Strategy::WorkareaOnly => nearest_center(
            frame.overlay,
            candidates.iter().copied().filter(|z| z.target.is_workarea()),
        ),
        Strategy::TaskPointerWithin => smallest_containing(
            frame.pointer,
            candidates.iter().copied().filter(|z| is_discrete_target(&z.target)),
        )
        .or_else(|| {
            nearest_center(
                frame.overlay,
                candidates.iter().copied().filter(|z| {
                    matches!(z.target, DropTarget::Task { .. }) && !z.target.is_workarea()
                }),
            )
        }),
        Strategy::Compatible => nearest_center(
            frame.overlay,
            candidates
                .iter()
                .copied()
                .filter(|z| is_compatible(frame.source, &z.target)),
        ),
    };

    hit.map(|z| z.target.clone())
}

/// Targets a task must be pointed at, not merely overlapped
fn is_discrete_target(target: &DropTarget) -> bool {
    target.is_sidebar() || target.is_workarea()
}

fn is_compatible(source: &DragSource, target: &DropTarget) -> bool {
    match source {
        DragSource::Folder { .. } | DragSource::SystemTarget { .. } => {
            target.sidebar_item().is_some()
        }
        DragSource::Attachment { .. } => target.is_workarea(),
        DragSource::SidebarLabel { .. } | DragSource::TaskLabel { .. } => {
            !matches!(target, DropTarget::WorkareaSlot)
        }
        DragSource::Task { .. } => true,
    }
}

fn best_intersection<'a>(
    overlay: Rect,
    zones: impl Iterator<Item = &'a DropZone>,
) -> Option<&'a DropZone> {
    let mut best: Option<(&DropZone, f64)> = None;
    for zone in zones {
        let ratio = overlay.intersection_ratio(&zone.rect);
        if ratio <= 0.0 {
            continue;
        }
        if best.is_none_or(|(_, r)| ratio > r) {
            best = Some((zone, ratio));
        }
    }
    best.map(|(z, _)| z)
}

fn smallest_containing<'a>(
    pointer: Point,
    zones: impl Iterator<Item = &'a DropZone>,
) -> Option<&'a DropZone> {
    let mut best: Option<&DropZone> = None;
    for zone in zones.filter(|z| z.rect.contains_strict(pointer)) {
        if best.is_none_or(|b| zone.rect.area() < b.rect.area()) {
            best = Some(zone);
        }
    }
    best
}

fn nearest_center<'a>(
    overlay: Rect,
    zones: impl Iterator<Item = &'a DropZone>,
) -> Option<&'a DropZone> {
    let center = overlay.center();
    let mut best: Option<(&DropZone, f64)> = None;
    for zone in zones {
        let d = center.distance(zone.rect.center());
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((zone, d));
        }
    }
    best.map(|(z, _)| z)
}
