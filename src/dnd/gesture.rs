//! Gesture lifecycle: press, drag, release or cancel.
//!
//! # State Machine
//!
//! ```text
//! Idle --down--> Pending --moved past threshold--> Dragging --up--> Dropped
//!                   |                                  |
//!                   +--up (click)--> Idle              +--cancel--> Cancelled
//! ```
//!
//! `Dropped` and `Cancelled` are terminal for the gesture; the next press
//! starts over from `Idle`.
//!
//! # Invariants
//!
//! 1. A press released before the pointer travels `activation_distance` is a
//!    click and never produces a release.
//! 2. While dragging, the only state that changes is the pointer, the overlay
//!    and the hover candidate. Nothing persisted is touched.
//! 3. The overlay is never a drop zone.

use serde::Serialize;

use super::collision::{self, DragFrame};
use super::geometry::{Point, Rect};
use super::zone::ZoneMap;
use crate::model::entity::{DragSource, DropTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GesturePhase {
    Idle,
    /// Pressed, not yet moved far enough to count as a drag
    Pending,
    Dragging,
    Dropped,
    Cancelled,
}

/// How the overlay leaves the screen on release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DropAnimation {
    /// Snap back toward the origin
    Default,
    /// Sidebar targets swallow the overlay without animating
    None,
}

/// A finished drag: what was picked up and where it landed
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub source: DragSource,
    pub target: Option<DropTarget>,
    pub at: Point,
}

#[derive(Debug, Clone)]
struct Tracker {
    source: DragSource,
    origin: Point,
    pointer: Point,
    /// Overlay box at press time
    origin_rect: Rect,
    candidate: Option<DropTarget>,
}

impl Tracker {
    fn overlay(&self) -> Rect {
        self.origin_rect
            .translate(self.pointer.x - self.origin.x, self.pointer.y - self.origin.y)
    }

    fn resolve(&self, zones: &ZoneMap) -> Option<DropTarget> {
        let frame = DragFrame {
            source: &self.source,
            pointer: self.pointer,
            overlay: self.overlay(),
        };
        collision::resolve(&frame, zones)
    }
}

#[derive(Debug)]
pub struct GestureController {
    activation_distance: f64,
    phase: GesturePhase,
    tracker: Option<Tracker>,
}

impl GestureController {
    pub fn new(activation_distance: f64) -> Self {
        GestureController {
            activation_distance,
            phase: GesturePhase::Idle,
            tracker: None,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == GesturePhase::Dragging
    }

    pub fn source(&self) -> Option<&DragSource> {
        self.tracker.as_ref().map(|t| &t.source)
    }

    /// Zone currently under the drag, for hover feedback only
    pub fn candidate(&self) -> Option<&DropTarget> {
        if !self.is_dragging() {
            return None;
        }
        self.tracker.as_ref().and_then(|t| t.candidate.as_ref())
    }

    pub fn overlay(&self) -> Option<Rect> {
        if !self.is_dragging() {
            return None;
        }
        self.tracker.as_ref().map(Tracker::overlay)
    }

    pub fn drop_animation(&self) -> DropAnimation {
        match self.candidate() {
            Some(target) if target.is_sidebar() => DropAnimation::None,
            _ => DropAnimation::Default,
        }
    }

    /// Press on a draggable. `rect` is the entity's box, which the overlay
    /// copies once the drag starts.
    pub fn pointer_down(&mut self, source: DragSource, at: Point, rect: Rect) {
        self.tracker = Some(Tracker {
            source,
            origin: at,
            pointer: at,
            origin_rect: rect,
            candidate: None,
        });
        self.phase = GesturePhase::Pending;
    }

    /// Track the pointer. Returns true when the hover candidate changed.
    pub fn pointer_move(&mut self, at: Point, zones: &ZoneMap) -> bool {
        let threshold = self.activation_distance;
        let Some(tracker) = self.tracker.as_mut() else {
            return false;
        };
        match self.phase {
            GesturePhase::Pending => {
                tracker.pointer = at;
                if tracker.origin.distance(at) < threshold {
                    return false;
                }
                self.phase = GesturePhase::Dragging;
                tracing::debug!(source = ?tracker.source, "drag started");
            }
            GesturePhase::Dragging => tracker.pointer = at,
            _ => return false,
        }

        let candidate = tracker.resolve(zones);
        if candidate == tracker.candidate {
            return false;
        }
        tracing::debug!(
            candidate = %candidate.as_ref().map(|c| c.to_string()).unwrap_or_default(),
            "drag candidate changed"
        );
        tracker.candidate = candidate;
        true
    }

    /// Release. A drag resolves its target at the release point; a press that
    /// never became a drag returns None.
    pub fn pointer_up(&mut self, at: Point, zones: &ZoneMap) -> Option<Release> {
        match self.phase {
            GesturePhase::Dragging => {
                let mut tracker = self.tracker.take()?;
                tracker.pointer = at;
                let target = tracker.resolve(zones);
                self.phase = GesturePhase::Dropped;
                Some(Release {
                    source: tracker.source,
                    target,
                    at,
                })
            }
            GesturePhase::Pending => {
                self.reset();
                None
            }
            _ => None,
        }
    }

    /// Abort the current drag (Escape). Returns true if a drag was live.
    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.tracker = None;
        self.phase = if was_dragging {
            GesturePhase::Cancelled
        } else {
            GesturePhase::Idle
        };
        was_dragging
    }

    pub fn reset(&mut self) {
        self.tracker = None;
        self.phase = GesturePhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::Container;
    use crate::model::sidebar::SystemTarget;
    use pretty_assertions::assert_eq;

    fn zones() -> ZoneMap {
        let mut zones = ZoneMap::new();
        zones.register(
            DropTarget::SystemTarget {
                target: SystemTarget::Closed,
            },
            Rect::new(0.0, 0.0, 200.0, 40.0),
        );
        zones.register(
            DropTarget::Task {
                id: "t1".into(),
                container: Container::Main,
            },
            Rect::new(300.0, 0.0, 400.0, 50.0),
        );
        zones.register(
            DropTarget::Task {
                id: "t2".into(),
                container: Container::Main,
            },
            Rect::new(300.0, 50.0, 400.0, 50.0),
        );
        zones
    }

    fn press_t2(g: &mut GestureController) {
        g.pointer_down(
            DragSource::Task {
                id: "t2".into(),
                container: Container::Main,
            },
            Point::new(500.0, 75.0),
            Rect::new(300.0, 50.0, 400.0, 50.0),
        );
    }

    #[test]
    fn short_press_is_a_click() {
        let mut g = GestureController::new(8.0);
        press_t2(&mut g);
        assert!(!g.pointer_move(Point::new(503.0, 77.0), &zones()));
        assert_eq!(g.phase(), GesturePhase::Pending);
        assert_eq!(g.pointer_up(Point::new(503.0, 77.0), &zones()), None);
        assert_eq!(g.phase(), GesturePhase::Idle);
    }

    #[test]
    fn drag_starts_past_threshold() {
        let mut g = GestureController::new(8.0);
        press_t2(&mut g);
        // exactly the threshold counts
        g.pointer_move(Point::new(500.0, 67.0), &zones());
        assert!(g.is_dragging());
    }

    #[test]
    fn overlay_follows_pointer() {
        let mut g = GestureController::new(8.0);
        press_t2(&mut g);
        assert_eq!(g.overlay(), None);
        g.pointer_move(Point::new(500.0, 25.0), &zones());
        assert_eq!(g.overlay(), Some(Rect::new(300.0, 0.0, 400.0, 50.0)));
    }

    #[test]
    fn candidate_tracks_hover_and_drives_animation_hint() {
        let mut g = GestureController::new(8.0);
        press_t2(&mut g);
        assert!(g.pointer_move(Point::new(500.0, 25.0), &zones()));
        assert_eq!(
            g.candidate(),
            Some(&DropTarget::Task {
                id: "t1".into(),
                container: Container::Main
            })
        );
        assert_eq!(g.drop_animation(), DropAnimation::Default);

        assert!(g.pointer_move(Point::new(100.0, 20.0), &zones()));
        assert_eq!(g.drop_animation(), DropAnimation::None);
        // same zone again: no change reported
        assert!(!g.pointer_move(Point::new(110.0, 22.0), &zones()));
    }

    #[test]
    fn release_resolves_at_release_point() {
        let mut g = GestureController::new(8.0);
        press_t2(&mut g);
        g.pointer_move(Point::new(500.0, 25.0), &zones());
        let release = g.pointer_up(Point::new(100.0, 20.0), &zones()).unwrap();
        assert_eq!(
            release.target,
            Some(DropTarget::SystemTarget {
                target: SystemTarget::Closed
            })
        );
        assert_eq!(g.phase(), GesturePhase::Dropped);
        assert_eq!(g.candidate(), None);
    }

    #[test]
    fn release_outside_has_no_target() {
        let mut g = GestureController::new(8.0);
        press_t2(&mut g);
        g.pointer_move(Point::new(500.0, 300.0), &zones());
        let release = g.pointer_up(Point::new(500.0, 300.0), &zones()).unwrap();
        assert_eq!(release.target, None);
    }

    #[test]
    fn cancel_ends_drag_without_release() {
        let mut g = GestureController::new(8.0);
        press_t2(&mut g);
        g.pointer_move(Point::new(500.0, 25.0), &zones());
        assert!(g.cancel());
        assert_eq!(g.phase(), GesturePhase::Cancelled);
        assert_eq!(g.pointer_up(Point::new(500.0, 25.0), &zones()), None);
        assert!(!g.cancel());
    }
}
