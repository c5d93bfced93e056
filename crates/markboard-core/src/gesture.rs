//! Gesture interpretation for the grading surface.
//!
//! Turns pointer-down / move / up sequences into exactly one of: a new
//! mark, a reposition of an existing mark, or nothing. Handlers never
//! return errors; a failure mid-gesture drops the gesture quietly so the
//! state machine cannot get stuck.

use crate::input::{ActivationTracker, PointerEvent};
use crate::mark::{MarkId, MarkKind, STRIKE_HEIGHT};
use crate::store::MarkStore;
use crate::tools::ToolSelector;
use kurbo::{Point, Size, Vec2};

/// Hit tolerance for grabbing an existing mark, in surface units.
pub const GRAB_TOLERANCE: f64 = 4.0;

/// Phase of the gesture state machine.
#[derive(Debug, Clone, Copy, Default)]
pub enum GesturePhase {
    /// Waiting for a press.
    #[default]
    Idle,
    /// A press on empty surface with a tool active; release places a mark.
    Creating {
        kind: MarkKind,
        start: Point,
        current: Point,
        /// Whether any pointer-move arrived since the press.
        moved: bool,
    },
    /// A press landed on an existing mark; moves drag it.
    Moving { id: MarkId, grab_offset: Vec2 },
}

/// What a pointer event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// No observable store change.
    None,
    /// A move gesture grabbed an existing mark.
    Grabbed(MarkId),
    /// The grabbed mark was dragged to a new origin.
    Dragged(MarkId),
    /// The grabbed mark was released in place.
    Released(MarkId),
    /// A completed gesture placed a new mark.
    Created(MarkId),
    /// A double-activation deleted a mark.
    Removed(MarkId),
}

/// Converts pointer events into mark placement and repositioning.
#[derive(Debug, Clone, Default)]
pub struct GestureEngine {
    phase: GesturePhase,
    tracker: ActivationTracker,
    /// Last known in-bounds pointer position; the implicit release point
    /// when the pointer leaves the surface.
    last_position: Point,
}

impl GestureEngine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, GesturePhase::Idle)
    }

    /// The current phase, for host preview rendering.
    pub fn phase(&self) -> &GesturePhase {
        &self.phase
    }

    /// Feed one pointer event through the state machine.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        store: &mut MarkStore,
        tools: &ToolSelector,
    ) -> GestureOutcome {
        match event {
            PointerEvent::Down { position } => self.on_down(position, store, tools),
            PointerEvent::Move { position } => self.on_move(position, store),
            PointerEvent::Up { position } => self.on_up(position, store),
            PointerEvent::Leave => self.on_leave(store),
        }
    }

    fn on_down(
        &mut self,
        position: Point,
        store: &mut MarkStore,
        tools: &ToolSelector,
    ) -> GestureOutcome {
        self.last_position = position;

        // A press while a gesture is somehow still active (missed
        // release) starts over; clear any stale move flag first.
        if let GesturePhase::Moving { id, .. } = std::mem::take(&mut self.phase) {
            store.end_move(id);
        }

        let double = self.tracker.record_press(position);
        let hit = store.mark_at_point(position, GRAB_TOLERANCE);

        if double {
            if let Some(id) = hit {
                return match store.remove(id) {
                    Ok(_) => GestureOutcome::Removed(id),
                    Err(err) => {
                        log::debug!("delete gesture ignored: {err}");
                        GestureOutcome::None
                    }
                };
            }
        }

        if let Some(id) = hit {
            // Grabbing an existing mark wins over placing a new one,
            // whatever tool is selected.
            let Some(origin) = store.get(id).map(|m| m.origin) else {
                return GestureOutcome::None;
            };
            if let Err(err) = store.begin_move(id) {
                log::debug!("move gesture not started: {err}");
                return GestureOutcome::None;
            }
            self.phase = GesturePhase::Moving {
                id,
                grab_offset: position - origin,
            };
            return GestureOutcome::Grabbed(id);
        }

        if let Some(kind) = tools.current() {
            self.phase = GesturePhase::Creating {
                kind,
                start: position,
                current: position,
                moved: false,
            };
        }
        GestureOutcome::None
    }

    fn on_move(&mut self, position: Point, store: &mut MarkStore) -> GestureOutcome {
        self.last_position = position;
        match &mut self.phase {
            GesturePhase::Idle => GestureOutcome::None,
            GesturePhase::Creating { current, moved, .. } => {
                // Tracked for the final extent only; the store is not
                // touched until release.
                *current = position;
                *moved = true;
                GestureOutcome::None
            }
            GesturePhase::Moving { id, grab_offset } => {
                let id = *id;
                let target = clamp_to_surface(position - *grab_offset);
                match store.move_to(id, target) {
                    Ok(()) => GestureOutcome::Dragged(id),
                    Err(err) => {
                        // The mark vanished mid-drag; drop the gesture.
                        log::debug!("move gesture aborted: {err}");
                        self.phase = GesturePhase::Idle;
                        GestureOutcome::None
                    }
                }
            }
        }
    }

    fn on_up(&mut self, position: Point, store: &mut MarkStore) -> GestureOutcome {
        self.last_position = position;
        match std::mem::take(&mut self.phase) {
            GesturePhase::Idle => GestureOutcome::None,
            GesturePhase::Moving { id, .. } => {
                store.end_move(id);
                GestureOutcome::Released(id)
            }
            GesturePhase::Creating {
                kind, start, moved, ..
            } => {
                let (origin, extent) = placement(kind, start, position, moved);
                match store.add(kind, origin, Some(extent)) {
                    Ok(id) => GestureOutcome::Created(id),
                    Err(err) => {
                        log::warn!("mark placement failed: {err}");
                        GestureOutcome::None
                    }
                }
            }
        }
    }

    fn on_leave(&mut self, store: &mut MarkStore) -> GestureOutcome {
        if !self.is_active() {
            return GestureOutcome::None;
        }
        // Surface exit resolves as a release at the last in-bounds point.
        self.on_up(self.last_position, store)
    }
}

/// Marks may never sit at negative surface coordinates. There is no
/// upper clamp; the document can grow downward and rightward.
fn clamp_to_surface(p: Point) -> Point {
    Point::new(p.x.max(0.0), p.y.max(0.0))
}

/// Final origin and extent for a completed create gesture.
fn placement(kind: MarkKind, start: Point, end: Point, moved: bool) -> (Point, Size) {
    if !moved {
        // A plain click places the kind's default footprint at the
        // press point.
        return (start, kind.default_extent());
    }
    let origin = Point::new(start.x.min(end.x), start.y.min(end.y));
    let extent = match kind {
        MarkKind::Strike => Size::new((end.x - start.x).abs(), STRIKE_HEIGHT),
        other => other.default_extent(),
    };
    (origin, extent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::STRIKE_DEFAULT_WIDTH;

    fn down(p: (f64, f64)) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(p.0, p.1),
        }
    }

    fn mv(p: (f64, f64)) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(p.0, p.1),
        }
    }

    fn up(p: (f64, f64)) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(p.0, p.1),
        }
    }

    #[test]
    fn test_drag_creates_strike_with_gesture_width() {
        let mut engine = GestureEngine::new();
        let mut store = MarkStore::new();
        let mut tools = ToolSelector::new();
        tools.select(MarkKind::Strike);

        engine.handle(down((100.0, 40.0)), &mut store, &tools);
        engine.handle(mv((160.0, 42.0)), &mut store, &tools);
        let outcome = engine.handle(up((160.0, 42.0)), &mut store, &tools);

        let GestureOutcome::Created(id) = outcome else {
            panic!("expected a created mark, got {outcome:?}");
        };
        let mark = store.get(id).unwrap();
        assert_eq!(mark.kind, MarkKind::Strike);
        assert_eq!(mark.origin, Point::new(100.0, 40.0));
        assert_eq!(mark.extent, Some(Size::new(60.0, STRIKE_HEIGHT)));
        // The tool stays selected for repeated placements.
        assert_eq!(tools.current(), Some(MarkKind::Strike));
    }

    #[test]
    fn test_leftward_drag_normalizes_origin() {
        let mut engine = GestureEngine::new();
        let mut store = MarkStore::new();
        let mut tools = ToolSelector::new();
        tools.select(MarkKind::Strike);

        engine.handle(down((160.0, 40.0)), &mut store, &tools);
        engine.handle(mv((100.0, 40.0)), &mut store, &tools);
        let outcome = engine.handle(up((100.0, 40.0)), &mut store, &tools);

        let GestureOutcome::Created(id) = outcome else {
            panic!("expected a created mark");
        };
        let mark = store.get(id).unwrap();
        assert_eq!(mark.origin, Point::new(100.0, 40.0));
        assert_eq!(mark.extent, Some(Size::new(60.0, STRIKE_HEIGHT)));
    }

    #[test]
    fn test_zero_drag_click_places_default_extent() {
        let mut engine = GestureEngine::new();
        let mut store = MarkStore::new();
        let mut tools = ToolSelector::new();
        tools.select(MarkKind::Strike);

        engine.handle(down((30.0, 30.0)), &mut store, &tools);
        let outcome = engine.handle(up((30.0, 30.0)), &mut store, &tools);

        let GestureOutcome::Created(id) = outcome else {
            panic!("expected a created mark");
        };
        assert_eq!(store.len(), 1);
        let mark = store.get(id).unwrap();
        assert_eq!(mark.origin, Point::new(30.0, 30.0));
        assert_eq!(
            mark.extent,
            Some(Size::new(STRIKE_DEFAULT_WIDTH, STRIKE_HEIGHT))
        );
    }

    #[test]
    fn test_check_extent_ignores_drag_distance() {
        let mut engine = GestureEngine::new();
        let mut store = MarkStore::new();
        let mut tools = ToolSelector::new();
        tools.select(MarkKind::Check);

        engine.handle(down((10.0, 10.0)), &mut store, &tools);
        engine.handle(mv((300.0, 300.0)), &mut store, &tools);
        let outcome = engine.handle(up((300.0, 300.0)), &mut store, &tools);

        let GestureOutcome::Created(id) = outcome else {
            panic!("expected a created mark");
        };
        let mark = store.get(id).unwrap();
        assert_eq!(mark.origin, Point::new(10.0, 10.0));
        assert_eq!(mark.effective_extent(), MarkKind::Check.default_extent());
    }

    #[test]
    fn test_no_tool_no_mark() {
        let mut engine = GestureEngine::new();
        let mut store = MarkStore::new();
        let tools = ToolSelector::new();

        engine.handle(down((10.0, 10.0)), &mut store, &tools);
        engine.handle(mv((50.0, 50.0)), &mut store, &tools);
        let outcome = engine.handle(up((50.0, 50.0)), &mut store, &tools);

        assert_eq!(outcome, GestureOutcome::None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_grab_wins_over_create() {
        let mut engine = GestureEngine::new();
        let mut store = MarkStore::new();
        let mut tools = ToolSelector::new();
        tools.select(MarkKind::Check);

        let id = store
            .add(MarkKind::Strike, Point::new(10.0, 10.0), None)
            .unwrap();
        let extent = store.get(id).unwrap().extent;

        let outcome = engine.handle(down((10.0, 10.0)), &mut store, &tools);
        assert_eq!(outcome, GestureOutcome::Grabbed(id));
        engine.handle(mv((50.0, 50.0)), &mut store, &tools);
        engine.handle(up((50.0, 50.0)), &mut store, &tools);

        // Exactly one mark, repositioned, extent untouched, nothing new.
        assert_eq!(store.len(), 1);
        let mark = store.get(id).unwrap();
        assert_eq!(mark.origin, Point::new(50.0, 50.0));
        assert_eq!(mark.extent, extent);
        assert!(!mark.is_being_moved());
    }

    #[test]
    fn test_grab_offset_is_preserved() {
        let mut engine = GestureEngine::new();
        let mut store = MarkStore::new();
        let tools = ToolSelector::new();

        let id = store
            .add(MarkKind::Reviewed, Point::new(100.0, 100.0), None)
            .unwrap();

        // Grab 20 units into the box; the origin keeps that offset.
        engine.handle(down((120.0, 110.0)), &mut store, &tools);
        engine.handle(mv((220.0, 210.0)), &mut store, &tools);
        engine.handle(up((220.0, 210.0)), &mut store, &tools);

        assert_eq!(store.get(id).unwrap().origin, Point::new(200.0, 200.0));
    }

    #[test]
    fn test_move_clamps_at_zero() {
        let mut engine = GestureEngine::new();
        let mut store = MarkStore::new();
        let tools = ToolSelector::new();

        let id = store
            .add(MarkKind::Check, Point::new(30.0, 30.0), None)
            .unwrap();

        engine.handle(down((30.0, 30.0)), &mut store, &tools);
        engine.handle(mv((-50.0, -50.0)), &mut store, &tools);
        engine.handle(up((-50.0, -50.0)), &mut store, &tools);

        assert_eq!(store.get(id).unwrap().origin, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_surface_leave_resolves_creation() {
        let mut engine = GestureEngine::new();
        let mut store = MarkStore::new();
        let mut tools = ToolSelector::new();
        tools.select(MarkKind::Strike);

        engine.handle(down((10.0, 10.0)), &mut store, &tools);
        engine.handle(mv((90.0, 12.0)), &mut store, &tools);
        let outcome = engine.handle(PointerEvent::Leave, &mut store, &tools);

        // Resolved as a release at the last in-bounds position.
        let GestureOutcome::Created(id) = outcome else {
            panic!("expected a created mark");
        };
        assert_eq!(
            store.get(id).unwrap().extent,
            Some(Size::new(80.0, STRIKE_HEIGHT))
        );
        assert!(!engine.is_active());
    }

    #[test]
    fn test_leave_while_idle_is_noop() {
        let mut engine = GestureEngine::new();
        let mut store = MarkStore::new();
        let tools = ToolSelector::new();

        let outcome = engine.handle(PointerEvent::Leave, &mut store, &tools);
        assert_eq!(outcome, GestureOutcome::None);
    }

    #[test]
    fn test_vanished_mark_aborts_gesture() {
        let mut engine = GestureEngine::new();
        let mut store = MarkStore::new();
        let tools = ToolSelector::new();

        let id = store
            .add(MarkKind::Check, Point::new(10.0, 10.0), None)
            .unwrap();
        engine.handle(down((10.0, 10.0)), &mut store, &tools);
        store.remove(id).unwrap();

        let outcome = engine.handle(mv((60.0, 60.0)), &mut store, &tools);
        assert_eq!(outcome, GestureOutcome::None);
        assert!(!engine.is_active());

        // Subsequent events stay quiet instead of wedging the machine.
        let outcome = engine.handle(up((60.0, 60.0)), &mut store, &tools);
        assert_eq!(outcome, GestureOutcome::None);
    }

    #[test]
    fn test_double_activation_removes_mark() {
        let mut engine = GestureEngine::new();
        let mut store = MarkStore::new();
        let tools = ToolSelector::new();

        let id = store
            .add(MarkKind::Strike, Point::new(10.0, 10.0), None)
            .unwrap();

        engine.handle(down((12.0, 12.0)), &mut store, &tools);
        engine.handle(up((12.0, 12.0)), &mut store, &tools);
        let outcome = engine.handle(down((12.0, 12.0)), &mut store, &tools);

        assert_eq!(outcome, GestureOutcome::Removed(id));
        assert!(store.is_empty());
        assert!(!engine.is_active());
    }
}
