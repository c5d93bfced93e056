//! Mark definitions for the grading canvas.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for marks.
pub type MarkId = Uuid;

/// Fixed height of a strike mark, in surface units.
pub const STRIKE_HEIGHT: f64 = 6.0;
/// Default strike width, used when a strike is placed without dragging.
pub const STRIKE_DEFAULT_WIDTH: f64 = 48.0;
/// Default extent of a check mark.
pub const CHECK_EXTENT: Size = Size::new(24.0, 24.0);
/// Default extent of a reviewed box.
pub const REVIEWED_EXTENT: Size = Size::new(96.0, 28.0);

/// The kinds of mark a grader can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkKind {
    /// An error strike through a span of text.
    Strike,
    /// A correctness check next to a passage.
    Check,
    /// A "section seen" box over a region.
    Reviewed,
}

impl MarkKind {
    /// The extent used when a mark of this kind is placed with a plain
    /// click, and the fallback for marks stored without one.
    pub fn default_extent(&self) -> Size {
        match self {
            MarkKind::Strike => Size::new(STRIKE_DEFAULT_WIDTH, STRIKE_HEIGHT),
            MarkKind::Check => CHECK_EXTENT,
            MarkKind::Reviewed => REVIEWED_EXTENT,
        }
    }
}

/// A spatial mark placed on the document surface.
///
/// Positions are surface-local (origin at the document's top-left) and
/// independent of scroll or zoom chrome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mark {
    pub(crate) id: MarkId,
    /// What the mark means.
    pub kind: MarkKind,
    /// Top-left position in surface-local coordinates.
    pub origin: Point,
    /// Size of the mark. Strikes always carry one; checks and reviewed
    /// boxes may omit it and fall back to the kind default.
    pub extent: Option<Size>,
    /// True only while a drag-reposition is in progress. Never persisted.
    #[serde(skip)]
    pub(crate) being_moved: bool,
}

impl Mark {
    /// Create a new mark. Strikes without an explicit extent get the
    /// kind default so the width invariant holds from birth.
    pub fn new(kind: MarkKind, origin: Point, extent: Option<Size>) -> Self {
        let extent = match kind {
            MarkKind::Strike => Some(extent.unwrap_or_else(|| kind.default_extent())),
            _ => extent,
        };
        Self {
            id: Uuid::new_v4(),
            kind,
            origin,
            extent,
            being_moved: false,
        }
    }

    /// Get the unique identifier.
    pub fn id(&self) -> MarkId {
        self.id
    }

    /// The extent actually occupied on the surface.
    pub fn effective_extent(&self) -> Size {
        self.extent.unwrap_or_else(|| self.kind.default_extent())
    }

    /// Bounding box in surface-local coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.effective_extent())
    }

    /// Check if a surface-local point hits this mark.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    /// Whether a drag-reposition is currently in progress.
    pub fn is_being_moved(&self) -> bool {
        self.being_moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strike_always_has_extent() {
        let mark = Mark::new(MarkKind::Strike, Point::new(10.0, 20.0), None);
        assert_eq!(mark.extent, Some(MarkKind::Strike.default_extent()));
    }

    #[test]
    fn test_check_falls_back_to_default() {
        let mark = Mark::new(MarkKind::Check, Point::new(0.0, 0.0), None);
        assert!(mark.extent.is_none());
        assert_eq!(mark.effective_extent(), CHECK_EXTENT);
    }

    #[test]
    fn test_bounds() {
        let mark = Mark::new(
            MarkKind::Strike,
            Point::new(10.0, 20.0),
            Some(Size::new(100.0, STRIKE_HEIGHT)),
        );
        let bounds = mark.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 26.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let mark = Mark::new(MarkKind::Reviewed, Point::new(50.0, 50.0), None);
        assert!(mark.hit_test(Point::new(60.0, 60.0), 0.0));
        assert!(!mark.hit_test(Point::new(200.0, 60.0), 0.0));
        assert!(mark.hit_test(Point::new(48.0, 60.0), 4.0)); // Within tolerance
    }

    #[test]
    fn test_moved_flag_not_serialized() {
        let mut mark = Mark::new(MarkKind::Check, Point::new(5.0, 5.0), None);
        mark.being_moved = true;

        let json = serde_json::to_string(&mark).unwrap();
        let restored: Mark = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_being_moved());
        assert_eq!(restored.id(), mark.id());
    }
}
