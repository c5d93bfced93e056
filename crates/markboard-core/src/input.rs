//! Pointer input types for the grading surface.
//!
//! The host delivers coordinates already translated into surface-local
//! space (origin at the document's top-left). Nothing here touches the
//! windowing layer.

use kurbo::Point;
use serde::{Deserialize, Serialize};

// Use web-time on WASM, std::time otherwise
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Pointer event in surface-local coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Primary button pressed.
    Down { position: Point },
    /// Pointer moved while tracked.
    Move { position: Point },
    /// Primary button released.
    Up { position: Point },
    /// Pointer left the tracked surface without a release.
    Leave,
}

/// Double-activation detection constants.
const DOUBLE_ACTIVATION_TIME_MS: u128 = 500;
const DOUBLE_ACTIVATION_DISTANCE: f64 = 5.0;

/// Detects double-activation (two presses close in time and space),
/// the delete gesture on an existing mark.
#[derive(Debug, Clone, Default)]
pub struct ActivationTracker {
    last_press_time: Option<Instant>,
    last_press_position: Option<Point>,
}

impl ActivationTracker {
    /// Create a new tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press and report whether it completed a double-activation.
    pub fn record_press(&mut self, position: Point) -> bool {
        let now = Instant::now();
        if let (Some(last_time), Some(last_pos)) = (self.last_press_time, self.last_press_position)
        {
            let elapsed = now.duration_since(last_time).as_millis();
            let distance =
                ((position.x - last_pos.x).powi(2) + (position.y - last_pos.y).powi(2)).sqrt();

            if elapsed < DOUBLE_ACTIVATION_TIME_MS && distance < DOUBLE_ACTIVATION_DISTANCE {
                // Reset so a triple press is not read as another double.
                self.last_press_time = None;
                self.last_press_position = None;
                return true;
            }
        }
        self.last_press_time = Some(now);
        self.last_press_position = Some(position);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_press_is_not_double() {
        let mut tracker = ActivationTracker::new();
        assert!(!tracker.record_press(Point::new(100.0, 100.0)));
    }

    #[test]
    fn test_double_activation() {
        let mut tracker = ActivationTracker::new();
        let pos = Point::new(100.0, 100.0);

        assert!(!tracker.record_press(pos));
        assert!(tracker.record_press(pos));
        // Third press starts a fresh cycle.
        assert!(!tracker.record_press(pos));
    }

    #[test]
    fn test_double_activation_too_far() {
        let mut tracker = ActivationTracker::new();

        assert!(!tracker.record_press(Point::new(100.0, 100.0)));
        assert!(!tracker.record_press(Point::new(200.0, 200.0)));
    }
}
