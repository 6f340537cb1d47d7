//! Input translation
//!
//! Turns key names and touch gestures into move directions. No game
//! semantics live here.

use glam::Vec2;

use crate::consts::MIN_SWIPE_DISTANCE;
use crate::engine::Direction;

impl Direction {
    /// Map a `KeyboardEvent.key` value (or a terminal key) to a direction
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" | "k" => Some(Direction::Up),
            "ArrowDown" | "s" | "S" | "j" => Some(Direction::Down),
            "ArrowLeft" | "a" | "A" | "h" => Some(Direction::Left),
            "ArrowRight" | "d" | "D" | "l" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Classify a touch gesture from start to end point (screen coordinates)
///
/// The dominant axis wins; gestures shorter than `MIN_SWIPE_DISTANCE` on both
/// axes are taps and yield `None`. Screen Y grows downward.
pub fn classify_swipe(start: Vec2, end: Vec2) -> Option<Direction> {
    let delta = end - start;
    let (ax, ay) = (delta.x.abs(), delta.y.abs());

    if ax < MIN_SWIPE_DISTANCE && ay < MIN_SWIPE_DISTANCE {
        return None;
    }

    if ax > ay {
        Some(if delta.x > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        })
    } else {
        Some(if delta.y > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        })
    }
}

/// Tracks a single touch from `touchstart` to `touchend`
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    start: Option<Vec2>,
}

impl SwipeTracker {
    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some(Vec2::new(x, y));
    }

    /// Finish the gesture; the tracker is reset either way
    pub fn end(&mut self, x: f32, y: f32) -> Option<Direction> {
        let start = self.start.take()?;
        classify_swipe(start, Vec2::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys() {
        assert_eq!(Direction::from_key("ArrowLeft"), Some(Direction::Left));
        assert_eq!(Direction::from_key("ArrowRight"), Some(Direction::Right));
        assert_eq!(Direction::from_key("ArrowUp"), Some(Direction::Up));
        assert_eq!(Direction::from_key("ArrowDown"), Some(Direction::Down));
        assert_eq!(Direction::from_key("s"), Some(Direction::Down));
        assert_eq!(Direction::from_key("Enter"), None);
    }

    #[test]
    fn test_swipe_dominant_axis() {
        let origin = Vec2::new(100.0, 100.0);
        assert_eq!(classify_swipe(origin, Vec2::new(180.0, 120.0)), Some(Direction::Right));
        assert_eq!(classify_swipe(origin, Vec2::new(20.0, 90.0)), Some(Direction::Left));
        assert_eq!(classify_swipe(origin, Vec2::new(110.0, 200.0)), Some(Direction::Down));
        assert_eq!(classify_swipe(origin, Vec2::new(90.0, 10.0)), Some(Direction::Up));
    }

    #[test]
    fn test_short_gesture_is_tap() {
        let origin = Vec2::new(50.0, 50.0);
        assert_eq!(classify_swipe(origin, Vec2::new(75.0, 70.0)), None);
        // Exactly at the threshold on one axis counts as a swipe
        assert_eq!(classify_swipe(origin, Vec2::new(80.0, 50.0)), Some(Direction::Right));
    }

    #[test]
    fn test_tracker_resets() {
        let mut tracker = SwipeTracker::default();
        assert_eq!(tracker.end(10.0, 10.0), None);

        tracker.begin(0.0, 0.0);
        assert_eq!(tracker.end(0.0, -40.0), Some(Direction::Up));
        assert_eq!(tracker.end(0.0, -80.0), None);
    }
}
