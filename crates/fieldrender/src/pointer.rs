//! Pointer position on the reference plane and the smoothed press level.

use std::time::{Duration, Instant};

use glam::Vec2;
use tracing::trace;

use crate::camera::{Camera, ReferencePlane};
use crate::state::RenderState;
use crate::tween::{Animated, ElasticOut};

/// Timing and shape of the press animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressSettings {
    pub duration: Duration,
    pub amplitude: f32,
    pub period: f32,
}

impl PressSettings {
    pub fn easing(&self) -> ElasticOut {
        ElasticOut {
            amplitude: self.amplitude,
            period: self.period,
        }
    }
}

impl Default for PressSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(1),
            amplitude: 1.0,
            period: 0.3,
        }
    }
}

/// Maps window-space pixels to `[-1, 1]²` with Y pointing up.
pub fn normalize_pointer(x: f64, y: f64, width: u32, height: u32) -> Option<Vec2> {
    if width == 0 || height == 0 || !x.is_finite() || !y.is_finite() {
        return None;
    }
    let nx = (x / width as f64) * 2.0 - 1.0;
    let ny = -(y / height as f64) * 2.0 + 1.0;
    Some(Vec2::new(nx as f32, ny as f32))
}

pub struct PointerTracker {
    camera: Camera,
    plane: ReferencePlane,
    press: Animated,
}

impl PointerTracker {
    pub fn new(camera: Camera, plane: ReferencePlane, press: PressSettings) -> Self {
        Self {
            camera,
            plane,
            press: Animated::new(0.0, press.duration, press.easing()),
        }
    }

    /// Updates the pointer from a cursor position in physical pixels.
    ///
    /// Returns the new world position on a hit. A miss, or a zero-sized
    /// viewport, leaves `pointer_world` untouched.
    pub fn on_pointer_move(
        &self,
        state: &mut RenderState,
        x: f64,
        y: f64,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Option<Vec2> {
        let ndc = normalize_pointer(x, y, viewport_width, viewport_height)?;
        state.pointer_normalized = ndc;

        let aspect = viewport_width as f32 / viewport_height as f32;
        let ray = self.camera.ray_through(ndc, aspect);
        match self.plane.intersect(&ray) {
            Some(hit) => {
                state.pointer_world = hit;
                Some(hit)
            }
            None => {
                trace!(?ndc, "pointer ray missed the reference plane");
                None
            }
        }
    }

    pub fn on_press_start(&mut self, now: Instant) {
        self.press.retarget(1.0, now);
    }

    pub fn on_press_end(&mut self, now: Instant) {
        self.press.retarget(0.0, now);
    }

    /// Advances the press tween and mirrors it into `state`. Returns whether
    /// the tween is still running.
    pub fn animate(&mut self, state: &mut RenderState, now: Instant) -> bool {
        state.press_level = self.press.advance(now);
        self.press.is_animating()
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(
            Camera::default(),
            ReferencePlane::default(),
            PressSettings::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_with_flipped_y() {
        assert_eq!(normalize_pointer(0.0, 0.0, 800, 600), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(
            normalize_pointer(800.0, 600.0, 800, 600),
            Some(Vec2::new(1.0, -1.0))
        );
        assert_eq!(normalize_pointer(400.0, 300.0, 800, 600), Some(Vec2::ZERO));
        assert_eq!(normalize_pointer(10.0, 10.0, 0, 600), None);
    }

    #[test]
    fn center_of_viewport_hits_origin() {
        let tracker = PointerTracker::default();
        let mut state = RenderState::new();
        state.pointer_world = Vec2::new(50.0, 50.0);
        let hit = tracker
            .on_pointer_move(&mut state, 640.0, 360.0, 1280, 720)
            .expect("hit");
        assert!(hit.length() < 1e-2);
        assert_eq!(state.pointer_world, hit);
    }

    #[test]
    fn upper_right_maps_to_positive_quadrant() {
        let tracker = PointerTracker::default();
        let mut state = RenderState::new();
        let hit = tracker
            .on_pointer_move(&mut state, 1000.0, 100.0, 1280, 720)
            .expect("hit");
        assert!(hit.x > 0.0 && hit.y > 0.0, "hit={hit:?}");
    }

    #[test]
    fn miss_keeps_last_valid_position() {
        let tracker = PointerTracker::default();
        let mut state = RenderState::new();
        tracker.on_pointer_move(&mut state, 700.0, 300.0, 1280, 720);
        let last = state.pointer_world;

        // A 20:1 viewport pushes the edge of the view past the plane.
        assert_eq!(tracker.on_pointer_move(&mut state, 4000.0, 100.0, 4000, 200), None);
        assert_eq!(state.pointer_world, last);
        assert_eq!(state.pointer_normalized, Vec2::new(1.0, 0.0));

        assert_eq!(tracker.on_pointer_move(&mut state, 1.0, 1.0, 0, 0), None);
        assert_eq!(state.pointer_world, last);
    }

    #[test]
    fn press_settles_at_one_and_release_at_zero() {
        let mut tracker = PointerTracker::default();
        let mut state = RenderState::new();
        let start = Instant::now();
        tracker.on_press_start(start);
        assert!(tracker.animate(&mut state, start + Duration::from_millis(100)));
        assert!(!tracker.animate(&mut state, start + Duration::from_millis(1100)));
        assert_eq!(state.press_level, 1.0);

        let release = start + Duration::from_secs(2);
        tracker.on_press_end(release);
        tracker.animate(&mut state, release + Duration::from_secs(2));
        assert_eq!(state.press_level, 0.0);
    }

    #[test]
    fn early_release_retargets_from_in_flight_value() {
        let mut tracker = PointerTracker::default();
        let mut state = RenderState::new();
        let start = Instant::now();
        tracker.on_press_start(start);

        let release = start + Duration::from_millis(20);
        tracker.animate(&mut state, release);
        let in_flight = state.press_level;
        assert!(in_flight > 0.0 && in_flight < 1.0, "in_flight={in_flight}");

        tracker.on_press_end(release);
        tracker.animate(&mut state, release);
        assert!((state.press_level - in_flight).abs() < 1e-6);

        // Past the first press completion the level must not have snapped to 1.
        tracker.animate(&mut state, start + Duration::from_millis(1010));
        assert!((state.press_level - 1.0).abs() > 1e-3);
        tracker.animate(&mut state, release + Duration::from_millis(1001));
        assert_eq!(state.press_level, 0.0);
    }
}
