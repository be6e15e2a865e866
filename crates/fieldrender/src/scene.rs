//! Input handling and frame ticking over a single [`RenderState`].
//!
//! `Scene` is what the window loop talks to. It owns the state and routes
//! each event to the component responsible for it, without knowing anything
//! about winit or wgpu.

use std::time::Instant;

use tracing::{debug, info};

use crate::camera::ReferencePlane;
use crate::frame::{FrameDriver, FrameSnapshot, RenderBackend};
use crate::pointer::PointerTracker;
use crate::state::RenderState;
use crate::transition::{ScrollController, TransitionControl, TransitionSource};
use crate::types::RendererConfig;

/// Keyboard actions bound to the transition control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKey {
    Increase,
    Decrease,
    Minimum,
    Maximum,
}

pub struct Scene {
    state: RenderState,
    pointer: PointerTracker,
    scroll: ScrollController,
    control: TransitionControl,
    driver: FrameDriver,
}

impl Scene {
    pub fn new(config: &RendererConfig) -> Self {
        let control = TransitionControl::new(config.transition_step, config.transition_source);
        if control.source() == TransitionSource::Scroll {
            info!("transition follows the scroll position; keyboard control disabled");
        }
        let scroll = ScrollController::new(config.scroll_scale);
        let driver = FrameDriver::new(config.texture_count(), config.transition_source);
        debug!(
            scroll_scale = scroll.scale(),
            transition_step = control.step(),
            textures = driver.texture_count(),
            "scene ready"
        );
        Self {
            state: RenderState::new().with_transition(config.transition_initial),
            pointer: PointerTracker::new(config.camera, ReferencePlane::default(), config.press),
            scroll,
            control,
            driver,
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64, width: u32, height: u32) {
        self.pointer
            .on_pointer_move(&mut self.state, x, y, width, height);
    }

    pub fn wheel(&mut self, delta: f64) {
        self.scroll.on_scroll(&mut self.state, delta);
    }

    pub fn press(&mut self, pressed: bool, now: Instant) {
        if pressed {
            self.pointer.on_press_start(now);
        } else {
            self.pointer.on_press_end(now);
        }
    }

    pub fn transition_key(&mut self, key: TransitionKey) -> f32 {
        match key {
            TransitionKey::Increase => self.control.nudge(&mut self.state, 1),
            TransitionKey::Decrease => self.control.nudge(&mut self.state, -1),
            TransitionKey::Minimum => self.control.set(&mut self.state, TransitionControl::MIN),
            TransitionKey::Maximum => self.control.set(&mut self.state, TransitionControl::MAX),
        }
    }

    /// Host animation tick. Returns whether the press tween is still running.
    pub fn animate(&mut self, now: Instant) -> bool {
        self.pointer.animate(&mut self.state, now)
    }

    pub fn render<B>(&mut self, backend: &mut B) -> Result<FrameSnapshot, B::Error>
    where
        B: RenderBackend + ?Sized,
    {
        self.driver.tick(&mut self.state, backend)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;

    use super::*;
    use crate::frame::tests::RecordingBackend;
    use crate::transition::TexturePair;

    #[test]
    fn events_flow_into_snapshots() {
        let mut scene = Scene::new(&RendererConfig::default());
        let mut backend = RecordingBackend::default();

        scene.pointer_moved(640.0, 360.0, 1280, 720);
        scene.wheel(4000.0);
        scene.wheel(120.0);
        let snapshot = scene.render(&mut backend).expect("draw");

        assert_eq!(snapshot.frame, 1);
        assert!((snapshot.scroll - 1.03).abs() < 1e-9);
        assert_eq!(snapshot.textures, TexturePair { prev: 1, next: 0 });
        assert!(snapshot.pointer.length() < 1e-2);
        assert_eq!(snapshot.transition, 0.0);
    }

    #[test]
    fn keys_step_the_transition() {
        let mut scene = Scene::new(&RendererConfig::default());
        scene.transition_key(TransitionKey::Increase);
        scene.transition_key(TransitionKey::Increase);
        assert!((scene.state().transition_progress - 0.02).abs() < 1e-6);
        assert_eq!(scene.transition_key(TransitionKey::Maximum), 1.0);
        assert_eq!(scene.transition_key(TransitionKey::Increase), 1.0);
        assert_eq!(scene.transition_key(TransitionKey::Minimum), 0.0);
        assert_eq!(scene.transition_key(TransitionKey::Decrease), 0.0);
    }

    #[test]
    fn initial_transition_comes_from_config() {
        let config = RendererConfig {
            transition_initial: 0.5,
            ..RendererConfig::default()
        };
        let mut scene = Scene::new(&config);
        let mut backend = RecordingBackend::default();
        assert_eq!(scene.render(&mut backend).expect("draw").transition, 0.5);
    }

    #[test]
    fn press_feeds_the_snapshot_after_animation() {
        let mut scene = Scene::new(&RendererConfig::default());
        let mut backend = RecordingBackend::default();
        let start = Instant::now();
        scene.press(true, start);
        assert!(!scene.animate(start + Duration::from_secs(2)));
        let snapshot = scene.render(&mut backend).expect("draw");
        assert_eq!(snapshot.press_level, 1.0);

        scene.press(false, start + Duration::from_secs(3));
        scene.animate(start + Duration::from_secs(5));
        let snapshot = scene.render(&mut backend).expect("draw");
        assert_eq!(snapshot.press_level, 0.0);
    }

    #[test]
    fn pointer_miss_keeps_previous_world_position() {
        let mut scene = Scene::new(&RendererConfig::default());
        scene.pointer_moved(900.0, 200.0, 1280, 720);
        let before = scene.state().pointer_world;
        assert_ne!(before, Vec2::ZERO);
        scene.pointer_moved(5.0, 5.0, 0, 720);
        assert_eq!(scene.state().pointer_world, before);
    }

    #[test]
    fn scroll_source_ignores_keys() {
        let config = RendererConfig {
            transition_source: TransitionSource::Scroll,
            ..RendererConfig::default()
        };
        let mut scene = Scene::new(&config);
        let mut backend = RecordingBackend::default();
        scene.transition_key(TransitionKey::Maximum);
        scene.wheel(1000.0);
        let snapshot = scene.render(&mut backend).expect("draw");
        assert!((snapshot.transition - 0.25).abs() < 1e-6);
    }
}
