//! Per-frame snapshot assembly.
//!
//! The driver is the only reader of [`RenderState`] that talks to the GPU.
//! Each tick produces one consistent [`FrameSnapshot`] and hands it to a
//! [`RenderBackend`].

use glam::Vec2;

use crate::state::RenderState;
use crate::transition::{derive_texture_indices, scroll_progress, TexturePair, TransitionSource};

/// Values uploaded for a single draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    /// Shader clock. Counts frames, not seconds.
    ///
    /// Exact up to `2^24` frames (about 77 hours at 60 Hz). Past that the
    /// `f32` can no longer represent every frame and the clock advances in
    /// steps of two or more frames; `frame` stays exact.
    pub time: f32,
    pub scroll: f64,
    pub pointer: Vec2,
    pub press_level: f32,
    pub transition: f32,
    pub textures: TexturePair,
}

/// Anything that can draw the point field from a snapshot.
pub trait RenderBackend {
    type Error;

    fn draw(&mut self, snapshot: &FrameSnapshot) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy)]
pub struct FrameDriver {
    texture_count: usize,
    source: TransitionSource,
}

impl FrameDriver {
    pub fn new(texture_count: usize, source: TransitionSource) -> Self {
        Self {
            texture_count: texture_count.max(2),
            source,
        }
    }

    pub fn texture_count(&self) -> usize {
        self.texture_count
    }

    /// Builds the snapshot for the next frame, advancing the frame counter.
    pub fn snapshot(&self, state: &mut RenderState) -> FrameSnapshot {
        state.frame_count += 1;
        if self.source == TransitionSource::Scroll {
            state.transition_progress = scroll_progress(state.scroll_accumulator);
        }
        FrameSnapshot {
            frame: state.frame_count,
            time: state.frame_count as f32,
            scroll: state.scroll_accumulator,
            pointer: state.pointer_world,
            press_level: state.press_level,
            transition: state.transition_progress,
            textures: derive_texture_indices(state.scroll_accumulator, self.texture_count),
        }
    }

    /// Runs one frame: snapshot then draw. Draw failures are returned as-is.
    pub fn tick<B>(&self, state: &mut RenderState, backend: &mut B) -> Result<FrameSnapshot, B::Error>
    where
        B: RenderBackend + ?Sized,
    {
        let snapshot = self.snapshot(state);
        backend.draw(&snapshot)?;
        Ok(snapshot)
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(2, TransitionSource::Manual)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Backend that records every snapshot it is asked to draw.
    #[derive(Default)]
    pub(crate) struct RecordingBackend {
        pub frames: Vec<FrameSnapshot>,
        pub fail_at: Option<u64>,
    }

    impl RenderBackend for RecordingBackend {
        type Error = String;

        fn draw(&mut self, snapshot: &FrameSnapshot) -> Result<(), Self::Error> {
            if self.fail_at == Some(snapshot.frame) {
                return Err(format!("draw failed at frame {}", snapshot.frame));
            }
            self.frames.push(*snapshot);
            Ok(())
        }
    }

    #[test]
    fn counts_every_tick() {
        let driver = FrameDriver::default();
        let mut state = RenderState::new();
        let mut backend = RecordingBackend::default();
        for _ in 0..10_000 {
            driver.tick(&mut state, &mut backend).expect("draw");
        }
        assert_eq!(state.frame_count, 10_000);
        assert_eq!(backend.frames.len(), 10_000);
        assert_eq!(backend.frames[9_999].time, 10_000.0);
    }

    #[test]
    fn time_is_exact_until_f32_mantissa_runs_out() {
        let driver = FrameDriver::default();
        let mut state = RenderState::new();
        state.frame_count = (1 << 24) - 2;
        let snapshot = driver.snapshot(&mut state);
        assert_eq!(snapshot.frame, (1 << 24) - 1);
        assert_eq!(snapshot.time, 16_777_215.0);

        state.frame_count = 1 << 24;
        let snapshot = driver.snapshot(&mut state);
        assert_eq!(snapshot.frame, (1 << 24) + 1);
        assert_eq!(snapshot.time, 16_777_216.0);
    }

    #[test]
    fn idle_scroll_keeps_first_pair() {
        let driver = FrameDriver::default();
        let mut state = RenderState::new();
        let mut backend = RecordingBackend::default();
        for _ in 0..100 {
            driver.tick(&mut state, &mut backend).expect("draw");
        }
        assert!(backend
            .frames
            .iter()
            .all(|frame| frame.textures == TexturePair { prev: 0, next: 1 }));
    }

    #[test]
    fn snapshot_mirrors_state() {
        let driver = FrameDriver::default();
        let mut state = RenderState::new().with_transition(0.4);
        state.scroll_accumulator = 1.25;
        state.pointer_world = Vec2::new(12.0, -3.0);
        state.press_level = 0.7;
        let snapshot = driver.snapshot(&mut state);
        assert_eq!(snapshot.frame, 1);
        assert_eq!(snapshot.scroll, 1.25);
        assert_eq!(snapshot.pointer, Vec2::new(12.0, -3.0));
        assert_eq!(snapshot.press_level, 0.7);
        assert_eq!(snapshot.transition, 0.4);
        assert_eq!(snapshot.textures, TexturePair { prev: 1, next: 0 });
    }

    #[test]
    fn scroll_source_drives_transition() {
        let driver = FrameDriver::new(2, TransitionSource::Scroll);
        let mut state = RenderState::new();
        state.scroll_accumulator = 2.75;
        let snapshot = driver.snapshot(&mut state);
        assert!((snapshot.transition - 0.75).abs() < 1e-6);
        assert!((state.transition_progress - 0.75).abs() < 1e-6);
    }

    #[test]
    fn draw_failure_is_returned() {
        let driver = FrameDriver::default();
        let mut state = RenderState::new();
        let mut backend = RecordingBackend {
            fail_at: Some(3),
            ..Default::default()
        };
        driver.tick(&mut state, &mut backend).expect("frame 1");
        driver.tick(&mut state, &mut backend).expect("frame 2");
        let err = driver.tick(&mut state, &mut backend).unwrap_err();
        assert_eq!(err, "draw failed at frame 3");
        assert_eq!(backend.frames.len(), 2);
    }
}
