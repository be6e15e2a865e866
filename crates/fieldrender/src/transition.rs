//! Scroll accumulation and texture-pair selection.
//!
//! The scroll accumulator is a continuous value; its integer part picks the
//! pair of textures being blended and every whole unit swaps the pair.

use tracing::{debug, info, trace};

use crate::state::RenderState;

/// Wheel units per whole texture step.
pub const DEFAULT_SCROLL_SCALE: f64 = 4000.0;

/// Indices into the texture palette for the current blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TexturePair {
    pub prev: usize,
    pub next: usize,
}

/// Maps a scroll position onto `(prev, next)` texture indices.
///
/// Uses a Euclidean remainder, so negative and very large accumulators still
/// select valid slots. Non-finite input falls back to the first pair.
pub fn derive_texture_indices(scroll: f64, texture_count: usize) -> TexturePair {
    let count = texture_count.max(1) as i64;
    let base = if scroll.is_finite() {
        scroll.floor() as i64
    } else {
        0
    };
    let prev = base.rem_euclid(count);
    let next = (prev + 1) % count;
    TexturePair {
        prev: prev as usize,
        next: next as usize,
    }
}

/// Fractional position between the current pair, in `[0, 1)`.
pub fn scroll_progress(scroll: f64) -> f32 {
    if !scroll.is_finite() {
        return 0.0;
    }
    (scroll - scroll.floor()) as f32
}

/// Where `transition_progress` comes from each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionSource {
    /// Only the debug control changes the blend.
    #[default]
    Manual,
    /// The blend follows [`scroll_progress`] of the accumulator.
    Scroll,
}

/// Turns wheel input into scroll accumulator movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollController {
    scale: f64,
}

impl ScrollController {
    pub fn new(scale: f64) -> Self {
        let scale = if scale.is_finite() && scale != 0.0 {
            scale
        } else {
            DEFAULT_SCROLL_SCALE
        };
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn on_scroll(&self, state: &mut RenderState, wheel_delta: f64) {
        if !wheel_delta.is_finite() {
            trace!(wheel_delta, "ignoring non-finite wheel delta");
            return;
        }
        state.scroll_accumulator += wheel_delta / self.scale;
    }
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_SCALE)
    }
}

/// Numeric debug control bound to `transition_progress`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionControl {
    step: f32,
    source: TransitionSource,
}

impl TransitionControl {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 1.0;

    pub fn new(step: f32, source: TransitionSource) -> Self {
        let step = if step > 0.0 && step <= 1.0 { step } else { 0.01 };
        Self { step, source }
    }

    pub fn source(&self) -> TransitionSource {
        self.source
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Writes `value`, snapped to the step grid and clamped, and returns what
    /// was stored.
    pub fn set(&self, state: &mut RenderState, value: f32) -> f32 {
        if self.source == TransitionSource::Scroll {
            debug!("transition follows scroll; ignoring manual edit");
            return state.transition_progress;
        }
        if !value.is_finite() {
            return state.transition_progress;
        }
        let snapped = ((value / self.step).round() * self.step).clamp(Self::MIN, Self::MAX);
        state.transition_progress = snapped;
        info!(transition = snapped, "transition progress updated");
        snapped
    }

    pub fn nudge(&self, state: &mut RenderState, steps: i32) -> f32 {
        let value = state.transition_progress + steps as f32 * self.step;
        self.set(state, value)
    }
}

impl Default for TransitionControl {
    fn default() -> Self {
        Self::new(0.01, TransitionSource::Manual)
    }
}
