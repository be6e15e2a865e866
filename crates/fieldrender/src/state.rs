use glam::Vec2;

/// Mutable per-process scene state shared by the input handlers and the
/// frame driver.
///
/// Handlers and the frame tick all run on the event-loop thread and each runs
/// to completion, so the state is passed around as `&mut` without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// Frames submitted so far. Never reset.
    pub frame_count: u64,
    /// Sum of normalised wheel deltas. Unbounded in both directions.
    pub scroll_accumulator: f64,
    /// Last pointer position in `[-1, 1]²`, Y up.
    pub pointer_normalized: Vec2,
    /// Last valid pointer hit on the reference plane. Starts at the origin.
    pub pointer_world: Vec2,
    pub press_level: f32,
    /// Blend between the previous and next texture, within `[0, 1]`.
    pub transition_progress: f32,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transition(mut self, progress: f32) -> Self {
        self.transition_progress = progress.clamp(0.0, 1.0);
        self
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            frame_count: 0,
            scroll_accumulator: 0.0,
            pointer_normalized: Vec2::ZERO,
            pointer_world: Vec2::ZERO,
            press_level: 0.0,
            transition_progress: 0.0,
        }
    }
}
