use std::path::PathBuf;

use crate::camera::Camera;
use crate::field::GridSize;
use crate::pointer::PressSettings;
use crate::transition::{TransitionSource, DEFAULT_SCROLL_SCALE};

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Immutable configuration passed to the renderer at start-up.
///
/// Built by the binary from the config file and CLI flags. Every field has a
/// usable default, so `RendererConfig::default()` opens a window with two
/// placeholder textures.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    pub grid: GridSize,
    /// Seed for the per-point attributes; entropy when `None`.
    pub seed: Option<u64>,
    /// Content images, blended pairwise as the scroll accumulator moves.
    pub textures: Vec<PathBuf>,
    pub mask: Option<PathBuf>,
    /// Wheel units per texture step.
    pub scroll_scale: f64,
    pub press: PressSettings,
    pub transition_source: TransitionSource,
    pub transition_initial: f32,
    pub transition_step: f32,
    pub camera: Camera,
    pub antialiasing: Antialiasing,
    /// GLSL 450 overrides for the built-in point shaders.
    pub vertex_shader: Option<PathBuf>,
    pub fragment_shader: Option<PathBuf>,
}

impl RendererConfig {
    /// Number of texture slots the scene cycles through. Never below two.
    pub fn texture_count(&self) -> usize {
        self.textures.len().max(2)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            grid: GridSize::default(),
            seed: None,
            textures: Vec::new(),
            mask: None,
            scroll_scale: DEFAULT_SCROLL_SCALE,
            press: PressSettings::default(),
            transition_source: TransitionSource::default(),
            transition_initial: 0.0,
            transition_step: 0.01,
            camera: Camera::default(),
            antialiasing: Antialiasing::default(),
            vertex_shader: None,
            fragment_shader: None,
        }
    }
}
