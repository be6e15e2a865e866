//! Interactive GPU point field that crossfades between images on scroll.
//!
//! The overall flow is:
//!
//! ```text
//!   CLI / pointfade
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop
//!                          │              │ pointer / wheel / keys
//!                          │              ▼
//!                          │            Scene ──▶ RenderState
//!                          │              │ RedrawRequested
//!                          ▼              ▼
//!                       GpuState ◀── FrameDriver::tick ──▶ FrameSnapshot
//! ```
//!
//! The point field is built once ([`field`]) and uploaded as six parallel
//! vertex buffers. Input handlers and the frame tick share one
//! [`RenderState`] on the event-loop thread; every tick produces a single
//! [`FrameSnapshot`] that the wgpu backend turns into uniforms and a draw.

pub mod camera;
pub mod field;
pub mod frame;
mod gpu;
pub mod pointer;
pub mod scene;
pub mod shaders;
pub mod state;
pub mod transition;
pub mod tween;
mod types;
mod window;

use anyhow::Result;

pub use camera::{Camera, ReferencePlane};
pub use field::{FieldBuilder, GridSize, PointField, PointRecord};
pub use frame::{FrameDriver, FrameSnapshot, RenderBackend};
pub use pointer::{PointerTracker, PressSettings};
pub use scene::{Scene, TransitionKey};
pub use state::RenderState;
pub use transition::{
    derive_texture_indices, ScrollController, TexturePair, TransitionControl, TransitionSource,
};
pub use types::{Antialiasing, RendererConfig};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the window and runs until it closes or the surface fails.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!(
            grid = %format!("{}x{}", self.config.grid.width, self.config.grid.height),
            textures = self.config.textures.len(),
            source = ?self.config.transition_source,
            "starting renderer"
        );
        window::run(&self.config)
    }
}
