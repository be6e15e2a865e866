//! wgpu backend for the point field.
//!
//! - `context` owns instance/device/surface wiring and rebuilds the swapchain
//!   when the window resizes.
//! - `textures` decodes the content images and mask, substituting
//!   placeholders for anything that fails to load.
//! - `pipeline` uploads the per-point attribute buffers and builds the
//!   point-list pipeline from the GLSL stages.
//! - `uniforms` mirrors the `FieldParams` block.
//! - `state` glues everything together and implements
//!   [`crate::frame::RenderBackend`].

mod context;
mod pipeline;
mod state;
mod textures;
mod uniforms;

pub(crate) use state::GpuState;
