use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::field::GridSize;
use crate::frame::FrameSnapshot;

/// CPU mirror of the `FieldParams` std140 block.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FieldUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub mouse: [f32; 2],
    pub grid: [f32; 2],
    /// Always zero; kept so shaders written against the full uniform set link.
    pub progress: f32,
    pub mouse_pressed: f32,
    pub transition: f32,
    pub scroll: f32,
    pub time: f32,
    pub padding: [f32; 3],
}

unsafe impl Zeroable for FieldUniforms {}
unsafe impl Pod for FieldUniforms {}

impl FieldUniforms {
    pub fn new(grid: GridSize, view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            mouse: [0.0; 2],
            grid: [grid.width as f32, grid.height as f32],
            progress: 0.0,
            mouse_pressed: 0.0,
            transition: 0.0,
            scroll: 0.0,
            time: 0.0,
            padding: [0.0; 3],
        }
    }

    pub fn set_view_projection(&mut self, view_proj: Mat4) {
        self.view_proj = view_proj.to_cols_array_2d();
    }

    pub fn apply(&mut self, snapshot: &FrameSnapshot) {
        self.mouse = snapshot.pointer.to_array();
        self.mouse_pressed = snapshot.press_level;
        self.transition = snapshot.transition;
        self.scroll = snapshot.scroll as f32;
        self.time = snapshot.time;
    }
}
