use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{error, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::field::{FieldBuilder, GridSize};
use crate::gpu::GpuState;
use crate::scene::{Scene, TransitionKey};
use crate::types::RendererConfig;

/// Pixels per wheel line, matching what browsers report for one notch.
const PIXELS_PER_LINE: f64 = 120.0;

/// Window, GPU resources and the scene they render.
struct WindowState {
    window: Arc<Window>,
    gpu: GpuState,
    scene: Scene,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        if !config.grid.is_supported() {
            bail!(
                "grid {}x{} is outside the supported range (1 to {} points)",
                config.grid.width,
                config.grid.height,
                GridSize::MAX_POINTS
            );
        }
        let field = FieldBuilder::new(config.grid).with_seed(config.seed).build();
        let gpu = GpuState::new(window.as_ref(), window.inner_size(), config, &field)
            .context("failed to initialise GPU renderer")?;
        Ok(Self {
            window,
            gpu,
            scene: Scene::new(config),
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.scene.render(&mut self.gpu).map(|_| ())
    }
}

pub(crate) fn run(config: &RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("pointfade")
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create window")?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window.clone(), config)?;
    state.window().request_redraw();

    let mut result = Ok(());
    let run_result = event_loop.run(|event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.state == ElementState::Pressed {
                        if event.logical_key == Key::Named(NamedKey::Escape) {
                            elwt.exit();
                        } else if let Some(key) = transition_key_for(&event.logical_key) {
                            state.scene.transition_key(key);
                        }
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let size = state.size();
                    state
                        .scene
                        .pointer_moved(position.x, position.y, size.width, size.height);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    state.scene.wheel(wheel_delta(delta));
                }
                WindowEvent::MouseInput {
                    state: button_state,
                    button: MouseButton::Left,
                    ..
                } => {
                    state
                        .scene
                        .press(button_state == ElementState::Pressed, Instant::now());
                }
                WindowEvent::Resized(new_size) => {
                    state.resize(new_size);
                }
                WindowEvent::ScaleFactorChanged {
                    mut inner_size_writer,
                    ..
                } => {
                    let _ = inner_size_writer.request_inner_size(state.size());
                }
                WindowEvent::RedrawRequested => {
                    if let Err(err) = state.render_frame() {
                        match surface_error_action(&err) {
                            SurfaceAction::Reconfigure => {
                                let size = state.size();
                                state.resize(size);
                            }
                            SurfaceAction::SkipFrame => {
                                warn!("surface timeout; skipping frame");
                            }
                            SurfaceAction::Exit => {
                                error!(error = ?err, "surface error; exiting");
                                result = Err(anyhow!("surface error: {err:?}"));
                                elwt.exit();
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            state.scene.animate(Instant::now());
            state.window().request_redraw();
            elwt.set_control_flow(ControlFlow::Wait);
        }
        _ => {}
    });

    if let Err(err) = run_result {
        return Err(anyhow!("window event loop error: {err}"));
    }

    result
}

/// How the event loop reacts to a failed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceAction {
    /// Reconfigure the swapchain at the current size and drop the frame.
    Reconfigure,
    SkipFrame,
    Exit,
}

fn surface_error_action(error: &wgpu::SurfaceError) -> SurfaceAction {
    match error {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceAction::Reconfigure,
        wgpu::SurfaceError::Timeout => SurfaceAction::SkipFrame,
        _ => SurfaceAction::Exit,
    }
}

/// Converts a winit wheel delta into browser-style pixels, positive upward.
fn wheel_delta(delta: MouseScrollDelta) -> f64 {
    match delta {
        MouseScrollDelta::LineDelta(_, lines) => f64::from(lines) * PIXELS_PER_LINE,
        MouseScrollDelta::PixelDelta(position) => position.y,
    }
}

fn transition_key_for(key: &Key) -> Option<TransitionKey> {
    match key {
        Key::Named(NamedKey::ArrowRight) => Some(TransitionKey::Increase),
        Key::Named(NamedKey::ArrowLeft) => Some(TransitionKey::Decrease),
        Key::Character(value) => match value.as_str() {
            "]" => Some(TransitionKey::Increase),
            "[" => Some(TransitionKey::Decrease),
            "0" => Some(TransitionKey::Minimum),
            "1" => Some(TransitionKey::Maximum),
            _ => None,
        },
        _ => None,
    }
}
