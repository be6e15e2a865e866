use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::debug;
use winit::dpi::PhysicalSize;

use crate::camera::Camera;
use crate::field::PointField;
use crate::frame::{FrameSnapshot, RenderBackend};
use crate::shaders::ShaderSources;
use crate::transition::TexturePair;
use crate::types::RendererConfig;

use super::context::GpuContext;
use super::pipeline::{FieldGeometry, PointPipeline};
use super::textures::TexturePalette;
use super::uniforms::FieldUniforms;

pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: PointPipeline,
    geometry: FieldGeometry,
    palette: TexturePalette,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: FieldUniforms,
    texture_groups: HashMap<TexturePair, wgpu::BindGroup>,
    camera: Camera,
    multisample_target: Option<MultisampleTarget>,
    last_fps_update: Instant,
    frames_since_last_update: u32,
    frames_per_second: f32,
}

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }

    fn for_context(context: &GpuContext) -> Option<Self> {
        (context.sample_count > 1).then(|| {
            Self::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        })
    }
}

fn aspect_ratio(size: PhysicalSize<u32>) -> f32 {
    size.width.max(1) as f32 / size.height.max(1) as f32
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        config: &RendererConfig,
        field: &PointField,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, config.antialiasing)?;
        let sources =
            ShaderSources::load(config.vertex_shader.as_deref(), config.fragment_shader.as_deref())?;
        let pipeline = PointPipeline::new(
            &context.device,
            context.surface_format,
            context.sample_count,
            &sources,
        )?;

        let geometry = FieldGeometry::upload(&context.device, &field.buffers())
            .context("point field does not fit on this GPU")?;
        let palette = TexturePalette::load(
            &context.device,
            &context.queue,
            &config.textures,
            config.texture_count(),
            config.mask.as_deref(),
        );
        debug!(
            points = geometry.vertex_count,
            textures = palette.slots.len(),
            resolutions = ?palette.slots.iter().map(|slot| slot.resolution).collect::<Vec<_>>(),
            mask = ?palette.mask.resolution,
            "uploaded point field"
        );

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform buffer"),
            size: std::mem::size_of::<FieldUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &pipeline.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let camera = config.camera;
        let uniforms = FieldUniforms::new(
            field.size(),
            camera.view_projection(aspect_ratio(context.size)),
        );
        context
            .queue
            .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let multisample_target = MultisampleTarget::for_context(&context);

        Ok(Self {
            context,
            pipeline,
            geometry,
            palette,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            texture_groups: HashMap::new(),
            camera,
            multisample_target,
            last_fps_update: Instant::now(),
            frames_since_last_update: 0,
            frames_per_second: 60.0,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.uniforms
            .set_view_projection(self.camera.view_projection(aspect_ratio(new_size)));
        self.multisample_target = MultisampleTarget::for_context(&self.context);
    }

    fn record_frame_stats(&mut self, snapshot: &FrameSnapshot) {
        let now = Instant::now();
        self.frames_since_last_update += 1;
        let elapsed_since_fps_update = now.saturating_duration_since(self.last_fps_update);
        if elapsed_since_fps_update >= Duration::from_secs(1) {
            self.frames_per_second =
                self.frames_since_last_update as f32 / elapsed_since_fps_update.as_secs_f32();
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
            debug!(
                fps = self.frames_per_second.round(),
                frame = snapshot.frame,
                scroll = snapshot.scroll,
                prev = snapshot.textures.prev,
                next = snapshot.textures.next,
                transition = snapshot.transition,
                press = snapshot.press_level,
                "render stats"
            );
        }
    }
}

fn create_texture_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    palette: &TexturePalette,
    pair: TexturePair,
) -> wgpu::BindGroup {
    let count = palette.slots.len().max(1);
    let prev = &palette.slots[pair.prev % count];
    let next = &palette.slots[pair.next % count];
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("texture group {}->{}", pair.prev, pair.next)),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&prev.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&next.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&palette.mask.view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(&palette.sampler),
            },
        ],
    })
}

impl RenderBackend for GpuState {
    type Error = wgpu::SurfaceError;

    fn draw(&mut self, snapshot: &FrameSnapshot) -> Result<(), Self::Error> {
        let frame = self.context.surface.get_current_texture()?;
        self.record_frame_stats(snapshot);
        self.uniforms.apply(snapshot);

        let Self {
            context,
            pipeline,
            geometry,
            palette,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            texture_groups,
            multisample_target,
            ..
        } = self;

        context
            .queue
            .write_buffer(uniform_buffer, 0, bytemuck::bytes_of(&*uniforms));
        let texture_group = texture_groups.entry(snapshot.textures).or_insert_with(|| {
            create_texture_group(
                &context.device,
                &pipeline.texture_layout,
                &*palette,
                snapshot.textures,
            )
        });

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            });
        {
            let (attachment_view, resolve_target) = match multisample_target.as_ref() {
                Some(msaa) => (&msaa.view, Some(&view)),
                None => (&view, None),
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("point pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&pipeline.pipeline);
            render_pass.set_bind_group(0, &*uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &*texture_group, &[]);
            for (slot, buffer) in geometry.buffers.iter().enumerate() {
                render_pass.set_vertex_buffer(slot as u32, buffer.slice(..));
            }
            render_pass.draw(0..geometry.vertex_count, 0..1);
        }

        context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
