use anyhow::{bail, Context, Result};
use wgpu::naga::ShaderStage;
use wgpu::util::DeviceExt;

use crate::field::FieldBuffers;
use crate::shaders::{compile_shader, ShaderSources};

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COORDINATE_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![1 => Float32x3];
const SPEED_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32];
const OFFSET_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32];
const DIRECTION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![4 => Float32];
const PRESS_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![5 => Float32];

fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 6] {
    let layout = |stride: usize, attributes: &'static [wgpu::VertexAttribute]| {
        wgpu::VertexBufferLayout {
            array_stride: stride as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    };
    let vec3 = std::mem::size_of::<[f32; 3]>();
    let scalar = std::mem::size_of::<f32>();
    [
        layout(vec3, &POSITION_ATTRIBUTES),
        layout(vec3, &COORDINATE_ATTRIBUTES),
        layout(scalar, &SPEED_ATTRIBUTES),
        layout(scalar, &OFFSET_ATTRIBUTES),
        layout(scalar, &DIRECTION_ATTRIBUTES),
        layout(scalar, &PRESS_ATTRIBUTES),
    ]
}

/// Per-point attribute buffers, uploaded once and bound in location order.
pub(crate) struct FieldGeometry {
    pub buffers: [wgpu::Buffer; 6],
    pub vertex_count: u32,
}

/// Checks that the widest attribute buffer fits the device limit and returns
/// the vertex count for the draw call.
pub(crate) fn checked_vertex_count(point_count: usize, max_buffer_size: u64) -> Result<u32> {
    let vertex_count = u32::try_from(point_count)
        .with_context(|| format!("{point_count} points exceed the u32 vertex range"))?;
    let widest = u64::from(vertex_count) * std::mem::size_of::<[f32; 3]>() as u64;
    if widest > max_buffer_size {
        bail!(
            "{point_count} points need {widest}-byte attribute buffers; the device allows {max_buffer_size}"
        );
    }
    Ok(vertex_count)
}

impl FieldGeometry {
    pub fn upload(device: &wgpu::Device, field: &FieldBuffers) -> Result<Self> {
        let vertex_count = checked_vertex_count(field.len(), device.limits().max_buffer_size)?;
        let create = |label: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
        };
        let buffers = [
            create("position buffer", bytemuck::cast_slice(&field.positions)),
            create("coordinate buffer", bytemuck::cast_slice(&field.coordinates)),
            create("speed buffer", bytemuck::cast_slice(&field.speeds)),
            create("offset buffer", bytemuck::cast_slice(&field.offsets)),
            create("direction buffer", bytemuck::cast_slice(&field.directions)),
            create("press buffer", bytemuck::cast_slice(&field.presses)),
        ];
        Ok(Self {
            buffers,
            vertex_count,
        })
    }
}

pub(crate) struct PointPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
}

impl PointPipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
        sources: &ShaderSources,
    ) -> Result<Self> {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture layout"),
            entries: &build_texture_layout_entries(),
        });

        // Naga reports GLSL errors through the device error scope.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let vertex_module =
            compile_shader(device, "point vertex", &sources.vertex, ShaderStage::Vertex);
        let fragment_module = compile_shader(
            device,
            "point fragment",
            &sources.fragment,
            ShaderStage::Fragment,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("point pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffers = vertex_layouts();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("point pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                buffers: &vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            anyhow::bail!("failed to build point pipeline: {error}");
        }

        Ok(Self {
            pipeline,
            uniform_layout,
            texture_layout,
        })
    }
}

fn build_texture_layout_entries() -> [wgpu::BindGroupLayoutEntry; 4] {
    let texture = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };
    [
        texture(0),
        texture(1),
        texture(2),
        wgpu::BindGroupLayoutEntry {
            binding: 3,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}
