use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::imageops::flip_vertical_in_place;
use image::RgbaImage;
use wgpu::util::{DeviceExt, TextureDataOrder};

const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Fill colours for content slots that have no usable image.
const PLACEHOLDER_COLORS: [[u8; 4]; 4] = [
    [230, 120, 60, 255],
    [60, 140, 230, 255],
    [120, 200, 90, 255],
    [210, 80, 170, 255],
];
const MASK_PLACEHOLDER: [u8; 4] = [255, 255, 255, 255];

pub(crate) struct TextureSlot {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub resolution: [f32; 2],
}

/// Content textures plus the static mask, sharing one sampler.
pub(crate) struct TexturePalette {
    pub slots: Vec<TextureSlot>,
    pub mask: TextureSlot,
    pub sampler: wgpu::Sampler,
}

impl TexturePalette {
    /// Loads `count` content slots from `paths`, padding with placeholders.
    ///
    /// Decode failures never abort start-up: the slot gets a placeholder and a
    /// warning is logged.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        paths: &[PathBuf],
        count: usize,
        mask: Option<&Path>,
    ) -> Self {
        let slots = (0..count)
            .map(|index| {
                let label = format!("content texture #{index}");
                let fallback = placeholder_color(index);
                match paths.get(index) {
                    Some(path) => load_or_placeholder(device, queue, &label, path, fallback),
                    None => solid_texture(device, queue, &label, fallback),
                }
            })
            .collect();

        let mask = match mask {
            Some(path) => load_or_placeholder(device, queue, "mask texture", path, MASK_PLACEHOLDER),
            None => solid_texture(device, queue, "mask texture", MASK_PLACEHOLDER),
        };

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("palette sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            slots,
            mask,
            sampler,
        }
    }
}

pub(crate) fn placeholder_color(index: usize) -> [u8; 4] {
    PLACEHOLDER_COLORS[index % PLACEHOLDER_COLORS.len()]
}

/// Decodes an image into RGBA8 with the first row at the bottom, matching
/// the `(i, j)` lattice where `j` grows upward.
pub(crate) fn decode_flipped(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("failed to open texture at {}", path.display()))?;
    let mut rgba = image.to_rgba8();
    flip_vertical_in_place(&mut rgba);
    Ok(rgba)
}

fn load_or_placeholder(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    path: &Path,
    fallback: [u8; 4],
) -> TextureSlot {
    match decode_flipped(path) {
        Ok(rgba) => upload(device, queue, label, rgba.width(), rgba.height(), &rgba),
        Err(error) => {
            tracing::warn!(
                texture = label,
                path = %path.display(),
                error = %format!("{error:#}"),
                "failed to load texture; using placeholder"
            );
            solid_texture(device, queue, label, fallback)
        }
    }
}

fn solid_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    color: [u8; 4],
) -> TextureSlot {
    upload(device, queue, label, 1, 1, &color)
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    data: &[u8],
) -> TextureSlot {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        TextureDataOrder::LayerMajor,
        data,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    TextureSlot {
        _texture: texture,
        view,
        resolution: [width as f32, height as f32],
    }
}
