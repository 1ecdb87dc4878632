//! Upload cache for panel textures

use std::collections::{HashMap, HashSet};

use kitcrate_core::{PanelTexture, TextureId};
use tracing::debug;

use crate::GpuContext;

/// Color textures are sampled as sRGB so lighting runs in linear space
pub const COLOR_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// One sampled texture and the bind group that exposes it
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
}

fn create_color_texture(
    gpu: &GpuContext,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &str,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    gpu.queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = gpu.create_bind_group(
        label,
        layout,
        &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    );

    GpuTexture { texture, bind_group }
}

/// Uploaded panel textures keyed by [`TextureId`]
///
/// A texture is uploaded the first time its id is seen and dropped once a
/// frame no longer references it. Untextured materials draw with a 1x1
/// white fallback.
pub struct TextureCache {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    entries: HashMap<TextureId, GpuTexture>,
    uploads: u64,
}

impl TextureCache {
    pub fn new(gpu: &GpuContext) -> Self {
        let layout = gpu.create_bind_group_layout(
            "Color Texture Bind Group Layout",
            &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        );

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Color Texture Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = create_color_texture(gpu, &layout, &sampler, "White Texture", 1, 1, &[255, 255, 255, 255]);

        Self {
            layout,
            sampler,
            white,
            entries: HashMap::new(),
            uploads: 0,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Upload `texture` unless its id is already resident
    pub fn ensure(&mut self, gpu: &GpuContext, texture: &PanelTexture) {
        if self.entries.contains_key(&texture.id()) {
            return;
        }
        let image = texture.image();
        let uploaded = create_color_texture(
            gpu,
            &self.layout,
            &self.sampler,
            "Panel Texture",
            image.width(),
            image.height(),
            image.as_raw(),
        );
        debug!(
            "Uploaded texture {} ({}x{})",
            texture.id().value(),
            image.width(),
            image.height()
        );
        self.entries.insert(texture.id(), uploaded);
        self.uploads += 1;
    }

    /// Drop every texture not in `used`
    pub fn retain(&mut self, used: &HashSet<TextureId>) {
        self.entries.retain(|id, entry| {
            let keep = used.contains(id);
            if !keep {
                entry.texture.destroy();
                debug!("Released texture {}", id.value());
            }
            keep
        });
    }

    /// Bind group for `id`, or the white fallback
    pub fn bind_group(&self, id: Option<TextureId>) -> &wgpu::BindGroup {
        id.and_then(|id| self.entries.get(&id))
            .map(|entry| &entry.bind_group)
            .unwrap_or(&self.white.bind_group)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total uploads since creation
    pub fn upload_count(&self) -> u64 {
        self.uploads
    }

    pub fn clear(&mut self) {
        self.retain(&HashSet::new());
        self.white.texture.destroy();
    }
}
