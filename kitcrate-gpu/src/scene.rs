//! Lit, textured scene rendering with a directional shadow map

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use kitcrate_core::{DirectionalLight, Error, LightRig, MaterialSlots, MeshId, Result, Rgb, TextureId, TriangleMesh};
use nalgebra::{Matrix4, Orthographic3, Point3, Vector3};
use tracing::{debug, info, warn};
use winit::window::Window;

use crate::mesh::{GpuMesh, SceneVertex};
use crate::textures::TextureCache;
use crate::GpuContext;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Half-size of the orthographic volume the shadow map covers
pub const SHADOW_EXTENT: f32 = 5.0;

/// Maps OpenGL clip depth (-1..1) onto wgpu's 0..1
pub fn opengl_to_wgpu() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Orthographic view-projection from `light` towards the origin
pub fn light_view_projection(light: &DirectionalLight) -> Matrix4<f32> {
    let up = if light.direction().y.abs() > 0.99 {
        Vector3::z()
    } else {
        Vector3::y()
    };
    let eye = Point3::from(light.position);
    let view = Matrix4::look_at_rh(&eye, &Point3::origin(), &up);
    let far = light.position.norm() + SHADOW_EXTENT * 2.0;
    let projection = Orthographic3::new(-SHADOW_EXTENT, SHADOW_EXTENT, -SHADOW_EXTENT, SHADOW_EXTENT, 0.1, far);
    opengl_to_wgpu() * projection.to_homogeneous() * view
}

/// Scene renderer configuration
#[derive(Debug, Clone)]
pub struct SceneRenderConfig {
    pub enable_shadows: bool,
    pub enable_multisampling: bool,
    pub enable_backface_culling: bool,
    /// Depth bias applied when comparing against the shadow map
    pub shadow_bias: f32,
}

impl Default for SceneRenderConfig {
    fn default() -> Self {
        Self {
            enable_shadows: true,
            enable_multisampling: true,
            enable_backface_culling: true,
            shadow_bias: 0.002,
        }
    }
}

/// One mesh to draw this frame
#[derive(Debug, Clone)]
pub struct DrawItem<'a> {
    pub mesh: &'a Arc<TriangleMesh>,
    pub world: Matrix4<f32>,
    pub materials: &'a MaterialSlots,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone)]
pub struct SceneFrame<'a> {
    pub view: Matrix4<f32>,
    /// Projection already mapped to wgpu's 0..1 depth range
    pub projection: Matrix4<f32>,
    pub camera_position: Point3<f32>,
    pub background: Rgb,
    pub lights: LightRig,
    pub items: Vec<DrawItem<'a>>,
}

impl SceneFrame<'_> {
    /// Ids of the meshes drawn this frame
    pub fn mesh_ids(&self) -> HashSet<MeshId> {
        self.items.iter().map(|item| item.mesh.id()).collect()
    }

    /// Texture ids referenced by any material in the frame
    pub fn texture_ids(&self) -> HashSet<TextureId> {
        self.items
            .iter()
            .flat_map(|item| item.materials.iter())
            .filter_map(|material| material.texture.as_ref().map(|t| t.id()))
            .collect()
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct LightUniform {
    direction: [f32; 4],
    color: [f32; 4],
}

impl LightUniform {
    fn new(light: &DirectionalLight) -> Self {
        let direction = light.direction();
        let [r, g, b] = light.color.to_linear();
        Self {
            direction: [direction.x, direction.y, direction.z, 0.0],
            color: [r * light.intensity, g * light.intensity, b * light.intensity, 1.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    ambient: [f32; 4],
    lights: [LightUniform; 3],
    shadow: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ShadowUniforms {
    light_view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    base_color: [f32; 4],
    surface: [f32; 4],
}

struct PreparedDraw {
    mesh: MeshId,
    range: Range<u32>,
    texture: Option<TextureId>,
    object: wgpu::BindGroup,
}

struct ShadowMap {
    size: u32,
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Renders [`SceneFrame`]s into a window surface
pub struct SceneRenderer {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    srgb_surface: bool,
    config: SceneRenderConfig,
    sample_count: u32,
    scene_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    frame_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    shadow_buffer: wgpu::Buffer,
    shadow_bind_group: wgpu::BindGroup,
    shadow_sampler: wgpu::Sampler,
    shadow_map: ShadowMap,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    textures: TextureCache,
    meshes: HashMap<MeshId, GpuMesh>,
    disposed: bool,
}

impl SceneRenderer {
    /// Create a renderer drawing into `window`
    pub async fn new(window: Arc<Window>, config: SceneRenderConfig) -> Result<Self> {
        let size = window.inner_size();
        let (gpu, surface) = GpuContext::for_window(window).await?;

        let surface_caps = surface.get_capabilities(&gpu.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface reports no supported formats".to_string()))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &surface_config);

        let msaa_supported = gpu
            .adapter
            .get_texture_format_features(surface_format)
            .flags
            .sample_count_supported(4);
        let sample_count = if config.enable_multisampling && msaa_supported { 4 } else { 1 };

        let frame_layout = gpu.create_bind_group_layout(
            "Frame Bind Group Layout",
            &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        );
        let uniform_entry = |visibility| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let object_layout = gpu.create_bind_group_layout(
            "Object Bind Group Layout",
            &[uniform_entry(wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT)],
        );
        let shadow_layout = gpu.create_bind_group_layout("Shadow Bind Group Layout", &[uniform_entry(wgpu::ShaderStages::VERTEX)]);

        let textures = TextureCache::new(&gpu);

        let scene_shader = gpu.create_shader_module("Scene Shader", include_str!("shaders/scene.wgsl"));
        let scene_pipeline = Self::create_scene_pipeline(
            &gpu.device,
            &[&frame_layout, &object_layout, textures.layout()],
            &scene_shader,
            surface_format,
            sample_count,
            &config,
        );
        let shadow_shader = gpu.create_shader_module("Shadow Shader", include_str!("shaders/shadow.wgsl"));
        let shadow_pipeline = Self::create_shadow_pipeline(&gpu.device, &[&shadow_layout, &object_layout], &shadow_shader);

        let frame_buffer = gpu.create_buffer_init(
            "Frame Uniform Buffer",
            &[FrameUniforms::zeroed()],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let shadow_buffer = gpu.create_buffer_init(
            "Shadow Uniform Buffer",
            &[ShadowUniforms::zeroed()],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let shadow_bind_group = gpu.create_bind_group(
            "Shadow Bind Group",
            &shadow_layout,
            &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shadow_buffer.as_entire_binding(),
            }],
        );

        let shadow_sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        // Placeholder until a shadow-casting light asks for a real map
        let shadow_map = Self::create_shadow_map(&gpu, 1);
        let frame_bind_group = Self::create_frame_bind_group(&gpu, &frame_layout, &frame_buffer, &shadow_map, &shadow_sampler);

        let (_, depth_view) = gpu.create_render_target(
            "Depth Texture",
            surface_config.width,
            surface_config.height,
            DEPTH_FORMAT,
            sample_count,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let msaa_view = (sample_count > 1).then(|| {
            gpu.create_render_target(
                "MSAA Texture",
                surface_config.width,
                surface_config.height,
                surface_format,
                sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
            .1
        });

        info!(
            "Scene renderer ready ({}x{}, {:?}, {}x MSAA)",
            surface_config.width, surface_config.height, surface_format, sample_count
        );

        Ok(Self {
            gpu,
            surface,
            surface_config,
            srgb_surface: surface_format.is_srgb(),
            config,
            sample_count,
            scene_pipeline,
            shadow_pipeline,
            frame_layout,
            object_layout,
            frame_buffer,
            frame_bind_group,
            shadow_buffer,
            shadow_bind_group,
            shadow_sampler,
            shadow_map,
            depth_view,
            msaa_view,
            textures,
            meshes: HashMap::new(),
            disposed: false,
        })
    }

    fn create_scene_pipeline(
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
        config: &SceneRenderConfig,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[SceneVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: config.enable_backface_culling.then_some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        })
    }

    fn create_shadow_pipeline(
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        shader: &wgpu::ShaderModule,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[SceneVertex::position_desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    fn create_shadow_map(gpu: &GpuContext, size: u32) -> ShadowMap {
        let (texture, view) = gpu.create_render_target(
            "Shadow Map",
            size,
            size,
            DEPTH_FORMAT,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        ShadowMap {
            size,
            _texture: texture,
            view,
        }
    }

    fn create_frame_bind_group(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        shadow_map: &ShadowMap,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        gpu.create_bind_group(
            "Frame Bind Group",
            layout,
            &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        )
    }

    fn ensure_shadow_map(&mut self, size: u32) {
        if self.shadow_map.size == size {
            return;
        }
        self.shadow_map = Self::create_shadow_map(&self.gpu, size);
        self.frame_bind_group = Self::create_frame_bind_group(
            &self.gpu,
            &self.frame_layout,
            &self.frame_buffer,
            &self.shadow_map,
            &self.shadow_sampler,
        );
        debug!("Shadow map resized to {}", size);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn config(&self) -> &SceneRenderConfig {
        &self.config
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Number of panel textures currently resident on the GPU
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Reconfigure the surface and render targets; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.disposed || width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.gpu.device, &self.surface_config);

        self.depth_view = self
            .gpu
            .create_render_target(
                "Depth Texture",
                width,
                height,
                DEPTH_FORMAT,
                self.sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
            .1;
        if self.sample_count > 1 {
            self.msaa_view = Some(
                self.gpu
                    .create_render_target(
                        "MSAA Texture",
                        width,
                        height,
                        self.surface_config.format,
                        self.sample_count,
                        wgpu::TextureUsages::RENDER_ATTACHMENT,
                    )
                    .1,
            );
        }
        debug!("Scene renderer resized to {}x{}", width, height);
    }

    /// Upload what the frame needs and release what it no longer uses
    fn sync_resources(&mut self, frame: &SceneFrame<'_>) {
        for item in &frame.items {
            let id = item.mesh.id();
            if !self.meshes.contains_key(&id) {
                self.meshes.insert(id, GpuMesh::upload(&self.gpu, item.mesh));
            }
            for material in item.materials.iter() {
                if let Some(texture) = &material.texture {
                    self.textures.ensure(&self.gpu, texture);
                }
            }
        }

        let used_meshes = frame.mesh_ids();
        self.meshes.retain(|id, mesh| {
            let keep = used_meshes.contains(id);
            if !keep {
                mesh.destroy();
            }
            keep
        });
        self.textures.retain(&frame.texture_ids());
    }

    fn prepare_draws(&self, frame: &SceneFrame<'_>) -> Vec<PreparedDraw> {
        let mut draws = Vec::new();
        for item in &frame.items {
            let id = item.mesh.id();
            let Some(mesh) = self.meshes.get(&id) else {
                continue;
            };
            let normal_matrix = item.world.try_inverse().unwrap_or_else(Matrix4::identity).transpose();

            for (range, slot) in &mesh.groups {
                let material = item.materials.slot(*slot);
                let [r, g, b] = material.color.to_linear();
                let uniforms = ObjectUniforms {
                    model: item.world.into(),
                    normal_matrix: normal_matrix.into(),
                    base_color: [r, g, b, 1.0],
                    surface: [material.roughness, material.metalness, 0.0, 0.0],
                };
                let buffer = self
                    .gpu
                    .create_buffer_init("Object Uniform Buffer", &[uniforms], wgpu::BufferUsages::UNIFORM);
                let object = self.gpu.create_bind_group(
                    "Object Bind Group",
                    &self.object_layout,
                    &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                );
                draws.push(PreparedDraw {
                    mesh: id,
                    range: range.clone(),
                    texture: material.texture.as_ref().map(|t| t.id()),
                    object,
                });
            }
        }
        draws
    }

    fn clear_color(&self, background: Rgb) -> wgpu::Color {
        let [r, g, b] = if self.srgb_surface {
            background.to_linear()
        } else {
            background.to_f32()
        };
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }

    /// Draw one frame; a lost or outdated surface is reconfigured and the frame skipped
    pub fn render(&mut self, frame: &SceneFrame<'_>) -> Result<()> {
        if self.disposed {
            return Err(Error::Disposed);
        }

        self.sync_resources(frame);

        let lights = frame.lights.directional();
        let caster = if self.config.enable_shadows {
            lights.iter().position(|l| l.casts_shadow)
        } else {
            None
        };
        let light_view_proj = caster
            .map(|i| light_view_projection(lights[i]))
            .unwrap_or_else(Matrix4::identity);
        if let Some(i) = caster {
            self.ensure_shadow_map(lights[i].shadow_map_size.max(1));
        }

        let ambient = frame.lights.ambient;
        let [ar, ag, ab] = ambient.color.to_linear();
        let uniforms = FrameUniforms {
            view_proj: (frame.projection * frame.view).into(),
            light_view_proj: light_view_proj.into(),
            camera_position: [frame.camera_position.x, frame.camera_position.y, frame.camera_position.z, 1.0],
            ambient: [ar * ambient.intensity, ag * ambient.intensity, ab * ambient.intensity, 1.0],
            lights: [
                LightUniform::new(lights[0]),
                LightUniform::new(lights[1]),
                LightUniform::new(lights[2]),
            ],
            shadow: [
                if caster.is_some() { 1.0 } else { 0.0 },
                caster.map(|i| i as f32).unwrap_or(-1.0),
                self.config.shadow_bias,
                1.0 / self.shadow_map.size as f32,
            ],
        };
        self.gpu.queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.gpu.queue.write_buffer(
            &self.shadow_buffer,
            0,
            bytemuck::bytes_of(&ShadowUniforms {
                light_view_proj: light_view_proj.into(),
            }),
        );

        let draws = self.prepare_draws(frame);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.gpu.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out acquiring surface texture, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(Error::Gpu(format!("Failed to get surface texture: {}", e))),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Scene Render Encoder"),
        });

        if caster.is_some() {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            shadow_pass.set_pipeline(&self.shadow_pipeline);
            shadow_pass.set_bind_group(0, &self.shadow_bind_group, &[]);
            for draw in &draws {
                let Some(mesh) = self.meshes.get(&draw.mesh) else {
                    continue;
                };
                shadow_pass.set_bind_group(1, &draw.object, &[]);
                shadow_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                shadow_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                shadow_pass.draw_indexed(draw.range.clone(), 0, 0..1);
            }
        }

        {
            let (color_attachment, resolve_target) = match &self.msaa_view {
                Some(msaa_view) => (msaa_view, Some(&view)),
                None => (&view, None),
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_attachment,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color(frame.background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.scene_pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for draw in &draws {
                let Some(mesh) = self.meshes.get(&draw.mesh) else {
                    continue;
                };
                render_pass.set_bind_group(1, &draw.object, &[]);
                render_pass.set_bind_group(2, self.textures.bind_group(draw.texture), &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(draw.range.clone(), 0, 0..1);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Release GPU resources; later calls do nothing
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for mesh in self.meshes.values() {
            mesh.destroy();
        }
        self.meshes.clear();
        self.textures.clear();
        info!("Scene renderer disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::RgbaImage;
    use kitcrate_core::{Material, PanelTexture};

    #[test]
    fn test_opengl_depth_mapped_to_unit_range() {
        let projection = nalgebra::Perspective3::new(1.0, 45f32.to_radians(), 0.1, 1000.0).to_homogeneous();
        let corrected = opengl_to_wgpu() * projection;

        let near = corrected.transform_point(&Point3::new(0.0, 0.0, -0.1));
        let far = corrected.transform_point(&Point3::new(0.0, 0.0, -1000.0));
        assert_relative_eq!(near.z, 0.0, epsilon = 1e-4);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_light_projection_centers_origin() {
        let rig = LightRig::default();
        let matrix = light_view_projection(&rig.key);

        let origin = matrix.transform_point(&Point3::origin());
        assert_relative_eq!(origin.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-5);
        assert!(origin.z > 0.0 && origin.z < 1.0);

        // Closer to the light means smaller depth
        let toward_light = matrix.transform_point(&Point3::from(rig.key.direction()));
        assert!(toward_light.z < origin.z);
    }

    #[test]
    fn test_overhead_light_projection_is_finite() {
        let light = DirectionalLight::new(Rgb::WHITE, 1.0, Vector3::new(0.0, 10.0, 0.0));
        let matrix = light_view_projection(&light);
        assert!(matrix.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_uniform_layouts_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 32);
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 160);
    }

    #[test]
    fn test_frame_texture_ids() {
        let mesh = Arc::new(TriangleMesh::new());
        let front = Arc::new(PanelTexture::new(RgbaImage::new(1, 1)));
        let sleeve = Arc::new(PanelTexture::new(RgbaImage::new(1, 1)));
        let textured = MaterialSlots::BoxFaces(std::array::from_fn(|i| {
            let texture = if i == 4 { front.clone() } else { sleeve.clone() };
            Material::textured(texture, 0.7, 0.1)
        }));
        let plain = MaterialSlots::Single(Material::standard(Rgb::WHITE, 0.8, 0.0));

        let frame = SceneFrame {
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            camera_position: Point3::new(0.0, 0.0, 8.0),
            background: Rgb::WHITE,
            lights: LightRig::default(),
            items: vec![
                DrawItem {
                    mesh: &mesh,
                    world: Matrix4::identity(),
                    materials: &textured,
                },
                DrawItem {
                    mesh: &mesh,
                    world: Matrix4::identity(),
                    materials: &plain,
                },
            ],
        };

        let ids = frame.texture_ids();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&front.id()));
        assert!(ids.contains(&sleeve.id()));
    }

    #[test]
    fn test_frame_mesh_ids() {
        fn item<'a>(mesh: &'a Arc<TriangleMesh>, materials: &'a MaterialSlots) -> DrawItem<'a> {
            DrawItem {
                mesh,
                world: Matrix4::identity(),
                materials,
            }
        }

        let shared = Arc::new(TriangleMesh::new());
        let alias = shared.clone();
        let other = Arc::new(TriangleMesh::new());
        let plain = MaterialSlots::Single(Material::standard(Rgb::WHITE, 0.8, 0.0));

        let frame = SceneFrame {
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            camera_position: Point3::new(0.0, 0.0, 8.0),
            background: Rgb::WHITE,
            lights: LightRig::default(),
            items: vec![item(&shared, &plain), item(&alias, &plain), item(&other, &plain)],
        };
        let ids = frame.mesh_ids();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&shared.id()));
        assert!(ids.contains(&other.id()));

        // A copy of the shared mesh is a different cache entry
        let copy = Arc::new(TriangleMesh::clone(&shared));
        assert!(!ids.contains(&copy.id()));
    }
}
