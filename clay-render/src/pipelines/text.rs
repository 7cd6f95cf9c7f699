//! Text render pipeline: glyph quads textured from a per-font atlas.
//!
//! Each loaded font gets its own `R8Unorm` atlas texture and bind
//! group; a draw call binds the atlas of the font it draws.

use std::ops::Range;

use clay_text::Atlas;
use wgpu::{
    AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, BlendState,
    ColorTargetState, ColorWrites, Device, Extent3d, FilterMode, FragmentState, FrontFace,
    MultisampleState, PipelineCompilationOptions, PipelineLayoutDescriptor, PolygonMode,
    PrimitiveState, PrimitiveTopology, Queue, RenderPass, RenderPipeline,
    RenderPipelineDescriptor, SamplerBindingType, SamplerDescriptor, ShaderModuleDescriptor,
    ShaderStages, Texture, TextureDescriptor, TextureDimension, TextureFormat,
    TextureSampleType, TextureUsages, TextureViewDimension, VertexState,
};

use super::{checked, PipelineError, VertexBuffer};
use crate::vertex::TextVert;

/// A font atlas resident on the GPU.
pub struct AtlasTexture {
    texture: Texture,
    bind_group: BindGroup,
}

impl AtlasTexture {
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

/// Owns the wgpu pipeline and vertex buffer for glyph rendering.
pub struct TextPipeline {
    pipeline: RenderPipeline,
    vertices: VertexBuffer,
    atlas_bgl: BindGroupLayout,
}

impl TextPipeline {
    /// Compile the program and allocate GPU buffers.
    pub fn new(device: &Device, target_format: TextureFormat) -> Result<Self, PipelineError> {
        // ── Shader ──────────────────────────────────────────────
        let shader = checked(device, "text shader", || {
            device.create_shader_module(ShaderModuleDescriptor {
                label: Some("text_shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/text.wgsl").into()),
            })
        })?;

        // ── Atlas bind group layout (texture + sampler) ─────────
        let atlas_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("text_atlas_bgl"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // ── Pipeline layout ─────────────────────────────────────
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("text_pipeline_layout"),
            bind_group_layouts: &[&atlas_bgl],
            push_constant_ranges: &[],
        });

        // ── Render pipeline ─────────────────────────────────────
        let pipeline = checked(device, "text pipeline", || {
            device.create_render_pipeline(&RenderPipelineDescriptor {
                label: Some("text_pipeline"),
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: PipelineCompilationOptions::default(),
                    buffers: &[TextVert::layout()],
                },
                fragment: Some(FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: PipelineCompilationOptions::default(),
                    targets: &[Some(ColorTargetState {
                        format: target_format,
                        blend: Some(BlendState::ALPHA_BLENDING),
                        write_mask: ColorWrites::ALL,
                    })],
                }),
                primitive: PrimitiveState {
                    topology: PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })?;

        Ok(Self {
            pipeline,
            vertices: VertexBuffer::new(device, "text_vertices"),
            atlas_bgl,
        })
    }

    /// Upload a baked atlas as a single-channel texture.
    pub fn create_atlas(&self, device: &Device, queue: &Queue, atlas: &Atlas) -> AtlasTexture {
        let size = Extent3d {
            width: atlas.width,
            height: atlas.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&TextureDescriptor {
            label: Some("glyph_atlas"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::R8Unorm,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &atlas.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(atlas.width), // one coverage byte per pixel
                rows_per_image: Some(atlas.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("glyph_atlas_sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("text_atlas_bg"),
            layout: &self.atlas_bgl,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&sampler),
                },
            ],
        });

        AtlasTexture { texture, bind_group }
    }

    // ───────────────────── Upload ─────────────────────────────────

    /// Replace this frame's glyph vertices.
    pub fn upload_vertices(&mut self, device: &Device, queue: &Queue, bytes: &[u8]) {
        self.vertices.write(device, queue, bytes);
    }

    // ───────────────────── Draw ───────────────────────────────────

    /// Record one draw call over `vertices`, sampling `atlas`.
    pub fn draw(&self, pass: &mut RenderPass<'_>, atlas: &AtlasTexture, vertices: Range<u32>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &atlas.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertices.buffer().slice(..));
        pass.draw(vertices, 0..1);
    }
}
