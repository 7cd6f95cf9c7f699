//! Rect render pipeline: rounded rectangles via a signed-distance
//! fragment stage.
//!
//! Draws ranges of one shared per-frame vertex buffer, so consecutive
//! rectangles under the same clip are a single draw call.

use std::ops::Range;

use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, BlendState, Buffer, BufferBindingType, BufferDescriptor,
    BufferUsages, ColorTargetState, ColorWrites, Device, FragmentState, FrontFace,
    MultisampleState, PipelineCompilationOptions, PipelineLayoutDescriptor, PolygonMode,
    PrimitiveState, PrimitiveTopology, Queue, RenderPass, RenderPipeline,
    RenderPipelineDescriptor, ShaderModuleDescriptor, ShaderStages, TextureFormat, VertexState,
};

use super::{checked, PipelineError, VertexBuffer};
use crate::vertex::{RectVert, ViewportUniform};

/// Owns the wgpu pipeline, vertex buffer, and viewport uniform for
/// rectangle rendering.
pub struct RectPipeline {
    pipeline: RenderPipeline,
    vertices: VertexBuffer,
    viewport_buffer: Buffer,
    viewport_bind_group: BindGroup,
}

impl RectPipeline {
    /// Compile the program and allocate GPU buffers.
    pub fn new(device: &Device, target_format: TextureFormat) -> Result<Self, PipelineError> {
        // ── Shader ──────────────────────────────────────────────
        let shader = checked(device, "rect shader", || {
            device.create_shader_module(ShaderModuleDescriptor {
                label: Some("rect_shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/rect.wgsl").into()),
            })
        })?;

        // ── Viewport bind group layout ──────────────────────────
        let viewport_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("viewport_bgl"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        // ── Pipeline layout ─────────────────────────────────────
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("rect_pipeline_layout"),
            bind_group_layouts: &[&viewport_bgl],
            push_constant_ranges: &[],
        });

        // ── Render pipeline ─────────────────────────────────────
        let pipeline = checked(device, "rect pipeline", || {
            device.create_render_pipeline(&RenderPipelineDescriptor {
                label: Some("rect_pipeline"),
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: PipelineCompilationOptions::default(),
                    buffers: &[RectVert::layout()],
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
                    cull_mode: None, // 2D, no backface culling
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

        // ── Viewport uniform buffer ─────────────────────────────
        let viewport_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("viewport_ub"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("viewport_bg"),
            layout: &viewport_bgl,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: viewport_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline,
            vertices: VertexBuffer::new(device, "rect_vertices"),
            viewport_buffer,
            viewport_bind_group,
        })
    }

    // ───────────────────── Upload ─────────────────────────────────

    /// Replace this frame's rectangle vertices.
    pub fn upload_vertices(&mut self, device: &Device, queue: &Queue, bytes: &[u8]) {
        self.vertices.write(device, queue, bytes);
    }

    /// Upload the framebuffer size for this frame.
    pub fn upload_viewport(&self, queue: &Queue, viewport: &ViewportUniform) {
        queue.write_buffer(&self.viewport_buffer, 0, bytemuck::bytes_of(viewport));
    }

    // ───────────────────── Draw ───────────────────────────────────

    /// Record one draw call over `vertices`.
    pub fn draw(&self, pass: &mut RenderPass<'_>, vertices: Range<u32>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.viewport_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertices.buffer().slice(..));
        pass.draw(vertices, 0..1);
    }
}
