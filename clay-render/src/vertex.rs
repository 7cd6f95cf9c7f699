//! GPU vertex and uniform data types for the Clay renderer.
//!
//! All types derive `bytemuck::Pod` + `Zeroable` for zero-copy upload
//! to GPU buffers. Attribute locations must match the shaders in
//! `src/shaders/`.

use bytemuck::{Pod, Zeroable};
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

// ───────────────────────────────────────────────────────────────────
// Rectangle vertex
// ───────────────────────────────────────────────────────────────────

/// One corner of a rounded-rectangle quad.
///
/// 64 bytes per vertex, 6 vertices per rectangle. Everything except
/// `position` is identical across the six vertices of one rectangle.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RectVert {
    /// Clip-space position `[x, y, 0, 1]`.
    pub position: [f32; 4],
    /// RGBA fill, each channel in [0.0, 1.0].
    pub color: [f32; 4],
    /// `[width, height, center_x, center_y]` in pixels, with the centre's
    /// y measured from the bottom of the framebuffer.
    pub size_center: [f32; 4],
    /// Corner radii `[top_right, bottom_right, top_left, bottom_left]`.
    pub radius: [f32; 4],
}

impl RectVert {
    pub fn layout() -> VertexBufferLayout<'static> {
        static ATTRS: &[VertexAttribute] = &[
            // location(0) = position
            VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x4,
            },
            // location(1) = color
            VertexAttribute {
                offset: 16,
                shader_location: 1,
                format: VertexFormat::Float32x4,
            },
            // location(2) = size_center
            VertexAttribute {
                offset: 32,
                shader_location: 2,
                format: VertexFormat::Float32x4,
            },
            // location(3) = radius
            VertexAttribute {
                offset: 48,
                shader_location: 3,
                format: VertexFormat::Float32x4,
            },
        ];
        VertexBufferLayout {
            array_stride: std::mem::size_of::<RectVert>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: ATTRS,
        }
    }
}

// ───────────────────────────────────────────────────────────────────
// Text vertex
// ───────────────────────────────────────────────────────────────────

/// One corner of a glyph quad. 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TextVert {
    /// Clip-space position.
    pub position: [f32; 2],
    /// Atlas texture coordinate.
    pub uv: [f32; 2],
    /// RGBA text color, each channel in [0.0, 1.0].
    pub color: [f32; 4],
}

impl TextVert {
    pub fn layout() -> VertexBufferLayout<'static> {
        static ATTRS: &[VertexAttribute] = &[
            // location(0) = position
            VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x2,
            },
            // location(1) = uv
            VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: VertexFormat::Float32x2,
            },
            // location(2) = color
            VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: VertexFormat::Float32x4,
            },
        ];
        VertexBufferLayout {
            array_stride: std::mem::size_of::<TextVert>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: ATTRS,
        }
    }
}

// ───────────────────────────────────────────────────────────────────
// Viewport uniform
// ───────────────────────────────────────────────────────────────────

/// Framebuffer size, uploaded once per frame for the rectangle
/// fragment stage. 16 bytes to satisfy uniform alignment.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ViewportUniform {
    pub size: [f32; 2],
    pub _pad: [f32; 2],
}

impl ViewportUniform {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: [width, height],
            _pad: [0.0; 2],
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
