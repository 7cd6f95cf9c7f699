//! Vertex generation for rectangles and glyph quads.
//!
//! Every primitive becomes two triangles, six vertices, in the order
//! top-left, top-right, bottom-right, top-left, bottom-right,
//! bottom-left. Positions go through [`Viewport::to_ndc`] exactly once,
//! here, after all pixel-space math is done.

use clay_core::{BoundingBox, CornerRadius, RectangleStyle};
use clay_text::GlyphQuad;

use crate::transform::Viewport;
use crate::vertex::{RectVert, TextVert};

/// Vertices emitted per rectangle or glyph.
pub const VERTICES_PER_QUAD: usize = 6;

/// Pixel-space corners in emission order.
fn quad_corners(x: f32, y: f32, w: f32, h: f32) -> [[f32; 2]; VERTICES_PER_QUAD] {
    let (l, t, r, b) = (x, y, x + w, y + h);
    [[l, t], [r, t], [r, b], [l, t], [r, b], [l, b]]
}

/// Radii as `[top_right, bottom_right, top_left, bottom_left]`, each
/// clamped to `[0, min(w, h) / 2]`.
pub fn clamp_radii(radius: &CornerRadius, width: f32, height: f32) -> [f32; 4] {
    let max = (width.min(height) * 0.5).max(0.0);
    let clamp = |r: f32| r.clamp(0.0, max);
    [
        clamp(radius.top_right),
        clamp(radius.bottom_right),
        clamp(radius.top_left),
        clamp(radius.bottom_left),
    ]
}

/// Six vertices covering `bbox`, carrying the data the SDF stage needs.
pub fn rect_vertices(
    bbox: &BoundingBox,
    style: &RectangleStyle,
    viewport: &Viewport,
) -> [RectVert; VERTICES_PER_QUAD] {
    let [cx, cy] = bbox.center();
    let size_center = [bbox.width, bbox.height, cx, viewport.height - cy];
    let color = style.color.normalized();
    let radius = clamp_radii(&style.corner_radius, bbox.width, bbox.height);

    quad_corners(bbox.x, bbox.y, bbox.width, bbox.height).map(|[x, y]| {
        let [nx, ny] = viewport.to_ndc(x, y);
        RectVert {
            position: [nx, ny, 0.0, 1.0],
            color,
            size_center,
            radius,
        }
    })
}

/// Six vertices for one glyph quad.
pub fn glyph_vertices(
    quad: &GlyphQuad,
    color: [f32; 4],
    viewport: &Viewport,
) -> [TextVert; VERTICES_PER_QUAD] {
    let [u0, v0] = quad.uv_min;
    let [u1, v1] = quad.uv_max;
    let uvs = [[u0, v0], [u1, v0], [u1, v1], [u0, v0], [u1, v1], [u0, v1]];
    let corners = quad_corners(quad.x, quad.y, quad.width, quad.height);

    std::array::from_fn(|i| TextVert {
        position: viewport.to_ndc(corners[i][0], corners[i][1]),
        uv: uvs[i],
        color,
    })
}

// ===================================================================
// Tests
// ===================================================================
