//! Pixel → normalized device coordinates.
//!
//! Layout works in framebuffer pixels with the origin at the top-left
//! and y growing downward. Clip space has the origin in the centre and
//! y growing upward, so y is flipped.

/// Map a pixel position to NDC for a `width × height` framebuffer.
#[inline]
pub fn to_ndc(x: f32, y: f32, width: f32, height: f32) -> [f32; 2] {
    [(x / width) * 2.0 - 1.0, 1.0 - (y / height) * 2.0]
}

/// Framebuffer size for the frame being built.
///
/// Built fresh every frame from the render target's current size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    /// A zero-area viewport produces no output.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    #[inline]
    pub fn to_ndc(&self, x: f32, y: f32) -> [f32; 2] {
        to_ndc(x, y, self.width, self.height)
    }
}
