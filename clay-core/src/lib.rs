//! # clay-core
//!
//! Boundary types shared between the layout engine and the renderer.
//!
//! The layout engine produces an ordered slice of [`RenderCommand`]s each
//! frame. Order encodes painter's order (back to front) and scissor
//! nesting. Commands borrow their text from the layout engine, so the
//! renderer cannot hold on to them past the frame that produced them.
//!
//! ```text
//!  layout engine ──► &[RenderCommand] ──► clay-render (one frame)
//!        ▲                                      │
//!        └──── LayoutHost::set_layout_dimensions ┘
//! ```

use serde::{Deserialize, Serialize};

/// Integer handle of a loaded font, as carried by [`TextConfig`].
pub type FontId = u16;

// ── Geometry ────────────────────────────────────────────────────────

/// Axis-aligned box in pixel space (origin top-left, y down).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Centre of the box in pixel space.
    pub fn center(&self) -> [f32; 2] {
        [self.x + self.width * 0.5, self.y + self.height * 0.5]
    }
}

/// Width/height pair returned by text measurement and reported back to
/// the layout engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

// ── Style ───────────────────────────────────────────────────────────

/// RGBA color with channels in the 0–255 range, as the layout engine
/// specifies them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channels scaled to `[0, 1]` for vertex upload.
    pub fn normalized(&self) -> [f32; 4] {
        [
            (self.r / 255.0).clamp(0.0, 1.0),
            (self.g / 255.0).clamp(0.0, 1.0),
            (self.b / 255.0).clamp(0.0, 1.0),
            (self.a / 255.0).clamp(0.0, 1.0),
        ]
    }
}

/// Per-corner radii in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CornerRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
}

impl CornerRadius {
    pub const fn all(radius: f32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_left: radius,
            bottom_right: radius,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top_left == 0.0
            && self.top_right == 0.0
            && self.bottom_left == 0.0
            && self.bottom_right == 0.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RectangleStyle {
    pub color: Color,
    pub corner_radius: CornerRadius,
}

/// Text element configuration attached to a text command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    pub color: Color,
    pub font_id: FontId,
    /// Requested pixel size.
    pub font_size: f32,
    /// Distance between baselines in pixels. `0` means "use `font_size`".
    pub line_height: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            color: Color::rgba(0.0, 0.0, 0.0, 255.0),
            font_id: 0,
            font_size: 16.0,
            line_height: 0.0,
        }
    }
}

impl TextConfig {
    /// Effective line advance in pixels.
    pub fn line_advance(&self) -> f32 {
        if self.line_height > 0.0 {
            self.line_height
        } else {
            self.font_size
        }
    }
}

/// Opaque image reference owned by the host application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub handle: u64,
    pub source_dimensions: Dimensions,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderWidth {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderStyle {
    pub color: Color,
    pub width: BorderWidth,
    pub corner_radius: CornerRadius,
}

/// Host-defined payload for custom elements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomData {
    pub id: u64,
}

// ── Commands ────────────────────────────────────────────────────────

/// Variant-specific payload of a [`RenderCommand`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderData<'a> {
    Rectangle(RectangleStyle),
    Text { text: &'a str, config: TextConfig },
    Image(ImageData),
    ScissorStart,
    ScissorEnd,
    Border(BorderStyle),
    Custom(CustomData),
    None,
}

impl RenderData<'_> {
    /// Short name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderData::Rectangle(_) => "rectangle",
            RenderData::Text { .. } => "text",
            RenderData::Image(_) => "image",
            RenderData::ScissorStart => "scissor-start",
            RenderData::ScissorEnd => "scissor-end",
            RenderData::Border(_) => "border",
            RenderData::Custom(_) => "custom",
            RenderData::None => "none",
        }
    }
}

/// One draw instruction produced by the layout engine.
///
/// Borrowed for exactly one frame: `'a` ties the text payload to the
/// layout engine's storage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderCommand<'a> {
    /// Element id assigned by the layout engine.
    pub id: u32,
    pub bounding_box: BoundingBox,
    pub data: RenderData<'a>,
}

impl<'a> RenderCommand<'a> {
    pub fn new(id: u32, bounding_box: BoundingBox, data: RenderData<'a>) -> Self {
        Self { id, bounding_box, data }
    }

    pub fn rectangle(bounding_box: BoundingBox, style: RectangleStyle) -> Self {
        Self::new(0, bounding_box, RenderData::Rectangle(style))
    }

    pub fn text(bounding_box: BoundingBox, text: &'a str, config: TextConfig) -> Self {
        Self::new(0, bounding_box, RenderData::Text { text, config })
    }

    pub fn scissor_start(bounding_box: BoundingBox) -> Self {
        Self::new(0, bounding_box, RenderData::ScissorStart)
    }

    pub fn scissor_end() -> Self {
        Self::new(0, BoundingBox::default(), RenderData::ScissorEnd)
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }
}

// ── Layout engine callback ──────────────────────────────────────────

/// Callback into the layout engine.
///
/// The renderer calls this once per frame with the framebuffer size it
/// rendered at, so the next layout pass uses up-to-date dimensions.
pub trait LayoutHost {
    fn set_layout_dimensions(&mut self, dimensions: Dimensions);
}

/// A host that ignores dimension updates (fixed-size or headless use).
impl LayoutHost for () {
    fn set_layout_dimensions(&mut self, _dimensions: Dimensions) {}
}

// ===================================================================
// Tests
// ===================================================================
