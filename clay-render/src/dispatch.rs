//! Command dispatcher: turns one frame's command list into vertex
//! buffers and an ordered list of draw calls.
//!
//! The walk is single-pass and strictly forward. Vertices are appended
//! in command order; consecutive commands that share a program (the
//! rectangle program, or the text program with the same font atlas)
//! and the same clip region collapse into one draw call. Any change of
//! program, font or clip starts a new call, so painter's order and
//! clipping are exact.
//!
//! ```text
//!  &[RenderCommand] ──► build_frame ──► FramePlan
//!                          │              ├── rect_vertices: GrowableBuffer<RectVert>
//!                          │              ├── text_vertices: GrowableBuffer<TextVert>
//!                          ▼              └── draws: [DrawCall { kind, clip, range }]
//!                      ClipStack
//! ```
//!
//! Nothing here touches the GPU; [`crate::Renderer`] uploads the plan.

use std::ops::Range;

use clay_core::{BoundingBox, FontId, RenderCommand, RenderData};
use clay_text::FontTable;
use thiserror::Error;

use crate::batch::{glyph_vertices, rect_vertices, VERTICES_PER_QUAD};
use crate::buffer::{BufferError, GrowableBuffer};
use crate::transform::Viewport;
use crate::vertex::{RectVert, TextVert};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("ScissorEnd at command {index} has no matching ScissorStart")]
    ScissorUnderflow { index: usize },

    #[error("{depth} scissor region(s) still open at end of frame")]
    UnclosedScissor { depth: usize },

    #[error("vertex buffer allocation failed: {0}")]
    Buffer(#[from] BufferError),
}

/// Frame statistics returned after each render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Rectangles emitted.
    pub rect_count: u32,
    /// Glyph quads emitted.
    pub glyph_count: u32,
    /// Draw calls issued.
    pub draw_calls: u32,
    /// Commands ignored: unsupported kinds or unknown fonts.
    pub skipped_commands: u32,
}

// ── Clipping ────────────────────────────────────────────────────────

/// Scissor rectangle in framebuffer pixels, origin top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClipRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ClipRect {
    /// The whole framebuffer.
    pub fn full(viewport: &Viewport) -> Self {
        Self {
            x: 0,
            y: 0,
            width: viewport.width as u32,
            height: viewport.height as u32,
        }
    }

    /// Smallest pixel rect containing `bbox`, clamped to the framebuffer.
    pub fn from_box(bbox: &BoundingBox, viewport: &Viewport) -> Self {
        let x0 = bbox.x.floor().clamp(0.0, viewport.width);
        let y0 = bbox.y.floor().clamp(0.0, viewport.height);
        let x1 = bbox.right().ceil().clamp(0.0, viewport.width);
        let y1 = bbox.bottom().ceil().clamp(0.0, viewport.height);
        Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0).max(0.0) as u32,
            height: (y1 - y0).max(0.0) as u32,
        }
    }

    pub fn intersect(&self, other: &ClipRect) -> ClipRect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        ClipRect {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Nested scissor regions. Each pushed region is intersected with its
/// parent, so inner regions never escape outer ones.
#[derive(Clone, Debug)]
pub struct ClipStack {
    root: ClipRect,
    stack: Vec<ClipRect>,
}

impl ClipStack {
    pub fn new(root: ClipRect) -> Self {
        Self {
            root,
            stack: Vec::new(),
        }
    }

    pub fn current(&self) -> ClipRect {
        self.stack.last().copied().unwrap_or(self.root)
    }

    pub fn push(&mut self, region: ClipRect) -> ClipRect {
        let clip = self.current().intersect(&region);
        self.stack.push(clip);
        clip
    }

    /// `None` on an empty stack.
    pub fn pop(&mut self) -> Option<ClipRect> {
        self.stack.pop()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

// ── Draw list ───────────────────────────────────────────────────────

/// Program (and texture) a draw call binds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawKind {
    Rect,
    Text(FontId),
}

/// One GPU draw: a vertex range of the buffer matching `kind`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub kind: DrawKind,
    pub clip: ClipRect,
    pub vertices: Range<u32>,
}

/// Everything the GPU needs for one frame.
#[derive(Debug)]
pub struct FramePlan {
    pub viewport: Viewport,
    pub rect_vertices: GrowableBuffer<RectVert>,
    pub text_vertices: GrowableBuffer<TextVert>,
    pub draws: Vec<DrawCall>,
    pub stats: FrameStats,
}

impl FramePlan {
    fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            rect_vertices: GrowableBuffer::new(),
            text_vertices: GrowableBuffer::new(),
            draws: Vec::new(),
            stats: FrameStats::default(),
        }
    }

    /// Reserve the worst case up front: six vertices per rectangle and
    /// per text character.
    fn reserve(&mut self, commands: &[RenderCommand<'_>]) -> Result<(), BufferError> {
        let mut rects = 0usize;
        let mut chars = 0usize;
        for command in commands {
            match command.data {
                RenderData::Rectangle(_) => rects += 1,
                RenderData::Text { text, .. } => chars += text.chars().count(),
                _ => {}
            }
        }
        self.rect_vertices.reserve(rects.saturating_mul(VERTICES_PER_QUAD))?;
        self.text_vertices.reserve(chars.saturating_mul(VERTICES_PER_QUAD))?;
        Ok(())
    }

    fn push_draw(&mut self, kind: DrawKind, clip: ClipRect, start: usize, end: usize) {
        let (start, end) = (start as u32, end as u32);
        if start == end {
            return;
        }
        if let Some(last) = self.draws.last_mut() {
            if last.kind == kind && last.clip == clip && last.vertices.end == start {
                last.vertices.end = end;
                return;
            }
        }
        self.draws.push(DrawCall {
            kind,
            clip,
            vertices: start..end,
        });
        self.stats.draw_calls = self.draws.len() as u32;
    }
}

/// Dispatcher switches that do not change per frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct DispatchOptions {
    /// Log a diagnostic for every Image, Border or Custom command.
    pub report_unsupported: bool,
}

/// Walk `commands` once and build the frame's vertex data and draw list.
pub fn build_frame(
    commands: &[RenderCommand<'_>],
    fonts: &mut FontTable,
    viewport: Viewport,
    options: DispatchOptions,
) -> Result<FramePlan, FrameError> {
    let mut plan = FramePlan::new(viewport);
    plan.reserve(commands)?;

    let mut clips = ClipStack::new(ClipRect::full(&viewport));

    for (index, command) in commands.iter().enumerate() {
        match &command.data {
            RenderData::Rectangle(style) => {
                let clip = clips.current();
                if clip.is_empty() {
                    continue;
                }
                let start = plan.rect_vertices.len();
                plan.rect_vertices
                    .append(&rect_vertices(&command.bounding_box, style, &viewport))?;
                plan.push_draw(DrawKind::Rect, clip, start, plan.rect_vertices.len());
                plan.stats.rect_count += 1;
            }

            RenderData::Text { text, config } => {
                let Some(font) = fonts.get_mut(config.font_id) else {
                    log::warn!(
                        "Text command {} (id {}) references unknown font {}; skipped",
                        index,
                        command.id,
                        config.font_id
                    );
                    plan.stats.skipped_commands += 1;
                    continue;
                };
                let clip = clips.current();
                if clip.is_empty() {
                    continue;
                }

                let color = config.color.normalized();
                let start = plan.text_vertices.len();
                for quad in font.layout_glyphs(text, config, command.bounding_box) {
                    plan.text_vertices
                        .append(&glyph_vertices(&quad, color, &viewport))?;
                    plan.stats.glyph_count += 1;
                }
                plan.push_draw(
                    DrawKind::Text(config.font_id),
                    clip,
                    start,
                    plan.text_vertices.len(),
                );
            }

            RenderData::ScissorStart => {
                clips.push(ClipRect::from_box(&command.bounding_box, &viewport));
            }

            RenderData::ScissorEnd => {
                clips.pop().ok_or(FrameError::ScissorUnderflow { index })?;
            }

            RenderData::Image(_) | RenderData::Border(_) | RenderData::Custom(_) => {
                if options.report_unsupported {
                    log::debug!(
                        "Command {} (id {}): {} rendering is not supported; skipped",
                        index,
                        command.id,
                        command.data.kind()
                    );
                }
                plan.stats.skipped_commands += 1;
            }

            RenderData::None => {}
        }
    }

    if clips.depth() > 0 {
        return Err(FrameError::UnclosedScissor {
            depth: clips.depth(),
        });
    }

    log::debug!(
        "Frame planned: {} rects, {} glyphs, {} draw calls, {} skipped",
        plan.stats.rect_count,
        plan.stats.glyph_count,
        plan.stats.draw_calls,
        plan.stats.skipped_commands
    );
    Ok(plan)
}

// ===================================================================
// Tests
// ===================================================================
