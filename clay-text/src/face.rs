//! Font faces: the rasterization and shaping seam.
//!
//! A [`FontFace`] is anything that can report vertical metrics, turn a
//! character into a coverage bitmap, and produce per-character advances
//! for a run of text. The production face is
//! [`CosmicFace`](crate::cosmic::CosmicFace); [`SyntheticFace`] draws
//! solid boxes with configured advances and needs no font files.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// Vertical metrics of a face at a given pixel size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceMetrics {
    /// Baseline distance from the top of the line box.
    pub ascent: f32,
    /// Natural line height (ascent + descent + gap).
    pub line_height: f32,
    /// Widest horizontal advance among the printable ASCII glyphs.
    pub max_advance: f32,
}

/// Single-channel rasterization of one character.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    /// Offset from the pen position to the bitmap's left edge.
    pub left: f32,
    /// Offset from the baseline up to the bitmap's top edge.
    pub top: f32,
    /// Horizontal pen advance in pixels.
    pub advance: f32,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

impl GlyphBitmap {
    /// An advance-only glyph with no visible pixels (e.g. space).
    pub fn empty(advance: f32) -> Self {
        Self { advance, ..Self::default() }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RasterError {
    #[error("face has no glyph for {0:?}")]
    MissingGlyph(char),

    #[error("rasterizing {ch:?} failed: {reason}")]
    Failed { ch: char, reason: String },
}

/// Turns characters into coverage bitmaps.
pub trait GlyphRasterizer {
    fn metrics(&mut self, pixel_size: f32) -> FaceMetrics;

    fn rasterize(&mut self, ch: char, pixel_size: f32) -> Result<GlyphBitmap, RasterError>;
}

/// Produces per-character horizontal advances for a run of text.
///
/// The returned vector has exactly one entry per `char` of `text`, in
/// order. Newlines advance by zero; the caller handles line breaks.
pub trait TextShaper {
    fn advances(&mut self, text: &str, pixel_size: f32) -> Vec<f32>;
}

/// A loadable font face: rasterizer and shaper in one object.
pub trait FontFace: GlyphRasterizer + TextShaper {}

impl<T: GlyphRasterizer + TextShaper> FontFace for T {}

// ── Synthetic face ──────────────────────────────────────────────────

/// Deterministic face that renders every printable glyph as a solid box.
///
/// Advances are specified at `design_size` and scale linearly with the
/// requested pixel size. Used for headless tests and benchmarks.
#[derive(Clone, Debug)]
pub struct SyntheticFace {
    design_size: f32,
    default_advance: f32,
    advances: HashMap<char, f32>,
    broken: HashSet<char>,
}

impl SyntheticFace {
    pub fn new(design_size: f32) -> Self {
        Self {
            design_size,
            default_advance: design_size * 0.5,
            advances: HashMap::new(),
            broken: HashSet::new(),
        }
    }

    /// Advance used for characters without an explicit entry.
    pub fn with_default_advance(mut self, advance: f32) -> Self {
        self.default_advance = advance;
        self
    }

    pub fn with_advance(mut self, ch: char, advance: f32) -> Self {
        self.advances.insert(ch, advance);
        self
    }

    /// Make rasterization of `ch` fail, as a damaged font would.
    pub fn with_broken_glyph(mut self, ch: char) -> Self {
        self.broken.insert(ch);
        self
    }

    fn scale(&self, pixel_size: f32) -> f32 {
        if self.design_size > 0.0 {
            pixel_size / self.design_size
        } else {
            1.0
        }
    }

    fn advance_of(&self, ch: char, pixel_size: f32) -> f32 {
        if ch == '\n' {
            return 0.0;
        }
        let design = self.advances.get(&ch).copied().unwrap_or(self.default_advance);
        design * self.scale(pixel_size)
    }
}

impl GlyphRasterizer for SyntheticFace {
    fn metrics(&mut self, pixel_size: f32) -> FaceMetrics {
        let widest = self
            .advances
            .values()
            .copied()
            .fold(self.default_advance, f32::max);
        FaceMetrics {
            ascent: pixel_size * 4.0 / 5.0,
            line_height: pixel_size * 6.0 / 5.0,
            max_advance: widest * self.scale(pixel_size),
        }
    }

    fn rasterize(&mut self, ch: char, pixel_size: f32) -> Result<GlyphBitmap, RasterError> {
        if ch.is_control() {
            return Err(RasterError::MissingGlyph(ch));
        }
        if self.broken.contains(&ch) {
            return Err(RasterError::Failed {
                ch,
                reason: String::from("synthetic failure"),
            });
        }

        let advance = self.advance_of(ch, pixel_size);
        if ch.is_whitespace() {
            return Ok(GlyphBitmap::empty(advance));
        }

        let width = (advance * 4.0 / 5.0).ceil().max(1.0) as u32;
        let height = (pixel_size * 7.0 / 10.0).ceil().max(1.0) as u32;
        Ok(GlyphBitmap {
            width,
            height,
            left: ((advance - width as f32) * 0.5).max(0.0).floor(),
            top: height as f32,
            advance,
            coverage: vec![255; (width * height) as usize],
        })
    }
}

impl TextShaper for SyntheticFace {
    fn advances(&mut self, text: &str, pixel_size: f32) -> Vec<f32> {
        text.chars().map(|ch| self.advance_of(ch, pixel_size)).collect()
    }
}

// ===================================================================
// Tests
// ===================================================================
