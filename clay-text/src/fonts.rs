//! Font table: loads faces, bakes their glyph atlases, hands out ids.
//!
//! ## Architecture
//!
//! ```text
//! FontTable (bounded, default 16 slots)
//!   └── Font
//!         ├── face: Box<dyn FontFace>      (shaping + rasterization)
//!         ├── glyphs: HashMap<char, Glyph> (sparse, [first, end) codepoints)
//!         └── atlas: Atlas                 (single-channel, shelf packed)
//! ```
//!
//! Fonts are never unloaded. Ids are dense, 0-based, and assigned in
//! load order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clay_core::{BoundingBox, Dimensions, FontId, TextConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atlas::Atlas;
use crate::cosmic::CosmicFace;
use crate::face::{FaceMetrics, FontFace};
use crate::shaping::GlyphQuads;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("failed to read font file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported or corrupt font file {}", path.display())]
    Unsupported { path: PathBuf },

    #[error("font table is full ({capacity} fonts)")]
    TableFull { capacity: usize },

    #[error("unknown font id {0}")]
    UnknownFont(FontId),

    #[error("invalid pixel size {0}")]
    InvalidPixelSize(f32),

    #[error("glyph atlas {width}x{height} exceeds the {limit}px texture limit")]
    AtlasTooLarge { width: u32, height: u32, limit: u32 },
}

/// Font loading parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontTableConfig {
    /// Maximum number of concurrently loaded fonts.
    pub max_fonts: usize,
    /// Atlas canvas = metrics × oversample.
    pub oversample: f32,
    /// First codepoint baked into each atlas.
    pub first_codepoint: u32,
    /// One past the last baked codepoint.
    pub end_codepoint: u32,
    /// Empty pixels between packed glyphs.
    pub padding: u32,
    /// Largest atlas side in pixels. Clamped to the device's 2D texture
    /// limit by the renderer.
    pub max_atlas_size: u32,
}

impl Default for FontTableConfig {
    fn default() -> Self {
        Self {
            max_fonts: 16,
            oversample: 12.0,
            first_codepoint: 0,
            end_codepoint: 128,
            padding: 1,
            max_atlas_size: 8192,
        }
    }
}

/// Placement and atlas coordinates of one baked glyph, in pixels at the
/// font's loaded size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Glyph {
    pub advance: f32,
    /// `[left, top]` offset from pen position / baseline.
    pub bearing: [f32; 2],
    /// Bitmap width and height.
    pub size: [f32; 2],
    /// Normalized top-left texture coordinate.
    pub uv_origin: [f32; 2],
    /// Normalized texture extent.
    pub uv_extent: [f32; 2],
}

impl Glyph {
    /// True for advance-only glyphs such as space.
    pub fn is_empty(&self) -> bool {
        self.size[0] <= 0.0 || self.size[1] <= 0.0
    }
}

/// A loaded font: face, baked glyphs and their atlas.
pub struct Font {
    pub(crate) face: Box<dyn FontFace>,
    pixel_size: f32,
    metrics: FaceMetrics,
    glyphs: HashMap<char, Glyph>,
    atlas: Atlas,
    skipped: usize,
}

impl Font {
    /// Rasterize the configured codepoint range and pack it.
    ///
    /// Fails before rasterizing anything if the atlas would exceed
    /// `config.max_atlas_size`. Individual glyph failures are logged and
    /// skipped.
    pub fn bake(
        mut face: Box<dyn FontFace>,
        pixel_size: f32,
        config: &FontTableConfig,
    ) -> Result<Self, FontError> {
        let metrics = face.metrics(pixel_size);
        let (width, height) = atlas_size(&metrics, config.oversample);
        if width > config.max_atlas_size || height > config.max_atlas_size {
            return Err(FontError::AtlasTooLarge {
                width,
                height,
                limit: config.max_atlas_size,
            });
        }
        let mut atlas = Atlas::new(width, height, config.padding);

        let mut glyphs = HashMap::new();
        let mut skipped = 0;

        for ch in (config.first_codepoint..config.end_codepoint).filter_map(char::from_u32) {
            let bitmap = match face.rasterize(ch, pixel_size) {
                Ok(bitmap) => bitmap,
                Err(err) => {
                    if ch.is_control() {
                        log::debug!("Skipping glyph U+{:04X}: {}", ch as u32, err);
                    } else {
                        log::warn!("Skipping glyph U+{:04X}: {}", ch as u32, err);
                    }
                    skipped += 1;
                    continue;
                }
            };

            let Some(rect) = atlas.insert(bitmap.width, bitmap.height, &bitmap.coverage) else {
                log::warn!(
                    "Glyph {:?} ({}x{}) does not fit the {}x{} atlas; skipped",
                    ch,
                    bitmap.width,
                    bitmap.height,
                    atlas.width,
                    atlas.height
                );
                skipped += 1;
                continue;
            };

            let region = atlas.region(&rect);
            glyphs.insert(
                ch,
                Glyph {
                    advance: bitmap.advance,
                    bearing: [bitmap.left, bitmap.top],
                    size: [bitmap.width as f32, bitmap.height as f32],
                    uv_origin: [region.u_min, region.v_min],
                    uv_extent: [region.u_max - region.u_min, region.v_max - region.v_min],
                },
            );
        }

        Ok(Self {
            face,
            pixel_size,
            metrics,
            glyphs,
            atlas,
            skipped,
        })
    }

    /// Pixel size the atlas was rasterized at.
    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    pub fn metrics(&self) -> &FaceMetrics {
        &self.metrics
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Codepoints in the configured range that failed to bake.
    pub fn skipped_glyphs(&self) -> usize {
        self.skipped
    }

    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }
}

fn atlas_size(metrics: &FaceMetrics, oversample: f32) -> (u32, u32) {
    let side = |v: f32| (v * oversample).ceil().clamp(1.0, u32::MAX as f32) as u32;
    (side(metrics.max_advance), side(metrics.line_height))
}

/// Bounded table of loaded fonts.
pub struct FontTable {
    fonts: Vec<Font>,
    config: FontTableConfig,
}

impl Default for FontTable {
    fn default() -> Self {
        Self::new(FontTableConfig::default())
    }
}

impl FontTable {
    pub fn new(config: FontTableConfig) -> Self {
        Self {
            fonts: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &FontTableConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.max_fonts
    }

    /// Load a TrueType/OpenType file and bake its atlas at `pixel_size`.
    ///
    /// On failure nothing is registered.
    pub fn load_font(&mut self, path: impl AsRef<Path>, pixel_size: f32) -> Result<FontId, FontError> {
        self.check_slot(pixel_size)?;
        let face = CosmicFace::open(path.as_ref())?;
        self.register(Box::new(face), pixel_size, &path.as_ref().display().to_string())
    }

    /// Register an already-open face.
    pub fn load_face(&mut self, face: impl FontFace + 'static, pixel_size: f32) -> Result<FontId, FontError> {
        self.check_slot(pixel_size)?;
        self.register(Box::new(face), pixel_size, "in-memory face")
    }

    pub fn get(&self, id: FontId) -> Option<&Font> {
        self.fonts.get(usize::from(id))
    }

    pub fn get_mut(&mut self, id: FontId) -> Option<&mut Font> {
        self.fonts.get_mut(usize::from(id))
    }

    /// Loaded fonts with their ids, in load order.
    pub fn iter(&self) -> impl Iterator<Item = (FontId, &Font)> {
        self.fonts.iter().enumerate().map(|(i, font)| (i as FontId, font))
    }

    /// Text measurement for the layout engine.
    pub fn measure(&mut self, text: &str, id: FontId, pixel_size: f32) -> Result<Dimensions, FontError> {
        let font = self.get_mut(id).ok_or(FontError::UnknownFont(id))?;
        Ok(font.measure(text, pixel_size))
    }

    /// Glyph quads for `text` in the font named by `config.font_id`.
    pub fn layout_glyphs<'a>(
        &'a mut self,
        text: &'a str,
        config: &TextConfig,
        bounds: BoundingBox,
    ) -> Result<GlyphQuads<'a>, FontError> {
        let font = self
            .get_mut(config.font_id)
            .ok_or(FontError::UnknownFont(config.font_id))?;
        Ok(font.layout_glyphs(text, config, bounds))
    }

    fn check_slot(&self, pixel_size: f32) -> Result<(), FontError> {
        if self.fonts.len() >= self.config.max_fonts {
            return Err(FontError::TableFull {
                capacity: self.config.max_fonts,
            });
        }
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(FontError::InvalidPixelSize(pixel_size));
        }
        Ok(())
    }

    fn register(&mut self, face: Box<dyn FontFace>, pixel_size: f32, origin: &str) -> Result<FontId, FontError> {
        let id = FontId::try_from(self.fonts.len()).map_err(|_| FontError::TableFull {
            capacity: self.config.max_fonts,
        })?;
        let font = Font::bake(face, pixel_size, &self.config)?;
        log::info!(
            "Loaded font {} from {} at {}px: {}x{} atlas, {} glyphs ({} skipped)",
            id,
            origin,
            pixel_size,
            font.atlas.width,
            font.atlas.height,
            font.glyph_count(),
            font.skipped
        );
        self.fonts.push(font);
        Ok(id)
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::SyntheticFace;

    fn face() -> SyntheticFace {
        SyntheticFace::new(16.0).with_default_advance(8.0)
    }

    #[test]
    fn test_ids_are_dense_and_monotonic() {
        let mut table = FontTable::default();
        assert_eq!(table.load_face(face(), 16.0).unwrap(), 0);
        assert_eq!(table.load_face(face(), 24.0).unwrap(), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).unwrap().pixel_size(), 24.0);
    }

    #[test]
    fn test_missing_file_registers_nothing() {
        let mut table = FontTable::default();
        let err = table.load_font("/nonexistent/font.ttf", 16.0).unwrap_err();
        assert!(matches!(err, FontError::Io { .. }));
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_table_full() {
        let mut table = FontTable::new(FontTableConfig {
            max_fonts: 2,
            ..Default::default()
        });
        table.load_face(face(), 16.0).unwrap();
        table.load_face(face(), 16.0).unwrap();
        let err = table.load_face(face(), 16.0).unwrap_err();
        assert!(matches!(err, FontError::TableFull { capacity: 2 }));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_table_full_checked_before_opening_file() {
        let mut table = FontTable::new(FontTableConfig {
            max_fonts: 0,
            ..Default::default()
        });
        let err = table.load_font("/nonexistent/font.ttf", 16.0).unwrap_err();
        assert!(matches!(err, FontError::TableFull { .. }));
    }

    #[test]
    fn test_invalid_pixel_size() {
        let mut table = FontTable::default();
        assert!(matches!(
            table.load_face(face(), 0.0),
            Err(FontError::InvalidPixelSize(_))
        ));
        assert!(matches!(
            table.load_face(face(), f32::NAN),
            Err(FontError::InvalidPixelSize(_))
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_bake_covers_printable_ascii() {
        let mut table = FontTable::default();
        let id = table.load_face(face(), 16.0).unwrap();
        let font = table.get(id).unwrap();
        for ch in ' '..='~' {
            assert!(font.glyph(ch).is_some(), "missing {ch:?}");
        }
        // Control characters have no glyph.
        assert!(font.glyph('\n').is_none());
        assert_eq!(font.glyph_count(), 95);
        assert_eq!(font.skipped_glyphs(), 33);
    }

    #[test]
    fn test_atlas_sized_from_metrics() {
        let mut table = FontTable::default();
        let id = table.load_face(face(), 20.0).unwrap();
        let font = table.get(id).unwrap();
        // max_advance = 8 * 20/16 = 10, line_height = 24.
        assert_eq!(font.atlas().width, 120);
        assert_eq!(font.atlas().height, 288);
    }

    #[test]
    fn test_oversized_atlas_rejected_and_table_unchanged() {
        let mut table = FontTable::new(FontTableConfig {
            max_atlas_size: 256,
            ..Default::default()
        });
        // 120x288 at 20px.
        let err = table.load_face(face(), 20.0).unwrap_err();
        assert!(matches!(
            err,
            FontError::AtlasTooLarge { width: 120, height: 288, limit: 256 }
        ));
        assert!(table.is_empty());

        assert_eq!(table.load_face(face(), 16.0).unwrap(), 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_glyph_uvs_inside_unit_square() {
        let mut table = FontTable::default();
        let id = table.load_face(face(), 16.0).unwrap();
        let font = table.get(id).unwrap();
        for ch in '!'..='~' {
            let g = font.glyph(ch).unwrap();
            assert!(!g.is_empty());
            assert!(g.uv_origin[0] >= 0.0 && g.uv_origin[1] >= 0.0);
            assert!(g.uv_origin[0] + g.uv_extent[0] <= 1.0 + 1e-6);
            assert!(g.uv_origin[1] + g.uv_extent[1] <= 1.0 + 1e-6);
        }
        assert!(font.glyph(' ').unwrap().is_empty());
    }

    #[test]
    fn test_broken_glyph_does_not_abort_load() {
        let mut table = FontTable::default();
        let id = table
            .load_face(face().with_broken_glyph('Q'), 16.0)
            .unwrap();
        let font = table.get(id).unwrap();
        assert!(font.glyph('Q').is_none());
        assert!(font.glyph('R').is_some());
    }

    #[test]
    fn test_oversized_glyphs_skipped() {
        let config = FontTableConfig {
            oversample: 1.0,
            ..Default::default()
        };
        let mut table = FontTable::new(config);
        // A single very wide glyph overflows the 1x canvas height quickly.
        let id = table.load_face(face(), 16.0).unwrap();
        let font = table.get(id).unwrap();
        assert!(font.glyph_count() < 95);
        assert!(font.skipped_glyphs() > 33);
    }

    #[test]
    fn test_custom_codepoint_range() {
        let config = FontTableConfig {
            first_codepoint: 'a' as u32,
            end_codepoint: 'z' as u32 + 1,
            ..Default::default()
        };
        let mut table = FontTable::new(config);
        let id = table.load_face(face(), 16.0).unwrap();
        let font = table.get(id).unwrap();
        assert_eq!(font.glyph_count(), 26);
        assert!(font.glyph('A').is_none());
    }

    #[test]
    fn test_unknown_font_measure() {
        let mut table = FontTable::default();
        assert!(matches!(
            table.measure("x", 3, 16.0),
            Err(FontError::UnknownFont(3))
        ));
    }

    #[test]
    fn test_layout_glyphs_by_font_id() {
        let mut table = FontTable::default();
        table.load_face(face(), 16.0).unwrap();
        let config = TextConfig { font_id: 0, font_size: 16.0, ..Default::default() };
        let count = table
            .layout_glyphs("hi", &config, BoundingBox::default())
            .unwrap()
            .count();
        assert_eq!(count, 2);

        let missing = TextConfig { font_id: 5, ..config };
        assert!(matches!(
            table.layout_glyphs("hi", &missing, BoundingBox::default()),
            Err(FontError::UnknownFont(5))
        ));
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: FontTableConfig = serde_json::from_str(r#"{ "max_fonts": 4 }"#).unwrap();
        assert_eq!(config.max_fonts, 4);
        assert_eq!(config.end_codepoint, 128);
    }
}
