//! `cosmic-text` backed font face.
//!
//! Each face owns a private [`FontSystem`] whose database holds exactly
//! one font file, so shaping never falls back to system fonts.

use std::path::{Path, PathBuf};

use cosmic_text::{
    fontdb, Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, SwashContent,
};

use crate::face::{FaceMetrics, GlyphBitmap, GlyphRasterizer, RasterError, TextShaper};
use crate::fonts::FontError;

pub struct CosmicFace {
    font_system: FontSystem,
    swash_cache: SwashCache,
    family: String,
    path: PathBuf,
}

impl CosmicFace {
    /// Read a TrueType/OpenType file and prepare it for shaping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut db = fontdb::Database::new();
        db.load_font_data(data);
        let family = db
            .faces()
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
            .ok_or_else(|| FontError::Unsupported {
                path: path.to_path_buf(),
            })?;

        log::debug!("Opened font family '{}' from {}", family, path.display());

        Ok(Self {
            font_system: FontSystem::new_with_locale_and_db(String::from("en-US"), db),
            swash_cache: SwashCache::new(),
            family,
            path: path.to_path_buf(),
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shape a single line with no wrapping.
    fn shape_line(&mut self, line: &str, pixel_size: f32) -> Buffer {
        let metrics = Metrics::new(pixel_size, (pixel_size * 1.2).ceil());
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);
        let attrs = Attrs::new().family(Family::Name(&self.family));
        buffer.set_text(&mut self.font_system, line, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }
}

impl GlyphRasterizer for CosmicFace {
    fn metrics(&mut self, pixel_size: f32) -> FaceMetrics {
        let sample: String = (' '..='~').collect();
        let buffer = self.shape_line(&sample, pixel_size);

        let mut metrics = FaceMetrics {
            ascent: pixel_size * 0.8,
            line_height: (pixel_size * 1.2).ceil(),
            max_advance: pixel_size,
        };
        if let Some(run) = buffer.layout_runs().next() {
            metrics.ascent = run.line_y - run.line_top;
            metrics.max_advance = run.glyphs.iter().map(|g| g.w).fold(1.0, f32::max);
        }
        metrics
    }

    fn rasterize(&mut self, ch: char, pixel_size: f32) -> Result<GlyphBitmap, RasterError> {
        if ch.is_control() {
            return Err(RasterError::MissingGlyph(ch));
        }

        let mut utf8 = [0u8; 4];
        let buffer = self.shape_line(ch.encode_utf8(&mut utf8), pixel_size);
        let glyph = buffer
            .layout_runs()
            .next()
            .and_then(|run| run.glyphs.first().cloned())
            .ok_or(RasterError::MissingGlyph(ch))?;
        if glyph.glyph_id == 0 {
            return Err(RasterError::MissingGlyph(ch)); // .notdef
        }

        let physical = glyph.physical((0.0, 0.0), 1.0);
        let image = match self
            .swash_cache
            .get_image(&mut self.font_system, physical.cache_key)
        {
            Some(img) => img,
            None => return Ok(GlyphBitmap::empty(glyph.w)), // whitespace
        };

        let width = image.placement.width;
        let height = image.placement.height;
        if width == 0 || height == 0 {
            return Ok(GlyphBitmap::empty(glyph.w));
        }

        let coverage: Vec<u8> = match image.content {
            SwashContent::Mask => image.data.clone(),
            SwashContent::Color => image
                .data
                .chunks(4)
                .map(|px| px.get(3).copied().unwrap_or(255))
                .collect(),
            SwashContent::SubpixelMask => image
                .data
                .chunks(3)
                .map(|px| (px.iter().map(|&c| c as u16).sum::<u16>() / 3) as u8)
                .collect(),
        };

        if coverage.len() < (width as usize) * (height as usize) {
            return Err(RasterError::Failed {
                ch,
                reason: format!("bitmap has {} bytes for {}x{}", coverage.len(), width, height),
            });
        }

        Ok(GlyphBitmap {
            width,
            height,
            left: image.placement.left as f32,
            top: image.placement.top as f32,
            advance: glyph.w,
            coverage,
        })
    }
}

/// Line breaks `cosmic_text::Buffer::set_text` splits on. Shaped glyph
/// offsets restart after each one, so `advances` must split the same way.
fn is_line_break(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}

impl TextShaper for CosmicFace {
    fn advances(&mut self, text: &str, pixel_size: f32) -> Vec<f32> {
        let mut advances = Vec::with_capacity(text.len());

        for (i, line) in text.split(is_line_break).enumerate() {
            if i > 0 {
                advances.push(0.0); // the break itself
            }
            let base = advances.len();
            let char_starts: Vec<usize> = line.char_indices().map(|(byte, _)| byte).collect();
            advances.resize(base + char_starts.len(), 0.0);
            if line.is_empty() {
                continue;
            }

            // Ligatures attribute their whole advance to the first char of the cluster.
            let buffer = self.shape_line(line, pixel_size);
            for run in buffer.layout_runs() {
                for glyph in run.glyphs.iter() {
                    if let Ok(idx) = char_starts.binary_search(&glyph.start) {
                        advances[base + idx] += glyph.w;
                    }
                }
            }
        }

        advances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_splits_keep_char_count() {
        for text in ["a\rb", "a\r\nb", "\n\rx\r", "plain"] {
            let lines: Vec<&str> = text.split(is_line_break).collect();
            let chars: usize = lines.iter().map(|l| l.chars().count()).sum();
            assert_eq!(chars + lines.len() - 1, text.chars().count(), "{text:?}");
        }
        assert_eq!("a\rb\r\nc".split(is_line_break).collect::<Vec<_>>(), ["a", "b", "", "c"]);
    }

    #[test]
    fn test_open_missing_file() {
        let err = CosmicFace::open("/nonexistent/font.ttf").err().unwrap();
        assert!(matches!(err, FontError::Io { .. }));
    }

    #[test]
    fn test_open_garbage_file() {
        let path = std::env::temp_dir().join("clay-text-not-a-font.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let err = CosmicFace::open(&path).err().unwrap();
        assert!(matches!(err, FontError::Unsupported { .. }));
        let _ = std::fs::remove_file(&path);
    }
}
