//! Text measurement and glyph-quad layout.
//!
//! Both consume per-character advances from the font's shaper; nothing
//! here shapes text itself. Output is in framebuffer pixels (origin
//! top-left, y down); conversion to device coordinates is the
//! renderer's job.

use clay_core::{BoundingBox, Dimensions, TextConfig};

use crate::fonts::Font;

/// One textured glyph rectangle in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphQuad {
    pub ch: char,
    /// Top-left corner.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
}

/// Lazy glyph-quad sequence for one text run.
///
/// Borrowed from the [`Font`] for the duration of a frame; consume it
/// once, immediately.
pub struct GlyphQuads<'a> {
    font: &'a Font,
    chars: std::str::Chars<'a>,
    advances: std::vec::IntoIter<f32>,
    left: f32,
    pen_x: f32,
    baseline: f32,
    line_advance: f32,
    scale: f32,
}

impl Iterator for GlyphQuads<'_> {
    type Item = GlyphQuad;

    fn next(&mut self) -> Option<GlyphQuad> {
        loop {
            let ch = self.chars.next()?;
            let advance = self.advances.next().unwrap_or(0.0);

            if ch == '\n' {
                self.pen_x = self.left;
                self.baseline += self.line_advance;
                continue;
            }

            let pen_x = self.pen_x;
            self.pen_x += advance;

            if ch.is_control() {
                continue;
            }

            let Some(glyph) = self.font.glyph(ch) else {
                continue;
            };
            if glyph.is_empty() {
                continue;
            }

            return Some(GlyphQuad {
                ch,
                x: pen_x + glyph.bearing[0] * self.scale,
                y: self.baseline - glyph.bearing[1] * self.scale,
                width: glyph.size[0] * self.scale,
                height: glyph.size[1] * self.scale,
                uv_min: glyph.uv_origin,
                uv_max: [
                    glyph.uv_origin[0] + glyph.uv_extent[0],
                    glyph.uv_origin[1] + glyph.uv_extent[1],
                ],
            });
        }
    }
}

fn usable(pixel_size: f32) -> bool {
    pixel_size.is_finite() && pixel_size > 0.0
}

impl Font {
    /// Width of the widest `\n`-separated line, and `pixel_size` as height.
    pub fn measure(&mut self, text: &str, pixel_size: f32) -> Dimensions {
        if !usable(pixel_size) {
            return Dimensions::default();
        }

        let advances = self.face.advances(text, pixel_size);
        let mut widest: f32 = 0.0;
        let mut line: f32 = 0.0;
        for (ch, advance) in text.chars().zip(advances) {
            if ch == '\n' {
                widest = widest.max(line);
                line = 0.0;
            } else {
                line += advance;
            }
        }

        Dimensions::new(widest.max(line), pixel_size)
    }

    /// Lay out `text` inside `bounds` using `config.font_size`.
    ///
    /// The first baseline sits at `bounds.y` plus the scaled ascent.
    pub fn layout_glyphs<'a>(
        &'a mut self,
        text: &'a str,
        config: &TextConfig,
        bounds: BoundingBox,
    ) -> GlyphQuads<'a> {
        let (advances, text) = if usable(config.font_size) {
            (self.face.advances(text, config.font_size), text)
        } else {
            (Vec::new(), "")
        };
        let scale = config.font_size / self.pixel_size();
        let baseline = bounds.y + self.metrics().ascent * scale;

        GlyphQuads {
            font: self,
            chars: text.chars(),
            advances: advances.into_iter(),
            left: bounds.x,
            pen_x: bounds.x,
            baseline,
            line_advance: config.line_advance(),
            scale,
        }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use clay_core::Color;

    use crate::face::SyntheticFace;
    use crate::fonts::FontTable;

    use super::*;

    fn table_with(face: SyntheticFace, pixel_size: f32) -> FontTable {
        let mut table = FontTable::default();
        table.load_face(face, pixel_size).unwrap();
        table
    }

    fn config(font_size: f32) -> TextConfig {
        TextConfig {
            color: Color::rgba(255.0, 255.0, 255.0, 255.0),
            font_id: 0,
            font_size,
            line_height: 0.0,
        }
    }

    #[test]
    fn test_measure_sums_advances() {
        let face = SyntheticFace::new(18.0)
            .with_advance('A', 10.0)
            .with_advance('B', 12.0);
        let mut table = table_with(face, 18.0);
        let dims = table.measure("AB", 0, 18.0).unwrap();
        assert_eq!(dims, Dimensions::new(22.0, 18.0));
    }

    #[test]
    fn test_measure_takes_widest_line() {
        let face = SyntheticFace::new(10.0).with_default_advance(5.0);
        let mut table = table_with(face, 10.0);
        let dims = table.measure("ab\nabcd\nc", 0, 10.0).unwrap();
        assert_eq!(dims.width, 20.0);
        assert_eq!(dims.height, 10.0);
    }

    #[test]
    fn test_measure_empty() {
        let mut table = table_with(SyntheticFace::new(10.0), 10.0);
        assert_eq!(table.measure("", 0, 10.0).unwrap(), Dimensions::new(0.0, 10.0));
    }

    #[test]
    fn test_measure_zero_size() {
        let mut table = table_with(SyntheticFace::new(10.0), 10.0);
        assert_eq!(table.measure("abc", 0, 0.0).unwrap(), Dimensions::default());
    }

    #[test]
    fn test_measure_monotonic_in_length() {
        let face = SyntheticFace::new(16.0)
            .with_default_advance(7.0)
            .with_advance('i', 3.0)
            .with_advance('W', 14.0);
        let mut table = table_with(face, 16.0);
        let text: String = (' '..='~').cycle().take(300).collect();
        let mut previous = 0.0;
        for end in 0..=text.len() {
            let width = table.measure(&text[..end], 0, 16.0).unwrap().width;
            assert!(width >= previous, "width shrank at {end}");
            previous = width;
        }
    }

    #[test]
    fn test_layout_one_quad_per_visible_char() {
        let mut table = table_with(SyntheticFace::new(16.0).with_default_advance(8.0), 16.0);
        let font = table.get_mut(0).unwrap();
        let quads: Vec<_> = font
            .layout_glyphs("a b\tc", &config(16.0), BoundingBox::new(0.0, 0.0, 100.0, 20.0))
            .collect();
        // Space has no bitmap; tab is a control char.
        assert_eq!(quads.iter().map(|q| q.ch).collect::<String>(), "abc");
    }

    #[test]
    fn test_layout_pen_advances() {
        let face = SyntheticFace::new(16.0)
            .with_advance('A', 10.0)
            .with_advance('B', 12.0);
        let mut table = table_with(face, 16.0);
        let font = table.get_mut(0).unwrap();
        let quads: Vec<_> = font
            .layout_glyphs("AB", &config(16.0), BoundingBox::new(5.0, 0.0, 100.0, 20.0))
            .collect();
        assert_eq!(quads.len(), 2);
        let a_left = quads[0].x - font_bearing(&table, 'A');
        let b_left = quads[1].x - font_bearing(&table, 'B');
        assert_eq!(a_left, 5.0);
        assert_eq!(b_left, 15.0);
    }

    #[test]
    fn test_layout_width_matches_measure_with_tab() {
        let mut table = table_with(SyntheticFace::new(16.0).with_default_advance(8.0), 16.0);
        let measured = table.measure("a\tb", 0, 16.0).unwrap().width;
        let bearing = font_bearing(&table, 'b');
        let advance = table.get(0).unwrap().glyph('b').unwrap().advance;

        let font = table.get_mut(0).unwrap();
        let quads: Vec<_> = font
            .layout_glyphs("a\tb", &config(16.0), BoundingBox::default())
            .collect();
        assert_eq!(quads.len(), 2);
        let b_left = quads[1].x - bearing;
        assert_eq!(b_left, 16.0);
        assert_eq!(b_left + advance, measured);
    }

    fn font_bearing(table: &FontTable, ch: char) -> f32 {
        table.get(0).unwrap().glyph(ch).unwrap().bearing[0]
    }

    #[test]
    fn test_layout_baseline_and_newline() {
        let mut table = table_with(SyntheticFace::new(20.0).with_default_advance(10.0), 20.0);
        let font = table.get_mut(0).unwrap();
        let cfg = TextConfig { line_height: 30.0, ..config(20.0) };
        let quads: Vec<_> = font
            .layout_glyphs("x\ny", &cfg, BoundingBox::new(0.0, 100.0, 50.0, 60.0))
            .collect();
        assert_eq!(quads.len(), 2);
        // ascent 16, glyph height 14 → top at 100 + 16 - 14.
        assert_eq!(quads[0].y, 102.0);
        assert_eq!(quads[1].y, 132.0);
        assert_eq!(quads[0].x, quads[1].x);
    }

    #[test]
    fn test_layout_scales_from_loaded_size() {
        let mut table = table_with(SyntheticFace::new(10.0).with_default_advance(10.0), 10.0);
        let font = table.get_mut(0).unwrap();
        let small: Vec<_> = font
            .layout_glyphs("m", &config(10.0), BoundingBox::default())
            .collect();
        let large: Vec<_> = font
            .layout_glyphs("m", &config(20.0), BoundingBox::default())
            .collect();
        assert_eq!(large[0].width, small[0].width * 2.0);
        assert_eq!(large[0].height, small[0].height * 2.0);
        assert_eq!(large[0].uv_min, small[0].uv_min);
    }

    #[test]
    fn test_layout_uv_matches_glyph() {
        let mut table = table_with(SyntheticFace::new(16.0), 16.0);
        let glyph = *table.get(0).unwrap().glyph('k').unwrap();
        let font = table.get_mut(0).unwrap();
        let quad = font
            .layout_glyphs("k", &config(16.0), BoundingBox::default())
            .next()
            .unwrap();
        assert_eq!(quad.uv_min, glyph.uv_origin);
        assert_eq!(quad.uv_max[0], glyph.uv_origin[0] + glyph.uv_extent[0]);
    }

    #[test]
    fn test_layout_zero_font_size_is_empty() {
        let mut table = table_with(SyntheticFace::new(16.0), 16.0);
        let font = table.get_mut(0).unwrap();
        assert_eq!(
            font.layout_glyphs("abc", &config(0.0), BoundingBox::default()).count(),
            0
        );
    }
}
