//! Glyph atlas: CPU-side coverage bitmap for one font.
//!
//! Glyphs are packed with a shelf (row) algorithm: left to right along
//! the current shelf; when the next glyph would cross the right edge a
//! new shelf starts below the tallest glyph seen on the current one.
//! Packing is deterministic in insertion order, so a font loaded twice
//! produces byte-identical atlases.
//!
//! The bitmap is single-channel (one coverage byte per pixel) and is
//! uploaded once as an `R8Unorm` texture by the renderer.

/// A region within the atlas texture (UV coordinates normalized to [0,1]).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasRegion {
    /// Top-left U coordinate.
    pub u_min: f32,
    /// Top-left V coordinate.
    pub v_min: f32,
    /// Bottom-right U coordinate.
    pub u_max: f32,
    /// Bottom-right V coordinate.
    pub v_max: f32,
}

/// Pixel-space rectangle within the atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasRect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn overlaps(&self, other: &AtlasRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Single-shelf packer. Only the current shelf is open; earlier shelves
/// are closed once a glyph overflows the row.
#[derive(Clone, Debug)]
pub struct ShelfPacker {
    width: u32,
    height: u32,
    padding: u32,
    cursor_x: u32,
    shelf_y: u32,
    /// Tallest glyph (plus padding) placed on the current shelf.
    shelf_height: u32,
    shelves: u32,
}

impl ShelfPacker {
    pub fn new(width: u32, height: u32, padding: u32) -> Self {
        Self {
            width,
            height,
            padding,
            cursor_x: 0,
            shelf_y: 0,
            shelf_height: 0,
            shelves: 1,
        }
    }

    /// Reserve a `width × height` rect, or `None` if it cannot fit.
    pub fn place(&mut self, width: u32, height: u32) -> Option<AtlasRect> {
        if width > self.width {
            return None; // Glyph wider than atlas.
        }

        if self.cursor_x + width > self.width {
            self.shelf_y += self.shelf_height;
            self.cursor_x = 0;
            self.shelf_height = 0;
            self.shelves += 1;
        }

        if self.shelf_y + height > self.height {
            return None; // Atlas full.
        }

        let rect = AtlasRect {
            x: self.cursor_x,
            y: self.shelf_y,
            width,
            height,
        };
        self.cursor_x += width + self.padding;
        self.shelf_height = self.shelf_height.max(height + self.padding);
        Some(rect)
    }

    /// Number of shelves opened so far.
    pub fn shelf_count(&self) -> u32 {
        self.shelves
    }
}

/// CPU-side glyph atlas.
pub struct Atlas {
    /// Atlas width in pixels.
    pub width: u32,
    /// Atlas height in pixels.
    pub height: u32,
    /// Coverage bytes, row-major, `width * height` long.
    pub data: Vec<u8>,
    packer: ShelfPacker,
    glyph_count: usize,
}

impl Atlas {
    pub fn new(width: u32, height: u32, padding: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize)],
            packer: ShelfPacker::new(width, height, padding),
            glyph_count: 0,
        }
    }

    /// Number of glyph bitmaps packed so far.
    pub fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    pub fn shelf_count(&self) -> u32 {
        self.packer.shelf_count()
    }

    /// Pack a coverage bitmap and copy it in.
    ///
    /// Returns `None` when the glyph does not fit or `coverage` is
    /// shorter than `width * height`. Zero-sized bitmaps occupy no space.
    pub fn insert(&mut self, width: u32, height: u32, coverage: &[u8]) -> Option<AtlasRect> {
        if width == 0 || height == 0 {
            return Some(AtlasRect { x: 0, y: 0, width: 0, height: 0 });
        }
        if coverage.len() < (width as usize) * (height as usize) {
            return None;
        }

        let rect = self.packer.place(width, height)?;
        self.blit(&rect, coverage);
        self.glyph_count += 1;
        Some(rect)
    }

    /// Convert a pixel rect to normalized UV coordinates.
    pub fn region(&self, rect: &AtlasRect) -> AtlasRegion {
        let inv_w = 1.0 / self.width as f32;
        let inv_h = 1.0 / self.height as f32;
        AtlasRegion {
            u_min: rect.x as f32 * inv_w,
            v_min: rect.y as f32 * inv_h,
            u_max: rect.right() as f32 * inv_w,
            v_max: rect.bottom() as f32 * inv_h,
        }
    }

    fn blit(&mut self, rect: &AtlasRect, coverage: &[u8]) {
        let src_stride = rect.width as usize;
        let dst_stride = self.width as usize;
        for row in 0..rect.height as usize {
            let src = &coverage[row * src_stride..(row + 1) * src_stride];
            let dst_start = (rect.y as usize + row) * dst_stride + rect.x as usize;
            self.data[dst_start..dst_start + src_stride].copy_from_slice(src);
        }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_creation() {
        let atlas = Atlas::new(64, 32, 0);
        assert_eq!(atlas.width, 64);
        assert_eq!(atlas.height, 32);
        assert_eq!(atlas.data.len(), 64 * 32);
        assert_eq!(atlas.glyph_count(), 0);
    }

    #[test]
    fn test_insert_copies_rows() {
        let mut atlas = Atlas::new(8, 8, 0);
        let bitmap = [1, 2, 3, 4, 5, 6]; // 3x2
        let rect = atlas.insert(3, 2, &bitmap).unwrap();
        assert_eq!(rect, AtlasRect { x: 0, y: 0, width: 3, height: 2 });
        assert_eq!(&atlas.data[0..3], &[1, 2, 3]);
        assert_eq!(&atlas.data[8..11], &[4, 5, 6]);
        assert_eq!(atlas.data[3], 0);
    }

    #[test]
    fn test_shelf_advances_left_to_right() {
        let mut packer = ShelfPacker::new(20, 20, 0);
        let a = packer.place(6, 4).unwrap();
        let b = packer.place(6, 7).unwrap();
        assert_eq!((a.x, a.y), (0, 0));
        assert_eq!((b.x, b.y), (6, 0));
        assert_eq!(packer.shelf_count(), 1);
    }

    #[test]
    fn test_new_shelf_starts_below_tallest_glyph() {
        let mut packer = ShelfPacker::new(10, 40, 0);
        packer.place(4, 3).unwrap();
        packer.place(4, 9).unwrap();
        // 8 + 4 > 10 → new shelf at y = 9 (tallest on the first shelf).
        let c = packer.place(4, 2).unwrap();
        assert_eq!((c.x, c.y), (0, 9));
        assert_eq!(packer.shelf_count(), 2);
    }

    #[test]
    fn test_padding_separates_glyphs() {
        let mut packer = ShelfPacker::new(32, 32, 1);
        let a = packer.place(5, 5).unwrap();
        let b = packer.place(5, 5).unwrap();
        assert_eq!(b.x, a.right() + 1);
    }

    #[test]
    fn test_too_wide_glyph_rejected() {
        let mut atlas = Atlas::new(16, 16, 0);
        assert!(atlas.insert(17, 2, &[255; 34]).is_none());
        assert_eq!(atlas.glyph_count(), 0);
    }

    #[test]
    fn test_atlas_full_returns_none() {
        let mut atlas = Atlas::new(20, 20, 0);
        let bitmap = vec![255u8; 10 * 10];
        for _ in 0..4 {
            assert!(atlas.insert(10, 10, &bitmap).is_some());
        }
        assert!(atlas.insert(10, 10, &bitmap).is_none(), "Atlas should be full");
    }

    #[test]
    fn test_short_coverage_rejected() {
        let mut atlas = Atlas::new(16, 16, 0);
        assert!(atlas.insert(4, 4, &[0u8; 15]).is_none());
    }

    #[test]
    fn test_zero_sized_glyph_takes_no_space() {
        let mut atlas = Atlas::new(16, 16, 0);
        let empty = atlas.insert(0, 0, &[]).unwrap();
        assert_eq!(empty.width, 0);
        let next = atlas.insert(2, 2, &[9; 4]).unwrap();
        assert_eq!((next.x, next.y), (0, 0));
        assert_eq!(atlas.glyph_count(), 1);
    }

    #[test]
    fn test_region_normalized() {
        let atlas = Atlas::new(100, 50, 0);
        let region = atlas.region(&AtlasRect { x: 10, y: 5, width: 20, height: 10 });
        assert!((region.u_min - 0.1).abs() < 1e-6);
        assert!((region.v_min - 0.1).abs() < 1e-6);
        assert!((region.u_max - 0.3).abs() < 1e-6);
        assert!((region.v_max - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_packed_glyphs_never_overlap_and_stay_in_bounds() {
        let mut atlas = Atlas::new(64, 64, 1);
        let mut placed = Vec::new();
        // Deterministic pseudo-random sizes, all no wider than the atlas.
        let mut seed = 7u32;
        for _ in 0..200 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let w = 1 + (seed >> 16) % 14;
            let h = 1 + (seed >> 8) % 11;
            let bitmap = vec![255u8; (w * h) as usize];
            if let Some(rect) = atlas.insert(w, h, &bitmap) {
                placed.push(rect);
            }
        }
        assert!(!placed.is_empty());
        for (i, a) in placed.iter().enumerate() {
            assert!(a.right() <= atlas.width && a.bottom() <= atlas.height);
            for b in &placed[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_packing_is_deterministic() {
        let build = || {
            let mut atlas = Atlas::new(32, 32, 1);
            for i in 1..12u32 {
                let bitmap = vec![i as u8; (i * 2) as usize];
                atlas.insert(i, 2, &bitmap);
            }
            atlas.data
        };
        assert_eq!(build(), build());
    }
}
