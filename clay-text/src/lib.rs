//! # clay-text
//!
//! Glyph atlases and text measurement for the Clay renderer backend.
//!
//! ## Architecture
//!
//! ```text
//! FontTable::load_font(path, px) ──► CosmicFace (cosmic-text)
//!     │                                   │ rasterize [first, end)
//!     ▼                                   ▼
//!   Font { glyphs, atlas } ◄── shelf-packed coverage bitmap
//!     │
//!     ├── measure(text, px)                ──► Dimensions (layout engine)
//!     └── layout_glyphs(text, config, box) ──► GlyphQuads (renderer)
//! ```
//!
//! - **`atlas`**: single-channel atlas bitmap with shelf packing.
//! - **`face`**: rasterizer/shaper traits and a synthetic test face.
//! - **`cosmic`**: `cosmic-text` backed face for real font files.
//! - **`fonts`**: bounded font table and glyph baking.
//! - **`shaping`**: measurement and lazy glyph-quad layout.

pub mod atlas;
pub mod cosmic;
pub mod face;
pub mod fonts;
pub mod shaping;

// Re-exports for ergonomic use.
pub use atlas::{Atlas, AtlasRect, AtlasRegion, ShelfPacker};
pub use cosmic::CosmicFace;
pub use face::{FaceMetrics, FontFace, GlyphBitmap, GlyphRasterizer, RasterError, SyntheticFace, TextShaper};
pub use fonts::{Font, FontError, FontTable, FontTableConfig, Glyph};
pub use shaping::{GlyphQuad, GlyphQuads};
