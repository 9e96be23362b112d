// fonts get baked once per (font, pixel size):
// - rasterize every character of a fixed range with fontdue
// - lay the coverage bitmaps out in one strip, a pixel apart
// - keep per-glyph source rects, advances and baseline offsets for layout
//
// the strip has its own little row packer instead of going through
// `packer::pack`, since the bitmap size is derived from the glyphs themselves.

pub mod glyph_baker;
pub mod rasterizer;

pub use glyph_baker::{bake, bake_with, BakedFont, GlyphMetric};
pub use rasterizer::{GlyphRasterizer, RasterGlyph};
