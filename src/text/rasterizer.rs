use fontdue::{Font, FontSettings};

use crate::error::AtlasError;

/// Placement of one rasterized glyph relative to the pen position on the
/// baseline. `xmin`/`ymin` follow the font convention (y grows upwards, so
/// `ymin` is the distance of the bitmap's bottom edge above the baseline).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RasterGlyph {
    pub xmin: i32,
    pub ymin: i32,
    pub width: usize,
    pub height: usize,
    pub advance: f32,
}

/// Something that turns characters into coverage bitmaps.
pub trait GlyphRasterizer {
    /// Size of the glyph's bitmap without producing it.
    fn measure(&self, c: char, px: f32) -> RasterGlyph;

    /// Row-major, one byte of coverage per pixel, `width * height` long.
    fn rasterize(&self, c: char, px: f32) -> (RasterGlyph, Vec<u8>);

    fn kern(&self, left: char, right: char, px: f32) -> Option<f32>;
}

pub fn parse_font(bytes: &[u8]) -> Result<Font, AtlasError> {
    Font::from_bytes(bytes, FontSettings::default())
        .map_err(|err| AtlasError::FontParse(err.to_string()))
}

impl From<fontdue::Metrics> for RasterGlyph {
    fn from(metrics: fontdue::Metrics) -> Self {
        Self {
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            width: metrics.width,
            height: metrics.height,
            advance: metrics.advance_width,
        }
    }
}

impl GlyphRasterizer for Font {
    fn measure(&self, c: char, px: f32) -> RasterGlyph {
        self.metrics(c, px).into()
    }

    fn rasterize(&self, c: char, px: f32) -> (RasterGlyph, Vec<u8>) {
        let (metrics, bitmap) = Font::rasterize(self, c, px);
        (metrics.into(), bitmap)
    }

    fn kern(&self, left: char, right: char, px: f32) -> Option<f32> {
        self.horizontal_kern(left, right, px)
    }
}
