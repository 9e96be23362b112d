use std::collections::HashMap;

use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};
use log::{debug, warn};

use crate::{
    canvas::expand_coverage,
    config::BakeSettings,
    error::AtlasError,
    packer::Rect,
    text::rasterizer::{parse_font, GlyphRasterizer, RasterGlyph},
};

/// Where one character lives in the baked bitmap and how to lay it out.
///
/// Offsets are in pixels relative to the pen position on the baseline, with
/// y growing downwards: a glyph sitting on the baseline has a negative
/// `y_offset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphMetric {
    pub source: Rect,
    pub x_offset: i32,
    pub y_offset: i32,
    /// How far the pen moves right after drawing this glyph.
    pub x_advance: i32,
    /// How far down from the glyph's top the baseline sits.
    pub baseline: i32,
}

impl GlyphMetric {
    fn new(source: Rect, glyph: &RasterGlyph, advance_adjust: f32) -> Self {
        let y_offset = -(glyph.ymin + glyph.height as i32);
        Self {
            source,
            x_offset: glyph.xmin,
            y_offset,
            x_advance: (glyph.advance + advance_adjust).round() as i32,
            baseline: -y_offset,
        }
    }

    /// Pixel quad `(x0, y0, x1, y1)` relative to the pen.
    pub fn quad(&self) -> (i32, i32, i32, i32) {
        (
            self.x_offset,
            self.y_offset,
            self.x_offset + self.source.w as i32,
            self.y_offset + self.source.h as i32,
        )
    }
}

/// One font rasterized at one pixel size.
#[derive(Clone, Debug)]
pub struct BakedFont {
    coverage: GrayImage,
    canvas: RgbaImage,
    pixel_size: f32,
    settings: BakeSettings,
    metrics: Vec<GlyphMetric>,
    kerning: HashMap<(char, char), i32>,
    height: u32,
    baseline: i32,
}

impl BakedFont {
    /// The white-on-transparent RGBA bitmap, coverage in alpha.
    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Single channel coverage, as produced by the rasterizer.
    pub fn coverage(&self) -> &GrayImage {
        &self.coverage
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    pub fn settings(&self) -> &BakeSettings {
        &self.settings
    }

    /// Nominal line height, `ceil(pixel_size)`.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Largest baseline offset of any glyph, so a run of text can be placed
    /// with its tops at `y` and its baseline at `y + baseline()`.
    pub fn baseline(&self) -> i32 {
        self.baseline
    }

    pub fn metrics(&self) -> &[GlyphMetric] {
        &self.metrics
    }

    pub fn metric(&self, c: char) -> Option<&GlyphMetric> {
        self.metrics.get(self.settings.index_of(c)?)
    }

    pub fn kerning(&self, left: char, right: char) -> i32 {
        self.kerning.get(&(left, right)).copied().unwrap_or(0)
    }

    /// Pen distance covered by `text`. Characters outside the baked range
    /// are skipped.
    pub fn text_width(&self, text: &str) -> i32 {
        let mut width = 0;
        let mut prev = None;
        for c in text.chars() {
            let Some(metric) = self.metric(c) else {
                continue;
            };
            if let Some(p) = prev {
                width += self.kerning(p, c);
            }
            width += metric.x_advance;
            prev = Some(c);
        }
        width
    }

    /// Blends `text` onto `target` in `color`, the pen starting at `x` with
    /// the baseline at `y`. Glyphs are clipped against the target's bounds.
    pub fn draw_text(&self, target: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        let mut pen = x;
        let mut prev = None;
        for c in text.chars() {
            let Some(metric) = self.metric(c) else {
                continue;
            };
            if let Some(p) = prev {
                pen += self.kerning(p, c);
            }
            self.blit_glyph(target, metric, pen + metric.x_offset, y + metric.y_offset, color);
            pen += metric.x_advance;
            prev = Some(c);
        }
    }

    fn blit_glyph(&self, target: &mut RgbaImage, metric: &GlyphMetric, left: i32, top: i32, color: Rgba<u8>) {
        let (target_w, target_h) = (target.width() as i32, target.height() as i32);
        for dy in 0..metric.source.h {
            let ty = top + dy as i32;
            if ty < 0 || ty >= target_h {
                continue;
            }
            for dx in 0..metric.source.w {
                let tx = left + dx as i32;
                if tx < 0 || tx >= target_w {
                    continue;
                }
                let Luma([alpha]) = *self
                    .coverage
                    .get_pixel(metric.source.x + dx, metric.source.y + dy);
                if alpha == 0 {
                    continue;
                }
                let mut src = color;
                src[3] = ((color[3] as u16 * alpha as u16) / 255) as u8;
                target.get_pixel_mut(tx as u32, ty as u32).blend(&src);
            }
        }
    }
}

// glyphs go left to right with a 1px gap, wrapping to a new row when one is full
struct GlyphRows {
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    bottom: u32,
}

impl GlyphRows {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            x: 1,
            y: 1,
            bottom: 1,
        }
    }

    fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.x + w + 1 > self.width {
            self.y = self.bottom;
            self.x = 1;
        }
        if self.x + w + 1 > self.width || self.y + h + 1 > self.height {
            return None;
        }
        let spot = (self.x, self.y);
        self.x += w + 1;
        self.bottom = self.bottom.max(self.y + h + 1);
        Some(spot)
    }
}

/// Bitmap size for the whole range: one row as wide as every glyph plus a
/// pixel of padding each, `ceil(pixel_size)` plus the configured slack tall.
fn estimate_size<R>(rasterizer: &R, pixel_size: f32, settings: &BakeSettings) -> (u32, u32)
where
    R: GlyphRasterizer + ?Sized,
{
    let width = 1 + settings
        .chars()
        .map(|c| rasterizer.measure(c, pixel_size).width as u32 + 1)
        .sum::<u32>();
    let height = pixel_size.ceil() as u32 + settings.height_slack;
    (width, height)
}

fn copy_coverage(coverage: &mut GrayImage, bitmap: &[u8], x: u32, y: u32, w: u32) {
    if w == 0 {
        return;
    }
    for (row, line) in bitmap.chunks_exact(w as usize).enumerate() {
        for (col, &value) in line.iter().enumerate() {
            coverage.put_pixel(x + col as u32, y + row as u32, Luma([value]));
        }
    }
}

/// Parses `font_bytes` and bakes the configured character range at
/// `pixel_size` pixels.
pub fn bake(font_bytes: &[u8], pixel_size: f32, settings: &BakeSettings) -> Result<BakedFont, AtlasError> {
    let font = parse_font(font_bytes)?;
    bake_with(&font, pixel_size, settings)
}

pub fn bake_with<R>(rasterizer: &R, pixel_size: f32, settings: &BakeSettings) -> Result<BakedFont, AtlasError>
where
    R: GlyphRasterizer + ?Sized,
{
    settings.validate()?;
    if !(pixel_size.is_finite() && pixel_size > 0.0) {
        return Err(AtlasError::InvalidConfig(format!(
            "pixel size {pixel_size} must be positive"
        )));
    }

    let (width, height) = estimate_size(rasterizer, pixel_size, settings);
    debug!(
        "baking {} glyphs at {}px into {}x{}",
        settings.char_count(),
        pixel_size,
        width,
        height
    );

    let mut coverage = GrayImage::new(width, height);
    let mut rows = GlyphRows::new(width, height);
    let mut metrics = Vec::with_capacity(settings.char_count());
    for c in settings.chars() {
        let (glyph, bitmap) = rasterizer.rasterize(c, pixel_size);
        let (w, h) = (glyph.width as u32, glyph.height as u32);
        let Some((x, y)) = rows.place(w, h) else {
            warn!(
                "glyph {:?} ({}x{}) overflowed the {}x{} font bitmap",
                c, w, h, width, height
            );
            return Err(AtlasError::FontBakingOverflow { width, height });
        };
        copy_coverage(&mut coverage, &bitmap, x, y, w);
        metrics.push(GlyphMetric::new(
            Rect::new(x, y, w, h),
            &glyph,
            settings.advance_adjust,
        ));
    }

    let mut kerning = HashMap::new();
    for left in settings.chars() {
        for right in settings.chars() {
            let Some(kern) = rasterizer.kern(left, right, pixel_size) else {
                continue;
            };
            let kern = kern.round() as i32;
            if kern != 0 {
                kerning.insert((left, right), kern);
            }
        }
    }

    let baseline = metrics.iter().map(|m| m.baseline).fold(0, i32::max);
    let canvas = expand_coverage(&coverage);
    debug!(
        "baked font: baseline {}, {} kerning pairs",
        baseline,
        kerning.len()
    );

    Ok(BakedFont {
        coverage,
        canvas,
        pixel_size,
        settings: settings.clone(),
        metrics,
        kerning,
        height: pixel_size.ceil() as u32,
        baseline,
    })
}
