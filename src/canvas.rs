use image::{GenericImage, GrayImage, Rgba, RgbaImage};

use crate::packer::Placement;

/// Copies each source into a fresh `width`x`height` canvas at its placement.
/// `placements[i]` must belong to `sources[i]`.
pub fn compose(
    sources: &[RgbaImage],
    placements: &[Placement],
    width: u32,
    height: u32,
) -> image::ImageResult<RgbaImage> {
    let mut canvas = RgbaImage::new(width, height);
    for (source, placement) in sources.iter().zip(placements) {
        canvas.copy_from(source, placement.x, placement.y)?;
    }
    Ok(canvas)
}

/// White pixels carrying the coverage as alpha. Text drawn from this gets its
/// colour from a tint at draw time.
pub fn expand_coverage(coverage: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(coverage.width(), coverage.height(), |x, y| {
        Rgba([255, 255, 255, coverage.get_pixel(x, y)[0]])
    })
}
