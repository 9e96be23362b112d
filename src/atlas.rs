use std::path::Path;

use anyhow::Context;
use image::RgbaImage;
use itertools::Itertools;
use log::{debug, info};

use crate::{
    canvas,
    config::AtlasConfig,
    error::{AtlasError, SourceKind},
    packer,
    text::{self, BakedFont},
};

/// Index of a registered sprite. Images are numbered in registration order;
/// in a font atlas a glyph's id is its code point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(pub usize);

impl From<char> for SpriteId {
    fn from(c: char) -> Self {
        SpriteId(c as usize)
    }
}

/// Corners in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Quad {
    /// Unit square centred on the origin.
    pub const UNIT: Quad = Quad {
        x0: -0.5,
        y0: -0.5,
        x1: 0.5,
        y1: 0.5,
    };
}

/// Corners in normalized texture space, all within `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TexQuad {
    pub s0: f32,
    pub t0: f32,
    pub s1: f32,
    pub t1: f32,
}

impl TexQuad {
    fn from_pixels(x: u32, y: u32, w: u32, h: u32, canvas_w: u32, canvas_h: u32) -> Self {
        let (cw, ch) = (canvas_w as f32, canvas_h as f32);
        Self {
            s0: x as f32 / cw,
            t0: y as f32 / ch,
            s1: (x + w) as f32 / cw,
            t1: (y + h) as f32 / ch,
        }
    }
}

/// Everything a renderer needs to draw one sprite or glyph.
///
/// Sprites span the unit quad. Glyph quads are measured in multiples of the
/// font's pixel size, relative to the pen on the baseline, so scaling a run
/// by the desired text height gives its on-screen size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteLocation {
    pub world: Quad,
    /// `None` until the atlas has been built.
    pub texture: Option<TexQuad>,
    /// Glyphs only, in the same units as `world`.
    pub x_advance: Option<f32>,
}

impl SpriteLocation {
    fn sprite() -> Self {
        Self {
            world: Quad::UNIT,
            texture: None,
            x_advance: None,
        }
    }
}

#[derive(Debug)]
enum Sources {
    Empty,
    Images(Vec<RgbaImage>),
    Font(BakedFont),
}

/// Owns a set of sprite images or one baked font and the sheet built from
/// them.
///
/// Registering a source throws the current sheet away; the next
/// [`AtlasBuilder::get_surface`] packs everything again from scratch.
#[derive(Debug)]
pub struct AtlasBuilder {
    config: AtlasConfig,
    sources: Sources,
    locations: Vec<SpriteLocation>,
    canvas: Option<RgbaImage>,
}

impl AtlasBuilder {
    pub fn new(config: AtlasConfig) -> Result<Self, AtlasError> {
        config.validate()?;
        Ok(Self {
            config,
            sources: Sources::Empty,
            locations: Vec::new(),
            canvas: None,
        })
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Whether the next `get_surface` has to rebuild the sheet.
    pub fn is_dirty(&self) -> bool {
        self.canvas.is_none()
    }

    pub fn font(&self) -> Option<&BakedFont> {
        match &self.sources {
            Sources::Font(font) => Some(font),
            _ => None,
        }
    }

    fn kind(&self) -> Option<SourceKind> {
        match self.sources {
            Sources::Empty => None,
            Sources::Images(_) => Some(SourceKind::Images),
            Sources::Font(_) => Some(SourceKind::Font),
        }
    }

    fn invalidate(&mut self) {
        if self.canvas.take().is_some() {
            debug!("atlas sheet invalidated");
        }
        if let Sources::Images(_) = self.sources {
            for location in &mut self.locations {
                location.texture = None;
            }
        }
    }

    pub fn register_image(&mut self, image: RgbaImage) -> Result<SpriteId, AtlasError> {
        if let Some(SourceKind::Font) = self.kind() {
            return Err(AtlasError::ModeConflict {
                atlas: SourceKind::Font,
                requested: SourceKind::Images,
            });
        }
        let id = self.locations.len();
        if image.width() == 0 || image.height() == 0 {
            return Err(AtlasError::EmptySource { id });
        }

        self.invalidate();
        debug!("registered sprite {} ({}x{})", id, image.width(), image.height());
        match &mut self.sources {
            Sources::Images(images) => images.push(image),
            sources => *sources = Sources::Images(vec![image]),
        }
        self.locations.push(SpriteLocation::sprite());
        Ok(SpriteId(id))
    }

    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<SpriteId> {
        let path = path.as_ref();
        let image = sprack_asset::load_image(path)?;
        let id = self
            .register_image(image)
            .with_context(|| format!("couldn't add {} to the atlas", path.display()))?;
        Ok(id)
    }

    /// Bakes `font_bytes` at `pixel_size` and turns this into a font atlas.
    /// A font atlas can't take images, and an atlas with images can't take a
    /// font. Baking a second font replaces the first.
    pub fn register_font(&mut self, font_bytes: &[u8], pixel_size: f32) -> Result<(), AtlasError> {
        self.check_font_allowed()?;
        let font = text::bake(font_bytes, pixel_size, &self.config.bake)?;
        self.register_baked_font(font)
    }

    pub fn load_font<P: AsRef<Path>>(&mut self, path: P, pixel_size: f32) -> anyhow::Result<()> {
        let path = path.as_ref();
        let bytes = sprack_asset::read_bytes(path)?;
        self.register_font(&bytes, pixel_size)
            .with_context(|| format!("couldn't bake {} at {}px", path.display(), pixel_size))?;
        Ok(())
    }

    /// Takes a font baked elsewhere, e.g. with a custom rasterizer.
    pub fn register_baked_font(&mut self, font: BakedFont) -> Result<(), AtlasError> {
        self.check_font_allowed()?;

        let (width, height) = font.dimensions();
        let px = font.pixel_size();
        self.locations = font
            .metrics()
            .iter()
            .map(|metric| {
                let (x0, y0, x1, y1) = metric.quad();
                let source = metric.source;
                SpriteLocation {
                    world: Quad {
                        x0: x0 as f32 / px,
                        y0: y0 as f32 / px,
                        x1: x1 as f32 / px,
                        y1: y1 as f32 / px,
                    },
                    texture: Some(TexQuad::from_pixels(
                        source.x, source.y, source.w, source.h, width, height,
                    )),
                    x_advance: Some(metric.x_advance as f32 / px),
                }
            })
            .collect();
        self.canvas = Some(font.canvas().clone());
        info!(
            "font atlas ready: {} glyphs at {}px in {}x{}",
            self.locations.len(),
            px,
            width,
            height
        );
        self.sources = Sources::Font(font);
        Ok(())
    }

    fn check_font_allowed(&self) -> Result<(), AtlasError> {
        match self.kind() {
            Some(SourceKind::Images) => Err(AtlasError::ModeConflict {
                atlas: SourceKind::Images,
                requested: SourceKind::Font,
            }),
            _ => Ok(()),
        }
    }

    /// Changes the sheet size. Ids stay the same; every texture coordinate is
    /// recomputed on the next build.
    pub fn set_canvas_size(&mut self, canvas_size: u32) -> Result<(), AtlasError> {
        let config = self.config.clone().with_canvas_size(canvas_size);
        config.validate()?;
        self.config = config;
        if !matches!(self.sources, Sources::Font(_)) {
            self.invalidate();
        }
        Ok(())
    }

    /// The sheet, built first if anything changed since the last call.
    ///
    /// On failure nothing is half-built: the sheet stays absent and texture
    /// coordinates stay unset until the sources are fixed.
    pub fn get_surface(&mut self) -> Result<&RgbaImage, AtlasError> {
        let canvas = match self.canvas.take() {
            Some(canvas) => canvas,
            None => self.build()?,
        };
        Ok(self.canvas.insert(canvas))
    }

    fn build(&mut self) -> Result<RgbaImage, AtlasError> {
        let size = self.config.canvas_size;
        let images = match &self.sources {
            Sources::Empty => return Ok(RgbaImage::new(size, size)),
            Sources::Font(font) => return Ok(font.canvas().clone()),
            Sources::Images(images) => images,
        };

        let sizes = images.iter().map(|img| img.dimensions()).collect_vec();
        let placements = packer::pack(&sizes, size, size, self.config.padding)?;
        debug_assert!(placements
            .iter()
            .map(|p| p.rect().inflate(self.config.padding))
            .tuple_combinations()
            .all(|(a, b)| !a.overlaps(&b)));
        let canvas = canvas::compose(images, &placements, size, size)?;

        for (location, placement) in self.locations.iter_mut().zip(&placements) {
            location.texture = Some(TexQuad::from_pixels(
                placement.x,
                placement.y,
                placement.w,
                placement.h,
                size,
                size,
            ));
        }
        info!("built {}x{} atlas with {} sprites", size, size, placements.len());
        Ok(canvas)
    }

    /// A copy of the sprite's placement. Ids that were never handed out are
    /// a caller bug and come back as [`AtlasError::UnknownId`].
    pub fn get_location(&self, id: SpriteId) -> Result<SpriteLocation, AtlasError> {
        let index = match &self.sources {
            Sources::Font(font) => u32::try_from(id.0)
                .ok()
                .and_then(char::from_u32)
                .and_then(|c| font.settings().index_of(c)),
            _ => Some(id.0),
        };
        index
            .and_then(|i| self.locations.get(i))
            .copied()
            .ok_or(AtlasError::UnknownId(id.0))
    }

    pub fn glyph_location(&self, c: char) -> Result<SpriteLocation, AtlasError> {
        self.get_location(c.into())
    }
}

impl Default for AtlasBuilder {
    fn default() -> Self {
        Self {
            config: AtlasConfig::default(),
            sources: Sources::Empty,
            locations: Vec::new(),
            canvas: None,
        }
    }
}
