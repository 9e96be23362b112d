use crate::error::AtlasError;

const SURROGATES_START: u32 = 0xD800;
const SURROGATES_END: u32 = 0xDFFF;

/// Settings for rasterizing a font into its glyph bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct BakeSettings {
    pub first_char: char,
    pub last_char: char,
    /// Added to every glyph's advance before rounding; negative values
    /// tighten the spacing.
    pub advance_adjust: f32,
    /// Extra rows on top of the nominal pixel size. Some fonts need a few
    /// more pixels than `ceil(pixel_size)`; the bake reports an overflow when
    /// this isn't enough.
    pub height_slack: u32,
}

impl BakeSettings {
    pub fn new() -> Self {
        Self {
            first_char: ' ',
            last_char: '~',
            advance_adjust: 0.0,
            height_slack: 5,
        }
    }

    pub fn with_chars(mut self, first_char: char, last_char: char) -> Self {
        self.first_char = first_char;
        self.last_char = last_char;
        self
    }

    pub fn with_advance_adjust(mut self, advance_adjust: f32) -> Self {
        self.advance_adjust = advance_adjust;
        self
    }

    pub fn with_height_slack(mut self, height_slack: u32) -> Self {
        self.height_slack = height_slack;
        self
    }

    pub fn chars(&self) -> impl Iterator<Item = char> {
        self.first_char..=self.last_char
    }

    pub fn char_count(&self) -> usize {
        self.chars().count()
    }

    pub fn contains(&self, c: char) -> bool {
        (self.first_char..=self.last_char).contains(&c)
    }

    /// Position of `c` in [`chars`](Self::chars), which skips the surrogate
    /// block.
    pub fn index_of(&self, c: char) -> Option<usize> {
        if !self.contains(c) {
            return None;
        }
        let mut index = c as u32 - self.first_char as u32;
        if (self.first_char as u32) < SURROGATES_START && c as u32 > SURROGATES_END {
            index -= SURROGATES_END - SURROGATES_START + 1;
        }
        Some(index as usize)
    }

    pub fn validate(&self) -> Result<(), AtlasError> {
        if self.first_char > self.last_char {
            return Err(AtlasError::InvalidConfig(format!(
                "character range {:?}..={:?} is empty",
                self.first_char, self.last_char
            )));
        }
        if !self.advance_adjust.is_finite() {
            return Err(AtlasError::InvalidConfig(
                "advance adjustment must be finite".into(),
            ));
        }
        Ok(())
    }
}

impl Default for BakeSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AtlasConfig {
    /// Side length of the square canvas, a power of two.
    pub canvas_size: u32,
    /// Empty pixels kept around every packed sprite.
    pub padding: u32,
    pub bake: BakeSettings,
}

impl AtlasConfig {
    pub fn new() -> Self {
        Self {
            canvas_size: 1024,
            padding: 1,
            bake: BakeSettings::new(),
        }
    }

    pub fn with_canvas_size(mut self, canvas_size: u32) -> Self {
        self.canvas_size = canvas_size;
        self
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_bake(mut self, bake: BakeSettings) -> Self {
        self.bake = bake;
        self
    }

    pub fn validate(&self) -> Result<(), AtlasError> {
        if !self.canvas_size.is_power_of_two() {
            return Err(AtlasError::InvalidConfig(format!(
                "canvas size {} is not a power of two",
                self.canvas_size
            )));
        }
        if self.padding.saturating_mul(2) >= self.canvas_size {
            return Err(AtlasError::InvalidConfig(format!(
                "padding {} leaves no room in a {} canvas",
                self.padding, self.canvas_size
            )));
        }
        self.bake.validate()
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self::new()
    }
}
