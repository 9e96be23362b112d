use std::fmt;

/// Which kind of sources an atlas holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Images,
    Font,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Images => write!(f, "image"),
            SourceKind::Font => write!(f, "font"),
        }
    }
}

#[derive(Debug)]
pub enum AtlasError {
    /// The source with this id (and every source after it that also failed)
    /// did not fit into the canvas.
    PackingOverflow {
        id: usize,
        canvas_width: u32,
        canvas_height: u32,
    },
    /// The estimated glyph bitmap was too small for the baked range.
    FontBakingOverflow { width: u32, height: u32 },
    UnknownId(usize),
    /// An atlas holding `atlas` sources was asked to take `requested` ones.
    ModeConflict {
        atlas: SourceKind,
        requested: SourceKind,
    },
    EmptySource { id: usize },
    InvalidConfig(String),
    FontParse(String),
    Image(image::ImageError),
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::PackingOverflow {
                id,
                canvas_width,
                canvas_height,
            } => write!(
                f,
                "source {id} does not fit into the {canvas_width}x{canvas_height} canvas"
            ),
            AtlasError::FontBakingOverflow { width, height } => write!(
                f,
                "glyphs do not fit into the estimated {width}x{height} font bitmap"
            ),
            AtlasError::UnknownId(id) => write!(f, "no sprite registered with id {id}"),
            AtlasError::ModeConflict { atlas, requested } => write!(
                f,
                "can't add {requested} sources to an atlas that already holds {atlas} sources"
            ),
            AtlasError::EmptySource { id } => write!(f, "source {id} has zero width or height"),
            AtlasError::InvalidConfig(reason) => write!(f, "invalid atlas config: {reason}"),
            AtlasError::FontParse(reason) => write!(f, "couldn't parse font: {reason}"),
            AtlasError::Image(err) => write!(f, "image error: {err}"),
        }
    }
}

impl std::error::Error for AtlasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AtlasError::Image(err) => Some(err),
            _ => None,
        }
    }
}

impl From<image::ImageError> for AtlasError {
    fn from(err: image::ImageError) -> Self {
        AtlasError::Image(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_message_names_source_and_canvas() {
        let err = AtlasError::PackingOverflow {
            id: 3,
            canvas_width: 128,
            canvas_height: 128,
        };
        assert_eq!(
            err.to_string(),
            "source 3 does not fit into the 128x128 canvas"
        );
    }

    #[test]
    fn mode_conflict_message_names_both_modes() {
        let err = AtlasError::ModeConflict {
            atlas: SourceKind::Font,
            requested: SourceKind::Images,
        };
        let msg = err.to_string();
        assert!(msg.contains("image sources"), "{msg}");
        assert!(msg.contains("font sources"), "{msg}");
    }

    #[test]
    fn converts_into_anyhow_and_back() {
        let err: anyhow::Error = AtlasError::UnknownId(7).into();
        assert!(matches!(
            err.downcast_ref::<AtlasError>(),
            Some(AtlasError::UnknownId(7))
        ));
    }
}
