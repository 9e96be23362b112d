pub mod atlas;
pub mod canvas;
pub mod config;
pub mod error;
pub mod packer;
pub mod text;

pub use atlas::{AtlasBuilder, Quad, SpriteId, SpriteLocation, TexQuad};
pub use config::{AtlasConfig, BakeSettings};
pub use error::{AtlasError, SourceKind};

// one sheet per atlas, never both kinds of source in the same sheet:
// - sprite atlases pack registered images with the skyline packer
// - font atlases take the strip the glyph baker produced as-is
//
// renderers upload `AtlasBuilder::get_surface` once and read quads with
// `get_location` per frame. nothing here touches the gpu.
