//! Reading the files an atlas is built from: font files as raw bytes, image
//! files decoded to RGBA.

pub mod loader;

pub use loader::{decode_image, load_image, read_bytes, Asset, Loader};
