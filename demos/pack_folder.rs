//! Packs every PNG in a directory into one sheet.
//!
//! cargo run --example pack-folder -- <dir> [canvas size] [out.png]

use anyhow::{bail, Context, Result};
use log::info;
use sprack::{AtlasBuilder, AtlasConfig};
use sprack_asset::Loader;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(dir) = args.next() else {
        bail!("usage: pack-folder <dir> [canvas size] [out.png]");
    };
    let canvas_size = match args.next() {
        Some(size) => size.parse().context("canvas size must be a number")?,
        None => 1024,
    };
    let out = args.next().unwrap_or_else(|| "atlas.png".to_string());

    let mut loader = Loader::new();
    let paths = loader.load_dir(&dir, &["png"])?;
    let mut atlas = AtlasBuilder::new(AtlasConfig::new().with_canvas_size(canvas_size))?;
    let mut ids = Vec::with_capacity(paths.len());
    for path in &paths {
        let image = loader.get(path)?.image()?;
        ids.push((path, atlas.register_image(image)?));
    }

    atlas
        .get_surface()?
        .save(&out)
        .with_context(|| format!("couldn't write {out}"))?;
    info!("wrote {} sprites to {}", ids.len(), out);

    for (path, id) in ids {
        let location = atlas.get_location(id)?;
        if let Some(tex) = location.texture {
            println!(
                "{:>4} {:<32} s {:.4}..{:.4} t {:.4}..{:.4}",
                id.0,
                path.display(),
                tex.s0,
                tex.s1,
                tex.t0,
                tex.t1
            );
        }
    }
    Ok(())
}
