use std::{
    collections::HashMap,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use image::RgbaImage;
use log::debug;

#[derive(Clone)]
pub struct Asset {
    pub bytes: Vec<u8>,
}

impl Asset {
    pub fn image(&self) -> anyhow::Result<RgbaImage> {
        decode_image(&self.bytes)
    }
}

pub fn read_bytes<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<u8>> {
    let path = path.as_ref();
    let mut file =
        File::open(path).with_context(|| format!("couldn't open {}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .with_context(|| format!("couldn't read {}", path.display()))?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Decodes any format `image` understands into 8-bit RGBA.
pub fn decode_image(bytes: &[u8]) -> anyhow::Result<RgbaImage> {
    let img = image::load_from_memory(bytes).context("couldn't decode image")?;
    Ok(img.to_rgba8())
}

pub fn load_image<P: AsRef<Path>>(path: P) -> anyhow::Result<RgbaImage> {
    let path = path.as_ref();
    let bytes = read_bytes(path)?;
    decode_image(&bytes).with_context(|| format!("in {}", path.display()))
}

/// Caches file contents by path so repeated loads hit the disk once.
pub struct Loader {
    assets: HashMap<PathBuf, Asset>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            assets: HashMap::new(),
        }
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<&Asset> {
        let path = path.as_ref();
        self.assets
            .get(path)
            .ok_or(anyhow!("{} hasn't been loaded", path.display()))
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<&Asset> {
        let path = path.as_ref().to_path_buf();
        if !self.assets.contains_key(&path) {
            let bytes = read_bytes(&path)?;
            self.assets.insert(path.clone(), Asset { bytes });
        }
        self.get(&path)
    }

    /// Loads every regular file directly inside `dir` whose extension is in
    /// `extensions` (case-insensitive), sorted by path.
    pub fn load_dir<P: AsRef<Path>>(
        &mut self,
        dir: P,
        extensions: &[&str],
    ) -> anyhow::Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("couldn't list {}", dir.display()))?
        {
            let path = entry?.path();
            let wanted = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| {
                    extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
                });
            if wanted && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        for path in &paths {
            self.load(path)?;
        }
        Ok(paths)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
