//! On-disk fixtures for loader tests.

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Unique temporary directory, removed on drop.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create a fresh directory under the system temp dir.
    pub fn new(label: &str) -> Result<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = std::env::temp_dir().join(format!(
            "objvox-{label}-{}-{nanos}-{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create scratch dir {}", path.display()))?;
        Ok(Self { path })
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a text file and return its path.
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write fixture {}", path.display()))?;
        Ok(path)
    }

    /// Encode `image` as PNG and return its path.
    pub fn write_png(&self, name: &str, image: &RgbaImage) -> Result<PathBuf> {
        let path = self.path.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        image
            .save(&path)
            .with_context(|| format!("Failed to write texture {}", path.display()))?;
        Ok(path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Single-color texture.
pub fn solid_texture(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

/// Square of unit-size triangles in the XY plane, two materials, with UVs.
///
/// The first triangle uses `left`, the second `right`; both sit inside the
/// `[0, size]` square at z = 0.
pub fn two_material_square_obj(size: f32, left: &str, right: &str) -> String {
    format!(
        "v 0 0 0\nv {size} 0 0\nv {size} {size} 0\nv 0 {size} 0\n\
         vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
         usemtl {left}\nf 1/1 2/2 3/3\n\
         usemtl {right}\nf 1/1 3/3 4/4\n"
    )
}
