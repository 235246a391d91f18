#![warn(missing_docs)]
//! Mesh and palette asset loading: OBJ/MTL parsing, textures, block color palettes.

mod loader;
mod obj;
mod palette;
mod texture;

pub use loader::{palette_entries_from_str, palette_from_file, palette_from_str, PaletteEntry};
pub use obj::{
    load_obj, parse_obj, FaceVertex, MaterialGroup, MeshData, ObjLineError, PolygonFace,
    DEFAULT_MATERIAL, DEFAULT_MATERIAL_COLOR,
};
pub use palette::{BlockPalette, AIR_BLOCK, DEFAULT_BLOCK, DEFAULT_PALETTE_BASE};
pub use texture::{average_color, load_texture, sample_texture};

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to callers of the asset loaders.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Wrap IO errors when reading files.
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),
    /// The model file is not a Wavefront OBJ.
    #[error("unsupported model format: {}", path.display())]
    UnsupportedFormat {
        /// Offending path.
        path: PathBuf,
    },
    /// Wrap serde parsing issues in palette files.
    #[error("failed to parse palette: {0}")]
    PaletteParse(#[from] serde_json::Error),
    /// A palette entry carries a color that cannot be decoded.
    #[error("invalid color {value:?} for palette entry '{name}'")]
    InvalidColor {
        /// Entry name.
        name: String,
        /// Raw color text.
        value: String,
    },
}
