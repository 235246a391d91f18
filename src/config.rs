use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use objvox_assets::DEFAULT_PALETTE_BASE;
use objvox_core::DEFAULT_PRECISION;

/// Default location of the conversion settings.
pub const DEFAULT_CONFIG_PATH: &str = "config/objvox.toml";

/// Settings supplied by the host for one conversion.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Samples per unit of length when rasterizing.
    pub precision: f32,
    /// Quantization step per color channel for the block palette.
    pub palette_base: u8,
    /// Per-axis scale applied before voxelization.
    pub scale: [f32; 3],
    /// Rotation around the vertical axis, in degrees.
    pub yaw_degrees: f32,
    /// Rotation around the X axis, in degrees.
    pub pitch_degrees: f32,
    /// World position the model is placed at.
    pub position: [f32; 3],
    /// Block palette JSON (name + average color per block).
    pub palette_path: Option<PathBuf>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            palette_base: DEFAULT_PALETTE_BASE,
            scale: [1.0, 1.0, 1.0],
            yaw_degrees: 0.0,
            pitch_degrees: 0.0,
            position: [0.0, 0.0, 0.0],
            palette_path: None,
        }
    }
}

impl ConvertConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ConvertConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    ConvertConfig::default()
                }
            },
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else if path != Path::new(DEFAULT_CONFIG_PATH) {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                ConvertConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objvox_testkit::ScratchDir;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = ScratchDir::new("cfg-missing").expect("dir");
        let cfg = ConvertConfig::load_from_path(&dir.path().join("absent.toml"));
        assert_eq!(cfg, ConvertConfig::default());
        assert_eq!(cfg.precision, 2.0);
        assert_eq!(cfg.palette_base, 8);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = ScratchDir::new("cfg-partial").expect("dir");
        let path = dir
            .write("objvox.toml", "precision = 4.0\nscale = [2.0, 3.0, 2.0]\n")
            .expect("write");
        let cfg = ConvertConfig::load_from_path(&path);
        assert_eq!(cfg.precision, 4.0);
        assert_eq!(cfg.scale, [2.0, 3.0, 2.0]);
        assert_eq!(cfg.palette_base, DEFAULT_PALETTE_BASE);
        assert!(cfg.palette_path.is_none());
    }

    #[test]
    fn malformed_file_uses_defaults() {
        let dir = ScratchDir::new("cfg-bad").expect("dir");
        let path = dir.write("objvox.toml", "precision = \"fast\"").expect("write");
        assert_eq!(ConvertConfig::load_from_path(&path), ConvertConfig::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = ScratchDir::new("cfg-save").expect("dir");
        let path = dir.path().join("nested/objvox.toml");
        let cfg = ConvertConfig {
            yaw_degrees: 90.0,
            palette_path: Some(PathBuf::from("palettes/wool.json")),
            ..ConvertConfig::default()
        };
        cfg.save_to_path(&path).expect("save");
        assert_eq!(ConvertConfig::load_from_path(&path), cfg);
    }
}
