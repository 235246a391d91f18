mod config;
mod palette_scan;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use serde::Serialize;
use tracing::{info, warn};

use objvox_assets::{palette_from_file, BlockPalette, PaletteEntry};
use objvox_core::VoxelPos;
use objvox_world::{voxelize, Model, VoxelSnapshot, VoxelizeOptions};

use crate::config::{ConvertConfig, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(author, version, about = "Converts textured OBJ meshes into block voxel sets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Voxelize an OBJ model and write the block placements as JSON
    Convert {
        /// Input Wavefront OBJ file
        input: PathBuf,

        /// Block palette JSON; overrides `palette_path` from the config
        #[arg(long)]
        palette: Option<PathBuf>,

        /// Conversion settings (TOML)
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Output path (default: `<input stem>.voxels.json` next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Samples per unit length when rasterizing
        #[arg(long)]
        precision: Option<f32>,

        /// Per-axis scale
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
        scale: Option<Vec<f32>>,
    },
    /// Write a config file with the default conversion settings
    InitConfig {
        /// Where to write the config
        #[arg(default_value = DEFAULT_CONFIG_PATH)]
        path: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Build a palette JSON from a directory of block textures
    Palette {
        /// Directory containing block textures (PNG/JPEG)
        dir: PathBuf,

        /// Output palette path
        #[arg(short, long, default_value = "palette.json")]
        output: PathBuf,
    },
}

#[derive(Serialize)]
struct ConversionOutput<'a> {
    source: String,
    origin: VoxelPos,
    #[serde(flatten)]
    snapshot: &'a VoxelSnapshot,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting objvox v{}", env!("CARGO_PKG_VERSION"));

    match Cli::parse().command {
        Command::Convert {
            input,
            palette,
            config,
            output,
            precision,
            scale,
        } => {
            let mut cfg = ConvertConfig::load_from_path(&config);
            if let Some(precision) = precision {
                cfg.precision = precision;
            }
            if let Some([x, y, z]) = scale.as_deref().and_then(|s| <[f32; 3]>::try_from(s).ok()) {
                cfg.scale = [x, y, z];
            }
            if palette.is_some() {
                cfg.palette_path = palette;
            }
            let output = output.unwrap_or_else(|| default_output_path(&input));
            convert(&input, &cfg, &output)
        }
        Command::InitConfig { path, force } => init_config(&path, force),
        Command::Palette { dir, output } => {
            let entries = palette_scan::scan_textures(&dir)?;
            let json = PaletteEntry::list_to_json(&entries)?;
            fs::write(&output, json)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(
                blocks = entries.len(),
                "Wrote palette to {}",
                output.display()
            );
            Ok(())
        }
    }
}

fn convert(input: &Path, cfg: &ConvertConfig, output: &Path) -> Result<()> {
    let palette = match &cfg.palette_path {
        Some(path) => palette_from_file(path, cfg.palette_base)
            .with_context(|| format!("Failed to load palette {}", path.display()))?,
        None => {
            warn!("No palette configured; every visible cell becomes the default block");
            BlockPalette::empty()
        }
    };

    let mut model =
        Model::load(input).with_context(|| format!("Failed to load {}", input.display()))?;
    model.set_rotation_degrees(cfg.yaw_degrees, cfg.pitch_degrees);
    model.set_position(Vec3::from_array(cfg.position));
    // Scale last so the model grows upward from its placed position.
    let [sx, sy, sz] = cfg.scale;
    model.set_scale(sx, sy, sz);

    let options = VoxelizeOptions {
        precision: cfg.precision,
    };
    let snapshot = voxelize(&model, &palette, &options);

    let report = ConversionOutput {
        source: input.display().to_string(),
        origin: model.placement_origin(),
        snapshot: &snapshot,
    };
    let json = serde_json::to_string_pretty(&report)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, json).with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        blocks = snapshot.len(),
        visible_faces = snapshot.visible_face_count(),
        "Wrote {}",
        output.display()
    );
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to replace it)",
            path.display()
        );
    }
    ConvertConfig::default()
        .save_to_path(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote default config to {}", path.display());
    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    input.with_file_name(format!("{stem}.voxels.json"))
}
