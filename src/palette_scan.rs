use std::path::Path;

use anyhow::{bail, Result};
use tracing::warn;
use walkdir::WalkDir;

use objvox_assets::{average_color, load_texture, PaletteEntry};

/// Build palette entries from every PNG/JPEG under `dir`, named by file stem.
///
/// Files are visited in path order so the resulting palette is stable across
/// platforms. Textures that fail to decode or are fully transparent are skipped.
pub fn scan_textures(dir: &Path) -> Result<Vec<PaletteEntry>> {
    if !dir.is_dir() {
        bail!("Texture directory {} does not exist", dir.display());
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_texture(entry.path()) {
            continue;
        }
        let path = entry.path();
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let Some(image) = load_texture(path) else {
            continue;
        };
        let color = average_color(&image);
        if !color.is_opaque() {
            warn!("Skipping {}: no opaque pixels", path.display());
            continue;
        }
        entries.push(PaletteEntry { name, color });
    }

    if entries.is_empty() {
        bail!("No usable textures found in {}", dir.display());
    }
    Ok(entries)
}

fn is_texture(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref(),
        Some("png" | "jpg" | "jpeg")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use objvox_core::Argb;
    use objvox_testkit::{solid_texture, ScratchDir};

    #[test]
    fn entries_follow_path_order_and_skip_transparent() {
        let dir = ScratchDir::new("palette-scan").expect("dir");
        dir.write_png("stone.png", &solid_texture(4, 4, [128, 128, 128, 255]))
            .expect("png");
        dir.write_png("blocks/dirt.png", &solid_texture(2, 2, [120, 80, 40, 255]))
            .expect("png");
        dir.write_png("glass.png", &solid_texture(2, 2, [0, 0, 0, 0]))
            .expect("png");
        dir.write("notes.txt", "not a texture").expect("txt");

        let entries = scan_textures(dir.path()).expect("scan");
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["dirt", "stone"]);
        assert_eq!(entries[1].color, Argb::opaque(128, 128, 128));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = ScratchDir::new("palette-empty").expect("dir");
        assert!(scan_textures(dir.path()).is_err());
        assert!(scan_textures(&dir.path().join("missing")).is_err());
    }
}
