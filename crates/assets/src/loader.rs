use std::fs;
use std::path::Path;

use objvox_core::Argb;
use serde::{Deserialize, Serialize};

use crate::{AssetError, BlockPalette};

/// One block and its average color, in palette-file order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    /// Block identifier (e.g., "stone").
    pub name: String,
    /// Average color of the block texture.
    pub color: Argb,
}

impl PaletteEntry {
    /// Serialize a list of entries to the palette-file JSON format.
    pub fn list_to_json(entries: &[PaletteEntry]) -> Result<String, AssetError> {
        let defs: Vec<PaletteDefinition> = entries
            .iter()
            .map(|e| PaletteDefinition {
                name: e.name.clone(),
                color: ColorValue::Hex(format!(
                    "#{:02X}{:02X}{:02X}",
                    e.color.r(),
                    e.color.g(),
                    e.color.b()
                )),
            })
            .collect();
        Ok(serde_json::to_string_pretty(&defs)?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PaletteDefinition {
    name: String,
    color: ColorValue,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Hex(String),
    Rgb([u8; 3]),
}

impl ColorValue {
    fn decode(&self, name: &str) -> Result<Argb, AssetError> {
        match self {
            ColorValue::Rgb([r, g, b]) => Ok(Argb::opaque(*r, *g, *b)),
            ColorValue::Hex(text) => {
                let digits = text.trim().trim_start_matches('#');
                let invalid = || AssetError::InvalidColor {
                    name: name.to_string(),
                    value: text.clone(),
                };
                let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
                match digits.len() {
                    6 => Ok(Argb(0xFF00_0000 | value)),
                    8 => Ok(Argb(value)),
                    _ => Err(invalid()),
                }
            }
        }
    }
}

/// Parse palette entries from JSON, preserving file order.
pub fn palette_entries_from_str(input: &str) -> Result<Vec<PaletteEntry>, AssetError> {
    let defs: Vec<PaletteDefinition> = serde_json::from_str(input)?;
    defs.into_iter()
        .map(|def| {
            let color = def.color.decode(&def.name)?;
            Ok(PaletteEntry {
                name: def.name,
                color,
            })
        })
        .collect()
}

/// Build a palette from an in-memory JSON string.
pub fn palette_from_str(input: &str, base: u8) -> Result<BlockPalette, AssetError> {
    let entries = palette_entries_from_str(input)?;
    let pairs: Vec<(&str, Argb)> = entries.iter().map(|e| (e.name.as_str(), e.color)).collect();
    Ok(BlockPalette::build(&pairs, base))
}

/// Build a palette from the provided JSON file path.
pub fn palette_from_file(path: &Path, base: u8) -> Result<BlockPalette, AssetError> {
    let data = fs::read_to_string(path)?;
    palette_from_str(&data, base)
}
