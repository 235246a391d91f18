use std::sync::Arc;

use objvox_core::Argb;
use tracing::{info, warn};

/// Block name returned for transparent samples.
pub const AIR_BLOCK: &str = "air";
/// Block name returned when the palette has no materials.
pub const DEFAULT_BLOCK: &str = "stone";
/// Default quantization step per color channel.
pub const DEFAULT_PALETTE_BASE: u8 = 8;

/// Precomputed nearest-block lookup over quantized RGB buckets.
///
/// Every bucket is filled at build time, so [`BlockPalette::resolve`] never misses.
/// The palette is immutable once built.
#[derive(Debug, Clone)]
pub struct BlockPalette {
    base: u32,
    buckets: usize,
    names: Vec<Arc<str>>,
    table: Vec<u16>,
    air: Arc<str>,
    fallback: Arc<str>,
}

impl BlockPalette {
    /// Build the lookup from an ordered list of `(block name, average color)` pairs.
    ///
    /// Ties in distance keep the entry that appears first in `materials`.
    /// A `base` of 0 is treated as 1.
    pub fn build<S: AsRef<str>>(materials: &[(S, Argb)], base: u8) -> Self {
        let base = u32::from(base.max(1));
        let max_value = 255 - 255 % base;
        let buckets = (max_value / base) as usize + 1;

        let mut entries = materials;
        if entries.len() > usize::from(u16::MAX) {
            warn!(
                count = entries.len(),
                "palette has more materials than can be indexed; extra entries ignored"
            );
            entries = &entries[..usize::from(u16::MAX)];
        }
        let names: Vec<Arc<str>> = entries.iter().map(|(n, _)| Arc::from(n.as_ref())).collect();
        let colors: Vec<Argb> = entries.iter().map(|(_, c)| *c).collect();

        let mut table = Vec::new();
        if !colors.is_empty() {
            table.reserve(buckets * buckets * buckets);
            for r in 0..buckets {
                for g in 0..buckets {
                    for b in 0..buckets {
                        let probe = Argb::opaque(
                            (r as u32 * base) as u8,
                            (g as u32 * base) as u8,
                            (b as u32 * base) as u8,
                        );
                        table.push(nearest(&colors, probe));
                    }
                }
            }
        }

        info!(
            materials = names.len(),
            base,
            buckets = table.len(),
            "built block palette"
        );

        Self {
            base,
            buckets,
            names,
            table,
            air: Arc::from(AIR_BLOCK),
            fallback: Arc::from(DEFAULT_BLOCK),
        }
    }

    /// Palette with no materials; every opaque color resolves to [`DEFAULT_BLOCK`].
    pub fn empty() -> Self {
        Self::build::<&str>(&[], DEFAULT_PALETTE_BASE)
    }

    /// Quantization step per channel.
    pub fn base(&self) -> u8 {
        self.base as u8
    }

    /// Registered block names, in registration order.
    pub fn materials(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.as_ref())
    }

    /// Number of registered materials.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no materials were registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Block name for `color`. Non-opaque colors resolve to [`AIR_BLOCK`].
    pub fn resolve(&self, color: Argb) -> &str {
        self.resolve_shared(color)
    }

    /// Like [`BlockPalette::resolve`] but returns the shared name handle.
    pub fn resolve_shared(&self, color: Argb) -> &Arc<str> {
        if !color.is_opaque() {
            return &self.air;
        }
        if self.table.is_empty() {
            return &self.fallback;
        }
        let idx = (self.quantize(color.r()) * self.buckets + self.quantize(color.g()))
            * self.buckets
            + self.quantize(color.b());
        &self.names[usize::from(self.table[idx])]
    }

    /// True when `name` is the air sentinel.
    pub fn is_air(name: &str) -> bool {
        name == AIR_BLOCK
    }

    /// Bucket index for a channel value: round to the nearest multiple of `base`,
    /// clamped to the highest representable bucket.
    fn quantize(&self, value: u8) -> usize {
        let idx = (u32::from(value) + self.base / 2) / self.base;
        (idx as usize).min(self.buckets - 1)
    }
}

fn nearest(colors: &[Argb], probe: Argb) -> u16 {
    let mut best = 0usize;
    let mut best_dist = u32::MAX;
    for (i, color) in colors.iter().enumerate() {
        let dist = color.distance_sq(probe);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_white() -> BlockPalette {
        BlockPalette::build(
            &[
                ("red", Argb::new(255, 255, 0, 0)),
                ("white", Argb::new(255, 255, 255, 255)),
            ],
            8,
        )
    }

    #[test]
    fn resolves_to_closest_material() {
        let palette = red_white();
        assert_eq!(palette.resolve(Argb::opaque(10, 0, 0)), "red");
        assert_eq!(palette.resolve(Argb::opaque(250, 240, 245)), "white");
    }

    #[test]
    fn argb_tuples_resolve_by_rgb_distance() {
        let palette = BlockPalette::build(
            &[
                ("red", Argb::new(255, 0, 0, 0)),
                ("white", Argb::new(255, 255, 255, 255)),
            ],
            8,
        );
        assert_eq!(palette.resolve(Argb::new(255, 10, 0, 0)), "red");
    }

    #[test]
    fn transparent_colors_are_air() {
        let palette = red_white();
        assert_eq!(palette.resolve(Argb::new(254, 255, 0, 0)), AIR_BLOCK);
        assert_eq!(palette.resolve(Argb::TRANSPARENT), AIR_BLOCK);
    }

    #[test]
    fn empty_palette_uses_default_block() {
        let palette = BlockPalette::empty();
        assert!(palette.is_empty());
        assert_eq!(palette.resolve(Argb::opaque(1, 2, 3)), DEFAULT_BLOCK);
        assert_eq!(palette.resolve(Argb::new(0, 1, 2, 3)), AIR_BLOCK);
    }

    #[test]
    fn ties_keep_first_registered_material() {
        let palette = BlockPalette::build(
            &[
                ("first", Argb::opaque(100, 100, 100)),
                ("second", Argb::opaque(100, 100, 100)),
            ],
            8,
        );
        assert_eq!(palette.resolve(Argb::opaque(0, 0, 0)), "first");

        let swapped = BlockPalette::build(
            &[
                ("second", Argb::opaque(100, 100, 100)),
                ("first", Argb::opaque(100, 100, 100)),
            ],
            8,
        );
        assert_eq!(swapped.resolve(Argb::opaque(0, 0, 0)), "second");
    }

    #[test]
    fn quantize_rounds_and_clamps() {
        let palette = red_white();
        assert_eq!(palette.quantize(0), 0);
        assert_eq!(palette.quantize(3), 0);
        assert_eq!(palette.quantize(4), 1);
        assert_eq!(palette.quantize(10), 1);
        assert_eq!(palette.quantize(248), 31);
        assert_eq!(palette.quantize(255), 31);
    }

    #[test]
    fn table_covers_every_bucket() {
        let palette = red_white();
        assert_eq!(palette.table.len(), 32 * 32 * 32);
    }

    #[test]
    fn zero_base_is_treated_as_one() {
        let palette = BlockPalette::build(&[("only", Argb::opaque(0, 0, 0))], 0);
        assert_eq!(palette.base(), 1);
        assert_eq!(palette.resolve(Argb::opaque(255, 255, 255)), "only");
    }
}
