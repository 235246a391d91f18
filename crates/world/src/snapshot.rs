use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use objvox_core::{Face, FaceMask, VoxelPos};
use serde::{Serialize, Serializer};

/// Shared block identifier as resolved by the palette.
pub type BlockName = Arc<str>;

/// Result of one conversion: occupied cells, their block, and exposed faces.
///
/// Snapshots are plain values. Hosts that render on another thread clone one
/// instead of sharing the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoxelSnapshot {
    blocks: BTreeMap<VoxelPos, BlockName>,
    exposure: BTreeMap<VoxelPos, FaceMask>,
}

impl VoxelSnapshot {
    /// Assemble a snapshot from final cell assignments, computing face exposure.
    pub(crate) fn from_blocks(blocks: BTreeMap<VoxelPos, BlockName>) -> Self {
        let exposure = blocks
            .keys()
            .map(|&pos| {
                let mask = Face::ALL
                    .into_iter()
                    .filter(|face| !blocks.contains_key(&pos.neighbor(*face)))
                    .fold(FaceMask::empty(), |mask, face| mask | face.mask());
                (pos, mask)
            })
            .collect();
        Self { blocks, exposure }
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when nothing was voxelized.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block at `pos`, if occupied.
    pub fn block_at(&self, pos: VoxelPos) -> Option<&str> {
        self.blocks.get(&pos).map(|b| b.as_ref())
    }

    /// Occupied cells in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelPos, &str)> {
        self.blocks.iter().map(|(pos, block)| (*pos, block.as_ref()))
    }

    /// Faces of `pos` not covered by an occupied neighbor. Empty for unoccupied cells.
    pub fn exposed_faces(&self, pos: VoxelPos) -> FaceMask {
        self.exposure.get(&pos).copied().unwrap_or_default()
    }

    /// Whether `face` of `pos` needs drawing.
    pub fn is_face_visible(&self, pos: VoxelPos, face: Face) -> bool {
        self.exposed_faces(pos).has(face)
    }

    /// Exposure mask of every occupied cell.
    pub fn exposure(&self) -> impl Iterator<Item = (VoxelPos, FaceMask)> + '_ {
        self.exposure.iter().map(|(pos, mask)| (*pos, *mask))
    }

    /// Total number of faces a renderer has to draw.
    pub fn visible_face_count(&self) -> usize {
        self.exposure
            .values()
            .map(|mask| mask.bits().count_ones() as usize)
            .sum()
    }

    /// Cells grouped by block. Built fresh on each call.
    pub fn blocks_by_material(&self) -> BTreeMap<BlockName, BTreeSet<VoxelPos>> {
        let mut grouped: BTreeMap<BlockName, BTreeSet<VoxelPos>> = BTreeMap::new();
        for (pos, block) in &self.blocks {
            grouped.entry(block.clone()).or_default().insert(*pos);
        }
        grouped
    }

    /// Number of cells per block.
    pub fn block_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for block in self.blocks.values() {
            *counts.entry(block.as_ref()).or_insert(0) += 1;
        }
        counts
    }

    /// Inclusive min/max occupied cells.
    pub fn cell_bounds(&self) -> Option<(VoxelPos, VoxelPos)> {
        let mut cells = self.blocks.keys();
        let first = *cells.next()?;
        Some(cells.fold((first, first), |(lo, hi), p| {
            (
                VoxelPos::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                VoxelPos::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        }))
    }

    /// Cells shifted to world coordinates for placement at `origin`.
    pub fn placements(&self, origin: VoxelPos) -> impl Iterator<Item = (VoxelPos, &str)> {
        self.iter().map(move |(pos, block)| (pos.offset(origin), block))
    }
}

#[derive(Serialize)]
struct SnapshotView<'a> {
    cells: Vec<CellView<'a>>,
    counts: BTreeMap<&'a str, usize>,
}

#[derive(Serialize)]
struct CellView<'a> {
    pos: [i32; 3],
    block: &'a str,
    faces: u8,
}

impl Serialize for VoxelSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SnapshotView {
            cells: self
                .iter()
                .map(|(pos, block)| CellView {
                    pos: [pos.x, pos.y, pos.z],
                    block,
                    faces: self.exposed_faces(pos).bits(),
                })
                .collect(),
            counts: self.block_counts(),
        }
        .serialize(serializer)
    }
}
