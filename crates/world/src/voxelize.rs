use std::collections::BTreeMap;

use glam::Vec2;
use objvox_assets::{sample_texture, BlockPalette, FaceVertex, MaterialGroup, MeshData};
use objvox_core::{Argb, SamplePoint, VoxelPos, DEFAULT_PRECISION};
use tracing::{debug, info, warn};

use crate::{BlockName, Model, SurfaceCells, Triangle, VoxelSnapshot};

/// Tunables for one conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelizeOptions {
    /// Samples per unit of world-space length when walking edges and fill lines.
    pub precision: f32,
}

impl Default for VoxelizeOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl VoxelizeOptions {
    fn effective_precision(&self) -> f32 {
        if self.precision.is_finite() && self.precision > 0.0 {
            self.precision
        } else {
            warn!(
                precision = self.precision,
                fallback = DEFAULT_PRECISION,
                "invalid rasterization precision"
            );
            DEFAULT_PRECISION
        }
    }
}

/// Convert `model` into a voxel snapshot using its current rotation and scale.
///
/// Materials are processed in registration order and faces in file order. When
/// two materials claim the same cell, the later one wins. Cells whose color
/// resolves to air are left out.
pub fn voxelize(
    model: &Model,
    palette: &BlockPalette,
    options: &VoxelizeOptions,
) -> VoxelSnapshot {
    let precision = options.effective_precision();
    let matrix = model.transform_matrix();
    let mesh = model.mesh();

    let mut blocks: BTreeMap<VoxelPos, BlockName> = BTreeMap::new();
    let mut cells = SurfaceCells::new();
    let mut air = 0usize;

    for material in &mesh.materials {
        if material.faces.is_empty() {
            continue;
        }
        cells.clear();
        for face in &material.faces {
            for corners in face.triangles() {
                match triangle(mesh, corners) {
                    Some(tri) => {
                        tri.transform(&matrix).rasterize(precision, &mut cells);
                    }
                    None => debug!(material = %material.name, "triangle references missing vertex"),
                }
            }
        }

        for (pos, sample) in cells.iter() {
            let block = palette.resolve_shared(surface_color(material, sample));
            if BlockPalette::is_air(block) {
                air += 1;
                continue;
            }
            blocks.insert(pos, block.clone());
        }
        debug!(material = %material.name, cells = cells.len(), "rasterized material");
    }

    let snapshot = VoxelSnapshot::from_blocks(blocks);
    info!(
        cells = snapshot.len(),
        air_cells = air,
        visible_faces = snapshot.visible_face_count(),
        "voxelized model"
    );
    snapshot
}

fn triangle(mesh: &MeshData, corners: [FaceVertex; 3]) -> Option<Triangle> {
    let point = |corner: FaceVertex| -> Option<SamplePoint> {
        let pos = *mesh.positions.get(corner.position)?;
        let uv = corner
            .uv
            .and_then(|i| mesh.uvs.get(i))
            .copied()
            .unwrap_or(Vec2::ZERO);
        Some(SamplePoint::new(pos, uv))
    };
    Some(Triangle::new(
        point(corners[0])?,
        point(corners[1])?,
        point(corners[2])?,
    ))
}

fn surface_color(material: &MaterialGroup, sample: &SamplePoint) -> Argb {
    match &material.texture {
        Some(texture) => sample_texture(texture, sample.uv),
        None => material.color,
    }
}
