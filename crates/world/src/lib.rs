#![warn(missing_docs)]
//! Mesh-to-voxel conversion: triangle rasterization, model transforms, voxel snapshots.

mod model;
mod raster;
mod session;
mod snapshot;
mod voxelize;

pub use model::Model;
pub use raster::{SurfaceCells, Triangle};
pub use session::{ModelSession, SessionState};
pub use snapshot::{BlockName, VoxelSnapshot};
pub use voxelize::{voxelize, VoxelizeOptions};
