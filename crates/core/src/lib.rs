#![warn(missing_docs)]
//! Core primitives shared across the workspace.

mod bounds;
mod color;
mod geometry;
mod voxel;

pub use bounds::Bounds;
pub use color::Argb;
pub use geometry::{
    interpolate_line, interpolate_steps, LineSamples, SamplePoint, MAX_LINE_STEPS,
};
pub use voxel::{Face, FaceMask, VoxelPos};

/// Default rasterization density: samples generated per unit of world-space length.
pub const DEFAULT_PRECISION: f32 = 2.0;
