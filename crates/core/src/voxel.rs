use std::fmt;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Integer grid cell. This is the key type for every voxel map.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then y, then z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct VoxelPos {
    /// East (+) / west (-) coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// South (+) / north (-) coordinate.
    pub z: i32,
}

impl VoxelPos {
    /// Origin cell.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Cell at `(x, y, z)`.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Cell containing `pos`, truncating with `floor` (never rounding).
    pub fn from_floor(pos: Vec3) -> Self {
        let cell = pos.floor();
        Self::new(cell.x as i32, cell.y as i32, cell.z as i32)
    }

    /// Adjacent cell across `face`.
    pub fn neighbor(self, face: Face) -> Self {
        self.offset(face.offset())
    }

    /// Cell translated by an integer offset.
    pub fn offset(self, delta: VoxelPos) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.z + delta.z)
    }
}

impl From<IVec3> for VoxelPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<VoxelPos> for IVec3 {
    fn from(p: VoxelPos) -> Self {
        IVec3::new(p.x, p.y, p.z)
    }
}

impl fmt::Display for VoxelPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// The six axis-aligned faces of a voxel cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// Positive Y / top face.
    Up,
    /// Negative Y / bottom face.
    Down,
    /// Negative Z face.
    North,
    /// Positive Z face.
    South,
    /// Positive X face.
    East,
    /// Negative X face.
    West,
}

impl Face {
    /// All faces in mask-bit order.
    pub const ALL: [Face; 6] = [
        Face::Up,
        Face::Down,
        Face::North,
        Face::South,
        Face::East,
        Face::West,
    ];

    /// Unit offset pointing out of the face.
    pub const fn offset(self) -> VoxelPos {
        match self {
            Face::Up => VoxelPos::new(0, 1, 0),
            Face::Down => VoxelPos::new(0, -1, 0),
            Face::North => VoxelPos::new(0, 0, -1),
            Face::South => VoxelPos::new(0, 0, 1),
            Face::East => VoxelPos::new(1, 0, 0),
            Face::West => VoxelPos::new(-1, 0, 0),
        }
    }

    /// Mask bit for this face.
    pub const fn mask(self) -> FaceMask {
        match self {
            Face::Up => FaceMask::UP,
            Face::Down => FaceMask::DOWN,
            Face::North => FaceMask::NORTH,
            Face::South => FaceMask::SOUTH,
            Face::East => FaceMask::EAST,
            Face::West => FaceMask::WEST,
        }
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    /// Set of exposed (drawable) faces of a voxel cell.
    pub struct FaceMask: u8 {
        /// +Y face.
        const UP = 1 << 0;
        /// -Y face.
        const DOWN = 1 << 1;
        /// -Z face.
        const NORTH = 1 << 2;
        /// +Z face.
        const SOUTH = 1 << 3;
        /// +X face.
        const EAST = 1 << 4;
        /// -X face.
        const WEST = 1 << 5;
    }
}

impl FaceMask {
    /// Whether `face` is part of the mask.
    pub fn has(self, face: Face) -> bool {
        self.contains(face.mask())
    }

    /// Iterate the faces set in this mask, in [`Face::ALL`] order.
    pub fn faces(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |face| self.has(*face))
    }
}
