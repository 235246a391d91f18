//! Property-based tests for rasterization and conversion.
//!
//! Critical invariants:
//! - Line walks start and end exactly on their endpoints
//! - Triangle rasterization is deterministic and covers the corners
//! - Scale is never negative

use glam::{Vec2, Vec3};
use objvox_assets::{parse_obj, BlockPalette};
use objvox_core::{interpolate_line, Argb, SamplePoint};
use objvox_world::{voxelize, Model, SurfaceCells, Triangle, VoxelizeOptions};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f32> {
    -20.0f32..20.0
}

fn point() -> impl Strategy<Value = SamplePoint> {
    (coord(), coord(), coord(), 0.0f32..1.0, 0.0f32..1.0)
        .prop_map(|(x, y, z, u, v)| SamplePoint::new(Vec3::new(x, y, z), Vec2::new(u, v)))
}

proptest! {
    /// Property: the first and last samples are exactly the endpoints.
    #[test]
    fn line_endpoints_are_exact(a in point(), b in point(), precision in 0.1f32..8.0) {
        let samples: Vec<_> = interpolate_line(a, b, precision).collect();
        prop_assert_eq!(samples.first().copied(), Some(a));
        if a.pos != b.pos {
            prop_assert_eq!(samples.last().copied(), Some(b));
        }
    }

    /// Property: rasterizing the same triangle twice gives the same cells,
    /// and every corner's cell is covered.
    #[test]
    fn rasterization_is_deterministic(a in point(), b in point(), c in point()) {
        let tri = Triangle::new(a, b, c);
        let mut first = SurfaceCells::new();
        let mut second = SurfaceCells::new();
        tri.rasterize(2.0, &mut first);
        tri.rasterize(2.0, &mut second);
        prop_assert_eq!(&first, &second);
        for corner in [a, b, c] {
            prop_assert!(first.contains(corner.cell()));
        }
    }

    /// Property: negative or NaN scale components clamp to zero.
    #[test]
    fn scale_is_never_negative(x in -10.0f32..10.0, y in -10.0f32..10.0, z in -10.0f32..10.0) {
        let mut model = Model::new(parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3", None, None));
        model.set_scale(x, y, z);
        let s = model.scale();
        prop_assert!(s.x >= 0.0 && s.y >= 0.0 && s.z >= 0.0);
    }

    /// Property: converting the same model twice yields identical snapshots.
    #[test]
    fn voxelize_is_deterministic(
        a in point(),
        b in point(),
        c in point(),
        yaw in -180.0f32..180.0,
        scale in 0.1f32..3.0,
    ) {
        let obj = format!(
            "v {} {} {}\nv {} {} {}\nv {} {} {}\nf 1 2 3\n",
            a.pos.x, a.pos.y, a.pos.z, b.pos.x, b.pos.y, b.pos.z, c.pos.x, c.pos.y, c.pos.z
        );
        let mut model = Model::new(parse_obj(&obj, None, None));
        model.set_rotation_degrees(yaw, 0.0);
        model.set_uniform_scale(scale);
        let palette = BlockPalette::build(&[("stone", Argb::opaque(120, 120, 120))], 8);
        let first = voxelize(&model, &palette, &VoxelizeOptions::default());
        let second = voxelize(&model, &palette, &VoxelizeOptions::default());
        prop_assert_eq!(first, second);
    }
}
