use std::collections::BTreeMap;

use glam::Mat4;
use objvox_core::{interpolate_line, interpolate_steps, SamplePoint, VoxelPos};

/// Grid cells touched by rasterized surfaces, each with the first sample that hit it.
///
/// Cells are keyed by integer position only. When several samples land in the same
/// cell, the first one inserted keeps its texture coordinate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceCells {
    cells: BTreeMap<VoxelPos, SamplePoint>,
}

impl SurfaceCells {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `point`'s cell. Returns false if the cell was already present.
    pub fn insert(&mut self, point: SamplePoint) -> bool {
        let mut inserted = false;
        self.cells.entry(point.cell()).or_insert_with(|| {
            inserted = true;
            point
        });
        inserted
    }

    /// Number of distinct cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when no cell was recorded.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `pos` was hit.
    pub fn contains(&self, pos: VoxelPos) -> bool {
        self.cells.contains_key(&pos)
    }

    /// Sample that first hit `pos`.
    pub fn get(&self, pos: VoxelPos) -> Option<&SamplePoint> {
        self.cells.get(&pos)
    }

    /// Cells in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelPos, &SamplePoint)> {
        self.cells.iter().map(|(pos, sample)| (*pos, sample))
    }

    /// Forget every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

/// Three surface points forming one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle(pub [SamplePoint; 3]);

impl Triangle {
    /// Triangle from three corners, in winding order.
    pub fn new(a: SamplePoint, b: SamplePoint, c: SamplePoint) -> Self {
        Self([a, b, c])
    }

    /// Triangle with every corner transformed by `matrix`.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        Self(self.0.map(|p| p.transform(matrix)))
    }

    /// Add every cell covered by this triangle to `cells`.
    ///
    /// Edges 0→1 and 0→2 are walked with a shared step count (the finer of the
    /// two), and a fill line is drawn between the i-th points of both. The edge
    /// 1→2 is walked last. Degenerate triangles collapse to the cells their edges
    /// pass through.
    pub fn rasterize<'a>(
        &self,
        precision: f32,
        cells: &'a mut SurfaceCells,
    ) -> &'a mut SurfaceCells {
        let [v0, v1, v2] = self.0;
        let steps = interpolate_line(v0, v1, precision)
            .steps()
            .max(interpolate_line(v0, v2, precision).steps());

        let left = interpolate_steps(v0, v1, steps);
        let right = interpolate_steps(v0, v2, steps);
        for (a, b) in left.zip(right) {
            for point in interpolate_line(a, b, precision) {
                cells.insert(point);
            }
        }
        for point in interpolate_line(v1, v2, precision) {
            cells.insert(point);
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use objvox_core::MAX_LINE_STEPS;

    fn p(x: f32, y: f32, z: f32) -> SamplePoint {
        SamplePoint::new(Vec3::new(x, y, z), Vec2::ZERO)
    }

    #[test]
    fn right_triangle_covers_its_edges() {
        let tri = Triangle::new(p(0.0, 0.0, 0.0), p(3.0, 0.0, 0.0), p(0.0, 3.0, 0.0));
        let mut cells = SurfaceCells::new();
        tri.rasterize(2.0, &mut cells);
        for (x, y) in [(0, 0), (1, 0), (2, 0), (0, 1), (0, 2)] {
            assert!(cells.contains(VoxelPos::new(x, y, 0)), "missing ({x}, {y}, 0)");
        }
        assert!(cells.contains(VoxelPos::new(1, 1, 0)));
        assert!(cells.iter().all(|(pos, _)| pos.z == 0 && pos.x + pos.y <= 3));
    }

    #[test]
    fn collinear_triangle_covers_its_line() {
        let tri = Triangle::new(p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(4.5, 0.0, 0.0));
        let mut cells = SurfaceCells::new();
        tri.rasterize(2.0, &mut cells);
        let xs: Vec<i32> = cells.iter().map(|(pos, _)| pos.x).collect();
        assert_eq!(xs, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn point_triangle_is_one_cell() {
        let tri = Triangle::new(p(1.5, 1.5, 1.5), p(1.5, 1.5, 1.5), p(1.5, 1.5, 1.5));
        let mut cells = SurfaceCells::new();
        tri.rasterize(2.0, &mut cells);
        assert_eq!(cells.len(), 1);
        assert!(cells.contains(VoxelPos::new(1, 1, 1)));
    }

    #[test]
    fn accumulates_across_triangles() {
        let mut cells = SurfaceCells::new();
        Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0))
            .rasterize(2.0, &mut cells);
        let first = cells.len();
        Triangle::new(p(5.0, 0.0, 0.0), p(6.0, 0.0, 0.0), p(5.0, 1.0, 0.0))
            .rasterize(2.0, &mut cells);
        assert!(cells.len() > first);
        assert!(cells.contains(VoxelPos::new(0, 0, 0)));
        assert!(cells.contains(VoxelPos::new(5, 0, 0)));
    }

    #[test]
    fn first_sample_keeps_its_uv() {
        let mut cells = SurfaceCells::new();
        let a = SamplePoint::new(Vec3::new(0.2, 0.2, 0.2), Vec2::new(0.1, 0.1));
        let b = SamplePoint::new(Vec3::new(0.8, 0.8, 0.8), Vec2::new(0.9, 0.9));
        assert!(cells.insert(a));
        assert!(!cells.insert(b));
        assert_eq!(cells.get(VoxelPos::ORIGIN).map(|s| s.uv), Some(a.uv));
    }

    #[test]
    fn same_input_same_cells() {
        let tri = Triangle::new(p(0.3, -1.2, 2.0), p(4.1, 2.2, -3.0), p(-2.0, 5.5, 1.0));
        let mut a = SurfaceCells::new();
        let mut b = SurfaceCells::new();
        tri.rasterize(2.0, &mut a);
        tri.rasterize(2.0, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn transform_scales_coverage() {
        let tri = Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0));
        let big = tri.transform(&Mat4::from_scale(Vec3::splat(4.0)));
        let mut cells = SurfaceCells::new();
        big.rasterize(2.0, &mut cells);
        assert!(cells.contains(VoxelPos::new(3, 0, 0)));
        assert!(cells.contains(VoxelPos::new(0, 3, 0)));
    }

    #[test]
    fn far_vertex_rasterizes_in_bounded_time() {
        let tri = Triangle::new(p(0.0, 0.0, 0.0), p(1e8, 0.0, 0.0), p(1e8, 1.0, 0.0));
        let mut cells = SurfaceCells::new();
        tri.rasterize(2.0, &mut cells);
        assert!(cells.contains(VoxelPos::new(0, 0, 0)));
        assert!(cells.contains(VoxelPos::from_floor(Vec3::new(1e8, 0.0, 0.0))));
        assert!(cells.contains(VoxelPos::from_floor(Vec3::new(1e8, 1.0, 0.0))));
        assert!(cells.len() <= 4 * (MAX_LINE_STEPS + 1));
    }
}
