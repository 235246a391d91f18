use glam::{Mat4, Vec2, Vec3};
use tracing::warn;

use crate::VoxelPos;

/// Upper bound on the steps of a single line walk.
///
/// At the default precision this is a segment of 2048 units, far beyond any
/// placeable model. Longer segments are sampled more coarsely.
pub const MAX_LINE_STEPS: usize = 4096;

/// A float-precision point on a mesh surface carrying its texture coordinate.
///
/// Sample points only exist while a triangle is being rasterized. Anything that
/// needs hashing or ordering goes through [`SamplePoint::cell`] instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// Position in model space.
    pub pos: Vec3,
    /// Texture coordinate (not clamped; sampling wraps).
    pub uv: Vec2,
}

impl SamplePoint {
    /// Create a point from a position and texture coordinate.
    pub const fn new(pos: Vec3, uv: Vec2) -> Self {
        Self { pos, uv }
    }

    /// Apply an affine transform to the position. The texture coordinate is carried through.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        Self {
            pos: matrix.transform_point3(self.pos),
            uv: self.uv,
        }
    }

    /// Grid cell containing this point (floor truncation on every axis).
    pub fn cell(&self) -> VoxelPos {
        VoxelPos::from_floor(self.pos)
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            // f64 so `other - self` cannot overflow for far-apart points.
            pos: self
                .pos
                .as_dvec3()
                .lerp(other.pos.as_dvec3(), f64::from(t))
                .as_vec3(),
            uv: self.uv.lerp(other.uv, t),
        }
    }
}

/// Number of steps needed to walk from `a` to `b` at `precision` samples per unit.
///
/// Always in `1..=MAX_LINE_STEPS`. The distance is measured in f64 so far-apart
/// finite points do not overflow; non-finite input collapses to a single step.
fn step_count(a: &SamplePoint, b: &SamplePoint, precision: f32) -> usize {
    let distance = a.pos.as_dvec3().distance(b.pos.as_dvec3());
    let steps = (distance * f64::from(precision)).ceil();
    if !steps.is_finite() || steps < 1.0 {
        1
    } else if steps > MAX_LINE_STEPS as f64 {
        warn!(
            distance,
            precision,
            max_steps = MAX_LINE_STEPS,
            "line too long, sampling coarsely"
        );
        MAX_LINE_STEPS
    } else {
        steps as usize
    }
}

/// Walk linearly from `start` to `end` (both inclusive).
///
/// The step count is `ceil(distance * precision)`, clamped to
/// `1..=MAX_LINE_STEPS`. A zero-length segment yields exactly one point.
pub fn interpolate_line(start: SamplePoint, end: SamplePoint, precision: f32) -> LineSamples {
    if start.pos == end.pos {
        return LineSamples::single(start);
    }
    interpolate_steps(start, end, step_count(&start, &end, precision))
}

/// Walk from `start` to `end` using an explicit step count (`steps + 1` points).
///
/// The count is clamped to `1..=MAX_LINE_STEPS`.
pub fn interpolate_steps(start: SamplePoint, end: SamplePoint, steps: usize) -> LineSamples {
    LineSamples {
        start,
        end,
        steps: steps.clamp(1, MAX_LINE_STEPS),
        next: 0,
        single: false,
    }
}

/// Lazy sequence of points along a segment, produced by [`interpolate_line`].
///
/// Cloning gives an independent iterator that restarts from the same position.
#[derive(Debug, Clone)]
pub struct LineSamples {
    start: SamplePoint,
    end: SamplePoint,
    steps: usize,
    next: usize,
    single: bool,
}

impl LineSamples {
    fn single(point: SamplePoint) -> Self {
        Self {
            start: point,
            end: point,
            steps: 1,
            next: 0,
            single: true,
        }
    }

    /// Number of steps between the endpoints.
    pub fn steps(&self) -> usize {
        if self.single {
            0
        } else {
            self.steps
        }
    }

    /// Point at index `i` (0 is the start, `steps()` is the end).
    pub fn point(&self, i: usize) -> SamplePoint {
        if i == 0 || self.single {
            self.start
        } else if i >= self.steps {
            self.end
        } else {
            self.start.lerp(&self.end, i as f32 / self.steps as f32)
        }
    }

    fn total(&self) -> usize {
        self.steps().saturating_add(1)
    }
}

impl Iterator for LineSamples {
    type Item = SamplePoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total() {
            return None;
        }
        let point = self.point(self.next);
        self.next += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LineSamples {}
