use std::path::Path;

use glam::{EulerRot, Mat4, Quat, Vec3};
use objvox_assets::{load_obj, AssetError, MeshData};
use objvox_core::{Bounds, VoxelPos};
use tracing::debug;

/// A loaded mesh plus the transform it should be voxelized and placed with.
///
/// Rotation and scale feed [`Model::transform_matrix`], which is applied before
/// rasterization. The position is only used at placement time.
#[derive(Debug, Clone)]
pub struct Model {
    mesh: MeshData,
    rotation: Quat,
    scale: Vec3,
    position: Vec3,
}

impl Model {
    /// Wrap a parsed mesh with an identity transform.
    pub fn new(mesh: MeshData) -> Self {
        Self {
            mesh,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            position: Vec3::ZERO,
        }
    }

    /// Load an OBJ file and center it on the origin.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let mut model = Self::new(load_obj(path)?);
        model.center();
        Ok(model)
    }

    /// Underlying mesh.
    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    /// Local (untransformed) mesh bounds.
    pub fn bounds(&self) -> Bounds {
        self.mesh.bounds()
    }

    /// Translate the mesh so its bounding box is centered on the origin.
    pub fn center(&mut self) {
        let center = self.mesh.recompute_bounds().center();
        self.mesh.translate(-center);
        self.mesh.recompute_bounds();
        debug!(?center, "centered model");
    }

    /// Current rotation (unit quaternion).
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Current per-axis scale, never negative.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// World position applied at placement time.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Set the rotation. The quaternion is normalized; degenerate input resets to identity.
    pub fn set_rotation(&mut self, rotation: Quat) {
        let len_sq = rotation.length_squared();
        self.rotation = if len_sq.is_finite() && len_sq > f32::EPSILON {
            rotation.normalize()
        } else {
            Quat::IDENTITY
        };
    }

    /// Set the rotation from yaw (around Y) and pitch (around X), in degrees.
    pub fn set_rotation_degrees(&mut self, yaw: f32, pitch: f32) {
        self.set_rotation(Quat::from_euler(
            EulerRot::YXZ,
            yaw.to_radians(),
            pitch.to_radians(),
            0.0,
        ));
    }

    /// Set the per-axis scale, clamped to be non-negative.
    ///
    /// The position is adjusted so the lowest point of the rotated, scaled model
    /// stays where it was: the model grows upward.
    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        let before = self.transformed_bounds();
        self.scale = Vec3::new(x, y, z).max(Vec3::ZERO);
        let after = self.transformed_bounds();
        if !before.is_empty() && !after.is_empty() {
            self.position.y += before.min.y - after.min.y;
        }
    }

    /// Same scale on every axis.
    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.set_scale(scale, scale, scale);
    }

    /// Move the model. Does not affect voxelization, only placement.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Rotation and scale, without translation.
    pub fn transform_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, Vec3::ZERO)
    }

    /// Bounds of the mesh after rotation and scale, around the local origin.
    pub fn transformed_bounds(&self) -> Bounds {
        self.bounds().transformed(&self.transform_matrix())
    }

    /// Bounds in world space (transformed and offset by the position).
    pub fn world_bounds(&self) -> Bounds {
        self.transformed_bounds().translated(self.position)
    }

    /// Grid cell the voxel origin maps to when placed.
    pub fn placement_origin(&self) -> VoxelPos {
        VoxelPos::from_floor(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objvox_assets::parse_obj;

    fn box_model(min: Vec3, max: Vec3) -> Model {
        let obj = format!(
            "v {} {} {}\nv {} {} {}\nv {} {} {}\nf 1 2 3\n",
            min.x, min.y, min.z, max.x, min.y, max.z, max.x, max.y, max.z
        );
        Model::new(parse_obj(&obj, None, None))
    }

    #[test]
    fn centering_moves_bounds_to_origin() {
        let mut model = box_model(Vec3::new(2.0, 4.0, -6.0), Vec3::new(6.0, 10.0, -2.0));
        model.center();
        assert!(model.bounds().center().length() < 1e-5);
        assert_eq!(model.bounds().size(), Vec3::new(4.0, 6.0, 4.0));
    }

    #[test]
    fn centering_is_idempotent() {
        let mut model = box_model(Vec3::new(1.5, 2.0, 3.0), Vec3::new(4.0, 7.0, 9.0));
        model.center();
        let once = model.mesh().positions.clone();
        model.center();
        for (a, b) in once.iter().zip(&model.mesh().positions) {
            assert!(a.distance(*b) < 1e-5);
        }
    }

    #[test]
    fn centering_empty_model_is_noop() {
        let mut model = Model::new(parse_obj("", None, None));
        model.center();
        assert!(model.bounds().is_empty());
    }

    #[test]
    fn negative_scale_clamps_to_zero() {
        let mut model = box_model(Vec3::splat(-1.0), Vec3::splat(1.0));
        model.set_scale(-1.0, -1.0, -1.0);
        assert_eq!(model.scale(), Vec3::ZERO);
        model.set_scale(f32::NAN, 2.0, -0.5);
        assert_eq!(model.scale(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn scaling_keeps_lowest_point_anchored() {
        let mut model = box_model(Vec3::splat(-1.0), Vec3::splat(1.0));
        model.set_position(Vec3::new(0.0, 64.0, 0.0));
        let floor = model.world_bounds().min.y;
        model.set_uniform_scale(5.0);
        assert!((model.world_bounds().min.y - floor).abs() < 1e-4);
        assert!(model.world_bounds().max.y > floor + 9.0);
    }

    #[test]
    fn scaling_after_rotation_keeps_anchor() {
        let mut model = box_model(Vec3::new(-2.0, -0.5, -0.5), Vec3::new(2.0, 0.5, 0.5));
        model.set_rotation_degrees(0.0, 90.0);
        let floor = model.world_bounds().min.y;
        model.set_scale(3.0, 1.0, 2.0);
        assert!((model.world_bounds().min.y - floor).abs() < 1e-4);
    }

    #[test]
    fn degenerate_rotation_resets_to_identity() {
        let mut model = box_model(Vec3::ZERO, Vec3::ONE);
        model.set_rotation(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert_eq!(model.rotation(), Quat::IDENTITY);
        model.set_rotation(Quat::from_xyzw(0.0, 0.0, 0.0, 2.0));
        assert_eq!(model.rotation(), Quat::IDENTITY);
    }

    #[test]
    fn yaw_rotates_around_vertical_axis() {
        let mut model = box_model(Vec3::ZERO, Vec3::ONE);
        model.set_rotation_degrees(90.0, 0.0);
        let rotated = model.transform_matrix().transform_point3(Vec3::X);
        assert!(rotated.distance(Vec3::new(0.0, 0.0, -1.0)) < 1e-5);
    }

    #[test]
    fn position_does_not_affect_transform_matrix() {
        let mut model = box_model(Vec3::ZERO, Vec3::ONE);
        model.set_position(Vec3::new(5.0, 6.0, 7.0));
        assert_eq!(model.transform_matrix(), Mat4::IDENTITY);
        assert_eq!(model.placement_origin(), VoxelPos::new(5, 6, 7));
    }
}
