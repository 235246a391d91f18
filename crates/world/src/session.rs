use std::path::Path;
use std::sync::Arc;

use glam::{Quat, Vec3};
use objvox_assets::{AssetError, BlockPalette, MeshData};
use tracing::info;

use crate::{voxelize, Model, VoxelSnapshot, VoxelizeOptions};

/// Where a session is in the load → voxelize cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No model loaded.
    Unloaded,
    /// Model loaded and centered; no up-to-date preview.
    Loaded,
    /// Preview matches the current transform.
    Voxelized,
}

/// Handle owning the model being edited, passed to whoever needs it.
///
/// Every transform change drops the cached preview, so a stale voxel set can
/// never be handed out.
pub struct ModelSession {
    palette: Arc<BlockPalette>,
    options: VoxelizeOptions,
    model: Option<Model>,
    preview: Option<VoxelSnapshot>,
}

impl ModelSession {
    /// Empty session converting with `palette` and `options`.
    pub fn new(palette: Arc<BlockPalette>, options: VoxelizeOptions) -> Self {
        Self {
            palette,
            options,
            model: None,
            preview: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        match (&self.model, &self.preview) {
            (None, _) => SessionState::Unloaded,
            (Some(_), None) => SessionState::Loaded,
            (Some(_), Some(_)) => SessionState::Voxelized,
        }
    }

    /// Load and center an OBJ file, replacing any previous model.
    ///
    /// On error the previous model is kept.
    pub fn load(&mut self, path: &Path) -> Result<(), AssetError> {
        let model = Model::load(path)?;
        info!(path = %path.display(), "session model loaded");
        self.replace(model);
        Ok(())
    }

    /// Use an already parsed mesh (centered on load).
    pub fn load_mesh(&mut self, mesh: MeshData) {
        let mut model = Model::new(mesh);
        model.center();
        self.replace(model);
    }

    /// Drop the model and its preview.
    pub fn unload(&mut self) {
        self.model = None;
        self.preview = None;
    }

    /// The loaded model, if any.
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Conversion options used for previews.
    pub fn options(&self) -> &VoxelizeOptions {
        &self.options
    }

    /// Change rasterization precision. Invalidates the preview.
    pub fn set_precision(&mut self, precision: f32) {
        self.options.precision = precision;
        self.preview = None;
    }

    /// Returns false when no model is loaded.
    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) -> bool {
        self.edit(|m| m.set_scale(x, y, z))
    }

    /// Returns false when no model is loaded.
    pub fn set_rotation(&mut self, rotation: Quat) -> bool {
        self.edit(|m| m.set_rotation(rotation))
    }

    /// Returns false when no model is loaded.
    pub fn set_rotation_degrees(&mut self, yaw: f32, pitch: f32) -> bool {
        self.edit(|m| m.set_rotation_degrees(yaw, pitch))
    }

    /// Returns false when no model is loaded.
    pub fn set_position(&mut self, position: Vec3) -> bool {
        self.edit(|m| m.set_position(position))
    }

    /// Voxel preview for the current transform, recomputed if stale.
    pub fn preview(&mut self) -> Option<&VoxelSnapshot> {
        let model = self.model.as_ref()?;
        if self.preview.is_none() {
            self.preview = Some(voxelize(model, &self.palette, &self.options));
        }
        self.preview.as_ref()
    }

    /// Owned copy of the current preview, for handing to another thread.
    pub fn snapshot(&mut self) -> Option<VoxelSnapshot> {
        self.preview().cloned()
    }

    fn replace(&mut self, model: Model) {
        self.model = Some(model);
        self.preview = None;
    }

    fn edit(&mut self, f: impl FnOnce(&mut Model)) -> bool {
        match self.model.as_mut() {
            Some(model) => {
                f(model);
                self.preview = None;
                true
            }
            None => false,
        }
    }
}
