//! Line-oriented Wavefront OBJ/MTL reader.
//!
//! Only the directives needed for voxelization are understood: `v`, `vt`, `f`,
//! `usemtl`, `mtllib` in OBJ files and `newmtl`, `Kd`, `map_Kd` in MTL files.
//! Everything else is skipped. A malformed line is logged and skipped; it never
//! aborts the load.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::{Vec2, Vec3};
use image::RgbaImage;
use objvox_core::{Argb, Bounds};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{load_texture, AssetError};

/// Material used for faces that precede any `usemtl`, or name an unknown material.
pub const DEFAULT_MATERIAL: &str = "default";
/// Flat color of materials with neither `Kd` nor a loadable `map_Kd`.
pub const DEFAULT_MATERIAL_COLOR: Argb = Argb::opaque(0x9A, 0x8C, 0xB0);

/// Reasons a single OBJ/MTL line is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ObjLineError {
    /// The directive is missing a required operand.
    #[error("missing {0}")]
    MissingField(&'static str),
    /// A numeric token could not be parsed (or is not finite).
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    /// OBJ indices are 1-based; 0 is never valid.
    #[error("index 0 is not valid")]
    ZeroIndex,
    /// The index points outside the list defined so far.
    #[error("index {index} out of range ({len} defined)")]
    IndexOutOfRange {
        /// Raw index from the file.
        index: i64,
        /// Number of elements defined at that point.
        len: usize,
    },
    /// Faces need at least three vertices.
    #[error("face has {0} vertices, need at least 3")]
    TooFewVertices(usize),
    /// A material directive appeared before any `newmtl`.
    #[error("{0} before newmtl")]
    NoActiveMaterial(&'static str),
}

/// One corner of a face, as 0-based indices into the shared vertex lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceVertex {
    /// Index into [`MeshData::positions`].
    pub position: usize,
    /// Index into [`MeshData::uvs`], when the face has texture coordinates.
    pub uv: Option<usize>,
}

/// Polygon face (3 or more corners).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolygonFace {
    /// Corners in file order.
    pub vertices: Vec<FaceVertex>,
}

impl PolygonFace {
    /// Fan triangulation: corner 0 with each consecutive pair.
    pub fn triangles(&self) -> impl Iterator<Item = [FaceVertex; 3]> + '_ {
        let first = self.vertices.first().copied();
        self.vertices
            .windows(2)
            .skip(1)
            .filter_map(move |pair| first.map(|a| [a, pair[0], pair[1]]))
    }
}

/// Faces sharing one material, with the material's texture or flat color.
#[derive(Debug, Clone)]
pub struct MaterialGroup {
    /// Material name from `newmtl`.
    pub name: String,
    /// Faces bound to this material by `usemtl`.
    pub faces: Vec<PolygonFace>,
    /// Decoded diffuse texture (`map_Kd`).
    pub texture: Option<Arc<RgbaImage>>,
    /// Diffuse color (`Kd`); used when no texture is bound.
    pub color: Argb,
}

impl MaterialGroup {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            faces: Vec::new(),
            texture: None,
            color: DEFAULT_MATERIAL_COLOR,
        }
    }
}

/// Raw mesh as read from disk: shared vertex lists plus per-material faces.
#[derive(Debug, Clone)]
pub struct MeshData {
    /// Vertex positions (`v`).
    pub positions: Vec<Vec3>,
    /// Texture coordinates (`vt`).
    pub uvs: Vec<Vec2>,
    /// Materials in registration order; the default material is always first.
    pub materials: Vec<MaterialGroup>,
    bounds: Bounds,
    skipped_lines: usize,
}

impl Default for MeshData {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            uvs: Vec::new(),
            materials: vec![MaterialGroup::new(DEFAULT_MATERIAL)],
            bounds: Bounds::EMPTY,
            skipped_lines: 0,
        }
    }
}

impl MeshData {
    /// Axis-aligned bounds of all positions.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Recompute [`MeshData::bounds`] from the position list.
    pub fn recompute_bounds(&mut self) -> Bounds {
        self.bounds = Bounds::from_points(self.positions.iter().copied());
        self.bounds
    }

    /// Shift every position by `delta`.
    pub fn translate(&mut self, delta: Vec3) {
        for p in &mut self.positions {
            *p += delta;
        }
        self.bounds = self.bounds.translated(delta);
    }

    /// Number of lines rejected while parsing.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Total face count across materials.
    pub fn face_count(&self) -> usize {
        self.materials.iter().map(|m| m.faces.len()).sum()
    }

    /// True when there is nothing to rasterize.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.face_count() == 0
    }

    /// Look up a material by name.
    pub fn material(&self, name: &str) -> Option<&MaterialGroup> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Bind a decoded texture to a material. Returns false for unknown names.
    pub fn set_texture(&mut self, name: &str, image: RgbaImage) -> bool {
        match self.materials.iter_mut().find(|m| m.name == name) {
            Some(material) => {
                material.texture = Some(Arc::new(image));
                true
            }
            None => false,
        }
    }
}

/// Parse OBJ text with an optional MTL body.
///
/// `base_dir` is used to resolve `map_Kd` paths; without it textures are skipped.
pub fn parse_obj(obj: &str, mtl: Option<&str>, base_dir: Option<&Path>) -> MeshData {
    let mut parser = ObjParser::new(base_dir);
    if let Some(mtl) = mtl {
        parser.run(mtl, "MTL", ObjParser::mtl_line);
    }
    parser.run(obj, "OBJ", ObjParser::obj_line);
    parser.finish()
}

/// Load an OBJ file and its MTL (via `mtllib`, or the same-stem `.mtl` next to it).
///
/// Fails only when the path is not an `.obj` file or cannot be read at all.
/// A missing MTL or texture falls back to default colors.
pub fn load_obj(path: &Path) -> Result<MeshData, AssetError> {
    let is_obj = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
    if !is_obj {
        return Err(AssetError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let obj = fs::read_to_string(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mtl_path = mtllib_name(&obj)
        .map(|name| dir.join(name))
        .unwrap_or_else(|| path.with_extension("mtl"));
    let mtl = match fs::read_to_string(&mtl_path) {
        Ok(text) => Some(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %mtl_path.display(), "no material library; using defaults");
            None
        }
        Err(err) => {
            warn!(path = %mtl_path.display(), %err, "failed to read material library; using defaults");
            None
        }
    };

    let mesh = parse_obj(&obj, mtl.as_deref(), Some(dir));
    info!(
        path = %path.display(),
        vertices = mesh.positions.len(),
        faces = mesh.face_count(),
        materials = mesh.materials.len(),
        skipped = mesh.skipped_lines(),
        "loaded OBJ model"
    );
    Ok(mesh)
}

fn mtllib_name(obj: &str) -> Option<&str> {
    obj.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("mtllib")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let name = rest.trim();
        (!name.is_empty()).then_some(name)
    })
}

struct ObjParser {
    mesh: MeshData,
    by_name: HashMap<String, usize>,
    base_dir: Option<PathBuf>,
    /// Material receiving `f` lines.
    active: usize,
    /// Material receiving `Kd`/`map_Kd` lines.
    defining: Option<usize>,
}

impl ObjParser {
    fn new(base_dir: Option<&Path>) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert(DEFAULT_MATERIAL.to_string(), 0);
        Self {
            mesh: MeshData::default(),
            by_name,
            base_dir: base_dir.map(Path::to_path_buf),
            active: 0,
            defining: None,
        }
    }

    fn run(
        &mut self,
        text: &str,
        kind: &'static str,
        handle: fn(&mut Self, &str, &[&str]) -> Result<(), ObjLineError>,
    ) {
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if let Err(err) = handle(self, line, &tokens) {
                warn!(kind, line = idx + 1, %err, text = line, "skipping malformed line");
                self.mesh.skipped_lines += 1;
            }
        }
    }

    fn finish(self) -> MeshData {
        self.mesh
    }

    fn obj_line(&mut self, line: &str, tokens: &[&str]) -> Result<(), ObjLineError> {
        match tokens[0] {
            "v" => {
                let pos = Vec3::new(
                    float(tokens.get(1), "x")?,
                    float(tokens.get(2), "y")?,
                    float(tokens.get(3), "z")?,
                );
                self.mesh.positions.push(pos);
                self.mesh.bounds.include(pos);
            }
            "vt" => {
                let u = float(tokens.get(1), "u")?;
                let v = match tokens.get(2) {
                    Some(_) => float(tokens.get(2), "v")?,
                    None => 0.0,
                };
                self.mesh.uvs.push(Vec2::new(u, v));
            }
            "usemtl" => {
                let name = operand(line, "material name")?;
                self.active = match self.by_name.get(name) {
                    Some(&idx) => idx,
                    None => {
                        debug!(material = name, "unknown material; using default");
                        0
                    }
                };
            }
            "f" => {
                let face = self.face(&tokens[1..])?;
                self.mesh.materials[self.active].faces.push(face);
            }
            _ => {}
        }
        Ok(())
    }

    fn face(&self, corners: &[&str]) -> Result<PolygonFace, ObjLineError> {
        if corners.len() < 3 {
            return Err(ObjLineError::TooFewVertices(corners.len()));
        }
        let vertices = corners
            .iter()
            .map(|corner| {
                let mut parts = corner.split('/');
                let position = match parts.next() {
                    Some(p) if !p.is_empty() => resolve_index(p, self.mesh.positions.len())?,
                    _ => return Err(ObjLineError::MissingField("vertex index")),
                };
                let uv = match parts.next() {
                    Some(t) if !t.is_empty() => Some(resolve_index(t, self.mesh.uvs.len())?),
                    _ => None,
                };
                Ok(FaceVertex { position, uv })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PolygonFace { vertices })
    }

    fn mtl_line(&mut self, line: &str, tokens: &[&str]) -> Result<(), ObjLineError> {
        match tokens[0] {
            "newmtl" => {
                let name = operand(line, "material name")?;
                let idx = match self.by_name.get(name) {
                    Some(&idx) => idx,
                    None => {
                        self.mesh.materials.push(MaterialGroup::new(name));
                        let idx = self.mesh.materials.len() - 1;
                        self.by_name.insert(name.to_string(), idx);
                        idx
                    }
                };
                self.defining = Some(idx);
            }
            "Kd" => {
                let idx = self.defining.ok_or(ObjLineError::NoActiveMaterial("Kd"))?;
                let color = Argb::from_unit_rgb(
                    float(tokens.get(1), "red")?,
                    float(tokens.get(2), "green")?,
                    float(tokens.get(3), "blue")?,
                );
                self.mesh.materials[idx].color = color;
            }
            "map_Kd" => {
                let idx = self
                    .defining
                    .ok_or(ObjLineError::NoActiveMaterial("map_Kd"))?;
                // Options such as `-s 1 1 1` may precede the file name.
                let file = tokens
                    .last()
                    .filter(|_| tokens.len() > 1)
                    .ok_or(ObjLineError::MissingField("texture path"))?;
                self.bind_texture(idx, file);
            }
            _ => {}
        }
        Ok(())
    }

    fn bind_texture(&mut self, idx: usize, file: &str) {
        let material = &self.mesh.materials[idx].name;
        let Some(dir) = self.base_dir.as_ref() else {
            debug!(material = %material, file, "no base directory; texture skipped");
            return;
        };
        let path = dir.join(file);
        match load_texture(&path) {
            Some(image) => {
                debug!(material = %material, path = %path.display(), "bound diffuse texture");
                self.mesh.materials[idx].texture = Some(Arc::new(image));
            }
            None => {
                warn!(material = %material, path = %path.display(), "diffuse texture unavailable; using flat color");
            }
        }
    }
}

/// Everything after the directive keyword, trimmed.
fn operand<'a>(line: &'a str, what: &'static str) -> Result<&'a str, ObjLineError> {
    let rest = line
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .unwrap_or("");
    if rest.is_empty() {
        Err(ObjLineError::MissingField(what))
    } else {
        Ok(rest)
    }
}

fn float(token: Option<&&str>, what: &'static str) -> Result<f32, ObjLineError> {
    let token = token.ok_or(ObjLineError::MissingField(what))?;
    match token.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ObjLineError::InvalidNumber(token.to_string())),
    }
}

/// Convert a 1-based (or negative, end-relative) OBJ index into a 0-based one.
fn resolve_index(token: &str, len: usize) -> Result<usize, ObjLineError> {
    let index: i64 = token
        .parse()
        .map_err(|_| ObjLineError::InvalidNumber(token.to_string()))?;
    let resolved = match index {
        0 => return Err(ObjLineError::ZeroIndex),
        i if i > 0 => i - 1,
        i => len as i64 + i,
    };
    if resolved < 0 || resolved >= len as i64 {
        return Err(ObjLineError::IndexOutOfRange { index, len });
    }
    Ok(resolved as usize)
}
