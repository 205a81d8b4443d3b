//! Character model assets: decoding and the asynchronous load queue.
//!
//! Each character variant names its model file and its [`ModelFormat`] in the
//! profile table. Decoding dispatches on that format, never on the URL suffix.
//! Loads are requested with a [`LoadToken`] and settle only when the owner
//! drains the loader, so nothing here ever touches the session or the scene.

pub mod glb;
mod loader;
mod source;
pub mod stl;

pub use loader::{
    AssetLoader, DEFAULT_LOAD_BUDGET, ImmediateLoader, LoadCompletion, LoadRequest, LoadToken,
    ThreadedLoader,
};
pub use source::{DirModelSource, ModelSource};

use glam::Vec3;
use joyrun_common::ModelFormat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content-addressed id of decoded model data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// One decoded mesh. STL meshes are non-indexed triangle soups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    /// Index into [`ModelData::materials`].
    pub material: Option<usize>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.positions.len() / 3
        } else {
            self.indices.len() / 3
        }
    }

    /// Axis-aligned bounds, `None` for a mesh without positions.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialData {
    pub name: String,
    pub base_color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: "default".into(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metalness: 0.0,
            roughness: 1.0,
        }
    }
}

/// A decoded character model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelData {
    pub name: String,
    pub format: ModelFormat,
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
}

impl ModelData {
    /// Decode raw bytes according to `format`.
    pub fn decode(bytes: &[u8], format: ModelFormat, name: &str) -> Result<Self, AssetError> {
        match format {
            ModelFormat::Mesh => Ok(Self {
                name: name.to_string(),
                format,
                meshes: vec![stl::decode(bytes, name)?],
                materials: Vec::new(),
            }),
            ModelFormat::Scene => {
                let decoded = glb::decode(bytes)?;
                Ok(Self {
                    name: name.to_string(),
                    format,
                    meshes: decoded.meshes,
                    materials: decoded.materials,
                })
            }
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }

    /// Bounds over every mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.meshes
            .iter()
            .filter_map(MeshData::bounds)
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }

    /// Hash of the decoded geometry and material colors.
    pub fn content_id(&self) -> AssetId {
        let mut hasher = Sha256::new();
        for mesh in &self.meshes {
            hasher.update(mesh.name.as_bytes());
            for p in &mesh.positions {
                for c in p.to_array() {
                    hasher.update(c.to_le_bytes());
                }
            }
            for i in &mesh.indices {
                hasher.update(i.to_le_bytes());
            }
        }
        for material in &self.materials {
            for c in material.base_color {
                hasher.update(c.to_le_bytes());
            }
        }
        let digest = hasher.finalize();
        let mut first = [0u8; 8];
        first.copy_from_slice(&digest[..8]);
        AssetId(u64::from_le_bytes(first))
    }
}

/// Errors from model fetching and decoding.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported model content: {0}")]
    Unsupported(String),
    #[error("STL parse error: {0}")]
    Stl(String),
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("model load panicked: {0}")]
    LoadPanicked(String),
    #[error("asset loader worker is gone")]
    LoaderDisconnected,
}

/// Crate version string.
pub fn crate_info() -> &'static str {
    concat!("joyrun-assets v", env!("CARGO_PKG_VERSION"))
}
