//! glTF 2.0 decoding for the binary GLB container and plain `.gltf` JSON.
//!
//! Only what the rig needs is read: each primitive's POSITION and index data
//! plus every material's base color. Buffers other than the GLB's embedded
//! BIN chunk are not resolved, so plain `.gltf` files whose buffers live in
//! external files decode to meshes without geometry.

use glam::Vec3;
use gltf::Gltf;
use gltf::buffer::Source;
use tracing::debug;

use crate::{AssetError, MaterialData, MeshData};

/// Decoded glTF content.
#[derive(Debug)]
pub struct Decoded {
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
}

/// Decode either a GLB container or `.gltf` JSON text.
pub fn decode(bytes: &[u8]) -> Result<Decoded, AssetError> {
    let Gltf { document, blob } = Gltf::from_slice(bytes)?;

    let materials = document
        .materials()
        .enumerate()
        .map(|(i, m)| {
            let pbr = m.pbr_metallic_roughness();
            MaterialData {
                name: m
                    .name()
                    .map_or_else(|| format!("material_{i}"), str::to_string),
                base_color: pbr.base_color_factor(),
                metalness: pbr.metallic_factor(),
                roughness: pbr.roughness_factor(),
            }
        })
        .collect();

    let mut meshes = Vec::new();
    for mesh in document.meshes() {
        let base = mesh
            .name()
            .map_or_else(|| format!("mesh_{}", mesh.index()), str::to_string);
        let count = mesh.primitives().len();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                return Err(AssetError::Unsupported(format!(
                    "mesh {base} uses {:?} primitives",
                    primitive.mode()
                )));
            }
            let reader = primitive.reader(|buffer| match buffer.source() {
                Source::Bin => blob.as_deref(),
                Source::Uri(uri) => {
                    debug!(uri, "Skipping external glTF buffer");
                    None
                }
            });
            let positions: Vec<Vec3> = reader
                .read_positions()
                .map(|iter| iter.map(Vec3::from_array).collect())
                .unwrap_or_default();
            let indices: Vec<u32> = reader
                .read_indices()
                .map(|iter| iter.into_u32().collect())
                .unwrap_or_default();

            meshes.push(MeshData {
                name: if count == 1 {
                    base.clone()
                } else {
                    format!("{base}_{}", primitive.index())
                },
                positions,
                normals: Vec::new(),
                indices,
                material: primitive.material().index(),
            });
        }
    }

    Ok(Decoded { meshes, materials })
}
