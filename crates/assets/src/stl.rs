//! STL decoding (binary and ASCII).
//!
//! The result is a non-indexed triangle soup centered on its bounding box with
//! one flat normal per face, repeated for each of its three vertices.

use glam::Vec3;

use crate::{AssetError, MeshData};

const HEADER_LEN: usize = 80;
const TRIANGLE_LEN: usize = 50;

/// Decode STL bytes into a single centered mesh.
pub fn decode(bytes: &[u8], name: &str) -> Result<MeshData, AssetError> {
    let mut positions = if is_binary(bytes) {
        decode_binary(bytes)?
    } else if looks_ascii(bytes) {
        decode_ascii(bytes)?
    } else {
        return Err(AssetError::Stl("neither a binary nor an ASCII STL".into()));
    };

    if positions.is_empty() {
        return Err(AssetError::Stl("no triangles".into()));
    }

    center(&mut positions);
    let normals = flat_normals(&positions);
    Ok(MeshData {
        name: name.to_string(),
        positions,
        normals,
        indices: Vec::new(),
        material: None,
    })
}

/// A binary STL's size is fully determined by its triangle count. ASCII files
/// start with `solid` too, so the size check is what tells them apart.
fn is_binary(bytes: &[u8]) -> bool {
    if bytes.len() < HEADER_LEN + 4 {
        return false;
    }
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    count
        .checked_mul(TRIANGLE_LEN)
        .and_then(|body| body.checked_add(HEADER_LEN + 4))
        == Some(bytes.len())
}

fn looks_ascii(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_LEN)];
    std::str::from_utf8(head).is_ok_and(|s| s.trim_start().starts_with("solid"))
}

fn decode_binary(bytes: &[u8]) -> Result<Vec<Vec3>, AssetError> {
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    let mut positions = Vec::with_capacity(count * 3);
    for tri in bytes[HEADER_LEN + 4..].chunks_exact(TRIANGLE_LEN) {
        // Skip the stored facet normal; normals are recomputed.
        for v in 0..3 {
            let base = 12 + v * 12;
            positions.push(Vec3::new(
                read_f32(tri, base),
                read_f32(tri, base + 4),
                read_f32(tri, base + 8),
            ));
        }
    }
    Ok(positions)
}

fn read_f32(bytes: &[u8], at: usize) -> f32 {
    f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn decode_ascii(bytes: &[u8]) -> Result<Vec<Vec3>, AssetError> {
    let text = std::str::from_utf8(bytes).map_err(|e| AssetError::Stl(e.to_string()))?;
    let mut positions = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let mut words = line.split_whitespace();
        if words.next() != Some("vertex") {
            continue;
        }
        let mut coord = [0.0f32; 3];
        for c in &mut coord {
            let word = words
                .next()
                .ok_or_else(|| AssetError::Stl(format!("line {}: short vertex", line_no + 1)))?;
            *c = word
                .parse()
                .map_err(|_| AssetError::Stl(format!("line {}: bad number {word:?}", line_no + 1)))?;
        }
        positions.push(Vec3::from_array(coord));
    }
    if positions.len() % 3 != 0 {
        return Err(AssetError::Stl(format!(
            "{} vertices do not form whole triangles",
            positions.len()
        )));
    }
    Ok(positions)
}

fn center(positions: &mut [Vec3]) {
    let (min, max) = positions
        .iter()
        .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), p| {
            (lo.min(*p), hi.max(*p))
        });
    let mid = (min + max) * 0.5;
    for p in positions.iter_mut() {
        *p -= mid;
    }
}

fn flat_normals(positions: &[Vec3]) -> Vec<Vec3> {
    positions
        .chunks_exact(3)
        .flat_map(|tri| {
            let n = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
            [n, n, n]
        })
        .collect()
}
