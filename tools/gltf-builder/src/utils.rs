//! Utility functions for glTF construction

use glam::{Mat4, Vec3};
use gltf_json as json;

/// Per-axis (min, max) over `positions`; empty input yields zeros
pub fn compute_bounds(positions: &[[f32; 3]]) -> (Vec<f32>, Vec<f32>) {
    let Some(first) = positions.first() else {
        return (vec![0.0; 3], vec![0.0; 3]);
    };
    let (lo, hi) = positions.iter().fold(
        (Vec3::from_array(*first), Vec3::from_array(*first)),
        |(lo, hi), p| {
            let p = Vec3::from_array(*p);
            (lo.min(p), hi.max(p))
        },
    );
    (lo.to_array().to_vec(), hi.to_array().to_vec())
}

/// Split a world matrix into (translation, rotation xyzw, scale)
pub fn decompose_trs(matrix: Mat4) -> ([f32; 3], [f32; 4], [f32; 3]) {
    let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
    (
        translation.to_array(),
        rotation.normalize().to_array(),
        scale.to_array(),
    )
}

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

/// Append one chunk, padded to a 4-byte boundary with `fill`
fn push_chunk(glb: &mut Vec<u8>, kind: u32, data: &[u8], fill: u8) {
    let padded = data.len().next_multiple_of(4);
    glb.extend_from_slice(&(padded as u32).to_le_bytes());
    glb.extend_from_slice(&kind.to_le_bytes());
    glb.extend_from_slice(data);
    glb.resize(glb.len() + padded - data.len(), fill);
}

/// Single-file GLB container: header, JSON chunk, BIN chunk
///
/// The BIN chunk is omitted when `blob` is empty.
pub fn assemble_glb(root: &json::Root, blob: &[u8]) -> Result<Vec<u8>, serde_json::Error> {
    let text = json::serialize::to_vec(root)?;

    let mut glb = Vec::with_capacity(12 + 16 + text.len() + blob.len() + 6);
    glb.extend_from_slice(GLB_MAGIC);
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    // total length, patched below
    glb.extend_from_slice(&0u32.to_le_bytes());

    push_chunk(&mut glb, CHUNK_JSON, &text, b' ');
    if !blob.is_empty() {
        push_chunk(&mut glb, CHUNK_BIN, blob, 0);
    }

    let total = glb.len() as u32;
    glb[8..12].copy_from_slice(&total.to_le_bytes());
    Ok(glb)
}
