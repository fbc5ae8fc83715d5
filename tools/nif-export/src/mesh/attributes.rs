//! Raw geometry streams -> padded interleaved vertex and index buffers

use glam::Vec3;
use gltf_builder::InterleavedVertex;

use super::padding::{align_up, fit_to_count, pad_repeat_last, Fit};
use super::types::{
    AttributeOptions, MeshBuffers, NormalFixup, Stream, DEFAULT_COLOR, DEFAULT_NORMAL,
    DEFAULT_TANGENT, DEFAULT_TEX_COORD, NORMAL_UNIT_TOLERANCE,
};
use crate::error::MeshError;
use crate::scene::GeometryData;

/// Builds [`MeshBuffers`] from one geometry payload
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeBufferBuilder {
    options: AttributeOptions,
}

impl AttributeBufferBuilder {
    pub fn new(options: AttributeOptions) -> Self {
        Self { options }
    }

    /// Pad every stream to the aligned vertex count and interleave them
    ///
    /// Fails when there are no positions at all or a triangle references a
    /// vertex past the padded count; missing or mismatched secondary streams
    /// are warned about and defaulted.
    pub fn build(&self, name: &str, data: &GeometryData) -> Result<MeshBuffers, MeshError> {
        if data.vertices.is_empty() {
            return Err(MeshError::NoVertices);
        }
        let alignment = self.options.alignment;

        let mut positions = data.vertices.clone();
        let source_vertex_count = positions.len();
        let vertex_count = align_up(source_vertex_count, alignment);
        pad_repeat_last(&mut positions, vertex_count);

        let mut normals = data.normals.clone();
        let mut tangents: Vec<[f32; 4]> = data.tangents.iter().map(|t| [t[0], t[1], t[2], 1.0]).collect();
        let mut tex_coords = data.uv_sets.first().cloned().unwrap_or_default();
        let mut colors: Vec<[f32; 4]> = data
            .vertex_colors
            .iter()
            .map(|c| [c[0], c[1], c[2], 1.0])
            .collect();

        let mut missing = Vec::new();
        let fits = [
            (Stream::Normal, fit_to_count(&mut normals, vertex_count, DEFAULT_NORMAL)),
            (Stream::Tangent, fit_to_count(&mut tangents, vertex_count, DEFAULT_TANGENT)),
            (Stream::TexCoord, fit_to_count(&mut tex_coords, vertex_count, DEFAULT_TEX_COORD)),
            (Stream::Color, fit_to_count(&mut colors, vertex_count, DEFAULT_COLOR)),
        ];
        for (stream, fit) in fits {
            match fit {
                Fit::Exact | Fit::Padded => {}
                Fit::Synthesized => {
                    tracing::warn!("Mesh '{}' has no {}, using defaults", name, stream.name());
                    missing.push(stream);
                }
                Fit::Truncated(len) => {
                    tracing::warn!(
                        "Mesh '{}' has more {} ({}) than vertices ({}), truncating",
                        name,
                        stream.name(),
                        len,
                        vertex_count
                    );
                }
            }
        }

        let off_unit_normals = normal_pass(&mut normals, self.options.normal_fixup);
        if off_unit_normals > 0 {
            tracing::debug!(
                "Mesh '{}' has {} normals off unit length",
                name,
                off_unit_normals
            );
        }

        let mut indices: Vec<u16> = data.triangles.iter().flatten().copied().collect();
        if let Some(&max) = indices.iter().max() {
            if max as usize >= vertex_count {
                return Err(MeshError::IndexOutOfRange {
                    index: max,
                    vertex_count,
                });
            }
        }
        let index_count = align_up(indices.len(), alignment);
        indices.resize(index_count, 0);

        let vertices = (0..vertex_count)
            .map(|i| InterleavedVertex {
                position: positions[i],
                normal: normals[i],
                tangent: tangents[i],
                tex_coord0: tex_coords[i],
                color: colors[i],
            })
            .collect();

        Ok(MeshBuffers {
            vertices,
            indices,
            source_vertex_count,
            missing,
            off_unit_normals,
        })
    }
}

/// Apply the normal fixup, returning how many normals remain off unit length
fn normal_pass(normals: &mut [[f32; 3]], fixup: NormalFixup) -> usize {
    let mut off_unit = 0;
    for normal in normals.iter_mut() {
        let v = Vec3::from_array(*normal);
        let length = v.length();
        if (length - 1.0).abs() <= NORMAL_UNIT_TOLERANCE {
            continue;
        }
        match fixup {
            NormalFixup::Normalize if length > f32::EPSILON => {
                *normal = (v / length).to_array();
            }
            _ => off_unit += 1,
        }
    }
    off_unit
}
