//! Types and constants for attribute buffer assembly

use gltf_builder::InterleavedVertex;
use serde::Deserialize;

/// Vertex and index counts are padded to a multiple of this
///
/// Must stay even so u16 index views keep 4-byte aligned offsets.
pub const DEFAULT_ELEMENT_ALIGNMENT: usize = 12;

/// Tolerance on |length - 1| before a normal counts as off unit length
pub(crate) const NORMAL_UNIT_TOLERANCE: f32 = 0.1;

pub(crate) const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
pub(crate) const DEFAULT_TANGENT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub(crate) const DEFAULT_TEX_COORD: [f32; 2] = [0.0, 0.0];
pub(crate) const DEFAULT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Treatment of normals that are not unit length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalFixup {
    /// Keep normals as read, only count the off-unit ones
    #[default]
    Preserve,
    /// Rescale off-unit, non-zero normals to unit length
    Normalize,
}

/// Per-vertex stream other than position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Normal,
    Tangent,
    TexCoord,
    Color,
}

impl Stream {
    pub fn name(self) -> &'static str {
        match self {
            Stream::Normal => "normals",
            Stream::Tangent => "tangents",
            Stream::TexCoord => "uv set 0",
            Stream::Color => "vertex colors",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeOptions {
    pub alignment: usize,
    pub normal_fixup: NormalFixup,
}

impl Default for AttributeOptions {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_ELEMENT_ALIGNMENT,
            normal_fixup: NormalFixup::Preserve,
        }
    }
}

/// Padded, interleaved buffers for one geometry node
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<InterleavedVertex>,
    pub indices: Vec<u16>,
    /// Position count before padding
    pub source_vertex_count: usize,
    /// Streams synthesized from defaults because the source had none
    pub missing: Vec<Stream>,
    /// Normals off unit length (after the normal pass when normalizing)
    pub off_unit_normals: usize,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}
