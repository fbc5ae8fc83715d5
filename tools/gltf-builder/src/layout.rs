//! Interleaved vertex record layout

use bytemuck::{Pod, Zeroable};
use gltf_json as json;

/// Per-vertex attribute stored in the interleaved record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Position,
    Normal,
    Tangent,
    TexCoord0,
    Color0,
}

impl AttributeKind {
    /// Number of f32 components
    pub fn components(self) -> usize {
        match self {
            AttributeKind::Position | AttributeKind::Normal => 3,
            AttributeKind::Tangent | AttributeKind::Color0 => 4,
            AttributeKind::TexCoord0 => 2,
        }
    }

    /// Size in bytes inside the record
    pub fn byte_size(self) -> usize {
        self.components() * std::mem::size_of::<f32>()
    }

    pub fn semantic(self) -> json::mesh::Semantic {
        match self {
            AttributeKind::Position => json::mesh::Semantic::Positions,
            AttributeKind::Normal => json::mesh::Semantic::Normals,
            AttributeKind::Tangent => json::mesh::Semantic::Tangents,
            AttributeKind::TexCoord0 => json::mesh::Semantic::TexCoords(0),
            AttributeKind::Color0 => json::mesh::Semantic::Colors(0),
        }
    }

    pub fn accessor_type(self) -> json::accessor::Type {
        match self.components() {
            2 => json::accessor::Type::Vec2,
            3 => json::accessor::Type::Vec3,
            _ => json::accessor::Type::Vec4,
        }
    }

    /// Field name used when naming views and accessors
    pub fn name(self) -> &'static str {
        match self {
            AttributeKind::Position => "position",
            AttributeKind::Normal => "normal",
            AttributeKind::Tangent => "tangent",
            AttributeKind::TexCoord0 => "texCoord0",
            AttributeKind::Color0 => "color",
        }
    }
}

/// One attribute and its byte delta inside the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub kind: AttributeKind,
    pub offset: usize,
}

/// Ordered attribute list plus the record stride
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride: usize,
}

impl VertexLayout {
    /// Lay attributes out back to back in the given order
    pub fn new(kinds: &[AttributeKind]) -> Self {
        let mut offset = 0;
        let attributes = kinds
            .iter()
            .map(|&kind| {
                let attribute = VertexAttribute { kind, offset };
                offset += kind.byte_size();
                attribute
            })
            .collect();

        Self {
            attributes,
            stride: offset,
        }
    }

    /// Layout of [`InterleavedVertex`]
    pub fn standard() -> Self {
        Self::new(&[
            AttributeKind::Position,
            AttributeKind::Normal,
            AttributeKind::Tangent,
            AttributeKind::TexCoord0,
            AttributeKind::Color0,
        ])
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn offset_of(&self, kind: AttributeKind) -> Option<usize> {
        self.attributes
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| a.offset)
    }
}

/// Interleaved vertex record (64 bytes)
///
/// Field order must match [`VertexLayout::standard`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InterleavedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub tex_coord0: [f32; 2],
    pub color: [f32; 4],
}

impl InterleavedVertex {
    /// Vertex at `position` with neutral values for every other attribute
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            normal: [0.0, 0.0, 1.0],
            tangent: [1.0, 0.0, 0.0, 1.0],
            tex_coord0: [0.0, 0.0],
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}
