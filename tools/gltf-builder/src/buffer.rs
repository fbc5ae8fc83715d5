//! Binary buffer packing with byte-offset bookkeeping and accessor creation

use crate::layout::{AttributeKind, InterleavedVertex, VertexLayout};
use crate::utils::compute_bounds;
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Accessor index returned by buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorIndex(pub u32);

impl AccessorIndex {
    pub fn as_json_index(&self) -> json::Index<json::Accessor> {
        json::Index::new(self.0)
    }
}

/// Accessors created for one interleaved vertex buffer, in layout order
#[derive(Debug, Clone, Default)]
pub struct VertexAccessors {
    pub entries: Vec<(AttributeKind, AccessorIndex)>,
}

impl VertexAccessors {
    pub fn get(&self, kind: AttributeKind) -> Option<AccessorIndex> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, index)| *index)
    }
}

/// Builder for the document's single binary buffer
///
/// Every pack call registers its view at the current end of the buffer and
/// advances the offset by exactly the bytes written, so view ranges are
/// contiguous and never overlap.
pub struct BufferBuilder {
    buffer: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl BufferBuilder {
    /// Create a new empty buffer builder
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            views: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Current byte offset (where the next view will start)
    pub fn offset(&self) -> u64 {
        self.buffer.len() as u64
    }

    /// Get the current accessor count
    pub fn accessor_count(&self) -> u32 {
        self.accessors.len() as u32
    }

    /// Get the binary buffer data
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer views
    pub fn views(&self) -> &[json::buffer::View] {
        &self.views
    }

    /// Get the accessors
    pub fn accessors(&self) -> &[json::Accessor] {
        &self.accessors
    }

    /// Consume the builder, returning (blob, views, accessors)
    pub fn into_parts(self) -> (Vec<u8>, Vec<json::buffer::View>, Vec<json::Accessor>) {
        (self.buffer, self.views, self.accessors)
    }

    /// Pack interleaved vertices into one strided view
    ///
    /// One accessor is created per attribute of [`VertexLayout::standard`],
    /// each offset by its byte delta inside the record. The position
    /// accessor carries per-axis min/max.
    pub fn pack_interleaved(&mut self, name: &str, vertices: &[InterleavedVertex]) -> VertexAccessors {
        let layout = VertexLayout::standard();
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytemuck::cast_slice(vertices));

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: ((vertices.len() * layout.stride()) as u64).into(),
            byte_offset: Some((offset as u64).into()),
            byte_stride: Some(json::buffer::Stride(layout.stride())),
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(format!("{name} Vertex Buffer View")),
            target: Some(Valid(json::buffer::Target::ArrayBuffer)),
        });
        let view = json::Index::new(self.views.len() as u32 - 1);

        let mut entries = Vec::with_capacity(layout.attributes().len());
        for attribute in layout.attributes() {
            let (min, max) = if attribute.kind == AttributeKind::Position {
                let positions: Vec<[f32; 3]> = vertices.iter().map(|v| v.position).collect();
                let (min, max) = compute_bounds(&positions);
                (
                    Some(json::Value::Array(
                        min.into_iter().map(json::Value::from).collect(),
                    )),
                    Some(json::Value::Array(
                        max.into_iter().map(json::Value::from).collect(),
                    )),
                )
            } else {
                (None, None)
            };

            let accessor_idx = self.accessors.len() as u32;
            self.accessors.push(json::Accessor {
                buffer_view: Some(view),
                byte_offset: Some((attribute.offset as u64).into()),
                count: vertices.len().into(),
                component_type: Valid(json::accessor::GenericComponentType(
                    json::accessor::ComponentType::F32,
                )),
                extensions: Default::default(),
                extras: Default::default(),
                type_: Valid(attribute.kind.accessor_type()),
                min,
                max,
                name: Some(format!("{name} {} Accessor", attribute.kind.name())),
                normalized: false,
                sparse: None,
            });
            entries.push((attribute.kind, AccessorIndex(accessor_idx)));
        }

        VertexAccessors { entries }
    }

    /// Pack u16 indices into their own view
    pub fn pack_indices_u16(&mut self, name: &str, indices: &[u16]) -> AccessorIndex {
        let offset = self.buffer.len();
        for idx in indices {
            self.buffer.extend_from_slice(&idx.to_le_bytes());
        }

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: ((indices.len() * 2) as u64).into(),
            byte_offset: Some((offset as u64).into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(format!("{name} Index Buffer View")),
            target: Some(Valid(json::buffer::Target::ElementArrayBuffer)),
        });

        let accessor_idx = self.accessors.len() as u32;
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(self.views.len() as u32 - 1)),
            byte_offset: Some(0u64.into()),
            count: indices.len().into(),
            component_type: Valid(json::accessor::GenericComponentType(
                json::accessor::ComponentType::U16,
            )),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(json::accessor::Type::Scalar),
            min: None,
            max: None,
            name: Some(format!("{name} Index Accessor")),
            normalized: false,
            sparse: None,
        });

        AccessorIndex(accessor_idx)
    }
}

impl Default for BufferBuilder {
    fn default() -> Self {
        Self::new()
    }
}
