//! GLTF document construction

use crate::buffer::{AccessorIndex, VertexAccessors};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use std::collections::BTreeMap;

/// Builder for complete GLTF documents
///
/// Records are appended as a scene is traversed; every node added becomes a
/// top-level node of the single scene produced by [`GltfBuilder::build`].
pub struct GltfBuilder {
    nodes: Vec<json::Node>,
    meshes: Vec<json::Mesh>,
    materials: Vec<json::Material>,
    images: Vec<json::Image>,
    textures: Vec<json::Texture>,
    samplers: Vec<json::texture::Sampler>,
}

impl GltfBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            images: Vec::new(),
            textures: Vec::new(),
            samplers: Vec::new(),
        }
    }

    /// Get the current mesh count
    pub fn mesh_count(&self) -> u32 {
        self.meshes.len() as u32
    }

    /// Get the current texture count
    pub fn texture_count(&self) -> u32 {
        self.textures.len() as u32
    }

    /// Shared sampler, created on first use
    fn default_sampler(&mut self) -> json::Index<json::texture::Sampler> {
        if self.samplers.is_empty() {
            self.samplers.push(json::texture::Sampler::default());
        }
        json::Index::new(0)
    }

    /// Add an external PNG image and a texture sampling it
    pub fn add_texture(&mut self, uri: &str) -> json::Index<json::Texture> {
        let sampler = self.default_sampler();

        self.images.push(json::Image {
            buffer_view: None,
            mime_type: Some(json::image::MimeType("image/png".to_string())),
            name: None,
            uri: Some(uri.to_string()),
            extensions: Default::default(),
            extras: Default::default(),
        });

        self.textures.push(json::Texture {
            name: None,
            sampler: Some(sampler),
            source: json::Index::new(self.images.len() as u32 - 1),
            extensions: Default::default(),
            extras: Default::default(),
        });

        json::Index::new(self.textures.len() as u32 - 1)
    }

    /// Add a material
    pub fn add_material(&mut self, material: json::Material) -> json::Index<json::Material> {
        self.materials.push(material);
        json::Index::new(self.materials.len() as u32 - 1)
    }

    /// Add a mesh with one indexed triangle primitive
    pub fn add_mesh(
        &mut self,
        name: &str,
        vertices: &VertexAccessors,
        indices: AccessorIndex,
        material: Option<json::Index<json::Material>>,
    ) -> json::Index<json::Mesh> {
        let attributes: BTreeMap<_, _> = vertices
            .entries
            .iter()
            .map(|(kind, accessor)| (Valid(kind.semantic()), accessor.as_json_index()))
            .collect();

        let primitive = json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: Some(indices.as_json_index()),
            material,
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
        };

        self.meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            primitives: vec![primitive],
            weights: None,
        });

        json::Index::new(self.meshes.len() as u32 - 1)
    }

    /// Add a node
    pub fn add_node(&mut self, node: json::Node) -> json::Index<json::Node> {
        self.nodes.push(node);
        json::Index::new(self.nodes.len() as u32 - 1)
    }

    /// Build final GLTF Root (requires buffer views and accessors from BufferBuilder)
    ///
    /// The document has one buffer of `buffer_byte_length` bytes (`uri` is
    /// `None` for GLB output) and one scene referencing every node. An empty
    /// blob gets no buffer and a document without nodes gets no scene:
    /// buffers must be at least one byte long and scene node lists non-empty.
    pub fn build(
        self,
        buffer_byte_length: u64,
        uri: Option<String>,
        buffer_views: &[json::buffer::View],
        accessors: &[json::Accessor],
        scene_name: &str,
        generator: &str,
    ) -> json::Root {
        let mut buffers = Vec::new();
        if buffer_byte_length > 0 {
            buffers.push(json::Buffer {
                byte_length: buffer_byte_length.into(),
                extensions: Default::default(),
                extras: Default::default(),
                name: Some("Default Buffer".to_string()),
                uri,
            });
        }

        let mut scenes = Vec::new();
        if !self.nodes.is_empty() {
            scenes.push(json::Scene {
                extensions: Default::default(),
                extras: Default::default(),
                name: Some(scene_name.to_string()),
                nodes: (0..self.nodes.len() as u32).map(json::Index::new).collect(),
            });
        }

        json::Root {
            accessors: accessors.to_vec(),
            animations: Vec::new(),
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(generator.to_string()),
                min_version: None,
                version: "2.0".to_string(),
            },
            buffers,
            buffer_views: buffer_views.to_vec(),
            cameras: Vec::new(),
            extensions: Default::default(),
            extensions_required: Vec::new(),
            extensions_used: Vec::new(),
            extras: Default::default(),
            images: self.images,
            materials: self.materials,
            meshes: self.meshes,
            nodes: self.nodes,
            samplers: self.samplers,
            scene: (!scenes.is_empty()).then(|| json::Index::new(0)),
            scenes,
            skins: Vec::new(),
            textures: self.textures,
        }
    }
}

impl Default for GltfBuilder {
    fn default() -> Self {
        Self::new()
    }
}
