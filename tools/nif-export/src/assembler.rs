//! Per-document glTF assembly and serialization

use glam::Mat4;
use gltf_builder::{
    assemble_glb, decompose_trs, json, validate_element_alignment, validate_layout,
    BufferBuilder, GltfBuilder, Valid,
};
use std::path::{Path, PathBuf};

use crate::config::OutputFormat;
use crate::error::{ExportError, Result};
use crate::material::{AlphaMode, MaterialDescriptor};
use crate::mesh::MeshBuffers;

/// Value of `asset.generator` in every written document
pub const GENERATOR: &str = concat!("nif-export ", env!("CARGO_PKG_VERSION"));

/// Destination of one converted document: `<dir>/<stem>.gltf` + `.bin`, or `.glb`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub document_dir: PathBuf,
    pub stem: String,
}

impl OutputPaths {
    pub fn new(document_dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            document_dir: document_dir.into(),
            stem: stem.into(),
        }
    }

    pub fn gltf(&self) -> PathBuf {
        self.document_dir.join(format!("{}.gltf", self.stem))
    }

    pub fn bin_file_name(&self) -> String {
        format!("{}.bin", self.stem)
    }

    pub fn bin(&self) -> PathBuf {
        self.document_dir.join(self.bin_file_name())
    }

    pub fn glb(&self) -> PathBuf {
        self.document_dir.join(format!("{}.glb", self.stem))
    }
}

/// Accumulates meshes for one source file, then validates and writes them
pub struct DocumentAssembler {
    buffer: BufferBuilder,
    gltf: GltfBuilder,
    alignment: usize,
}

impl DocumentAssembler {
    pub fn new(alignment: usize) -> Self {
        Self {
            buffer: BufferBuilder::new(),
            gltf: GltfBuilder::new(),
            alignment,
        }
    }

    pub fn mesh_count(&self) -> u32 {
        self.gltf.mesh_count()
    }

    /// Current end of the binary blob
    pub fn offset(&self) -> u64 {
        self.buffer.offset()
    }

    /// Append one mesh, its material and a top-level node placed at `world`
    pub fn add_mesh(
        &mut self,
        name: &str,
        mesh: &MeshBuffers,
        material: &MaterialDescriptor,
        world: Mat4,
    ) -> json::Index<json::Node> {
        let vertex_accessors = self.buffer.pack_interleaved(name, &mesh.vertices);
        let index_accessor = self.buffer.pack_indices_u16(name, &mesh.indices);

        let material = self.add_material(name, material);
        let mesh_index = self
            .gltf
            .add_mesh(name, &vertex_accessors, index_accessor, Some(material));

        let (translation, rotation, scale) = decompose_trs(world);
        self.gltf.add_node(json::Node {
            mesh: Some(mesh_index),
            name: Some(name.to_string()),
            translation: Some(translation),
            rotation: Some(json::scene::UnitQuaternion(rotation)),
            scale: Some(scale),
            ..Default::default()
        })
    }

    fn add_material(
        &mut self,
        name: &str,
        descriptor: &MaterialDescriptor,
    ) -> json::Index<json::Material> {
        let mut texture_info = |uri: &Option<String>| {
            uri.as_deref().map(|uri| self.gltf.add_texture(uri))
        };
        let diffuse = texture_info(&descriptor.textures.diffuse);
        let normal = texture_info(&descriptor.textures.normal);
        let emissive = texture_info(&descriptor.textures.emissive);

        let info = |index: json::Index<json::Texture>| json::texture::Info {
            index,
            tex_coord: 0,
            extensions: Default::default(),
            extras: Default::default(),
        };

        let alpha_mode = match descriptor.alpha_mode {
            AlphaMode::Opaque => json::material::AlphaMode::Opaque,
            AlphaMode::Mask => json::material::AlphaMode::Mask,
            AlphaMode::Blend => json::material::AlphaMode::Blend,
        };

        self.gltf.add_material(json::Material {
            alpha_cutoff: descriptor.alpha_cutoff.map(json::material::AlphaCutoff),
            alpha_mode: Valid(alpha_mode),
            double_sided: descriptor.double_sided,
            pbr_metallic_roughness: json::material::PbrMetallicRoughness {
                base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, 1.0]),
                base_color_texture: diffuse.map(info),
                metallic_factor: json::material::StrengthFactor(descriptor.metalness),
                roughness_factor: json::material::StrengthFactor(descriptor.roughness),
                metallic_roughness_texture: None,
                extensions: Default::default(),
                extras: Default::default(),
            },
            normal_texture: normal.map(|index| json::material::NormalTexture {
                index,
                scale: 1.0,
                tex_coord: 0,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            occlusion_texture: None,
            emissive_texture: emissive.map(info),
            emissive_factor: json::material::EmissiveFactor(descriptor.emissive),
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
        })
    }

    /// Build the document, validate its layout and write it out
    ///
    /// Returns the files written. Nothing is written when validation fails.
    /// A document without meshes has no buffer, so no `.bin` is written.
    pub fn finish(self, paths: &OutputPaths, format: OutputFormat) -> Result<Vec<PathBuf>> {
        let (blob, views, accessors) = self.buffer.into_parts();
        let blob_len = blob.len() as u64;

        let uri = match format {
            OutputFormat::Gltf => Some(paths.bin_file_name()),
            OutputFormat::Glb => None,
        };
        let root = self
            .gltf
            .build(blob_len, uri, &views, &accessors, &paths.stem, GENERATOR);

        validate_layout(&root, blob_len)?;
        validate_element_alignment(&root, self.alignment)?;

        std::fs::create_dir_all(&paths.document_dir)
            .map_err(|e| ExportError::io(&paths.document_dir, e))?;

        match format {
            OutputFormat::Gltf => {
                let text = serde_json::to_string_pretty(&root)?;
                write(&paths.gltf(), text.as_bytes())?;
                if blob.is_empty() {
                    return Ok(vec![paths.gltf()]);
                }
                write(&paths.bin(), &blob)?;
                Ok(vec![paths.gltf(), paths.bin()])
            }
            OutputFormat::Glb => {
                let glb = assemble_glb(&root, &blob)?;
                write(&paths.glb(), &glb)?;
                Ok(vec![paths.glb()])
            }
        }
    }
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|e| ExportError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::TextureSlots;
    use crate::mesh::AttributeBufferBuilder;
    use crate::scene::GeometryData;
    use glam::Vec3;

    fn triangle_mesh() -> MeshBuffers {
        let data = GeometryData {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            triangles: vec![[0, 1, 2]],
            ..Default::default()
        };
        AttributeBufferBuilder::default().build("Tri", &data).unwrap()
    }

    fn material(alpha_mode: AlphaMode, diffuse: Option<&str>) -> MaterialDescriptor {
        MaterialDescriptor {
            alpha_mode,
            alpha_cutoff: (alpha_mode == AlphaMode::Mask).then_some(0.5),
            roughness: 0.5,
            metalness: 1e-5,
            emissive: [1.0, 1.0, 1.0],
            double_sided: alpha_mode != AlphaMode::Opaque,
            textures: TextureSlots {
                diffuse: diffuse.map(str::to_string),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_offsets_advance_per_mesh() {
        let mut assembler = DocumentAssembler::new(12);
        assembler.add_mesh("A", &triangle_mesh(), &material(AlphaMode::Opaque, None), Mat4::IDENTITY);
        // 12 vertices * 64 bytes + 12 indices * 2 bytes
        assert_eq!(assembler.offset(), 768 + 24);
        assembler.add_mesh("B", &triangle_mesh(), &material(AlphaMode::Opaque, None), Mat4::IDENTITY);
        assert_eq!(assembler.offset(), 2 * (768 + 24));
        assert_eq!(assembler.mesh_count(), 2);
    }

    #[test]
    fn test_finish_writes_gltf_and_bin() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::new(dir.path().join("wall"), "wall");

        let mut assembler = DocumentAssembler::new(12);
        let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assembler.add_mesh(
            "Wall",
            &triangle_mesh(),
            &material(AlphaMode::Mask, Some("../textures/wall.png")),
            world,
        );
        let written = assembler.finish(&paths, OutputFormat::Gltf).unwrap();
        assert_eq!(written, vec![paths.gltf(), paths.bin()]);

        let text = std::fs::read_to_string(paths.gltf()).unwrap();
        let root: json::Root = serde_json::from_str(&text).unwrap();
        assert_eq!(root.buffers[0].uri.as_deref(), Some("wall.bin"));
        assert_eq!(root.buffers[0].byte_length.0, 792);
        assert_eq!(std::fs::metadata(paths.bin()).unwrap().len(), 792);
        assert_eq!(root.scenes[0].name.as_deref(), Some("wall"));
        assert_eq!(root.nodes[0].translation, Some([1.0, 2.0, 3.0]));
        assert_eq!(root.images[0].uri.as_deref(), Some("../textures/wall.png"));

        let material = &root.materials[0];
        assert_eq!(material.alpha_mode, Valid(json::material::AlphaMode::Mask));
        assert_eq!(material.alpha_cutoff.map(|c| c.0), Some(0.5));
        assert!(material.double_sided);
        assert!(material.pbr_metallic_roughness.base_color_texture.is_some());
    }

    #[test]
    fn test_finish_writes_glb() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::new(dir.path(), "rock");

        let mut assembler = DocumentAssembler::new(12);
        assembler.add_mesh("Rock", &triangle_mesh(), &material(AlphaMode::Opaque, None), Mat4::IDENTITY);
        let written = assembler.finish(&paths, OutputFormat::Glb).unwrap();
        assert_eq!(written, vec![paths.glb()]);

        let bytes = std::fs::read(paths.glb()).unwrap();
        assert_eq!(&bytes[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize, bytes.len());
        assert!(!paths.bin().exists());
    }

    #[test]
    fn test_empty_document_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::new(dir.path().join("cam"), "cam");

        let written = DocumentAssembler::new(12)
            .finish(&paths, OutputFormat::Gltf)
            .unwrap();
        assert_eq!(written, vec![paths.gltf()]);
        assert!(!paths.bin().exists());

        let text = std::fs::read_to_string(paths.gltf()).unwrap();
        let root: json::Root = serde_json::from_str(&text).unwrap();
        assert!(root.buffers.is_empty());
        assert!(root.scenes.is_empty());
    }

    #[test]
    fn test_misaligned_counts_are_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::new(dir.path().join("bad"), "bad");

        let mut mesh = triangle_mesh();
        mesh.vertices.truncate(10);

        let mut assembler = DocumentAssembler::new(12);
        assembler.add_mesh("Bad", &mesh, &material(AlphaMode::Opaque, None), Mat4::IDENTITY);
        let err = assembler.finish(&paths, OutputFormat::Gltf).unwrap_err();

        assert!(matches!(err, ExportError::Layout(_)));
        assert!(!paths.document_dir.exists());
    }
}
