//! Parsed NIF block tree as handed over by the external scene parser
//!
//! Blocks are tagged by their NIF class name:
//!
//! ```json
//! {
//!   "roots": [
//!     {
//!       "type": "NiNode",
//!       "name": "Scene Root",
//!       "transform": { "translation": [0, 0, 10], "rotation": [[1,0,0],[0,1,0],[0,0,1]], "scale": 1 },
//!       "children": [
//!         { "type": "NiTriShape", "name": "Wall", "data": { "vertices": [[0,0,0]], "triangles": [] } },
//!         null
//!       ]
//!     }
//!   ]
//! }
//! ```

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ExportError, Result};

/// Block transform in the source's convention
///
/// `rotation` holds the matrix rows as stored by NIF (row-vector
/// convention), which are the columns of the column-vector rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTransform {
    pub translation: [f32; 3],
    pub rotation: [[f32; 3]; 3],
    pub scale: f32,
}

impl Default for SourceTransform {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            scale: 1.0,
        }
    }
}

impl SourceTransform {
    /// T * R * S as a column-vector matrix
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from_array(self.translation))
            * Mat4::from_mat3(Mat3::from_cols_array_2d(&self.rotation))
            * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

/// Raw triangle geometry; every stream has an independent length
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryData {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tangents: Vec<[f32; 3]>,
    pub uv_sets: Vec<Vec<[f32; 2]>>,
    /// RGBA; alpha is ignored on export
    pub vertex_colors: Vec<[f32; 4]>,
    pub triangles: Vec<[u16; 3]>,
}

/// Lighting shader property (first property slot)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderProperty {
    /// 0..=255
    pub glossiness: Option<f32>,
    /// Texture set in slot order: diffuse, normal, emissive, height
    pub textures: Option<Vec<String>>,
}

/// Alpha property (second property slot)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaProperty {
    pub flags: u16,
    pub threshold: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBlock {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub transform: SourceTransform,
    /// Null entries are dangling child links and are skipped
    #[serde(default)]
    pub children: Vec<Option<SourceBlock>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryBlock {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub transform: SourceTransform,
    #[serde(default)]
    pub data: Option<GeometryData>,
    #[serde(default)]
    pub shader_property: Option<ShaderProperty>,
    #[serde(default)]
    pub alpha_property: Option<AlphaProperty>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedBlock {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamableBlock {
    pub root: Box<SourceBlock>,
}

/// One block of the source tree, tagged by NIF class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SourceBlock {
    #[serde(rename = "NiNode", alias = "BSFadeNode", alias = "BSMultiBoundNode")]
    Node(NodeBlock),
    #[serde(rename = "NiTriShape", alias = "NiTriStrips", alias = "BSTriShape")]
    Geometry(GeometryBlock),
    #[serde(rename = "NiCamera")]
    Camera(NamedBlock),
    #[serde(rename = "NiPhysXProp")]
    PhysicsProp(NamedBlock),
    /// Wrapper whose inner root is the real scene root
    #[serde(rename = "CStreamableAssetData")]
    Streamable(StreamableBlock),
    #[serde(other)]
    Unknown,
}

/// All root blocks of one source file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub roots: Vec<SourceBlock>,
}

/// Loads a parsed block tree for one source file
pub trait SceneReader {
    fn read(&self, path: &Path) -> Result<SourceFile>;
}

/// Reads block trees serialized as JSON by the external parser
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSceneReader;

impl SceneReader for JsonSceneReader {
    fn read(&self, path: &Path) -> Result<SourceFile> {
        let bytes = std::fs::read(path).map_err(|e| ExportError::io(path, e))?;
        serde_json::from_slice(&bytes).map_err(|source| ExportError::SceneDecode {
            path: path.to_path_buf(),
            source,
        })
    }
}
