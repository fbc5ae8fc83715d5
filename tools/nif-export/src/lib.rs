//! nif-export library
//!
//! Converts parsed NIF scene trees into glTF documents and schedules batch
//! conversion of whole asset directories.

pub mod assembler;
pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod material;
pub mod mesh;
pub mod paths;
pub mod scene;
pub mod transform;
pub mod walker;

pub use assembler::{DocumentAssembler, OutputPaths};
pub use config::{ExportConfig, OutputFormat};
pub use convert::{convert_file, ConvertContext, ConvertOutcome, ConvertRequest};
pub use error::{ExportError, MeshError};
pub use material::{MaterialDescriptor, MaterialResolver};
pub use mesh::{AttributeBufferBuilder, MeshBuffers};
pub use scene::{JsonSceneReader, SceneReader, SceneTree};
pub use transform::TransformAccumulator;
pub use walker::{SceneGraphWalker, WalkReport};
