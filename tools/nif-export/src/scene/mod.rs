//! Scene model: parsed source blocks and the arena tree built from them

mod source;
mod tree;

pub use source::{
    AlphaProperty, GeometryBlock, GeometryData, JsonSceneReader, NamedBlock, NodeBlock,
    SceneReader, ShaderProperty, SourceBlock, SourceFile, SourceTransform, StreamableBlock,
};
pub use tree::{GeometryNode, NodeId, NodeKind, SceneNode, SceneTree};
