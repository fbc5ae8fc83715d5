//! Error types for scene conversion

use std::path::PathBuf;

use gltf_builder::LayoutError;

/// Failure while converting one source file
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode scene {path}: {source}")]
    SceneDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize glTF document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid document layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Reason a single geometry block cannot be turned into buffers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("no vertex positions")]
    NoVertices,

    #[error("index {index} is past the last of {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: usize },
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;
