//! glTF document construction utilities for nif-export
//!
//! This library provides the pieces used to turn converted scene geometry
//! into a byte-exact glTF document:
//! - BufferBuilder: Monotonic byte-offset bookkeeping, buffer views and accessors
//! - VertexLayout: Interleaved vertex record description
//! - GltfBuilder: Materials, textures, meshes, nodes and the scene
//! - validate_layout: Finalization checks over views and accessors
//! - assemble_glb: Single-file binary container
//!
//! # Example
//!
//! ```no_run
//! use gltf_builder::*;
//!
//! let vertices = [InterleavedVertex::at([0.0, 0.0, 0.0]); 12];
//! let indices = [0u16; 12];
//!
//! let mut buffer = BufferBuilder::new();
//! let vertex_accessors = buffer.pack_interleaved("Triangle", &vertices);
//! let index_accessor = buffer.pack_indices_u16("Triangle", &indices);
//!
//! let mut gltf = GltfBuilder::new();
//! let mesh = gltf.add_mesh("Triangle", &vertex_accessors, index_accessor, None);
//! gltf.add_node(json::Node {
//!     mesh: Some(mesh),
//!     name: Some("Triangle".to_string()),
//!     ..Default::default()
//! });
//!
//! let root = gltf.build(
//!     buffer.data().len() as u64,
//!     Some("triangle.bin".to_string()),
//!     buffer.views(),
//!     buffer.accessors(),
//!     "triangle",
//!     "gltf-builder",
//! );
//! validate_layout(&root, buffer.data().len() as u64).unwrap();
//! ```

pub mod buffer;
pub mod document;
pub mod layout;
pub mod utils;
pub mod validate;

pub use buffer::{AccessorIndex, BufferBuilder, VertexAccessors};
pub use document::GltfBuilder;
pub use layout::{AttributeKind, InterleavedVertex, VertexAttribute, VertexLayout};
pub use utils::{assemble_glb, compute_bounds, decompose_trs};
pub use validate::{validate_element_alignment, validate_layout, LayoutError};

// Re-export commonly used gltf-json types
pub use gltf_json as json;
pub use gltf_json::validation::Checked::Valid;
