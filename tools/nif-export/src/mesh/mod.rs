//! Attribute buffer assembly (raw geometry -> padded interleaved buffers)

mod attributes;
mod padding;
mod types;

pub use attributes::AttributeBufferBuilder;
pub use types::{AttributeOptions, MeshBuffers, NormalFixup, Stream, DEFAULT_ELEMENT_ALIGNMENT};
