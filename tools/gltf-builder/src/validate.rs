//! Finalization checks over buffer views and accessors
//!
//! A document whose views overlap, leave gaps, or point past the end of the
//! blob is unreadable by downstream tools, so these checks run before
//! anything is written.

use gltf_json as json;
use gltf_json::validation::Checked;

/// Structural layout violation found at finalization
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("document has {0} buffers, expected exactly one")]
    BufferCount(usize),

    #[error("buffer declares {declared} bytes but the blob holds {actual}")]
    BlobLengthMismatch { declared: u64, actual: u64 },

    #[error("buffer view {view} references missing buffer {buffer}")]
    MissingBuffer { view: usize, buffer: usize },

    #[error("buffer view {view} range [{start}, {end}) exceeds buffer length {length}")]
    ViewOutOfBounds {
        view: usize,
        start: u64,
        end: u64,
        length: u64,
    },

    #[error("buffer view {view} offset {offset} is not 4-byte aligned")]
    Misaligned { view: usize, offset: u64 },

    #[error("buffer views {first} and {second} overlap")]
    Overlap { first: usize, second: usize },

    #[error("buffer views cover {covered} bytes but the buffer declares {declared}")]
    CoverageMismatch { covered: u64, declared: u64 },

    #[error("accessor {accessor} references missing buffer view {view}")]
    MissingView { accessor: usize, view: usize },

    #[error("accessor {accessor} reads past the end of buffer view {view}")]
    AccessorOutOfBounds { accessor: usize, view: usize },

    #[error("accessor {accessor} has an unsupported component type or element type")]
    InvalidAccessorType { accessor: usize },

    #[error("accessor {accessor} count {count} is not a multiple of {alignment}")]
    UnalignedCount {
        accessor: usize,
        count: u64,
        alignment: usize,
    },
}

fn component_size(component: json::accessor::ComponentType) -> u64 {
    use json::accessor::ComponentType;
    match component {
        ComponentType::I8 | ComponentType::U8 => 1,
        ComponentType::I16 | ComponentType::U16 => 2,
        ComponentType::U32 | ComponentType::F32 => 4,
    }
}

fn multiplicity(type_: json::accessor::Type) -> u64 {
    use json::accessor::Type;
    match type_ {
        Type::Scalar => 1,
        Type::Vec2 => 2,
        Type::Vec3 => 3,
        Type::Vec4 | Type::Mat2 => 4,
        Type::Mat3 => 9,
        Type::Mat4 => 16,
    }
}

/// Check the single-buffer invariants of a finished document
///
/// - exactly one buffer whose declared length equals `blob_len`, or no
///   buffer, views or accessors at all when the blob is empty
/// - every view lies inside the buffer and starts 4-byte aligned
/// - views never overlap and together cover the whole buffer
/// - every accessor's last element ends inside its view
pub fn validate_layout(root: &json::Root, blob_len: u64) -> Result<(), LayoutError> {
    if root.buffers.is_empty() && blob_len == 0 {
        if !root.buffer_views.is_empty() {
            return Err(LayoutError::MissingBuffer { view: 0, buffer: 0 });
        }
        if !root.accessors.is_empty() {
            return Err(LayoutError::MissingView {
                accessor: 0,
                view: root.accessors[0].buffer_view.map(|v| v.value()).unwrap_or(0),
            });
        }
        return Ok(());
    }
    if root.buffers.len() != 1 {
        return Err(LayoutError::BufferCount(root.buffers.len()));
    }
    let declared = root.buffers[0].byte_length.0;
    if declared != blob_len {
        return Err(LayoutError::BlobLengthMismatch {
            declared,
            actual: blob_len,
        });
    }

    let mut ranges = Vec::with_capacity(root.buffer_views.len());
    for (index, view) in root.buffer_views.iter().enumerate() {
        if view.buffer.value() != 0 {
            return Err(LayoutError::MissingBuffer {
                view: index,
                buffer: view.buffer.value(),
            });
        }
        let start = view.byte_offset.map(|o| o.0).unwrap_or(0);
        let end = start + view.byte_length.0;
        if end > declared {
            return Err(LayoutError::ViewOutOfBounds {
                view: index,
                start,
                end,
                length: declared,
            });
        }
        if start % 4 != 0 {
            return Err(LayoutError::Misaligned {
                view: index,
                offset: start,
            });
        }
        ranges.push((start, end, index));
    }

    ranges.sort_unstable();
    let mut covered = 0;
    for pair in ranges.windows(2) {
        let (_, end, first) = pair[0];
        let (start, _, second) = pair[1];
        if start < end {
            return Err(LayoutError::Overlap { first, second });
        }
    }
    for (start, end, _) in &ranges {
        covered += end - start;
    }
    if covered != declared {
        return Err(LayoutError::CoverageMismatch { covered, declared });
    }

    for (index, accessor) in root.accessors.iter().enumerate() {
        let Some(view_index) = accessor.buffer_view.map(|v| v.value()) else {
            continue;
        };
        let view = root
            .buffer_views
            .get(view_index)
            .ok_or(LayoutError::MissingView {
                accessor: index,
                view: view_index,
            })?;

        let (component, type_) = match (&accessor.component_type, &accessor.type_) {
            (Checked::Valid(component), Checked::Valid(type_)) => (component.0, *type_),
            _ => return Err(LayoutError::InvalidAccessorType { accessor: index }),
        };
        let element_size = component_size(component) * multiplicity(type_);
        let stride = view
            .byte_stride
            .map(|s| s.0 as u64)
            .unwrap_or(element_size);
        let count = accessor.count.0;
        let offset = accessor.byte_offset.map(|o| o.0).unwrap_or(0);

        if count > 0 {
            let end = offset + stride * (count - 1) + element_size;
            if end > view.byte_length.0 {
                return Err(LayoutError::AccessorOutOfBounds {
                    accessor: index,
                    view: view_index,
                });
            }
        }
    }

    Ok(())
}

/// Check that every accessor's element count is a multiple of `alignment`
pub fn validate_element_alignment(root: &json::Root, alignment: usize) -> Result<(), LayoutError> {
    if alignment <= 1 {
        return Ok(());
    }
    for (index, accessor) in root.accessors.iter().enumerate() {
        if accessor.count.0 % alignment as u64 != 0 {
            return Err(LayoutError::UnalignedCount {
                accessor: index,
                count: accessor.count.0,
                alignment,
            });
        }
    }
    Ok(())
}
