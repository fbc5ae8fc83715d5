//! World transform accumulation during traversal

use glam::Mat4;

/// Working transform for the root-to-current chain
///
/// The walker passes this by value: each child receives a copy composed
/// with its parent's local transform, so a sibling subtree never sees
/// another sibling's accumulated transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformAccumulator {
    working: Mat4,
}

impl TransformAccumulator {
    pub fn new() -> Self {
        Self {
            working: Mat4::IDENTITY,
        }
    }

    /// working = working * local
    pub fn compose(&mut self, local: Mat4) {
        self.working *= local;
    }

    /// Copy of `self` with `local` composed on the right
    pub fn composed(mut self, local: Mat4) -> Self {
        self.compose(local);
        self
    }

    pub fn snapshot(&self) -> Mat4 {
        self.working
    }

    pub fn reset(&mut self) {
        self.working = Mat4::IDENTITY;
    }
}

impl Default for TransformAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
