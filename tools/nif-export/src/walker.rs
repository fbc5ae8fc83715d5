//! Depth-first scene traversal driving the per-node pipeline

use crate::assembler::DocumentAssembler;
use crate::material::MaterialResolver;
use crate::mesh::AttributeBufferBuilder;
use crate::scene::{GeometryNode, NodeId, NodeKind, SceneTree};
use crate::transform::TransformAccumulator;

/// Outcome of walking one scene tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub meshes_written: usize,
    pub nodes_skipped: usize,
    /// Non-fatal attribute and mesh problems
    pub warnings: usize,
}

pub struct SceneGraphWalker<'a> {
    attributes: AttributeBufferBuilder,
    materials: &'a MaterialResolver,
}

impl<'a> SceneGraphWalker<'a> {
    pub fn new(attributes: AttributeBufferBuilder, materials: &'a MaterialResolver) -> Self {
        Self {
            attributes,
            materials,
        }
    }

    /// Emit every geometry node of `tree` into `assembler`
    ///
    /// Only structural and geometry roots are traversed; camera, physics
    /// and unknown roots are skipped.
    pub fn walk(&self, tree: &SceneTree, assembler: &mut DocumentAssembler) -> WalkReport {
        let mut report = WalkReport::default();
        for &root in tree.roots() {
            let node = tree.node(root);
            match node.kind {
                NodeKind::Structural | NodeKind::Geometry(_) => {
                    tracing::debug!("Processing root '{}'", node.name);
                    self.visit(tree, root, TransformAccumulator::new(), assembler, &mut report);
                }
                _ => {
                    tracing::info!("Skipped {} root '{}'", node.kind.label(), node.name);
                    report.nodes_skipped += 1;
                }
            }
        }
        report
    }

    fn visit(
        &self,
        tree: &SceneTree,
        id: NodeId,
        accumulator: TransformAccumulator,
        assembler: &mut DocumentAssembler,
        report: &mut WalkReport,
    ) {
        let node = tree.node(id);
        match &node.kind {
            NodeKind::Geometry(geometry) => {
                self.emit(tree, id, geometry, accumulator, assembler, report);
            }
            NodeKind::Structural => {
                let accumulator = accumulator.composed(node.local);
                for &child in &node.children {
                    self.visit(tree, child, accumulator, assembler, report);
                }
            }
            _ => {
                tracing::debug!("Skipping nested {} '{}'", node.kind.label(), node.name);
                report.nodes_skipped += 1;
            }
        }
    }

    fn emit(
        &self,
        tree: &SceneTree,
        id: NodeId,
        geometry: &GeometryNode,
        accumulator: TransformAccumulator,
        assembler: &mut DocumentAssembler,
        report: &mut WalkReport,
    ) {
        let name = tree.node(id).name.as_str();
        let data = match &geometry.data {
            Some(data) if !name.is_empty() => data,
            _ => {
                tracing::warn!("Skipping geometry '{}', no shape data found", name);
                report.nodes_skipped += 1;
                return;
            }
        };

        let buffers = match self.attributes.build(name, data) {
            Ok(buffers) => buffers,
            Err(e) => {
                tracing::warn!("Skipping geometry '{}': {}", name, e);
                report.nodes_skipped += 1;
                report.warnings += 1;
                return;
            }
        };
        report.warnings += buffers.missing.len();

        let material = self
            .materials
            .resolve(name, geometry.shader.as_ref(), geometry.alpha.as_ref());
        let world =
            accumulator.snapshot() * tree.transform_relative_to(id, tree.parent(id));

        tracing::debug!(
            "Mesh '{}': {} vertices ({} source), {} indices",
            name,
            buffers.vertex_count(),
            buffers.source_vertex_count,
            buffers.index_count()
        );
        assembler.add_mesh(name, &buffers, &material, world);
        report.meshes_written += 1;
    }
}
