//! Arena scene tree with parent links

use glam::Mat4;

use super::source::{
    AlphaProperty, GeometryData, ShaderProperty, SourceBlock, SourceFile,
};

/// Index of a node in the [`SceneTree`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Geometry-bearing node payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryNode {
    pub data: Option<GeometryData>,
    pub shader: Option<ShaderProperty>,
    pub alpha: Option<AlphaProperty>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Transform + children, no geometry
    Structural,
    Geometry(Box<GeometryNode>),
    Camera,
    PhysicsProp,
    /// Block class without a transform/children contract
    Unsupported,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Structural => "node",
            NodeKind::Geometry(_) => "geometry",
            NodeKind::Camera => "camera",
            NodeKind::PhysicsProp => "physics prop",
            NodeKind::Unsupported => "unsupported block",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub local: Mat4,
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    /// Set once by the parent pre-pass; only used for relative transforms
    pub parent: Option<NodeId>,
}

/// Owned scene tree built from a [`SourceFile`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneTree {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
}

impl SceneTree {
    /// Flatten the block tree into the arena, then link parents
    ///
    /// Streamable wrappers are replaced by their inner root and null child
    /// links are dropped.
    pub fn from_source(file: SourceFile) -> Self {
        let mut tree = SceneTree::default();
        for block in file.roots {
            let id = tree.insert(block);
            tree.roots.push(id);
        }
        tree.link_parents();
        tree
    }

    fn insert(&mut self, block: SourceBlock) -> NodeId {
        let (name, local, kind, children) = match block {
            SourceBlock::Node(node) => (
                node.name,
                node.transform.to_mat4(),
                NodeKind::Structural,
                node.children,
            ),
            SourceBlock::Geometry(geometry) => (
                geometry.name,
                geometry.transform.to_mat4(),
                NodeKind::Geometry(Box::new(GeometryNode {
                    data: geometry.data,
                    shader: geometry.shader_property,
                    alpha: geometry.alpha_property,
                })),
                Vec::new(),
            ),
            SourceBlock::Streamable(wrapper) => return self.insert(*wrapper.root),
            SourceBlock::Camera(named) => (named.name, Mat4::IDENTITY, NodeKind::Camera, Vec::new()),
            SourceBlock::PhysicsProp(named) => {
                (named.name, Mat4::IDENTITY, NodeKind::PhysicsProp, Vec::new())
            }
            SourceBlock::Unknown => (
                String::new(),
                Mat4::IDENTITY,
                NodeKind::Unsupported,
                Vec::new(),
            ),
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name,
            local,
            kind,
            children: Vec::new(),
            parent: None,
        });

        let child_ids: Vec<NodeId> = children
            .into_iter()
            .flatten()
            .map(|child| self.insert(child))
            .collect();
        self.nodes[id.0].children = child_ids;
        id
    }

    fn link_parents(&mut self) {
        for index in 0..self.nodes.len() {
            for child in self.nodes[index].children.clone() {
                self.nodes[child.0].parent = Some(NodeId(index));
            }
        }
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Transform of `id` expressed in the space of `ancestor`
    ///
    /// Multiplies local transforms from `id` upward, stopping below
    /// `ancestor`. `None` (or a node that is not an ancestor) yields the
    /// full chain up to the root.
    pub fn transform_relative_to(&self, id: NodeId, ancestor: Option<NodeId>) -> Mat4 {
        let mut matrix = self.node(id).local;
        let mut current = self.parent(id);
        while let Some(node) = current {
            if Some(node) == ancestor {
                break;
            }
            matrix = self.node(node).local * matrix;
            current = self.parent(node);
        }
        matrix
    }
}
