//! Scene graph types.
//!
//! A scene is a tree of transform, group and shape nodes. The file stores
//! nodes flat, keyed by numeric id; [`builder`] resolves those ids into the
//! owned tree below. The node kinds are a closed sum so every consumer
//! matches exhaustively instead of downcasting.

pub(crate) mod builder;

use glam::IVec3;

use crate::util::Rotation;

/// An editor layer. Nodes reference layers by index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    pub index: i32,
    pub name: String,
    pub hidden: bool,
}

/// One orientation + translation pair, the single frame a transform node
/// carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transform {
    pub rotation: Rotation,
    pub translation: IVec3,
}

/// A transform node: places its single child in the parent's frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformNode {
    pub name: String,
    pub hidden: bool,
    /// The layer this node sits on; `None` for the root's -1 sentinel.
    pub layer: Option<i32>,
    pub transform: Transform,
    pub child: Option<Box<SceneNode>>,
}

/// A group node: an ordered list of children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupNode {
    pub name: String,
    pub hidden: bool,
    pub children: Vec<SceneNode>,
}

/// A shape node: a leaf referencing models by index into
/// [`crate::Document::models`]. Well-formed files carry exactly one model
/// per shape, but the decoder does not assume it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeNode {
    pub name: String,
    pub hidden: bool,
    pub models: Vec<usize>,
}

/// Any node in the scene graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneNode {
    Transform(TransformNode),
    Group(GroupNode),
    Shape(ShapeNode),
}

impl SceneNode {
    /// The node's display name.
    pub fn name(&self) -> &str {
        match self {
            SceneNode::Transform(n) => &n.name,
            SceneNode::Group(n) => &n.name,
            SceneNode::Shape(n) => &n.name,
        }
    }

    /// Total number of nodes in this subtree, self included.
    #[allow(clippy::len_without_is_empty)] // a subtree always has at least itself
    pub fn len(&self) -> usize {
        match self {
            SceneNode::Transform(n) => 1 + n.child.as_deref().map_or(0, SceneNode::len),
            SceneNode::Group(n) => 1 + n.children.iter().map(SceneNode::len).sum::<usize>(),
            SceneNode::Shape(_) => 1,
        }
    }

    /// First shape in depth-first order, if any.
    pub fn first_shape(&self) -> Option<&ShapeNode> {
        match self {
            SceneNode::Transform(n) => n.child.as_deref().and_then(SceneNode::first_shape),
            SceneNode::Group(n) => n.children.iter().find_map(SceneNode::first_shape),
            SceneNode::Shape(n) => Some(n),
        }
    }
}

/// The validated scene: layers sorted by index and the unique root transform
/// (the one associated with layer id -1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    pub layers: Vec<Layer>,
    pub root: TransformNode,
}
