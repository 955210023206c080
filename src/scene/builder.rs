//! Assembly of the flat node records into an owned, validated scene tree.
//!
//! Construction is two-phase: the chunk grammar inserts records into an
//! id-keyed arena with unresolved child-id lists, and [`SceneAssembly::build`]
//! validates the structure (unique root, arity per node kind, no cycles, no
//! disconnected nodes) before resolving the ids into owned parent-to-child
//! edges. The final tree is acyclic by construction.

use std::collections::{HashMap, HashSet};

use super::{GroupNode, Layer, Scene, SceneNode, ShapeNode, Transform, TransformNode};
use crate::util::{Error, Result};

/// A decoded nTRN chunk.
pub(crate) struct TransformRecord {
    pub id: i32,
    pub name: String,
    pub hidden: bool,
    pub child: i32,
    pub layer: i32,
    pub transform: Transform,
}

/// A decoded nGRP chunk.
pub(crate) struct GroupRecord {
    pub id: i32,
    pub name: String,
    pub hidden: bool,
    pub children: Vec<i32>,
}

/// A decoded nSHP chunk. Model indices are validated against the model list
/// by the chunk grammar before insertion.
pub(crate) struct ShapeRecord {
    pub id: i32,
    pub name: String,
    pub hidden: bool,
    pub models: Vec<usize>,
}

/// A node whose child ids are not yet resolved.
enum Pending {
    Transform(TransformNode),
    Group(GroupNode),
    Shape(ShapeNode),
}

/// The arena the chunk grammar fills while walking MAIN's children.
#[derive(Default)]
pub(crate) struct SceneAssembly {
    nodes: HashMap<i32, Pending>,
    /// Unresolved child ids per parent id. Shapes never have an entry.
    children: HashMap<i32, Vec<i32>>,
    /// Layer id per transform node id (including the -1 root sentinel).
    node_layers: HashMap<i32, i32>,
    layers: HashMap<i32, Layer>,
}

impl SceneAssembly {
    fn insert(&mut self, id: i32, node: Pending) -> Result<()> {
        if self.nodes.insert(id, node).is_some() {
            return Err(Error::DuplicateNodeId(id));
        }
        Ok(())
    }

    pub fn insert_transform(&mut self, rec: TransformRecord) -> Result<()> {
        self.insert(
            rec.id,
            Pending::Transform(TransformNode {
                name: rec.name,
                hidden: rec.hidden,
                layer: (rec.layer != -1).then_some(rec.layer),
                transform: rec.transform,
                child: None,
            }),
        )?;
        self.children.insert(rec.id, vec![rec.child]);
        self.node_layers.insert(rec.id, rec.layer);
        Ok(())
    }

    pub fn insert_group(&mut self, rec: GroupRecord) -> Result<()> {
        self.insert(
            rec.id,
            Pending::Group(GroupNode {
                name: rec.name,
                hidden: rec.hidden,
                children: Vec::new(),
            }),
        )?;
        self.children.insert(rec.id, rec.children);
        Ok(())
    }

    pub fn insert_shape(&mut self, rec: ShapeRecord) -> Result<()> {
        self.insert(
            rec.id,
            Pending::Shape(ShapeNode {
                name: rec.name,
                hidden: rec.hidden,
                models: rec.models,
            }),
        )
    }

    pub fn insert_layer(&mut self, layer: Layer) -> Result<()> {
        let id = layer.index;
        if self.layers.insert(id, layer).is_some() {
            return Err(Error::DuplicateLayerId(id));
        }
        Ok(())
    }

    /// Validate the arena and resolve it into an owned [`Scene`].
    pub fn build(mut self) -> Result<Scene> {
        let root_id = self.find_root()?;
        self.validate_links()?;
        self.validate_reachability(root_id)?;

        let mut layers: Vec<Layer> = self.layers.into_values().collect();
        layers.sort_by_key(|l| l.index);

        let root = match Self::take_tree(&mut self.nodes, &mut self.children, root_id)? {
            SceneNode::Transform(t) => t,
            // find_root only returns transform ids.
            _ => return Err(Error::NoRoot),
        };
        Ok(Scene { layers, root })
    }

    /// The unique transform node associated with layer id -1.
    fn find_root(&self) -> Result<i32> {
        let mut root = None;
        for (&id, node) in &self.nodes {
            if !matches!(node, Pending::Transform(_)) {
                continue;
            }
            if self.node_layers.get(&id) != Some(&-1) {
                continue;
            }
            if root.is_some() {
                return Err(Error::TwoRoots);
            }
            root = Some(id);
        }
        root.ok_or(Error::NoRoot)
    }

    /// Check every recorded child id resolves to a node, every referenced
    /// layer exists, and each parent kind accepts its child count.
    fn validate_links(&self) -> Result<()> {
        for (&parent, kids) in &self.children {
            for &child in kids {
                if !self.nodes.contains_key(&child) {
                    return Err(Error::MissingNode { parent, child });
                }
            }
            match self.nodes.get(&parent) {
                Some(Pending::Transform(_)) if kids.len() > 1 => {
                    return Err(Error::TransformArity(parent))
                }
                Some(Pending::Shape(_)) if !kids.is_empty() => {
                    return Err(Error::ShapeArity(parent))
                }
                _ => {}
            }
        }
        for (&node, &layer) in &self.node_layers {
            if layer != -1 && !self.layers.contains_key(&layer) {
                return Err(Error::MissingLayer { node, layer });
            }
        }
        Ok(())
    }

    /// Depth-first walk from the root: a revisited node is a cycle, and every
    /// parsed node must be reachable.
    fn validate_reachability(&self, root_id: i32) -> Result<()> {
        let mut visited = HashSet::new();
        let mut stack = vec![root_id];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                return Err(Error::SceneCycle(id));
            }
            if let Some(kids) = self.children.get(&id) {
                stack.extend(kids.iter().copied());
            }
        }
        if visited.len() != self.nodes.len() {
            return Err(Error::DisconnectedNodes {
                total: self.nodes.len(),
                reachable: visited.len(),
            });
        }
        Ok(())
    }

    /// Move the subtree rooted at `id` out of the arena. Validation has
    /// already established that every id resolves exactly once.
    fn take_tree(
        nodes: &mut HashMap<i32, Pending>,
        children: &mut HashMap<i32, Vec<i32>>,
        id: i32,
    ) -> Result<SceneNode> {
        let pending = nodes.remove(&id).ok_or(Error::MissingNode {
            parent: id,
            child: id,
        })?;
        let kids = children.remove(&id).unwrap_or_default();
        Ok(match pending {
            Pending::Transform(mut node) => {
                if let Some(&child) = kids.first() {
                    node.child = Some(Box::new(Self::take_tree(nodes, children, child)?));
                }
                SceneNode::Transform(node)
            }
            Pending::Group(mut node) => {
                node.children = kids
                    .into_iter()
                    .map(|c| Self::take_tree(nodes, children, c))
                    .collect::<Result<_>>()?;
                SceneNode::Group(node)
            }
            Pending::Shape(node) => SceneNode::Shape(node),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(id: i32, child: i32, layer: i32) -> TransformRecord {
        TransformRecord {
            id,
            name: format!("t{id}"),
            hidden: false,
            child,
            layer,
            transform: Transform::default(),
        }
    }

    fn group(id: i32, children: Vec<i32>) -> GroupRecord {
        GroupRecord {
            id,
            name: format!("g{id}"),
            hidden: false,
            children,
        }
    }

    fn shape(id: i32) -> ShapeRecord {
        ShapeRecord {
            id,
            name: format!("s{id}"),
            hidden: false,
            models: vec![0],
        }
    }

    #[test]
    fn test_builds_nested_tree() {
        let mut a = SceneAssembly::default();
        a.insert_transform(transform(0, 1, -1)).unwrap();
        a.insert_group(group(1, vec![2, 4])).unwrap();
        a.insert_transform(transform(2, 3, 0)).unwrap();
        a.insert_shape(shape(3)).unwrap();
        a.insert_transform(transform(4, 5, 0)).unwrap();
        a.insert_shape(shape(5)).unwrap();
        a.insert_layer(Layer {
            index: 0,
            name: "base".into(),
            hidden: false,
        })
        .unwrap();

        let scene = a.build().unwrap();
        assert_eq!(scene.layers.len(), 1);
        assert_eq!(scene.root.name, "t0");
        let SceneNode::Group(g) = scene.root.child.as_deref().unwrap() else {
            panic!("root child should be the group");
        };
        assert_eq!(g.children.len(), 2);
        assert_eq!(g.children[0].name(), "t2");
    }

    #[test]
    fn test_layers_sorted_by_index() {
        let mut a = SceneAssembly::default();
        a.insert_transform(transform(0, 1, -1)).unwrap();
        a.insert_shape(shape(1)).unwrap();
        for index in [7, 0, 3] {
            a.insert_layer(Layer {
                index,
                name: String::new(),
                hidden: false,
            })
            .unwrap();
        }
        let scene = a.build().unwrap();
        let indices: Vec<i32> = scene.layers.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 3, 7]);
    }

    #[test]
    fn test_two_roots() {
        let mut a = SceneAssembly::default();
        a.insert_transform(transform(0, 2, -1)).unwrap();
        a.insert_transform(transform(1, 2, -1)).unwrap();
        a.insert_shape(shape(2)).unwrap();
        assert!(matches!(a.build(), Err(Error::TwoRoots)));
    }

    #[test]
    fn test_no_root() {
        let mut a = SceneAssembly::default();
        a.insert_transform(transform(0, 1, 5)).unwrap();
        a.insert_shape(shape(1)).unwrap();
        assert!(matches!(a.build(), Err(Error::NoRoot)));
    }

    #[test]
    fn test_missing_child() {
        let mut a = SceneAssembly::default();
        a.insert_transform(transform(0, 9, -1)).unwrap();
        assert!(matches!(
            a.build(),
            Err(Error::MissingNode { parent: 0, child: 9 })
        ));
    }

    #[test]
    fn test_cycle() {
        let mut a = SceneAssembly::default();
        a.insert_transform(transform(0, 1, -1)).unwrap();
        a.insert_group(group(1, vec![0])).unwrap();
        assert!(matches!(a.build(), Err(Error::SceneCycle(_))));
    }

    #[test]
    fn test_shared_child_is_a_cycle() {
        let mut a = SceneAssembly::default();
        a.insert_transform(transform(0, 1, -1)).unwrap();
        a.insert_group(group(1, vec![2, 2])).unwrap();
        a.insert_shape(shape(2)).unwrap();
        assert!(matches!(a.build(), Err(Error::SceneCycle(2))));
    }

    #[test]
    fn test_disconnected_node() {
        let mut a = SceneAssembly::default();
        a.insert_transform(transform(0, 1, -1)).unwrap();
        a.insert_shape(shape(1)).unwrap();
        a.insert_shape(shape(7)).unwrap();
        assert!(matches!(
            a.build(),
            Err(Error::DisconnectedNodes {
                total: 3,
                reachable: 2
            })
        ));
    }

    #[test]
    fn test_missing_layer_reference() {
        let mut a = SceneAssembly::default();
        a.insert_transform(transform(0, 1, -1)).unwrap();
        a.insert_transform(transform(1, 2, 4)).unwrap();
        a.insert_shape(shape(2)).unwrap();
        assert!(matches!(
            a.build(),
            Err(Error::MissingLayer { node: 1, layer: 4 })
        ));
    }

    #[test]
    fn test_duplicate_node_id() {
        let mut a = SceneAssembly::default();
        a.insert_shape(shape(3)).unwrap();
        assert!(matches!(
            a.insert_transform(transform(3, 0, -1)),
            Err(Error::DuplicateNodeId(3))
        ));
    }
}
