//! Scene graph interface and its arena implementation.

use std::collections::HashMap;

use glam::Mat4;

use crate::error::{SceneError, SceneResult};
use crate::node::{Geometry, Node, NodeId};
use crate::selector::NodeSelector;

/// What the anchor core needs from a transform hierarchy.
///
/// Implementors own the nodes. Callers only ever hold [`NodeId`]s.
pub trait SceneGraph {
    /// Returns the node, if it exists.
    fn node(&self, id: NodeId) -> Option<&Node>;

    /// Returns the children of a node in insertion order.
    fn children(&self, id: NodeId) -> &[NodeId];

    /// Returns the node's world matrix (parent chain composed).
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for unknown ids.
    fn world_matrix(&self, id: NodeId) -> SceneResult<Mat4>;

    /// Overwrites the node's world matrix, solving for its local matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown or its parent chain
    /// cannot be inverted.
    fn set_world_matrix(&mut self, id: NodeId, world: Mat4) -> SceneResult<()>;

    /// Object attached to `owner` under a named slot (e.g. `"mesh"`).
    fn object(&self, owner: NodeId, slot: &str) -> Option<NodeId>;

    /// The viewing camera node.
    fn viewer(&self) -> Option<NodeId>;

    /// True while the scene is in immersive viewing mode.
    fn is_immersive(&self) -> bool;

    /// Local matrix of a node.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for unknown ids.
    fn local_matrix(&self, id: NodeId) -> SceneResult<Mat4> {
        self.node(id).map(|n| n.local).ok_or(SceneError::NodeNotFound(id))
    }

    /// Own visibility flag; unknown nodes are not visible.
    fn is_visible(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.visible)
    }

    /// Renderable geometry of a node.
    fn geometry(&self, id: NodeId) -> Option<&Geometry> {
        self.node(id).and_then(|n| n.geometry.as_ref())
    }

    /// First descendant of `root` (depth-first, root excluded) matching
    /// `selector`.
    fn find_in_subtree(&self, root: NodeId, selector: &NodeSelector) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.node(id).is_some_and(|n| selector.matches(n)) {
                return Some(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        None
    }
}

/// Arena storage for one node plus its hierarchy links.
#[derive(Clone, Debug)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory scene graph.
#[derive(Debug)]
pub struct Scene {
    /// Nodes indexed by ID.
    slots: HashMap<NodeId, Slot>,
    /// Root node IDs.
    roots: Vec<NodeId>,
    /// Named object slots per owner.
    objects: HashMap<(NodeId, String), NodeId>,
    /// Viewing camera.
    viewer: Option<NodeId>,
    /// Immersive viewing mode flag.
    immersive: bool,
    /// ID counter for generating unique IDs.
    next_id: u64,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: HashMap::with_capacity(64),
            roots: Vec::with_capacity(8),
            objects: HashMap::new(),
            viewer: None,
            immersive: false,
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Adds a root node.
    pub fn add_root(&mut self, node: Node) -> NodeId {
        let id = self.allocate_id();
        self.slots.insert(id, Slot { node, parent: None, children: Vec::new() });
        self.roots.push(id);
        id
    }

    /// Adds a child under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if the parent does not exist.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> SceneResult<NodeId> {
        if !self.slots.contains_key(&parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let id = self.allocate_id();
        self.slots.insert(id, Slot { node, parent: Some(parent), children: Vec::new() });
        if let Some(slot) = self.slots.get_mut(&parent) {
            slot.children.push(id);
        }
        Ok(id)
    }

    /// Removes a node and its whole subtree.
    ///
    /// Object slots pointing into the removed subtree are cleared, as is
    /// the viewer if it was removed.
    pub fn remove(&mut self, id: NodeId) {
        let Some(slot) = self.slots.remove(&id) else {
            return;
        };
        for child in slot.children {
            self.remove(child);
        }
        if let Some(parent) = slot.parent {
            if let Some(siblings) = self.slots.get_mut(&parent) {
                siblings.children.retain(|&c| c != id);
            }
        }
        self.roots.retain(|&r| r != id);
        self.objects.retain(|(owner, _), object| *owner != id && *object != id);
        if self.viewer == Some(id) {
            self.viewer = None;
        }
        tracing::trace!("Removed {}", id);
    }

    /// Mutable access to a node.
    #[must_use]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(&id).map(|s| &mut s.node)
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(&id).and_then(|s| s.parent)
    }

    /// Root node IDs.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if the scene has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Sets a node's visibility flag.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for unknown ids.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> SceneResult<()> {
        let node = self.node_mut(id).ok_or(SceneError::NodeNotFound(id))?;
        node.visible = visible;
        Ok(())
    }

    /// Sets a node's local matrix.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] for unknown ids.
    pub fn set_local_matrix(&mut self, id: NodeId, local: Mat4) -> SceneResult<()> {
        let node = self.node_mut(id).ok_or(SceneError::NodeNotFound(id))?;
        node.local = local;
        Ok(())
    }

    /// Attaches (or with `None`, detaches) an object under a named slot.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NodeNotFound`] if the owner or object is unknown.
    pub fn set_object(&mut self, owner: NodeId, slot: &str, object: Option<NodeId>) -> SceneResult<()> {
        if !self.slots.contains_key(&owner) {
            return Err(SceneError::NodeNotFound(owner));
        }
        match object {
            Some(object) if !self.slots.contains_key(&object) => Err(SceneError::NodeNotFound(object)),
            Some(object) => {
                self.objects.insert((owner, slot.to_string()), object);
                Ok(())
            }
            None => {
                self.objects.remove(&(owner, slot.to_string()));
                Ok(())
            }
        }
    }

    /// Sets the viewing camera.
    pub fn set_viewer(&mut self, viewer: Option<NodeId>) {
        self.viewer = viewer;
    }

    /// Enters or leaves immersive viewing mode.
    pub fn set_immersive(&mut self, immersive: bool) {
        self.immersive = immersive;
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph for Scene {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(&id).map(|s| &s.node)
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.slots.get(&id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    fn world_matrix(&self, id: NodeId) -> SceneResult<Mat4> {
        let mut slot = self.slots.get(&id).ok_or(SceneError::NodeNotFound(id))?;
        let mut world = slot.node.local;
        while let Some(parent) = slot.parent {
            slot = self.slots.get(&parent).ok_or(SceneError::NodeNotFound(parent))?;
            world = slot.node.local * world;
        }
        Ok(world)
    }

    fn set_world_matrix(&mut self, id: NodeId, world: Mat4) -> SceneResult<()> {
        let parent = self.slots.get(&id).ok_or(SceneError::NodeNotFound(id))?.parent;
        let local = match parent {
            Some(parent) => {
                let parent_world = self.world_matrix(parent)?;
                if parent_world.determinant().abs() <= f32::EPSILON {
                    return Err(SceneError::NonInvertibleParent(id));
                }
                parent_world.inverse() * world
            }
            None => world,
        };
        self.set_local_matrix(id, local)
    }

    fn object(&self, owner: NodeId, slot: &str) -> Option<NodeId> {
        self.objects.get(&(owner, slot.to_string())).copied()
    }

    fn viewer(&self) -> Option<NodeId> {
        self.viewer
    }

    fn is_immersive(&self) -> bool {
        self.immersive
    }
}
