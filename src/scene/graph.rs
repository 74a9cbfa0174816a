//! Node arena standing in for the render substrate: the composer places
//! nodes here, a renderer reads world transforms and visibility back out.

use glam::{Mat4, Quat, Vec3};

use super::{
    assets::{Material, Model},
    error::SceneError,
    mesh::CurtainMesh,
};

/// Generational handle into a [`SceneGraph`]. Stale handles never alias a
/// reused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Group,
    Model(Model),
    Curtain { mesh: CurtainMesh, material: Material },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub transform: Transform,
    pub visible: bool,
    pub content: NodeContent,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Where the viewer is, as reported by the device tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl CameraPose {
    /// World point at `offset` in camera space.
    pub fn project(&self, offset: Vec3) -> Vec3 {
        self.orientation * offset + self.position
    }
}

#[derive(Debug)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    anchor: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a graph holding only the persistent world anchor.
    pub fn new() -> Self {
        let mut graph = Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            anchor: NodeId {
                index: 0,
                generation: 0,
            },
        };
        graph.anchor = graph.spawn(NodeContent::Group);
        graph
    }

    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    /// Live nodes, anchor included.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.get_mut(id).ok_or(SceneError::UnknownNode(id))
    }

    /// Adds an unparented node.
    pub fn spawn(&mut self, content: NodeContent) -> NodeId {
        let node = Node {
            parent: None,
            children: Vec::new(),
            transform: Transform::default(),
            visible: true,
            content,
        };
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Spawns `content` directly under `parent`.
    pub fn spawn_child(
        &mut self,
        parent: NodeId,
        content: NodeContent,
        transform: Transform,
    ) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        let id = self.spawn(content);
        self.node_mut(id)?.transform = transform;
        self.attach(id, parent)?;
        Ok(id)
    }

    /// Re-parents `child` under `parent`, unlinking it from any previous
    /// parent first. Attaching a node under its own subtree is refused.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), SceneError> {
        if !self.contains(child) {
            return Err(SceneError::UnknownNode(child));
        }
        if !self.contains(parent) || self.is_ancestor(child, parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Unlinks `node` from its parent; the subtree stays alive.
    pub fn detach(&mut self, node: NodeId) -> Result<(), SceneError> {
        let parent = self.node_mut(node)?.parent.take();
        if let Some(parent) = parent
            && let Some(parent_node) = self.get_mut(parent)
        {
            parent_node.children.retain(|&c| c != node);
        }
        Ok(())
    }

    /// Detaches `node` and frees its whole subtree. Returns how many nodes
    /// were freed.
    pub fn remove(&mut self, node: NodeId) -> Result<usize, SceneError> {
        self.detach(node)?;
        let mut stack = vec![node];
        let mut freed = 0;
        while let Some(id) = stack.pop() {
            let slot = &mut self.slots[id.index as usize];
            if let Some(removed) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                self.live -= 1;
                freed += 1;
                stack.extend(removed.children);
            }
        }
        Ok(freed)
    }

    pub fn set_visible(&mut self, node: NodeId, visible: bool) -> Result<(), SceneError> {
        self.node_mut(node)?.visible = visible;
        Ok(())
    }

    pub fn set_local_transform(&mut self, node: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.node_mut(node)?.transform = transform;
        Ok(())
    }

    /// Nodes in the subtree rooted at `node`, itself included.
    pub fn subtree_len(&self, node: NodeId) -> usize {
        let Some(root) = self.get(node) else {
            return 0;
        };
        1 + root
            .children
            .iter()
            .map(|&child| self.subtree_len(child))
            .sum::<usize>()
    }

    pub fn world_matrix(&self, node: NodeId) -> Option<Mat4> {
        let current = self.get(node)?;
        let local = current.transform.matrix();
        match current.parent {
            Some(parent) => Some(self.world_matrix(parent)? * local),
            None => Some(local),
        }
    }

    /// Visible only if the node and every ancestor are visible.
    pub fn is_rendered(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            match self.get(id) {
                Some(n) if n.visible => cursor = n.parent,
                _ => return false,
            }
        }
        true
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.get(id).and_then(|n| n.parent);
        }
        false
    }
}
