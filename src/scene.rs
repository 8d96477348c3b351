//! Scene graph model shared with the rendering collaborator.
//!
//! The renderer draws whatever this tree describes: enabled nodes, back to front, at positions
//! relative to their parent. The core only creates and destroys nodes, moves them, toggles them
//! and reorders siblings. Nodes are addressed by generation-checked [`NodeId`]s, so operations on a
//! node that has since been destroyed are silently ignored.

use cairn_config::Color;
use slotmap::{new_key_type, SlotMap};

use crate::layer::LayerId;
use crate::protocol::SurfaceId;
use crate::utils::{Point, Size};
use crate::window::popup::PopupId;
use crate::window::WindowId;

new_key_type! {
    pub struct NodeId;
}

/// Stacking tiers directly under the root, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Background,
    Bottom,
    Tiled,
    Top,
    Overlay,
    Popups,
}

impl Tier {
    pub const ALL: [Tier; 6] = [
        Tier::Background,
        Tier::Bottom,
        Tier::Tiled,
        Tier::Top,
        Tier::Overlay,
        Tier::Popups,
    ];

    fn idx(self) -> usize {
        self as usize
    }
}

/// Entity a node belongs to, for reverse lookup from hit-test results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeOwner {
    Window(WindowId),
    Popup(PopupId),
    Layer(LayerId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Grouping node without content.
    Tree,
    /// Solid color rectangle; never receives input.
    Rect { size: Size<i32>, color: Color },
    /// Client surface content.
    Buffer { surface: SurfaceId, size: Size<i32> },
}

#[derive(Debug)]
pub struct Node {
    parent: Option<NodeId>,
    /// Bottom to top.
    children: Vec<NodeId>,
    position: Point<i32>,
    enabled: bool,
    kind: NodeKind,
    owner: Option<NodeOwner>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn position(&self) -> Point<i32> {
        self.position
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn owner(&self) -> Option<NodeOwner> {
        self.owner
    }
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    #[error("parent node no longer exists")]
    ParentGone,
    #[error("scene node limit of {0} reached")]
    OutOfNodes(usize),
}

/// Result of a hit test: the topmost buffer under the point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    pub node: NodeId,
    pub surface: SurfaceId,
    /// Point relative to the buffer origin.
    pub local: Point<f64>,
}

#[derive(Debug)]
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    tiers: [NodeId; 6],
    node_limit: Option<usize>,
}

impl Scene {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            parent: None,
            children: Vec::new(),
            position: Point::default(),
            enabled: true,
            kind: NodeKind::Tree,
            owner: None,
        });

        let tiers = Tier::ALL.map(|_| {
            let tier = nodes.insert(Node {
                parent: Some(root),
                children: Vec::new(),
                position: Point::default(),
                enabled: true,
                kind: NodeKind::Tree,
                owner: None,
            });
            nodes[root].children.push(tier);
            tier
        });

        Self {
            nodes,
            root,
            tiers,
            node_limit: None,
        }
    }

    /// Scene that refuses to grow beyond `limit` nodes, including the root and tiers.
    pub fn with_node_limit(limit: usize) -> Self {
        let mut scene = Self::new();
        scene.node_limit = Some(limit);
        scene
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tier(&self, tier: Tier) -> NodeId {
        self.tiers[tier.idx()]
    }

    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::ParentGone);
        }
        if let Some(limit) = self.node_limit {
            if self.nodes.len() >= limit {
                return Err(SceneError::OutOfNodes(limit));
            }
        }

        let node = self.nodes.insert(Node {
            parent: Some(parent),
            children: Vec::new(),
            position: Point::default(),
            enabled: true,
            kind,
            owner: None,
        });
        self.nodes[parent].children.push(node);
        Ok(node)
    }

    pub fn create_tree(&mut self, parent: NodeId) -> Result<NodeId, SceneError> {
        self.insert(parent, NodeKind::Tree)
    }

    pub fn create_rect(
        &mut self,
        parent: NodeId,
        size: Size<i32>,
        color: Color,
    ) -> Result<NodeId, SceneError> {
        self.insert(parent, NodeKind::Rect { size, color })
    }

    pub fn create_buffer(
        &mut self,
        parent: NodeId,
        surface: SurfaceId,
        size: Size<i32>,
    ) -> Result<NodeId, SceneError> {
        self.insert(parent, NodeKind::Buffer { surface, size })
    }

    /// Destroys the node and its whole subtree. Destroying a missing node does nothing.
    pub fn destroy(&mut self, node: NodeId) {
        if node == self.root || self.tiers.contains(&node) {
            return;
        }

        let Some(removed) = self.nodes.remove(node) else {
            return;
        };

        if let Some(parent) = removed.parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|c| *c != node);
        }

        let mut stack = removed.children;
        while let Some(child) = stack.pop() {
            if let Some(child) = self.nodes.remove(child) {
                stack.extend(child.children);
            }
        }
    }

    pub fn set_position(&mut self, node: NodeId, position: Point<i32>) {
        if let Some(node) = self.nodes.get_mut(node) {
            node.position = position;
        }
    }

    pub fn set_enabled(&mut self, node: NodeId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(node) {
            node.enabled = enabled;
        }
    }

    pub fn set_owner(&mut self, node: NodeId, owner: NodeOwner) {
        if let Some(node) = self.nodes.get_mut(node) {
            node.owner = Some(owner);
        }
    }

    pub fn owner(&self, node: NodeId) -> Option<NodeOwner> {
        self.nodes.get(node)?.owner
    }

    /// Updates size and color of a rect node.
    pub fn set_rect(&mut self, node: NodeId, new_size: Size<i32>, new_color: Color) {
        if let Some(Node {
            kind: NodeKind::Rect { size, color },
            ..
        }) = self.nodes.get_mut(node)
        {
            *size = new_size;
            *color = new_color;
        }
    }

    pub fn set_buffer_size(&mut self, node: NodeId, new_size: Size<i32>) {
        if let Some(Node {
            kind: NodeKind::Buffer { size, .. },
            ..
        }) = self.nodes.get_mut(node)
        {
            *size = new_size;
        }
    }

    /// Moves the node above all its siblings.
    pub fn raise_to_top(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return;
        };
        let children = &mut self.nodes[parent].children;
        children.retain(|c| *c != node);
        children.push(node);
    }

    /// Iterates from the node itself up to the root.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = self.nodes.contains_key(node).then_some(node);
        std::iter::from_fn(move || {
            let current = next?;
            next = self.nodes.get(current).and_then(|n| n.parent);
            Some(current)
        })
    }

    /// Position of the node in global coordinates.
    pub fn absolute_position(&self, node: NodeId) -> Option<Point<i32>> {
        if !self.nodes.contains_key(node) {
            return None;
        }
        Some(
            self.ancestors(node)
                .fold(Point::default(), |acc, n| acc + self.nodes[n].position),
        )
    }

    /// Whether the node and all its ancestors are enabled.
    pub fn is_visible(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node) && self.ancestors(node).all(|n| self.nodes[n].enabled)
    }

    /// Finds the topmost enabled buffer under `point` within the subtree.
    ///
    /// Rect nodes are decoration and never hit.
    pub fn hit_test(&self, subtree: NodeId, point: Point<f64>) -> Option<SceneHit> {
        let _span = tracy_client::span!("Scene::hit_test");

        if !self.is_visible(subtree) {
            return None;
        }
        let parent_origin = match self.nodes[subtree].parent {
            Some(parent) => self.absolute_position(parent)?,
            None => Point::default(),
        };
        self.hit_test_node(subtree, parent_origin, point)
    }

    fn hit_test_node(
        &self,
        node_id: NodeId,
        parent_origin: Point<i32>,
        point: Point<f64>,
    ) -> Option<SceneHit> {
        let node = &self.nodes[node_id];
        if !node.enabled {
            return None;
        }

        let origin = parent_origin + node.position;
        match node.kind {
            NodeKind::Tree => node
                .children
                .iter()
                .rev()
                .find_map(|child| self.hit_test_node(*child, origin, point)),
            NodeKind::Rect { .. } => None,
            NodeKind::Buffer { surface, size } => {
                let local = point - origin.to_f64();
                let size = size.to_f64();
                let inside =
                    0. <= local.x && local.x < size.w && 0. <= local.y && local.y < size.h;
                inside.then_some(SceneHit {
                    node: node_id,
                    surface,
                    local,
                })
            }
        }
    }
}
