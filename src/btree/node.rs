use crate::tuple::Rid;
use arrayvec::ArrayVec;

/// Upper bound on a node's fanout. `order` (checked at tree-creation
/// time) must stay within this so every node's keys/children fit in a
/// stack-resident `ArrayVec` instead of a heap allocation per node.
pub const MAX_FANOUT: usize = 256;

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub(super) enum NodeKind {
    Leaf {
        rids: ArrayVec<Rid, MAX_FANOUT>,
        /// Next leaf in key order, for range scans.
        next: Option<NodeId>,
    },
    Internal {
        /// `children.len() == keys.len() + 1`.
        children: ArrayVec<NodeId, { MAX_FANOUT + 1 }>,
    },
}

#[derive(Debug, Clone)]
pub(super) struct Node {
    pub keys: ArrayVec<i64, MAX_FANOUT>,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub fn new_leaf(parent: Option<NodeId>) -> Self {
        Node {
            keys: ArrayVec::new(),
            parent,
            kind: NodeKind::Leaf { rids: ArrayVec::new(), next: None },
        }
    }

    pub fn new_internal(parent: Option<NodeId>) -> Self {
        Node {
            keys: ArrayVec::new(),
            parent,
            kind: NodeKind::Internal { children: ArrayVec::new() },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn rids(&self) -> &ArrayVec<Rid, MAX_FANOUT> {
        match &self.kind {
            NodeKind::Leaf { rids, .. } => rids,
            NodeKind::Internal { .. } => panic!("rids() called on an internal node"),
        }
    }

    pub fn rids_mut(&mut self) -> &mut ArrayVec<Rid, MAX_FANOUT> {
        match &mut self.kind {
            NodeKind::Leaf { rids, .. } => rids,
            NodeKind::Internal { .. } => panic!("rids_mut() called on an internal node"),
        }
    }

    pub fn next_leaf(&self) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Leaf { next, .. } => *next,
            NodeKind::Internal { .. } => panic!("next_leaf() called on an internal node"),
        }
    }

    pub fn set_next_leaf(&mut self, next: Option<NodeId>) {
        match &mut self.kind {
            NodeKind::Leaf { next: slot, .. } => *slot = next,
            NodeKind::Internal { .. } => panic!("set_next_leaf() called on an internal node"),
        }
    }

    pub fn children(&self) -> &ArrayVec<NodeId, { MAX_FANOUT + 1 }> {
        match &self.kind {
            NodeKind::Internal { children } => children,
            NodeKind::Leaf { .. } => panic!("children() called on a leaf node"),
        }
    }

    pub fn children_mut(&mut self) -> &mut ArrayVec<NodeId, { MAX_FANOUT + 1 }> {
        match &mut self.kind {
            NodeKind::Internal { children } => children,
            NodeKind::Leaf { .. } => panic!("children_mut() called on a leaf node"),
        }
    }
}
