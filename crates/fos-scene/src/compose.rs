//! Composed tree traversal
//!
//! One walker for every enumeration order the scene needs. Two policies
//! select how a node's children are found:
//!
//! - shadow descent: an element with a shadow root exposes the shadow
//!   root's children instead of its literal children
//! - slot projection: a slot with assigned nodes exposes those instead of
//!   its fallback children, and a literal child projected by some other
//!   slot is skipped where it literally sits
//!
//! The walker holds no borrow of the tree, so callers can write per-node
//! state (render indices) between steps.

use crate::{Node, NodeData, NodeId, SceneTree};

/// Traversal policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Composition {
    pub shadow_descent: bool,
    pub slot_projection: bool,
}

impl Composition {
    /// Literal children only
    pub const PLAIN: Composition = Composition {
        shadow_descent: false,
        slot_projection: false,
    };

    /// Shadow trees and slot projection resolved (the flat tree)
    pub const COMPOSED: Composition = Composition {
        shadow_descent: true,
        slot_projection: true,
    };
}

impl Default for Composition {
    fn default() -> Self {
        Self::COMPOSED
    }
}

/// Position within a slot's projected list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlotFrame {
    slot: NodeId,
    index: usize,
}

impl SlotFrame {
    fn projects(&self, tree: &SceneTree, node: NodeId) -> bool {
        tree.get(self.slot)
            .and_then(Node::as_slot)
            .is_some_and(|s| s.assigned().get(self.index) == Some(&node))
    }
}

/// Pre-order walker over the tree rooted at `root`
#[derive(Debug, Clone)]
pub struct ComposedWalker {
    root: NodeId,
    policy: Composition,
    current: Option<NodeId>,
    started: bool,
    frames: Vec<SlotFrame>,
}

impl ComposedWalker {
    pub fn new(root: NodeId, policy: Composition) -> Self {
        Self {
            root,
            policy,
            current: None,
            started: false,
            frames: Vec::new(),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn policy(&self) -> Composition {
        self.policy
    }

    /// Node the walker is positioned on
    #[inline]
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Number of slot projections the current node is nested in
    #[inline]
    pub fn projection_depth(&self) -> usize {
        self.frames.len()
    }

    /// Rewind to before the root
    pub fn reset(&mut self) {
        self.current = None;
        self.started = false;
        self.frames.clear();
    }

    /// Advance in pre-order. The first call yields the root.
    pub fn move_next(&mut self, tree: &SceneTree) -> Option<NodeId> {
        if !self.started {
            self.started = true;
            self.current = tree.contains(self.root).then_some(self.root);
            return self.current;
        }
        let current = self.current?;
        match self.first_child(tree, current) {
            Some(child) => {
                self.current = Some(child);
                self.current
            }
            None => self.advance_past(tree, current),
        }
    }

    /// Advance past the current node's subtree without visiting it
    pub fn skip_to_next_sibling(&mut self, tree: &SceneTree) -> Option<NodeId> {
        let current = self.current?;
        self.advance_past(tree, current)
    }

    fn advance_past(&mut self, tree: &SceneTree, node: NodeId) -> Option<NodeId> {
        let mut node = node;
        loop {
            if node == self.root {
                self.current = None;
                return None;
            }
            if let Some(next) = self.next_sibling(tree, node) {
                self.current = Some(next);
                return self.current;
            }
            match self.backtrack(tree, node) {
                Some(parent) => node = parent,
                None => {
                    self.current = None;
                    return None;
                }
            }
        }
    }

    fn first_child(&mut self, tree: &SceneTree, node: NodeId) -> Option<NodeId> {
        let n = tree.get(node)?;
        match &n.data {
            NodeData::Slot(slot) if self.policy.slot_projection && !slot.assigned.is_empty() => {
                self.frames.push(SlotFrame {
                    slot: node,
                    index: 0,
                });
                Some(slot.assigned[0])
            }
            NodeData::Element(el) if self.policy.shadow_descent && el.shadow_root.is_some() => {
                let shadow_root = el.shadow_root?;
                let first = tree.get(shadow_root)?.first_child;
                self.first_in_place(tree, first)
            }
            _ => self.first_in_place(tree, n.first_child),
        }
    }

    fn next_sibling(&mut self, tree: &SceneTree, node: NodeId) -> Option<NodeId> {
        if self.policy.slot_projection {
            if let Some(frame) = self.frames.last_mut() {
                if frame.projects(tree, node) {
                    let assigned = tree.get(frame.slot).and_then(Node::as_slot)?.assigned();
                    if frame.index + 1 < assigned.len() {
                        frame.index += 1;
                        return Some(assigned[frame.index]);
                    }
                    // Projection exhausted; backtrack pops to the slot
                    return None;
                }
            }
        }
        let next = tree.get(node)?.next_sibling;
        self.first_in_place(tree, next)
    }

    /// Composed parent while unwinding; pops the slot frame when leaving
    /// projected content
    fn backtrack(&mut self, tree: &SceneTree, node: NodeId) -> Option<NodeId> {
        if self.policy.slot_projection {
            if let Some(frame) = self.frames.last() {
                if frame.projects(tree, node) {
                    let slot = frame.slot;
                    self.frames.pop();
                    return Some(slot);
                }
            }
        }
        let parent = tree.get(node)?.parent?;
        if self.policy.shadow_descent {
            if let Some(shadow) = tree.get(parent)?.as_shadow_root() {
                return Some(shadow.host);
            }
        }
        Some(parent)
    }

    /// First node in the literal sibling run starting at `start` that is
    /// not projected somewhere else
    fn first_in_place(&self, tree: &SceneTree, start: Option<NodeId>) -> Option<NodeId> {
        let mut candidate = start;
        while let Some(id) = candidate {
            let node = tree.get(id)?;
            if !self.projected_elsewhere(node) {
                return Some(id);
            }
            candidate = node.next_sibling;
        }
        None
    }

    fn projected_elsewhere(&self, node: &Node) -> bool {
        if !self.policy.slot_projection {
            return false;
        }
        match node.assigned_slot {
            Some(slot) => self.frames.last().map(|f| f.slot) != Some(slot),
            None => false,
        }
    }
}

/// Iterator adapter over a [`ComposedWalker`]
pub struct Composed<'a> {
    tree: &'a SceneTree,
    walker: ComposedWalker,
}

impl Iterator for Composed<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.walker.move_next(self.tree)
    }
}

impl SceneTree {
    /// Walk the flat tree under `root`
    pub fn composed(&self, root: NodeId) -> Composed<'_> {
        self.walk(root, Composition::COMPOSED)
    }

    /// Walk under `root` with an explicit policy
    pub fn walk(&self, root: NodeId, policy: Composition) -> Composed<'_> {
        Composed {
            tree: self,
            walker: ComposedWalker::new(root, policy),
        }
    }
}
