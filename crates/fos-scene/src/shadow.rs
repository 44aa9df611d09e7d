//! Shadow trees and slots
//!
//! A shadow root is owned by its host element and is never part of the
//! host's literal child list. Slots project externally assigned nodes in
//! place of their own (fallback) children.

use crate::{MutationRecord, Node, NodeData, NodeId, SceneError, SceneResult, SceneTree};

/// Shadow root mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

/// Shadow root initialization options
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowRootInit {
    pub mode: ShadowRootMode,
    /// Focus requests on the host go to the first focusable shadow node
    pub delegates_focus: bool,
}

impl SceneTree {
    /// Attach a shadow root to an element.
    ///
    /// The shadow root joins the host's tree immediately.
    pub fn attach_shadow(&mut self, host: NodeId, init: ShadowRootInit) -> SceneResult<NodeId> {
        let host_node = self.node(host)?;
        let tree = host_node.tree;
        match &host_node.data {
            NodeData::Element(e) if e.shadow_root.is_some() => {
                return Err(SceneError::ShadowAlreadyAttached(host));
            }
            NodeData::Element(_) => {}
            _ => return Err(SceneError::ShadowNotSupported(host)),
        }

        let mut shadow = Node::shadow_root(host, init.mode, init.delegates_focus);
        shadow.tree = tree;
        let shadow_root = self.insert_node(shadow);
        if let Some(NodeData::Element(e)) = self.get_mut(host).map(|n| &mut n.data) {
            e.shadow_root = Some(shadow_root);
        }
        tracing::trace!(?host, ?shadow_root, "shadow root attached");
        self.record(MutationRecord::shadow_attached(host, shadow_root));
        self.touch();
        Ok(shadow_root)
    }

    /// Open shadow root of `host`; closed roots are hidden
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        let shadow_root = self.shadow_root_of(host)?;
        let data = self.get(shadow_root)?.as_shadow_root()?;
        (data.mode == ShadowRootMode::Open).then_some(shadow_root)
    }

    /// Shadow root of `host` regardless of mode
    pub fn shadow_root_of(&self, host: NodeId) -> Option<NodeId> {
        self.get(host)?.as_element()?.shadow_root
    }

    /// Host element of a shadow root
    pub fn shadow_host(&self, shadow_root: NodeId) -> Option<NodeId> {
        self.get(shadow_root)?.as_shadow_root().map(|s| s.host)
    }

    /// Replace the projected content of `slot`.
    ///
    /// Nodes previously projected by `slot` but absent from `nodes` lose
    /// their assignment; nodes projected by another slot move here.
    /// Parentless nodes join the slot's tree while projected. A node under
    /// a parent in another tree, or one that composes above the slot, is
    /// rejected.
    pub fn assign_slot(&mut self, slot: NodeId, nodes: &[NodeId]) -> SceneResult<()> {
        let slot_node = self.node(slot)?;
        if !slot_node.is_slot() {
            return Err(SceneError::NotASlot(slot));
        }
        let slot_tree = slot_node.tree;
        let above_slot = self.composed_ancestors(slot);
        for &id in nodes {
            let node = self.node(id)?;
            let crosses_tree = !node.is_floating() && node.tree != slot_tree;
            if matches!(node.data, NodeData::Root | NodeData::ShadowRoot(_))
                || crosses_tree
                || above_slot.contains(&id)
                || self.is_inclusive_ancestor(id, slot)
            {
                return Err(SceneError::NotSlottable(id));
            }
        }

        let mut next: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for &id in nodes {
            if !next.contains(&id) {
                next.push(id);
            }
        }

        let previous = self.take_assigned(slot);
        for &old in &previous {
            if !next.contains(&old) {
                if let Some(n) = self.get_mut(old) {
                    n.assigned_slot = None;
                }
                self.drop_carried(old);
            }
        }
        for &id in &next {
            let current = self.get(id).and_then(|n| n.assigned_slot);
            if current.is_some_and(|other| other != slot) {
                self.detach_from_slot(id);
            }
            if let Some(n) = self.get_mut(id) {
                n.assigned_slot = Some(slot);
            }
            let carried = self
                .get(id)
                .is_some_and(|n| n.is_floating() && n.tree != slot_tree);
            if carried {
                self.set_subtree_tree(id, slot_tree);
            }
        }

        let changed = previous != next;
        if let Some(NodeData::Slot(s)) = self.get_mut(slot).map(|n| &mut n.data) {
            s.assigned = next;
        }
        if changed {
            tracing::trace!(?slot, "slot assignment changed");
            self.record(MutationRecord::slot_changed(slot));
            self.touch();
        }
        Ok(())
    }

    /// Remove `node` from whichever slot projects it.
    ///
    /// Returns whether an assignment was released.
    pub fn unassign(&mut self, node: NodeId) -> SceneResult<bool> {
        self.node(node)?;
        Ok(self.detach_from_slot(node))
    }

    /// Projected content of a slot
    pub fn assigned_nodes(&self, slot: NodeId) -> &[NodeId] {
        self.get(slot)
            .and_then(Node::as_slot)
            .map(|s| s.assigned())
            .unwrap_or(&[])
    }

    pub(crate) fn detach_from_slot(&mut self, node: NodeId) -> bool {
        let Some(slot) = self.get_mut(node).and_then(|n| n.assigned_slot.take()) else {
            return false;
        };
        if let Some(NodeData::Slot(s)) = self.get_mut(slot).map(|n| &mut n.data) {
            s.assigned.retain(|&id| id != node);
        }
        self.drop_carried(node);
        self.record(MutationRecord::slot_changed(slot));
        self.touch();
        true
    }

    /// A parentless node that lost its slot leaves the slot's tree
    fn drop_carried(&mut self, node: NodeId) {
        let carried = self
            .get(node)
            .is_some_and(|n| n.is_floating() && n.tree.is_some());
        if carried {
            self.set_subtree_tree(node, None);
        }
    }

    fn take_assigned(&mut self, slot: NodeId) -> Vec<NodeId> {
        match self.get_mut(slot).map(|n| &mut n.data) {
            Some(NodeData::Slot(s)) => std::mem::take(&mut s.assigned),
            _ => Vec::new(),
        }
    }
}
