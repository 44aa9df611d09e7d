//! Scene Tree (arena-based allocation)
//!
//! All structural mutation is iterative; deep or wide subtrees never
//! recurse on the call stack.

use std::collections::HashSet;

use crate::arena::NodeArena;
use crate::{Epoch, MutationRecord, Node, NodeData, NodeId, SceneError, SceneResult, Transform};

/// Identifier of one connected tree within the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u32);

/// Arena-based scene tree
#[derive(Debug, Default)]
pub struct SceneTree {
    nodes: NodeArena,
    next_tree: u32,
    epoch: Epoch,
    mutations: Vec<MutationRecord>,
}

impl SceneTree {
    /// Create a new empty scene
    pub fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            next_tree: 0,
            epoch: Epoch::INITIAL,
            mutations: Vec::new(),
        }
    }

    /// Create the root of a new tree. Roots are connected by definition.
    pub fn create_root(&mut self) -> NodeId {
        let tree = TreeId(self.next_tree);
        self.next_tree += 1;
        self.touch();
        self.nodes.insert(Node::root(tree))
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.nodes.insert(Node::element(name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.nodes.insert(Node::text(content))
    }

    /// Create a detached slot
    pub fn create_slot(&mut self, name: &str) -> NodeId {
        self.nodes.insert(Node::slot(name))
    }

    pub(crate) fn insert_node(&mut self, node: Node) -> NodeId {
        self.nodes.insert(node)
    }

    /// Get a node by ID
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn node(&self, id: NodeId) -> SceneResult<&Node> {
        self.nodes.get(id).ok_or(SceneError::NotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(SceneError::NotFound(id))
    }

    /// Whether the handle still refers to a live node
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some()
    }

    /// Whether the node is alive and attached to a tree
    #[inline]
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.tree.is_some())
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// Current scene epoch
    #[inline]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    #[inline]
    pub(crate) fn touch(&mut self) {
        self.epoch = self.epoch.next();
    }

    #[inline]
    pub(crate) fn record(&mut self, record: MutationRecord) {
        self.mutations.push(record);
    }

    /// Take all queued mutation records
    pub fn drain_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    /// Iterate over literal children
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        let next = self.get(parent).and_then(|n| n.first_child);
        Children { tree: self, next }
    }

    // --- Structure ---

    /// Append `child` as the last literal child of `parent`.
    ///
    /// No-op if `child` is already a child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        if self.node(child)?.parent == Some(parent) {
            return Ok(());
        }
        self.check_insertable(parent, child)?;
        self.link(parent, child, None);
        self.finish_insert(parent, child);
        Ok(())
    }

    /// Append several children in order
    pub fn append_children(&mut self, parent: NodeId, children: &[NodeId]) -> SceneResult<()> {
        for &child in children {
            self.append_child(parent, child)?;
        }
        Ok(())
    }

    /// Insert `child` before `reference` (or at the end when `None`).
    ///
    /// A child already under `parent` is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> SceneResult<()> {
        if let Some(reference) = reference {
            if self.node(reference)?.parent != Some(parent) {
                return Err(SceneError::NotAChild {
                    parent,
                    child: reference,
                });
            }
            if reference == child {
                return Ok(());
            }
        }
        if self.node(child)?.parent == Some(parent) {
            self.unlink(child);
        } else {
            self.check_insertable(parent, child)?;
        }
        self.link(parent, child, reference);
        self.finish_insert(parent, child);
        Ok(())
    }

    /// Unlink `child` from `parent` and detach its subtree
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(SceneError::NotAChild { parent, child });
        }
        self.unlink(child);
        if self.is_connected(child) {
            let detached = self.set_subtree_tree(child, None);
            self.release_crossing_assignments(&detached);
        }
        tracing::trace!(?parent, ?child, "node removed");
        self.record(MutationRecord::removed(child, parent));
        self.touch();
        Ok(())
    }

    /// Remove every literal child; returns how many were removed
    pub fn remove_children(&mut self, parent: NodeId) -> SceneResult<usize> {
        self.node(parent)?;
        let len = self.children(parent).count();
        self.remove_children_in_range(parent, 0, len)
    }

    /// Remove literal children at positions `start..end`
    pub fn remove_children_in_range(
        &mut self,
        parent: NodeId,
        start: usize,
        end: usize,
    ) -> SceneResult<usize> {
        self.node(parent)?;
        let children: Vec<NodeId> = self.children(parent).collect();
        if start > end || end > children.len() {
            return Err(SceneError::InvalidRange {
                start,
                end,
                len: children.len(),
            });
        }
        for &child in &children[start..end] {
            self.remove_child(parent, child)?;
        }
        Ok(end - start)
    }

    /// Free a detached subtree, including shadow trees.
    ///
    /// Handles to destroyed nodes stop resolving.
    pub fn destroy(&mut self, node: NodeId) -> SceneResult<usize> {
        let n = self.node(node)?;
        if n.parent.is_some() || n.as_shadow_root().is_some() {
            return Err(SceneError::StillAttached(node));
        }
        let doomed = self.subtree(node, false);
        self.set_subtree_tree(node, None);
        let doomed_set: HashSet<NodeId> = doomed.iter().copied().collect();

        for &id in &doomed {
            let Some(n) = self.get(id) else { continue };
            let slot = n.assigned_slot;
            let projected = n.as_slot().map(|s| s.assigned.clone()).unwrap_or_default();

            if let Some(slot) = slot {
                if !doomed_set.contains(&slot) {
                    self.detach_from_slot(id);
                }
            }
            for assigned in projected {
                if !doomed_set.contains(&assigned) {
                    if let Some(a) = self.get_mut(assigned) {
                        a.assigned_slot = None;
                    }
                }
            }
        }

        for &id in &doomed {
            self.nodes.remove(id);
        }
        tracing::debug!(root = ?node, count = doomed.len(), "destroyed subtree");
        self.record(MutationRecord::destroyed(node));
        self.touch();
        Ok(doomed.len())
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if child_node.parent.is_some() {
            return Err(SceneError::AlreadyParented(child));
        }
        let bad_parent = parent_node.is_text();
        let bad_child = matches!(child_node.data, NodeData::Root | NodeData::ShadowRoot(_));
        if bad_parent || bad_child || self.is_inclusive_ancestor(child, parent) {
            return Err(SceneError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Raw-tree ancestry, hopping from shadow roots to their hosts
    pub(crate) fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|n| match &n.data {
                NodeData::ShadowRoot(sr) => Some(sr.host),
                _ => n.parent,
            });
        }
        false
    }

    fn link(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        let prev = match before {
            Some(next) => self.get(next).and_then(|n| n.prev_sibling),
            None => self.get(parent).and_then(|n| n.last_child),
        };
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = before;
        }
        match prev {
            Some(prev) => {
                if let Some(n) = self.get_mut(prev) {
                    n.next_sibling = Some(child);
                }
            }
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = Some(child);
                }
            }
        }
        match before {
            Some(next) => {
                if let Some(n) = self.get_mut(next) {
                    n.prev_sibling = Some(child);
                }
            }
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = Some(child);
                }
            }
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(node) = self.get_mut(child) else {
            return;
        };
        let parent = node.parent.take();
        let prev = node.prev_sibling.take();
        let next = node.next_sibling.take();
        let Some(parent) = parent else {
            return;
        };
        match prev {
            Some(prev) => {
                if let Some(n) = self.get_mut(prev) {
                    n.next_sibling = next;
                }
            }
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = next;
                }
            }
        }
        match next {
            Some(next) => {
                if let Some(n) = self.get_mut(next) {
                    n.prev_sibling = prev;
                }
            }
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = prev;
                }
            }
        }
    }

    fn finish_insert(&mut self, parent: NodeId, child: NodeId) {
        let tree = self.get(parent).and_then(|n| n.tree);
        if self.get(child).and_then(|n| n.tree) != tree {
            let stamped = self.set_subtree_tree(child, tree);
            self.release_crossing_assignments(&stamped);
        }
        tracing::trace!(?parent, ?child, "node inserted");
        self.record(MutationRecord::inserted(child, parent));
        self.touch();
    }

    /// Stamp `tree` on `top` and everything it carries: literal children,
    /// shadow roots, and parentless nodes projected by its slots.
    /// Returns every node visited.
    pub(crate) fn set_subtree_tree(&mut self, top: NodeId, tree: Option<TreeId>) -> Vec<NodeId> {
        let visited = self.subtree(top, true);
        for &id in &visited {
            if let Some(node) = self.nodes.get_mut(id) {
                node.tree = tree;
                if tree.is_none() {
                    node.render_index = None;
                }
            }
        }
        visited
    }

    /// `top` and its raw subtree, including shadow roots. With
    /// `carried`, also the parentless nodes projected by slots inside it.
    fn subtree(&self, top: NodeId, carried: bool) -> Vec<NodeId> {
        let mut visited = Vec::new();
        let mut stack = vec![top];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            match &node.data {
                NodeData::Element(el) => {
                    if let Some(shadow_root) = el.shadow_root {
                        stack.push(shadow_root);
                    }
                }
                NodeData::Slot(slot) if carried => {
                    stack.extend(
                        slot.assigned
                            .iter()
                            .copied()
                            .filter(|&a| self.get(a).is_some_and(Node::is_floating)),
                    );
                }
                _ => {}
            }
            let mut child = node.first_child;
            while let Some(c) = child {
                stack.push(c);
                child = self.nodes.get(c).and_then(|n| n.next_sibling);
            }
            visited.push(id);
        }
        visited
    }

    /// Drop slot assignments that now straddle a connected/detached boundary
    fn release_crossing_assignments(&mut self, nodes: &[NodeId]) {
        for &id in nodes {
            let Some(node) = self.get(id) else { continue };
            let tree = node.tree;
            let slot = node.assigned_slot;

            if let Some(slot) = slot {
                if self.get(slot).map(|s| s.tree) != Some(tree) {
                    self.detach_from_slot(id);
                }
            }

            let projected = self
                .get(id)
                .and_then(Node::as_slot)
                .map(|s| s.assigned.clone())
                .unwrap_or_default();
            for assigned in projected {
                if self.get(assigned).map(|n| n.tree) != Some(tree) {
                    self.detach_from_slot(assigned);
                }
            }
        }
    }

    // --- Per-node state supplied by collaborators ---

    /// Visibility flag consumed by collection
    pub fn set_visible(&mut self, node: NodeId, visible: bool) -> SceneResult<()> {
        let n = self.node_mut(node)?;
        if n.visible != visible {
            n.visible = visible;
            self.touch();
        }
        Ok(())
    }

    /// Cached transform from the layout subsystem
    pub fn set_cached_transform(&mut self, node: NodeId, transform: Transform) -> SceneResult<()> {
        let n = self.node_mut(node)?;
        if n.transform != transform {
            n.transform = transform;
            self.touch();
        }
        Ok(())
    }

    /// Mark an element or slot as a focus target. No-op for other kinds.
    pub fn set_focusable(&mut self, node: NodeId, focusable: bool) -> SceneResult<()> {
        match &mut self.node_mut(node)?.data {
            NodeData::Element(e) => e.focusable = focusable,
            NodeData::Slot(s) => s.focusable = focusable,
            _ => {}
        }
        Ok(())
    }

    /// Replace a text node's content
    pub fn set_text(&mut self, node: NodeId, content: &str) -> SceneResult<()> {
        if let NodeData::Text(t) = &mut self.node_mut(node)?.data {
            t.content.clear();
            t.content.push_str(content);
            self.touch();
        }
        Ok(())
    }

    /// Text content of a text node
    pub fn text_content(&self, node: NodeId) -> Option<&str> {
        self.get(node).and_then(Node::as_text)
    }

    /// Derived per-frame index, written by the render collector
    pub fn set_render_index(&mut self, node: NodeId, index: Option<u32>) {
        if let Some(n) = self.get_mut(node) {
            n.render_index = index;
        }
    }

    pub fn render_index(&self, node: NodeId) -> Option<u32> {
        self.get(node).and_then(|n| n.render_index)
    }

    // --- Composed ancestry ---

    /// Parent in the composed tree: the projecting slot for slotted
    /// nodes, the host for top-level shadow content, else the literal
    /// parent.
    pub fn composed_parent(&self, node: NodeId) -> Option<NodeId> {
        let n = self.get(node)?;
        if let Some(slot) = n.assigned_slot {
            let projects = self
                .get(slot)
                .and_then(Node::as_slot)
                .is_some_and(|s| s.assigned.contains(&node));
            if projects {
                return Some(slot);
            }
        }
        let parent = n.parent?;
        match self.get(parent)?.as_shadow_root() {
            Some(sr) => Some(sr.host),
            None => Some(parent),
        }
    }

    /// Composed ancestor chain, `node` first and composed root last
    pub fn composed_ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.contains(node).then_some(node);
        while let Some(id) = current {
            chain.push(id);
            current = self.composed_parent(id);
        }
        chain
    }
}

/// Literal child iterator
pub struct Children<'a> {
    tree: &'a SceneTree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.get(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}
