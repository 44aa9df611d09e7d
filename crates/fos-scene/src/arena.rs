//! Generational node arena
//!
//! Slots are recycled through a free list; every removal bumps the slot's
//! generation so outstanding [`NodeId`]s to the old node stop resolving.

use crate::{Node, NodeId};

#[derive(Debug)]
struct Entry {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    entries: Vec<Entry>,
    free_list: Vec<u32>,
    live: usize,
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::with_capacity(256),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Insert a node, reusing a freed slot when one is available
    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let entry = &mut self.entries[index as usize];
            entry.node = Some(node);
            NodeId::new(index, entry.generation)
        } else {
            let index = self.entries.len() as u32;
            self.entries.push(Entry {
                generation: 0,
                node: Some(node),
            });
            NodeId::new(index, 0)
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.entries
            .get(id.slot() as usize)
            .filter(|entry| entry.generation == id.generation())
            .and_then(|entry| entry.node.as_ref())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.entries
            .get_mut(id.slot() as usize)
            .filter(|entry| entry.generation == id.generation())
            .and_then(|entry| entry.node.as_mut())
    }

    /// Remove a node and retire its handle
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        let entry = self.entries.get_mut(id.slot() as usize)?;
        if entry.generation != id.generation() {
            return None;
        }
        let node = entry.node.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_list.push(id.slot());
        self.live -= 1;
        Some(node)
    }

    /// Number of live nodes
    pub(crate) fn len(&self) -> usize {
        self.live
    }
}
