//! Hover transitions
//!
//! Diff of two composed ancestor chains. Nodes shared by both chains
//! neither leave nor enter.

use fos_scene::{NodeId, SceneTree};

/// Nodes left and entered when hover moves between two elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoverTransition {
    /// Leaf first, up to (excluding) the common ancestor
    pub leave: Vec<NodeId>,
    /// From below the common ancestor down to the leaf
    pub enter: Vec<NodeId>,
}

impl HoverTransition {
    pub fn is_empty(&self) -> bool {
        self.leave.is_empty() && self.enter.is_empty()
    }
}

/// Compute the leave and enter chains for a move from `old` to `new`
pub fn hover_transition(
    tree: &SceneTree,
    old: Option<NodeId>,
    new: Option<NodeId>,
) -> HoverTransition {
    if old == new {
        return HoverTransition::default();
    }
    let old_chain = old.map(|id| tree.composed_ancestors(id)).unwrap_or_default();
    let new_chain = new.map(|id| tree.composed_ancestors(id)).unwrap_or_default();

    // Chains share a suffix; find where it starts
    let shared = old_chain
        .iter()
        .rev()
        .zip(new_chain.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let leave = old_chain[..old_chain.len() - shared].to_vec();
    let mut enter = new_chain[..new_chain.len() - shared].to_vec();
    enter.reverse();
    HoverTransition { leave, enter }
}
