//! Draw commands
//!
//! Commands are opaque to collection apart from their z-index and the
//! virtual child they rasterize, if any.

use std::collections::HashMap;

use fos_scene::{NodeId, SceneTree, Transform};

/// A drawable command owned by a node
pub trait Command {
    /// Paint layer; higher draws later
    fn z_index(&self) -> i32 {
        0
    }

    /// 1-based virtual child this command rasterizes (0 = the node itself)
    fn virtual_child(&self) -> u16 {
        0
    }
}

/// Supplies the commands each node owns
pub trait CommandProvider<C> {
    /// Append the commands of `node` to `out`, in draw order
    fn commands(&self, tree: &SceneTree, node: NodeId, out: &mut Vec<C>);
}

impl<C: Clone> CommandProvider<C> for HashMap<NodeId, Vec<C>> {
    fn commands(&self, _tree: &SceneTree, node: NodeId, out: &mut Vec<C>) {
        if let Some(commands) = self.get(&node) {
            out.extend(commands.iter().cloned());
        }
    }
}

/// Command stamped with its node's transform and picking identity
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEntry<C> {
    pub command: C,
    pub transform: Transform,
    /// Render index of the owning node
    pub node_index: u32,
    /// Value the backend writes into the picking image (0 = not pickable)
    pub pick_id: u32,
}
