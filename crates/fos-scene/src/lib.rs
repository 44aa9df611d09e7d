//! fOS Scene - Composed scene tree
//!
//! Arena-backed intrusive node tree with shadow trees and slot projection.
//! The [`ComposedWalker`] flattens it into the composed tree, the order
//! used for painting, picking indices and input routing.

mod arena;
mod compose;
mod error;
mod generation;
mod mutation;
mod node;
mod shadow;
mod tree;

pub use compose::{Composed, ComposedWalker, Composition};
pub use error::{SceneError, SceneResult};
pub use generation::Epoch;
pub use mutation::{MutationKind, MutationRecord};
pub use node::{ElementData, Node, NodeData, ShadowRootData, SlotData, TextData, Transform};
pub use shadow::{ShadowRootInit, ShadowRootMode};
pub use tree::{Children, SceneTree, TreeId};

/// Node identifier (generational index into the scene arena)
///
/// A handle stays valid until its node is destroyed; after that the slot
/// may be reused, but the stale handle never resolves to the new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot of this node
    #[inline]
    pub const fn slot(self) -> u32 {
        self.index
    }

    /// Generation of the arena slot this handle was issued for
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}
