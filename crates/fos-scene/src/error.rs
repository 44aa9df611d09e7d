//! Scene errors

use crate::NodeId;

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Scene operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("Node not found: {0:?}")]
    NotFound(NodeId),

    #[error("Hierarchy request error: cannot insert {child:?} into {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Node {0:?} already has a parent")]
    AlreadyParented(NodeId),

    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Child range {start}..{end} out of bounds for {len} children")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("Element {0:?} already has a shadow root")]
    ShadowAlreadyAttached(NodeId),

    #[error("Node {0:?} cannot host a shadow root")]
    ShadowNotSupported(NodeId),

    #[error("Node {0:?} is not a slot")]
    NotASlot(NodeId),

    #[error("Node {0:?} cannot be assigned to a slot")]
    NotSlottable(NodeId),

    #[error("Node {0:?} is still attached to a parent")]
    StillAttached(NodeId),
}
