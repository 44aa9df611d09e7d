//! Mutation records
//!
//! Structural changes queued for the application, drained once per frame.

use crate::NodeId;

/// Mutation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Node linked under `related`
    Inserted,
    /// Node unlinked from `related`
    Removed,
    /// Slot's projected list changed
    SlotChanged,
    /// Shadow root `related` attached to host `target`
    ShadowAttached,
    /// Detached subtree freed
    Destroyed,
}

/// Single mutation record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: NodeId,
    pub related: Option<NodeId>,
}

impl MutationRecord {
    pub fn inserted(target: NodeId, parent: NodeId) -> Self {
        Self {
            kind: MutationKind::Inserted,
            target,
            related: Some(parent),
        }
    }

    pub fn removed(target: NodeId, parent: NodeId) -> Self {
        Self {
            kind: MutationKind::Removed,
            target,
            related: Some(parent),
        }
    }

    pub fn slot_changed(slot: NodeId) -> Self {
        Self {
            kind: MutationKind::SlotChanged,
            target: slot,
            related: None,
        }
    }

    pub fn shadow_attached(host: NodeId, shadow_root: NodeId) -> Self {
        Self {
            kind: MutationKind::ShadowAttached,
            target: host,
            related: Some(shadow_root),
        }
    }

    pub fn destroyed(target: NodeId) -> Self {
        Self {
            kind: MutationKind::Destroyed,
            target,
            related: None,
        }
    }
}
