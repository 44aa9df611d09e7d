//! fOS Paint - Render collection and picking
//!
//! One composed walk per frame assigns every visible node its render index
//! and gathers its draw commands. The render backend rasterizes the
//! encoded indices into a picking image; [`PickingBuffer`] reads it back
//! and maps pixels to nodes.

mod command;
mod picking;
mod render_list;

pub use command::{Command, CommandEntry, CommandProvider};
pub use picking::{
    Extent, Hit, MAX_INDEXED_NODES, MAX_VIRTUAL_CHILD, NODE_INDEX_BITS, PickingBuffer,
    PickingSource, VIRTUAL_CHILD_BITS, decode_pick_id, encode_pick_id,
};
pub use render_list::{CollectStats, RenderList};

/// Picking errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PickingError {
    #[error("Picking readback failed: {0}")]
    Readback(String),

    #[error("Picking buffer holds {expected} pixels, image has {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Result type for picking operations
pub type Result<T> = std::result::Result<T, PickingError>;
