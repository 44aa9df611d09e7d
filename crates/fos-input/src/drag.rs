//! Virtual child drag tracking
//!
//! Movement deltas for a pressed virtual child (scrollbar thumbs and the
//! like). Virtual children have no node, so the press itself is the
//! only handle the element gets on the gesture.

use fos_scene::NodeId;

/// Drag of one virtual child
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VirtualDrag {
    target: Option<(NodeId, u16)>,
    start: (f32, f32),
    last: (f32, f32),
}

impl VirtualDrag {
    /// Start tracking from the press position
    pub fn start(&mut self, element: NodeId, index: u16, x: f32, y: f32) {
        self.target = Some((element, index));
        self.start = (x, y);
        self.last = (x, y);
    }

    /// Delta since the previous update, `None` when not dragging
    pub fn update(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        self.target?;
        let delta = (x - self.last.0, y - self.last.1);
        self.last = (x, y);
        Some(delta)
    }

    /// Offset from the press position
    pub fn total_offset(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        self.target?;
        Some((x - self.start.0, y - self.start.1))
    }

    pub fn end(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn target(&self) -> Option<(NodeId, u16)> {
        self.target
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.target.is_some()
    }
}
