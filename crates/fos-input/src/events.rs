//! Dispatched events
//!
//! What the state machine emits. Delivery and bubbling are up to the
//! application; [`composed_path`] gives the bubbling route.

use fos_scene::{NodeId, SceneTree};

use crate::event::{Key, Modifiers, MouseButton};

/// Event target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Element(NodeId),
    Text(NodeId),
    /// GPU-only sub-region of an element; `index` is 1-based
    VirtualChild { element: NodeId, index: u16 },
}

impl Target {
    /// Node the target lives on
    pub fn node(&self) -> NodeId {
        match *self {
            Target::Element(id) | Target::Text(id) => id,
            Target::VirtualChild { element, .. } => element,
        }
    }
}

/// Event kinds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    MouseOver,
    MouseOut,
    MouseEnter,
    MouseLeave,
    MouseMove,
    MouseDown,
    MouseUp,
    Click,
    DoubleClick,
    Wheel { delta_x: f32, delta_y: f32 },
    ContextMenu,
    /// Press started on the target
    Activate,
    /// Press on the target ended
    Deactivate,
    /// Button released after a press on the target, wherever the pointer is
    Release,
    Focus,
    Blur,
    KeyDown(Key),
    /// Pointer moved while a virtual child is pressed. `delta` is since
    /// the previous move, `offset` since the press.
    VirtualChildDrag {
        delta_x: f32,
        delta_y: f32,
        offset_x: f32,
        offset_y: f32,
    },
    SelectionChanged,
    /// Selected text was written to the clipboard
    Copy,
}

impl EventKind {
    /// Whether the application should propagate this event up the
    /// composed path
    pub fn bubbles(&self) -> bool {
        !matches!(
            self,
            EventKind::MouseEnter
                | EventKind::MouseLeave
                | EventKind::Focus
                | EventKind::Blur
                | EventKind::Activate
                | EventKind::Deactivate
                | EventKind::VirtualChildDrag { .. }
                | EventKind::SelectionChanged
        )
    }
}

/// Event produced by dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchedEvent {
    pub target: Target,
    pub kind: EventKind,
    /// For over/out pairs: the node being entered or left
    pub related: Option<NodeId>,
    pub x: f32,
    pub y: f32,
    pub button: Option<MouseButton>,
    pub modifiers: Modifiers,
}

/// Receives dispatched events
pub trait EventSink {
    fn dispatch(&mut self, event: DispatchedEvent);
}

impl EventSink for Vec<DispatchedEvent> {
    fn dispatch(&mut self, event: DispatchedEvent) {
        self.push(event);
    }
}

/// Bubbling route for `target`: the target node first, composed root last
pub fn composed_path(tree: &SceneTree, target: &Target) -> Vec<NodeId> {
    tree.composed_ancestors(target.node())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bubbles() {
        assert!(EventKind::Click.bubbles());
        assert!(EventKind::MouseOver.bubbles());
        assert!(EventKind::KeyDown(Key::Enter).bubbles());
        assert!(!EventKind::MouseEnter.bubbles());
        assert!(!EventKind::Focus.bubbles());
        assert!(!EventKind::Blur.bubbles());
    }

    #[test]
    fn test_composed_path() {
        let mut tree = SceneTree::new();
        let root = tree.create_root();
        let host = tree.create_element("host");
        tree.append_child(root, host).unwrap();
        let shadow = tree
            .attach_shadow(host, fos_scene::ShadowRootInit::default())
            .unwrap();
        let inner = tree.create_element("inner");
        tree.append_child(shadow, inner).unwrap();

        let target = Target::VirtualChild {
            element: inner,
            index: 1,
        };
        assert_eq!(composed_path(&tree, &target), vec![inner, host, root]);
    }
}
