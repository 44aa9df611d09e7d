//! Scene Node
//!
//! Intrusive doubly-linked node. Links are arena handles, so structural
//! edits are O(1) and there are no reference cycles to manage.

use crate::shadow::ShadowRootMode;
use crate::{NodeId, TreeId};

/// 2D affine transform `[a, b, c, d, e, f]`
///
/// Supplied by the layout subsystem and stamped onto emitted commands as
/// an opaque value; the scene never composes transforms itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub m: [f32; 6],
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        m: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    /// Pure translation
    pub const fn translate(x: f32, y: f32) -> Self {
        Self {
            m: [1.0, 0.0, 0.0, 1.0, x, y],
        }
    }

    /// Translation part
    pub fn offset(&self) -> (f32, f32) {
        (self.m[4], self.m[5])
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Scene node - links plus per-kind payload
#[derive(Debug)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    /// Owning tree (None while detached)
    pub(crate) tree: Option<TreeId>,
    /// Position in the last collected render order
    pub(crate) render_index: Option<u32>,
    /// Slot currently projecting this node
    pub(crate) assigned_slot: Option<NodeId>,
    pub(crate) visible: bool,
    pub(crate) transform: Transform,
    pub(crate) data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            tree: None,
            render_index: None,
            assigned_slot: None,
            visible: true,
            transform: Transform::IDENTITY,
            data,
        }
    }

    pub(crate) fn root(tree: TreeId) -> Self {
        let mut node = Self::with_data(NodeData::Root);
        node.tree = Some(tree);
        node
    }

    pub(crate) fn element(name: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(name)))
    }

    pub(crate) fn text(content: &str) -> Self {
        Self::with_data(NodeData::Text(TextData {
            content: content.to_string(),
        }))
    }

    pub(crate) fn slot(name: &str) -> Self {
        Self::with_data(NodeData::Slot(SlotData::new(name)))
    }

    pub(crate) fn shadow_root(host: NodeId, mode: ShadowRootMode, delegates_focus: bool) -> Self {
        Self::with_data(NodeData::ShadowRoot(ShadowRootData {
            host,
            mode,
            delegates_focus,
        }))
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    #[inline]
    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    #[inline]
    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    #[inline]
    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    /// Owning tree, if attached
    #[inline]
    pub fn tree(&self) -> Option<TreeId> {
        self.tree
    }

    /// Index assigned by the last collection pass.
    ///
    /// Only meaningful for the frame that assigned it.
    #[inline]
    pub fn render_index(&self) -> Option<u32> {
        self.render_index
    }

    #[inline]
    pub fn assigned_slot(&self) -> Option<NodeId> {
        self.assigned_slot
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Cached, already-composed transform from layout
    #[inline]
    pub fn cached_transform(&self) -> Transform {
        self.transform
    }

    #[inline]
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// Elements, slots and tree roots; everything that can be a hover,
    /// focus or press target
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(
            self.data,
            NodeData::Element(_) | NodeData::Slot(_) | NodeData::Root
        )
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    #[inline]
    pub fn is_slot(&self) -> bool {
        matches!(self.data, NodeData::Slot(_))
    }

    /// No literal parent and not a tree or shadow root. A floating node
    /// takes its tree from the slot projecting it.
    #[inline]
    pub(crate) fn is_floating(&self) -> bool {
        self.parent.is_none() && !matches!(self.data, NodeData::Root | NodeData::ShadowRoot(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_slot(&self) -> Option<&SlotData> {
        match &self.data {
            NodeData::Slot(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }

    #[inline]
    pub fn as_shadow_root(&self) -> Option<&ShadowRootData> {
        match &self.data {
            NodeData::ShadowRoot(s) => Some(s),
            _ => None,
        }
    }

    /// Whether pointer-down may move focus here
    pub fn is_focusable(&self) -> bool {
        match &self.data {
            NodeData::Element(e) => e.focusable,
            NodeData::Slot(s) => s.focusable,
            _ => false,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Top of a tree
    Root,
    Element(ElementData),
    Text(TextData),
    /// Projection point for assigned content
    Slot(SlotData),
    /// Hidden child root owned by a host element
    ShadowRoot(ShadowRootData),
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    pub name: String,
    pub focusable: bool,
    pub(crate) shadow_root: Option<NodeId>,
}

impl ElementData {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            focusable: false,
            shadow_root: None,
        }
    }

    /// Attached shadow root, regardless of mode
    #[inline]
    pub fn shadow_root(&self) -> Option<NodeId> {
        self.shadow_root
    }
}

/// Slot data
///
/// `assigned` is the projected content. The slot's own children are
/// fallback content, composed only while `assigned` is empty.
#[derive(Debug)]
pub struct SlotData {
    pub name: String,
    pub focusable: bool,
    pub(crate) assigned: Vec<NodeId>,
}

impl SlotData {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            focusable: false,
            assigned: Vec::new(),
        }
    }

    #[inline]
    pub fn assigned(&self) -> &[NodeId] {
        &self.assigned
    }

    /// Check if the slot is showing its fallback content
    #[inline]
    pub fn is_using_fallback(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// Text node data
#[derive(Debug)]
pub struct TextData {
    pub content: String,
}

/// Shadow root data
#[derive(Debug, Clone, Copy)]
pub struct ShadowRootData {
    pub host: NodeId,
    pub mode: ShadowRootMode,
    pub delegates_focus: bool,
}
