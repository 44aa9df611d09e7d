//! Input dispatch state
//!
//! Hover, focus, press and selection are tracked independently; each
//! event updates whichever of them it concerns and emits the resulting
//! events to the sink. Every remembered reference is re-validated at the
//! start of an event, since the tree may change between frames.

use fos_paint::Hit;
use fos_scene::{Node, NodeId, SceneTree};

use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::config::InputConfig;
use crate::drag::VirtualDrag;
use crate::event::{InputEvent, Key, Modifiers, MouseButton};
use crate::events::{DispatchedEvent, EventKind, EventSink, Target};
use crate::hover::hover_transition;
use crate::selection::{SelectionManager, TextPoint};

/// What the pointer is over, after resolving a pick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Resolved {
    element: Option<NodeId>,
    text: Option<TextPoint>,
    virtual_child: Option<(NodeId, u16)>,
}

/// Pointer state stamped onto emitted events
#[derive(Debug, Clone, Copy, Default)]
struct Pointer {
    x: f32,
    y: f32,
    button: Option<MouseButton>,
    modifiers: Modifiers,
}

/// Input dispatch state machine
#[derive(Debug)]
pub struct InputState {
    config: InputConfig,
    hovered_element: Option<NodeId>,
    /// Composed ancestors of `hovered_element` as of the last hover change,
    /// leaf first
    hover_chain: Vec<NodeId>,
    hovered_text: Option<NodeId>,
    hovered_virtual_child: Option<(NodeId, u16)>,
    focused_element: Option<NodeId>,
    focused_text: Option<NodeId>,
    pressed_element: Option<NodeId>,
    pressed_virtual_child: Option<(NodeId, u16)>,
    /// A press on text is extending the selection; hover is frozen
    selecting: bool,
    drag: VirtualDrag,
    selection: SelectionManager,
    clipboard: Box<dyn Clipboard>,
    pointer: Pointer,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

impl InputState {
    pub fn new(config: InputConfig) -> Self {
        Self::with_clipboard(config, Box::new(MemoryClipboard::new()))
    }

    pub fn with_clipboard(config: InputConfig, clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            config,
            hovered_element: None,
            hover_chain: Vec::new(),
            hovered_text: None,
            hovered_virtual_child: None,
            focused_element: None,
            focused_text: None,
            pressed_element: None,
            pressed_virtual_child: None,
            selecting: false,
            drag: VirtualDrag::default(),
            selection: SelectionManager::new(),
            clipboard,
            pointer: Pointer::default(),
        }
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: InputConfig) {
        self.config = config;
    }

    #[inline]
    pub fn hovered_element(&self) -> Option<NodeId> {
        self.hovered_element
    }

    #[inline]
    pub fn hovered_text(&self) -> Option<NodeId> {
        self.hovered_text
    }

    #[inline]
    pub fn hovered_virtual_child(&self) -> Option<(NodeId, u16)> {
        self.hovered_virtual_child
    }

    #[inline]
    pub fn focused_element(&self) -> Option<NodeId> {
        self.focused_element
    }

    #[inline]
    pub fn focused_text(&self) -> Option<NodeId> {
        self.focused_text
    }

    #[inline]
    pub fn pressed_element(&self) -> Option<NodeId> {
        self.pressed_element
    }

    #[inline]
    pub fn pressed_virtual_child(&self) -> Option<(NodeId, u16)> {
        self.pressed_virtual_child
    }

    /// Whether a text press is currently dragging out a selection
    #[inline]
    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn clipboard_mut(&mut self) -> &mut dyn Clipboard {
        self.clipboard.as_mut()
    }

    /// Forget everything hovered, focused, pressed or selected
    pub fn reset(&mut self) {
        self.hovered_element = None;
        self.hover_chain.clear();
        self.hovered_text = None;
        self.hovered_virtual_child = None;
        self.focused_element = None;
        self.focused_text = None;
        self.pressed_element = None;
        self.pressed_virtual_child = None;
        self.selecting = false;
        self.drag.end();
        self.selection.collapse();
    }

    /// Dispatch one platform event. `hit` is the pick under the event's
    /// position (ignored for keyboard events).
    pub fn handle(
        &mut self,
        tree: &SceneTree,
        hit: Option<Hit>,
        event: &InputEvent,
        sink: &mut dyn EventSink,
    ) {
        self.discard_disconnected(tree);
        if let Some((x, y)) = event.position() {
            self.pointer.x = x;
            self.pointer.y = y;
        }
        self.pointer.modifiers = event.modifiers();
        self.pointer.button = None;

        let target = resolve(tree, hit);
        match *event {
            InputEvent::MouseMove { .. } => self.mouse_move(tree, target, sink),
            InputEvent::MouseDown { button, .. } => {
                self.pointer.button = Some(button);
                self.mouse_down(tree, target, button, sink);
            }
            InputEvent::MouseUp { button, .. } => {
                self.pointer.button = Some(button);
                self.mouse_up(tree, target, sink);
            }
            InputEvent::DoubleClick { button, .. } => {
                self.pointer.button = Some(button);
                self.double_click(tree, target, sink);
            }
            InputEvent::Wheel {
                delta_x, delta_y, ..
            } => {
                if let Some(element) = target.element {
                    let kind = EventKind::Wheel { delta_x, delta_y };
                    self.emit(sink, Target::Element(element), kind, None);
                }
            }
            InputEvent::Context { .. } => {
                if let Some(element) = target.element {
                    self.emit(sink, Target::Element(element), EventKind::ContextMenu, None);
                }
            }
            InputEvent::KeyDown { key, modifiers } => self.key_down(key, modifiers, sink),
        }
    }

    fn mouse_move(&mut self, tree: &SceneTree, target: Resolved, sink: &mut dyn EventSink) {
        if let Some((element, index)) = self.drag.target() {
            let (x, y) = (self.pointer.x, self.pointer.y);
            if let Some((delta_x, delta_y)) = self.drag.update(x, y) {
                let (offset_x, offset_y) = self.drag.total_offset(x, y).unwrap_or_default();
                if delta_x != 0.0 || delta_y != 0.0 {
                    let kind = EventKind::VirtualChildDrag {
                        delta_x,
                        delta_y,
                        offset_x,
                        offset_y,
                    };
                    self.emit(sink, Target::VirtualChild { element, index }, kind, None);
                }
            }
        }

        if self.selecting {
            if let Some(point) = target.text {
                if self.selection.extend_to(tree, point) {
                    self.emit(sink, Target::Text(point.node), EventKind::SelectionChanged, None);
                }
            }
            return;
        }

        self.update_hover(tree, target, sink);
        if let Some(element) = target.element {
            self.emit(sink, Target::Element(element), EventKind::MouseMove, None);
        }
    }

    fn update_hover(&mut self, tree: &SceneTree, target: Resolved, sink: &mut dyn EventSink) {
        let old_virtual = self.hovered_virtual_child;
        let old_text = self.hovered_text;
        let new_text = target.text.map(|p| p.node);
        let virtual_changed = target.virtual_child != old_virtual;
        let text_changed = new_text != old_text;

        if virtual_changed {
            if let Some((element, index)) = old_virtual {
                let related = target.virtual_child.map(|(e, _)| e);
                self.emit(sink, Target::VirtualChild { element, index }, EventKind::MouseOut, related);
            }
        }
        if text_changed {
            if let Some(old) = old_text {
                self.emit(sink, Target::Text(old), EventKind::MouseOut, new_text);
            }
        }

        if target.element != self.hovered_element {
            let old = self.hovered_element;
            let new = target.element;
            let transition = hover_transition(tree, old, new);
            tracing::trace!(?old, ?new, leave = transition.leave.len(), enter = transition.enter.len(), "hover changed");

            if let Some(old) = old {
                self.emit(sink, Target::Element(old), EventKind::MouseOut, new);
            }
            for &id in &transition.leave {
                self.emit(sink, Target::Element(id), EventKind::MouseLeave, new);
            }
            self.hovered_element = new;
            self.hover_chain = new.map(|id| tree.composed_ancestors(id)).unwrap_or_default();
            if let Some(new) = new {
                self.emit(sink, Target::Element(new), EventKind::MouseOver, old);
            }
            for &id in &transition.enter {
                self.emit(sink, Target::Element(id), EventKind::MouseEnter, old);
            }
        }

        if text_changed {
            self.hovered_text = new_text;
            if let Some(new) = new_text {
                self.emit(sink, Target::Text(new), EventKind::MouseOver, old_text);
            }
        }
        if virtual_changed {
            self.hovered_virtual_child = target.virtual_child;
            if let Some((element, index)) = target.virtual_child {
                let related = old_virtual.map(|(e, _)| e);
                self.emit(sink, Target::VirtualChild { element, index }, EventKind::MouseOver, related);
            }
        }
    }

    fn mouse_down(
        &mut self,
        tree: &SceneTree,
        target: Resolved,
        button: MouseButton,
        sink: &mut dyn EventSink,
    ) {
        self.pressed_element = target.element;
        self.pressed_virtual_child = target.virtual_child;

        if let Some(element) = target.element {
            self.emit(sink, Target::Element(element), EventKind::MouseDown, None);
            self.emit(sink, Target::Element(element), EventKind::Activate, None);
        }
        if let Some((element, index)) = target.virtual_child {
            self.drag.start(element, index, self.pointer.x, self.pointer.y);
            self.emit(sink, Target::VirtualChild { element, index }, EventKind::Activate, None);
        }

        self.update_focus(tree, target.element, sink);
        if button == MouseButton::Primary {
            self.press_text(tree, target, sink);
        }
    }

    fn update_focus(&mut self, tree: &SceneTree, element: Option<NodeId>, sink: &mut dyn EventSink) {
        let new = element.and_then(|id| focus_target(tree, id));
        if new == self.focused_element {
            return;
        }
        let old = self.focused_element;
        tracing::trace!(?old, ?new, "focus changed");
        if let Some(old) = old {
            self.emit(sink, Target::Element(old), EventKind::Blur, new);
        }
        self.focused_element = new;
        if let Some(new) = new {
            self.emit(sink, Target::Element(new), EventKind::Focus, old);
        }
    }

    fn press_text(&mut self, tree: &SceneTree, target: Resolved, sink: &mut dyn EventSink) {
        let Some(point) = target.text else {
            self.focused_text = None;
            if let Some(anchor) = self.selection.get_selection().anchor {
                self.selection.collapse();
                self.emit(sink, Target::Text(anchor.node), EventKind::SelectionChanged, None);
            }
            return;
        };

        let extend = self.pointer.modifiers.shift
            && self.config.shift_extends_selection
            && self.selection.get_selection().anchor.is_some();
        if extend {
            self.selection.extend_to(tree, point);
        } else {
            self.selection.set_caret(point);
        }
        self.focused_text = Some(point.node);
        self.selecting = true;
        self.emit(sink, Target::Text(point.node), EventKind::SelectionChanged, None);
    }

    fn mouse_up(&mut self, tree: &SceneTree, target: Resolved, sink: &mut dyn EventSink) {
        if let Some(element) = target.element {
            self.emit(sink, Target::Element(element), EventKind::MouseUp, None);
        }
        if let Some(pressed) = self.pressed_element.take() {
            if target.element == Some(pressed) {
                self.emit(sink, Target::Element(pressed), EventKind::Click, None);
            }
            self.emit(sink, Target::Element(pressed), EventKind::Release, None);
            self.emit(sink, Target::Element(pressed), EventKind::Deactivate, None);
        }
        if let Some((element, index)) = self.pressed_virtual_child.take() {
            let virtual_target = Target::VirtualChild { element, index };
            if target.virtual_child == Some((element, index)) {
                self.emit(sink, virtual_target, EventKind::Click, None);
            }
            self.emit(sink, virtual_target, EventKind::Deactivate, None);
        }
        self.drag.end();

        if self.selecting {
            // Hover was frozen during the selection; re-evaluate it here
            self.selecting = false;
            self.mouse_move(tree, target, sink);
        }
    }

    fn double_click(&mut self, tree: &SceneTree, target: Resolved, sink: &mut dyn EventSink) {
        if let Some(element) = target.element {
            self.emit(sink, Target::Element(element), EventKind::DoubleClick, None);
        }
        let Some(point) = target.text else {
            return;
        };
        if self.config.double_click_selects_word {
            self.selection.select_word(tree, point);
            self.focused_text = Some(point.node);
            self.emit(sink, Target::Text(point.node), EventKind::SelectionChanged, None);
        }
    }

    fn key_down(&mut self, key: Key, modifiers: Modifiers, sink: &mut dyn EventSink) {
        if let Some(element) = self.focused_element {
            self.emit(sink, Target::Element(element), EventKind::KeyDown(key), None);
        }
        if !self.config.copy_chord.matches(&key, modifiers) {
            return;
        }
        let Some(text_node) = self.focused_text else {
            return;
        };
        let text = self.selection.get_text();
        if text.is_empty() {
            return;
        }
        if self.clipboard.write_text(text) {
            tracing::debug!(chars = text.chars().count(), "selection copied");
            self.emit(sink, Target::Text(text_node), EventKind::Copy, None);
        } else {
            tracing::warn!("clipboard write failed");
        }
    }

    fn discard_disconnected(&mut self, tree: &SceneTree) {
        // Hover falls back to the deepest ancestor still in the tree, so
        // the ancestors that saw MouseEnter never see it twice
        if self.hovered_element.is_some_and(|id| !tree.is_connected(id)) {
            let survivor = self
                .hover_chain
                .iter()
                .position(|&id| tree.is_connected(id));
            let fallback = survivor.map(|i| self.hover_chain[i]);
            tracing::debug!(node = ?self.hovered_element, ?fallback, "hovered element disconnected");
            self.hover_chain.drain(..survivor.unwrap_or(self.hover_chain.len()));
            self.hovered_element = fallback;
        }

        let fields = [
            ("hovered text", &mut self.hovered_text),
            ("focused element", &mut self.focused_element),
            ("focused text", &mut self.focused_text),
            ("pressed element", &mut self.pressed_element),
        ];
        for (what, field) in fields {
            if field.is_some_and(|id| !tree.is_connected(id)) {
                tracing::debug!(node = ?field, what, "discarding disconnected reference");
                *field = None;
            }
        }
        for (what, field) in [
            ("hovered virtual child", &mut self.hovered_virtual_child),
            ("pressed virtual child", &mut self.pressed_virtual_child),
        ] {
            if field.is_some_and(|(id, _)| !tree.is_connected(id)) {
                tracing::debug!(node = ?field, what, "discarding disconnected reference");
                *field = None;
            }
        }
        if self.drag.target().is_some_and(|(id, _)| !tree.is_connected(id)) {
            self.drag.end();
        }

        let selection = self.selection.get_selection();
        let stale_selection = [selection.anchor, selection.focus]
            .into_iter()
            .flatten()
            .any(|p| !tree.is_connected(p.node));
        if stale_selection {
            tracing::debug!("discarding selection over disconnected text");
            self.selection.collapse();
            self.selecting = false;
        }
    }

    fn emit(
        &self,
        sink: &mut dyn EventSink,
        target: Target,
        kind: EventKind,
        related: Option<NodeId>,
    ) {
        tracing::trace!(?target, ?kind, "dispatch");
        sink.dispatch(DispatchedEvent {
            target,
            kind,
            related,
            x: self.pointer.x,
            y: self.pointer.y,
            button: self.pointer.button,
            modifiers: self.pointer.modifiers,
        });
    }
}

/// Map a pick onto hover targets. Text hits hover their nearest element
/// ancestor; the character index rides in the virtual child bits.
fn resolve(tree: &SceneTree, hit: Option<Hit>) -> Resolved {
    let Some(hit) = hit else {
        return Resolved::default();
    };
    if !tree.is_connected(hit.node) {
        return Resolved::default();
    }
    let Some(node) = tree.get(hit.node) else {
        return Resolved::default();
    };

    if node.is_text() {
        let offset = hit.virtual_child.saturating_sub(1) as usize;
        let element = tree
            .composed_ancestors(hit.node)
            .into_iter()
            .skip(1)
            .find(|&id| tree.get(id).is_some_and(Node::is_element));
        Resolved {
            element,
            text: Some(TextPoint::new(hit.node, offset)),
            virtual_child: None,
        }
    } else if node.is_element() {
        Resolved {
            element: Some(hit.node),
            text: None,
            virtual_child: (hit.virtual_child > 0).then_some((hit.node, hit.virtual_child)),
        }
    } else {
        Resolved::default()
    }
}

/// Nearest focusable composed ancestor-or-self. A host whose shadow root
/// delegates focus hands it to its first focusable shadow descendant.
fn focus_target(tree: &SceneTree, element: NodeId) -> Option<NodeId> {
    for id in tree.composed_ancestors(element) {
        let node = tree.get(id)?;
        if node.is_focusable() {
            return Some(id);
        }
        let delegates = node
            .as_element()
            .and_then(|e| e.shadow_root())
            .and_then(|sr| tree.get(sr))
            .and_then(Node::as_shadow_root)
            .is_some_and(|sr| sr.delegates_focus);
        if delegates {
            let delegate = tree
                .composed(id)
                .skip(1)
                .find(|&d| tree.get(d).is_some_and(Node::is_focusable));
            if delegate.is_some() {
                return delegate;
            }
        }
    }
    None
}
