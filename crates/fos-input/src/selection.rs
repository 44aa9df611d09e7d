//! Text Selection
//!
//! Anchor/focus selection over text nodes. Offsets count characters.
//! A range may span several text nodes; they are ordered by the
//! composed tree, so slotted text selects where it is displayed.

use fos_scene::{NodeId, SceneTree};

/// A point in text content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl TextPoint {
    pub const fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Selection type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionType {
    #[default]
    None,
    Caret,
    Range,
}

/// Text selection state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Option<TextPoint>,
    pub focus: Option<TextPoint>,
    pub selection_type: SelectionType,
}

impl Selection {
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn get_range(&self) -> Option<(TextPoint, TextPoint)> {
        match (self.anchor, self.focus) {
            (Some(a), Some(f)) => Some((a, f)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor.is_none() && self.focus.is_none()
    }
}

/// Selection manager
#[derive(Debug, Default)]
pub struct SelectionManager {
    selection: Selection,
    /// Start and end in document order
    span: Option<(TextPoint, TextPoint)>,
    /// Text nodes touched by the range, in order
    covered: Vec<NodeId>,
    /// Selected text content (cached)
    selected_text: String,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current selection
    pub fn get_selection(&self) -> &Selection {
        &self.selection
    }

    /// Get selected text
    pub fn get_text(&self) -> &str {
        &self.selected_text
    }

    /// Collapse to a caret at `point`
    pub fn set_caret(&mut self, point: TextPoint) {
        self.selection = Selection {
            anchor: Some(point),
            focus: Some(point),
            selection_type: SelectionType::Caret,
        };
        self.span = Some((point, point));
        self.covered = vec![point.node];
        self.selected_text.clear();
    }

    /// Select from `anchor` to `focus`
    pub fn set_range(&mut self, tree: &SceneTree, anchor: TextPoint, focus: TextPoint) {
        if anchor == focus {
            self.set_caret(anchor);
            return;
        }
        self.selection = Selection {
            anchor: Some(anchor),
            focus: Some(focus),
            selection_type: SelectionType::Range,
        };
        self.recompute(tree);
    }

    /// Move the focus, keeping the anchor. Returns whether anything changed.
    pub fn extend_to(&mut self, tree: &SceneTree, focus: TextPoint) -> bool {
        let Some(anchor) = self.selection.anchor else {
            return false;
        };
        if self.selection.focus == Some(focus) {
            return false;
        }
        self.set_range(tree, anchor, focus);
        true
    }

    /// Select the word around `point`
    pub fn select_word(&mut self, tree: &SceneTree, point: TextPoint) {
        let content = tree.text_content(point.node).unwrap_or_default();
        let (start, end) = word_bounds(content, point.offset);
        self.set_range(
            tree,
            TextPoint::new(point.node, start),
            TextPoint::new(point.node, end),
        );
    }

    /// Clear selection
    pub fn collapse(&mut self) {
        self.selection = Selection::default();
        self.span = None;
        self.covered.clear();
        self.selected_text.clear();
    }

    /// Check if the character at `offset` in `node` is selected
    pub fn contains(&self, node: NodeId, offset: usize) -> bool {
        let Some((start, end)) = self.span else {
            return false;
        };
        if start == end || !self.covered.contains(&node) {
            return false;
        }
        let after_start = node != start.node || offset >= start.offset;
        let before_end = node != end.node || offset < end.offset;
        after_start && before_end
    }

    fn recompute(&mut self, tree: &SceneTree) {
        self.span = None;
        self.covered.clear();
        self.selected_text.clear();
        let Some((anchor, focus)) = self.selection.get_range() else {
            return;
        };

        if anchor.node == focus.node {
            let (start, end) = if anchor.offset <= focus.offset {
                (anchor, focus)
            } else {
                (focus, anchor)
            };
            let content = tree.text_content(start.node).unwrap_or_default();
            self.selected_text = char_slice(content, start.offset, end.offset);
            self.span = Some((start, end));
            self.covered.push(start.node);
            return;
        }

        let text_nodes = composed_text_nodes(tree, anchor.node);
        let anchor_pos = text_nodes.iter().position(|&id| id == anchor.node);
        let focus_pos = text_nodes.iter().position(|&id| id == focus.node);
        let (Some(a), Some(f)) = (anchor_pos, focus_pos) else {
            tracing::debug!(?anchor, ?focus, "selection endpoints not in one composed tree");
            return;
        };
        let (start, end, first, last) = if a < f {
            (anchor, focus, a, f)
        } else {
            (focus, anchor, f, a)
        };

        for &id in &text_nodes[first..=last] {
            let content = tree.text_content(id).unwrap_or_default();
            let from = if id == start.node { start.offset } else { 0 };
            let to = if id == end.node {
                end.offset
            } else {
                content.chars().count()
            };
            self.selected_text.push_str(&char_slice(content, from, to));
            self.covered.push(id);
        }
        self.span = Some((start, end));
    }
}

/// Text nodes of the composed tree containing `node`, in composed order
fn composed_text_nodes(tree: &SceneTree, node: NodeId) -> Vec<NodeId> {
    let Some(&root) = tree.composed_ancestors(node).last() else {
        return Vec::new();
    };
    tree.composed(root)
        .filter(|&id| tree.get(id).is_some_and(|n| n.is_text()))
        .collect()
}

/// Characters `from..to` of `text`, clamped
fn char_slice(text: &str, from: usize, to: usize) -> String {
    text.chars().skip(from).take(to.saturating_sub(from)).collect()
}

/// Word boundaries (character offsets) around `offset`
pub fn word_bounds(text: &str, offset: usize) -> (usize, usize) {
    let chars: Vec<char> = text.chars().collect();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let offset = offset.min(chars.len());

    // Caret right after a word still selects that word
    let anchor = if offset < chars.len() && is_word(chars[offset]) {
        offset
    } else if offset > 0 && is_word(chars[offset - 1]) {
        offset - 1
    } else {
        return (offset, (offset + 1).min(chars.len()));
    };

    let mut start = anchor;
    while start > 0 && is_word(chars[start - 1]) {
        start -= 1;
    }
    let mut end = anchor;
    while end < chars.len() && is_word(chars[end]) {
        end += 1;
    }
    (start, end)
}
