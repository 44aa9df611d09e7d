//! Dispatch integration tests

use fos_input::{
    DispatchedEvent, EventKind, InputEvent, InputState, Modifiers, MouseButton, Target,
};
use fos_paint::Hit;
use fos_scene::{NodeId, SceneTree, ShadowRootInit};

fn hit(node: NodeId) -> Option<Hit> {
    Some(Hit {
        node,
        index: 0,
        virtual_child: 0,
    })
}

fn move_to() -> InputEvent {
    InputEvent::MouseMove {
        x: 5.0,
        y: 5.0,
        modifiers: Modifiers::NONE,
    }
}

fn press() -> InputEvent {
    InputEvent::MouseDown {
        x: 5.0,
        y: 5.0,
        button: MouseButton::Primary,
        modifiers: Modifiers::NONE,
    }
}

fn release() -> InputEvent {
    InputEvent::MouseUp {
        x: 5.0,
        y: 5.0,
        button: MouseButton::Primary,
        modifiers: Modifiers::NONE,
    }
}

fn of_kind(events: &[DispatchedEvent], kind: EventKind) -> Vec<NodeId> {
    events
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.target.node())
        .collect()
}

/// root
/// ├── panel
/// │   ├── a
/// │   │   └── a_inner
/// │   └── b
/// └── footer
fn panel_tree() -> (SceneTree, [NodeId; 6]) {
    let mut tree = SceneTree::new();
    let root = tree.create_root();
    let panel = tree.create_element("panel");
    let a = tree.create_element("a");
    let a_inner = tree.create_element("a_inner");
    let b = tree.create_element("b");
    let footer = tree.create_element("footer");
    tree.append_children(root, &[panel, footer]).unwrap();
    tree.append_children(panel, &[a, b]).unwrap();
    tree.append_child(a, a_inner).unwrap();
    (tree, [root, panel, a, a_inner, b, footer])
}

// ============================================================================
// Hover
// ============================================================================

#[test]
fn test_hover_chain_symmetry() {
    let (tree, [_, _, _, a_inner, _, footer]) = panel_tree();
    let mut state = InputState::default();
    let mut events = Vec::new();
    state.handle(&tree, hit(a_inner), &move_to(), &mut events);

    events.clear();
    state.handle(&tree, hit(footer), &move_to(), &mut events);
    let left = of_kind(&events, EventKind::MouseLeave);
    let entered = of_kind(&events, EventKind::MouseEnter);

    events.clear();
    state.handle(&tree, hit(a_inner), &move_to(), &mut events);
    let left_back = of_kind(&events, EventKind::MouseLeave);
    let mut entered_back = of_kind(&events, EventKind::MouseEnter);

    entered_back.reverse();
    assert_eq!(entered_back, left);
    let mut entered = entered;
    entered.reverse();
    assert_eq!(left_back, entered);
}

#[test]
fn test_hover_event_order() {
    let (tree, [_, panel, a, a_inner, b, _]) = panel_tree();
    let mut state = InputState::default();
    let mut events = Vec::new();
    state.handle(&tree, hit(a_inner), &move_to(), &mut events);

    events.clear();
    state.handle(&tree, hit(b), &move_to(), &mut events);
    let sequence: Vec<(EventKind, NodeId)> = events
        .iter()
        .map(|e| (e.kind, e.target.node()))
        .collect();
    assert_eq!(
        sequence,
        vec![
            (EventKind::MouseOut, a_inner),
            (EventKind::MouseLeave, a_inner),
            (EventKind::MouseLeave, a),
            (EventKind::MouseOver, b),
            (EventKind::MouseEnter, b),
            (EventKind::MouseMove, b),
        ]
    );
    // panel is common to both chains
    assert!(events.iter().all(|e| e.target.node() != panel));
    assert_eq!(events[0].related, Some(b));
    assert_eq!(events[3].related, Some(a_inner));
}

#[test]
fn test_no_hover_events_without_change() {
    let (tree, [_, _, a, _, _, _]) = panel_tree();
    let mut state = InputState::default();
    let mut events = Vec::new();
    state.handle(&tree, hit(a), &move_to(), &mut events);
    events.clear();
    state.handle(&tree, hit(a), &move_to(), &mut events);
    assert_eq!(of_kind(&events, EventKind::MouseMove), vec![a]);
    assert_eq!(events.len(), 1);
}

#[test]
fn test_leaving_to_background() {
    let (tree, [root, panel, a, _, _, _]) = panel_tree();
    let mut state = InputState::default();
    let mut events = Vec::new();
    state.handle(&tree, hit(a), &move_to(), &mut events);
    events.clear();
    state.handle(&tree, None, &move_to(), &mut events);
    assert_eq!(of_kind(&events, EventKind::MouseLeave), vec![a, panel, root]);
    assert_eq!(state.hovered_element(), None);
}

#[test]
fn test_removed_hover_leaf_falls_back_to_ancestor() {
    let (mut tree, [root, panel, a, a_inner, _, footer]) = panel_tree();
    let mut state = InputState::default();
    let mut events = Vec::new();
    state.handle(&tree, hit(a_inner), &move_to(), &mut events);
    assert_eq!(
        of_kind(&events, EventKind::MouseEnter),
        vec![root, panel, a, a_inner]
    );

    tree.remove_child(a, a_inner).unwrap();
    events.clear();
    state.handle(&tree, hit(a), &move_to(), &mut events);
    // a was entered already and never left
    assert_eq!(state.hovered_element(), Some(a));
    assert!(of_kind(&events, EventKind::MouseEnter).is_empty());
    assert!(of_kind(&events, EventKind::MouseOver).is_empty());

    events.clear();
    state.handle(&tree, hit(footer), &move_to(), &mut events);
    assert_eq!(of_kind(&events, EventKind::MouseLeave), vec![a, panel]);
    assert_eq!(of_kind(&events, EventKind::MouseEnter), vec![footer]);
}

#[test]
fn test_hover_crosses_shadow_boundary() {
    let mut tree = SceneTree::new();
    let root = tree.create_root();
    let host = tree.create_element("host");
    let light = tree.create_element("light");
    tree.append_child(root, host).unwrap();
    tree.append_child(host, light).unwrap();
    let shadow = tree.attach_shadow(host, ShadowRootInit::default()).unwrap();
    let wrapper = tree.create_element("wrapper");
    let slot = tree.create_slot("");
    tree.append_child(shadow, wrapper).unwrap();
    tree.append_child(wrapper, slot).unwrap();
    tree.assign_slot(slot, &[light]).unwrap();

    let mut state = InputState::default();
    let mut events = Vec::new();
    state.handle(&tree, hit(light), &move_to(), &mut events);
    // Enter runs down the composed path through the slot
    assert_eq!(
        of_kind(&events, EventKind::MouseEnter),
        vec![root, host, wrapper, slot, light]
    );
}

#[test]
fn test_text_has_its_own_hover() {
    let (mut tree, [_, _, a, _, _, footer]) = panel_tree();
    let label = tree.create_text("label");
    tree.append_child(a, label).unwrap();

    let mut state = InputState::default();
    let mut events = Vec::new();
    state.handle(&tree, hit(label), &move_to(), &mut events);
    assert_eq!(state.hovered_element(), Some(a));
    assert_eq!(state.hovered_text(), Some(label));
    assert!(
        events
            .iter()
            .any(|e| e.target == Target::Text(label) && e.kind == EventKind::MouseOver)
    );

    events.clear();
    state.handle(&tree, hit(footer), &move_to(), &mut events);
    assert_eq!(state.hovered_text(), None);
    assert!(
        events
            .iter()
            .any(|e| e.target == Target::Text(label) && e.kind == EventKind::MouseOut)
    );
}

// ============================================================================
// Click
// ============================================================================

#[test]
fn test_click_requires_same_target() {
    let (tree, [_, _, a, _, b, _]) = panel_tree();
    let mut state = InputState::default();
    let mut events = Vec::new();

    state.handle(&tree, hit(a), &press(), &mut events);
    state.handle(&tree, hit(b), &release(), &mut events);
    assert!(of_kind(&events, EventKind::Click).is_empty());
    // Press still ends on the pressed element
    assert_eq!(of_kind(&events, EventKind::Release), vec![a]);
    assert_eq!(of_kind(&events, EventKind::Deactivate), vec![a]);
    assert_eq!(state.pressed_element(), None);

    events.clear();
    state.handle(&tree, hit(a), &press(), &mut events);
    state.handle(&tree, hit(a), &release(), &mut events);
    assert_eq!(of_kind(&events, EventKind::Click), vec![a]);
    assert_eq!(of_kind(&events, EventKind::Activate), vec![a]);
}

#[test]
fn test_release_without_press() {
    let (tree, [_, _, a, _, _, _]) = panel_tree();
    let mut state = InputState::default();
    let mut events = Vec::new();
    state.handle(&tree, hit(a), &release(), &mut events);
    assert_eq!(of_kind(&events, EventKind::MouseUp), vec![a]);
    assert!(of_kind(&events, EventKind::Click).is_empty());
    assert!(of_kind(&events, EventKind::Release).is_empty());
}

#[test]
fn test_virtual_child_click() {
    let (tree, [_, _, a, _, _, _]) = panel_tree();
    let thumb = Some(Hit {
        node: a,
        index: 2,
        virtual_child: 1,
    });
    let mut state = InputState::default();
    let mut events = Vec::new();
    state.handle(&tree, thumb, &press(), &mut events);
    state.handle(&tree, thumb, &release(), &mut events);

    let thumb_target = Target::VirtualChild {
        element: a,
        index: 1,
    };
    let clicks: Vec<Target> = events
        .iter()
        .filter(|e| e.kind == EventKind::Click)
        .map(|e| e.target)
        .collect();
    assert_eq!(clicks, vec![Target::Element(a), thumb_target]);
}

#[test]
fn test_wheel_and_context_target_element() {
    let (tree, [_, _, a, _, _, _]) = panel_tree();
    let mut state = InputState::default();
    let mut events = Vec::new();
    let wheel = InputEvent::Wheel {
        x: 1.0,
        y: 1.0,
        delta_x: 0.0,
        delta_y: -3.0,
        modifiers: Modifiers::NONE,
    };
    let context = InputEvent::Context {
        x: 1.0,
        y: 1.0,
        modifiers: Modifiers::NONE,
    };
    state.handle(&tree, hit(a), &wheel, &mut events);
    state.handle(&tree, hit(a), &context, &mut events);
    assert_eq!(
        events[0].kind,
        EventKind::Wheel {
            delta_x: 0.0,
            delta_y: -3.0
        }
    );
    assert_eq!(events[1].kind, EventKind::ContextMenu);
    assert!(events.iter().all(|e| e.target == Target::Element(a)));
}
