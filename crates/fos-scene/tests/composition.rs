//! Composed traversal integration tests

use std::collections::HashSet;

use fos_scene::{Composition, ComposedWalker, NodeId, SceneTree, ShadowRootInit};

fn composed(tree: &SceneTree, root: NodeId) -> Vec<NodeId> {
    tree.composed(root).collect()
}

// ============================================================================
// Slot projection
// ============================================================================

#[test]
fn test_slot_fallback_then_projection() {
    let mut tree = SceneTree::new();
    let root = tree.create_root();
    let slot = tree.create_slot("content");
    let fallback = tree.create_text("nothing here");
    let projected = tree.create_element("p");
    tree.append_child(root, slot).unwrap();
    tree.append_child(slot, fallback).unwrap();
    tree.append_child(root, projected).unwrap();

    // Projected node is still a literal child of root, but unassigned
    assert_eq!(composed(&tree, root), vec![root, slot, fallback, projected]);

    tree.assign_slot(slot, &[projected]).unwrap();
    // Shows under the slot, never at its literal position
    assert_eq!(composed(&tree, root), vec![root, slot, projected]);

    tree.assign_slot(slot, &[]).unwrap();
    assert_eq!(composed(&tree, root), vec![root, slot, fallback, projected]);
}

#[test]
fn test_slot_projects_many_in_order() {
    let mut tree = SceneTree::new();
    let root = tree.create_root();
    let slot = tree.create_slot("list");
    let a = tree.create_element("a");
    let b = tree.create_element("b");
    let c = tree.create_element("c");
    let b_child = tree.create_text("b text");
    tree.append_children(root, &[a, b, c, slot]).unwrap();
    tree.append_child(b, b_child).unwrap();

    tree.assign_slot(slot, &[c, b, a]).unwrap();
    assert_eq!(composed(&tree, root), vec![root, slot, c, b, b_child, a]);
}

#[test]
fn test_nested_slots() {
    let mut tree = SceneTree::new();
    let root = tree.create_root();
    let outer = tree.create_slot("outer");
    let inner = tree.create_slot("inner");
    let leaf = tree.create_element("leaf");
    let after = tree.create_element("after");
    tree.append_children(root, &[outer, after]).unwrap();
    tree.append_children(root, &[inner, leaf]).unwrap();

    tree.assign_slot(inner, &[leaf]).unwrap();
    tree.assign_slot(outer, &[inner]).unwrap();

    assert_eq!(composed(&tree, root), vec![root, outer, inner, leaf, after]);
}

// ============================================================================
// Shadow trees
// ============================================================================

#[test]
fn test_shadow_host_with_slot() {
    let mut tree = SceneTree::new();
    let root = tree.create_root();
    let host = tree.create_element("host");
    let light = tree.create_element("light");
    let sibling = tree.create_element("sibling");
    tree.append_children(root, &[host, sibling]).unwrap();
    tree.append_child(host, light).unwrap();

    let shadow = tree.attach_shadow(host, ShadowRootInit::default()).unwrap();
    let header = tree.create_element("header");
    let slot = tree.create_slot("");
    tree.append_children(shadow, &[header, slot]).unwrap();

    // Unassigned light child stays hidden behind the shadow tree
    assert_eq!(composed(&tree, root), vec![root, host, header, slot, sibling]);

    tree.assign_slot(slot, &[light]).unwrap();
    assert_eq!(
        composed(&tree, root),
        vec![root, host, header, slot, light, sibling]
    );

    // Shadow root itself is never visited
    assert!(!composed(&tree, root).contains(&shadow));
}

#[test]
fn test_shadow_scenario_never_shows_light_child() {
    let mut tree = SceneTree::new();
    let root = tree.create_root();
    let host = tree.create_element("host");
    let light = tree.create_element("light");
    tree.append_child(root, host).unwrap();
    tree.append_child(host, light).unwrap();
    let shadow = tree.attach_shadow(host, ShadowRootInit::default()).unwrap();
    let content = tree.create_element("content");
    tree.append_child(shadow, content).unwrap();

    let order = composed(&tree, root);
    assert_eq!(order, vec![root, host, content]);
    assert!(!order.contains(&light));
}

#[test]
fn test_composed_parent_follows_walk() {
    let mut tree = SceneTree::new();
    let root = tree.create_root();
    let host = tree.create_element("host");
    let light = tree.create_element("light");
    tree.append_child(root, host).unwrap();
    tree.append_child(host, light).unwrap();
    let shadow = tree.attach_shadow(host, ShadowRootInit::default()).unwrap();
    let slot = tree.create_slot("");
    tree.append_child(shadow, slot).unwrap();
    tree.assign_slot(slot, &[light]).unwrap();

    assert_eq!(tree.composed_parent(light), Some(slot));
    assert_eq!(tree.composed_parent(slot), Some(host));
    assert_eq!(tree.composed_ancestors(light), vec![light, slot, host, root]);
}

// ============================================================================
// Completeness and exclusivity
// ============================================================================

/// Builds a tree mixing hosts, slots and fallback content
fn mixed_tree() -> (SceneTree, NodeId) {
    let mut tree = SceneTree::new();
    let root = tree.create_root();
    for i in 0..4 {
        let host = tree.create_element(&format!("host{i}"));
        tree.append_child(root, host).unwrap();
        let lights: Vec<NodeId> = (0..3)
            .map(|j| tree.create_element(&format!("light{i}.{j}")))
            .collect();
        tree.append_children(host, &lights).unwrap();

        let shadow = tree.attach_shadow(host, ShadowRootInit::default()).unwrap();
        let first = tree.create_slot("first");
        let second = tree.create_slot("second");
        let fallback = tree.create_text("fallback");
        tree.append_children(shadow, &[first, second]).unwrap();
        tree.append_child(second, fallback).unwrap();
        tree.assign_slot(first, &lights[..i.min(3)]).unwrap();
    }
    (tree, root)
}

#[test]
fn test_composed_visits_each_node_once() {
    let (tree, root) = mixed_tree();
    let order = composed(&tree, root);
    let unique: HashSet<NodeId> = order.iter().copied().collect();
    assert_eq!(unique.len(), order.len());
    // root + 4 * (host + 2 slots + fallback) + assigned lights (0+1+2+3)
    assert_eq!(order.len(), 1 + 4 * 4 + 6);
}

#[test]
fn test_assigned_nodes_appear_right_after_their_slot_context() {
    let (tree, root) = mixed_tree();
    let mut walker = ComposedWalker::new(root, Composition::COMPOSED);
    while let Some(id) = walker.move_next(&tree) {
        let node = tree.get(id).unwrap();
        if let Some(slot) = node.assigned_slot() {
            // Only ever reached through the slot's projection
            assert!(walker.projection_depth() > 0);
            assert_eq!(tree.composed_parent(id), Some(slot));
        }
    }
}

#[test]
fn test_plain_policy_ignores_composition() {
    let (tree, root) = mixed_tree();
    let plain: Vec<NodeId> = tree.walk(root, Composition::PLAIN).collect();
    // root + 4 * (host + 3 lights)
    assert_eq!(plain.len(), 1 + 4 * 4);
    assert!(plain.iter().all(|&id| !tree.get(id).unwrap().is_slot()));
}

// ============================================================================
// Pruning
// ============================================================================

#[test]
fn test_skip_prunes_projected_subtree() {
    let mut tree = SceneTree::new();
    let root = tree.create_root();
    let host = tree.create_element("host");
    let light = tree.create_element("light");
    let light_child = tree.create_element("light child");
    let tail = tree.create_element("tail");
    tree.append_children(root, &[host, tail]).unwrap();
    tree.append_child(host, light).unwrap();
    tree.append_child(light, light_child).unwrap();
    let shadow = tree.attach_shadow(host, ShadowRootInit::default()).unwrap();
    let slot = tree.create_slot("");
    tree.append_child(shadow, slot).unwrap();
    tree.assign_slot(slot, &[light]).unwrap();

    let mut walker = ComposedWalker::new(root, Composition::COMPOSED);
    let mut visited = Vec::new();
    let mut next = walker.move_next(&tree);
    while let Some(id) = next {
        visited.push(id);
        next = if id == light {
            walker.skip_to_next_sibling(&tree)
        } else {
            walker.move_next(&tree)
        };
    }
    assert_eq!(visited, vec![root, host, slot, light, tail]);
}

#[test]
fn test_walker_restarts_after_mutation() {
    let mut tree = SceneTree::new();
    let root = tree.create_root();
    let a = tree.create_element("a");
    tree.append_child(root, a).unwrap();

    let mut walker = ComposedWalker::new(root, Composition::COMPOSED);
    assert_eq!(walker.move_next(&tree), Some(root));

    let b = tree.create_element("b");
    tree.append_child(root, b).unwrap();
    walker.reset();
    let mut order = Vec::new();
    while let Some(id) = walker.move_next(&tree) {
        order.push(id);
    }
    assert_eq!(order, vec![root, a, b]);
}
