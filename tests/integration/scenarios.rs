use std::sync::Arc;

use grove::store::{MemoryNodeStore, NodeStore, SledNodeStore};
use grove::{ForestService, Node, Parent, SortMode};

fn stores() -> Vec<(&'static str, Arc<dyn NodeStore>)> {
    vec![
        ("memory", Arc::new(MemoryNodeStore::new())),
        ("sled", Arc::new(SledNodeStore::temporary().unwrap())),
    ]
}

fn names(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(|n| n.name.as_str()).collect()
}

#[test]
fn move_down_swaps_siblings() {
    for (label, store) in stores() {
        let service = ForestService::without_logging(store);
        let a = service.add_node("A", Parent::Root).unwrap();
        let b = service.add_node("B", Parent::ChildOf(a.id)).unwrap();
        let c = service.add_node("C", Parent::ChildOf(a.id)).unwrap();

        assert!(service.move_down(b.id).unwrap(), "{label}");
        assert_eq!(service.get_node(b.id).unwrap().display_index, 1, "{label}");
        assert_eq!(service.get_node(c.id).unwrap().display_index, 0, "{label}");
        assert_eq!(
            names(&service.get_children(a.id, SortMode::Custom).unwrap()),
            vec!["C", "B"],
            "{label}"
        );
    }
}

#[test]
fn reparent_under_own_grandchild_is_rejected() {
    for (label, store) in stores() {
        let service = ForestService::without_logging(store);
        let a = service.add_node("A", Parent::Root).unwrap();
        let b = service.add_node("B", Parent::ChildOf(a.id)).unwrap();
        let c = service.add_node("C", Parent::ChildOf(b.id)).unwrap();
        let before = service.get_all_nodes().unwrap();

        let outcome = service
            .move_to_another_parent(a.id, Parent::ChildOf(c.id))
            .unwrap();
        assert!(!outcome.success, "{label}");
        assert!(!outcome.changed, "{label}");
        assert_eq!(service.get_all_nodes().unwrap(), before, "{label}");
    }
}

#[test]
fn delete_subtree_removes_every_descendant() {
    for (label, store) in stores() {
        let service = ForestService::without_logging(store);
        let a = service.add_node("A", Parent::Root).unwrap();
        let b = service.add_node("B", Parent::ChildOf(a.id)).unwrap();
        let c = service.add_node("C", Parent::ChildOf(a.id)).unwrap();

        assert_eq!(service.delete_subtree(a.id).unwrap(), 3, "{label}");
        let remaining: Vec<u64> = service
            .get_all_nodes()
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        for id in [a.id, b.id, c.id] {
            assert!(!remaining.contains(&id), "{label}");
        }
        assert_eq!(service.delete_subtree(a.id).unwrap(), 0, "{label}");
    }
}

#[test]
fn new_root_is_appended_after_existing_roots() {
    for (label, store) in stores() {
        let service = ForestService::without_logging(store);
        service.add_node("first", Parent::Root).unwrap();
        service.add_node("second", Parent::Root).unwrap();
        let x = service.add_node("X", Parent::Root).unwrap();
        assert_eq!(x.display_index, 2, "{label}");
    }
}

#[test]
fn reparent_keeps_both_groups_dense() {
    for (label, store) in stores() {
        let service = ForestService::without_logging(store);
        service.seed().unwrap();
        // Banana (#4) with its subtree goes under Lemon (#7)
        let outcome = service
            .move_to_another_parent(4, Parent::ChildOf(7))
            .unwrap();
        assert!(outcome.success && outcome.changed, "{label}");

        let pineapple = service.get_children(1, SortMode::Custom).unwrap();
        assert_eq!(names(&pineapple), vec!["Apple", "Orange", "Cherry"], "{label}");
        let lemon = service.get_children(7, SortMode::Custom).unwrap();
        assert_eq!(names(&lemon), vec!["Grapefruit", "Mango", "Banana"], "{label}");
        assert_eq!(service.count_descendants(7).unwrap(), 8, "{label}");
        assert!(service.validate().unwrap().valid, "{label}");
    }
}
