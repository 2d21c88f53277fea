use std::sync::Arc;

use grove::store::{NodeStore, SledNodeStore};
use grove::{ForestService, Parent, SortMode};
use tempfile::TempDir;

#[test]
fn service_state_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store");

    let moved_id = {
        let store: Arc<dyn NodeStore> = Arc::new(SledNodeStore::new(&path).unwrap());
        let service = ForestService::without_logging(store);
        service.seed().unwrap();
        service.move_up(5).unwrap();
        service.store().flush().unwrap();
        5
    };

    let store: Arc<dyn NodeStore> = Arc::new(SledNodeStore::new(&path).unwrap());
    let service = ForestService::without_logging(store);
    assert_eq!(service.get_all_nodes().unwrap().len(), 16);
    let children = service.get_children(1, SortMode::Custom).unwrap();
    let order: Vec<u64> = children.iter().map(|n| n.id).collect();
    assert_eq!(order, vec![3, moved_id, 4, 6]);

    // ids keep counting from where the previous session stopped
    let added = service.add_node("Fig", Parent::Root).unwrap();
    assert_eq!(added.id, 17);
    assert_eq!(added.display_index, 2);
}

#[test]
fn deep_chain_deletes_without_recursion() {
    let store: Arc<dyn NodeStore> = Arc::new(SledNodeStore::temporary().unwrap());
    let service = ForestService::without_logging(store);

    let mut parent = Parent::Root;
    let mut first = None;
    for depth in 0..2_000 {
        let node = service.add_node(&format!("level {depth}"), parent).unwrap();
        first.get_or_insert(node.id);
        parent = Parent::ChildOf(node.id);
    }
    let Some(top) = first else {
        panic!("chain is empty");
    };

    assert_eq!(service.count_descendants(top).unwrap(), 1_999);
    let Parent::ChildOf(bottom) = parent else {
        panic!("chain has no bottom");
    };
    let outcome = service
        .move_to_another_parent(top, Parent::ChildOf(bottom))
        .unwrap();
    assert!(!outcome.success);

    assert_eq!(service.delete_subtree(top).unwrap(), 2_000);
    assert!(service.get_all_nodes().unwrap().is_empty());
}

#[test]
fn normalize_repairs_concurrent_appends() {
    let store = Arc::new(SledNodeStore::temporary().unwrap());
    let service = ForestService::without_logging(store.clone());
    let a = service.add_node("A", Parent::Root).unwrap();
    let b = service.add_node("B", Parent::Root).unwrap();

    // a second writer appended using a stale view of the group
    let mut stale = b.clone();
    stale.id = service.add_node("C", Parent::Root).unwrap().id;
    stale.name = "C".to_string();
    store.update(&stale).unwrap();

    let report = service.validate().unwrap();
    assert!(!report.valid);
    assert_eq!(service.normalize_all().unwrap(), 1);
    let roots = service.get_root_nodes(SortMode::Custom).unwrap();
    let indices: Vec<u32> = roots.iter().map(|n| n.display_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(roots[0].id, a.id);
}
