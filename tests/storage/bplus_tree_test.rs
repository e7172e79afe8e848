use treedb::{
    storage::table::{Table, TableConfig},
    types::{error::DatabaseError, page::NodeType, row::Row},
    utils::mock::TempDatabase,
};

fn create_test_row(id: u32) -> Row {
    Row::new(id, format!("user{}", id), format!("person{}@example.com", id))
}

fn small_config() -> TableConfig {
    TableConfig::default().with_leaf_max_cells(3)
}

fn insert_all(table: &mut Table, ids: impl IntoIterator<Item = u32>) {
    for id in ids {
        table.insert(&create_test_row(id)).unwrap();
    }
}

fn ids(table: &mut Table) -> Vec<u32> {
    table.scan_all().unwrap().into_iter().map(|row| row.id).collect()
}

#[test]
fn test_first_split_promotes_root() {
    let mut db = TempDatabase::with_prefix("first_split")
        .unwrap()
        .with_config(small_config());
    let table = db.open().unwrap();

    insert_all(table, 1..=3);
    assert_eq!(table.pager_mut().node_type(0).unwrap(), NodeType::Leaf);
    assert_eq!(table.pager().num_pages(), 1);

    insert_all(table, [4]);
    assert_eq!(table.pager_mut().node_type(0).unwrap(), NodeType::Internal);
    assert_eq!(table.pager().num_pages(), 3);
    assert_eq!(
        table.describe_tree().unwrap(),
        "- internal (size 1)\n\
         \x20 - leaf (size 2)\n\
         \x20   - 1\n\
         \x20   - 2\n\
         \x20 - key 2\n\
         \x20 - leaf (size 2)\n\
         \x20   - 3\n\
         \x20   - 4\n"
    );
    assert_eq!(ids(table), vec![1, 2, 3, 4]);
}

#[test]
fn test_root_children_point_back_to_root() {
    let mut db = TempDatabase::with_prefix("parents")
        .unwrap()
        .with_config(small_config());
    let table = db.open().unwrap();
    insert_all(table, 1..=4);

    let root = table.pager_mut().internal(0).unwrap();
    let (left, right) = (root.child(0).unwrap(), root.right_child());
    assert!(root.is_root());
    assert_eq!((left, right), (2, 1));

    let left_leaf = table.pager_mut().leaf(left).unwrap();
    assert!(!left_leaf.is_root());
    assert_eq!(left_leaf.parent(), 0);
    assert_eq!(left_leaf.next_leaf(), right);

    let right_leaf = table.pager_mut().leaf(right).unwrap();
    assert_eq!(right_leaf.parent(), 0);
    assert_eq!(right_leaf.next_leaf(), 0);
}

#[test]
fn test_right_child_split_demotes_old_right_child() {
    let mut db = TempDatabase::with_prefix("right_split")
        .unwrap()
        .with_config(small_config());
    let table = db.open().unwrap();
    insert_all(table, 1..=6);

    let root = table.pager_mut().internal(0).unwrap();
    assert_eq!(root.num_keys(), 2);
    assert_eq!(root.key(0), 2);
    assert_eq!(root.key(1), 4);
    assert_eq!(root.child(0).unwrap(), 2);
    assert_eq!(root.child(1).unwrap(), 1);
    assert_eq!(root.right_child(), 3);
    assert_eq!(ids(table), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_middle_leaf_split_keeps_keys_ordered() {
    let mut db = TempDatabase::with_prefix("middle_split")
        .unwrap()
        .with_config(small_config());
    let table = db.open().unwrap();
    insert_all(table, [10, 20, 30, 40, 50, 60, 11, 12, 13]);

    assert_eq!(ids(table), vec![10, 11, 12, 13, 20, 30, 40, 50, 60]);
    let root = table.pager_mut().internal(0).unwrap();
    let keys: Vec<u32> = (0..root.num_keys()).map(|i| root.key(i)).collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys {:?}", keys);
}

#[test]
fn test_descending_inserts() {
    let mut db = TempDatabase::with_prefix("descending")
        .unwrap()
        .with_config(small_config());
    let table = db.open().unwrap();
    insert_all(table, (1..=30).rev());
    assert_eq!(ids(table), (1..=30).collect::<Vec<_>>());
    for id in 1..=30 {
        assert_eq!(table.get(id).unwrap(), Some(create_test_row(id)));
    }
}

#[test]
fn test_split_conserves_rows() {
    let mut db = TempDatabase::with_prefix("conserve").unwrap();
    let table = db.open().unwrap();
    insert_all(table, (1..=14).map(|i| i * 3));

    let root = table.pager_mut().internal(0).unwrap();
    let (left, right) = (root.child(0).unwrap(), root.right_child());
    let left_cells = table.pager_mut().leaf(left).unwrap().num_cells();
    let right_cells = table.pager_mut().leaf(right).unwrap().num_cells();
    assert_eq!(left_cells, 7);
    assert_eq!(right_cells, 7);
    assert_eq!(table.scan_all().unwrap().len(), 14);
}

#[test]
fn test_duplicate_key_is_rejected() {
    let mut db = TempDatabase::with_prefix("duplicate")
        .unwrap()
        .with_config(small_config());
    let table = db.open().unwrap();
    insert_all(table, 1..=5);

    let result = table.insert(&Row::new(3, "other", "other@example.com"));
    match result {
        Err(DatabaseError::DuplicateKey { key }) => assert_eq!(key, 3),
        other => panic!("Expected DuplicateKey, got {:?}", other),
    }
    assert_eq!(table.get(3).unwrap(), Some(create_test_row(3)));
    assert_eq!(ids(table), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_full_internal_node_fails_without_changes() {
    let mut db = TempDatabase::with_prefix("internal_full")
        .unwrap()
        .with_config(small_config().with_internal_max_cells(1));
    let table = db.open().unwrap();
    insert_all(table, 1..=5);
    let before = table.describe_tree().unwrap();
    let pages_before = table.pager().num_pages();

    match table.insert(&create_test_row(6)) {
        Err(DatabaseError::InternalNodeFull {
            page_num,
            max_cells,
        }) => {
            assert_eq!(page_num, 0);
            assert_eq!(max_cells, 1);
        }
        other => panic!("Expected InternalNodeFull, got {:?}", other),
    }
    assert_eq!(table.describe_tree().unwrap(), before);
    assert_eq!(table.pager().num_pages(), pages_before);
    assert_eq!(ids(table), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_table_full_fails_without_changes() {
    let mut db = TempDatabase::with_prefix("table_full")
        .unwrap()
        .with_config(small_config().with_max_pages(3));
    let table = db.open().unwrap();
    insert_all(table, 1..=5);

    match table.insert(&create_test_row(6)) {
        Err(DatabaseError::PageOutOfBounds {
            page_num,
            max_pages,
        }) => {
            assert_eq!(page_num, 3);
            assert_eq!(max_pages, 3);
        }
        other => panic!("Expected PageOutOfBounds, got {:?}", other),
    }
    assert_eq!(ids(table), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_root_split_needs_two_pages() {
    let mut db = TempDatabase::with_prefix("root_pages")
        .unwrap()
        .with_config(small_config().with_max_pages(2));
    let table = db.open().unwrap();
    insert_all(table, 1..=3);
    assert!(matches!(
        table.insert(&create_test_row(4)),
        Err(DatabaseError::PageOutOfBounds { page_num: 2, .. })
    ));
    assert_eq!(table.pager_mut().node_type(0).unwrap(), NodeType::Leaf);
    assert_eq!(ids(table), vec![1, 2, 3]);
}

#[test]
fn test_find_positions_cursor() {
    let mut db = TempDatabase::with_prefix("find")
        .unwrap()
        .with_config(small_config());
    let table = db.open().unwrap();
    insert_all(table, [2, 4, 6, 8, 10]);

    let mut cursor = table.find(6).unwrap();
    assert_eq!(cursor.key().unwrap(), Some(6));
    assert_eq!(cursor.value().unwrap(), Some(create_test_row(6)));

    let mut cursor = table.find(5).unwrap();
    assert_eq!(cursor.key().unwrap(), Some(6));

    assert_eq!(table.get(5).unwrap(), None);
    assert_eq!(table.get(11).unwrap(), None);
}

#[test]
fn test_scan_from_found_position() {
    use treedb::executor::scan::ScanIterator;

    let mut db = TempDatabase::with_prefix("scan_from")
        .unwrap()
        .with_config(small_config());
    let table = db.open().unwrap();
    insert_all(table, 1..=9);

    let rows: Vec<u32> = ScanIterator::new(table.find(4).unwrap())
        .map(|row| row.unwrap().id)
        .collect();
    assert_eq!(rows, vec![4, 5, 6, 7, 8, 9]);

    let rows: Vec<u32> = ScanIterator::new(table.find(100).unwrap())
        .map(|row| row.unwrap().id)
        .collect();
    assert!(rows.is_empty());
}

#[test]
fn test_key_zero() {
    let mut db = TempDatabase::with_prefix("key_zero")
        .unwrap()
        .with_config(small_config());
    let table = db.open().unwrap();
    insert_all(table, [5, 0, 3, 1]);
    assert_eq!(ids(table), vec![0, 1, 3, 5]);
    assert_eq!(table.get(0).unwrap(), Some(create_test_row(0)));
}

#[test]
fn test_scan_in_batches_across_leaves() {
    use treedb::executor::scan::Scanner;

    let mut db = TempDatabase::with_prefix("batches")
        .unwrap()
        .with_config(small_config());
    let table = db.open().unwrap();
    insert_all(table, 1..=7);

    let mut cursor = table.start().unwrap();
    let batch: Vec<u32> = cursor.scan_batch(4).unwrap().iter().map(|r| r.id).collect();
    assert_eq!(batch, vec![1, 2, 3, 4]);
    let batch: Vec<u32> = cursor.scan_batch(4).unwrap().iter().map(|r| r.id).collect();
    assert_eq!(batch, vec![5, 6, 7]);
    assert!(cursor.is_end());
    assert!(cursor.scan_batch(4).unwrap().is_empty());
}

#[test]
fn test_out_of_order_inserts_split_and_reject_duplicate() {
    let mut db = TempDatabase::with_prefix("scenario")
        .unwrap()
        .with_config(small_config());
    let table = db.open().unwrap();

    insert_all(table, [3, 1, 2]);
    let leaf = table.pager_mut().leaf(0).unwrap();
    let keys: Vec<u32> = (0..leaf.num_cells()).map(|i| leaf.key(i)).collect();
    assert_eq!(keys, vec![1, 2, 3]);

    insert_all(table, [4]);
    let root = table.pager_mut().internal(0).unwrap();
    assert_eq!(root.num_keys(), 1);
    assert_eq!(root.key(0), 2);
    let (left, right) = (root.child(0).unwrap(), root.right_child());
    assert_eq!(table.pager_mut().leaf(left).unwrap().next_leaf(), right);
    assert_eq!(ids(table), vec![1, 2, 3, 4]);

    let before = table.describe_tree().unwrap();
    assert!(matches!(
        table.insert(&create_test_row(2)),
        Err(DatabaseError::DuplicateKey { key: 2 })
    ));
    assert_eq!(table.describe_tree().unwrap(), before);
    assert_eq!(table.scan_all().unwrap(), (1..=4).map(create_test_row).collect::<Vec<_>>());
}
