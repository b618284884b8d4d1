use super::*;

use rand::Rng;

use crate::storage::MemoryStore;

#[test]
fn it_creates_an_empty_tree() {
    let tree: Strata<usize> = Strata::new();
    assert!(tree.is_empty());
    assert_eq!(tree.count(), 0);
    assert_eq!(tree.height(), 0);
    assert!(tree.keys().is_empty());
    assert_eq!(tree.get(42), None);
}

#[test]
fn it_rejects_a_tiny_capacity() {
    let err = Strata::<usize>::try_new(1).expect_err("capacity 1 is too small");
    assert!(matches!(
        err.downcast_ref::<StrataError>(),
        Some(StrataError::CapacityTooSmall(1))
    ));
}

#[test]
fn it_inserts_a_single_key() {
    let mut tree = Strata::new();
    tree.insert(10, 100);
    assert!(!tree.is_empty());
    assert!(tree.contains(10));
    assert_eq!(tree.get(10), Some(&100));
    assert_eq!(tree.keys(), vec![10]);
}

#[test]
fn it_updates_an_existing_key() {
    let mut tree = Strata::new();
    tree.insert(10, 100);
    tree.insert(10, 200);
    assert_eq!(tree.get(10), Some(&200));
    assert_eq!(tree.keys(), vec![10]);
    assert_eq!(tree.count(), 1);
}

#[test]
fn it_returns_keys_in_order() {
    let mut tree = Strata::new();
    for key in [10, 20, 5, 15, 25] {
        tree.insert(key, key * 10);
    }
    assert_eq!(tree.keys(), vec![5, 10, 15, 20, 25]);
}

#[test]
fn it_splits_the_root_leaf() {
    let mut tree = Strata::try_new(4).expect("creates tree");
    for key in [10, 20, 5, 6, 12] {
        tree.insert(key, key);
    }

    // The fifth insert overflows the root leaf: one separator, two leaves
    assert_eq!(tree.height(), 1);
    let Some(Node::Inner(root)) = tree.root.as_ref() else {
        panic!("root must be an inner node after the split");
    };
    assert_eq!(root.keys, vec![12]);
    assert_eq!(root.children.len(), 2);

    let [Node::Leaf(left), Node::Leaf(right)] = root.children.as_slice() else {
        panic!("both children must be leaves");
    };
    assert_eq!(left.keys, vec![5, 6, 10]);
    assert_eq!(right.keys, vec![12, 20]);
    // The separator is a copy of the right leaf's first key
    assert_eq!(right.keys[0], 12);
    // And the chain now runs left to right
    assert_eq!(left.next, Some(right.id));
    assert_eq!(right.next, None);
}

#[test]
fn it_handles_sequential_inserts() {
    let mut tree = Strata::new();
    for key in 1..=200 {
        tree.insert(key, key * 100);
    }
    let keys = tree.keys();
    assert_eq!(keys.len(), 200);
    assert_eq!(keys, (1..=200).collect::<Vec<i64>>());
    assert!(matches!(tree.root, Some(Node::Inner(_))));
}

#[test]
fn it_handles_reverse_inserts() {
    let mut tree = Strata::try_new(5).expect("creates tree");
    for key in (0..400).rev() {
        tree.insert(key, key);
    }
    for key in 0..400 {
        assert!(tree.contains(key));
    }
    assert_eq!(tree.keys(), (0..400).collect::<Vec<i64>>());
}

#[test]
fn it_handles_random_inserts() {
    let mut tree = Strata::try_new(8).expect("creates tree");
    let mut input = vec![];
    for _i in 0..400 {
        let key = rand::thread_rng().gen_range(0..100_000);
        tree.insert(key, key * 2);
        input.push(key);
    }
    for key in &input {
        assert_eq!(tree.get(*key), Some(&(key * 2)));
    }

    let keys = tree.keys();
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    let mut distinct = input.clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(keys, distinct);
    assert_eq!(tree.count(), distinct.len());
}

#[test]
fn it_keeps_leaves_at_least_half_full() {
    let mut tree = Strata::try_new(4).expect("creates tree");
    for key in 1..=100 {
        tree.insert(key, key);
    }
    // Away from the root path every leaf holds between ceil(c/2) and c keys
    for leaf in tree.leaves() {
        assert!(leaf.keys.len() >= 2, "underfull leaf: {:?}", leaf.keys);
        assert!(leaf.keys.len() <= 4, "overfull leaf: {:?}", leaf.keys);
    }
}

#[test]
fn it_grows_height_one_level_at_a_time() {
    let mut tree = Strata::try_new(4).expect("creates tree");
    let mut height = tree.height();
    for key in 1..=500 {
        tree.insert(key, key);
        let now = tree.height();
        assert!(now - height <= 1, "height jumped from {height} to {now}");
        height = now;
    }
    assert!(height >= 2);
}

#[test]
fn it_iterates_entries_in_order() {
    let mut tree = Strata::try_new(4).expect("creates tree");
    for key in [40, 10, 30, 20] {
        tree.insert(key, key * 10);
    }
    let entries: Vec<(i64, i64)> = tree.entries().map(|(k, v)| (k, *v)).collect();
    assert_eq!(entries, vec![(10, 100), (20, 200), (30, 300), (40, 400)]);
}

#[test_log::test(tokio::test)]
async fn it_round_trips_a_tree_through_a_provider() {
    let mut tree = Strata::try_new(4).expect("creates tree");
    let mut input = vec![];
    for _i in 0..50 {
        let key = rand::thread_rng().gen_range(0..10_000);
        tree.insert(key, format!("value{key}"));
        input.push(key);
    }

    let store = MemoryStore::new();
    tree.save(&store).await.expect("saves tree");

    let mut loaded = Strata::try_new(4).expect("creates tree");
    loaded.load(&store).await.expect("loads tree");

    assert_eq!(loaded.count(), tree.count());
    for key in input {
        assert_eq!(loaded.get(key), tree.get(key));
    }
}

#[test_log::test(tokio::test)]
async fn it_round_trips_an_empty_tree() {
    let tree: Strata<usize> = Strata::new();
    let store = MemoryStore::new();
    tree.save(&store).await.expect("saves tree");

    let mut loaded: Strata<usize> = Strata::new();
    loaded.insert(1, 1);
    loaded.load(&store).await.expect("loads tree");
    assert!(loaded.is_empty());
}

#[test_log::test(tokio::test)]
async fn it_does_not_relink_the_leaf_chain_on_load() {
    let mut tree = Strata::try_new(4).expect("creates tree");
    for key in 1..=20 {
        tree.insert(key, key);
    }
    assert!(tree.leaves().len() > 1);

    let store = MemoryStore::new();
    tree.save(&store).await.expect("saves tree");
    let mut loaded: Strata<i64> = Strata::try_new(4).expect("creates tree");
    loaded.load(&store).await.expect("loads tree");

    // Structure and lookups survive the round trip...
    assert_eq!(loaded.count(), 20);
    for key in 1..=20 {
        assert_eq!(loaded.get(key), Some(&key));
    }
    // ...but the chain was not persisted, so an ordered walk stops at the
    // end of the leftmost leaf
    let walked = loaded.keys();
    assert_eq!(walked, tree.keys()[..walked.len()]);
    assert_eq!(walked.len(), loaded.leaves()[0].keys.len());
    assert!(walked.len() < 20);
}

#[test]
fn it_rejects_unknown_node_kinds() {
    #[derive(serde::Serialize)]
    struct Bogus<'a> {
        kind: &'a str,
    }

    let bytes = rmp_serde::to_vec_named(&Bogus { kind: "invalid" }).expect("encodes");
    let err = codec::decode::<usize>(&bytes).expect_err("unknown kind must fail");
    assert!(matches!(
        err.downcast_ref::<StrataError>(),
        Some(StrataError::InvalidFormat(_))
    ));
}

#[test]
fn it_encodes_one_blob_per_level() {
    let mut tree = Strata::try_new(4).expect("creates tree");
    for key in 1..=100 {
        tree.insert(key, key);
    }
    assert!(tree.height() >= 2);

    let levels = codec::encode_levels(tree.root.as_ref()).expect("encodes levels");
    let numbers: Vec<u32> = levels.keys().copied().collect();
    assert_eq!(numbers, (0..=tree.height()).collect::<Vec<u32>>());
    assert!(levels.values().all(|blob| !blob.is_empty()));
}

#[test_log::test(tokio::test)]
async fn it_round_trips_level_shards() {
    let mut tree = Strata::try_new(4).expect("creates tree");
    let mut input = vec![];
    for _i in 0..200 {
        let key = rand::thread_rng().gen_range(0..50_000);
        tree.insert(key, key + 7);
        input.push(key);
    }

    let store = MemoryStore::new();
    tree.save_sharded(&store).await.expect("saves shards");

    let mut loaded: Strata<i64> = Strata::try_new(4).expect("creates tree");
    loaded.load_sharded(&store).await.expect("loads shards");

    for key in input {
        assert_eq!(loaded.get(key), Some(&(key + 7)));
    }
    assert_eq!(loaded.count(), tree.count());
}

#[test_log::test(tokio::test)]
async fn it_keeps_contents_on_failed_load() {
    let mut tree = Strata::try_new(4).expect("creates tree");
    for key in [10, 20, 30] {
        tree.insert(key, key);
    }

    let empty_store = MemoryStore::new();
    tree.load(&empty_store).await.expect_err("nothing to load");
    assert_eq!(tree.keys(), vec![10, 20, 30]);

    tree.load_sharded(&empty_store)
        .await
        .expect_err("nothing to load");
    assert_eq!(tree.keys(), vec![10, 20, 30]);
}

#[test]
fn it_clears_the_tree() {
    let mut tree = Strata::new();
    for key in 0..10 {
        tree.insert(key, key);
    }
    tree.clear();
    assert!(tree.is_empty());
    assert!(!tree.contains(3));
}
