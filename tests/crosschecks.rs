use btree_index::{BTree, OrderedIndex};
use proptest::prelude::*;
use std::collections::BTreeMap as StdMap;

#[derive(Debug, Clone)]
enum Op {
    Insert(u16, u16),
    Delete(u16),
}

// Narrow key range so deletes hit existing keys often
fn scripts() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            (0u16..256, any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
            (0u16..256).prop_map(Op::Delete),
        ],
        0..400,
    )
}

fn small_int_pairs() -> impl Strategy<Value = Vec<(u16, u16)>> {
    prop::collection::vec((0u16..512, any::<u16>()), 0..200)
}

fn apply<I: OrderedIndex<u16, u16>>(index: &mut I, op: &Op) -> bool {
    match *op {
        Op::Insert(k, v) => index.insert(k, v),
        Op::Delete(k) => index.delete(&k),
    }
}

fn build(pairs: &[(u16, u16)], t: usize) -> (BTree<u16, u16>, StdMap<u16, u16>) {
    let mut tree = BTree::with_min_degree(t).unwrap();
    let mut oracle = StdMap::new();
    for &(k, v) in pairs {
        OrderedIndex::insert(&mut tree, k, v);
        OrderedIndex::insert(&mut oracle, k, v);
    }
    (tree, oracle)
}

fn sorted(mut values: Vec<&u16>) -> Vec<&u16> {
    values.sort_unstable();
    values
}

proptest! {
    #[test]
    fn crosscheck_scripts(script in scripts(), t in 2usize..6) {
        let mut tree: BTree<u16, u16> = BTree::with_min_degree(t).unwrap();
        let mut oracle: StdMap<u16, u16> = StdMap::new();

        for op in &script {
            prop_assert_eq!(apply(&mut tree, op), apply(&mut oracle, op));
            prop_assert_eq!(tree.len(), oracle.len());
        }
        prop_assert!(tree.validate().is_ok());

        let expected: Vec<&u16> = oracle.values().collect();
        prop_assert_eq!(tree.inorder(), expected);
        for k in 0..256u16 {
            prop_assert_eq!(tree.search(&k), oracle.get(&k));
        }
    }

    #[test]
    fn traversals_agree(pairs in small_int_pairs(), t in 2usize..5) {
        let (tree, _) = build(&pairs, t);
        let inorder = tree.inorder();
        prop_assert_eq!(sorted(tree.preorder()), sorted(inorder.clone()));
        prop_assert_eq!(sorted(tree.postorder()), sorted(inorder));
    }

    #[test]
    fn failed_delete_keeps_contents(pairs in small_int_pairs(), missing in 512u16..1024) {
        let (mut tree, _) = build(&pairs, 2);
        let before: Vec<u16> = tree.inorder().into_iter().copied().collect();

        prop_assert!(!tree.delete(&missing));
        let after: Vec<u16> = tree.inorder().into_iter().copied().collect();
        prop_assert_eq!(before, after);
        prop_assert!(tree.validate().is_ok());
    }

    #[test]
    fn merge_is_union(left in small_int_pairs(), right in small_int_pairs(), t in 2usize..5) {
        let (mut tree, mut expected) = build(&left, t);
        let (other, other_map) = build(&right, t);
        for (k, v) in other_map {
            expected.entry(k).or_insert(v);
        }

        prop_assert!(tree.merge(other));
        prop_assert!(tree.validate().is_ok());
        prop_assert_eq!(tree.len(), expected.len());
        let expected_values: Vec<&u16> = expected.values().collect();
        prop_assert_eq!(tree.inorder(), expected_values);
    }
}
