//! Property suites over random trees, words, and boxes.

mod common;
use common::*;

use proptest::prelude::*;

use quadrille::{
    difference, intersection, join, outer_approximation, subset, BinaryTreeNode, BinaryWord, Grid,
    GridCell, GridTreeSet, IntervalBox,
};

fn tree_strategy() -> impl Strategy<Value = BinaryTreeNode> {
    let leaf = any::<bool>().prop_map(BinaryTreeNode::leaf);
    leaf.prop_recursive(5, 64, 2, |inner| {
        (inner.clone(), inner)
            .prop_map(|(lower, upper)| BinaryTreeNode::internal(lower, upper))
    })
}

fn words_strategy() -> impl Strategy<Value = Vec<Vec<bool>>> {
    prop::collection::vec(prop::collection::vec(any::<bool>(), 0..6), 0..8)
}

fn set_from_words(grid: &Grid, words: &[Vec<bool>]) -> GridTreeSet {
    let mut set = GridTreeSet::new(grid.clone());
    for bits in words {
        let word: BinaryWord = bits.iter().copied().collect();
        set.adjoin(&GridCell::new(grid.clone(), 0, word))
            .expect("same grid");
    }
    set
}

proptest! {
    #[test]
    fn recombine_is_idempotent(tree in tree_strategy()) {
        let mut once = tree;
        once.recombine();
        let mut twice = once.clone();
        twice.recombine();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn mince_preserves_the_denoted_set(tree in tree_strategy(), depth in 0usize..5) {
        let mut minced = tree.clone();
        minced.mince(depth);
        minced.recombine();
        let mut reference = tree;
        reference.recombine();
        prop_assert_eq!(minced, reference);
    }

    #[test]
    fn mince_reaches_the_requested_depth(depth in 1usize..6) {
        let mut tree = BinaryTreeNode::leaf(true);
        tree.mince(depth);
        prop_assert_eq!(tree.depth(), depth);
        prop_assert_eq!(tree.count_enabled_leaves(), 1usize << depth);
    }

    #[test]
    fn tree_words_round_trip(tree in tree_strategy()) {
        let mut shape = BinaryWord::new();
        let mut leaves = BinaryWord::new();
        tree.to_words(&mut shape, &mut leaves);
        let rebuilt = BinaryTreeNode::from_words(&shape, &leaves);
        prop_assert_eq!(rebuilt, Some(tree));
    }

    #[test]
    fn checkpoint_stream_round_trips(words in words_strategy()) {
        let grid = unit_grid();
        let mut set = set_from_words(&grid, &words);
        let reference = set.clone();

        let mut buffer = Vec::new();
        set.export_to_writer(&mut buffer).expect("in-memory export");
        prop_assert!(set.is_empty());

        let mut restored = GridTreeSet::new(grid);
        restored.import_from_reader(&mut buffer.as_slice()).expect("in-memory import");
        prop_assert_eq!(restored.tree(), reference.tree());
    }

    #[test]
    fn rerooting_preserves_the_denoted_set(words in words_strategy(), lift in 1u32..4) {
        let grid = unit_grid();
        let original = set_from_words(&grid, &words);
        let mut lifted = original.clone();
        lifted.up_to_primary_cell(original.height() + lift);

        prop_assert_eq!(lifted.measure(), original.measure());
        prop_assert!(subset(&lifted.view(), &original.view()).expect("same grid"));
        prop_assert!(subset(&original.view(), &lifted.view()).expect("same grid"));
    }

    #[test]
    fn set_algebra_laws(first in words_strategy(), second in words_strategy()) {
        let grid = unit_grid();
        let a = set_from_words(&grid, &first);
        let b = set_from_words(&grid, &second);

        let union = join(&a.view(), &b.view()).expect("same grid");
        prop_assert!(subset(&a.view(), &union.view()).expect("same grid"));
        prop_assert!(subset(&b.view(), &union.view()).expect("same grid"));

        let common = intersection(&a.view(), &b.view()).expect("same grid");
        prop_assert!(subset(&common.view(), &a.view()).expect("same grid"));
        prop_assert!(subset(&common.view(), &b.view()).expect("same grid"));

        let nothing = difference(&a.view(), &a.view()).expect("same grid");
        prop_assert!(nothing.is_empty());

        let mut restricted = a.clone();
        restricted.restrict_paving(&a.view()).expect("same grid");
        prop_assert!(subset(&restricted.view(), &a.view()).expect("same grid"));
        prop_assert!(subset(&a.view(), &restricted.view()).expect("same grid"));
    }

    #[test]
    fn union_measure_is_subadditive(first in words_strategy(), second in words_strategy()) {
        let grid = unit_grid();
        let a = set_from_words(&grid, &first);
        let b = set_from_words(&grid, &second);
        let union = join(&a.view(), &b.view()).expect("same grid");
        prop_assert!(union.measure() <= a.measure() + b.measure() + 1e-12);
        prop_assert!(union.measure() + 1e-12 >= a.measure().max(b.measure()));
    }

    #[test]
    fn outer_approximation_never_loses_interior_points(
        x in 0.05f64..0.95,
        y in 0.05f64..0.95,
        half_width in 0.01f64..0.2,
        subdivisions in 0u32..4,
    ) {
        let grid = unit_grid();
        let target = IntervalBox::from_bounds(
            &[(x - half_width).max(0.0), (y - half_width).max(0.0)],
            &[(x + half_width).min(1.0), (y + half_width).min(1.0)],
        );
        let result = outer_approximation(&target, &grid, subdivisions).expect("same dimension");
        let witness = IntervalBox::from_bounds(&[x, y], &[x, y]);
        prop_assert!(result.view().overlaps(&witness).possibly());
    }

    #[test]
    fn outer_approximation_refines_downward(
        subdivisions in 0u32..3,
    ) {
        let grid = unit_grid();
        let target = bx([0.3, 0.2], [0.65, 0.55]);
        let coarse = outer_approximation(&target, &grid, subdivisions).expect("same dimension");
        let fine = outer_approximation(&target, &grid, subdivisions + 1).expect("same dimension");
        prop_assert!(subset(&fine.view(), &coarse.view()).expect("same grid"));
        prop_assert!(coarse.measure() >= fine.measure());
    }
}
