//! Oracle-driven approximation, end to end.

mod common;
use common::*;

use quadrille::{
    outer_approximation, subset, Grid, GridTreeSet, IntervalBox, PavingError, Tribool,
};

#[test]
fn outer_approximation_of_a_diagonal_box() {
    // depth 2 per axis on the unit grid
    let grid = unit_grid();
    let target = bx([0.3, 0.3], [0.7, 0.7]);
    let result = outer_approximation(&target, &grid, 2).unwrap();

    assert!(result.view().covers(&target).definitely());
    assert!(result.measure() <= 1.0);
    // at this depth the cover is the middle 0.25-cells
    assert_eq!(result.measure(), 0.25);
}

#[test]
fn outer_approximation_contains_every_corner_of_the_target() {
    let grid = unit_grid();
    let target = bx([0.1, 0.4], [0.35, 0.95]);
    let result = outer_approximation(&target, &grid, 3).unwrap();
    for &(x, y) in &[(0.1, 0.4), (0.35, 0.95), (0.1, 0.95), (0.35, 0.4), (0.2, 0.7)] {
        let witness = IntervalBox::from_bounds(&[x, y], &[x, y]);
        assert!(
            result.view().overlaps(&witness).possibly(),
            "point ({x},{y}) escapes the outer approximation"
        );
    }
}

#[test]
fn refinement_is_monotone_in_measure() {
    let grid = unit_grid();
    let target = bx([0.3, 0.2], [0.65, 0.55]);
    let mut previous = f64::INFINITY;
    for subdivisions in 0..4 {
        let result = outer_approximation(&target, &grid, subdivisions).unwrap();
        let measure = result.measure();
        assert!(
            measure <= previous,
            "outer approximation grew from {previous} to {measure} at {subdivisions}"
        );
        previous = measure;
    }
}

#[test]
fn inner_approximation_grows_with_refinement() {
    let grid = unit_grid();
    let target = bx([0.1, 0.1], [0.9, 0.9]);
    let mut previous = -1.0;
    for subdivisions in 1..4 {
        let mut result = GridTreeSet::new(grid.clone());
        result
            .adjoin_inner_approximation(&target, &target.clone(), subdivisions)
            .unwrap();
        let measure = result.measure();
        assert!(
            measure >= previous,
            "inner approximation shrank from {previous} to {measure} at {subdivisions}"
        );
        previous = measure;
    }
}

#[test]
fn inner_approximation_stays_inside_the_target() {
    let grid = unit_grid();
    let target = bx([0.2, 0.3], [0.8, 0.7]);
    let mut result = GridTreeSet::new(grid.clone());
    result
        .adjoin_inner_approximation(&target, &target.clone(), 3)
        .unwrap();
    for cell in result.iter() {
        assert!(cell.bounds().subset_of(&target).definitely());
    }
}

#[test]
fn lower_approximation_of_a_located_set() {
    let grid = unit_grid();
    let target = bx([0.3, 0.3], [0.7, 0.7]);
    let mut result = GridTreeSet::new(grid.clone());
    result.adjoin_lower_approximation(&target, 2).unwrap();
    assert!(!result.is_empty());
    // every enabled cell definitely reaches into the target
    for cell in result.iter() {
        assert!(target.overlaps(&cell.bounds()).definitely());
    }
}

#[test]
fn open_lower_approximation_fills_covered_regions() {
    let grid = unit_grid();
    let target = bx([0.0, 0.0], [1.0, 1.0]);
    let mut result = GridTreeSet::new(grid.clone());
    result
        .adjoin_open_lower_approximation(&target, &target.clone(), 2)
        .unwrap();
    // the open set covers interior cells outright
    assert!(result.measure() >= 0.25);
    for cell in result.iter() {
        assert!(target.overlaps(&cell.bounds()).possibly());
    }
}

#[test]
fn outer_restrict_keeps_possibly_inside_cells() {
    let grid = unit_grid();
    let mut set = outer_approximation(&bx([0.1, 0.1], [0.9, 0.9]), &grid, 2).unwrap();
    set.mince_to_tree_depth(4);
    let region = bx([0.0, 0.0], [0.5, 1.0]);
    let before = set.clone();
    set.outer_restrict(&region).unwrap();
    assert!(subset(&set.view(), &before.view()).unwrap());
    // everything left at least touches the region
    for cell in set.iter() {
        assert!(region.overlaps(&cell.bounds()).possibly());
    }
}

#[test]
fn inner_restrict_keeps_only_definitely_inside_cells() {
    let grid = unit_grid();
    let mut set = outer_approximation(&bx([0.1, 0.1], [0.9, 0.9]), &grid, 2).unwrap();
    set.mince_to_tree_depth(4);
    let region = bx([0.0, 0.0], [0.5, 1.0]);
    set.inner_restrict(&region).unwrap();
    for cell in set.iter() {
        assert!(region.covers(&cell.bounds()).definitely());
    }
}

#[test]
fn checker_driven_restriction_follows_the_predicate() {
    let grid = unit_grid();
    let mut set = GridTreeSet::new(grid.clone());
    set.adjoin(&cell(&grid, &[])).unwrap();

    // keep the region below the anti-diagonal x + y <= 1
    let checker = |bounds: &IntervalBox| {
        let sum_upper = bounds.axis(0).upper() + bounds.axis(1).upper();
        let sum_lower = bounds.axis(0).lower() + bounds.axis(1).lower();
        if sum_upper <= 1.0 {
            Tribool::True
        } else if sum_lower >= 1.0 {
            Tribool::False
        } else {
            Tribool::Indeterminate
        }
    };

    let mut inner = set.clone();
    inner.inner_restrict_with(&checker, 2).unwrap();
    let mut outer = set;
    outer.outer_restrict_with(&checker, 2).unwrap();

    assert!(subset(&inner.view(), &outer.view()).unwrap());
    assert!(inner.measure() < 0.5);
    assert!(outer.measure() > 0.5);
    for cell in inner.iter() {
        let bounds = cell.bounds();
        assert!(bounds.axis(0).upper() + bounds.axis(1).upper() <= 1.0);
    }
}

#[test]
fn remove_variants_bracket_the_difference() {
    let grid = unit_grid();
    let mut base = GridTreeSet::new(grid.clone());
    base.adjoin(&cell(&grid, &[])).unwrap();
    base.mince_to_tree_depth(4);

    let region = bx([0.0, 0.0], [0.5, 1.0]);

    let mut outer = base.clone();
    outer.outer_remove(&region).unwrap();
    let mut inner = base;
    inner.inner_remove(&region).unwrap();

    assert!(subset(&inner.view(), &outer.view()).unwrap());
    // the inner difference keeps only cells definitely clear of the region
    for cell in inner.iter() {
        assert!(region.disjoint(&cell.bounds()).definitely());
    }
    // the outer difference still covers everything right of the region
    assert!(outer.view().covers(&bx([0.6, 0.1], [0.9, 0.9])).definitely());
}

#[test]
fn dimension_mismatch_is_reported_at_entry() {
    let mut set = GridTreeSet::new(Grid::unit(2));
    let wrong = IntervalBox::from_bounds(&[0.0], &[1.0]);
    assert!(matches!(
        set.adjoin_outer_approximation(&wrong, 1),
        Err(PavingError::DimensionMismatch {
            expected: 2,
            actual: 1
        })
    ));
}

#[test]
fn approximating_an_unanchored_box_reroots_the_paving() {
    // a target outside the height-0 primary cell forces re-rooting
    let grid = unit_grid();
    let target = bx([-1.5, -0.5], [-0.5, 0.5]);
    let result = outer_approximation(&target, &grid, 1).unwrap();
    assert!(result.height() >= 1);
    assert!(result.view().covers(&target).definitely());
}
