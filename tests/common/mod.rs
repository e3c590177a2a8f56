//! Shared helpers for the integration suites.
#![allow(dead_code)]

use quadrille::{Grid, GridCell, GridTreeSet, IntervalBox};

/// The 2-dimensional unit grid.
pub fn unit_grid() -> Grid {
    Grid::unit(2)
}

/// A cell on the height-0 primary cell of `grid`.
pub fn cell(grid: &Grid, bits: &[bool]) -> GridCell {
    GridCell::new(grid.clone(), 0, bits.iter().copied().collect())
}

/// A paving containing the single cell addressed by `bits`.
pub fn paving_of(grid: &Grid, bits: &[bool]) -> GridTreeSet {
    let mut set = GridTreeSet::new(grid.clone());
    set.adjoin(&cell(grid, bits)).expect("same grid");
    set
}

/// A 2-dimensional box.
pub fn bx(lower: [f64; 2], upper: [f64; 2]) -> IntervalBox {
    IntervalBox::from_bounds(&lower, &upper)
}

/// Asserts that two pavings denote the same set.
pub fn assert_same_set(first: &GridTreeSet, second: &GridTreeSet) {
    assert!(
        quadrille::subset(&first.view(), &second.view()).expect("same grid"),
        "first paving is not a subset of the second"
    );
    assert!(
        quadrille::subset(&second.view(), &first.view()).expect("same grid"),
        "second paving is not a subset of the first"
    );
}
