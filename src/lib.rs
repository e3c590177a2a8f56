//! # Grid-aligned pavings with rigorous set algebra
//!
//! This crate represents subsets of n-dimensional Euclidean space as
//! unions of axis-aligned dyadic boxes drawn from an infinite uniform
//! [`Grid`], stored compactly as a binary tree in which each node is a
//! cell and each internal node bisects its cell along a cyclically
//! rotating coordinate axis.
//!
//! ## Core pieces
//!
//! 1. **Paving trees**: [`GridTreeSet`] owns a tree of
//!    enabled/disabled cells; [`GridTreeSubset`] is its borrowed query
//!    view. Exact, closed set algebra: [`join`], [`intersection`],
//!    [`difference`], adjoin/remove/restrict, [`subset`]/[`overlap`]
//!    predicates.
//! 2. **Cells**: [`GridCell`] addresses one dyadic box by primary-cell
//!    height and bisection word; [`GridOpenCell`] is its open
//!    counterpart used to cover shared boundaries.
//! 3. **Approximation**: abstract sets described only by three-valued
//!    oracles ([`CompactSet`], [`OpenSet`], …) are rendered into
//!    pavings as outer, lower, or inner approximations by recursive
//!    oracle-guided refinement.
//!
//! All geometry is computed on the grid's dyadic lattice, where it is
//! exact, and mapped into real space with outward rounding, so outer
//! approximations really are supersets and inner approximations really
//! are subsets of the sets they approximate.
//!
//! ## Example
//!
//! ```
//! use quadrille::{outer_approximation, Grid, IntervalBox};
//!
//! let grid = Grid::unit(2);
//! let target = IntervalBox::from_bounds(&[0.3, 0.3], &[0.7, 0.7]);
//! let paving = outer_approximation(&target, &grid, 2)?;
//!
//! assert!(paving.view().covers(&target).definitely());
//! assert!(paving.measure() <= 1.0);
//! # Ok::<(), quadrille::PavingError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod approx;
pub mod cell;
pub mod grid;
pub mod logic;
pub mod numeric;
pub mod paving;
pub mod project;
pub mod storage;
pub mod tree;
pub mod word;

// Re-exports for convenience
pub use approx::{
    inner_difference, inner_intersection, outer_approximation, outer_difference,
    outer_intersection, over_approximation, BoundedSet, ClosedSet, CompactSet, EuclideanSet,
    LocatedSet, OpenSet, OvertSet, RegularSet, SetChecker,
};
pub use cell::{GridCell, GridOpenCell};
pub use grid::Grid;
pub use logic::Tribool;
pub use numeric::{Interval, IntervalBox};
pub use paving::{
    difference, disjoint, intersection, join, overlap, subset, superset, GridCells, GridTreeSet,
    GridTreeSubset,
};
pub use project::project_down;
pub use tree::BinaryTreeNode;
pub use word::BinaryWord;

use thiserror::Error;

/// Errors reported by paving operations.
///
/// No error is recovered silently inside the engine: an oracle
/// answering *possibly* is data, not an error, and the refinement
/// algorithms make progress on it by splitting. Everything in this
/// enum is fatal for the call that reported it.
#[derive(Debug, Error)]
pub enum PavingError {
    /// A set or box has a dimension different from the paving's grid.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension of the paving's grid.
        expected: usize,
        /// The dimension actually supplied.
        actual: usize,
    },

    /// Two pavings combined in one operation live on unequal grids.
    #[error("the pavings live on different grids")]
    GridMismatch,

    /// A structural invariant does not hold; indicates a bug or a
    /// corrupted checkpoint stream.
    #[error("invalid paving state: {0}")]
    InvalidState(String),

    /// A box given to an over-approximation has no interior on some
    /// axis.
    #[error("box has empty interior in dimension {dimension}")]
    EmptyInterior {
        /// The axis with non-positive width.
        dimension: usize,
    },

    /// A checkpoint file could not be opened, read, written, or
    /// removed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
