//! Cells of a grid paving.
//!
//! A cell is addressed by three pieces of data: the grid, the height of
//! the primary cell it is rooted in, and the binary word of bisection
//! choices leading down from that primary cell. All cell geometry is
//! first computed on the *lattice* (grid coordinates), where corners
//! are dyadic rationals and every halving is exact in `f64`; only the
//! final map into real space rounds outward.
//!
//! The primary cell at height 0 is the unit lattice cube `[0,1]^d`;
//! each following height doubles it, alternately downward (odd heights)
//! and upward (even heights), so every bounded box is eventually
//! enclosed by some primary cell.

mod open;

pub use open::GridOpenCell;

use std::cmp::Ordering;
use std::fmt;

use crate::grid::Grid;
use crate::numeric::{Interval, IntervalBox};
use crate::word::BinaryWord;

/// The lattice extent `[lower, upper]` of the primary cell at `height`,
/// identical on every axis. Corners are integers, exact in `f64`.
pub fn primary_cell_extent(height: u32) -> (f64, f64) {
    let (mut lower, mut upper) = (0.0f64, 1.0f64);
    for h in 1..=height {
        let span = upper - lower;
        if h % 2 == 1 {
            lower -= span;
        } else {
            upper += span;
        }
    }
    (lower, upper)
}

/// The lattice box of the primary cell at `height` in `dimension`
/// dimensions.
pub fn primary_cell_lattice_box(height: u32, dimension: usize) -> IntervalBox {
    let (lower, upper) = primary_cell_extent(height);
    IntervalBox::new(vec![Interval::new(lower, upper); dimension])
}

/// The smallest primary-cell height whose lattice box contains
/// `lattice_box`.
pub fn smallest_enclosing_primary_cell_height(lattice_box: &IntervalBox) -> u32 {
    let mut height = 0;
    loop {
        let (lower, upper) = primary_cell_extent(height);
        let fits = lattice_box
            .axes()
            .iter()
            .all(|iv| lower <= iv.lower() && iv.upper() <= upper);
        if fits {
            return height;
        }
        height += 1;
    }
}

/// The smallest primary-cell height enclosing a real-space box on the
/// given grid.
pub fn smallest_enclosing_primary_cell_height_on(bounds: &IntervalBox, grid: &Grid) -> u32 {
    smallest_enclosing_primary_cell_height(&grid.to_lattice(bounds))
}

/// The word leading from the primary cell at `top_height` down to the
/// one at `bottom_height`: one group of `dimension` equal bits per
/// level, all-`true` when the level left behind is odd (that level grew
/// downward, so the lower cell is its upper half) and all-`false` when
/// it is even.
pub fn primary_cell_path(dimension: usize, top_height: u32, bottom_height: u32) -> BinaryWord {
    let mut path = BinaryWord::with_capacity(dimension * (top_height - bottom_height) as usize);
    for height in (bottom_height + 1..=top_height).rev() {
        let bit = height % 2 == 1;
        for _ in 0..dimension {
            path.push(bit);
        }
    }
    path
}

/// The lattice box of the cell addressed by `word` below the primary
/// cell at `height`. Axes are bisected cyclically; all arithmetic is
/// exact.
pub fn compute_lattice_box(dimension: usize, height: u32, word: &BinaryWord) -> IntervalBox {
    let mut lattice = primary_cell_lattice_box(height, dimension);
    for i in 0..word.len() {
        let axis = i % dimension;
        let midpoint = lattice.axis(axis).midpoint();
        if word.bit(i) {
            lattice.axis_mut(axis).set_lower(midpoint);
        } else {
            lattice.axis_mut(axis).set_upper(midpoint);
        }
    }
    lattice
}

/// Halves a lattice box along one axis, exactly.
pub(crate) fn bisect_lattice(lattice: &IntervalBox, axis: usize) -> (IntervalBox, IntervalBox) {
    let midpoint = lattice.axis(axis).midpoint();
    let mut lower = lattice.clone();
    lower.axis_mut(axis).set_upper(midpoint);
    let mut upper = lattice.clone();
    upper.axis_mut(axis).set_lower(midpoint);
    (lower, upper)
}

/// A closed cell of a grid paving: (grid, primary-cell height, word).
#[derive(Debug, Clone)]
pub struct GridCell {
    grid: Grid,
    height: u32,
    word: BinaryWord,
}

impl GridCell {
    /// The cell addressed by `word` below the primary cell at
    /// `height` on `grid`.
    pub fn new(grid: Grid, height: u32, word: BinaryWord) -> Self {
        Self { grid, height, word }
    }

    /// The primary cell at the smallest height enclosing `bounds`.
    pub fn smallest_enclosing_primary_cell(bounds: &IntervalBox, grid: &Grid) -> Self {
        let height = smallest_enclosing_primary_cell_height_on(bounds, grid);
        Self::new(grid.clone(), height, BinaryWord::new())
    }

    /// The grid the cell lives on.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The height of the primary cell the word starts from.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The bisection word.
    pub fn word(&self) -> &BinaryWord {
        &self.word
    }

    /// The dimension of the grid.
    pub fn dimension(&self) -> usize {
        self.grid.dimension()
    }

    /// The cell's box in lattice coordinates. Exact.
    pub fn lattice_bounds(&self) -> IntervalBox {
        compute_lattice_box(self.dimension(), self.height, &self.word)
    }

    /// The cell's box in real space, rounded outward through the grid
    /// map.
    pub fn bounds(&self) -> IntervalBox {
        self.grid.lattice_to_space(&self.lattice_bounds())
    }

    /// One of the two halves of this cell (`true` = upper).
    pub fn split(&self, upper: bool) -> GridCell {
        let mut word = self.word.clone();
        word.push(upper);
        GridCell::new(self.grid.clone(), self.height, word)
    }

    /// The open cell obtained by doubling this cell in the positive
    /// direction of every axis. Its base cell is the lower-corner
    /// sub-cell one level of full bisection below this cell.
    pub fn interior(&self) -> GridOpenCell {
        let mut word = self.word.clone();
        for _ in 0..self.dimension() {
            word.push(false);
        }
        GridOpenCell::new(self.grid.clone(), self.height, word)
    }

    /// The lattice-adjacent cell of the same size in the positive
    /// direction of `axis`.
    ///
    /// The neighbor is found by inverting the word suffix after the
    /// last lower-half choice on `axis`; when the neighbor escapes the
    /// current primary cell, the cell is first re-rooted into a taller
    /// one. The scan is bounded and re-rooting repeats until an
    /// invertible position exists.
    pub fn neighboring_cell(&self, axis: usize) -> GridCell {
        let dimension = self.dimension();
        assert!(axis < dimension, "axis {axis} out of range");

        // how far the neighbor reaches on the lattice: half a cell width
        // past this cell's upper border
        let lattice = self.lattice_bounds();
        let span = lattice.axis(axis).upper() - lattice.axis(axis).lower();
        let limit = lattice.axis(axis).upper() + span / 2.0;

        let mut height = self.height;
        while primary_cell_extent(height).1 < limit {
            height += 1;
        }

        let mut word = if height > self.height {
            let mut rerooted = primary_cell_path(dimension, height, self.height);
            rerooted.append(&self.word);
            rerooted
        } else {
            self.word.clone()
        };

        loop {
            let position = (0..word.len())
                .rev()
                .find(|&p| p % dimension == axis && !word.bit(p));
            if let Some(position) = position {
                for index in position..word.len() {
                    if index % dimension == axis {
                        word.set_bit(index, !word.bit(index));
                    }
                }
                return GridCell::new(self.grid.clone(), height, word);
            }
            // every choice on this axis is an upper half: the neighbor
            // lies outside the current primary cell, so climb one level
            // and rescan
            let mut rerooted = primary_cell_path(dimension, height + 1, height);
            rerooted.append(&word);
            word = rerooted;
            height += 1;
        }
    }

    /// The words of both cells re-rooted under their common primary
    /// cell, making them directly comparable.
    pub(crate) fn aligned_words(&self, other: &GridCell) -> (BinaryWord, BinaryWord) {
        match self.height.cmp(&other.height) {
            Ordering::Equal => (self.word.clone(), other.word.clone()),
            Ordering::Less => {
                let mut mine = primary_cell_path(self.dimension(), other.height, self.height);
                mine.append(&self.word);
                (mine, other.word.clone())
            }
            Ordering::Greater => {
                let mut theirs = primary_cell_path(self.dimension(), self.height, other.height);
                theirs.append(&other.word);
                (self.word.clone(), theirs)
            }
        }
    }
}

impl PartialEq for GridCell {
    fn eq(&self, other: &Self) -> bool {
        if self.grid != other.grid {
            return false;
        }
        let (mine, theirs) = self.aligned_words(other);
        mine == theirs
    }
}

impl Eq for GridCell {}

impl PartialOrd for GridCell {
    /// Lexicographic order of the height-aligned words; cells on
    /// different grids are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.grid != other.grid {
            return None;
        }
        let (mine, theirs) = self.aligned_words(other);
        Some(mine.cmp(&theirs))
    }
}

/// Whether `first` is a sub-cell of `second` (same grid): after
/// aligning under the common primary cell, the second word must be a
/// prefix of the first.
pub fn cell_subset(first: &GridCell, second: &GridCell) -> bool {
    if first.grid != second.grid {
        return false;
    }
    let (first_word, second_word) = first.aligned_words(second);
    second_word.is_prefix_of(&first_word)
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GridCell(height={}, word={})", self.height, self.word)
    }
}
