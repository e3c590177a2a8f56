//! Open cells: base cells doubled in the positive direction.
//!
//! An open cell denotes the interior of the box obtained by doubling
//! its base cell's extent towards positive infinity on every axis. Two
//! adjacent base cells' open cells overlap by exactly one base cell per
//! axis, which is what lets a finite family of open cells cover the
//! shared boundaries a closed paving cannot see.

use crate::cell::{
    compute_lattice_box, primary_cell_path, smallest_enclosing_primary_cell_height,
    smallest_enclosing_primary_cell_height_on, GridCell,
};
use crate::grid::Grid;
use crate::logic::Tribool;
use crate::numeric::IntervalBox;
use crate::paving::{intersection, GridTreeSet};
use crate::word::BinaryWord;

/// An open cell: (grid, primary-cell height, word of the base cell).
#[derive(Debug, Clone, PartialEq)]
pub struct GridOpenCell {
    grid: Grid,
    height: u32,
    word: BinaryWord,
}

impl GridOpenCell {
    /// The open cell whose base cell is addressed by `word` below
    /// the primary cell at `height`.
    pub fn new(grid: Grid, height: u32, word: BinaryWord) -> Self {
        Self { grid, height, word }
    }

    /// The grid the cell lives on.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The height of the primary cell the word starts from.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The word of the base cell (the lower corner of the open cell).
    pub fn word(&self) -> &BinaryWord {
        &self.word
    }

    /// The dimension of the grid.
    pub fn dimension(&self) -> usize {
        self.grid.dimension()
    }

    /// The closed base cell in the lower corner of this open cell.
    pub fn base_cell(&self) -> GridCell {
        GridCell::new(self.grid.clone(), self.height, self.word.clone())
    }

    /// The open cell's box on the lattice: the base cell doubled in the
    /// positive direction of every axis. Exact.
    pub fn lattice_bounds(&self) -> IntervalBox {
        let dimension = self.dimension();
        let mut lattice = compute_lattice_box(dimension, self.height, &self.word);
        for axis in 0..dimension {
            let interval = lattice.axis(axis);
            let doubled = interval.upper() + (interval.upper() - interval.lower());
            lattice.axis_mut(axis).set_upper(doubled);
        }
        lattice
    }

    /// The open cell's box in real space, rounded outward.
    pub fn bounds(&self) -> IntervalBox {
        self.grid.lattice_to_space(&self.lattice_bounds())
    }

    /// One of the three sub-open-cells along the next bisection axis:
    /// `False` is the lower one, `Indeterminate` the middle one and
    /// `True` the upper one, whose base cell crosses into the
    /// neighboring cell (re-rooting if that neighbor escapes the
    /// current primary cell).
    pub fn split(&self, which: Tribool) -> GridOpenCell {
        match which {
            Tribool::False => {
                let mut word = self.word.clone();
                word.push(false);
                GridOpenCell::new(self.grid.clone(), self.height, word)
            }
            Tribool::Indeterminate => {
                let mut word = self.word.clone();
                word.push(true);
                GridOpenCell::new(self.grid.clone(), self.height, word)
            }
            Tribool::True => {
                // the axis of the *next* bisection, not of the last one
                let axis = self.word.len() % self.dimension();
                let neighbor = self.base_cell().neighboring_cell(axis);
                let mut word = neighbor.word().clone();
                word.push(false);
                GridOpenCell::new(self.grid.clone(), neighbor.height(), word)
            }
        }
    }

    /// The smallest open cell (in the subdivision family of `grid`)
    /// whose interior definitely contains `bounds`. The box must have
    /// positive width on every axis.
    pub fn outer_approximation(bounds: &IntervalBox, grid: &Grid) -> GridOpenCell {
        let mut height = smallest_enclosing_primary_cell_height_on(bounds, grid);
        loop {
            let primary = GridCell::new(grid.clone(), height, BinaryWord::new());
            if let Some(cell) = Self::smallest_open_subcell(primary.interior(), bounds) {
                return cell;
            }
            // the box touches the primary cell's boundary: a taller
            // primary cell has slack on every side
            height += 1;
        }
    }

    /// Recursive descent into the three sub-open-cells; returns the
    /// smallest one that still definitely covers `bounds`, or `None` if
    /// this cell itself does not.
    fn smallest_open_subcell(cell: GridOpenCell, bounds: &IntervalBox) -> Option<GridOpenCell> {
        if !cell.bounds().covers(bounds).definitely() {
            return None;
        }
        for which in [Tribool::False, Tribool::Indeterminate, Tribool::True] {
            if let Some(smaller) = Self::smallest_open_subcell(cell.split(which), bounds) {
                return Some(smaller);
            }
        }
        Some(cell)
    }

    /// The topological closure of this open cell as a paving: the base
    /// cell together with its `2^d - 1` axis-positive neighbors.
    pub fn closure(&self) -> GridTreeSet {
        let dimension = self.dimension();

        // root the result so the whole doubled box fits
        let height = smallest_enclosing_primary_cell_height(&self.lattice_bounds()).max(self.height);
        let base_word = if height > self.height {
            let mut rerooted = primary_cell_path(dimension, height, self.height);
            rerooted.append(&self.word);
            rerooted
        } else {
            self.word.clone()
        };

        let mut result = GridTreeSet::with_height(self.grid.clone(), height);
        let mut position = BinaryWord::new();
        Self::collect_neighboring_cells(&self.grid, height, &base_word, &mut position, &mut result);
        result
    }

    fn collect_neighboring_cells(
        grid: &Grid,
        height: u32,
        base_word: &BinaryWord,
        position: &mut BinaryWord,
        result: &mut GridTreeSet,
    ) {
        if position.len() < grid.dimension() {
            position.push(false);
            Self::collect_neighboring_cells(grid, height, base_word, position, result);
            position.pop();
            position.push(true);
            Self::collect_neighboring_cells(grid, height, base_word, position, result);
            position.pop();
        } else {
            let cell = Self::neighboring_cell(grid, height, base_word, position);
            result
                .adjoin(&cell)
                .expect("closure cells live on the paving's own grid");
        }
    }

    /// The cell displaced from the base cell by one cell width along
    /// every axis whose bit is set in `cell_position`.
    ///
    /// For each selected axis the word suffix after the last lower-half
    /// choice on that axis is inverted; if some selected axis has no
    /// lower-half choice the base cell is flush against the primary
    /// cell's border, so the cell is re-rooted one level higher and the
    /// scan repeats.
    pub fn neighboring_cell(
        grid: &Grid,
        height: u32,
        base_word: &BinaryWord,
        cell_position: &BinaryWord,
    ) -> GridCell {
        let dimension = grid.dimension();
        debug_assert_eq!(cell_position.len(), dimension);
        let wanted = (0..dimension).filter(|&axis| cell_position.bit(axis)).count();

        let mut height = height;
        let mut word = base_word.clone();
        loop {
            let no_position = word.len();
            let mut invert_from = vec![no_position; dimension];
            let mut first_inversion = no_position;
            let mut found = 0;
            if wanted > 0 {
                for scan in (0..word.len()).rev() {
                    let axis = scan % dimension;
                    if cell_position.bit(axis) && !word.bit(scan) && invert_from[axis] == no_position
                    {
                        invert_from[axis] = scan;
                        first_inversion = first_inversion.min(scan);
                        found += 1;
                        if found == wanted {
                            break;
                        }
                    }
                }
            }
            if found == wanted {
                for index in first_inversion..word.len() {
                    let axis = index % dimension;
                    if cell_position.bit(axis) && index >= invert_from[axis] {
                        word.set_bit(index, !word.bit(index));
                    }
                }
                return GridCell::new(grid.clone(), height, word);
            }
            let mut rerooted = primary_cell_path(dimension, height + 1, height);
            rerooted.append(&word);
            word = rerooted;
            height += 1;
        }
    }

    /// All open cells making up the intersection of two open cells on
    /// the same grid: the interiors of the common base cells plus, for
    /// every combination of axes, the open cell straddling a shared
    /// face whose neighbor is also in the intersection.
    pub fn intersection(left: &GridOpenCell, right: &GridOpenCell) -> Vec<GridOpenCell> {
        if left.bounds().covers(&right.bounds()).definitely() {
            return vec![right.clone()];
        }
        if right.bounds().covers(&left.bounds()).definitely() {
            return vec![left.clone()];
        }
        if !left.bounds().overlaps(&right.bounds()).definitely() {
            return Vec::new();
        }

        let left_closure = left.closure();
        let right_closure = right.closure();
        let common = intersection(&left_closure.view(), &right_closure.view())
            .expect("both closures live on the same grid");

        let mut result = Vec::new();
        for cell in common.view().iter() {
            let mut position = BinaryWord::new();
            Self::cover_cell_and_borders(&cell, &common, &mut position, &mut result);
        }
        result
    }

    fn cover_cell_and_borders(
        cell: &GridCell,
        set: &GridTreeSet,
        position: &mut BinaryWord,
        result: &mut Vec<GridOpenCell>,
    ) {
        let dimension = cell.grid().dimension();
        if position.len() < dimension {
            position.push(false);
            Self::cover_cell_and_borders(cell, set, position, result);
            position.pop();
            position.push(true);
            Self::cover_cell_and_borders(cell, set, position, result);
            position.pop();
        } else {
            let neighbor = Self::neighboring_cell(cell.grid(), cell.height(), cell.word(), position);
            // a neighbor that had to be re-rooted lies outside the
            // paving's primary cell and cannot be enabled
            let enabled = neighbor.height() == set.height()
                && set.tree().is_enabled_along(neighbor.word());
            if enabled {
                // append the displacement bits aligned with the axis
                // cycle at the end of the cell's word
                let mut cover_word = cell.word().clone();
                for _ in 0..dimension {
                    let bit = position.bit(cover_word.len() % dimension);
                    cover_word.push(bit);
                }
                result.push(GridOpenCell::new(
                    cell.grid().clone(),
                    cell.height(),
                    cover_word,
                ));
            }
        }
    }
}
