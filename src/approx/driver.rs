//! Oracle-guided refinement.
//!
//! Every driver recurses over a tree node together with the lattice box
//! of its cell, bisecting the box along the cycling axis on the way
//! down so no cell geometry is ever recomputed from scratch. A cell is
//! settled when the oracle gives a definite answer; a `possibly` answer
//! is never an error, it just means one more bisection (until the
//! maximum depth, where each driver applies its own rounding
//! direction).
//!
//! Refinement stops at `(subdivisions + height) * dimension` tree
//! levels below the primary cell: `subdivisions` full bisection cycles
//! beyond the unit cells of the grid.

use std::any::Any;

use crate::approx::{CompactSet, LocatedSet, OpenSet, OvertSet, SetChecker};
use crate::cell::{
    bisect_lattice, primary_cell_lattice_box, smallest_enclosing_primary_cell_height_on,
};
use crate::grid::Grid;
use crate::logic::Tribool;
use crate::numeric::IntervalBox;
use crate::paving::GridTreeSet;
use crate::tree::BinaryTreeNode;
use crate::PavingError;

/// Tree depth corresponding to `subdivisions` bisection cycles per unit
/// cell below the primary cell at `height`.
fn max_tree_depth(subdivisions: u32, height: u32, dimension: usize) -> usize {
    (subdivisions as usize + height as usize) * dimension
}

#[allow(clippy::too_many_arguments)]
fn outer_node(
    set: &dyn CompactSet,
    cache: &mut dyn Any,
    grid: &Grid,
    lattice: &IntervalBox,
    node: &mut BinaryTreeNode,
    depth: usize,
    max_depth: usize,
    dimension: usize,
) {
    let bounds = grid.lattice_to_space(lattice);
    if set.disjoint_with_cache(&bounds, cache).definitely() {
        return;
    }
    if let Some(covered) = set.covers_hint(&bounds) {
        if covered.definitely() {
            node.make_leaf(true);
            return;
        }
    }
    if node.is_enabled() {
        return;
    }
    if depth < max_depth {
        let axis = depth % dimension;
        let (lower_lattice, upper_lattice) = bisect_lattice(lattice, axis);
        node.split();
        let both_enabled = if let BinaryTreeNode::Internal(lower, upper) = node {
            outer_node(set, cache, grid, &lower_lattice, lower, depth + 1, max_depth, dimension);
            outer_node(set, cache, grid, &upper_lattice, upper, depth + 1, max_depth, dimension);
            lower.is_enabled() && upper.is_enabled()
        } else {
            false
        };
        if both_enabled {
            node.make_leaf(true);
        }
    } else {
        // finest cell still possibly meeting the set: it belongs to the
        // outer approximation
        node.make_leaf(true);
    }
}

#[allow(clippy::too_many_arguments)]
fn lower_overt_node(
    set: &dyn OvertSet,
    grid: &Grid,
    lattice: &IntervalBox,
    node: &mut BinaryTreeNode,
    depth: usize,
    max_depth: usize,
    dimension: usize,
) {
    let bounds = grid.lattice_to_space(lattice);
    if !set.overlaps(&bounds).definitely() {
        return;
    }
    if depth >= max_depth {
        // a subtree with enabled cells already witnesses the overlap
        if !node.has_enabled() {
            node.make_leaf(true);
        }
    } else {
        let axis = depth % dimension;
        let (lower_lattice, upper_lattice) = bisect_lattice(lattice, axis);
        node.split();
        if let BinaryTreeNode::Internal(lower, upper) = node {
            lower_overt_node(set, grid, &lower_lattice, lower, depth + 1, max_depth, dimension);
            lower_overt_node(set, grid, &upper_lattice, upper, depth + 1, max_depth, dimension);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn lower_open_node(
    set: &dyn OpenSet,
    grid: &Grid,
    lattice: &IntervalBox,
    node: &mut BinaryTreeNode,
    depth: usize,
    max_depth: usize,
    dimension: usize,
) {
    let bounds = grid.lattice_to_space(lattice);
    if set.covers(&bounds).definitely() {
        node.make_leaf(true);
        node.mince(max_depth - depth);
    } else if set.overlaps(&bounds).definitely() {
        if depth >= max_depth {
            if node.is_leaf() {
                node.make_leaf(true);
            }
        } else {
            let axis = depth % dimension;
            let (lower_lattice, upper_lattice) = bisect_lattice(lattice, axis);
            node.split();
            if let BinaryTreeNode::Internal(lower, upper) = node {
                lower_open_node(set, grid, &lower_lattice, lower, depth + 1, max_depth, dimension);
                lower_open_node(set, grid, &upper_lattice, upper, depth + 1, max_depth, dimension);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn inner_node(
    set: &dyn OpenSet,
    grid: &Grid,
    lattice: &IntervalBox,
    node: &mut BinaryTreeNode,
    depth: usize,
    max_depth: usize,
    dimension: usize,
) {
    if node.is_enabled() {
        return;
    }
    let bounds = grid.lattice_to_space(lattice);
    if set.covers(&bounds).definitely() {
        node.make_leaf(true);
    } else if set.overlaps(&bounds).possibly() {
        if depth < max_depth {
            let axis = depth % dimension;
            let (lower_lattice, upper_lattice) = bisect_lattice(lattice, axis);
            node.split();
            if let BinaryTreeNode::Internal(lower, upper) = node {
                inner_node(set, grid, &lower_lattice, lower, depth + 1, max_depth, dimension);
                inner_node(set, grid, &upper_lattice, upper, depth + 1, max_depth, dimension);
            }
        }
        // at maximum depth a cell that only possibly lies inside is
        // excluded
    }
}

/// Shared engine of the four oracle-driven restrict/remove variants.
///
/// `membership` classifies a cell: `True` retains it whole, `False`
/// discards it whole, `Indeterminate` refines it. At the maximum depth
/// an undecided cell is retained by the outer variants
/// (`keep_at_max_depth`) and discarded by the inner ones.
#[allow(clippy::too_many_arguments)]
fn refine_node<Q>(
    membership: &Q,
    keep_at_max_depth: bool,
    grid: &Grid,
    lattice: &IntervalBox,
    node: &mut BinaryTreeNode,
    depth: usize,
    max_depth: usize,
    dimension: usize,
) where
    Q: Fn(&IntervalBox) -> Tribool + ?Sized,
{
    let bounds = grid.lattice_to_space(lattice);
    let verdict = membership(&bounds);
    if verdict.definitely() {
        return;
    }
    if !verdict.possibly() {
        node.make_leaf(false);
        return;
    }
    if node.is_disabled() {
        // nothing below a disabled leaf can change
        return;
    }
    if depth < max_depth {
        let axis = depth % dimension;
        let (lower_lattice, upper_lattice) = bisect_lattice(lattice, axis);
        node.split();
        let both_enabled = if let BinaryTreeNode::Internal(lower, upper) = node {
            refine_node(membership, keep_at_max_depth, grid, &lower_lattice, lower, depth + 1, max_depth, dimension);
            refine_node(membership, keep_at_max_depth, grid, &upper_lattice, upper, depth + 1, max_depth, dimension);
            lower.is_enabled() && upper.is_enabled()
        } else {
            false
        };
        if both_enabled {
            node.make_leaf(true);
        }
    } else if !keep_at_max_depth {
        node.make_leaf(false);
    }
}

/// Membership query of an open set: inside when covered, outside when
/// unreachable, undecided on the boundary.
fn open_set_membership<'a>(set: &'a dyn OpenSet) -> impl Fn(&IntervalBox) -> Tribool + 'a {
    move |bounds| {
        if set.covers(bounds).definitely() {
            Tribool::True
        } else if !set.overlaps(bounds).possibly() {
            Tribool::False
        } else {
            Tribool::Indeterminate
        }
    }
}

impl GridTreeSet {
    /// Adjoins an outer approximation of `set`, refined `subdivisions`
    /// bisection cycles beyond the grid's unit cells. The result is a
    /// superset of `set` within the paving's grid resolution.
    pub fn adjoin_outer_approximation(
        &mut self,
        set: &dyn CompactSet,
        subdivisions: u32,
    ) -> Result<(), PavingError> {
        self.check_dimension(set.dimension())?;
        let grid = self.grid().clone();
        let dimension = grid.dimension();
        let height = smallest_enclosing_primary_cell_height_on(&set.bounding_box(), &grid);
        let depth = max_tree_depth(subdivisions, height, dimension);
        let lattice = primary_cell_lattice_box(height, dimension);
        let mut cache = set.make_cache();
        if let Some(node) = self.align_with_cell(height, true, false) {
            outer_node(set, cache.as_mut(), &grid, &lattice, node, 0, depth, dimension);
        }
        Ok(())
    }

    /// Adjoins an outer approximation of a box required to have
    /// interior points on every axis.
    pub fn adjoin_over_approximation(
        &mut self,
        bounds: &IntervalBox,
        subdivisions: u32,
    ) -> Result<(), PavingError> {
        self.check_dimension(bounds.dimension())?;
        for axis in 0..bounds.dimension() {
            if bounds.axis(axis).lower() >= bounds.axis(axis).upper() {
                return Err(PavingError::EmptyInterior { dimension: axis });
            }
        }
        self.adjoin_outer_approximation(bounds, subdivisions)
    }

    /// Adjoins a lower approximation of a located set: only cells whose
    /// overlap with `set` is definite are enabled.
    pub fn adjoin_lower_approximation(
        &mut self,
        set: &dyn LocatedSet,
        subdivisions: u32,
    ) -> Result<(), PavingError> {
        let bounding = set.bounding_box();
        self.adjoin_lower_approximation_within(set, &bounding, subdivisions)
    }

    /// Adjoins a lower approximation of an overt set searched inside
    /// `bounding`.
    pub fn adjoin_lower_approximation_within(
        &mut self,
        set: &dyn OvertSet,
        bounding: &IntervalBox,
        subdivisions: u32,
    ) -> Result<(), PavingError> {
        self.check_dimension(set.dimension())?;
        self.check_dimension(bounding.dimension())?;
        let height = smallest_enclosing_primary_cell_height_on(bounding, self.grid());
        self.adjoin_lower_approximation_at_height(set, height, subdivisions)
    }

    /// Adjoins a lower approximation of an overt set searched inside
    /// the primary cell at `height`.
    pub fn adjoin_lower_approximation_at_height(
        &mut self,
        set: &dyn OvertSet,
        height: u32,
        subdivisions: u32,
    ) -> Result<(), PavingError> {
        self.check_dimension(set.dimension())?;
        let grid = self.grid().clone();
        let dimension = grid.dimension();
        let depth = max_tree_depth(subdivisions, height, dimension);
        let lattice = primary_cell_lattice_box(height, dimension);
        if let Some(node) = self.align_with_cell(height, true, false) {
            lower_overt_node(set, &grid, &lattice, node, 0, depth, dimension);
        }
        Ok(())
    }

    /// Adjoins a lower approximation of an open set searched inside
    /// `bounding`; covered cells enable whole subtrees at once.
    pub fn adjoin_open_lower_approximation(
        &mut self,
        set: &dyn OpenSet,
        bounding: &IntervalBox,
        subdivisions: u32,
    ) -> Result<(), PavingError> {
        self.check_dimension(set.dimension())?;
        self.check_dimension(bounding.dimension())?;
        let grid = self.grid().clone();
        let dimension = grid.dimension();
        let height = smallest_enclosing_primary_cell_height_on(bounding, &grid);
        let depth = max_tree_depth(subdivisions, height, dimension);
        let lattice = primary_cell_lattice_box(height, dimension);
        if let Some(node) = self.align_with_cell(height, true, false) {
            lower_open_node(set, &grid, &lattice, node, 0, depth, dimension);
        }
        Ok(())
    }

    /// Adjoins an inner approximation of an open set searched inside
    /// `bounding`: every enabled cell lies inside `set`.
    pub fn adjoin_inner_approximation(
        &mut self,
        set: &dyn OpenSet,
        bounding: &IntervalBox,
        subdivisions: u32,
    ) -> Result<(), PavingError> {
        self.check_dimension(set.dimension())?;
        self.check_dimension(bounding.dimension())?;
        let height = smallest_enclosing_primary_cell_height_on(bounding, self.grid());
        self.adjoin_inner_approximation_at_height(set, height, subdivisions)
    }

    /// Adjoins an inner approximation of an open set searched inside
    /// the primary cell at `height`.
    pub fn adjoin_inner_approximation_at_height(
        &mut self,
        set: &dyn OpenSet,
        height: u32,
        subdivisions: u32,
    ) -> Result<(), PavingError> {
        self.check_dimension(set.dimension())?;
        let grid = self.grid().clone();
        let dimension = grid.dimension();
        let depth = max_tree_depth(subdivisions, height, dimension);
        let lattice = primary_cell_lattice_box(height, dimension);
        if let Some(node) = self.align_with_cell(height, true, false) {
            inner_node(set, &grid, &lattice, node, 0, depth, dimension);
        }
        Ok(())
    }

    /// Keeps every cell not definitely outside `set`, refining
    /// undecided cells down to the current tree depth.
    pub fn outer_restrict(&mut self, set: &dyn OpenSet) -> Result<(), PavingError> {
        self.check_dimension(set.dimension())?;
        self.refine_in_place(&open_set_membership(set), true, self.tree_depth());
        Ok(())
    }

    /// Keeps only cells definitely inside `set`.
    pub fn inner_restrict(&mut self, set: &dyn OpenSet) -> Result<(), PavingError> {
        self.check_dimension(set.dimension())?;
        self.refine_in_place(&open_set_membership(set), false, self.tree_depth());
        Ok(())
    }

    /// Removes `set`: keeps every cell not definitely inside it.
    pub fn outer_remove(&mut self, set: &dyn OpenSet) -> Result<(), PavingError> {
        self.check_dimension(set.dimension())?;
        let membership = open_set_membership(set);
        self.refine_in_place(&move |bounds: &IntervalBox| !membership(bounds), true, self.tree_depth());
        Ok(())
    }

    /// Removes `set`: keeps only cells definitely outside it.
    pub fn inner_remove(&mut self, set: &dyn OpenSet) -> Result<(), PavingError> {
        self.check_dimension(set.dimension())?;
        let membership = open_set_membership(set);
        self.refine_in_place(&move |bounds: &IntervalBox| !membership(bounds), false, self.tree_depth());
        Ok(())
    }

    /// Keeps every cell the checker does not definitely reject,
    /// refining undecided cells `accuracy` cycles beyond unit cells.
    pub fn outer_restrict_with(
        &mut self,
        checker: &dyn SetChecker,
        accuracy: u32,
    ) -> Result<(), PavingError> {
        let depth = max_tree_depth(accuracy, self.height(), self.dimension());
        self.refine_in_place(&|bounds: &IntervalBox| checker.check(bounds), true, depth);
        Ok(())
    }

    /// Keeps only cells the checker definitely accepts.
    pub fn inner_restrict_with(
        &mut self,
        checker: &dyn SetChecker,
        accuracy: u32,
    ) -> Result<(), PavingError> {
        let depth = max_tree_depth(accuracy, self.height(), self.dimension());
        self.refine_in_place(&|bounds: &IntervalBox| checker.check(bounds), false, depth);
        Ok(())
    }

    /// Removes the checker's region: keeps every cell not definitely
    /// accepted by it.
    pub fn outer_remove_with(
        &mut self,
        checker: &dyn SetChecker,
        accuracy: u32,
    ) -> Result<(), PavingError> {
        let depth = max_tree_depth(accuracy, self.height(), self.dimension());
        self.refine_in_place(&|bounds: &IntervalBox| !checker.check(bounds), true, depth);
        Ok(())
    }

    /// Removes the checker's region: keeps only cells it definitely
    /// rejects.
    pub fn inner_remove_with(
        &mut self,
        checker: &dyn SetChecker,
        accuracy: u32,
    ) -> Result<(), PavingError> {
        let depth = max_tree_depth(accuracy, self.height(), self.dimension());
        self.refine_in_place(&|bounds: &IntervalBox| !checker.check(bounds), false, depth);
        Ok(())
    }

    fn refine_in_place<Q>(&mut self, membership: &Q, keep_at_max_depth: bool, max_depth: usize)
    where
        Q: Fn(&IntervalBox) -> Tribool + ?Sized,
    {
        if self.is_empty() {
            return;
        }
        let grid = self.grid().clone();
        let dimension = grid.dimension();
        let lattice = primary_cell_lattice_box(self.height(), dimension);
        refine_node(
            membership,
            keep_at_max_depth,
            &grid,
            &lattice,
            self.tree_mut(),
            0,
            max_depth,
            dimension,
        );
    }
}

/// The outer approximation of a box as a fresh paving on `grid`.
pub fn outer_approximation(
    bounds: &IntervalBox,
    grid: &Grid,
    subdivisions: u32,
) -> Result<GridTreeSet, PavingError> {
    let mut result = GridTreeSet::new(grid.clone());
    result.adjoin_outer_approximation(bounds, subdivisions)?;
    Ok(result)
}

/// The over-approximation of a box with non-empty interior as a fresh
/// paving on `grid`.
pub fn over_approximation(
    bounds: &IntervalBox,
    grid: &Grid,
    subdivisions: u32,
) -> Result<GridTreeSet, PavingError> {
    let mut result = GridTreeSet::new(grid.clone());
    result.adjoin_over_approximation(bounds, subdivisions)?;
    Ok(result)
}

/// An outer approximation of `set ∩ region`.
pub fn outer_intersection(
    set: &GridTreeSet,
    region: &dyn OpenSet,
) -> Result<GridTreeSet, PavingError> {
    let mut result = set.clone();
    result.outer_restrict(region)?;
    Ok(result)
}

/// An inner approximation of `set ∩ region`.
pub fn inner_intersection(
    set: &GridTreeSet,
    region: &dyn OpenSet,
) -> Result<GridTreeSet, PavingError> {
    let mut result = set.clone();
    result.inner_restrict(region)?;
    Ok(result)
}

/// An outer approximation of `set \ region`.
pub fn outer_difference(
    set: &GridTreeSet,
    region: &dyn OpenSet,
) -> Result<GridTreeSet, PavingError> {
    let mut result = set.clone();
    result.outer_remove(region)?;
    Ok(result)
}

/// An inner approximation of `set \ region`.
pub fn inner_difference(
    set: &GridTreeSet,
    region: &dyn OpenSet,
) -> Result<GridTreeSet, PavingError> {
    let mut result = set.clone();
    result.inner_remove(region)?;
    Ok(result)
}
