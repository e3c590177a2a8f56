//! Mutation of owned pavings and the set algebra between pavings.
//!
//! Pavings rooted at different primary cells are combined by first
//! re-rooting the lower one upward (`up_to_primary_cell`) or by walking
//! down from the taller root along the deterministic primary-cell path
//! (`align_with_cell`), with early stops where the walk hits a leaf
//! that already decides the outcome.

use crate::cell::{primary_cell_path, GridCell, GridOpenCell};
use crate::grid::Grid;
use crate::paving::{GridTreeSet, GridTreeSubset};
use crate::tree::BinaryTreeNode;
use crate::word::BinaryWord;
use crate::PavingError;

/// Splits (if needed), disables the branch not taken, and descends.
fn descend_disabling_sibling(node: &mut BinaryTreeNode, bit: bool) -> &mut BinaryTreeNode {
    node.split();
    match node {
        BinaryTreeNode::Internal(lower, upper) => {
            if bit {
                lower.make_leaf(false);
                upper
            } else {
                upper.make_leaf(false);
                lower
            }
        }
        BinaryTreeNode::Leaf(_) => unreachable!("split always yields an internal node"),
    }
}

impl GridTreeSet {
    pub(crate) fn check_same_grid(&self, other: &Grid) -> Result<(), PavingError> {
        if self.grid() == other {
            Ok(())
        } else {
            Err(PavingError::GridMismatch)
        }
    }

    pub(crate) fn check_dimension(&self, dimension: usize) -> Result<(), PavingError> {
        if self.dimension() == dimension {
            Ok(())
        } else {
            Err(PavingError::DimensionMismatch {
                expected: self.dimension(),
                actual: dimension,
            })
        }
    }

    /// Re-roots the paving into the primary cell at `to_height`,
    /// prepending the deterministic path and hanging disabled leaves
    /// off every branch left aside. The denoted set is unchanged.
    pub fn up_to_primary_cell(&mut self, to_height: u32) {
        if to_height <= self.height() {
            return;
        }
        let path = primary_cell_path(self.dimension(), to_height, self.height());
        let old_root = std::mem::replace(self.tree_mut(), BinaryTreeNode::Leaf(false));
        self.replace_tree(to_height, BinaryTreeNode::prepend_tree(&path, old_root));
    }

    /// Descends from this paving's root to the node corresponding to
    /// the primary cell at `height`, re-rooting upward first when this
    /// paving is the lower one. Returns `None` when the walk stops on
    /// an enabled (`stop_on_enabled`) or disabled (`stop_on_disabled`)
    /// leaf, which means the caller's operation cannot change anything.
    pub(crate) fn align_with_cell(
        &mut self,
        height: u32,
        stop_on_enabled: bool,
        stop_on_disabled: bool,
    ) -> Option<&mut BinaryTreeNode> {
        if self.height() < height {
            self.up_to_primary_cell(height);
            return Some(self.tree_mut());
        }
        let path = primary_cell_path(self.dimension(), self.height(), height);
        let mut node = self.tree_mut();
        for position in 0..path.len() {
            if (node.is_enabled() && stop_on_enabled) || (node.is_disabled() && stop_on_disabled) {
                return None;
            }
            node = node.split_child_mut(path.bit(position));
        }
        Some(node)
    }

    /// Adjoins a single cell.
    pub fn adjoin(&mut self, cell: &GridCell) -> Result<(), PavingError> {
        self.check_same_grid(cell.grid())?;
        if let Some(node) = self.align_with_cell(cell.height(), true, false) {
            node.add_enabled_path(cell.word());
        }
        Ok(())
    }

    /// Adjoins all cells of another paving on the same grid.
    pub fn adjoin_paving(&mut self, other: &GridTreeSubset<'_>) -> Result<(), PavingError> {
        self.check_same_grid(other.grid())?;
        if let Some(node) = self.align_with_cell(other.height(), true, false) {
            node.add_enabled_subtree_along(other.cell().word(), other.tree());
        }
        Ok(())
    }

    /// Adjoins the closure of an open cell.
    pub fn adjoin_open_cell(&mut self, open_cell: &GridOpenCell) -> Result<(), PavingError> {
        self.check_same_grid(open_cell.grid())?;
        let closure = open_cell.closure();
        self.adjoin_paving(&closure.view())
    }

    /// Removes a single cell.
    pub fn remove(&mut self, cell: &GridCell) -> Result<(), PavingError> {
        self.check_same_grid(cell.grid())?;
        let Some(mut node) = self.align_with_cell(cell.height(), false, true) else {
            return Ok(());
        };
        let path = cell.word();
        let mut position = 0;
        while position < path.len() && !node.is_leaf() {
            node = node.split_child_mut(path.bit(position));
            position += 1;
        }
        if node.is_leaf() {
            if node.is_enabled() {
                // carve the cell out of the enabled leaf
                for p in position..path.len() {
                    node = node.split_child_mut(path.bit(p));
                }
                node.make_leaf(false);
            }
        } else {
            // the full path was consumed on internal nodes: everything
            // below is the cell
            node.make_leaf(false);
        }
        Ok(())
    }

    /// Intersects this paving with another one on the same grid.
    pub fn restrict_paving(&mut self, other: &GridTreeSubset<'_>) -> Result<(), PavingError> {
        self.check_same_grid(other.grid())?;
        if self.height() < other.height() {
            self.up_to_primary_cell(other.height());
        }
        let mut path = primary_cell_path(self.dimension(), self.height(), other.height());
        path.append(other.cell().word());

        // walk to the other paving's root cell, discarding everything
        // off the path (it cannot be in the intersection)
        let mut node = self.tree_mut();
        for position in 0..path.len() {
            if node.is_disabled() {
                return Ok(());
            }
            node = descend_disabling_sibling(node, path.bit(position));
        }
        if node.is_enabled() {
            *node = other.tree().clone();
        } else if !node.is_disabled() {
            node.restrict(other.tree());
        }
        Ok(())
    }

    /// Removes all cells of another paving on the same grid.
    pub fn remove_paving(&mut self, other: &GridTreeSubset<'_>) -> Result<(), PavingError> {
        self.check_same_grid(other.grid())?;
        if self.height() < other.height() {
            self.up_to_primary_cell(other.height());
        }
        let mut path = primary_cell_path(self.dimension(), self.height(), other.height());
        path.append(other.cell().word());

        let mut node = self.tree_mut();
        for position in 0..path.len() {
            if node.is_disabled() {
                return Ok(());
            }
            node = node.split_child_mut(path.bit(position));
        }
        if !node.is_disabled() {
            node.remove(other.tree());
        }
        Ok(())
    }

    /// Disables every cell not contained in the primary cell at
    /// `height`. The tree stays rooted where it is.
    pub fn restrict_to_height(&mut self, height: u32) {
        if self.height() <= height {
            return;
        }
        let path = primary_cell_path(self.dimension(), self.height(), height);
        let mut node = self.tree_mut();
        for position in 0..path.len() {
            if node.is_disabled() {
                return;
            }
            node = descend_disabling_sibling(node, path.bit(position));
        }
    }
}

/// The words from the two pavings' common primary cell down to their
/// respective tree roots.
fn common_primary_cell_paths(
    first: &GridTreeSubset<'_>,
    second: &GridTreeSubset<'_>,
) -> (BinaryWord, BinaryWord) {
    let dimension = first.dimension();
    if second.height() > first.height() {
        let mut first_path = primary_cell_path(dimension, second.height(), first.height());
        first_path.append(first.cell().word());
        (first_path, second.cell().word().clone())
    } else {
        let mut second_path = primary_cell_path(dimension, first.height(), second.height());
        second_path.append(second.cell().word());
        (first.cell().word().clone(), second_path)
    }
}

/// `sub ⊆ super`, where `path_from_super_to_sub` leads from the super
/// tree's root to the cell the sub tree is rooted at.
fn subset_located_inside(
    sub_tree: &BinaryTreeNode,
    super_tree: &BinaryTreeNode,
    path_from_super_to_sub: &BinaryWord,
) -> bool {
    if !sub_tree.has_enabled() {
        return true;
    }
    if !super_tree.has_enabled() {
        return false;
    }
    let node = super_tree.locate(path_from_super_to_sub);
    if node.is_leaf() {
        node.is_enabled()
    } else {
        BinaryTreeNode::subset(sub_tree, node)
    }
}

/// `super ⊆ sub`, where `path_from_super_to_sub` leads from the super
/// tree's root to the cell the sub tree is rooted at. Every branch the
/// walk leaves aside must be empty, or the super tree sticks out.
fn subset_of_inner_cell(
    super_tree: &BinaryTreeNode,
    path_from_super_to_sub: &BinaryWord,
    sub_tree: &BinaryTreeNode,
) -> bool {
    let mut node = super_tree;
    let mut position = 0;
    let mut extra_leaves_empty = true;
    while position < path_from_super_to_sub.len() && extra_leaves_empty {
        match node {
            BinaryTreeNode::Leaf(_) => break,
            BinaryTreeNode::Internal(lower, upper) => {
                if path_from_super_to_sub.bit(position) {
                    extra_leaves_empty = !lower.has_enabled();
                    node = upper;
                } else {
                    extra_leaves_empty = !upper.has_enabled();
                    node = lower;
                }
            }
        }
        position += 1;
    }
    if !extra_leaves_empty {
        return false;
    }
    match node {
        BinaryTreeNode::Leaf(false) => true,
        BinaryTreeNode::Leaf(true) => {
            if position < path_from_super_to_sub.len() {
                // the enabled leaf is strictly larger than the sub
                // tree's root cell
                false
            } else {
                BinaryTreeNode::subset(node, sub_tree)
            }
        }
        BinaryTreeNode::Internal(_, _) => BinaryTreeNode::subset(node, sub_tree),
    }
}

/// Whether `super` and `sub` share a cell, with `path_from_super_to_sub`
/// leading from the super tree's root to the sub tree's root cell.
fn overlap_located_inside(
    super_tree: &BinaryTreeNode,
    path_from_super_to_sub: &BinaryWord,
    sub_tree: &BinaryTreeNode,
) -> bool {
    if !super_tree.has_enabled() || !sub_tree.has_enabled() {
        return false;
    }
    let node = super_tree.locate(path_from_super_to_sub);
    if node.is_leaf() {
        node.is_enabled()
    } else {
        BinaryTreeNode::overlap(node, sub_tree)
    }
}

/// Whether `first ⊆ second`. Errors on unequal grids.
pub fn subset(
    first: &GridTreeSubset<'_>,
    second: &GridTreeSubset<'_>,
) -> Result<bool, PavingError> {
    if first.grid() != second.grid() {
        return Err(PavingError::GridMismatch);
    }
    let (first_path, second_path) = common_primary_cell_paths(first, second);
    if first_path.is_prefix_of(&second_path) {
        let mut remaining = second_path;
        remaining.erase_prefix(first_path.len());
        Ok(subset_of_inner_cell(first.tree(), &remaining, second.tree()))
    } else if second_path.is_prefix_of(&first_path) {
        let mut remaining = first_path;
        remaining.erase_prefix(second_path.len());
        Ok(subset_located_inside(first.tree(), second.tree(), &remaining))
    } else {
        // the root cells live in disjoint parts of the primary cell
        Ok(!first.tree().has_enabled())
    }
}

/// Whether `first ⊇ second`. Errors on unequal grids.
pub fn superset(
    first: &GridTreeSubset<'_>,
    second: &GridTreeSubset<'_>,
) -> Result<bool, PavingError> {
    subset(second, first)
}

/// Whether the two pavings share a cell. Errors on unequal grids.
pub fn overlap(
    first: &GridTreeSubset<'_>,
    second: &GridTreeSubset<'_>,
) -> Result<bool, PavingError> {
    if first.grid() != second.grid() {
        return Err(PavingError::GridMismatch);
    }
    let (first_path, second_path) = common_primary_cell_paths(first, second);
    if first_path.is_prefix_of(&second_path) {
        let mut remaining = second_path;
        remaining.erase_prefix(first_path.len());
        Ok(overlap_located_inside(first.tree(), &remaining, second.tree()))
    } else if second_path.is_prefix_of(&first_path) {
        let mut remaining = first_path;
        remaining.erase_prefix(second_path.len());
        Ok(overlap_located_inside(second.tree(), &remaining, first.tree()))
    } else {
        Ok(false)
    }
}

/// Whether the two pavings are disjoint. Errors on unequal grids.
pub fn disjoint(
    first: &GridTreeSubset<'_>,
    second: &GridTreeSubset<'_>,
) -> Result<bool, PavingError> {
    Ok(!overlap(first, second)?)
}

/// The union of two pavings on the same grid.
pub fn join(
    first: &GridTreeSubset<'_>,
    second: &GridTreeSubset<'_>,
) -> Result<GridTreeSet, PavingError> {
    if first.grid() != second.grid() {
        return Err(PavingError::GridMismatch);
    }
    let height = first.height().max(second.height());
    let mut result = GridTreeSet::with_height(first.grid().clone(), height);
    result.adjoin_paving(first)?;
    result.adjoin_paving(second)?;
    Ok(result)
}

/// The intersection of two pavings on the same grid.
pub fn intersection(
    first: &GridTreeSubset<'_>,
    second: &GridTreeSubset<'_>,
) -> Result<GridTreeSet, PavingError> {
    if first.grid() != second.grid() {
        return Err(PavingError::GridMismatch);
    }
    let height = first.height().max(second.height());
    let mut result = GridTreeSet::with_height(first.grid().clone(), height);
    result.adjoin_paving(first)?;
    result.restrict_paving(second)?;
    Ok(result)
}

/// The set difference `first \ second` of two pavings on the same grid.
pub fn difference(
    first: &GridTreeSubset<'_>,
    second: &GridTreeSubset<'_>,
) -> Result<GridTreeSet, PavingError> {
    if first.grid() != second.grid() {
        return Err(PavingError::GridMismatch);
    }
    let height = first.height().max(second.height());
    let mut result = GridTreeSet::with_height(first.grid().clone(), height);
    result.adjoin_paving(first)?;
    result.remove_paving(second)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn cell(grid: &Grid, bits: &[bool]) -> GridCell {
        GridCell::new(grid.clone(), 0, bits.iter().copied().collect())
    }

    fn half_paving(grid: &Grid, upper: bool) -> GridTreeSet {
        let mut set = GridTreeSet::new(grid.clone());
        set.adjoin(&cell(grid, &[upper])).unwrap();
        set
    }

    #[test]
    fn rerooting_preserves_measure_and_membership() {
        let grid = Grid::unit(2);
        let mut set = GridTreeSet::new(grid.clone());
        set.adjoin(&GridCell::new(grid.clone(), 0, crate::word::BinaryWord::new()))
            .unwrap();
        assert_eq!(set.measure(), 1.0);

        set.up_to_primary_cell(2);
        assert_eq!(set.height(), 2);
        // the prepended path has one group of bits per level crossed
        assert_eq!(set.tree_depth(), 2 * grid.dimension());
        assert_eq!(set.measure(), 1.0);
        assert_eq!(set.len(), 1);

        let unit_cell = GridCell::new(grid, 0, crate::word::BinaryWord::new());
        assert!(set.view().contains_cell(&unit_cell));
    }

    #[test]
    fn adjoin_is_idempotent_and_monotone() {
        let grid = Grid::unit(2);
        let mut set = GridTreeSet::new(grid.clone());
        let c = cell(&grid, &[false, true]);
        set.adjoin(&c).unwrap();
        let once = set.measure();
        set.adjoin(&c).unwrap();
        assert_eq!(set.measure(), once);
        assert!(set.view().contains_cell(&c));
    }

    #[test]
    fn remove_cell_carves_out_of_larger_leaves() {
        let grid = Grid::unit(2);
        let mut set = GridTreeSet::new(grid.clone());
        set.adjoin(&cell(&grid, &[])).unwrap();
        set.remove(&cell(&grid, &[false, false])).unwrap();
        assert_eq!(set.measure(), 0.75);
        assert!(!set.view().contains_cell(&cell(&grid, &[false, false])));
        assert!(set.view().contains_cell(&cell(&grid, &[true])));
    }

    #[test]
    fn join_of_halves_is_the_whole_cell() {
        let grid = Grid::unit(2);
        let lower = half_paving(&grid, false);
        let upper = half_paving(&grid, true);
        let mut union = join(&lower.view(), &upper.view()).unwrap();
        union.recombine();
        assert_eq!(union.measure(), 1.0);
        assert_eq!(union.len(), 1);
    }

    #[test]
    fn intersection_of_disjoint_halves_is_empty() {
        let grid = Grid::unit(2);
        let lower = half_paving(&grid, false);
        let upper = half_paving(&grid, true);
        let common = intersection(&lower.view(), &upper.view()).unwrap();
        assert!(common.is_empty());
    }

    #[test]
    fn difference_with_self_is_empty() {
        let grid = Grid::unit(2);
        let set = half_paving(&grid, false);
        let empty = difference(&set.view(), &set.view()).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn restrict_with_self_is_identity() {
        let grid = Grid::unit(2);
        let set = half_paving(&grid, true);
        let mut restricted = set.clone();
        restricted.restrict_paving(&set.view()).unwrap();
        assert!(subset(&restricted.view(), &set.view()).unwrap());
        assert!(subset(&set.view(), &restricted.view()).unwrap());
    }

    #[test]
    fn subset_and_overlap_across_heights() {
        let grid = Grid::unit(2);
        let small = half_paving(&grid, false);
        let mut large = half_paving(&grid, false);
        large.adjoin(&cell(&grid, &[true])).unwrap();
        large.up_to_primary_cell(2);

        assert!(subset(&small.view(), &large.view()).unwrap());
        assert!(!subset(&large.view(), &small.view()).unwrap());
        assert!(superset(&large.view(), &small.view()).unwrap());
        assert!(overlap(&small.view(), &large.view()).unwrap());
        assert!(!disjoint(&small.view(), &large.view()).unwrap());
    }

    #[test]
    fn overlap_duality_with_disjoint() {
        let grid = Grid::unit(1);
        let lower = half_paving(&grid, false);
        let upper = half_paving(&grid, true);
        assert_eq!(
            overlap(&lower.view(), &upper.view()).unwrap(),
            !disjoint(&lower.view(), &upper.view()).unwrap()
        );
    }

    #[test]
    fn mismatched_grids_are_rejected() {
        let a = GridTreeSet::new(Grid::unit(2));
        let b = GridTreeSet::new(Grid::scaled(2, 0.5));
        assert!(matches!(
            join(&a.view(), &b.view()),
            Err(PavingError::GridMismatch)
        ));
        let mut a = a;
        assert!(matches!(
            a.adjoin_paving(&b.view()),
            Err(PavingError::GridMismatch)
        ));
    }

    #[test]
    fn restrict_to_height_disables_outer_cells() {
        let grid = Grid::unit(1);
        let mut set = GridTreeSet::new(grid.clone());
        set.adjoin(&cell(&grid, &[])).unwrap();
        set.up_to_primary_cell(2);
        // also enable a cell outside the height-0 primary cell
        set.adjoin(&GridCell::new(grid.clone(), 1, [false].into()))
            .unwrap();
        assert!(set.measure() > 1.0);

        set.restrict_to_height(0);
        assert_eq!(set.measure(), 1.0);
        let unit_cell = GridCell::new(grid, 0, crate::word::BinaryWord::new());
        assert!(set.view().contains_cell(&unit_cell));
    }
}
