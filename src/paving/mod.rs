//! Pavings: sets represented as trees of dyadic cells.
//!
//! [`GridTreeSet`] owns a binary tree rooted at a primary cell and
//! denotes the union of the real-space boxes of its enabled leaves.
//! [`GridTreeSubset`] is the borrowed, read-only face of the same data:
//! a root cell plus a reference into a tree. All queries live on the
//! view; all mutation lives on the owner. Iterators borrow from the
//! view, so mutating a paving while iterating it is rejected at
//! compile time.

mod iter;
mod ops;

pub use iter::GridCells;
pub use ops::{difference, disjoint, intersection, join, overlap, subset, superset};

use crate::cell::{bisect_lattice, GridCell};
use crate::grid::Grid;
use crate::logic::Tribool;
use crate::numeric::IntervalBox;
use crate::tree::BinaryTreeNode;
use crate::word::BinaryWord;

/// A borrowed subset of a paving: the cell its tree is rooted at, and
/// the tree itself.
///
/// The denoted set is the union of the boxes of the enabled leaves,
/// each leaf's word being the root cell's word extended by the path
/// from the tree root to the leaf.
#[derive(Debug, Clone)]
pub struct GridTreeSubset<'a> {
    cell: GridCell,
    root: &'a BinaryTreeNode,
}

impl<'a> GridTreeSubset<'a> {
    /// A view of the tree `root` interpreted at `cell`.
    pub fn new(cell: GridCell, root: &'a BinaryTreeNode) -> Self {
        Self { cell, root }
    }

    /// The cell the tree is rooted at.
    pub fn cell(&self) -> &GridCell {
        &self.cell
    }

    /// The grid the paving lives on.
    pub fn grid(&self) -> &Grid {
        self.cell.grid()
    }

    /// The primary-cell height of the root cell.
    pub fn height(&self) -> u32 {
        self.cell.height()
    }

    /// The dimension of the grid.
    pub fn dimension(&self) -> usize {
        self.cell.dimension()
    }

    /// The underlying tree.
    pub fn tree(&self) -> &'a BinaryTreeNode {
        self.root
    }

    /// The longest leaf distance of the tree.
    pub fn tree_depth(&self) -> usize {
        self.root.depth()
    }

    /// Whether the denoted set is empty.
    pub fn is_empty(&self) -> bool {
        !self.root.has_enabled()
    }

    /// The number of enabled leaves.
    pub fn len(&self) -> usize {
        self.root.count_enabled_leaves()
    }

    /// The total measure of the enabled cells' boxes.
    pub fn measure(&self) -> f64 {
        self.iter().map(|cell| cell.bounds().measure()).sum()
    }

    /// The hull of the enabled cells' boxes, or `None` when empty.
    pub fn bounding_box(&self) -> Option<IntervalBox> {
        let mut cells = self.iter();
        let first = cells.next()?.bounds();
        Some(cells.fold(first, |hull, cell| hull.hull(&cell.bounds())))
    }

    /// Iterates the enabled cells in left-first depth-first order,
    /// which is lexicographic order of their words.
    pub fn iter(&self) -> GridCells<'a> {
        GridCells::new(self.cell.clone(), self.root)
    }

    /// Whether the paving covers `bounds` (box inside paving).
    pub fn covers(&self, bounds: &IntervalBox) -> Tribool {
        self.with_lattice(|node, grid, lattice, word_len| {
            covers_node(node, grid, lattice, word_len, bounds)
        })
    }

    /// Whether the paving lies inside the closed box `bounds`.
    pub fn inside(&self, bounds: &IntervalBox) -> Tribool {
        self.with_lattice(|node, grid, lattice, word_len| {
            inside_node(node, grid, lattice, word_len, bounds)
        })
    }

    /// Whether the paving and `bounds` share interior points.
    pub fn overlaps(&self, bounds: &IntervalBox) -> Tribool {
        self.with_lattice(|node, grid, lattice, word_len| {
            overlaps_node(node, grid, lattice, word_len, bounds)
        })
    }

    /// Whether the paving and `bounds` are disjoint.
    pub fn disjoint(&self, bounds: &IntervalBox) -> Tribool {
        !self.overlaps(bounds)
    }

    /// Whether `cell` lies entirely within the denoted set.
    pub fn contains_cell(&self, cell: &GridCell) -> bool {
        if cell.grid() != self.grid() {
            return false;
        }
        let (cell_word, set_word) = cell.aligned_words(&self.cell);
        if !set_word.is_prefix_of(&cell_word) {
            return false;
        }
        let mut path = cell_word;
        path.erase_prefix(set_word.len());
        self.root.is_enabled_along(&path)
    }

    /// Whether `cell` shares a cell with the denoted set.
    pub fn overlaps_cell(&self, cell: &GridCell) -> bool {
        if cell.grid() != self.grid() {
            return false;
        }
        let (cell_word, set_word) = cell.aligned_words(&self.cell);
        if cell_word.is_prefix_of(&set_word) {
            self.root.has_enabled()
        } else if set_word.is_prefix_of(&cell_word) {
            let mut path = cell_word;
            path.erase_prefix(set_word.len());
            self.root.locate(&path).has_enabled()
        } else {
            false
        }
    }

    fn with_lattice<F>(&self, predicate: F) -> Tribool
    where
        F: FnOnce(&BinaryTreeNode, &Grid, &IntervalBox, usize) -> Tribool,
    {
        let lattice = self.cell.lattice_bounds();
        predicate(self.root, self.grid(), &lattice, self.cell.word().len())
    }
}

fn covers_node(
    node: &BinaryTreeNode,
    grid: &Grid,
    lattice: &IntervalBox,
    word_len: usize,
    bounds: &IntervalBox,
) -> Tribool {
    let cell_bounds = grid.lattice_to_space(lattice);
    let intersects = cell_bounds.overlaps(bounds);
    if !intersects.possibly() {
        // cells away from the box are irrelevant to the covering
        return Tribool::True;
    }
    match node {
        BinaryTreeNode::Leaf(true) => Tribool::True,
        BinaryTreeNode::Leaf(false) => !intersects,
        BinaryTreeNode::Internal(lower, upper) => {
            let axis = word_len % grid.dimension();
            let (lower_lattice, upper_lattice) = bisect_lattice(lattice, axis);
            let lower_result = covers_node(lower, grid, &lower_lattice, word_len + 1, bounds);
            if !lower_result.possibly() {
                return Tribool::False;
            }
            let upper_result = covers_node(upper, grid, &upper_lattice, word_len + 1, bounds);
            if !upper_result.possibly() {
                Tribool::False
            } else if lower_result.definitely() && upper_result.definitely() {
                Tribool::True
            } else {
                Tribool::Indeterminate
            }
        }
    }
}

fn inside_node(
    node: &BinaryTreeNode,
    grid: &Grid,
    lattice: &IntervalBox,
    word_len: usize,
    bounds: &IntervalBox,
) -> Tribool {
    let cell_bounds = grid.lattice_to_space(lattice);
    let contained = cell_bounds.subset_of(bounds);
    if contained.definitely() {
        return Tribool::True;
    }
    match node {
        BinaryTreeNode::Leaf(enabled) => {
            if !contained.possibly() {
                Tribool::from(!enabled)
            } else if *enabled {
                Tribool::Indeterminate
            } else {
                Tribool::True
            }
        }
        BinaryTreeNode::Internal(lower, upper) => {
            let axis = word_len % grid.dimension();
            let (lower_lattice, upper_lattice) = bisect_lattice(lattice, axis);
            let lower_result = inside_node(lower, grid, &lower_lattice, word_len + 1, bounds);
            if !lower_result.possibly() {
                return Tribool::False;
            }
            let upper_result = inside_node(upper, grid, &upper_lattice, word_len + 1, bounds);
            if !upper_result.possibly() {
                Tribool::False
            } else if lower_result.definitely() && upper_result.definitely() {
                Tribool::True
            } else {
                Tribool::Indeterminate
            }
        }
    }
}

fn overlaps_node(
    node: &BinaryTreeNode,
    grid: &Grid,
    lattice: &IntervalBox,
    word_len: usize,
    bounds: &IntervalBox,
) -> Tribool {
    let cell_bounds = grid.lattice_to_space(lattice);
    let possible = cell_bounds.overlaps(bounds);
    if !possible.possibly() {
        return Tribool::False;
    }
    match node {
        BinaryTreeNode::Leaf(true) => possible,
        BinaryTreeNode::Leaf(false) => Tribool::False,
        BinaryTreeNode::Internal(lower, upper) => {
            let axis = word_len % grid.dimension();
            let (lower_lattice, upper_lattice) = bisect_lattice(lattice, axis);
            let lower_result = overlaps_node(lower, grid, &lower_lattice, word_len + 1, bounds);
            if lower_result.definitely() {
                return Tribool::True;
            }
            let upper_result = overlaps_node(upper, grid, &upper_lattice, word_len + 1, bounds);
            if upper_result.definitely() {
                Tribool::True
            } else if lower_result.is_indeterminate() || upper_result.is_indeterminate() {
                Tribool::Indeterminate
            } else {
                Tribool::False
            }
        }
    }
}

/// A paving that owns its tree. The root cell always has an empty word:
/// the tree hangs directly off a primary cell.
#[derive(Debug, Clone)]
pub struct GridTreeSet {
    grid: Grid,
    height: u32,
    root: BinaryTreeNode,
}

impl GridTreeSet {
    /// The empty paving rooted at the height-0 primary cell.
    pub fn new(grid: Grid) -> Self {
        Self::with_height(grid, 0)
    }

    /// The empty paving rooted at the primary cell of the given height.
    pub fn with_height(grid: Grid, height: u32) -> Self {
        Self {
            grid,
            height,
            root: BinaryTreeNode::Leaf(false),
        }
    }

    /// The paving containing exactly the given cell.
    pub fn from_cell(cell: &GridCell) -> Self {
        let mut set = Self::with_height(cell.grid().clone(), cell.height());
        set.adjoin(cell)
            .expect("the cell lives on the paving's own grid");
        set
    }

    /// The empty paving rooted at the smallest primary cell enclosing
    /// `bounds` on `grid`.
    pub fn enclosing(grid: Grid, bounds: &IntervalBox) -> Self {
        let height = crate::cell::smallest_enclosing_primary_cell_height_on(bounds, &grid);
        Self::with_height(grid, height)
    }

    /// The grid the paving lives on.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The height of the primary cell the tree is rooted at.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The dimension of the grid.
    pub fn dimension(&self) -> usize {
        self.grid.dimension()
    }

    /// The root cell (the primary cell at the paving's height).
    pub fn root_cell(&self) -> GridCell {
        GridCell::new(self.grid.clone(), self.height, BinaryWord::new())
    }

    /// The owned tree.
    pub fn tree(&self) -> &BinaryTreeNode {
        &self.root
    }

    pub(crate) fn tree_mut(&mut self) -> &mut BinaryTreeNode {
        &mut self.root
    }

    pub(crate) fn replace_tree(&mut self, height: u32, root: BinaryTreeNode) {
        self.height = height;
        self.root = root;
    }

    /// The borrowed view of this paving.
    pub fn view(&self) -> GridTreeSubset<'_> {
        GridTreeSubset::new(self.root_cell(), &self.root)
    }

    /// Whether the denoted set is empty.
    pub fn is_empty(&self) -> bool {
        self.view().is_empty()
    }

    /// The number of enabled leaves.
    pub fn len(&self) -> usize {
        self.view().len()
    }

    /// The total measure of the enabled cells' boxes.
    pub fn measure(&self) -> f64 {
        self.view().measure()
    }

    /// The hull of the enabled cells' boxes, or `None` when empty.
    pub fn bounding_box(&self) -> Option<IntervalBox> {
        self.view().bounding_box()
    }

    /// The longest leaf distance of the tree.
    pub fn tree_depth(&self) -> usize {
        self.root.depth()
    }

    /// Iterates the enabled cells in word order.
    pub fn iter(&self) -> GridCells<'_> {
        self.view().iter()
    }

    /// Splits every non-disabled leaf down to the given tree depth.
    pub fn mince_to_tree_depth(&mut self, depth: usize) {
        self.root.mince(depth);
    }

    /// Merges sibling leaves with equal flags, bottom-up.
    pub fn recombine(&mut self) {
        self.root.recombine();
    }

    /// Replaces this paving with the empty one at height 0.
    pub fn clear(&mut self) {
        self.height = 0;
        self.root = BinaryTreeNode::Leaf(false);
    }

    /// Splits until no cell of the paving is wider than
    /// `max_cell_width` on any axis.
    ///
    /// # Panics
    ///
    /// Panics if `max_cell_width` is not positive.
    pub fn subdivide(&mut self, max_cell_width: f64) {
        assert!(max_cell_width > 0.0, "maximum cell width must be positive");
        let bounds = self.root_cell().bounds();
        let dimensions = self.dimension();

        let mut most_subdivisions = 0u32;
        let mut split_axis = 0usize;
        for axis in 0..dimensions {
            let needed = subdivisions_needed(bounds.axis(axis).width(), max_cell_width);
            if needed >= most_subdivisions {
                most_subdivisions = needed;
                split_axis = axis;
            }
        }
        if most_subdivisions == 0 {
            return;
        }

        // the axis bisected last on the way to this root, if any
        let path_length = self.root_cell().word().len();
        let last_axis: i64 = if path_length == 0 {
            -1
        } else {
            ((path_length - 1) % dimensions) as i64
        };

        // tree levels until the widest axis is bisected once, then a
        // full cycle per remaining subdivision
        let first_steps = if last_axis == split_axis as i64 {
            dimensions
        } else if last_axis < split_axis as i64 {
            (split_axis as i64 - last_axis) as usize
        } else {
            dimensions - (last_axis - split_axis as i64) as usize
        };
        let depth = first_steps + (most_subdivisions as usize - 1) * dimensions;
        self.mince_to_tree_depth(depth);
    }
}

/// How many halvings take `width` at or below `max_width`.
fn subdivisions_needed(width: f64, max_width: f64) -> u32 {
    let mut count = 0;
    let mut w = width;
    while w > max_width {
        w /= 2.0;
        count += 1;
    }
    count
}

impl<'a> IntoIterator for &'a GridTreeSet {
    type Item = GridCell;
    type IntoIter = GridCells<'a>;

    fn into_iter(self) -> GridCells<'a> {
        self.iter()
    }
}
