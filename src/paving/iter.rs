//! Enabled-cell iteration.

use crate::cell::GridCell;
use crate::tree::{BinaryTreeNode, EnabledLeaves};
use crate::word::BinaryWord;

/// Iterator over the enabled cells of a paving, left-first.
///
/// The iterator borrows the paving's tree; mutating the paving while an
/// iterator is outstanding does not compile.
#[derive(Debug)]
pub struct GridCells<'a> {
    cell: GridCell,
    leaves: EnabledLeaves<'a>,
}

impl<'a> GridCells<'a> {
    pub(crate) fn new(cell: GridCell, root: &'a BinaryTreeNode) -> Self {
        Self {
            cell,
            leaves: EnabledLeaves::new(root),
        }
    }
}

impl Iterator for GridCells<'_> {
    type Item = GridCell;

    fn next(&mut self) -> Option<GridCell> {
        let leaf_word = self.leaves.next()?;
        let mut word: BinaryWord = self.cell.word().clone();
        word.append(&leaf_word);
        Some(GridCell::new(
            self.cell.grid().clone(),
            self.cell.height(),
            word,
        ))
    }
}
