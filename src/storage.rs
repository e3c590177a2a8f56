//! Checkpoint persistence.
//!
//! A tree serializes as a pre-order byte stream: one shape byte per
//! node (`1` internal, `0` leaf) followed, for leaves, by one flag
//! byte. No magic, no version, no grid data: this is the engine's own
//! checkpoint format, not an interchange format. A well-formed stream
//! ends exactly when the tree is consumed.
//!
//! Exporting hands the tree over to the stream: nodes are dropped as
//! soon as they are written and the paving is left empty. Importing
//! from a file consumes the checkpoint, removing the file after a
//! successful read.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::paving::GridTreeSet;
use crate::tree::BinaryTreeNode;
use crate::PavingError;

const SHAPE_LEAF: u8 = 0;
const SHAPE_INTERNAL: u8 = 1;

fn export_node<W: Write>(node: BinaryTreeNode, writer: &mut W) -> Result<(), PavingError> {
    match node {
        BinaryTreeNode::Leaf(enabled) => {
            writer.write_all(&[SHAPE_LEAF, u8::from(enabled)])?;
        }
        BinaryTreeNode::Internal(lower, upper) => {
            writer.write_all(&[SHAPE_INTERNAL])?;
            export_node(*lower, writer)?;
            export_node(*upper, writer)?;
        }
    }
    Ok(())
}

fn import_node<R: Read>(reader: &mut R) -> Result<BinaryTreeNode, PavingError> {
    let mut byte = [0u8];
    reader.read_exact(&mut byte)?;
    match byte[0] {
        SHAPE_LEAF => {
            reader.read_exact(&mut byte)?;
            match byte[0] {
                0 => Ok(BinaryTreeNode::Leaf(false)),
                1 => Ok(BinaryTreeNode::Leaf(true)),
                other => Err(PavingError::InvalidState(format!(
                    "invalid leaf flag byte {other} in paving stream"
                ))),
            }
        }
        SHAPE_INTERNAL => {
            let lower = import_node(reader)?;
            let upper = import_node(reader)?;
            Ok(BinaryTreeNode::internal(lower, upper))
        }
        other => Err(PavingError::InvalidState(format!(
            "invalid shape byte {other} in paving stream"
        ))),
    }
}

impl GridTreeSet {
    /// Writes the tree to `writer` in pre-order, dropping nodes as they
    /// are written. Afterwards the paving is empty (a single disabled
    /// leaf at its current height).
    pub fn export_to_writer<W: Write>(&mut self, writer: &mut W) -> Result<(), PavingError> {
        let tree = std::mem::replace(self.tree_mut(), BinaryTreeNode::Leaf(false));
        export_node(tree, writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Replaces this paving's tree with the one read from `reader`. The
    /// grid and root height are kept; the stream carries neither.
    pub fn import_from_reader<R: Read>(&mut self, reader: &mut R) -> Result<(), PavingError> {
        let tree = import_node(reader)?;
        let height = self.height();
        self.replace_tree(height, tree);
        Ok(())
    }

    /// Exports the tree to a checkpoint file, leaving the paving empty.
    pub fn export_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PavingError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.export_to_writer(&mut writer)
    }

    /// Imports a checkpoint file into this paving and removes the file.
    pub fn import_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PavingError> {
        let path = path.as_ref();
        {
            let mut reader = BufReader::new(File::open(path)?);
            self.import_from_reader(&mut reader)?;
        }
        std::fs::remove_file(path)?;
        Ok(())
    }
}
