//! Leaf enumeration with an explicit stack.
//!
//! The walk keeps a stack of pending subtrees together with the words
//! leading to them; there are no parent pointers in the tree, so moving
//! "up" is popping the stack. Enabled leaves come out in left-first
//! depth-first order, which is lexicographic order of their words.

use crate::tree::BinaryTreeNode;
use crate::word::BinaryWord;

/// Iterator over the words of all enabled leaves of a tree, left-first.
#[derive(Debug)]
pub struct EnabledLeaves<'a> {
    stack: Vec<(&'a BinaryTreeNode, BinaryWord)>,
}

impl<'a> EnabledLeaves<'a> {
    /// Walks the subtree rooted at `root`; yielded words are relative
    /// to it.
    pub fn new(root: &'a BinaryTreeNode) -> Self {
        Self {
            stack: vec![(root, BinaryWord::new())],
        }
    }
}

impl Iterator for EnabledLeaves<'_> {
    type Item = BinaryWord;

    fn next(&mut self) -> Option<BinaryWord> {
        while let Some((node, word)) = self.stack.pop() {
            match node {
                BinaryTreeNode::Leaf(true) => return Some(word),
                BinaryTreeNode::Leaf(false) => {}
                BinaryTreeNode::Internal(lower, upper) => {
                    let mut upper_word = word.clone();
                    upper_word.push(true);
                    let mut lower_word = word;
                    lower_word.push(false);
                    // push upper first so the lower half is visited first
                    self.stack.push((upper, upper_word));
                    self.stack.push((lower, lower_word));
                }
            }
        }
        None
    }
}
