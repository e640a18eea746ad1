// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{ElementId, INVALID};
use super::store::ElementTree;

/// An iterator over the direct children of an element, in document order.
///
/// Created by [`ElementTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a ElementTree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a ElementTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(ElementId {
            idx,
            generation: self.tree.generation[idx as usize],
        })
    }
}
