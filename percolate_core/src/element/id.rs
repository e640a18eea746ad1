// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element identity.

use core::fmt;

/// Sentinel value indicating "no element" in index fields.
pub(crate) const INVALID: u32 = u32::MAX;

/// A handle to an element in an [`ElementTree`](super::ElementTree).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after an element is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId {
    /// Slot index into the tree's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the tree's generation for this slot.
    pub(crate) generation: u32,
}

impl ElementId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({}@gen{})", self.idx, self.generation)
    }
}
