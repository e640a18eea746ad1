// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effect identity.

use core::fmt;

/// A handle to an effect node in an [`EffectGraph`](super::EffectGraph).
///
/// Like [`ElementId`](crate::element::ElementId), it pairs a slot index with a
/// generation so a handle to a discarded effect never aliases its successor.
/// Backends key cached results by `EffectId`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl EffectId {
    /// Returns the raw slot index (for diagnostics and dense side tables).
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

impl fmt::Debug for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EffectId({}@gen{})", self.idx, self.generation)
    }
}
