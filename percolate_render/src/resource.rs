// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque resource keys for backend-managed resources.

use core::fmt;

/// An opaque handle to a backend-managed resource (an intermediate texture or
/// buffer holding one effect's output).
///
/// Resource keys are assigned by backends and stored in the
/// [`ResultCache`](crate::ResultCache) without interpretation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey(pub u64);

impl fmt::Debug for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceKey({})", self.0)
    }
}
