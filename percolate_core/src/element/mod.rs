// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal element tree standing in for the filter's DOM subtree.
//!
//! The tree is a struct-of-arrays arena. Elements are addressed by
//! [`ElementId`] handles carrying a generation counter, so a handle to a
//! destroyed element is detected instead of silently aliasing a new one.

mod id;
mod store;
mod traverse;

pub use id::ElementId;
pub use store::ElementTree;
pub use traverse::Children;
