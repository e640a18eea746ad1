// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Why a primitive contributed no effect.
//!
//! None of these are fatal. A failed primitive renders as if absent; the
//! builder records the error in the trace and moves on to the next sibling.

use core::fmt;

use crate::attr::AttrKey;

/// Which input reference of a primitive failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputSlot {
    /// The `in` attribute.
    In,
    /// The `in2` attribute.
    In2,
    /// The `in` attribute of the n-th `feMergeNode` child.
    MergeNode(u32),
}

/// A child element a primitive cannot build without.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequiredChild {
    /// Any of `feDistantLight`, `fePointLight`, `feSpotLight`.
    LightSource,
    /// At least one `feMergeNode`.
    MergeNode,
}

/// Errors produced while building or patching a primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuildError {
    /// A named or defaulted input reference has no matching effect.
    UnresolvedInput(InputSlot),
    /// A validation rule on the given attribute failed.
    InvalidParameter(AttrKey),
    /// A required child element (light source, merge node) is missing.
    MissingRequiredChild(RequiredChild),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedInput(InputSlot::In) => write!(f, "unresolved `in` reference"),
            Self::UnresolvedInput(InputSlot::In2) => write!(f, "unresolved `in2` reference"),
            Self::UnresolvedInput(InputSlot::MergeNode(n)) => {
                write!(f, "unresolved `in` reference on merge node {n}")
            }
            Self::InvalidParameter(key) => write!(f, "invalid value for {key:?}"),
            Self::MissingRequiredChild(RequiredChild::LightSource) => {
                write!(f, "missing light source child")
            }
            Self::MissingRequiredChild(RequiredChild::MergeNode) => {
                write!(f, "missing feMergeNode child")
            }
        }
    }
}

impl core::error::Error for BuildError {}
