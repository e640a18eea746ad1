// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The built effect graph.
//!
//! Effects are the executable counterpart of filter primitives: a kind with
//! fully resolved parameters, ordered inputs, and a subregion. They live in an
//! [`EffectGraph`] arena and are addressed by generational [`EffectId`]
//! handles.

mod graph;
mod id;
mod params;

pub use graph::EffectGraph;
pub use id::EffectId;
pub use params::{
    ConvolveMatrix, EffectParams, LightSource, Lighting, Subregion, TransferFunction,
};
