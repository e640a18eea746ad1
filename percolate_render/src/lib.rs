// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Execution plans and result caching for percolate effect graphs.
//!
//! This crate is the intermediate layer between [`percolate_core`]'s effect
//! graph and a backend that actually runs the effects. It defines:
//!
//! - [`ExecutionPlan`] — the effects reachable from a terminal effect, in
//!   post-order, each shared input scheduled once
//! - [`ResultCache`] — cached effect outputs, evicted when the builder reports
//!   them stale
//! - [`ResourceKey`] — opaque handle for backend-managed resources

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod cache;
mod plan;
mod resource;

pub use cache::ResultCache;
pub use plan::{ExecutionPlan, PlanStep};
pub use resource::ResourceKey;
