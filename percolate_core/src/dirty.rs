// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The effect graph uses [`understory_dirty`] to fan result invalidation out
//! from a producer to everything that reads it. Each built effect is a key;
//! a consumer depends on each of its inputs.
//!
//! # Propagation semantics
//!
//! [`RESULT`] is marked with [`EagerPolicy`](understory_dirty::EagerPolicy)
//! when a parameter is patched in place, so the patched effect and every
//! transitive consumer appear in the next drain. Freshly inserted effects are
//! marked too, since they have no cached result yet.
//!
//! # Consumption
//!
//! The backend drains the channel through
//! [`FilterBuilder::drain_invalidated_results`](crate::builder::FilterBuilder::drain_invalidated_results)
//! and drops the cached pixels of every returned effect.

use understory_dirty::Channel;

/// Cached output of an effect is stale and must be recomputed.
pub const RESULT: Channel = Channel::new(0);
