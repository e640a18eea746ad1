// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for graph building.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! builder and change router call as they work. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use crate::attr::{AttrKey, Route, Tag};
use crate::effect::EffectId;
use crate::element::ElementId;
use crate::error::BuildError;
use crate::router::ChangeOutcome;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a primitive produced an effect during a rebuild.
#[derive(Clone, Copy, Debug)]
pub struct PrimitiveBuiltEvent {
    /// The primitive element.
    pub element: ElementId,
    /// Its kind.
    pub tag: Tag,
    /// The effect it produced.
    pub effect: EffectId,
}

/// Emitted when a primitive contributed no effect.
#[derive(Clone, Copy, Debug)]
pub struct PrimitiveSkippedEvent {
    /// The primitive element.
    pub element: ElementId,
    /// Its kind.
    pub tag: Tag,
    /// Why it was skipped.
    pub error: BuildError,
}

/// Emitted at the end of a full rebuild of one filter.
#[derive(Clone, Copy, Debug)]
pub struct RebuildEvent {
    /// The filter container.
    pub container: ElementId,
    /// Primitives that produced an effect.
    pub built: u32,
    /// Primitives that were skipped.
    pub skipped: u32,
    /// The terminal effect after the rebuild.
    pub last: Option<EffectId>,
}

/// Emitted after an in-place patch was attempted.
#[derive(Clone, Copy, Debug)]
pub struct PatchEvent {
    /// The primitive whose effect was patched.
    pub element: ElementId,
    /// The changed attribute (of the primitive or of its light).
    pub key: AttrKey,
    /// The patched effect.
    pub effect: EffectId,
    /// The rejection, if the new value failed validation.
    pub error: Option<BuildError>,
}

/// Emitted once per attribute change with the router's decision.
#[derive(Clone, Copy, Debug)]
pub struct RouteEvent {
    /// The element whose attribute changed.
    pub element: ElementId,
    /// The changed attribute.
    pub key: AttrKey,
    /// The table route for `(tag, key)`.
    pub route: Route,
    /// What actually happened.
    pub outcome: ChangeOutcome,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the builder and the change router.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a primitive produced an effect.
    fn on_primitive_built(&mut self, e: &PrimitiveBuiltEvent) {
        _ = e;
    }

    /// Called when a primitive was skipped.
    fn on_primitive_skipped(&mut self, e: &PrimitiveSkippedEvent) {
        _ = e;
    }

    /// Called at the end of a rebuild.
    fn on_rebuild(&mut self, e: &RebuildEvent) {
        _ = e;
    }

    /// Called after a patch attempt.
    fn on_patch(&mut self, e: &PatchEvent) {
        _ = e;
    }

    /// Called with each routing decision.
    fn on_route(&mut self, e: &RouteEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PrimitiveBuiltEvent`].
    #[inline]
    pub fn primitive_built(&mut self, e: &PrimitiveBuiltEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_primitive_built(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PrimitiveSkippedEvent`].
    #[inline]
    pub fn primitive_skipped(&mut self, e: &PrimitiveSkippedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_primitive_skipped(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RebuildEvent`].
    #[inline]
    pub fn rebuild(&mut self, e: &RebuildEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_rebuild(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PatchEvent`].
    #[inline]
    pub fn patch(&mut self, e: &PatchEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_patch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RouteEvent`].
    #[inline]
    pub fn route(&mut self, e: &RouteEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_route(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use super::*;
    use crate::element::ElementTree;

    #[derive(Default)]
    struct Counter {
        rebuilds: u32,
    }

    impl TraceSink for Counter {
        fn on_rebuild(&mut self, e: &RebuildEvent) {
            self.rebuilds += e.built;
        }
    }

    #[test]
    fn tracer_dispatches_to_sink() {
        let mut tree = ElementTree::new();
        let container = tree.create_element(Tag::Filter);
        let mut sink = Counter::default();
        let mut tracer = Tracer::new(&mut sink);
        tracer.rebuild(&RebuildEvent {
            container,
            built: 3,
            skipped: 0,
            last: None,
        });
        drop(tracer);
        assert_eq!(sink.rebuilds, 3);
    }

    #[test]
    fn none_tracer_discards() {
        let mut tree = ElementTree::new();
        let container = tree.create_element(Tag::Filter);
        let mut tracer = Tracer::none();
        tracer.rebuild(&RebuildEvent {
            container,
            built: 1,
            skipped: 1,
            last: None,
        });
    }
}
