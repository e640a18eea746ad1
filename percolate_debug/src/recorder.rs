// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording with JSON export.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event it
//! receives, in order, as a [`RecordedEvent`]. [`RecorderSink::to_json`]
//! renders the log as a JSON array for offline inspection.

use std::io::{self, Write};

use serde_json::{Value, json};

use percolate_core::effect::EffectId;
use percolate_core::trace::{
    PatchEvent, PrimitiveBuiltEvent, PrimitiveSkippedEvent, RebuildEvent, RouteEvent, TraceSink,
};

/// One recorded event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`PrimitiveBuiltEvent`].
    PrimitiveBuilt(PrimitiveBuiltEvent),
    /// A [`PrimitiveSkippedEvent`].
    PrimitiveSkipped(PrimitiveSkippedEvent),
    /// A [`RebuildEvent`].
    Rebuild(RebuildEvent),
    /// A [`PatchEvent`].
    Patch(PatchEvent),
    /// A [`RouteEvent`].
    Route(RouteEvent),
}

impl RecordedEvent {
    /// Renders the event as a JSON object with a `"type"` discriminant.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::PrimitiveBuilt(e) => json!({
                "type": "PrimitiveBuilt",
                "element": e.element.index(),
                "tag": e.tag.name(),
                "effect": effect_index(Some(e.effect)),
            }),
            Self::PrimitiveSkipped(e) => json!({
                "type": "PrimitiveSkipped",
                "element": e.element.index(),
                "tag": e.tag.name(),
                "error": e.error.to_string(),
            }),
            Self::Rebuild(e) => json!({
                "type": "Rebuild",
                "container": e.container.index(),
                "built": e.built,
                "skipped": e.skipped,
                "last": effect_index(e.last),
            }),
            Self::Patch(e) => json!({
                "type": "Patch",
                "element": e.element.index(),
                "key": format!("{:?}", e.key),
                "effect": effect_index(Some(e.effect)),
                "error": e.error.map(|error| error.to_string()),
            }),
            Self::Route(e) => json!({
                "type": "Route",
                "element": e.element.index(),
                "key": format!("{:?}", e.key),
                "route": format!("{:?}", e.route),
                "outcome": format!("{:?}", e.outcome),
            }),
        }
    }
}

fn effect_index(effect: Option<EffectId>) -> Value {
    effect.map_or(Value::Null, |effect| Value::from(effect.index()))
}

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in arrival order.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns its events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Renders the log as a JSON array.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(self.events.iter().map(RecordedEvent::to_json).collect())
    }

    /// Writes the log as pretty-printed JSON.
    pub fn write_json(&self, writer: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, &self.to_json())?;
        writeln!(writer)
    }
}

impl TraceSink for RecorderSink {
    fn on_primitive_built(&mut self, e: &PrimitiveBuiltEvent) {
        self.events.push(RecordedEvent::PrimitiveBuilt(*e));
    }

    fn on_primitive_skipped(&mut self, e: &PrimitiveSkippedEvent) {
        self.events.push(RecordedEvent::PrimitiveSkipped(*e));
    }

    fn on_rebuild(&mut self, e: &RebuildEvent) {
        self.events.push(RecordedEvent::Rebuild(*e));
    }

    fn on_patch(&mut self, e: &PatchEvent) {
        self.events.push(RecordedEvent::Patch(*e));
    }

    fn on_route(&mut self, e: &RouteEvent) {
        self.events.push(RecordedEvent::Route(*e));
    }
}
