// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Elements and
//! effects are printed by slot index.

use std::io::Write;

use percolate_core::effect::EffectId;
use percolate_core::trace::{
    PatchEvent, PrimitiveBuiltEvent, PrimitiveSkippedEvent, RebuildEvent, RouteEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn effect_label(effect: Option<EffectId>) -> String {
    match effect {
        Some(effect) => format!("#{}", effect.index()),
        None => String::from("-"),
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_primitive_built(&mut self, e: &PrimitiveBuiltEvent) {
        let _ = writeln!(
            self.writer,
            "[built] {} element={} effect=#{}",
            e.tag.name(),
            e.element.index(),
            e.effect.index(),
        );
    }

    fn on_primitive_skipped(&mut self, e: &PrimitiveSkippedEvent) {
        let _ = writeln!(
            self.writer,
            "[skipped] {} element={}: {}",
            e.tag.name(),
            e.element.index(),
            e.error,
        );
    }

    fn on_rebuild(&mut self, e: &RebuildEvent) {
        let _ = writeln!(
            self.writer,
            "[rebuild] container={} built={} skipped={} last={}",
            e.container.index(),
            e.built,
            e.skipped,
            effect_label(e.last),
        );
    }

    fn on_patch(&mut self, e: &PatchEvent) {
        let _ = match &e.error {
            None => writeln!(
                self.writer,
                "[patch] element={} {:?} effect=#{} ok",
                e.element.index(),
                e.key,
                e.effect.index(),
            ),
            Some(error) => writeln!(
                self.writer,
                "[patch] element={} {:?} effect=#{} REJECTED: {error}",
                e.element.index(),
                e.key,
                e.effect.index(),
            ),
        };
    }

    fn on_route(&mut self, e: &RouteEvent) {
        let _ = writeln!(
            self.writer,
            "[route] element={} {:?} {:?} -> {:?}",
            e.element.index(),
            e.key,
            e.route,
            e.outcome,
        );
    }
}
