// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event recording, pretty-printing, and graph dumps for percolate
//! diagnostics.
//!
//! This crate provides [`TraceSink`](percolate_core::trace::TraceSink)
//! implementations and inspection helpers for development:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] — in-memory event log with JSON export.
//! - [`dump::graph_json`] — a JSON snapshot of a builder's effect graph.

pub mod dump;
pub mod pretty;
pub mod recorder;
