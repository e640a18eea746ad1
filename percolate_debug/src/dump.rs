// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON snapshots of a builder's effect graph.

use std::io::{self, Write};

use serde_json::{Value, json};

use percolate_core::builder::FilterBuilder;
use percolate_core::effect::{EffectGraph, EffectId};

/// Renders every live effect of `builder` as JSON.
///
/// The object has a `"terminal"` index (or `null`) and an `"effects"` array
/// ordered by slot index. Parameters are rendered with their `Debug` form.
#[must_use]
pub fn graph_json(builder: &FilterBuilder) -> Value {
    let graph = builder.graph();
    let effects: Vec<Value> = graph.iter().map(|id| effect_json(graph, id)).collect();
    json!({
        "terminal": builder.last_effect().map(EffectId::index),
        "effects": effects,
    })
}

/// Writes [`graph_json`] pretty-printed.
pub fn write_graph(builder: &FilterBuilder, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &graph_json(builder))?;
    writeln!(writer)
}

fn effect_json(graph: &EffectGraph, id: EffectId) -> Value {
    let params = graph.params(id);
    let subregion = graph.subregion(id);
    let indices = |ids: &[EffectId]| ids.iter().map(|i| i.index()).collect::<Vec<_>>();
    json!({
        "index": id.index(),
        "generation": id.generation(),
        "kind": params.name(),
        "element": graph.producer(id).map(|element| element.index()),
        "inputs": indices(graph.inputs(id)),
        "consumers": indices(graph.consumers(id)),
        "subregion": {
            "x": subregion.x,
            "y": subregion.y,
            "width": subregion.width,
            "height": subregion.height,
        },
        "params": format!("{params:?}"),
    })
}
