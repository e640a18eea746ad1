// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays effect arena with reverse edges and result invalidation.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::element::ElementId;

use super::id::EffectId;
use super::params::{EffectParams, Subregion};

/// Arena of effect nodes owned by one [`FilterBuilder`](crate::builder::FilterBuilder).
///
/// Inputs and consumers are stored as [`EffectId`] handles, never as owning
/// pointers. Discarded nodes are recycled via a free list and their
/// generation is bumped, so stale handles fail [`is_alive`](Self::is_alive).
///
/// The graph is acyclic by construction: a node's inputs always exist before
/// the node is inserted.
#[derive(Debug)]
pub struct EffectGraph {
    // -- Per-node data --
    pub(crate) params: Vec<EffectParams>,
    pub(crate) subregion: Vec<Subregion>,
    pub(crate) producer: Vec<Option<ElementId>>,

    // -- Edges --
    pub(crate) inputs: Vec<Vec<EffectId>>,
    pub(crate) consumers: Vec<Vec<EffectId>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Invalidation --
    pub(crate) dirty: DirtyTracker<u32>,
}

impl Default for EffectGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            subregion: Vec::new(),
            producer: Vec::new(),
            inputs: Vec::new(),
            consumers: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    /// Inserts a node reading `inputs` (in order) and returns its handle.
    ///
    /// Records a reverse edge from every input and marks the new node's
    /// result dirty.
    ///
    /// # Panics
    ///
    /// Panics if any input handle is stale.
    pub(crate) fn insert(
        &mut self,
        params: EffectParams,
        inputs: Vec<EffectId>,
        subregion: Subregion,
        producer: Option<ElementId>,
    ) -> EffectId {
        for &input in &inputs {
            self.validate(input);
        }

        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; generation was bumped on release.
            self.params[idx as usize] = params;
            self.subregion[idx as usize] = subregion;
            self.producer[idx as usize] = producer;
            self.consumers[idx as usize].clear();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.params.push(params);
            self.subregion.push(subregion);
            self.producer.push(producer);
            self.inputs.push(Vec::new());
            self.consumers.push(Vec::new());
            self.generation.push(0);
            idx
        };

        let id = EffectId {
            idx,
            generation: self.generation[idx as usize],
        };
        for &input in &inputs {
            self.add_reverse_edge(input, id);
        }
        self.inputs[idx as usize] = inputs;
        self.dirty.mark(idx, dirty::RESULT);
        id
    }

    /// Records that `consumer` reads the result of `producer`.
    ///
    /// Idempotent: a consumer reading the same producer twice (e.g. `in` and
    /// `in2` naming the same result) is listed once.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn add_reverse_edge(&mut self, producer: EffectId, consumer: EffectId) {
        self.validate(producer);
        self.validate(consumer);
        let list = &mut self.consumers[producer.idx as usize];
        if !list.contains(&consumer) {
            list.push(consumer);
            let _ = self
                .dirty
                .add_dependency(consumer.idx, producer.idx, dirty::RESULT);
        }
    }

    /// Discards `id` if nothing consumes it. Returns whether it was freed.
    ///
    /// Freeing a node removes it from its inputs' consumer lists, which may in
    /// turn leave those inputs unused.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub(crate) fn release(&mut self, id: EffectId) -> bool {
        self.validate(id);
        let idx = id.idx as usize;
        if !self.consumers[idx].is_empty() {
            return false;
        }

        let inputs = core::mem::take(&mut self.inputs[idx]);
        for input in inputs {
            let list = &mut self.consumers[input.idx as usize];
            if let Some(pos) = list.iter().position(|c| *c == id) {
                list.remove(pos);
                self.dirty
                    .remove_dependency(id.idx, input.idx, dirty::RESULT);
            }
        }

        self.dirty.remove_key(id.idx);
        self.producer[idx] = None;
        // Bump generation so old handles immediately fail validation.
        self.generation[idx] += 1;
        self.free_list.push(id.idx);
        true
    }

    /// Marks the cached result of `id` and of every transitive consumer as
    /// stale.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn invalidate_results(&mut self, id: EffectId) {
        self.validate(id);
        self.dirty.mark_with(id.idx, dirty::RESULT, &EagerPolicy);
    }

    /// Returns every node whose result was invalidated since the last drain,
    /// producers before consumers.
    pub(crate) fn drain_invalidated(&mut self) -> Vec<EffectId> {
        let stale: Vec<u32> = self
            .dirty
            .drain(dirty::RESULT)
            .affected()
            .deterministic()
            .run()
            .collect();
        stale
            .into_iter()
            .filter(|&idx| idx < self.len && !self.free_list.contains(&idx))
            .map(|idx| EffectId {
                idx,
                generation: self.generation[idx as usize],
            })
            .collect()
    }

    // -- Query API --

    /// Returns whether `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: EffectId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live nodes, built-ins included.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Iterates live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = EffectId> + '_ {
        (0..self.len)
            .filter(|idx| !self.free_list.contains(idx))
            .map(|idx| EffectId {
                idx,
                generation: self.generation[idx as usize],
            })
    }

    /// Returns the kind and parameters of a node.
    #[must_use]
    pub fn params(&self, id: EffectId) -> &EffectParams {
        self.validate(id);
        &self.params[id.idx as usize]
    }

    pub(crate) fn params_mut(&mut self, id: EffectId) -> &mut EffectParams {
        self.validate(id);
        &mut self.params[id.idx as usize]
    }

    /// Returns the ordered inputs of a node.
    #[must_use]
    pub fn inputs(&self, id: EffectId) -> &[EffectId] {
        self.validate(id);
        &self.inputs[id.idx as usize]
    }

    /// Returns the nodes that read this node's result.
    #[must_use]
    pub fn consumers(&self, id: EffectId) -> &[EffectId] {
        self.validate(id);
        &self.consumers[id.idx as usize]
    }

    /// Returns the primitive subregion of a node.
    #[must_use]
    pub fn subregion(&self, id: EffectId) -> Subregion {
        self.validate(id);
        self.subregion[id.idx as usize]
    }

    /// Returns the element that produced a node, or `None` for built-ins.
    #[must_use]
    pub fn producer(&self, id: EffectId) -> Option<ElementId> {
        self.validate(id);
        self.producer[id.idx as usize]
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: EffectId) {
        assert!(
            self.is_alive(id),
            "stale EffectId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn node(graph: &mut EffectGraph, inputs: Vec<EffectId>) -> EffectId {
        graph.insert(EffectParams::Tile, inputs, Subregion::UNSPECIFIED, None)
    }

    #[test]
    fn insert_records_reverse_edges() {
        let mut graph = EffectGraph::new();
        let source = node(&mut graph, vec![]);
        let a = node(&mut graph, vec![source]);
        let b = node(&mut graph, vec![source, a]);

        assert_eq!(graph.inputs(b), &[source, a]);
        assert_eq!(graph.consumers(source), &[a, b]);
        assert_eq!(graph.consumers(a), &[b]);
        assert!(graph.consumers(b).is_empty(), "terminal has no consumers");
    }

    #[test]
    fn duplicate_input_is_one_reverse_edge() {
        let mut graph = EffectGraph::new();
        let source = node(&mut graph, vec![]);
        let blend = node(&mut graph, vec![source, source]);
        assert_eq!(graph.inputs(blend).len(), 2, "inputs keep both slots");
        assert_eq!(graph.consumers(source), &[blend]);
    }

    #[test]
    fn release_refuses_nodes_with_consumers() {
        let mut graph = EffectGraph::new();
        let a = node(&mut graph, vec![]);
        let b = node(&mut graph, vec![a]);

        assert!(!graph.release(a), "a is still read by b");
        assert!(graph.release(b));
        assert!(graph.consumers(a).is_empty(), "b's edge was removed");
        assert!(graph.release(a));
        assert_eq!(graph.live_count(), 0);
    }

    #[test]
    fn released_slots_are_recycled_with_new_generation() {
        let mut graph = EffectGraph::new();
        let a = node(&mut graph, vec![]);
        assert!(graph.release(a));
        let b = node(&mut graph, vec![]);
        assert_eq!(a.index(), b.index(), "slot is reused");
        assert_ne!(a.generation(), b.generation(), "generation is bumped");
        assert!(!graph.is_alive(a));
        assert!(graph.is_alive(b));
    }

    #[test]
    fn invalidation_fans_out_to_consumers_and_drains_once() {
        let mut graph = EffectGraph::new();
        let source = node(&mut graph, vec![]);
        let a = node(&mut graph, vec![source]);
        let b = node(&mut graph, vec![a]);
        let unrelated = node(&mut graph, vec![source]);

        // Fresh nodes are dirty.
        assert_eq!(graph.drain_invalidated().len(), 4);
        assert!(graph.drain_invalidated().is_empty(), "drain is consuming");

        graph.invalidate_results(a);
        let stale = graph.drain_invalidated();
        assert!(stale.contains(&a) && stale.contains(&b));
        assert!(!stale.contains(&source), "producers are untouched");
        assert!(!stale.contains(&unrelated), "siblings are untouched");
        assert!(graph.drain_invalidated().is_empty());
    }

    #[test]
    fn released_nodes_never_drain() {
        let mut graph = EffectGraph::new();
        let a = node(&mut graph, vec![]);
        let b = node(&mut graph, vec![a]);
        let _ = graph.drain_invalidated();

        graph.invalidate_results(a);
        assert!(graph.release(b));
        assert_eq!(graph.drain_invalidated(), vec![a]);
    }

    #[test]
    #[should_panic(expected = "stale EffectId")]
    fn stale_handle_panics() {
        let mut graph = EffectGraph::new();
        let a = node(&mut graph, vec![]);
        assert!(graph.release(a));
        let _ = graph.params(a);
    }
}
