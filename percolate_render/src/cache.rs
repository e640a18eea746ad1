// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cached effect outputs, keyed by effect.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use percolate_core::effect::{EffectGraph, EffectId};

use crate::plan::ExecutionPlan;
use crate::resource::ResourceKey;

/// Maps effects to the backend resources holding their last output.
///
/// The cache never frees resources itself. Eviction returns the keys it
/// dropped so the backend can release them.
#[derive(Clone, Debug, Default)]
pub struct ResultCache {
    entries: BTreeMap<EffectId, ResourceKey>,
}

impl ResultCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the output of `effect`, returning the resource it replaced.
    pub fn insert(&mut self, effect: EffectId, resource: ResourceKey) -> Option<ResourceKey> {
        self.entries.insert(effect, resource)
    }

    /// Returns the cached output of `effect`.
    #[must_use]
    pub fn get(&self, effect: EffectId) -> Option<ResourceKey> {
        self.entries.get(&effect).copied()
    }

    /// Evicts the given stale effects, typically the result of
    /// [`FilterBuilder::drain_invalidated_results`](percolate_core::builder::FilterBuilder::drain_invalidated_results).
    pub fn invalidate(&mut self, stale: &[EffectId]) -> Vec<ResourceKey> {
        stale
            .iter()
            .filter_map(|effect| self.entries.remove(effect))
            .collect()
    }

    /// Evicts entries whose effect no longer exists in `graph`.
    pub fn retain_live(&mut self, graph: &EffectGraph) -> Vec<ResourceKey> {
        let mut evicted = Vec::new();
        self.entries.retain(|&effect, &mut resource| {
            let live = graph.is_alive(effect);
            if !live {
                evicted.push(resource);
            }
            live
        });
        evicted
    }

    /// Iterates the steps of `plan` with no cached output, in plan order.
    pub fn missing<'a>(&'a self, plan: &'a ExecutionPlan) -> impl Iterator<Item = usize> + 'a {
        plan.steps
            .iter()
            .enumerate()
            .filter(|(_, step)| !self.entries.contains_key(&step.effect))
            .map(|(i, _)| i)
    }

    /// Returns the number of cached outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use percolate_core::attr::{AttrKey, Tag};
    use percolate_core::builder::FilterBuilder;
    use percolate_core::element::{ElementId, ElementTree};
    use percolate_core::router;
    use percolate_core::style::InitialStyle;
    use percolate_core::trace::Tracer;

    use super::*;

    /// Runs every missing step of the plan, caching one resource per effect.
    fn execute(cache: &mut ResultCache, plan: &ExecutionPlan, next_key: &mut u64) -> usize {
        let missing: Vec<usize> = cache.missing(plan).collect();
        for &i in &missing {
            *next_key += 1;
            cache.insert(plan.steps[i].effect, ResourceKey(*next_key));
        }
        missing.len()
    }

    fn offset_then_blur() -> (ElementTree, ElementId, ElementId, FilterBuilder) {
        let mut tree = ElementTree::new();
        let container = tree.create_element(Tag::Filter);
        let offset = tree.create_element(Tag::Offset);
        let blur = tree.create_element(Tag::GaussianBlur);
        tree.append_child(container, offset);
        tree.append_child(container, blur);
        let mut builder = FilterBuilder::new();
        builder.rebuild_from(&tree, container, &InitialStyle, &mut Tracer::none());
        (tree, offset, blur, builder)
    }

    #[test]
    fn patch_evicts_the_patched_effect_and_its_consumers() {
        let (mut tree, offset, _, mut builder) = offset_then_blur();
        let mut cache = ResultCache::new();
        let mut next_key = 0;

        let plan = ExecutionPlan::for_builder(&builder).expect("has a terminal");
        let stale = builder.drain_invalidated_results();
        assert!(cache.invalidate(&stale).is_empty(), "nothing cached yet");
        assert_eq!(execute(&mut cache, &plan, &mut next_key), 3);
        assert_eq!(execute(&mut cache, &plan, &mut next_key), 0, "all cached");

        tree.set_attribute(offset, AttrKey::Dx, 10.0);
        router::on_attribute_changed(
            &tree,
            &mut builder,
            offset,
            AttrKey::Dx,
            &InitialStyle,
            &mut Tracer::none(),
        );
        let stale = builder.drain_invalidated_results();
        assert_eq!(cache.invalidate(&stale).len(), 2, "offset and blur");
        assert_eq!(
            cache.missing(&plan).collect::<Vec<_>>(),
            vec![1, 2],
            "SourceGraphic stays cached"
        );
    }

    #[test]
    fn rebuild_leaves_dead_entries_for_retain_live() {
        let (tree, _, blur, mut builder) = offset_then_blur();
        let mut cache = ResultCache::new();
        let mut next_key = 0;
        let plan = ExecutionPlan::for_builder(&builder).expect("has a terminal");
        let _ = builder.drain_invalidated_results();
        execute(&mut cache, &plan, &mut next_key);
        let old_blur = builder.effect_of(blur).expect("built");

        let container = builder.container().expect("built once");
        builder.rebuild_from(&tree, container, &InitialStyle, &mut Tracer::none());
        assert!(cache.get(old_blur).is_some(), "not evicted by drain alone");
        let evicted = cache.retain_live(builder.graph());
        assert_eq!(evicted.len(), 2, "old offset and blur");
        assert_eq!(cache.len(), 1, "SourceGraphic survives rebuilds");
    }
}
