// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Execution plan: the effects of one filter in the order they must run.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use percolate_core::builder::FilterBuilder;
use percolate_core::effect::{EffectGraph, EffectId, Subregion};

/// One effect to execute.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanStep {
    /// The effect to run.
    pub effect: EffectId,
    /// Indices into [`ExecutionPlan::steps`] of this effect's inputs, in input
    /// order. Every index is smaller than this step's own index.
    pub inputs: Vec<usize>,
    /// The effect's primitive subregion.
    pub subregion: Subregion,
}

/// The effects reachable from a terminal effect, inputs before consumers.
///
/// Effects read by several consumers appear once; their consumers refer to
/// them by step index. Effects not reachable from the terminal (for example a
/// named result nobody reads) are not scheduled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionPlan {
    /// Steps in post-order; the terminal effect is last.
    pub steps: Vec<PlanStep>,
}

impl ExecutionPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules everything `root` depends on.
    ///
    /// # Panics
    ///
    /// Panics if `root` or anything it reads is stale.
    #[must_use]
    pub fn build(graph: &EffectGraph, root: EffectId) -> Self {
        let mut plan = Self::new();
        plan.rebuild(graph, root);
        plan
    }

    /// Schedules the terminal effect of `builder`, if it has one.
    #[must_use]
    pub fn for_builder(builder: &FilterBuilder) -> Option<Self> {
        builder
            .last_effect()
            .map(|root| Self::build(builder.graph(), root))
    }

    /// Clears the plan and schedules `root` again, reusing the allocation.
    pub fn rebuild(&mut self, graph: &EffectGraph, root: EffectId) {
        self.steps.clear();
        let mut placed: BTreeMap<EffectId, usize> = BTreeMap::new();
        // (effect, inputs already pushed)
        let mut stack = vec![(root, false)];
        while let Some((effect, expanded)) = stack.pop() {
            if placed.contains_key(&effect) {
                continue;
            }
            if expanded {
                let inputs = graph
                    .inputs(effect)
                    .iter()
                    .filter_map(|input| placed.get(input).copied())
                    .collect();
                placed.insert(effect, self.steps.len());
                self.steps.push(PlanStep {
                    effect,
                    inputs,
                    subregion: graph.subregion(effect),
                });
            } else {
                stack.push((effect, true));
                // Reversed so the first input is scheduled first.
                for &input in graph.inputs(effect).iter().rev() {
                    if !placed.contains_key(&input) {
                        stack.push((input, false));
                    }
                }
            }
        }
    }

    /// Returns the step index of `effect`, if scheduled.
    #[must_use]
    pub fn position(&self, effect: EffectId) -> Option<usize> {
        self.steps.iter().position(|step| step.effect == effect)
    }

    /// Returns the terminal effect.
    #[must_use]
    pub fn terminal(&self) -> Option<EffectId> {
        self.steps.last().map(|step| step.effect)
    }

    /// Returns the number of scheduled effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns whether nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.steps.clear();
    }
}

#[cfg(test)]
mod tests {
    use percolate_core::attr::{AttrKey, Tag};
    use percolate_core::element::{ElementId, ElementTree};
    use percolate_core::style::InitialStyle;
    use percolate_core::trace::Tracer;

    use super::*;

    fn build(tree: &ElementTree, container: ElementId) -> FilterBuilder {
        let mut builder = FilterBuilder::new();
        builder.rebuild_from(tree, container, &InitialStyle, &mut Tracer::none());
        builder
    }

    #[test]
    fn steps_are_post_order_with_shared_inputs_once() {
        // blur(SourceGraphic) -> "b"; offset(b); blend(offset, b)
        let mut tree = ElementTree::new();
        let container = tree.create_element(Tag::Filter);
        let blur = tree.create_element(Tag::GaussianBlur);
        tree.set_attribute(blur, AttrKey::Result, "b");
        let offset = tree.create_element(Tag::Offset);
        let blend = tree.create_element(Tag::Blend);
        tree.set_attribute(blend, AttrKey::In2, "b");
        for element in [blur, offset, blend] {
            tree.append_child(container, element);
        }

        let builder = build(&tree, container);
        let plan = ExecutionPlan::for_builder(&builder).expect("has a terminal");
        let [graphic, eblur, eoffset, eblend] = [
            builder.source_graphic(),
            builder.effect_of(blur),
            builder.effect_of(offset),
            builder.effect_of(blend),
        ]
        .map(|e| e.expect("built"));

        let order: Vec<EffectId> = plan.steps.iter().map(|s| s.effect).collect();
        assert_eq!(order, vec![graphic, eblur, eoffset, eblend]);
        assert_eq!(plan.terminal(), Some(eblend));
        assert_eq!(plan.steps[3].inputs, vec![2, 1], "blend reads offset then blur");
        for (i, step) in plan.steps.iter().enumerate() {
            assert!(
                step.inputs.iter().all(|&input| input < i),
                "inputs precede their consumer"
            );
        }
    }

    #[test]
    fn unreachable_effects_are_not_scheduled() {
        let mut tree = ElementTree::new();
        let container = tree.create_element(Tag::Filter);
        let flood = tree.create_element(Tag::Flood);
        let tile = tree.create_element(Tag::Tile);
        tree.set_attribute(tile, AttrKey::In, "SourceAlpha");
        tree.append_child(container, flood);
        tree.append_child(container, tile);

        let builder = build(&tree, container);
        let plan = ExecutionPlan::for_builder(&builder).expect("has a terminal");
        let flood_effect = builder.effect_of(flood).expect("built");
        assert_eq!(plan.position(flood_effect), None, "flood is never read");
        assert_eq!(plan.len(), 3, "SourceGraphic, SourceAlpha, tile");
    }

    #[test]
    fn empty_builder_has_no_plan() {
        assert_eq!(ExecutionPlan::for_builder(&FilterBuilder::new()), None);
    }
}
