// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-filter registry that turns primitives into effects.
//!
//! A [`FilterBuilder`] owns one [`EffectGraph`] and the name table used to
//! wire it. Names resolve only against effects registered earlier in the same
//! left-to-right pass, so the graph is acyclic and a later `result="foo"`
//! never changes what an earlier `in="foo"` saw.
//!
//! # Failure policy
//!
//! A primitive that fails to resolve an input or to validate contributes no
//! effect. Its `result` name is *poisoned* for the rest of the pass, so
//! siblings that reference it by name fail too; the positional default keeps
//! pointing at the last effect that did build. Nothing aborts the filter.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::attr::AttrKey;
use crate::effect::{EffectGraph, EffectId, EffectParams, Subregion};
use crate::element::{ElementId, ElementTree};
use crate::error::BuildError;
use crate::primitive::{self, BuildContext, ChangedAttr};
use crate::style::StyleResolver;
use crate::trace::{PatchEvent, PrimitiveBuiltEvent, PrimitiveSkippedEvent, RebuildEvent, Tracer};

/// Name of the built-in unfiltered content input.
pub const SOURCE_GRAPHIC: &str = "SourceGraphic";
/// Name of the built-in alpha-only input.
pub const SOURCE_ALPHA: &str = "SourceAlpha";

/// Lifecycle state of one primitive element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrimitiveState {
    /// No effect; never built, or the last build failed.
    #[default]
    Unbuilt,
    /// Its effect matches the element's attributes.
    Built,
    /// A parameter was patched and the cached results have not been drained
    /// by the backend yet.
    PatchedInPlace,
    /// A rebuild is in progress and has not reached this element.
    Invalidated,
}

/// Counts reported by [`FilterBuilder::rebuild_from`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RebuildSummary {
    /// Primitives that produced an effect.
    pub built: u32,
    /// Primitives that were skipped.
    pub skipped: u32,
}

/// Registry mapping result names to effects for one filter instance.
#[derive(Debug, Default)]
pub struct FilterBuilder {
    graph: EffectGraph,
    container: Option<ElementId>,
    source_graphic: Option<EffectId>,
    source_alpha: Option<EffectId>,
    /// `None` marks a name whose producer failed in the current pass.
    named: BTreeMap<String, Option<EffectId>>,
    last: Option<EffectId>,
    /// Effects of the current pass, in document order.
    produced: Vec<(ElementId, EffectId)>,
    states: BTreeMap<ElementId, PrimitiveState>,
    /// Effects of forgotten elements, released on the next rebuild.
    orphans: Vec<EffectId>,
}

impl FilterBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the `SourceGraphic` and `SourceAlpha` effects and makes
    /// `SourceGraphic` the positional default.
    ///
    /// `SourceAlpha` reads `SourceGraphic`, so invalidating the source content
    /// reaches both. Calling this again is a no-op.
    pub fn register_builtins(&mut self) {
        if self.source_graphic.is_some() {
            return;
        }
        let graphic = self.graph.insert(
            EffectParams::SourceGraphic,
            Vec::new(),
            Subregion::UNSPECIFIED,
            None,
        );
        let alpha = self.graph.insert(
            EffectParams::SourceAlpha,
            alloc::vec![graphic],
            Subregion::UNSPECIFIED,
            None,
        );
        self.source_graphic = Some(graphic);
        self.source_alpha = Some(alpha);
        self.last = Some(graphic);
    }

    /// Returns the `SourceGraphic` effect, once registered.
    #[must_use]
    pub fn source_graphic(&self) -> Option<EffectId> {
        self.source_graphic
    }

    /// Returns the `SourceAlpha` effect, once registered.
    #[must_use]
    pub fn source_alpha(&self) -> Option<EffectId> {
        self.source_alpha
    }

    /// Resolves an `in` reference.
    ///
    /// The empty name is the positional default: the most recently registered
    /// effect. Built-in names always resolve to the built-ins.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<EffectId> {
        match name {
            "" => self.last,
            SOURCE_GRAPHIC => self.source_graphic,
            SOURCE_ALPHA => self.source_alpha,
            _ => self.named.get(name).copied().flatten(),
        }
    }

    /// Registers `effect` under `name` and makes it the positional default.
    ///
    /// A later registration of the same name overwrites the earlier one. An
    /// empty name only updates the positional default.
    ///
    /// # Panics
    ///
    /// Panics if `effect` is stale.
    pub fn register(&mut self, name: &str, effect: EffectId) {
        assert!(self.graph.is_alive(effect), "stale EffectId: {effect:?}");
        if !name.is_empty() {
            self.named.insert(String::from(name), Some(effect));
        }
        self.last = Some(effect);
    }

    /// Records that `consumer` reads the result of `producer`.
    pub fn add_reverse_edge(&mut self, producer: EffectId, consumer: EffectId) {
        self.graph.add_reverse_edge(producer, consumer);
    }

    /// Marks the cached result of `effect`, and transitively of every
    /// consumer, as stale.
    pub fn clear_results_recursive(&mut self, effect: EffectId) {
        self.graph.invalidate_results(effect);
    }

    /// Returns every effect whose cached result went stale since the last
    /// call, producers before consumers.
    ///
    /// Draining settles patched primitives back to [`PrimitiveState::Built`].
    pub fn drain_invalidated_results(&mut self) -> Vec<EffectId> {
        for state in self.states.values_mut() {
            if *state == PrimitiveState::PatchedInPlace {
                *state = PrimitiveState::Built;
            }
        }
        self.graph.drain_invalidated()
    }

    /// Discards every effect built from `container` and builds its primitive
    /// children again, in document order.
    ///
    /// Built-ins are registered first if needed. Old effects are released
    /// once the new ones exist; the new effects are marked stale so the
    /// backend computes them on its next drain.
    pub fn rebuild_from(
        &mut self,
        tree: &ElementTree,
        container: ElementId,
        style: &dyn StyleResolver,
        tracer: &mut Tracer<'_>,
    ) -> RebuildSummary {
        self.register_builtins();
        self.container = Some(container);

        for state in self.states.values_mut() {
            *state = PrimitiveState::Invalidated;
        }
        let old = core::mem::take(&mut self.produced);
        self.named.clear();
        self.last = self.source_graphic;

        let mut summary = RebuildSummary::default();
        let primitives: Vec<ElementId> = tree
            .children(container)
            .filter(|&child| tree.tag(child).is_primitive())
            .collect();
        for element in primitives {
            let cx = BuildContext::new(tree, element, style);
            let tag = cx.attrs.tag();
            let name = cx.attrs.string(AttrKey::Result);
            match primitive::build(&cx, self) {
                Ok(built) => {
                    let effect =
                        self.graph
                            .insert(built.params, built.inputs, built.subregion, Some(element));
                    self.register(name, effect);
                    self.produced.push((element, effect));
                    self.states.insert(element, PrimitiveState::Built);
                    summary.built += 1;
                    tracer.primitive_built(&PrimitiveBuiltEvent {
                        element,
                        tag,
                        effect,
                    });
                }
                Err(error) => {
                    if !name.is_empty() {
                        self.named.insert(String::from(name), None);
                    }
                    self.states.insert(element, PrimitiveState::Unbuilt);
                    summary.skipped += 1;
                    tracer.primitive_skipped(&PrimitiveSkippedEvent {
                        element,
                        tag,
                        error,
                    });
                }
            }
        }

        // Elements that left the container since the previous pass.
        self.states
            .retain(|_, state| *state != PrimitiveState::Invalidated);

        // Consumers follow their producers in document order, so releasing in
        // reverse frees whole chains in one sweep.
        let mut pending: Vec<EffectId> = old.into_iter().rev().map(|(_, effect)| effect).collect();
        pending.append(&mut self.orphans);
        self.release_all(pending);

        tracer.rebuild(&RebuildEvent {
            container,
            built: summary.built,
            skipped: summary.skipped,
            last: self.last,
        });
        summary
    }

    /// Updates the effect of `element` for one changed attribute and drops
    /// the cached results downstream of it.
    ///
    /// On rejection the effect is left untouched; the caller rebuilds.
    pub(crate) fn patch_in_place(
        &mut self,
        tree: &ElementTree,
        element: ElementId,
        effect: EffectId,
        change: ChangedAttr,
        style: &dyn StyleResolver,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), BuildError> {
        let cx = BuildContext::new(tree, element, style);
        let result = primitive::patch_in_place(self.graph.params_mut(effect), &cx, change);
        tracer.patch(&PatchEvent {
            element,
            key: change.key(),
            effect,
            error: result.err(),
        });
        if result.is_ok() {
            self.states.insert(element, PrimitiveState::PatchedInPlace);
            self.clear_results_recursive(effect);
        }
        result
    }

    /// Drops all state for a destroyed or detached element.
    ///
    /// Its effect stays in the graph (later siblings may still read it) and is
    /// released by the next [`rebuild_from`](Self::rebuild_from).
    pub fn forget_element(&mut self, element: ElementId) {
        self.states.remove(&element);
        if let Some(pos) = self.produced.iter().position(|(e, _)| *e == element) {
            let (_, effect) = self.produced.remove(pos);
            self.orphans.push(effect);
        }
    }

    // -- Query API --

    /// Returns the terminal effect: the most recently registered one.
    #[must_use]
    pub fn last_effect(&self) -> Option<EffectId> {
        self.last
    }

    /// Returns the effect `element` produced in the current pass.
    #[must_use]
    pub fn effect_of(&self, element: ElementId) -> Option<EffectId> {
        self.produced
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, effect)| *effect)
    }

    /// Returns the lifecycle state of `element`.
    #[must_use]
    pub fn state_of(&self, element: ElementId) -> PrimitiveState {
        self.states.get(&element).copied().unwrap_or_default()
    }

    /// Returns the container of the most recent rebuild.
    #[must_use]
    pub fn container(&self) -> Option<ElementId> {
        self.container
    }

    /// Returns the effect graph.
    #[must_use]
    pub fn graph(&self) -> &EffectGraph {
        &self.graph
    }

    /// Iterates `(element, effect)` pairs of the current pass in document
    /// order.
    pub fn produced(&self) -> impl Iterator<Item = (ElementId, EffectId)> + '_ {
        self.produced.iter().copied()
    }

    /// Releases `pending` effects until no more can be freed. Anything still
    /// consumed is retried on the next rebuild.
    fn release_all(&mut self, mut pending: Vec<EffectId>) {
        loop {
            let before = pending.len();
            pending.retain(|&effect| !self.graph.release(effect));
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }
        self.orphans = pending;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::attr::Tag;
    use crate::error::{InputSlot, RequiredChild};
    use crate::style::InitialStyle;

    fn filter() -> (ElementTree, ElementId) {
        let mut tree = ElementTree::new();
        let container = tree.create_element(Tag::Filter);
        (tree, container)
    }

    fn add(tree: &mut ElementTree, container: ElementId, tag: Tag) -> ElementId {
        let element = tree.create_element(tag);
        tree.append_child(container, element);
        element
    }

    fn rebuild(builder: &mut FilterBuilder, tree: &ElementTree, container: ElementId) -> RebuildSummary {
        builder.rebuild_from(tree, container, &InitialStyle, &mut Tracer::none())
    }

    #[test]
    fn builtins_resolve_by_name_and_seed_the_default() {
        let mut builder = FilterBuilder::new();
        assert_eq!(builder.lookup(""), None, "nothing registered yet");

        builder.register_builtins();
        let graphic = builder.source_graphic().expect("registered");
        let alpha = builder.source_alpha().expect("registered");
        assert_eq!(builder.lookup(SOURCE_GRAPHIC), Some(graphic));
        assert_eq!(builder.lookup(SOURCE_ALPHA), Some(alpha));
        assert_eq!(builder.lookup(""), Some(graphic));
        assert_eq!(builder.graph().inputs(alpha), &[graphic]);

        builder.register_builtins();
        assert_eq!(builder.graph().live_count(), 2, "second call is a no-op");
    }

    #[test]
    fn register_overwrites_and_advances_default() {
        let mut builder = FilterBuilder::new();
        builder.register_builtins();
        let alpha = builder.source_alpha().expect("registered");
        let graphic = builder.source_graphic().expect("registered");

        builder.register("foo", alpha);
        assert_eq!(builder.lookup("foo"), Some(alpha));
        assert_eq!(builder.last_effect(), Some(alpha));

        builder.register("foo", graphic);
        assert_eq!(builder.lookup("foo"), Some(graphic));

        builder.register("", alpha);
        assert_eq!(builder.last_effect(), Some(alpha), "empty name moves the default");
        assert_eq!(builder.lookup("foo"), Some(graphic), "empty name registers nothing");
    }

    #[test]
    fn default_inputs_chain_siblings() {
        let (mut tree, container) = filter();
        let a = add(&mut tree, container, Tag::Offset);
        let b = add(&mut tree, container, Tag::Tile);
        let c = add(&mut tree, container, Tag::GaussianBlur);

        let mut builder = FilterBuilder::new();
        let summary = rebuild(&mut builder, &tree, container);
        assert_eq!(summary, RebuildSummary { built: 3, skipped: 0 });

        let [ea, eb, ec] = [a, b, c].map(|e| builder.effect_of(e).expect("built"));
        let graph = builder.graph();
        assert_eq!(graph.inputs(ea), &[builder.source_graphic().expect("registered")]);
        assert_eq!(graph.inputs(eb), &[ea]);
        assert_eq!(graph.inputs(ec), &[eb]);
        assert_eq!(builder.last_effect(), Some(ec));
        assert_eq!(graph.producer(ec), Some(c));
    }

    #[test]
    fn names_resolve_only_against_earlier_siblings() {
        let (mut tree, container) = filter();
        let first = add(&mut tree, container, Tag::Flood);
        tree.set_attribute(first, AttrKey::Result, "foo");
        let reader = add(&mut tree, container, Tag::Offset);
        tree.set_attribute(reader, AttrKey::In, "foo");
        let second = add(&mut tree, container, Tag::Turbulence);
        tree.set_attribute(second, AttrKey::Result, "foo");

        let mut builder = FilterBuilder::new();
        rebuild(&mut builder, &tree, container);
        let reader_effect = builder.effect_of(reader).expect("built");
        assert_eq!(
            builder.graph().inputs(reader_effect),
            &[builder.effect_of(first).expect("built")]
        );
        assert_eq!(
            builder.lookup("foo"),
            builder.effect_of(second),
            "after the pass the later name wins"
        );
    }

    #[test]
    fn failure_propagates_forward_through_names() {
        let (mut tree, container) = filter();
        let ok = add(&mut tree, container, Tag::Flood);
        let broken = add(&mut tree, container, Tag::Offset);
        tree.set_attribute(broken, AttrKey::In, "missing");
        tree.set_attribute(broken, AttrKey::Result, "b");
        let named_reader = add(&mut tree, container, Tag::Tile);
        tree.set_attribute(named_reader, AttrKey::In, "b");
        let default_reader = add(&mut tree, container, Tag::Tile);

        let mut builder = FilterBuilder::new();
        let summary = rebuild(&mut builder, &tree, container);
        assert_eq!(summary, RebuildSummary { built: 2, skipped: 2 });
        assert_eq!(builder.effect_of(broken), None);
        assert_eq!(builder.effect_of(named_reader), None);
        assert_eq!(builder.state_of(named_reader), PrimitiveState::Unbuilt);

        let ok_effect = builder.effect_of(ok).expect("earlier sibling unaffected");
        let default_effect = builder.effect_of(default_reader).expect("built");
        assert_eq!(
            builder.graph().inputs(default_effect),
            &[ok_effect],
            "positional default skips failed primitives"
        );
    }

    #[test]
    fn unresolved_second_input_fails_the_primitive() {
        let (mut tree, container) = filter();
        let flood = add(&mut tree, container, Tag::Flood);
        let composite = add(&mut tree, container, Tag::Composite);
        tree.set_attribute(composite, AttrKey::In2, "missing");
        let after = add(&mut tree, container, Tag::Offset);

        let mut builder = FilterBuilder::new();
        let summary = rebuild(&mut builder, &tree, container);
        assert_eq!(summary, RebuildSummary { built: 2, skipped: 1 });
        assert_eq!(builder.effect_of(composite), None, "in resolved but in2 did not");
        assert_eq!(builder.state_of(composite), PrimitiveState::Unbuilt);

        let cx = BuildContext::new(&tree, composite, &InitialStyle);
        assert_eq!(
            primitive::build(&cx, &builder).map(|_| ()),
            Err(BuildError::UnresolvedInput(InputSlot::In2))
        );

        let after_effect = builder.effect_of(after).expect("built");
        assert_eq!(
            builder.graph().inputs(after_effect),
            &[builder.effect_of(flood).expect("built")],
            "default input skips the failed composite"
        );
    }

    #[test]
    fn merge_requires_resolvable_nodes() {
        let (mut tree, container) = filter();
        let merge = add(&mut tree, container, Tag::Merge);

        let mut builder = FilterBuilder::new();
        rebuild(&mut builder, &tree, container);
        assert_eq!(builder.effect_of(merge), None, "no merge nodes");

        let first = tree.create_element(Tag::MergeNode);
        let second = tree.create_element(Tag::MergeNode);
        tree.append_child(merge, first);
        tree.append_child(merge, second);
        tree.set_attribute(second, AttrKey::In, SOURCE_ALPHA);
        rebuild(&mut builder, &tree, container);
        let effect = builder.effect_of(merge).expect("builds with nodes");
        assert_eq!(
            builder.graph().inputs(effect),
            &[
                builder.source_graphic().expect("registered"),
                builder.source_alpha().expect("registered"),
            ]
        );

        tree.set_attribute(second, AttrKey::In, "nowhere");
        rebuild(&mut builder, &tree, container);
        assert_eq!(builder.effect_of(merge), None);
    }

    #[test]
    fn merge_errors_name_the_failing_node() {
        let (mut tree, container) = filter();
        let merge = add(&mut tree, container, Tag::Merge);
        let mut builder = FilterBuilder::new();
        builder.register_builtins();

        let cx = BuildContext::new(&tree, merge, &InitialStyle);
        assert_eq!(
            primitive::build(&cx, &builder).map(|_| ()),
            Err(BuildError::MissingRequiredChild(RequiredChild::MergeNode))
        );

        let node = tree.create_element(Tag::MergeNode);
        tree.append_child(merge, node);
        tree.set_attribute(node, AttrKey::In, "nowhere");
        let cx = BuildContext::new(&tree, merge, &InitialStyle);
        assert_eq!(
            primitive::build(&cx, &builder).map(|_| ()),
            Err(BuildError::UnresolvedInput(InputSlot::MergeNode(0)))
        );
    }

    #[test]
    fn rebuild_twice_is_isomorphic() {
        let (mut tree, container) = filter();
        let blur = add(&mut tree, container, Tag::GaussianBlur);
        tree.set_attribute(blur, AttrKey::StdDeviationX, 3.0);
        tree.set_attribute(blur, AttrKey::Result, "blur");
        let offset = add(&mut tree, container, Tag::Offset);
        tree.set_attribute(offset, AttrKey::Dx, 4.0);
        let blend = add(&mut tree, container, Tag::Blend);
        tree.set_attribute(blend, AttrKey::In2, "blur");

        let mut builder = FilterBuilder::new();
        let shape = |builder: &FilterBuilder| {
            builder
                .produced()
                .map(|(element, effect)| {
                    let graph = builder.graph();
                    let inputs: Vec<Option<ElementId>> =
                        graph.inputs(effect).iter().map(|&i| graph.producer(i)).collect();
                    (element, graph.params(effect).clone(), inputs)
                })
                .collect::<Vec<_>>()
        };

        rebuild(&mut builder, &tree, container);
        let first = shape(&builder);
        let live = builder.graph().live_count();
        rebuild(&mut builder, &tree, container);
        assert_eq!(shape(&builder), first);
        assert_eq!(builder.graph().live_count(), live, "old effects were released");
    }

    #[test]
    fn rebuild_drops_elements_that_left_the_container() {
        let (mut tree, container) = filter();
        let a = add(&mut tree, container, Tag::Flood);
        let b = add(&mut tree, container, Tag::Offset);

        let mut builder = FilterBuilder::new();
        rebuild(&mut builder, &tree, container);
        assert_eq!(builder.state_of(b), PrimitiveState::Built);

        tree.remove_from_parent(b);
        rebuild(&mut builder, &tree, container);
        assert_eq!(builder.state_of(b), PrimitiveState::Unbuilt);
        assert_eq!(builder.effect_of(b), None);
        assert_eq!(builder.last_effect(), builder.effect_of(a));
        assert_eq!(builder.graph().live_count(), 3, "two built-ins and the flood");
    }

    #[test]
    fn forgotten_effects_are_released_on_rebuild() {
        let (mut tree, container) = filter();
        let a = add(&mut tree, container, Tag::Flood);
        let b = add(&mut tree, container, Tag::Offset);

        let mut builder = FilterBuilder::new();
        rebuild(&mut builder, &tree, container);
        let old_a = builder.effect_of(a).expect("built");

        tree.remove_from_parent(a);
        tree.destroy_element(a);
        builder.forget_element(a);
        assert_eq!(builder.effect_of(a), None);
        assert!(builder.graph().is_alive(old_a), "b still reads it");

        rebuild(&mut builder, &tree, container);
        assert!(!builder.graph().is_alive(old_a));
        let b_effect = builder.effect_of(b).expect("built");
        assert_eq!(
            builder.graph().inputs(b_effect),
            &[builder.source_graphic().expect("registered")]
        );
    }

    #[test]
    fn new_effects_drain_as_stale() {
        let (mut tree, container) = filter();
        let flood = add(&mut tree, container, Tag::Flood);
        let offset = add(&mut tree, container, Tag::Offset);

        let mut builder = FilterBuilder::new();
        rebuild(&mut builder, &tree, container);
        let stale = builder.drain_invalidated_results();
        for element in [flood, offset] {
            let effect = builder.effect_of(element).expect("built");
            assert!(stale.contains(&effect), "{effect:?} has no cached result yet");
        }
        assert!(builder.drain_invalidated_results().is_empty());
        assert_eq!(vec![flood, offset], builder.produced().map(|(e, _)| e).collect::<Vec<_>>());
    }
}
