// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turns DOM change notifications into patches or rebuilds.
//!
//! The decision for an attribute change comes from the per-tag tables in
//! [`attr`](crate::attr):
//!
//! ```text
//!   on_attribute_changed(element, key)
//!       │
//!       ├─ Ignore ──────────────────────────────► Ignored
//!       ├─ Rebuild ─► rebuild_from(container) ──► Rebuilt
//!       └─ Patch ───► patch_in_place(effect)
//!                         ├─ accepted ─► clear_results_recursive ─► Patched
//!                         └─ rejected / no effect ─► rebuild ─────► Rebuilt
//! ```
//!
//! Light sources are not registered in the graph. A light attribute patches
//! the parent lighting primitive, and only if the light is that primitive's
//! first light child; other lights are never read.

use crate::attr::{self, AttrKey, Route, Tag};
use crate::builder::FilterBuilder;
use crate::element::{ElementId, ElementTree};
use crate::primitive::ChangedAttr;
use crate::style::StyleResolver;
use crate::trace::{RouteEvent, Tracer};

/// What a change notification did to the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeOutcome {
    /// One effect was updated in place; its results and its consumers'
    /// results were invalidated.
    Patched,
    /// The whole filter was rebuilt.
    Rebuilt,
    /// The change does not affect any effect of this builder.
    Ignored,
}

/// Handles a change of `key` on `element`.
///
/// The tree must already hold the new value.
pub fn on_attribute_changed(
    tree: &ElementTree,
    builder: &mut FilterBuilder,
    element: ElementId,
    key: AttrKey,
    style: &dyn StyleResolver,
    tracer: &mut Tracer<'_>,
) -> ChangeOutcome {
    let tag = tree.tag(element);
    let route = attr::route(tag, key);
    let outcome = match route {
        Route::Ignore => ChangeOutcome::Ignored,
        Route::Rebuild => rebuild_container_of(tree, builder, element, style, tracer),
        Route::Patch => {
            let target = if tag.is_light_source() {
                first_light_owner(tree, element).map(|owner| (owner, ChangedAttr::Light(key)))
            } else {
                Some((element, ChangedAttr::Own(key)))
            };
            match target {
                Some((primitive, change)) => {
                    patch_or_rebuild(tree, builder, primitive, change, style, tracer)
                }
                None => ChangeOutcome::Ignored,
            }
        }
    };
    tracer.route(&RouteEvent {
        element,
        key,
        route,
        outcome,
    });
    outcome
}

/// Handles insertion, removal, or reordering of the children of `element`.
///
/// Any structural change rebuilds the filter: child lists decide input
/// order, merge nodes, transfer functions, and which light is first.
pub fn on_children_changed(
    tree: &ElementTree,
    builder: &mut FilterBuilder,
    element: ElementId,
    style: &dyn StyleResolver,
    tracer: &mut Tracer<'_>,
) -> ChangeOutcome {
    rebuild_container_of(tree, builder, element, style, tracer)
}

/// Handles `element` having been detached from `former_parent`.
///
/// The builder forgets the element before the container is rebuilt, so the
/// element may be destroyed right after this returns.
pub fn on_element_removed(
    tree: &ElementTree,
    builder: &mut FilterBuilder,
    element: ElementId,
    former_parent: ElementId,
    style: &dyn StyleResolver,
    tracer: &mut Tracer<'_>,
) -> ChangeOutcome {
    builder.forget_element(element);
    rebuild_container_of(tree, builder, former_parent, style, tracer)
}

fn patch_or_rebuild(
    tree: &ElementTree,
    builder: &mut FilterBuilder,
    primitive: ElementId,
    change: ChangedAttr,
    style: &dyn StyleResolver,
    tracer: &mut Tracer<'_>,
) -> ChangeOutcome {
    if let Some(effect) = builder.effect_of(primitive) {
        if builder
            .patch_in_place(tree, primitive, effect, change, style, tracer)
            .is_ok()
        {
            return ChangeOutcome::Patched;
        }
    }
    rebuild_container_of(tree, builder, primitive, style, tracer)
}

/// Rebuilds the filter containing `element`, if it is this builder's.
fn rebuild_container_of(
    tree: &ElementTree,
    builder: &mut FilterBuilder,
    element: ElementId,
    style: &dyn StyleResolver,
    tracer: &mut Tracer<'_>,
) -> ChangeOutcome {
    let Some(container) = tree.container_of(element) else {
        return ChangeOutcome::Ignored;
    };
    if builder.container().is_some_and(|own| own != container) {
        return ChangeOutcome::Ignored;
    }
    builder.rebuild_from(tree, container, style, tracer);
    ChangeOutcome::Rebuilt
}

/// Returns the lighting primitive whose first light child is `light`.
fn first_light_owner(tree: &ElementTree, light: ElementId) -> Option<ElementId> {
    let parent = tree.parent(light)?;
    if !matches!(
        tree.tag(parent),
        Tag::DiffuseLighting | Tag::SpecularLighting
    ) {
        return None;
    }
    (tree.first_child_where(parent, Tag::is_light_source) == Some(light)).then_some(parent)
}
