// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filter-effect graph construction for SVG filters.
//!
//! `percolate_core` turns a tree of filter-primitive elements into a directed
//! acyclic graph of effects a raster backend can execute, and keeps that graph
//! current as attributes change. It is `no_std` compatible (with `alloc`) and
//! stores both elements and effects in struct-of-arrays arenas addressed by
//! generational handles.
//!
//! # Architecture
//!
//! ```text
//!   DOM layer
//!       │ set_attribute / append_child / …
//!       ▼
//!   ElementTree ──► router::on_attribute_changed ──► Route (per-tag table)
//!                              │
//!              ┌───────────────┴────────────────┐
//!              ▼                                ▼
//!   FilterBuilder::patch_in_place    FilterBuilder::rebuild_from
//!              │                                │ primitive::build, document order
//!              ▼                                ▼
//!   clear_results_recursive ──────────► EffectGraph ──► last_effect()
//!                                               │
//!                                               ▼
//!                              drain_invalidated_results() ──► backend
//! ```
//!
//! **[`element`]** — Minimal element tree: tags, ordered children, and one
//! [`ValueStore`](value::ValueStore) per element.
//!
//! **[`value`]** / **[`attr`]** — Typed attribute values with an explicit bit,
//! per-tag attribute tables with their change routes, and defaults.
//!
//! **[`effect`]** — The effect arena: resolved parameters, ordered inputs,
//! reverse edges, and result invalidation via `understory_dirty`.
//!
//! **[`builder`]** — [`FilterBuilder`](builder::FilterBuilder), the name
//! registry that wires primitives together in one left-to-right pass.
//!
//! **[`router`]** — Decides whether a change patches one effect or rebuilds
//! the filter.
//!
//! **[`style`]** — The [`StyleResolver`](style::StyleResolver) seam for
//! `lighting-color`, `flood-color`, and `flood-opacity`.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types, with
//! the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Example
//!
//! ```
//! use percolate_core::attr::{AttrKey, Tag};
//! use percolate_core::builder::FilterBuilder;
//! use percolate_core::element::ElementTree;
//! use percolate_core::router::{self, ChangeOutcome};
//! use percolate_core::style::InitialStyle;
//! use percolate_core::trace::Tracer;
//!
//! let mut tree = ElementTree::new();
//! let filter = tree.create_element(Tag::Filter);
//! let blur = tree.create_element(Tag::GaussianBlur);
//! tree.append_child(filter, blur);
//! tree.set_attribute(blur, AttrKey::StdDeviationX, 2.0);
//! tree.set_attribute(blur, AttrKey::StdDeviationY, 2.0);
//!
//! let mut builder = FilterBuilder::new();
//! let summary = builder.rebuild_from(&tree, filter, &InitialStyle, &mut Tracer::none());
//! assert_eq!(summary.built, 1);
//! assert_eq!(builder.last_effect(), builder.effect_of(blur));
//!
//! tree.set_attribute(blur, AttrKey::StdDeviationX, 4.0);
//! let outcome = router::on_attribute_changed(
//!     &tree,
//!     &mut builder,
//!     blur,
//!     AttrKey::StdDeviationX,
//!     &InitialStyle,
//!     &mut Tracer::none(),
//! );
//! assert_eq!(outcome, ChangeOutcome::Patched);
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod attr;
pub mod builder;
pub mod dirty;
pub mod effect;
pub mod element;
pub mod error;
mod primitive;
pub mod router;
pub mod style;
pub mod trace;
pub mod value;
