// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-kind validation, build, and in-place patch logic.
//!
//! Building a primitive happens in two phases:
//!
//! 1. **Resolve inputs** — `in` (and `in2` or merge-node references where the
//!    kind takes them) are looked up in the [`FilterBuilder`] registry. Any
//!    unresolved reference fails the build.
//! 2. **Validate and build** — per-kind rules run against the element's
//!    [`Attrs`] and produce fully resolved [`EffectParams`].
//!
//! Dispatch is one `match` over [`Tag`]; there is no per-kind trait.

mod basic;
mod color;
mod convolve;
mod lighting;

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Vec2;

use crate::attr::{AttrKey, Attrs, Tag};
use crate::builder::FilterBuilder;
use crate::effect::{EffectId, EffectParams, Subregion};
use crate::element::{ElementId, ElementTree};
use crate::error::{BuildError, InputSlot, RequiredChild};
use crate::style::StyleResolver;

/// Everything a build or patch reads.
#[derive(Clone, Copy)]
pub(crate) struct BuildContext<'a> {
    pub(crate) tree: &'a ElementTree,
    pub(crate) element: ElementId,
    pub(crate) attrs: Attrs<'a>,
    pub(crate) style: &'a dyn StyleResolver,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(
        tree: &'a ElementTree,
        element: ElementId,
        style: &'a dyn StyleResolver,
    ) -> Self {
        Self {
            tree,
            element,
            attrs: tree.attrs(element),
            style,
        }
    }
}

impl core::fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BuildContext")
            .field("element", &self.element)
            .field("attrs", &self.attrs)
            .finish_non_exhaustive()
    }
}

/// Which attribute a patch applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChangedAttr {
    /// An attribute of the primitive itself.
    Own(AttrKey),
    /// An attribute of the primitive's first light source.
    Light(AttrKey),
}

impl ChangedAttr {
    pub(crate) fn key(self) -> AttrKey {
        match self {
            Self::Own(key) | Self::Light(key) => key,
        }
    }
}

/// A successfully built primitive, ready to be inserted into the graph.
#[derive(Debug)]
pub(crate) struct Built {
    pub(crate) params: EffectParams,
    pub(crate) inputs: Vec<EffectId>,
    pub(crate) subregion: Subregion,
}

/// Resolves the inputs of `cx.element` and builds its effect.
///
/// # Panics
///
/// Panics if the element is not a filter primitive.
pub(crate) fn build(cx: &BuildContext<'_>, builder: &FilterBuilder) -> Result<Built, BuildError> {
    let inputs = resolve_inputs(cx, builder)?;
    let params = build_params(cx)?;
    Ok(Built {
        params,
        inputs,
        subregion: subregion(&cx.attrs),
    })
}

/// Updates `params` for one changed attribute.
///
/// On rejection `params` is left as it was; the caller falls back to a
/// rebuild.
pub(crate) fn patch_in_place(
    params: &mut EffectParams,
    cx: &BuildContext<'_>,
    change: ChangedAttr,
) -> Result<(), BuildError> {
    if lighting::patch(params, cx, change)? {
        return Ok(());
    }
    let ChangedAttr::Own(key) = change else {
        return Err(reject(change.key()));
    };
    match params {
        EffectParams::ColorMatrix { kind, values } => {
            return color::patch_color_matrix(kind, values, &cx.attrs, key);
        }
        EffectParams::ConvolveMatrix(matrix) => return convolve::patch(matrix, &cx.attrs, key),
        _ => {}
    }
    if basic::patch(params, cx, key)? {
        Ok(())
    } else {
        Err(reject(key))
    }
}

fn resolve_inputs(
    cx: &BuildContext<'_>,
    builder: &FilterBuilder,
) -> Result<Vec<EffectId>, BuildError> {
    let input = |key: AttrKey, slot: InputSlot| {
        builder
            .lookup(cx.attrs.string(key))
            .ok_or(BuildError::UnresolvedInput(slot))
    };
    match cx.attrs.tag() {
        Tag::Flood | Tag::Image | Tag::Turbulence => Ok(Vec::new()),
        Tag::Blend | Tag::Composite | Tag::DisplacementMap => Ok(vec![
            input(AttrKey::In, InputSlot::In)?,
            input(AttrKey::In2, InputSlot::In2)?,
        ]),
        Tag::Merge => merge_inputs(cx, builder),
        _ => Ok(vec![input(AttrKey::In, InputSlot::In)?]),
    }
}

fn merge_inputs(
    cx: &BuildContext<'_>,
    builder: &FilterBuilder,
) -> Result<Vec<EffectId>, BuildError> {
    let mut inputs = Vec::new();
    for (i, node) in cx
        .tree
        .children(cx.element)
        .filter(|&child| cx.tree.tag(child) == Tag::MergeNode)
        .enumerate()
    {
        let name = cx.tree.attrs(node).string(AttrKey::In);
        let slot = InputSlot::MergeNode(u32::try_from(i).unwrap_or(u32::MAX));
        inputs.push(
            builder
                .lookup(name)
                .ok_or(BuildError::UnresolvedInput(slot))?,
        );
    }
    if inputs.is_empty() {
        return Err(BuildError::MissingRequiredChild(RequiredChild::MergeNode));
    }
    Ok(inputs)
}

fn build_params(cx: &BuildContext<'_>) -> Result<EffectParams, BuildError> {
    match cx.attrs.tag() {
        Tag::Blend => Ok(basic::blend(cx)),
        Tag::ColorMatrix => color::color_matrix(&cx.attrs),
        Tag::ComponentTransfer => Ok(color::component_transfer(cx.tree, cx.element)),
        Tag::Composite => Ok(basic::composite(cx)),
        Tag::ConvolveMatrix => convolve::build(&cx.attrs),
        Tag::DiffuseLighting | Tag::SpecularLighting => lighting::build(cx),
        Tag::DisplacementMap => Ok(basic::displacement_map(cx)),
        Tag::DropShadow => basic::drop_shadow(cx),
        Tag::Flood => Ok(basic::flood(cx)),
        Tag::GaussianBlur => basic::gaussian_blur(cx),
        Tag::Image => Ok(basic::image(cx)),
        Tag::Merge => Ok(EffectParams::Merge),
        Tag::Morphology => basic::morphology(cx),
        Tag::Offset => Ok(basic::offset(cx)),
        Tag::Tile => Ok(EffectParams::Tile),
        Tag::Turbulence => basic::turbulence(cx),
        tag => panic!("{} does not build an effect", tag.name()),
    }
}

fn subregion(attrs: &Attrs<'_>) -> Subregion {
    let edge = |key| {
        attrs
            .is_specified(key)
            .then(|| f64::from(attrs.float(key)))
    };
    Subregion {
        x: edge(AttrKey::X),
        y: edge(AttrKey::Y),
        width: edge(AttrKey::Width),
        height: edge(AttrKey::Height),
    }
}

pub(crate) fn reject(key: AttrKey) -> BuildError {
    BuildError::InvalidParameter(key)
}

/// Reads `key`, failing if it is negative. Defaults are never substituted for
/// a negative explicit value.
pub(crate) fn non_negative(attrs: &Attrs<'_>, key: AttrKey) -> Result<f32, BuildError> {
    let value = attrs.float(key);
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(reject(key))
    }
}

pub(crate) fn pair(x: f32, y: f32) -> Vec2 {
    Vec2::new(f64::from(x), f64::from(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::InitialStyle;
    use crate::value::MorphologyOperator;

    fn cx<'a>(tree: &'a ElementTree, element: ElementId) -> BuildContext<'a> {
        BuildContext::new(tree, element, &InitialStyle)
    }

    #[test]
    fn negative_blur_deviation_fails() {
        let mut tree = ElementTree::new();
        let blur = tree.create_element(Tag::GaussianBlur);
        tree.set_attribute(blur, AttrKey::StdDeviationX, -1.0);
        assert_eq!(
            build_params(&cx(&tree, blur)),
            Err(BuildError::InvalidParameter(AttrKey::StdDeviationX))
        );
    }

    #[test]
    fn unset_blur_deviation_is_zero() {
        let mut tree = ElementTree::new();
        let blur = tree.create_element(Tag::GaussianBlur);
        let Ok(EffectParams::GaussianBlur { std_deviation, .. }) = build_params(&cx(&tree, blur))
        else {
            panic!("blur without deviation still builds");
        };
        assert_eq!(std_deviation, Vec2::ZERO);
    }

    #[test]
    fn subregion_keeps_only_specified_edges() {
        let mut tree = ElementTree::new();
        let flood = tree.create_element(Tag::Flood);
        tree.set_attribute(flood, AttrKey::Width, 40.0);
        assert_eq!(
            subregion(&tree.attrs(flood)),
            Subregion {
                width: Some(40.0),
                ..Subregion::UNSPECIFIED
            }
        );
    }

    #[test]
    fn patch_rejects_attributes_the_kind_does_not_own() {
        let mut tree = ElementTree::new();
        let morph = tree.create_element(Tag::Morphology);
        let mut params = build_params(&cx(&tree, morph)).expect("morphology builds");

        tree.set_attribute(morph, AttrKey::Operator, MorphologyOperator::Dilate);
        patch_in_place(&mut params, &cx(&tree, morph), ChangedAttr::Own(AttrKey::Operator))
            .expect("operator patches");
        assert!(
            matches!(
                params,
                EffectParams::Morphology {
                    operator: MorphologyOperator::Dilate,
                    ..
                }
            ),
            "operator was written through"
        );

        assert_eq!(
            patch_in_place(&mut params, &cx(&tree, morph), ChangedAttr::Own(AttrKey::Bias)),
            Err(BuildError::InvalidParameter(AttrKey::Bias))
        );
        assert_eq!(
            patch_in_place(
                &mut params,
                &cx(&tree, morph),
                ChangedAttr::Light(AttrKey::Azimuth)
            ),
            Err(BuildError::InvalidParameter(AttrKey::Azimuth))
        );
    }

    #[test]
    fn negative_radius_fails_the_build() {
        let mut tree = ElementTree::new();
        let morph = tree.create_element(Tag::Morphology);
        tree.set_attribute(morph, AttrKey::RadiusX, -0.5);
        assert_eq!(
            build_params(&cx(&tree, morph)),
            Err(BuildError::InvalidParameter(AttrKey::RadiusX))
        );
    }

    #[test]
    fn negative_base_frequency_fails_the_build() {
        let mut tree = ElementTree::new();
        let turbulence = tree.create_element(Tag::Turbulence);
        tree.set_attribute(turbulence, AttrKey::BaseFrequencyX, 0.05);
        tree.set_attribute(turbulence, AttrKey::BaseFrequencyY, -0.1);
        assert_eq!(
            build_params(&cx(&tree, turbulence)),
            Err(BuildError::InvalidParameter(AttrKey::BaseFrequencyY))
        );
    }

    #[test]
    fn negative_base_frequency_patch_is_rejected() {
        let mut tree = ElementTree::new();
        let turbulence = tree.create_element(Tag::Turbulence);
        tree.set_attribute(turbulence, AttrKey::BaseFrequencyX, 0.05);
        let mut params = build_params(&cx(&tree, turbulence)).expect("turbulence builds");
        let before = params.clone();

        tree.set_attribute(turbulence, AttrKey::BaseFrequencyX, -0.05);
        assert_eq!(
            patch_in_place(
                &mut params,
                &cx(&tree, turbulence),
                ChangedAttr::Own(AttrKey::BaseFrequencyX)
            ),
            Err(BuildError::InvalidParameter(AttrKey::BaseFrequencyX))
        );
        assert_eq!(params, before, "rejected patch leaves the effect untouched");
    }

    #[test]
    fn negative_radius_patch_is_rejected() {
        let mut tree = ElementTree::new();
        let morph = tree.create_element(Tag::Morphology);
        let mut params = build_params(&cx(&tree, morph)).expect("morphology builds");
        tree.set_attribute(morph, AttrKey::RadiusY, -3.0);
        assert_eq!(
            patch_in_place(&mut params, &cx(&tree, morph), ChangedAttr::Own(AttrKey::RadiusY)),
            Err(BuildError::InvalidParameter(AttrKey::RadiusY))
        );
    }
}
