// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diffuse and specular lighting.
//!
//! Only the first light-source child is used. Its attributes are read in full
//! whenever any of them changes, so a light patch never needs to know which
//! light kind it is updating.

use kurbo::Vec2;

use crate::attr::{AttrKey as K, Attrs, Tag};
use crate::effect::{EffectParams, LightSource, Lighting};
use crate::error::{BuildError, RequiredChild};

use super::{BuildContext, ChangedAttr, non_negative, pair, reject};

const MIN_SPECULAR_EXPONENT: f32 = 1.0;
const MAX_SPECULAR_EXPONENT: f32 = 128.0;

pub(super) fn build(cx: &BuildContext<'_>) -> Result<EffectParams, BuildError> {
    let lighting = lighting(cx)?;
    let a = &cx.attrs;
    Ok(match a.tag() {
        Tag::DiffuseLighting => EffectParams::DiffuseLighting {
            lighting,
            diffuse_constant: non_negative(a, K::DiffuseConstant)?,
        },
        _ => EffectParams::SpecularLighting {
            lighting,
            specular_constant: non_negative(a, K::SpecularConstant)?,
            specular_exponent: specular_exponent(a),
        },
    })
}

/// Applies a change of the lighting primitive itself or of its first light.
///
/// Returns `Ok(false)` if `params` is not a lighting effect.
pub(super) fn patch(
    params: &mut EffectParams,
    cx: &BuildContext<'_>,
    change: ChangedAttr,
) -> Result<bool, BuildError> {
    let a = &cx.attrs;
    match (params, change) {
        (
            EffectParams::DiffuseLighting {
                diffuse_constant, ..
            },
            ChangedAttr::Own(K::DiffuseConstant),
        ) => *diffuse_constant = non_negative(a, K::DiffuseConstant)?,
        (
            EffectParams::SpecularLighting {
                specular_constant, ..
            },
            ChangedAttr::Own(K::SpecularConstant),
        ) => *specular_constant = non_negative(a, K::SpecularConstant)?,
        (
            EffectParams::SpecularLighting {
                specular_exponent, ..
            },
            ChangedAttr::Own(K::SpecularExponent),
        ) => *specular_exponent = self::specular_exponent(a),
        (
            EffectParams::DiffuseLighting { lighting, .. }
            | EffectParams::SpecularLighting { lighting, .. },
            change,
        ) => patch_shared(lighting, cx, change)?,
        _ => return Ok(false),
    }
    Ok(true)
}

fn patch_shared(
    lighting: &mut Lighting,
    cx: &BuildContext<'_>,
    change: ChangedAttr,
) -> Result<(), BuildError> {
    match change {
        ChangedAttr::Light(_) => lighting.light = light_source(cx)?,
        ChangedAttr::Own(K::SurfaceScale) => {
            lighting.surface_scale = cx.attrs.float(K::SurfaceScale);
        }
        ChangedAttr::Own(K::KernelUnitLengthX | K::KernelUnitLengthY) => {
            lighting.kernel_unit_length = kernel_unit_length(&cx.attrs)?;
        }
        ChangedAttr::Own(K::LightingColor) => {
            lighting.color = cx.style.lighting_color(cx.element);
        }
        ChangedAttr::Own(key) => return Err(reject(key)),
    }
    Ok(())
}

fn lighting(cx: &BuildContext<'_>) -> Result<Lighting, BuildError> {
    Ok(Lighting {
        light: light_source(cx)?,
        color: cx.style.lighting_color(cx.element),
        surface_scale: cx.attrs.float(K::SurfaceScale),
        kernel_unit_length: kernel_unit_length(&cx.attrs)?,
    })
}

fn light_source(cx: &BuildContext<'_>) -> Result<LightSource, BuildError> {
    let light = cx
        .tree
        .first_child_where(cx.element, Tag::is_light_source)
        .ok_or(BuildError::MissingRequiredChild(RequiredChild::LightSource))?;
    let a = cx.tree.attrs(light);
    let position = [a.float(K::X), a.float(K::Y), a.float(K::Z)];
    Ok(match a.tag() {
        Tag::DistantLight => LightSource::Distant {
            azimuth: a.float(K::Azimuth),
            elevation: a.float(K::Elevation),
        },
        Tag::PointLight => LightSource::Point { position },
        _ => LightSource::Spot {
            position,
            points_at: [
                a.float(K::PointsAtX),
                a.float(K::PointsAtY),
                a.float(K::PointsAtZ),
            ],
            specular_exponent: a.float(K::SpecularExponent),
            limiting_cone_angle: a
                .is_specified(K::LimitingConeAngle)
                .then(|| a.float(K::LimitingConeAngle)),
        },
    })
}

/// Unset means "one device pixel"; an explicit length must be positive.
fn kernel_unit_length(attrs: &Attrs<'_>) -> Result<Option<Vec2>, BuildError> {
    if !attrs.is_specified(K::KernelUnitLengthX) && !attrs.is_specified(K::KernelUnitLengthY) {
        return Ok(None);
    }
    let x = attrs.float(K::KernelUnitLengthX);
    let y = attrs.float(K::KernelUnitLengthY);
    if x <= 0.0 {
        return Err(reject(K::KernelUnitLengthX));
    }
    if y <= 0.0 {
        return Err(reject(K::KernelUnitLengthY));
    }
    Ok(Some(pair(x, y)))
}

fn specular_exponent(attrs: &Attrs<'_>) -> f32 {
    attrs
        .float(K::SpecularExponent)
        .clamp(MIN_SPECULAR_EXPONENT, MAX_SPECULAR_EXPONENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementId, ElementTree};
    use crate::style::{Color, InitialStyle, StyleResolver};

    struct Red;

    impl StyleResolver for Red {
        fn lighting_color(&self, _: ElementId) -> Color {
            Color::new(1.0, 0.0, 0.0, 1.0)
        }
    }

    fn build_in(tree: &ElementTree, element: ElementId) -> Result<EffectParams, BuildError> {
        build(&BuildContext::new(tree, element, &InitialStyle))
    }

    #[test]
    fn missing_light_fails() {
        let mut tree = ElementTree::new();
        let diffuse = tree.create_element(Tag::DiffuseLighting);
        assert_eq!(
            build_in(&tree, diffuse),
            Err(BuildError::MissingRequiredChild(RequiredChild::LightSource))
        );
    }

    #[test]
    fn first_light_wins_and_color_comes_from_style() {
        let mut tree = ElementTree::new();
        let diffuse = tree.create_element(Tag::DiffuseLighting);
        let point = tree.create_element(Tag::PointLight);
        let distant = tree.create_element(Tag::DistantLight);
        tree.append_child(diffuse, point);
        tree.append_child(diffuse, distant);
        tree.set_attribute(point, K::Z, 10.0);

        let params = build(&BuildContext::new(&tree, diffuse, &Red)).expect("builds");
        let EffectParams::DiffuseLighting { lighting, .. } = params else {
            panic!("expected diffuse lighting");
        };
        assert_eq!(
            lighting.light,
            LightSource::Point {
                position: [0.0, 0.0, 10.0]
            }
        );
        assert_eq!(lighting.color, Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(lighting.kernel_unit_length, None);
    }

    #[test]
    fn specular_exponent_is_clamped() {
        let mut tree = ElementTree::new();
        let specular = tree.create_element(Tag::SpecularLighting);
        let light = tree.create_element(Tag::SpotLight);
        tree.append_child(specular, light);
        tree.set_attribute(specular, K::SpecularExponent, 500.0);

        let params = build_in(&tree, specular).expect("builds");
        let EffectParams::SpecularLighting {
            specular_exponent, ..
        } = params
        else {
            panic!("expected specular lighting");
        };
        assert_eq!(specular_exponent, 128.0);
    }

    #[test]
    fn invalid_constants_fail() {
        let mut tree = ElementTree::new();
        let diffuse = tree.create_element(Tag::DiffuseLighting);
        let light = tree.create_element(Tag::DistantLight);
        tree.append_child(diffuse, light);

        tree.set_attribute(diffuse, K::DiffuseConstant, -1.0);
        assert_eq!(
            build_in(&tree, diffuse),
            Err(BuildError::InvalidParameter(K::DiffuseConstant))
        );

        tree.set_attribute(diffuse, K::DiffuseConstant, 1.0);
        tree.set_attribute(diffuse, K::KernelUnitLengthX, 0.0);
        assert_eq!(
            build_in(&tree, diffuse),
            Err(BuildError::InvalidParameter(K::KernelUnitLengthX))
        );
    }

    #[test]
    fn light_patch_rereads_the_first_light() {
        let mut tree = ElementTree::new();
        let diffuse = tree.create_element(Tag::DiffuseLighting);
        let light = tree.create_element(Tag::DistantLight);
        tree.append_child(diffuse, light);
        let mut params = build_in(&tree, diffuse).expect("builds");

        tree.set_attribute(light, K::Azimuth, 45.0);
        let cx = BuildContext::new(&tree, diffuse, &InitialStyle);
        assert_eq!(
            patch(&mut params, &cx, ChangedAttr::Light(K::Azimuth)),
            Ok(true)
        );
        let EffectParams::DiffuseLighting { lighting, .. } = params else {
            panic!("expected diffuse lighting");
        };
        assert_eq!(
            lighting.light,
            LightSource::Distant {
                azimuth: 45.0,
                elevation: 0.0
            }
        );
    }
}
