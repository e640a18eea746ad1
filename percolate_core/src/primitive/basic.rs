// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitives whose parameters are independent scalars.

use alloc::string::String;

use crate::attr::{AttrKey as K, DEFAULT_PRESERVE_ASPECT_RATIO};
use crate::effect::EffectParams;
use crate::error::BuildError;

use super::{BuildContext, non_negative, pair, reject};

pub(super) fn blend(cx: &BuildContext<'_>) -> EffectParams {
    EffectParams::Blend {
        mode: cx.attrs.enumeration(K::Mode),
    }
}

pub(super) fn composite(cx: &BuildContext<'_>) -> EffectParams {
    let a = &cx.attrs;
    EffectParams::Composite {
        operator: a.enumeration(K::Operator),
        k: [a.float(K::K1), a.float(K::K2), a.float(K::K3), a.float(K::K4)],
    }
}

pub(super) fn displacement_map(cx: &BuildContext<'_>) -> EffectParams {
    let a = &cx.attrs;
    EffectParams::DisplacementMap {
        scale: a.float(K::Scale),
        x_channel: a.enumeration(K::XChannelSelector),
        y_channel: a.enumeration(K::YChannelSelector),
    }
}

pub(super) fn drop_shadow(cx: &BuildContext<'_>) -> Result<EffectParams, BuildError> {
    Ok(EffectParams::DropShadow {
        std_deviation: pair(
            non_negative(&cx.attrs, K::StdDeviationX)?,
            non_negative(&cx.attrs, K::StdDeviationY)?,
        ),
        offset: pair(cx.attrs.float(K::Dx), cx.attrs.float(K::Dy)),
        color: cx.style.flood_color(cx.element),
        opacity: flood_opacity(cx),
    })
}

pub(super) fn flood(cx: &BuildContext<'_>) -> EffectParams {
    EffectParams::Flood {
        color: cx.style.flood_color(cx.element),
        opacity: flood_opacity(cx),
    }
}

pub(super) fn gaussian_blur(cx: &BuildContext<'_>) -> Result<EffectParams, BuildError> {
    Ok(EffectParams::GaussianBlur {
        std_deviation: pair(
            non_negative(&cx.attrs, K::StdDeviationX)?,
            non_negative(&cx.attrs, K::StdDeviationY)?,
        ),
        edge_mode: cx.attrs.enumeration(K::EdgeMode),
    })
}

pub(super) fn image(cx: &BuildContext<'_>) -> EffectParams {
    EffectParams::Image {
        href: String::from(cx.attrs.string(K::Href)),
        preserve_aspect_ratio: preserve_aspect_ratio(cx),
    }
}

pub(super) fn morphology(cx: &BuildContext<'_>) -> Result<EffectParams, BuildError> {
    Ok(EffectParams::Morphology {
        operator: cx.attrs.enumeration(K::Operator),
        radius: pair(
            non_negative(&cx.attrs, K::RadiusX)?,
            non_negative(&cx.attrs, K::RadiusY)?,
        ),
    })
}

pub(super) fn offset(cx: &BuildContext<'_>) -> EffectParams {
    EffectParams::Offset {
        delta: pair(cx.attrs.float(K::Dx), cx.attrs.float(K::Dy)),
    }
}

pub(super) fn turbulence(cx: &BuildContext<'_>) -> Result<EffectParams, BuildError> {
    let a = &cx.attrs;
    Ok(EffectParams::Turbulence {
        base_frequency: pair(
            non_negative(a, K::BaseFrequencyX)?,
            non_negative(a, K::BaseFrequencyY)?,
        ),
        num_octaves: a.int(K::NumOctaves),
        seed: a.float(K::Seed),
        stitch_tiles: a.bool(K::StitchTiles),
        kind: a.enumeration(K::Type),
    })
}

/// Updates one scalar of a basic effect in place.
///
/// Returns `Ok(false)` if `params` is not one of the kinds handled here.
pub(super) fn patch(
    params: &mut EffectParams,
    cx: &BuildContext<'_>,
    key: K,
) -> Result<bool, BuildError> {
    let a = &cx.attrs;
    match params {
        EffectParams::Blend { mode } => match key {
            K::Mode => *mode = a.enumeration(K::Mode),
            _ => return Err(reject(key)),
        },
        EffectParams::Composite { operator, k } => match key {
            K::Operator => *operator = a.enumeration(K::Operator),
            K::K1 => k[0] = a.float(K::K1),
            K::K2 => k[1] = a.float(K::K2),
            K::K3 => k[2] = a.float(K::K3),
            K::K4 => k[3] = a.float(K::K4),
            _ => return Err(reject(key)),
        },
        EffectParams::DisplacementMap {
            scale,
            x_channel,
            y_channel,
        } => match key {
            K::Scale => *scale = a.float(K::Scale),
            K::XChannelSelector => *x_channel = a.enumeration(K::XChannelSelector),
            K::YChannelSelector => *y_channel = a.enumeration(K::YChannelSelector),
            _ => return Err(reject(key)),
        },
        EffectParams::DropShadow {
            std_deviation,
            offset,
            color,
            opacity,
        } => match key {
            K::StdDeviationX => std_deviation.x = f64::from(non_negative(a, key)?),
            K::StdDeviationY => std_deviation.y = f64::from(non_negative(a, key)?),
            K::Dx => offset.x = f64::from(a.float(K::Dx)),
            K::Dy => offset.y = f64::from(a.float(K::Dy)),
            K::FloodColor => *color = cx.style.flood_color(cx.element),
            K::FloodOpacity => *opacity = flood_opacity(cx),
            _ => return Err(reject(key)),
        },
        EffectParams::Flood { color, opacity } => match key {
            K::FloodColor => *color = cx.style.flood_color(cx.element),
            K::FloodOpacity => *opacity = flood_opacity(cx),
            _ => return Err(reject(key)),
        },
        EffectParams::GaussianBlur {
            std_deviation,
            edge_mode,
        } => match key {
            K::StdDeviationX => std_deviation.x = f64::from(non_negative(a, key)?),
            K::StdDeviationY => std_deviation.y = f64::from(non_negative(a, key)?),
            K::EdgeMode => *edge_mode = a.enumeration(K::EdgeMode),
            _ => return Err(reject(key)),
        },
        EffectParams::Image {
            preserve_aspect_ratio,
            ..
        } => match key {
            K::PreserveAspectRatio => *preserve_aspect_ratio = self::preserve_aspect_ratio(cx),
            _ => return Err(reject(key)),
        },
        EffectParams::Morphology { operator, radius } => match key {
            K::Operator => *operator = a.enumeration(K::Operator),
            K::RadiusX => radius.x = f64::from(non_negative(a, key)?),
            K::RadiusY => radius.y = f64::from(non_negative(a, key)?),
            _ => return Err(reject(key)),
        },
        EffectParams::Offset { delta } => match key {
            K::Dx => delta.x = f64::from(a.float(K::Dx)),
            K::Dy => delta.y = f64::from(a.float(K::Dy)),
            _ => return Err(reject(key)),
        },
        EffectParams::Turbulence {
            base_frequency,
            num_octaves,
            seed,
            stitch_tiles,
            kind,
        } => match key {
            K::BaseFrequencyX => base_frequency.x = f64::from(non_negative(a, key)?),
            K::BaseFrequencyY => base_frequency.y = f64::from(non_negative(a, key)?),
            K::NumOctaves => *num_octaves = a.int(K::NumOctaves),
            K::Seed => *seed = a.float(K::Seed),
            K::StitchTiles => *stitch_tiles = a.bool(K::StitchTiles),
            K::Type => *kind = a.enumeration(K::Type),
            _ => return Err(reject(key)),
        },
        _ => return Ok(false),
    }
    Ok(true)
}

fn flood_opacity(cx: &BuildContext<'_>) -> f32 {
    cx.style.flood_opacity(cx.element).clamp(0.0, 1.0)
}

fn preserve_aspect_ratio(cx: &BuildContext<'_>) -> String {
    String::from(
        cx.attrs
            .store()
            .string(K::PreserveAspectRatio)
            .unwrap_or(DEFAULT_PRESERVE_ASPECT_RATIO),
    )
}
