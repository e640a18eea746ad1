// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Convolution matrix validation and derived defaults.
//!
//! The target cell and divisor have no static default: an unset target is the
//! kernel center (`order / 2`, rounded down) and an unset divisor is the sum of
//! the kernel, or 1 when that sum is zero. Only explicit values are range
//! checked.

use crate::attr::{AttrKey as K, Attrs};
use crate::effect::{ConvolveMatrix, EffectParams};
use crate::error::BuildError;

use super::{pair, reject};

pub(super) fn build(attrs: &Attrs<'_>) -> Result<EffectParams, BuildError> {
    let order_x = order(attrs, K::OrderX)?;
    let order_y = order(attrs, K::OrderY)?;

    let kernel = attrs.list(K::KernelMatrix).unwrap_or(&[]);
    let cells = u64::from(order_x) * u64::from(order_y);
    if kernel.len() as u64 != cells {
        return Err(reject(K::KernelMatrix));
    }

    Ok(EffectParams::ConvolveMatrix(ConvolveMatrix {
        order_x,
        order_y,
        divisor: divisor(attrs, kernel)?,
        kernel: kernel.to_vec(),
        bias: attrs.float(K::Bias),
        target_x: target(attrs, K::TargetX, order_x)?,
        target_y: target(attrs, K::TargetY, order_y)?,
        edge_mode: attrs.enumeration(K::EdgeMode),
        kernel_unit_length: pair(
            kernel_unit_length(attrs, K::KernelUnitLengthX)?,
            kernel_unit_length(attrs, K::KernelUnitLengthY)?,
        ),
        preserve_alpha: attrs.bool(K::PreserveAlpha),
    }))
}

/// Re-validates `key` and writes it into `params`.
///
/// Order and kernel changes alter the shape of the effect and never reach
/// here; they rebuild.
pub(super) fn patch(
    params: &mut ConvolveMatrix,
    attrs: &Attrs<'_>,
    key: K,
) -> Result<(), BuildError> {
    match key {
        K::Divisor => params.divisor = divisor(attrs, &params.kernel)?,
        K::Bias => params.bias = attrs.float(K::Bias),
        K::TargetX => params.target_x = target(attrs, key, params.order_x)?,
        K::TargetY => params.target_y = target(attrs, key, params.order_y)?,
        K::EdgeMode => params.edge_mode = attrs.enumeration(K::EdgeMode),
        K::KernelUnitLengthX => {
            params.kernel_unit_length.x = f64::from(kernel_unit_length(attrs, key)?);
        }
        K::KernelUnitLengthY => {
            params.kernel_unit_length.y = f64::from(kernel_unit_length(attrs, key)?);
        }
        K::PreserveAlpha => params.preserve_alpha = attrs.bool(K::PreserveAlpha),
        _ => return Err(reject(key)),
    }
    Ok(())
}

fn order(attrs: &Attrs<'_>, key: K) -> Result<u32, BuildError> {
    u32::try_from(attrs.int(key))
        .ok()
        .filter(|&order| order >= 1)
        .ok_or(reject(key))
}

fn target(attrs: &Attrs<'_>, key: K, order: u32) -> Result<u32, BuildError> {
    if !attrs.is_specified(key) {
        return Ok(order / 2);
    }
    u32::try_from(attrs.int(key))
        .ok()
        .filter(|&target| target < order)
        .ok_or(reject(key))
}

fn divisor(attrs: &Attrs<'_>, kernel: &[f32]) -> Result<f32, BuildError> {
    if attrs.is_specified(K::Divisor) {
        let divisor = attrs.float(K::Divisor);
        return if divisor == 0.0 {
            Err(reject(K::Divisor))
        } else {
            Ok(divisor)
        };
    }
    let sum: f32 = kernel.iter().sum();
    Ok(if sum == 0.0 { 1.0 } else { sum })
}

fn kernel_unit_length(attrs: &Attrs<'_>, key: K) -> Result<f32, BuildError> {
    let length = attrs.float(key);
    if length > 0.0 {
        Ok(length)
    } else {
        Err(reject(key))
    }
}
