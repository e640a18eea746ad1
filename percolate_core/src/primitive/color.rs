// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color matrix and component transfer.

use alloc::vec;
use alloc::vec::Vec;

use crate::attr::{AttrKey as K, Attrs, Tag};
use crate::effect::{EffectParams, TransferFunction};
use crate::element::{ElementId, ElementTree};
use crate::error::BuildError;
use crate::value::{ColorMatrixType, Value};

use super::reject;

pub(super) fn color_matrix(attrs: &Attrs<'_>) -> Result<EffectParams, BuildError> {
    let kind = attrs.enumeration(K::Type);
    Ok(EffectParams::ColorMatrix {
        kind,
        values: matrix_values(attrs, kind)?,
    })
}

/// `type` and `values` are interdependent, so either one re-derives both.
pub(super) fn patch_color_matrix(
    kind: &mut ColorMatrixType,
    values: &mut Vec<f32>,
    attrs: &Attrs<'_>,
    key: K,
) -> Result<(), BuildError> {
    if !matches!(key, K::Type | K::Values) {
        return Err(reject(key));
    }
    let new_kind = attrs.enumeration(K::Type);
    *values = matrix_values(attrs, new_kind)?;
    *kind = new_kind;
    Ok(())
}

/// Gathers the transfer-function children of `element`.
///
/// The last child per channel wins and channels without a child are identity.
pub(super) fn component_transfer(tree: &ElementTree, element: ElementId) -> EffectParams {
    let mut funcs = [
        TransferFunction::IDENTITY,
        TransferFunction::IDENTITY,
        TransferFunction::IDENTITY,
        TransferFunction::IDENTITY,
    ];
    for child in tree.children(element) {
        let slot = match tree.tag(child) {
            Tag::FuncR => 0,
            Tag::FuncG => 1,
            Tag::FuncB => 2,
            Tag::FuncA => 3,
            _ => continue,
        };
        funcs[slot] = transfer_function(&tree.attrs(child));
    }
    let [red, green, blue, alpha] = funcs;
    EffectParams::ComponentTransfer {
        red,
        green,
        blue,
        alpha,
    }
}

fn transfer_function(attrs: &Attrs<'_>) -> TransferFunction {
    TransferFunction {
        kind: attrs.enumeration(K::Type),
        table_values: attrs
            .list(K::TableValues)
            .map(<[f32]>::to_vec)
            .unwrap_or_default(),
        slope: attrs.float(K::Slope),
        intercept: attrs.float(K::Intercept),
        amplitude: attrs.float(K::Amplitude),
        exponent: attrs.float(K::Exponent),
        offset: attrs.float(K::Offset),
    }
}

fn matrix_values(attrs: &Attrs<'_>, kind: ColorMatrixType) -> Result<Vec<f32>, BuildError> {
    // A single number may arrive unwrapped.
    let explicit: Option<&[f32]> = match attrs.store().get(K::Values) {
        Some(Value::FloatList(list)) => Some(list),
        Some(Value::Float(v)) => Some(core::slice::from_ref(v)),
        Some(_) => return Err(reject(K::Values)),
        None => None,
    };
    match (kind, explicit) {
        (ColorMatrixType::Matrix, None) => Ok(identity_matrix()),
        (ColorMatrixType::Matrix, Some(list)) if list.len() == 20 => Ok(list.to_vec()),
        (ColorMatrixType::Saturate, None) => Ok(vec![1.0]),
        (ColorMatrixType::Saturate, Some(&[s])) if (0.0..=1.0).contains(&s) => Ok(vec![s]),
        (ColorMatrixType::HueRotate, None) => Ok(vec![0.0]),
        (ColorMatrixType::HueRotate, Some(&[degrees])) => Ok(vec![degrees]),
        (ColorMatrixType::LuminanceToAlpha, _) => Ok(Vec::new()),
        _ => Err(reject(K::Values)),
    }
}

fn identity_matrix() -> Vec<f32> {
    (0..20)
        .map(|i| if i % 6 == 0 { 1.0 } else { 0.0 })
        .collect()
}
