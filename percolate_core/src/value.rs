// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed attribute values and per-element value storage.
//!
//! The DOM layer parses attribute text into a [`Value`] before it reaches this
//! crate; malformed input never arrives here. A [`ValueStore`] keeps only
//! values that were set explicitly. Defaults are *not* stored, so a consumer
//! can always tell "attribute present" from "default applies" (see
//! [`Attrs`](crate::attr::Attrs) for default substitution).

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::attr::AttrKey;

/// `mode` of a blend primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "CSS blend mode names are self-describing")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Darken,
    Lighten,
    Overlay,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

/// `type` of a color-matrix primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMatrixType {
    /// A full 5x4 matrix (20 values).
    #[default]
    Matrix,
    /// A single saturation value in `[0, 1]`.
    Saturate,
    /// A single hue rotation in degrees.
    HueRotate,
    /// Luminance copied to alpha; takes no values.
    LuminanceToAlpha,
}

/// `type` of a transfer-function child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "transfer function names are self-describing")]
pub enum TransferFunctionType {
    #[default]
    Identity,
    Table,
    Discrete,
    Linear,
    Gamma,
}

/// `operator` of a composite primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "Porter-Duff operator names are self-describing")]
pub enum CompositeOperator {
    #[default]
    Over,
    In,
    Out,
    Atop,
    Xor,
    Arithmetic,
}

/// How a kernel samples outside the input image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EdgeMode {
    /// Repeat the nearest edge pixel.
    #[default]
    Duplicate,
    /// Sample from the opposite edge.
    Wrap,
    /// Transparent black outside the image.
    None,
}

/// `operator` of a morphology primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "operator names are self-describing")]
pub enum MorphologyOperator {
    #[default]
    Erode,
    Dilate,
}

/// Color channel read by a displacement map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "channel names are self-describing")]
pub enum ChannelSelector {
    R,
    G,
    B,
    #[default]
    A,
}

/// `type` of a turbulence primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "noise names are self-describing")]
pub enum TurbulenceType {
    FractalNoise,
    #[default]
    Turbulence,
}

/// An enumerated attribute value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "each variant wraps the enum of the same name")]
pub enum EnumValue {
    BlendMode(BlendMode),
    ColorMatrixType(ColorMatrixType),
    TransferFunctionType(TransferFunctionType),
    CompositeOperator(CompositeOperator),
    EdgeMode(EdgeMode),
    MorphologyOperator(MorphologyOperator),
    ChannelSelector(ChannelSelector),
    TurbulenceType(TurbulenceType),
}

/// Conversion between a typed attribute enum and [`EnumValue`].
pub trait AttrEnum: Copy + Sized {
    /// Extracts `Self` if `value` wraps this enum type.
    fn from_enum_value(value: EnumValue) -> Option<Self>;
    /// Wraps `self` in an [`EnumValue`].
    fn into_enum_value(self) -> EnumValue;
}

macro_rules! attr_enum {
    ($($ty:ident),* $(,)?) => {
        $(
            impl AttrEnum for $ty {
                fn from_enum_value(value: EnumValue) -> Option<Self> {
                    match value {
                        EnumValue::$ty(v) => Some(v),
                        _ => None,
                    }
                }

                fn into_enum_value(self) -> EnumValue {
                    EnumValue::$ty(self)
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Enum(EnumValue::$ty(v))
                }
            }
        )*
    };
}

attr_enum!(
    BlendMode,
    ColorMatrixType,
    TransferFunctionType,
    CompositeOperator,
    EdgeMode,
    MorphologyOperator,
    ChannelSelector,
    TurbulenceType,
);

/// A typed attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A single number.
    Float(f32),
    /// An integer.
    Int(i32),
    /// A boolean (`preserveAlpha`, `stitchTiles`).
    Bool(bool),
    /// An enumeration.
    Enum(EnumValue),
    /// A list of numbers (`kernelMatrix`, `values`, `tableValues`).
    FloatList(Vec<f32>),
    /// A string (`in`, `in2`, `result`, `href`).
    String(String),
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "attribute numbers are single precision"
    )]
    fn from(v: f64) -> Self {
        Self::Float(v as f32)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec<f32>> for Value {
    fn from(v: Vec<f32>) -> Self {
        Self::FloatList(v)
    }
}

impl From<&[f32]> for Value {
    fn from(v: &[f32]) -> Self {
        Self::FloatList(v.to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(String::from(v))
    }
}

impl Value {
    /// Returns the value as a number; integers are widened.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        reason = "attribute integers are small (orders, octaves, targets)"
    )]
    pub fn as_float(&self) -> Option<f32> {
        match *self {
            Self::Float(v) => Some(v),
            Self::Int(v) => Some(v as f32),
            _ => None,
        }
    }

    /// Returns the value as an integer. Floats are not truncated.
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as an enumeration.
    #[must_use]
    pub fn as_enum(&self) -> Option<EnumValue> {
        match *self {
            Self::Enum(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as a number list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[f32]> {
        match self {
            Self::FloatList(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

/// Explicitly specified attribute values of one element.
///
/// Absence of a key means the attribute was never set (or was removed); the
/// kind-specific default then applies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueStore {
    values: BTreeMap<AttrKey, Value>,
}

impl ValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key` and marks it explicitly specified.
    pub fn set_explicit(&mut self, key: AttrKey, value: impl Into<Value>) {
        self.values.insert(key, value.into());
    }

    /// Removes the explicit value for `key`, returning it if present.
    pub fn remove(&mut self, key: AttrKey) -> Option<Value> {
        self.values.remove(&key)
    }

    /// Returns whether `key` has an explicit value.
    #[must_use]
    pub fn is_specified(&self, key: AttrKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Returns the explicit value for `key`.
    #[must_use]
    pub fn get(&self, key: AttrKey) -> Option<&Value> {
        self.values.get(&key)
    }

    /// Returns the explicit value for `key` as a number.
    #[must_use]
    pub fn float(&self, key: AttrKey) -> Option<f32> {
        self.get(key).and_then(Value::as_float)
    }

    /// Returns the explicit value for `key` as an integer.
    #[must_use]
    pub fn int(&self, key: AttrKey) -> Option<i32> {
        self.get(key).and_then(Value::as_int)
    }

    /// Returns the explicit value for `key` as a boolean.
    #[must_use]
    pub fn bool(&self, key: AttrKey) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Returns the explicit value for `key` as a number list.
    #[must_use]
    pub fn list(&self, key: AttrKey) -> Option<&[f32]> {
        self.get(key).and_then(Value::as_list)
    }

    /// Returns the explicit value for `key` as a string.
    #[must_use]
    pub fn string(&self, key: AttrKey) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns the explicit value for `key` as an enumeration.
    #[must_use]
    pub fn enum_value(&self, key: AttrKey) -> Option<EnumValue> {
        self.get(key).and_then(Value::as_enum)
    }

    /// Iterates explicit values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (AttrKey, &Value)> + '_ {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Returns the number of explicit values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no value was set explicitly.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn explicit_bit_tracks_set_and_remove() {
        let mut store = ValueStore::new();
        assert!(!store.is_specified(AttrKey::Divisor), "fresh store is empty");

        store.set_explicit(AttrKey::Divisor, 4.0);
        assert!(store.is_specified(AttrKey::Divisor), "set marks explicit");
        assert_eq!(store.float(AttrKey::Divisor), Some(4.0));

        assert_eq!(store.remove(AttrKey::Divisor), Some(Value::Float(4.0)));
        assert!(!store.is_specified(AttrKey::Divisor), "remove clears explicit");
    }

    #[test]
    fn integers_widen_to_floats_but_not_back() {
        let mut store = ValueStore::new();
        store.set_explicit(AttrKey::OrderX, 5);
        store.set_explicit(AttrKey::Bias, 0.5);
        assert_eq!(store.float(AttrKey::OrderX), Some(5.0));
        assert_eq!(store.int(AttrKey::OrderX), Some(5));
        assert_eq!(store.int(AttrKey::Bias), None);
    }

    #[test]
    fn typed_accessors_reject_other_types() {
        let mut store = ValueStore::new();
        store.set_explicit(AttrKey::KernelMatrix, vec![1.0, 2.0]);
        store.set_explicit(AttrKey::In, "blur");
        store.set_explicit(AttrKey::EdgeMode, EdgeMode::Wrap);

        assert_eq!(store.list(AttrKey::KernelMatrix), Some(&[1.0, 2.0][..]));
        assert_eq!(store.float(AttrKey::KernelMatrix), None);
        assert_eq!(store.string(AttrKey::In), Some("blur"));
        assert_eq!(
            store.enum_value(AttrKey::EdgeMode).and_then(EdgeMode::from_enum_value),
            Some(EdgeMode::Wrap)
        );
        assert_eq!(
            store
                .enum_value(AttrKey::EdgeMode)
                .and_then(BlendMode::from_enum_value),
            None,
            "enum of another type does not convert"
        );
    }
}
