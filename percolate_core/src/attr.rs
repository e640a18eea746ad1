// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element tags, attribute keys, and the per-tag attribute tables.
//!
//! Every tag has a compile-time table of the attributes it consumes, paired
//! with the [`Route`] a change to that attribute takes:
//!
//! - **Patch** — the attribute is a scalar already baked into the built
//!   effect; it can be updated in place and only cached results are dropped.
//! - **Rebuild** — the attribute changes graph shape (input wiring, result
//!   names, kernel dimensions) and the whole filter is rebuilt.
//! - **Ignore** — the tag does not consume the attribute.
//!
//! Defaults are resolved here too, via [`default_value`] and the [`Attrs`]
//! view; they are never written into a [`ValueStore`].

use alloc::string::String;

use crate::value::{
    AttrEnum, BlendMode, ChannelSelector, ColorMatrixType, CompositeOperator, EdgeMode,
    MorphologyOperator, TransferFunctionType, TurbulenceType, Value, ValueStore,
};

use self::AttrKey as K;
use self::Route::{Patch as P, Rebuild as R};

/// The kind of an element in a filter tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    /// The `<filter>` container whose children are primitives.
    Filter,
    /// `feBlend`.
    Blend,
    /// `feColorMatrix`.
    ColorMatrix,
    /// `feComponentTransfer`.
    ComponentTransfer,
    /// `feComposite`.
    Composite,
    /// `feConvolveMatrix`.
    ConvolveMatrix,
    /// `feDiffuseLighting`.
    DiffuseLighting,
    /// `feDisplacementMap`.
    DisplacementMap,
    /// `feDropShadow`.
    DropShadow,
    /// `feFlood`.
    Flood,
    /// `feGaussianBlur`.
    GaussianBlur,
    /// `feImage`.
    Image,
    /// `feMerge`.
    Merge,
    /// `feMergeNode`, child of `feMerge`.
    MergeNode,
    /// `feMorphology`.
    Morphology,
    /// `feOffset`.
    Offset,
    /// `feSpecularLighting`.
    SpecularLighting,
    /// `feTile`.
    Tile,
    /// `feTurbulence`.
    Turbulence,
    /// `feFuncR`, child of `feComponentTransfer`.
    FuncR,
    /// `feFuncG`, child of `feComponentTransfer`.
    FuncG,
    /// `feFuncB`, child of `feComponentTransfer`.
    FuncB,
    /// `feFuncA`, child of `feComponentTransfer`.
    FuncA,
    /// `feDistantLight`, child of a lighting primitive.
    DistantLight,
    /// `fePointLight`, child of a lighting primitive.
    PointLight,
    /// `feSpotLight`, child of a lighting primitive.
    SpotLight,
}

impl Tag {
    /// Returns whether this tag is a filter primitive that builds an effect.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        !matches!(
            self,
            Self::Filter
                | Self::MergeNode
                | Self::FuncR
                | Self::FuncG
                | Self::FuncB
                | Self::FuncA
                | Self::DistantLight
                | Self::PointLight
                | Self::SpotLight
        )
    }

    /// Returns whether this tag is a light source.
    #[must_use]
    pub const fn is_light_source(self) -> bool {
        matches!(self, Self::DistantLight | Self::PointLight | Self::SpotLight)
    }

    /// Returns whether this tag is a transfer-function child.
    #[must_use]
    pub const fn is_transfer_function(self) -> bool {
        matches!(self, Self::FuncR | Self::FuncG | Self::FuncB | Self::FuncA)
    }

    /// Returns the SVG element name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Blend => "feBlend",
            Self::ColorMatrix => "feColorMatrix",
            Self::ComponentTransfer => "feComponentTransfer",
            Self::Composite => "feComposite",
            Self::ConvolveMatrix => "feConvolveMatrix",
            Self::DiffuseLighting => "feDiffuseLighting",
            Self::DisplacementMap => "feDisplacementMap",
            Self::DropShadow => "feDropShadow",
            Self::Flood => "feFlood",
            Self::GaussianBlur => "feGaussianBlur",
            Self::Image => "feImage",
            Self::Merge => "feMerge",
            Self::MergeNode => "feMergeNode",
            Self::Morphology => "feMorphology",
            Self::Offset => "feOffset",
            Self::SpecularLighting => "feSpecularLighting",
            Self::Tile => "feTile",
            Self::Turbulence => "feTurbulence",
            Self::FuncR => "feFuncR",
            Self::FuncG => "feFuncG",
            Self::FuncB => "feFuncB",
            Self::FuncA => "feFuncA",
            Self::DistantLight => "feDistantLight",
            Self::PointLight => "fePointLight",
            Self::SpotLight => "feSpotLight",
        }
    }
}

/// An attribute (or presentation property) understood by some tag.
///
/// Number-optional-number attributes (`order`, `stdDeviation`, `radius`,
/// `baseFrequency`, `kernelUnitLength`) are split into one key per axis; the
/// DOM layer sets both when the second number is omitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs, reason = "keys mirror SVG attribute names")]
pub enum AttrKey {
    // Primitive subregion and wiring, shared by all primitives.
    X,
    Y,
    Width,
    Height,
    Result,
    In,
    In2,

    Mode,
    Type,
    Values,

    TableValues,
    Slope,
    Intercept,
    Amplitude,
    Exponent,
    Offset,

    Operator,
    K1,
    K2,
    K3,
    K4,

    OrderX,
    OrderY,
    KernelMatrix,
    Divisor,
    Bias,
    TargetX,
    TargetY,
    EdgeMode,
    KernelUnitLengthX,
    KernelUnitLengthY,
    PreserveAlpha,

    SurfaceScale,
    DiffuseConstant,
    SpecularConstant,
    SpecularExponent,

    Azimuth,
    Elevation,
    Z,
    PointsAtX,
    PointsAtY,
    PointsAtZ,
    LimitingConeAngle,

    Scale,
    XChannelSelector,
    YChannelSelector,

    Dx,
    Dy,
    StdDeviationX,
    StdDeviationY,

    Href,
    PreserveAspectRatio,

    RadiusX,
    RadiusY,

    BaseFrequencyX,
    BaseFrequencyY,
    NumOctaves,
    Seed,
    StitchTiles,

    // Presentation properties; resolved through the style collaborator and
    // never stored.
    FloodColor,
    FloodOpacity,
    LightingColor,
}

impl AttrKey {
    /// Returns whether this key is a presentation property resolved by style.
    #[must_use]
    pub const fn is_style_property(self) -> bool {
        matches!(
            self,
            Self::FloodColor | Self::FloodOpacity | Self::LightingColor
        )
    }
}

/// What a change to an attribute requires of the built graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Update the existing effect in place and drop cached results.
    Patch,
    /// Discard and rebuild every effect of the container.
    Rebuild,
    /// The tag does not consume this attribute.
    Ignore,
}

const STANDARD: &[(AttrKey, Route)] = &[
    (K::X, R),
    (K::Y, R),
    (K::Width, R),
    (K::Height, R),
    (K::Result, R),
];

const BLEND: &[(AttrKey, Route)] = &[(K::In, R), (K::In2, R), (K::Mode, P)];

const COLOR_MATRIX: &[(AttrKey, Route)] = &[(K::In, R), (K::Type, P), (K::Values, P)];

const COMPONENT_TRANSFER: &[(AttrKey, Route)] = &[(K::In, R)];

const COMPOSITE: &[(AttrKey, Route)] = &[
    (K::In, R),
    (K::In2, R),
    (K::Operator, P),
    (K::K1, P),
    (K::K2, P),
    (K::K3, P),
    (K::K4, P),
];

const CONVOLVE_MATRIX: &[(AttrKey, Route)] = &[
    (K::In, R),
    (K::OrderX, R),
    (K::OrderY, R),
    (K::KernelMatrix, R),
    (K::Divisor, P),
    (K::Bias, P),
    (K::TargetX, P),
    (K::TargetY, P),
    (K::EdgeMode, P),
    (K::KernelUnitLengthX, P),
    (K::KernelUnitLengthY, P),
    (K::PreserveAlpha, P),
];

const DIFFUSE_LIGHTING: &[(AttrKey, Route)] = &[
    (K::In, R),
    (K::SurfaceScale, P),
    (K::DiffuseConstant, P),
    (K::KernelUnitLengthX, P),
    (K::KernelUnitLengthY, P),
    (K::LightingColor, P),
];

const DISPLACEMENT_MAP: &[(AttrKey, Route)] = &[
    (K::In, R),
    (K::In2, R),
    (K::Scale, P),
    (K::XChannelSelector, P),
    (K::YChannelSelector, P),
];

const DROP_SHADOW: &[(AttrKey, Route)] = &[
    (K::In, R),
    (K::StdDeviationX, P),
    (K::StdDeviationY, P),
    (K::Dx, P),
    (K::Dy, P),
    (K::FloodColor, P),
    (K::FloodOpacity, P),
];

const FLOOD: &[(AttrKey, Route)] = &[(K::FloodColor, P), (K::FloodOpacity, P)];

const GAUSSIAN_BLUR: &[(AttrKey, Route)] = &[
    (K::In, R),
    (K::StdDeviationX, P),
    (K::StdDeviationY, P),
    (K::EdgeMode, P),
];

const IMAGE: &[(AttrKey, Route)] = &[(K::Href, R), (K::PreserveAspectRatio, P)];

const MERGE_NODE: &[(AttrKey, Route)] = &[(K::In, R)];

const MORPHOLOGY: &[(AttrKey, Route)] = &[
    (K::In, R),
    (K::Operator, P),
    (K::RadiusX, P),
    (K::RadiusY, P),
];

const OFFSET: &[(AttrKey, Route)] = &[(K::In, R), (K::Dx, P), (K::Dy, P)];

const SPECULAR_LIGHTING: &[(AttrKey, Route)] = &[
    (K::In, R),
    (K::SurfaceScale, P),
    (K::SpecularConstant, P),
    (K::SpecularExponent, P),
    (K::KernelUnitLengthX, P),
    (K::KernelUnitLengthY, P),
    (K::LightingColor, P),
];

const TILE: &[(AttrKey, Route)] = &[(K::In, R)];

const TURBULENCE: &[(AttrKey, Route)] = &[
    (K::BaseFrequencyX, P),
    (K::BaseFrequencyY, P),
    (K::NumOctaves, P),
    (K::Seed, P),
    (K::StitchTiles, P),
    (K::Type, P),
];

// Transfer functions are gathered when the parent builds, so any change
// rebuilds.
const TRANSFER_FUNCTION: &[(AttrKey, Route)] = &[
    (K::Type, R),
    (K::TableValues, R),
    (K::Slope, R),
    (K::Intercept, R),
    (K::Amplitude, R),
    (K::Exponent, R),
    (K::Offset, R),
];

const DISTANT_LIGHT: &[(AttrKey, Route)] = &[(K::Azimuth, P), (K::Elevation, P)];

const POINT_LIGHT: &[(AttrKey, Route)] = &[(K::X, P), (K::Y, P), (K::Z, P)];

const SPOT_LIGHT: &[(AttrKey, Route)] = &[
    (K::X, P),
    (K::Y, P),
    (K::Z, P),
    (K::PointsAtX, P),
    (K::PointsAtY, P),
    (K::PointsAtZ, P),
    (K::SpecularExponent, P),
    (K::LimitingConeAngle, P),
];

/// Returns the tag-specific attribute table (without the shared subregion
/// and `result` attributes of primitives).
#[must_use]
pub const fn attribute_table(tag: Tag) -> &'static [(AttrKey, Route)] {
    match tag {
        Tag::Filter | Tag::Merge => &[],
        Tag::Blend => BLEND,
        Tag::ColorMatrix => COLOR_MATRIX,
        Tag::ComponentTransfer => COMPONENT_TRANSFER,
        Tag::Composite => COMPOSITE,
        Tag::ConvolveMatrix => CONVOLVE_MATRIX,
        Tag::DiffuseLighting => DIFFUSE_LIGHTING,
        Tag::DisplacementMap => DISPLACEMENT_MAP,
        Tag::DropShadow => DROP_SHADOW,
        Tag::Flood => FLOOD,
        Tag::GaussianBlur => GAUSSIAN_BLUR,
        Tag::Image => IMAGE,
        Tag::MergeNode => MERGE_NODE,
        Tag::Morphology => MORPHOLOGY,
        Tag::Offset => OFFSET,
        Tag::SpecularLighting => SPECULAR_LIGHTING,
        Tag::Tile => TILE,
        Tag::Turbulence => TURBULENCE,
        Tag::FuncR | Tag::FuncG | Tag::FuncB | Tag::FuncA => TRANSFER_FUNCTION,
        Tag::DistantLight => DISTANT_LIGHT,
        Tag::PointLight => POINT_LIGHT,
        Tag::SpotLight => SPOT_LIGHT,
    }
}

/// Returns how a change to `key` on an element tagged `tag` is handled.
#[must_use]
pub fn route(tag: Tag, key: AttrKey) -> Route {
    let shared: &[(AttrKey, Route)] = if tag.is_primitive() { STANDARD } else { &[] };
    attribute_table(tag)
        .iter()
        .chain(shared)
        .find(|(k, _)| *k == key)
        .map_or(Route::Ignore, |(_, r)| *r)
}

/// Returns whether `tag` consumes `key`.
#[must_use]
pub fn supports(tag: Tag, key: AttrKey) -> bool {
    route(tag, key) != Route::Ignore
}

/// Initial `preserveAspectRatio` of an image primitive.
pub const DEFAULT_PRESERVE_ASPECT_RATIO: &str = "xMidYMid meet";

/// Returns the static default of `key` for `tag`, if it has one.
///
/// Derived defaults (the convolution target and divisor, color-matrix values)
/// depend on other attributes and are computed by the primitive itself.
#[must_use]
pub fn default_value(tag: Tag, key: AttrKey) -> Option<Value> {
    let value: Value = match (tag, key) {
        (Tag::Blend, K::Mode) => BlendMode::Normal.into(),
        (Tag::ColorMatrix, K::Type) => ColorMatrixType::Matrix.into(),
        (Tag::FuncR | Tag::FuncG | Tag::FuncB | Tag::FuncA, key) => match key {
            K::Type => TransferFunctionType::Identity.into(),
            K::Slope | K::Amplitude | K::Exponent => Value::Float(1.0),
            K::Intercept | K::Offset => Value::Float(0.0),
            _ => return None,
        },
        (Tag::Composite, K::Operator) => CompositeOperator::Over.into(),
        (Tag::Composite, K::K1 | K::K2 | K::K3 | K::K4) => Value::Float(0.0),
        (Tag::ConvolveMatrix, key) => match key {
            K::OrderX | K::OrderY => Value::Int(3),
            K::Bias => Value::Float(0.0),
            K::EdgeMode => EdgeMode::Duplicate.into(),
            K::KernelUnitLengthX | K::KernelUnitLengthY => Value::Float(1.0),
            K::PreserveAlpha => Value::Bool(false),
            _ => return None,
        },
        (Tag::DiffuseLighting | Tag::SpecularLighting, key) => match key {
            K::SurfaceScale
            | K::DiffuseConstant
            | K::SpecularConstant
            | K::SpecularExponent
            | K::KernelUnitLengthX
            | K::KernelUnitLengthY => Value::Float(1.0),
            _ => return None,
        },
        (Tag::DistantLight, K::Azimuth | K::Elevation) => Value::Float(0.0),
        (Tag::PointLight, K::X | K::Y | K::Z) => Value::Float(0.0),
        (Tag::SpotLight, key) => match key {
            K::X | K::Y | K::Z | K::PointsAtX | K::PointsAtY | K::PointsAtZ => Value::Float(0.0),
            K::SpecularExponent => Value::Float(1.0),
            _ => return None,
        },
        (Tag::DisplacementMap, K::Scale) => Value::Float(0.0),
        (Tag::DisplacementMap, K::XChannelSelector | K::YChannelSelector) => {
            ChannelSelector::A.into()
        }
        (Tag::DropShadow, K::StdDeviationX | K::StdDeviationY | K::Dx | K::Dy) => {
            Value::Float(2.0)
        }
        (Tag::GaussianBlur, K::StdDeviationX | K::StdDeviationY) => Value::Float(0.0),
        (Tag::GaussianBlur, K::EdgeMode) => EdgeMode::None.into(),
        (Tag::Image, K::PreserveAspectRatio) => {
            Value::String(String::from(DEFAULT_PRESERVE_ASPECT_RATIO))
        }
        (Tag::Morphology, K::Operator) => MorphologyOperator::Erode.into(),
        (Tag::Morphology, K::RadiusX | K::RadiusY) => Value::Float(0.0),
        (Tag::Offset, K::Dx | K::Dy) => Value::Float(0.0),
        (Tag::Turbulence, key) => match key {
            K::BaseFrequencyX | K::BaseFrequencyY => Value::Float(0.0),
            K::NumOctaves => Value::Int(1),
            K::Seed => Value::Float(0.0),
            K::StitchTiles => Value::Bool(false),
            K::Type => TurbulenceType::Turbulence.into(),
            _ => return None,
        },
        _ => return None,
    };
    Some(value)
}

/// Read view over one element's values with default substitution.
///
/// Accessors return the explicit value when set, else the tag's default from
/// [`default_value`], else the type's zero value.
#[derive(Clone, Copy, Debug)]
pub struct Attrs<'a> {
    tag: Tag,
    store: &'a ValueStore,
}

impl<'a> Attrs<'a> {
    /// Creates a view of `store` interpreted as an element tagged `tag`.
    #[must_use]
    pub fn new(tag: Tag, store: &'a ValueStore) -> Self {
        Self { tag, store }
    }

    /// Returns the tag the values are interpreted for.
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the underlying explicit values.
    #[must_use]
    pub fn store(&self) -> &'a ValueStore {
        self.store
    }

    /// Returns whether `key` was set explicitly.
    #[must_use]
    pub fn is_specified(&self, key: AttrKey) -> bool {
        self.store.is_specified(key)
    }

    /// Returns the number for `key`.
    #[must_use]
    pub fn float(&self, key: AttrKey) -> f32 {
        self.store
            .float(key)
            .or_else(|| default_value(self.tag, key).and_then(|v| v.as_float()))
            .unwrap_or(0.0)
    }

    /// Returns the integer for `key`.
    #[must_use]
    pub fn int(&self, key: AttrKey) -> i32 {
        self.store
            .int(key)
            .or_else(|| default_value(self.tag, key).and_then(|v| v.as_int()))
            .unwrap_or(0)
    }

    /// Returns the boolean for `key`.
    #[must_use]
    pub fn bool(&self, key: AttrKey) -> bool {
        self.store
            .bool(key)
            .or_else(|| default_value(self.tag, key).and_then(|v| v.as_bool()))
            .unwrap_or(false)
    }

    /// Returns the explicit number list for `key`; list defaults are derived.
    #[must_use]
    pub fn list(&self, key: AttrKey) -> Option<&'a [f32]> {
        self.store.list(key)
    }

    /// Returns the explicit string for `key`, or the empty string.
    #[must_use]
    pub fn string(&self, key: AttrKey) -> &'a str {
        self.store.string(key).unwrap_or("")
    }

    /// Returns the enumeration for `key`.
    #[must_use]
    pub fn enumeration<T: AttrEnum + Default>(&self, key: AttrKey) -> T {
        self.store
            .enum_value(key)
            .and_then(T::from_enum_value)
            .or_else(|| {
                default_value(self.tag, key)
                    .and_then(|v| v.as_enum())
                    .and_then(T::from_enum_value)
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_follow_tables() {
        assert_eq!(route(Tag::ConvolveMatrix, K::Bias), Route::Patch);
        assert_eq!(route(Tag::ConvolveMatrix, K::Divisor), Route::Patch);
        assert_eq!(route(Tag::ConvolveMatrix, K::In), Route::Rebuild);
        assert_eq!(route(Tag::ConvolveMatrix, K::OrderX), Route::Rebuild);
        assert_eq!(route(Tag::ConvolveMatrix, K::KernelMatrix), Route::Rebuild);
        assert_eq!(route(Tag::GaussianBlur, K::StdDeviationY), Route::Patch);
        assert_eq!(route(Tag::Blend, K::Mode), Route::Patch);
        assert_eq!(route(Tag::Blend, K::In2), Route::Rebuild);
        assert_eq!(route(Tag::Offset, K::Bias), Route::Ignore);
    }

    #[test]
    fn standard_attributes_only_apply_to_primitives() {
        assert_eq!(route(Tag::Tile, K::Result), Route::Rebuild);
        assert_eq!(route(Tag::Flood, K::Width), Route::Rebuild);
        assert_eq!(route(Tag::MergeNode, K::Result), Route::Ignore);
        // Point light `x` is a light position, not a subregion.
        assert_eq!(route(Tag::PointLight, K::X), Route::Patch);
        assert_eq!(route(Tag::Filter, K::X), Route::Ignore);
    }

    #[test]
    fn every_primitive_table_has_no_duplicate_keys() {
        let tags = [
            Tag::Blend,
            Tag::ColorMatrix,
            Tag::ComponentTransfer,
            Tag::Composite,
            Tag::ConvolveMatrix,
            Tag::DiffuseLighting,
            Tag::DisplacementMap,
            Tag::DropShadow,
            Tag::Flood,
            Tag::GaussianBlur,
            Tag::Image,
            Tag::Merge,
            Tag::Morphology,
            Tag::Offset,
            Tag::SpecularLighting,
            Tag::Tile,
            Tag::Turbulence,
        ];
        for tag in tags {
            assert!(tag.is_primitive(), "{tag:?} should build an effect");
            let table = attribute_table(tag);
            for (i, (a, _)) in table.iter().enumerate() {
                assert!(
                    !table[i + 1..].iter().any(|(b, _)| a == b),
                    "{tag:?} lists {a:?} twice"
                );
                assert!(
                    !STANDARD.iter().any(|(b, _)| a == b),
                    "{tag:?} shadows shared attribute {a:?}"
                );
            }
        }
    }

    #[test]
    fn defaults_are_kind_specific() {
        let store = ValueStore::new();
        let convolve = Attrs::new(Tag::ConvolveMatrix, &store);
        assert_eq!(convolve.int(K::OrderX), 3);
        assert_eq!(convolve.float(K::KernelUnitLengthY), 1.0);
        assert_eq!(convolve.enumeration::<EdgeMode>(K::EdgeMode), EdgeMode::Duplicate);
        assert!(!convolve.is_specified(K::Divisor), "divisor is derived, not stored");

        let blur = Attrs::new(Tag::GaussianBlur, &store);
        assert_eq!(blur.enumeration::<EdgeMode>(K::EdgeMode), EdgeMode::None);

        let shadow = Attrs::new(Tag::DropShadow, &store);
        assert_eq!(shadow.float(K::Dx), 2.0);
    }

    #[test]
    fn explicit_values_win_over_defaults() {
        let mut store = ValueStore::new();
        store.set_explicit(K::OrderX, 5);
        store.set_explicit(K::EdgeMode, EdgeMode::Wrap);
        let attrs = Attrs::new(Tag::ConvolveMatrix, &store);
        assert_eq!(attrs.int(K::OrderX), 5);
        assert_eq!(attrs.int(K::OrderY), 3);
        assert_eq!(attrs.enumeration::<EdgeMode>(K::EdgeMode), EdgeMode::Wrap);
    }
}
