// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effect payloads handed to the raster backend.
//!
//! Every value here is fully resolved: defaults substituted, derived values
//! (convolution divisor and target, color-matrix values) computed, style
//! properties fetched. A backend never consults the element tree.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Rect, Vec2};

use crate::style::Color;
use crate::value::{
    BlendMode, ChannelSelector, ColorMatrixType, CompositeOperator, EdgeMode, MorphologyOperator,
    TransferFunctionType, TurbulenceType,
};

/// One transfer function of a component-transfer effect.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferFunction {
    /// Function type.
    pub kind: TransferFunctionType,
    /// Lookup table for `table` and `discrete`.
    pub table_values: Vec<f32>,
    /// Slope for `linear`.
    pub slope: f32,
    /// Intercept for `linear`.
    pub intercept: f32,
    /// Amplitude for `gamma`.
    pub amplitude: f32,
    /// Exponent for `gamma`.
    pub exponent: f32,
    /// Offset for `gamma`.
    pub offset: f32,
}

impl TransferFunction {
    /// The identity function, used for channels without a function child.
    pub const IDENTITY: Self = Self {
        kind: TransferFunctionType::Identity,
        table_values: Vec::new(),
        slope: 1.0,
        intercept: 0.0,
        amplitude: 1.0,
        exponent: 1.0,
        offset: 0.0,
    };
}

impl Default for TransferFunction {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Resolved convolution parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvolveMatrix {
    /// Kernel columns, at least 1.
    pub order_x: u32,
    /// Kernel rows, at least 1.
    pub order_y: u32,
    /// Row-major kernel, exactly `order_x * order_y` entries.
    pub kernel: Vec<f32>,
    /// Never zero.
    pub divisor: f32,
    /// Added after division.
    pub bias: f32,
    /// Target column, in `[0, order_x)` when set explicitly.
    pub target_x: u32,
    /// Target row, in `[0, order_y)` when set explicitly.
    pub target_y: u32,
    /// Sampling outside the input.
    pub edge_mode: EdgeMode,
    /// Kernel unit length per axis, both positive.
    pub kernel_unit_length: Vec2,
    /// Convolve color only and keep the input alpha.
    pub preserve_alpha: bool,
}

/// A light source for the lighting effects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightSource {
    /// Infinitely distant light, angles in degrees.
    Distant {
        /// Direction in the XY plane.
        azimuth: f32,
        /// Direction above the XY plane.
        elevation: f32,
    },
    /// Positional light.
    Point {
        /// Light position `[x, y, z]`.
        position: [f32; 3],
    },
    /// Positional light with a direction and an optional cone.
    Spot {
        /// Light position `[x, y, z]`.
        position: [f32; 3],
        /// Point the light aims at `[x, y, z]`.
        points_at: [f32; 3],
        /// Focus of the light.
        specular_exponent: f32,
        /// Cone half-angle in degrees; `None` means unrestricted.
        limiting_cone_angle: Option<f32>,
    },
}

/// Parameters shared by diffuse and specular lighting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    /// The first light-source child.
    pub light: LightSource,
    /// Resolved `lighting-color`.
    pub color: Color,
    /// Height multiplier for the alpha bump map.
    pub surface_scale: f32,
    /// Explicit kernel unit length; `None` means one device pixel.
    pub kernel_unit_length: Option<Vec2>,
}

/// Kind and resolved parameters of one effect node.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectParams {
    /// The unfiltered content.
    SourceGraphic,
    /// The alpha channel of the unfiltered content.
    SourceAlpha,
    /// `feBlend`.
    Blend {
        /// Blend mode.
        mode: BlendMode,
    },
    /// `feColorMatrix`.
    ColorMatrix {
        /// Matrix type.
        kind: ColorMatrixType,
        /// 20 values for `matrix`, one for `saturate` and `hueRotate`, none
        /// for `luminanceToAlpha`.
        values: Vec<f32>,
    },
    /// `feComponentTransfer`.
    ComponentTransfer {
        /// Red channel function.
        red: TransferFunction,
        /// Green channel function.
        green: TransferFunction,
        /// Blue channel function.
        blue: TransferFunction,
        /// Alpha channel function.
        alpha: TransferFunction,
    },
    /// `feComposite`.
    Composite {
        /// Porter-Duff or arithmetic operator.
        operator: CompositeOperator,
        /// `k1..k4` for `arithmetic`.
        k: [f32; 4],
    },
    /// `feConvolveMatrix`.
    ConvolveMatrix(ConvolveMatrix),
    /// `feDiffuseLighting`.
    DiffuseLighting {
        /// Light and surface.
        lighting: Lighting,
        /// `kd`, non-negative.
        diffuse_constant: f32,
    },
    /// `feDisplacementMap`.
    DisplacementMap {
        /// Displacement scale.
        scale: f32,
        /// Channel of `in2` driving X displacement.
        x_channel: ChannelSelector,
        /// Channel of `in2` driving Y displacement.
        y_channel: ChannelSelector,
    },
    /// `feDropShadow`.
    DropShadow {
        /// Blur deviation per axis, non-negative.
        std_deviation: Vec2,
        /// Shadow offset.
        offset: Vec2,
        /// Resolved `flood-color`.
        color: Color,
        /// Resolved `flood-opacity`, in `[0, 1]`.
        opacity: f32,
    },
    /// `feFlood`.
    Flood {
        /// Resolved `flood-color`.
        color: Color,
        /// Resolved `flood-opacity`, in `[0, 1]`.
        opacity: f32,
    },
    /// `feGaussianBlur`.
    GaussianBlur {
        /// Deviation per axis, non-negative.
        std_deviation: Vec2,
        /// Sampling outside the input.
        edge_mode: EdgeMode,
    },
    /// `feImage`.
    Image {
        /// Referenced resource; may be empty.
        href: String,
        /// Unparsed `preserveAspectRatio`.
        preserve_aspect_ratio: String,
    },
    /// `feMerge`; one input per merge node.
    Merge,
    /// `feMorphology`.
    Morphology {
        /// Erode or dilate.
        operator: MorphologyOperator,
        /// Radius per axis, non-negative.
        radius: Vec2,
    },
    /// `feOffset`.
    Offset {
        /// Translation.
        delta: Vec2,
    },
    /// `feSpecularLighting`.
    SpecularLighting {
        /// Light and surface.
        lighting: Lighting,
        /// `ks`, non-negative.
        specular_constant: f32,
        /// Shininess, in `[1, 128]`.
        specular_exponent: f32,
    },
    /// `feTile`.
    Tile,
    /// `feTurbulence`.
    Turbulence {
        /// Base frequency per axis, non-negative.
        base_frequency: Vec2,
        /// Octave count.
        num_octaves: i32,
        /// Random seed.
        seed: f32,
        /// Adjust frequencies to tile seamlessly.
        stitch_tiles: bool,
        /// Noise function.
        kind: TurbulenceType,
    },
}

impl EffectParams {
    /// Returns a short, stable name for the effect kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SourceGraphic => "SourceGraphic",
            Self::SourceAlpha => "SourceAlpha",
            Self::Blend { .. } => "Blend",
            Self::ColorMatrix { .. } => "ColorMatrix",
            Self::ComponentTransfer { .. } => "ComponentTransfer",
            Self::Composite { .. } => "Composite",
            Self::ConvolveMatrix(_) => "ConvolveMatrix",
            Self::DiffuseLighting { .. } => "DiffuseLighting",
            Self::DisplacementMap { .. } => "DisplacementMap",
            Self::DropShadow { .. } => "DropShadow",
            Self::Flood { .. } => "Flood",
            Self::GaussianBlur { .. } => "GaussianBlur",
            Self::Image { .. } => "Image",
            Self::Merge => "Merge",
            Self::Morphology { .. } => "Morphology",
            Self::Offset { .. } => "Offset",
            Self::SpecularLighting { .. } => "SpecularLighting",
            Self::Tile => "Tile",
            Self::Turbulence { .. } => "Turbulence",
        }
    }

    /// Returns whether this is one of the two built-in sources.
    #[must_use]
    pub const fn is_builtin(&self) -> bool {
        matches!(self, Self::SourceGraphic | Self::SourceAlpha)
    }
}

/// The primitive subregion, as specified.
///
/// Each edge is optional; unspecified ones fall back to the default region
/// the backend computes (usually the union of the input subregions, or the
/// filter region for effects without inputs).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Subregion {
    /// Left edge.
    pub x: Option<f64>,
    /// Top edge.
    pub y: Option<f64>,
    /// Width.
    pub width: Option<f64>,
    /// Height.
    pub height: Option<f64>,
}

impl Subregion {
    /// A subregion with nothing specified.
    pub const UNSPECIFIED: Self = Self {
        x: None,
        y: None,
        width: None,
        height: None,
    };

    /// Returns whether every edge falls back to the default.
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        *self == Self::UNSPECIFIED
    }

    /// Fills unspecified edges from `default`.
    #[must_use]
    pub fn resolve(&self, default: Rect) -> Rect {
        let x = self.x.unwrap_or(default.x0);
        let y = self.y.unwrap_or(default.y0);
        let width = self.width.unwrap_or(default.width());
        let height = self.height.unwrap_or(default.height());
        Rect::new(x, y, x + width, y + height)
    }
}
