// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style collaborator seam.
//!
//! Lighting and flood colors are CSS properties, so they are not kept in a
//! primitive's [`ValueStore`](crate::value::ValueStore). Builds and patches
//! ask a [`StyleResolver`] instead, one synchronous read per property.

use crate::element::ElementId;

/// A non-premultiplied sRGB color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Opaque black, the initial `flood-color`.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white, the initial `lighting-color`.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a color from float components.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from 8-bit components.
    #[must_use]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }
}

/// Read-only access to the computed style of filter elements.
///
/// Every method defaults to the CSS initial value, so resolvers only override
/// what they actually compute.
pub trait StyleResolver {
    /// Returns the computed `lighting-color` of a lighting primitive.
    fn lighting_color(&self, element: ElementId) -> Color {
        _ = element;
        Color::WHITE
    }

    /// Returns the computed `flood-color` of a flood or drop-shadow primitive.
    fn flood_color(&self, element: ElementId) -> Color {
        _ = element;
        Color::BLACK
    }

    /// Returns the computed `flood-opacity`; callers clamp to `[0, 1]`.
    fn flood_opacity(&self, element: ElementId) -> f32 {
        _ = element;
        1.0
    }
}

/// A [`StyleResolver`] that reports CSS initial values for every element.
#[derive(Clone, Copy, Debug, Default)]
pub struct InitialStyle;

impl StyleResolver for InitialStyle {}
