//! Colours and labels for the polygon and marker layers.

use std::fmt;

use crate::types::{CountryFeature, MarkerKind};

/// An sRGB colour with a linear alpha, as written in CSS `rgba()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Channels as floats in `0.0..=1.0`.
    #[must_use]
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            self.a,
        ]
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// How a country polygon should be emphasised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Selected,
    Hovered,
    Default,
}

/// Colours used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub default_cap: Rgba,
    pub hover_cap: Rgba,
    pub select_cap: Rgba,
    pub side: Rgba,
    pub stroke: Rgba,
    pub country_marker: Rgba,
    pub city_marker: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            default_cap: Rgba::new(30, 144, 255, 0.5),
            hover_cap: Rgba::new(255, 255, 0, 0.5),
            select_cap: Rgba::new(255, 69, 0, 0.7),
            side: Rgba::new(0, 100, 0, 0.15),
            stroke: Rgba::opaque(0x11, 0x11, 0x11),
            country_marker: Rgba::opaque(255, 165, 0),
            city_marker: Rgba::opaque(255, 255, 255),
        }
    }
}

impl Palette {
    /// Cap colour for a highlight state.
    #[must_use]
    pub fn cap_color(&self, highlight: Highlight) -> Rgba {
        match highlight {
            Highlight::Selected => self.select_cap,
            Highlight::Hovered => self.hover_cap,
            Highlight::Default => self.default_cap,
        }
    }

    #[must_use]
    pub fn marker_color(&self, kind: MarkerKind) -> Rgba {
        match kind {
            MarkerKind::Country => self.country_marker,
            MarkerKind::City => self.city_marker,
        }
    }
}

/// Hover label for a country polygon, e.g. `Nigeria (NG)`.
#[must_use]
pub fn polygon_label(feature: &CountryFeature) -> String {
    format!("{} ({})", feature.admin, feature.iso_a2)
}

/// Altitude of polygon caps above the globe surface, in globe radii.
pub const POLYGON_ALTITUDE: f64 = 0.009;
/// Altitude of point markers above the globe surface, in globe radii.
pub const MARKER_ALTITUDE: f64 = 0.01;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::country;

    #[test]
    fn test_css_formatting() {
        let palette = Palette::default();
        assert_eq!(palette.select_cap.to_string(), "rgba(255, 69, 0, 0.7)");
        assert_eq!(palette.stroke.to_string(), "rgba(17, 17, 17, 1)");
    }

    #[test]
    fn test_cap_colors_are_distinct() {
        let palette = Palette::default();
        let caps = [
            palette.cap_color(Highlight::Selected),
            palette.cap_color(Highlight::Hovered),
            palette.cap_color(Highlight::Default),
        ];
        assert_ne!(caps[0], caps[1]);
        assert_ne!(caps[1], caps[2]);
        assert_ne!(caps[0], caps[2]);
    }

    #[test]
    fn test_polygon_label() {
        let feature = country("NG", "Nigeria", None);
        assert_eq!(polygon_label(&feature), "Nigeria (NG)");
    }

    #[test]
    fn test_float_channels() {
        let [r, g, b, a] = Rgba::new(255, 0, 51, 0.25).to_f32_array();
        assert_eq!((r, g, a), (1.0, 0.0, 0.25));
        assert!((b - 0.2).abs() < 1e-6);
    }
}
