//! Contains the [`Swatch`] value type and the color conversions it relies on.

use palette::{IntoColor, Srgb};
use std::fmt::{self, Display};

/// Packs the given red, green, and blue components into a `0xRRGGBB` value.
#[must_use]
pub const fn pack_rgb([r, g, b]: [u8; 3]) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Unpacks a `0xRRGGBB` value into its red, green, and blue components.
///
/// Any bits above the low 24 are ignored.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn unpack_rgb(color: u32) -> [u8; 3] {
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}

/// A color in the HSL color space.
///
/// `hue` is in degrees in the range `[0, 360)`,
/// while `saturation` and `lightness` are in the range `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsl {
    /// The hue in degrees.
    pub hue: f32,
    /// The saturation.
    pub saturation: f32,
    /// The lightness.
    pub lightness: f32,
}

impl Hsl {
    /// Creates a new [`Hsl`] from its components.
    #[must_use]
    pub const fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self { hue, saturation, lightness }
    }

    /// Converts the given sRGB components into HSL.
    #[must_use]
    pub fn from_rgb([r, g, b]: [u8; 3]) -> Self {
        let srgb: Srgb<f32> = Srgb::new(r, g, b).into_format();
        let hsl: palette::Hsl = srgb.into_color();
        Self {
            hue: hsl.hue.into_positive_degrees(),
            saturation: hsl.saturation,
            lightness: hsl.lightness,
        }
    }

    /// Converts this color into sRGB components, rounding to the nearest integer.
    #[must_use]
    pub fn to_rgb(self) -> [u8; 3] {
        let hsl: palette::Hsl = palette::Hsl::new(
            self.hue,
            self.saturation.clamp(0.0, 1.0),
            self.lightness.clamp(0.0, 1.0),
        );
        let srgb: Srgb<f32> = hsl.into_color();
        let srgb: Srgb<u8> = srgb.into_format();
        let (r, g, b) = srgb.into_components();
        [r, g, b]
    }

    /// Returns this color with its lightness replaced.
    #[must_use]
    pub const fn with_lightness(self, lightness: f32) -> Self {
        Self { lightness, ..self }
    }
}

/// A representative color from an image and the number of pixels it stands for.
///
/// The HSL form of the color is computed once at construction.
/// A swatch is immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    /// The red, green, and blue components.
    rgb: [u8; 3],
    /// The number of pixels represented by this swatch.
    population: u32,
    /// `rgb` converted to HSL.
    hsl: Hsl,
}

impl Swatch {
    /// Creates a new [`Swatch`] from sRGB components and a population.
    #[must_use]
    pub fn new(rgb: [u8; 3], population: u32) -> Self {
        Self { rgb, population, hsl: Hsl::from_rgb(rgb) }
    }

    /// Creates a new [`Swatch`] from a packed `0xRRGGBB` color and a population.
    #[must_use]
    pub fn from_packed(color: u32, population: u32) -> Self {
        Self::new(unpack_rgb(color), population)
    }

    /// Creates a new [`Swatch`] from an HSL color.
    ///
    /// The color is first rounded to sRGB, and the stored HSL value is derived from that,
    /// so it may differ slightly from `hsl`.
    #[must_use]
    pub fn from_hsl(hsl: Hsl, population: u32) -> Self {
        Self::new(hsl.to_rgb(), population)
    }

    /// Returns the red, green, and blue components.
    #[must_use]
    pub const fn rgb(&self) -> [u8; 3] {
        self.rgb
    }

    /// Returns the color as a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn packed(&self) -> u32 {
        pack_rgb(self.rgb)
    }

    /// Returns the color as a [`palette`] sRGB color.
    #[must_use]
    pub fn srgb(&self) -> Srgb<u8> {
        let [r, g, b] = self.rgb;
        Srgb::new(r, g, b)
    }

    /// Returns the hue, saturation, and lightness of the color.
    #[must_use]
    pub const fn hsl(&self) -> Hsl {
        self.hsl
    }

    /// Returns the number of pixels represented by this swatch.
    ///
    /// Synthesized swatches have a population of `0`.
    #[must_use]
    pub const fn population(&self) -> u32 {
        self.population
    }

    /// Returns the color formatted as `#rrggbb`.
    #[must_use]
    pub fn hex(&self) -> String {
        let [r, g, b] = self.rgb;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl Display for Swatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Hsl { hue, saturation, lightness } = self.hsl;
        write!(
            f,
            "{} ({hue:.1}, {saturation:.3}, {lightness:.3}) population={}",
            self.hex(),
            self.population
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColorFilter, DefaultFilter};

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn pack_unpack() {
        assert_eq!(pack_rgb([0x40, 0x78, 0xB4]), 0x4078B4);
        assert_eq!(unpack_rgb(0x4078B4), [0x40, 0x78, 0xB4]);
        assert_eq!(unpack_rgb(0xFF40_78B4), [0x40, 0x78, 0xB4]);
    }

    #[test]
    fn extremes_to_hsl() {
        let white = Hsl::from_rgb([255, 255, 255]);
        assert_close(white.lightness, 1.0);
        assert_close(white.saturation, 0.0);

        let black = Hsl::from_rgb([0, 0, 0]);
        assert_close(black.lightness, 0.0);
        assert_close(black.saturation, 0.0);
    }

    #[test]
    fn primaries_to_hsl() {
        let red = Hsl::from_rgb([255, 0, 0]);
        assert_close(red.hue, 0.0);
        assert_close(red.saturation, 1.0);
        assert_close(red.lightness, 0.5);

        let blue = Hsl::from_rgb([0, 0, 255]);
        assert_close(blue.hue, 240.0);

        let magenta_ish = Hsl::from_rgb([255, 0, 128]);
        assert!(magenta_ish.hue > 300.0 && magenta_ish.hue < 360.0);
    }

    #[test]
    fn hue_band_boundary() {
        // lands just above 10 degrees with f32 math, so it counts as inside the red band
        let hsl = Hsl::from_rgb([0x11, 0x0C, 0x0B]);
        assert!(hsl.hue >= 10.0 && hsl.hue < 10.001, "got {}", hsl.hue);
        assert!(!DefaultFilter.is_allowed([0x11, 0x0C, 0x0B], hsl));
    }

    #[test]
    fn hsl_to_rgb() {
        assert_eq!(Hsl::new(0.0, 1.0, 0.5).to_rgb(), [255, 0, 0]);
        assert_eq!(Hsl::new(120.0, 1.0, 0.5).to_rgb(), [0, 255, 0]);
        assert_eq!(Hsl::new(0.0, 0.0, 1.0).to_rgb(), [255, 255, 255]);

        let hsl = Hsl::from_rgb([0x40, 0x78, 0xB4]);
        assert_eq!(hsl.to_rgb(), [0x40, 0x78, 0xB4]);
    }

    #[test]
    fn swatch_from_hsl_recomputes() {
        let swatch = Swatch::from_hsl(Hsl::new(200.0, 0.9, 0.5), 0);
        assert_eq!(swatch.population(), 0);
        assert!((swatch.hsl().lightness - 0.5).abs() < 0.01);
        assert!((swatch.hsl().hue - 200.0).abs() < 1.0);
        assert_eq!(Hsl::from_rgb(swatch.rgb()), swatch.hsl());
    }

    #[test]
    fn swatch_accessors() {
        let swatch = Swatch::from_packed(0x4078B4, 42);
        assert_eq!(swatch.rgb(), [0x40, 0x78, 0xB4]);
        assert_eq!(swatch.packed(), 0x4078B4);
        assert_eq!(swatch.srgb(), Srgb::new(0x40, 0x78, 0xB4));
        assert_eq!(swatch.population(), 42);
        assert_eq!(swatch.hex(), "#4078b4");
        assert_eq!(swatch.to_string(), "#4078b4 (211.0, 0.475, 0.478) population=42");
    }
}
