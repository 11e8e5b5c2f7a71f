//! Filters that decide which colors take part in quantization.

use crate::Hsl;

/// An interface for excluding colors from quantization.
///
/// Each unique color of the histogram is checked before quantization,
/// and each averaged color is checked again afterwards, since an average can land
/// in an excluded region even if none of its input colors did.
pub trait ColorFilter {
    /// Returns whether the given color may appear in the palette.
    fn is_allowed(&self, rgb: [u8; 3], hsl: Hsl) -> bool;
}

impl<T: ColorFilter + ?Sized> ColorFilter for &T {
    #[inline]
    fn is_allowed(&self, rgb: [u8; 3], hsl: Hsl) -> bool {
        (**self).is_allowed(rgb, hsl)
    }
}

impl<T: ColorFilter + ?Sized> ColorFilter for Box<T> {
    #[inline]
    fn is_allowed(&self, rgb: [u8; 3], hsl: Hsl) -> bool {
        (**self).is_allowed(rgb, hsl)
    }
}

/// A color is allowed only if every filter in the slice allows it.
impl<T: ColorFilter> ColorFilter for [T] {
    fn is_allowed(&self, rgb: [u8; 3], hsl: Hsl) -> bool {
        self.iter().all(|filter| filter.is_allowed(rgb, hsl))
    }
}

/// A boxed filter that can be shared with a worker thread.
pub type BoxedFilter = Box<dyn ColorFilter + Send + Sync>;

/// A [`ColorFilter`] that calls a closure. See [`filter_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FromFn<F>(F);

/// Creates a [`ColorFilter`] from a closure returning whether a color is allowed.
///
/// # Examples
/// ```
/// # use colorcut::{filter_fn, ColorFilter, Hsl};
/// let no_greens = filter_fn(|[_, g, _]: [u8; 3], _: Hsl| g < 128);
/// assert!(no_greens.is_allowed([255, 0, 0], Hsl::from_rgb([255, 0, 0])));
/// assert!(!no_greens.is_allowed([0, 255, 0], Hsl::from_rgb([0, 255, 0])));
/// ```
pub fn filter_fn<F>(f: F) -> FromFn<F>
where
    F: Fn([u8; 3], Hsl) -> bool,
{
    FromFn(f)
}

impl<F> ColorFilter for FromFn<F>
where
    F: Fn([u8; 3], Hsl) -> bool,
{
    #[inline]
    fn is_allowed(&self, rgb: [u8; 3], hsl: Hsl) -> bool {
        (self.0)(rgb, hsl)
    }
}

/// The default filter, which removes colors that are close to black, close to white,
/// or close to the red side of the I line (desaturated reds and oranges near skin tones).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultFilter;

impl DefaultFilter {
    /// Colors with a lightness at or below this are treated as black.
    pub const BLACK_MAX_LIGHTNESS: f32 = 0.05;

    /// Colors with a lightness at or above this are treated as white.
    pub const WHITE_MIN_LIGHTNESS: f32 = 0.95;

    /// The hue range, in degrees, of the red I line band.
    pub const RED_I_LINE_HUE: (f32, f32) = (10.0, 37.0);

    /// Colors in the red I line hue band with a saturation at or below this are removed.
    pub const RED_I_LINE_MAX_SATURATION: f32 = 0.82;

    /// Whether the color is close to black.
    #[must_use]
    pub fn is_black(hsl: Hsl) -> bool {
        hsl.lightness <= Self::BLACK_MAX_LIGHTNESS
    }

    /// Whether the color is close to white.
    #[must_use]
    pub fn is_white(hsl: Hsl) -> bool {
        hsl.lightness >= Self::WHITE_MIN_LIGHTNESS
    }

    /// Whether the color lies close to the red side of the I line.
    #[must_use]
    pub fn is_near_red_i_line(hsl: Hsl) -> bool {
        let (low, high) = Self::RED_I_LINE_HUE;
        (low..=high).contains(&hsl.hue) && hsl.saturation <= Self::RED_I_LINE_MAX_SATURATION
    }
}

impl ColorFilter for DefaultFilter {
    #[inline]
    fn is_allowed(&self, _: [u8; 3], hsl: Hsl) -> bool {
        !(Self::is_white(hsl) || Self::is_black(hsl) || Self::is_near_red_i_line(hsl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Only allows colors with a non-zero blue component.
    struct NeedsBlue;

    impl ColorFilter for NeedsBlue {
        fn is_allowed(&self, [_, _, b]: [u8; 3], _: Hsl) -> bool {
            b > 0
        }
    }

    fn allowed(hsl: Hsl) -> bool {
        DefaultFilter.is_allowed(hsl.to_rgb(), hsl)
    }

    #[test]
    fn default_filter_lightness() {
        assert!(!allowed(Hsl::new(200.0, 0.5, 0.95)));
        assert!(!allowed(Hsl::new(200.0, 0.5, 1.0)));
        assert!(!allowed(Hsl::new(200.0, 0.5, 0.05)));
        assert!(!allowed(Hsl::new(200.0, 0.5, 0.0)));
        assert!(allowed(Hsl::new(200.0, 0.5, 0.94)));
        assert!(allowed(Hsl::new(200.0, 0.5, 0.06)));
    }

    #[test]
    fn default_filter_red_i_line() {
        assert!(!allowed(Hsl::new(10.0, 0.5, 0.5)));
        assert!(!allowed(Hsl::new(20.0, 0.82, 0.5)));
        assert!(!allowed(Hsl::new(37.0, 0.0, 0.5)));
        assert!(allowed(Hsl::new(20.0, 0.9, 0.5)));
        assert!(allowed(Hsl::new(9.0, 0.5, 0.5)));
        assert!(allowed(Hsl::new(38.0, 0.5, 0.5)));
    }

    #[test]
    fn default_filter_rgb() {
        let check = |rgb| DefaultFilter.is_allowed(rgb, Hsl::from_rgb(rgb));
        assert!(!check([255, 255, 255]));
        assert!(!check([0, 0, 0]));
        assert!(check([0x40, 0x78, 0xB4]));
    }

    #[test]
    fn closure_filter() {
        let dark_only = filter_fn(|_, hsl: Hsl| hsl.lightness < 0.5);
        assert!(dark_only.is_allowed([0x20, 0x40, 0x80], Hsl::from_rgb([0x20, 0x40, 0x80])));
        assert!(!dark_only.is_allowed([0xC0, 0xE0, 0xF0], Hsl::from_rgb([0xC0, 0xE0, 0xF0])));
    }

    #[test]
    fn combined_filters() {
        let none: &[DefaultFilter] = &[];
        let hsl = Hsl::from_rgb([255, 255, 255]);
        assert!(none.is_allowed([255, 255, 255], hsl));

        let filters: Vec<BoxedFilter> = vec![
            Box::new(DefaultFilter),
            Box::new(NeedsBlue),
            Box::new(filter_fn(|[r, ..], _| r < 0xF0)),
        ];
        let filters = filters.as_slice();
        assert!(filters.is_allowed([0x40, 0x78, 0xB4], Hsl::from_rgb([0x40, 0x78, 0xB4])));
        assert!(!filters.is_allowed([0x40, 0x78, 0x00], Hsl::from_rgb([0x40, 0x78, 0x00])));
        assert!(!filters.is_allowed([255, 255, 255], hsl));
    }
}
