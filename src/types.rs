//! Contains the validated input types needed across the crate.

use crate::{PaletteError, DEFAULT_MAX_COLORS, MAX_PIXELS};
use std::{borrow::Cow, fmt::Display, num::NonZeroU32, ops::Deref};

#[cfg(feature = "image")]
use {
    crate::pack_rgb,
    image::{Rgb, RgbImage},
};

/// A row-major buffer of packed `0xRRGGBB` pixels with its dimensions.
///
/// Only the low 24 bits of each pixel are used, so `0xAARRGGBB` values may be passed as is.
///
/// The buffer is guaranteed to be non-empty, to have a length of `width * height`,
/// and to have at most [`MAX_PIXELS`] pixels.
///
/// # Examples
/// ```
/// # use colorcut::{PixelBuffer, PaletteError};
/// # fn main() -> Result<(), PaletteError> {
/// let pixels = vec![0xFF8000; 6];
/// let buffer = PixelBuffer::new(&pixels, 3, 2)?;
/// assert_eq!(buffer.len(), 6);
///
/// assert!(PixelBuffer::new(&pixels, 4, 2).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer<'a> {
    /// The packed pixels.
    pixels: Cow<'a, [u32]>,
    /// The number of pixels in each row.
    width: u32,
    /// The number of rows.
    height: u32,
}

impl<'a> PixelBuffer<'a> {
    /// Creates a new [`PixelBuffer`] that borrows the given pixels.
    ///
    /// # Errors
    /// Returns an error if there are no pixels, if either dimension is zero,
    /// if the length of `pixels` is not `width * height`,
    /// or if there are more than [`MAX_PIXELS`] pixels.
    pub fn new(pixels: &'a [u32], width: u32, height: u32) -> Result<Self, PaletteError> {
        Self::validate(pixels.len(), width, height)?;
        Ok(Self { pixels: Cow::Borrowed(pixels), width, height })
    }

    /// Checks the buffer length against the dimensions.
    fn validate(len: usize, width: u32, height: u32) -> Result<(), PaletteError> {
        if len == 0 {
            return Err(PaletteError::EmptyPixels);
        }

        if width == 0 || height == 0 {
            return Err(PaletteError::ZeroDimension { width, height });
        }

        let expected = u64::from(width) * u64::from(height);
        if expected > u64::from(MAX_PIXELS) {
            return Err(PaletteError::TooManyPixels(expected));
        }

        if len as u64 != expected {
            return Err(PaletteError::DimensionMismatch { len, width, height });
        }

        Ok(())
    }

    /// Returns the width of the image.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns the packed pixels.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Converts this buffer into one that owns its pixels.
    #[must_use]
    pub fn into_owned(self) -> PixelBuffer<'static> {
        let Self { pixels, width, height } = self;
        PixelBuffer { pixels: Cow::Owned(pixels.into_owned()), width, height }
    }
}

impl PixelBuffer<'static> {
    /// Creates a new [`PixelBuffer`] that owns the given pixels.
    ///
    /// # Errors
    /// Returns an error in the same cases as [`PixelBuffer::new`].
    pub fn from_vec(pixels: Vec<u32>, width: u32, height: u32) -> Result<Self, PaletteError> {
        Self::validate(pixels.len(), width, height)?;
        Ok(Self { pixels: Cow::Owned(pixels), width, height })
    }
}

#[cfg(feature = "image")]
impl TryFrom<&RgbImage> for PixelBuffer<'static> {
    type Error = PaletteError;

    fn try_from(image: &RgbImage) -> Result<Self, Self::Error> {
        let pixels = image.pixels().map(|&Rgb(rgb)| pack_rgb(rgb)).collect();
        Self::from_vec(pixels, image.width(), image.height())
    }
}

impl<'a> AsRef<[u32]> for PixelBuffer<'a> {
    fn as_ref(&self) -> &[u32] {
        self
    }
}

impl<'a> Deref for PixelBuffer<'a> {
    type Target = [u32];

    fn deref(&self) -> &Self::Target {
        &self.pixels
    }
}

/// This type is used to specify the maximum number of colors to include in a palette.
///
/// This is a simple new type wrapper around `u32` with the invariant that it must be at least `1`.
/// A size of `0` is rejected rather than clamped.
///
/// # Examples
/// ```
/// # use colorcut::{PaletteSize, PaletteError};
/// # fn main() -> Result<(), PaletteError> {
/// let size = PaletteSize::try_from(24)?;
/// assert_eq!(size.into_inner(), 24);
///
/// assert_eq!(PaletteSize::try_from(0), Err(PaletteError::InvalidMaxColors(0)));
/// assert_eq!(PaletteSize::default().into_inner(), 16);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PaletteSize(NonZeroU32);

impl PaletteSize {
    /// The default palette size (given by [`DEFAULT_MAX_COLORS`]).
    pub const DEFAULT: Self = match NonZeroU32::new(DEFAULT_MAX_COLORS) {
        Some(n) => Self(n),
        None => panic!("DEFAULT_MAX_COLORS is non-zero"),
    };

    /// Gets the inner `u32` value.
    #[must_use]
    pub const fn into_inner(self) -> u32 {
        self.0.get()
    }

    /// Gets the inner value as a `usize` for lengths and capacities.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn as_usize(self) -> usize {
        self.0.get() as usize
    }
}

impl Default for PaletteSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<NonZeroU32> for PaletteSize {
    fn from(value: NonZeroU32) -> Self {
        Self(value)
    }
}

impl From<PaletteSize> for u32 {
    fn from(val: PaletteSize) -> Self {
        val.into_inner()
    }
}

impl TryFrom<u32> for PaletteSize {
    type Error = PaletteError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(PaletteError::InvalidMaxColors(value))
    }
}

impl Display for PaletteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}
