//! The error type for invalid arguments.

use thiserror::Error;

/// An invalid argument passed to palette generation.
///
/// All arguments are checked before any quantization work starts.
/// Once validation has passed, generation cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    /// The pixel source contained no pixels.
    #[error("pixel source is empty")]
    EmptyPixels,

    /// The width or height of the pixel source was zero.
    #[error("image dimensions cannot be zero, got {width}x{height}")]
    ZeroDimension {
        /// The given width.
        width: u32,
        /// The given height.
        height: u32,
    },

    /// The length of the pixel buffer did not match `width * height`.
    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        /// The length of the pixel buffer.
        len: usize,
        /// The given width.
        width: u32,
        /// The given height.
        height: u32,
    },

    /// The pixel source had more than [`MAX_PIXELS`](crate::MAX_PIXELS) pixels.
    #[error("pixel source has {0} pixels, above the maximum of {}", crate::MAX_PIXELS)]
    TooManyPixels(u64),

    /// The requested number of palette colors was zero.
    #[error("max_colors must be 1 or greater, got {0}")]
    InvalidMaxColors(u32),

    /// A pre-built histogram had no colors with a non-zero population.
    #[error("color histogram is empty")]
    EmptyHistogram,
}
