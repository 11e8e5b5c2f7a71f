//! Contains the builder struct for the high level API.

use crate::{
    quantizer, BoxedFilter, ColorFilter, ColorHistogram, DefaultFilter, Palette, PaletteError,
    PaletteSize, PixelBuffer,
};
use log::debug;
use std::{borrow::Cow, fmt};

#[cfg(feature = "threads")]
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

#[cfg(feature = "image")]
use image::{
    imageops::{self, FilterType},
    RgbImage,
};

/// The colors a palette is generated from.
#[derive(Debug, Clone)]
enum Source<'a> {
    /// Raw pixels, which still need to be counted.
    Pixels(PixelBuffer<'a>),
    /// A histogram that was built ahead of time.
    Histogram(Cow<'a, ColorHistogram>),
}

/// A builder struct to specify options to generate a [`Palette`].
///
/// By default, palettes have at most [`DEFAULT_MAX_COLORS`](crate::DEFAULT_MAX_COLORS) swatches
/// and colors are filtered with [`DefaultFilter`].
///
/// # Examples
/// Start from a [`PixelBuffer`]:
/// ```
/// # use colorcut::{PaletteBuilder, PaletteError, PaletteSize, PixelBuffer, Profile};
/// # fn main() -> Result<(), PaletteError> {
/// let pixels = [0x4078B4, 0x4078B4, 0xE0E4F0, 0x102030];
/// let buffer = PixelBuffer::new(&pixels, 2, 2)?;
///
/// let palette = PaletteBuilder::new(buffer)
///     .max_colors(PaletteSize::try_from(8)?)
///     .generate()?;
///
/// assert_eq!(palette.swatches().len(), 3);
/// assert_eq!(palette.color(Profile::Vibrant, 0), 0x4078B4);
/// # Ok(())
/// # }
/// ```
///
/// Or, reuse a [`ColorHistogram`] to quantize the same image with different settings:
/// ```
/// # use colorcut::{ColorHistogram, PaletteBuilder, PaletteError, PaletteSize};
/// # fn main() -> Result<(), PaletteError> {
/// let histogram = ColorHistogram::new(&[0x4078B4, 0xB44078, 0x78B440]);
///
/// let small = PaletteBuilder::from_histogram(&histogram)
///     .max_colors(PaletteSize::try_from(1)?)
///     .generate()?;
/// let large = PaletteBuilder::from_histogram(&histogram).generate()?;
///
/// assert_eq!(small.swatches().len(), 1);
/// assert_eq!(large.swatches().len(), 3);
/// # Ok(())
/// # }
/// ```
pub struct PaletteBuilder<'a> {
    /// The colors to quantize.
    source: Source<'a>,
    /// The maximum number of swatches.
    max_colors: PaletteSize,
    /// Every filter must allow a color for it to be kept.
    filters: Vec<BoxedFilter>,
}

impl<'a> PaletteBuilder<'a> {
    /// Creates a new [`PaletteBuilder`] for the given pixels with the default options.
    #[must_use]
    pub fn new(pixels: PixelBuffer<'a>) -> Self {
        Self::with_source(Source::Pixels(pixels))
    }

    /// Creates a new [`PaletteBuilder`] for a pre-built histogram with the default options.
    ///
    /// [`PaletteBuilder::generate`] returns an error if the histogram is empty.
    #[must_use]
    pub fn from_histogram(histogram: &'a ColorHistogram) -> Self {
        Self::with_source(Source::Histogram(Cow::Borrowed(histogram)))
    }

    /// Creates a builder with the default options.
    fn with_source(source: Source<'a>) -> Self {
        Self {
            source,
            max_colors: PaletteSize::default(),
            filters: vec![Box::new(DefaultFilter)],
        }
    }

    /// Sets the maximum number of swatches in the palette.
    ///
    /// The default is [`DEFAULT_MAX_COLORS`](crate::DEFAULT_MAX_COLORS).
    #[must_use]
    pub fn max_colors(mut self, max_colors: PaletteSize) -> Self {
        self.max_colors = max_colors;
        self
    }

    /// Adds a filter. A color is kept only if every filter allows it.
    #[must_use]
    pub fn filter(mut self, filter: impl ColorFilter + Send + Sync + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Removes all filters, including the default one, so that no color is ignored.
    #[must_use]
    pub fn clear_filters(mut self) -> Self {
        self.filters.clear();
        self
    }

    /// Converts this builder into one that owns its colors,
    /// so that it can be moved to another thread.
    #[must_use]
    pub fn into_owned(self) -> PaletteBuilder<'static> {
        let Self { source, max_colors, filters } = self;

        let source = match source {
            Source::Pixels(pixels) => Source::Pixels(pixels.into_owned()),
            Source::Histogram(histogram) => Source::Histogram(Cow::Owned(histogram.into_owned())),
        };

        PaletteBuilder { source, max_colors, filters }
    }

    /// Checks the arguments that were not validated on construction.
    fn validate(&self) -> Result<(), PaletteError> {
        match &self.source {
            Source::Histogram(histogram) if histogram.is_empty() => Err(PaletteError::EmptyHistogram),
            _ => Ok(()),
        }
    }

    /// Computes the [`Palette`] with the options set in this builder.
    ///
    /// # Errors
    /// Returns [`PaletteError::EmptyHistogram`] if the builder was created from an empty histogram.
    /// Pixel sources are validated when the [`PixelBuffer`] is created, so they never fail here.
    pub fn generate(&self) -> Result<Palette, PaletteError> {
        self.validate()?;

        let histogram = match &self.source {
            Source::Pixels(pixels) => Cow::Owned(ColorHistogram::new(pixels)),
            Source::Histogram(histogram) => Cow::Borrowed(&**histogram),
        };

        debug!(
            "generating palette from {} colors with max_colors = {} and {} filters",
            histogram.len(),
            self.max_colors,
            self.filters.len()
        );

        let swatches = quantizer::quantize(&histogram, self.max_colors, self.filters.as_slice());
        Ok(Palette::from_swatches(swatches))
    }
}

impl PaletteBuilder<'static> {
    /// Creates a new [`PaletteBuilder`] that owns the given histogram.
    #[must_use]
    pub fn from_owned_histogram(histogram: ColorHistogram) -> Self {
        Self::with_source(Source::Histogram(Cow::Owned(histogram)))
    }
}

impl<'a> fmt::Debug for PaletteBuilder<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaletteBuilder")
            .field("source", &self.source)
            .field("max_colors", &self.max_colors)
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Generates a [`Palette`] for packed `0xRRGGBB` pixels with the default filter.
///
/// This is a shortcut for [`PixelBuffer::new`] followed by [`PaletteBuilder::generate`].
///
/// # Errors
/// Returns an error if `max_colors` is `0` or if the pixels are invalid for the given dimensions.
/// `max_colors` is checked first.
///
/// # Examples
/// ```
/// # use colorcut::PaletteError;
/// let palette = colorcut::generate(&[0x4078B4; 16], 4, 4, 16)?;
/// assert_eq!(palette.swatches()[0].population(), 16);
///
/// assert_eq!(colorcut::generate(&[0x4078B4; 16], 4, 4, 0), Err(PaletteError::InvalidMaxColors(0)));
/// assert_eq!(colorcut::generate(&[], 0, 0, 16), Err(PaletteError::EmptyPixels));
/// # Ok::<(), PaletteError>(())
/// ```
pub fn generate(pixels: &[u32], width: u32, height: u32, max_colors: u32) -> Result<Palette, PaletteError> {
    let max_colors = PaletteSize::try_from(max_colors)?;
    let pixels = PixelBuffer::new(pixels, width, height)?;
    PaletteBuilder::new(pixels).max_colors(max_colors).generate()
}

/// A handle to a palette being generated on another thread.
///
/// See [`PaletteBuilder::generate_async`].
#[cfg(feature = "threads")]
#[derive(Debug, Clone)]
pub struct GenerateHandle {
    /// Set once delivery should no longer happen.
    cancelled: Arc<AtomicBool>,
}

#[cfg(feature = "threads")]
impl GenerateHandle {
    /// Prevents the callback from being called, if it has not been called already.
    ///
    /// The generation itself is not interrupted and runs to completion.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`GenerateHandle::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Passes `result` to `callback` unless delivery was cancelled.
/// Returns whether `callback` was called.
#[cfg(feature = "threads")]
fn deliver<T>(cancelled: &AtomicBool, result: T, callback: impl FnOnce(T)) -> bool {
    if cancelled.load(Ordering::Acquire) {
        debug!("palette generation was cancelled, dropping result");
        false
    } else {
        callback(result);
        true
    }
}

#[cfg(feature = "threads")]
impl PaletteBuilder<'static> {
    /// Computes the [`Palette`] on the [`rayon`] thread pool
    /// and passes the result to `callback` on that thread.
    ///
    /// Use [`PaletteBuilder::into_owned`] to get a builder that can be moved to another thread.
    ///
    /// # Errors
    /// The arguments are checked before any work is scheduled,
    /// returning the same errors as [`PaletteBuilder::generate`].
    pub fn generate_async<F>(self, callback: F) -> Result<GenerateHandle, PaletteError>
    where
        F: FnOnce(Result<Palette, PaletteError>) + Send + 'static,
    {
        self.validate()?;

        let cancelled = Arc::new(AtomicBool::new(false));
        let handle = GenerateHandle { cancelled: Arc::clone(&cancelled) };

        rayon::spawn(move || {
            let result = self.generate();
            deliver(&cancelled, result, callback);
        });

        Ok(handle)
    }
}

/// Images whose shortest side is larger than this are scaled down before quantizing.
#[cfg(feature = "image")]
pub const MIN_CALCULATE_DIMENSION: u32 = 100;

/// Scales `image` down so that its shortest side is [`MIN_CALCULATE_DIMENSION`],
/// keeping the aspect ratio and using nearest neighbor sampling.
///
/// Images that are already small enough are returned as is.
#[cfg(feature = "image")]
#[must_use]
pub fn downscale(image: &RgbImage) -> Cow<'_, RgbImage> {
    let (width, height) = image.dimensions();
    let min_dimension = width.min(height);

    if min_dimension <= MIN_CALCULATE_DIMENSION {
        return Cow::Borrowed(image);
    }

    let ratio = f64::from(MIN_CALCULATE_DIMENSION) / f64::from(min_dimension);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scale = |len: u32| ((f64::from(len) * ratio).round() as u32).max(1);

    debug!("scaling {width}x{height} image down by {ratio:.3}");

    Cow::Owned(imageops::resize(image, scale(width), scale(height), FilterType::Nearest))
}

#[cfg(feature = "image")]
impl PaletteBuilder<'static> {
    /// Creates a new [`PaletteBuilder`] for an image, scaling it down first with [`downscale`].
    ///
    /// # Errors
    /// Returns an error if the image has no pixels.
    pub fn from_rgbimage(image: &RgbImage) -> Result<Self, PaletteError> {
        let pixels = PixelBuffer::try_from(&*downscale(image))?;
        Ok(Self::new(pixels))
    }
}
