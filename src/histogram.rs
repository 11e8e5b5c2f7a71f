//! Contains the code for pixel deduplication into a color histogram.

use crate::{pack_rgb, unpack_rgb, PaletteError, MAX_PIXELS};
use bitvec::vec::BitVec;
use log::trace;
use std::ops::Range;

/// A byte-sized Radix
const RADIX: usize = u8::MAX as usize + 1;

/// Returns the range associated with the `i`-th chunk.
#[inline]
fn chunk_range(chunks: &[u32], i: usize) -> Range<usize> {
    (chunks[i] as usize)..(chunks[i + 1] as usize)
}

/// Computes the prefix sum of the array in place.
#[inline]
fn prefix_sum<const M: usize>(counts: &mut [u32; M]) {
    for i in 1..M {
        counts[i] += counts[i - 1];
    }
}

/// Returns an error if `len` pixels is more than [`MAX_PIXELS`].
fn check_len(len: usize) -> Result<(), PaletteError> {
    let len = len as u64;
    if len > u64::from(MAX_PIXELS) {
        Err(PaletteError::TooManyPixels(len))
    } else {
        Ok(())
    }
}

/// Deduplicated packed colors and their populations.
///
/// The colors are unique and sorted in ascending order of their packed `0xRRGGBB` value,
/// and every population is non-zero.
/// The sum of the populations is equal to the number of pixels the histogram was built from.
///
/// # Examples
/// ```
/// # use colorcut::ColorHistogram;
/// let histogram = ColorHistogram::new(&[0x0000FF, 0xFF0000, 0x0000FF]);
/// assert_eq!(histogram.colors(), &[0x0000FF, 0xFF0000]);
/// assert_eq!(histogram.counts(), &[2, 1]);
/// assert_eq!(histogram.population(0x0000FF), Some(2));
/// assert_eq!(histogram.population(0x00FF00), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorHistogram {
    /// The unique colors.
    colors: Vec<u32>,
    /// The number of times each color was present.
    counts: Vec<u32>,
    /// The sum of `counts`.
    total_count: u64,
}

impl ColorHistogram {
    /// Creates a new [`ColorHistogram`] from a slice of packed `0xRRGGBB` pixels.
    ///
    /// Bits above the low 24 of each pixel are ignored.
    ///
    /// # Panics
    /// Panics if there are more than [`MAX_PIXELS`] pixels.
    /// Use [`ColorHistogram::try_from`] to get an error instead,
    /// or validate the pixels up front with a [`PixelBuffer`](crate::PixelBuffer).
    #[must_use]
    pub fn new(pixels: &[u32]) -> Self {
        assert!(
            check_len(pixels.len()).is_ok(),
            "cannot count more than {MAX_PIXELS} pixels"
        );
        Self::new_unchecked(pixels)
    }

    /// Counts `pixels`, which must not hold more than [`MAX_PIXELS`] pixels.
    fn new_unchecked(pixels: &[u32]) -> Self {
        if pixels.is_empty() {
            return Self::default();
        }

        #[allow(clippy::cast_possible_truncation)]
        let total_count = pixels.len() as u32;

        let mut colors = Vec::new();
        let mut counts = Vec::new();
        let mut green_blue = vec![[0; 2]; pixels.len()];

        let mut lower_counts = vec![[0u32; RADIX]; RADIX];
        let mut bitmask: BitVec = BitVec::repeat(false, RADIX * RADIX);

        let mut red_prefix = [0u32; RADIX + 1];
        for &pixel in pixels {
            let [r, ..] = unpack_rgb(pixel);
            red_prefix[usize::from(r)] += 1;
        }
        prefix_sum(&mut red_prefix);

        for &pixel in pixels {
            let [r, g, b] = unpack_rgb(pixel);
            let r = usize::from(r);
            let j = red_prefix[r] - 1;
            green_blue[j as usize] = [g, b];
            red_prefix[r] = j;
        }
        red_prefix[RADIX] = total_count;

        for r in 0..RADIX {
            let chunk = chunk_range(&red_prefix, r);

            if !chunk.is_empty() {
                let green_blue = &green_blue[chunk.clone()];
                #[allow(clippy::cast_possible_truncation)]
                let r = r as u8;

                if chunk.len() < RADIX * RADIX / 4 {
                    for gb in green_blue {
                        let [g, b] = gb.map(usize::from);
                        lower_counts[g][b] += 1;
                        bitmask.set(g * RADIX + b, true);
                    }

                    for i in bitmask.iter_ones() {
                        let g = i / RADIX;
                        let b = i % RADIX;
                        #[allow(clippy::cast_possible_truncation)]
                        let color = pack_rgb([r, g as u8, b as u8]);
                        colors.push(color);
                        counts.push(lower_counts[g][b]);
                        lower_counts[g][b] = 0;
                    }

                    bitmask.fill(false);
                } else {
                    for &[g, b] in green_blue {
                        lower_counts[usize::from(g)][usize::from(b)] += 1;
                    }

                    for (g, row) in lower_counts.iter_mut().enumerate() {
                        for (b, count) in row.iter_mut().enumerate() {
                            if *count > 0 {
                                #[allow(clippy::cast_possible_truncation)]
                                let color = pack_rgb([r, g as u8, b as u8]);
                                colors.push(color);
                                counts.push(*count);
                                *count = 0;
                            }
                        }
                    }
                }
            }
        }

        trace!("built histogram of {} colors from {total_count} pixels", colors.len());

        Self {
            colors,
            counts,
            total_count: total_count.into(),
        }
    }

    /// Creates a new [`ColorHistogram`] from pre-computed `(color, population)` pairs.
    ///
    /// The pairs may be in any order. Bits above the low 24 of each color are ignored,
    /// duplicate colors have their populations summed (saturating at `u32::MAX`),
    /// and pairs with a population of `0` are dropped.
    ///
    /// # Examples
    /// ```
    /// # use colorcut::ColorHistogram;
    /// let histogram = ColorHistogram::from_counts([(0xFF0000, 3), (0x0000FF, 1), (0xFF0000, 2), (0x00FF00, 0)]);
    /// assert_eq!(histogram.colors(), &[0x0000FF, 0xFF0000]);
    /// assert_eq!(histogram.counts(), &[1, 5]);
    /// assert_eq!(histogram.total_count(), 6);
    /// ```
    #[must_use]
    pub fn from_counts(entries: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut entries = entries
            .into_iter()
            .filter(|&(_, count)| count > 0)
            .map(|(color, count)| (color & 0x00FF_FFFF, count))
            .collect::<Vec<_>>();

        entries.sort_unstable_by_key(|&(color, _)| color);

        let mut colors: Vec<u32> = Vec::with_capacity(entries.len());
        let mut counts: Vec<u32> = Vec::with_capacity(entries.len());
        for (color, count) in entries {
            if colors.last() == Some(&color) {
                if let Some(total) = counts.last_mut() {
                    *total = total.saturating_add(count);
                }
            } else {
                colors.push(color);
                counts.push(count);
            }
        }

        let total_count = counts.iter().copied().map(u64::from).sum();

        Self { colors, counts, total_count }
    }

    /// Returns the slice of unique colors in ascending order.
    #[must_use]
    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    /// Returns the population of each color in [`ColorHistogram::colors`].
    #[must_use]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Returns the number of pixels represented by the histogram.
    ///
    /// This is equal to the sum of [`ColorHistogram::counts`].
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Returns the number of unique colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether or not the histogram has no colors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Returns the population of the given packed color, or `None` if it is not present.
    #[must_use]
    pub fn population(&self, color: u32) -> Option<u32> {
        self.colors
            .binary_search(&(color & 0x00FF_FFFF))
            .ok()
            .map(|i| self.counts[i])
    }

    /// Returns an iterator over each `(color, population)` pair in ascending color order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.colors.iter().copied().zip(self.counts.iter().copied())
    }
}

impl TryFrom<&[u32]> for ColorHistogram {
    type Error = PaletteError;

    fn try_from(pixels: &[u32]) -> Result<Self, Self::Error> {
        check_len(pixels.len())?;
        Ok(Self::new_unchecked(pixels))
    }
}
