//! The color-cut quantizer.
//!
//! This is a variant of median cut that is tuned for picking out distinct colors
//! rather than representative ones. The colors of the histogram are treated as points in the
//! RGB cube, and the box with the greatest volume is repeatedly split at the midpoint of its
//! longest side. Median cut instead splits boxes so that each holds a similar population.
//! Splitting by volume divides the color space into distinct colors, so small but
//! visually distinct regions of an image survive quantization.
//!
//! The average color of each final box, weighted by population, becomes a [`Swatch`].

use crate::{unpack_rgb, ColorFilter, ColorHistogram, Hsl, PaletteSize, Swatch};
use log::debug;
use std::{cmp::Ordering, collections::BinaryHeap};

/// The number of color components.
const N: usize = 3;

/// The index of the blue component.
const BLUE: usize = 2;

/// A unique color and its population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    /// The red, green, and blue components.
    rgb: [u8; N],
    /// The number of pixels with this color.
    count: u32,
}

/// A tightly fitting box around a contiguous range of the color array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColorBox {
    /// The index of the first color (inclusive).
    lower: usize,
    /// The index of the last color (inclusive).
    upper: usize,
    /// The minimum value of each component over the range.
    min: [u8; N],
    /// The maximum value of each component over the range.
    max: [u8; N],
}

impl ColorBox {
    /// Creates a new [`ColorBox`] over `colors[lower..=upper]`.
    fn new(colors: &[Entry], lower: usize, upper: usize) -> Self {
        let mut color_box = Self { lower, upper, min: [0; N], max: [0; N] };
        color_box.fit(colors);
        color_box
    }

    /// Recomputes the bounds of this box to tightly fit its colors.
    fn fit(&mut self, colors: &[Entry]) {
        self.min = [u8::MAX; N];
        self.max = [u8::MIN; N];

        for entry in &colors[self.lower..=self.upper] {
            for c in 0..N {
                self.min[c] = self.min[c].min(entry.rgb[c]);
                self.max[c] = self.max[c].max(entry.rgb[c]);
            }
        }
    }

    /// The length of each side of the box.
    fn extents(&self) -> [u8; N] {
        std::array::from_fn(|c| self.max[c] - self.min[c])
    }

    /// The number of color values enclosed by the box.
    fn volume(&self) -> u32 {
        self.extents().iter().map(|&e| u32::from(e) + 1).product()
    }

    /// The number of colors in the box.
    fn num_colors(&self) -> usize {
        self.upper - self.lower + 1
    }

    /// Whether or not this box holds more than one color.
    fn can_split(&self) -> bool {
        self.num_colors() > 1
    }

    /// Returns the component with the longest side. Ties go to red, then green.
    fn longest_component(&self) -> usize {
        let [r, g, b] = self.extents();
        if r >= g && r >= b {
            0
        } else if g >= r && g >= b {
            1
        } else {
            BLUE
        }
    }

    /// Splits this box in two along its longest side.
    ///
    /// This box keeps the lower part and the upper part is returned.
    /// Both parts are non-empty, so the range of this box always shrinks.
    fn split(&mut self, colors: &mut [Entry]) -> Self {
        debug_assert!(self.can_split());

        let split = self.split_point(colors);
        let upper = Self::new(colors, split + 1, self.upper);

        self.upper = split;
        self.fit(colors);

        upper
    }

    /// Sorts the colors of this box along its longest side
    /// and returns the last index of the lower part.
    fn split_point(&self, colors: &mut [Entry]) -> usize {
        let c = self.longest_component();
        let range = &mut colors[self.lower..=self.upper];
        range.sort_unstable_by_key(|entry| sort_key(entry.rgb, c));

        #[allow(clippy::cast_possible_truncation)]
        let midpoint = ((u16::from(self.min[c]) + u16::from(self.max[c])) / 2) as u8;

        // The last color is never chosen, so the upper part is never empty.
        // Blue alone compares strictly against the midpoint.
        range[..range.len() - 1]
            .iter()
            .position(|entry| {
                if c == BLUE {
                    entry.rgb[c] > midpoint
                } else {
                    entry.rgb[c] >= midpoint
                }
            })
            .map_or(self.lower, |i| self.lower + i)
    }

    /// Returns the population-weighted average color of the box.
    fn average(&self, colors: &[Entry]) -> Swatch {
        let mut total = 0u64;
        let mut sums = [0u64; N];

        for &Entry { rgb, count } in &colors[self.lower..=self.upper] {
            let count = u64::from(count);
            total += count;
            for c in 0..N {
                sums[c] += count * u64::from(rgb[c]);
            }
        }

        debug_assert!(total > 0);
        let n = total.max(1);
        // integer division rounding half up
        #[allow(clippy::cast_possible_truncation)]
        let rgb = sums.map(|sum| ((sum + n / 2) / n) as u8);

        Swatch::new(rgb, u32::try_from(total).unwrap_or(u32::MAX))
    }
}

/// Orders the components of a color so that `component` is the most significant.
///
/// The other two components keep their relative order, matching a sort of the packed value
/// with the chosen component swapped into the high byte.
fn sort_key([r, g, b]: [u8; N], component: usize) -> [u8; N] {
    match component {
        0 => [r, g, b],
        1 => [g, r, b],
        _ => [b, g, r],
    }
}

/// A box and its volume, ordered by volume.
struct BoxVolume(ColorBox, u32);

impl BoxVolume {
    /// Wraps the given box with its volume.
    fn new(color_box: ColorBox) -> Self {
        let volume = color_box.volume();
        Self(color_box, volume)
    }
}

impl PartialOrd for BoxVolume {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BoxVolume {
    fn cmp(&self, other: &Self) -> Ordering {
        self.1.cmp(&other.1)
    }
}

impl Eq for BoxVolume {}

impl PartialEq for BoxVolume {
    fn eq(&self, other: &Self) -> bool {
        self.1 == other.1
    }
}

/// Splits `colors` into at most `k` boxes, always splitting the box with the largest volume.
///
/// `colors` must hold more than `k` colors.
fn boxes(colors: &mut [Entry], k: usize) -> Vec<ColorBox> {
    debug_assert!(colors.len() > k);

    let mut queue = BinaryHeap::with_capacity(k);
    queue.push(BoxVolume::new(ColorBox::new(colors, 0, colors.len() - 1)));

    while queue.len() < k {
        let Some(BoxVolume(mut box1, _)) = queue.pop() else {
            break;
        };

        // There are fewer boxes than colors, so some box holds two or more colors
        // and has a volume above 1, which puts it ahead of every single color box.
        debug_assert!(box1.can_split());

        let box2 = box1.split(colors);
        queue.push(BoxVolume::new(box1));
        queue.push(BoxVolume::new(box2));
    }

    queue.into_iter().map(|BoxVolume(color_box, _)| color_box).collect()
}

/// Computes the swatches for the given `histogram` with at most `max_colors` entries.
///
/// Colors rejected by `filter` are removed first. If the remaining colors number no more than
/// `max_colors`, each becomes its own swatch with its histogram population, in ascending color order.
/// Otherwise, the colors are split into boxes by volume and each box is averaged.
/// Averages rejected by `filter` are dropped, so fewer than `max_colors` swatches may be returned.
///
/// # Examples
/// ```
/// # use colorcut::{quantizer, ColorHistogram, DefaultFilter, PaletteSize};
/// let histogram = ColorHistogram::new(&[0xFFFFFF, 0x4078B4, 0x4078B4, 0xB44078]);
/// let swatches = quantizer::quantize(&histogram, PaletteSize::DEFAULT, &DefaultFilter);
///
/// // white is filtered out
/// assert_eq!(swatches.len(), 2);
/// assert_eq!(swatches[0].packed(), 0x4078B4);
/// assert_eq!(swatches[0].population(), 2);
/// ```
pub fn quantize<F>(histogram: &ColorHistogram, max_colors: PaletteSize, filter: &F) -> Vec<Swatch>
where
    F: ColorFilter + ?Sized,
{
    let mut colors = histogram
        .iter()
        .map(|(color, count)| Entry { rgb: unpack_rgb(color), count })
        .filter(|entry| filter.is_allowed(entry.rgb, Hsl::from_rgb(entry.rgb)))
        .collect::<Vec<_>>();

    let k = max_colors.as_usize();

    debug!(
        "{} of {} colors remain after filtering, max_colors = {k}",
        colors.len(),
        histogram.len()
    );

    if colors.len() <= k {
        return colors
            .into_iter()
            .map(|Entry { rgb, count }| Swatch::new(rgb, count))
            .collect();
    }

    let boxes = boxes(&mut colors, k);
    let num_boxes = boxes.len();

    let swatches = boxes
        .into_iter()
        .map(|color_box| color_box.average(&colors))
        .filter(|swatch| filter.is_allowed(swatch.rgb(), swatch.hsl()))
        .collect::<Vec<_>>();

    debug!(
        "split colors into {num_boxes} boxes, dropped {} filtered averages",
        num_boxes - swatches.len()
    );

    swatches
}
