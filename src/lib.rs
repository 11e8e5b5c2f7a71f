//! A library for extracting prominent colors from an image.
//!
//! `colorcut` reduces the pixels of an image to a small set of distinct colors using a
//! volume-based color-cut quantizer (see [`quantizer`]), and then classifies those colors into
//! six profiles: vibrant, light vibrant, dark vibrant, muted, light muted, and dark muted
//! (see [`Palette`] and [`Profile`]).
//!
//! # Features
//! To reduce dependencies and compile times, `colorcut` has several `cargo` features
//! that can be turned off or on:
//! - `threads`: exposes [`PaletteBuilder::generate_async`], which runs on the [`rayon`] thread pool.
//! - `image`: enables integration with the [`image`] crate.
//!
//! # High-Level API
//! To get started, see [`PaletteBuilder`] or the [`generate`] shortcut:
//! ```
//! # use colorcut::{PaletteBuilder, PaletteSize, PixelBuffer};
//! # fn main() -> Result<(), colorcut::PaletteError> {
//! let pixels = vec![0x4078B4; 64];
//! let buffer = PixelBuffer::new(&pixels, 8, 8)?;
//!
//! let palette = PaletteBuilder::new(buffer)
//!     .max_colors(PaletteSize::try_from(24)?)
//!     .generate()?;
//!
//! assert_eq!(palette.swatches().len(), 1);
//! assert_eq!(palette.vibrant_color(0x000000), 0x4078B4);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod api;
mod error;
mod filter;
mod histogram;
mod profile;
mod swatch;
mod types;

pub mod quantizer;

pub use api::*;
pub use error::PaletteError;
pub use filter::*;
pub use histogram::ColorHistogram;
pub use profile::*;
pub use swatch::*;
pub use types::*;

/// The maximum supported image size in number of pixels is `u32::MAX`.
pub const MAX_PIXELS: u32 = u32::MAX;

/// The number of palette colors used when none is specified.
pub const DEFAULT_MAX_COLORS: u32 = 16;

#[cfg(test)]
pub(crate) mod tests {
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoroshiro128PlusPlus;

    /// Deterministic pseudo-random packed colors.
    pub fn test_pixels(len: usize) -> Vec<u32> {
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(42);
        (0..len).map(|_| rng.gen::<u32>() & 0x00FF_FFFF).collect()
    }

    pub fn test_data_1024() -> Vec<u32> {
        test_pixels(1024)
    }

    /// Pixels drawn from a handful of color clusters, so that most colors repeat.
    pub fn clustered_pixels(len: usize) -> Vec<u32> {
        const CENTERS: [[u8; 3]; 5] = [
            [200, 40, 60],
            [30, 90, 200],
            [60, 170, 80],
            [240, 200, 40],
            [120, 110, 130],
        ];

        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(7);
        (0..len)
            .map(|_| {
                let center = CENTERS[rng.gen_range(0..CENTERS.len())];
                let [r, g, b] = center.map(|c| c.saturating_add(rng.gen_range(0..8)));
                crate::pack_rgb([r, g, b])
            })
            .collect()
    }
}
