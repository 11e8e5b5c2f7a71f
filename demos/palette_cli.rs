#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::path::PathBuf;

use clap::Parser;
use colorcut::{downscale, Palette, PaletteBuilder, PaletteSize, PixelBuffer, Profile};
use image::{Rgb, RgbImage};

#[derive(Parser)]
pub struct Options {
    /// The maximum number of swatches.
    #[arg(short, long, default_value_t = PaletteSize::default(), value_parser = parse_palette_size)]
    k: PaletteSize,

    /// Keep near black, near white, and skin tone colors.
    #[arg(long)]
    no_filter: bool,

    /// Quantize the image at full size instead of scaling it down first.
    #[arg(long)]
    full_size: bool,

    /// Run generation on the thread pool and wait for the callback.
    #[arg(long)]
    background: bool,

    /// Print how long each step took.
    #[arg(long)]
    verbose: bool,

    input: PathBuf,

    /// Writes an image with one bar per profile, followed by one bar per swatch.
    output: Option<PathBuf>,
}

fn parse_palette_size(s: &str) -> Result<PaletteSize, String> {
    let value: u32 = s.parse().map_err(|e| format!("{e}"))?;
    value.try_into().map_err(|e| format!("{e}"))
}

/// The height in pixels of the swatch strip.
const STRIP_HEIGHT: u32 = 64;

/// The width in pixels of each bar in the swatch strip.
const BAR_WIDTH: u32 = 48;

fn main() {
    let Options {
        k,
        no_filter,
        full_size,
        background,
        verbose,
        input,
        output,
    } = Options::parse();

    env_logger::init();

    macro_rules! log {
        ($name: literal, $val: expr) => {
            if verbose {
                let time = std::time::Instant::now();
                let value = $val;
                println!("{} took {}ms", $name, time.elapsed().as_millis());
                value
            } else {
                $val
            }
        };
    }

    let image = log!("read image", image::open(input).unwrap().into_rgb8());

    let image = if full_size {
        image
    } else {
        log!("downscale", downscale(&image).into_owned())
    };

    let pixels = PixelBuffer::try_from(&image).unwrap();
    let mut builder = PaletteBuilder::new(pixels).max_colors(k);
    if no_filter {
        builder = builder.clear_filters();
    }

    let palette = if background {
        let (sender, receiver) = std::sync::mpsc::channel();
        log!("generate (background)", {
            builder
                .generate_async(move |result| sender.send(result).unwrap())
                .unwrap();
            receiver.recv().unwrap().unwrap()
        })
    } else {
        log!("generate", builder.generate().unwrap())
    };

    for profile in Profile::ALL {
        match palette.swatch(profile) {
            Some(swatch) if palette.is_synthesized(profile) => {
                println!("{profile:>13}: {swatch} (synthesized)");
            }
            Some(swatch) => println!("{profile:>13}: {swatch}"),
            None => println!("{profile:>13}: -"),
        }
    }

    println!();
    for swatch in palette.swatches() {
        println!("{swatch}");
    }

    if let Some(output) = output {
        log!("write image", swatch_strip(&palette).save(output).unwrap());
    }
}

/// Draws each profile and then each swatch as a vertical bar. Empty profiles are gray.
fn swatch_strip(palette: &Palette) -> RgbImage {
    let colors = Profile::ALL
        .into_iter()
        .map(|profile| palette.color(profile, 0x808080))
        .chain(palette.swatches().iter().map(colorcut::Swatch::packed))
        .map(colorcut::unpack_rgb)
        .collect::<Vec<_>>();

    #[allow(clippy::cast_possible_truncation)]
    let width = colors.len() as u32 * BAR_WIDTH;

    RgbImage::from_fn(width, STRIP_HEIGHT, |x, _| Rgb(colors[(x / BAR_WIDTH) as usize]))
}
