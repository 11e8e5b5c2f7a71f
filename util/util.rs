#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use colorcut::{pack_rgb, ColorHistogram};
use image::{Rgb, RgbImage};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// If set, benchmarks load every image in this directory instead of the generated ones.
pub const IMAGE_DIR_VAR: &str = "COLORCUT_BENCH_IMAGES";

pub const WIDTH: u32 = 1280;
pub const HEIGHT: u32 = 720;

pub fn load_images(images: &[PathBuf]) -> Vec<(String, RgbImage)> {
    images
        .iter()
        .map(|path| {
            image::open(path).map(|image| {
                (
                    path.file_name().unwrap().to_owned().into_string().unwrap(),
                    image.into_rgb8(),
                )
            })
        })
        .collect::<Result<_, _>>()
        .expect("loaded each image")
}

pub fn load_image_dir(dir: impl AsRef<Path>) -> Vec<(String, RgbImage)> {
    let mut paths = std::fs::read_dir(dir)
        .expect("read img directory")
        .collect::<Result<Vec<_>, _>>()
        .expect("read each file")
        .iter()
        .map(std::fs::DirEntry::path)
        .collect::<Vec<_>>();

    paths.sort();

    load_images(&paths)
}

/// A smooth gradient, so nearly every pixel is a distinct color.
fn gradient() -> RgbImage {
    RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        Rgb([
            (x * 255 / WIDTH) as u8,
            (y * 255 / HEIGHT) as u8,
            ((x + y) * 255 / (WIDTH + HEIGHT)) as u8,
        ])
    })
}

/// Uniform random colors.
fn noise() -> RgbImage {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
    RgbImage::from_fn(WIDTH, HEIGHT, |_, _| Rgb(rng.gen()))
}

/// Horizontal bands of a few colors with slight noise, like a photo with flat regions.
fn bands() -> RgbImage {
    const COLORS: [[u8; 3]; 6] = [
        [64, 120, 180],
        [20, 40, 70],
        [200, 60, 40],
        [230, 220, 200],
        [90, 140, 60],
        [150, 150, 160],
    ];

    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(1);
    RgbImage::from_fn(WIDTH, HEIGHT, |_, y| {
        let color = COLORS[(y * COLORS.len() as u32 / HEIGHT) as usize];
        Rgb(color.map(|c| c.saturating_add(rng.gen_range(0..16))))
    })
}

pub fn generated_images() -> Vec<(String, RgbImage)> {
    vec![
        ("gradient".to_owned(), gradient()),
        ("noise".to_owned(), noise()),
        ("bands".to_owned(), bands()),
    ]
}

static BENCH_IMAGES: OnceLock<Vec<(String, RgbImage)>> = OnceLock::new();

pub fn bench_images() -> &'static [(String, RgbImage)] {
    BENCH_IMAGES.get_or_init(|| match std::env::var_os(IMAGE_DIR_VAR) {
        Some(dir) => load_image_dir(dir),
        None => generated_images(),
    })
}

pub fn to_pixels(images: &[(String, RgbImage)]) -> Vec<(String, Vec<u32>)> {
    images
        .iter()
        .map(|(name, image)| (name.clone(), image.pixels().map(|&Rgb(rgb)| pack_rgb(rgb)).collect()))
        .collect()
}

pub fn to_histograms(images: &[(String, RgbImage)]) -> Vec<(String, ColorHistogram)> {
    to_pixels(images)
        .into_iter()
        .map(|(name, pixels)| (name, ColorHistogram::new(&pixels)))
        .collect()
}
