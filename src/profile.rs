//! Selection of the swatches that best fill each [`Profile`].

use crate::{Hsl, Swatch};
use log::debug;
use ordered_float::OrderedFloat;
use std::{
    cmp::Reverse,
    fmt::{self, Display},
};

/// The lightness targeted by the dark profiles.
const TARGET_DARK_LIGHTNESS: f32 = 0.26;
/// The maximum lightness of the dark profiles.
const MAX_DARK_LIGHTNESS: f32 = 0.45;

/// The minimum lightness of the light profiles.
const MIN_LIGHT_LIGHTNESS: f32 = 0.55;
/// The lightness targeted by the light profiles.
const TARGET_LIGHT_LIGHTNESS: f32 = 0.74;

/// The minimum lightness of the normal profiles.
const MIN_NORMAL_LIGHTNESS: f32 = 0.3;
/// The lightness targeted by the normal profiles.
const TARGET_NORMAL_LIGHTNESS: f32 = 0.5;
/// The maximum lightness of the normal profiles.
const MAX_NORMAL_LIGHTNESS: f32 = 0.7;

/// The saturation targeted by the muted profiles.
const TARGET_MUTED_SATURATION: f32 = 0.3;
/// The maximum saturation of the muted profiles.
const MAX_MUTED_SATURATION: f32 = 0.4;

/// The saturation targeted by the vibrant profiles.
const TARGET_VIBRANT_SATURATION: f32 = 1.0;
/// The minimum saturation of the vibrant profiles.
const MIN_VIBRANT_SATURATION: f32 = 0.35;

/// The weight of saturation closeness in [`Target::score`].
const WEIGHT_SATURATION: f32 = 3.0;
/// The weight of lightness closeness in [`Target::score`].
const WEIGHT_LIGHTNESS: f32 = 6.5;
/// The weight of relative population in [`Target::score`].
const WEIGHT_POPULATION: f32 = 0.5;

/// The lightness given to a vibrant swatch synthesized from the dark vibrant swatch.
const SYNTHESIZED_VIBRANT_LIGHTNESS: f32 = TARGET_NORMAL_LIGHTNESS;
/// The lightness given to a dark vibrant swatch synthesized from the vibrant swatch.
const SYNTHESIZED_DARK_VIBRANT_LIGHTNESS: f32 = TARGET_DARK_LIGHTNESS;

/// The ranges of lightness and saturation a swatch must lie in to fill a [`Profile`],
/// and the values a swatch should ideally have.
///
/// All ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// The ideal lightness.
    pub lightness: f32,
    /// The minimum lightness.
    pub min_lightness: f32,
    /// The maximum lightness.
    pub max_lightness: f32,
    /// The ideal saturation.
    pub saturation: f32,
    /// The minimum saturation.
    pub min_saturation: f32,
    /// The maximum saturation.
    pub max_saturation: f32,
}

impl Target {
    /// Whether the given color lies within the lightness and saturation ranges of this target.
    #[must_use]
    pub fn contains(&self, hsl: Hsl) -> bool {
        (self.min_saturation..=self.max_saturation).contains(&hsl.saturation)
            && (self.min_lightness..=self.max_lightness).contains(&hsl.lightness)
    }

    /// Scores how well a color with the given population matches this target.
    ///
    /// The score is the weighted mean of the closeness of the saturation to the target,
    /// the closeness of the lightness to the target,
    /// and the population relative to `highest_population`.
    /// Each of these terms is in the range `[0, 1]`, and so is the score.
    /// A `highest_population` of `0` makes the population term `0`.
    #[must_use]
    pub fn score(&self, hsl: Hsl, population: u32, highest_population: u32) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let population = if highest_population == 0 {
            0.0
        } else {
            population as f32 / highest_population as f32
        };

        let terms = [
            (invert_diff(hsl.saturation, self.saturation), WEIGHT_SATURATION),
            (invert_diff(hsl.lightness, self.lightness), WEIGHT_LIGHTNESS),
            (population, WEIGHT_POPULATION),
        ];

        let (sum, total_weight) = terms
            .iter()
            .fold((0.0, 0.0), |(sum, total), &(value, weight)| (sum + value * weight, total + weight));

        sum / total_weight
    }
}

/// Returns `1` when `value` equals `target`, falling towards `0` as they diverge.
fn invert_diff(value: f32, target: f32) -> f32 {
    1.0 - (value - target).abs()
}

/// One of the six color roles that a [`Palette`] tries to fill.
///
/// Profiles are resolved in the order of [`Profile::ALL`],
/// and a swatch chosen for one profile is not considered for later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Profile {
    /// A saturated color of normal lightness.
    Vibrant,
    /// A saturated light color.
    LightVibrant,
    /// A saturated dark color.
    DarkVibrant,
    /// A desaturated color of normal lightness.
    Muted,
    /// A desaturated light color.
    LightMuted,
    /// A desaturated dark color.
    DarkMuted,
}

impl Profile {
    /// Every profile in resolution order.
    pub const ALL: [Self; 6] = [
        Self::Vibrant,
        Self::LightVibrant,
        Self::DarkVibrant,
        Self::Muted,
        Self::LightMuted,
        Self::DarkMuted,
    ];

    /// The position of this profile in [`Profile::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the kebab-case name of this profile.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vibrant => "vibrant",
            Self::LightVibrant => "light-vibrant",
            Self::DarkVibrant => "dark-vibrant",
            Self::Muted => "muted",
            Self::LightMuted => "light-muted",
            Self::DarkMuted => "dark-muted",
        }
    }

    /// Returns the [`Target`] a swatch is matched against for this profile.
    #[must_use]
    pub const fn target(self) -> Target {
        let (lightness, min_lightness, max_lightness) = match self {
            Self::Vibrant | Self::Muted => {
                (TARGET_NORMAL_LIGHTNESS, MIN_NORMAL_LIGHTNESS, MAX_NORMAL_LIGHTNESS)
            }
            Self::LightVibrant | Self::LightMuted => (TARGET_LIGHT_LIGHTNESS, MIN_LIGHT_LIGHTNESS, 1.0),
            Self::DarkVibrant | Self::DarkMuted => (TARGET_DARK_LIGHTNESS, 0.0, MAX_DARK_LIGHTNESS),
        };

        let (saturation, min_saturation, max_saturation) = match self {
            Self::Vibrant | Self::LightVibrant | Self::DarkVibrant => {
                (TARGET_VIBRANT_SATURATION, MIN_VIBRANT_SATURATION, 1.0)
            }
            Self::Muted | Self::LightMuted | Self::DarkMuted => {
                (TARGET_MUTED_SATURATION, 0.0, MAX_MUTED_SATURATION)
            }
        };

        Target {
            lightness,
            min_lightness,
            max_lightness,
            saturation,
            min_saturation,
            max_saturation,
        }
    }
}

impl Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// How a profile was filled.
#[derive(Debug, Clone, PartialEq)]
enum Slot {
    /// The swatch at this index of the swatch list.
    Selected(usize),
    /// A swatch derived from another profile, which is not part of the swatch list.
    Synthesized(Swatch),
}

/// The swatches of an image and the swatch chosen for each [`Profile`].
///
/// # Examples
/// ```
/// # use colorcut::{Palette, Profile, Swatch};
/// let palette = Palette::from_swatches(vec![
///     Swatch::new([0x40, 0x78, 0xB4], 10),
///     Swatch::new([0xC8, 0xD0, 0xD8], 5),
/// ]);
///
/// assert_eq!(palette.vibrant_color(0), 0x4078B4);
/// assert_eq!(palette.light_muted_color(0), 0xC8D0D8);
/// assert_eq!(palette.muted(), None);
///
/// // synthesized from the vibrant swatch
/// assert!(palette.is_synthesized(Profile::DarkVibrant));
/// assert_eq!(palette.dark_vibrant().map(|s| s.population()), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// The swatches in quantizer output order.
    swatches: Vec<Swatch>,
    /// The largest population of any swatch.
    highest_population: u32,
    /// The slot of each profile, indexed by [`Profile::index`].
    slots: [Option<Slot>; 6],
}

impl Palette {
    /// Creates a new [`Palette`] by choosing a swatch for each profile.
    ///
    /// Each profile takes the best scoring swatch within its [`Target`] ranges
    /// that has not been taken by an earlier profile. Ties go to the earlier swatch.
    /// Then, if exactly one of the vibrant and dark vibrant profiles is filled,
    /// the other is synthesized from it by changing its lightness.
    #[must_use]
    pub fn from_swatches(swatches: Vec<Swatch>) -> Self {
        let highest_population = swatches.iter().map(Swatch::population).max().unwrap_or(0);

        let mut palette = Self {
            swatches,
            highest_population,
            slots: Default::default(),
        };

        for profile in Profile::ALL {
            if let Some(i) = palette.find_swatch(profile.target()) {
                debug!("selected {} for {profile}", palette.swatches[i]);
                palette.slots[profile.index()] = Some(Slot::Selected(i));
            }
        }

        palette.synthesize_missing();
        palette
    }

    /// Whether the swatch at index `i` already fills a profile.
    fn is_selected(&self, i: usize) -> bool {
        self.slots.iter().any(|slot| *slot == Some(Slot::Selected(i)))
    }

    /// Returns the index of the best swatch for `target` that is not already selected.
    fn find_swatch(&self, target: Target) -> Option<usize> {
        self.swatches
            .iter()
            .enumerate()
            .filter(|&(i, swatch)| target.contains(swatch.hsl()) && !self.is_selected(i))
            .map(|(i, swatch)| {
                (i, target.score(swatch.hsl(), swatch.population(), self.highest_population))
            })
            .max_by_key(|&(i, score)| (OrderedFloat(score), Reverse(i)))
            .map(|(i, _)| i)
    }

    /// Fills an empty vibrant or dark vibrant profile from the other one.
    fn synthesize_missing(&mut self) {
        let pairs = [
            (Profile::Vibrant, Profile::DarkVibrant, SYNTHESIZED_VIBRANT_LIGHTNESS),
            (Profile::DarkVibrant, Profile::Vibrant, SYNTHESIZED_DARK_VIBRANT_LIGHTNESS),
        ];

        for (missing, source, lightness) in pairs {
            if self.slots[missing.index()].is_some() {
                continue;
            }

            if let Some(swatch) = self.swatch(source) {
                let swatch = Swatch::from_hsl(swatch.hsl().with_lightness(lightness), 0);
                debug!("synthesized {swatch} for {missing} from {source}");
                self.slots[missing.index()] = Some(Slot::Synthesized(swatch));
            }
        }
    }

    /// Returns the swatches in the order the quantizer produced them.
    ///
    /// Synthesized swatches are not included.
    #[must_use]
    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    /// Consumes the palette, returning its swatches.
    #[must_use]
    pub fn into_swatches(self) -> Vec<Swatch> {
        self.swatches
    }

    /// Returns the largest population of any swatch, or `0` if there are no swatches.
    #[must_use]
    pub fn highest_population(&self) -> u32 {
        self.highest_population
    }

    /// Returns the swatch that fills the given profile, if any.
    #[must_use]
    pub fn swatch(&self, profile: Profile) -> Option<&Swatch> {
        match self.slots[profile.index()].as_ref()? {
            Slot::Selected(i) => self.swatches.get(*i),
            Slot::Synthesized(swatch) => Some(swatch),
        }
    }

    /// Returns the packed `0xRRGGBB` color of the given profile, or `default` if it is not filled.
    #[must_use]
    pub fn color(&self, profile: Profile, default: u32) -> u32 {
        self.swatch(profile).map_or(default, Swatch::packed)
    }

    /// Whether the given profile was filled by synthesis
    /// rather than by a swatch from [`Palette::swatches`].
    #[must_use]
    pub fn is_synthesized(&self, profile: Profile) -> bool {
        matches!(self.slots[profile.index()], Some(Slot::Synthesized(_)))
    }

    /// Returns an iterator over each filled profile and its swatch in resolution order.
    pub fn profiles(&self) -> impl Iterator<Item = (Profile, &Swatch)> + '_ {
        Profile::ALL
            .into_iter()
            .filter_map(|profile| self.swatch(profile).map(|swatch| (profile, swatch)))
    }
}

/// Generates a swatch accessor and a color accessor for each profile.
macro_rules! profile_accessors {
    ($($profile: ident => $swatch: ident, $color: ident;)*) => {
        impl Palette {
            $(
                #[doc = concat!("Returns the [`Profile::", stringify!($profile), "`] swatch, if any.")]
                #[must_use]
                pub fn $swatch(&self) -> Option<&Swatch> {
                    self.swatch(Profile::$profile)
                }

                #[doc = concat!(
                    "Returns the packed color of the [`Profile::",
                    stringify!($profile),
                    "`] swatch, or `default` if there is none."
                )]
                #[must_use]
                pub fn $color(&self, default: u32) -> u32 {
                    self.color(Profile::$profile, default)
                }
            )*
        }
    };
}

profile_accessors! {
    Vibrant => vibrant, vibrant_color;
    LightVibrant => light_vibrant, light_vibrant_color;
    DarkVibrant => dark_vibrant, dark_vibrant_color;
    Muted => muted, muted_color;
    LightMuted => light_muted, light_muted_color;
    DarkMuted => dark_muted, dark_muted_color;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{quantizer, tests::*, ColorHistogram, DefaultFilter, PaletteSize};

    const FALLBACK: u32 = 0x123456;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 0.01,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn target_table() {
        let vibrant = Profile::Vibrant.target();
        assert_eq!((vibrant.lightness, vibrant.min_lightness, vibrant.max_lightness), (0.5, 0.3, 0.7));
        assert_eq!((vibrant.saturation, vibrant.min_saturation, vibrant.max_saturation), (1.0, 0.35, 1.0));

        let light_vibrant = Profile::LightVibrant.target();
        assert_eq!(
            (light_vibrant.lightness, light_vibrant.min_lightness, light_vibrant.max_lightness),
            (0.74, 0.55, 1.0)
        );

        let dark_vibrant = Profile::DarkVibrant.target();
        assert_eq!(
            (dark_vibrant.lightness, dark_vibrant.min_lightness, dark_vibrant.max_lightness),
            (0.26, 0.0, 0.45)
        );

        for profile in [Profile::Muted, Profile::LightMuted, Profile::DarkMuted] {
            let muted = profile.target();
            assert_eq!((muted.saturation, muted.min_saturation, muted.max_saturation), (0.3, 0.0, 0.4));
        }

        assert_eq!(Profile::Muted.target().lightness, 0.5);
        assert_eq!(Profile::LightMuted.target().lightness, 0.74);
        assert_eq!(Profile::DarkMuted.target().lightness, 0.26);
    }

    #[test]
    fn profile_order_and_names() {
        for (i, profile) in Profile::ALL.into_iter().enumerate() {
            assert_eq!(profile.index(), i);
        }
        assert_eq!(Profile::LightVibrant.to_string(), "light-vibrant");
        assert_eq!(Profile::DarkMuted.name(), "dark-muted");
    }

    #[test]
    fn target_bounds_are_inclusive() {
        let target = Profile::Muted.target();
        assert!(target.contains(Hsl::new(0.0, 0.4, 0.3)));
        assert!(target.contains(Hsl::new(0.0, 0.0, 0.7)));
        assert!(!target.contains(Hsl::new(0.0, 0.41, 0.5)));
        assert!(!target.contains(Hsl::new(0.0, 0.2, 0.71)));
    }

    #[test]
    fn score_weights() {
        let target = Profile::Vibrant.target();
        assert_close(target.score(Hsl::new(0.0, 1.0, 0.5), 10, 10), 1.0);
        // (3 * 1 + 6.5 * 1 + 0.5 * 0) / 10
        assert_close(target.score(Hsl::new(0.0, 1.0, 0.5), 0, 10), 0.95);
        // (3 * 0.5 + 6.5 * 1 + 0.5 * 1) / 10
        assert_close(target.score(Hsl::new(0.0, 0.5, 0.5), 10, 10), 0.85);
        // (3 * 1 + 6.5 * 0.8 + 0.5 * 0.5) / 10
        assert_close(target.score(Hsl::new(0.0, 1.0, 0.3), 5, 10), 0.845);

        assert_close(target.score(Hsl::new(0.0, 1.0, 0.5), 0, 0), 0.95);
    }

    #[test]
    fn no_swatches() {
        let palette = Palette::from_swatches(Vec::new());
        assert!(palette.swatches().is_empty());
        assert_eq!(palette.highest_population(), 0);
        for profile in Profile::ALL {
            assert_eq!(palette.swatch(profile), None);
            assert_eq!(palette.color(profile, FALLBACK), FALLBACK);
            assert!(!palette.is_synthesized(profile));
        }
        assert_eq!(palette.vibrant_color(FALLBACK), FALLBACK);
        assert_eq!(palette.dark_muted_color(FALLBACK), FALLBACK);
        assert_eq!(palette.profiles().count(), 0);
    }

    #[test]
    fn synthesizes_dark_vibrant() {
        let palette = Palette::from_swatches(vec![Swatch::from_packed(0x4078B4, 64)]);

        let vibrant = palette.vibrant().unwrap();
        assert!(std::ptr::eq(vibrant, &palette.swatches()[0]));
        assert!(!palette.is_synthesized(Profile::Vibrant));

        let dark_vibrant = palette.dark_vibrant().unwrap();
        assert!(palette.is_synthesized(Profile::DarkVibrant));
        assert_eq!(dark_vibrant.population(), 0);
        assert_close(dark_vibrant.hsl().lightness, 0.26);
        // rounding to sRGB perturbs the saturation of dark colors more
        assert!((dark_vibrant.hsl().saturation - vibrant.hsl().saturation).abs() < 0.02);

        for profile in [Profile::LightVibrant, Profile::Muted, Profile::LightMuted, Profile::DarkMuted] {
            assert_eq!(palette.swatch(profile), None);
        }
    }

    #[test]
    fn synthesizes_vibrant() {
        let palette = Palette::from_swatches(vec![Swatch::new([6, 83, 121], 100)]);

        let dark_vibrant = palette.dark_vibrant().unwrap();
        assert_eq!(dark_vibrant.rgb(), [6, 83, 121]);
        assert!(!palette.is_synthesized(Profile::DarkVibrant));

        let vibrant = palette.vibrant().unwrap();
        assert!(palette.is_synthesized(Profile::Vibrant));
        assert_eq!(vibrant.population(), 0);
        assert_close(vibrant.hsl().lightness, 0.5);
        assert!((vibrant.hsl().hue - dark_vibrant.hsl().hue).abs() < 1.0);

        // synthesized swatches are not added to the swatch list
        assert_eq!(palette.swatches().len(), 1);
        assert_eq!(palette.profiles().count(), 2);
    }

    #[test]
    fn earlier_profiles_take_precedence() {
        // eligible for both vibrant and light vibrant
        let palette = Palette::from_swatches(vec![Swatch::from_hsl(Hsl::new(200.0, 0.9, 0.6), 100)]);
        assert!(palette.vibrant().is_some());
        assert!(!palette.is_synthesized(Profile::Vibrant));
        assert_eq!(palette.light_vibrant(), None);
    }

    #[test]
    fn best_score_wins() {
        let palette = Palette::from_swatches(vec![
            Swatch::new([255, 77, 77], 10),
            Swatch::new([255, 0, 0], 10),
        ]);

        assert_eq!(palette.vibrant().unwrap().rgb(), [255, 0, 0]);
        assert_eq!(palette.light_vibrant().unwrap().rgb(), [255, 77, 77]);
    }

    #[test]
    fn ties_go_to_first_swatch() {
        let palette = Palette::from_swatches(vec![
            Swatch::from_packed(0x4078B4, 10),
            Swatch::from_packed(0x4078B4, 10),
        ]);

        assert!(std::ptr::eq(palette.vibrant().unwrap(), &palette.swatches()[0]));
        assert_eq!(palette.slots[Profile::Vibrant.index()], Some(Slot::Selected(0)));
    }

    #[test]
    fn profiles_are_exclusive() {
        let histogram = ColorHistogram::new(&test_data_1024());
        for k in [4, 16, 64] {
            let swatches = quantizer::quantize(&histogram, PaletteSize::try_from(k).unwrap(), &DefaultFilter);
            let palette = Palette::from_swatches(swatches);

            let mut selected = palette
                .slots
                .iter()
                .filter_map(|slot| match slot {
                    Some(Slot::Selected(i)) => Some(*i),
                    _ => None,
                })
                .collect::<Vec<_>>();

            let len = selected.len();
            selected.sort_unstable();
            selected.dedup();
            assert_eq!(selected.len(), len);

            for (profile, swatch) in palette.profiles() {
                if !palette.is_synthesized(profile) {
                    assert!(profile.target().contains(swatch.hsl()));
                }
            }
        }
    }

    #[test]
    fn deterministic() {
        let histogram = ColorHistogram::new(&clustered_pixels(4096));
        let swatches = quantizer::quantize(&histogram, PaletteSize::DEFAULT, &DefaultFilter);
        assert_eq!(
            Palette::from_swatches(swatches.clone()),
            Palette::from_swatches(swatches)
        );
    }
}
