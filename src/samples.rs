use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color_space::Rgb;
use crate::error::{ColorError, Result};
use crate::harmonizer::{PersonFeatures, SkinColors};
use crate::undertone::Undertone;

/// The eight places a color can be sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSlot {
    HairColor,
    EyeColor,
    UnderEyeColor,
    Cheeks,
    Neck,
    Nose,
    UnderEyes,
    Forehead,
}

impl FeatureSlot {
    /// Sampling order used by capture tools.
    pub const ALL: [FeatureSlot; 8] = [
        FeatureSlot::HairColor,
        FeatureSlot::EyeColor,
        FeatureSlot::UnderEyeColor,
        FeatureSlot::Cheeks,
        FeatureSlot::Neck,
        FeatureSlot::Nose,
        FeatureSlot::UnderEyes,
        FeatureSlot::Forehead,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FeatureSlot::HairColor => "Hair Color",
            FeatureSlot::EyeColor => "Eye Color",
            FeatureSlot::UnderEyeColor => "Under Eye Color",
            FeatureSlot::Cheeks => "Cheeks",
            FeatureSlot::Neck => "Neck",
            FeatureSlot::Nose => "Nose",
            FeatureSlot::UnderEyes => "Under Eyes",
            FeatureSlot::Forehead => "Forehead",
        }
    }

    pub fn is_skin_zone(self) -> bool {
        !matches!(
            self,
            FeatureSlot::HairColor | FeatureSlot::EyeColor | FeatureSlot::UnderEyeColor
        )
    }
}

impl fmt::Display for FeatureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How many samples each slot needs before a session can be analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleRequirements {
    pub hair_color: usize,
    pub eye_color: usize,
    pub under_eye_color: usize,
    /// Applies to each of the five skin zones
    pub skin_zone: usize,
}

impl Default for SampleRequirements {
    fn default() -> Self {
        Self {
            hair_color: 3,
            eye_color: 1,
            under_eye_color: 3,
            skin_zone: 3,
        }
    }
}

impl SampleRequirements {
    pub fn required(&self, slot: FeatureSlot) -> usize {
        match slot {
            FeatureSlot::HairColor => self.hair_color,
            FeatureSlot::EyeColor => self.eye_color,
            FeatureSlot::UnderEyeColor => self.under_eye_color,
            _ => self.skin_zone,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinSamples {
    pub cheeks: Vec<Rgb>,
    pub neck: Vec<Rgb>,
    pub nose: Vec<Rgb>,
    pub under_eyes: Vec<Rgb>,
    pub forehead: Vec<Rgb>,
}

/// Raw picked colors, grouped by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleCollection {
    pub hair_color: Vec<Rgb>,
    pub eye_color: Vec<Rgb>,
    pub under_eye_color: Vec<Rgb>,
    pub skin_colors: SkinSamples,
}

impl SampleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self, slot: FeatureSlot) -> &[Rgb] {
        match slot {
            FeatureSlot::HairColor => &self.hair_color,
            FeatureSlot::EyeColor => &self.eye_color,
            FeatureSlot::UnderEyeColor => &self.under_eye_color,
            FeatureSlot::Cheeks => &self.skin_colors.cheeks,
            FeatureSlot::Neck => &self.skin_colors.neck,
            FeatureSlot::Nose => &self.skin_colors.nose,
            FeatureSlot::UnderEyes => &self.skin_colors.under_eyes,
            FeatureSlot::Forehead => &self.skin_colors.forehead,
        }
    }

    fn samples_mut(&mut self, slot: FeatureSlot) -> &mut Vec<Rgb> {
        match slot {
            FeatureSlot::HairColor => &mut self.hair_color,
            FeatureSlot::EyeColor => &mut self.eye_color,
            FeatureSlot::UnderEyeColor => &mut self.under_eye_color,
            FeatureSlot::Cheeks => &mut self.skin_colors.cheeks,
            FeatureSlot::Neck => &mut self.skin_colors.neck,
            FeatureSlot::Nose => &mut self.skin_colors.nose,
            FeatureSlot::UnderEyes => &mut self.skin_colors.under_eyes,
            FeatureSlot::Forehead => &mut self.skin_colors.forehead,
        }
    }

    /// Append a sample. A slot that already holds its required count is left
    /// untouched and `false` is returned.
    pub fn record(&mut self, slot: FeatureSlot, color: Rgb, requirements: &SampleRequirements) -> bool {
        let required = requirements.required(slot);
        let samples = self.samples_mut(slot);
        if samples.len() >= required {
            debug!("Ignoring sample {} for {}: slot full", color, slot);
            return false;
        }
        samples.push(color);
        true
    }

    pub fn clear(&mut self, slot: FeatureSlot) {
        self.samples_mut(slot).clear();
    }

    /// `(collected, required)` for one slot.
    pub fn progress(&self, slot: FeatureSlot, requirements: &SampleRequirements) -> (usize, usize) {
        (self.samples(slot).len(), requirements.required(slot))
    }

    /// First slot, in sampling order, that does not hold exactly its required
    /// count.
    pub fn first_incomplete(&self, requirements: &SampleRequirements) -> Option<FeatureSlot> {
        FeatureSlot::ALL.into_iter().find(|&slot| {
            let (collected, required) = self.progress(slot, requirements);
            collected != required
        })
    }

    pub fn is_complete(&self, requirements: &SampleRequirements) -> bool {
        self.first_incomplete(requirements).is_none()
    }

    /// Per-channel mean, rounded half up.
    pub fn average(&self, slot: FeatureSlot) -> Result<Rgb> {
        average_colors(self.samples(slot)).ok_or(ColorError::InsufficientSamples(slot))
    }

    /// Darkest single channel across every hair sample.
    pub fn hair_black_point(&self) -> Result<u8> {
        self.hair_color
            .iter()
            .flat_map(Rgb::channels)
            .min()
            .ok_or(ColorError::InsufficientSamples(FeatureSlot::HairColor))
    }

    /// Eye color is the first pick rather than an average; the iris is
    /// sampled once.
    pub fn eye_color(&self) -> Result<Rgb> {
        self.eye_color
            .first()
            .copied()
            .ok_or(ColorError::InsufficientSamples(FeatureSlot::EyeColor))
    }

    pub fn to_features(&self, undertone: Undertone, lighting_type: impl Into<String>) -> Result<PersonFeatures> {
        Ok(PersonFeatures {
            hair_black_point: self.hair_black_point()?,
            eye_color: self.eye_color()?,
            under_eye_color: self.average(FeatureSlot::UnderEyeColor)?,
            skin_colors: SkinColors {
                cheeks: self.average(FeatureSlot::Cheeks)?,
                neck: self.average(FeatureSlot::Neck)?,
                nose: self.average(FeatureSlot::Nose)?,
                under_eyes: self.average(FeatureSlot::UnderEyes)?,
                forehead: self.average(FeatureSlot::Forehead)?,
            },
            lighting_type: lighting_type.into(),
            undertone,
        })
    }
}

/// Mean of a set of colors, or `None` for an empty set.
pub fn average_colors(colors: &[Rgb]) -> Option<Rgb> {
    if colors.is_empty() {
        return None;
    }

    let mut sums = [0u32; 3];
    for color in colors {
        for (sum, channel) in sums.iter_mut().zip(color.channels()) {
            *sum += u32::from(channel);
        }
    }

    let count = colors.len() as f64;
    let [r, g, b] = sums.map(|sum| (f64::from(sum) / count).round() as u8);
    Some(Rgb::new(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(requirements: &SampleRequirements) -> SampleCollection {
        let mut samples = SampleCollection::new();
        for slot in FeatureSlot::ALL {
            for i in 0..requirements.required(slot) {
                let v = 100 + i as u8 * 10;
                samples.record(slot, Rgb::new(v, v - 20, v - 40), requirements);
            }
        }
        samples
    }

    #[test]
    fn average_rounds_half_up() {
        let colors = [Rgb::new(10, 0, 255), Rgb::new(11, 1, 254)];
        assert_eq!(average_colors(&colors), Some(Rgb::new(11, 1, 255)));
        assert_eq!(
            average_colors(&[Rgb::new(1, 2, 3), Rgb::new(2, 2, 3), Rgb::new(2, 2, 3)]),
            Some(Rgb::new(2, 2, 3))
        );
    }

    #[test]
    fn empty_slot_is_insufficient() {
        let samples = SampleCollection::new();
        assert_eq!(
            samples.average(FeatureSlot::Neck),
            Err(ColorError::InsufficientSamples(FeatureSlot::Neck))
        );
        assert_eq!(
            samples.hair_black_point(),
            Err(ColorError::InsufficientSamples(FeatureSlot::HairColor))
        );
        assert_eq!(
            samples.eye_color(),
            Err(ColorError::InsufficientSamples(FeatureSlot::EyeColor))
        );
    }

    #[test]
    fn record_stops_at_required_count() {
        let requirements = SampleRequirements::default();
        let mut samples = SampleCollection::new();
        assert!(samples.record(FeatureSlot::EyeColor, Rgb::new(1, 2, 3), &requirements));
        assert!(!samples.record(FeatureSlot::EyeColor, Rgb::new(4, 5, 6), &requirements));
        assert_eq!(samples.samples(FeatureSlot::EyeColor), [Rgb::new(1, 2, 3)]);
        assert_eq!(samples.progress(FeatureSlot::EyeColor, &requirements), (1, 1));
        assert_eq!(samples.progress(FeatureSlot::Forehead, &requirements), (0, 3));
    }

    #[test]
    fn each_slot_writes_to_its_own_list() {
        let requirements = SampleRequirements::default();
        let mut samples = SampleCollection::new();
        for (i, slot) in FeatureSlot::ALL.into_iter().enumerate() {
            samples.record(slot, Rgb::new(i as u8, 0, 0), &requirements);
        }
        for (i, slot) in FeatureSlot::ALL.into_iter().enumerate() {
            assert_eq!(samples.samples(slot), [Rgb::new(i as u8, 0, 0)]);
        }
        samples.clear(FeatureSlot::Nose);
        assert!(samples.samples(FeatureSlot::Nose).is_empty());
        assert_eq!(samples.samples(FeatureSlot::Neck).len(), 1);
    }

    #[test]
    fn completeness_follows_requirements() {
        let requirements = SampleRequirements::default();
        let mut samples = filled(&requirements);
        assert!(samples.is_complete(&requirements));

        samples.clear(FeatureSlot::UnderEyes);
        assert!(!samples.is_complete(&requirements));
        assert_eq!(samples.first_incomplete(&requirements), Some(FeatureSlot::UnderEyes));
    }

    #[test]
    fn hair_black_point_is_darkest_channel() {
        let requirements = SampleRequirements::default();
        let mut samples = SampleCollection::new();
        samples.record(FeatureSlot::HairColor, Rgb::new(90, 70, 60), &requirements);
        samples.record(FeatureSlot::HairColor, Rgb::new(80, 75, 42), &requirements);
        assert_eq!(samples.hair_black_point(), Ok(42));
    }

    #[test]
    fn features_take_first_eye_sample_and_average_the_rest() {
        let requirements = SampleRequirements {
            eye_color: 2,
            ..SampleRequirements::default()
        };
        let samples = filled(&requirements);
        let features = samples.to_features(Undertone::Warm, "natural").unwrap();

        assert_eq!(features.eye_color, Rgb::new(100, 80, 60));
        assert_eq!(features.skin_colors.cheeks, Rgb::new(110, 90, 70));
        assert_eq!(features.hair_black_point, 60);
        assert_eq!(features.undertone, Undertone::Warm);
        assert_eq!(features.lighting_type, "natural");
    }

    #[test]
    fn skin_zones_are_the_last_five_slots() {
        let zones: Vec<_> = FeatureSlot::ALL.into_iter().filter(|s| s.is_skin_zone()).collect();
        assert_eq!(
            zones,
            [
                FeatureSlot::Cheeks,
                FeatureSlot::Neck,
                FeatureSlot::Nose,
                FeatureSlot::UnderEyes,
                FeatureSlot::Forehead
            ]
        );
    }
}
