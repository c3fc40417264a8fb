use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::color_space::{hsl_to_rgb, rgb_to_hex, rgb_to_hsl, Hsl, Rgb};
use crate::undertone::Undertone;

/// Hair darkness bucket that biases lightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Deep,
    Medium,
    Light,
}

impl Depth {
    /// 0 is black hair (full depth), 255 is white.
    pub fn from_black_point(black_point: u8) -> Self {
        match black_point {
            0..=84 => Depth::Deep,
            85..=169 => Depth::Medium,
            _ => Depth::Light,
        }
    }

    /// Scale a lightness percentage. Medium leaves it alone.
    fn adjust_lightness(self, l: f64) -> f64 {
        match self {
            Depth::Deep => (l * 0.9).max(0.0),
            Depth::Light => (l * 1.1).min(100.0),
            Depth::Medium => l,
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Depth::Deep => "deep",
            Depth::Medium => "medium",
            Depth::Light => "light",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinColors {
    pub cheeks: Rgb,
    pub neck: Rgb,
    pub nose: Rgb,
    pub under_eyes: Rgb,
    pub forehead: Rgb,
}

/// Everything the harmonizer needs about one person, already sampled and
/// averaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonFeatures {
    /// Darkest channel seen across the hair samples
    pub hair_black_point: u8,
    pub eye_color: Rgb,
    pub under_eye_color: Rgb,
    pub skin_colors: SkinColors,
    /// Carried for compatibility with capture tools; no computation reads it.
    #[serde(default = "default_lighting_type")]
    pub lighting_type: String,
    pub undertone: Undertone,
}

pub fn default_lighting_type() -> String {
    "natural".to_string()
}

impl PersonFeatures {
    pub fn depth(&self) -> Depth {
        Depth::from_black_point(self.hair_black_point)
    }

    /// The seven colors the harmonizer starts from, in processing order.
    pub fn base_colors(&self) -> [Rgb; 7] {
        [
            self.eye_color,
            self.under_eye_color,
            self.skin_colors.cheeks,
            self.skin_colors.neck,
            self.skin_colors.nose,
            self.skin_colors.under_eyes,
            self.skin_colors.forehead,
        ]
    }
}

/// Insertion-ordered set of hex strings. The set answers membership, the vec
/// keeps first-seen order; both are only written on first occurrence.
#[derive(Debug, Clone, Default)]
pub struct ColorSet {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl ColorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the hex was already present.
    pub fn insert(&mut self, hex: String) -> bool {
        if self.seen.contains(&hex) {
            return false;
        }
        self.seen.insert(hex.clone());
        self.order.push(hex);
        true
    }

    pub fn insert_rgb(&mut self, rgb: Rgb) -> bool {
        self.insert(rgb_to_hex(rgb))
    }

    pub fn contains(&self, hex: &str) -> bool {
        self.seen.contains(hex)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// Hue +180, same saturation and lightness.
pub fn complementary_color(color: Rgb) -> Rgb {
    let hsl = rgb_to_hsl(color);
    hsl_to_rgb(hsl.rotate(180.0))
}

/// `count` neighbours at 30 degree steps above the color's hue.
pub fn analogous_colors(color: Rgb, count: usize) -> Vec<Rgb> {
    let hsl = rgb_to_hsl(color);
    (1..=count)
        .map(|i| hsl_to_rgb(hsl.rotate(30.0 * i as f64)))
        .collect()
}

/// Triadic (+120) and complementary (+180) partners of the raw eye color.
pub fn accent_colors(eye_color: Rgb) -> [Rgb; 2] {
    let hsl = rgb_to_hsl(eye_color);
    [
        hsl_to_rgb(hsl.rotate(120.0)),
        hsl_to_rgb(hsl.rotate(180.0)),
    ]
}

fn adjust_for_undertone(hsl: Hsl, undertone: Undertone) -> Hsl {
    match undertone {
        Undertone::Warm => Hsl::new(hsl.rotate(15.0).h, (hsl.s * 1.1).min(100.0), hsl.l),
        // Shifted up a full turn before the modulo; plain rem_euclid differs
        // in the last bits and can move a channel by one step.
        Undertone::Cool => Hsl::new(
            (hsl.h - 15.0 + 360.0) % 360.0,
            (hsl.s * 0.9).max(0.0),
            hsl.l,
        ),
        Undertone::Neutral => hsl,
    }
}

/// Shift one sampled color toward the person's undertone and depth.
pub fn adjust_color(color: Rgb, undertone: Undertone, depth: Depth) -> Rgb {
    let hsl = adjust_for_undertone(rgb_to_hsl(color), undertone);
    hsl_to_rgb(Hsl::new(hsl.h, hsl.s, depth.adjust_lightness(hsl.l)))
}

/// Derive the de-duplicated, insertion-ordered palette for one person.
///
/// For each of the seven base colors: the adjusted color, its complement and
/// two analogous neighbours, each derived from the adjusted (re-quantized)
/// color. Then the two accents of the unadjusted eye color. The result has at
/// most 30 entries and may be much shorter when samples coincide.
pub fn harmonize_colors(features: &PersonFeatures) -> Vec<String> {
    let depth = features.depth();
    let mut colors = ColorSet::new();

    for base in features.base_colors() {
        let adjusted = adjust_color(base, features.undertone, depth);
        debug!("Base {} adjusted to {} ({}, {})", base, adjusted, features.undertone, depth);

        colors.insert_rgb(adjusted);
        colors.insert_rgb(complementary_color(adjusted));
        for neighbour in analogous_colors(adjusted, 2) {
            colors.insert_rgb(neighbour);
        }
    }

    for accent in accent_colors(features.eye_color) {
        colors.insert_rgb(accent);
    }

    info!(
        "Harmonized {} colors (undertone={}, depth={})",
        colors.len(),
        features.undertone,
        depth
    );

    colors.into_vec()
}
