use std::ops::Range;

use serde::{Deserialize, Serialize};

/// One display palette cut from the harmonized sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub base_colors: Vec<String>,
    pub accent_colors: Vec<String>,
    pub undertone_colors: Vec<String>,
}

impl Palette {
    pub fn is_empty(&self) -> bool {
        self.base_colors.is_empty() && self.accent_colors.is_empty() && self.undertone_colors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.base_colors.len() + self.accent_colors.len() + self.undertone_colors.len()
    }
}

/// Index windows (base, accent, undertone) for each palette, in display order.
pub const PALETTE_WINDOWS: [[Range<usize>; 3]; 2] = [[0..3, 3..5, 5..7], [7..10, 10..12, 12..14]];

fn window(colors: &[String], range: Range<usize>) -> Vec<String> {
    let end = range.end.min(colors.len());
    let start = range.start.min(end);
    colors[start..end].to_vec()
}

/// Cut the harmonized sequence into display palettes.
///
/// Indices past the end of `colors` are treated as absent, and a palette with
/// nothing in any group is dropped, so short sequences yield fewer or partial
/// palettes.
pub fn slice_palettes(colors: &[String]) -> Vec<Palette> {
    PALETTE_WINDOWS
        .iter()
        .map(|[base, accent, undertone]| Palette {
            base_colors: window(colors, base.clone()),
            accent_colors: window(colors, accent.clone()),
            undertone_colors: window(colors, undertone.clone()),
        })
        .filter(|palette| !palette.is_empty())
        .collect()
}
