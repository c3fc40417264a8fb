use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::ColorError;
use crate::harmonizer::{default_lighting_type, harmonize_colors, Depth, PersonFeatures};
use crate::palette::{slice_palettes, Palette};
use crate::samples::{SampleCollection, SampleRequirements};
use crate::undertone::{SurveyAnswers, Undertone};

/// Everything captured for one person: picked samples plus either the
/// questionnaire answers or an undertone that is already known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    #[serde(default)]
    pub samples: SampleCollection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<SurveyAnswers>,
    /// Takes precedence over `answers` when both are present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undertone: Option<Undertone>,
    #[serde(default = "default_lighting_type")]
    pub lighting_type: String,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self {
            samples: SampleCollection::default(),
            answers: None,
            undertone: None,
            lighting_type: default_lighting_type(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub undertone: Undertone,
    pub depth: Depth,
    pub features: PersonFeatures,
    /// Ordered, de-duplicated harmonized colors
    pub colors: Vec<String>,
    pub palettes: Vec<Palette>,
}

impl AnalysisSession {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read session file {}", path.as_ref().display()))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse session file")
    }

    pub fn undertone(&self) -> Option<Undertone> {
        self.undertone
            .or_else(|| self.answers.as_ref().map(SurveyAnswers::undertone))
    }

    /// Check every slot holds its required sample count and an undertone can
    /// be resolved.
    pub fn validate(&self, requirements: &SampleRequirements) -> Result<Undertone, ColorError> {
        if let Some(slot) = self.samples.first_incomplete(requirements) {
            let (collected, required) = self.samples.progress(slot, requirements);
            if collected > required {
                return Err(ColorError::OverCollected {
                    slot,
                    collected,
                    required,
                });
            }
            return Err(ColorError::IncompleteSession {
                slot,
                collected,
                required,
            });
        }

        self.undertone().ok_or(ColorError::MissingSurvey)
    }

    /// Run the whole pipeline: validate, build features, harmonize, slice.
    pub fn analyze(&self, requirements: &SampleRequirements) -> Result<AnalysisReport, ColorError> {
        let undertone = self.validate(requirements)?;
        let features = self.samples.to_features(undertone, self.lighting_type.clone())?;
        let colors = harmonize_colors(&features);
        let palettes = slice_palettes(&colors);

        info!(
            "Analysis complete: {} colors, {} palettes",
            colors.len(),
            palettes.len()
        );

        Ok(AnalysisReport {
            undertone,
            depth: features.depth(),
            features,
            colors,
            palettes,
        })
    }
}
