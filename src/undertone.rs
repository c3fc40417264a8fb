use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// Coarse skin-tone classification used to bias hue and saturation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Undertone {
    Warm,
    Cool,
    Neutral,
}

impl fmt::Display for Undertone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Undertone::Warm => "warm",
            Undertone::Cool => "cool",
            Undertone::Neutral => "neutral",
        })
    }
}

/// One questionnaire answer. The questionnaire writes its options so that A
/// leans warm, B leans cool and C is ambiguous; the vote itself only counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurveyAnswer {
    A,
    B,
    C,
}

impl FromStr for SurveyAnswer {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(SurveyAnswer::A),
            "B" | "b" => Ok(SurveyAnswer::B),
            "C" | "c" => Ok(SurveyAnswer::C),
            other => Err(ColorError::InvalidAnswer(other.to_string())),
        }
    }
}

/// The three questions of the undertone questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswers {
    /// Vein color on the underside of the wrist
    pub vein_test: SurveyAnswer,
    /// Jewelry metal that flatters most
    pub jewelry_test: SurveyAnswer,
    /// Whether the skin reddens easily in the sun
    pub beach_test: SurveyAnswer,
}

impl SurveyAnswers {
    pub fn undertone(&self) -> Undertone {
        determine_undertone(self.vein_test, self.jewelry_test, self.beach_test)
    }
}

/// Plurality vote over the three answers.
///
/// A strictly ahead of both others is `Warm`, B strictly ahead is `Cool`,
/// anything else is `Neutral`. C is never tested for a lead of its own, so a
/// unanimous C lands on `Neutral` through the fallback rather than by winning.
pub fn determine_undertone(
    vein_test: SurveyAnswer,
    jewelry_test: SurveyAnswer,
    beach_test: SurveyAnswer,
) -> Undertone {
    let mut scores = [0u8; 3];
    for answer in [vein_test, jewelry_test, beach_test] {
        scores[answer as usize] += 1;
    }
    let [a, b, c] = scores;

    if a > b && a > c {
        Undertone::Warm
    } else if b > a && b > c {
        Undertone::Cool
    } else {
        Undertone::Neutral
    }
}
