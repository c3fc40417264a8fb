pub mod color_space;
pub mod config;
pub mod error;
pub mod harmonizer;
pub mod logger;
pub mod palette;
pub mod samples;
pub mod session;
pub mod undertone;

pub use color_space::{hex_to_rgb, hsl_to_rgb, rgb_to_hex, rgb_to_hsl, Hsl, Rgb};
pub use config::{Config, HarmonyConfig};
pub use error::{ColorError, Result};
pub use harmonizer::{harmonize_colors, ColorSet, Depth, PersonFeatures, SkinColors};
pub use palette::{slice_palettes, Palette};
pub use samples::{FeatureSlot, SampleCollection, SampleRequirements};
pub use session::{AnalysisReport, AnalysisSession};
pub use undertone::{determine_undertone, SurveyAnswer, SurveyAnswers, Undertone};
