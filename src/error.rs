use thiserror::Error;

use crate::samples::FeatureSlot;

pub type Result<T> = std::result::Result<T, ColorError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    /// A channel value outside the 8-bit range reached a color boundary
    #[error("Invalid color: {channel} channel = {value} (expected 0-255)")]
    InvalidColor { channel: &'static str, value: i64 },

    /// A hex string that is not exactly `#` followed by six hex digits
    #[error("Invalid hex color format: {0:?}")]
    InvalidFormat(String),

    /// An average or pick was requested from a slot with no samples
    #[error("No samples collected for {0}")]
    InsufficientSamples(FeatureSlot),

    #[error("Invalid survey answer: {0:?} (expected A, B or C)")]
    InvalidAnswer(String),

    #[error("No undertone: survey answers missing")]
    MissingSurvey,

    #[error("Sampling incomplete for {slot}: {collected} of {required} samples")]
    IncompleteSession {
        slot: FeatureSlot,
        collected: usize,
        required: usize,
    },

    /// More samples than the slot asks for, e.g. a hand-edited session file
    #[error("Too many samples for {slot}: {collected} collected, {required} expected")]
    OverCollected {
        slot: FeatureSlot,
        collected: usize,
        required: usize,
    },
}
