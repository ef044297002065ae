// ============================================================
// Layer 3: Dataset Errors
// ============================================================
// Everything that can go wrong while turning raw rows into
// training samples. Malformed files never reach this point:
// the loader skips them with a warning. These errors are all
// fatal for a training run.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("no valid data found: every file was missing or malformed")]
    Empty,

    #[error("feature length mismatch in '{source_file}': expected {expected}, found {found}")]
    FeatureLength {
        source_file: String,
        expected:    String,
        found:       usize,
    },

    #[error("{rows} timestep rows cannot be reshaped into windows of {window}")]
    NotDivisible { rows: usize, window: usize },

    #[error("window {window} mixes labels {first} and {other}")]
    MixedWindowLabel { window: usize, first: f32, other: f32 },

    #[error("invalid label {label} in '{source_file}': expected an integer in 0..{num_classes}")]
    InvalidLabel {
        source_file: String,
        label:       f32,
        num_classes: usize,
    },

    #[error("{total} samples are too few to split: the training partition would be empty")]
    SplitTooSmall { total: usize },
}
