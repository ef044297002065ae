// ============================================================
// Layer 3: Sample Domain Type
// ============================================================
// A Sample is one motion window: WINDOW_LEN timesteps of
// CHANNELS readings each, stored timestep-major:
//
//   [t0c0, t0c1, t0c2, t1c0, t1c1, t1c2, ...]
//
// In tensor terms a batch of N samples is (N, 128, 3, 1)
// channels-last, or [N, 1, 128, 3] in the NCHW layout the
// model consumes.

use serde::{Deserialize, Serialize};

/// Timesteps per motion window
pub const WINDOW_LEN: usize = 128;

/// Readings per timestep (x, y, z)
pub const CHANNELS: usize = 3;

/// Feature values per sample
pub const SAMPLE_LEN: usize = WINDOW_LEN * CHANNELS;

/// Number of gesture/activity classes
pub const NUM_CLASSES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// SAMPLE_LEN values, timestep-major
    pub features: Vec<f32>,

    /// Class id as a float (always integral and < NUM_CLASSES)
    pub label: f32,
}

impl Sample {
    pub fn new(features: Vec<f32>, label: f32) -> Self {
        Self { features, label }
    }

    /// The label as a class index
    pub fn class(&self) -> usize {
        self.label as usize
    }
}
