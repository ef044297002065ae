use burn::data::dataset::Dataset;

use crate::domain::sample::Sample;

/// In-memory partition exposed through Burn's Dataset trait.
pub struct MotionDataset {
    samples: Vec<Sample>,
}

impl MotionDataset {
    pub fn new(samples: Vec<Sample>) -> Self { Self { samples } }

    pub fn samples(&self) -> &[Sample] { &self.samples }
}

impl Dataset<Sample> for MotionDataset {
    fn get(&self, index: usize) -> Option<Sample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
