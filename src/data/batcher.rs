// ============================================================
// Layer 4: Motion Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<Sample> into
// one input tensor and one target tensor.
//
// How batching works here:
//   Input:  N samples, each SAMPLE_LEN values timestep-major
//   Output: inputs  [N, 1, WINDOW_LEN, CHANNELS]  (NCHW)
//           targets [N]                           (class ids)
//
//   The flat buffer is [s1_t0c0, s1_t0c1, ..., sN_t127c2], so
//   a single reshape gives the NCHW layout with one input
//   channel, the same memory order as (N, 128, 3, 1) NHWC.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::sample::{Sample, CHANNELS, WINDOW_LEN};

/// A batch ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct MotionBatch<B: Backend> {
    /// Motion windows, shape [batch_size, 1, WINDOW_LEN, CHANNELS]
    pub inputs: Tensor<B, 4>,

    /// Class ids, shape [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct MotionBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,
}

impl<B: Backend> MotionBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<Sample, MotionBatch<B>> for MotionBatcher<B> {
    fn batch(&self, items: Vec<Sample>) -> MotionBatch<B> {
        stack_samples(&items, &self.device)
    }
}

/// Stack samples into a MotionBatch. Shared by the Batcher impl and
/// by callers that already hold a slice of samples.
pub fn stack_samples<B: Backend>(items: &[Sample], device: &B::Device) -> MotionBatch<B> {
    let batch_size = items.len();

    let flat: Vec<f32> = items
        .iter()
        .flat_map(|s| s.features.iter().copied())
        .collect();

    let labels: Vec<i32> = items
        .iter()
        .map(|s| s.class() as i32)
        .collect();

    let inputs = Tensor::<B, 1>::from_floats(flat.as_slice(), device)
        .reshape([batch_size, 1, WINDOW_LEN, CHANNELS]);

    let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), device);

    MotionBatch { inputs, targets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::SAMPLE_LEN;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_batch_shapes_and_layout() {
        let device = Default::default();
        let samples: Vec<Sample> = (0..4)
            .map(|i| Sample::new((0..SAMPLE_LEN).map(|v| v as f32).collect(), (i % 3) as f32))
            .collect();

        let batch = MotionBatcher::<TestBackend>::new(device).batch(samples);
        assert_eq!(batch.inputs.dims(), [4, 1, WINDOW_LEN, CHANNELS]);
        assert_eq!(batch.targets.dims(), [4]);

        // timestep 2, channel 1 of the first sample is flat index 2 * 3 + 1
        let value: f32 = batch
            .inputs
            .slice([0..1, 0..1, 2..3, 1..2])
            .into_scalar()
            .elem();
        assert_eq!(value, 7.0);

        let targets = batch.targets.into_data().to_vec::<i64>().unwrap();
        assert_eq!(targets, vec![0, 1, 2, 0]);
    }
}
