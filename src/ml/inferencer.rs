// ============================================================
// Layer 5: Inferencer
// ============================================================
use anyhow::{anyhow, Result};
use burn::prelude::*;

use crate::data::batcher::stack_samples;
use crate::domain::sample::Sample;
use crate::domain::traits::Classifier;
use crate::infra::exporter::ModelExporter;
use crate::ml::model::MotionCnn;

const INFER_BATCH: usize = 64;

/// Runs a model in inference mode (BatchNorm uses running statistics).
pub struct Inferencer<B: Backend> {
    model:  MotionCnn<B>,
    device: B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: MotionCnn<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Rebuild the architecture from model_config.json and load the lite weights.
    pub fn from_export(exporter: &ModelExporter, device: B::Device) -> Result<Self> {
        let cfg   = exporter.load_model_config()?;
        let model = exporter.load_lite(cfg.init::<B>(&device), &device)?;
        tracing::info!("Lite model loaded from '{}'", exporter.lite_path().display());
        Ok(Self { model, device })
    }
}

impl<B: Backend> Classifier for Inferencer<B> {
    fn probabilities(&self, samples: &[Sample]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(samples.len());

        for chunk in samples.chunks(INFER_BATCH) {
            let batch = stack_samples::<B>(chunk, &self.device);
            let probs = self.model.probabilities(batch.inputs);
            let [_, classes] = probs.dims();

            let flat: Vec<f32> = probs
                .into_data()
                .convert::<f32>()
                .to_vec::<f32>()
                .map_err(|e| anyhow!("Cannot read model output: {e:?}"))?;
            out.extend(flat.chunks(classes).map(<[f32]>::to_vec));
        }

        Ok(out)
    }
}

/// Number of samples on which two classifiers pick the same class.
pub fn agreement(a: &[usize], b: &[usize]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::SAMPLE_LEN;
    use crate::ml::model::MotionCnnConfig;
    use burn::backend::NdArray;

    #[test]
    fn test_probabilities_shape_and_sum() {
        let device = Default::default();
        let model: MotionCnn<NdArray<f32>> = MotionCnnConfig::new().init(&device);
        let inferencer = Inferencer::new(model, device);

        let samples: Vec<Sample> = (0..70)
            .map(|i| Sample::new(vec![(i % 7) as f32; SAMPLE_LEN], 0.0))
            .collect();
        let probs = inferencer.probabilities(&samples).unwrap();

        assert_eq!(probs.len(), 70);
        for p in &probs {
            assert_eq!(p.len(), 3);
            assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-4);
        }
        assert_eq!(inferencer.classify(&samples).unwrap().len(), 70);
    }

    #[test]
    fn test_agreement_counts_matches() {
        assert_eq!(agreement(&[0, 1, 2, 2], &[0, 2, 2, 2]), 3);
    }
}
