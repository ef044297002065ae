// ============================================================
// Layer 2: Evaluate Use Case
// ============================================================
// Scores an exported lite model against a data directory:
// every valid sample is classified (no split, no shuffle) and
// the predictions are summarised in a confusion matrix.

use anyhow::Result;
use burn::prelude::*;

use crate::data::{loader::NpyLoader, preprocessor::build_samples};
use crate::domain::sample::NUM_CLASSES;
use crate::domain::traits::{Classifier, RecordSource};
use crate::infra::{exporter::ModelExporter, metrics::ConfusionMatrix};
use crate::ml::{inferencer::Inferencer, InnerBackend};

pub struct EvaluateUseCase {
    data_dir:  String,
    model_dir: String,
}

impl EvaluateUseCase {
    pub fn new(data_dir: impl Into<String>, model_dir: impl Into<String>) -> Self {
        Self {
            data_dir:  data_dir.into(),
            model_dir: model_dir.into(),
        }
    }

    pub fn execute(&self) -> Result<ConfusionMatrix> {
        let records = NpyLoader::new(&self.data_dir).load_all()?;
        let samples = build_samples(records)?;
        tracing::info!("Evaluating on {} samples", samples.len());

        let exporter   = ModelExporter::open(&self.model_dir, &self.model_dir);
        let device     = <InnerBackend as Backend>::Device::default();
        let inferencer = Inferencer::<InnerBackend>::from_export(&exporter, device)?;

        let predicted = inferencer.classify(&samples)?;
        let actual: Vec<usize> = samples.iter().map(|s| s.class()).collect();

        Ok(ConfusionMatrix::from_predictions(NUM_CLASSES, &actual, &predicted))
    }
}
