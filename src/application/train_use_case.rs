// ============================================================
// Layer 2: TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load .npy files            (Layer 4 - data)
//   Step 2: Shape + shuffle samples    (Layer 4 - data)
//   Step 3: Split train/val/test       (Layer 4 - data)
//   Step 4: Save configs               (Layer 6 - infra)
//   Step 5: Run training loop          (Layer 5 - ml)
//   Step 6: Evaluate the test split    (Layer 5 - ml)
//   Step 7: Save the full model        (Layer 6 - infra)
//   Step 8: Render learning curves     (Layer 6 - infra)
//   Step 9: Export + verify lite model (Layer 6 / Layer 5)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use burn::{module::AutodiffModule, prelude::*};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    dataset::MotionDataset,
    loader::NpyLoader,
    preprocessor::Preprocessor,
    splitter::{split_partitions, SplitConfig},
};
use crate::domain::record::dataset_shape;
use crate::domain::traits::{Classifier, RecordSource};
use crate::infra::{exporter::ModelExporter, metrics::MetricsLogger, plot::render_curves};
use crate::ml::{
    inferencer::{agreement, Inferencer},
    model::MotionCnnConfig,
    trainer::{evaluate, run_training, EvalReport},
    InnerBackend,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Saved next to the
// exported model as train_config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:       String,
    pub model_output:   String,
    pub full_model_dir: String,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub split_seed:     u64,
    pub shuffle_seed:   Option<u64>,
    pub test_fraction:  f64,
    pub val_fraction:   f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        let split = SplitConfig::default();
        Self {
            data_dir:       "data".to_string(),
            model_output:   "models".to_string(),
            full_model_dir: "lite_models".to_string(),
            epochs:         170,
            batch_size:     32,
            lr:             1e-4,
            split_seed:     split.seed,
            shuffle_seed:   None,
            test_fraction:  split.test_fraction,
            val_fraction:   split.val_fraction,
        }
    }
}

impl TrainConfig {
    pub fn split(&self) -> SplitConfig {
        SplitConfig {
            test_fraction: self.test_fraction,
            val_fraction:  self.val_fraction,
            seed:          self.split_seed,
        }
    }
}

/// What a finished run produced
#[derive(Debug)]
pub struct TrainReport {
    pub test:            EvalReport,
    pub full_model:      PathBuf,
    pub lite_model:      PathBuf,
    /// (lite predictions matching the trained model, test samples)
    pub lite_agreement:  (usize, usize),
}

pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Load every valid .npy file ───────────────────────────────
        tracing::info!("Loading .npy files from '{}'", cfg.data_dir);
        let records = NpyLoader::new(&cfg.data_dir).load_all()?;
        let (rows, cols) = dataset_shape(&records);
        tracing::info!("Dataset shape: ({}, {})", rows, cols);

        // ── Step 2: Shape rows into 128x3 windows and shuffle ────────────────
        if cfg.shuffle_seed.is_none() {
            tracing::info!("Shuffling without a seed: partition contents differ between runs");
        }
        let samples = Preprocessor::new(cfg.shuffle_seed).prepare(records)?;
        tracing::info!("Prepared {} samples", samples.len());

        // ── Step 3: Train / validation / test split (60/20/20) ───────────────
        let parts = split_partitions(samples, &cfg.split())?;
        tracing::info!(
            "Split: {} train, {} validation, {} test",
            parts.train.len(),
            parts.validation.len(),
            parts.test.len()
        );
        let test_samples = parts.test;

        // ── Step 4: Save configs ─────────────────────────────────────────────
        let exporter  = ModelExporter::create(&cfg.model_output, &cfg.full_model_dir)?;
        let model_cfg = MotionCnnConfig::new();
        exporter.save_train_config(cfg)?;
        exporter.save_model_config(&model_cfg)?;
        let logger = MetricsLogger::new(exporter.output_dir())?;
        tracing::info!("Logging epoch metrics to '{}'", logger.csv_path().display());

        // ── Step 5: Train ────────────────────────────────────────────────────
        let outcome = run_training(
            cfg,
            &model_cfg,
            MotionDataset::new(parts.train),
            MotionDataset::new(parts.validation),
            &logger,
        )?;

        // ── Step 6: Evaluate on the held-out test split ──────────────────────
        let device = <InnerBackend as Backend>::Device::default();
        let trained = outcome.model.valid();
        let test = evaluate(&trained, &test_samples, cfg.batch_size, &device)?;
        tracing::info!("Test loss={:.4} accuracy={:.4}", test.loss, test.accuracy());

        // ── Step 7: Full model ───────────────────────────────────────────────
        let full_model = exporter.save_full(&trained)?;

        // ── Step 8: Learning curves ──────────────────────────────────────────
        render_curves(&outcome.history, exporter.output_dir())?;

        // ── Step 9: Lite model, then check it predicts like the original ─────
        let lite_model = exporter.save_lite(&trained)?;
        let expected   = Inferencer::new(trained, device.clone()).classify(&test_samples)?;
        let actual     = Inferencer::<InnerBackend>::from_export(&exporter, device)?.classify(&test_samples)?;
        let matching   = agreement(&expected, &actual);
        if matching != test_samples.len() {
            tracing::warn!(
                "Lite model disagrees with the trained model on {} of {} test samples",
                test_samples.len() - matching,
                test_samples.len()
            );
        } else {
            tracing::info!("Lite model matches the trained model on all {} test samples", matching);
        }

        Ok(TrainReport {
            test,
            full_model,
            lite_model,
            lite_agreement: (matching, test_samples.len()),
        })
    }
}
