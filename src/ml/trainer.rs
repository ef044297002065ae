// ============================================================
// Layer 5: Training Loop
// ============================================================
// Fixed-epoch mini-batch training with Adam:
//
//   for each epoch:
//     for each shuffled training batch:
//       logits = model(inputs)
//       loss   = cross_entropy(logits, targets)
//       model  = adam.step(lr, model, grads(loss))
//     evaluate validation partition (no autodiff)
//     record + print EpochMetrics
//
// No early stopping, no LR schedule, no mid-run checkpoints.
//
// Burn notes:
//   - Training runs on an AutodiffBackend for gradients
//   - model.valid() returns the model on the inner backend,
//     which also switches BatchNorm to its running statistics
//   - argmax(1) returns [batch, 1] so we flatten before .equal()
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{anyhow, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{stack_samples, MotionBatcher},
    dataset::MotionDataset,
};
use crate::domain::sample::Sample;
use crate::infra::metrics::{ConfusionMatrix, EpochMetrics, MetricsLogger, TrainingHistory};
use crate::ml::model::{MotionCnn, MotionCnnConfig};
use crate::ml::TrainBackend;

/// The trained model together with its per-epoch metrics
pub struct TrainingOutcome<B: AutodiffBackend> {
    pub model:   MotionCnn<B>,
    pub history: TrainingHistory,
}

/// Loss and confusion matrix over a set of samples
#[derive(Debug, Clone)]
pub struct EvalReport {
    pub loss:      f64,
    pub confusion: ConfusionMatrix,
}

impl EvalReport {
    pub fn accuracy(&self) -> f64 {
        self.confusion.accuracy()
    }
}

pub fn run_training(
    cfg:           &TrainConfig,
    model_cfg:     &MotionCnnConfig,
    train_dataset: MotionDataset,
    val_dataset:   MotionDataset,
    logger:        &MetricsLogger,
) -> Result<TrainingOutcome<TrainBackend>> {
    let device = <TrainBackend as Backend>::Device::default();
    tracing::info!("Using device: {:?}", device);
    train_loop::<TrainBackend>(cfg, model_cfg, train_dataset, val_dataset, Some(logger), device)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    model_cfg:     &MotionCnnConfig,
    train_dataset: MotionDataset,
    val_dataset:   MotionDataset,
    logger:        Option<&MetricsLogger>,
    device:        B::Device,
) -> Result<TrainingOutcome<B>> {
    let mut model: MotionCnn<B> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: conv {}/{} filters, {} flattened features, {} classes",
        model_cfg.filters_1,
        model_cfg.filters_2,
        model_cfg.flattened_len(),
        model_cfg.num_classes,
    );

    let mut optim = AdamConfig::new().init();

    // Reshuffled every epoch, reproducibly for a given split seed
    let train_loader = DataLoaderBuilder::new(MotionBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.split_seed)
        .num_workers(1)
        .build(train_dataset);

    let mut history = TrainingHistory::default();

    for epoch in 1..=cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let batch_len = batch.targets.dims()[0];
            let (loss, logits) = model.forward_loss(batch.inputs, batch.targets.clone());

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            loss_sum += loss_val * batch_len as f64;
            seen     += batch_len;

            let hits: i64 = logits
                .argmax(1)
                .flatten::<1>(0, 1)
                .equal(batch.targets)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();
            correct += hits as usize;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss = if seen > 0 { loss_sum / seen as f64 } else { f64::NAN };
        let train_acc  = if seen > 0 { correct as f64 / seen as f64 } else { 0.0 };

        // ── Validation phase ──────────────────────────────────────────────────
        let val = evaluate(&model.valid(), val_dataset.samples(), cfg.batch_size, &device)?;

        let metrics = EpochMetrics::new(epoch, train_loss, train_acc, val.loss, val.accuracy());
        println!(
            "Epoch {:>3}/{} | loss={:.4} | accuracy={:.1}% | val_loss={:.4} | val_accuracy={:.1}%",
            epoch, cfg.epochs, train_loss, train_acc * 100.0, val.loss, val.accuracy() * 100.0,
        );
        if let Some(logger) = logger {
            logger.log(&metrics)?;
        }
        history.push(metrics);
    }

    tracing::info!("Training complete after {} epochs", history.len());
    Ok(TrainingOutcome { model, history })
}

/// Mean loss and confusion matrix of `model` over `samples`.
/// An empty sample set reports NaN loss and an empty matrix.
pub fn evaluate<B: Backend>(
    model:      &MotionCnn<B>,
    samples:    &[Sample],
    batch_size: usize,
    device:     &B::Device,
) -> Result<EvalReport> {
    let num_classes = model.head.weight.dims()[1];
    let mut confusion = ConfusionMatrix::new(num_classes);
    let mut loss_sum = 0.0f64;

    for chunk in samples.chunks(batch_size.max(1)) {
        let batch = stack_samples::<B>(chunk, device);
        let (loss, logits) = model.forward_loss(batch.inputs, batch.targets);
        loss_sum += loss.into_scalar().elem::<f64>() * chunk.len() as f64;

        let predicted = predicted_classes(logits)?;
        for (sample, p) in chunk.iter().zip(predicted) {
            confusion.record(sample.class(), p);
        }
    }

    let loss = if samples.is_empty() { f64::NAN } else { loss_sum / samples.len() as f64 };
    Ok(EvalReport { loss, confusion })
}

/// Row-wise argmax of a [batch, classes] tensor as class indices.
pub fn predicted_classes<B: Backend>(scores: Tensor<B, 2>) -> Result<Vec<usize>> {
    let classes = scores
        .argmax(1)
        .flatten::<1>(0, 1)
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| anyhow!("Cannot read predicted classes: {e:?}"))?;
    Ok(classes.into_iter().map(|c| c as usize).collect())
}
