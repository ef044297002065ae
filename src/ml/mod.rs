// ============================================================
// Layer 5: ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here:
//
//   model.rs      - the CNN: layer norm, two conv blocks,
//                   dense head producing class logits
//
//   trainer.rs    - the training loop (Adam + cross-entropy)
//                   and the shared evaluation pass
//
//   inferencer.rs - runs an exported model on samples,
//                   used to verify the lite export and by
//                   the `evaluate` command
//
// Backend selection is a Cargo feature: the CPU ndarray
// backend by default, `--features wgpu` for the GPU.
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Convolutional motion classifier
pub mod model;

/// Training loop with per-epoch validation
pub mod trainer;

/// Inference over exported models
pub mod inferencer;

#[cfg(feature = "wgpu")]
pub type InnerBackend = burn::backend::Wgpu;
#[cfg(not(feature = "wgpu"))]
pub type InnerBackend = burn::backend::NdArray<f32>;

/// Backend used while training: gradients enabled
pub type TrainBackend = burn::backend::Autodiff<InnerBackend>;
