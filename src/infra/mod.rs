// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// Cross-cutting concerns that write things to disk:
//
//   exporter.rs - Saving and loading the trained model with
//                 Burn's recorders: full model, lite model,
//                 and the configs needed to rebuild it.
//
//   metrics.rs  - Per-epoch metrics CSV, training history,
//                 and the confusion matrix behind the
//                 precision / recall / F1 reports.
//
//   plot.rs     - Loss and accuracy curves as SVG files.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Full and lite model export
pub mod exporter;

/// Training metrics and classification scores
pub mod metrics;

/// Learning-curve rendering
pub mod plot;
