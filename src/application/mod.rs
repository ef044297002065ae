// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each:
//
//   train_use_case    - load → preprocess → split → train →
//                       evaluate → export
//   evaluate_use_case - score an exported lite model on a
//                       data directory
//
// Rules for this layer:
//   - No ML math or model code here
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training + export workflow
pub mod train_use_case;

// Offline evaluation of an exported model
pub mod evaluate_use_case;
