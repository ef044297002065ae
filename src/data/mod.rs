// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// Everything from raw .npy files to tensor batches:
//
//   .npy files
//       │
//       ▼
//   NpyLoader       → walks the tree, keeps (n, features+label) arrays
//       │
//       ▼
//   Preprocessor    → shapes rows into 128x3 windows, shuffles
//       │
//       ▼
//   split_partitions→ seeded 60/20/20 train/validation/test
//       │
//       ▼
//   MotionDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   MotionBatcher   → stacks samples into [N, 1, 128, 3] tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads .npy files from a directory tree using ndarray-npy
pub mod loader;

/// Shapes raw rows into motion windows
pub mod preprocessor;

/// Seeded train/validation/test split
pub mod splitter;

/// Implements Burn's Dataset trait for motion samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
