// ============================================================
// Layer 3: Core Traits
// ============================================================
// The application layer programs against these traits rather
// than the concrete loader and inference engine:
//   - NpyLoader  implements RecordSource
//   - Inferencer implements Classifier
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::record::Record;
use crate::domain::sample::Sample;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce labelled rows.
pub trait RecordSource {
    /// Load every valid row. Malformed inputs are skipped, not errors.
    fn load_all(&self) -> Result<Vec<Record>>;
}

// ─── Classifier ───────────────────────────────────────────────────────────────
/// Any component that can assign a class to motion windows.
pub trait Classifier {
    /// Per-class probabilities for each sample, in input order.
    fn probabilities(&self, samples: &[Sample]) -> Result<Vec<Vec<f32>>>;

    /// Most likely class for each sample, in input order.
    fn classify(&self, samples: &[Sample]) -> Result<Vec<usize>> {
        Ok(self
            .probabilities(samples)?
            .iter()
            .map(|p| argmax(p))
            .collect())
    }
}

/// Index of the largest value (first one wins on ties).
pub fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_i, best_v), (i, &v)| {
            if v > best_v { (i, v) } else { (best_i, best_v) }
        })
        .0
}
