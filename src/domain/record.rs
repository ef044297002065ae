// ============================================================
// Layer 3: Record Domain Type
// ============================================================
// One row of a data file: a feature vector plus a label.
// The loader flattens every accepted file into Records, so a
// dataset is logically a (rows, 2) table of [features, label].

use serde::{Deserialize, Serialize};

/// A single labelled row loaded from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The file this row came from, kept so shape errors can name it
    pub source: String,

    /// Raw feature values in file order
    pub features: Vec<f32>,

    /// Class label as stored in the file (cast to float on load)
    pub label: f32,
}

impl Record {
    pub fn new(source: impl Into<String>, features: Vec<f32>, label: f32) -> Self {
        Self {
            source: source.into(),
            features,
            label,
        }
    }

    pub fn width(&self) -> usize {
        self.features.len()
    }
}

/// Logical shape of a stacked dataset: one row per record, two fields each.
pub fn dataset_shape(records: &[Record]) -> (usize, usize) {
    (records.len(), 2)
}
