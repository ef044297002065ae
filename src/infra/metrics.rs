// ============================================================
// Layer 6: Metrics
// ============================================================
// Two things live here:
//
//   1. Per-epoch training metrics, appended to a CSV file and
//      collected into a TrainingHistory for the loss/accuracy
//      curves.
//
//   2. A confusion matrix with plain precision / recall / F1
//      functions, used for the test-set and `evaluate` reports.
//
// Output file: <model_output>/metrics.csv
//
//   epoch,train_loss,train_acc,val_loss,val_acc
//   1,1.104512,0.341000,1.097310,0.355000
//   2,1.081250,0.402000,1.079921,0.410000
//   ...
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean cross-entropy over all training batches
    pub train_loss: f64,

    /// Fraction of training samples classified correctly
    pub train_acc: f64,

    /// Mean cross-entropy on the validation partition
    pub val_loss: f64,

    /// Fraction of validation samples classified correctly
    pub val_acc: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, train_acc: f64, val_loss: f64, val_acc: f64) -> Self {
        Self { epoch, train_loss, train_acc, val_loss, val_acc }
    }
}

/// Everything recorded during one training run, in epoch order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochMetrics>,
}

impl TrainingHistory {
    pub fn push(&mut self, m: EpochMetrics) {
        self.epochs.push(m);
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn train_loss(&self) -> Vec<f64> {
        self.epochs.iter().map(|m| m.train_loss).collect()
    }

    pub fn val_loss(&self) -> Vec<f64> {
        self.epochs.iter().map(|m| m.val_loss).collect()
    }

    pub fn train_acc(&self) -> Vec<f64> {
        self.epochs.iter().map(|m| m.train_acc).collect()
    }

    pub fn val_acc(&self) -> Vec<f64> {
        self.epochs.iter().map(|m| m.val_acc).collect()
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the logger and write a fresh CSV header.
    /// Each training run starts a new file.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "epoch,train_loss,train_acc,val_loss,val_acc")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.train_acc, m.val_loss, m.val_acc,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Confusion Matrix ─────────────────────────────────────────────────────────
/// counts[actual][predicted]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(num_classes: usize) -> Self {
        Self { counts: vec![vec![0; num_classes]; num_classes] }
    }

    pub fn from_predictions(num_classes: usize, actual: &[usize], predicted: &[usize]) -> Self {
        let mut m = Self::new(num_classes);
        for (&a, &p) in actual.iter().zip(predicted) {
            m.record(a, p);
        }
        m
    }

    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn record(&mut self, actual: usize, predicted: usize) {
        self.counts[actual][predicted] += 1;
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.num_classes()).map(|c| self.counts[c][c]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct(), self.total())
    }

    /// Of everything predicted as `class`, the fraction that was right.
    pub fn precision(&self, class: usize) -> f64 {
        let predicted: usize = self.counts.iter().map(|row| row[class]).sum();
        ratio(self.counts[class][class], predicted)
    }

    /// Of everything that really is `class`, the fraction that was found.
    pub fn recall(&self, class: usize) -> f64 {
        let actual: usize = self.counts[class].iter().sum();
        ratio(self.counts[class][class], actual)
    }

    pub fn f1(&self, class: usize) -> f64 {
        f1_score(self.precision(class), self.recall(class))
    }

    /// Unweighted mean F1 over all classes
    pub fn macro_f1(&self) -> f64 {
        let n = self.num_classes();
        if n == 0 {
            return 0.0;
        }
        (0..n).map(|c| self.f1(c)).sum::<f64>() / n as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "class  precision  recall     f1  support")?;
        for c in 0..self.num_classes() {
            writeln!(
                f,
                "{:>5}  {:>9.3}  {:>6.3}  {:>5.3}  {:>7}",
                c,
                self.precision(c),
                self.recall(c),
                self.f1(c),
                self.counts[c].iter().sum::<usize>(),
            )?;
        }
        write!(f, "accuracy={:.3} macro_f1={:.3}", self.accuracy(), self.macro_f1())
    }
}

pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_recall_f1() {
        // actual:    0 0 1 1 2 2
        // predicted: 0 1 1 1 2 0
        let m = ConfusionMatrix::from_predictions(3, &[0, 0, 1, 1, 2, 2], &[0, 1, 1, 1, 2, 0]);
        assert_eq!(m.total(), 6);
        assert_eq!(m.correct(), 4);
        assert!((m.precision(1) - 2.0 / 3.0).abs() < 1e-9);
        assert!((m.recall(1) - 1.0).abs() < 1e-9);
        assert!((m.recall(2) - 0.5).abs() < 1e-9);
        assert!((m.f1(1) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_empty_class_scores_zero() {
        let m = ConfusionMatrix::from_predictions(3, &[0, 0], &[0, 0]);
        assert_eq!(m.precision(2), 0.0);
        assert_eq!(m.recall(2), 0.0);
        assert_eq!(m.f1(2), 0.0);
        assert_eq!(m.accuracy(), 1.0);
    }

    #[test]
    fn test_csv_rows_are_appended() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(tmp.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 1.1, 0.3, 1.0, 0.4)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.9, 0.5, 0.95, 0.45)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,train_acc,val_loss,val_acc");
        assert!(lines[2].starts_with("2,0.900000,0.500000"));
    }

    #[test]
    fn test_history_series() {
        let mut h = TrainingHistory::default();
        h.push(EpochMetrics::new(1, 1.0, 0.2, 1.2, 0.1));
        h.push(EpochMetrics::new(2, 0.8, 0.4, 1.0, 0.3));
        assert_eq!(h.train_loss(), vec![1.0, 0.8]);
        assert_eq!(h.val_acc(), vec![0.1, 0.3]);
    }
}
