// ============================================================
// Layer 4: Train/Validation/Test Splitter
// ============================================================
// Splits the shuffled samples into three disjoint partitions
// with two sequential seeded splits:
//
//   all samples ──20%──► test
//        │
//        └─ rest ──25%──► validation
//             │
//             └─ rest ──► training
//
// which gives a nominal 60/20/20. Each split draws a random
// permutation from an RNG seeded with the same seed, takes the
// first ceil(fraction * n) indices as the held-out side and the
// remainder as the kept side. Same seed + same input order
// = same partitions.
//
// Reference: rand crate documentation (SeedableRng, SliceRandom)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::error::DatasetError;
use crate::domain::sample::Sample;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of all samples held out for testing
    pub test_fraction: f64,
    /// Fraction of the remaining samples held out for validation
    pub val_fraction:  f64,
    /// Seed used by both splits
    pub seed:          u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            val_fraction:  0.25,
            seed:          1,
        }
    }
}

/// The three disjoint partitions of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Partitions {
    pub train:      Vec<Sample>,
    pub validation: Vec<Sample>,
    pub test:       Vec<Sample>,
}

/// Split `samples` into train/validation/test.
pub fn split_partitions(samples: Vec<Sample>, cfg: &SplitConfig) -> Result<Partitions, DatasetError> {
    let total = samples.len();

    let (rest, test) = split_at_fraction(samples, cfg.test_fraction, &mut StdRng::seed_from_u64(cfg.seed));
    let (train, validation) = split_at_fraction(rest, cfg.val_fraction, &mut StdRng::seed_from_u64(cfg.seed));

    if train.is_empty() {
        return Err(DatasetError::SplitTooSmall { total });
    }

    tracing::debug!(
        "Dataset split: {} train, {} validation, {} test",
        train.len(),
        validation.len(),
        test.len(),
    );

    Ok(Partitions { train, validation, test })
}

/// Permute `items` with `rng` and split off ceil(fraction * n) of them.
///
/// # Returns
/// A tuple (kept, held_out)
pub fn split_at_fraction<T>(items: Vec<T>, fraction: f64, rng: &mut StdRng) -> (Vec<T>, Vec<T>) {
    let total    = items.len();
    let held_out = ((total as f64) * fraction).ceil() as usize;
    let held_out = held_out.min(total);

    let mut order: Vec<usize> = (0..total).collect();
    order.shuffle(rng);

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut take = |i: &usize| slots[*i].take();

    let held: Vec<T> = order[..held_out].iter().filter_map(&mut take).collect();
    let kept: Vec<T> = order[held_out..].iter().filter_map(&mut take).collect();
    (kept, held)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn samples(n: usize) -> Vec<Sample> {
        (0..n).map(|i| Sample::new(vec![i as f32], (i % 3) as f32)).collect()
    }

    #[test]
    fn test_nominal_60_20_20() {
        let parts = split_partitions(samples(100), &SplitConfig::default()).unwrap();
        assert_eq!(parts.test.len(), 20);
        assert_eq!(parts.validation.len(), 20);
        assert_eq!(parts.train.len(), 60);
    }

    #[test]
    fn test_rounding_goes_to_held_out_side() {
        // ceil(0.2 * 7) = 2 test, ceil(0.25 * 5) = 2 validation
        let parts = split_partitions(samples(7), &SplitConfig::default()).unwrap();
        assert_eq!(parts.test.len(), 2);
        assert_eq!(parts.validation.len(), 2);
        assert_eq!(parts.train.len(), 3);
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let parts = split_partitions(samples(50), &SplitConfig::default()).unwrap();
        let mut seen: Vec<f32> = parts
            .train
            .iter()
            .chain(&parts.validation)
            .chain(&parts.test)
            .map(|s| s.features[0])
            .collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<f32> = (0..50).map(|i| i as f32).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_same_seed_same_partitions() {
        let data = samples(40);
        let a = split_partitions(data.clone(), &SplitConfig::default()).unwrap();
        let b = split_partitions(data, &SplitConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_changes_partitions() {
        let data = samples(40);
        let a = split_partitions(data.clone(), &SplitConfig::default()).unwrap();
        let b = split_partitions(data, &SplitConfig { seed: 2, ..SplitConfig::default() }).unwrap();
        assert_ne!(a.test, b.test);
    }

    #[test]
    fn test_too_few_samples() {
        // 2 samples: 1 test, then the single remaining one goes to validation
        let err = split_partitions(samples(2), &SplitConfig::default()).unwrap_err();
        assert_eq!(err, DatasetError::SplitTooSmall { total: 2 });
    }
}
