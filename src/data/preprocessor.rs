// ============================================================
// Layer 4: Sample Preprocessor
// ============================================================
// Turns the loader's flat rows into fixed-size motion windows.
//
// Two row layouts are understood:
//
//   window rows   - each row carries all 128x3 = 384 values
//                   of one sample, so one row = one Sample
//
//   timestep rows - each row carries a single (x, y, z)
//                   reading, and 128 consecutive rows make
//                   up one Sample
//
// Steps (applied in order):
//   1. Reject an empty dataset
//   2. Check every row has the same, supported feature width
//   3. Group timestep rows into windows (row count must be
//      divisible by 128, labels constant inside a window)
//   4. Validate labels: integral class ids in 0..3
//   5. Shuffle the samples
//
// Feature vectors are never truncated or padded: a length
// mismatch is reported as DatasetError::FeatureLength.
//
// Reference: Rust Book §8 (Vectors), §13 (Iterators)
//            rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::error::DatasetError;
use crate::domain::record::Record;
use crate::domain::sample::{Sample, CHANNELS, NUM_CLASSES, SAMPLE_LEN, WINDOW_LEN};

pub struct Preprocessor {
    /// Seed for the sample shuffle. None = fresh entropy every run.
    shuffle_seed: Option<u64>,
}

impl Preprocessor {
    pub fn new(shuffle_seed: Option<u64>) -> Self {
        Self { shuffle_seed }
    }

    /// Shape, validate and shuffle all records into Samples.
    pub fn prepare(&self, records: Vec<Record>) -> Result<Vec<Sample>, DatasetError> {
        let mut samples = build_samples(records)?;

        match self.shuffle_seed {
            Some(seed) => samples.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => samples.shuffle(&mut rand::thread_rng()),
        }

        tracing::debug!("Prepared {} samples", samples.len());
        Ok(samples)
    }
}

/// Shape records into samples without shuffling.
pub fn build_samples(records: Vec<Record>) -> Result<Vec<Sample>, DatasetError> {
    let first = records.first().ok_or(DatasetError::Empty)?;
    let width = first.width();

    if width != SAMPLE_LEN && width != CHANNELS {
        return Err(feature_length_error(first, width));
    }
    if let Some(bad) = records.iter().find(|r| r.width() != width) {
        return Err(feature_length_error(bad, width));
    }
    for record in &records {
        check_label(record)?;
    }

    if width == SAMPLE_LEN {
        return Ok(records
            .into_iter()
            .map(|r| Sample::new(r.features, r.label))
            .collect());
    }

    if records.len() % WINDOW_LEN != 0 {
        return Err(DatasetError::NotDivisible {
            rows:   records.len(),
            window: WINDOW_LEN,
        });
    }

    records
        .chunks(WINDOW_LEN)
        .enumerate()
        .map(|(window, rows)| {
            let label = rows[0].label;
            if let Some(other) = rows.iter().find(|r| r.label != label) {
                return Err(DatasetError::MixedWindowLabel {
                    window,
                    first: label,
                    other: other.label,
                });
            }
            let features = rows
                .iter()
                .flat_map(|r| r.features.iter().copied())
                .collect();
            Ok(Sample::new(features, label))
        })
        .collect()
}

fn feature_length_error(record: &Record, expected_width: usize) -> DatasetError {
    let expected = if expected_width == SAMPLE_LEN || expected_width == CHANNELS {
        expected_width.to_string()
    } else {
        format!("{} or {}", SAMPLE_LEN, CHANNELS)
    };
    DatasetError::FeatureLength {
        source_file: record.source.clone(),
        expected,
        found: record.width(),
    }
}

fn check_label(record: &Record) -> Result<(), DatasetError> {
    let label = record.label;
    if label.fract() != 0.0 || label < 0.0 || label >= NUM_CLASSES as f32 {
        return Err(DatasetError::InvalidLabel {
            source_file: record.source.clone(),
            label,
            num_classes: NUM_CLASSES,
        });
    }
    Ok(())
}
