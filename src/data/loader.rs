// ============================================================
// Layer 4: .npy Loader
// ============================================================
// Walks a directory tree and loads every .npy file using the
// ndarray-npy crate.
//
// Expected file layout:
//   A rank-2 numeric array of shape (n, w). The last column
//   is the class label, the first w-1 columns are features:
//
//     row 0: [f0, f1, ..., f(w-2), label]
//     row 1: [f0, f1, ..., f(w-2), label]
//     ...
//
// A file that is not rank-2, or has no room for both a feature
// and a label column, is malformed: it is skipped with a
// warning naming what is wrong. Any other read failure aborts the run.
//
// Reference: ndarray-npy crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use ndarray::{ArrayD, Ix2};
use ndarray_npy::{ReadNpyError, ReadNpyExt};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::record::Record;
use crate::domain::traits::RecordSource;

/// Loads every .npy file under a directory, recursively.
/// Implements the RecordSource trait from Layer 3.
pub struct NpyLoader {
    /// Root directory of the data files
    dir: PathBuf,
}

impl NpyLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RecordSource for NpyLoader {
    fn load_all(&self) -> Result<Vec<Record>> {
        if !self.dir.exists() {
            tracing::warn!(
                "Data directory '{}' does not exist, returning empty dataset",
                self.dir.display()
            );
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        collect_npy_files(&self.dir, &mut files)?;

        let mut records = Vec::new();
        let mut accepted = 0usize;

        for path in &files {
            match load_single_npy(path)? {
                NpyContents::Rows(rows) => {
                    tracing::debug!("Loaded: {} ({} rows)", path.display(), rows.len());
                    accepted += 1;
                    records.extend(rows);
                }
                NpyContents::Improper(problem) => {
                    let name = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown");
                    tracing::warn!(
                        "Improper data for {}: {}; expected a rank-2 array with feature \
                         columns followed by one label column",
                        name,
                        problem
                    );
                }
            }
        }

        tracing::info!(
            "Loaded {} rows from {} of {} files",
            records.len(),
            accepted,
            files.len()
        );
        Ok(records)
    }
}

/// Depth-first collection of .npy paths. Entries are sorted per
/// directory so the load order is stable for a given tree.
fn collect_npy_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("Cannot list directory '{}'", dir.display()))?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_npy_files(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("npy") {
            out.push(path);
        }
    }
    Ok(())
}

enum NpyContents {
    Rows(Vec<Record>),
    /// Parsed, but not a (rows, features + label) table
    Improper(String),
}

/// Why an array of this shape cannot hold labeled rows, if it can't.
fn shape_problem(shape: &[usize]) -> Option<String> {
    match shape {
        [_, cols] if *cols < 2 => Some(format!("{cols} column(s), need at least 2")),
        [_, _] => None,
        other => Some(format!("rank {} array", other.len())),
    }
}

/// Read one file. Malformed arrays come back as Improper so the
/// caller can skip them.
fn load_single_npy(path: &Path) -> Result<NpyContents> {
    let bytes = fs::read(path).with_context(|| format!("Cannot read '{}'", path.display()))?;
    let array = read_numeric(&bytes)
        .with_context(|| format!("Cannot parse '{}' as a numeric .npy array", path.display()))?;

    if let Some(problem) = shape_problem(array.shape()) {
        return Ok(NpyContents::Improper(problem));
    }

    let array = array
        .into_dimensionality::<Ix2>()
        .with_context(|| format!("Unexpected shape in '{}'", path.display()))?;
    let width = array.ncols();
    let source = path.display().to_string();

    let rows = array
        .outer_iter()
        .map(|row| {
            let features: Vec<f32> = row.iter().take(width - 1).copied().collect();
            Record::new(source.clone(), features, row[width - 1])
        })
        .collect();

    Ok(NpyContents::Rows(rows))
}

/// Parse the array as f32, falling back through the other numeric
/// dtypes numpy commonly writes. Everything is widened/narrowed to f32.
fn read_numeric(bytes: &[u8]) -> Result<ArrayD<f32>, ReadNpyError> {
    match ArrayD::<f32>::read_npy(bytes) {
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        other => return other,
    }
    match ArrayD::<f64>::read_npy(bytes) {
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        other => return other.map(|a| a.mapv(|v| v as f32)),
    }
    match ArrayD::<i64>::read_npy(bytes) {
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        other => return other.map(|a| a.mapv(|v| v as f32)),
    }
    ArrayD::<i32>::read_npy(bytes).map(|a| a.mapv(|v| v as f32))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::dataset_shape;
    use ndarray::{Array1, Array2};
    use ndarray_npy::WriteNpyExt;
    use std::fs::File;

    fn write_rows(path: &Path, rows: usize, width: usize, label: f32) {
        let array = Array2::<f32>::from_shape_fn((rows, width), |(r, c)| {
            if c == width - 1 { label } else { (r * width + c) as f32 }
        });
        array.write_npy(File::create(path).unwrap()).unwrap();
    }

    #[test]
    fn test_row_count_is_sum_of_valid_files() {
        let tmp = tempfile::tempdir().unwrap();
        write_rows(&tmp.path().join("a.npy"), 128, 4, 0.0);
        fs::create_dir(tmp.path().join("nested")).unwrap();
        write_rows(&tmp.path().join("nested/b.npy"), 256, 4, 1.0);
        write_rows(&tmp.path().join("c.npy"), 128, 4, 2.0);

        let records = NpyLoader::new(tmp.path()).load_all().unwrap();
        assert_eq!(dataset_shape(&records), (512, 2));
        assert!(records.iter().all(|r| r.width() == 3));
    }

    #[test]
    fn test_shape_rule() {
        assert_eq!(shape_problem(&[10, 2]), None);
        assert_eq!(shape_problem(&[10, 385]), None);
        assert_eq!(shape_problem(&[5, 1]).unwrap(), "1 column(s), need at least 2");
        assert_eq!(shape_problem(&[12]).unwrap(), "rank 1 array");
        assert_eq!(shape_problem(&[2, 3, 4]).unwrap(), "rank 3 array");
    }

    #[test]
    fn test_malformed_files_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_rows(&tmp.path().join("good.npy"), 10, 4, 1.0);

        // rank-1 array: no second dimension at all
        Array1::<f32>::zeros(12)
            .write_npy(File::create(tmp.path().join("flat.npy")).unwrap())
            .unwrap();
        // single column: no room for features and label
        Array2::<f32>::zeros((5, 1))
            .write_npy(File::create(tmp.path().join("narrow.npy")).unwrap())
            .unwrap();

        let records = NpyLoader::new(tmp.path()).load_all().unwrap();
        assert_eq!(records.len(), 10);
    }

    #[test]
    fn test_non_npy_files_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        write_rows(&tmp.path().join("data.npy"), 3, 2, 0.0);
        fs::write(tmp.path().join("README.txt"), "not data").unwrap();

        let records = NpyLoader::new(tmp.path()).load_all().unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_label_is_last_column() {
        let tmp = tempfile::tempdir().unwrap();
        let array = Array2::<f64>::from_shape_vec((1, 4), vec![0.5, 1.5, 2.5, 2.0]).unwrap();
        array.write_npy(File::create(tmp.path().join("f64.npy")).unwrap()).unwrap();

        let records = NpyLoader::new(tmp.path()).load_all().unwrap();
        assert_eq!(records[0].features, vec![0.5, 1.5, 2.5]);
        assert_eq!(records[0].label, 2.0);
    }

    #[test]
    fn test_corrupt_npy_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("broken.npy"), b"definitely not numpy").unwrap();
        assert!(NpyLoader::new(tmp.path()).load_all().is_err());
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let records = NpyLoader::new("/nonexistent/motion/data").load_all().unwrap();
        assert!(records.is_empty());
    }
}
