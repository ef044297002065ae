// ============================================================
// Layer 1: CLI Arguments
// ============================================================
// Training is the default action and takes two positional
// arguments, the data folder and the model output folder:
//
//   motion-cnn <DATA_DIR> <MODEL_OUTPUT> [--epochs N ...]
//
// `evaluate` scores a previously exported model:
//
//   motion-cnn evaluate <DATA_DIR> <MODEL_DIR>
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score an exported lite model on a folder of .npy files
    Evaluate(EvaluateArgs),
}

/// Arguments for the default training run.
/// Positionals are optional in the type so `evaluate` can be
/// parsed without them; clap still requires them for training.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Folder searched recursively for .npy training files
    #[arg(required = true)]
    pub data_dir: Option<String>,

    /// Folder that receives the lite model, configs, metrics and curves
    #[arg(required = true)]
    pub model_output: Option<String>,

    /// Folder for the full model (kept apart from MODEL_OUTPUT)
    #[arg(long, default_value = "lite_models")]
    pub full_model_dir: String,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 170, value_parser = positive)]
    pub epochs: usize,

    /// Samples per gradient step
    #[arg(long, default_value_t = 32, value_parser = positive)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// Seed for the train/validation/test split
    #[arg(long, default_value_t = 1)]
    pub split_seed: u64,

    /// Seed for the initial sample shuffle (unseeded when omitted)
    #[arg(long)]
    pub shuffle_seed: Option<u64>,

    /// Fraction of all samples held out for testing
    #[arg(long, default_value_t = 0.2, value_parser = fraction)]
    pub test_fraction: f64,

    /// Fraction of the remaining samples held out for validation
    #[arg(long, default_value_t = 0.25, value_parser = fraction)]
    pub val_fraction: f64,
}

fn positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// A held-out share: 0 <= f < 1
fn fraction(s: &str) -> Result<f64, String> {
    let f: f64 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if (0.0..1.0).contains(&f) {
        Ok(f)
    } else {
        Err(format!("{f} is not in [0, 1)"))
    }
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:       a.data_dir.unwrap_or_default(),
            model_output:   a.model_output.unwrap_or_default(),
            full_model_dir: a.full_model_dir,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            split_seed:     a.split_seed,
            shuffle_seed:   a.shuffle_seed,
            test_fraction:  a.test_fraction,
            val_fraction:   a.val_fraction,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Folder searched recursively for .npy files
    pub data_dir: String,

    /// Folder holding model_fine_tuning.bin and model_config.json
    pub model_dir: String,
}
