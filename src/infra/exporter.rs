// ============================================================
// Layer 6: Model Exporter
// ============================================================
// Writes the trained model to disk with Burn's recorders.
//
// Artifacts:
//   <full_model_dir>/model_full.mpk.gz      ← full model, named
//                                             MessagePack + gzip
//   <output_dir>/model_fine_tuning.bin      ← lite model, compact
//                                             binary, full precision
//   <output_dir>/model_config.json          ← architecture, needed
//                                             to rebuild the module
//   <output_dir>/train_config.json          ← hyperparameters used
//
// The lite format keeps f32 weights (no quantization) and drops
// field names and compression, so it loads with nothing but the
// module definition and a BinFileRecorder.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{anyhow, Context, Result};
use burn::{
    prelude::*,
    record::{BinFileRecorder, FullPrecisionSettings, NamedMpkGzFileRecorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{MotionCnn, MotionCnnConfig};

pub const FULL_MODEL_NAME:   &str = "model_full";
pub const LITE_MODEL_NAME:   &str = "model_fine_tuning";
pub const MODEL_CONFIG_FILE: &str = "model_config.json";
pub const TRAIN_CONFIG_FILE: &str = "train_config.json";

type FullRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;
type LiteRecorder = BinFileRecorder<FullPrecisionSettings>;

pub struct ModelExporter {
    /// Where the lite model and configs go
    output_dir:     PathBuf,
    /// Where the full model goes
    full_model_dir: PathBuf,
}

impl ModelExporter {
    /// Exporter for a training run. Creates both directories if absent.
    pub fn create(output_dir: impl Into<PathBuf>, full_model_dir: impl Into<PathBuf>) -> Result<Self> {
        let exporter = Self::open(output_dir, full_model_dir);
        for dir in [&exporter.output_dir, &exporter.full_model_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create directory '{}'", dir.display()))?;
        }
        Ok(exporter)
    }

    /// Exporter over existing artifacts, for loading only.
    pub fn open(output_dir: impl Into<PathBuf>, full_model_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir:     output_dir.into(),
            full_model_dir: full_model_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the lite model file, extension included
    pub fn lite_path(&self) -> PathBuf {
        self.output_dir.join(format!("{LITE_MODEL_NAME}.bin"))
    }

    /// Path of the full model file, extension included
    pub fn full_path(&self) -> PathBuf {
        self.full_model_dir.join(format!("{FULL_MODEL_NAME}.mpk.gz"))
    }

    pub fn save_full<B: Backend>(&self, model: &MotionCnn<B>) -> Result<PathBuf> {
        // The recorder appends the extension itself
        let path = self.full_model_dir.join(FULL_MODEL_NAME);
        model
            .clone()
            .save_file(path.clone(), &FullRecorder::new())
            .with_context(|| format!("Failed to save full model to '{}'", path.display()))?;
        tracing::debug!("Saved full model: {}", self.full_path().display());
        Ok(self.full_path())
    }

    pub fn save_lite<B: Backend>(&self, model: &MotionCnn<B>) -> Result<PathBuf> {
        let path = self.output_dir.join(LITE_MODEL_NAME);
        model
            .clone()
            .save_file(path.clone(), &LiteRecorder::new())
            .with_context(|| format!("Failed to save lite model to '{}'", path.display()))?;
        tracing::debug!("Saved lite model: {}", self.lite_path().display());
        Ok(self.lite_path())
    }

    pub fn load_lite<B: Backend>(&self, model: MotionCnn<B>, device: &B::Device) -> Result<MotionCnn<B>> {
        let path = self.output_dir.join(LITE_MODEL_NAME);
        model
            .load_file(path.clone(), &LiteRecorder::new(), device)
            .with_context(|| {
                format!("Cannot load lite model '{}'. Has the model been trained?", path.display())
            })
    }

    pub fn save_model_config(&self, cfg: &MotionCnnConfig) -> Result<()> {
        let path = self.output_dir.join(MODEL_CONFIG_FILE);
        cfg.save(&path)
            .with_context(|| format!("Cannot write model config to '{}'", path.display()))
    }

    pub fn load_model_config(&self) -> Result<MotionCnnConfig> {
        let path = self.output_dir.join(MODEL_CONFIG_FILE);
        MotionCnnConfig::load(&path)
            .map_err(|e| anyhow!("Cannot read model config '{}': {e:?}", path.display()))
    }

    pub fn save_train_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.output_dir.join(TRAIN_CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }
}
