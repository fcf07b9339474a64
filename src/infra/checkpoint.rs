// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores FallCnn weights with Burn's named MessagePack
// recorder (gzip) at full f32 precision. The weight exporter reads
// these files, so a half-precision recorder would change the
// quantized bytes.
//
// What gets saved:
//   1. Model weights (.mpk.gz file), one per epoch
//   2. latest_epoch.json, the epoch that was saved last
//   3. train_config.json, the hyperparameters and class names
//
// The config is needed to rebuild the exact network (image size,
// channel counts, class list) before the weights can be loaded
// into it; the recorder refuses mismatched architectures.
//
// File layout:
//   checkpoints/
//     model_epoch_1.mpk.gz
//     model_epoch_2.mpk.gz
//     ...
//     latest_epoch.json
//     train_config.json
//     metrics.csv           ← written by MetricsLogger

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::FallCnn;

const LATEST_EPOCH_FILE: &str = "latest_epoch.json";
const CONFIG_FILE:       &str = "train_config.json";

type WeightRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Nothing is touched on disk until the first save.
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", self.dir.display()))
    }

    /// Write `{dir}/model_epoch_{epoch}.mpk.gz` and point
    /// latest_epoch.json at it.
    pub fn save_model<B: Backend>(&self, model: &FallCnn<B>, epoch: usize) -> Result<()> {
        self.ensure_dir()?;
        // recorder adds the extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        WeightRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let latest_path = self.dir.join(LATEST_EPOCH_FILE);
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write {LATEST_EPOCH_FILE}"))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the latest saved weights into `model`.
    ///
    /// `model` must have the architecture the checkpoint was trained
    /// with; build it from [`CheckpointManager::load_config`].
    pub fn load_model<B: Backend>(&self, model: FallCnn<B>, device: &B::Device) -> Result<FallCnn<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = WeightRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Must be called before training starts.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' first.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed training config '{}'", path.display()))
    }

    /// Epoch number stored in latest_epoch.json.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join(LATEST_EPOCH_FILE);

        let s = fs::read_to_string(&path)
            .with_context(|| format!(
                "Cannot find '{}'. Have you run 'train' first?",
                path.display()
            ))?;

        Ok(serde_json::from_str::<usize>(s.trim())?)
    }
}
