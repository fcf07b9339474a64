// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the config
//   Step 2: Load + preprocess images  (Layer 4 - data)
//   Step 3: Record class names        (Layer 4 - data)
//   Step 4: Split train/validation    (Layer 4 - data)
//   Step 5: Build datasets            (Layer 4 - data)
//   Step 6: Save config               (Layer 6 - infra)
//   Step 7: Run training loop         (Layer 5 - ml)

use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::ImageDataset,
    loader::ImageFolderLoader,
    splitter::split_train_val,
};
use crate::domain::sample::CLASS_LABELS;
use crate::domain::traits::SampleSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::FallCnnConfig;
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Saved next to the
// checkpoints so `predict` and `export-weights` can rebuild the
// same network, class list included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset_dir:      String,
    pub checkpoint_dir:   String,
    /// Side of the square grayscale input
    pub image_size:       u32,
    pub batch_size:       usize,
    pub epochs:           usize,
    pub lr:               f64,
    /// Fraction of samples held out for validation
    pub validation_split: f64,
    pub dropout:          f64,
    /// Seeds the train/validation split and batch shuffling
    pub seed:             u64,
    /// Label names in class-id order
    pub class_names:      Vec<String>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset_dir:      "fall_new/images".to_string(),
            checkpoint_dir:   "checkpoints".to_string(),
            image_size:       32,
            batch_size:       32,
            epochs:           30,
            lr:               1e-3,
            validation_split: 0.2,
            dropout:          0.5,
            seed:             42,
            class_names:      CLASS_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TrainConfig {
    /// Architecture described by this config.
    pub fn model_config(&self) -> FallCnnConfig {
        FallCnnConfig::new()
            .with_image_size(self.image_size as usize)
            .with_num_classes(self.class_names.len())
            .with_dropout(self.dropout)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.model_config().feature_side().is_some(),
            "--image-size {} is too small; the network needs at least 10 pixels per side",
            self.image_size
        );
        ensure!(self.batch_size > 0, "--batch-size must be at least 1");
        ensure!(self.epochs > 0, "--epochs must be at least 1");
        ensure!(
            self.lr.is_finite() && self.lr > 0.0,
            "--lr must be a positive number, got {}", self.lr
        );
        ensure!(
            (0.0..1.0).contains(&self.validation_split),
            "--validation-split must be in [0, 1), got {}", self.validation_split
        );
        ensure!(
            (0.0..1.0).contains(&self.dropout),
            "--dropout must be in [0, 1), got {}", self.dropout
        );
        ensure!(
            self.class_names.len() >= 2,
            "at least two classes are needed, got {}", self.class_names.len()
        );
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline end to end and return the per-epoch metrics.
    pub fn execute(&self) -> Result<Vec<EpochMetrics>> {
        let mut cfg = self.config.clone();
        cfg.validate()?;

        // ── Step 2: Load every image, grayscale and resized ───────────────────
        tracing::info!("Loading images from '{}'", cfg.dataset_dir);
        let loader  = ImageFolderLoader::new(&cfg.dataset_dir, cfg.image_size);
        let samples = loader.load_all()?;
        if samples.is_empty() {
            bail!(
                "No training images found in '{}'. Expected one sub-directory per class.",
                cfg.dataset_dir
            );
        }
        tracing::info!("Loaded {} images", samples.len());

        // ── Step 3: Class ids follow the sorted directory names ───────────────
        cfg.class_names = loader.class_names()?;
        cfg.validate()?;
        tracing::info!("Classes: {:?}", cfg.class_names);

        // ── Step 4: Seeded train / validation split ───────────────────────────
        let (train_samples, val_samples) =
            split_train_val(samples, 1.0 - cfg.validation_split, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );

        // ── Step 5: Build Burn datasets ───────────────────────────────────────
        let train_dataset = ImageDataset::new(train_samples);
        let val_dataset   = ImageDataset::new(val_samples);
        tracing::info!(
            "Training images per class: {:?}",
            train_dataset.class_counts(cfg.class_names.len())
        );

        // ── Step 6: Save config for inference and export ──────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(&cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 7: Run training loop (Layer 5) ───────────────────────────────
        run_training(&cfg, train_dataset, val_dataset, &ckpt_manager, &metrics)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = TrainConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.class_names, ["fall", "not_fall"]);
        assert_eq!(cfg.model_config().feature_side(), Some(6));
    }

    #[test]
    fn test_model_config_follows_class_count() {
        let cfg = TrainConfig {
            image_size:  48,
            dropout:     0.25,
            class_names: vec!["a".into(), "b".into(), "c".into()],
            ..TrainConfig::default()
        };
        let model_cfg = cfg.model_config();
        assert_eq!(model_cfg.image_size, 48);
        assert_eq!(model_cfg.num_classes, 3);
        assert_eq!(model_cfg.dropout, 0.25);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad = [
            TrainConfig { image_size: 9, ..TrainConfig::default() },
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { epochs: 0, ..TrainConfig::default() },
            TrainConfig { lr: 0.0, ..TrainConfig::default() },
            TrainConfig { validation_split: 1.0, ..TrainConfig::default() },
            TrainConfig { dropout: -0.1, ..TrainConfig::default() },
            TrainConfig { class_names: vec!["only".into()], ..TrainConfig::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn test_empty_dataset_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            dataset_dir:    dir.path().join("missing").to_string_lossy().to_string(),
            checkpoint_dir: dir.path().join("ckpt").to_string_lossy().to_string(),
            ..TrainConfig::default()
        };
        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert!(err.to_string().contains("No training images"));
    }
}
