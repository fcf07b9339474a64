// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   - Training runs on TrainBackend (Autodiff<…>) for gradients
//   - model.valid() returns the model on the inner backend, with
//     dropout disabled
//   - The validation batcher must use the inner backend too
//   - argmax(1) returns [batch, 1], squeezed before comparing
//
// Every epoch writes one checkpoint and one metrics CSV row.

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ImageBatcher, dataset::ImageDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{count_correct, FallCnn};
use crate::ml::TrainBackend;

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: ImageDataset,
    val_dataset:   ImageDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<Vec<EpochMetrics>> {
    let device = <TrainBackend as Backend>::Device::default();
    tracing::info!("Using device: {:?}", device);
    let (_model, history) =
        train_loop::<TrainBackend>(cfg, train_dataset, val_dataset, ckpt_manager, metrics, device)?;
    Ok(history)
}

/// Backend-generic loop; returns the trained model and per-epoch metrics.
pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: ImageDataset,
    val_dataset:   ImageDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<(FallCnn<B>, Vec<EpochMetrics>)> {
    ensure!(train_dataset.sample_count() > 0, "Training set is empty");

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = cfg.model_config();
    let mut model: FallCnn<B> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: input {}x{}, {} classes",
        model_cfg.image_size, model_cfg.image_size, model_cfg.num_classes
    );

    let mut optim = AdamConfig::new().with_epsilon(1e-7).init();

    let side = cfg.image_size as usize;

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_total  = train_dataset.sample_count();
    let train_loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone(), side, side))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_total  = val_dataset.sample_count();
    let val_loader = DataLoaderBuilder::new(ImageBatcher::<B::InnerBackend>::new(device.clone(), side, side))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut history = Vec::with_capacity(cfg.epochs);
    let mut best_val_acc = f64::NEG_INFINITY;

    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;
        let mut train_correct  = 0usize;

        for batch in train_loader.iter() {
            let (loss, logits) = model.forward_loss(batch.images, batch.targets.clone());

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;
            train_correct  += count_correct(logits, batch.targets);

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;
        let mut val_correct  = 0usize;

        for batch in val_loader.iter() {
            let (loss, logits) = model_valid.forward_loss(batch.images, batch.targets.clone());
            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;
            val_correct  += count_correct(logits, batch.targets);
        }

        let m = EpochMetrics::new(
            epoch,
            mean(train_loss_sum, train_batches),
            mean(val_loss_sum, val_batches),
            fraction(train_correct, train_total),
            fraction(val_correct, val_total),
        );

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.1}% | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs, m.train_loss, m.train_acc * 100.0, m.val_loss, m.val_acc * 100.0,
        );

        if m.is_improvement(best_val_acc) {
            best_val_acc = m.val_acc;
            tracing::info!("New best validation accuracy: {:.4}", best_val_acc);
        }

        metrics.log(&m)?;
        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
        history.push(m);
    }

    tracing::info!("Training complete!");
    Ok((model, history))
}

fn mean(sum: f64, count: usize) -> f64 {
    if count > 0 { sum / count as f64 } else { f64::NAN }
}

fn fraction(hits: usize, total: usize) -> f64 {
    if total > 0 { hits as f64 / total as f64 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::LabeledImage;
    use burn::backend::{Autodiff, NdArray};

    fn tiny_set(n: usize, side: usize) -> Vec<LabeledImage> {
        (0..n)
            .map(|i| {
                let label = i % 2;
                let value = if label == 0 { 20 } else { 230 };
                LabeledImage::new(vec![value; side * side], label, format!("img{i}"))
            })
            .collect()
    }

    #[test]
    fn test_one_epoch_writes_checkpoint_and_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt_dir = dir.path().to_string_lossy().to_string();
        let cfg = TrainConfig {
            checkpoint_dir: ckpt_dir.clone(),
            image_size:     12,
            batch_size:     4,
            epochs:         1,
            ..TrainConfig::default()
        };

        let ckpt    = CheckpointManager::new(&ckpt_dir);
        let metrics = MetricsLogger::new(&ckpt_dir).unwrap();
        let (_, history) = train_loop::<Autodiff<NdArray>>(
            &cfg,
            ImageDataset::new(tiny_set(8, 12)),
            ImageDataset::new(tiny_set(2, 12)),
            &ckpt,
            &metrics,
            Default::default(),
        )
        .unwrap();

        assert_eq!(history.len(), 1);
        assert!(history[0].train_loss.is_finite());
        assert!((0.0..=1.0).contains(&history[0].val_acc));
        assert!(dir.path().join("latest_epoch.json").exists());
        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_empty_training_set_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt_dir = dir.path().to_string_lossy().to_string();
        let result = train_loop::<Autodiff<NdArray>>(
            &TrainConfig { image_size: 12, ..TrainConfig::default() },
            ImageDataset::new(Vec::new()),
            ImageDataset::new(Vec::new()),
            &CheckpointManager::new(&ckpt_dir),
            &MetricsLogger::new(&ckpt_dir).unwrap(),
            Default::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_averages() {
        assert_eq!(mean(3.0, 2), 1.5);
        assert!(mean(1.0, 0).is_nan());
        assert_eq!(fraction(1, 4), 0.25);
        assert_eq!(fraction(0, 0), 0.0);
    }
}
