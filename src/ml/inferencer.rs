// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{anyhow, ensure, Result};
use burn::prelude::*;

use crate::data::batcher::pixels_to_tensor;
use crate::domain::sample::Prediction;
use crate::domain::traits::ImageClassifier;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::FallCnn;

pub struct Inferencer<B: Backend> {
    model:       FallCnn<B>,
    image_size:  usize,
    class_names: Vec<String>,
    device:      B::Device,
}

impl<B: Backend> Inferencer<B> {
    /// Rebuild the network from the saved config and load the latest weights.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg   = ckpt_manager.load_config()?;
        let model = cfg.model_config().with_dropout(0.0).init::<B>(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");
        Ok(Self::new(model, cfg.class_names, device))
    }

    pub fn new(model: FallCnn<B>, class_names: Vec<String>, device: B::Device) -> Self {
        let image_size = model.image_size;
        Self { model, image_size, class_names, device }
    }

    /// Side length of the square input this model expects
    pub fn image_size(&self) -> usize {
        self.image_size
    }
}

impl<B: Backend> ImageClassifier for Inferencer<B> {
    fn classify(&self, pixels: &[u8]) -> Result<Prediction> {
        let side = self.image_size;
        ensure!(
            pixels.len() == side * side,
            "expected {}x{} grayscale pixels ({} samples), got {}",
            side, side, side * side, pixels.len()
        );

        let input = pixels_to_tensor::<B>(pixels, 1, side, side, &self.device);
        let probs: Vec<f32> = self.model
            .forward_probs(input)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read model output: {e:?}"))?;

        let labels: Vec<&str> = self.class_names.iter().map(String::as_str).collect();
        let prediction = Prediction::from_probabilities(probs, &labels)
            .ok_or_else(|| anyhow!("Model produced no class scores"))?;

        tracing::debug!("Probabilities: {:?}", prediction.probabilities);
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::FallCnnConfig;
    use burn::backend::NdArray;

    fn inferencer() -> Inferencer<NdArray> {
        let device = Default::default();
        let model = FallCnnConfig::new().with_image_size(12).init::<NdArray>(&device);
        Inferencer::new(model, vec!["fall".into(), "not_fall".into()], device)
    }

    #[test]
    fn test_classify_returns_known_label() {
        let p = inferencer().classify(&[128u8; 144]).unwrap();
        assert!(p.label == "fall" || p.label == "not_fall");
        assert!(p.confidence >= 0.5 && p.confidence <= 1.0);
        assert_eq!(p.probabilities.len(), 2);
    }

    #[test]
    fn test_wrong_pixel_count_is_rejected() {
        assert!(inferencer().classify(&[0u8; 100]).is_err());
    }
}
