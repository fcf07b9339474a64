// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Classifies one image with a trained checkpoint:
//
//   1. Rebuild the network from train_config.json
//   2. Load the latest weights
//   3. Preprocess the image exactly like training
//      (grayscale, bilinear resize, [0, 1])
//   4. Forward pass + softmax, pick the top class

use anyhow::Result;
use std::path::Path;

use crate::data::image::{load_image, ColorMode};
use crate::domain::sample::Prediction;
use crate::domain::traits::ImageClassifier;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{inferencer::Inferencer, InferBackend};

pub struct PredictUseCase<C: ImageClassifier> {
    classifier: C,
    image_size: u32,
}

impl PredictUseCase<Inferencer<InferBackend>> {
    /// Load the model saved under `checkpoint_dir`.
    pub fn from_checkpoint(checkpoint_dir: &str) -> Result<Self> {
        let ckpt       = CheckpointManager::new(checkpoint_dir);
        let device     = Default::default();
        let inferencer = Inferencer::<InferBackend>::from_checkpoint(&ckpt, device)?;
        let image_size = inferencer.image_size() as u32;
        Ok(Self::new(inferencer, image_size))
    }
}

impl<C: ImageClassifier> PredictUseCase<C> {
    pub fn new(classifier: C, image_size: u32) -> Self {
        Self { classifier, image_size }
    }

    pub fn predict(&self, image: &Path) -> Result<Prediction> {
        tracing::info!("Classifying '{}'", image.display());
        let prepared = load_image(image, self.image_size, self.image_size, ColorMode::Grayscale)?;
        let prediction = self.classifier.classify(&prepared.pixels)?;
        tracing::info!(
            "Predicted '{}' with probability {:.4}",
            prediction.label, prediction.confidence
        );
        Ok(prediction)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::CLASS_LABELS;
    use image::{GrayImage, Luma};

    /// Says "fall" for dark images, "not_fall" for bright ones.
    struct BrightnessClassifier {
        expected_len: usize,
    }

    impl ImageClassifier for BrightnessClassifier {
        fn classify(&self, pixels: &[u8]) -> Result<Prediction> {
            anyhow::ensure!(pixels.len() == self.expected_len, "wrong size");
            let mean = pixels.iter().map(|&p| f32::from(p)).sum::<f32>() / pixels.len() as f32;
            let bright = mean / 255.0;
            Prediction::from_probabilities(vec![1.0 - bright, bright], &CLASS_LABELS)
                .ok_or_else(|| anyhow::anyhow!("no scores"))
        }
    }

    #[test]
    fn test_image_is_resized_before_classification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bright.png");
        GrayImage::from_pixel(64, 48, Luma([240])).save(&path).unwrap();

        let use_case = PredictUseCase::new(BrightnessClassifier { expected_len: 32 * 32 }, 32);
        let p = use_case.predict(&path).unwrap();
        assert_eq!(p.label, "not_fall");
        assert!(p.confidence > 0.9);
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let use_case = PredictUseCase::new(BrightnessClassifier { expected_len: 1024 }, 32);
        assert!(use_case.predict(Path::new("nope.png")).is_err());
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PredictUseCase::from_checkpoint(&dir.path().to_string_lossy());
        assert!(result.is_err());
    }
}
