// ============================================================
// Layer 3 — Samples and Predictions
// ============================================================

use serde::{Deserialize, Serialize};

/// Class names in label-id order. Ids follow the sorted names of
/// the class directories in the training set.
pub const CLASS_LABELS: [&str; 2] = ["fall", "not_fall"];

/// One preprocessed grayscale training image with its class id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledImage {
    /// Row-major 8-bit intensities, already resized
    pub pixels: Vec<u8>,
    pub label:  usize,
    /// File the image came from, for log messages
    pub source: String,
}

impl LabeledImage {
    pub fn new(pixels: Vec<u8>, label: usize, source: impl Into<String>) -> Self {
        Self { pixels, label, source: source.into() }
    }
}

/// Result of classifying a single image.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_index:   usize,
    pub label:         String,
    /// Probability of the winning class
    pub confidence:    f32,
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Pick the most probable class. Ties go to the lower index.
    /// Returns `None` for an empty probability vector.
    pub fn from_probabilities(probabilities: Vec<f32>, labels: &[&str]) -> Option<Self> {
        let (class_index, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((i, p)),
            })?;
        let label = labels
            .get(class_index)
            .map(|l| l.to_string())
            .unwrap_or_else(|| format!("class_{class_index}"));
        Some(Self { class_index, label, confidence, probabilities })
    }
}
