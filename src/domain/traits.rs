// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to these traits, not to Burn or
// the filesystem directly:
//
//   - ImageFolderLoader implements SampleSource
//   - Inferencer        implements ImageClassifier
//   - FallCnn<B>        implements ParameterSource
//
// ParameterSource is what lets the weight exporter be tested
// with a hand-built layer list instead of a trained network.

use anyhow::Result;

use crate::domain::param::LayerParams;
use crate::domain::sample::{LabeledImage, Prediction};

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Anything that can produce labelled, preprocessed training images.
pub trait SampleSource {
    fn load_all(&self) -> Result<Vec<LabeledImage>>;
}

// ─── ImageClassifier ──────────────────────────────────────────────────────────
/// Classifies one preprocessed grayscale image.
pub trait ImageClassifier {
    /// `pixels` is row-major, already resized to the model's input size.
    fn classify(&self, pixels: &[u8]) -> Result<Prediction>;
}

// ─── ParameterSource ──────────────────────────────────────────────────────────
/// A model whose layers can be walked for export.
pub trait ParameterSource {
    /// Per-sample input shape (no batch dimension)
    fn input_shape(&self) -> Vec<usize>;

    /// Per-sample output shape (no batch dimension)
    fn output_shape(&self) -> Vec<usize>;

    /// Every layer in forward order, including parameter-free ones.
    fn layer_params(&self) -> Result<Vec<LayerParams>>;
}
