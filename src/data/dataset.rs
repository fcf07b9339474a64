use burn::data::dataset::Dataset;

use crate::domain::sample::LabeledImage;

/// In-memory set of preprocessed, labelled images.
pub struct ImageDataset {
    samples: Vec<LabeledImage>,
}

impl ImageDataset {
    pub fn new(samples: Vec<LabeledImage>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// Number of samples per class id, indexed by label.
    pub fn class_counts(&self, num_classes: usize) -> Vec<usize> {
        let mut counts = vec![0; num_classes];
        for s in &self.samples {
            if let Some(c) = counts.get_mut(s.label) {
                *c += 1;
            }
        }
        counts
    }
}

impl Dataset<LabeledImage> for ImageDataset {
    fn get(&self, index: usize) -> Option<LabeledImage> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
