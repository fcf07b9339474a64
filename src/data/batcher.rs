// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to stack labelled images into
// the tensors the CNN consumes:
//
//   images:  [batch, 1, height, width]  f32 in [0, 1]
//   targets: [batch]                    class ids
//
// Every sample has the same geometry because the loader resizes
// on read, so batching is a flatten + reshape.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::image::to_unit_range;
use crate::domain::sample::LabeledImage;

/// A batch of images ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Shape: [batch_size, 1, height, width]
    pub images: Tensor<B, 4>,

    /// Shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
    pub height: usize,
    pub width:  usize,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device, height: usize, width: usize) -> Self {
        Self { device, height, width }
    }
}

/// Turn row-major 8-bit grayscale images into a `[n, 1, h, w]` tensor
/// rescaled to [0, 1]. `pixels` holds `n * h * w` samples back to back.
pub fn pixels_to_tensor<B: Backend>(
    pixels: &[u8],
    n:      usize,
    height: usize,
    width:  usize,
    device: &B::Device,
) -> Tensor<B, 4> {
    let data = TensorData::new(to_unit_range(pixels), [n, 1, height, width]);
    Tensor::<B, 4>::from_data(data.convert::<B::FloatElem>(), device)
}

impl<B: Backend> Batcher<LabeledImage, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<LabeledImage>) -> ImageBatch<B> {
        let batch_size = items.len();

        let pixels: Vec<u8> = items
            .iter()
            .flat_map(|s| s.pixels.iter().copied())
            .collect();
        let images = pixels_to_tensor::<B>(&pixels, batch_size, self.height, self.width, &self.device);

        let labels: Vec<i64> = items.iter().map(|s| s.label as i64).collect();
        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]).convert::<B::IntElem>(),
            &self.device,
        );

        ImageBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_scaling() {
        let device = Default::default();
        let batcher = ImageBatcher::<NdArray>::new(device, 2, 2);
        let batch = batcher.batch(vec![
            LabeledImage::new(vec![0, 255, 0, 255], 0, "a"),
            LabeledImage::new(vec![255, 255, 255, 255], 1, "b"),
        ]);

        assert_eq!(batch.images.dims(), [2, 1, 2, 2]);
        assert_eq!(batch.targets.dims(), [2]);

        let values = batch.images.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values[1], 1.0);
        assert_eq!(values[0], 0.0);
        let labels = batch.targets.into_data().convert::<i64>().to_vec::<i64>().unwrap();
        assert_eq!(labels, vec![0, 1]);
    }
}
