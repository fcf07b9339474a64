use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        Relu,
    },
    prelude::*,
};

/// Square kernel of both convolutions
pub const CONV_KERNEL: usize = 3;
/// Square window and stride of both max-pool layers
pub const POOL_SIZE: usize = 2;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct FallCnnConfig {
    /// Side length of the square grayscale input
    #[config(default = 32)]
    pub image_size: usize,
    #[config(default = 2)]
    pub num_classes: usize,
    #[config(default = 32)]
    pub conv1_channels: usize,
    #[config(default = 64)]
    pub conv2_channels: usize,
    #[config(default = 128)]
    pub hidden: usize,
    #[config(default = 0.5)]
    pub dropout: f64,
}

/// Output side of an unpadded, stride-1 convolution.
pub fn conv_side(input: usize, kernel: usize) -> Option<usize> {
    (input + 1).checked_sub(kernel).filter(|&s| s > 0)
}

/// Output side of a non-overlapping max pool (floor division).
pub fn pool_side(input: usize) -> Option<usize> {
    Some(input / POOL_SIZE).filter(|&s| s > 0)
}

impl FallCnnConfig {
    /// Side of the feature map that reaches the flatten layer, or
    /// `None` when the input is too small for two conv/pool stages.
    pub fn feature_side(&self) -> Option<usize> {
        let s = conv_side(self.image_size, CONV_KERNEL)?;
        let s = pool_side(s)?;
        let s = conv_side(s, CONV_KERNEL)?;
        pool_side(s)
    }

    /// # Panics
    /// Panics if `image_size` is too small for two conv/pool stages;
    /// configs are validated before they get here.
    pub fn init<B: Backend>(&self, device: &B::Device) -> FallCnn<B> {
        let side = self.feature_side();
        assert!(
            side.is_some(),
            "image_size {} is too small for two conv/pool stages",
            self.image_size
        );
        let flat = self.conv2_channels * side.unwrap_or(1).pow(2);

        let conv1 = Conv2dConfig::new([1, self.conv1_channels], [CONV_KERNEL, CONV_KERNEL])
            .init(device);
        let conv2 = Conv2dConfig::new([self.conv1_channels, self.conv2_channels], [CONV_KERNEL, CONV_KERNEL])
            .init(device);
        let pool = MaxPool2dConfig::new([POOL_SIZE, POOL_SIZE]).with_strides([POOL_SIZE, POOL_SIZE]);

        FallCnn {
            conv1,
            pool1:      pool.init(),
            conv2,
            pool2:      pool.init(),
            fc1:        LinearConfig::new(flat, self.hidden).init(device),
            dropout:    DropoutConfig::new(self.dropout).init(),
            fc2:        LinearConfig::new(self.hidden, self.num_classes).init(device),
            activation: Relu::new(),
            image_size: self.image_size,
        }
    }
}

/// Two conv/pool stages, a hidden dense layer with dropout, and a
/// class head. Input is `[batch, 1, image_size, image_size]` in [0, 1].
#[derive(Module, Debug)]
pub struct FallCnn<B: Backend> {
    pub conv1:      Conv2d<B>,
    pub pool1:      MaxPool2d,
    pub conv2:      Conv2d<B>,
    pub pool2:      MaxPool2d,
    pub fc1:        Linear<B>,
    pub dropout:    Dropout,
    pub fc2:        Linear<B>,
    pub activation: Relu,
    pub image_size: usize,
}

impl<B: Backend> FallCnn<B> {
    /// images: [batch, 1, H, W] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.conv1.forward(images));
        let x = self.pool1.forward(x);
        let x = self.activation.forward(self.conv2.forward(x));
        let x = self.pool2.forward(x);

        let [batch, channels, height, width] = x.dims();
        let x = x.reshape([batch, channels * height * width]);

        let x = self.activation.forward(self.fc1.forward(x));
        let x = self.dropout.forward(x);
        self.fc2.forward(x)
    }

    /// Class probabilities: softmax over the logits.
    pub fn forward_probs(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        burn::tensor::activation::softmax(self.forward(images), 1)
    }

    /// Cross-entropy on logits. Returns (loss, logits).
    pub fn forward_loss(
        &self,
        images:  Tensor<B, 4>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(images);
        let ce = burn::nn::loss::CrossEntropyLossConfig::new().init(&logits.device());
        let loss = ce.forward(logits.clone(), targets);
        (loss, logits)
    }
}

/// Number of predictions in `logits` whose argmax equals `targets`.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    let predicted = logits.argmax(1).squeeze::<1>(1);
    let correct: i64 = predicted.equal(targets).int().sum().into_scalar().elem::<i64>();
    correct.max(0) as usize
}
