// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and all their flags. Defaults
// match the values the training and export scripts were run
// with, so a bare `fallmem train` reproduces a standard run.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    export_weights_use_case::ExportConfig,
    image_mem_use_case::ImageMemConfig,
    train_use_case::TrainConfig,
};
use crate::data::image::ColorMode;
use crate::domain::quantize::QuantBits;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the fall / not-fall classifier on an image folder
    Train(TrainArgs),

    /// Classify one image with the latest checkpoint
    Predict(PredictArgs),

    /// Convert one image into a signed 8-bit .mem file
    ImageToMem(ImageToMemArgs),

    /// Quantize checkpoint weights into .mem files plus a JSON manifest
    ExportWeights(ExportWeightsArgs),
}

/// Arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Root directory with one sub-directory of images per class
    #[arg(long, default_value = "fall_new/images")]
    pub dataset_dir: String,

    /// Directory to save model checkpoints, config and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Images are resized to image_size x image_size grayscale
    #[arg(long, default_value_t = 32)]
    pub image_size: u32,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 30)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Fraction of images held out for validation
    #[arg(long, default_value_t = 0.2)]
    pub validation_split: f64,

    /// Dropout probability before the output layer
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Seed for the train/validation split and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Class names are discovered from the dataset at train time.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            dataset_dir:      a.dataset_dir,
            checkpoint_dir:   a.checkpoint_dir,
            image_size:       a.image_size,
            batch_size:       a.batch_size,
            epochs:           a.epochs,
            lr:               a.lr,
            validation_split: a.validation_split,
            dropout:          a.dropout,
            seed:             a.seed,
            ..TrainConfig::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Image to classify
    #[arg(long)]
    pub image: PathBuf,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}

#[derive(Args, Debug)]
pub struct ImageToMemArgs {
    /// Image to convert
    #[arg(long)]
    pub image: PathBuf,

    /// Destination .mem file (overwritten if it exists)
    #[arg(long)]
    pub output: PathBuf,

    /// Side of the square output in pixels
    #[arg(long, default_value_t = 32)]
    pub image_size: u32,

    /// Emit three samples per pixel in B, G, R order instead of grayscale
    #[arg(long)]
    pub color: bool,
}

impl From<ImageToMemArgs> for ImageMemConfig {
    fn from(a: ImageToMemArgs) -> Self {
        ImageMemConfig {
            image:  a.image,
            output: a.output,
            width:  a.image_size,
            height: a.image_size,
            mode:   if a.color { ColorMode::Bgr } else { ColorMode::Grayscale },
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportWeightsArgs {
    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Directory for the .mem files and model_summary.json
    #[arg(long, default_value = "mem_output_32x32_signed")]
    pub output_dir: PathBuf,

    /// Quantization bit width (2 to 8)
    #[arg(long, default_value_t = 8)]
    pub bits: u8,
}

impl TryFrom<ExportWeightsArgs> for ExportConfig {
    type Error = anyhow::Error;

    fn try_from(a: ExportWeightsArgs) -> Result<Self> {
        Ok(ExportConfig {
            checkpoint_dir: a.checkpoint_dir,
            output_dir:     a.output_dir,
            bits:           QuantBits::new(a.bits)?,
        })
    }
}
