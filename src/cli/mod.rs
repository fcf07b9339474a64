// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// use case in Layer 2. Results are printed here and nowhere else.
//
//   train          — train the classifier, write checkpoints
//   predict        — classify one image
//   image-to-mem   — image → signed hex .mem file
//   export-weights — checkpoint → quantized .mem files + manifest

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, ExportWeightsArgs, ImageToMemArgs, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "fallmem",
    version,
    about = "Train a fall-detection CNN and export images and weights as FPGA .mem files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the use case; this layer only routes and prints.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)         => run_train(args),
            Commands::Predict(args)       => run_predict(args),
            Commands::ImageToMem(args)    => run_image_to_mem(args),
            Commands::ExportWeights(args) => run_export_weights(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on images in: {}", args.dataset_dir);
    let checkpoint_dir = args.checkpoint_dir.clone();

    let history = TrainUseCase::new(args.into()).execute()?;

    if let Some(last) = history.last() {
        println!(
            "Training complete. Final validation accuracy: {:.1}%",
            last.val_acc * 100.0
        );
    }
    println!("Checkpoints saved to '{}'.", checkpoint_dir);
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case   = PredictUseCase::from_checkpoint(&args.checkpoint_dir)?;
    let prediction = use_case.predict(&args.image)?;
    println!(
        "Prediction: {} (Confidence: {:.2})",
        prediction.label, prediction.confidence
    );
    Ok(())
}

fn run_image_to_mem(args: ImageToMemArgs) -> Result<()> {
    use crate::application::image_mem_use_case::ImageMemUseCase;

    let report = ImageMemUseCase::new(args.into()).execute()?;
    println!(
        "Saved {} signed 8-bit values to '{}'.",
        report.lines,
        report.output.display()
    );
    Ok(())
}

fn run_export_weights(args: ExportWeightsArgs) -> Result<()> {
    use crate::application::export_weights_use_case::ExportWeightsUseCase;

    let report = ExportWeightsUseCase::new(args.try_into()?).execute()?;
    println!(
        "Exported {} layers ({} .mem files). Manifest: '{}'.",
        report.layers,
        report.files.len(),
        report.manifest.display()
    );
    Ok(())
}
