// ============================================================
// Layer 2 — Export Weights Use Case
// ============================================================
// Turns a trained checkpoint into hardware-ready files:
//
//   output_dir/
//     layer_0_conv1_weights.mem
//     layer_0_conv1_biases.mem
//     layer_2_conv2_weights.mem
//     ...
//     model_summary.json
//
// Every parameter tensor is quantized on its own (symmetric,
// per-tensor, no zero point) and written as one hex byte per
// line in row-major order. Layer indices count every layer in
// forward order, parameter-free ones included, so the numbering
// matches the manifest.
//
// The manifest is written last: if it exists, every file it
// names was written before it.

use anyhow::{ensure, Result};
use std::path::{Path, PathBuf};

use crate::domain::{
    manifest::{shape_tuple, LayerEntry, ModelManifest, ParamEntry},
    mem_format::to_mem_text,
    param::{ParamRole, ParamTensor},
    quantize::{quantize_symmetric, QuantBits},
    traits::ParameterSource,
};
use crate::infra::{artifact::ArtifactWriter, checkpoint::CheckpointManager};
use crate::ml::{model::FallCnn, InferBackend};

pub const MANIFEST_FILE: &str = "model_summary.json";

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub checkpoint_dir: String,
    pub output_dir:     PathBuf,
    pub bits:           QuantBits,
}

/// Summary of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub layers:   usize,
    pub files:    Vec<PathBuf>,
    pub manifest: PathBuf,
}

pub struct ExportWeightsUseCase {
    config: ExportConfig,
}

impl ExportWeightsUseCase {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Load the latest checkpoint and export it.
    pub fn execute(&self) -> Result<ExportReport> {
        let cfg  = &self.config;
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir);

        let train_cfg = ckpt.load_config()?;
        let device    = Default::default();
        let model: FallCnn<InferBackend> = train_cfg.model_config().init(&device);
        let model = ckpt.load_model(model, &device)?;

        export_parameters(&model, &cfg.output_dir, cfg.bits)
    }
}

/// Quantize every parameter of `source` into `output_dir` and write
/// the manifest describing them.
pub fn export_parameters(
    source:     &impl ParameterSource,
    output_dir: &Path,
    bits:       QuantBits,
) -> Result<ExportReport> {
    tracing::info!(
        "Exporting {}-bit parameters to '{}'",
        bits.bits(), output_dir.display()
    );

    let layers = source.layer_params()?;
    let mut manifest = ModelManifest::new(&source.input_shape(), &source.output_shape());
    let mut files = Vec::new();

    for (i, layer) in layers.iter().enumerate() {
        let mut entry = LayerEntry::new(
            &layer.name,
            &layer.kind,
            layer.output_shape.as_deref(),
            layer.trainable,
        );

        for param in &layer.params {
            let file_name = format!("layer_{i}_{}_{}.mem", layer.name, param.role.label());
            let path = output_dir.join(&file_name);
            write_param(param, &path, bits, &layer.name)?;

            let param_entry = ParamEntry { shape: shape_tuple(&param.shape), file: file_name };
            match param.role {
                ParamRole::Weight => entry.weights = Some(param_entry),
                ParamRole::Bias   => entry.biases  = Some(param_entry),
            }
            files.push(path);
        }

        manifest.push(entry);
    }

    let manifest_path = output_dir.join(MANIFEST_FILE);
    ArtifactWriter::write(&manifest_path, &manifest.to_json()?)?;
    tracing::info!(
        "Wrote {} parameter files and '{}'",
        files.len(), manifest_path.display()
    );

    Ok(ExportReport { layers: layers.len(), files, manifest: manifest_path })
}

fn write_param(param: &ParamTensor, path: &Path, bits: QuantBits, layer: &str) -> Result<()> {
    ensure!(
        param.is_consistent(),
        "layer '{}' {}: shape {:?} does not match {} values",
        layer, param.role, param.shape, param.values.len()
    );
    ensure!(
        param.values.iter().all(|v| v.is_finite()),
        "layer '{}' {} contains NaN or infinite values; refusing to quantize",
        layer, param.role
    );

    let q = quantize_symmetric(&param.values, &param.shape, bits);
    tracing::debug!(
        "{} {}: {} values, shape {:?}, scale {:.4}",
        layer, param.role, q.len(), q.shape, q.scale
    );
    ArtifactWriter::write(path, &to_mem_text(&q.values))
}
