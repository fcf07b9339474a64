// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn network code lives here:
//
//   model.rs      — FallCnn: conv/pool ×2 → dense → dropout → head
//   params.rs     — walks FallCnn into role-tagged plain tensors
//                   for the weight exporter
//   trainer.rs    — Adam training loop with validation, metrics
//                   and per-epoch checkpoints
//   inferencer.rs — loads a checkpoint and classifies one image
//
// Backend choice: Wgpu by default, NdArray when the crate is
// built without the `wgpu` feature. Tests always use NdArray.

pub mod model;

pub mod params;

pub mod trainer;

pub mod inferencer;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

pub type TrainBackend = burn::backend::Autodiff<InferBackend>;
