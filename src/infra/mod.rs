// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting file I/O shared by the use cases:
//
//   checkpoint.rs — full-precision model weights (Burn recorder),
//                   plus train_config.json so inference and
//                   export can rebuild the same network
//
//   metrics.rs    — per-epoch loss / accuracy rows in a CSV
//
//   artifact.rs   — atomic writes for every emitted .mem file
//                   and the model summary JSON

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Atomic output file writer
pub mod artifact;
