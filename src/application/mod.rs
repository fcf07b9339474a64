// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Each use case orchestrates the other layers to accomplish
// one subcommand.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - File access only through Layer 4 (data) and Layer 6 (infra)
//   - Only workflow coordination

// Train the classifier and write checkpoints
pub mod train_use_case;

// Classify one image with the latest checkpoint
pub mod predict_use_case;

// Convert one image into a .mem file
pub mod image_mem_use_case;

// Quantize checkpoint parameters into .mem files + manifest
pub mod export_weights_use_case;
