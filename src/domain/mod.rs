// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types and functions that define what the exporter
// works with: quantized tensors, the .mem text format, tagged
// model parameters, and the JSON manifest.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums, functions and traits
//
// Everything the hardware consumer sees is decided here, so
// this is the layer with the densest unit tests.

// Fixed-offset pixel mapping and symmetric tensor quantization
pub mod quantize;

// Signed bytes <-> two's-complement hex lines
pub mod mem_format;

// Layer parameters tagged with their role (weights / biases)
pub mod param;

// model_summary.json structure
pub mod manifest;

// Labelled training images and classifier predictions
pub mod sample;

// Core abstractions (traits) that other layers implement
pub mod traits;
