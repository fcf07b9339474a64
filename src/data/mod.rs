// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between image files on disk and tensor batches:
//
//   dataset_dir/<class>/*.jpg
//       │
//       ▼
//   ImageFolderLoader → decodes, grayscales, resizes each file
//       │
//       ▼
//   split_train_val   → seeded shuffle, 80/20 split
//       │
//       ▼
//   ImageDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher      → stacks samples into [N, 1, H, W] tensors
//
// The same `image` module also serves the single-image paths
// (predict and image-to-mem), so preprocessing is identical
// across training, inference and export.

/// Decoding, colour conversion and resizing of single images
pub mod image;

/// Walks a class-per-directory image tree
pub mod loader;

/// Implements Burn's Dataset trait for labelled images
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
