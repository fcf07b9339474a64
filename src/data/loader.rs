// ============================================================
// Layer 4 — Image Folder Loader
// ============================================================
// Loads a labelled image set laid out one directory per class:
//
//   fall_new/images/
//     fall/        ← label 0
//       img001.jpg
//       ...
//     not_fall/    ← label 1
//       img101.jpg
//       ...
//
// Class ids follow the sorted directory names, so the mapping
// is stable across machines and runs. Every image is decoded,
// converted to grayscale and resized on load; the dataset is
// small enough to hold in memory.
//
// Files with other extensions are ignored. Files that fail to
// decode are logged and skipped — one corrupt photo should not
// abort a training run.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::image::{load_image, ColorMode};
use crate::domain::sample::LabeledImage;
use crate::domain::traits::SampleSource;

const SUPPORTED_EXTENSIONS: [&str; 4] = ["bmp", "jpg", "jpeg", "png"];

/// Loads every supported image under a class-per-directory root.
pub struct ImageFolderLoader {
    root:       PathBuf,
    image_size: u32,
}

impl ImageFolderLoader {
    pub fn new(root: impl Into<PathBuf>, image_size: u32) -> Self {
        Self { root: root.into(), image_size }
    }

    /// Sorted names of the class directories under the root.
    pub fn class_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("Cannot read dataset directory '{}'", self.root.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn load_class(&self, dir: &Path, label: usize) -> Result<Vec<LabeledImage>> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Cannot read class directory '{}'", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_supported(path))
            .collect();
        files.sort();

        let mut samples = Vec::with_capacity(files.len());
        for path in files {
            match load_image(&path, self.image_size, self.image_size, ColorMode::Grayscale) {
                Ok(img) => samples.push(LabeledImage::new(
                    img.pixels,
                    label,
                    path.display().to_string(),
                )),
                Err(e) => tracing::warn!("Skipping '{}': {:#}", path.display(), e),
            }
        }
        Ok(samples)
    }
}

impl SampleSource for ImageFolderLoader {
    fn load_all(&self) -> Result<Vec<LabeledImage>> {
        if !self.root.exists() {
            tracing::warn!(
                "Dataset directory '{}' does not exist — returning empty set",
                self.root.display()
            );
            return Ok(Vec::new());
        }

        let mut samples = Vec::new();
        for (label, class) in self.class_names()?.iter().enumerate() {
            let class_samples = self.load_class(&self.root.join(class), label)?;
            tracing::info!("Class '{}' (label {}): {} images", class, label, class_samples.len());
            samples.extend(class_samples);
        }
        Ok(samples)
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn write_png(path: &Path, value: u8) {
        GrayImage::from_pixel(8, 8, Luma([value])).save(path).unwrap();
    }

    #[test]
    fn test_labels_follow_sorted_class_names() {
        let dir = tempfile::tempdir().unwrap();
        for class in ["not_fall", "fall"] {
            fs::create_dir(dir.path().join(class)).unwrap();
        }
        write_png(&dir.path().join("fall/a.png"), 10);
        write_png(&dir.path().join("not_fall/b.png"), 20);
        write_png(&dir.path().join("not_fall/c.png"), 30);

        let loader = ImageFolderLoader::new(dir.path(), 4);
        assert_eq!(loader.class_names().unwrap(), vec!["fall", "not_fall"]);

        let samples = loader.load_all().unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].label, 0);
        assert_eq!(samples[1].label, 1);
        assert!(samples.iter().all(|s| s.pixels.len() == 16));
    }

    #[test]
    fn test_bad_and_foreign_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("fall")).unwrap();
        write_png(&dir.path().join("fall/good.png"), 50);
        fs::write(dir.path().join("fall/broken.jpg"), b"garbage").unwrap();
        fs::write(dir.path().join("fall/notes.txt"), b"not an image").unwrap();

        let samples = ImageFolderLoader::new(dir.path(), 8).load_all().unwrap();
        assert_eq!(samples.len(), 1);
        assert!(samples[0].source.ends_with("good.png"));
    }

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        assert!(is_supported(Path::new("x/IMG_001.JPG")));
        assert!(is_supported(Path::new("x/a.jpeg")));
        assert!(!is_supported(Path::new("x/a.gif")));
        assert!(!is_supported(Path::new("x/README")));
    }

    #[test]
    fn test_missing_root_gives_empty_set() {
        let loader = ImageFolderLoader::new("does/not/exist", 32);
        assert!(loader.load_all().unwrap().is_empty());
    }
}
