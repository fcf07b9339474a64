// ============================================================
// Layer 2 — Image → .mem Use Case
// ============================================================
// Converts one image into a hardware memory-initialisation file:
//
//   1. Decode, colour-convert and resize    (Layer 4 - data)
//   2. Bias-shift every sample: u - 128     (Layer 3 - domain)
//   3. Render one hex byte per line         (Layer 3 - domain)
//   4. Write the file atomically            (Layer 6 - infra)
//
// Nothing is written unless every step succeeds.

use anyhow::{ensure, Result};
use std::path::PathBuf;

use crate::data::image::{load_image, ColorMode};
use crate::domain::{mem_format::to_mem_text, quantize::pixels_to_signed};
use crate::infra::artifact::ArtifactWriter;

#[derive(Debug, Clone)]
pub struct ImageMemConfig {
    pub image:  PathBuf,
    pub output: PathBuf,
    pub width:  u32,
    pub height: u32,
    pub mode:   ColorMode,
}

impl ImageMemConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 0 && self.height > 0,
            "output size must be positive, got {}x{}", self.width, self.height
        );
        Ok(())
    }
}

/// What was written, for the CLI summary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMemReport {
    pub output: PathBuf,
    pub lines:  usize,
}

pub struct ImageMemUseCase {
    config: ImageMemConfig,
}

impl ImageMemUseCase {
    pub fn new(config: ImageMemConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<ImageMemReport> {
        let cfg = &self.config;
        cfg.validate()?;

        let prepared = load_image(&cfg.image, cfg.width, cfg.height, cfg.mode)?;
        tracing::info!(
            "Loaded '{}' as {}x{} {}",
            cfg.image.display(), prepared.width, prepared.height, cfg.mode.name()
        );

        let signed = pixels_to_signed(&prepared.pixels);
        ensure!(
            signed.len() == prepared.sample_count(),
            "expected {} samples, decoder produced {}", prepared.sample_count(), signed.len()
        );
        ArtifactWriter::write(&cfg.output, &to_mem_text(&signed))?;
        tracing::info!("Wrote {} samples to '{}'", signed.len(), cfg.output.display());

        Ok(ImageMemReport { output: cfg.output.clone(), lines: signed.len() })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mem_format::parse_mem_text;
    use image::{GrayImage, Rgb, RgbImage};
    use std::fs;

    fn config(dir: &tempfile::TempDir, image: &str, w: u32, h: u32, mode: ColorMode) -> ImageMemConfig {
        ImageMemConfig {
            image:  dir.path().join(image),
            output: dir.path().join("out/image.mem"),
            width:  w,
            height: h,
            mode,
        }
    }

    #[test]
    fn test_two_by_two_grayscale() {
        let dir = tempfile::tempdir().unwrap();
        GrayImage::from_raw(2, 2, vec![0, 127, 128, 255]).unwrap()
            .save(dir.path().join("g.png")).unwrap();

        let cfg = config(&dir, "g.png", 2, 2, ColorMode::Grayscale);
        let report = ImageMemUseCase::new(cfg.clone()).execute().unwrap();

        assert_eq!(report.lines, 4);
        assert_eq!(fs::read_to_string(&cfg.output).unwrap(), "80\nff\n00\n7f\n");
    }

    #[test]
    fn test_default_size_gives_1024_lines() {
        let dir = tempfile::tempdir().unwrap();
        GrayImage::from_pixel(100, 80, image::Luma([90]))
            .save(dir.path().join("big.png")).unwrap();

        let cfg = config(&dir, "big.png", 32, 32, ColorMode::Grayscale);
        ImageMemUseCase::new(cfg.clone()).execute().unwrap();

        let values = parse_mem_text(&fs::read_to_string(&cfg.output).unwrap()).unwrap();
        assert_eq!(values.len(), 1024);
    }

    #[test]
    fn test_color_mode_writes_bgr_triples() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(2, 2, Rgb([255, 128, 0]))
            .save(dir.path().join("c.png")).unwrap();

        let cfg = config(&dir, "c.png", 2, 2, ColorMode::Bgr);
        let report = ImageMemUseCase::new(cfg.clone()).execute().unwrap();

        assert_eq!(report.lines, 12);
        let text = fs::read_to_string(&cfg.output).unwrap();
        assert!(text.starts_with("80\n00\n7f\n"));
    }

    #[test]
    fn test_missing_image_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, "absent.png", 32, 32, ColorMode::Grayscale);
        assert!(ImageMemUseCase::new(cfg.clone()).execute().is_err());
        assert!(!cfg.output.exists());
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, "any.png", 0, 32, ColorMode::Grayscale);
        assert!(cfg.validate().is_err());
    }
}
