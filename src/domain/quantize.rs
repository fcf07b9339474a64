// ============================================================
// Layer 3 — Quantization
// ============================================================
// Two separate mappings into signed 8-bit space:
//
//   1. pixel_to_signed     — image path, fixed bias shift
//                            u8 0..=255  →  i8 -128..=127  (u - 128)
//
//   2. quantize_symmetric  — weight/bias path, per-tensor scale
//                            scale = qmax / max(|w|)   (1 if all zero)
//                            q     = clip(round(w * scale), qmin, qmax)
//
// The pixel path has no data-dependent scale. The tensor path
// never produces qmin from scaling alone: the largest magnitude
// lands exactly on ±qmax, so qmin is only reachable through the
// clip in quantize_with_scale when a caller supplies its own scale.
//
// Rounding is round-half-to-even: an exact x.5 after scaling goes
// to the even neighbour (2.5 → 2, -63.5 → -64).

use anyhow::{ensure, Result};

// ─── QuantBits ────────────────────────────────────────────────────────────────
/// Bit width of the signed integer target range.
///
/// Every width still serialises as one byte per element in a .mem
/// file; narrower widths only shrink the value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantBits(u8);

impl QuantBits {
    /// The hardware's native width: [-128, 127]
    pub const INT8: QuantBits = QuantBits(8);

    pub fn new(bits: u8) -> Result<Self> {
        ensure!(
            (2..=8).contains(&bits),
            "quantization bit width must be between 2 and 8, got {bits}"
        );
        Ok(Self(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Largest representable value, 2^(bits-1) - 1
    pub fn max(self) -> i8 {
        ((1i16 << (self.0 - 1)) - 1) as i8
    }

    /// Smallest representable value, -2^(bits-1)
    pub fn min(self) -> i8 {
        (-(1i16 << (self.0 - 1))) as i8
    }
}

impl Default for QuantBits {
    fn default() -> Self {
        Self::INT8
    }
}

// ─── QuantizedTensor ──────────────────────────────────────────────────────────
/// A parameter tensor after symmetric quantization.
///
/// `scale` is kept for logging only; it is never written next to the
/// values, so each .mem file decodes on its own as raw integers.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedTensor {
    /// Row-major quantized elements
    pub values: Vec<i8>,
    /// Shape of the source tensor
    pub shape:  Vec<usize>,
    /// Multiplier that was applied before rounding
    pub scale:  f32,
}

impl QuantizedTensor {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ─── Image path ───────────────────────────────────────────────────────────────
/// Map an unsigned pixel into signed range by subtracting 128.
pub fn pixel_to_signed(pixel: u8) -> i8 {
    (i16::from(pixel) - 128) as i8
}

pub fn pixels_to_signed(pixels: &[u8]) -> Vec<i8> {
    pixels.iter().copied().map(pixel_to_signed).collect()
}

// ─── Weight path ──────────────────────────────────────────────────────────────
/// Scale that maps the largest magnitude in `values` onto `bits.max()`.
/// An all-zero (or empty) tensor gets a scale of 1.
pub fn symmetric_scale(values: &[f32], bits: QuantBits) -> f32 {
    let max_abs = values.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    if max_abs == 0.0 {
        1.0
    } else {
        f32::from(bits.max()) / max_abs
    }
}

/// Multiply, round half to even, and clip into `[bits.min(), bits.max()]`.
/// NaN elements become 0.
pub fn quantize_with_scale(values: &[f32], scale: f32, bits: QuantBits) -> Vec<i8> {
    let lo = f32::from(bits.min());
    let hi = f32::from(bits.max());
    values
        .iter()
        .map(|&v| (v * scale).round_ties_even().clamp(lo, hi) as i8)
        .collect()
}

/// Per-tensor symmetric linear quantization (no zero point).
pub fn quantize_symmetric(values: &[f32], shape: &[usize], bits: QuantBits) -> QuantizedTensor {
    debug_assert_eq!(shape.iter().product::<usize>(), values.len());
    let scale = symmetric_scale(values, bits);
    QuantizedTensor {
        values: quantize_with_scale(values, scale, bits),
        shape:  shape.to_vec(),
        scale,
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_pixel_bias_shift_endpoints() {
        assert_eq!(pixel_to_signed(0), -128);
        assert_eq!(pixel_to_signed(127), -1);
        assert_eq!(pixel_to_signed(128), 0);
        assert_eq!(pixel_to_signed(255), 127);
    }

    #[test]
    fn test_pixel_bias_shift_is_bit_flip_of_msb() {
        // (u - 128) mod 256 for every byte
        for u in 0..=255u8 {
            assert_eq!(pixel_to_signed(u) as u8, u.wrapping_sub(128));
            assert_eq!(i16::from(pixel_to_signed(u)), i16::from(u) - 128);
        }
    }

    #[test]
    fn test_zero_tensor_uses_unit_scale() {
        let q = quantize_symmetric(&[0.0; 6], &[2, 3], QuantBits::INT8);
        assert_eq!(q.scale, 1.0);
        assert_eq!(q.values, vec![0i8; 6]);
        assert_eq!(q.shape, vec![2, 3]);
    }

    #[test]
    fn test_max_magnitude_maps_to_127() {
        let q = quantize_symmetric(&[0.5, -0.25, 0.125], &[3], QuantBits::INT8);
        assert_eq!(q.values[0], 127);
        assert_eq!(q.values[1], -64); // -63.5 rounds to even
    }

    #[test]
    fn test_negative_peak_never_reaches_minus_128() {
        let q = quantize_symmetric(&[-3.0, 1.0, 2.0], &[3], QuantBits::INT8);
        assert_eq!(q.values[0], -127);
        assert!(q.values.iter().all(|&v| v > -128));
    }

    #[test]
    fn test_random_tensor_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let values: Vec<f32> = (0..4096).map(|_| rng.gen_range(-5.0f32..5.0)).collect();
        let q = quantize_symmetric(&values, &[64, 64], QuantBits::INT8);
        let max_abs = q.values.iter().map(|v| i16::from(*v).abs()).max().unwrap();
        assert_eq!(max_abs, 127);
        assert!(q.values.iter().all(|&v| v >= -127));
    }

    #[test]
    fn test_clip_path_saturates_both_ends() {
        // scale pushes 2.0 and -2.0 past the int8 range
        let q = quantize_with_scale(&[1.0, -2.0, 2.0, 0.5], 100.0, QuantBits::INT8);
        assert_eq!(q, vec![100, -128, 127, 50]);
    }

    #[test]
    fn test_round_half_to_even() {
        // max is 127 so the scale is exactly 1
        let q = quantize_symmetric(&[127.0, 2.5, -2.5, 1.5, 0.5], &[5], QuantBits::INT8);
        assert_eq!(q.scale, 1.0);
        assert_eq!(q.values, vec![127, 2, -2, 2, 0]);
    }

    #[test]
    fn test_nan_becomes_zero() {
        let q = quantize_with_scale(&[f32::NAN, 1.0], 1.0, QuantBits::INT8);
        assert_eq!(q, vec![0, 1]);
    }

    #[test]
    fn test_narrow_bit_width() {
        let bits = QuantBits::new(4).unwrap();
        assert_eq!(bits.max(), 7);
        assert_eq!(bits.min(), -8);
        let q = quantize_symmetric(&[1.0, -1.0, 0.5], &[3], bits);
        assert_eq!(q.values, vec![7, -7, 4]);
    }

    #[test]
    fn test_bit_width_validation() {
        assert!(QuantBits::new(1).is_err());
        assert!(QuantBits::new(9).is_err());
        assert_eq!(QuantBits::new(8).unwrap(), QuantBits::INT8);
        assert_eq!(QuantBits::INT8.min(), -128);
        assert_eq!(QuantBits::INT8.max(), 127);
    }
}
