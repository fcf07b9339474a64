// ============================================================
// Layer 3 — .mem Text Format
// ============================================================
// A memory-initialisation file is plain text with one byte per
// line, written as exactly two lowercase hex digits:
//
//   signed  -128  →  80
//   signed    -1  →  ff
//   signed     0  →  00
//   signed   127  →  7f
//
// The byte is the two's-complement bit pattern of the signed
// value. There is no header and no shape information; the line
// count equals the element count of the flattened tensor.

use anyhow::{bail, Result};

/// Two-digit lowercase hex of the value's unsigned bit pattern.
pub fn hex_byte(value: i8) -> String {
    format!("{:02x}", value as u8)
}

/// Serialise row-major signed bytes, one line per element.
pub fn to_mem_text(values: &[i8]) -> String {
    let mut out = String::with_capacity(values.len() * 3);
    for &v in values {
        out.push_str(&hex_byte(v));
        out.push('\n');
    }
    out
}

/// Parse .mem text back into signed bytes.
///
/// Every non-empty line must be exactly two hex digits; errors
/// name the 1-based line number. A trailing newline is optional.
pub fn parse_mem_text(text: &str) -> Result<Vec<i8>> {
    let mut values = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        if line.len() != 2 {
            bail!("line {}: expected two hex digits, found '{}'", idx + 1, line);
        }
        match u8::from_str_radix(line, 16) {
            Ok(byte) => values.push(byte as i8),
            Err(_) => bail!("line {}: '{}' is not a hex byte", idx + 1, line),
        }
    }
    Ok(values)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quantize::pixels_to_signed;

    #[test]
    fn test_hex_byte_is_twos_complement() {
        assert_eq!(hex_byte(-128), "80");
        assert_eq!(hex_byte(-1), "ff");
        assert_eq!(hex_byte(0), "00");
        assert_eq!(hex_byte(5), "05");
        assert_eq!(hex_byte(127), "7f");
    }

    #[test]
    fn test_two_by_two_image_scenario() {
        let signed = pixels_to_signed(&[0, 127, 128, 255]);
        assert_eq!(to_mem_text(&signed), "80\nff\n00\n7f\n");
    }

    #[test]
    fn test_line_count_matches_element_count() {
        let values = vec![3i8; 32 * 32];
        let text = to_mem_text(&values);
        assert_eq!(text.lines().count(), 1024);
        assert!(text.lines().all(|l| l.len() == 2));
    }

    #[test]
    fn test_every_pixel_decodes_to_shifted_value() {
        let pixels: Vec<u8> = (0..=255).collect();
        let decoded = parse_mem_text(&to_mem_text(&pixels_to_signed(&pixels))).unwrap();
        for (u, s) in pixels.iter().zip(decoded) {
            assert_eq!(i16::from(s), i16::from(*u) - 128);
        }
    }

    #[test]
    fn test_empty_tensor_gives_empty_file() {
        assert_eq!(to_mem_text(&[]), "");
        assert!(parse_mem_text("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        let err = parse_mem_text("00\n7f\nzz\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
        assert!(parse_mem_text("123\n").is_err());
    }

    #[test]
    fn test_parse_accepts_uppercase_and_crlf() {
        assert_eq!(parse_mem_text("FF\r\n80\r\n").unwrap(), vec![-1, -128]);
    }
}
