// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Holographic Encoder
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Block-mean profile compression.
//!
//! `compress` replaces each contiguous block with its mean (the last block
//! may be shorter). `decompress` repeats each mean back out to the
//! requested length. The pair is lossy: only the shape round-trips.

use dbe_types::error::{DbeError, DbeResult};
use serde::{Deserialize, Serialize};

/// Mean of each `block_size` chunk of `data`.
pub fn compress(data: &[f64], block_size: usize) -> DbeResult<Vec<f64>> {
    if block_size == 0 {
        return Err(DbeError::ConfigError(
            "holographic block_size must be > 0".to_string(),
        ));
    }
    Ok(data
        .chunks(block_size)
        .map(|block| block.iter().sum::<f64>() / block.len() as f64)
        .collect())
}

/// Expand block means to exactly `original_length` values.
///
/// Missing tail values repeat the last mean, or 0.0 when `compressed` is empty.
pub fn decompress(compressed: &[f64], block_size: usize, original_length: usize) -> Vec<f64> {
    let block_size = block_size.max(1);
    let mut out: Vec<f64> = compressed
        .iter()
        .flat_map(|&v| std::iter::repeat(v).take(block_size))
        .take(original_length)
        .collect();
    let fill = compressed.last().copied().unwrap_or(0.0);
    out.resize(original_length, fill);
    out
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolographicEncoder {
    block_size: usize,
}

impl HolographicEncoder {
    pub fn new(block_size: usize) -> DbeResult<Self> {
        if block_size == 0 {
            return Err(DbeError::ConfigError(
                "holographic block_size must be > 0".to_string(),
            ));
        }
        Ok(HolographicEncoder { block_size })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn encode(&self, data: &[f64]) -> DbeResult<Vec<f64>> {
        compress(data, self.block_size)
    }

    /// original / compressed length for an input of `len` values.
    pub fn compression_ratio(&self, len: usize) -> f64 {
        if len == 0 {
            return 1.0;
        }
        let blocks = len.div_ceil(self.block_size);
        len as f64 / blocks as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_block_means() {
        let data = [1.0, 3.0, 5.0, 7.0, 9.0];
        let c = compress(&data, 2).unwrap();
        assert_eq!(c.len(), 3);
        assert!((c[0] - 2.0).abs() < 1e-12);
        assert!((c[1] - 6.0).abs() < 1e-12);
        // Short trailing block
        assert!((c[2] - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_compress_rejects_zero_block() {
        assert!(matches!(compress(&[1.0], 0), Err(DbeError::ConfigError(_))));
        assert!(HolographicEncoder::new(0).is_err());
    }

    #[test]
    fn test_decompress_repeats_and_truncates() {
        let d = decompress(&[2.0, 6.0, 9.0], 2, 5);
        assert_eq!(d, vec![2.0, 2.0, 6.0, 6.0, 9.0]);
    }

    #[test]
    fn test_decompress_pads_with_last_value() {
        let d = decompress(&[2.0], 2, 4);
        assert_eq!(d, vec![2.0, 2.0, 2.0, 2.0]);
        assert_eq!(decompress(&[], 3, 2), vec![0.0, 0.0]);
    }

    #[test]
    fn test_constant_profile_round_trips_exactly() {
        let data = vec![4.2; 17];
        let enc = HolographicEncoder::new(5).unwrap();
        let encoded = enc.encode(&data).unwrap();
        assert_eq!(encoded.len(), 4);
        assert_eq!(decompress(&encoded, enc.block_size(), data.len()), data);
    }

    #[test]
    fn test_compression_ratio() {
        let enc = HolographicEncoder::new(5).unwrap();
        assert!((enc.compression_ratio(50) - 5.0).abs() < 1e-12);
        assert!((enc.compression_ratio(7) - 3.5).abs() < 1e-12);
    }
}
