// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Qubit Register
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fixed qubit budget split between anomaly detection and simulation.

use dbe_types::error::{DbeError, DbeResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QubitRegister {
    total_qubits: usize,
    detection: usize,
    simulation: usize,
    base_latency: f64,
}

impl QubitRegister {
    /// New register with the budget split evenly.
    pub fn new(total_qubits: usize, base_latency: f64) -> DbeResult<Self> {
        if !base_latency.is_finite() || base_latency <= 0.0 {
            return Err(DbeError::ConfigError(format!(
                "qubit base_latency must be finite and > 0, got {base_latency}"
            )));
        }
        let detection = total_qubits / 2;
        Ok(QubitRegister {
            total_qubits,
            detection,
            simulation: total_qubits - detection,
            base_latency,
        })
    }

    pub fn total_qubits(&self) -> usize {
        self.total_qubits
    }

    pub fn detection(&self) -> usize {
        self.detection
    }

    pub fn simulation(&self) -> usize {
        self.simulation
    }

    /// Replace the allocation. On rejection the previous split is kept.
    pub fn allocate(&mut self, detection: usize, simulation: usize) -> DbeResult<()> {
        let requested = detection.checked_add(simulation);
        match requested {
            Some(sum) if sum <= self.total_qubits => {
                self.detection = detection;
                self.simulation = simulation;
                Ok(())
            }
            _ => Err(DbeError::AllocationError {
                detection,
                simulation,
                capacity: self.total_qubits,
            }),
        }
    }

    /// base_latency / (1 + detection). Strictly decreasing, always > 0.
    pub fn response_time(&self) -> f64 {
        self.base_latency / (1.0 + self.detection as f64)
    }

    /// Logarithmic predictive capacity ln(1 + simulation) / ln(1 + total), in [0, 1].
    pub fn memory_score(&self) -> f64 {
        if self.total_qubits == 0 {
            return 0.0;
        }
        let max_score = (1.0 + self.total_qubits as f64).ln();
        ((1.0 + self.simulation as f64).ln() / max_score).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_split() {
        let reg = QubitRegister::new(100, 10.0).unwrap();
        assert_eq!(reg.detection(), 50);
        assert_eq!(reg.simulation(), 50);
        assert_eq!(reg.total_qubits(), 100);
    }

    #[test]
    fn test_allocate_within_capacity() {
        let mut reg = QubitRegister::new(100, 10.0).unwrap();
        reg.allocate(60, 40).unwrap();
        assert_eq!(reg.detection(), 60);
        assert_eq!(reg.simulation(), 40);
    }

    #[test]
    fn test_allocate_over_capacity_keeps_previous() {
        let mut reg = QubitRegister::new(100, 10.0).unwrap();
        reg.allocate(30, 20).unwrap();
        let err = reg.allocate(80, 40).unwrap_err();
        assert!(matches!(err, DbeError::AllocationError { capacity: 100, .. }));
        assert_eq!(reg.detection(), 30);
        assert_eq!(reg.simulation(), 20);
    }

    #[test]
    fn test_allocate_overflow_rejected() {
        let mut reg = QubitRegister::new(100, 10.0).unwrap();
        assert!(reg.allocate(usize::MAX, 1).is_err());
    }

    #[test]
    fn test_response_time_formula() {
        let mut reg = QubitRegister::new(100, 10.0).unwrap();
        reg.allocate(0, 0).unwrap();
        assert!((reg.response_time() - 10.0).abs() < 1e-12);
        reg.allocate(9, 0).unwrap();
        assert!((reg.response_time() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_memory_score_bounds() {
        let mut reg = QubitRegister::new(100, 10.0).unwrap();
        reg.allocate(0, 100).unwrap();
        assert!((reg.memory_score() - 1.0).abs() < 1e-12);
        reg.allocate(100, 0).unwrap();
        assert_eq!(reg.memory_score(), 0.0);
    }

    #[test]
    fn test_rejects_bad_latency() {
        assert!(QubitRegister::new(10, 0.0).is_err());
        assert!(QubitRegister::new(10, f64::NAN).is_err());
    }
}
