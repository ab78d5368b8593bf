// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Radial plasma state on the grid r_i = i * a/N, i = 0..N-1.
///
/// Created once from closed-form profiles, then mutated in place by
/// transport steps, instability crashes and actuator effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlasmaState {
    pub r: Array1<f64>,             // Radius [m]
    pub temperature: Array1<f64>,   // [keV], >= 0
    pub density: Array1<f64>,       // [10^20 m^-3], >= 0
    pub safety_factor: Array1<f64>, // q, > 0
    pub dr: f64,
    pub minor_radius: f64,
    /// Dirichlet edge temperature held by the transport step [keV].
    pub edge_temperature: f64,
    /// Scalar health proxy in [0, 1].
    pub stability: f64,
    /// Outward pressure drop across the last two grid points, per metre.
    pub edge_pressure_gradient: f64,
    /// Multiplicative derate from RMP field penalties, in (0, 1].
    pub confinement_factor: f64,
    /// Accumulated MHD damage in [0, 1].
    pub mhd_degradation: f64,
    /// Current energy confinement time [s].
    pub tau_e_s: f64,
}

impl PlasmaState {
    pub fn n_points(&self) -> usize {
        self.r.len()
    }

    /// Local pressure proxy p_i = n_i T_i.
    pub fn pressure(&self) -> Array1<f64> {
        &self.density * &self.temperature
    }

    pub fn core_temperature(&self) -> f64 {
        self.temperature.first().copied().unwrap_or(0.0)
    }

    pub fn core_safety_factor(&self) -> f64 {
        self.safety_factor.first().copied().unwrap_or(0.0)
    }

    /// True when every profile value is finite.
    pub fn is_finite(&self) -> bool {
        self.temperature.iter().all(|v| v.is_finite())
            && self.density.iter().all(|v| v.is_finite())
            && self.safety_factor.iter().all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstabilityKind {
    /// Edge-localised mode.
    Elm,
    /// Core q < 1 sawtooth crash.
    Sawtooth,
}

/// A crash raised by the transport model or paced by a pellet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstabilityEvent {
    pub kind: InstabilityKind,
    pub severity: f64,
    /// True for pellet-paced ELMs with bounded severity.
    pub controlled: bool,
}

/// Post-action risk evaluation. Produced fresh for each evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub score: f64,
    pub notes: Vec<String>,
}

/// The six derived per-event fields consumed by batch drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub stability: f64,
    pub coil_fraction: f64,
    pub pellet_available: bool,
    pub memory_errors: usize,
    pub risk_score: f64,
    pub notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_state() -> PlasmaState {
        PlasmaState {
            r: Array1::from_vec(vec![0.0, 0.5]),
            temperature: Array1::from_vec(vec![4.0, 1.0]),
            density: Array1::from_vec(vec![2.0, 0.5]),
            safety_factor: Array1::from_vec(vec![1.1, 3.0]),
            dr: 0.5,
            minor_radius: 1.0,
            edge_temperature: 1.0,
            stability: 1.0,
            edge_pressure_gradient: 0.0,
            confinement_factor: 1.0,
            mhd_degradation: 0.0,
            tau_e_s: 1.0,
        }
    }

    #[test]
    fn test_pressure_is_pointwise_product() {
        let state = small_state();
        let p = state.pressure();
        assert!((p[0] - 8.0).abs() < 1e-12);
        assert!((p[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_core_accessors() {
        let state = small_state();
        assert_eq!(state.n_points(), 2);
        assert!((state.core_temperature() - 4.0).abs() < 1e-12);
        assert!((state.core_safety_factor() - 1.1).abs() < 1e-12);
        assert!(state.is_finite());
    }

    #[test]
    fn test_non_finite_detected() {
        let mut state = small_state();
        state.temperature[1] = f64::NAN;
        assert!(!state.is_finite());
    }
}
