// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Sawtooth
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Kadomtsev-style sawtooth crash on the radial profiles.
//!
//! Triggers when q(0) < 1. Temperature and density are flattened to their
//! volume average over the mixing region, and q is reset to 1 inside the
//! q = 1 surface.

use dbe_types::state::{InstabilityEvent, InstabilityKind, PlasmaState};
use tracing::info;

/// Mixing radius as a multiple of the q = 1 inversion radius.
const MIXING_FACTOR: usize = 2;

/// q value restored inside the inversion radius after reconnection.
const Q_RECONNECTED: f64 = 1.0;

#[derive(Debug, Clone, Default)]
pub struct SawtoothModel {
    crash_count: usize,
}

impl SawtoothModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crash_count(&self) -> usize {
        self.crash_count
    }

    /// Number of contiguous core points with q < 1.
    fn inversion_points(state: &PlasmaState) -> usize {
        state
            .safety_factor
            .iter()
            .take_while(|&&q| q < 1.0)
            .count()
    }

    /// Volume-weighted (r + dr/2) average of `values[..mix]`.
    fn volume_average(state: &PlasmaState, values: &[f64], mix: usize) -> f64 {
        let mut weighted = 0.0;
        let mut volume = 0.0;
        for (i, v) in values.iter().take(mix).enumerate() {
            let w = state.r[i] + 0.5 * state.dr;
            weighted += w * v;
            volume += w;
        }
        if volume > 0.0 {
            weighted / volume
        } else {
            0.0
        }
    }

    pub fn check_sawtooth_trigger(&mut self, state: &mut PlasmaState) -> Option<InstabilityEvent> {
        let n = state.n_points();
        let q0 = state.core_safety_factor();
        if n == 0 || q0.is_nan() || q0 >= 1.0 {
            return None;
        }

        let inversion = Self::inversion_points(state);
        let mix = (MIXING_FACTOR * inversion).clamp(1, n);

        let t_mean = Self::volume_average(state, &state.temperature.to_vec(), mix);
        let n_mean = Self::volume_average(state, &state.density.to_vec(), mix);
        for i in 0..mix {
            state.temperature[i] = t_mean;
            state.density[i] = n_mean;
        }
        for q in state.safety_factor.iter_mut().take(inversion) {
            *q = Q_RECONNECTED;
        }

        self.crash_count += 1;
        let severity = 1.0 - q0;
        info!(
            q0,
            inversion_points = inversion,
            mixing_points = mix,
            severity,
            "sawtooth crash"
        );
        Some(InstabilityEvent {
            kind: InstabilityKind::Sawtooth,
            severity,
            controlled: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::initialize;
    use dbe_types::config::PlasmaConfig;
    use ndarray::Array1;

    fn unstable_state() -> PlasmaState {
        let cfg = PlasmaConfig {
            q0: 0.8,
            ..PlasmaConfig::default()
        };
        initialize(&cfg).unwrap()
    }

    #[test]
    fn test_no_sawtooth_with_q0_above_one() {
        let mut model = SawtoothModel::new();
        let mut state = initialize(&PlasmaConfig::default()).unwrap();
        assert!(state.core_safety_factor() > 1.0);
        assert!(model.check_sawtooth_trigger(&mut state).is_none());
        assert_eq!(model.crash_count(), 0);
    }

    #[test]
    fn test_empty_grid_never_crashes() {
        let mut model = SawtoothModel::new();
        let mut state = PlasmaState {
            r: Array1::zeros(0),
            temperature: Array1::zeros(0),
            density: Array1::zeros(0),
            safety_factor: Array1::zeros(0),
            dr: 0.1,
            minor_radius: 1.0,
            edge_temperature: 0.1,
            stability: 1.0,
            edge_pressure_gradient: 0.0,
            confinement_factor: 1.0,
            mhd_degradation: 0.0,
            tau_e_s: 1.0,
        };
        assert_eq!(state.core_safety_factor(), 0.0);
        assert!(model.check_sawtooth_trigger(&mut state).is_none());
        assert_eq!(model.crash_count(), 0);
    }

    #[test]
    fn test_sawtooth_flattens_core() {
        let mut model = SawtoothModel::new();
        let mut state = unstable_state();
        let t_core_before = state.core_temperature();
        let event = model
            .check_sawtooth_trigger(&mut state)
            .expect("q0 = 0.8 must crash");
        assert_eq!(event.kind, InstabilityKind::Sawtooth);
        assert!((event.severity - 0.2).abs() < 1e-12);
        assert!(state.core_temperature() < t_core_before);
        assert!((state.temperature[0] - state.temperature[1]).abs() < 1e-12);
        assert!((state.density[0] - state.density[1]).abs() < 1e-12);
    }

    #[test]
    fn test_sawtooth_resets_q_inside_inversion() {
        let mut model = SawtoothModel::new();
        let mut state = unstable_state();
        model.check_sawtooth_trigger(&mut state).unwrap();
        assert!(state.safety_factor.iter().all(|&q| q >= 1.0));
        // Reconnected core does not re-trigger
        assert!(model.check_sawtooth_trigger(&mut state).is_none());
        assert_eq!(model.crash_count(), 1);
    }
}
