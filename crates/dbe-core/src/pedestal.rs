// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Edge Pedestal
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Edge pressure gradient and ELM trigger/crash logic.

use dbe_types::config::PlasmaConfig;
use dbe_types::state::{InstabilityEvent, InstabilityKind, PlasmaState};
use tracing::info;

/// Pressure drop across the last two grid points per unit radius.
pub fn edge_pressure_gradient(state: &PlasmaState) -> f64 {
    let n = state.n_points();
    if n < 2 || state.dr <= 0.0 {
        return 0.0;
    }
    let p_inner = state.density[n - 2] * state.temperature[n - 2];
    let p_edge = state.density[n - 1] * state.temperature[n - 1];
    (p_inner - p_edge) / state.dr
}

/// First index of the outer third of the grid.
pub fn outer_third_start(n: usize) -> usize {
    let width = (n + 2) / 3;
    n - width.min(n)
}

/// ELM trigger with a coil-raised critical gradient.
#[derive(Debug, Clone)]
pub struct PedestalModel {
    elm_threshold: f64,
    flatten_fraction: f64,
    crash_count: usize,
}

impl PedestalModel {
    pub fn new(config: &PlasmaConfig) -> Self {
        Self {
            elm_threshold: config.elm_threshold,
            flatten_fraction: config.elm_flatten_fraction,
            crash_count: 0,
        }
    }

    /// Critical gradient after the coil multiplier `1 + I/I_max` is applied.
    pub fn effective_threshold(&self, threshold_multiplier: f64) -> f64 {
        self.elm_threshold * threshold_multiplier.max(0.0)
    }

    pub fn crash_count(&self) -> usize {
        self.crash_count
    }

    /// Flatten the outer third of T toward the edge value by `fraction`.
    pub fn apply_elm_crash(&mut self, state: &mut PlasmaState, fraction: f64) {
        let n = state.n_points();
        if n == 0 {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        let t_edge = state.temperature[n - 1];
        for i in outer_third_start(n)..n {
            let excess = state.temperature[i] - t_edge;
            state.temperature[i] = (t_edge + excess * (1.0 - fraction)).max(0.0);
        }
        state.edge_pressure_gradient = edge_pressure_gradient(state);
        self.crash_count += 1;
    }

    /// Crash the pedestal if the edge gradient exceeds the raised threshold.
    pub fn check_elm_trigger(
        &mut self,
        state: &mut PlasmaState,
        threshold_multiplier: f64,
    ) -> Option<InstabilityEvent> {
        let gradient = edge_pressure_gradient(state);
        state.edge_pressure_gradient = gradient;
        let threshold = self.effective_threshold(threshold_multiplier);
        if gradient.is_nan() || gradient <= threshold {
            return None;
        }

        let severity = (gradient - threshold) / threshold.max(f64::EPSILON);
        self.apply_elm_crash(state, self.flatten_fraction);
        info!(
            gradient,
            threshold,
            severity,
            crashes = self.crash_count,
            "ELM crash"
        );
        Some(InstabilityEvent {
            kind: InstabilityKind::Elm,
            severity,
            controlled: false,
        })
    }

    /// Pellet-paced ELM: same crash, with `strength` in [0, 1] and a severity cap.
    pub fn trigger_controlled_elm(
        &mut self,
        state: &mut PlasmaState,
        strength: f64,
        max_severity: f64,
    ) -> InstabilityEvent {
        let strength = strength.clamp(0.0, 1.0);
        let fraction = self.flatten_fraction * strength;
        self.apply_elm_crash(state, fraction);
        let severity = fraction.min(max_severity.max(0.0));
        info!(strength, severity, "controlled ELM");
        InstabilityEvent {
            kind: InstabilityKind::Elm,
            severity,
            controlled: true,
        }
    }
}
