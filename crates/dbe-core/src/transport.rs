// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Transport
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Radial heat transport on the grid r_i = i·a/N.
//!
//! Solves ∂T/∂t = (1/r)∂(r χ ∂T/∂r)/∂r + S_ext + S_alpha − ν_loss T
//! with an explicit Euler step, Neumann core and Dirichlet edge.

use crate::pedestal::edge_pressure_gradient;
use dbe_types::config::PlasmaConfig;
use dbe_types::error::{DbeError, DbeResult};
use dbe_types::state::PlasmaState;
use ndarray::Array1;

/// Explicit-Euler stability bound on dt·χ/dr².
const CFL_LIMIT: f64 = 0.5;

/// Floor for q when forming the shear s = (r/q) dq/dr.
const Q_FLOOR: f64 = 1e-6;

/// Normalised radius x = r/a, clamped to [0, 1].
fn normalised_radius(r: f64, a: f64) -> f64 {
    (r / a).clamp(0.0, 1.0)
}

/// Closed-form profile value f0 · (1 − x^alpha), floored at zero.
fn peaked_profile(f0: f64, x: f64, alpha: f64) -> f64 {
    (f0 * (1.0 - x.powf(alpha))).max(0.0)
}

/// Build the initial plasma state from closed-form profiles.
///
/// T(r) = T0 (1 − (r/a)^α_T), n(r) = n0 (1 − (r/a)^α_n),
/// q(r) = q0 + (q_edge − q0)(r/a)^α_q on r_i = i·a/N.
pub fn initialize(config: &PlasmaConfig) -> DbeResult<PlasmaState> {
    let n = config.n_points;
    if n < 2 {
        return Err(DbeError::ConfigError(format!(
            "plasma initialisation requires n_points >= 2, got {n}"
        )));
    }
    let a = config.minor_radius;
    if !a.is_finite() || a <= 0.0 {
        return Err(DbeError::ConfigError(format!(
            "plasma initialisation requires finite minor_radius > 0, got {a}"
        )));
    }
    config.validate()?;

    let dr = config.dr();
    let r = Array1::from_shape_fn(n, |i| i as f64 * dr);
    let temperature = r.mapv(|ri| {
        peaked_profile(config.t0_kev, normalised_radius(ri, a), config.alpha_t)
            .min(config.t_max_kev)
    });
    let density = r.mapv(|ri| {
        peaked_profile(config.n0_1e20, normalised_radius(ri, a), config.alpha_n)
            .min(config.n_max_1e20)
    });
    let safety_factor = r.mapv(|ri| {
        let x = normalised_radius(ri, a);
        (config.q0 + (config.q_edge - config.q0) * x.powf(config.alpha_q)).max(Q_FLOOR)
    });
    let edge_temperature = temperature[n - 1];

    let mut state = PlasmaState {
        r,
        temperature,
        density,
        safety_factor,
        dr,
        minor_radius: a,
        edge_temperature,
        stability: 1.0,
        edge_pressure_gradient: 0.0,
        confinement_factor: 1.0,
        mhd_degradation: 0.0,
        tau_e_s: config.tau_e_standard,
    };
    state.edge_pressure_gradient = edge_pressure_gradient(&state);
    state.stability = stability_metric(config, &state);
    Ok(state)
}

/// Magnetic shear s = (r/q) dq/dr at each grid point.
pub fn magnetic_shear(state: &PlasmaState) -> Array1<f64> {
    let n = state.n_points();
    let q = &state.safety_factor;
    let dr = state.dr;
    Array1::from_shape_fn(n, |i| {
        let dq_dr = if n < 2 {
            0.0
        } else if i == 0 {
            (q[1] - q[0]) / dr
        } else if i == n - 1 {
            (q[n - 1] - q[n - 2]) / dr
        } else {
            (q[i + 1] - q[i - 1]) / (2.0 * dr)
        };
        state.r[i] / q[i].max(Q_FLOOR) * dq_dr
    })
}

/// Weighted beta-limit and q margins, derated by coil penalty and MHD damage.
pub fn stability_metric(config: &PlasmaConfig, state: &PlasmaState) -> f64 {
    let n = state.n_points().max(1) as f64;
    let mean_pressure = state.pressure().sum() / n;
    let beta_margin = (1.0 - mean_pressure / config.beta_limit_pressure).clamp(0.0, 1.0);

    let q_min = state
        .safety_factor
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    let q_margin = ((q_min - 1.0) / config.q_margin_span).clamp(0.0, 1.0);

    let weight_sum = config.beta_weight + config.q_weight;
    let raw = (config.beta_weight * beta_margin + config.q_weight * q_margin) / weight_sum;
    let derate = state.confinement_factor.clamp(0.0, 1.0)
        * (1.0 - state.mhd_degradation.clamp(0.0, 1.0));
    let metric = (raw * derate).clamp(0.0, 1.0);
    if metric.is_finite() {
        metric
    } else {
        0.0
    }
}

/// Radial transport model bound to one plasma configuration.
#[derive(Debug, Clone)]
pub struct TransportModel {
    config: PlasmaConfig,
}

impl TransportModel {
    pub fn new(config: PlasmaConfig) -> DbeResult<Self> {
        config.validate()?;
        Ok(TransportModel { config })
    }

    pub fn config(&self) -> &PlasmaConfig {
        &self.config
    }

    pub fn initialize(&self) -> DbeResult<PlasmaState> {
        initialize(&self.config)
    }

    /// Shear-suppressed diffusivity χ_i = χ / (1 + k_s |s_i|).
    pub fn diffusivity(&self, state: &PlasmaState, chi: f64) -> Array1<f64> {
        let k_s = self.config.shear_stabilization;
        magnetic_shear(state).mapv(|s| chi / (1.0 + k_s * s.abs()))
    }

    /// Recompute and store the stability metric on the state.
    pub fn compute_stability(&self, state: &mut PlasmaState) -> f64 {
        state.stability = stability_metric(&self.config, state);
        state.stability
    }

    /// One explicit finite-difference step of the temperature profile.
    pub fn step(
        &self,
        state: &mut PlasmaState,
        dt: f64,
        chi: f64,
        heating_ext: f64,
        heating_alpha: f64,
    ) -> DbeResult<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(DbeError::ConfigError(format!(
                "transport step requires finite dt > 0, got {dt}"
            )));
        }
        if !chi.is_finite() || chi < 0.0 {
            return Err(DbeError::ConfigError(format!(
                "transport step requires finite chi >= 0, got {chi}"
            )));
        }
        if !heating_ext.is_finite() || !heating_alpha.is_finite() {
            return Err(DbeError::ConfigError(format!(
                "transport step requires finite heating, got ext={heating_ext}, alpha={heating_alpha}"
            )));
        }
        let n = state.n_points();
        if n < 2 {
            return Err(DbeError::ConfigError(
                "transport step requires at least 2 radial points".to_string(),
            ));
        }
        let dr = state.dr;
        if !dr.is_finite() || dr <= 0.0 {
            return Err(DbeError::ConfigError(format!(
                "transport step requires finite dr > 0, got {dr}"
            )));
        }
        let cfl = dt * chi / (dr * dr);
        if cfl > CFL_LIMIT {
            return Err(DbeError::ConfigError(format!(
                "transport step violates explicit stability bound: dt*chi/dr^2 = {cfl:.3} > {CFL_LIMIT}"
            )));
        }

        let chi_profile = self.diffusivity(state, chi);
        let t_old = state.temperature.clone();
        let a = state.minor_radius;

        for i in 1..n - 1 {
            let r_i = state.r[i];

            // Conservative flux form of (1/r) d/dr (r chi dT/dr)
            let flux_plus =
                0.5 * (chi_profile[i] + chi_profile[i + 1]) * (t_old[i + 1] - t_old[i]) / dr;
            let flux_minus =
                0.5 * (chi_profile[i - 1] + chi_profile[i]) * (t_old[i] - t_old[i - 1]) / dr;
            let r_plus = r_i + 0.5 * dr;
            let r_minus = r_i - 0.5 * dr;
            let div_flux = (r_plus * flux_plus - r_minus * flux_minus) / (r_i * dr);

            let x = normalised_radius(r_i, a);
            let s_ext = heating_ext * (-(x * x) / self.config.heating_width).exp();
            let n_i = state.density[i];
            let s_alpha = heating_alpha * n_i * n_i * t_old[i];
            let s_loss = self.config.loss_rate * t_old[i];

            let t_new = t_old[i] + dt * (div_flux + s_ext + s_alpha - s_loss);
            if !t_new.is_finite() {
                return Err(DbeError::PhysicsViolation(format!(
                    "transport step produced non-finite temperature at index {i}"
                )));
            }
            state.temperature[i] = t_new.clamp(0.0, self.config.t_max_kev);
        }

        // Dirichlet edge, then Neumann core
        state.temperature[n - 1] = state.edge_temperature.clamp(0.0, self.config.t_max_kev);
        state.temperature[0] = state.temperature[1];

        let relax = (1.0 - self.config.recovery_rate * dt).max(0.0);
        state.mhd_degradation = (state.mhd_degradation * relax).clamp(0.0, 1.0);

        state.edge_pressure_gradient = edge_pressure_gradient(state);
        self.compute_stability(state);
        Ok(())
    }

    /// Advance by the configured per-event drive (`steps_per_event` steps).
    pub fn advance(&self, state: &mut PlasmaState) -> DbeResult<()> {
        let cfg = &self.config;
        for _ in 0..cfg.steps_per_event {
            self.step(
                state,
                cfg.step_dt,
                cfg.chi_base,
                cfg.heating_ext,
                cfg.heating_alpha,
            )?;
        }
        Ok(())
    }

    /// Clamp density to its configured bound after external edits.
    pub fn clamp_density(&self, state: &mut PlasmaState) {
        let n_max = self.config.n_max_1e20;
        state.density.mapv_inplace(|v| v.clamp(0.0, n_max));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> TransportModel {
        TransportModel::new(PlasmaConfig::default()).unwrap()
    }

    #[test]
    fn test_initialize_shapes() {
        let state = model().initialize().unwrap();
        assert_eq!(state.n_points(), 50);
        assert_eq!(state.temperature.len(), 50);
        assert_eq!(state.density.len(), 50);
        assert_eq!(state.safety_factor.len(), 50);
        assert!((state.dr - 0.02).abs() < 1e-12);
        assert_eq!(state.r[0], 0.0);
        assert!((state.r[49] - 0.98).abs() < 1e-12);
    }

    #[test]
    fn test_initialize_profile_values() {
        let state = model().initialize().unwrap();
        // T(0) = T0, T(0.5) = 5 (1 - 0.25)
        assert!((state.temperature[0] - 5.0).abs() < 1e-12);
        assert!((state.temperature[25] - 3.75).abs() < 1e-12);
        assert!((state.safety_factor[0] - 1.2).abs() < 1e-12);
        assert!(state.temperature[0] >= state.temperature[49]);
        assert!((state.edge_temperature - state.temperature[49]).abs() < 1e-15);
    }

    #[test]
    fn test_initialize_rejects_bad_grid() {
        let mut cfg = PlasmaConfig::default();
        cfg.n_points = 1;
        assert!(matches!(initialize(&cfg), Err(DbeError::ConfigError(_))));

        let mut cfg = PlasmaConfig::default();
        cfg.minor_radius = -1.0;
        assert!(matches!(initialize(&cfg), Err(DbeError::ConfigError(_))));
    }

    #[test]
    fn test_initial_stability_in_unit_interval() {
        let state = model().initialize().unwrap();
        assert!(
            state.stability > 0.0 && state.stability <= 1.0,
            "stability = {}",
            state.stability
        );
    }

    #[test]
    fn test_step_rejects_invalid_inputs() {
        let m = model();
        let mut state = m.initialize().unwrap();
        assert!(matches!(
            m.step(&mut state, 0.0, 0.5, 0.0, 0.0),
            Err(DbeError::ConfigError(_))
        ));
        assert!(matches!(
            m.step(&mut state, 1e-4, -0.1, 0.0, 0.0),
            Err(DbeError::ConfigError(_))
        ));
        assert!(matches!(
            m.step(&mut state, 1.0, 10.0, 0.0, 0.0),
            Err(DbeError::ConfigError(_))
        ));
    }

    #[test]
    fn test_step_boundary_conditions() {
        let m = model();
        let mut state = m.initialize().unwrap();
        let edge = state.edge_temperature;
        for _ in 0..20 {
            m.step(&mut state, 2e-4, 0.5, 10.0, 0.5).unwrap();
        }
        let n = state.n_points();
        assert!((state.temperature[n - 1] - edge).abs() < 1e-12);
        assert!((state.temperature[0] - state.temperature[1]).abs() < 1e-12);
    }

    #[test]
    fn test_step_without_heating_cools_core() {
        let m = model();
        let mut state = m.initialize().unwrap();
        let core_before = state.core_temperature();
        m.step(&mut state, 2e-4, 0.5, 0.0, 0.0).unwrap();
        assert!(
            state.core_temperature() <= core_before,
            "{} > {core_before}",
            state.core_temperature()
        );
    }

    #[test]
    fn test_step_clamps_to_bounds() {
        let mut cfg = PlasmaConfig::default();
        cfg.t_max_kev = 5.5;
        let m = TransportModel::new(cfg).unwrap();
        let mut state = m.initialize().unwrap();
        for _ in 0..50 {
            m.step(&mut state, 2e-4, 0.1, 1.0e4, 0.0).unwrap();
        }
        assert!(state.temperature.iter().all(|&t| (0.0..=5.5).contains(&t)));

        let mut state = m.initialize().unwrap();
        for _ in 0..50 {
            m.step(&mut state, 2e-4, 0.1, -1.0e4, 0.0).unwrap();
        }
        assert!(state.temperature.iter().all(|&t| t >= 0.0));
    }

    #[test]
    fn test_shear_suppresses_diffusivity() {
        let m = model();
        let state = m.initialize().unwrap();
        let chi = m.diffusivity(&state, 0.5);
        // q is flat on axis and sheared at the edge
        assert!((chi[0] - 0.5).abs() < 1e-12);
        assert!(chi[40] < chi[0]);
    }

    #[test]
    fn test_degradation_and_confinement_lower_stability() {
        let m = model();
        let mut state = m.initialize().unwrap();
        let base = m.compute_stability(&mut state);
        state.mhd_degradation = 0.5;
        let damaged = m.compute_stability(&mut state);
        assert!((damaged - 0.5 * base).abs() < 1e-12);
        state.confinement_factor = 0.95;
        let derated = m.compute_stability(&mut state);
        assert!(derated < damaged);
    }

    #[test]
    fn test_degradation_relaxes_during_step() {
        let m = model();
        let mut state = m.initialize().unwrap();
        state.mhd_degradation = 0.4;
        m.step(&mut state, 2e-4, 0.5, 10.0, 0.5).unwrap();
        assert!(state.mhd_degradation < 0.4);
        assert!(state.mhd_degradation > 0.39);
    }

    #[test]
    fn test_advance_runs_configured_steps() {
        let m = model();
        let mut state = m.initialize().unwrap();
        m.advance(&mut state).unwrap();
        assert!(state.is_finite());
        assert!((0.0..=1.0).contains(&state.stability));
    }
}
