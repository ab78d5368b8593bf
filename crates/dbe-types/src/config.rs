// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{DbeError, DbeResult};
use serde::{Deserialize, Serialize};

/// Top-level controller configuration.
/// Every field carries a default, so partial JSON files deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DbeConfig {
    /// Seed for the per-run fault-injection generator.
    pub seed: u64,
    pub plasma: PlasmaConfig,
    pub actuators: ActuatorConfig,
    pub subsystems: SubsystemConfig,
    pub controller: ControllerConfig,
    pub risk: RiskConfig,
}

/// Radial grid, analytic profiles and transport coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlasmaConfig {
    /// Radial grid points N, spaced a/N apart.
    pub n_points: usize,
    /// Minor radius a [m].
    pub minor_radius: f64,
    /// Core temperature T0 [keV].
    pub t0_kev: f64,
    pub alpha_t: f64,
    /// Core density n0 [10^20 m^-3].
    pub n0_1e20: f64,
    pub alpha_n: f64,
    /// Safety factor q(r) = q0 + (q_edge - q0) (r/a)^alpha_q.
    pub q0: f64,
    pub q_edge: f64,
    pub alpha_q: f64,
    /// Clamping bound for temperature [keV].
    pub t_max_kev: f64,
    /// Clamping bound for density [10^20 m^-3].
    pub n_max_1e20: f64,
    /// Critical edge pressure gradient with zero coil current.
    pub elm_threshold: f64,
    /// Fraction of the excess over edge temperature removed by an ELM crash.
    pub elm_flatten_fraction: f64,
    /// Diffusivity suppression per unit magnetic shear.
    pub shear_stabilization: f64,
    /// Width of the Gaussian external heating deposition (in (r/a)^2).
    pub heating_width: f64,
    /// Linear energy loss rate [1/s].
    pub loss_rate: f64,
    /// Volume-averaged pressure at the beta limit.
    pub beta_limit_pressure: f64,
    /// q-margin normalisation: q_min - 1 over this span maps to [0, 1].
    pub q_margin_span: f64,
    pub beta_weight: f64,
    pub q_weight: f64,
    /// MHD damage relaxation rate [1/s].
    pub recovery_rate: f64,
    /// Baseline energy confinement time [s].
    pub tau_e_standard: f64,
    /// Transport drive applied before each event.
    pub step_dt: f64,
    pub steps_per_event: usize,
    pub chi_base: f64,
    pub heating_ext: f64,
    pub heating_alpha: f64,
}

impl Default for PlasmaConfig {
    fn default() -> Self {
        PlasmaConfig {
            n_points: 50,
            minor_radius: 1.0,
            t0_kev: 5.0,
            alpha_t: 2.0,
            n0_1e20: 1.0,
            alpha_n: 2.0,
            q0: 1.2,
            q_edge: 3.5,
            alpha_q: 2.0,
            t_max_kev: 100.0,
            n_max_1e20: 10.0,
            elm_threshold: 1.0,
            elm_flatten_fraction: 0.5,
            shear_stabilization: 0.5,
            heating_width: 0.1,
            loss_rate: 0.5,
            beta_limit_pressure: 8.0,
            q_margin_span: 0.5,
            beta_weight: 0.6,
            q_weight: 0.4,
            recovery_rate: 0.05,
            tau_e_standard: 1.0,
            step_dt: 2.0e-4,
            steps_per_event: 10,
            chi_base: 0.5,
            heating_ext: 10.0,
            heating_alpha: 0.5,
        }
    }
}

/// RMP coil and pellet injector limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Maximum coil current I_max [kA].
    pub i_max_ka: f64,
    /// Coil counts as saturated at I >= saturation_fraction * I_max.
    pub saturation_fraction: f64,
    /// Stability derate at full coil current.
    pub confinement_penalty: f64,
    pub pellet_size_max: f64,
    pub cooldown_ticks: u32,
    /// Relative edge density rise for a full-size pellet.
    pub pellet_density_gain: f64,
    /// Relative edge temperature drop for a full-size pellet.
    pub pellet_temperature_drop: f64,
    /// Severity cap for a pellet-paced ELM.
    pub controlled_elm_max_severity: f64,
    pub pellet_misfire_probability: f64,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        ActuatorConfig {
            i_max_ka: 10.0,
            saturation_fraction: 0.9,
            confinement_penalty: 0.05,
            pellet_size_max: 1.0,
            cooldown_ticks: 3,
            pellet_density_gain: 0.5,
            pellet_temperature_drop: 0.05,
            controlled_elm_max_severity: 0.3,
            pellet_misfire_probability: 0.0,
        }
    }
}

/// Abstract subsystem parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsystemConfig {
    pub total_qubits: usize,
    /// Response latency with no detection qubits (arbitrary units).
    pub base_latency: f64,
    /// Per-store probability of raising the memory error flag.
    pub p_error: f64,
    pub block_size: usize,
    /// Number of snapshots kept in memory; `None` keeps everything.
    pub retention: Option<usize>,
}

impl Default for SubsystemConfig {
    fn default() -> Self {
        SubsystemConfig {
            total_qubits: 100,
            base_latency: 10.0,
            p_error: 0.05,
            block_size: 5,
            retention: Some(32),
        }
    }
}

/// Decision heuristics of the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Multiplicative stability-score bonus with the time crystal engaged.
    pub time_crystal_bonus: f64,
    /// Multiplier on the mitigation score with compression engaged.
    pub compression_efficiency: f64,
    /// Fire a pellet when the stability score drops below this.
    pub pellet_stability_threshold: f64,
    pub coil_stability_weight: f64,
    pub coil_gradient_weight: f64,
    pub logistic_k: f64,
    pub logistic_x0: f64,
    pub learning_increment: f64,
    pub learning_cap: f64,
    /// MHD damage after a successful mitigation.
    pub success_degradation: f64,
    /// MHD damage per unit effective growth rate.
    pub growth_damage_scale: f64,
    /// Stability-score penalty per unit of normalised snapshot drift.
    pub drift_weight: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            time_crystal_bonus: 1.3,
            compression_efficiency: 1.3,
            pellet_stability_threshold: 0.5,
            coil_stability_weight: 0.6,
            coil_gradient_weight: 0.4,
            logistic_k: 5.0,
            logistic_x0: 0.6,
            learning_increment: 0.02,
            learning_cap: 0.5,
            success_degradation: 0.05,
            growth_damage_scale: 0.2,
            drift_weight: 0.1,
        }
    }
}

/// Risk scoring bands and penalties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub high_risk_stability: f64,
    pub medium_risk_stability: f64,
    pub coil_saturation_penalty: f64,
    pub pellet_unavailable_penalty: f64,
    pub memory_error_penalty: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            high_risk_stability: 0.2,
            medium_risk_stability: 0.5,
            coil_saturation_penalty: 0.2,
            pellet_unavailable_penalty: 0.2,
            memory_error_penalty: 0.3,
        }
    }
}

impl Default for DbeConfig {
    fn default() -> Self {
        DbeConfig {
            seed: 2026,
            plasma: PlasmaConfig::default(),
            actuators: ActuatorConfig::default(),
            subsystems: SubsystemConfig::default(),
            controller: ControllerConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

fn require_finite(name: &str, value: f64) -> DbeResult<()> {
    if !value.is_finite() {
        return Err(DbeError::ConfigError(format!(
            "{name} must be finite, got {value}"
        )));
    }
    Ok(())
}

fn require_positive(name: &str, value: f64) -> DbeResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DbeError::ConfigError(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

fn require_non_negative(name: &str, value: f64) -> DbeResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DbeError::ConfigError(format!(
            "{name} must be finite and >= 0, got {value}"
        )));
    }
    Ok(())
}

fn require_unit_interval(name: &str, value: f64) -> DbeResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(DbeError::ConfigError(format!(
            "{name} must lie in [0, 1], got {value}"
        )));
    }
    Ok(())
}

impl PlasmaConfig {
    pub fn validate(&self) -> DbeResult<()> {
        if self.n_points < 2 {
            return Err(DbeError::ConfigError(format!(
                "plasma grid requires n_points >= 2, got {}",
                self.n_points
            )));
        }
        require_positive("minor_radius", self.minor_radius)?;
        require_non_negative("t0_kev", self.t0_kev)?;
        require_finite("alpha_t", self.alpha_t)?;
        require_non_negative("n0_1e20", self.n0_1e20)?;
        require_finite("alpha_n", self.alpha_n)?;
        require_positive("q0", self.q0)?;
        require_positive("q_edge", self.q_edge)?;
        require_finite("alpha_q", self.alpha_q)?;
        require_positive("t_max_kev", self.t_max_kev)?;
        require_positive("n_max_1e20", self.n_max_1e20)?;
        require_positive("elm_threshold", self.elm_threshold)?;
        require_unit_interval("elm_flatten_fraction", self.elm_flatten_fraction)?;
        require_non_negative("shear_stabilization", self.shear_stabilization)?;
        require_positive("heating_width", self.heating_width)?;
        require_non_negative("loss_rate", self.loss_rate)?;
        require_positive("beta_limit_pressure", self.beta_limit_pressure)?;
        require_positive("q_margin_span", self.q_margin_span)?;
        require_non_negative("beta_weight", self.beta_weight)?;
        require_non_negative("q_weight", self.q_weight)?;
        if self.beta_weight + self.q_weight <= 0.0 {
            return Err(DbeError::ConfigError(
                "beta_weight + q_weight must be > 0".to_string(),
            ));
        }
        require_non_negative("recovery_rate", self.recovery_rate)?;
        require_positive("tau_e_standard", self.tau_e_standard)?;
        require_positive("step_dt", self.step_dt)?;
        require_non_negative("chi_base", self.chi_base)?;
        require_finite("heating_ext", self.heating_ext)?;
        require_finite("heating_alpha", self.heating_alpha)?;
        Ok(())
    }

    /// Radial grid spacing a/N.
    pub fn dr(&self) -> f64 {
        self.minor_radius / self.n_points as f64
    }
}

impl ActuatorConfig {
    pub fn validate(&self) -> DbeResult<()> {
        require_positive("i_max_ka", self.i_max_ka)?;
        require_unit_interval("saturation_fraction", self.saturation_fraction)?;
        require_unit_interval("confinement_penalty", self.confinement_penalty)?;
        require_positive("pellet_size_max", self.pellet_size_max)?;
        require_non_negative("pellet_density_gain", self.pellet_density_gain)?;
        require_unit_interval("pellet_temperature_drop", self.pellet_temperature_drop)?;
        require_non_negative(
            "controlled_elm_max_severity",
            self.controlled_elm_max_severity,
        )?;
        require_unit_interval(
            "pellet_misfire_probability",
            self.pellet_misfire_probability,
        )?;
        Ok(())
    }
}

impl SubsystemConfig {
    pub fn validate(&self) -> DbeResult<()> {
        require_positive("base_latency", self.base_latency)?;
        require_unit_interval("p_error", self.p_error)?;
        if self.block_size == 0 {
            return Err(DbeError::ConfigError(
                "compression block_size must be > 0".to_string(),
            ));
        }
        if self.retention == Some(0) {
            return Err(DbeError::ConfigError(
                "memory retention must keep at least one snapshot".to_string(),
            ));
        }
        Ok(())
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> DbeResult<()> {
        require_positive("time_crystal_bonus", self.time_crystal_bonus)?;
        require_positive("compression_efficiency", self.compression_efficiency)?;
        require_unit_interval("pellet_stability_threshold", self.pellet_stability_threshold)?;
        require_non_negative("coil_stability_weight", self.coil_stability_weight)?;
        require_non_negative("coil_gradient_weight", self.coil_gradient_weight)?;
        require_positive("logistic_k", self.logistic_k)?;
        require_finite("logistic_x0", self.logistic_x0)?;
        require_non_negative("learning_increment", self.learning_increment)?;
        require_unit_interval("learning_cap", self.learning_cap)?;
        require_unit_interval("success_degradation", self.success_degradation)?;
        require_non_negative("growth_damage_scale", self.growth_damage_scale)?;
        require_non_negative("drift_weight", self.drift_weight)?;
        Ok(())
    }
}

impl RiskConfig {
    pub fn validate(&self) -> DbeResult<()> {
        require_unit_interval("high_risk_stability", self.high_risk_stability)?;
        require_unit_interval("medium_risk_stability", self.medium_risk_stability)?;
        if self.high_risk_stability > self.medium_risk_stability {
            return Err(DbeError::ConfigError(format!(
                "high_risk_stability {} must not exceed medium_risk_stability {}",
                self.high_risk_stability, self.medium_risk_stability
            )));
        }
        require_non_negative("coil_saturation_penalty", self.coil_saturation_penalty)?;
        require_non_negative("pellet_unavailable_penalty", self.pellet_unavailable_penalty)?;
        require_non_negative("memory_error_penalty", self.memory_error_penalty)?;
        Ok(())
    }
}

impl DbeConfig {
    /// Load from JSON file. Missing fields fall back to defaults.
    pub fn from_file(path: &str) -> DbeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DbeResult<()> {
        self.plasma.validate()?;
        self.actuators.validate()?;
        self.subsystems.validate()?;
        self.controller.validate()?;
        self.risk.validate()
    }
}
