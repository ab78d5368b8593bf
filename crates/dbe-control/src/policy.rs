// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Control Policy
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Decision policy seam between controller state and actuator commands.

use dbe_types::config::{ActuatorConfig, ControllerConfig};

/// What the policy sees when scoring stability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    /// ln(1 + simulation) / ln(1 + total) from the qubit register.
    pub memory_score: f64,
    pub plasma_stability: f64,
    pub learning_gain: f64,
    /// Core temperature change since the previous snapshot [keV].
    pub drift: f64,
    /// Reference core temperature used to normalise drift [keV].
    pub reference_temperature: f64,
    /// Time-crystal synchronisation factor, 1 when disengaged.
    pub sync_factor: f64,
}

/// What the policy sees when choosing actuator commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInputs {
    pub stability_score: f64,
    pub edge_pressure_gradient: f64,
    pub elm_threshold: f64,
    pub pellet_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorCommand {
    pub coil_current_ka: f64,
    /// `Some(size)` to fire a pellet.
    pub pellet_size: Option<f64>,
}

pub trait ControlPolicy {
    /// Stability score in [0, 1].
    fn stability_score(&self, inputs: &ScoreInputs) -> f64;

    fn decide(&self, inputs: &DecisionInputs) -> ActuatorCommand;
}

/// Monotone heuristics: lower stability or a steeper edge means more coil
/// current, and a pellet is fired below a stability threshold.
#[derive(Debug, Clone)]
pub struct HeuristicPolicy {
    stability_weight: f64,
    gradient_weight: f64,
    drift_weight: f64,
    pellet_threshold: f64,
    i_max_ka: f64,
    pellet_size_max: f64,
}

impl HeuristicPolicy {
    pub fn new(controller: &ControllerConfig, actuators: &ActuatorConfig) -> Self {
        HeuristicPolicy {
            stability_weight: controller.coil_stability_weight,
            gradient_weight: controller.coil_gradient_weight,
            drift_weight: controller.drift_weight,
            pellet_threshold: controller.pellet_stability_threshold,
            i_max_ka: actuators.i_max_ka,
            pellet_size_max: actuators.pellet_size_max,
        }
    }

    /// Normalised gradient drive g / (g + g_crit), in [0, 1).
    fn gradient_drive(gradient: f64, threshold: f64) -> f64 {
        let g = gradient.max(0.0);
        let denom = g + threshold.max(f64::EPSILON);
        if g.is_finite() {
            g / denom
        } else {
            1.0
        }
    }
}

impl ControlPolicy for HeuristicPolicy {
    fn stability_score(&self, inputs: &ScoreInputs) -> f64 {
        let base = 0.5 * (inputs.memory_score + inputs.plasma_stability) + inputs.learning_gain;
        let drift_penalty = if inputs.reference_temperature > 0.0 {
            self.drift_weight * inputs.drift.abs() / inputs.reference_temperature
        } else {
            0.0
        };
        let score = (base - drift_penalty) * inputs.sync_factor;
        if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn decide(&self, inputs: &DecisionInputs) -> ActuatorCommand {
        let score = inputs.stability_score.clamp(0.0, 1.0);
        let drive = self.stability_weight * (1.0 - score)
            + self.gradient_weight
                * Self::gradient_drive(inputs.edge_pressure_gradient, inputs.elm_threshold);
        let coil_current_ka = self.i_max_ka * drive.clamp(0.0, 1.0);

        let pellet_size = if inputs.pellet_available && score < self.pellet_threshold {
            Some(self.pellet_size_max * (1.0 - score / self.pellet_threshold))
        } else {
            None
        };
        ActuatorCommand {
            coil_current_ka,
            pellet_size,
        }
    }
}
