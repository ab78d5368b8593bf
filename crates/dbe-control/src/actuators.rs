// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Actuators
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! RMP coil and pellet injector.
//!
//! The coil raises the ELM critical gradient by `1 + I/I_max` and derates
//! confinement. The pellet injector paces a bounded, controlled ELM and is
//! rate-limited by a tick cooldown.

use dbe_core::pedestal::{outer_third_start, PedestalModel};
use dbe_types::config::ActuatorConfig;
use dbe_types::error::DbeResult;
use dbe_types::state::{InstabilityEvent, PlasmaState};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Resonant magnetic perturbation coil.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RmpCoil {
    current_ka: f64,
    i_max_ka: f64,
    saturation_fraction: f64,
    confinement_penalty: f64,
}

impl RmpCoil {
    pub fn new(config: &ActuatorConfig) -> Self {
        RmpCoil {
            current_ka: 0.0,
            i_max_ka: config.i_max_ka,
            saturation_fraction: config.saturation_fraction,
            confinement_penalty: config.confinement_penalty,
        }
    }

    /// Clamp to [0, I_max] and store. Non-finite requests switch the coil off.
    pub fn set_current(&mut self, current_ka: f64) -> f64 {
        self.current_ka = if current_ka.is_finite() {
            current_ka.clamp(0.0, self.i_max_ka)
        } else {
            0.0
        };
        self.current_ka
    }

    pub fn current(&self) -> f64 {
        self.current_ka
    }

    pub fn i_max(&self) -> f64 {
        self.i_max_ka
    }

    /// I / I_max in [0, 1].
    pub fn fraction(&self) -> f64 {
        if self.i_max_ka <= 0.0 {
            return 0.0;
        }
        (self.current_ka / self.i_max_ka).clamp(0.0, 1.0)
    }

    pub fn elm_threshold_multiplier(&self) -> f64 {
        1.0 + self.fraction()
    }

    /// Confinement derate 1 - penalty * I/I_max.
    pub fn confinement_factor(&self) -> f64 {
        1.0 - self.confinement_penalty * self.fraction()
    }

    /// Write the derate onto the plasma. Stability is recomputed by the caller.
    pub fn apply(&self, plasma: &mut PlasmaState) {
        plasma.confinement_factor = self.confinement_factor();
    }

    pub fn is_saturated(&self) -> bool {
        self.current_ka >= self.saturation_fraction * self.i_max_ka
    }
}

/// Result of a `fire` request. Unavailable is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PelletOutcome {
    Fired { size: f64, event: InstabilityEvent },
    /// Pellet consumed without reaching the plasma.
    Misfired,
    Unavailable { cooldown_remaining: u32 },
}

impl PelletOutcome {
    pub fn fired(&self) -> bool {
        matches!(self, PelletOutcome::Fired { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PelletInjector {
    cooldown_remaining: u32,
    cooldown_ticks: u32,
    size_max: f64,
    density_gain: f64,
    temperature_drop: f64,
    max_elm_severity: f64,
    misfire_probability: f64,
}

impl PelletInjector {
    pub fn new(config: &ActuatorConfig) -> Self {
        PelletInjector {
            cooldown_remaining: 0,
            cooldown_ticks: config.cooldown_ticks,
            size_max: config.pellet_size_max,
            density_gain: config.pellet_density_gain,
            temperature_drop: config.pellet_temperature_drop,
            max_elm_severity: config.controlled_elm_max_severity,
            misfire_probability: config.pellet_misfire_probability,
        }
    }

    pub fn is_available(&self) -> bool {
        self.cooldown_remaining == 0
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown_remaining
    }

    /// One simulated tick of cooldown, floored at 0.
    pub fn tick(&mut self) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }

    /// Fire a pellet of `size` into the edge.
    ///
    /// While cooling down nothing changes. Otherwise the cooldown is reset,
    /// one misfire draw is taken from `rng`, and on a hit the outer third
    /// gains density, loses temperature and crashes through a controlled ELM.
    pub fn fire<R: Rng + ?Sized>(
        &mut self,
        size: f64,
        plasma: &mut PlasmaState,
        pedestal: &mut PedestalModel,
        rng: &mut R,
    ) -> PelletOutcome {
        if !self.is_available() {
            debug!(cooldown = self.cooldown_remaining, "pellet unavailable");
            return PelletOutcome::Unavailable {
                cooldown_remaining: self.cooldown_remaining,
            };
        }

        let size = if size.is_finite() {
            size.clamp(0.0, self.size_max)
        } else {
            0.0
        };
        self.cooldown_remaining = self.cooldown_ticks;

        if rng.gen::<f64>() < self.misfire_probability {
            info!(size, "pellet misfire");
            return PelletOutcome::Misfired;
        }

        let strength = if self.size_max > 0.0 {
            size / self.size_max
        } else {
            0.0
        };
        let n = plasma.n_points();
        let cooling = 1.0 - self.temperature_drop * strength;
        for i in outer_third_start(n)..n {
            plasma.density[i] = (plasma.density[i] + self.density_gain * strength).max(0.0);
            plasma.temperature[i] = (plasma.temperature[i] * cooling).max(0.0);
        }

        let event = pedestal.trigger_controlled_elm(plasma, strength, self.max_elm_severity);
        info!(
            size,
            severity = event.severity,
            cooldown = self.cooldown_remaining,
            "pellet fired"
        );
        PelletOutcome::Fired { size, event }
    }
}

/// Actuators owned by one controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuatorState {
    pub coil: RmpCoil,
    pub pellet: PelletInjector,
}

impl ActuatorState {
    pub fn from_config(config: &ActuatorConfig) -> DbeResult<Self> {
        config.validate()?;
        Ok(ActuatorState {
            coil: RmpCoil::new(config),
            pellet: PelletInjector::new(config),
        })
    }

    pub fn coil_current(&self) -> f64 {
        self.coil.current()
    }

    pub fn coil_saturated(&self) -> bool {
        self.coil.is_saturated()
    }

    pub fn pellet_cooldown_remaining(&self) -> u32 {
        self.pellet.cooldown_remaining()
    }

    pub fn pellet_available(&self) -> bool {
        self.pellet.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbe_core::transport::initialize;
    use dbe_types::config::PlasmaConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn plasma() -> (PlasmaState, PedestalModel) {
        let cfg = PlasmaConfig::default();
        (initialize(&cfg).unwrap(), PedestalModel::new(&cfg))
    }

    #[test]
    fn test_coil_clamps_current() {
        let mut coil = RmpCoil::new(&ActuatorConfig::default());
        assert_eq!(coil.set_current(-3.0), 0.0);
        assert_eq!(coil.set_current(25.0), 10.0);
        assert_eq!(coil.set_current(f64::NAN), 0.0);
        assert_eq!(coil.set_current(4.0), 4.0);
    }

    #[test]
    fn test_half_current_multiplier_is_one_and_a_half() {
        let mut coil = RmpCoil::new(&ActuatorConfig::default());
        coil.set_current(5.0);
        assert!((coil.elm_threshold_multiplier() - 1.5).abs() < 1e-12);
        assert!((coil.confinement_factor() - 0.975).abs() < 1e-12);
    }

    #[test]
    fn test_coil_saturation() {
        let mut coil = RmpCoil::new(&ActuatorConfig::default());
        coil.set_current(8.9);
        assert!(!coil.is_saturated());
        coil.set_current(9.0);
        assert!(coil.is_saturated());
    }

    #[test]
    fn test_coil_penalty_lowers_stability() {
        let cfg = PlasmaConfig::default();
        let (mut state, _) = plasma();
        let before = dbe_core::transport::stability_metric(&cfg, &state);
        let mut coil = RmpCoil::new(&ActuatorConfig::default());
        coil.set_current(10.0);
        coil.apply(&mut state);
        let after = dbe_core::transport::stability_metric(&cfg, &state);
        assert!(after < before, "after={after} before={before}");
        assert!((after - before * 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_pellet_fire_sets_cooldown_and_paces_elm() {
        let (mut state, mut pedestal) = plasma();
        let mut rng = StdRng::seed_from_u64(7);
        let mut pellet = PelletInjector::new(&ActuatorConfig::default());
        let n = state.n_points();
        let edge_density = state.density[n - 2];

        let outcome = pellet.fire(2.0, &mut state, &mut pedestal, &mut rng);
        match outcome {
            PelletOutcome::Fired { size, event } => {
                assert!((size - 1.0).abs() < 1e-12, "size clamped to size_max");
                assert!(event.controlled);
                assert!(event.severity <= 0.3 + 1e-12);
            }
            other => panic!("expected fired, got {other:?}"),
        }
        assert_eq!(pellet.cooldown_remaining(), 3);
        assert!(state.density[n - 2] > edge_density);
        assert_eq!(pedestal.crash_count(), 1);
    }

    #[test]
    fn test_second_fire_within_cooldown_is_unavailable() {
        let (mut state, mut pedestal) = plasma();
        let mut rng = StdRng::seed_from_u64(11);
        let mut pellet = PelletInjector::new(&ActuatorConfig::default());

        assert!(pellet.fire(0.5, &mut state, &mut pedestal, &mut rng).fired());
        pellet.tick();
        assert_eq!(pellet.cooldown_remaining(), 2);

        let snapshot = state.temperature.clone();
        let outcome = pellet.fire(0.5, &mut state, &mut pedestal, &mut rng);
        assert_eq!(
            outcome,
            PelletOutcome::Unavailable {
                cooldown_remaining: 2
            }
        );
        assert_eq!(pellet.cooldown_remaining(), 2);
        assert_eq!(state.temperature, snapshot);
        assert_eq!(pedestal.crash_count(), 1);
    }

    #[test]
    fn test_tick_floors_at_zero() {
        let mut pellet = PelletInjector::new(&ActuatorConfig::default());
        pellet.tick();
        assert_eq!(pellet.cooldown_remaining(), 0);
        assert!(pellet.is_available());
    }

    #[test]
    fn test_certain_misfire_consumes_pellet_only() {
        let cfg = ActuatorConfig {
            pellet_misfire_probability: 1.0,
            ..ActuatorConfig::default()
        };
        let (mut state, mut pedestal) = plasma();
        let before = state.clone();
        let mut rng = StdRng::seed_from_u64(3);
        let mut pellet = PelletInjector::new(&cfg);
        assert_eq!(
            pellet.fire(1.0, &mut state, &mut pedestal, &mut rng),
            PelletOutcome::Misfired
        );
        assert_eq!(pellet.cooldown_remaining(), 3);
        assert_eq!(state.temperature, before.temperature);
        assert_eq!(state.density, before.density);
    }

    #[test]
    fn test_actuator_state_accessors() {
        let mut act = ActuatorState::from_config(&ActuatorConfig::default()).unwrap();
        assert!(act.pellet_available());
        assert!(!act.coil_saturated());
        act.coil.set_current(10.0);
        assert!(act.coil_saturated());
        assert_eq!(act.coil_current(), 10.0);
        assert_eq!(act.pellet_cooldown_remaining(), 0);
    }
}
