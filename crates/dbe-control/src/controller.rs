// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Controller
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-event control cycle: Idle → Sensing → Deciding → Acting →
//! Reporting → Idle.
//!
//! Sensing compresses the temperature profile and stores it under the
//! event tick. Deciding turns qubit allocation, plasma stability and
//! snapshot drift into a stability score and a mitigation probability.
//! Acting drives the coil and pellet and draws the mitigation outcome.
//! Reporting hands the combined state to the risk analyzer.
//!
//! Random draws per event, in order: one memory fault draw, one pellet
//! misfire draw if a pellet fires, one success draw if mitigation runs.

use crate::actuators::{ActuatorState, PelletOutcome};
use crate::policy::{ControlPolicy, DecisionInputs, HeuristicPolicy, ScoreInputs};
use crate::risk::RiskAnalyzer;
use dbe_core::pedestal::PedestalModel;
use dbe_core::transport::TransportModel;
use dbe_quantum::fracton::{tick_key, MemorySnapshot};
use dbe_quantum::SubsystemState;
use dbe_types::config::{ControllerConfig, DbeConfig};
use dbe_types::error::{DbeError, DbeResult};
use dbe_types::state::{EventSummary, InstabilityEvent, PlasmaState, RiskReport};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerPhase {
    Idle,
    Sensing,
    Deciding,
    Acting,
    Reporting,
}

/// Operator inputs for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRequest {
    /// Physical instability growth rate.
    pub gamma_physical: f64,
    /// Coupling of stability score to confinement time.
    pub alpha: f64,
    /// Coupling of response time to the effective growth rate.
    pub beta: f64,
    /// Detection qubits requested.
    pub qubits_alloc: usize,
    /// Simulation (memory) qubits requested.
    pub memory_alloc: usize,
    pub engage_time_crystal: bool,
    pub engage_compression: bool,
    pub execute_mitigation: bool,
}

impl Default for EventRequest {
    fn default() -> Self {
        EventRequest {
            gamma_physical: 1.0,
            alpha: 0.3,
            beta: 0.2,
            qubits_alloc: 60,
            memory_alloc: 40,
            engage_time_crystal: false,
            engage_compression: false,
            execute_mitigation: true,
        }
    }
}

impl EventRequest {
    fn validate(&self) -> DbeResult<()> {
        for (name, value) in [
            ("gamma_physical", self.gamma_physical),
            ("alpha", self.alpha),
            ("beta", self.beta),
        ] {
            if !value.is_finite() {
                return Err(DbeError::ConfigError(format!(
                    "event {name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventOutcome {
    pub tick: u64,
    pub success: bool,
    /// Always in [0, 1].
    pub mitigation_probability: f64,
    pub new_stability: f64,
    pub stability_score: f64,
    pub response_time: f64,
    pub coil_current_ka: f64,
    pub pellet: Option<PelletOutcome>,
    /// The requested allocation exceeded capacity and the previous one was kept.
    pub allocation_rejected: bool,
    pub memory_fault: bool,
    /// Instabilities raised during this event, natural crashes first.
    pub events: Vec<InstabilityEvent>,
    pub risk: RiskReport,
    pub summary: EventSummary,
}

/// Fusion gain bookkeeping with and without controller-improved confinement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GainLedger {
    pub cumulative_q: f64,
    pub cumulative_q_baseline: f64,
    pub events: usize,
}

impl GainLedger {
    /// Q = <n> <T> τ_E / P_heat.
    pub fn fusion_gain(plasma: &PlasmaState, tau_e: f64, heating_power: f64) -> f64 {
        let n_mean = plasma.density.mean().unwrap_or(0.0);
        let t_mean = plasma.temperature.mean().unwrap_or(0.0);
        let power = if heating_power > 0.0 { heating_power } else { 1.0 };
        n_mean * t_mean * tau_e / power
    }

    fn record(&mut self, q: f64, q_baseline: f64) {
        self.cumulative_q += q;
        self.cumulative_q_baseline += q_baseline;
        self.events += 1;
    }

    /// Percentage gain of cumulative Q over baseline, 0 with no baseline.
    pub fn relative_improvement_pct(&self) -> f64 {
        if self.cumulative_q_baseline <= 0.0 {
            return 0.0;
        }
        (self.cumulative_q / self.cumulative_q_baseline - 1.0) * 100.0
    }
}

/// Logistic squash 1 / (1 + exp(-k (x - x0))), clamped to [0, 1].
pub fn logistic(x: f64, k: f64, x0: f64) -> f64 {
    let p = 1.0 / (1.0 + (-k * (x - x0)).exp());
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub struct DbeController<P: ControlPolicy = HeuristicPolicy> {
    config: ControllerConfig,
    actuators: ActuatorState,
    subsystems: SubsystemState,
    policy: P,
    analyzer: RiskAnalyzer,
    phase: ControllerPhase,
    learning_gain: f64,
    ledger: GainLedger,
}

impl DbeController<HeuristicPolicy> {
    pub fn new(config: &DbeConfig) -> DbeResult<Self> {
        let policy = HeuristicPolicy::new(&config.controller, &config.actuators);
        Self::with_policy(config, policy)
    }
}

impl<P: ControlPolicy> DbeController<P> {
    pub fn with_policy(config: &DbeConfig, policy: P) -> DbeResult<Self> {
        config.controller.validate()?;
        config.risk.validate()?;
        Ok(DbeController {
            config: config.controller.clone(),
            actuators: ActuatorState::from_config(&config.actuators)?,
            subsystems: SubsystemState::from_config(
                &config.subsystems,
                config.controller.time_crystal_bonus,
            )?,
            policy,
            analyzer: RiskAnalyzer::new(config.risk.clone()),
            phase: ControllerPhase::Idle,
            learning_gain: 0.0,
            ledger: GainLedger::default(),
        })
    }

    pub fn actuators(&self) -> &ActuatorState {
        &self.actuators
    }

    pub fn subsystems(&self) -> &SubsystemState {
        &self.subsystems
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn learning_gain(&self) -> f64 {
        self.learning_gain
    }

    pub fn ledger(&self) -> &GainLedger {
        &self.ledger
    }

    fn enter(&mut self, phase: ControllerPhase, tick: u64) {
        debug!(tick, from = ?self.phase, to = ?phase, "controller phase");
        self.phase = phase;
    }

    /// Core temperature change since the previous tick's snapshot, both
    /// averaged over the wider of the two block sizes.
    ///
    /// A missing snapshot is a degraded estimate of zero drift.
    fn snapshot_drift(&self, tick: u64, current: &MemorySnapshot) -> f64 {
        let previous = tick_key(tick.saturating_sub(1));
        match self.subsystems.memory.retrieve(&previous) {
            Ok(prev) => {
                let width = current.block_size.max(prev.block_size);
                match (current.core_mean(width), prev.core_mean(width)) {
                    (Some(now), Some(then)) => now - then,
                    _ => 0.0,
                }
            }
            Err(err) => {
                debug!(tick, error = %err, "no previous snapshot; assuming zero drift");
                0.0
            }
        }
    }

    /// Mitigation probability from score, response time and compression.
    pub fn mitigation_probability(
        &self,
        stability_score: f64,
        response_time: f64,
        compression_engaged: bool,
    ) -> f64 {
        let efficiency = if compression_engaged {
            self.config.compression_efficiency
        } else {
            1.0
        };
        let speed = 1.0 / (1.0 + response_time.max(0.0));
        let raw = 0.5 * (stability_score + speed) * efficiency;
        logistic(raw, self.config.logistic_k, self.config.logistic_x0)
    }

    /// Run one full control cycle on `plasma`.
    ///
    /// Rejected allocations and unavailable pellets are reported in the
    /// outcome. Errors are returned only for non-finite request values.
    pub fn simulate_event<R: Rng + ?Sized>(
        &mut self,
        plasma: &mut PlasmaState,
        transport: &TransportModel,
        pedestal: &mut PedestalModel,
        request: &EventRequest,
        rng: &mut R,
    ) -> DbeResult<EventOutcome> {
        request.validate()?;

        // ── Sensing ──
        self.actuators.pellet.tick();
        let allocation_rejected = match self
            .subsystems
            .qubits
            .allocate(request.qubits_alloc, request.memory_alloc)
        {
            Ok(()) => false,
            Err(err) => {
                warn!(
                    error = %err,
                    capacity = self.subsystems.qubits.total_qubits(),
                    detection = self.subsystems.qubits.detection(),
                    simulation = self.subsystems.qubits.simulation(),
                    "allocation rejected; keeping previous split"
                );
                true
            }
        };
        self.subsystems.clock.engage(request.engage_time_crystal);
        let tick = self.subsystems.clock.tick();
        self.enter(ControllerPhase::Sensing, tick);

        let profile = plasma.temperature.to_vec();
        let encoder = &self.subsystems.encoder;
        let snapshot = MemorySnapshot {
            tick,
            compressed: encoder.encode(&profile)?,
            original_len: profile.len(),
            block_size: encoder.block_size(),
        };
        debug!(
            tick,
            ratio = encoder.compression_ratio(profile.len()),
            "profile compressed"
        );
        let drift = self.snapshot_drift(tick, &snapshot);
        let memory_fault = self.subsystems.memory.store(tick_key(tick), snapshot, rng);

        // ── Deciding ──
        self.enter(ControllerPhase::Deciding, tick);
        let response_time = self.subsystems.qubits.response_time();
        let stability_score = self.policy.stability_score(&ScoreInputs {
            memory_score: self.subsystems.qubits.memory_score(),
            plasma_stability: plasma.stability,
            learning_gain: self.learning_gain,
            drift,
            reference_temperature: transport.config().t0_kev,
            sync_factor: self.subsystems.clock.sync_factor(),
        });
        let tau_standard = transport.config().tau_e_standard;
        plasma.tau_e_s = tau_standard * (1.0 + request.alpha * stability_score);
        let mitigation_probability =
            self.mitigation_probability(stability_score, response_time, request.engage_compression);
        debug!(
            tick,
            response_time, stability_score, mitigation_probability, drift, "decision inputs"
        );

        // ── Acting ──
        let mut success = false;
        let mut pellet = None;
        let mut events = Vec::new();
        if request.execute_mitigation {
            self.enter(ControllerPhase::Acting, tick);
            let command = self.policy.decide(&DecisionInputs {
                stability_score,
                edge_pressure_gradient: plasma.edge_pressure_gradient,
                elm_threshold: pedestal.effective_threshold(1.0),
                pellet_available: self.actuators.pellet_available(),
            });
            self.actuators.coil.set_current(command.coil_current_ka);
            self.actuators.coil.apply(plasma);

            if let Some(size) = command.pellet_size {
                let outcome = self.actuators.pellet.fire(size, plasma, pedestal, rng);
                if let PelletOutcome::Fired { event, .. } = outcome {
                    events.push(event);
                }
                pellet = Some(outcome);
            }
            transport.clamp_density(plasma);

            success = rng.gen::<f64>() < mitigation_probability;
            let damage = if success {
                self.learning_gain =
                    (self.learning_gain + self.config.learning_increment).min(self.config.learning_cap);
                self.config.success_degradation
            } else {
                let gamma_effective =
                    (request.gamma_physical - request.beta * response_time).max(0.0);
                gamma_effective * self.config.growth_damage_scale
            };
            plasma.mhd_degradation = (plasma.mhd_degradation + damage).clamp(0.0, 1.0);
            transport.compute_stability(plasma);
            debug!(tick, success, damage, stability = plasma.stability, "mitigation applied");
        }

        let heating = transport.config().heating_ext;
        self.ledger.record(
            GainLedger::fusion_gain(plasma, plasma.tau_e_s, heating),
            GainLedger::fusion_gain(plasma, tau_standard, heating),
        );

        // ── Reporting ──
        self.enter(ControllerPhase::Reporting, tick);
        let risk = self
            .analyzer
            .evaluate(plasma, &self.actuators, &self.subsystems);
        let summary = EventSummary {
            stability: plasma.stability,
            coil_fraction: self.actuators.coil.fraction(),
            pellet_available: self.actuators.pellet_available(),
            memory_errors: self.subsystems.memory_errors(),
            risk_score: risk.score,
            notes: risk.notes.clone(),
        };
        self.enter(ControllerPhase::Idle, tick);

        Ok(EventOutcome {
            tick,
            success,
            mitigation_probability,
            new_stability: plasma.stability,
            stability_score,
            response_time,
            coil_current_ka: self.actuators.coil_current(),
            pellet,
            allocation_rejected,
            memory_fault,
            events,
            risk,
            summary,
        })
    }
}
