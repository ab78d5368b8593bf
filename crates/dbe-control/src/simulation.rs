// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Simulation Run
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One seeded discharge: plasma, models, controller and RNG owned together.
//!
//! Each event advances transport, checks sawtooth then ELM (with the coil
//! multiplier currently applied), then runs the control cycle.

use crate::controller::{DbeController, EventOutcome, EventRequest};
use dbe_core::pedestal::PedestalModel;
use dbe_core::sawtooth::SawtoothModel;
use dbe_core::transport::TransportModel;
use dbe_types::config::DbeConfig;
use dbe_types::error::DbeResult;
use dbe_types::state::{EventSummary, PlasmaState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

/// MHD damage per unit severity of an uncontrolled crash.
const CRASH_DAMAGE_PER_SEVERITY: f64 = 0.1;

pub struct SimulationRun {
    transport: TransportModel,
    pedestal: PedestalModel,
    sawtooth: SawtoothModel,
    plasma: PlasmaState,
    controller: DbeController,
    rng: StdRng,
    last_summary: Option<EventSummary>,
}

impl SimulationRun {
    /// Fresh run seeded from `config.seed`.
    pub fn new(config: &DbeConfig) -> DbeResult<Self> {
        Self::with_seed(config, config.seed)
    }

    pub fn with_seed(config: &DbeConfig, seed: u64) -> DbeResult<Self> {
        config.validate()?;
        let transport = TransportModel::new(config.plasma.clone())?;
        let mut plasma = transport.initialize()?;
        transport.compute_stability(&mut plasma);
        Ok(SimulationRun {
            pedestal: PedestalModel::new(&config.plasma),
            sawtooth: SawtoothModel::new(),
            controller: DbeController::new(config)?,
            rng: StdRng::seed_from_u64(seed),
            transport,
            plasma,
            last_summary: None,
        })
    }

    pub fn plasma(&self) -> &PlasmaState {
        &self.plasma
    }

    pub fn controller(&self) -> &DbeController {
        &self.controller
    }

    pub fn pedestal(&self) -> &PedestalModel {
        &self.pedestal
    }

    pub fn sawtooth(&self) -> &SawtoothModel {
        &self.sawtooth
    }

    /// The run RNG, for drivers that sample event inputs from the same stream.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Summary of the most recent event.
    pub fn summary(&self) -> Option<&EventSummary> {
        self.last_summary.as_ref()
    }

    pub fn simulate_event(&mut self, request: &EventRequest) -> DbeResult<EventOutcome> {
        self.transport.advance(&mut self.plasma)?;

        let mut natural = Vec::new();
        if let Some(event) = self.sawtooth.check_sawtooth_trigger(&mut self.plasma) {
            natural.push(event);
        }
        let multiplier = self.controller.actuators().coil.elm_threshold_multiplier();
        if let Some(event) = self.pedestal.check_elm_trigger(&mut self.plasma, multiplier) {
            natural.push(event);
        }
        if !natural.is_empty() {
            let damage =
                natural.iter().map(|e| e.severity).sum::<f64>() * CRASH_DAMAGE_PER_SEVERITY;
            self.plasma.mhd_degradation = (self.plasma.mhd_degradation + damage).clamp(0.0, 1.0);
            self.transport.compute_stability(&mut self.plasma);
        }

        let mut outcome = self.controller.simulate_event(
            &mut self.plasma,
            &self.transport,
            &mut self.pedestal,
            request,
            &mut self.rng,
        )?;
        natural.append(&mut outcome.events);
        outcome.events = natural;

        info!(
            tick = outcome.tick,
            success = outcome.success,
            probability = outcome.mitigation_probability,
            stability = outcome.new_stability,
            risk = outcome.risk.score,
            "event complete"
        );
        self.last_summary = Some(outcome.summary.clone());
        Ok(outcome)
    }
}
