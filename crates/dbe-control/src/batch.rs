// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Batch Runner
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Independent seeded runs, one summary row each.

use crate::controller::EventRequest;
use crate::simulation::SimulationRun;
use dbe_types::config::DbeConfig;
use dbe_types::error::{DbeError, DbeResult};
use rand::Rng;
use serde::Serialize;

/// Growth-rate range sampled per event.
const GAMMA_RANGE: std::ops::Range<f64> = 0.5..1.5;

/// Joiner for risk notes in a single CSV cell.
pub const NOTE_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRow {
    pub run_id: usize,
    pub stability: f64,
    pub coil_fraction: f64,
    pub pellet_available: bool,
    pub memory_errors: usize,
    pub risk_score: f64,
    pub notes: String,
}

/// Run `runs` discharges of `events_per_run` events, run `i` seeded with
/// `config.seed + i`. `template` supplies every request field except
/// `gamma_physical`, which is drawn from the run's own RNG.
pub fn run_batch(
    config: &DbeConfig,
    runs: usize,
    events_per_run: usize,
    template: &EventRequest,
) -> DbeResult<Vec<BatchRow>> {
    if events_per_run == 0 {
        return Err(DbeError::ConfigError(
            "batch requires at least one event per run".to_string(),
        ));
    }
    (0..runs)
        .map(|run_id| {
            let seed = config.seed.wrapping_add(run_id as u64);
            let mut run = SimulationRun::with_seed(config, seed)?;
            let mut last = None;
            for _ in 0..events_per_run {
                let request = EventRequest {
                    gamma_physical: run.rng_mut().gen_range(GAMMA_RANGE),
                    ..template.clone()
                };
                last = Some(run.simulate_event(&request)?.summary);
            }
            let summary = last.ok_or_else(|| {
                DbeError::PhysicsViolation(format!("run {run_id} produced no events"))
            })?;
            Ok(BatchRow {
                run_id,
                stability: summary.stability,
                coil_fraction: summary.coil_fraction,
                pellet_available: summary.pellet_available,
                memory_errors: summary.memory_errors,
                risk_score: summary.risk_score,
                notes: summary.notes.join(NOTE_SEPARATOR),
            })
        })
        .collect()
}
