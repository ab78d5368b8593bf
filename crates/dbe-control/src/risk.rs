// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Risk Analyzer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Post-action disruption risk.
//!
//! Base risk is `1 - stability`. Coil saturation, an unavailable pellet
//! and a raised memory error flag each add a fixed penalty. Notes are
//! emitted in the order stability, coil, pellet, memory.

use crate::actuators::ActuatorState;
use dbe_quantum::SubsystemState;
use dbe_types::config::RiskConfig;
use dbe_types::state::{PlasmaState, RiskReport};

#[derive(Debug, Clone)]
pub struct RiskAnalyzer {
    config: RiskConfig,
}

impl RiskAnalyzer {
    pub fn new(config: RiskConfig) -> Self {
        RiskAnalyzer { config }
    }

    fn stability_note(&self, stability: f64) -> String {
        let cfg = &self.config;
        if stability <= cfg.high_risk_stability {
            format!(
                "Stability {stability:.2} below high-risk threshold {:.2}.",
                cfg.high_risk_stability
            )
        } else if stability <= cfg.medium_risk_stability {
            format!(
                "Stability {stability:.2} below medium-risk threshold {:.2}.",
                cfg.medium_risk_stability
            )
        } else {
            format!("Stability {stability:.2} nominal.")
        }
    }

    /// Pure evaluation. Identical inputs give identical scores and notes.
    pub fn evaluate(
        &self,
        plasma: &PlasmaState,
        actuators: &ActuatorState,
        subsystems: &SubsystemState,
    ) -> RiskReport {
        let cfg = &self.config;
        let stability = if plasma.stability.is_finite() {
            plasma.stability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut risk = 1.0 - stability;
        let mut notes = vec![self.stability_note(stability)];

        if actuators.coil_saturated() {
            risk += cfg.coil_saturation_penalty;
            notes.push(format!(
                "RMP coil saturated at {:.2} kA; limited headroom.",
                actuators.coil_current()
            ));
        }
        if !actuators.pellet_available() {
            risk += cfg.pellet_unavailable_penalty;
            notes.push(format!(
                "Pellet injector unavailable ({} ticks cooldown).",
                actuators.pellet_cooldown_remaining()
            ));
        }
        if subsystems.memory_error_flag() {
            risk += cfg.memory_error_penalty;
            notes.push(format!(
                "Fracton memory error flagged ({} total).",
                subsystems.memory_errors()
            ));
        }

        RiskReport {
            score: risk.clamp(0.0, 1.0),
            notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbe_core::pedestal::PedestalModel;
    use dbe_core::transport::initialize;
    use dbe_types::config::{ActuatorConfig, PlasmaConfig, SubsystemConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixture(stability: f64) -> (PlasmaState, ActuatorState, SubsystemState) {
        let mut plasma = initialize(&PlasmaConfig::default()).unwrap();
        plasma.stability = stability;
        let actuators = ActuatorState::from_config(&ActuatorConfig::default()).unwrap();
        let subsystems = SubsystemState::from_config(&SubsystemConfig::default(), 1.3).unwrap();
        (plasma, actuators, subsystems)
    }

    fn flag_memory_error(subsystems: &mut SubsystemState) {
        let mut faulty = SubsystemState::from_config(
            &SubsystemConfig {
                p_error: 1.0,
                ..SubsystemConfig::default()
            },
            1.3,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let snapshot = dbe_quantum::fracton::MemorySnapshot {
            tick: 1,
            compressed: vec![1.0],
            original_len: 1,
            block_size: 1,
        };
        faulty.memory.store("tick-1", snapshot, &mut rng);
        subsystems.memory = faulty.memory;
    }

    #[test]
    fn test_nominal_has_single_note() {
        let analyzer = RiskAnalyzer::new(RiskConfig::default());
        let (plasma, act, sub) = fixture(0.8);
        let report = analyzer.evaluate(&plasma, &act, &sub);
        assert!((report.score - 0.2).abs() < 1e-12);
        assert_eq!(report.notes, vec!["Stability 0.80 nominal.".to_string()]);
    }

    #[test]
    fn test_stability_bands() {
        let analyzer = RiskAnalyzer::new(RiskConfig::default());
        let (plasma, act, sub) = fixture(0.15);
        assert!(analyzer.evaluate(&plasma, &act, &sub).notes[0].contains("high-risk"));
        let (plasma, act, sub) = fixture(0.4);
        assert!(analyzer.evaluate(&plasma, &act, &sub).notes[0].contains("medium-risk"));
    }

    #[test]
    fn test_all_penalties_in_fixed_order() {
        let analyzer = RiskAnalyzer::new(RiskConfig::default());
        let (mut plasma, mut act, mut sub) = fixture(0.9);
        act.coil.set_current(10.0);
        let mut pedestal = PedestalModel::new(&PlasmaConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        act.pellet.fire(0.5, &mut plasma, &mut pedestal, &mut rng);
        flag_memory_error(&mut sub);
        plasma.stability = 0.9;

        let report = analyzer.evaluate(&plasma, &act, &sub);
        // 0.1 + 0.2 + 0.2 + 0.3
        assert!((report.score - 0.8).abs() < 1e-12, "score = {}", report.score);
        assert_eq!(report.notes.len(), 4);
        assert!(report.notes[0].starts_with("Stability"));
        assert!(report.notes[1].starts_with("RMP coil"));
        assert!(report.notes[2].starts_with("Pellet"));
        assert!(report.notes[3].starts_with("Fracton memory"));
        assert_eq!(report, analyzer.evaluate(&plasma, &act, &sub));
    }

    #[test]
    fn test_score_capped_at_one() {
        let analyzer = RiskAnalyzer::new(RiskConfig::default());
        let (plasma, mut act, mut sub) = fixture(0.0);
        act.coil.set_current(10.0);
        flag_memory_error(&mut sub);
        assert_eq!(analyzer.evaluate(&plasma, &act, &sub).score, 1.0);
    }
}
