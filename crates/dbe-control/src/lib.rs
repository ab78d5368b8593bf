// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Control
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Controller loop for edge-instability suppression: RMP coil and pellet
//! actuators, the decision policy, post-action risk scoring and seeded
//! simulation runs.

pub mod actuators;
pub mod batch;
pub mod controller;
pub mod policy;
pub mod risk;
pub mod simulation;

pub use controller::{DbeController, EventOutcome, EventRequest};
pub use simulation::SimulationRun;
