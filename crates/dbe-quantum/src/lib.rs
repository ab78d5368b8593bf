// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Quantum Subsystems
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Named, parameterised subsystem abstractions feeding the controller's
//! response time, stability score and compression ratio.
//!
//! None of these model real quantum hardware.

pub mod fracton;
pub mod holographic;
pub mod qubit;
pub mod subsystems;
pub mod time_crystal;

pub use subsystems::SubsystemState;
