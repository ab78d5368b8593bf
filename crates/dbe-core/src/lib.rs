// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Single-fluid radial transport model for the DBE controller.
//!
//! Analytic profile initialisation, explicit diffusion step, stability
//! metric, plus the ELM (pedestal) and sawtooth crash triggers.

pub mod pedestal;
pub mod sawtooth;
pub mod transport;
