// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Subsystem State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::fracton::{FractonMemory, MemorySnapshot};
use crate::holographic::HolographicEncoder;
use crate::qubit::QubitRegister;
use crate::time_crystal::TimeCrystalClock;
use dbe_types::config::SubsystemConfig;
use dbe_types::error::DbeResult;

/// Subsystems owned by one controller. Never shared between runs.
#[derive(Debug, Clone)]
pub struct SubsystemState {
    pub qubits: QubitRegister,
    pub memory: FractonMemory<MemorySnapshot>,
    pub clock: TimeCrystalClock,
    pub encoder: HolographicEncoder,
}

impl SubsystemState {
    pub fn from_config(config: &SubsystemConfig, time_crystal_bonus: f64) -> DbeResult<Self> {
        config.validate()?;
        Ok(SubsystemState {
            qubits: QubitRegister::new(config.total_qubits, config.base_latency)?,
            memory: FractonMemory::new(config.p_error, config.retention)?,
            clock: TimeCrystalClock::new(time_crystal_bonus),
            encoder: HolographicEncoder::new(config.block_size)?,
        })
    }

    pub fn qubits_allocated_detection(&self) -> usize {
        self.qubits.detection()
    }

    pub fn qubits_allocated_simulation(&self) -> usize {
        self.qubits.simulation()
    }

    pub fn memory_error_flag(&self) -> bool {
        self.memory.error_flag()
    }

    pub fn memory_errors(&self) -> usize {
        self.memory.error_count()
    }

    pub fn time_crystal_tick(&self) -> u64 {
        self.clock.current()
    }

    pub fn compression_block_size(&self) -> usize {
        self.encoder.block_size()
    }
}
