// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Fracton Memory
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Keyed snapshot store with correlated-fault injection.
//!
//! Each `store` draws once from the caller's generator and raises the
//! error flag with probability `p_error`. The flag is reported, the value
//! is still stored. With a retention limit the oldest inserted key is
//! evicted first.

use crate::holographic::decompress;
use dbe_types::error::{DbeError, DbeResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::warn;

/// Compressed profile snapshot taken during sensing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub tick: u64,
    pub compressed: Vec<f64>,
    pub original_len: usize,
    pub block_size: usize,
}

impl MemorySnapshot {
    /// Expanded profile at its original length.
    pub fn restore(&self) -> Vec<f64> {
        decompress(&self.compressed, self.block_size, self.original_len)
    }

    /// Mean of the innermost `width` restored points, a proxy for core
    /// temperature. Snapshots compressed at different block sizes agree
    /// when `width` is a multiple of both.
    pub fn core_mean(&self, width: usize) -> Option<f64> {
        let restored = self.restore();
        let core = &restored[..width.max(1).min(restored.len())];
        if core.is_empty() {
            return None;
        }
        Some(core.iter().sum::<f64>() / core.len() as f64)
    }
}

/// Snapshot key for a controller tick.
pub fn tick_key(tick: u64) -> String {
    format!("tick-{tick}")
}

#[derive(Debug, Clone)]
pub struct FractonMemory<V = MemorySnapshot> {
    contents: HashMap<String, V>,
    order: VecDeque<String>,
    p_error: f64,
    retention: Option<usize>,
    error_flag: bool,
    error_count: usize,
    evicted: usize,
}

impl<V> FractonMemory<V> {
    pub fn new(p_error: f64, retention: Option<usize>) -> DbeResult<Self> {
        if !p_error.is_finite() || !(0.0..=1.0).contains(&p_error) {
            return Err(DbeError::ConfigError(format!(
                "memory p_error must lie in [0, 1], got {p_error}"
            )));
        }
        if retention == Some(0) {
            return Err(DbeError::ConfigError(
                "memory retention must keep at least one snapshot".to_string(),
            ));
        }
        Ok(FractonMemory {
            contents: HashMap::new(),
            order: VecDeque::new(),
            p_error,
            retention,
            error_flag: false,
            error_count: 0,
            evicted: 0,
        })
    }

    /// Insert or overwrite. Returns the error flag raised for this call.
    pub fn store<R: Rng + ?Sized>(&mut self, key: impl Into<String>, value: V, rng: &mut R) -> bool {
        let key = key.into();
        let faulted = rng.gen::<f64>() < self.p_error;
        self.error_flag = faulted;
        if faulted {
            self.error_count += 1;
            warn!(key = %key, errors = self.error_count, "fracton memory fault injected");
        }

        if self.contents.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
        self.enforce_retention();
        faulted
    }

    fn enforce_retention(&mut self) {
        let Some(limit) = self.retention else {
            return;
        };
        while self.contents.len() > limit {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.contents.remove(&oldest);
                    self.evicted += 1;
                }
                None => break,
            }
        }
    }

    pub fn retrieve(&self, key: &str) -> DbeResult<&V> {
        self.contents
            .get(key)
            .ok_or_else(|| DbeError::KeyNotFound(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.contents.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Flag raised by the most recent store.
    pub fn error_flag(&self) -> bool {
        self.error_flag
    }

    /// Faults injected over the lifetime of this memory.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn evicted(&self) -> usize {
        self.evicted
    }
}
