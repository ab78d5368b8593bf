// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Time Crystal Clock
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Monotone event clock. One tick is taken per controller event and every
//! action of that event is stamped with it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeCrystalClock {
    tick: u64,
    engaged: bool,
    bonus: f64,
}

impl TimeCrystalClock {
    /// `bonus` is the synchronisation factor applied while engaged.
    pub fn new(bonus: f64) -> Self {
        TimeCrystalClock {
            tick: 0,
            engaged: false,
            bonus,
        }
    }

    /// Advance and return the new tick.
    pub fn tick(&mut self) -> u64 {
        self.tick = self.tick.saturating_add(1);
        self.tick
    }

    /// Last tick handed out, 0 before the first event.
    pub fn current(&self) -> u64 {
        self.tick
    }

    pub fn engage(&mut self, engaged: bool) {
        self.engaged = engaged;
    }

    pub fn sync_factor(&self) -> f64 {
        if self.engaged {
            self.bonus
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_strictly_increase() {
        let mut clock = TimeCrystalClock::new(1.3);
        assert_eq!(clock.current(), 0);
        let ticks: Vec<u64> = (0..5).map(|_| clock.tick()).collect();
        assert_eq!(ticks, vec![1, 2, 3, 4, 5]);
        assert_eq!(clock.current(), 5);
    }

    #[test]
    fn test_sync_factor_only_when_engaged() {
        let mut clock = TimeCrystalClock::new(1.3);
        assert_eq!(clock.sync_factor(), 1.0);
        clock.engage(true);
        assert!((clock.sync_factor() - 1.3).abs() < 1e-12);
        clock.engage(false);
        assert_eq!(clock.sync_factor(), 1.0);
    }
}
