// Copyright (c) 2023 Mike Tsao. All rights reserved.

//! Bidirectional mapping between wall-clock nanoseconds and the integer tick
//! domain that every other component in this crate schedules against.

use crate::error::EngineError;

/// Pulses per quarter note. Fixed for the lifetime of the process; internal
/// scheduling never uses any other tick resolution.
pub const PPQN: u32 = 192;

/// [TickClock] holds the current tempo and the derived nanoseconds-per-tick
/// ratio, and converts between the two timing domains. It never stores a
/// "current tick" itself — that's state owned by [crate::transport::TransportController].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickClock {
    tempo_bpm: f64,
    ratio_ns_per_tick: f64,
}
impl Default for TickClock {
    fn default() -> Self {
        Self::new_with_tempo(100.0)
    }
}
impl TickClock {
    pub fn new_with_tempo(tempo_bpm: f64) -> Self {
        let mut s = Self {
            tempo_bpm,
            ratio_ns_per_tick: 0.0,
        };
        s.set_tempo(tempo_bpm);
        s
    }

    /// Converts a tick count to wall-clock nanoseconds at the current ratio.
    pub fn ticks_to_ns(&self, ticks: i64) -> f64 {
        self.ratio_ns_per_tick * ticks as f64
    }

    /// Converts wall-clock nanoseconds to the nearest tick at the current ratio.
    pub fn ns_to_ticks(&self, ns: f64) -> i64 {
        (ns / self.ratio_ns_per_tick).round() as i64
    }

    pub fn tempo(&self) -> f64 {
        self.tempo_bpm
    }

    pub fn ratio(&self) -> f64 {
        self.ratio_ns_per_tick
    }

    /// Recomputes the ratio for a new tempo. Callers who rely on wall-time
    /// continuity (i.e., anyone mid-schedule) must re-anchor their own
    /// per-module `nextTick` after calling this.
    pub fn set_tempo(&mut self, tempo_bpm: f64) {
        self.tempo_bpm = tempo_bpm;
        self.ratio_ns_per_tick = 60e9 / PPQN as f64 / tempo_bpm;
    }

    /// Called when an external clock source (MIDI clock or host transport)
    /// supplies an authoritative `(realtime_ns, tick)` pair. Rejects the
    /// reading if it implies a zero or implausibly slow ratio, in which case
    /// the prior ratio (and tempo) is kept.
    pub fn recalibrate(&mut self, realtime_ns: f64, tick: i64) {
        if tick <= 0 {
            return;
        }
        let candidate_ratio = realtime_ns / tick as f64;
        let ceiling = 60e9 / self.tempo_bpm;
        if candidate_ratio == 0.0 || candidate_ratio > ceiling {
            log::debug!(
                "{}: ratio={candidate_ratio} ceiling={ceiling}",
                EngineError::ImplausibleTempo
            );
            return;
        }
        self.ratio_ns_per_tick = candidate_ratio;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn round_trip_is_identity_at_fixed_tempo() {
        let clock = TickClock::new_with_tempo(120.0);
        for t in [0_i64, 1, 48, 192, 1_000, 1 << 20] {
            let ns = clock.ticks_to_ns(t);
            assert_eq!(clock.ns_to_ticks(ns), t);
        }
    }

    #[test]
    fn set_tempo_changes_ratio() {
        let mut clock = TickClock::new_with_tempo(120.0);
        let ratio_120 = clock.ratio();
        clock.set_tempo(60.0);
        assert!(approx_eq!(f64, clock.ratio(), ratio_120 * 2.0, epsilon = 1e-9));
    }

    #[test]
    fn recalibrate_rejects_zero_tick() {
        let mut clock = TickClock::new_with_tempo(120.0);
        let before = clock.ratio();
        clock.recalibrate(1_000_000.0, 0);
        assert_eq!(clock.ratio(), before);
    }

    #[test]
    fn recalibrate_rejects_implausibly_slow_reading() {
        let mut clock = TickClock::new_with_tempo(120.0);
        let before = clock.ratio();
        // A reading implying a much slower tempo than plausible.
        clock.recalibrate(60e9, 1);
        assert_eq!(clock.ratio(), before);
    }

    #[test]
    fn recalibrate_accepts_plausible_reading() {
        let mut clock = TickClock::new_with_tempo(120.0);
        let ns = clock.ticks_to_ns(192);
        clock.recalibrate(ns, 192);
        assert!(approx_eq!(f64, clock.ratio(), ns / 192.0, epsilon = 1e-6));
    }
}
